//! Suspicious-content heuristics.
//!
//! Stage two of the scanner, run only when the signature check is
//! negative. Unlike stage one, this stage aggregates: every matching
//! pattern contributes its own entry to the threat list.

use crate::core::CandidateFile;

/// Filename tokens implying malicious intent.
const SUSPICIOUS_NAME_TOKENS: &[&str] = &[
    "virus",
    "malware",
    "trojan",
    "ransomware",
    "keylogger",
    "backdoor",
    "rootkit",
    "exploit",
];

/// Script and process-invocation markers searched in plain text.
const SCRIPT_MARKERS: &[&str] = &[
    "<script",
    "javascript:",
    "eval(",
    "document.write",
    "powershell",
    "cmd.exe",
    "/bin/sh",
    "#!/bin/",
    "system(",
    "exec(",
    "subprocess",
];

/// Base64 fragments matching the header signatures of common
/// executable and archive formats. Matched case-sensitively against
/// the raw text.
const BASE64_HEADER_FRAGMENTS: &[(&str, &str)] = &[
    ("TVqQ", "Windows executable"),
    ("f0VMRg", "ELF executable"),
    ("UEsDB", "ZIP archive"),
];

/// Markers indicating embedded scripting or auto-execution directives
/// in document formats.
const DOCUMENT_MACRO_MARKERS: &[&str] = &[
    "autoopen",
    "auto_open",
    "document_open",
    "workbook_open",
    "shell(",
    "createobject(",
    "/openaction",
    "/javascript",
    "/launch",
];

/// Extensions treated as plain text for content inspection.
const TEXT_EXTENSIONS: &[&str] = &["txt", "csv", "md", "log", "json", "html", "htm", "xml"];

/// Extensions treated as documents with potential embedded logic.
const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docm", "docx", "xls", "xlsm", "xlsx", "ppt", "pptm", "pptx", "rtf",
];

/// Runs every heuristic against the candidate file and collects all
/// matching pattern descriptions.
pub(crate) fn check(file: &CandidateFile) -> Vec<String> {
    let mut threats = Vec::new();

    let name_lower = file.name.to_ascii_lowercase();
    for token in SUSPICIOUS_NAME_TOKENS {
        if name_lower.contains(token) {
            threats.push(format!("Suspicious filename pattern '{}'", token));
        }
    }

    if is_text_like(file) {
        let text = file.text();
        let text_lower = text.to_ascii_lowercase();

        for marker in SCRIPT_MARKERS {
            if text_lower.contains(marker) {
                threats.push(format!("Embedded script marker '{}' in text file", marker));
            }
        }

        for (fragment, format) in BASE64_HEADER_FRAGMENTS {
            if text.contains(fragment) {
                threats.push(format!(
                    "Base64-encoded {} header in text file",
                    format
                ));
            }
        }
    }

    if is_document_like(file) {
        let text_lower = file.text().to_ascii_lowercase();
        for marker in DOCUMENT_MACRO_MARKERS {
            if text_lower.contains(marker) {
                threats.push(format!(
                    "Embedded macro or auto-execution marker '{}' in document",
                    marker
                ));
            }
        }
    }

    threats
}

/// Returns `true` if the MIME type or extension indicates plain text.
fn is_text_like(file: &CandidateFile) -> bool {
    if let Some(mime) = file.declared_mime_type.as_deref() {
        if mime.starts_with("text/") || mime == "application/json" {
            return true;
        }
    }
    file.extension()
        .map(|ext| TEXT_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Returns `true` if the MIME type or extension indicates a document
/// format that can carry embedded logic.
fn is_document_like(file: &CandidateFile) -> bool {
    if let Some(mime) = file.declared_mime_type.as_deref() {
        if mime == "application/pdf"
            || mime == "application/msword"
            || mime.starts_with("application/vnd.ms-")
            || mime.starts_with("application/vnd.openxmlformats-officedocument")
        {
            return true;
        }
    }
    file.extension()
        .map(|ext| DOCUMENT_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}
