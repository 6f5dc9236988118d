//! Safety pre-filter: static, synchronous checks on size, extension,
//! and declared MIME type.
//!
//! The pre-filter runs before any network or scanning cost is paid.
//! It is pure: no I/O, no side effects. Rules are evaluated in a
//! fixed order and the first violation wins; reasons are never
//! aggregated.

use crate::core::{CandidateFile, SafetyVerdict};

/// File extensions rejected outright, regardless of declared MIME
/// type: binaries, shells, installers, and interpreted scripts.
const DENIED_EXTENSIONS: &[&str] = &[
    "exe", "dll", "com", "scr", "pif", "cpl", "msi", "msp", "jar", "apk", "app", "deb", "rpm",
    "bat", "cmd", "ps1", "psm1", "sh", "bash", "zsh", "csh", "vbs", "vbe", "js", "jse", "wsf",
    "wsh", "hta",
];

/// Declared MIME types accepted by the pre-filter: common image,
/// document, archive, and text types. An empty declaration is
/// tolerated and deferred to the scanner.
const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "application/zip",
    "application/x-7z-compressed",
    "application/x-rar-compressed",
    "application/gzip",
    "application/json",
    "text/plain",
    "text/csv",
    "text/markdown",
];

/// Synchronous pre-scan rejection based on size, extension, and
/// declared MIME type.
///
/// The size ceiling is caller-supplied because it depends on which
/// backend is active downstream: a database-backed store accepts a
/// smaller ceiling than an object-store backend.
///
/// # Examples
///
/// ```rust
/// use attachguard::core::CandidateFile;
/// use attachguard::prefilter::SafetyFilter;
///
/// let filter = SafetyFilter::new(10 * 1024 * 1024);
/// let file = CandidateFile::from_bytes("setup.exe", vec![0x4d, 0x5a]);
/// assert!(!filter.check(&file).safe);
/// ```
#[derive(Debug, Clone)]
pub struct SafetyFilter {
    /// Maximum accepted file size in bytes.
    max_file_size: u64,
}

impl SafetyFilter {
    /// Creates a filter with the given size ceiling in bytes.
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// Returns the active size ceiling in bytes.
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Checks a candidate file against every pre-filter rule.
    ///
    /// Rule order: size ceiling, extension deny-list, MIME allow-list.
    /// Returns the first violated rule's reason.
    pub fn check(&self, file: &CandidateFile) -> SafetyVerdict {
        if file.byte_size > self.max_file_size {
            return SafetyVerdict::rejected(format!(
                "file size {} bytes exceeds the {} byte limit",
                file.byte_size, self.max_file_size
            ));
        }

        if let Some(ext) = file.extension() {
            if DENIED_EXTENSIONS.contains(&ext.as_str()) {
                return SafetyVerdict::rejected(format!(
                    "file type '.{}' is not allowed for security reasons",
                    ext
                ));
            }
        }

        match file.declared_mime_type.as_deref() {
            // Browsers frequently omit the MIME type; the scanner
            // still inspects the content either way.
            None | Some("") => {}
            Some(mime) => {
                if !ALLOWED_MIME_TYPES.contains(&mime) {
                    return SafetyVerdict::rejected(format!(
                        "declared content type '{}' is not allowed",
                        mime
                    ));
                }
            }
        }

        SafetyVerdict::safe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> SafetyFilter {
        SafetyFilter::new(10 * 1024 * 1024)
    }

    #[test]
    fn test_denied_extension_wins_over_mime() {
        // A deny-listed extension is rejected even with an allowed
        // MIME type and a tiny size.
        let file =
            CandidateFile::from_bytes("invoice.exe", vec![1, 2, 3]).with_mime_type("image/png");
        let verdict = filter().check(&file);
        assert!(!verdict.safe);
        assert!(verdict.reason.unwrap().contains(".exe"));
    }

    #[test]
    fn test_denied_extension_case_insensitive() {
        let file = CandidateFile::from_bytes("Setup.EXE", vec![0]);
        assert!(!filter().check(&file).safe);
    }

    #[test]
    fn test_trailing_dot_does_not_bypass_deny_list() {
        // Windows strips trailing dots on save, so `tool.exe.` lands
        // on disk as `tool.exe`.
        let file = CandidateFile::from_bytes("tool.exe.", vec![0]);
        let verdict = filter().check(&file);
        assert!(!verdict.safe);
        assert!(verdict.reason.unwrap().contains(".exe"));
    }

    #[test]
    fn test_size_ceiling() {
        let filter = SafetyFilter::new(4);
        let file = CandidateFile::from_bytes("big.txt", vec![0u8; 5]);
        let verdict = filter.check(&file);
        assert!(!verdict.safe);
        assert!(verdict.reason.unwrap().contains("exceeds"));

        let file = CandidateFile::from_bytes("ok.txt", vec![0u8; 4]);
        assert!(filter.check(&file).safe);
    }

    #[test]
    fn test_size_checked_before_extension() {
        // First violated rule wins: an oversized .exe reports the
        // size reason, not the extension reason.
        let filter = SafetyFilter::new(1);
        let file = CandidateFile::from_bytes("tool.exe", vec![0u8; 2]);
        let verdict = filter.check(&file);
        assert!(verdict.reason.unwrap().contains("byte limit"));
    }

    #[test]
    fn test_unknown_mime_tolerated() {
        let file = CandidateFile::from_bytes("photo.jpg", vec![0xff, 0xd8]);
        assert!(filter().check(&file).safe);

        let file = CandidateFile::from_bytes("photo.jpg", vec![0xff, 0xd8]).with_mime_type("");
        assert!(filter().check(&file).safe);
    }

    #[test]
    fn test_disallowed_mime_rejected() {
        let file = CandidateFile::from_bytes("page.bin", vec![0])
            .with_mime_type("application/octet-stream");
        let verdict = filter().check(&file);
        assert!(!verdict.safe);
        assert!(verdict.reason.unwrap().contains("octet-stream"));
    }

    #[test]
    fn test_allowed_mime_passes() {
        let file = CandidateFile::from_bytes("doc.pdf", b"%PDF".to_vec())
            .with_mime_type("application/pdf");
        assert!(filter().check(&file).safe);
    }
}
