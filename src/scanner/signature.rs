//! Known test-virus signature check.
//!
//! Stage one of the scanner: containment of the 68-byte EICAR
//! industry-standard antivirus test signature. Presence of the
//! signature anywhere in the decoded byte stream is sufficient for a
//! detection, regardless of the surrounding content; it is never
//! treated as a false positive.

/// The EICAR standard antivirus test string.
pub(crate) const EICAR_SIGNATURE: &str =
    r"X5O!P%@AP[4\PZX54(P^)7CC)7}$EICAR-STANDARD-ANTIVIRUS-TEST-FILE!$H+H*";

/// Threat name reported for an EICAR match.
pub(crate) const EICAR_THREAT_NAME: &str = "EICAR-Test-Signature (Test Virus)";

/// Returns the threat name if the decoded text contains the EICAR
/// test signature.
pub(crate) fn check(text: &str) -> Option<String> {
    if text.contains(EICAR_SIGNATURE) {
        Some(EICAR_THREAT_NAME.to_string())
    } else {
        None
    }
}
