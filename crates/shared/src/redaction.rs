//! Secret detection for log-field redaction.
//!
//! The JSON logger redacts values whose field names look secret-bearing so
//! host applications can log config and environment snapshots safely.

/// The redacted placeholder string.
pub const REDACTED: &str = "[REDACTED]";

/// Checks if a key/variable name likely refers to a secret.
///
/// Uses case-insensitive pattern matching to detect common secret-related
/// naming conventions.
///
/// # Examples
///
/// ```
/// use code_intake_shared::is_secret_key;
///
/// assert!(is_secret_key("API_KEY"));
/// assert!(is_secret_key("password"));
/// assert!(!is_secret_key("LOG_LEVEL"));
/// ```
pub fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_uppercase();
    key.contains("KEY")
        || key.contains("TOKEN")
        || key.contains("SECRET")
        || key.contains("PASSWORD")
        || key.contains("CREDENTIAL")
        || key.contains("AUTH")
}

/// Redacts a value if the key is likely a secret.
///
/// Returns [`REDACTED`] for secret keys, or the original value otherwise.
pub fn redact_if_secret(key: &str, value: &str) -> String {
    if is_secret_key(key) {
        REDACTED.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_common_secret_names() {
        assert!(is_secret_key("api_key"));
        assert!(is_secret_key("AUTH_TOKEN"));
        assert!(is_secret_key("DbPassword"));
        assert!(!is_secret_key("ignore_file_name"));
        assert!(!is_secret_key("max_files"));
    }

    #[test]
    fn redacts_only_secret_values() {
        assert_eq!(redact_if_secret("API_KEY", "sk-123"), REDACTED);
        assert_eq!(redact_if_secret("root", "/work/repo"), "/work/repo");
    }
}
