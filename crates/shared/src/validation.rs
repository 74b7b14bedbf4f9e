//! Common validation utilities.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Maximum length of a setting key.
pub const MAX_SETTING_KEY_LENGTH: usize = 128;

/// Maximum length of a content element id.
pub const MAX_ELEMENT_ID_LENGTH: usize = 100;

/// Element ids that collide with literal segments of the content routes.
pub const RESERVED_ELEMENT_IDS: [&str; 1] = ["versions"];

/// Maximum length of a stored file name.
pub const MAX_FILENAME_LENGTH: usize = 200;

lazy_static! {
    static ref SETTING_KEY_REGEX: Regex = Regex::new(r"^[a-z][a-z0-9_.]*$").unwrap();
    static ref ELEMENT_ID_REGEX: Regex = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").unwrap();
}

/// Validates a setting key: lowercase, starts with a letter, `[a-z0-9_.]` only.
pub fn validate_setting_key(key: &str) -> Result<(), ValidationError> {
    if key.is_empty() || key.len() > MAX_SETTING_KEY_LENGTH {
        let mut err = ValidationError::new("setting_key_length");
        err.message = Some(
            format!(
                "Setting key must be between 1 and {} characters",
                MAX_SETTING_KEY_LENGTH
            )
            .into(),
        );
        return Err(err);
    }
    if !SETTING_KEY_REGEX.is_match(key) {
        let mut err = ValidationError::new("setting_key_format");
        err.message = Some(
            "Setting key must start with a lowercase letter and contain only a-z, 0-9, '_' or '.'"
                .into(),
        );
        return Err(err);
    }
    Ok(())
}

/// Validates a content element id: alphanumerics, '-' and '_', and not reserved.
pub fn validate_element_id(element_id: &str) -> Result<(), ValidationError> {
    if element_id.is_empty() || element_id.len() > MAX_ELEMENT_ID_LENGTH {
        let mut err = ValidationError::new("element_id_length");
        err.message = Some(
            format!(
                "Element id must be between 1 and {} characters",
                MAX_ELEMENT_ID_LENGTH
            )
            .into(),
        );
        return Err(err);
    }
    if !ELEMENT_ID_REGEX.is_match(element_id) {
        let mut err = ValidationError::new("element_id_format");
        err.message =
            Some("Element id may only contain letters, digits, '-' and '_'".into());
        return Err(err);
    }
    if RESERVED_ELEMENT_IDS.contains(&element_id) {
        let mut err = ValidationError::new("element_id_reserved");
        err.message = Some(format!("Element id '{}' is reserved", element_id).into());
        return Err(err);
    }
    Ok(())
}

/// Reduces an uploaded file name to a safe basename.
///
/// Path components are dropped, anything outside `[A-Za-z0-9._-]` becomes
/// `_`, leading dots are stripped and the result is truncated. Returns
/// `"file"` if nothing usable is left.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    let mut result: String = trimmed.chars().take(MAX_FILENAME_LENGTH).collect();
    if result.is_empty() || result.chars().all(|c| c == '_') {
        result = "file".to_string();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_setting_key() {
        assert!(validate_setting_key("products_per_page").is_ok());
        assert!(validate_setting_key("store.currency").is_ok());
        assert!(validate_setting_key("").is_err());
        assert!(validate_setting_key("Products").is_err());
        assert!(validate_setting_key("1abc").is_err());
        assert!(validate_setting_key("has space").is_err());
    }

    #[test]
    fn test_validate_setting_key_too_long() {
        let key = "a".repeat(MAX_SETTING_KEY_LENGTH + 1);
        let err = validate_setting_key(&key).unwrap_err();
        assert_eq!(err.code, "setting_key_length");
    }

    #[test]
    fn test_validate_element_id() {
        assert!(validate_element_id("hero").is_ok());
        assert!(validate_element_id("home-banner_2").is_ok());
        assert!(validate_element_id("-leading").is_err());
        assert!(validate_element_id("../etc").is_err());
        assert!(validate_element_id("").is_err());
    }

    #[test]
    fn test_validate_element_id_reserved() {
        let err = validate_element_id("versions").unwrap_err();
        assert_eq!(err.code, "element_id_reserved");
        assert_eq!(err.message.unwrap().to_string(), "Element id 'versions' is reserved");
        assert!(validate_element_id("versions-archive").is_ok());
    }

    #[test]
    fn test_validate_element_id_error_message() {
        let err = validate_element_id("a b").unwrap_err();
        assert_eq!(
            err.message.unwrap().to_string(),
            "Element id may only contain letters, digits, '-' and '_'"
        );
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("photo.jpg"), "photo.jpg");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\cat pic.png"), "cat_pic.png");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename("///"), "file");
    }
}
