use crate::utils::error::{ClientError, Result};
use url::Url;

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ClientError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ClientError::InvalidConfigValue {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ClientError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(ClientError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_endpoint_path(field_name: &str, path: &str) -> Result<()> {
    if !path.starts_with('/') {
        return Err(ClientError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path must start with '/'".to_string(),
        });
    }
    if path.contains(char::is_whitespace) {
        return Err(ClientError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot contain whitespace".to_string(),
        });
    }
    Ok(())
}

/// 表單欄位必填檢查（使用者輸入，非設定檔）
pub fn require_field(label: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ClientError::validation(format!("{} is required.", label)));
    }
    Ok(())
}

pub fn validate_new_password(password: &str, confirm: &str) -> Result<()> {
    if password != confirm {
        return Err(ClientError::validation("Passwords do not match"));
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ClientError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("backend.base_url", "https://example.com").is_ok());
        assert!(validate_url("backend.base_url", "http://localhost:8000").is_ok());
        assert!(validate_url("backend.base_url", "").is_err());
        assert!(validate_url("backend.base_url", "invalid-url").is_err());
        assert!(validate_url("backend.base_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("backend.timeout_seconds", 5, 1).is_ok());
        assert!(validate_positive_number("backend.timeout_seconds", 0, 1).is_err());
    }

    #[test]
    fn test_validate_endpoint_path() {
        assert!(validate_endpoint_path("path", "/courses/delete/{id}").is_ok());
        assert!(validate_endpoint_path("path", "courses/delete").is_err());
        assert!(validate_endpoint_path("path", "/courses/ delete").is_err());
    }

    #[test]
    fn test_validate_new_password() {
        assert!(validate_new_password("longenough", "longenough").is_ok());

        let mismatch = validate_new_password("longenough", "different1").unwrap_err();
        assert_eq!(mismatch.user_friendly_message(), "Passwords do not match");

        let short = validate_new_password("short", "short").unwrap_err();
        assert!(matches!(short, ClientError::Validation { .. }));
    }

    #[test]
    fn test_require_field() {
        assert!(require_field("Course name", "Algorithms").is_ok());
        assert!(require_field("Course name", "   ").is_err());
    }
}
