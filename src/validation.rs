//! Input checks shared by request payloads.

use crate::error::{AppError, AppResult};

pub fn username(value: &str) -> AppResult<()> {
    let len = value.chars().count();
    if !(3..=30).contains(&len) {
        return Err(AppError::validation("username must be 3 to 30 characters"));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AppError::validation(
            "username may only contain letters, digits, '_' and '-'",
        ));
    }
    Ok(())
}

pub fn email(value: &str) -> AppResult<()> {
    let trimmed = value.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(AppError::validation("email address is invalid")),
    }
}

pub fn password(value: &str) -> AppResult<()> {
    if value.chars().count() < 8 {
        return Err(AppError::validation("password must be at least 8 characters"));
    }
    Ok(())
}

pub fn required(field: &str, value: &str, max: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    max_len(field, value, max)
}

pub fn max_len(field: &str, value: &str, max: usize) -> AppResult<()> {
    if value.chars().count() > max {
        return Err(AppError::validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

pub fn url(field: &str, value: &str) -> AppResult<()> {
    if value.starts_with("https://") || value.starts_with("http://") || value.starts_with('/') {
        Ok(())
    } else {
        Err(AppError::validation(format!("{} must be an http(s) URL", field)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames() {
        assert!(username("dj_sam-2").is_ok());
        assert!(username("ab").is_err());
        assert!(username("has space").is_err());
        assert!(username(&"x".repeat(31)).is_err());
    }

    #[test]
    fn emails() {
        assert!(email("host@station.fm").is_ok());
        assert!(email("no-at-sign").is_err());
        assert!(email("@station.fm").is_err());
        assert!(email("host@localhost").is_err());
    }

    #[test]
    fn passwords() {
        assert!(password("12345678").is_ok());
        assert!(password("short").is_err());
    }

    #[test]
    fn required_fields() {
        assert!(required("title", "   ", 10).is_err());
        assert!(required("title", "On Air", 10).is_ok());
        assert!(required("title", "On Air Tonight", 10).is_err());
    }

    #[test]
    fn urls() {
        assert!(url("link", "https://sponsor.example").is_ok());
        assert!(url("link", "/shows/morning").is_ok());
        assert!(url("link", "javascript:alert(1)").is_err());
    }
}
