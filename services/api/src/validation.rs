//! Input validation utilities

use regex::Regex;
use rust_decimal::Decimal;
use std::sync::OnceLock;

use crate::models::label::LabelInput;

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Normalize an email address by lower-casing its domain part
///
/// The local part is left untouched; only the domain is
/// case-insensitive per RFC 5321.
pub fn normalize_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 5 {
        return Err("Password must be at least 5 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate a display name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }

    if name.len() > 255 {
        return Err("Name must be at most 255 characters long".to_string());
    }

    Ok(())
}

/// Validate a list of `{name}` labels from a recipe payload
pub fn validate_labels(labels: &[LabelInput]) -> Result<(), String> {
    for label in labels {
        if label.name.trim().is_empty() {
            return Err("Must be a list of objects with a non-empty 'name'.".to_string());
        }

        if label.name.len() > 255 {
            return Err("Names must be at most 255 characters long".to_string());
        }
    }

    Ok(())
}

/// Validate a recipe price
///
/// The price column is NUMERIC(5,2); anything outside that range has
/// to be rejected here so the client sees a field error instead of a
/// numeric overflow from the database.
pub fn validate_price(price: Decimal) -> Result<(), String> {
    if price.is_sign_negative() {
        return Err("Ensure this value is greater than or equal to 0.".to_string());
    }

    if price.normalize().scale() > 2 {
        return Err("Ensure that there are no more than 2 decimal places.".to_string());
    }

    if price > Decimal::new(99_999, 2) {
        return Err("Ensure that there are no more than 5 digits in total.".to_string());
    }

    Ok(())
}

/// Validate that a text field fits its column
pub fn validate_max_chars(value: &str, max_chars: usize) -> Result<(), String> {
    if value.chars().count() > max_chars {
        return Err(format!(
            "Ensure this field has no more than {} characters.",
            max_chars
        ));
    }

    Ok(())
}

/// Parse a comma separated list of IDs from a filter parameter
pub fn parse_id_csv(raw: &str) -> Result<Vec<i64>, String> {
    raw.split(',')
        .map(|token| {
            token
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("Invalid ID '{}' in filter.", token.trim()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_email() {
        assert!(validate_email("user@example.com").is_ok());
    }

    #[test]
    fn rejects_malformed_email() {
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("user@").is_err());
    }

    #[test]
    fn normalizes_email_domain_only() {
        assert_eq!(normalize_email("User@EXAMPLE.Com"), "User@example.com");
        assert_eq!(normalize_email("user@example.com"), "user@example.com");
    }

    #[test]
    fn rejects_short_password() {
        assert!(validate_password("abcd").is_err());
        assert!(validate_password("abcde").is_ok());
    }

    #[test]
    fn rejects_blank_name() {
        assert!(validate_name("   ").is_err());
        assert!(validate_name("Test User").is_ok());
    }

    #[test]
    fn rejects_label_with_empty_name() {
        let labels = vec![
            LabelInput {
                name: "Vegan".to_string(),
            },
            LabelInput {
                name: "  ".to_string(),
            },
        ];
        assert!(validate_labels(&labels).is_err());
        assert!(validate_labels(&labels[..1]).is_ok());
    }

    #[test]
    fn accepts_price_within_column_bounds() {
        assert!(validate_price(Decimal::new(250, 2)).is_ok());
        assert!(validate_price(Decimal::new(99_999, 2)).is_ok());
        assert!(validate_price(Decimal::ZERO).is_ok());
    }

    #[test]
    fn rejects_negative_price() {
        assert!(validate_price(Decimal::new(-100, 2)).is_err());
    }

    #[test]
    fn rejects_price_with_too_many_digits() {
        assert!(validate_price(Decimal::new(100_000, 2)).is_err());
        assert!(validate_price(Decimal::new(10_000, 0)).is_err());
    }

    #[test]
    fn rejects_price_with_too_many_decimal_places() {
        assert!(validate_price(Decimal::new(2_505, 3)).is_err());
        // Trailing zeros do not count against the scale
        assert!(validate_price(Decimal::new(2_500, 3)).is_ok());
    }

    #[test]
    fn enforces_character_limits() {
        assert!(validate_max_chars("short", 255).is_ok());
        assert!(validate_max_chars(&"x".repeat(255), 255).is_ok());
        assert!(validate_max_chars(&"x".repeat(256), 255).is_err());
    }

    #[test]
    fn parses_id_csv() {
        assert_eq!(parse_id_csv("1,2,3"), Ok(vec![1, 2, 3]));
        assert_eq!(parse_id_csv(" 4 , 5 "), Ok(vec![4, 5]));
    }

    #[test]
    fn rejects_non_numeric_id() {
        assert!(parse_id_csv("1,x,3").is_err());
        assert!(parse_id_csv("").is_err());
    }
}
