//! Client-side input validation.
//!
//! Everything here runs before a call is issued. A rejected input never
//! reaches the gateway and never touches a tracker.

use crate::{Error, Result};

/// Length of a Sayad cheque identifier.
pub const SAYAD_ID_LEN: usize = 16;

/// Length of a national identification code.
pub const NATIONAL_ID_LEN: usize = 10;

/// Longest account number the gateway accepts.
pub const MAX_ACCOUNT_NUMBER_LEN: usize = 26;

fn exact_digits(field: &str, value: &str, len: usize) -> Result<()> {
    if value.len() != len || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::validation_field(
            field,
            format!("must be exactly {len} digits"),
        ));
    }
    Ok(())
}

/// Checks a 16-digit Sayad id.
pub fn validate_sayad_id(value: &str) -> Result<()> {
    exact_digits("sayad_id", value, SAYAD_ID_LEN)
}

/// Checks a 10-digit national id.
pub fn validate_national_id(value: &str) -> Result<()> {
    exact_digits("national_id", value, NATIONAL_ID_LEN)
}

/// Checks an account number (1 to 26 digits).
pub fn validate_account_number(value: &str) -> Result<()> {
    if value.is_empty()
        || value.len() > MAX_ACCOUNT_NUMBER_LEN
        || !value.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(Error::validation_field(
            "account_number",
            format!("must be 1 to {MAX_ACCOUNT_NUMBER_LEN} digits"),
        ));
    }
    Ok(())
}

/// Checks that a field is not blank.
pub fn validate_not_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation_field(field, "must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sayad_id() {
        assert!(validate_sayad_id("1234567890123456").is_ok());
        assert!(validate_sayad_id("123456789012345").is_err());
        assert!(validate_sayad_id("12345678901234567").is_err());
        assert!(validate_sayad_id("12345678901234ab").is_err());
    }

    #[test]
    fn test_sayad_id_rejects_non_ascii_digits() {
        // Persian digits have the right char count but are not accepted.
        assert!(validate_sayad_id("۱۲۳۴۵۶۷۸۹۰۱۲۳۴۵۶").is_err());
    }

    #[test]
    fn test_national_id() {
        assert!(validate_national_id("0012345678").is_ok());
        assert!(validate_national_id("12345").is_err());
    }

    #[test]
    fn test_account_number() {
        assert!(validate_account_number("1").is_ok());
        assert!(validate_account_number("01234567890123456789012345").is_ok());
        assert!(validate_account_number("").is_err());
        assert!(validate_account_number("012345678901234567890123456").is_err());
        assert!(validate_account_number("12-34").is_err());
    }

    #[test]
    fn test_error_names_field() {
        let Err(Error::Validation { field, .. }) = validate_national_id("x") else {
            unreachable!("Expected Validation error");
        };
        assert_eq!(field.as_deref(), Some("national_id"));
    }

    #[test]
    fn test_not_blank() {
        assert!(validate_not_blank("file_name", "front.jpg").is_ok());
        assert!(validate_not_blank("file_name", "   ").is_err());
    }
}
