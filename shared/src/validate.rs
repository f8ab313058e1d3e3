//! Order number validation
//!
//! Order numbers are caller-assigned digit strings protected by a Luhn
//! check digit.

use thiserror::Error;

/// Order number validation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderNumberError {
    #[error("order number is empty")]
    Empty,

    #[error("order number contains non-digit character {0:?}")]
    NonDigit(char),

    #[error("order number {0} fails the Luhn check")]
    Checksum(String),
}

/// Validate an order number (digits only, Luhn checksum)
pub fn validate_order_number(number: &str) -> Result<(), OrderNumberError> {
    if number.is_empty() {
        return Err(OrderNumberError::Empty);
    }

    let mut sum = 0u32;
    // Walk from the check digit leftwards, doubling every second digit
    for (idx, ch) in number.chars().rev().enumerate() {
        let digit = ch.to_digit(10).ok_or(OrderNumberError::NonDigit(ch))?;
        sum += if idx % 2 == 1 {
            let doubled = digit * 2;
            if doubled > 9 { doubled - 9 } else { doubled }
        } else {
            digit
        };
    }

    if sum % 10 != 0 {
        return Err(OrderNumberError::Checksum(number.to_string()));
    }
    Ok(())
}

/// Convenience wrapper around [`validate_order_number`]
pub fn is_luhn_valid(number: &str) -> bool {
    validate_order_number(number).is_ok()
}
