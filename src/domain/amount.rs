//! Conversion between human-entered amounts and base units
//!
//! The lending contract denominates loans in the loan token's base units
//! (18 decimals). Users type decimal text; conversion happens exactly once,
//! at action time, and display formatting scales back down.

use crate::domain::primitives::Wei;
use thiserror::Error;

/// Decimal places of the loan token
pub const LOAN_TOKEN_DECIMALS: u32 = 18;

const BASE: u128 = 10u128.pow(LOAN_TOKEN_DECIMALS);

/// Errors produced when parsing a user-entered amount
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("amount contains an invalid character: '{0}'")]
    InvalidCharacter(char),

    #[error("amount has more than {LOAN_TOKEN_DECIMALS} decimal places")]
    TooManyDecimals,

    #[error("amount must be greater than zero")]
    NotPositive,

    #[error("amount is too large")]
    TooLarge,
}

/// Parses decimal text like `"1.5"` into base units
///
/// Accepts an optional single decimal point with up to 18 fractional
/// digits. Zero and negative notations are rejected; loan amounts must be
/// strictly positive.
pub fn parse_amount(text: &str) -> Result<Wei, AmountError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }

    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((int, frac)) => {
            if frac.contains('.') {
                return Err(AmountError::InvalidCharacter('.'));
            }
            (int, frac)
        }
        None => (trimmed, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(AmountError::InvalidCharacter('.'));
    }
    if frac_part.len() as u32 > LOAN_TOKEN_DECIMALS {
        return Err(AmountError::TooManyDecimals);
    }

    let int_units = digits_to_u128(int_part)?
        .checked_mul(BASE)
        .ok_or(AmountError::TooLarge)?;

    let frac_units = if frac_part.is_empty() {
        0
    } else {
        let scale = 10u128.pow(LOAN_TOKEN_DECIMALS - frac_part.len() as u32);
        digits_to_u128(frac_part)?
            .checked_mul(scale)
            .ok_or(AmountError::TooLarge)?
    };

    let total = int_units.checked_add(frac_units).ok_or(AmountError::TooLarge)?;
    if total == 0 {
        return Err(AmountError::NotPositive);
    }
    Ok(Wei(total))
}

fn digits_to_u128(digits: &str) -> Result<u128, AmountError> {
    let mut value: u128 = 0;
    for ch in digits.chars() {
        let digit = ch.to_digit(10).ok_or(AmountError::InvalidCharacter(ch))? as u128;
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(digit))
            .ok_or(AmountError::TooLarge)?;
    }
    Ok(value)
}

/// Formats base units back into decimal text
///
/// Mirrors the wallet-library convention: at least one fractional digit is
/// always shown, so one whole token renders as `"1.0"`.
pub fn format_amount(amount: Wei) -> String {
    let int_part = amount.0 / BASE;
    let frac_part = amount.0 % BASE;

    let mut frac = format!("{:018}", frac_part);
    while frac.len() > 1 && frac.ends_with('0') {
        frac.pop();
    }
    format!("{}.{}", int_part, frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_tokens() {
        assert_eq!(parse_amount("1"), Ok(Wei(1_000_000_000_000_000_000)));
        assert_eq!(parse_amount("42"), Ok(Wei(42_000_000_000_000_000_000)));
    }

    #[test]
    fn parses_fractional_tokens() {
        assert_eq!(parse_amount("1.5"), Ok(Wei(1_500_000_000_000_000_000)));
        assert_eq!(parse_amount("0.000000000000000001"), Ok(Wei(1)));
        assert_eq!(parse_amount(".5"), Ok(Wei(500_000_000_000_000_000)));
        assert_eq!(parse_amount("2."), Ok(Wei(2_000_000_000_000_000_000)));
    }

    #[test]
    fn rejects_zero_and_empty() {
        assert_eq!(parse_amount("0"), Err(AmountError::NotPositive));
        assert_eq!(parse_amount("0.0"), Err(AmountError::NotPositive));
        assert_eq!(parse_amount(""), Err(AmountError::Empty));
        assert_eq!(parse_amount("   "), Err(AmountError::Empty));
        assert_eq!(parse_amount("."), Err(AmountError::InvalidCharacter('.')));
    }

    #[test]
    fn rejects_negative_and_garbage() {
        assert_eq!(parse_amount("-3"), Err(AmountError::InvalidCharacter('-')));
        assert_eq!(parse_amount("1x"), Err(AmountError::InvalidCharacter('x')));
        assert_eq!(parse_amount("1.2.3"), Err(AmountError::InvalidCharacter('.')));
    }

    #[test]
    fn rejects_excess_precision() {
        assert_eq!(
            parse_amount("0.0000000000000000001"),
            Err(AmountError::TooManyDecimals)
        );
    }

    #[test]
    fn rejects_overflow() {
        let huge = "9".repeat(60);
        assert_eq!(parse_amount(&huge), Err(AmountError::TooLarge));
    }

    #[test]
    fn formats_with_at_least_one_decimal() {
        assert_eq!(format_amount(Wei(1_000_000_000_000_000_000)), "1.0");
        assert_eq!(format_amount(Wei(1_230_000_000_000_000_000)), "1.23");
        assert_eq!(format_amount(Wei::ZERO), "0.0");
        assert_eq!(format_amount(Wei(1)), "0.000000000000000001");
    }

    #[test]
    fn parse_and_format_agree() {
        let wei = parse_amount("12.75").unwrap();
        assert_eq!(format_amount(wei), "12.75");
    }
}
