//! Conversion between user-entered decimal text and raw token units

use ethers::types::U256;
use ethers::utils::{format_units, parse_units};
use super::errors::{DappError, Result};

/// Parse decimal text into the token's smallest unit.
///
/// Blank input means "nothing entered" and yields `None`. Anything that is not a
/// plain non-negative decimal with at most `decimals` fractional digits is an error.
pub fn parse_amount(text: &str, decimals: u8) -> Result<Option<U256>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let (whole, frac) = match trimmed.split_once('.') {
        Some((w, f)) => (w, f),
        None => (trimmed, ""),
    };

    let digits_only = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !digits_only(whole) || !digits_only(frac) {
        return Err(DappError::InvalidAmount(format!("'{}' is not a number", trimmed)));
    }
    if frac.len() > decimals as usize {
        return Err(DappError::InvalidAmount(format!(
            "too many decimal places (max {})",
            decimals
        )));
    }

    let normalized = match (whole.is_empty(), frac.is_empty()) {
        (true, _) => format!("0.{}", frac),
        (false, true) => whole.to_string(),
        (false, false) => format!("{}.{}", whole, frac),
    };

    let parsed = parse_units(normalized, decimals as u32)
        .map_err(|e| DappError::InvalidAmount(e.to_string()))?;

    Ok(Some(parsed.into()))
}

/// Format raw units as decimal text without trailing zeros
pub fn format_amount(amount: U256, decimals: u8) -> String {
    match format_units(amount, decimals as u32) {
        Ok(s) => trim_fraction(&s),
        Err(_) => amount.to_string(),
    }
}

/// Format for display, keeping at most `places` fractional digits (truncated)
pub fn format_amount_short(amount: U256, decimals: u8, places: usize) -> String {
    let full = format_amount(amount, decimals);
    match full.split_once('.') {
        Some((whole, frac)) if frac.len() > places => {
            trim_fraction(&format!("{}.{}", whole, &frac[..places]))
        }
        _ => full,
    }
}

fn trim_fraction(s: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blank_is_none() {
        assert_eq!(parse_amount("", 18).unwrap(), None);
        assert_eq!(parse_amount("   ", 6).unwrap(), None);
    }

    #[test]
    fn test_parse_decimals() {
        assert_eq!(parse_amount("1.5", 6).unwrap(), Some(U256::from(1_500_000u64)));
        assert_eq!(parse_amount(".25", 2).unwrap(), Some(U256::from(25u64)));
        assert_eq!(parse_amount("3.", 8).unwrap(), Some(U256::from(300_000_000u64)));
        assert_eq!(
            parse_amount("1", 18).unwrap(),
            Some(U256::exp10(18))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_amount("abc", 18).is_err());
        assert!(parse_amount("1.2.3", 18).is_err());
        assert!(parse_amount("-1", 18).is_err());
        assert!(parse_amount(".", 18).is_err());
        assert!(parse_amount("0.1234567", 6).is_err());
    }

    #[test]
    fn test_format_trims_zeros() {
        assert_eq!(format_amount(U256::from(1_500_000u64), 6), "1.5");
        assert_eq!(format_amount(U256::exp10(18) * 2, 18), "2");
        assert_eq!(format_amount(U256::from(1u64), 8), "0.00000001");
    }

    #[test]
    fn test_format_short_truncates() {
        assert_eq!(format_amount_short(U256::from(123_456_789u64), 8, 4), "1.2345");
        assert_eq!(format_amount_short(U256::from(100_000_000u64), 8, 4), "1");
    }
}
