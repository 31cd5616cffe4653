//! Minor-unit / display-unit conversion.
//!
//! Chain balances are integers in the asset's smallest unit; the wallet
//! surfaces them in display units according to the asset's decimal places.

use thiserror::Error;

/// Errors converting a display amount into minor units.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitsError {
    /// Empty or non-numeric input.
    #[error("Not a decimal number: {0:?}")]
    NotANumber(String),

    /// More fractional digits than the asset supports.
    #[error("Too many decimal places: {given} given, asset has {decimals}")]
    TooManyDecimals { given: usize, decimals: u32 },

    /// Amount does not fit in 128 bits of minor units.
    #[error("Amount overflows: {0}")]
    Overflow(String),
}

/// Format minor units as a decimal string, e.g. `12340000` at 4 decimals
/// becomes `"1234.0000"`.
pub fn format_units(raw: u128, decimals: u32) -> String {
    if decimals == 0 {
        return raw.to_string();
    }
    let digits = format!("{:0>width$}", raw, width = decimals as usize + 1);
    let split = digits.len() - decimals as usize;
    format!("{}.{}", &digits[..split], &digits[split..])
}

/// Convert minor units to a display-unit float.
///
/// Precision degrades for amounts beyond 2^53 minor units, same as any
/// float rendering of a chain balance.
pub fn to_display(raw: u128, decimals: u32) -> f64 {
    (raw as f64) / 10f64.powi(decimals as i32)
}

/// Parse a display-unit decimal string into minor units.
///
/// Accepts plain integers and `int.frac` forms. Rejects more fractional
/// digits than the asset has decimals rather than silently rounding.
pub fn parse_units(text: &str, decimals: u32) -> Result<u128, UnitsError> {
    let text = text.trim();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, f),
        None => (text, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(UnitsError::NotANumber(text.to_string()));
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(UnitsError::NotANumber(text.to_string()));
    }
    if frac_part.len() > decimals as usize {
        return Err(UnitsError::TooManyDecimals {
            given: frac_part.len(),
            decimals,
        });
    }

    let overflow = || UnitsError::Overflow(text.to_string());

    let int_value: u128 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().map_err(|_| overflow())?
    };

    let scale = 10u128.checked_pow(decimals).ok_or_else(|| overflow())?;
    let mut value = int_value.checked_mul(scale).ok_or_else(|| overflow())?;

    if !frac_part.is_empty() {
        let frac_scale = 10u128.pow(decimals - frac_part.len() as u32);
        let frac_value: u128 = frac_part.parse().map_err(|_| overflow())?;
        value = value
            .checked_add(frac_value * frac_scale)
            .ok_or_else(|| overflow())?;
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(12_340_000, 4), "1234.0000");
        assert_eq!(format_units(1, 4), "0.0001");
        assert_eq!(format_units(0, 4), "0.0000");
        assert_eq!(format_units(42, 0), "42");
    }

    #[test]
    fn test_to_display() {
        // Un solde brut de 12340000 avec 4 décimales vaut 1234.0
        assert_eq!(to_display(12_340_000, 4), 1234.0);
        assert_eq!(to_display(0, 4), 0.0);
        assert_eq!(to_display(1, 4), 0.0001);
    }

    #[test]
    fn test_parse_units_plain() {
        assert_eq!(parse_units("1234", 4), Ok(12_340_000));
        assert_eq!(parse_units("1234.0", 4), Ok(12_340_000));
        assert_eq!(parse_units("0.0001", 4), Ok(1));
        assert_eq!(parse_units(".5", 4), Ok(5_000));
        assert_eq!(parse_units("7.", 4), Ok(70_000));
        assert_eq!(parse_units("42", 0), Ok(42));
    }

    #[test]
    fn test_parse_units_rejects_garbage() {
        assert!(matches!(parse_units("", 4), Err(UnitsError::NotANumber(_))));
        assert!(matches!(parse_units(".", 4), Err(UnitsError::NotANumber(_))));
        assert!(matches!(
            parse_units("12a4", 4),
            Err(UnitsError::NotANumber(_))
        ));
        assert!(matches!(
            parse_units("-5", 4),
            Err(UnitsError::NotANumber(_))
        ));
        assert!(matches!(
            parse_units("1.2.3", 4),
            Err(UnitsError::NotANumber(_))
        ));
    }

    #[test]
    fn test_parse_units_excess_precision() {
        assert_eq!(
            parse_units("1.00001", 4),
            Err(UnitsError::TooManyDecimals {
                given: 5,
                decimals: 4
            })
        );
    }

    #[test]
    fn test_parse_units_overflow() {
        let huge = u128::MAX.to_string();
        assert!(matches!(
            parse_units(&huge, 4),
            Err(UnitsError::Overflow(_))
        ));
    }

    #[test]
    fn test_parse_format_roundtrip() {
        let raw = parse_units("1234.5678", 4).unwrap();
        assert_eq!(format_units(raw, 4), "1234.5678");
    }
}
