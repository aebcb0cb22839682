//! Conversion between display amounts and on-chain base units.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::SolError;

/// Decimals of the native coin (1 SOL = 10^9 lamports).
pub const NATIVE_DECIMALS: u8 = 9;

/// Lamports per SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Scale a display amount to base units.
///
/// Digits finer than one base unit are truncated toward zero. Fails with
/// `NonPositiveAmount` for amounts `<= 0` (and for positive amounts too
/// small to be worth a single base unit), and with `AmountOverflow` when
/// the result does not fit in a `u64`.
pub fn to_base_units(amount: Decimal, decimals: u8) -> Result<u64, SolError> {
    if amount <= Decimal::ZERO {
        return Err(SolError::NonPositiveAmount);
    }

    let factor = 10u64
        .checked_pow(u32::from(decimals))
        .ok_or(SolError::AmountOverflow { decimals })?;

    let base_units = amount
        .checked_mul(Decimal::from(factor))
        .and_then(|scaled| scaled.trunc().to_u64())
        .ok_or(SolError::AmountOverflow { decimals })?;

    if base_units == 0 {
        return Err(SolError::NonPositiveAmount);
    }
    Ok(base_units)
}

/// Convert base units back to a display amount.
///
/// `decimals` above 28 (the `Decimal` scale limit) are clamped.
pub fn from_base_units(base_units: u64, decimals: u8) -> Decimal {
    let scale = u32::from(decimals).min(28);
    Decimal::from_i128_with_scale(i128::from(base_units), scale).normalize()
}

/// Lamports to SOL.
pub fn lamports_to_sol(lamports: u64) -> Decimal {
    from_base_units(lamports, NATIVE_DECIMALS)
}

/// SOL to lamports.
pub fn sol_to_lamports(sol: Decimal) -> Result<u64, SolError> {
    to_base_units(sol, NATIVE_DECIMALS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn one_and_a_half_sol() {
        assert_eq!(sol_to_lamports(dec("1.5")).unwrap(), 1_500_000_000);
    }

    #[test]
    fn token_amount_with_six_decimals() {
        assert_eq!(to_base_units(dec("10.25"), 6).unwrap(), 10_250_000);
    }

    #[test]
    fn zero_is_rejected() {
        assert!(matches!(
            to_base_units(Decimal::ZERO, 9),
            Err(SolError::NonPositiveAmount)
        ));
    }

    #[test]
    fn negative_is_rejected() {
        assert!(matches!(
            to_base_units(dec("-1"), 6),
            Err(SolError::NonPositiveAmount)
        ));
    }

    #[test]
    fn dust_below_one_base_unit_is_rejected() {
        assert!(matches!(
            to_base_units(dec("0.0000001"), 6),
            Err(SolError::NonPositiveAmount)
        ));
    }

    #[test]
    fn excess_precision_is_truncated() {
        assert_eq!(to_base_units(dec("1.0000019"), 6).unwrap(), 1_000_001);
    }

    #[test]
    fn overflow_is_detected() {
        // u64::MAX lamports is about 18.4 billion SOL.
        let err = sol_to_lamports(dec("18446744074")).unwrap_err();
        assert!(matches!(err, SolError::AmountOverflow { decimals: 9 }));
    }

    #[test]
    fn largest_representable_amount_passes() {
        assert_eq!(
            sol_to_lamports(dec("18446744073.709551615")).unwrap(),
            u64::MAX
        );
    }

    #[test]
    fn absurd_decimals_overflow() {
        assert!(matches!(
            to_base_units(dec("1"), 20),
            Err(SolError::AmountOverflow { decimals: 20 })
        ));
    }

    #[test]
    fn base_units_to_display() {
        assert_eq!(lamports_to_sol(1_500_000_000), dec("1.5"));
        assert_eq!(from_base_units(10_250_000, 6), dec("10.25"));
        assert_eq!(from_base_units(0, 6), Decimal::ZERO);
        assert_eq!(from_base_units(1, 6).to_string(), "0.000001");
    }
}
