//! Fixed-point decimal scalar used for every price, size, fee and PnL value
//! in the trading fabric.
//!
//! `Decimal` wraps a signed 64-bit mantissa with an implicit scale of 10^8
//! (eight fractional digits). Every arithmetic operation preserves that
//! scale; floating point only ever appears at the edges (`from_f64`/
//! `to_f64`), and every such conversion is lossy and explicit.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Number of fractional digits carried by every `Decimal`.
pub const PRECISION: u32 = 8;

/// Implicit scale factor: `1` unit of mantissa represents `1 / SCALE`.
pub const SCALE: i64 = 100_000_000;

/// A fixed-point signed decimal with eight fractional digits.
///
/// Internally this is a single `i64` mantissa scaled by [`SCALE`]. All
/// arithmetic saturates at `i64::MIN`/`i64::MAX` rather than silently
/// wrapping, so a value that overflows is still observable (as a clamped
/// extreme) rather than corrupted.
#[derive(Debug, Clone, Copy, Default, Hash, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Decimal {
    mantissa: i64,
}

impl Decimal {
    /// The additive identity.
    pub const ZERO: Decimal = Decimal { mantissa: 0 };

    /// The multiplicative identity.
    pub const ONE: Decimal = Decimal { mantissa: SCALE };

    /// Build a `Decimal` directly from a raw mantissa (already scaled by
    /// [`SCALE`]). Prefer [`Decimal::from_i64`]/[`Decimal::from_f64`]/
    /// [`FromStr`] unless you are constructing a known scaled constant.
    pub const fn from_mantissa(mantissa: i64) -> Self {
        Decimal { mantissa }
    }

    /// The raw scaled mantissa backing this value.
    pub const fn mantissa(&self) -> i64 {
        self.mantissa
    }

    /// `Decimal::ZERO`, as a function for call sites that prefer it.
    pub const fn zero() -> Self {
        Self::ZERO
    }

    /// `Decimal::ONE`, as a function for call sites that prefer it.
    pub const fn one() -> Self {
        Self::ONE
    }

    /// Build a `Decimal` from an integer value.
    pub fn from_i64(value: i64) -> Self {
        Decimal {
            mantissa: value.saturating_mul(SCALE),
        }
    }

    /// Build a `Decimal` from a double, rounding to the nearest representable
    /// value at [`SCALE`]. Lossy: NaN and infinities collapse to zero.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Decimal::ZERO;
        }
        let scaled = value * SCALE as f64;
        let rounded = scaled.round();
        if rounded >= i64::MAX as f64 {
            return Decimal::from_mantissa(i64::MAX);
        }
        if rounded <= i64::MIN as f64 {
            return Decimal::from_mantissa(i64::MIN);
        }
        Decimal {
            mantissa: rounded as i64,
        }
    }

    /// Lossy conversion back to `f64`, for adapter/UI boundaries only.
    pub fn to_f64(&self) -> f64 {
        self.mantissa as f64 / SCALE as f64
    }

    /// `true` if the value is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    /// `true` if the value is strictly positive.
    pub fn is_positive(&self) -> bool {
        self.mantissa > 0
    }

    /// `true` if the value is strictly negative.
    pub fn is_negative(&self) -> bool {
        self.mantissa < 0
    }

    /// Absolute value.
    pub fn abs(&self) -> Self {
        Decimal {
            mantissa: self.mantissa.saturating_abs(),
        }
    }

    /// Checked addition; `None` on mantissa overflow.
    pub fn checked_add(&self, other: Decimal) -> Option<Self> {
        self.mantissa
            .checked_add(other.mantissa)
            .map(Decimal::from_mantissa)
    }

    /// Checked subtraction; `None` on mantissa overflow.
    pub fn checked_sub(&self, other: Decimal) -> Option<Self> {
        self.mantissa
            .checked_sub(other.mantissa)
            .map(Decimal::from_mantissa)
    }

    /// Checked multiplication: the mantissa product is computed in `i128`
    /// then divided back down by [`SCALE`], so intermediate overflow only
    /// matters if the *result* itself cannot fit in an `i64`.
    pub fn checked_mul(&self, other: Decimal) -> Option<Self> {
        let product = (self.mantissa as i128) * (other.mantissa as i128) / (SCALE as i128);
        if product > i64::MAX as i128 || product < i64::MIN as i128 {
            None
        } else {
            Some(Decimal::from_mantissa(product as i64))
        }
    }

    /// Checked division: the numerator is pre-scaled by [`SCALE`] in `i128`
    /// before dividing by the denominator's mantissa. `None` on division by
    /// zero or on overflow of the result.
    pub fn checked_div(&self, other: Decimal) -> Option<Self> {
        if other.mantissa == 0 {
            return None;
        }
        let numerator = (self.mantissa as i128) * (SCALE as i128);
        let quotient = numerator / (other.mantissa as i128);
        if quotient > i64::MAX as i128 || quotient < i64::MIN as i128 {
            None
        } else {
            Some(Decimal::from_mantissa(quotient as i64))
        }
    }
}

impl std::ops::Add for Decimal {
    type Output = Decimal;
    fn add(self, rhs: Decimal) -> Decimal {
        self.checked_add(rhs)
            .unwrap_or(if rhs.mantissa > 0 { Decimal::from_mantissa(i64::MAX) } else { Decimal::from_mantissa(i64::MIN) })
    }
}

impl std::ops::Sub for Decimal {
    type Output = Decimal;
    fn sub(self, rhs: Decimal) -> Decimal {
        self.checked_sub(rhs)
            .unwrap_or(if rhs.mantissa > 0 { Decimal::from_mantissa(i64::MIN) } else { Decimal::from_mantissa(i64::MAX) })
    }
}

impl std::ops::Mul for Decimal {
    type Output = Decimal;
    fn mul(self, rhs: Decimal) -> Decimal {
        self.checked_mul(rhs).unwrap_or_else(|| {
            let negative = (self.mantissa < 0) != (rhs.mantissa < 0);
            Decimal::from_mantissa(if negative { i64::MIN } else { i64::MAX })
        })
    }
}

impl std::ops::Div for Decimal {
    type Output = Decimal;
    fn div(self, rhs: Decimal) -> Decimal {
        self.checked_div(rhs).unwrap_or(Decimal::ZERO)
    }
}

impl std::ops::Neg for Decimal {
    type Output = Decimal;
    fn neg(self) -> Decimal {
        Decimal {
            mantissa: self.mantissa.saturating_neg(),
        }
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.mantissa.cmp(&other.mantissa)
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let negative = self.mantissa < 0;
        let abs = self.mantissa.unsigned_abs();
        let int_part = abs / SCALE as u64;
        let frac_part = abs % SCALE as u64;

        if frac_part == 0 {
            if negative {
                write!(f, "-{int_part}")
            } else {
                write!(f, "{int_part}")
            }
        } else {
            let mut frac_str = format!("{frac_part:0width$}", width = PRECISION as usize);
            while frac_str.ends_with('0') {
                frac_str.pop();
            }
            if negative {
                write!(f, "-{int_part}.{frac_str}")
            } else {
                write!(f, "{int_part}.{frac_str}")
            }
        }
    }
}

/// Parses a decimal string of the form `-?[0-9]*(\.[0-9]*)?`.
///
/// A leading `-` flips the sign of the final mantissa. Fractional digits
/// past [`PRECISION`] are truncated (not rounded); missing fractional digits
/// are zero-padded. Any non-numeric input (empty string, garbage) parses as
/// zero rather than failing, matching the original SDK's `from_string`.
impl FromStr for Decimal {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Decimal::parse_lenient(s))
    }
}

impl Decimal {
    /// Lenient parse used by [`FromStr`]; never fails, defaulting to zero.
    pub fn parse_lenient(s: &str) -> Decimal {
        let s = s.trim();
        let (negative, rest) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        let (int_part, frac_part) = match rest.split_once('.') {
            Some((i, f)) => (i, f),
            None => (rest, ""),
        };

        let int_val: i64 = int_part.parse().unwrap_or(0);

        let mut frac_digits: String = frac_part.chars().take(PRECISION as usize).collect();
        if !frac_digits.chars().all(|c| c.is_ascii_digit()) {
            frac_digits.clear();
        }
        while frac_digits.len() < PRECISION as usize {
            frac_digits.push('0');
        }
        let frac_val: i64 = frac_digits.parse().unwrap_or(0);

        let magnitude = int_val.saturating_mul(SCALE).saturating_add(frac_val);
        Decimal::from_mantissa(if negative { -magnitude } else { magnitude })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sub_roundtrip() {
        let a = Decimal::from_f64(100.5);
        let b = Decimal::from_f64(50.25);
        assert!(((a + b) - b).to_f64() - a.to_f64() < 1e-9);
    }

    #[test]
    fn mul_identity_and_zero() {
        let a = Decimal::from_f64(42.5);
        assert_eq!(a * Decimal::ONE, a);
        assert_eq!(a * Decimal::ZERO, Decimal::ZERO);
    }

    #[test]
    fn arithmetic_matches_manual_values() {
        let a = Decimal::from_f64(100.5);
        let b = Decimal::from_f64(50.25);
        assert!((a + b).to_f64() - 150.75 < 1e-9);
        assert!((a - b).to_f64() - 50.25 < 1e-9);
        assert!((a * Decimal::from_i64(2)).to_f64() - 201.0 < 1e-9);
        assert!((a / Decimal::from_i64(2)).to_f64() - 50.25 < 1e-9);
    }

    #[test]
    fn parse_and_render_roundtrip() {
        let d: Decimal = "123.456".parse().unwrap();
        assert!((d.to_f64() - 123.456).abs() < 1e-6);
        assert_eq!(d.to_string(), "123.456");

        let neg: Decimal = "-99.99".parse().unwrap();
        assert!(neg.is_negative());
        assert_eq!(neg.to_string(), "-99.99");
    }

    #[test]
    fn parse_truncates_excess_fractional_digits() {
        let d: Decimal = "1.123456789".parse().unwrap();
        assert_eq!(d.mantissa(), 112345678);
    }

    #[test]
    fn parse_pads_missing_fractional_digits() {
        let d: Decimal = "1.5".parse().unwrap();
        assert_eq!(d.mantissa(), 150_000_000);
    }

    #[test]
    fn render_trims_trailing_zeros_and_dot() {
        assert_eq!(Decimal::from_i64(5).to_string(), "5");
        assert_eq!(Decimal::from_f64(5.50).to_string(), "5.5");
    }

    #[test]
    fn garbage_parses_as_zero() {
        let d: Decimal = "not-a-number".parse().unwrap();
        assert_eq!(d, Decimal::ZERO);
    }

    #[test]
    fn ordering_is_total_and_consistent() {
        let a = Decimal::from_i64(10);
        let b = Decimal::from_i64(20);
        assert!(a < b);
        assert!(b > a);
        assert!(a <= a);
        assert_eq!(a, a);
        assert_ne!(a, b);
        assert!(!(a >= b));
    }

    #[test]
    fn zero_and_one_constants() {
        assert!(Decimal::zero().is_zero());
        assert!((Decimal::one().to_f64() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn division_by_zero_does_not_panic() {
        assert_eq!(Decimal::from_i64(1) / Decimal::ZERO, Decimal::ZERO);
    }
}

