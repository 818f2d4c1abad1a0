use num_bigint::{BigInt, Sign};
use num_traits::{Signed, Zero};
use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};
use thiserror::Error as ThisError;

///
/// Decimal
///
/// Arbitrary-precision decimal: `unscaled * 10^-scale`.
///
/// Equality, ordering, and hashing are numeric, so `11` and `11.00` are the
/// same value even though their scales differ.
///
/// Scales are constructed as `i32` and held widened, so the scientific
/// exponent `digits - 1 - scale` always fits an `i64`. Only normalising or
/// decoding moves a scale outside the `i32` range.
///

#[derive(Clone, Debug, Default)]
pub struct Decimal {
    unscaled: BigInt,
    scale: i64,
}

///
/// CanonicalDecimal
///
/// Sign, significant digits (ASCII, no leading or trailing zeros), and
/// scientific exponent of one decimal value. Zero has no digits.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CanonicalDecimal {
    pub(crate) sign: Sign,
    pub(crate) digits: Vec<u8>,
    pub(crate) exponent: i64,
}

impl Decimal {
    #[must_use]
    pub fn new(unscaled: impl Into<BigInt>, scale: i32) -> Self {
        Self {
            unscaled: unscaled.into(),
            scale: i64::from(scale),
        }
    }

    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    #[must_use]
    pub const fn scale(&self) -> i64 {
        self.scale
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.unscaled.is_zero()
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.unscaled.is_negative()
    }

    /// Strip trailing zero digits, lowering the scale to match.
    #[must_use]
    pub fn normalize(&self) -> Self {
        if self.unscaled.is_zero() {
            return Self::zero();
        }

        let ten = BigInt::from(10u8);
        let mut unscaled = self.unscaled.clone();
        let mut scale = self.scale;
        while (&unscaled % &ten).is_zero() {
            unscaled /= &ten;
            scale -= 1;
        }

        Self { unscaled, scale }
    }

    pub(crate) fn canonical(&self) -> CanonicalDecimal {
        let normalized = self.normalize();
        if normalized.unscaled.is_zero() {
            return CanonicalDecimal {
                sign: Sign::NoSign,
                digits: Vec::new(),
                exponent: 0,
            };
        }

        let digits = normalized.unscaled.magnitude().to_str_radix(10).into_bytes();
        let digit_count = i64::try_from(digits.len()).unwrap_or(i64::MAX);
        // the exponent is scale-invariant under normalisation, so it still fits
        let exponent = (digit_count - 1) - normalized.scale;

        CanonicalDecimal {
            sign: normalized.unscaled.sign(),
            digits,
            exponent,
        }
    }

    /// Rebuild a decimal from canonical parts; `None` when the digits are not
    /// canonical (empty, leading zero, trailing zero, or non-ASCII-digit) or
    /// the exponent has no representable scale.
    pub(crate) fn from_canonical(negative: bool, digits: &[u8], exponent: i64) -> Option<Self> {
        let first = *digits.first()?;
        let last = *digits.last()?;
        if first == b'0' || last == b'0' || !digits.iter().all(u8::is_ascii_digit) {
            return None;
        }

        let magnitude = BigInt::parse_bytes(digits, 10)?;
        let digit_count = i64::try_from(digits.len()).ok()?;
        let scale = (digit_count - 1).checked_sub(exponent)?;
        let unscaled = if negative { -magnitude } else { magnitude };

        Some(Self { unscaled, scale })
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self::new(value, 0)
    }
}

impl From<BigInt> for Decimal {
    fn from(value: BigInt) -> Self {
        Self::new(value, 0)
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let left = self.canonical();
        let right = other.canonical();

        let sign_rank = |sign: Sign| match sign {
            Sign::Minus => 0u8,
            Sign::NoSign => 1,
            Sign::Plus => 2,
        };

        let magnitude = || {
            left.exponent
                .cmp(&right.exponent)
                .then_with(|| left.digits.cmp(&right.digits))
        };

        match sign_rank(left.sign).cmp(&sign_rank(right.sign)) {
            Ordering::Equal => match left.sign {
                Sign::NoSign => Ordering::Equal,
                Sign::Plus => magnitude(),
                Sign::Minus => magnitude().reverse(),
            },
            other => other,
        }
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl Hash for Decimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical().hash_into(state);
    }
}

impl CanonicalDecimal {
    fn hash_into<H: Hasher>(&self, state: &mut H) {
        match self.sign {
            Sign::Minus => 0u8.hash(state),
            Sign::NoSign => 1u8.hash(state),
            Sign::Plus => 2u8.hash(state),
        }
        self.digits.hash(state);
        self.exponent.hash(state);
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.unscaled.magnitude().to_str_radix(10);
        let sign = if self.unscaled.is_negative() { "-" } else { "" };

        if self.scale <= 0 {
            let zeros = if self.unscaled.is_zero() {
                0
            } else {
                usize::try_from(self.scale.unsigned_abs()).unwrap_or(usize::MAX)
            };
            return write!(f, "{sign}{digits}{}", "0".repeat(zeros));
        }

        let scale = usize::try_from(self.scale).unwrap_or(usize::MAX);
        if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{sign}{int_part}.{frac_part}")
        } else {
            write!(f, "{sign}0.{}{digits}", "0".repeat(scale - digits.len()))
        }
    }
}

///
/// DecimalParseError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum DecimalParseError {
    #[error("decimal literal is empty")]
    Empty,

    #[error("invalid decimal literal '{0}'")]
    Invalid(String),
}

impl FromStr for Decimal {
    type Err = DecimalParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(DecimalParseError::Empty);
        }
        let invalid = || DecimalParseError::Invalid(raw.to_string());

        let (mantissa, exponent) = match text.find(['e', 'E']) {
            Some(at) => {
                let exponent: i64 = text[at + 1..].parse().map_err(|_| invalid())?;
                (&text[..at], exponent)
            }
            None => (text, 0),
        };

        let (negative, unsigned) = match mantissa.as_bytes().first() {
            Some(b'-') => (true, &mantissa[1..]),
            Some(b'+') => (false, &mantissa[1..]),
            _ => (false, mantissa),
        };

        let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }

        let mut digits = String::with_capacity(int_part.len() + frac_part.len());
        digits.push_str(int_part);
        digits.push_str(frac_part);
        if !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(invalid());
        }

        let magnitude = BigInt::parse_bytes(digits.as_bytes(), 10).ok_or_else(invalid)?;
        let frac_len = i64::try_from(frac_part.len()).map_err(|_| invalid())?;
        let scale = frac_len.checked_sub(exponent).ok_or_else(invalid)?;
        let scale = i32::try_from(scale).map_err(|_| invalid())?;
        let unscaled = if negative { -magnitude } else { magnitude };

        Ok(Self::new(unscaled, scale))
    }
}
