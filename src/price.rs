use core::fmt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const CURRENCY_GLYPH: char = '₹';

const MINOR_PER_MAJOR: u64 = 100;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    #[error("price cannot be empty")]
    Empty,
    #[error("unparsable price {0:?}")]
    Invalid(String),
    #[error("price has more than two fractional digits")]
    TooManyFractionDigits,
    #[error("price is too large")]
    Overflow,
}

/// Amount in minor units (paise).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(u64);

impl Price {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn from_minor(minor_units: u64) -> Self {
        Self(minor_units)
    }

    #[must_use]
    pub const fn minor_units(self) -> u64 {
        self.0
    }

    /// Optional leading `₹`, then digits with at most two fractional digits.
    pub fn parse(input: &str) -> Result<Self, PriceError> {
        let trimmed = input.trim();
        let amount = trimmed
            .strip_prefix(CURRENCY_GLYPH)
            .map_or(trimmed, str::trim_start);
        if amount.is_empty() {
            return Err(PriceError::Empty);
        }

        let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
            return Err(PriceError::Invalid(input.to_string()));
        }
        if fraction.len() > 2 {
            return Err(PriceError::TooManyFractionDigits);
        }

        let whole: u64 = whole.parse().map_err(|_| PriceError::Overflow)?;
        let fraction: u64 = match fraction.len() {
            0 => 0,
            1 => u64::from(fraction.as_bytes()[0] - b'0') * 10,
            _ => fraction.parse().map_err(|_| PriceError::Invalid(input.to_string()))?,
        };

        whole
            .checked_mul(MINOR_PER_MAJOR)
            .and_then(|minor| minor.checked_add(fraction))
            .map(Self)
            .ok_or(PriceError::Overflow)
    }

    #[must_use]
    pub const fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as u64))
    }

    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{CURRENCY_GLYPH}{}.{:02}",
            self.0 / MINOR_PER_MAJOR,
            self.0 % MINOR_PER_MAJOR
        )
    }
}

impl core::str::FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl core::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

// Stored and exchanged in display form, e.g. "₹350.00".
impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
