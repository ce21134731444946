//! Fixed-point DECIMAL(38, 18) quantities

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ValueRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("invalid decimal literal {0:?}")]
    Parse(String),

    #[error("{value} has more than {} fractional digits", Amount::SCALE)]
    Scale { value: String },

    #[error("{value} has more than {} significant digits", Amount::PRECISION)]
    Precision { value: String },
}

/// A token quantity with 38 total digits, 18 of them fractional.
///
/// Values are exact; comparison is numeric, so `1.5` equals `1.500`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(BigDecimal);

impl Amount {
    pub const SCALE: i64 = 18;
    pub const PRECISION: usize = 38;

    pub fn zero() -> Self {
        Self::default()
    }

    /// Wrap a decimal, rejecting values that do not fit DECIMAL(38, 18).
    ///
    /// Bounds are checked on the normalized digits and exponent, so an
    /// out-of-range literal such as `1e2000000` is never expanded.
    pub fn new(value: BigDecimal) -> Result<Self, AmountError> {
        let normalized = value.normalized();
        let (int, scale) = normalized.as_bigint_and_exponent();
        if scale > Self::SCALE {
            return Err(AmountError::Scale {
                value: normalized.to_scientific_notation(),
            });
        }

        let significant = int.to_string().trim_start_matches('-').len() as i64;
        if significant - scale > Self::PRECISION as i64 - Self::SCALE {
            return Err(AmountError::Precision {
                value: normalized.to_scientific_notation(),
            });
        }
        Ok(Self(value))
    }

    pub fn as_decimal(&self) -> &BigDecimal {
        &self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < BigDecimal::default()
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigDecimal::default()
    }

    pub fn checked_add(&self, other: &Amount) -> Result<Amount, AmountError> {
        Amount::new(&self.0 + &other.0)
    }

    pub fn checked_sub(&self, other: &Amount) -> Result<Amount, AmountError> {
        Amount::new(&self.0 - &other.0)
    }

    /// Absolute value digits at scale 18, without sign or leading zeros.
    fn digits(&self) -> String {
        let (int, _) = self.0.with_scale(Self::SCALE).as_bigint_and_exponent();
        let raw = int.to_string();
        let digits = raw.trim_start_matches('-').trim_start_matches('0');
        digits.to_string()
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self(BigDecimal::from(value))
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = BigDecimal::from_str(s.trim()).map_err(|_| AmountError::Parse(s.to_string()))?;
        Amount::new(value)
    }
}

impl TryFrom<String> for Amount {
    type Error = AmountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Amount> for String {
    fn from(value: Amount) -> Self {
        value.to_string()
    }
}

/// Always renders exactly 18 fractional digits in plain notation.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = Self::SCALE as usize;
        let digits = format!("{:0>width$}", self.digits(), width = scale + 1);
        let (int_part, frac_part) = digits.split_at(digits.len() - scale);
        if self.is_negative() {
            write!(f, "-")?;
        }
        write!(f, "{int_part}.{frac_part}")
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        text.parse().map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
