use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const INR_CURRENCY_CODE: &str = "INR";
pub const INR_CURRENCY_CODE_LOWER: &str = "inr";

/// The largest rupee amount accepted from an untrusted decimal input. Beyond this, `f64` can no
/// longer represent every paisa exactly.
const MAX_RUPEE_INPUT: f64 = 1e12;

//--------------------------------------      Rupees       -----------------------------------------------------------
/// An amount of Indian rupees, stored as an integer number of paise (1/100 of a rupee).
///
/// Storing paise keeps every monetary value exact. Amounts cross the API boundary as decimal
/// rupees with two digits of precision; conversions round half-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Type, Ord, PartialOrd)]
#[sqlx(transparent)]
pub struct Rupees(i64);

op!(binary Rupees, Add, add);
op!(binary Rupees, Sub, sub);
op!(inplace Rupees, SubAssign, sub_assign);
op!(unary Rupees, Neg, neg);

impl Mul<i64> for Rupees {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Rupees {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in rupees: {0}")]
pub struct RupeeConversionError(String);

impl Rupees {
    pub const fn from_paise(paise: i64) -> Self {
        Self(paise)
    }

    pub const fn from_rupees(rupees: i64) -> Self {
        Self(rupees * 100)
    }

    /// The amount as an integer number of paise. This is also the wire format the Razorpay API
    /// uses for amounts.
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// `pct` percent of this amount, rounded half-up to the nearest paisa.
    pub fn percent(&self, pct: i64) -> Self {
        Self((self.0 * pct + 50).div_euclid(100))
    }

    /// Converts a decimal rupee amount (e.g. a JSON number) into paise, rounding half-up to two
    /// decimal places.
    pub fn try_from_f64(value: f64) -> Result<Self, RupeeConversionError> {
        if !value.is_finite() {
            return Err(RupeeConversionError(format!("{value} is not a finite number")));
        }
        if value.abs() > MAX_RUPEE_INPUT {
            return Err(RupeeConversionError(format!("{value} is too large")));
        }
        Ok(Self((value * 100.0).round() as i64))
    }

    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl From<i64> for Rupees {
    fn from(paise: i64) -> Self {
        Self(paise)
    }
}

impl Display for Rupees {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let paise = self.0.abs();
        write!(f, "{sign}₹{}.{:02}", paise / 100, paise % 100)
    }
}

impl Serialize for Rupees {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Rupees {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Rupees::try_from_f64(value).map_err(serde::de::Error::custom)
    }
}
