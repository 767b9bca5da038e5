//! Arbitrary-precision signed integer arithmetic.
//!
//! Every accumulator, literal and parameter value in a Directed program is an
//! [`Integer`]. Overflow is impossible by construction; the only error this
//! type can produce is a failure to parse a decimal string.

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use std::fmt;
use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Neg, Rem, Sub};
use std::str::FromStr;

/// An unbounded signed integer.
///
/// Division and remainder truncate toward zero, i.e. the sign of the
/// remainder matches the sign of the dividend. This mirrors the behaviour of
/// [`BigInt`]'s own `Div`/`Rem` impls, so the wrapper below is a thin,
/// value-typed layer rather than a reimplementation.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Integer(BigInt);

/// Error returned when a decimal string does not parse as an [`Integer`].
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid decimal integer literal: {0:?}")]
pub struct ParseIntegerError(pub String);

impl Integer {
    /// The integer zero.
    pub fn zero() -> Self {
        Integer(BigInt::zero())
    }

    /// Parse an `Integer` from a decimal string, e.g. `"-42"`.
    pub fn from_decimal_str(s: &str) -> Result<Self, ParseIntegerError> {
        BigInt::from_str(s)
            .map(Integer)
            .map_err(|_| ParseIntegerError(s.to_owned()))
    }

    /// Construct an `Integer` from a single byte (used when the runtime
    /// bootstraps program input from raw bytes).
    pub fn from_byte(b: u8) -> Self {
        Integer(BigInt::from(b))
    }

    /// Narrow this value to an `isize`, for use as a selector index.
    ///
    /// Returns `None` if the value doesn't fit; callers treat that as an
    /// out-of-range selector.
    pub fn to_isize(&self) -> Option<isize> {
        self.0.to_isize()
    }

    /// Whether this value is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    fn truncating_div(&self, rhs: &BigInt) -> BigInt {
        self.0.clone() / rhs.clone()
    }

    fn truncating_rem(&self, rhs: &BigInt) -> BigInt {
        self.0.clone() % rhs.clone()
    }

    /// Checked division, truncating toward zero. `None` on division by zero.
    pub fn checked_div(&self, rhs: &Self) -> Option<Self> {
        if rhs.0.is_zero() {
            None
        } else {
            Some(Integer(self.truncating_div(&rhs.0)))
        }
    }

    /// Checked remainder, sign follows the dividend. `None` on division by zero.
    pub fn checked_rem(&self, rhs: &Self) -> Option<Self> {
        if rhs.0.is_zero() {
            None
        } else {
            Some(Integer(self.truncating_rem(&rhs.0)))
        }
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for Integer {
    fn from(v: i64) -> Self {
        Integer(BigInt::from(v))
    }
}

impl From<BigInt> for Integer {
    fn from(v: BigInt) -> Self {
        Integer(v)
    }
}

macro_rules! impl_bin_op {
    ($Trait:ident, $method:ident) => {
        impl $Trait for Integer {
            type Output = Integer;
            fn $method(self, rhs: Integer) -> Integer {
                Integer(self.0.$method(rhs.0))
            }
        }

        impl $Trait for &Integer {
            type Output = Integer;
            fn $method(self, rhs: &Integer) -> Integer {
                Integer((&self.0).$method(&rhs.0))
            }
        }
    };
}

impl_bin_op!(Add, add);
impl_bin_op!(Sub, sub);
impl_bin_op!(Mul, mul);
impl_bin_op!(BitAnd, bitand);
impl_bin_op!(BitOr, bitor);
impl_bin_op!(BitXor, bitxor);

// `Div`/`Rem` are intentionally *not* blanket-derived via the macro above:
// dividing by zero must be a checked, diagnosable runtime error rather than a
// panic, so callers go through `checked_div`/`checked_rem`. We still provide
// the plain operator for the case the caller has already excluded zero.
impl Div for Integer {
    type Output = Integer;
    fn div(self, rhs: Integer) -> Integer {
        Integer(self.truncating_div(&rhs.0))
    }
}

impl Rem for Integer {
    type Output = Integer;
    fn rem(self, rhs: Integer) -> Integer {
        Integer(self.truncating_rem(&rhs.0))
    }
}

impl Neg for Integer {
    type Output = Integer;
    fn neg(self) -> Integer {
        Integer(-self.0)
    }
}
