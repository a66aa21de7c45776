//! Interval bounds
//!
//! Intervals are closed ranges `min <= x <= max`. A side given as
//! [`Bound::Unbounded`] stretches to infinity; the parameter stores it as an
//! infinite quantity in its own unit so that every interval has two concrete
//! numeric ends.

use crate::parameters::value::Value;
use crate::units::Quantity;
use std::cmp::Ordering;
use std::fmt;

/// One side of an interval as supplied by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    /// A concrete bound; must be numeric
    Value(Value),

    /// No bound on this side (±∞)
    Unbounded,
}

impl Bound {
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Bound::Unbounded)
    }
}

impl From<Value> for Bound {
    fn from(value: Value) -> Self {
        Bound::Value(value)
    }
}

impl From<f64> for Bound {
    fn from(x: f64) -> Self {
        Bound::Value(Value::Float(x))
    }
}

impl From<i32> for Bound {
    fn from(i: i32) -> Self {
        Bound::Value(Value::Int(i as i64))
    }
}

impl From<i64> for Bound {
    fn from(i: i64) -> Self {
        Bound::Value(Value::Int(i))
    }
}

impl From<Quantity> for Bound {
    fn from(q: Quantity) -> Self {
        Bound::Value(Value::Quantity(q))
    }
}

/// `None` is an open side, matching how unbounded sides are written in JSON
impl<T: Into<Value>> From<Option<T>> for Bound {
    fn from(bound: Option<T>) -> Self {
        match bound {
            Some(value) => Bound::Value(value.into()),
            None => Bound::Unbounded,
        }
    }
}

/// A closed numeric range
///
/// Both ends are already promoted into the owning parameter's unit when the
/// interval lives inside a [`Parameter`](super::Parameter).
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    min: Value,
    max: Value,
}

impl Interval {
    /// Build an interval from numeric ends
    ///
    /// # Returns
    ///
    /// `None` if an end is not numeric, the ends cannot be compared, or
    /// `min > max`
    pub fn new(min: Value, max: Value) -> Option<Self> {
        match min.compare(&max)? {
            Ordering::Greater => None,
            _ => Some(Self { min, max }),
        }
    }

    pub fn min(&self) -> &Value {
        &self.min
    }

    pub fn max(&self) -> &Value {
        &self.max
    }

    /// Rewrite both ends; `f` must preserve their order
    pub(crate) fn map_ends(self, f: impl Fn(Value) -> Value) -> Self {
        Self {
            min: f(self.min),
            max: f(self.max),
        }
    }

    /// Whether `value` lies inside the interval, bounds included
    ///
    /// Values that cannot be compared with the ends (other units, non-numeric
    /// values, NaN) are never inside.
    pub fn contains(&self, value: &Value) -> bool {
        let above_min = matches!(
            value.compare(&self.min),
            Some(Ordering::Greater | Ordering::Equal)
        );
        let below_max = matches!(
            value.compare(&self.max),
            Some(Ordering::Less | Ordering::Equal)
        );
        above_min && below_max
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}
