//! Parameter values and their type pinning rules
//!
//! A [`Value`] is anything a parameter can hold or be tested against. A
//! [`ValueKind`] is the coarser type a parameter pins itself to the first time
//! it sees a value, interval bound or option.

use crate::units::Quantity;
use std::cmp::Ordering;
use std::fmt;

/// A candidate or stored parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Quantity(Quantity),
    /// A sequence of independent values, legal only if every element is
    List(Vec<Value>),
}

/// The type a parameter is pinned to
///
/// Floats never appear here: they are always promoted to quantities
/// (dimensionless when the parameter has no unit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int,
    Str,
    Quantity,
}

/// A list whose elements do not share one kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixedKinds;

impl ValueKind {
    /// Ints and quantities are numeric; bools are not
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueKind::Int | ValueKind::Quantity)
    }

    pub fn is_compatible_with(self, other: ValueKind) -> bool {
        self == other || (self.is_numeric() && other.is_numeric())
    }

    /// The kind a pin ends up as after accepting `other`
    ///
    /// An int pin widens to quantity once a quantity is seen.
    fn widen(self, other: ValueKind) -> ValueKind {
        if self == ValueKind::Quantity || other == ValueKind::Quantity {
            ValueKind::Quantity
        } else {
            self
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Str => "str",
            ValueKind::Quantity => "quantity",
        };
        write!(f, "{}", name)
    }
}

/// Whether a value of kind `incoming` may be written where `pinned` is in force
pub fn kinds_compatible(pinned: Option<ValueKind>, incoming: Option<ValueKind>) -> bool {
    match (pinned, incoming) {
        (Some(pinned), Some(incoming)) => pinned.is_compatible_with(incoming),
        _ => true,
    }
}

/// Combine two kinds, or `None` if they are incompatible
pub fn merge_kinds(
    a: Option<ValueKind>,
    b: Option<ValueKind>,
) -> Result<Option<ValueKind>, MixedKinds> {
    match (a, b) {
        (Some(a), Some(b)) if a.is_compatible_with(b) => Ok(Some(a.widen(b))),
        (Some(_), Some(_)) => Err(MixedKinds),
        (Some(k), None) | (None, Some(k)) => Ok(Some(k)),
        (None, None) => Ok(None),
    }
}

impl Value {
    /// Kind of this value after promotion
    ///
    /// With `unit_in_play`, plain ints count as quantities. Floats always do.
    /// Lists take the common kind of their elements; an empty list has none.
    pub fn kind(&self, unit_in_play: bool) -> Result<Option<ValueKind>, MixedKinds> {
        let kind = match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) if unit_in_play => ValueKind::Quantity,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) | Value::Quantity(_) => ValueKind::Quantity,
            Value::Str(_) => ValueKind::Str,
            Value::List(items) => {
                return items.iter().try_fold(None, |acc, item| {
                    merge_kinds(acc, item.kind(unit_in_play)?)
                });
            }
        };
        Ok(Some(kind))
    }

    /// Numeric view as a quantity; plain numbers are dimensionless
    pub fn as_quantity(&self) -> Option<Quantity> {
        match self {
            Value::Int(i) => Some(Quantity::dimensionless(*i as f64)),
            Value::Float(x) => Some(Quantity::dimensionless(*x)),
            Value::Quantity(q) => Some(q.clone()),
            _ => None,
        }
    }

    /// Equality used for option matching: numeric values compare by
    /// magnitude across units, everything else structurally
    pub fn matches(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.matches(y))
            }
            _ => match (self.as_quantity(), other.as_quantity()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }

    /// Numeric ordering, `None` for non-numeric values or unrelated units
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        let (a, b) = (self.as_quantity()?, other.as_quantity()?);
        a.partial_cmp(&b)
    }

    /// Magnitude of a numeric value; quantities give their own-unit magnitude
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(x) => Some(*x),
            Value::Quantity(q) => Some(q.magnitude()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::Quantity(q) => write!(f, "{}", q),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float(x as f64)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Quantity> for Value {
    fn from(q: Quantity) -> Self {
        Value::Quantity(q)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}
