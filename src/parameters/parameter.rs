//! Parameter definition and implementation
//!
//! This module provides the Parameter struct, a single named value cell with an
//! optional physical unit, a pinned value type and two kinds of legality
//! constraints: closed intervals and discrete options. Every mutation is
//! checked before it is applied, so a failed call leaves the parameter exactly
//! as it was.

use crate::parameters::bounds::{Bound, Interval};
use crate::parameters::value::{kinds_compatible, merge_kinds, Value, ValueKind};
use crate::units::{Quantity, Unit, UnitError, UnitRegistry};
use std::fmt;
use thiserror::Error;

/// Errors that can occur when working with parameters
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("Parameter '{name}' expects a value of type {expected}, got {found}")]
    TypeMismatch {
        name: String,
        expected: String,
        found: String,
    },

    #[error("Parameter '{name}' was given a list whose elements have different types")]
    HeterogeneousList { name: String },

    #[error("Invalid interval bound for parameter '{name}': {message}")]
    InvalidBound { name: String, message: String },

    #[error("Parameter '{name}' has unit '{expected}', which is incompatible with '{found}'")]
    DimensionMismatch {
        name: String,
        expected: String,
        found: String,
    },

    #[error("Value {value} of parameter '{name}' is illegal")]
    IllegalValue { name: String, value: String },

    #[error("New constraint on parameter '{name}' would make its current value {value} illegal")]
    ConstraintRejectsValue { name: String, value: String },

    #[error("Master parameter '{master}' cannot write {value} to parameter '{parameter}' of '{owner}': the value is illegal there")]
    IllegalLinkedValue {
        master: String,
        owner: String,
        parameter: String,
        value: String,
    },

    #[error("All {constraint} of parameter '{name}' must be either legal or illegal (declared {declared}, requested {requested})")]
    ConflictingLegality {
        name: String,
        constraint: String,
        declared: bool,
        requested: bool,
    },

    #[error("The unit of parameter '{name}' cannot change once it holds a value or constraints")]
    UnitLocked { name: String },

    #[error("Parameter '{name}' already exists")]
    DuplicateParameter { name: String },

    #[error("Parameter '{name}' not found")]
    ParameterNotFound { name: String },

    #[error("Owner '{owner}' is already registered")]
    DuplicateOwner { owner: String },

    #[error("Owner '{owner}' is not registered")]
    UnknownOwner { owner: String },

    #[error("'{owner}' is reserved and cannot be used as an owner id")]
    ReservedOwner { owner: String },

    #[error("Unit error: {0}")]
    Unit(#[from] UnitError),
}

/// The unit attached to a parameter
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterUnit {
    /// Unit text the registry understood
    Known(Unit),

    /// Unit text kept verbatim; values are not promoted to quantities
    Opaque(String),
}

impl ParameterUnit {
    /// Resolve unit text against `registry`, falling back to an opaque unit
    ///
    /// # Examples
    ///
    /// ```
    /// use instrument_params::parameters::ParameterUnit;
    /// use instrument_params::units::UnitRegistry;
    ///
    /// let registry = UnitRegistry::new();
    /// assert!(ParameterUnit::parse("meV", &registry).known().is_some());
    /// assert_eq!(
    ///     ParameterUnit::parse("arb. units", &registry),
    ///     ParameterUnit::Opaque("arb. units".to_string())
    /// );
    /// ```
    pub fn parse(text: &str, registry: &UnitRegistry) -> Self {
        match registry.parse_unit(text) {
            Ok(unit) => ParameterUnit::Known(unit),
            Err(_) => ParameterUnit::Opaque(text.to_string()),
        }
    }

    pub fn known(&self) -> Option<&Unit> {
        match self {
            ParameterUnit::Known(unit) => Some(unit),
            ParameterUnit::Opaque(_) => None,
        }
    }

    /// The unit text as written by the user
    pub fn as_str(&self) -> &str {
        match self {
            ParameterUnit::Known(unit) => unit.symbol(),
            ParameterUnit::Opaque(text) => text,
        }
    }
}

impl From<Unit> for ParameterUnit {
    fn from(unit: Unit) -> Self {
        ParameterUnit::Known(unit)
    }
}

impl fmt::Display for ParameterUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which constraint list a polarity flag belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Constraint {
    Intervals,
    Options,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Intervals => write!(f, "intervals"),
            Constraint::Options => write!(f, "options"),
        }
    }
}

/// A single named, typed, unit-aware, constrained value
///
/// The value type is pinned lazily by the first value, interval bound or
/// option the parameter sees. Options take precedence over intervals when
/// deciding legality; see [`Parameter::is_legal`].
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    unit: Option<ParameterUnit>,
    comment: Option<String>,
    value: Option<Value>,
    value_type: Option<ValueKind>,
    intervals: Vec<Interval>,
    intervals_are_legal: Option<bool>,
    options: Vec<Value>,
    options_are_legal: Option<bool>,
}

impl Parameter {
    /// Create a new parameter with no unit, comment, value or constraints
    ///
    /// # Examples
    ///
    /// ```
    /// use instrument_params::parameters::Parameter;
    ///
    /// let param = Parameter::new("gaussian");
    /// assert_eq!(param.name(), "gaussian");
    /// assert!(param.value().is_none());
    /// assert!(param.is_current_value_legal());
    /// ```
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            unit: None,
            comment: None,
            value: None,
            value_type: None,
            intervals: Vec::new(),
            intervals_are_legal: None,
            options: Vec::new(),
            options_are_legal: None,
        }
    }

    pub fn with_unit(mut self, unit: ParameterUnit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn with_comment(mut self, comment: &str) -> Self {
        self.comment = Some(comment.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> Option<&ParameterUnit> {
        self.unit.as_ref()
    }

    /// The unit values are promoted into, if the unit text was recognised
    pub fn known_unit(&self) -> Option<&Unit> {
        self.unit.as_ref().and_then(ParameterUnit::known)
    }

    /// Change the unit of the parameter
    ///
    /// # Returns
    ///
    /// `Ok(())`, or `ParameterError::UnitLocked` once a value, interval or
    /// option has been stored in terms of the old unit
    pub fn set_unit(&mut self, unit: Option<ParameterUnit>) -> Result<(), ParameterError> {
        if self.value.is_some() || !self.intervals.is_empty() || !self.options.is_empty() {
            return Err(ParameterError::UnitLocked {
                name: self.name.clone(),
            });
        }
        self.unit = unit;
        Ok(())
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn set_comment(&mut self, comment: Option<&str>) {
        self.comment = comment.map(str::to_string);
    }

    /// The type this parameter is pinned to, if any
    pub fn value_type(&self) -> Option<ValueKind> {
        self.value_type
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn intervals_are_legal(&self) -> Option<bool> {
        self.intervals_are_legal
    }

    pub fn options(&self) -> &[Value] {
        &self.options
    }

    pub fn options_are_legal(&self) -> Option<bool> {
        self.options_are_legal
    }

    /// Get the current value
    ///
    /// Quantities come back as their bare magnitude in the parameter's own
    /// unit, so a parameter in `eV` set to `6000` reads back as `6000.0`.
    pub fn value(&self) -> Option<Value> {
        self.value.as_ref().map(strip_units)
    }

    /// Get the stored value without stripping units
    pub fn raw_value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// The current value as a number, if it is numeric
    pub fn value_as_f64(&self) -> Option<f64> {
        self.value.as_ref().and_then(Value::as_f64)
    }

    /// Set the value of the parameter
    ///
    /// # Arguments
    ///
    /// * `value` - The new value: a bool, integer, float, string, quantity or a
    ///   list of those
    ///
    /// # Returns
    ///
    /// `Ok(())` if the value was stored. A quantity in the wrong dimensions
    /// gives `DimensionMismatch`, a value of the wrong type `TypeMismatch` and
    /// a value failing [`is_legal`](Parameter::is_legal) `IllegalValue`. On
    /// error the parameter is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use instrument_params::parameters::{Parameter, Value};
    ///
    /// let mut param = Parameter::new("n_rays");
    /// param.add_interval(1, None::<i64>, true).unwrap();
    /// param.set_value(100).unwrap();
    /// assert_eq!(param.value(), Some(Value::Int(100)));
    /// assert!(param.set_value(0).is_err());
    /// assert!(param.set_value("many").is_err());
    /// ```
    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<(), ParameterError> {
        let (value, pin) = self.checked_value(value.into())?;
        tracing::trace!(parameter = %self.name, value = %value, "Setting parameter value");
        self.value = Some(value);
        self.value_type = pin;
        self.widen_stored_ints();
        Ok(())
    }

    /// Run every check [`set_value`](Parameter::set_value) performs without
    /// storing anything
    pub fn validate_value(&self, value: &Value) -> Result<(), ParameterError> {
        self.checked_value(value.clone()).map(|_| ())
    }

    /// Add a closed interval `[min, max]`
    ///
    /// The first interval fixes whether intervals mark legal or illegal
    /// values; every later interval must use the same polarity.
    ///
    /// # Arguments
    ///
    /// * `min` - Lower bound, or `None` for negative infinity
    /// * `max` - Upper bound, or `None` for positive infinity
    /// * `are_legal` - Whether values inside the intervals are legal
    ///
    /// # Returns
    ///
    /// `Ok(())`, or an error if the polarity conflicts, a bound is not a
    /// compatible number, `min > max`, or the current value would become
    /// illegal. On error the parameter is unchanged.
    pub fn add_interval(
        &mut self,
        min: impl Into<Bound>,
        max: impl Into<Bound>,
        are_legal: bool,
    ) -> Result<(), ParameterError> {
        self.check_polarity(Constraint::Intervals, are_legal)?;

        let mut pin = self.value_type;
        let min = self.admit_bound(min.into(), f64::NEG_INFINITY, &mut pin)?;
        let max = self.admit_bound(max.into(), f64::INFINITY, &mut pin)?;

        let interval = Interval::new(min.clone(), max.clone()).ok_or_else(|| {
            ParameterError::InvalidBound {
                name: self.name.clone(),
                message: format!("minimum {} is greater than maximum {}", min, max),
            }
        })?;

        let previous = (self.intervals_are_legal, self.value_type);
        self.intervals_are_legal = Some(are_legal);
        self.value_type = pin;
        self.intervals.push(interval);

        if let Err(e) = self.revalidate() {
            self.intervals.pop();
            (self.intervals_are_legal, self.value_type) = previous;
            return Err(e);
        }
        self.widen_stored_ints();

        tracing::debug!(parameter = %self.name, min = %min, max = %max, are_legal, "Added interval");
        Ok(())
    }

    /// Add one option, or every element of a list of options
    ///
    /// Polarity, type checking and re-validation of the current value work as
    /// in [`add_interval`](Parameter::add_interval).
    ///
    /// # Examples
    ///
    /// ```
    /// use instrument_params::parameters::Parameter;
    ///
    /// let mut param = Parameter::new("gaussian");
    /// param.add_option(vec![false, true], true).unwrap();
    /// assert!(param.set_value(true).is_ok());
    /// assert!(param.add_option("maybe", true).is_err());
    /// ```
    pub fn add_option(
        &mut self,
        option: impl Into<Value>,
        are_legal: bool,
    ) -> Result<(), ParameterError> {
        self.check_polarity(Constraint::Options, are_legal)?;

        let items = match option.into() {
            Value::List(items) => items,
            single => vec![single],
        };

        let mut pin = self.value_type;
        let mut admitted = Vec::with_capacity(items.len());
        for item in items {
            let (item, widened) = self.admit(item, pin)?;
            pin = widened;
            admitted.push(item);
        }

        let previous = (self.options_are_legal, self.value_type, self.options.len());
        let added = admitted.len();
        self.options_are_legal = Some(are_legal);
        self.value_type = pin;
        self.options.extend(admitted);

        if let Err(e) = self.revalidate() {
            self.options.truncate(previous.2);
            (self.options_are_legal, self.value_type) = (previous.0, previous.1);
            return Err(e);
        }
        self.widen_stored_ints();

        tracing::debug!(parameter = %self.name, added, are_legal, "Added options");
        Ok(())
    }

    /// Remove every interval and forget the interval polarity
    pub fn clear_intervals(&mut self) {
        self.intervals.clear();
        self.intervals_are_legal = None;
    }

    /// Remove every option and forget the option polarity
    pub fn clear_options(&mut self) {
        self.options.clear();
        self.options_are_legal = None;
    }

    /// Check whether a candidate value is legal under the current constraints
    ///
    /// A list is legal only if every element is. For a single value:
    ///
    /// 1. a type incompatible with the pinned type is illegal;
    /// 2. with no constraints at all the value is legal;
    /// 3. a value equal to an option gets the options' polarity, whatever the
    ///    intervals say;
    /// 4. a value inside any interval gets the intervals' polarity;
    /// 5. otherwise the value gets the opposite of the intervals' polarity if
    ///    intervals exist, else the opposite of the options' polarity.
    ///
    /// # Examples
    ///
    /// ```
    /// use instrument_params::parameters::{Parameter, Value};
    ///
    /// let mut param = Parameter::new("thickness");
    /// param.add_interval(3.0, 4.5, false).unwrap();
    /// assert!(param.is_legal(&Value::from(1.0)));
    /// assert!(!param.is_legal(&Value::from(3.5)));
    /// assert!(param.is_legal(&Value::from(10.0)));
    /// ```
    pub fn is_legal(&self, value: &Value) -> bool {
        if let Value::List(items) = value {
            return items.iter().all(|item| self.is_legal(item));
        }

        let kind = match value.kind(self.known_unit().is_some()) {
            Ok(kind) => kind,
            Err(_) => return false,
        };
        if !kinds_compatible(self.value_type, kind) {
            return false;
        }
        let candidate = match self.promote(value.clone(), self.value_type) {
            Ok(candidate) => candidate,
            Err(_) => return false,
        };

        if self.intervals.is_empty() && self.options.is_empty() {
            return true;
        }

        if self.options.iter().any(|option| option.matches(&candidate)) {
            return self.options_are_legal.unwrap_or(true);
        }

        if self.intervals.iter().any(|interval| interval.contains(&candidate)) {
            return self.intervals_are_legal.unwrap_or(true);
        }

        if !self.intervals.is_empty() {
            !self.intervals_are_legal.unwrap_or(true)
        } else {
            !self.options_are_legal.unwrap_or(true)
        }
    }

    /// Whether the stored value is legal; an unset value is
    pub fn is_current_value_legal(&self) -> bool {
        self.value.as_ref().map_or(true, |value| self.is_legal(value))
    }

    /// Multi-line listing of the constraints
    pub fn constraints_summary(&self) -> String {
        let flag = |flag: Option<bool>| match flag {
            Some(flag) => flag.to_string(),
            None => "unset".to_string(),
        };
        let intervals: Vec<String> = self.intervals.iter().map(|i| i.to_string()).collect();
        let options: Vec<String> = self.options.iter().map(|o| o.to_string()).collect();

        format!(
            "{}\nintervals: [{}]\nintervals are legal: {}\noptions: [{}]\noptions are legal: {}",
            self.name,
            intervals.join(", "),
            flag(self.intervals_are_legal),
            options.join(", "),
            flag(self.options_are_legal),
        )
    }

    /// One-line description used when listing a collection
    pub fn summary_line(&self) -> String {
        let mut line = match self.value() {
            Some(value) => format!("{:<15}{:<5}", self.name, value.to_string()),
            None => format!("{:<20}", self.name),
        };

        let unit = self
            .unit
            .as_ref()
            .map(|unit| format!("[{}]", unit))
            .unwrap_or_default();
        line.push_str(&format!("{:<10}", unit));

        if let Some(comment) = &self.comment {
            line.push_str(comment);
        }
        line.push_str("   ");

        let polarity = if self.intervals_are_legal == Some(true) { "L" } else { "I" };
        for interval in &self.intervals {
            line.push_str(&format!("{:<10}", format!("{}{}", polarity, interval)));
        }

        if !self.options.is_empty() {
            let options: Vec<String> = self.options.iter().map(|o| o.to_string()).collect();
            let polarity = if self.options_are_legal == Some(true) { "L" } else { "I" };
            line.push_str(&format!("{}({})", polarity, options.join(", ")));
        }

        line
    }

    fn check_polarity(&self, constraint: Constraint, requested: bool) -> Result<(), ParameterError> {
        let declared = match constraint {
            Constraint::Intervals => self.intervals_are_legal,
            Constraint::Options => self.options_are_legal,
        };

        match declared {
            Some(declared) if declared != requested => {
                tracing::warn!(
                    parameter = %self.name,
                    %constraint,
                    declared,
                    requested,
                    "All {} should be either legal or illegal",
                    constraint
                );
                Err(ParameterError::ConflictingLegality {
                    name: self.name.clone(),
                    constraint: constraint.to_string(),
                    declared,
                    requested,
                })
            }
            _ => Ok(()),
        }
    }

    /// Full setter validation; returns the promoted value and the widened pin
    fn checked_value(&self, value: Value) -> Result<(Value, Option<ValueKind>), ParameterError> {
        let (value, pin) = self.admit(value, self.value_type)?;
        if !self.is_legal(&value) {
            return Err(ParameterError::IllegalValue {
                name: self.name.clone(),
                value: strip_units(&value).to_string(),
            });
        }
        Ok((value, pin))
    }

    /// Dimension check, type check against `pin`, and promotion
    fn admit(
        &self,
        value: Value,
        pin: Option<ValueKind>,
    ) -> Result<(Value, Option<ValueKind>), ParameterError> {
        self.check_dimensions(&value)?;

        let kind = value
            .kind(self.known_unit().is_some())
            .map_err(|_| ParameterError::HeterogeneousList {
                name: self.name.clone(),
            })?;

        let widened = merge_kinds(pin, kind).map_err(|_| ParameterError::TypeMismatch {
            name: self.name.clone(),
            expected: kind_name(pin),
            found: kind_name(kind),
        })?;

        let value = self.promote(value, widened)?;
        Ok((value, widened))
    }

    fn admit_bound(
        &self,
        bound: Bound,
        infinity: f64,
        pin: &mut Option<ValueKind>,
    ) -> Result<Value, ParameterError> {
        match bound {
            Bound::Unbounded => Ok(Value::Quantity(Quantity::new(
                infinity,
                self.numeric_unit(),
            ))),
            Bound::Value(value @ (Value::Int(_) | Value::Float(_) | Value::Quantity(_))) => {
                let (value, widened) = self.admit(value, *pin)?;
                *pin = widened;
                Ok(value)
            }
            Bound::Value(other) => Err(ParameterError::InvalidBound {
                name: self.name.clone(),
                message: format!("interval bounds must be numeric, got {}", other),
            }),
        }
    }

    /// Bring a value into the stored representation
    ///
    /// Numbers become quantities in the parameter unit when one is known;
    /// without one, floats become dimensionless quantities and ints follow the
    /// pin. Quantities are converted into the parameter unit.
    fn promote(&self, value: Value, pin: Option<ValueKind>) -> Result<Value, ParameterError> {
        let promoted = match value {
            Value::Int(i) => match self.known_unit() {
                Some(unit) => Value::Quantity(Quantity::new(i as f64, unit.clone())),
                None if pin == Some(ValueKind::Quantity) => {
                    Value::Quantity(Quantity::dimensionless(i as f64))
                }
                None => Value::Int(i),
            },
            Value::Float(x) => Value::Quantity(Quantity::new(x, self.numeric_unit())),
            Value::Quantity(q) => Value::Quantity(q.to(&self.numeric_unit())?),
            Value::List(items) => Value::List(
                items
                    .into_iter()
                    .map(|item| self.promote(item, pin))
                    .collect::<Result<_, _>>()?,
            ),
            other => other,
        };
        Ok(promoted)
    }

    fn check_dimensions(&self, value: &Value) -> Result<(), ParameterError> {
        match value {
            Value::Quantity(q) => {
                let expected = self.numeric_unit();
                if q.unit().dims() == expected.dims() {
                    Ok(())
                } else {
                    Err(ParameterError::DimensionMismatch {
                        name: self.name.clone(),
                        expected: expected.symbol().to_string(),
                        found: q.unit().symbol().to_string(),
                    })
                }
            }
            Value::List(items) => items.iter().try_for_each(|item| self.check_dimensions(item)),
            _ => Ok(()),
        }
    }

    /// The unit numeric values are stored in
    fn numeric_unit(&self) -> Unit {
        self.known_unit().cloned().unwrap_or_else(Unit::dimensionless)
    }

    /// Once the pin is `Quantity`, ints stored under an earlier `Int` pin
    /// become dimensionless quantities
    fn widen_stored_ints(&mut self) {
        if self.value_type != Some(ValueKind::Quantity) {
            return;
        }
        self.value = self.value.take().map(int_to_quantity);
        self.options = std::mem::take(&mut self.options)
            .into_iter()
            .map(int_to_quantity)
            .collect();
        self.intervals = std::mem::take(&mut self.intervals)
            .into_iter()
            .map(|interval| interval.map_ends(int_to_quantity))
            .collect();
    }

    fn revalidate(&self) -> Result<(), ParameterError> {
        match &self.value {
            Some(value) if !self.is_legal(value) => Err(ParameterError::ConstraintRejectsValue {
                name: self.name.clone(),
                value: strip_units(value).to_string(),
            }),
            _ => Ok(()),
        }
    }
}

fn kind_name(kind: Option<ValueKind>) -> String {
    kind.map_or_else(|| "unset".to_string(), |k| k.to_string())
}

fn int_to_quantity(value: Value) -> Value {
    match value {
        Value::Int(i) => Value::Quantity(Quantity::dimensionless(i as f64)),
        Value::List(items) => Value::List(items.into_iter().map(int_to_quantity).collect()),
        other => other,
    }
}

/// Replace quantities by their bare magnitudes
fn strip_units(value: &Value) -> Value {
    match value {
        Value::Quantity(q) => Value::Float(q.magnitude()),
        Value::List(items) => Value::List(items.iter().map(strip_units).collect()),
        other => other.clone(),
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parameter named: '{}'", self.name)?;
        match self.value() {
            Some(value) => writeln!(f, " with value: {}", value)?,
            None => writeln!(f, " without set value.")?,
        }

        if let Some(unit) = &self.unit {
            writeln!(f, " [{}]", unit)?;
        }
        if let Some(comment) = &self.comment {
            writeln!(f, " {}", comment)?;
        }

        if !self.intervals.is_empty() {
            if self.intervals_are_legal == Some(true) {
                writeln!(f, "  Legal intervals:")?;
            } else {
                writeln!(f, "  Illegal intervals:")?;
            }
            for interval in &self.intervals {
                writeln!(f, "    {}", interval)?;
            }
        }

        if !self.options.is_empty() {
            if self.options_are_legal == Some(true) {
                writeln!(f, "  Allowed values:")?;
            } else {
                writeln!(f, "  Forbidden values:")?;
            }
            for option in &self.options {
                writeln!(f, "    {}", option)?;
            }
        }

        Ok(())
    }
}
