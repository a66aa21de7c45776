//! JSON encoding of parameters
//!
//! Values are written as plain JSON scalars and arrays, except quantities,
//! which use a tagged object so they can be told apart from strings on load:
//!
//! ```json
//! {"__quantity__": "4000 eV"}
//! ```
//!
//! Unbounded interval ends are written as `null`. The pinned value type is
//! never written; loading replays every interval, option and value through
//! the normal [`Parameter`] API, which pins the type again and re-checks
//! legality.

use crate::config::SerializationConfig;
use crate::parameters::bounds::{Bound, Interval};
use crate::parameters::parameter::{Parameter, ParameterError, ParameterUnit};
use crate::parameters::value::Value;
use crate::units::{UnitError, UnitRegistry};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// Key of the wrapper object that marks a quantity
pub const QUANTITY_TAG: &str = "__quantity__";

/// Error that can occur during serialization/deserialization
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unit error: {0}")]
    Unit(#[from] UnitError),

    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    #[error("Invalid parameter record: {message}")]
    InvalidRecord { message: String },
}

impl SerializationError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        SerializationError::InvalidRecord {
            message: message.into(),
        }
    }
}

/// Encode a value as JSON
///
/// Non-finite floats have no JSON number form and are written as
/// dimensionless quantities instead.
pub fn encode_value(value: &Value) -> Json {
    match value {
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::Float(x) => match serde_json::Number::from_f64(*x) {
            Some(n) => Json::Number(n),
            None => tagged_quantity(format!("{} dimensionless", x)),
        },
        Value::Str(s) => Json::String(s.clone()),
        Value::Quantity(q) => tagged_quantity(q.to_string()),
        Value::List(items) => Json::Array(items.iter().map(encode_value).collect()),
    }
}

fn tagged_quantity(text: String) -> Json {
    let mut map = serde_json::Map::new();
    map.insert(QUANTITY_TAG.to_string(), Json::String(text));
    Json::Object(map)
}

/// Decode a JSON value produced by [`encode_value`]
///
/// # Returns
///
/// The value, or an error for `null`, objects other than the quantity
/// wrapper, and quantity text the registry cannot parse
pub fn decode_value(json: &Json, registry: &UnitRegistry) -> Result<Value, SerializationError> {
    match json {
        Json::Bool(b) => Ok(Value::Bool(*b)),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else {
                n.as_f64()
                    .map(Value::Float)
                    .ok_or_else(|| SerializationError::invalid(format!("unsupported number {}", n)))
            }
        }
        Json::String(s) => Ok(Value::Str(s.clone())),
        Json::Array(items) => items
            .iter()
            .map(|item| decode_value(item, registry))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Json::Object(map) => match (map.len(), map.get(QUANTITY_TAG)) {
            (1, Some(Json::String(text))) => Ok(Value::Quantity(registry.parse_quantity(text)?)),
            _ => Err(SerializationError::invalid(format!(
                "expected a value or a {{\"{}\": ...}} object, got {}",
                QUANTITY_TAG, json
            ))),
        },
        Json::Null => Err(SerializationError::invalid("unexpected null value")),
    }
}

fn encode_bound(end: &Value) -> Json {
    match end {
        Value::Quantity(q) if q.magnitude().is_infinite() => Json::Null,
        other => encode_value(other),
    }
}

fn decode_bound(json: &Json, registry: &UnitRegistry) -> Result<Bound, SerializationError> {
    match json {
        Json::Null => Ok(Bound::Unbounded),
        other => Ok(Bound::Value(decode_value(other, registry)?)),
    }
}

/// The JSON shape of one parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRecord {
    pub name: String,

    #[serde(default)]
    pub unit: Option<String>,

    #[serde(default)]
    pub comment: Option<String>,

    #[serde(default)]
    pub value: Json,

    #[serde(default)]
    pub intervals: Vec<[Json; 2]>,

    #[serde(default)]
    pub intervals_are_legal: Option<bool>,

    #[serde(default)]
    pub options: Vec<Json>,

    #[serde(default)]
    pub options_are_legal: Option<bool>,

    /// Link table of a master parameter, owner id to parameter name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<IndexMap<String, String>>,
}

impl ParameterRecord {
    pub fn from_parameter(param: &Parameter) -> Self {
        let interval_record =
            |interval: &Interval| [encode_bound(interval.min()), encode_bound(interval.max())];

        Self {
            name: param.name().to_string(),
            unit: param.unit().map(|unit| unit.as_str().to_string()),
            comment: param.comment().map(str::to_string),
            value: param.raw_value().map_or(Json::Null, encode_value),
            intervals: param.intervals().iter().map(interval_record).collect(),
            intervals_are_legal: param.intervals_are_legal(),
            options: param.options().iter().map(encode_value).collect(),
            options_are_legal: param.options_are_legal(),
            links: None,
        }
    }

    /// Rebuild the parameter through its public API
    ///
    /// Intervals and options are added before the value so that the value is
    /// checked against the complete constraint set.
    pub fn to_parameter(&self, registry: &UnitRegistry) -> Result<Parameter, SerializationError> {
        let mut param = Parameter::new(&self.name);
        if let Some(unit) = &self.unit {
            param = param.with_unit(ParameterUnit::parse(unit, registry));
        }
        if let Some(comment) = &self.comment {
            param = param.with_comment(comment);
        }

        if !self.intervals.is_empty() {
            let are_legal = self.intervals_are_legal.ok_or_else(|| {
                SerializationError::invalid(format!(
                    "parameter '{}' has intervals but no intervals_are_legal flag",
                    self.name
                ))
            })?;
            for [min, max] in &self.intervals {
                param.add_interval(
                    decode_bound(min, registry)?,
                    decode_bound(max, registry)?,
                    are_legal,
                )?;
            }
        }

        if !self.options.is_empty() {
            let are_legal = self.options_are_legal.ok_or_else(|| {
                SerializationError::invalid(format!(
                    "parameter '{}' has options but no options_are_legal flag",
                    self.name
                ))
            })?;
            for option in &self.options {
                param.add_option(decode_value(option, registry)?, are_legal)?;
            }
        }

        if !self.value.is_null() {
            param.set_value(decode_value(&self.value, registry)?)?;
        }

        Ok(param)
    }
}

/// Render a JSON document according to `config`
pub(crate) fn to_string_with(
    json: &Json,
    config: &SerializationConfig,
) -> Result<String, SerializationError> {
    let mut buffer = Vec::new();
    write_json(&mut buffer, json, config)?;
    String::from_utf8(buffer).map_err(|e| SerializationError::invalid(e.to_string()))
}

fn write_json<W: Write>(
    writer: W,
    json: &Json,
    config: &SerializationConfig,
) -> Result<(), SerializationError> {
    if config.pretty {
        let indent = config.indent_string();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
        json.serialize(&mut serializer)?;
    } else {
        serde_json::to_writer(writer, json)?;
    }
    Ok(())
}

/// Write a JSON document to a file
pub(crate) fn save<P: AsRef<Path>>(
    path: P,
    json: &Json,
    config: &SerializationConfig,
) -> Result<(), SerializationError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_json(&mut writer, json, config)?;
    writer.flush()?;
    tracing::debug!(path = %path.display(), "Saved parameters");
    Ok(())
}

/// Read a JSON document from a file
pub(crate) fn load<P: AsRef<Path>>(path: P) -> Result<Json, SerializationError> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    let json = serde_json::from_str(&contents)?;
    tracing::debug!(path = %path.display(), "Loaded parameters");
    Ok(json)
}
