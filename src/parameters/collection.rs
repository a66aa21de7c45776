//! Parameter collection implementation
//!
//! This module provides the ParameterCollection struct, the ordered set of
//! parameters belonging to one calculator. Names are unique and iteration
//! follows insertion order, which is also the order parameters are listed and
//! written to JSON.

use crate::config::SerializationConfig;
use crate::parameters::codec::{self, ParameterRecord, SerializationError};
use crate::parameters::parameter::{Parameter, ParameterError, ParameterUnit};
use crate::parameters::value::Value;
use crate::units::UnitRegistry;
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// An ordered, unique-keyed set of parameters
#[derive(Debug, Clone)]
pub struct ParameterCollection {
    parameters: IndexMap<String, Parameter>,
    registry: Arc<UnitRegistry>,
}

impl ParameterCollection {
    /// Create a new empty collection with its own unit registry
    ///
    /// # Examples
    ///
    /// ```
    /// use instrument_params::parameters::ParameterCollection;
    ///
    /// let params = ParameterCollection::new();
    /// assert_eq!(params.len(), 0);
    /// ```
    pub fn new() -> Self {
        Self::with_registry(Arc::new(UnitRegistry::new()))
    }

    /// Create a new empty collection that parses units with `registry`
    pub fn with_registry(registry: Arc<UnitRegistry>) -> Self {
        Self {
            parameters: IndexMap::new(),
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<UnitRegistry> {
        &self.registry
    }

    /// Add a parameter to the collection
    ///
    /// # Arguments
    ///
    /// * `param` - The parameter to add
    ///
    /// # Returns
    ///
    /// `Ok(())` if the parameter was added, or `DuplicateParameter` if a
    /// parameter with the same name already exists
    ///
    /// # Examples
    ///
    /// ```
    /// use instrument_params::parameters::{Parameter, ParameterCollection};
    ///
    /// let mut params = ParameterCollection::new();
    /// params.add(Parameter::new("energy")).unwrap();
    /// assert!(params.add(Parameter::new("energy")).is_err());
    /// assert_eq!(params.len(), 1);
    /// ```
    pub fn add(&mut self, param: Parameter) -> Result<(), ParameterError> {
        if self.parameters.contains_key(param.name()) {
            return Err(ParameterError::DuplicateParameter {
                name: param.name().to_string(),
            });
        }

        tracing::debug!(parameter = %param.name(), "Adding parameter");
        self.parameters.insert(param.name().to_string(), param);
        Ok(())
    }

    /// Add several parameters at once
    ///
    /// Nothing is added if any name is already present or appears twice in
    /// `params`.
    pub fn add_all<I>(&mut self, params: I) -> Result<(), ParameterError>
    where
        I: IntoIterator<Item = Parameter>,
    {
        let params: Vec<Parameter> = params.into_iter().collect();

        let mut seen = HashSet::new();
        for param in &params {
            if self.parameters.contains_key(param.name()) || !seen.insert(param.name()) {
                return Err(ParameterError::DuplicateParameter {
                    name: param.name().to_string(),
                });
            }
        }

        for param in params {
            self.add(param)?;
        }
        Ok(())
    }

    /// Construct a parameter and add it to the collection
    ///
    /// Unit text is resolved against the collection's registry; text the
    /// registry does not know is kept verbatim.
    ///
    /// # Returns
    ///
    /// A mutable reference to the new parameter, ready for constraints
    ///
    /// # Examples
    ///
    /// ```
    /// use instrument_params::parameters::ParameterCollection;
    ///
    /// let mut params = ParameterCollection::new();
    /// let energy = params
    ///     .new_parameter("energy", Some("eV"), Some("Source energy"))
    ///     .unwrap();
    /// energy.add_interval(0, 1e6, true).unwrap();
    /// params.set("energy", 4000).unwrap();
    /// assert_eq!(params.parameter("energy").unwrap().value_as_f64(), Some(4000.0));
    /// ```
    pub fn new_parameter(
        &mut self,
        name: &str,
        unit: Option<&str>,
        comment: Option<&str>,
    ) -> Result<&mut Parameter, ParameterError> {
        let mut param = Parameter::new(name);
        if let Some(unit) = unit {
            param = param.with_unit(ParameterUnit::parse(unit, &self.registry));
        }
        if let Some(comment) = comment {
            param = param.with_comment(comment);
        }

        self.add(param)?;
        self.parameter_mut(name)
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.parameters.get_mut(name)
    }

    /// Like [`get`](Self::get), with a `ParameterNotFound` error
    pub fn parameter(&self, name: &str) -> Result<&Parameter, ParameterError> {
        self.parameters
            .get(name)
            .ok_or_else(|| ParameterError::ParameterNotFound {
                name: name.to_string(),
            })
    }

    pub fn parameter_mut(&mut self, name: &str) -> Result<&mut Parameter, ParameterError> {
        self.parameters
            .get_mut(name)
            .ok_or_else(|| ParameterError::ParameterNotFound {
                name: name.to_string(),
            })
    }

    /// Set the value of the named parameter, with the usual legality checks
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ParameterError> {
        self.parameter_mut(name)?.set_value(value)
    }

    /// Remove a parameter, keeping the order of the rest
    pub fn remove(&mut self, name: &str) -> Option<Parameter> {
        self.parameters.shift_remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Parameter names in insertion order
    pub fn names(&self) -> Vec<String> {
        self.parameters.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Parameter)> {
        self.parameters.iter().map(|(name, param)| (name.as_str(), param))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Parameter)> {
        self.parameters
            .iter_mut()
            .map(|(name, param)| (name.as_str(), param))
    }

    /// Listing with one line per parameter, every line indented by `indent`
    pub fn listing(&self, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let mut text = format!("{} - Parameters object -\n", pad);
        for param in self.parameters.values() {
            text.push_str(&format!("{}{}\n", pad, param.summary_line()));
        }
        text
    }

    pub fn to_records(&self) -> IndexMap<String, ParameterRecord> {
        self.parameters
            .iter()
            .map(|(name, param)| (name.clone(), ParameterRecord::from_parameter(param)))
            .collect()
    }

    /// JSON object keyed by parameter name
    pub fn to_dict(&self) -> Result<serde_json::Value, SerializationError> {
        Ok(serde_json::to_value(self.to_records())?)
    }

    /// Rebuild a collection from [`to_dict`](Self::to_dict) output with a
    /// fresh unit registry
    pub fn from_dict(dict: &serde_json::Value) -> Result<Self, SerializationError> {
        Self::from_dict_with_registry(dict, Arc::new(UnitRegistry::new()))
    }

    pub fn from_dict_with_registry(
        dict: &serde_json::Value,
        registry: Arc<UnitRegistry>,
    ) -> Result<Self, SerializationError> {
        let records = IndexMap::<String, ParameterRecord>::deserialize(dict)?;
        Self::from_records(records, registry)
    }

    pub(crate) fn from_records(
        records: IndexMap<String, ParameterRecord>,
        registry: Arc<UnitRegistry>,
    ) -> Result<Self, SerializationError> {
        let mut collection = Self::with_registry(registry);
        for (key, record) in records {
            if key != record.name {
                return Err(SerializationError::invalid(format!(
                    "entry '{}' holds a parameter named '{}'",
                    key, record.name
                )));
            }
            let param = record.to_parameter(&collection.registry)?;
            collection.add(param)?;
        }
        Ok(collection)
    }

    /// Save the collection to a JSON file, pretty-printed with a four space
    /// indent
    pub fn to_json<P: AsRef<Path>>(&self, path: P) -> Result<(), SerializationError> {
        self.to_json_with(path, &SerializationConfig::default())
    }

    pub fn to_json_with<P: AsRef<Path>>(
        &self,
        path: P,
        config: &SerializationConfig,
    ) -> Result<(), SerializationError> {
        codec::save(path, &self.to_dict()?, config)
    }

    pub fn to_json_string(&self) -> Result<String, SerializationError> {
        codec::to_string_with(&self.to_dict()?, &SerializationConfig::default())
    }

    /// Load a collection from a JSON file
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self, SerializationError> {
        Self::from_dict(&codec::load(path)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SerializationError> {
        let dict: serde_json::Value = serde_json::from_str(json)?;
        Self::from_dict(&dict)
    }
}

impl Default for ParameterCollection {
    fn default() -> Self {
        Self::new()
    }
}

/// Collections are equal when they hold equal parameters in the same order
impl PartialEq for ParameterCollection {
    fn eq(&self, other: &Self) -> bool {
        self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .zip(other.parameters.iter())
                .all(|(a, b)| a == b)
    }
}

impl fmt::Display for ParameterCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.listing(0))
    }
}
