//! Master parameters
//!
//! A master parameter is an ordinary [`Parameter`] with a link table mapping
//! owner ids to parameter names. Writing a value to it through
//! [`ParameterStore::set_master`](super::ParameterStore::set_master) writes the
//! same value to every linked parameter.

use crate::parameters::codec::ParameterRecord;
use crate::parameters::collection::ParameterCollection;
use crate::parameters::parameter::{Parameter, ParameterError};
use crate::parameters::value::Value;
use indexmap::IndexMap;
use std::ops::{Deref, DerefMut};

/// A parameter whose writes fan out to parameters of several owners
///
/// Dereferences to the wrapped [`Parameter`], so constraints are added the
/// usual way. Setting the value directly on the master does not propagate.
#[derive(Debug, Clone, PartialEq)]
pub struct MasterParameter {
    parameter: Parameter,
    links: IndexMap<String, String>,
}

impl MasterParameter {
    /// Wrap `parameter` with a link table of owner id to parameter name
    pub fn new(parameter: Parameter, links: IndexMap<String, String>) -> Self {
        Self { parameter, links }
    }

    pub fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    pub fn links(&self) -> &IndexMap<String, String> {
        &self.links
    }

    pub fn into_parameter(self) -> Parameter {
        self.parameter
    }
}

impl Deref for MasterParameter {
    type Target = Parameter;

    fn deref(&self) -> &Parameter {
        &self.parameter
    }
}

impl DerefMut for MasterParameter {
    fn deref_mut(&mut self) -> &mut Parameter {
        &mut self.parameter
    }
}

/// The master parameters of a [`ParameterStore`](super::ParameterStore)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MasterParameterCollection {
    parameters: IndexMap<String, MasterParameter>,
}

impl MasterParameterCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a master parameter; names are unique as in a [`ParameterCollection`]
    ///
    /// Links are not checked here. Callers go through
    /// [`ParameterStore::add_master_parameter`](super::ParameterStore::add_master_parameter)
    /// or store loading, which check every owner first.
    pub(crate) fn add(&mut self, master: MasterParameter) -> Result<(), ParameterError> {
        if self.parameters.contains_key(master.name()) {
            return Err(ParameterError::DuplicateParameter {
                name: master.name().to_string(),
            });
        }

        tracing::debug!(
            parameter = %master.name(),
            links = master.links.len(),
            "Adding master parameter"
        );
        self.parameters.insert(master.name().to_string(), master);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&MasterParameter> {
        self.parameters.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut MasterParameter> {
        self.parameters.get_mut(name)
    }

    /// The link table of the named master parameter
    pub fn links_of(&self, name: &str) -> Option<&IndexMap<String, String>> {
        self.parameters.get(name).map(MasterParameter::links)
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

    pub fn names(&self) -> Vec<String> {
        self.parameters.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MasterParameter)> {
        self.parameters.iter().map(|(name, master)| (name.as_str(), master))
    }

    /// Write `value` to the named master parameter and every linked parameter
    ///
    /// The write is all-or-nothing. The value is first checked against the
    /// master's own constraints, then every link is resolved and checked
    /// against the target's constraints. Only when all checks pass are the
    /// targets written, in link order, followed by the master itself.
    pub(crate) fn set(
        &mut self,
        name: &str,
        value: Value,
        owners: &mut IndexMap<String, ParameterCollection>,
    ) -> Result<(), ParameterError> {
        let master = self
            .parameters
            .get_mut(name)
            .ok_or_else(|| ParameterError::ParameterNotFound {
                name: name.to_string(),
            })?;

        master.validate_value(&value)?;

        for (owner, target) in &master.links {
            let collection = owners
                .get(owner)
                .ok_or_else(|| ParameterError::UnknownOwner {
                    owner: owner.clone(),
                })?;

            collection
                .parameter(target)?
                .validate_value(&value)
                .map_err(|e| match e {
                    ParameterError::IllegalValue { value, .. } => {
                        ParameterError::IllegalLinkedValue {
                            master: name.to_string(),
                            owner: owner.clone(),
                            parameter: target.clone(),
                            value,
                        }
                    }
                    other => other,
                })?;
        }

        for (owner, target) in &master.links {
            if let Some(collection) = owners.get_mut(owner) {
                collection.set(target, value.clone())?;
            }
        }

        tracing::debug!(
            master = %name,
            value = %value,
            targets = master.links.len(),
            "Propagated master parameter"
        );
        master.set_value(value)
    }

    pub(crate) fn to_records(&self) -> IndexMap<String, ParameterRecord> {
        self.parameters
            .iter()
            .map(|(name, master)| {
                let mut record = ParameterRecord::from_parameter(master);
                record.links = Some(master.links.clone());
                (name.clone(), record)
            })
            .collect()
    }

    /// Listing with one line per master parameter
    pub fn listing(&self, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let mut text = String::new();
        if !self.parameters.is_empty() {
            text.push_str(&format!("{}Master Parameters\n", pad));
        }
        for master in self.parameters.values() {
            text.push_str(&format!("{}{}\n", pad, master.summary_line()));
        }
        text
    }
}
