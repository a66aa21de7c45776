//! Parameter store
//!
//! The store holds one [`ParameterCollection`] per registered owner (a
//! calculator of the instrument) together with the master parameters that
//! link them. It is serialized as one JSON object with the master parameters
//! under the reserved key `"Master"` and every owner under its id.

use crate::config::SerializationConfig;
use crate::parameters::codec::{self, ParameterRecord, SerializationError};
use crate::parameters::collection::ParameterCollection;
use crate::parameters::master::{MasterParameter, MasterParameterCollection};
use crate::parameters::parameter::{Parameter, ParameterError, ParameterUnit};
use crate::parameters::value::Value;
use crate::units::UnitRegistry;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Key of the master parameters in the serialized store
pub const MASTER_KEY: &str = "Master";

/// Parameters of every owner in an instrument, plus master parameters
#[derive(Debug, Clone)]
pub struct ParameterStore {
    owners: IndexMap<String, ParameterCollection>,
    master: MasterParameterCollection,
    registry: Arc<UnitRegistry>,
}

impl ParameterStore {
    /// Create an empty store with its own unit registry
    pub fn new() -> Self {
        Self::with_registry(Arc::new(UnitRegistry::new()))
    }

    /// Create an empty store whose master parameters parse units with
    /// `registry`
    pub fn with_registry(registry: Arc<UnitRegistry>) -> Self {
        Self {
            owners: IndexMap::new(),
            master: MasterParameterCollection::new(),
            registry,
        }
    }

    pub fn registry(&self) -> &Arc<UnitRegistry> {
        &self.registry
    }

    /// Register the parameters of an owner
    ///
    /// # Arguments
    ///
    /// * `owner` - Id of the owner, typically the calculator name
    /// * `collection` - The owner's parameters
    ///
    /// # Returns
    ///
    /// `Ok(())`, `DuplicateOwner` if the id is taken, or `ReservedOwner` for
    /// `"Master"`
    pub fn add(&mut self, owner: &str, collection: ParameterCollection) -> Result<(), ParameterError> {
        if owner == MASTER_KEY {
            return Err(ParameterError::ReservedOwner {
                owner: owner.to_string(),
            });
        }
        if self.owners.contains_key(owner) {
            return Err(ParameterError::DuplicateOwner {
                owner: owner.to_string(),
            });
        }

        tracing::debug!(owner, parameters = collection.len(), "Registering owner");
        self.owners.insert(owner.to_string(), collection);
        Ok(())
    }

    pub fn get(&self, owner: &str) -> Option<&ParameterCollection> {
        self.owners.get(owner)
    }

    pub fn get_mut(&mut self, owner: &str) -> Option<&mut ParameterCollection> {
        self.owners.get_mut(owner)
    }

    /// Like [`get`](Self::get), with an `UnknownOwner` error
    pub fn owner(&self, owner: &str) -> Result<&ParameterCollection, ParameterError> {
        self.owners
            .get(owner)
            .ok_or_else(|| ParameterError::UnknownOwner {
                owner: owner.to_string(),
            })
    }

    pub fn owner_mut(&mut self, owner: &str) -> Result<&mut ParameterCollection, ParameterError> {
        self.owners
            .get_mut(owner)
            .ok_or_else(|| ParameterError::UnknownOwner {
                owner: owner.to_string(),
            })
    }

    /// Remove an owner and its parameters
    ///
    /// Master links to the owner are kept; writing such a master parameter
    /// fails with `UnknownOwner` until an owner with the same id is added
    /// again.
    pub fn remove(&mut self, owner: &str) -> Option<ParameterCollection> {
        let removed = self.owners.shift_remove(owner)?;

        let dangling: Vec<&str> = self
            .master
            .iter()
            .filter(|(_, master)| master.links().contains_key(owner))
            .map(|(name, _)| name)
            .collect();
        if !dangling.is_empty() {
            tracing::warn!(owner, masters = ?dangling, "Removed owner is still linked from master parameters");
        }

        Some(removed)
    }

    pub fn contains(&self, owner: &str) -> bool {
        self.owners.contains_key(owner)
    }

    /// Owner ids in registration order
    pub fn owner_ids(&self) -> Vec<String> {
        self.owners.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterCollection)> {
        self.owners.iter().map(|(owner, params)| (owner.as_str(), params))
    }

    pub fn master(&self) -> &MasterParameterCollection {
        &self.master
    }

    /// Mutable access to the master parameters for editing their constraints
    ///
    /// New master parameters only come in through
    /// [`add_master_parameter`](ParameterStore::add_master_parameter), so
    /// links to unregistered owners cannot be slipped in here:
    ///
    /// ```compile_fail
    /// use indexmap::IndexMap;
    /// use instrument_params::parameters::{MasterParameter, Parameter, ParameterStore};
    ///
    /// let mut links = IndexMap::new();
    /// links.insert("Ghost".to_string(), "z".to_string());
    /// let mut store = ParameterStore::new();
    /// store
    ///     .master_mut()
    ///     .add(MasterParameter::new(Parameter::new("p"), links))
    ///     .unwrap();
    /// ```
    pub fn master_mut(&mut self) -> &mut MasterParameterCollection {
        &mut self.master
    }

    /// Add a master parameter linked to parameters of registered owners
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the master parameter
    /// * `links` - Pairs of owner id and the name of the owner's parameter
    /// * `unit` - Optional unit text
    /// * `comment` - Optional description
    ///
    /// # Returns
    ///
    /// A mutable reference to the new master parameter, or `UnknownOwner` if
    /// a link names an owner that is not registered
    ///
    /// # Examples
    ///
    /// ```
    /// use instrument_params::parameters::{ParameterCollection, ParameterStore};
    ///
    /// let mut top = ParameterCollection::new();
    /// top.new_parameter("absorption", Some("barn"), None).unwrap();
    /// let mut bottom = ParameterCollection::new();
    /// bottom.new_parameter("absorption", Some("barn"), None).unwrap();
    ///
    /// let mut store = ParameterStore::new();
    /// store.add("Sample top", top).unwrap();
    /// store.add("Sample bottom", bottom).unwrap();
    /// store
    ///     .add_master_parameter(
    ///         "absorption",
    ///         [("Sample top", "absorption"), ("Sample bottom", "absorption")],
    ///         Some("barn"),
    ///         None,
    ///     )
    ///     .unwrap();
    ///
    /// store.set_master("absorption", 3.4).unwrap();
    /// let bottom = store.owner("Sample bottom").unwrap();
    /// assert_eq!(bottom.parameter("absorption").unwrap().value_as_f64(), Some(3.4));
    /// ```
    pub fn add_master_parameter<I, K, V>(
        &mut self,
        name: &str,
        links: I,
        unit: Option<&str>,
        comment: Option<&str>,
    ) -> Result<&mut MasterParameter, ParameterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let links: IndexMap<String, String> = links
            .into_iter()
            .map(|(owner, target)| (owner.into(), target.into()))
            .collect();
        self.check_links(&links)?;

        let mut param = Parameter::new(name);
        if let Some(unit) = unit {
            param = param.with_unit(ParameterUnit::parse(unit, &self.registry));
        }
        if let Some(comment) = comment {
            param = param.with_comment(comment);
        }

        self.master.add(MasterParameter::new(param, links))?;
        self.master
            .get_mut(name)
            .ok_or_else(|| ParameterError::ParameterNotFound {
                name: name.to_string(),
            })
    }

    /// Write a value to a master parameter and every parameter it links to
    ///
    /// All-or-nothing: if the master or any linked parameter rejects the
    /// value, nothing in the store changes.
    pub fn set_master(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ParameterError> {
        self.master.set(name, value.into(), &mut self.owners)
    }

    fn check_links(&self, links: &IndexMap<String, String>) -> Result<(), ParameterError> {
        match links.keys().find(|owner| !self.owners.contains_key(owner.as_str())) {
            Some(owner) => Err(ParameterError::UnknownOwner {
                owner: owner.clone(),
            }),
            None => Ok(()),
        }
    }

    /// JSON object with the master parameters under `"Master"` followed by
    /// every owner
    pub fn to_dict(&self) -> Result<serde_json::Value, SerializationError> {
        let mut dict = serde_json::Map::new();
        dict.insert(
            MASTER_KEY.to_string(),
            serde_json::to_value(self.master.to_records())?,
        );
        for (owner, collection) in &self.owners {
            dict.insert(owner.clone(), collection.to_dict()?);
        }
        Ok(serde_json::Value::Object(dict))
    }

    /// Rebuild a store from [`to_dict`](Self::to_dict) output with a fresh
    /// unit registry
    pub fn from_dict(dict: &serde_json::Value) -> Result<Self, SerializationError> {
        Self::from_dict_with_registry(dict, Arc::new(UnitRegistry::new()))
    }

    /// Rebuild a store, sharing `registry` between the store and every owner
    ///
    /// Master links are checked against the restored owners.
    pub fn from_dict_with_registry(
        dict: &serde_json::Value,
        registry: Arc<UnitRegistry>,
    ) -> Result<Self, SerializationError> {
        let entries = dict
            .as_object()
            .ok_or_else(|| SerializationError::invalid("a parameter store must be a JSON object"))?;

        let mut store = Self::with_registry(Arc::clone(&registry));
        for (owner, collection) in entries.iter().filter(|(key, _)| key.as_str() != MASTER_KEY) {
            let collection =
                ParameterCollection::from_dict_with_registry(collection, Arc::clone(&registry))?;
            store.add(owner, collection)?;
        }

        if let Some(master) = entries.get(MASTER_KEY) {
            let records = IndexMap::<String, ParameterRecord>::deserialize(master)?;
            for (key, record) in records {
                if key != record.name {
                    return Err(SerializationError::invalid(format!(
                        "master entry '{}' holds a parameter named '{}'",
                        key, record.name
                    )));
                }
                let links = record.links.clone().unwrap_or_default();
                store.check_links(&links)?;
                let param = record.to_parameter(&registry)?;
                store.master.add(MasterParameter::new(param, links))?;
            }
        }

        Ok(store)
    }

    /// Save the store to a JSON file, pretty-printed with a four space indent
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

    /// Load a store from a JSON file
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self, SerializationError> {
        Self::from_dict(&codec::load(path)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, SerializationError> {
        let dict: serde_json::Value = serde_json::from_str(json)?;
        Self::from_dict(&dict)
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Stores are equal when owners and master parameters match, in order
impl PartialEq for ParameterStore {
    fn eq(&self, other: &Self) -> bool {
        self.master == other.master
            && self.owners.len() == other.owners.len()
            && self.owners.iter().zip(other.owners.iter()).all(|(a, b)| a == b)
    }
}

impl fmt::Display for ParameterStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- ParametersCollection object -")?;
        write!(f, "{}", self.master.listing(2))?;
        writeln!(f)?;
        for (owner, collection) in &self.owners {
            writeln!(f, "   {}", owner)?;
            write!(f, "{}", collection.listing(3))?;
            writeln!(f)?;
        }
        Ok(())
    }
}
