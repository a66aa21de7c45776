//! # Parameter System
//!
//! This module provides typed, unit-aware, constrained parameters for the
//! calculators of a simulation pipeline, and the store that ties the
//! calculators' parameters together.
//!
//! ## Key Features
//!
//! - **Unit-aware values**: Numbers given to a parameter with a unit are stored as quantities in that unit
//! - **Type pinning**: The first value, bound or option fixes the parameter's type
//! - **Legality constraints**: Legal or illegal intervals and options, with options taking precedence
//! - **Master parameters**: One write fans out to linked parameters of several calculators, all-or-nothing
//! - **Serialization Support**: Save and load collections and stores as JSON
//!
//! ## Core Components
//!
//! - [`Parameter`]: A single named value cell with unit, comment and constraints
//! - [`ParameterCollection`]: The ordered parameters of one calculator
//! - [`MasterParameter`] and [`MasterParameterCollection`]: Parameters linked across calculators
//! - [`ParameterStore`]: All calculators' parameters plus the master parameters
//! - [`Value`] and [`ValueKind`]: Candidate values and the types parameters pin to
//!
//! ## Example Usage
//!
//! ```rust
//! use instrument_params::parameters::{ParameterCollection, ParameterStore, Value};
//!
//! // Parameters of a source calculator
//! let mut source = ParameterCollection::new();
//! source
//!     .new_parameter("energy", Some("eV"), Some("Source energy"))
//!     .unwrap()
//!     .add_interval(0, 1e6, true)
//!     .unwrap();
//! source
//!     .new_parameter("gaussian", None, Some("Gaussian beam profile"))
//!     .unwrap()
//!     .add_option(vec![false, true], true)
//!     .unwrap();
//!
//! source.set("energy", 4000).unwrap();
//! source.set("gaussian", true).unwrap();
//! assert!(source.set("energy", -1).is_err());
//!
//! // Register it in a store
//! let mut store = ParameterStore::new();
//! store.add("source", source).unwrap();
//! let energy = store.owner("source").unwrap().parameter("energy").unwrap();
//! assert_eq!(energy.value(), Some(Value::Float(4000.0)));
//! ```

pub mod bounds;
pub mod codec;
pub mod collection;
pub mod master;
pub mod parameter;
pub mod store;
pub mod value;


// Re-export key types
pub use bounds::{Bound, Interval};
pub use codec::{decode_value, encode_value, ParameterRecord, SerializationError};
pub use collection::ParameterCollection;
pub use master::{MasterParameter, MasterParameterCollection};
pub use parameter::{Parameter, ParameterError, ParameterUnit};
pub use store::{ParameterStore, MASTER_KEY};
pub use value::{Value, ValueKind};
