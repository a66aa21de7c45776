//! # instrument-params
//!
//! `instrument-params` describes, validates and synchronizes the tunable
//! settings of the calculators that make up a simulation pipeline.
//!
//! The library provides:
//! - Physical units and quantities with a runtime unit registry
//! - Parameters with units, a pinned value type and legal or illegal intervals and options
//! - Ordered per-calculator parameter collections
//! - A store whose master parameters write one value into several calculators at once
//! - JSON round trips for collections and stores
//!
//! ## Basic Usage
//!
//! ```
//! use instrument_params::{ParameterCollection, ParameterStore};
//!
//! let mut sample = ParameterCollection::new();
//! sample
//!     .new_parameter("radius", Some("cm"), Some("Sample radius"))
//!     .unwrap()
//!     .add_interval(0, None::<i64>, true)
//!     .unwrap();
//!
//! let mut store = ParameterStore::new();
//! store.add("sample", sample).unwrap();
//! store
//!     .add_master_parameter("radius", [("sample", "radius")], Some("cm"), None)
//!     .unwrap();
//!
//! store.set_master("radius", 2.5).unwrap();
//! let json = store.to_json_string().unwrap();
//! let restored = ParameterStore::from_json_str(&json).unwrap();
//! assert_eq!(restored, store);
//! ```

// Public modules
pub mod config;
pub mod error;
pub mod parameters;
pub mod units;

// Re-exports for convenience
pub use config::SerializationConfig;
pub use error::{Error, Result};
pub use parameters::{
    Parameter, ParameterCollection, ParameterError, ParameterStore, SerializationError, Value,
};
pub use units::{Quantity, Unit, UnitError, UnitRegistry};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
