//! # Unit System
//!
//! Physical units and quantities used by the parameter system.
//!
//! A [`Unit`] is a scale factor to coherent SI plus a [`Dimensions`] vector, so
//! two units are convertible exactly when their dimensions agree. A
//! [`Quantity`] pairs a magnitude with a unit and compares across compatible
//! units. Unit text such as `"meV"`, `"kg*m^2/s^2"` or `"1/s"` is resolved by a
//! [`UnitRegistry`], which is passed explicitly to whatever needs to parse units;
//! there is no process-wide registry.
//!
//! ```rust
//! use instrument_params::units::UnitRegistry;
//!
//! let registry = UnitRegistry::new();
//! let cm = registry.parse_unit("cm").unwrap();
//! let length = registry.parse_quantity("5.5e4 cm").unwrap();
//!
//! let meters = length.to(&registry.parse_unit("m").unwrap()).unwrap();
//! assert!((meters.magnitude() - 550.0).abs() < 1e-9);
//! assert_eq!(cm.symbol(), "cm");
//! ```

pub mod expression;
pub mod quantity;
pub mod registry;
pub mod unit;

pub use expression::UnitExpr;
pub use quantity::Quantity;
pub use registry::UnitRegistry;
pub use unit::{Dimensions, Unit};

use thiserror::Error;

/// Errors raised while parsing units or converting quantities
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitError {
    #[error("Failed to parse unit expression '{input}': {message}")]
    ParseError { input: String, message: String },

    #[error("Unknown unit '{name}'")]
    UnknownUnit { name: String },

    #[error("Cannot convert from '{from}' to '{to}': dimensions differ")]
    DimensionMismatch { from: String, to: String },

    #[error("Invalid quantity '{input}': {message}")]
    InvalidQuantity { input: String, message: String },

    #[error("Unit '{name}' is already defined")]
    AlreadyDefined { name: String },

    #[error("Unit exponent out of range [-128, 127]")]
    ExponentOverflow,
}
