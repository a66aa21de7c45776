//! Quantities: magnitudes tagged with a unit

use super::unit::{approx_eq, Unit};
use super::UnitError;
use std::cmp::Ordering;
use std::fmt;

/// A numeric magnitude paired with a physical unit
///
/// Comparisons between quantities are unit-aware: `10 m` equals `1000 cm`,
/// and quantities with different dimensions are unordered.
#[derive(Debug, Clone)]
pub struct Quantity {
    magnitude: f64,
    unit: Unit,
}

impl Quantity {
    pub fn new(magnitude: f64, unit: Unit) -> Self {
        Self { magnitude, unit }
    }

    /// A pure number wrapped as a quantity
    pub fn dimensionless(magnitude: f64) -> Self {
        Self::new(magnitude, Unit::dimensionless())
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// The magnitude expressed in coherent SI units
    pub fn base_value(&self) -> f64 {
        self.magnitude * self.unit.factor()
    }

    /// Convert this quantity into another unit
    ///
    /// # Returns
    ///
    /// The converted quantity, or `UnitError::DimensionMismatch` if the units
    /// measure different things
    pub fn to(&self, unit: &Unit) -> Result<Quantity, UnitError> {
        let factor = self
            .unit
            .conversion_factor(unit)
            .ok_or_else(|| UnitError::DimensionMismatch {
                from: self.unit.symbol().to_string(),
                to: unit.symbol().to_string(),
            })?;

        // Infinite magnitudes keep their sign through any positive factor
        let magnitude = if self.magnitude.is_infinite() {
            self.magnitude
        } else {
            self.magnitude * factor
        };

        Ok(Quantity::new(magnitude, unit.clone()))
    }

    /// The magnitude expressed in `unit`
    pub fn magnitude_in(&self, unit: &Unit) -> Result<f64, UnitError> {
        self.to(unit).map(|q| q.magnitude)
    }

    pub fn is_compatible_with(&self, unit: &Unit) -> bool {
        self.unit.is_compatible_with(unit)
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.unit.dims() == other.unit.dims() && approx_eq(self.base_value(), other.base_value())
    }
}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.unit.dims() != other.unit.dims() {
            return None;
        }
        if self == other {
            return Some(Ordering::Equal);
        }
        self.base_value().partial_cmp(&other.base_value())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, self.unit.symbol())
    }
}
