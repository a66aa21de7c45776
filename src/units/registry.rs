//! Unit registry: resolves unit names and expressions

use super::expression::{UnitExpr, UnitLookup};
use super::quantity::Quantity;
use super::unit::{Dimensions, Unit};
use super::UnitError;
use std::collections::HashMap;

const ENERGY: Dimensions = Dimensions::new([2, 1, -2, 0, 0, 0, 0]);
const FORCE: Dimensions = Dimensions::new([1, 1, -2, 0, 0, 0, 0]);
const PRESSURE: Dimensions = Dimensions::new([-1, 1, -2, 0, 0, 0, 0]);
const POWER: Dimensions = Dimensions::new([2, 1, -3, 0, 0, 0, 0]);
const CHARGE: Dimensions = Dimensions::new([0, 0, 1, 1, 0, 0, 0]);
const VOLTAGE: Dimensions = Dimensions::new([2, 1, -3, -1, 0, 0, 0]);
const RESISTANCE: Dimensions = Dimensions::new([2, 1, -3, -2, 0, 0, 0]);
const CAPACITANCE: Dimensions = Dimensions::new([-2, -1, 4, 2, 0, 0, 0]);
const MAGNETIC_FLUX_DENSITY: Dimensions = Dimensions::new([0, 1, -2, -1, 0, 0, 0]);
const FREQUENCY: Dimensions = Dimensions::new([0, 0, -1, 0, 0, 0, 0]);
const AREA: Dimensions = Dimensions::new([2, 0, 0, 0, 0, 0, 0]);
const VOLUME: Dimensions = Dimensions::new([3, 0, 0, 0, 0, 0, 0]);

/// SI prefixes, multi-character symbols before the single characters they start with
const SI_PREFIXES: [(&str, f64); 39] = [
    ("yotta", 1e24),
    ("zetta", 1e21),
    ("exa", 1e18),
    ("peta", 1e15),
    ("tera", 1e12),
    ("giga", 1e9),
    ("mega", 1e6),
    ("kilo", 1e3),
    ("hecto", 1e2),
    ("deca", 1e1),
    ("deci", 1e-1),
    ("centi", 1e-2),
    ("milli", 1e-3),
    ("micro", 1e-6),
    ("nano", 1e-9),
    ("pico", 1e-12),
    ("femto", 1e-15),
    ("atto", 1e-18),
    ("da", 1e1),
    ("Y", 1e24),
    ("Z", 1e21),
    ("E", 1e18),
    ("P", 1e15),
    ("T", 1e12),
    ("G", 1e9),
    ("M", 1e6),
    ("k", 1e3),
    ("h", 1e2),
    ("d", 1e-1),
    ("c", 1e-2),
    ("m", 1e-3),
    ("µ", 1e-6),
    ("μ", 1e-6),
    ("u", 1e-6),
    ("n", 1e-9),
    ("p", 1e-12),
    ("f", 1e-15),
    ("a", 1e-18),
    ("z", 1e-21),
];

#[derive(Debug, Clone, Copy, PartialEq)]
struct UnitDefinition {
    factor: f64,
    dims: Dimensions,
    prefixable: bool,
}

/// Table of known units
///
/// The registry is an ordinary value: build one with [`UnitRegistry::new`],
/// extend it with [`define`](UnitRegistry::define) and
/// [`alias`](UnitRegistry::alias), and share it (typically behind an `Arc`)
/// with the collections that need to parse unit text.
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    units: HashMap<String, UnitDefinition>,
}

impl UnitRegistry {
    /// Create a registry preloaded with SI base and derived units and the
    /// common non-SI units used for beamline and sample parameters
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.load_builtin();
        registry
    }

    /// Create a registry with no units at all
    pub fn empty() -> Self {
        Self {
            units: HashMap::new(),
        }
    }

    /// Define a new unit
    ///
    /// # Arguments
    ///
    /// * `name` - Name the unit is looked up by
    /// * `factor` - Coherent SI units per one of this unit
    /// * `dims` - Dimensions of the unit
    /// * `prefixable` - Whether SI prefixes may be attached (`k`, `m`, ...)
    ///
    /// # Returns
    ///
    /// `Ok(())`, or `UnitError::AlreadyDefined` if the name is taken
    pub fn define(
        &mut self,
        name: &str,
        factor: f64,
        dims: Dimensions,
        prefixable: bool,
    ) -> Result<(), UnitError> {
        if self.units.contains_key(name) {
            return Err(UnitError::AlreadyDefined {
                name: name.to_string(),
            });
        }
        self.units.insert(
            name.to_string(),
            UnitDefinition {
                factor,
                dims,
                prefixable,
            },
        );
        Ok(())
    }

    /// Register `alias` as another name for the already defined `target`
    pub fn alias(&mut self, alias: &str, target: &str) -> Result<(), UnitError> {
        let definition = *self.units.get(target).ok_or_else(|| UnitError::UnknownUnit {
            name: target.to_string(),
        })?;
        if self.units.contains_key(alias) {
            return Err(UnitError::AlreadyDefined {
                name: alias.to_string(),
            });
        }
        self.units.insert(alias.to_string(), definition);
        Ok(())
    }

    /// Whether `name` resolves to a unit, with prefixes and plurals applied
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_ok()
    }

    /// Parse unit text into a [`Unit`]
    ///
    /// Empty text and `dimensionless` give the dimensionless unit. The
    /// returned unit keeps the trimmed text as its symbol.
    pub fn parse_unit(&self, text: &str) -> Result<Unit, UnitError> {
        let text = text.trim();
        if text.is_empty() || text == "dimensionless" {
            return Ok(Unit::dimensionless());
        }

        let expr = UnitExpr::parse(text)?;
        let (factor, dims) = expr.evaluate(self)?;
        Ok(Unit::new(text, factor, dims))
    }

    /// Parse quantity text of the form `"<magnitude> <unit>"`
    ///
    /// The magnitude accepts scientific notation and `inf`/`-inf`. Text with
    /// no unit part is a dimensionless quantity.
    pub fn parse_quantity(&self, text: &str) -> Result<Quantity, UnitError> {
        let text = text.trim();
        let (magnitude_text, unit_text) = match text.split_once(char::is_whitespace) {
            Some((magnitude, unit)) => (magnitude, unit),
            None => (text, ""),
        };

        let magnitude: f64 = magnitude_text
            .parse()
            .map_err(|_| UnitError::InvalidQuantity {
                input: text.to_string(),
                message: format!("'{}' is not a number", magnitude_text),
            })?;

        let unit = self.parse_unit(unit_text)?;
        Ok(Quantity::new(magnitude, unit))
    }

    fn load_builtin(&mut self) {
        let d = Dimensions::DIMENSIONLESS;
        let builtin: [(&[&str], f64, Dimensions, bool); 42] = [
            // SI base units
            (&["m", "meter", "metre"], 1.0, Dimensions::LENGTH, true),
            (&["g", "gram"], 1e-3, Dimensions::MASS, true),
            (&["s", "second", "sec"], 1.0, Dimensions::TIME, true),
            (&["A", "ampere", "amp"], 1.0, Dimensions::CURRENT, true),
            (&["K", "kelvin"], 1.0, Dimensions::TEMPERATURE, true),
            (&["mol", "mole"], 1.0, Dimensions::AMOUNT, true),
            (&["cd", "candela"], 1.0, Dimensions::LUMINOSITY, true),
            // SI derived units
            (&["Hz", "hertz"], 1.0, FREQUENCY, true),
            (&["N", "newton"], 1.0, FORCE, true),
            (&["Pa", "pascal"], 1.0, PRESSURE, true),
            (&["J", "joule"], 1.0, ENERGY, true),
            (&["W", "watt"], 1.0, POWER, true),
            (&["C", "coulomb"], 1.0, CHARGE, true),
            (&["V", "volt"], 1.0, VOLTAGE, true),
            (&["ohm", "Ω"], 1.0, RESISTANCE, true),
            (&["F", "farad"], 1.0, CAPACITANCE, true),
            (&["T", "tesla"], 1.0, MAGNETIC_FLUX_DENSITY, true),
            (&["rad", "radian"], 1.0, d, true),
            (&["sr", "steradian"], 1.0, d, false),
            // Energy and cross sections used by radiation calculators
            (&["eV", "electron_volt", "electronvolt"], 1.602176634e-19, ENERGY, true),
            (&["barn"], 1e-28, AREA, true),
            (&["Å", "angstrom"], 1e-10, Dimensions::LENGTH, false),
            // Time
            (&["min", "minute"], 60.0, Dimensions::TIME, false),
            (&["h", "hr", "hour"], 3600.0, Dimensions::TIME, false),
            (&["day"], 86400.0, Dimensions::TIME, false),
            // Length
            (&["inch"], 0.0254, Dimensions::LENGTH, false),
            (&["ft", "foot"], 0.3048, Dimensions::LENGTH, false),
            // Mass
            (&["t", "tonne"], 1e3, Dimensions::MASS, false),
            (&["Da", "dalton"], 1.66053906660e-27, Dimensions::MASS, true),
            // Volume
            (&["L", "l", "liter", "litre"], 1e-3, VOLUME, true),
            // Pressure
            (&["bar"], 1e5, PRESSURE, true),
            (&["atm", "atmosphere"], 101_325.0, PRESSURE, false),
            (&["psi"], 6_894.757_293_168_361, PRESSURE, false),
            // Angles and ratios
            (&["deg", "degree"], std::f64::consts::PI / 180.0, d, false),
            (&["percent"], 0.01, d, false),
            (&["ppm"], 1e-6, d, false),
            (&["dimensionless"], 1.0, d, false),
            (&["count", "counts"], 1.0, d, false),
            // Energy, non-SI
            (&["cal", "calorie"], 4.184, ENERGY, true),
            (&["erg"], 1e-7, ENERGY, false),
            // Power, non-SI
            (&["hp", "horsepower"], 745.699_871_582_270_2, POWER, false),
            // Volume, non-SI
            (&["gal", "gallon"], 3.785_411_784e-3, VOLUME, false),
        ];

        for (names, factor, dims, prefixable) in builtin {
            for name in names {
                self.units.insert(
                    name.to_string(),
                    UnitDefinition {
                        factor,
                        dims,
                        prefixable,
                    },
                );
            }
        }
    }

    fn lookup_exact_or_prefixed(&self, name: &str) -> Option<(f64, Dimensions)> {
        if let Some(def) = self.units.get(name) {
            return Some((def.factor, def.dims));
        }

        SI_PREFIXES.iter().find_map(|(prefix, scale)| {
            let rest = name.strip_prefix(prefix)?;
            if rest.is_empty() {
                return None;
            }
            let def = self.units.get(rest)?;
            def.prefixable.then_some((def.factor * scale, def.dims))
        })
    }
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitLookup for UnitRegistry {
    fn lookup(&self, name: &str) -> Result<(f64, Dimensions), UnitError> {
        if let Some(found) = self.lookup_exact_or_prefixed(name) {
            return Ok(found);
        }

        // Plural forms of long names: "meters", "barns", "kiloelectronvolts"
        if name.chars().count() > 3 {
            if let Some(singular) = name.strip_suffix('s') {
                if let Some(found) = self.lookup_exact_or_prefixed(singular) {
                    return Ok(found);
                }
            }
        }

        Err(UnitError::UnknownUnit {
            name: name.to_string(),
        })
    }
}
