//! Integration tests for the unit registry and quantities

use approx::assert_relative_eq;
use instrument_params::units::{Dimensions, Quantity, Unit, UnitRegistry};
use instrument_params::UnitError;

#[test]
fn test_beamline_units() {
    let registry = UnitRegistry::new();

    let energy = registry.parse_quantity("8.048 keV").unwrap();
    let ev = registry.parse_unit("eV").unwrap();
    assert_relative_eq!(energy.magnitude_in(&ev).unwrap(), 8048.0, max_relative = 1e-12);

    let cross_section = registry.parse_quantity("3.4 barns").unwrap();
    assert_relative_eq!(cross_section.base_value(), 3.4e-28, max_relative = 1e-12);

    let distance = registry.parse_quantity("250 mm").unwrap();
    let m = registry.parse_unit("m").unwrap();
    assert_relative_eq!(distance.magnitude_in(&m).unwrap(), 0.25, epsilon = 1e-12);
}

#[test]
fn test_compound_units() {
    let registry = UnitRegistry::new();
    let flux = registry.parse_unit("1/(s*mm^2)").unwrap();
    assert_eq!(flux.dims(), Dimensions::new([-2, 0, -1, 0, 0, 0, 0]));
    assert_relative_eq!(flux.factor(), 1e6, max_relative = 1e-12);

    let speed = registry.parse_quantity("36 km/h").unwrap();
    let mps = registry.parse_unit("m/s").unwrap();
    assert_relative_eq!(speed.magnitude_in(&mps).unwrap(), 10.0, epsilon = 1e-12);
}

#[test]
fn test_incompatible_conversion() {
    let registry = UnitRegistry::new();
    let length = registry.parse_quantity("1 m").unwrap();
    let second = registry.parse_unit("s").unwrap();

    assert!(!length.is_compatible_with(&second));
    assert!(matches!(
        length.to(&second),
        Err(UnitError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_quantity_comparison_across_units() {
    let registry = UnitRegistry::new();
    let a = registry.parse_quantity("1 km").unwrap();
    let b = registry.parse_quantity("1000 m").unwrap();
    let c = registry.parse_quantity("99999 cm").unwrap();

    assert_eq!(a, b);
    assert!(c < a);
    assert_eq!(a.partial_cmp(&registry.parse_quantity("1 s").unwrap()), None);
}

#[test]
fn test_malformed_quantities() {
    let registry = UnitRegistry::new();
    assert!(matches!(
        registry.parse_quantity("many eV"),
        Err(UnitError::InvalidQuantity { .. })
    ));
    assert!(matches!(
        registry.parse_quantity("3 furlongs"),
        Err(UnitError::UnknownUnit { .. })
    ));
    assert!(registry.parse_unit("m^").is_err());
}

#[test]
fn test_extending_the_registry() {
    let mut registry = UnitRegistry::new();
    registry
        .define("furlong", 201.168, Dimensions::LENGTH, false)
        .unwrap();
    registry.alias("fur", "furlong").unwrap();

    let q = registry.parse_quantity("2 furlongs").unwrap();
    let fur = registry.parse_unit("fur").unwrap();
    assert_relative_eq!(q.magnitude_in(&fur).unwrap(), 2.0);

    assert!(matches!(
        registry.define("m", 1.0, Dimensions::LENGTH, true),
        Err(UnitError::AlreadyDefined { .. })
    ));
    assert!(registry.alias("x", "unknown").is_err());

    // An empty registry knows nothing but dimensionless
    let empty = UnitRegistry::empty();
    assert!(!empty.contains("m"));
    assert!(empty.parse_unit("").unwrap().is_dimensionless());
}

#[test]
fn test_dimensionless_quantities() {
    let q = Quantity::dimensionless(0.5);
    assert!(q.unit().is_dimensionless());
    assert_eq!(q.unit(), &Unit::dimensionless());
    assert_eq!(q.to_string(), "0.5 dimensionless");
}

#[test]
fn test_exponents_out_of_range() {
    let registry = UnitRegistry::new();

    assert_eq!(
        registry.parse_unit("m^100*m^100").unwrap_err(),
        UnitError::ExponentOverflow
    );
    assert_eq!(
        registry.parse_unit("m^200").unwrap_err(),
        UnitError::ExponentOverflow
    );
    assert_eq!(
        registry.parse_unit("1/(s^100*s^100)").unwrap_err(),
        UnitError::ExponentOverflow
    );
    assert_eq!(
        registry.parse_quantity("2 m^300").unwrap_err(),
        UnitError::ExponentOverflow
    );

    // The edges of the range still parse
    assert_eq!(registry.parse_unit("m^127").unwrap().dims().length, 127);
    assert_eq!(registry.parse_unit("m^-128").unwrap().dims().length, -128);
}
