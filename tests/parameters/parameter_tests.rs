//! Integration tests for the Parameter struct
//!
//! These tests verify that the Parameter struct behaves correctly in various scenarios.

use instrument_params::parameters::{Bound, Parameter, ParameterError, ParameterUnit, Value, ValueKind};
use instrument_params::UnitRegistry;

use crate::test_helpers::{approx_eq, init_tracing};

fn unit(text: &str) -> ParameterUnit {
    ParameterUnit::parse(text, &UnitRegistry::new())
}

#[test]
fn test_parameter_lifecycle() {
    // Create a parameter
    let mut param = Parameter::new("energy")
        .with_unit(unit("eV"))
        .with_comment("Source energy");

    // Check initial state
    assert_eq!(param.name(), "energy");
    assert_eq!(param.unit().map(|u| u.as_str()), Some("eV"));
    assert_eq!(param.comment(), Some("Source energy"));
    assert!(param.value().is_none());
    assert!(param.value_type().is_none());
    assert!(param.intervals().is_empty());
    assert!(param.options().is_empty());
    assert!(param.intervals_are_legal().is_none());
    assert!(param.options_are_legal().is_none());

    // Constrain, then set
    param.add_interval(0, 1e6, true).unwrap();
    assert_eq!(param.value_type(), Some(ValueKind::Quantity));
    param.set_value(6000).unwrap();
    assert_eq!(param.value(), Some(Value::Float(6000.0)));
    assert!(param.is_current_value_legal());

    // Rejected writes leave the value alone
    assert!(param.set_value(-1).is_err());
    assert!(param.set_value(2e6).is_err());
    assert_eq!(param.value_as_f64(), Some(6000.0));

    // Comments stay editable, units do not
    param.set_comment(None);
    assert!(param.comment().is_none());
    assert!(matches!(
        param.set_unit(Some(unit("keV"))),
        Err(ParameterError::UnitLocked { .. })
    ));
}

#[test]
fn test_unit_changes_before_first_use() {
    let mut param = Parameter::new("distance");
    param.set_unit(Some(unit("m"))).unwrap();
    param.set_unit(Some(unit("cm"))).unwrap();
    assert_eq!(param.known_unit().map(|u| u.symbol()), Some("cm"));

    param.set_value(12).unwrap();
    assert!(param.set_unit(None).is_err());
}

#[test]
fn test_type_pinning() {
    let mut param = Parameter::new("n_rays");
    param.set_value(1000).unwrap();
    assert_eq!(param.value_type(), Some(ValueKind::Int));

    // Ints widen to numbers, nothing else is accepted
    param.set_value(1000.5).unwrap();
    assert_eq!(param.value_type(), Some(ValueKind::Quantity));
    assert_eq!(param.value(), Some(Value::Float(1000.5)));

    let err = param.set_value("many").unwrap_err();
    match err {
        ParameterError::TypeMismatch {
            name,
            expected,
            found,
        } => {
            assert_eq!(name, "n_rays");
            assert_ne!(expected, found);
        }
        other => panic!("Expected TypeMismatch, got {:?}", other),
    }
    assert!(matches!(
        param.set_value(true),
        Err(ParameterError::TypeMismatch { .. })
    ));
}

#[test]
fn test_string_parameter() {
    let mut param = Parameter::new("material");
    param.add_option(vec!["Si", "Ge"], true).unwrap();
    assert_eq!(param.value_type(), Some(ValueKind::Str));

    param.set_value("Ge").unwrap();
    assert_eq!(param.value(), Some(Value::from("Ge")));
    assert!(matches!(
        param.set_value("Cu"),
        Err(ParameterError::IllegalValue { .. })
    ));
    assert!(param.set_value(4).is_err());
    assert!(matches!(
        param.add_interval(0, 1, true),
        Err(ParameterError::TypeMismatch { .. })
    ));
}

#[test]
fn test_quantities_are_converted() {
    let registry = UnitRegistry::new();
    let mut param = Parameter::new("energy").with_unit(ParameterUnit::parse("eV", &registry));
    param.add_interval(0, None::<f64>, true).unwrap();

    param
        .set_value(registry.parse_quantity("4.5 keV").unwrap())
        .unwrap();
    assert!(approx_eq(param.value_as_f64().unwrap(), 4500.0, 1e-9));

    // The raw value keeps the unit
    match param.raw_value() {
        Some(Value::Quantity(q)) => assert_eq!(q.unit().symbol(), "eV"),
        other => panic!("Expected a quantity, got {:?}", other),
    }

    let err = param
        .set_value(registry.parse_quantity("2 m").unwrap())
        .unwrap_err();
    assert!(matches!(err, ParameterError::DimensionMismatch { .. }));
    assert!(approx_eq(param.value_as_f64().unwrap(), 4500.0, 1e-9));
}

#[test]
fn test_unitless_parameter_accepts_dimensionless_quantities_only() {
    let registry = UnitRegistry::new();
    let mut param = Parameter::new("ratio");
    param.set_value(0.25).unwrap();
    param
        .set_value(registry.parse_quantity("0.5").unwrap())
        .unwrap();
    assert_eq!(param.value(), Some(Value::Float(0.5)));
    assert!(matches!(
        param.set_value(registry.parse_quantity("0.5 m").unwrap()),
        Err(ParameterError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_opaque_unit_keeps_numbers_plain() {
    let mut param = Parameter::new("intensity").with_unit(unit("arb. units"));
    assert!(param.known_unit().is_none());

    param.set_value(3).unwrap();
    assert_eq!(param.value(), Some(Value::Int(3)));
    assert_eq!(param.value_type(), Some(ValueKind::Int));
}

#[test]
fn test_constraint_rejects_current_value() {
    let mut param = Parameter::new("thickness");
    param.set_value(7.0).unwrap();

    let err = param.add_interval(0, 5, true).unwrap_err();
    assert!(matches!(err, ParameterError::ConstraintRejectsValue { .. }));
    assert!(param.intervals().is_empty());
    assert!(param.intervals_are_legal().is_none());

    let err = param.add_option(7, false).unwrap_err();
    assert!(matches!(err, ParameterError::ConstraintRejectsValue { .. }));
    assert!(param.options().is_empty());
    assert!(param.options_are_legal().is_none());

    // Constraints that keep the value legal are fine
    param.add_interval(0, 10, true).unwrap();
    param.add_option(9, false).unwrap();
    assert!(param.is_current_value_legal());
}

#[test]
fn test_invalid_bounds() {
    let mut param = Parameter::new("angle");
    assert!(matches!(
        param.add_interval(10, 1, true),
        Err(ParameterError::InvalidBound { .. })
    ));
    assert!(matches!(
        param.add_interval(Value::from("low"), 1, true),
        Err(ParameterError::InvalidBound { .. })
    ));
    assert!(matches!(
        param.add_interval(Value::from(true), 1, true),
        Err(ParameterError::InvalidBound { .. })
    ));
    assert!(param.intervals().is_empty());
    assert!(param.value_type().is_none());

    // A single point is a valid closed interval
    param.add_interval(45, 45, true).unwrap();
    assert!(param.is_legal(&Value::from(45)));
    assert!(!param.is_legal(&Value::from(45.5)));
}

#[test]
fn test_unbounded_intervals() {
    let mut param = Parameter::new("position");
    param.add_interval(Bound::Unbounded, Bound::Unbounded, true).unwrap();

    // Unbounded sides do not pin the type
    assert!(param.value_type().is_none());
    assert!(param.is_legal(&Value::from(-1e300)));
    assert!(param.is_legal(&Value::from(1e300)));
    param.set_value(0).unwrap();
    assert_eq!(param.value_type(), Some(ValueKind::Int));
}

#[test]
fn test_polarity_conflicts_are_atomic() {
    init_tracing();
    let mut param = Parameter::new("test");
    param.add_option(vec![1, 2], false).unwrap();

    let err = param.add_option(3, true).unwrap_err();
    assert_eq!(
        err,
        ParameterError::ConflictingLegality {
            name: "test".to_string(),
            constraint: "options".to_string(),
            declared: false,
            requested: true,
        }
    );
    assert_eq!(param.options().len(), 2);
    assert_eq!(param.options_are_legal(), Some(false));

    // Clearing forgets the polarity
    param.clear_options();
    assert!(param.options_are_legal().is_none());
    param.add_option(3, true).unwrap();
    assert_eq!(param.options_are_legal(), Some(true));
}

#[test]
fn test_heterogeneous_lists() {
    let mut param = Parameter::new("mixed");
    let list = Value::List(vec![Value::from(1), Value::from("a")]);

    assert!(matches!(
        param.set_value(list.clone()),
        Err(ParameterError::HeterogeneousList { .. })
    ));
    assert!(matches!(
        param.add_option(list.clone(), true),
        Err(ParameterError::HeterogeneousList { .. })
    ));
    assert!(param.value().is_none());
    assert!(param.options().is_empty());

    // Ints and floats mix fine
    param
        .set_value(Value::List(vec![Value::from(1), Value::from(2.5)]))
        .unwrap();
    assert_eq!(param.value_type(), Some(ValueKind::Quantity));
}

#[test]
fn test_validate_value_does_not_store() {
    let mut param = Parameter::new("test");
    param.add_interval(0, 1, true).unwrap();

    assert!(param.validate_value(&Value::from(0.5)).is_ok());
    assert!(param.value().is_none());
    assert!(matches!(
        param.validate_value(&Value::from(2)),
        Err(ParameterError::IllegalValue { .. })
    ));
}

#[test]
fn test_display() {
    let mut param = Parameter::new("energy")
        .with_unit(unit("eV"))
        .with_comment("Source energy");
    let text = param.to_string();
    assert!(text.starts_with("Parameter named: 'energy' without set value."));

    param.add_interval(0, 1e6, true).unwrap();
    param.add_option(8048, true).unwrap();
    param.set_value(4000).unwrap();

    let text = param.to_string();
    assert!(text.starts_with("Parameter named: 'energy' with value: 4000"));
    assert!(text.contains(" [eV]\n"));
    assert!(text.contains(" Source energy\n"));
    assert!(text.contains("  Legal intervals:\n"));
    assert!(text.contains("  Allowed values:\n"));

    let summary = param.summary_line();
    assert!(summary.starts_with("energy"));
    assert!(summary.contains("[eV]"));
    assert!(summary.contains("Source energy"));
    assert!(summary.contains("L["));
    assert!(summary.contains("L(8048"));

    let constraints = param.constraints_summary();
    assert!(constraints.contains("intervals are legal: true"));
    assert!(constraints.contains("options are legal: true"));
}

#[test]
fn test_illegal_display() {
    let mut param = Parameter::new("gap");
    param.add_interval(1, 2, false).unwrap();
    param.add_option(5, false).unwrap();

    let text = param.to_string();
    assert!(text.contains("  Illegal intervals:\n"));
    assert!(text.contains("  Forbidden values:\n"));
    assert!(param.summary_line().contains("I["));
    assert!(param.summary_line().contains("I(5"));
}
