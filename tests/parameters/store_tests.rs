//! Integration tests for master parameters and the ParameterStore

use instrument_params::parameters::{
    ParameterCollection, ParameterError, ParameterStore, Value, MASTER_KEY,
};
use instrument_params::UnitRegistry;
use std::sync::Arc;

use crate::test_helpers::{approx_eq, beamline_store, init_tracing, sample_collection};

fn absorption(store: &ParameterStore, owner: &str) -> Option<f64> {
    store
        .owner(owner)
        .ok()?
        .parameter("absorption")
        .ok()?
        .value_as_f64()
}

#[test]
fn test_owner_registry() {
    let store = beamline_store();
    assert_eq!(store.owner_ids(), vec!["Source", "Sample top", "Sample bottom"]);
    assert!(store.contains("Source"));
    assert!(!store.contains(MASTER_KEY));
    assert!(store.get("Detector").is_none());
    assert!(matches!(
        store.owner("Detector"),
        Err(ParameterError::UnknownOwner { .. })
    ));
}

#[test]
fn test_reserved_and_duplicate_owners() {
    let mut store = beamline_store();
    let registry = Arc::clone(store.registry());

    assert_eq!(
        store
            .add("Source", ParameterCollection::new())
            .unwrap_err(),
        ParameterError::DuplicateOwner {
            owner: "Source".to_string()
        }
    );
    assert_eq!(
        store
            .add(MASTER_KEY, sample_collection(registry))
            .unwrap_err(),
        ParameterError::ReservedOwner {
            owner: "Master".to_string()
        }
    );
    assert_eq!(store.owner_ids().len(), 3);
}

#[test]
fn test_master_fan_out() {
    let mut store = beamline_store();
    store.set_master("absorption", 3.4).unwrap();

    assert_eq!(absorption(&store, "Sample top"), Some(3.4));
    assert_eq!(absorption(&store, "Sample bottom"), Some(3.4));
    assert_eq!(
        store.master().get("absorption").and_then(|m| m.value()),
        Some(Value::Float(3.4))
    );

    // Owners not linked to the master are untouched
    let energy = store.owner("Source").unwrap().parameter("energy").unwrap();
    assert_eq!(energy.value_as_f64(), Some(4000.0));
}

#[test]
fn test_master_converts_into_target_units() {
    let registry = Arc::new(UnitRegistry::new());
    let mut store = ParameterStore::with_registry(registry.clone());
    store
        .add("Sample", sample_collection(registry.clone()))
        .unwrap();
    store
        .add_master_parameter("thickness", [("Sample", "thickness")], Some("um"), None)
        .unwrap();

    // 2500 um is 2.5 mm for the sample
    store
        .set_master("thickness", registry.parse_quantity("2500 um").unwrap())
        .unwrap();
    let thickness = store
        .owner("Sample")
        .unwrap()
        .parameter("thickness")
        .unwrap()
        .value_as_f64()
        .unwrap();
    assert!(approx_eq(thickness, 2.5, 1e-9));

    let master = store.master().get("thickness").unwrap().value_as_f64().unwrap();
    assert!(approx_eq(master, 2500.0, 1e-6));
}

#[test]
fn test_master_fan_out_is_all_or_nothing() {
    init_tracing();
    let mut store = beamline_store();
    store.set_master("absorption", 1.0).unwrap();

    // Tighten only the bottom sample
    let bottom = store
        .owner_mut("Sample bottom")
        .unwrap()
        .parameter_mut("absorption")
        .unwrap();
    bottom.clear_intervals();
    bottom.add_interval(0, 2, true).unwrap();

    let err = store.set_master("absorption", 5.0).unwrap_err();
    assert_eq!(
        err,
        ParameterError::IllegalLinkedValue {
            master: "absorption".to_string(),
            owner: "Sample bottom".to_string(),
            parameter: "absorption".to_string(),
            value: "5".to_string(),
        }
    );

    // Neither the top sample, written first in link order, nor the master moved
    assert_eq!(absorption(&store, "Sample top"), Some(1.0));
    assert_eq!(absorption(&store, "Sample bottom"), Some(1.0));
    assert_eq!(
        store.master().get("absorption").unwrap().value_as_f64(),
        Some(1.0)
    );
}

#[test]
fn test_master_own_constraints() {
    let mut store = beamline_store();
    store
        .master_mut()
        .get_mut("absorption")
        .unwrap()
        .add_interval(0, 10, true)
        .unwrap();

    assert!(matches!(
        store.set_master("absorption", 11.0),
        Err(ParameterError::IllegalValue { .. })
    ));
    assert_eq!(absorption(&store, "Sample top"), None);

    assert!(matches!(
        store.set_master("absorption", "thick"),
        Err(ParameterError::TypeMismatch { .. })
    ));
    assert!(matches!(
        store.set_master("porosity", 0.5),
        Err(ParameterError::ParameterNotFound { .. })
    ));
}

#[test]
fn test_master_links_are_validated() {
    let mut store = beamline_store();

    assert!(matches!(
        store.add_master_parameter("angle", [("Goniometer", "theta")], Some("deg"), None),
        Err(ParameterError::UnknownOwner { .. })
    ));
    assert!(matches!(
        store.add_master_parameter("absorption", [("Sample top", "absorption")], None, None),
        Err(ParameterError::DuplicateParameter { .. })
    ));

    // Links to parameters that do not exist surface when the master is set
    store
        .add_master_parameter("porosity", [("Sample top", "porosity")], None, None)
        .unwrap();
    assert!(matches!(
        store.set_master("porosity", 0.1),
        Err(ParameterError::ParameterNotFound { .. })
    ));
    assert!(store.master().get("porosity").unwrap().value().is_none());
}

#[test]
fn test_rejected_link_leaves_masters_unchanged() {
    let mut store = beamline_store();
    let before = store.master().clone();

    let err = store
        .add_master_parameter(
            "thickness",
            [("Sample top", "thickness"), ("Ghost", "z")],
            Some("mm"),
            None,
        )
        .unwrap_err();
    assert_eq!(
        err,
        ParameterError::UnknownOwner {
            owner: "Ghost".to_string()
        }
    );
    assert_eq!(store.master(), &before);
    assert!(!store.master().contains("thickness"));

    // Every stored link points at a registered owner
    for (_, master) in store.master().iter() {
        assert!(master.links().keys().all(|owner| store.contains(owner)));
    }
}

#[test]
fn test_removed_owner_leaves_dangling_links() {
    init_tracing();
    let mut store = beamline_store();
    let removed = store.remove("Sample bottom").unwrap();
    assert_eq!(removed.len(), 3);
    assert_eq!(store.owner_ids(), vec!["Source", "Sample top"]);

    // The link table is kept as it was
    let links = store.master().links_of("absorption").unwrap();
    assert_eq!(links.len(), 2);

    assert_eq!(
        store.set_master("absorption", 2.0).unwrap_err(),
        ParameterError::UnknownOwner {
            owner: "Sample bottom".to_string()
        }
    );
    assert_eq!(absorption(&store, "Sample top"), None);
}

#[test]
fn test_master_parameter_accessors() {
    let store = beamline_store();
    let master = store.master().get("absorption").unwrap();

    assert_eq!(master.name(), "absorption");
    assert_eq!(master.comment(), Some("Shared absorption"));
    let owners: Vec<&str> = master.links().keys().map(String::as_str).collect();
    assert_eq!(owners, vec!["Sample top", "Sample bottom"]);
    assert_eq!(master.links()["Sample top"], "absorption");

    assert_eq!(store.master().names(), vec!["absorption"]);
    assert_eq!(store.master().len(), 1);
}

#[test]
fn test_store_display() {
    let mut store = beamline_store();
    store.set_master("absorption", 3.4).unwrap();
    let text = store.to_string();

    assert!(text.starts_with("- ParametersCollection object -\n"));
    assert!(text.contains("  Master Parameters\n"));
    assert!(text.contains("   Source\n"));
    assert!(text.contains("   Sample bottom\n"));
    assert!(text.contains("    - Parameters object -\n"));

    let master_at = text.find("Master Parameters").unwrap();
    let source_at = text.find("   Source\n").unwrap();
    assert!(master_at < source_at);
}
