//! Testing utilities for the zone-config workspace
//!
//! Shared fixtures and proptest strategies.

use proptest::prelude::*;
use zone_config::{Constraint, ConstraintType, Constraints, LeasePreference, ZoneConfig};

/// Parse a short-form constraint, panicking on bad input
pub fn constraint(short: &str) -> Constraint {
    short
        .parse()
        .unwrap_or_else(|e| panic!("bad test constraint {short:?}: {e}"))
}

/// Parse several short forms
pub fn constraints(shorts: &[&str]) -> Vec<Constraint> {
    shorts.iter().map(|s| constraint(s)).collect()
}

/// Group from short forms
pub fn group(shorts: &[&str], num_replicas: i32) -> Constraints {
    Constraints::new(constraints(shorts), num_replicas)
}

/// Lease preference from short forms
pub fn lease_preference(shorts: &[&str]) -> LeasePreference {
    LeasePreference::new(constraints(shorts))
}

/// A config with every field set to something non-default
pub fn sample_zone_config() -> ZoneConfig {
    ZoneConfig::default_zone_config()
        .with_num_replicas(5)
        .with_constraints(vec![
            group(&["+region=us-east1"], 2),
            group(&["+region=us-west1", "-ssd"], 3),
        ])
        .with_lease_preferences(vec![
            lease_preference(&["+region=us-east1"]),
            lease_preference(&["+region=us-west1"]),
        ])
}

/// Any constraint type
pub fn arb_constraint_type() -> impl Strategy<Value = ConstraintType> {
    prop_oneof![
        Just(ConstraintType::Required),
        Just(ConstraintType::Prohibited),
        Just(ConstraintType::DeprecatedPositive),
    ]
}

/// Constraint with an optional key, in the token alphabet
pub fn arb_constraint() -> impl Strategy<Value = Constraint> {
    (
        arb_constraint_type(),
        proptest::option::of("[a-z][a-z0-9_]{0,5}"),
        "[a-z0-9][a-z0-9.:-]{0,6}",
    )
        .prop_map(|(kind, key, value)| Constraint::new(kind, key.unwrap_or_default(), value))
}

/// Non-empty group; an empty group has no per-replica key that parses back
pub fn arb_group() -> impl Strategy<Value = Constraints> {
    (
        proptest::collection::vec(arb_constraint(), 1..4),
        0..8i32,
    )
        .prop_map(|(constraints, num_replicas)| Constraints::new(constraints, num_replicas))
}

/// Lease preference with up to three members
pub fn arb_lease_preference() -> impl Strategy<Value = LeasePreference> {
    proptest::collection::vec(arb_constraint(), 0..4).prop_map(LeasePreference::new)
}
