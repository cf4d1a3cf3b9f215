use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use zone_config::{constraints_less, Constraints, ConstraintsList, LeasePreference};
use zone_config_test_utils::{arb_group, arb_lease_preference, group};

fn yaml_round_trip(list: &ConstraintsList) -> ConstraintsList {
    let yaml = serde_yaml::to_string(list).unwrap();
    serde_yaml::from_str(&yaml).unwrap()
}

/// What a list looks like after a per-replica encode/decode: one group per
/// joined key (last one wins), in canonical order.
fn expected_after_map_round_trip(groups: &[Constraints]) -> ConstraintsList {
    let mut by_key = BTreeMap::new();
    for g in groups {
        by_key.insert(g.joined(), g.clone());
    }
    let mut expected = ConstraintsList::new(by_key.into_values().collect());
    expected.canonicalize();
    expected
}

#[test]
fn test_decode_empty_list() {
    let list: ConstraintsList = serde_yaml::from_str("[]").unwrap();
    assert_eq!(list, ConstraintsList::default());
}

#[test]
fn test_decode_flat_list_is_one_zero_group() {
    let list: ConstraintsList = serde_yaml::from_str(r#"["a", "b"]"#).unwrap();
    assert_eq!(list, ConstraintsList::new(vec![group(&["a", "b"], 0)]));
}

#[test]
fn test_decode_block_list() {
    let list: ConstraintsList = serde_yaml::from_str("- \"+ssd\"\n- \"-region=west\"\n").unwrap();
    assert_eq!(
        list,
        ConstraintsList::new(vec![group(&["+ssd", "-region=west"], 0)])
    );
}

#[test]
fn test_decode_map_sorted_by_comparator() {
    let list: ConstraintsList = serde_yaml::from_str(r#"{"c": 1, "a,b": 2}"#).unwrap();
    assert_eq!(
        list,
        ConstraintsList::new(vec![group(&["a", "b"], 2), group(&["c"], 1)])
    );
}

#[test]
fn test_decode_map_ties_broken_by_replicas() {
    let list: ConstraintsList = serde_yaml::from_str(r#"{"b,a": 3, "b": 4, "a": 1}"#).unwrap();
    assert_eq!(
        list,
        ConstraintsList::new(vec![
            group(&["a"], 1),
            group(&["b"], 4),
            group(&["b", "a"], 3),
        ])
    );
}

#[test]
fn test_decode_reordered_maps_identically() {
    let first: ConstraintsList =
        serde_yaml::from_str("\"+region=east\": 2\n\"+region=west,-ssd\": 1\n\"+ssd\": 0\n")
            .unwrap();
    let second: ConstraintsList =
        serde_yaml::from_str("\"+ssd\": 0\n\"+region=west,-ssd\": 1\n\"+region=east\": 2\n")
            .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_decode_repeated_key_collapses_to_last() {
    let expected = ConstraintsList::new(vec![group(&["a"], 2)]);

    let list: ConstraintsList = serde_yaml::from_str("a: 1\na: 2\n").unwrap();
    assert_eq!(list, expected);

    let list: ConstraintsList = serde_json::from_str(r#"{"a": 1, "a": 2}"#).unwrap();
    assert_eq!(list, expected);
}

#[test]
fn test_decode_malformed_token_fails() {
    let err = serde_yaml::from_str::<ConstraintsList>(r#"["not-a-valid-constraint!!"]"#)
        .unwrap_err();
    assert!(err.to_string().contains("invalid character"));
}

#[test]
fn test_decode_malformed_token_in_map_fails() {
    let err = serde_yaml::from_str::<ConstraintsList>(r#"{"+a,+b=c=d": 1}"#).unwrap_err();
    assert!(err.to_string().contains("(key=)value"));
}

#[test]
fn test_decode_scalar_rejected() {
    assert!(serde_yaml::from_str::<ConstraintsList>("just-a-string").is_err());
    assert!(serde_yaml::from_str::<ConstraintsList>("42").is_err());
}

#[test]
fn test_encode_legacy_shape_in_yaml() {
    let list = ConstraintsList::new(vec![group(&["+ssd", "-region=west"], 0)]);
    let value = serde_yaml::to_value(&list).unwrap();
    let expected: serde_yaml::Value = serde_yaml::from_str(r#"["+ssd", "-region=west"]"#).unwrap();
    assert_eq!(value, expected);
}

#[test]
fn test_encode_per_replica_shape_in_yaml() {
    let list = ConstraintsList::new(vec![group(&["+ssd"], 1), group(&["+region=east"], 2)]);
    let value = serde_yaml::to_value(&list).unwrap();
    let expected: serde_yaml::Value =
        serde_yaml::from_str(r#"{"+region=east": 2, "+ssd": 1}"#).unwrap();
    assert_eq!(value, expected);
}

#[test]
fn test_legacy_round_trip() {
    for list in [
        ConstraintsList::default(),
        ConstraintsList::new(vec![group(&["+ssd"], 0)]),
        ConstraintsList::new(vec![group(&["b", "a", "-c=d"], 0)]),
    ] {
        assert_eq!(yaml_round_trip(&list), list);
    }
}

#[test]
fn test_per_replica_round_trip_canonicalizes() {
    let groups = vec![group(&["z"], 1), group(&["a", "b"], 2), group(&["a"], 3)];
    let decoded = yaml_round_trip(&ConstraintsList::new(groups.clone()));
    assert_eq!(decoded, expected_after_map_round_trip(&groups));
    assert_eq!(
        decoded,
        ConstraintsList::new(vec![group(&["a"], 3), group(&["a", "b"], 2), group(&["z"], 1)])
    );
}

#[test]
fn test_single_group_direct_marshal_rejected() {
    let g = group(&["+ssd"], 2);
    assert!(serde_yaml::to_string(&g).is_err());
    assert!(serde_json::to_string(&g).is_err());
    assert!(serde_yaml::from_str::<Constraints>("[\"+ssd\"]").is_err());
    assert!(serde_json::from_str::<Constraints>("{\"+ssd\": 2}").is_err());
}

proptest! {
    #[test]
    fn prop_legacy_round_trip(g in arb_group()) {
        let list = ConstraintsList::new(vec![Constraints::new(g.constraints, 0)]);
        prop_assert!(list.uses_legacy_shape());
        prop_assert_eq!(yaml_round_trip(&list), list.clone());

        let json = serde_json::to_string(&list).unwrap();
        prop_assert_eq!(serde_json::from_str::<ConstraintsList>(&json).unwrap(), list);
    }

    #[test]
    fn prop_per_replica_round_trip(groups in proptest::collection::vec(arb_group(), 2..6)) {
        let list = ConstraintsList::new(groups.clone());
        prop_assert!(!list.uses_legacy_shape());
        let expected = expected_after_map_round_trip(&groups);

        prop_assert_eq!(yaml_round_trip(&list), expected.clone());

        let json = serde_json::to_string(&list).unwrap();
        prop_assert_eq!(serde_json::from_str::<ConstraintsList>(&json).unwrap(), expected);
    }

    #[test]
    fn prop_decode_independent_of_key_order(
        groups in proptest::collection::vec(arb_group(), 1..6)
    ) {
        let unique = expected_after_map_round_trip(&groups);
        let entries: Vec<String> = unique
            .iter()
            .map(|g| format!("{}: {}", serde_json::to_string(&g.joined()).unwrap(), g.num_replicas))
            .collect();
        let forward = format!("{{{}}}", entries.join(", "));
        let reversed: Vec<String> = entries.iter().rev().cloned().collect();
        let backward = format!("{{{}}}", reversed.join(", "));

        let a: ConstraintsList = serde_json::from_str(&forward).unwrap();
        let b: ConstraintsList = serde_json::from_str(&backward).unwrap();
        prop_assert_eq!(&a, &b);

        let a: ConstraintsList = serde_yaml::from_str(&forward).unwrap();
        let b: ConstraintsList = serde_yaml::from_str(&backward).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_less_matches_shortlex_then_replicas(a in arb_group(), b in arb_group()) {
        let expected = (a.short_forms(), a.num_replicas) < (b.short_forms(), b.num_replicas);
        prop_assert_eq!(constraints_less(&a, &b), expected);
        prop_assert!(!constraints_less(&a, &a));
        prop_assert!(!(constraints_less(&a, &b) && constraints_less(&b, &a)));
    }

    #[test]
    fn prop_lease_preference_order_preserved(pref in arb_lease_preference()) {
        let yaml = serde_yaml::to_string(&pref).unwrap();
        let back: LeasePreference = serde_yaml::from_str(&yaml).unwrap();
        prop_assert_eq!(back, pref);
    }
}
