//! Lease preferences
//!
//! A [`LeasePreference`] is written as a flat list of constraint short forms.
//! Order is significant and preserved exactly.

use std::fmt::{self, Formatter};

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::constraint::Constraint;

/// Ordered constraints describing where the range lease should be placed
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LeasePreference {
    /// Members, in preference order
    pub constraints: Vec<Constraint>,
}

impl LeasePreference {
    /// Create a preference from its members
    #[inline]
    #[must_use]
    pub fn new(constraints: Vec<Constraint>) -> Self {
        Self { constraints }
    }
}

impl From<Vec<Constraint>> for LeasePreference {
    fn from(constraints: Vec<Constraint>) -> Self {
        Self::new(constraints)
    }
}

impl Serialize for LeasePreference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.constraints.iter().map(ToString::to_string))
    }
}

impl<'de> Deserialize<'de> for LeasePreference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(LeasePreferenceVisitor)
    }
}

struct LeasePreferenceVisitor;

impl<'de> Visitor<'de> for LeasePreferenceVisitor {
    type Value = LeasePreference;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.write_str("a list of constraints")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut constraints = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(short) = seq.next_element::<String>()? {
            constraints.push(short.parse::<Constraint>().map_err(de::Error::custom)?);
        }
        Ok(LeasePreference::new(constraints))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encode_preserves_order() {
        let pref = LeasePreference::new(vec![
            "+zone=b".parse().unwrap(),
            "+zone=a".parse().unwrap(),
            "+zone=b".parse().unwrap(),
        ]);
        assert_eq!(
            serde_json::to_value(&pref).unwrap(),
            json!(["+zone=b", "+zone=a", "+zone=b"])
        );
    }

    #[test]
    fn decode_preserves_order() {
        let pref: LeasePreference = serde_json::from_str(r#"["-c", "+b", "a"]"#).unwrap();
        let shorts: Vec<String> = pref.constraints.iter().map(ToString::to_string).collect();
        assert_eq!(shorts, vec!["-c", "+b", "a"]);
    }

    #[test]
    fn decode_empty() {
        let pref: LeasePreference = serde_json::from_str("[]").unwrap();
        assert!(pref.constraints.is_empty());
    }

    #[test]
    fn decode_bad_token_fails() {
        let err = serde_json::from_str::<LeasePreference>(r#"["+a", ""]"#).unwrap_err();
        assert!(err.to_string().contains("empty string"));
    }

    #[test]
    fn decode_rejects_map() {
        assert!(serde_json::from_str::<LeasePreference>(r#"{"a": 1}"#).is_err());
    }

    #[test]
    fn yaml_round_trip() {
        let pref = LeasePreference::new(vec!["+region=east".parse().unwrap(), "-ssd".parse().unwrap()]);
        let yaml = serde_yaml::to_string(&pref).unwrap();
        let back: LeasePreference = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, pref);
    }
}
