//! Constraint groups and the dual-shape constraint list codec
//!
//! A [`ConstraintsList`] is written in one of two document shapes:
//!
//! 1. Legacy shape, used when there are no groups, or exactly one group with
//!    `num_replicas == 0`:
//!    ```text
//!    [c1, c2, c3]
//!    ```
//! 2. Per-replica shape, used otherwise:
//!    ```text
//!    {"c1,c2,c3": num_replicas1, "c4,c5": num_replicas2}
//!    ```
//!
//! Decoding accepts either shape. Groups decoded from the per-replica shape
//! are sorted so that reordered mappings decode to identical lists.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::ops::{Deref, DerefMut};

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{self, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::constraint::Constraint;
use crate::error::ParseError;

/// Separator between constraints in a per-replica mapping key
const GROUP_SEPARATOR: char = ',';

/// A group of constraints and the number of replicas it governs
///
/// `num_replicas == 0` means the group applies to all replicas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Constraints {
    /// Members, in document order
    pub constraints: Vec<Constraint>,
    /// Replicas the group applies to; zero means all of them
    pub num_replicas: i32,
}

impl Constraints {
    /// Create a group
    #[inline]
    #[must_use]
    pub fn new(constraints: Vec<Constraint>, num_replicas: i32) -> Self {
        Self {
            constraints,
            num_replicas,
        }
    }

    /// Short forms of every member, in order
    #[must_use]
    pub fn short_forms(&self) -> Vec<String> {
        self.constraints.iter().map(ToString::to_string).collect()
    }

    /// Comma-joined short forms, used as the per-replica mapping key
    #[must_use]
    pub fn joined(&self) -> String {
        self.short_forms().join(",")
    }

    /// Parse a comma-joined key back into a group
    ///
    /// # Errors
    /// Returns the first [`ParseError`] hit while parsing the members
    pub fn parse_joined(joined: &str, num_replicas: i32) -> Result<Self, ParseError> {
        let constraints = joined
            .split(GROUP_SEPARATOR)
            .map(str::parse)
            .collect::<Result<Vec<Constraint>, _>>()?;
        Ok(Self::new(constraints, num_replicas))
    }
}

impl Display for Constraints {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]:{}", self.joined(), self.num_replicas)
    }
}

// A single group has no document shape of its own; it is only ever written
// as part of a `ConstraintsList`.
impl Serialize for Constraints {
    fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(ser::Error::custom(format!(
            "Constraints ({self}) must never be serialized directly, only through ConstraintsList"
        )))
    }
}

impl<'de> Deserialize<'de> for Constraints {
    fn deserialize<D: Deserializer<'de>>(_deserializer: D) -> Result<Self, D::Error> {
        Err(de::Error::custom(
            "Constraints must never be deserialized directly, only through ConstraintsList",
        ))
    }
}

/// Ordered list of constraint groups with backward-compatible serde support
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConstraintsList(pub Vec<Constraints>);

impl ConstraintsList {
    /// Wrap groups as-is, without sorting
    #[inline]
    #[must_use]
    pub fn new(groups: Vec<Constraints>) -> Self {
        Self(groups)
    }

    /// Unwrap into the underlying groups
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Vec<Constraints> {
        self.0
    }

    /// True when the list is written in the legacy flat-list shape
    #[inline]
    #[must_use]
    pub fn uses_legacy_shape(&self) -> bool {
        match self.0.as_slice() {
            [] => true,
            [only] => only.num_replicas == 0,
            _ => false,
        }
    }

    /// Sort into canonical order (see [`constraints_less`])
    pub fn canonicalize(&mut self) {
        self.0.sort_by(canonical_cmp);
    }
}

impl Deref for ConstraintsList {
    type Target = Vec<Constraints>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for ConstraintsList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<Constraints>> for ConstraintsList {
    fn from(groups: Vec<Constraints>) -> Self {
        Self(groups)
    }
}

impl From<ConstraintsList> for Vec<Constraints> {
    fn from(list: ConstraintsList) -> Self {
        list.0
    }
}

/// Canonical "less than" between two groups
///
/// Walks the left group's members: once the right group runs out, left is
/// not less; otherwise the first differing short form decides. If the walk
/// completes, a shorter left is less, and equal groups fall back to
/// `num_replicas`.
#[must_use]
pub fn constraints_less(left: &Constraints, right: &Constraints) -> bool {
    for (k, l) in left.constraints.iter().enumerate() {
        let Some(r) = right.constraints.get(k) else {
            return false;
        };
        let l_str = l.to_string();
        let r_str = r.to_string();
        if l_str < r_str {
            return true;
        }
        if l_str > r_str {
            return false;
        }
    }
    if left.constraints.len() < right.constraints.len() {
        return true;
    }
    left.num_replicas < right.num_replicas
}

fn canonical_cmp(left: &Constraints, right: &Constraints) -> Ordering {
    if constraints_less(left, right) {
        Ordering::Less
    } else if constraints_less(right, left) {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

impl Serialize for ConstraintsList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.as_slice() {
            [] => serializer.serialize_seq(Some(0))?.end(),
            [only] if only.num_replicas == 0 => {
                serializer.collect_seq(only.constraints.iter().map(ToString::to_string))
            }
            groups => {
                // Groups that join to the same key overwrite earlier ones.
                let by_key: BTreeMap<String, i32> = groups
                    .iter()
                    .map(|group| (group.joined(), group.num_replicas))
                    .collect();
                serializer.collect_map(by_key)
            }
        }
    }
}

impl<'de> Deserialize<'de> for ConstraintsList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ConstraintsListVisitor)
    }
}

struct ConstraintsListVisitor;

impl<'de> Visitor<'de> for ConstraintsListVisitor {
    type Value = ConstraintsList;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.write_str(
            "a list of constraints or a map from comma-separated constraints to replica counts",
        )
    }

    // Legacy shape: a flat list of short forms.
    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut constraints = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(short) = seq.next_element::<String>()? {
            constraints.push(short.parse::<Constraint>().map_err(de::Error::custom)?);
        }
        if constraints.is_empty() {
            return Ok(ConstraintsList::default());
        }
        Ok(ConstraintsList(vec![Constraints::new(constraints, 0)]))
    }

    // Per-replica shape: comma-joined short forms -> replica count.
    // A repeated key keeps its last count.
    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut by_key = BTreeMap::new();
        while let Some((joined, num_replicas)) = map.next_entry::<String, i32>()? {
            by_key.insert(joined, num_replicas);
        }

        let mut list = ConstraintsList(Vec::with_capacity(by_key.len()));
        for (joined, num_replicas) in by_key {
            let group =
                Constraints::parse_joined(&joined, num_replicas).map_err(de::Error::custom)?;
            list.push(group);
        }
        list.canonicalize();
        Ok(list)
    }
}
