//! Value types produced by the scheduler.
//!
//! A [`Schedule`] is a list of [`WeekAssignment`]s; each week is a list of
//! [`Group`]s; each group is an ordered list of [`Member`]s whose first entry
//! is the leader.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque participant identifier (a trimmed name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Member(String);

impl Member {
    /// Build a member from a raw name, trimming surrounding whitespace.
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Member {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Member {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl Borrow<str> for Member {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Members dining together in one week. Position 0 is the leader once the
/// group has been finalized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Group {
    members: Vec<Member>,
}

impl Group {
    #[must_use]
    pub fn new(members: Vec<Member>) -> Self {
        Self { members }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            members: Vec::with_capacity(capacity),
        }
    }

    /// The designated leader, or `None` for an empty group.
    #[must_use]
    pub fn leader(&self) -> Option<&Member> {
        self.members.first()
    }

    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn contains(&self, member: &Member) -> bool {
        self.members.contains(member)
    }

    pub(crate) fn push(&mut self, member: Member) {
        self.members.push(member);
    }

    /// Move the member at `index` into the leader slot.
    pub(crate) fn swap_to_front(&mut self, index: usize) {
        self.members.swap(0, index);
    }

    /// Every unordered pair of distinct positions in the group.
    pub fn pairs(&self) -> impl Iterator<Item = (&Member, &Member)> {
        self.members.iter().enumerate().flat_map(move |(i, a)| {
            self.members[i + 1..].iter().map(move |b| (a, b))
        })
    }
}

/// One week's partition of the roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekAssignment {
    pub groups: Vec<Group>,
}

impl WeekAssignment {
    /// All members placed this week, in group order.
    pub fn members(&self) -> impl Iterator<Item = &Member> {
        self.groups.iter().flat_map(|group| group.members().iter())
    }

    /// Leaders of each group, in group order.
    pub fn leaders(&self) -> impl Iterator<Item = &Member> {
        self.groups.iter().filter_map(Group::leader)
    }
}

/// The full multi-week output, owned by the caller after generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    pub weeks: Vec<WeekAssignment>,
}

impl Schedule {
    #[must_use]
    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(names: &[&str]) -> Group {
        Group::new(names.iter().copied().map(Member::from).collect())
    }

    #[test]
    fn member_names_are_trimmed() {
        assert_eq!(Member::new("  Grace \t").as_str(), "Grace");
        assert_eq!(Member::from("Ada"), Member::new("Ada "));
    }

    #[test]
    fn leader_is_first_member() {
        let mut g = group(&["A", "B", "C"]);
        assert_eq!(g.leader().map(Member::as_str), Some("A"));
        g.swap_to_front(2);
        assert_eq!(g.leader().map(Member::as_str), Some("C"));
        assert!(g.contains(&Member::from("A")));
    }

    #[test]
    fn pairs_enumerates_each_unordered_pair_once() {
        let g = group(&["A", "B", "C", "D"]);
        let pairs: Vec<(&str, &str)> = g.pairs().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        assert_eq!(pairs.len(), 6);
        assert!(pairs.contains(&("A", "D")));
        assert!(!pairs.iter().any(|(a, b)| a == b));
    }

    #[test]
    fn schedule_serializes_as_nested_lists() {
        let schedule = Schedule {
            weeks: vec![WeekAssignment {
                groups: vec![group(&["A", "B"]), group(&["C", "D"])],
            }],
        };
        let json = serde_json::to_string(&schedule).expect("serialize");
        assert_eq!(json, r#"[[["A","B"],["C","D"]]]"#);
        let back: Schedule = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, schedule);
    }
}
