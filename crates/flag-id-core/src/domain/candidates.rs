//! Candidate set carried through the match cascade.

use serde::{Deserialize, Serialize};

/// Flag identifiers not yet eliminated.
///
/// Filters only ever remove entries; the relative order of survivors is
/// never changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateSet(Vec<String>);

impl CandidateSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Number of candidates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no candidates remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true once narrowing is over: zero or one candidate left.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.0.len() <= 1
    }

    /// Returns true if `id` is still a candidate.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|c| c == id)
    }

    /// Appends a candidate.
    pub fn push(&mut self, id: impl Into<String>) {
        self.0.push(id.into());
    }

    /// Keeps only candidates for which `keep` returns true, in one pass.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.0.retain(|id| keep(id));
    }

    /// Iterates candidates in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Borrows the candidates as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Consumes the set, returning the identifiers.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<S: Into<String>> FromIterator<S> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for CandidateSet {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retain_preserves_order() {
        let mut set: CandidateSet = ["Ohio", "Utah", "Iowa", "Texas"].into_iter().collect();
        set.retain(|id| id != "Utah");
        assert_eq!(set.as_slice(), ["Ohio", "Iowa", "Texas"]);
    }

    #[test]
    fn test_settled() {
        let mut set = CandidateSet::new();
        assert!(set.is_settled());
        set.push("Ohio");
        assert!(set.is_settled());
        set.push("Utah");
        assert!(!set.is_settled());
        assert!(set.contains("Utah"));
    }

    #[test]
    fn test_serializes_as_list() {
        let set: CandidateSet = ["Ohio", "Utah"].into_iter().collect();
        let json = serde_json::to_string(&set).unwrap_or_default();
        assert_eq!(json, r#"["Ohio","Utah"]"#);
    }
}
