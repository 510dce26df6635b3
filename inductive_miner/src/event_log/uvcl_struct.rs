use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

/// Activity label of an event
pub type Activity = String;

/// A variant: the ordered sequence of activity labels of a trace
pub type Variant = Vec<Activity>;

///
/// Compressed event log (UVCL): a multiset of [`Variant`]s
///
/// Every variant is mapped to the (positive) number of traces following it.
/// The empty variant is a valid key and represents empty traces.
///
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UVCL {
    /// Variants and their number of occurrences
    #[serde_as(as = "Vec<(_, _)>")]
    pub variants: BTreeMap<Variant, u64>,
}

impl UVCL {
    /// Create a new empty [`UVCL`]
    pub fn new() -> Self {
        Self {
            variants: BTreeMap::new(),
        }
    }

    /// Construct a [`UVCL`] from raw traces, grouping identical ones
    pub fn from_traces<I, T, S>(traces: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: IntoIterator<Item = S>,
        S: Into<Activity>,
    {
        let mut result = Self::new();
        for trace in traces {
            result.add_variant(trace.into_iter().map(Into::into).collect(), 1);
        }
        result
    }

    /// Add `count` occurrences of a variant
    ///
    /// Adding a count of 0 is a no-op, so that all stored counts stay positive. Counts
    /// saturate at [`u64::MAX`].
    pub fn add_variant(&mut self, variant: Variant, count: u64) {
        if count > 0 {
            let entry = self.variants.entry(variant).or_default();
            *entry = entry.saturating_add(count);
        }
    }

    /// Iterate over all variants with their counts (in lexicographic variant order)
    pub fn iter(&self) -> impl Iterator<Item = (&Variant, &u64)> {
        self.variants.iter()
    }

    /// `true` if the log contains no traces at all
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Number of distinct variants
    pub fn number_of_variants(&self) -> usize {
        self.variants.len()
    }

    /// Number of traces (sum of all variant counts, saturating)
    pub fn number_of_traces(&self) -> u64 {
        self.variants
            .values()
            .fold(0, |total, c| total.saturating_add(*c))
    }

    /// Number of traces, `None` if it does not fit into a [`u64`]
    pub fn checked_number_of_traces(&self) -> Option<u64> {
        self.variants
            .values()
            .try_fold(0u64, |total, c| total.checked_add(*c))
    }

    /// Number of events (sum of variant lengths weighted by their counts, saturating)
    pub fn number_of_events(&self) -> u64 {
        self.checked_number_of_events().unwrap_or(u64::MAX)
    }

    /// Number of events, `None` if it does not fit into a [`u64`]
    pub fn checked_number_of_events(&self) -> Option<u64> {
        self.variants.iter().try_fold(0u64, |total, (v, c)| {
            (v.len() as u64)
                .checked_mul(*c)
                .and_then(|events| total.checked_add(events))
        })
    }

    /// Set of all activities occurring in the log
    pub fn alphabet(&self) -> BTreeSet<Activity> {
        self.variants
            .keys()
            .flat_map(|v| v.iter().cloned())
            .collect()
    }

    /// Number of occurrences of each activity
    pub fn activity_occurrences(&self) -> BTreeMap<Activity, u64> {
        let mut result: BTreeMap<Activity, u64> = BTreeMap::new();
        for (v, c) in &self.variants {
            for a in v {
                let entry = result.entry(a.clone()).or_default();
                *entry = entry.saturating_add(*c);
            }
        }
        result
    }

    /// `true` if the log contains at least one empty trace
    pub fn contains_empty_trace(&self) -> bool {
        self.variants.contains_key(&Vec::new())
    }

    /// Number of empty traces in the log
    pub fn empty_trace_count(&self) -> u64 {
        self.variants.get(&Vec::new()).copied().unwrap_or(0)
    }

    /// Copy of the log without the empty traces
    pub fn without_empty_traces(&self) -> Self {
        Self {
            variants: self
                .variants
                .iter()
                .filter(|(v, _)| !v.is_empty())
                .map(|(v, c)| (v.clone(), *c))
                .collect(),
        }
    }

    /// Project the log onto a set of activities
    ///
    /// Every variant is filtered to the events in `activities`;
    /// variants collapsing to the same filtered form have their counts summed.
    pub fn project_on(&self, activities: &BTreeSet<Activity>) -> Self {
        let mut result = Self::new();
        for (v, c) in &self.variants {
            let projected: Variant = v
                .iter()
                .filter(|a| activities.contains(*a))
                .cloned()
                .collect();
            result.add_variant(projected, *c);
        }
        result
    }

    /// Remove all events of one activity from every variant
    pub fn remove_activity(&self, activity: &str) -> Self {
        let mut result = Self::new();
        for (v, c) in &self.variants {
            let projected: Variant = v.iter().filter(|a| *a != activity).cloned().collect();
            result.add_variant(projected, *c);
        }
        result
    }

    /// Start activities with the number of traces starting with them
    pub fn start_activities(&self) -> BTreeMap<Activity, u64> {
        let mut result: BTreeMap<Activity, u64> = BTreeMap::new();
        for (v, c) in &self.variants {
            if let Some(first) = v.first() {
                let entry = result.entry(first.clone()).or_default();
                *entry = entry.saturating_add(*c);
            }
        }
        result
    }

    /// End activities with the number of traces ending with them
    pub fn end_activities(&self) -> BTreeMap<Activity, u64> {
        let mut result: BTreeMap<Activity, u64> = BTreeMap::new();
        for (v, c) in &self.variants {
            if let Some(last) = v.last() {
                let entry = result.entry(last.clone()).or_default();
                *entry = entry.saturating_add(*c);
            }
        }
        result
    }

    ///
    /// Remove infrequent variants
    ///
    /// Variants whose count is below `threshold` times the count of the most frequent
    /// variant are dropped. A threshold of `0.0` keeps every variant.
    ///
    pub fn filter_infrequent_variants(&self, threshold: f64) -> Self {
        let max_count = self.variants.values().copied().max().unwrap_or(0);
        let min_count = threshold * max_count as f64;
        Self {
            variants: self
                .variants
                .iter()
                .filter(|(_, c)| **c as f64 >= min_count)
                .map(|(v, c)| (v.clone(), *c))
                .collect(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl<S: Into<Activity>> FromIterator<Vec<S>> for UVCL {
    fn from_iter<T: IntoIterator<Item = Vec<S>>>(iter: T) -> Self {
        Self::from_traces(iter)
    }
}

impl<S: Into<Activity>> From<Vec<(Vec<S>, u64)>> for UVCL {
    fn from(value: Vec<(Vec<S>, u64)>) -> Self {
        let mut result = Self::new();
        for (variant, count) in value {
            result.add_variant(variant.into_iter().map(Into::into).collect(), count);
        }
        result
    }
}

impl IntoIterator for UVCL {
    type Item = (Variant, u64);
    type IntoIter = std::collections::btree_map::IntoIter<Variant, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.variants.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log() -> UVCL {
        UVCL::from(vec![
            (vec!["a", "b", "c"], 3),
            (vec!["a", "c", "b"], 2),
            (vec!["a", "c"], 1),
            (vec![], 1),
        ])
    }

    #[test]
    fn counts() {
        let log = log();
        assert_eq!(log.number_of_variants(), 4);
        assert_eq!(log.number_of_traces(), 7);
        assert_eq!(log.number_of_events(), 9 + 6 + 2);
        assert_eq!(log.empty_trace_count(), 1);
        assert!(log.contains_empty_trace());
        assert!(!log.without_empty_traces().contains_empty_trace());
    }

    #[test]
    fn grouping_of_raw_traces() {
        let log: UVCL = vec![vec!["a", "b"], vec!["a", "b"], vec!["b"]]
            .into_iter()
            .collect();
        assert_eq!(log.variants.get(&vec!["a".to_string(), "b".to_string()]), Some(&2));
        assert_eq!(log.number_of_traces(), 3);
    }

    #[test]
    fn zero_counts_are_dropped() {
        let log = UVCL::from(vec![(vec!["a"], 0), (vec!["b"], 2)]);
        assert_eq!(log.number_of_variants(), 1);
        assert!(!log.alphabet().contains("a"));
    }

    #[test]
    fn projection_merges_collapsing_variants() {
        let log = log();
        let projected = log.project_on(&BTreeSet::from(["b".to_string()]));
        assert_eq!(projected.variants.get(&vec!["b".to_string()]), Some(&5));
        assert_eq!(projected.empty_trace_count(), 2);
        assert_eq!(projected.number_of_traces(), log.number_of_traces());
    }

    #[test]
    fn start_and_end_activities() {
        let log = log();
        assert_eq!(log.start_activities().get("a"), Some(&6));
        assert_eq!(log.end_activities().get("c"), Some(&4));
        assert_eq!(log.end_activities().get("b"), Some(&2));
    }

    #[test]
    fn infrequent_variants() {
        let log = log();
        let filtered = log.filter_infrequent_variants(0.5);
        assert_eq!(filtered.number_of_variants(), 2);
        assert_eq!(log.filter_infrequent_variants(0.0), log);
    }

    #[test]
    fn remove_activity() {
        let log = log().remove_activity("a");
        assert!(!log.alphabet().contains("a"));
        assert_eq!(log.number_of_traces(), 7);
        assert_eq!(log.empty_trace_count(), 1);
        assert_eq!(log.variants.get(&vec!["c".to_string()]), Some(&1));
    }
}
