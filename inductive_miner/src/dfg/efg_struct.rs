use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::event_log::uvcl_struct::{Activity, UVCL};

///
/// Eventually-follows graph
///
/// The frequency of `(a, b)` is the number of traces in which some occurrence of `a` is
/// (not necessarily directly) followed by some occurrence of `b`.
///
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventuallyFollowsGraph {
    /// Activities
    pub activities: BTreeSet<Activity>,
    /// Eventually-follows relations with the number of traces witnessing them
    #[serde_as(as = "Vec<(_, _)>")]
    pub eventually_follows_relations: BTreeMap<(Activity, Activity), u64>,
}

impl From<&UVCL> for EventuallyFollowsGraph {
    fn from(log: &UVCL) -> Self {
        let mut relations: BTreeMap<(Activity, Activity), u64> = BTreeMap::new();
        for (variant, count) in log.iter() {
            let mut pairs: BTreeSet<(&Activity, &Activity)> = BTreeSet::new();
            for (i, a) in variant.iter().enumerate() {
                for b in &variant[i + 1..] {
                    pairs.insert((a, b));
                }
            }
            for (a, b) in pairs {
                let entry = relations.entry((a.clone(), b.clone())).or_default();
                *entry = entry.saturating_add(*count);
            }
        }
        Self {
            activities: log.alphabet(),
            eventually_follows_relations: relations,
        }
    }
}

impl EventuallyFollowsGraph {
    /// `true` iff `b` eventually follows `a` in some trace
    pub fn contains<S: AsRef<str>>(&self, a: S, b: S) -> bool {
        self.frequency(a, b) > 0
    }

    /// Number of traces in which `b` eventually follows `a`
    pub fn frequency<S: AsRef<str>>(&self, a: S, b: S) -> u64 {
        self.eventually_follows_relations
            .get(&(a.as_ref().to_string(), b.as_ref().to_string()))
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eventually_follows_counts_traces() {
        let log = UVCL::from(vec![(vec!["a", "b", "a", "c"], 2), (vec!["c", "b"], 1)]);
        let efg = EventuallyFollowsGraph::from(&log);
        assert_eq!(efg.frequency("a", "c"), 2);
        assert_eq!(efg.frequency("a", "a"), 2);
        assert_eq!(efg.frequency("b", "a"), 2);
        assert_eq!(efg.frequency("c", "b"), 1);
        assert!(!efg.contains("c", "a"));
        assert_eq!(efg.activities.len(), 3);
    }
}
