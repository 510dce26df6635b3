use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::uvcl_struct::{Activity, UVCL};

///
/// Minimum self distance of every repeated activity
///
/// The self distance of two consecutive occurrences of an activity is the number of events
/// between them. Activities that never repeat within a trace have no entry.
///
pub fn min_self_distances(log: &UVCL) -> BTreeMap<Activity, usize> {
    let mut result: BTreeMap<Activity, usize> = BTreeMap::new();
    for variant in log.variants.keys() {
        let mut last_seen: HashMap<&Activity, usize> = HashMap::new();
        for (i, a) in variant.iter().enumerate() {
            if let Some(prev) = last_seen.insert(a, i) {
                let distance = i - prev - 1;
                result
                    .entry(a.clone())
                    .and_modify(|d| *d = (*d).min(distance))
                    .or_insert(distance);
            }
        }
    }
    result
}

///
/// Minimum self distance witnesses
///
/// For each activity `a` with a positive minimum self distance, the set of activities
/// occurring between two occurrences of `a` that are exactly that distance apart.
///
pub fn min_self_distance_witnesses(log: &UVCL) -> BTreeMap<Activity, BTreeSet<Activity>> {
    let distances = min_self_distances(log);
    let mut result: BTreeMap<Activity, BTreeSet<Activity>> = BTreeMap::new();
    for variant in log.variants.keys() {
        let mut last_seen: HashMap<&Activity, usize> = HashMap::new();
        for (i, a) in variant.iter().enumerate() {
            if let Some(prev) = last_seen.insert(a, i) {
                let distance = i - prev - 1;
                if distance > 0 && distances.get(a) == Some(&distance) {
                    result
                        .entry(a.clone())
                        .or_default()
                        .extend(variant[prev + 1..i].iter().cloned());
                }
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn witnesses() {
        let log = UVCL::from(vec![
            (vec!["a", "b", "a", "c", "b", "a"], 1),
            (vec!["c", "a", "b"], 1),
            (vec!["b", "c", "a", "c"], 1),
        ]);
        let distances = min_self_distances(&log);
        assert_eq!(distances.get("a"), Some(&1));
        assert_eq!(distances.get("b"), Some(&2));
        assert_eq!(distances.get("c"), Some(&1));

        let witnesses = min_self_distance_witnesses(&log);
        assert_eq!(witnesses["a"], BTreeSet::from(["b".to_string()]));
        assert_eq!(
            witnesses["b"],
            BTreeSet::from(["a".to_string(), "c".to_string()])
        );
        assert_eq!(witnesses["c"], BTreeSet::from(["a".to_string()]));
    }

    #[test]
    fn direct_repetition_has_no_witness() {
        let log = UVCL::from(vec![(vec!["a", "a", "b", "a"], 1)]);
        assert_eq!(min_self_distances(&log).get("a"), Some(&0));
        assert!(!min_self_distance_witnesses(&log).contains_key("a"));
    }
}
