use std::collections::BTreeSet;

use log::warn;

use crate::{
    dfg::{dfg_struct::DirectlyFollowsGraph, efg_struct::EventuallyFollowsGraph},
    discovery::inductive_miner::cuts::Cut,
    event_log::uvcl_struct::Activity,
};

use super::{
    eventually_follows_order, is_valid_partial_order_cut, maximal::maximal_partial_order_cut,
};

/// Largest alphabet for which all partitions are enumerated
pub const MAX_BRUTE_FORCE_ALPHABET: usize = 10;

///
/// Enumerate the assignments of `n` elements to exactly `k` blocks as restricted growth
/// strings (the first element is in block 0, every element is in an existing block or opens
/// the next one), in lexicographic order
///
fn search_partitions<F>(
    n: usize,
    k: usize,
    assignment: &mut Vec<usize>,
    used: usize,
    check: &mut F,
) -> Option<Cut>
where
    F: FnMut(&[usize]) -> Option<Cut>,
{
    if assignment.len() == n {
        return if used == k { check(assignment) } else { None };
    }
    if used + (n - assignment.len()) < k {
        return None;
    }
    for block in 0..=used.min(k - 1) {
        assignment.push(block);
        let result = search_partitions(n, k, assignment, used.max(block + 1), check);
        assignment.pop();
        if result.is_some() {
            return result;
        }
    }
    None
}

///
/// Brute-force partial order cut
///
/// Partitions of the alphabet are tried with the largest number of groups first; the first
/// one whose eventually-follows order forms a valid partial order cut is returned. For
/// alphabets with more than [`MAX_BRUTE_FORCE_ALPHABET`] activities the maximal partial
/// order cut is used instead.
///
pub fn brute_force_partial_order_cut(
    efg: &EventuallyFollowsGraph,
    dfg: &DirectlyFollowsGraph,
) -> Option<Cut> {
    let alphabet: Vec<Activity> = dfg.alphabet().into_iter().collect();
    let n = alphabet.len();
    if n > MAX_BRUTE_FORCE_ALPHABET {
        warn!(
            "Alphabet of {} activities is too large for the brute-force partial order cut, \
             using the maximal cut",
            n
        );
        return maximal_partial_order_cut(efg, dfg);
    }
    let mut check = |assignment: &[usize]| {
        let k = assignment.iter().max().map_or(0, |m| m + 1);
        let mut groups: Vec<BTreeSet<Activity>> = vec![BTreeSet::new(); k];
        for (a, block) in alphabet.iter().zip(assignment) {
            groups[*block].insert(a.clone());
        }
        let order = eventually_follows_order(&groups, efg);
        is_valid_partial_order_cut(&groups, &order, efg, dfg)
            .then_some(Cut::PartialOrder { groups, order })
    };
    (2..=n)
        .rev()
        .find_map(|k| search_partitions(n, k, &mut Vec::with_capacity(n), 0, &mut check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::uvcl_struct::UVCL;

    fn count_partitions(n: usize, k: usize) -> usize {
        let mut count = 0;
        search_partitions(n, k, &mut Vec::new(), 0, &mut |_: &[usize]| {
            count += 1;
            None
        });
        count
    }

    #[test]
    fn enumerates_all_partitions() {
        // Stirling numbers of the second kind
        assert_eq!(count_partitions(4, 4), 1);
        assert_eq!(count_partitions(4, 3), 6);
        assert_eq!(count_partitions(4, 2), 7);
        assert_eq!(count_partitions(5, 3), 25);
    }

    #[test]
    fn diamond() {
        let log = UVCL::from(vec![(vec!["a", "b", "c", "d"], 1), (vec!["a", "c", "b", "d"], 1)]);
        let Some(Cut::PartialOrder { groups, order }) = brute_force_partial_order_cut(
            &EventuallyFollowsGraph::from(&log),
            &DirectlyFollowsGraph::from(&log),
        ) else {
            panic!("expected a partial order cut");
        };
        assert_eq!(groups.len(), 4);
        assert!(!order.is_edge(1, 2) && !order.is_edge(2, 1));
    }

    #[test]
    fn choice_needs_a_coarser_partition() {
        let log = UVCL::from(vec![(vec!["a", "b", "d"], 1), (vec!["a", "c", "d"], 1)]);
        let Some(Cut::PartialOrder { groups, .. }) = brute_force_partial_order_cut(
            &EventuallyFollowsGraph::from(&log),
            &DirectlyFollowsGraph::from(&log),
        ) else {
            panic!("expected a partial order cut");
        };
        assert_eq!(groups.len(), 3);
        assert!(groups[1].contains("b") && groups[1].contains("c"));
    }
}
