use std::collections::{BTreeMap, BTreeSet};

use petgraph::unionfind::UnionFind;

use crate::{dfg::dfg_struct::DirectlyFollowsGraph, event_log::uvcl_struct::Activity};

use super::Cut;

///
/// Concurrency cut
///
/// Two activities must end up in the same group if one of the directly-follows relations
/// between them is missing, or if one is a minimum self distance witness of the other.
/// Groups without a start or without an end activity are merged into the first group that
/// has both and is adjacent to them in the directly-follows graph, falling back to the first
/// group that has both.
///
pub fn concurrency_cut(
    dfg: &DirectlyFollowsGraph,
    msd_witnesses: &BTreeMap<Activity, BTreeSet<Activity>>,
) -> Option<Cut> {
    let alphabet: Vec<Activity> = dfg.alphabet().into_iter().collect();
    if alphabet.len() < 2 {
        return None;
    }
    let is_witness = |a: &Activity, b: &Activity| {
        msd_witnesses
            .get(a)
            .is_some_and(|witnesses| witnesses.contains(b))
    };

    let mut union_find: UnionFind<usize> = UnionFind::new(alphabet.len());
    for (i, a) in alphabet.iter().enumerate() {
        for (j, b) in alphabet.iter().enumerate().skip(i + 1) {
            if !dfg.contains_df_relation((a, b))
                || !dfg.contains_df_relation((b, a))
                || is_witness(a, b)
                || is_witness(b, a)
            {
                union_find.union(i, j);
            }
        }
    }
    let labels = union_find.into_labeling();
    let mut components: BTreeMap<usize, BTreeSet<Activity>> = BTreeMap::new();
    for (i, a) in alphabet.iter().enumerate() {
        components.entry(labels[i]).or_default().insert(a.clone());
    }

    let (complete, incomplete): (Vec<_>, Vec<_>) =
        components.into_values().partition(|component| {
            component.iter().any(|a| dfg.is_start_activity(a))
                && component.iter().any(|a| dfg.is_end_activity(a))
        });
    let groups = merge_incomplete(dfg, complete, incomplete)?;
    (groups.len() >= 2).then_some(Cut::Concurrency(groups))
}

fn adjacent(dfg: &DirectlyFollowsGraph, x: &BTreeSet<Activity>, y: &BTreeSet<Activity>) -> bool {
    x.iter().any(|a| {
        y.iter()
            .any(|b| dfg.contains_df_relation((a, b)) || dfg.contains_df_relation((b, a)))
    })
}

///
/// Merge every incomplete group into the first complete group sharing a directly-follows
/// edge with it, or into the first complete group if there is none
///
/// Adjacency is checked against the complete groups before any merge.
/// Returns `None` if there is no complete group.
///
fn merge_incomplete(
    dfg: &DirectlyFollowsGraph,
    mut complete: Vec<BTreeSet<Activity>>,
    incomplete: Vec<BTreeSet<Activity>>,
) -> Option<Vec<BTreeSet<Activity>>> {
    if complete.is_empty() {
        return None;
    }
    complete.sort();
    let targets: Vec<usize> = incomplete
        .iter()
        .map(|component| {
            complete
                .iter()
                .position(|group| adjacent(dfg, component, group))
                .unwrap_or(0)
        })
        .collect();
    for (component, target) in incomplete.into_iter().zip(targets) {
        complete[target].extend(component);
    }
    complete.sort();
    Some(complete)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_log::{min_self_distance::min_self_distance_witnesses, uvcl_struct::UVCL};

    fn set(activities: &[&str]) -> BTreeSet<Activity> {
        activities.iter().map(|a| a.to_string()).collect()
    }

    fn cut(log: &UVCL) -> Option<Cut> {
        concurrency_cut(
            &DirectlyFollowsGraph::from(log),
            &min_self_distance_witnesses(log),
        )
    }

    #[test]
    fn interleaving() {
        let log = UVCL::from(vec![(vec!["a", "b"], 1), (vec!["b", "a"], 1)]);
        assert_eq!(cut(&log).map(|c| c.groups().len()), Some(2));
    }

    #[test]
    fn missing_relation() {
        // a never directly follows b
        let log = UVCL::from(vec![
            (vec!["a", "b", "c"], 1),
            (vec!["c", "a", "b"], 1),
            (vec!["a", "c", "b"], 1),
        ]);
        assert_eq!(
            cut(&log),
            Some(Cut::Concurrency(vec![set(&["a", "b"]), set(&["c"])]))
        );
    }

    #[test]
    fn witnesses_prevent_concurrency() {
        // every pair is directly-follows related in both directions, but b separates the
        // repetitions of a
        let log = UVCL::from(vec![(vec!["a", "b", "a"], 1), (vec!["b", "a", "b"], 1)]);
        assert_eq!(cut(&log), None);
    }

    #[test]
    fn incomplete_groups_join_an_adjacent_group() {
        let mut dfg = DirectlyFollowsGraph::new();
        for a in ["a", "b", "c"] {
            dfg.add_activity(a.into(), 1);
        }
        dfg.add_df_relation("b".into(), "c".into(), 1);
        let merged = merge_incomplete(&dfg, vec![set(&["b"]), set(&["a"])], vec![set(&["c"])]);
        assert_eq!(merged, Some(vec![set(&["a"]), set(&["b", "c"])]));

        // without an edge the first complete group is used
        let merged = merge_incomplete(
            &DirectlyFollowsGraph::new(),
            vec![set(&["b"]), set(&["a"])],
            vec![set(&["c"])],
        );
        assert_eq!(merged, Some(vec![set(&["a", "c"]), set(&["b"])]));
        assert_eq!(merge_incomplete(&dfg, vec![], vec![set(&["c"])]), None);
    }

    #[test]
    fn groups_need_start_and_end() {
        // c is neither a start nor an end activity
        let log = UVCL::from(vec![
            (vec!["a", "b"], 1),
            (vec!["b", "a"], 1),
            (vec!["a", "c", "b"], 1),
            (vec!["b", "c", "a"], 1),
        ]);
        assert_eq!(
            cut(&log),
            Some(Cut::Concurrency(vec![set(&["a", "c"]), set(&["b"])]))
        );
    }
}
