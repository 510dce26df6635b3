use std::collections::BTreeSet;

use crate::{
    dfg::{dfg_struct::DirectlyFollowsGraph, efg_struct::EventuallyFollowsGraph},
    discovery::inductive_miner::cuts::Cut,
    event_log::uvcl_struct::Activity,
    powl::binary_relation::BinaryRelation,
};

use super::is_valid_partial_order_cut;

fn block_frequency(
    efg: &EventuallyFollowsGraph,
    x: &BTreeSet<Activity>,
    y: &BTreeSet<Activity>,
) -> u64 {
    x.iter()
        .flat_map(|a| y.iter().map(move |b| efg.frequency(a, b)))
        .fold(0, |total, f| total.saturating_add(f))
}

/// `X -> Y` iff `Y` follows `X` at all and in at least `ratio` of the observations between them
fn frequency_order(
    groups: &[BTreeSet<Activity>],
    efg: &EventuallyFollowsGraph,
    ratio: f64,
) -> BinaryRelation {
    let mut order = BinaryRelation::new(groups.len());
    for (i, x) in groups.iter().enumerate() {
        for (j, y) in groups.iter().enumerate() {
            if i == j {
                continue;
            }
            let forward = block_frequency(efg, x, y);
            let backward = block_frequency(efg, y, x);
            let observed = forward as f64 + backward as f64;
            if forward > 0 && forward as f64 / observed >= ratio {
                order.add_edge(i, j);
            }
        }
    }
    order
}

fn has_start(dfg: &DirectlyFollowsGraph, group: &BTreeSet<Activity>) -> bool {
    group.iter().any(|a| dfg.is_start_activity(a))
}

fn has_end(dfg: &DirectlyFollowsGraph, group: &BTreeSet<Activity>) -> bool {
    group.iter().any(|a| dfg.is_end_activity(a))
}

/// Indices of groups that have to be merged, `None` if the cut is valid
fn find_violation(
    groups: &[BTreeSet<Activity>],
    order: &BinaryRelation,
    efg: &EventuallyFollowsGraph,
    dfg: &DirectlyFollowsGraph,
) -> Option<Vec<usize>> {
    let n = groups.len();
    for i in 0..n {
        for j in i + 1..n {
            if order.is_edge(i, j) && order.is_edge(j, i) {
                return Some(vec![i, j]);
            }
        }
    }
    for (i, j) in order.edges() {
        if let Some(k) = order.successors(j).find(|k| *k != i && !order.is_edge(i, *k)) {
            return Some(vec![i, j, k]);
        }
    }
    for i in 0..n {
        for j in i + 1..n {
            if order.is_edge(i, j) || order.is_edge(j, i) {
                continue;
            }
            let concurrent = groups[i].iter().all(|a| {
                groups[j]
                    .iter()
                    .all(|b| efg.contains(a, b) && efg.contains(b, a))
            });
            if !concurrent {
                return Some(vec![i, j]);
            }
        }
    }
    for i in order.sources() {
        if !has_start(dfg, &groups[i]) {
            let partner = (0..n).find(|j| *j != i && has_start(dfg, &groups[*j]));
            return Some(partner.map_or_else(|| (0..n).collect(), |j| vec![i, j]));
        }
    }
    for i in order.sinks() {
        if !has_end(dfg, &groups[i]) {
            let partner = (0..n).find(|j| *j != i && has_end(dfg, &groups[*j]));
            return Some(partner.map_or_else(|| (0..n).collect(), |j| vec![i, j]));
        }
    }
    None
}

fn merge(groups: Vec<BTreeSet<Activity>>, indices: &[usize]) -> Vec<BTreeSet<Activity>> {
    let mut merged: BTreeSet<Activity> = BTreeSet::new();
    let mut result: Vec<BTreeSet<Activity>> = Vec::with_capacity(groups.len());
    for (i, group) in groups.into_iter().enumerate() {
        if indices.contains(&i) {
            merged.extend(group);
        } else {
            result.push(group);
        }
    }
    result.push(merged);
    result.sort();
    result
}

///
/// Dynamic clustering partial order cut
///
/// Starts with one group per activity. Groups are ordered by the frequency with which they
/// eventually follow each other (see `ratio`); groups causing a cycle, a missing transitive
/// edge, an unsupported concurrency or a missing start or end activity are merged until the
/// cut is valid or only one group is left.
///
pub fn dynamic_clustering_partial_order_cut(
    efg: &EventuallyFollowsGraph,
    dfg: &DirectlyFollowsGraph,
    ratio: f64,
) -> Option<Cut> {
    let mut groups: Vec<BTreeSet<Activity>> = dfg
        .alphabet()
        .into_iter()
        .map(|a| BTreeSet::from([a]))
        .collect();
    while groups.len() >= 2 {
        let order = frequency_order(&groups, efg, ratio);
        match find_violation(&groups, &order, efg, dfg) {
            None => {
                return is_valid_partial_order_cut(&groups, &order, efg, dfg)
                    .then_some(Cut::PartialOrder { groups, order });
            }
            Some(indices) => groups = merge(groups, &indices),
        }
    }
    None
}
