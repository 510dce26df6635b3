use std::collections::BTreeSet;

use crate::{
    dfg::{dfg_struct::DirectlyFollowsGraph, efg_struct::EventuallyFollowsGraph},
    discovery::inductive_miner::config::{InductiveMinerConfig, InductiveMinerVariant},
    event_log::uvcl_struct::{Activity, UVCL},
    powl::binary_relation::BinaryRelation,
};

use super::Cut;

/// Brute-force search over all partitions of the alphabet
pub mod brute_force;
/// Iterative merging of blocks starting from singletons
pub mod dynamic_clustering;
/// Clustering of activities with identical predecessors and successors
pub mod maximal;

///
/// Order between groups induced by the eventually-follows graph
///
/// `X -> Y` iff for all `a` in `X` and `b` in `Y`, `b` eventually follows `a` in some trace
/// and `a` never eventually follows `b`.
///
pub fn eventually_follows_order(
    groups: &[BTreeSet<Activity>],
    efg: &EventuallyFollowsGraph,
) -> BinaryRelation {
    let mut order = BinaryRelation::new(groups.len());
    for (i, x) in groups.iter().enumerate() {
        for (j, y) in groups.iter().enumerate() {
            if i != j
                && x.iter()
                    .all(|a| y.iter().all(|b| efg.contains(a, b) && !efg.contains(b, a)))
            {
                order.add_edge(i, j);
            }
        }
    }
    order
}

///
/// Check whether `groups` ordered by `order` form a partial order cut
///
/// - there are at least two groups
/// - `order` is irreflexive and transitive
/// - for every pair of unordered groups, all their activities eventually follow each other
///   in both directions
/// - every group without predecessor contains a start activity, every group without
///   successor an end activity
///
pub fn is_valid_partial_order_cut(
    groups: &[BTreeSet<Activity>],
    order: &BinaryRelation,
    efg: &EventuallyFollowsGraph,
    dfg: &DirectlyFollowsGraph,
) -> bool {
    if groups.len() < 2 || order.size() != groups.len() || !order.is_strict_partial_order() {
        return false;
    }
    for (i, x) in groups.iter().enumerate() {
        for (j, y) in groups.iter().enumerate().skip(i + 1) {
            if !order.is_edge(i, j)
                && !order.is_edge(j, i)
                && !x
                    .iter()
                    .all(|a| y.iter().all(|b| efg.contains(a, b) && efg.contains(b, a)))
            {
                return false;
            }
        }
    }
    order
        .sources()
        .into_iter()
        .all(|i| groups[i].iter().any(|a| dfg.is_start_activity(a)))
        && order
            .sinks()
            .into_iter()
            .all(|i| groups[i].iter().any(|a| dfg.is_end_activity(a)))
}

/// Partial order cut of the configured POWL variant
pub fn partial_order_cut(
    log: &UVCL,
    dfg: &DirectlyFollowsGraph,
    config: &InductiveMinerConfig,
) -> Option<Cut> {
    let efg = EventuallyFollowsGraph::from(log);
    match config.variant {
        InductiveMinerVariant::POWLMaximal => maximal::maximal_partial_order_cut(&efg, dfg),
        InductiveMinerVariant::POWLDynamicClustering => {
            dynamic_clustering::dynamic_clustering_partial_order_cut(
                &efg,
                dfg,
                config.order_frequency_ratio,
            )
        }
        InductiveMinerVariant::POWLBruteForce => {
            brute_force::brute_force_partial_order_cut(&efg, dfg)
        }
        _ => None,
    }
}
