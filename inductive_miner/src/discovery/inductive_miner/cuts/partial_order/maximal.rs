use std::collections::{BTreeMap, BTreeSet};

use crate::{
    dfg::{dfg_struct::DirectlyFollowsGraph, efg_struct::EventuallyFollowsGraph},
    discovery::inductive_miner::cuts::Cut,
    event_log::uvcl_struct::Activity,
};

use super::{eventually_follows_order, is_valid_partial_order_cut};

///
/// Maximal partial order cut
///
/// `a` precedes `b` iff `b` eventually follows `a` but never the other way around.
/// Activities with the same predecessors and the same successors form a group.
///
pub fn maximal_partial_order_cut(
    efg: &EventuallyFollowsGraph,
    dfg: &DirectlyFollowsGraph,
) -> Option<Cut> {
    let alphabet = dfg.alphabet();
    let precedes = |a: &Activity, b: &Activity| efg.contains(a, b) && !efg.contains(b, a);

    let mut clusters: BTreeMap<(BTreeSet<&Activity>, BTreeSet<&Activity>), BTreeSet<Activity>> =
        BTreeMap::new();
    for a in &alphabet {
        let predecessors = alphabet.iter().filter(|b| precedes(*b, a)).collect();
        let successors = alphabet.iter().filter(|b| precedes(a, *b)).collect();
        clusters
            .entry((predecessors, successors))
            .or_default()
            .insert(a.clone());
    }
    let mut groups: Vec<BTreeSet<Activity>> = clusters.into_values().collect();
    groups.sort();

    let order = eventually_follows_order(&groups, efg);
    is_valid_partial_order_cut(&groups, &order, efg, dfg)
        .then_some(Cut::PartialOrder { groups, order })
}
