use std::collections::{BTreeMap, BTreeSet};

use petgraph::{algo::tarjan_scc, graph::DiGraph};

use crate::{dfg::dfg_struct::DirectlyFollowsGraph, event_log::uvcl_struct::Activity};

use super::Cut;

fn reaches(
    reachability: &BTreeMap<Activity, BTreeSet<Activity>>,
    from: &BTreeSet<Activity>,
    to: &BTreeSet<Activity>,
) -> bool {
    from.iter().any(|a| {
        reachability
            .get(a)
            .is_some_and(|reachable| to.iter().any(|b| reachable.contains(b)))
    })
}

fn merge_unreachable_pair(
    reachability: &BTreeMap<Activity, BTreeSet<Activity>>,
    groups: &mut Vec<BTreeSet<Activity>>,
) -> bool {
    for i in 0..groups.len() {
        for j in i + 1..groups.len() {
            if !reaches(reachability, &groups[i], &groups[j])
                && !reaches(reachability, &groups[j], &groups[i])
            {
                let merged = groups.remove(j);
                groups[i].extend(merged);
                return true;
            }
        }
    }
    false
}

/// Merge every cycle of the reachability relation between groups into one group
fn merge_cycles(
    reachability: &BTreeMap<Activity, BTreeSet<Activity>>,
    groups: &mut Vec<BTreeSet<Activity>>,
) -> bool {
    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let nodes: Vec<_> = (0..groups.len()).map(|i| graph.add_node(i)).collect();
    for (i, from) in groups.iter().enumerate() {
        for (j, to) in groups.iter().enumerate() {
            if i != j && reaches(reachability, from, to) {
                graph.add_edge(nodes[i], nodes[j], ());
            }
        }
    }
    let components = tarjan_scc(&graph);
    if components.len() == groups.len() {
        return false;
    }
    let mut previous = std::mem::take(groups);
    *groups = components
        .into_iter()
        .map(|component| {
            component
                .into_iter()
                .flat_map(|n| std::mem::take(&mut previous[graph[n]]))
                .collect()
        })
        .collect();
    groups.sort();
    true
}

///
/// Sequence cut
///
/// Starting from the strongly connected components of the directly-follows graph, groups are
/// merged until no two of them are mutually unreachable and no groups reach each other in a
/// cycle. The remaining groups are totally ordered by reachability and sorted by the number
/// of groups reaching them.
///
pub fn sequence_cut(dfg: &DirectlyFollowsGraph) -> Option<Cut> {
    let mut groups = dfg.strongly_connected_components();
    if groups.len() < 2 {
        return None;
    }
    let reachability = dfg.reachability();

    while groups.len() > 1
        && (merge_unreachable_pair(&reachability, &mut groups)
            || merge_cycles(&reachability, &mut groups))
    {}
    if groups.len() < 2 {
        return None;
    }

    let mut ranked: Vec<(usize, BTreeSet<Activity>)> = groups
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let reached_by = groups
                .iter()
                .enumerate()
                .filter(|(j, h)| *j != i && reaches(&reachability, h, g))
                .count();
            (reached_by, g.clone())
        })
        .collect();
    ranked.sort();
    let groups: Vec<BTreeSet<Activity>> = ranked.into_iter().map(|(_, g)| g).collect();

    debug_assert!((0..groups.len()).all(|i| {
        (i + 1..groups.len()).all(|j| !reaches(&reachability, &groups[j], &groups[i]))
    }));
    Some(Cut::Sequence(groups))
}
