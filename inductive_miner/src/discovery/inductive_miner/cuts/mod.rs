//! Cut detection on the directly-follows graph of a log
//!
//! A cut partitions the alphabet of a log into groups and names the operator
//! connecting the models discovered for each group.

use std::{collections::BTreeSet, fmt::Display};

use itertools::Itertools;

use crate::{
    dfg::dfg_struct::DirectlyFollowsGraph,
    event_log::{
        min_self_distance::min_self_distance_witnesses,
        uvcl_struct::{Activity, UVCL},
    },
    powl::binary_relation::BinaryRelation,
};

use super::config::{InductiveMinerConfig, InductiveMinerVariant};

/// Concurrency cut
pub mod concurrency;
/// Exclusive choice cut
pub mod exclusive_choice;
/// Loop cut
pub mod loop_cut;
/// Partial order cuts of the POWL variants
pub mod partial_order;
/// Sequence cut
pub mod sequence;

/// A cut: the operator together with the activity groups it connects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cut {
    /// Exclusive choice between the groups
    ExclusiveChoice(Vec<BTreeSet<Activity>>),
    /// Sequence of the groups (in order)
    Sequence(Vec<BTreeSet<Activity>>),
    /// Concurrency between the groups
    Concurrency(Vec<BTreeSet<Activity>>),
    /// Loop: the first group is the do part, all others are redo parts
    Loop(Vec<BTreeSet<Activity>>),
    /// Groups executed according to a strict partial order over the group indices
    PartialOrder {
        /// Groups
        groups: Vec<BTreeSet<Activity>>,
        /// Order over `groups`
        order: BinaryRelation,
    },
}

impl Cut {
    /// Activity groups of the cut
    pub fn groups(&self) -> &[BTreeSet<Activity>] {
        match self {
            Cut::ExclusiveChoice(groups)
            | Cut::Sequence(groups)
            | Cut::Concurrency(groups)
            | Cut::Loop(groups)
            | Cut::PartialOrder { groups, .. } => groups,
        }
    }

    /// Name of the cut operator
    pub fn name(&self) -> &'static str {
        match self {
            Cut::ExclusiveChoice(_) => "exclusive choice",
            Cut::Sequence(_) => "sequence",
            Cut::Concurrency(_) => "concurrency",
            Cut::Loop(_) => "loop",
            Cut::PartialOrder { .. } => "partial order",
        }
    }

    /// `true` if the groups are non-empty, pairwise disjoint and cover exactly `alphabet`
    pub fn is_partition_of(&self, alphabet: &BTreeSet<Activity>) -> bool {
        let groups = self.groups();
        let total: usize = groups.iter().map(BTreeSet::len).sum();
        let union: BTreeSet<&Activity> = groups.iter().flatten().collect();
        groups.iter().all(|g| !g.is_empty())
            && total == union.len()
            && union.len() == alphabet.len()
            && alphabet.iter().all(|a| union.contains(a))
    }
}

impl Display for Cut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} cut [{}]",
            self.name(),
            self.groups()
                .iter()
                .map(|group| format!("{{{}}}", group.iter().join(", ")))
                .join(", ")
        )
    }
}

///
/// Run the cut catalogue of the configured variant on `dfg`, returning the first cut found
///
/// The plain catalogue (IM, IMf and `POWL_BASIC`) tries exclusive choice, sequence,
/// concurrency and loop. The other POWL variants try exclusive choice, loop and then their
/// partial order cut. `log` is the log `dfg` was derived from (before any filtering); it
/// provides the minimum self distance witnesses and the eventually-follows graph.
///
pub fn find_cut(
    log: &UVCL,
    dfg: &DirectlyFollowsGraph,
    config: &InductiveMinerConfig,
) -> Option<Cut> {
    match config.variant {
        InductiveMinerVariant::IM
        | InductiveMinerVariant::IMf
        | InductiveMinerVariant::POWLBasic => {
            exclusive_choice::exclusive_choice_cut(dfg)
                .or_else(|| sequence::sequence_cut(dfg))
                .or_else(|| {
                    concurrency::concurrency_cut(dfg, &min_self_distance_witnesses(log))
                })
                .or_else(|| loop_cut::loop_cut(dfg))
        }
        InductiveMinerVariant::POWLMaximal
        | InductiveMinerVariant::POWLDynamicClustering
        | InductiveMinerVariant::POWLBruteForce => {
            exclusive_choice::exclusive_choice_cut(dfg)
                .or_else(|| loop_cut::loop_cut(dfg))
                .or_else(|| partial_order::partial_order_cut(log, dfg, config))
        }
    }
}
