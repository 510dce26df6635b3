use crate::dfg::dfg_struct::DirectlyFollowsGraph;

use super::Cut;

/// Exclusive choice cut: the connected components of the (undirected) directly-follows graph
pub fn exclusive_choice_cut(dfg: &DirectlyFollowsGraph) -> Option<Cut> {
    let components = dfg.connected_components();
    (components.len() >= 2).then_some(Cut::ExclusiveChoice(components))
}
