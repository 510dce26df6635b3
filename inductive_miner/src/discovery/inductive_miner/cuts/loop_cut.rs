use std::collections::BTreeSet;

use crate::{dfg::dfg_struct::DirectlyFollowsGraph, event_log::uvcl_struct::Activity};

use super::Cut;

fn is_redo_part(
    dfg: &DirectlyFollowsGraph,
    candidate: &BTreeSet<Activity>,
    do_part: &BTreeSet<Activity>,
) -> bool {
    let from_candidate_to =
        |b: &Activity| candidate.iter().any(|c| dfg.contains_df_relation((c, b)));
    let to_candidate_from =
        |a: &Activity| candidate.iter().any(|c| dfg.contains_df_relation((a, c)));

    dfg.start_activities.keys().all(from_candidate_to)
        && dfg.end_activities.keys().all(to_candidate_from)
        && dfg.directly_follows_relations.keys().all(|(a, b)| {
            if do_part.contains(a) && candidate.contains(b) {
                dfg.is_end_activity(a)
            } else if candidate.contains(a) && do_part.contains(b) {
                dfg.is_start_activity(b)
            } else {
                true
            }
        })
}

///
/// Loop cut
///
/// The do part starts out as all start and end activities; the connected components of the
/// remaining activities are the redo candidates. A candidate stays a redo part only if
/// - every start activity directly follows some activity of the candidate,
/// - every end activity is directly followed by some activity of the candidate, and
/// - the candidate is entered only from end activities and left only to start activities.
///
/// Other candidates are moved into the do part (repeatedly, as this changes the do part).
/// The first group of the returned cut is the do part.
///
pub fn loop_cut(dfg: &DirectlyFollowsGraph) -> Option<Cut> {
    if dfg.start_activities.is_empty() {
        return None;
    }
    let mut do_part: BTreeSet<Activity> = dfg
        .start_activities
        .keys()
        .chain(dfg.end_activities.keys())
        .cloned()
        .collect();

    let mut remainder = dfg.clone();
    for a in &do_part {
        remainder.remove_activity(a);
    }
    let mut candidates = remainder.connected_components();

    while let Some(i) = candidates
        .iter()
        .position(|candidate| !is_redo_part(dfg, candidate, &do_part))
    {
        let demoted = candidates.remove(i);
        do_part.extend(demoted);
    }
    if candidates.is_empty() {
        return None;
    }
    let mut groups = vec![do_part];
    groups.extend(candidates);
    Some(Cut::Loop(groups))
}
