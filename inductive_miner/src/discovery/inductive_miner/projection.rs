use std::collections::BTreeSet;

use crate::event_log::uvcl_struct::{Activity, Variant, UVCL};

use super::cuts::Cut;

fn group_of(groups: &[BTreeSet<Activity>], activity: &Activity) -> Option<usize> {
    groups.iter().position(|g| g.contains(activity))
}

/// Index of the group sharing the most events with `trace` (the lowest one on ties)
fn best_group(groups: &[BTreeSet<Activity>], trace: &[Activity]) -> usize {
    let mut best = (0, 0);
    for (i, group) in groups.iter().enumerate() {
        let shared = trace.iter().filter(|a| group.contains(*a)).count();
        if shared > best.1 {
            best = (i, shared);
        }
    }
    best.0
}

fn filter_trace(trace: &[Activity], group: &BTreeSet<Activity>) -> Variant {
    trace.iter().filter(|a| group.contains(*a)).cloned().collect()
}

/// Every trace goes to the group it shares the most events with, filtered to that group
fn project_exclusive_choice(log: &UVCL, groups: &[BTreeSet<Activity>]) -> Vec<UVCL> {
    let mut result = vec![UVCL::new(); groups.len()];
    for (variant, count) in log.iter() {
        let i = best_group(groups, variant);
        result[i].add_variant(filter_trace(variant, &groups[i]), *count);
    }
    result
}

/// Every trace is split along the group order; events of an earlier group are skipped
fn project_sequence(log: &UVCL, groups: &[BTreeSet<Activity>]) -> Vec<UVCL> {
    let mut result = vec![UVCL::new(); groups.len()];
    for (variant, count) in log.iter() {
        let mut parts: Vec<Variant> = vec![Vec::new(); groups.len()];
        let mut current = 0;
        for a in variant {
            match group_of(groups, a) {
                Some(i) if i >= current => {
                    current = i;
                    parts[i].push(a.clone());
                }
                _ => {}
            }
        }
        for (i, part) in parts.into_iter().enumerate() {
            result[i].add_variant(part, *count);
        }
    }
    result
}

/// Every trace is filtered to each group
fn project_concurrency(log: &UVCL, groups: &[BTreeSet<Activity>]) -> Vec<UVCL> {
    groups.iter().map(|group| log.project_on(group)).collect()
}

///
/// Every trace is split into alternating runs of do and redo activities
///
/// Each do run becomes a trace of the do log (the first group). Each redo run becomes a
/// trace of the redo log it shares the most events with. A trace starting or ending with a
/// redo run yields an empty do trace on that side.
///
fn project_loop(log: &UVCL, groups: &[BTreeSet<Activity>]) -> Vec<UVCL> {
    let mut result = vec![UVCL::new(); groups.len()];
    let Some((do_part, redo_parts)) = groups.split_first() else {
        return result;
    };
    for (variant, count) in log.iter() {
        let mut do_trace: Variant = Vec::new();
        let mut redo_trace: Variant = Vec::new();
        let mut in_redo = false;
        for a in variant {
            if do_part.contains(a) {
                if in_redo {
                    let i = best_group(redo_parts, &redo_trace);
                    let trace = filter_trace(&redo_trace, &redo_parts[i]);
                    result[i + 1].add_variant(trace, *count);
                    redo_trace.clear();
                    in_redo = false;
                }
                do_trace.push(a.clone());
            } else if redo_parts.iter().any(|g| g.contains(a)) {
                if !in_redo {
                    result[0].add_variant(std::mem::take(&mut do_trace), *count);
                    in_redo = true;
                }
                redo_trace.push(a.clone());
            }
        }
        if in_redo {
            let i = best_group(redo_parts, &redo_trace);
            let trace = filter_trace(&redo_trace, &redo_parts[i]);
            result[i + 1].add_variant(trace, *count);
        }
        result[0].add_variant(do_trace, *count);
    }
    result
}

///
/// Split a log according to a cut, returning one log per group (in group order)
///
/// - exclusive choice: every trace is assigned to one group
/// - sequence: every trace is cut into consecutive pieces
/// - concurrency and partial order: every trace is filtered to each group
/// - loop: every trace is cut into do and redo runs
///
pub fn project(log: &UVCL, cut: &Cut) -> Vec<UVCL> {
    match cut {
        Cut::ExclusiveChoice(groups) => project_exclusive_choice(log, groups),
        Cut::Sequence(groups) => project_sequence(log, groups),
        Cut::Concurrency(groups) | Cut::PartialOrder { groups, .. } => {
            project_concurrency(log, groups)
        }
        Cut::Loop(groups) => project_loop(log, groups),
    }
}
