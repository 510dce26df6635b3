use std::collections::BTreeSet;

use rayon::prelude::*;

use crate::{
    dfg::dfg_struct::DirectlyFollowsGraph,
    event_log::uvcl_struct::{Activity, Variant, UVCL},
};

use super::{
    config::{FallThroughKind, InductiveMinerConfig, InductiveMinerVariant},
    cuts::find_cut,
};

/// Fall-through applied when no cut could be found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallThrough {
    /// `X(tau, M)` for the log without empty traces
    EmptyTraces(UVCL),
    /// The empty traces are infrequent (IMf) and dropped
    InfrequentEmptyTraces(UVCL),
    /// The activity occurs exactly once in every trace: `+(activity, M)`
    ActivityOncePerTrace {
        /// The activity
        activity: Activity,
        /// Log of the activity
        activity_log: UVCL,
        /// Log without the activity
        remainder: UVCL,
    },
    /// Removing the activity allows a cut: `+(M_activity, M)`
    ActivityConcurrent {
        /// The activity
        activity: Activity,
        /// Log of the activity
        activity_log: UVCL,
        /// Log without the activity
        remainder: UVCL,
    },
    /// Traces split where an end activity is followed by a start activity: `*(M, tau)`
    StrictTauLoop(UVCL),
    /// Traces split before every start activity: `*(M, tau)`
    TauLoop(UVCL),
    /// Any activity, any number of times: `*(X(a, b, ...), tau)`, or
    /// `*(tau, X(a, b, ...))` if the log contains empty traces
    Flower {
        /// Activities
        activities: Vec<Activity>,
        /// `true` if the log contains empty traces
        empty_traces: bool,
    },
}

impl FallThrough {
    /// Name of the fall-through
    pub fn name(&self) -> &'static str {
        match self {
            FallThrough::EmptyTraces(_) => "empty traces",
            FallThrough::InfrequentEmptyTraces(_) => "infrequent empty traces",
            FallThrough::ActivityOncePerTrace { .. } => "activity once per trace",
            FallThrough::ActivityConcurrent { .. } => "activity concurrent",
            FallThrough::StrictTauLoop(_) => "strict tau loop",
            FallThrough::TauLoop(_) => "tau loop",
            FallThrough::Flower { .. } => "flower model",
        }
    }
}

fn empty_traces(log: &UVCL, config: &InductiveMinerConfig) -> Option<FallThrough> {
    if !log.contains_empty_trace() {
        return None;
    }
    let remainder = log.without_empty_traces();
    let infrequent = config.variant == InductiveMinerVariant::IMf
        && (log.empty_trace_count() as f64)
            < config.noise_threshold * log.number_of_traces() as f64;
    Some(if infrequent {
        FallThrough::InfrequentEmptyTraces(remainder)
    } else {
        FallThrough::EmptyTraces(remainder)
    })
}

fn activity_once_per_trace(log: &UVCL) -> Option<FallThrough> {
    let alphabet = log.alphabet();
    if alphabet.len() < 2 {
        return None;
    }
    alphabet
        .into_iter()
        .find(|a| {
            log.iter()
                .all(|(variant, _)| variant.iter().filter(|b| *b == a).count() == 1)
        })
        .map(|activity| FallThrough::ActivityOncePerTrace {
            activity_log: log.project_on(&BTreeSet::from([activity.clone()])),
            remainder: log.remove_activity(&activity),
            activity,
        })
}

fn activity_concurrent(log: &UVCL, config: &InductiveMinerConfig) -> Option<FallThrough> {
    let alphabet: Vec<Activity> = log.alphabet().into_iter().collect();
    if alphabet.len() < 2 {
        return None;
    }
    alphabet
        .par_iter()
        .find_first(|a| {
            let creates_empty_trace = log
                .iter()
                .any(|(variant, _)| !variant.is_empty() && variant.iter().all(|b| b == *a));
            if creates_empty_trace {
                return false;
            }
            let reduced = log.remove_activity(a);
            find_cut(&reduced, &DirectlyFollowsGraph::from(&reduced), config).is_some()
        })
        .map(|activity| FallThrough::ActivityConcurrent {
            activity: activity.clone(),
            activity_log: log.project_on(&BTreeSet::from([activity.clone()])),
            remainder: log.remove_activity(activity),
        })
}

/// Split every variant before the positions `i > 0` for which `split_before(v[i - 1], v[i])`
fn split_log<F>(log: &UVCL, split_before: F) -> UVCL
where
    F: Fn(&Activity, &Activity) -> bool,
{
    let mut result = UVCL::new();
    for (variant, count) in log.iter() {
        let mut piece: Variant = Vec::new();
        for (i, a) in variant.iter().enumerate() {
            if i > 0 && split_before(&variant[i - 1], a) {
                result.add_variant(std::mem::take(&mut piece), *count);
            }
            piece.push(a.clone());
        }
        result.add_variant(piece, *count);
    }
    result
}

fn strict_tau_loop(log: &UVCL) -> Option<FallThrough> {
    let starts = log.start_activities();
    let ends = log.end_activities();
    let split = split_log(log, |previous, current| {
        ends.contains_key(previous) && starts.contains_key(current)
    });
    (split.number_of_traces() > log.number_of_traces())
        .then_some(FallThrough::StrictTauLoop(split))
}

fn tau_loop(log: &UVCL) -> Option<FallThrough> {
    let starts = log.start_activities();
    let split = split_log(log, |_, current| starts.contains_key(current));
    (split.number_of_traces() > log.number_of_traces()).then_some(FallThrough::TauLoop(split))
}

///
/// Pick the first applicable fall-through
///
/// Tried in order: empty traces, activity once per trace, activity concurrent, strict tau
/// loop, tau loop. Rules disabled in the configuration are skipped. The flower model always
/// applies.
///
pub fn find_fall_through(log: &UVCL, config: &InductiveMinerConfig) -> FallThrough {
    for kind in FallThroughKind::ALL {
        if !config.is_enabled(kind) {
            continue;
        }
        let result = match kind {
            FallThroughKind::EmptyTrace => empty_traces(log, config),
            FallThroughKind::OncePerTrace => activity_once_per_trace(log),
            FallThroughKind::Concurrent => activity_concurrent(log, config),
            FallThroughKind::StrictTauLoop => strict_tau_loop(log),
            FallThroughKind::TauLoop => tau_loop(log),
        };
        if let Some(result) = result {
            return result;
        }
    }
    FallThrough::Flower {
        activities: log.alphabet().into_iter().collect(),
        empty_traces: log.contains_empty_trace(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uvcl(variants: Vec<(Vec<&str>, u64)>) -> UVCL {
        UVCL::from(variants)
    }

    #[test]
    fn empty_traces_first() {
        let log = uvcl(vec![(vec!["a"], 5), (vec![], 1)]);
        let config = InductiveMinerConfig::default();
        assert_eq!(
            find_fall_through(&log, &config),
            FallThrough::EmptyTraces(uvcl(vec![(vec!["a"], 5)]))
        );

        let config = InductiveMinerConfig {
            variant: InductiveMinerVariant::IMf,
            noise_threshold: 0.2,
            ..Default::default()
        };
        assert_eq!(
            find_fall_through(&log, &config),
            FallThrough::InfrequentEmptyTraces(uvcl(vec![(vec!["a"], 5)]))
        );
    }

    #[test]
    fn once_per_trace() {
        let log = uvcl(vec![(vec!["a", "b", "a", "c"], 1), (vec!["c", "a", "a"], 1)]);
        let FallThrough::ActivityOncePerTrace {
            activity,
            activity_log,
            remainder,
        } = find_fall_through(&log, &InductiveMinerConfig::default())
        else {
            panic!("expected activity once per trace");
        };
        assert_eq!(activity, "c");
        assert_eq!(activity_log, uvcl(vec![(vec!["c"], 2)]));
        assert_eq!(remainder, uvcl(vec![(vec!["a", "b", "a"], 1), (vec!["a", "a"], 1)]));
    }

    #[test]
    fn strict_tau_loop_splits_at_end_start_boundaries() {
        let log = uvcl(vec![
            (vec!["a", "b", "a", "c", "b", "a"], 1),
            (vec!["c", "a", "b"], 1),
            (vec!["b", "c", "a", "c"], 1),
        ]);
        let config = InductiveMinerConfig {
            disable_fallthroughs: BTreeSet::from([
                FallThroughKind::OncePerTrace,
                FallThroughKind::Concurrent,
            ]),
            ..Default::default()
        };
        let FallThrough::StrictTauLoop(split) = find_fall_through(&log, &config) else {
            panic!("expected strict tau loop");
        };
        assert_eq!(split, uvcl(vec![(vec!["a"], 5), (vec!["b"], 4), (vec!["c"], 4)]));
    }

    #[test]
    fn tau_loop_splits_at_start_activities() {
        let log = uvcl(vec![(vec!["a", "b", "a", "c"], 1)]);
        assert_eq!(
            tau_loop(&log),
            Some(FallThrough::TauLoop(uvcl(vec![(vec!["a", "b"], 1), (vec!["a", "c"], 1)])))
        );
        assert_eq!(strict_tau_loop(&log), None);
    }

    #[test]
    fn flower_when_everything_is_disabled() {
        let log = uvcl(vec![(vec!["a", "b", "a"], 1), (vec![], 1)]);
        let config = InductiveMinerConfig {
            disable_fallthroughs: FallThroughKind::ALL.into_iter().collect(),
            ..Default::default()
        };
        assert_eq!(
            find_fall_through(&log, &config),
            FallThrough::Flower {
                activities: vec!["a".to_string(), "b".to_string()],
                empty_traces: true,
            }
        );
    }

    #[test]
    fn concurrent_activity() {
        // without c, the log is a sequence of a and b
        let log = uvcl(vec![
            (vec!["c", "a", "b", "c"], 1),
            (vec!["a", "c", "b"], 1),
            (vec!["a", "b"], 1),
        ]);
        let config = InductiveMinerConfig {
            disable_fallthroughs: BTreeSet::from([FallThroughKind::OncePerTrace]),
            ..Default::default()
        };
        let FallThrough::ActivityConcurrent { activity, .. } = find_fall_through(&log, &config)
        else {
            panic!("expected activity concurrent");
        };
        assert_eq!(activity, "c");
    }
}
