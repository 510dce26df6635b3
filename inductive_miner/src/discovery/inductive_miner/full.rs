use std::fmt::Display;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    dfg::dfg_struct::DirectlyFollowsGraph,
    event_log::{import_uvcl::validate_uvcl, uvcl_struct::UVCL},
    powl::{binary_relation::BinaryRelation, powl_struct::POWL, simplification::simplify_powl},
    process_tree::{
        process_tree_struct::{Node, OperatorType, ProcessTree},
        simplification::simplify_process_tree,
    },
};

use super::{
    base_cases::{find_base_case, BaseCase},
    config::{InductiveMinerConfig, InductiveMinerVariant},
    cuts::{find_cut, Cut},
    error::InductiveMinerError,
    fall_through::{find_fall_through, FallThrough},
    projection::project,
};

///
/// Hierarchical process model that can be built by the Inductive Miner
///
/// Implemented for process tree [`Node`]s and for [`POWL`] models.
///
pub trait InductiveModel: Sized {
    /// Silent step
    fn silent() -> Self;
    /// Activity
    fn activity(label: &str) -> Self;
    /// Exclusive choice
    fn exclusive_choice(children: Vec<Self>) -> Self;
    /// Sequence
    fn sequence(children: Vec<Self>) -> Self;
    /// Concurrency
    fn concurrency(children: Vec<Self>) -> Self;
    /// `Loop(do, redo)`
    fn looping(do_part: Self, redo_part: Self) -> Self;
    /// Strict partial order over `children`
    fn partial_order(children: Vec<Self>, order: BinaryRelation)
        -> Result<Self, InductiveMinerError>;
}

impl InductiveModel for Node {
    fn silent() -> Self {
        Node::tau()
    }

    fn activity(label: &str) -> Self {
        Node::new_leaf(Some(label.to_string()))
    }

    fn exclusive_choice(children: Vec<Self>) -> Self {
        Node::operator_with_children(OperatorType::ExclusiveChoice, children)
    }

    fn sequence(children: Vec<Self>) -> Self {
        Node::operator_with_children(OperatorType::Sequence, children)
    }

    fn concurrency(children: Vec<Self>) -> Self {
        Node::operator_with_children(OperatorType::Concurrency, children)
    }

    fn looping(do_part: Self, redo_part: Self) -> Self {
        Node::operator_with_children(OperatorType::Loop, vec![do_part, redo_part])
    }

    /// Only total orders (sequences) and empty orders (concurrency) can be expressed
    fn partial_order(
        children: Vec<Self>,
        order: BinaryRelation,
    ) -> Result<Self, InductiveMinerError> {
        let order = order.transitive_closure();
        if order.is_empty() {
            Ok(Self::concurrency(children))
        } else if order == BinaryRelation::total_order(children.len()) {
            Ok(Self::sequence(children))
        } else {
            Err(InductiveMinerError::InternalInvariant(
                "partial order cannot be expressed as a process tree".to_string(),
            ))
        }
    }
}

impl InductiveModel for POWL {
    fn silent() -> Self {
        POWL::silent()
    }

    fn activity(label: &str) -> Self {
        POWL::activity(label)
    }

    fn exclusive_choice(children: Vec<Self>) -> Self {
        POWL::exclusive_choice(children)
    }

    fn sequence(children: Vec<Self>) -> Self {
        POWL::sequence(children)
    }

    fn concurrency(children: Vec<Self>) -> Self {
        POWL::concurrency(children)
    }

    fn looping(do_part: Self, redo_part: Self) -> Self {
        POWL::looping(do_part, redo_part)
    }

    fn partial_order(
        children: Vec<Self>,
        order: BinaryRelation,
    ) -> Result<Self, InductiveMinerError> {
        POWL::partial_order(children, order)
            .map_err(|e| InductiveMinerError::InternalInvariant(e.to_string()))
    }
}

/// Result of [`discover`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Model {
    /// Process tree (IM, IMf)
    ProcessTree(ProcessTree),
    /// POWL model (POWL variants)
    POWL(POWL),
}

impl Model {
    /// Number of leaves carrying an activity label
    pub fn count_activity_leaves(&self) -> usize {
        match self {
            Model::ProcessTree(tree) => tree.root.count_activity_leaves(),
            Model::POWL(powl) => powl.count_activity_leaves(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Model::ProcessTree(tree) => write!(f, "{}", tree),
            Model::POWL(powl) => write!(f, "{}", powl),
        }
    }
}

struct InductiveMiner<'a> {
    config: &'a InductiveMinerConfig,
}

impl InductiveMiner<'_> {
    fn discover<M: InductiveModel>(
        &self,
        log: &UVCL,
        depth: usize,
    ) -> Result<M, InductiveMinerError> {
        if depth > self.config.max_recursion_depth {
            return Err(InductiveMinerError::ResourceExhausted { depth });
        }
        if let Some(base_case) = find_base_case(log) {
            debug!("Base case at depth {}: {:?}", depth, base_case);
            return Ok(match base_case {
                BaseCase::Empty => M::silent(),
                BaseCase::SingleActivity(a) => M::activity(&a),
            });
        }

        let dfg = DirectlyFollowsGraph::from(log);
        if let Some(cut) = find_cut(log, &dfg, self.config) {
            return self.apply_cut(log, cut, true, depth);
        }
        if let Some(cut) = self.find_filtered_cut(log, &dfg) {
            return self.apply_cut(log, cut, false, depth);
        }

        let fall_through = find_fall_through(log, self.config);
        debug!("Fall-through at depth {}: {}", depth, fall_through.name());
        self.apply_fall_through(fall_through, depth)
    }

    /// Retry the cut catalogue on filtered abstractions of the log
    fn find_filtered_cut(&self, log: &UVCL, dfg: &DirectlyFollowsGraph) -> Option<Cut> {
        let config = self.config;
        if config.variant == InductiveMinerVariant::IMf && config.noise_threshold > 0.0 {
            let filtered = dfg.filter_noise(config.noise_threshold);
            if &filtered != dfg {
                return find_cut(log, &filtered, config);
            }
        }
        if config.variant.is_powl() && config.filtering_threshold > 0.0 {
            let filtered = log.filter_infrequent_variants(config.filtering_threshold);
            if &filtered != log && filtered.alphabet() == log.alphabet() {
                return find_cut(&filtered, &DirectlyFollowsGraph::from(&filtered), config);
            }
        }
        None
    }

    fn apply_cut<M: InductiveModel>(
        &self,
        log: &UVCL,
        cut: Cut,
        exact: bool,
        depth: usize,
    ) -> Result<M, InductiveMinerError> {
        debug!(
            "{} at depth {}: {}",
            if exact { "Cut" } else { "Filtered cut" },
            depth,
            cut
        );
        if !cut.is_partition_of(&log.alphabet()) {
            return Err(InductiveMinerError::InternalInvariant(format!(
                "{} is not a partition of the alphabet",
                cut
            )));
        }
        let sublogs = project(log, &cut);
        if exact {
            let projected = sublogs
                .iter()
                .fold(0u64, |total, l| total.saturating_add(l.number_of_events()));
            if projected != log.number_of_events() {
                return Err(InductiveMinerError::InternalInvariant(format!(
                    "projection on {} keeps {} of {} events",
                    cut,
                    projected,
                    log.number_of_events()
                )));
            }
        }
        let mut children = sublogs
            .iter()
            .map(|sublog| self.discover(sublog, depth + 1))
            .collect::<Result<Vec<M>, _>>()?;

        match cut {
            Cut::ExclusiveChoice(_) => Ok(M::exclusive_choice(children)),
            Cut::Sequence(_) => Ok(M::sequence(children)),
            Cut::Concurrency(_) => Ok(M::concurrency(children)),
            Cut::PartialOrder { order, .. } => M::partial_order(children, order),
            Cut::Loop(_) => {
                let mut redo_parts = children.split_off(1);
                let do_part = children.pop().ok_or_else(|| {
                    InductiveMinerError::InternalInvariant("loop without do part".to_string())
                })?;
                let redo_part = if redo_parts.len() == 1 {
                    redo_parts.remove(0)
                } else {
                    M::exclusive_choice(redo_parts)
                };
                Ok(M::looping(do_part, redo_part))
            }
        }
    }

    fn apply_fall_through<M: InductiveModel>(
        &self,
        fall_through: FallThrough,
        depth: usize,
    ) -> Result<M, InductiveMinerError> {
        Ok(match fall_through {
            FallThrough::EmptyTraces(remainder) => {
                M::exclusive_choice(vec![M::silent(), self.discover(&remainder, depth + 1)?])
            }
            FallThrough::InfrequentEmptyTraces(remainder) => self.discover(&remainder, depth + 1)?,
            FallThrough::ActivityOncePerTrace {
                activity_log,
                remainder,
                ..
            }
            | FallThrough::ActivityConcurrent {
                activity_log,
                remainder,
                ..
            } => M::concurrency(vec![
                self.discover(&activity_log, depth + 1)?,
                self.discover(&remainder, depth + 1)?,
            ]),
            FallThrough::StrictTauLoop(split) | FallThrough::TauLoop(split) => {
                M::looping(self.discover(&split, depth + 1)?, M::silent())
            }
            FallThrough::Flower {
                activities,
                empty_traces,
            } => {
                let mut leaves: Vec<M> = activities.iter().map(|a| M::activity(a)).collect();
                let choice = if leaves.len() == 1 {
                    leaves.remove(0)
                } else {
                    M::exclusive_choice(leaves)
                };
                if empty_traces {
                    M::looping(M::silent(), choice)
                } else {
                    M::looping(choice, M::silent())
                }
            }
        })
    }
}

fn check_inputs(
    log: &UVCL,
    config: &InductiveMinerConfig,
    powl: bool,
) -> Result<(), InductiveMinerError> {
    config.validate()?;
    if config.variant.is_powl() != powl {
        return Err(InductiveMinerError::InvalidOption {
            name: "variant".to_string(),
            value: format!(
                "{} does not discover {}",
                config.variant,
                if powl { "POWL models" } else { "process trees" }
            ),
        });
    }
    Ok(validate_uvcl(log)?)
}

///
/// Discover a [`ProcessTree`] using the Inductive Miner (variants `IM` and `IMf`)
///
pub fn discover_process_tree(
    log: &UVCL,
    config: &InductiveMinerConfig,
) -> Result<ProcessTree, InductiveMinerError> {
    check_inputs(log, config, false)?;
    let root: Node = InductiveMiner { config }.discover(log, 0)?;
    let tree = if config.simplify {
        simplify_process_tree(ProcessTree::new(root))
    } else {
        ProcessTree::new(root)
    };
    info!(
        "Discovered process tree with {} activity leaves using {}",
        tree.root.count_activity_leaves(),
        config.variant
    );
    Ok(tree)
}

///
/// Discover a [`POWL`] model using one of the POWL variants of the Inductive Miner
///
pub fn discover_powl(
    log: &UVCL,
    config: &InductiveMinerConfig,
) -> Result<POWL, InductiveMinerError> {
    check_inputs(log, config, true)?;
    let model: POWL = InductiveMiner { config }.discover(log, 0)?;
    let model = if config.simplify {
        simplify_powl(model)
    } else {
        model
    };
    info!(
        "Discovered POWL model with {} activity leaves using {}",
        model.count_activity_leaves(),
        config.variant
    );
    Ok(model)
}

///
/// Discover a process model from a compressed log
///
/// Returns a [`Model::ProcessTree`] for `IM`/`IMf` and a [`Model::POWL`] for the POWL
/// variants. The options are checked first ([`InductiveMinerConfig::validate`]).
///
pub fn discover(log: &UVCL, config: &InductiveMinerConfig) -> Result<Model, InductiveMinerError> {
    if config.variant.is_powl() {
        discover_powl(log, config).map(Model::POWL)
    } else {
        discover_process_tree(log, config).map(Model::ProcessTree)
    }
}
