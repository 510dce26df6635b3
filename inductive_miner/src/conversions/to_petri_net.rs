use log::debug;

use crate::{
    discovery::inductive_miner::Model,
    petri_net::{
        petri_net_struct::{ArcType, Marking, PetriNet, PlaceID, TransitionID},
        reduction::reduce_silent_transitions,
    },
    powl::{
        binary_relation::BinaryRelation,
        powl_struct::{POWLError, POWLOperator, POWL},
    },
    process_tree::process_tree_struct::{LeafLabel, Node, OperatorType, ProcessTree},
};

/// Error when translating a model into a [`PetriNet`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// A loop does not have exactly two children (do and redo)
    InvalidLoop {
        /// Number of children of the loop
        children: usize,
    },
    /// An operator or partial order without children
    EmptyOperator,
    /// A partial order whose order is not a strict partial order over its children
    InvalidPartialOrder(POWLError),
}

impl std::fmt::Display for ConversionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversionError::InvalidLoop { children } => {
                write!(f, "Loop must have exactly 2 children, found {}", children)
            }
            ConversionError::EmptyOperator => write!(f, "Operator without children"),
            ConversionError::InvalidPartialOrder(e) => write!(f, "Invalid partial order: {}", e),
        }
    }
}

impl std::error::Error for ConversionError {}

impl From<POWLError> for ConversionError {
    fn from(e: POWLError) -> Self {
        ConversionError::InvalidPartialOrder(e)
    }
}

/// A Petri net with its initial and final marking
pub type AcceptingPetriNet = (PetriNet, Marking, Marking);

fn add_silent(net: &mut PetriNet, from: PlaceID, to: PlaceID) -> TransitionID {
    let t = net.add_transition(None, None);
    net.add_arc(ArcType::place_to_transition(from, t), None);
    net.add_arc(ArcType::transition_to_place(t, to), None);
    t
}

fn add_labelled(net: &mut PetriNet, label: Option<&str>, source: PlaceID, sink: PlaceID) {
    let t = net.add_transition(label.map(str::to_string), None);
    net.add_arc(ArcType::place_to_transition(source, t), None);
    net.add_arc(ArcType::transition_to_place(t, sink), None);
}

/// Loop gadget: enter, run `do_part`, then either leave or run `redo_part` and repeat
fn add_loop<F>(
    net: &mut PetriNet,
    source: PlaceID,
    sink: PlaceID,
    mut translate_child: F,
) -> Result<(), ConversionError>
where
    F: FnMut(&mut PetriNet, usize, PlaceID, PlaceID) -> Result<(), ConversionError>,
{
    let join = net.add_place(None);
    let split = net.add_place(None);
    add_silent(net, source, join);
    add_silent(net, split, sink);
    translate_child(net, 0, join, split)?;
    translate_child(net, 1, split, join)
}

/// Concurrency gadget: a silent split and join around one fresh source/sink pair per child
fn add_concurrency<F>(
    net: &mut PetriNet,
    source: PlaceID,
    sink: PlaceID,
    number_of_children: usize,
    mut translate_child: F,
) -> Result<(), ConversionError>
where
    F: FnMut(&mut PetriNet, usize, PlaceID, PlaceID) -> Result<(), ConversionError>,
{
    let split = net.add_transition(None, None);
    let join = net.add_transition(None, None);
    net.add_arc(ArcType::place_to_transition(source, split), None);
    net.add_arc(ArcType::transition_to_place(join, sink), None);
    for i in 0..number_of_children {
        let child_source = net.add_place(None);
        let child_sink = net.add_place(None);
        net.add_arc(ArcType::transition_to_place(split, child_source), None);
        net.add_arc(ArcType::place_to_transition(child_sink, join), None);
        translate_child(net, i, child_source, child_sink)?;
    }
    Ok(())
}

fn tree_node_to_net(
    node: &Node,
    net: &mut PetriNet,
    source: PlaceID,
    sink: PlaceID,
) -> Result<(), ConversionError> {
    match node {
        Node::Leaf(leaf) => {
            let label = match &leaf.activity_label {
                LeafLabel::Activity(label) => Some(label.as_str()),
                LeafLabel::Tau => None,
            };
            add_labelled(net, label, source, sink);
            Ok(())
        }
        Node::Operator(op) => {
            let children = &op.children;
            if children.is_empty() {
                return Err(ConversionError::EmptyOperator);
            }
            match op.operator_type {
                OperatorType::Sequence => {
                    let mut current = source;
                    for (i, child) in children.iter().enumerate() {
                        let next = if i + 1 == children.len() {
                            sink
                        } else {
                            net.add_place(None)
                        };
                        tree_node_to_net(child, net, current, next)?;
                        current = next;
                    }
                    Ok(())
                }
                OperatorType::ExclusiveChoice => children
                    .iter()
                    .try_for_each(|child| tree_node_to_net(child, net, source, sink)),
                OperatorType::Concurrency => {
                    add_concurrency(net, source, sink, children.len(), |net, i, s, t| {
                        tree_node_to_net(&children[i], net, s, t)
                    })
                }
                OperatorType::Loop => {
                    if children.len() != 2 {
                        return Err(ConversionError::InvalidLoop {
                            children: children.len(),
                        });
                    }
                    add_loop(net, source, sink, |net, i, s, t| {
                        tree_node_to_net(&children[i], net, s, t)
                    })
                }
            }
        }
    }
}

fn powl_to_net(
    model: &POWL,
    net: &mut PetriNet,
    source: PlaceID,
    sink: PlaceID,
) -> Result<(), ConversionError> {
    match model {
        POWL::Transition { label } => {
            add_labelled(net, label.as_deref(), source, sink);
            Ok(())
        }
        POWL::FrequentTransition {
            label,
            min_frequency,
            max_frequency,
        } => {
            let activity = POWL::activity(label.as_str());
            let expanded = match (*min_frequency, *max_frequency) {
                (0, Some(_)) => POWL::exclusive_choice(vec![activity, POWL::silent()]),
                (0, None) => POWL::looping(POWL::silent(), activity),
                (_, None) => POWL::looping(activity, POWL::silent()),
                (_, Some(_)) => activity,
            };
            powl_to_net(&expanded, net, source, sink)
        }
        POWL::Operator { operator, children } => {
            if children.is_empty() {
                return Err(ConversionError::EmptyOperator);
            }
            match operator {
                POWLOperator::ExclusiveChoice => children
                    .iter()
                    .try_for_each(|child| powl_to_net(child, net, source, sink)),
                POWLOperator::Loop => {
                    if children.len() != 2 {
                        return Err(ConversionError::InvalidLoop {
                            children: children.len(),
                        });
                    }
                    add_loop(net, source, sink, |net, i, s, t| {
                        powl_to_net(&children[i], net, s, t)
                    })
                }
            }
        }
        POWL::StrictPartialOrder { children, order } => {
            if children.is_empty() {
                return Err(ConversionError::EmptyOperator);
            }
            if order.size() != children.len() {
                return Err(POWLError::OrderSizeMismatch {
                    children: children.len(),
                    order: order.size(),
                }
                .into());
            }
            if !order.transitive_closure().is_irreflexive() {
                return Err(POWLError::NotIrreflexive.into());
            }
            partial_order_to_net(children, order, net, source, sink)
        }
    }
}

///
/// Partial order gadget
///
/// Every child is wrapped in a silent start and end transition. The start transition of a
/// child waits for the end transitions of all its direct predecessors (w.r.t. the transitive
/// reduction of the order).
///
fn partial_order_to_net(
    children: &[POWL],
    order: &BinaryRelation,
    net: &mut PetriNet,
    source: PlaceID,
    sink: PlaceID,
) -> Result<(), ConversionError> {
    let split = net.add_transition(None, None);
    let join = net.add_transition(None, None);
    net.add_arc(ArcType::place_to_transition(source, split), None);
    net.add_arc(ArcType::transition_to_place(join, sink), None);

    let mut starts: Vec<TransitionID> = Vec::with_capacity(children.len());
    let mut ends: Vec<TransitionID> = Vec::with_capacity(children.len());
    for child in children {
        let ready = net.add_place(None);
        let child_source = net.add_place(None);
        let child_sink = net.add_place(None);
        let done = net.add_place(None);
        net.add_arc(ArcType::transition_to_place(split, ready), None);
        starts.push(add_silent(net, ready, child_source));
        powl_to_net(child, net, child_source, child_sink)?;
        ends.push(add_silent(net, child_sink, done));
        net.add_arc(ArcType::place_to_transition(done, join), None);
    }
    for (i, j) in order.transitive_reduction().edges() {
        let between = net.add_place(None);
        net.add_arc(ArcType::transition_to_place(ends[i], between), None);
        net.add_arc(ArcType::place_to_transition(between, starts[j]), None);
    }
    Ok(())
}

fn finish(mut net: PetriNet, source: PlaceID, sink: PlaceID) -> AcceptingPetriNet {
    let initial_marking = Marking::from([(source, 1)]);
    let final_marking = Marking::from([(sink, 1)]);
    net.initial_marking = Some(initial_marking);
    net.final_markings = Some(vec![final_marking]);
    let reductions = reduce_silent_transitions(&mut net);
    debug!(
        "Petri net with {} places and {} transitions ({} reductions applied)",
        net.places.len(),
        net.transitions.len(),
        reductions
    );
    // fused places may have replaced the sink
    let initial_marking = net.initial_marking.clone().unwrap_or_default();
    let final_marking = net
        .final_markings
        .as_ref()
        .and_then(|ms| ms.first().cloned())
        .unwrap_or_default();
    (net, initial_marking, final_marking)
}

///
/// Translate a [`ProcessTree`] into a sound workflow net
///
/// Returns the net with its initial and final marking (which are also stored in the net).
///
pub fn process_tree_to_petri_net(tree: &ProcessTree) -> Result<AcceptingPetriNet, ConversionError> {
    let mut net = PetriNet::new();
    let source = net.add_place(None);
    let sink = net.add_place(None);
    tree_node_to_net(&tree.root, &mut net, source, sink)?;
    Ok(finish(net, source, sink))
}

///
/// Translate a [`POWL`] model into a sound workflow net
///
/// Frequent transitions are expanded into the equivalent choice or loop.
///
pub fn powl_to_petri_net(model: &POWL) -> Result<AcceptingPetriNet, ConversionError> {
    let mut net = PetriNet::new();
    let source = net.add_place(None);
    let sink = net.add_place(None);
    powl_to_net(model, &mut net, source, sink)?;
    Ok(finish(net, source, sink))
}

/// Translate a discovered [`Model`] into a sound workflow net
pub fn model_to_petri_net(model: &Model) -> Result<AcceptingPetriNet, ConversionError> {
    match model {
        Model::ProcessTree(tree) => process_tree_to_petri_net(tree),
        Model::POWL(powl) => powl_to_petri_net(powl),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(label: &str) -> Node {
        Node::new_leaf(Some(label.to_string()))
    }

    fn op(operator_type: OperatorType, children: Vec<Node>) -> Node {
        Node::operator_with_children(operator_type, children)
    }

    #[test]
    fn tree_gadgets() {
        // ->( 'a', X( 'b', tau ), +( 'c', *( 'd', 'e' ) ) )
        let tree = ProcessTree::new(op(
            OperatorType::Sequence,
            vec![
                leaf("a"),
                op(OperatorType::ExclusiveChoice, vec![leaf("b"), Node::tau()]),
                op(
                    OperatorType::Concurrency,
                    vec![leaf("c"), op(OperatorType::Loop, vec![leaf("d"), leaf("e")])],
                ),
            ],
        ));
        let (net, initial, final_marking) = process_tree_to_petri_net(&tree).unwrap();
        assert_eq!(net.initial_marking, Some(initial));
        assert_eq!(net.final_markings, Some(vec![final_marking]));
        assert!(net.is_workflow_net());
        assert!(net.is_sound());
        assert!(net.accepts_trace(&["a", "b", "c", "d"]));
        assert!(net.accepts_trace(&["a", "d", "e", "d", "c"]));
        assert!(net.accepts_trace(&["a", "d", "c", "e", "d"]));
        assert!(!net.accepts_trace(&["a", "c"]));
        assert!(!net.accepts_trace(&["a", "b", "c", "d", "e"]));
    }

    #[test]
    fn single_tau() {
        let (net, _, _) = process_tree_to_petri_net(&ProcessTree::new(Node::tau())).unwrap();
        assert!(net.accepts_trace::<&str>(&[]));
        assert!(net.is_sound());
    }

    #[test]
    fn invalid_loop() {
        let tree = ProcessTree::new(op(OperatorType::Loop, vec![leaf("a")]));
        assert_eq!(
            process_tree_to_petri_net(&tree).unwrap_err(),
            ConversionError::InvalidLoop { children: 1 }
        );
    }

    #[test]
    fn partial_order_gadget() {
        let mut order = BinaryRelation::new(4);
        for (a, b) in [(0, 1), (0, 2), (1, 3), (2, 3)] {
            order.add_edge(a, b);
        }
        let model = POWL::partial_order(
            vec![
                POWL::activity("a"),
                POWL::activity("b"),
                POWL::frequent("c", 0, Some(1)),
                POWL::activity("d"),
            ],
            order,
        )
        .unwrap();
        let (net, _, _) = powl_to_petri_net(&model).unwrap();
        assert!(net.is_workflow_net());
        assert!(net.is_sound());
        assert!(net.accepts_trace(&["a", "b", "c", "d"]));
        assert!(net.accepts_trace(&["a", "c", "b", "d"]));
        assert!(net.accepts_trace(&["a", "b", "d"]));
        assert!(!net.accepts_trace(&["b", "a", "c", "d"]));
        assert!(!net.accepts_trace(&["a", "b", "c"]));
    }

    #[test]
    fn frequent_transitions() {
        let model = POWL::sequence(vec![
            POWL::frequent("a", 1, None),
            POWL::frequent("b", 0, None),
        ]);
        let (net, _, _) = powl_to_petri_net(&model).unwrap();
        assert!(net.is_sound());
        assert!(net.accepts_trace(&["a"]));
        assert!(net.accepts_trace(&["a", "a", "b", "b", "b"]));
        assert!(!net.accepts_trace(&["b"]));
    }
}
