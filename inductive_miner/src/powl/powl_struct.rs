use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::binary_relation::BinaryRelation;

///
/// Error when constructing an invalid [`POWL`] node
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum POWLError {
    /// The order of a partial order node relates a child to itself (directly or transitively)
    NotIrreflexive,
    /// The order refers to more nodes than there are children
    OrderSizeMismatch {
        /// Number of children
        children: usize,
        /// Number of nodes in the order
        order: usize,
    },
}

impl std::fmt::Display for POWLError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            POWLError::NotIrreflexive => {
                write!(f, "Order of partial order node is not irreflexive")
            }
            POWLError::OrderSizeMismatch { children, order } => write!(
                f,
                "Partial order has {} children but its order has {} nodes",
                children, order
            ),
        }
    }
}

impl std::error::Error for POWLError {}

///
/// Operator types of [`POWL::Operator`] nodes
///
/// Sequence and concurrency are expressed through [`POWL::StrictPartialOrder`].
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum POWLOperator {
    /// Exclusive choice between the children
    ExclusiveChoice,
    /// Binary loop `Loop(do, redo)`
    Loop,
}

///
/// Partially Ordered Workflow Language (POWL) model
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum POWL {
    /// Activity (or silent transition if `label` is `None`)
    Transition {
        /// Activity label
        label: Option<String>,
    },
    /// Activity executed between `min_frequency` and `max_frequency` times in a row
    FrequentTransition {
        /// Activity label
        label: String,
        /// 0 (skippable) or 1
        min_frequency: u64,
        /// 1, or `None` for arbitrarily many repetitions
        max_frequency: Option<u64>,
    },
    /// Exclusive choice or loop
    Operator {
        /// Operator type
        operator: POWLOperator,
        /// Children (exactly two for loops)
        children: Vec<POWL>,
    },
    /// Children executed according to a strict partial order
    StrictPartialOrder {
        /// Children
        children: Vec<POWL>,
        /// Transitively closed, irreflexive order over the child indices
        order: BinaryRelation,
    },
}

impl POWL {
    /// Silent transition
    pub fn silent() -> Self {
        POWL::Transition { label: None }
    }

    /// Labeled transition
    pub fn activity<S: Into<String>>(label: S) -> Self {
        POWL::Transition {
            label: Some(label.into()),
        }
    }

    /// Frequent transition (`max_frequency == None` meaning unbounded)
    pub fn frequent<S: Into<String>>(
        label: S,
        min_frequency: u64,
        max_frequency: Option<u64>,
    ) -> Self {
        POWL::FrequentTransition {
            label: label.into(),
            min_frequency,
            max_frequency,
        }
    }

    /// Exclusive choice between `children`
    pub fn exclusive_choice(children: Vec<POWL>) -> Self {
        POWL::Operator {
            operator: POWLOperator::ExclusiveChoice,
            children,
        }
    }

    /// `Loop(do, redo)`
    pub fn looping(do_part: POWL, redo_part: POWL) -> Self {
        POWL::Operator {
            operator: POWLOperator::Loop,
            children: vec![do_part, redo_part],
        }
    }

    ///
    /// Partial order node over `children`
    ///
    /// The order is transitively closed; orders that are not irreflexive after closing
    /// (i.e., cyclic ones) are rejected.
    ///
    pub fn partial_order(children: Vec<POWL>, order: BinaryRelation) -> Result<Self, POWLError> {
        if order.size() != children.len() {
            return Err(POWLError::OrderSizeMismatch {
                children: children.len(),
                order: order.size(),
            });
        }
        let order = order.transitive_closure();
        if !order.is_irreflexive() {
            return Err(POWLError::NotIrreflexive);
        }
        Ok(POWL::StrictPartialOrder { children, order })
    }

    /// Sequence: partial order with the total order over `children`
    pub fn sequence(children: Vec<POWL>) -> Self {
        let order = BinaryRelation::total_order(children.len());
        POWL::StrictPartialOrder { children, order }
    }

    /// Concurrency: partial order without any ordering constraints
    pub fn concurrency(children: Vec<POWL>) -> Self {
        let order = BinaryRelation::new(children.len());
        POWL::StrictPartialOrder { children, order }
    }

    /// `true` for silent transitions
    pub fn is_silent(&self) -> bool {
        matches!(self, POWL::Transition { label: None })
    }

    /// Children of operator and partial order nodes (empty for transitions)
    pub fn children(&self) -> &[POWL] {
        match self {
            POWL::Operator { children, .. } | POWL::StrictPartialOrder { children, .. } => {
                children
            }
            _ => &[],
        }
    }

    /// Number of (frequent) transitions carrying an activity label
    pub fn count_activity_leaves(&self) -> usize {
        match self {
            POWL::Transition { label } => usize::from(label.is_some()),
            POWL::FrequentTransition { .. } => 1,
            _ => self.children().iter().map(POWL::count_activity_leaves).sum(),
        }
    }

    ///
    /// Checks the structural constraints of the whole model
    ///
    /// Loops have exactly two children, choices and partial orders at least one, every
    /// partial order relation matches its children and is a strict partial order, and
    /// frequent transitions carry sensible bounds.
    ///
    pub fn is_valid(&self) -> bool {
        match self {
            POWL::Transition { .. } => true,
            POWL::FrequentTransition {
                min_frequency,
                max_frequency,
                ..
            } => *min_frequency <= 1 && max_frequency.map_or(true, |m| m >= 1),
            POWL::Operator { operator, children } => {
                let arity_ok = match operator {
                    POWLOperator::Loop => children.len() == 2,
                    POWLOperator::ExclusiveChoice => !children.is_empty(),
                };
                arity_ok && children.iter().all(POWL::is_valid)
            }
            POWL::StrictPartialOrder { children, order } => {
                !children.is_empty()
                    && order.size() == children.len()
                    && order.is_strict_partial_order()
                    && children.iter().all(POWL::is_valid)
            }
        }
    }
}

impl Display for POWL {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            POWL::Transition { label: Some(label) } => write!(f, "'{}'", label),
            POWL::Transition { label: None } => write!(f, "tau"),
            POWL::FrequentTransition {
                label,
                min_frequency,
                max_frequency,
            } => match max_frequency {
                Some(max) => write!(f, "'{}'[{},{}]", label, min_frequency, max),
                None => write!(f, "'{}'[{},*]", label, min_frequency),
            },
            POWL::Operator { operator, children } => {
                let symbol = match operator {
                    POWLOperator::ExclusiveChoice => "X",
                    POWLOperator::Loop => "*",
                };
                write!(f, "{}( ", symbol)?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, " )")
            }
            POWL::StrictPartialOrder { children, order } => {
                write!(f, "PO=(nodes={{")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, "}}, order={{")?;
                for (i, (a, b)) in order.transitive_reduction().edges().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}-->{}", children[a], children[b])?;
                }
                write!(f, "}})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_partial_order() {
        let mut order = BinaryRelation::new(4);
        for (a, b) in [(0, 1), (0, 2), (1, 3), (2, 3)] {
            order.add_edge(a, b);
        }
        let model = POWL::partial_order(
            vec![
                POWL::activity("a"),
                POWL::activity("b"),
                POWL::activity("c"),
                POWL::activity("d"),
            ],
            order,
        )
        .unwrap();
        assert!(model.is_valid());
        assert_eq!(
            model.to_string(),
            "PO=(nodes={'a', 'b', 'c', 'd'}, order={'a'-->'b', 'a'-->'c', 'b'-->'d', 'c'-->'d'})"
        );
    }

    #[test]
    fn display_operators_and_frequent_transitions() {
        let model = POWL::exclusive_choice(vec![
            POWL::looping(POWL::activity("a"), POWL::silent()),
            POWL::frequent("b", 0, Some(1)),
            POWL::frequent("c", 1, None),
        ]);
        assert_eq!(model.to_string(), "X( *( 'a', tau ), 'b'[0,1], 'c'[1,*] )");
        assert_eq!(model.count_activity_leaves(), 3);
    }

    #[test]
    fn cyclic_order_is_rejected() {
        let mut order = BinaryRelation::new(2);
        order.add_edge(0, 1);
        order.add_edge(1, 0);
        assert_eq!(
            POWL::partial_order(vec![POWL::activity("a"), POWL::activity("b")], order),
            Err(POWLError::NotIrreflexive)
        );
        assert!(matches!(
            POWL::partial_order(vec![POWL::activity("a")], BinaryRelation::new(3)),
            Err(POWLError::OrderSizeMismatch { .. })
        ));
    }

    #[test]
    fn sequence_is_total_order() {
        let model = POWL::sequence(vec![POWL::activity("a"), POWL::activity("b")]);
        assert!(model.is_valid());
        assert_eq!(model.to_string(), "PO=(nodes={'a', 'b'}, order={'a'-->'b'})");
        let par = POWL::concurrency(vec![POWL::activity("a"), POWL::activity("b")]);
        assert_eq!(par.to_string(), "PO=(nodes={'a', 'b'}, order={})");
    }
}
