use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt::Display};
use uuid::Uuid;

///
/// Leaf in a process tree
///
#[derive(Debug, Clone, Serialize, Deserialize, Hash, Eq, PartialEq)]
pub enum LeafLabel {
    /// Non-silent activity leaf
    Activity(String),
    /// Silent activity leaf
    Tau,
}

///
/// Node in a process tree
///
/// Equality is structural: node identifiers are ignored.
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Node {
    /// Operator node of a process tree
    Operator(Operator),
    /// Leaf node of a process tree
    Leaf(Leaf),
}

impl Node {
    ///
    /// Returns the identifier of a node in a process tree
    ///
    pub fn get_uuid(&self) -> &Uuid {
        match self {
            Node::Operator(op) => &op.uuid,
            Node::Leaf(leaf) => &leaf.uuid,
        }
    }

    ///
    /// Creates a new [`Node::Operator`] with the given [`OperatorType`] and children
    ///
    pub fn operator_with_children(op_type: OperatorType, children: Vec<Node>) -> Self {
        let mut op = Operator::new(op_type);
        op.children = children;
        Node::Operator(op)
    }

    ///
    /// Creates a new non-silent or silent leaf [`Node`]
    ///
    pub fn new_leaf(leaf_label: Option<String>) -> Self {
        Node::Leaf(Leaf::new(leaf_label))
    }

    /// Creates a new silent leaf
    pub fn tau() -> Self {
        Node::new_leaf(None)
    }

    /// `true` if the node is a silent leaf
    pub fn is_tau(&self) -> bool {
        matches!(
            self,
            Node::Leaf(Leaf {
                activity_label: LeafLabel::Tau,
                ..
            })
        )
    }

    /// The [`OperatorType`] of an operator node (`None` for leaves)
    pub fn operator_type(&self) -> Option<OperatorType> {
        match self {
            Node::Operator(op) => Some(op.operator_type),
            Node::Leaf(_) => None,
        }
    }

    ///
    /// Returns `true` if a loop operator has exactly two children (do and redo) or if all
    /// other operators have at least one child.
    ///
    pub fn check_children_valid(&self) -> bool {
        match self {
            Node::Operator(op) => match op.operator_type {
                OperatorType::Loop => op.children.len() == 2,
                _ => !op.children.is_empty(),
            },
            Node::Leaf(_) => true,
        }
    }

    /// Number of leaves carrying an activity label in the subtree
    pub fn count_activity_leaves(&self) -> usize {
        match self {
            Node::Operator(op) => op.children.iter().map(Node::count_activity_leaves).sum(),
            Node::Leaf(leaf) => match leaf.activity_label {
                LeafLabel::Activity(_) => 1,
                LeafLabel::Tau => 0,
            },
        }
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Leaf(leaf) => write!(f, "{}", leaf.activity_label),
            Node::Operator(op) => {
                write!(f, "{}( ", op.operator_type)?;
                for (i, child) in op.children.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", child)?;
                }
                write!(f, " )")
            }
        }
    }
}

impl Display for LeafLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeafLabel::Activity(label) => write!(f, "'{}'", label),
            LeafLabel::Tau => write!(f, "tau"),
        }
    }
}

///
/// Operator type enum for [`Operator`]
///
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OperatorType {
    /// Sequence operator
    Sequence,
    /// Exclusive choice operator
    ExclusiveChoice,
    /// Concurrency operator
    Concurrency,
    /// Binary loop operator: `Loop(do, redo)`
    Loop,
}

impl Display for OperatorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            OperatorType::Sequence => "->",
            OperatorType::ExclusiveChoice => "X",
            OperatorType::Concurrency => "+",
            OperatorType::Loop => "*",
        };
        write!(f, "{}", symbol)
    }
}

///
/// Process tree struct that contains [`Node`] as root
///
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessTree {
    /// The root of the process tree
    pub root: Node,
}

impl Display for ProcessTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.root.fmt(f)
    }
}

impl ProcessTree {
    ///
    /// Initializes the process tree with the given node as root
    ///
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    ///
    /// Returns `true` if all nodes have the right number of children, if all operators have
    /// eventually descendants that are leaves, and if no node occurs twice in the tree.
    ///
    pub fn is_valid(&self) -> bool {
        let mut seen: HashSet<Uuid> = HashSet::new();
        let mut stack: Vec<&Node> = vec![&self.root];
        while let Some(node) = stack.pop() {
            if !seen.insert(*node.get_uuid()) || !node.check_children_valid() {
                return false;
            }
            if let Node::Operator(op) = node {
                stack.extend(op.children.iter());
            }
        }
        true
    }

    ///
    /// Returns all descendant [`Leaf`] in depth-first, left-to-right order
    ///
    pub fn find_all_leaves(&self) -> Vec<&Leaf> {
        let mut result: Vec<&Leaf> = Vec::new();
        let mut stack: Vec<&Node> = vec![&self.root];
        while let Some(node) = stack.pop() {
            match node {
                Node::Operator(op) => stack.extend(op.children.iter().rev()),
                Node::Leaf(leaf) => result.push(leaf),
            }
        }
        result
    }

    ///
    /// Returns all `Uuid` of all [`Node`]s in the tree
    ///
    pub fn find_all_node_uuids(&self) -> Vec<&Uuid> {
        let mut result: Vec<&Uuid> = vec![self.root.get_uuid()];
        if let Node::Operator(op) = &self.root {
            result.extend(op.find_all_descendants_uuids());
        }
        result
    }

    ///
    /// Returns the parent [`Operator`] of the node with the given `Uuid`
    ///
    /// `None` for the root or for identifiers not occurring in the tree.
    ///
    pub fn parent_of(&self, uuid: &Uuid) -> Option<&Operator> {
        let mut stack: Vec<&Node> = vec![&self.root];
        while let Some(node) = stack.pop() {
            if let Node::Operator(op) = node {
                if op.children.iter().any(|c| c.get_uuid() == uuid) {
                    return Some(op);
                }
                stack.extend(op.children.iter());
            }
        }
        None
    }
}

///
/// An operator node in a process tree
///
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operator {
    /// The node ID
    pub uuid: Uuid,
    /// The [`OperatorType`] of the tree itself
    pub operator_type: OperatorType,
    /// The children nodes of the operator node
    pub children: Vec<Node>,
}

impl PartialEq for Operator {
    fn eq(&self, other: &Self) -> bool {
        self.operator_type == other.operator_type && self.children == other.children
    }
}

impl Eq for Operator {}

impl Operator {
    ///
    /// A constructor for the struct that initializes with the given [`OperatorType`] and
    /// otherwise a fresh [`Uuid`] and an empty list of children
    ///
    pub fn new(operator_type: OperatorType) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            operator_type,
            children: Vec::new(),
        }
    }

    ///
    /// Returns all descendant [`Node`]'s Uuids
    ///
    pub fn find_all_descendants_uuids(&self) -> Vec<&Uuid> {
        let mut result: Vec<&Uuid> = Vec::new();

        self.children.iter().for_each(|child| {
            result.push(child.get_uuid());
            if let Node::Operator(op) = child {
                result.extend(op.find_all_descendants_uuids());
            }
        });

        result
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
///
/// A leaf in a process tree
///
pub struct Leaf {
    /// The identifier of the leaf
    pub uuid: Uuid,
    /// The silent or non-silent activity label [`LeafLabel`]
    pub activity_label: LeafLabel,
}

impl PartialEq for Leaf {
    fn eq(&self, other: &Self) -> bool {
        self.activity_label == other.activity_label
    }
}

impl Eq for Leaf {}

impl Leaf {
    ///
    /// Creates a new [`Leaf`] either by using a given label or making it silent if a label
    /// is missing
    ///
    pub fn new(leaf_label: Option<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            activity_label: match leaf_label {
                Some(label) => LeafLabel::Activity(label),
                None => LeafLabel::Tau,
            },
        }
    }
}
