use super::process_tree_struct::{Node, Operator, OperatorType, ProcessTree};

///
/// Simplify a [`ProcessTree`] without changing its language
///
/// Applied bottom-up until nothing changes:
/// - nested sequence, exclusive choice and concurrency nodes are merged into a parent of the
///   same type
/// - repeated silent children of an exclusive choice are merged
/// - `X(tau, *(tau, x))` becomes `*(tau, x)`
/// - silent children of sequence and concurrency nodes are dropped
/// - sequence, exclusive choice and concurrency nodes with a single child are replaced by it
///
pub fn simplify_process_tree(tree: ProcessTree) -> ProcessTree {
    ProcessTree::new(simplify_node(tree.root))
}

/// Simplify a single [`Node`] (see [`simplify_process_tree`])
pub fn simplify_node(node: Node) -> Node {
    let mut current = node;
    loop {
        let next = simplify_pass(current.clone());
        if next == current {
            return next;
        }
        current = next;
    }
}

fn simplify_pass(node: Node) -> Node {
    let Operator {
        uuid,
        operator_type,
        children,
    } = match node {
        Node::Operator(op) => op,
        leaf => return leaf,
    };
    let children: Vec<Node> = children.into_iter().map(simplify_pass).collect();

    if operator_type == OperatorType::Loop {
        return Node::Operator(Operator {
            uuid,
            operator_type,
            children,
        });
    }

    let mut flattened: Vec<Node> = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Node::Operator(inner) if inner.operator_type == operator_type => {
                flattened.extend(inner.children)
            }
            other => flattened.push(other),
        }
    }

    let mut children = match operator_type {
        OperatorType::ExclusiveChoice => {
            let mut seen_tau = false;
            flattened.retain(|c| {
                if c.is_tau() {
                    let keep = !seen_tau;
                    seen_tau = true;
                    keep
                } else {
                    true
                }
            });
            flattened
        }
        _ => {
            if flattened.iter().any(|c| !c.is_tau()) {
                flattened.retain(|c| !c.is_tau());
            } else {
                flattened.truncate(1);
            }
            flattened
        }
    };

    if operator_type == OperatorType::ExclusiveChoice && children.len() == 2 {
        let tau_pos = children.iter().position(Node::is_tau);
        if let Some(tau_pos) = tau_pos {
            let other = &children[1 - tau_pos];
            if let Node::Operator(lp) = other {
                if lp.operator_type == OperatorType::Loop
                    && lp.children.first().is_some_and(Node::is_tau)
                {
                    return children.swap_remove(1 - tau_pos);
                }
            }
        }
    }

    if children.len() == 1 {
        return children.swap_remove(0);
    }

    Node::Operator(Operator {
        uuid,
        operator_type,
        children,
    })
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
    fn flatten_nested_operators() {
        let tree = op(
            OperatorType::Sequence,
            vec![
                leaf("a"),
                op(OperatorType::Sequence, vec![leaf("b"), leaf("c")]),
                op(
                    OperatorType::ExclusiveChoice,
                    vec![
                        leaf("d"),
                        op(OperatorType::ExclusiveChoice, vec![leaf("e"), leaf("f")]),
                    ],
                ),
            ],
        );
        assert_eq!(
            simplify_node(tree).to_string(),
            "->( 'a', 'b', 'c', X( 'd', 'e', 'f' ) )"
        );
    }

    #[test]
    fn tau_handling() {
        let tree = op(
            OperatorType::Concurrency,
            vec![
                Node::tau(),
                op(OperatorType::Sequence, vec![leaf("a"), Node::tau()]),
                op(
                    OperatorType::ExclusiveChoice,
                    vec![Node::tau(), Node::tau(), leaf("b")],
                ),
            ],
        );
        assert_eq!(simplify_node(tree).to_string(), "+( 'a', X( tau, 'b' ) )");

        let all_silent = op(OperatorType::Sequence, vec![Node::tau(), Node::tau()]);
        assert!(simplify_node(all_silent).is_tau());
    }

    #[test]
    fn skippable_tau_loop_collapses() {
        let tree = op(
            OperatorType::ExclusiveChoice,
            vec![
                op(OperatorType::Loop, vec![Node::tau(), leaf("a")]),
                Node::tau(),
            ],
        );
        assert_eq!(simplify_node(tree).to_string(), "*( tau, 'a' )");

        let kept = op(
            OperatorType::ExclusiveChoice,
            vec![Node::tau(), op(OperatorType::Loop, vec![leaf("a"), Node::tau()])],
        );
        assert_eq!(simplify_node(kept).to_string(), "X( tau, *( 'a', tau ) )");
    }

    #[test]
    fn idempotent() {
        let tree = ProcessTree::new(op(
            OperatorType::Sequence,
            vec![
                op(OperatorType::Sequence, vec![leaf("a")]),
                op(
                    OperatorType::Loop,
                    vec![op(OperatorType::ExclusiveChoice, vec![leaf("b")]), Node::tau()],
                ),
            ],
        ));
        let once = simplify_process_tree(tree);
        assert_eq!(once.to_string(), "->( 'a', *( 'b', tau ) )");
        assert_eq!(simplify_process_tree(once.clone()), once);
        assert!(once.is_valid());
    }
}
