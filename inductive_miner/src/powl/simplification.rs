use super::{
    binary_relation::BinaryRelation,
    powl_struct::{POWLOperator, POWL},
};

///
/// Simplify a [`POWL`] model without changing its language
///
/// Applied bottom-up until nothing changes:
/// - nested exclusive choices are merged, repeated silent choices removed
/// - `X(tau, a)` becomes `a[0,1]`, `*(a, tau)` becomes `a[1,*]` and `*(tau, a)` becomes `a[0,*]`
/// - `X(tau, a[1,*])` becomes `a[0,*]` and `X(tau, *(tau, x))` becomes `*(tau, x)`
/// - partial order children that are partial orders themselves are inlined
/// - silent children of partial orders are dropped
/// - choices and partial orders with a single child are replaced by it
///
pub fn simplify_powl(model: POWL) -> POWL {
    let mut current = model;
    loop {
        let next = simplify_pass(current.clone());
        if next == current {
            return next;
        }
        current = next;
    }
}

fn simplify_pass(model: POWL) -> POWL {
    match model {
        POWL::Operator {
            operator: POWLOperator::Loop,
            children,
        } => {
            let mut children: Vec<POWL> = children.into_iter().map(simplify_pass).collect();
            if children.len() != 2 {
                return POWL::Operator {
                    operator: POWLOperator::Loop,
                    children,
                };
            }
            let redo = children.swap_remove(1);
            let do_part = children.swap_remove(0);
            simplify_loop(do_part, redo)
        }
        POWL::Operator {
            operator: POWLOperator::ExclusiveChoice,
            children,
        } => simplify_choice(children.into_iter().map(simplify_pass).collect()),
        POWL::StrictPartialOrder { children, order } => {
            simplify_partial_order(children.into_iter().map(simplify_pass).collect(), order)
        }
        leaf => leaf,
    }
}

fn simplify_loop(do_part: POWL, redo: POWL) -> POWL {
    match (do_part, redo) {
        (POWL::Transition { label: Some(label) }, POWL::Transition { label: None }) => {
            POWL::frequent(label, 1, None)
        }
        (POWL::Transition { label: None }, POWL::Transition { label: Some(label) }) => {
            POWL::frequent(label, 0, None)
        }
        (do_part, redo) => POWL::looping(do_part, redo),
    }
}

fn simplify_choice(children: Vec<POWL>) -> POWL {
    let mut flattened: Vec<POWL> = Vec::with_capacity(children.len());
    let mut seen_silent = false;
    for child in children {
        match child {
            POWL::Operator {
                operator: POWLOperator::ExclusiveChoice,
                children: inner,
            } => flattened.extend(inner),
            silent if silent.is_silent() => {
                if !seen_silent {
                    flattened.push(silent);
                }
                seen_silent = true;
            }
            other => flattened.push(other),
        }
    }

    if flattened.len() == 2 {
        if let Some(silent_pos) = flattened.iter().position(POWL::is_silent) {
            let other = flattened.swap_remove(1 - silent_pos);
            return match other {
                POWL::Transition { label: Some(label) } => POWL::frequent(label, 0, Some(1)),
                POWL::FrequentTransition {
                    label,
                    max_frequency,
                    ..
                } => POWL::frequent(label, 0, max_frequency),
                POWL::Operator {
                    operator: POWLOperator::Loop,
                    children,
                } if children.first().is_some_and(POWL::is_silent) => POWL::Operator {
                    operator: POWLOperator::Loop,
                    children,
                },
                other => POWL::exclusive_choice(vec![POWL::silent(), other]),
            };
        }
    }

    if flattened.len() == 1 {
        return flattened.swap_remove(0);
    }
    POWL::exclusive_choice(flattened)
}

fn simplify_partial_order(children: Vec<POWL>, order: BinaryRelation) -> POWL {
    // inline nested partial orders
    let mut groups: Vec<Vec<usize>> = Vec::with_capacity(children.len());
    let mut inner_edges: Vec<(usize, usize)> = Vec::new();
    let mut nodes: Vec<POWL> = Vec::with_capacity(children.len());
    for child in children {
        match child {
            POWL::StrictPartialOrder {
                children: inner,
                order: inner_order,
            } => {
                let offset = nodes.len();
                groups.push((offset..offset + inner.len()).collect());
                inner_edges.extend(inner_order.edges().map(|(a, b)| (a + offset, b + offset)));
                nodes.extend(inner);
            }
            other => {
                groups.push(vec![nodes.len()]);
                nodes.push(other);
            }
        }
    }
    let mut flat_order = BinaryRelation::new(nodes.len());
    for (i, j) in order.edges() {
        for a in &groups[i] {
            for b in &groups[j] {
                flat_order.add_edge(*a, *b);
            }
        }
    }
    for (a, b) in inner_edges {
        flat_order.add_edge(a, b);
    }

    // drop silent nodes
    let kept: Vec<usize> = (0..nodes.len())
        .filter(|i| !nodes[*i].is_silent())
        .collect();
    if kept.is_empty() {
        return POWL::silent();
    }
    if kept.len() < nodes.len() {
        let closure = flat_order.transitive_closure();
        let mut reduced_order = BinaryRelation::new(kept.len());
        for (new_a, old_a) in kept.iter().enumerate() {
            for (new_b, old_b) in kept.iter().enumerate() {
                if closure.is_edge(*old_a, *old_b) {
                    reduced_order.add_edge(new_a, new_b);
                }
            }
        }
        let mut remaining: Vec<Option<POWL>> = nodes.into_iter().map(Some).collect();
        nodes = kept.iter().filter_map(|i| remaining[*i].take()).collect();
        flat_order = reduced_order;
    }

    if nodes.len() == 1 {
        return nodes.swap_remove(0);
    }
    POWL::StrictPartialOrder {
        children: nodes,
        order: flat_order,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequent_transitions() {
        assert_eq!(
            simplify_powl(POWL::exclusive_choice(vec![POWL::silent(), POWL::activity("a")]))
                .to_string(),
            "'a'[0,1]"
        );
        assert_eq!(
            simplify_powl(POWL::looping(POWL::activity("a"), POWL::silent())).to_string(),
            "'a'[1,*]"
        );
        assert_eq!(
            simplify_powl(POWL::looping(POWL::silent(), POWL::activity("a"))).to_string(),
            "'a'[0,*]"
        );
        assert_eq!(
            simplify_powl(POWL::exclusive_choice(vec![
                POWL::looping(POWL::activity("a"), POWL::silent()),
                POWL::silent(),
            ]))
            .to_string(),
            "'a'[0,*]"
        );
    }

    #[test]
    fn nested_choices() {
        let model = POWL::exclusive_choice(vec![
            POWL::activity("a"),
            POWL::exclusive_choice(vec![POWL::activity("b"), POWL::activity("c")]),
        ]);
        assert_eq!(simplify_powl(model).to_string(), "X( 'a', 'b', 'c' )");
    }

    #[test]
    fn inline_nested_partial_order() {
        let model = POWL::sequence(vec![
            POWL::activity("a"),
            POWL::concurrency(vec![POWL::activity("b"), POWL::activity("c")]),
            POWL::activity("d"),
        ]);
        let simplified = simplify_powl(model);
        assert!(simplified.is_valid());
        assert_eq!(
            simplified.to_string(),
            "PO=(nodes={'a', 'b', 'c', 'd'}, order={'a'-->'b', 'a'-->'c', 'b'-->'d', 'c'-->'d'})"
        );
    }

    #[test]
    fn silent_partial_order_nodes() {
        let model = POWL::sequence(vec![
            POWL::activity("a"),
            POWL::silent(),
            POWL::activity("b"),
        ]);
        assert_eq!(
            simplify_powl(model).to_string(),
            "PO=(nodes={'a', 'b'}, order={'a'-->'b'})"
        );
        let single = POWL::sequence(vec![POWL::silent(), POWL::activity("a")]);
        assert_eq!(simplify_powl(single), POWL::activity("a"));
    }
}
