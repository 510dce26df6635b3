use uuid::Uuid;

use super::petri_net_struct::{ArcType, PetriNet, PlaceID, TransitionID};

fn sorted_transitions(net: &PetriNet) -> Vec<TransitionID> {
    let mut ids: Vec<Uuid> = net.transitions.keys().copied().collect();
    ids.sort();
    ids.into_iter().map(TransitionID).collect()
}

fn sorted_places(net: &PetriNet) -> Vec<PlaceID> {
    let mut ids: Vec<Uuid> = net.places.keys().copied().collect();
    ids.sort();
    ids.into_iter().map(PlaceID).collect()
}

fn unit_weights(net: &PetriNet, node: Uuid) -> bool {
    net.arcs
        .iter()
        .filter(|arc| arc.from_to.contains(node))
        .all(|arc| arc.weight == 1)
}

/// Silent transition between two places that only it connects: the places are fused
fn fuse_places(net: &mut PetriNet) -> bool {
    for t in sorted_transitions(net) {
        if !net.is_silent(t) || !unit_weights(net, t.0) {
            continue;
        }
        let (&[p], &[q]) = (
            net.preset_of_transition(t).as_slice(),
            net.postset_of_transition(t).as_slice(),
        ) else {
            continue;
        };
        if p == q
            || net.postset_of_place(p) != vec![t]
            || net.preset_of_place(q) != vec![t]
            || net.is_in_initial_marking(&q)
            || net.is_in_a_final_marking(&p)
            || (net.is_in_initial_marking(&p) && net.is_in_a_final_marking(&q))
        {
            continue;
        }
        net.remove_transition(t);
        for arc in net.arcs.iter_mut() {
            if let ArcType::PlaceTransition(from, _) = &mut arc.from_to {
                if *from == q.0 {
                    *from = p.0;
                }
            }
        }
        if let Some(markings) = net.final_markings.as_mut() {
            for marking in markings.iter_mut() {
                if let Some(tokens) = marking.remove(&q) {
                    *marking.entry(p).or_default() += tokens;
                }
            }
        }
        net.remove_place(q);
        return true;
    }
    false
}

/// Place connecting exactly two silent transitions and nothing else: the transitions are fused
fn fuse_transitions(net: &mut PetriNet) -> bool {
    for p in sorted_places(net) {
        if net.is_in_initial_marking(&p) || net.is_in_a_final_marking(&p) {
            continue;
        }
        let (&[t1], &[t2]) = (
            net.preset_of_place(p).as_slice(),
            net.postset_of_place(p).as_slice(),
        ) else {
            continue;
        };
        if t1 == t2
            || !net.is_silent(t1)
            || !net.is_silent(t2)
            || !unit_weights(net, p.0)
            || net.postset_of_transition(t1) != vec![p]
            || net.preset_of_transition(t2) != vec![p]
        {
            continue;
        }
        for arc in net.arcs.iter_mut() {
            if let ArcType::TransitionPlace(from, _) = &mut arc.from_to {
                if *from == t2.0 {
                    *from = t1.0;
                }
            }
        }
        net.remove_place(p);
        net.remove_transition(t2);
        return true;
    }
    false
}

///
/// Remove redundant silent transitions (and places) until nothing changes
///
/// Two language-preserving rules are applied:
/// - a silent transition whose only input place `p` and only output place `q` are connected
///   to nothing else in between is removed, and `q` is merged into `p`
/// - a place whose only producer and only consumer are silent transitions that are not
///   connected to any other place on that side is removed, and the transitions are merged
///
/// Returns the number of applied reductions.
///
pub fn reduce_silent_transitions(net: &mut PetriNet) -> usize {
    let mut applied = 0;
    while fuse_places(net) || fuse_transitions(net) {
        applied += 1;
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::petri_net::petri_net_struct::Marking;

    #[test]
    fn silent_chain_is_collapsed() {
        // source -> tau -> p1 -> a -> p2 -> tau -> sink
        let mut net = PetriNet::new();
        let source = net.add_place(None);
        let p1 = net.add_place(None);
        let p2 = net.add_place(None);
        let sink = net.add_place(None);
        let t1 = net.add_transition(None, None);
        let a = net.add_transition(Some("a".into()), None);
        let t2 = net.add_transition(None, None);
        net.add_arc(ArcType::place_to_transition(source, t1), None);
        net.add_arc(ArcType::transition_to_place(t1, p1), None);
        net.add_arc(ArcType::place_to_transition(p1, a), None);
        net.add_arc(ArcType::transition_to_place(a, p2), None);
        net.add_arc(ArcType::place_to_transition(p2, t2), None);
        net.add_arc(ArcType::transition_to_place(t2, sink), None);
        net.initial_marking = Some(Marking::from([(source, 1)]));
        net.final_markings = Some(vec![Marking::from([(sink, 1)])]);

        assert_eq!(reduce_silent_transitions(&mut net), 2);
        assert_eq!(net.transitions.len(), 1);
        assert_eq!(net.places.len(), 2);
        assert!(net.is_workflow_net());
        assert!(net.accepts_trace(&["a"]));
    }

    #[test]
    fn silent_split_join_is_fused() {
        // source -> a -> p -> tau1 -> q -> tau2 -> (r1, r2) -> b, c -> ...
        let mut net = PetriNet::new();
        let source = net.add_place(None);
        let p = net.add_place(None);
        let q = net.add_place(None);
        let r1 = net.add_place(None);
        let r2 = net.add_place(None);
        let a = net.add_transition(Some("a".into()), None);
        let tau1 = net.add_transition(None, None);
        let tau2 = net.add_transition(None, None);
        net.add_arc(ArcType::place_to_transition(source, a), None);
        net.add_arc(ArcType::transition_to_place(a, p), None);
        net.add_arc(ArcType::transition_to_place(a, q), None);
        net.add_arc(ArcType::place_to_transition(p, tau1), None);
        net.add_arc(ArcType::transition_to_place(tau1, r1), None);
        net.add_arc(ArcType::place_to_transition(q, tau2), None);
        net.add_arc(ArcType::transition_to_place(tau2, r2), None);
        net.initial_marking = Some(Marking::from([(source, 1)]));

        // both silent transitions sit between two exclusive places
        assert_eq!(reduce_silent_transitions(&mut net), 2);
        assert_eq!(net.transitions.len(), 1);
        assert_eq!(net.places.len(), 3);
    }

    #[test]
    fn choice_is_kept() {
        // source -> (a | tau) -> sink must not be reduced
        let mut net = PetriNet::new();
        let source = net.add_place(None);
        let sink = net.add_place(None);
        let a = net.add_transition(Some("a".into()), None);
        let tau = net.add_transition(None, None);
        net.add_arc(ArcType::place_to_transition(source, a), None);
        net.add_arc(ArcType::place_to_transition(source, tau), None);
        net.add_arc(ArcType::transition_to_place(a, sink), None);
        net.add_arc(ArcType::transition_to_place(tau, sink), None);
        net.initial_marking = Some(Marking::from([(source, 1)]));
        net.final_markings = Some(vec![Marking::from([(sink, 1)])]);
        assert_eq!(reduce_silent_transitions(&mut net), 0);
        assert!(net.accepts_trace::<&str>(&[]));
    }
}
