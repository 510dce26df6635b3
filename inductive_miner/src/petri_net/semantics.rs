use std::collections::{HashMap, HashSet, VecDeque};

use uuid::Uuid;

use super::petri_net_struct::{ArcType, Marking, PetriNet, PlaceID, TransitionID};

/// Upper bound on explored markings for replay and soundness checks
pub const MAX_EXPLORED_MARKINGS: usize = 100_000;

impl PetriNet {
    fn consumed_by(&self, t: TransitionID) -> Vec<(PlaceID, u64)> {
        self.arcs
            .iter()
            .filter_map(|arc| match arc.from_to {
                ArcType::PlaceTransition(p, to) if to == t.0 => {
                    Some((PlaceID(p), arc.weight as u64))
                }
                _ => None,
            })
            .collect()
    }

    fn produced_by(&self, t: TransitionID) -> Vec<(PlaceID, u64)> {
        self.arcs
            .iter()
            .filter_map(|arc| match arc.from_to {
                ArcType::TransitionPlace(from, p) if from == t.0 => {
                    Some((PlaceID(p), arc.weight as u64))
                }
                _ => None,
            })
            .collect()
    }

    /// `true` if every input place of `t` carries enough tokens in `marking`
    pub fn is_enabled(&self, marking: &Marking, t: TransitionID) -> bool {
        self.consumed_by(t)
            .iter()
            .all(|(p, w)| marking.get(p).copied().unwrap_or(0) >= *w)
    }

    /// Enabled transitions, ordered by id
    pub fn enabled_transitions(&self, marking: &Marking) -> Vec<TransitionID> {
        let mut ids: Vec<Uuid> = self.transitions.keys().copied().collect();
        ids.sort();
        ids.into_iter()
            .map(TransitionID)
            .filter(|t| self.is_enabled(marking, *t))
            .collect()
    }

    /// Fire `t` in `marking`, returning the successor marking (`None` if `t` is not enabled)
    pub fn fire(&self, marking: &Marking, t: TransitionID) -> Option<Marking> {
        if !self.is_enabled(marking, t) {
            return None;
        }
        let mut result = marking.clone();
        for (p, w) in self.consumed_by(t) {
            let tokens = result.entry(p).or_default();
            *tokens -= w;
            if *tokens == 0 {
                result.remove(&p);
            }
        }
        for (p, w) in self.produced_by(t) {
            *result.entry(p).or_default() += w;
        }
        Some(result)
    }

    fn is_final(&self, marking: &Marking) -> bool {
        self.final_markings
            .as_ref()
            .is_some_and(|ms| ms.iter().any(|m| m == marking))
    }

    ///
    /// Check whether a sequence of activities can be replayed from the initial to a final
    /// marking, firing silent transitions in between as needed
    ///
    /// Returns `false` if the net has no initial marking or if more than
    /// [`MAX_EXPLORED_MARKINGS`] states would have to be explored.
    ///
    pub fn accepts_trace<S: AsRef<str>>(&self, trace: &[S]) -> bool {
        let Some(initial) = self.initial_marking.clone() else {
            return false;
        };
        let mut visited: HashSet<(Marking, usize)> = HashSet::new();
        let mut queue: VecDeque<(Marking, usize)> = VecDeque::new();
        visited.insert((initial.clone(), 0));
        queue.push_back((initial, 0));
        while let Some((marking, pos)) = queue.pop_front() {
            if pos == trace.len() && self.is_final(&marking) {
                return true;
            }
            if visited.len() > MAX_EXPLORED_MARKINGS {
                return false;
            }
            for t in self.enabled_transitions(&marking) {
                let next_pos = match self.label_of(t) {
                    None => pos,
                    Some(label) if pos < trace.len() && trace[pos].as_ref() == label => pos + 1,
                    Some(_) => continue,
                };
                if let Some(next) = self.fire(&marking, t) {
                    if visited.insert((next.clone(), next_pos)) {
                        queue.push_back((next, next_pos));
                    }
                }
            }
        }
        false
    }

    ///
    /// Check the structural workflow net properties
    ///
    /// There is exactly one source place (no incoming arcs) and one sink place (no outgoing
    /// arcs), they form the initial and the only final marking with a single token each,
    /// and every place and transition lies on a path from the source to the sink.
    ///
    pub fn is_workflow_net(&self) -> bool {
        let sources: Vec<PlaceID> = self
            .places
            .values()
            .map(PlaceID::from)
            .filter(|p| self.preset_of_place(*p).is_empty())
            .collect();
        let sinks: Vec<PlaceID> = self
            .places
            .values()
            .map(PlaceID::from)
            .filter(|p| self.postset_of_place(*p).is_empty())
            .collect();
        let ([source], [sink]) = (sources.as_slice(), sinks.as_slice()) else {
            return false;
        };
        if self.initial_marking != Some(Marking::from([(*source, 1)]))
            || self.final_markings != Some(vec![Marking::from([(*sink, 1)])])
        {
            return false;
        }

        let mut forward: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        let mut backward: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for arc in &self.arcs {
            let (from, to) = match arc.from_to {
                ArcType::PlaceTransition(from, to) | ArcType::TransitionPlace(from, to) => {
                    (from, to)
                }
            };
            forward.entry(from).or_default().push(to);
            backward.entry(to).or_default().push(from);
        }
        let reach = |start: Uuid, edges: &HashMap<Uuid, Vec<Uuid>>| -> HashSet<Uuid> {
            let mut seen = HashSet::from([start]);
            let mut stack = vec![start];
            while let Some(n) = stack.pop() {
                for m in edges.get(&n).into_iter().flatten() {
                    if seen.insert(*m) {
                        stack.push(*m);
                    }
                }
            }
            seen
        };
        let from_source = reach(source.0, &forward);
        let to_sink = reach(sink.0, &backward);
        self.places
            .keys()
            .chain(self.transitions.keys())
            .all(|n| from_source.contains(n) && to_sink.contains(n))
    }

    ///
    /// Check soundness of a workflow net by exploring its reachability graph
    ///
    /// Sound means: the final marking is reachable from every reachable marking (option to
    /// complete), every reachable marking covering the final marking is the final marking
    /// (proper completion), and every transition can fire in some reachable marking (no dead
    /// transitions). Returns `false` for non-workflow nets and for state spaces larger than
    /// [`MAX_EXPLORED_MARKINGS`].
    ///
    pub fn is_sound(&self) -> bool {
        if !self.is_workflow_net() {
            return false;
        }
        let (Some(initial), Some(finals)) = (&self.initial_marking, &self.final_markings) else {
            return false;
        };
        let Some(final_marking) = finals.first() else {
            return false;
        };

        let mut states: Vec<Marking> = vec![initial.clone()];
        let mut index: HashMap<Marking, usize> = HashMap::from([(initial.clone(), 0)]);
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new()];
        let mut fired: HashSet<TransitionID> = HashSet::new();
        let mut queue: VecDeque<usize> = VecDeque::from([0]);
        while let Some(i) = queue.pop_front() {
            let marking = states[i].clone();
            let covers_final = final_marking
                .iter()
                .all(|(p, w)| marking.get(p).copied().unwrap_or(0) >= *w);
            if covers_final && &marking != final_marking {
                return false;
            }
            for t in self.enabled_transitions(&marking) {
                let Some(next) = self.fire(&marking, t) else {
                    continue;
                };
                fired.insert(t);
                let j = match index.get(&next) {
                    Some(j) => *j,
                    None => {
                        if states.len() >= MAX_EXPLORED_MARKINGS {
                            return false;
                        }
                        let j = states.len();
                        index.insert(next.clone(), j);
                        states.push(next);
                        predecessors.push(Vec::new());
                        queue.push_back(j);
                        j
                    }
                };
                predecessors[j].push(i);
            }
        }
        if fired.len() != self.transitions.len() {
            return false;
        }
        let Some(final_index) = index.get(final_marking) else {
            return false;
        };
        let mut can_complete = vec![false; states.len()];
        can_complete[*final_index] = true;
        let mut stack = vec![*final_index];
        while let Some(j) = stack.pop() {
            for i in &predecessors[j] {
                if !can_complete[*i] {
                    can_complete[*i] = true;
                    stack.push(*i);
                }
            }
        }
        can_complete.into_iter().all(|c| c)
    }
}
