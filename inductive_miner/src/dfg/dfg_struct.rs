use crate::event_log::uvcl_struct::{Activity, UVCL};
use petgraph::{
    algo::tarjan_scc,
    graph::{DiGraph, NodeIndex},
    unionfind::UnionFind,
    visit::Dfs,
};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::collections::{BTreeMap, BTreeSet};

/// A directly-follows graph of [`Activity`]s.
/// Graph containing a set of activities, a set of directly-follows relations, start
/// activities, and end activities.
/// Activities, directly-follows relations, start and end activities are annotated with
/// their frequency.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectlyFollowsGraph {
    /// Activities
    pub activities: BTreeMap<Activity, u64>,
    /// Directly-follows relations
    #[serde_as(as = "Vec<(_, _)>")]
    pub directly_follows_relations: BTreeMap<(Activity, Activity), u64>,
    /// Start activities
    pub start_activities: BTreeMap<Activity, u64>,
    /// End activities
    pub end_activities: BTreeMap<Activity, u64>,
}

impl From<&UVCL> for DirectlyFollowsGraph {
    fn from(log: &UVCL) -> Self {
        let mut result = Self::new();
        for (variant, count) in log.iter() {
            for a in variant {
                result.add_activity(a.clone(), *count);
            }
            for pair in variant.windows(2) {
                result.add_df_relation(pair[0].clone(), pair[1].clone(), *count);
            }
            if let Some(first) = variant.first() {
                result.add_start_activity(first.clone(), *count);
            }
            if let Some(last) = variant.last() {
                result.add_end_activity(last.clone(), *count);
            }
        }
        result
    }
}

impl DirectlyFollowsGraph {
    /// Create new [`DirectlyFollowsGraph`] with no activities and directly-follows relations.
    pub fn new() -> Self {
        Self {
            activities: BTreeMap::new(),
            directly_follows_relations: BTreeMap::new(),
            start_activities: BTreeMap::new(),
            end_activities: BTreeMap::new(),
        }
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Add an activity with a frequency.
    ///
    /// If the activity already exists, the frequency count is added to the existing activity
    /// (saturating).
    pub fn add_activity(&mut self, activity: Activity, frequency: u64) {
        let entry = self.activities.entry(activity).or_default();
        *entry = entry.saturating_add(frequency);
    }

    /// Adds an activity to the start activities (with the number of cases starting with it).
    pub fn add_start_activity(&mut self, activity: Activity, frequency: u64) {
        self.activities.entry(activity.clone()).or_default();
        let entry = self.start_activities.entry(activity).or_default();
        *entry = entry.saturating_add(frequency);
    }

    /// Adds an activity to the end activities (with the number of cases ending with it).
    pub fn add_end_activity(&mut self, activity: Activity, frequency: u64) {
        self.activities.entry(activity.clone()).or_default();
        let entry = self.end_activities.entry(activity).or_default();
        *entry = entry.saturating_add(frequency);
    }

    /// Checks if an activity is already contained in the directly-follows graph.
    pub fn contains_activity<S: AsRef<str>>(&self, activity: S) -> bool {
        self.activities.contains_key(activity.as_ref())
    }

    /// Checks if an activity is a start activity in the directly-follows graph.
    pub fn is_start_activity<S: AsRef<str>>(&self, activity: S) -> bool {
        self.start_activities.contains_key(activity.as_ref())
    }

    /// Checks if an activity is an end activity in the directly-follows graph.
    pub fn is_end_activity<S: AsRef<str>>(&self, activity: S) -> bool {
        self.end_activities.contains_key(activity.as_ref())
    }

    /// Removes an activity (and all its relations) from the directly-follows graph.
    pub fn remove_activity<S: AsRef<str>>(&mut self, activity: S) {
        let activity = activity.as_ref();
        if self.activities.remove(activity).is_some() {
            self.start_activities.remove(activity);
            self.end_activities.remove(activity);
            self.directly_follows_relations
                .retain(|(from, to), _| from != activity && to != activity);
        }
    }

    /// Add a directly-follows relation with a frequency.
    ///
    /// Both activities are added as nodes. If the relation already exists, the frequency is
    /// added to the existing one.
    pub fn add_df_relation(&mut self, from: Activity, to: Activity, frequency: u64) {
        self.activities.entry(from.clone()).or_default();
        self.activities.entry(to.clone()).or_default();
        let entry = self
            .directly_follows_relations
            .entry((from, to))
            .or_default();
        *entry = entry.saturating_add(frequency);
    }

    /// Checks if a directly-follows relation is contained in the directly-follows graph.
    pub fn contains_df_relation<S: AsRef<str>>(&self, (a, b): (S, S)) -> bool {
        self.df_frequency(a, b) > 0
    }

    /// Frequency of the directly-follows relation `(a, b)` (0 if absent).
    pub fn df_frequency<S: AsRef<str>>(&self, a: S, b: S) -> u64 {
        self.directly_follows_relations
            .get(&(a.as_ref().to_string(), b.as_ref().to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Set of all activities (nodes)
    pub fn alphabet(&self) -> BTreeSet<Activity> {
        self.activities.keys().cloned().collect()
    }

    /// Returns the ingoing activities of an activity in the directly-follows graph.
    pub fn ingoing_activities<S: AsRef<str>>(&self, activity: S) -> BTreeSet<&Activity> {
        self.directly_follows_relations
            .keys()
            .filter_map(|(x, y)| (y == activity.as_ref()).then_some(x))
            .collect()
    }

    /// Returns the outgoing activities of an activity in the directly-follows graph.
    pub fn outgoing_activities<S: AsRef<str>>(&self, activity: S) -> BTreeSet<&Activity> {
        self.directly_follows_relations
            .keys()
            .filter_map(|(x, y)| (x == activity.as_ref()).then_some(y))
            .collect()
    }

    /// Weighted out-degree of an activity
    pub fn outgoing_frequency<S: AsRef<str>>(&self, activity: S) -> u64 {
        self.directly_follows_relations
            .iter()
            .filter(|((x, _), _)| x == activity.as_ref())
            .fold(0, |total, (_, f)| total.saturating_add(*f))
    }

    /// Weighted in-degree of an activity
    pub fn ingoing_frequency<S: AsRef<str>>(&self, activity: S) -> u64 {
        self.directly_follows_relations
            .iter()
            .filter(|((_, y), _)| y == activity.as_ref())
            .fold(0, |total, (_, f)| total.saturating_add(*f))
    }

    /// Maximal frequency of an outgoing edge of an activity, where ending a case counts as an
    /// outgoing edge as well
    pub fn max_outgoing_frequency<S: AsRef<str>>(&self, activity: S) -> u64 {
        let activity = activity.as_ref();
        self.directly_follows_relations
            .iter()
            .filter(|((x, _), _)| x == activity)
            .map(|(_, f)| *f)
            .chain(self.end_activities.get(activity).copied())
            .max()
            .unwrap_or(0)
    }

    ///
    /// Remove infrequent directly-follows relations (noise filtering of IMf)
    ///
    /// An edge `(a, b)` is kept iff its frequency is at least `threshold` times the
    /// [`DirectlyFollowsGraph::max_outgoing_frequency`] of `a`.
    /// Start and end activities are filtered against the most frequent start and end
    /// activity respectively. All activities stay nodes of the graph.
    ///
    pub fn filter_noise(&self, threshold: f64) -> Self {
        let keep = |freq: u64, max: u64| freq as f64 >= threshold * max as f64;
        let max_start = self.start_activities.values().copied().max().unwrap_or(0);
        let max_end = self.end_activities.values().copied().max().unwrap_or(0);
        Self {
            activities: self.activities.clone(),
            directly_follows_relations: self
                .directly_follows_relations
                .iter()
                .filter(|((a, _), f)| keep(**f, self.max_outgoing_frequency(a)))
                .map(|(k, f)| (k.clone(), *f))
                .collect(),
            start_activities: self
                .start_activities
                .iter()
                .filter(|(_, f)| keep(**f, max_start))
                .map(|(a, f)| (a.clone(), *f))
                .collect(),
            end_activities: self
                .end_activities
                .iter()
                .filter(|(_, f)| keep(**f, max_end))
                .map(|(a, f)| (a.clone(), *f))
                .collect(),
        }
    }

    /// Convert into a [`petgraph`] graph (nodes in alphabet order)
    pub fn to_petgraph(&self) -> (DiGraph<Activity, u64>, BTreeMap<Activity, NodeIndex>) {
        let mut graph: DiGraph<Activity, u64> = DiGraph::new();
        let nodes: BTreeMap<Activity, NodeIndex> = self
            .activities
            .keys()
            .map(|a| (a.clone(), graph.add_node(a.clone())))
            .collect();
        for ((a, b), f) in &self.directly_follows_relations {
            graph.add_edge(nodes[a], nodes[b], *f);
        }
        (graph, nodes)
    }

    /// Strongly connected components, each sorted, ordered by their smallest activity
    pub fn strongly_connected_components(&self) -> Vec<BTreeSet<Activity>> {
        let (graph, _) = self.to_petgraph();
        let mut components: Vec<BTreeSet<Activity>> = tarjan_scc(&graph)
            .into_iter()
            .map(|scc| scc.into_iter().map(|n| graph[n].clone()).collect())
            .collect();
        components.sort();
        components
    }

    /// Connected components of the undirected version of the graph, ordered by their
    /// smallest activity
    pub fn connected_components(&self) -> Vec<BTreeSet<Activity>> {
        let (graph, nodes) = self.to_petgraph();
        let mut union_find: UnionFind<usize> = UnionFind::new(graph.node_count());
        for edge in graph.raw_edges() {
            union_find.union(edge.source().index(), edge.target().index());
        }
        let labels = union_find.into_labeling();
        let mut grouped: BTreeMap<usize, BTreeSet<Activity>> = BTreeMap::new();
        for (a, n) in &nodes {
            grouped.entry(labels[n.index()]).or_default().insert(a.clone());
        }
        let mut components: Vec<BTreeSet<Activity>> = grouped.into_values().collect();
        components.sort();
        components
    }

    ///
    /// Reachability relation (transitive closure of the directly-follows relation)
    ///
    /// `b` is in the set of `a` iff there is a non-empty path from `a` to `b`.
    ///
    pub fn reachability(&self) -> BTreeMap<Activity, BTreeSet<Activity>> {
        let (graph, nodes) = self.to_petgraph();
        nodes
            .iter()
            .map(|(a, n)| {
                let mut reachable = BTreeSet::new();
                let mut dfs = Dfs::empty(&graph);
                for succ in graph.neighbors(*n) {
                    dfs.move_to(succ);
                    while let Some(visited) = dfs.next(&graph) {
                        reachable.insert(graph[visited].clone());
                    }
                }
                (a.clone(), reachable)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    pub const SAMPLE_JSON_DFG: &str = r#"
{
    "activities": {
        "Sleep": 13,
        "Cook": 3,
        "Work": 11,
        "Have fun": 9
    },
    "directly_follows_relations": [
        [
            ["Work","Sleep"],
            4
        ],
        [
            ["Have fun","Sleep"],
            9
        ],
        [
            ["Work","Have fun"],
            6
        ],
        [
            ["Cook","Have fun"],
            3
        ]
    ],
    "start_activities": {
        "Work": 10,
        "Cook": 3
    },
    "end_activities": {
        "Work": 1,
        "Sleep": 13
    }
}"#;

    use super::*;

    fn set(acts: &[&str]) -> BTreeSet<Activity> {
        acts.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn directly_follows_graph() {
        let mut graph = DirectlyFollowsGraph::new();
        graph.add_activity("Work".into(), 11);
        graph.add_start_activity("Work".into(), 10);
        graph.add_end_activity("Work".into(), 1);

        graph.add_activity("Cook".into(), 3);
        graph.add_start_activity("Cook".into(), 3);

        graph.add_activity("Have fun".into(), 9);
        graph.add_df_relation("Work".into(), "Have fun".into(), 6);
        graph.add_df_relation("Cook".into(), "Have fun".into(), 3);

        graph.add_activity("Sleep".into(), 13);
        graph.add_df_relation("Work".into(), "Sleep".into(), 4);
        graph.add_df_relation("Have fun".into(), "Sleep".into(), 9);
        graph.add_end_activity("Sleep".into(), 13);

        let deserialized: DirectlyFollowsGraph = serde_json::from_str(SAMPLE_JSON_DFG).unwrap();
        assert_eq!(graph, deserialized);
        assert_eq!(graph.outgoing_frequency("Work"), 10);
        assert_eq!(graph.ingoing_frequency("Sleep"), 13);
        assert_eq!(graph.max_outgoing_frequency("Sleep"), 13);
        assert_eq!(
            graph
                .ingoing_activities("Have fun")
                .into_iter()
                .cloned()
                .collect::<BTreeSet<_>>(),
            set(&["Cook", "Work"])
        );
    }

    #[test]
    fn from_uvcl() {
        let log = UVCL::from(vec![(vec!["a", "b", "c"], 2), (vec!["a", "c"], 1)]);
        let dfg = DirectlyFollowsGraph::from(&log);
        assert_eq!(dfg.df_frequency("a", "b"), 2);
        assert_eq!(dfg.df_frequency("a", "c"), 1);
        assert_eq!(dfg.df_frequency("b", "c"), 2);
        assert_eq!(dfg.start_activities.get("a"), Some(&3));
        assert_eq!(dfg.end_activities.get("c"), Some(&3));
        assert_eq!(dfg.activities.get("b"), Some(&2));
        assert!(!dfg.contains_df_relation(("c", "a")));
    }

    #[test]
    fn frequencies_saturate() {
        let log = UVCL::from(vec![(vec!["a", "b"], u64::MAX), (vec!["b", "a"], 1)]);
        let mut dfg = DirectlyFollowsGraph::from(&log);
        assert_eq!(dfg.activities.get("a"), Some(&u64::MAX));
        assert_eq!(dfg.df_frequency("a", "b"), u64::MAX);
        dfg.add_df_relation("a".into(), "c".into(), 5);
        assert_eq!(dfg.outgoing_frequency("a"), u64::MAX);
        dfg.add_start_activity("a".into(), u64::MAX);
        assert_eq!(dfg.start_activities.get("a"), Some(&u64::MAX));
    }

    #[test]
    fn isolated_activities_are_nodes() {
        let log = UVCL::from(vec![(vec!["a"], 1), (vec!["b"], 1)]);
        let dfg = DirectlyFollowsGraph::from(&log);
        assert_eq!(dfg.alphabet(), set(&["a", "b"]));
        assert_eq!(dfg.connected_components(), vec![set(&["a"]), set(&["b"])]);
    }

    #[test]
    fn components_and_reachability() {
        let log = UVCL::from(vec![
            (vec!["a", "b", "c", "b", "d"], 1),
            (vec!["e", "f"], 1),
        ]);
        let dfg = DirectlyFollowsGraph::from(&log);
        assert_eq!(
            dfg.connected_components(),
            vec![set(&["a", "b", "c", "d"]), set(&["e", "f"])]
        );
        assert_eq!(
            dfg.strongly_connected_components(),
            vec![set(&["a"]), set(&["b", "c"]), set(&["d"]), set(&["e"]), set(&["f"])]
        );
        let reach = dfg.reachability();
        assert_eq!(reach["a"], set(&["b", "c", "d"]));
        assert_eq!(reach["b"], set(&["b", "c", "d"]));
        assert!(reach["d"].is_empty());
    }

    #[test]
    fn noise_filtering_keeps_nodes() {
        let log = UVCL::from(vec![(vec!["a", "b"], 99), (vec!["b", "a"], 1)]);
        let dfg = DirectlyFollowsGraph::from(&log).filter_noise(0.2);
        assert!(dfg.contains_df_relation(("a", "b")));
        assert!(!dfg.contains_df_relation(("b", "a")));
        assert_eq!(dfg.alphabet(), set(&["a", "b"]));
        assert!(!dfg.is_start_activity("b"));
        assert!(!dfg.is_end_activity("a"));
    }
}
