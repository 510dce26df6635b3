use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

///
/// Binary relation over the node indices `0..size`
///
/// Used as the order of a strict partial order in [`crate::powl::POWL`], where indices refer
/// to the children of the partial order node.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryRelation {
    size: usize,
    edges: BTreeSet<(usize, usize)>,
}

impl BinaryRelation {
    /// Create an empty relation over `size` nodes
    pub fn new(size: usize) -> Self {
        Self {
            size,
            edges: BTreeSet::new(),
        }
    }

    /// Total order `0 -> 1 -> ... -> size-1` (transitively closed)
    pub fn total_order(size: usize) -> Self {
        let mut result = Self::new(size);
        for i in 0..size {
            for j in i + 1..size {
                result.add_edge(i, j);
            }
        }
        result
    }

    /// Number of nodes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Add the pair `(from, to)`
    ///
    /// Pairs with an index outside of `0..size` are ignored.
    pub fn add_edge(&mut self, from: usize, to: usize) {
        if from < self.size && to < self.size {
            self.edges.insert((from, to));
        }
    }

    /// Remove the pair `(from, to)`
    pub fn remove_edge(&mut self, from: usize, to: usize) {
        self.edges.remove(&(from, to));
    }

    /// `true` if `(from, to)` is in the relation
    pub fn is_edge(&self, from: usize, to: usize) -> bool {
        self.edges.contains(&(from, to))
    }

    /// All pairs of the relation (sorted)
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.edges.iter().copied()
    }

    /// `true` if the relation has no pairs
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Nodes `j` with `(i, j)` in the relation
    pub fn successors(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.edges
            .iter()
            .filter(move |(from, _)| *from == i)
            .map(|(_, to)| *to)
    }

    /// Nodes `j` with `(j, i)` in the relation
    pub fn predecessors(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.edges
            .iter()
            .filter(move |(_, to)| *to == i)
            .map(|(from, _)| *from)
    }

    /// Nodes without predecessors
    pub fn sources(&self) -> Vec<usize> {
        (0..self.size)
            .filter(|i| self.predecessors(*i).next().is_none())
            .collect()
    }

    /// Nodes without successors
    pub fn sinks(&self) -> Vec<usize> {
        (0..self.size)
            .filter(|i| self.successors(*i).next().is_none())
            .collect()
    }

    /// No node is related to itself
    pub fn is_irreflexive(&self) -> bool {
        self.edges.iter().all(|(a, b)| a != b)
    }

    /// `(a, b)` and `(b, c)` imply `(a, c)`
    pub fn is_transitive(&self) -> bool {
        self.edges.iter().all(|(a, b)| {
            self.successors(*b)
                .all(|c| self.edges.contains(&(*a, c)))
        })
    }

    /// Irreflexive and transitive
    pub fn is_strict_partial_order(&self) -> bool {
        self.is_irreflexive() && self.is_transitive()
    }

    /// Smallest transitive relation containing this one (Warshall)
    pub fn transitive_closure(&self) -> Self {
        let n = self.size;
        let mut reach = vec![vec![false; n]; n];
        for (a, b) in &self.edges {
            reach[*a][*b] = true;
        }
        for k in 0..n {
            for i in 0..n {
                if reach[i][k] {
                    for j in 0..n {
                        if reach[k][j] {
                            reach[i][j] = true;
                        }
                    }
                }
            }
        }
        let mut result = Self::new(n);
        for (i, row) in reach.iter().enumerate() {
            for (j, related) in row.iter().enumerate() {
                if *related {
                    result.add_edge(i, j);
                }
            }
        }
        result
    }

    ///
    /// Transitive reduction of a strict partial order
    ///
    /// Keeps `(a, c)` only if there is no `b` with `(a, b)` and `(b, c)` in the closure.
    ///
    pub fn transitive_reduction(&self) -> Self {
        let closure = self.transitive_closure();
        let mut result = Self::new(self.size);
        for (a, c) in closure.edges() {
            let implied = closure
                .successors(a)
                .any(|b| b != c && closure.is_edge(b, c));
            if !implied {
                result.add_edge(a, c);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_order() {
        let order = BinaryRelation::total_order(3);
        assert!(order.is_strict_partial_order());
        assert_eq!(order.sources(), vec![0]);
        assert_eq!(order.sinks(), vec![2]);
        let reduction = order.transitive_reduction();
        assert_eq!(reduction.edges().collect::<Vec<_>>(), vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn closure_and_checks() {
        let mut rel = BinaryRelation::new(4);
        rel.add_edge(0, 1);
        rel.add_edge(1, 2);
        rel.add_edge(5, 0);
        assert!(rel.is_irreflexive());
        assert!(!rel.is_transitive());
        let closure = rel.transitive_closure();
        assert!(closure.is_edge(0, 2));
        assert!(closure.is_strict_partial_order());
        assert_eq!(closure.sinks(), vec![2, 3]);

        rel.add_edge(2, 0);
        assert!(!rel.transitive_closure().is_irreflexive());
    }

    #[test]
    fn diamond_reduction() {
        let mut rel = BinaryRelation::new(4);
        for (a, b) in [(0, 1), (0, 2), (0, 3), (1, 3), (2, 3)] {
            rel.add_edge(a, b);
        }
        let reduction = rel.transitive_reduction();
        assert_eq!(
            reduction.edges().collect::<Vec<_>>(),
            vec![(0, 1), (0, 2), (1, 3), (2, 3)]
        );
    }
}
