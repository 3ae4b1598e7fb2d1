//! Directed multigraph with labelled edges.
//!
//! Nodes are identified by value (the search uses board fingerprints), so cycles
//! in the state space need no shared ownership: every edge stores the key of its
//! destination. Edges keep insertion order and adding the same edge twice stores
//! it twice.
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// An outgoing edge: the label it carries and the node it leads to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge<N, L> {
    pub label: L,
    pub dest: N,
}

/// A graph of discovered states and the transitions between them.
///
/// # Examples
/// ```
/// use rush_hour_solver::graph::TransitionGraph;
///
/// let mut graph = TransitionGraph::new();
/// graph.add_edge("a", "b", 1);
/// graph.add_edge("b", "c", 2);
/// graph.add_edge("a", "e", 3);
/// assert_eq!(graph.shortest_path(&"a", &"c"), Some(vec!["a", "b", "c"]));
/// assert!(!graph.reachable(&"c", &"a"));
/// assert_eq!(graph.label_to(&"a", &"e"), Some(&3));
/// ```
#[derive(Clone, Debug)]
pub struct TransitionGraph<N, L> {
    adjacency: HashMap<N, Vec<Edge<N, L>>>,
}

impl<N, L> Default for TransitionGraph<N, L> {
    fn default() -> Self {
        TransitionGraph {
            adjacency: HashMap::new(),
        }
    }
}

impl<N: Eq + Hash + Clone, L> TransitionGraph<N, L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node with no edges. Returns `false` if the node already existed.
    pub fn add_node(&mut self, id: N) -> bool {
        if self.adjacency.contains_key(&id) {
            return false;
        }
        self.adjacency.insert(id, Vec::new());
        true
    }

    pub fn contains_node(&self, id: &N) -> bool {
        self.adjacency.contains_key(id)
    }

    /// Adds a directed edge, creating either endpoint if it is missing.
    ///
    /// No deduplication is done; repeated calls store repeated edges.
    pub fn add_edge(&mut self, src: N, dest: N, label: L) {
        self.add_node(dest.clone());
        self.adjacency
            .entry(src)
            .or_default()
            .push(Edge { label, dest });
    }

    /// Adds a pair of mirrored edges carrying the same label.
    pub fn add_undirected_edge(&mut self, a: N, b: N, label: L)
    where
        L: Clone,
    {
        self.add_edge(a.clone(), b.clone(), label.clone());
        self.add_edge(b, a, label);
    }

    /// Returns the outgoing edges of a node in insertion order, or `None` for an unknown node.
    pub fn edges_from(&self, id: &N) -> Option<&[Edge<N, L>]> {
        self.adjacency.get(id).map(Vec::as_slice)
    }

    /// Returns the label of the first edge from `src` to `dest`.
    pub fn label_to(&self, src: &N, dest: &N) -> Option<&L> {
        self.edges_from(src)?
            .iter()
            .find(|edge| &edge.dest == dest)
            .map(|edge| &edge.label)
    }

    /// Removes a node, its outgoing edges, and every edge that pointed at it.
    ///
    /// Returns `false` if the node did not exist.
    pub fn remove_node(&mut self, id: &N) -> bool {
        if self.adjacency.remove(id).is_none() {
            return false;
        }
        for edges in self.adjacency.values_mut() {
            edges.retain(|edge| &edge.dest != id);
        }
        true
    }

    /// Removes the first edge from `src` to `dest` and returns it.
    pub fn remove_edge(&mut self, src: &N, dest: &N) -> Option<Edge<N, L>> {
        let edges = self.adjacency.get_mut(src)?;
        let index = edges.iter().position(|edge| &edge.dest == dest)?;
        Some(edges.remove(index))
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// Finds a path with the fewest edges from `src` to `dest` using breadth-first search.
    ///
    /// # Returns
    /// The nodes along the path, both endpoints included, or `None` if `dest` cannot be
    /// reached or `src` is not in the graph. A node reaches itself with a one-node path.
    pub fn shortest_path(&self, src: &N, dest: &N) -> Option<Vec<N>> {
        if !self.adjacency.contains_key(src) {
            return None;
        }
        if src == dest {
            return Some(vec![src.clone()]);
        }

        // Each discovered node maps to the node it was discovered from.
        let mut came_from: HashMap<&N, Option<&N>> = HashMap::new();
        let mut frontier = VecDeque::new();
        came_from.insert(src, None);
        frontier.push_back(src);

        while let Some(current) = frontier.pop_front() {
            for edge in self.edges_from(current).unwrap_or_default() {
                if came_from.contains_key(&edge.dest) {
                    continue;
                }
                came_from.insert(&edge.dest, Some(current));
                if &edge.dest == dest {
                    let mut path = vec![edge.dest.clone()];
                    let mut cursor = Some(current);
                    while let Some(node) = cursor {
                        path.push(node.clone());
                        cursor = came_from.get(node).copied().flatten();
                    }
                    path.reverse();
                    return Some(path);
                }
                frontier.push_back(&edge.dest);
            }
        }
        None
    }

    /// True if `dest` can be reached from `src` by following edges.
    pub fn reachable(&self, src: &N, dest: &N) -> bool {
        self.shortest_path(src, dest).is_some()
    }
}
