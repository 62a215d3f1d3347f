//! Graph algorithms over the `blocks` subgraph.
//!
//! Everything here is synchronous and works on data already fetched from the
//! stores. Traversals are iterative (explicit worklist plus visited set) so
//! long chains cannot overflow the stack.

use crate::domain::{DependencyEdge, DependencyType, IssueId};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Directed graph of `blocks` edges, keyed by issue id.
///
/// Nodes are created lazily from edge endpoints; an issue that appears in no
/// edge has no node.
#[derive(Debug, Default)]
pub(crate) struct BlocksGraph {
    graph: DiGraph<IssueId, ()>,
    nodes: HashMap<IssueId, NodeIndex>,
}

impl BlocksGraph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Build the graph from every `blocks` edge in `edges`; other types are ignored.
    pub(crate) fn from_edges<'a>(edges: impl IntoIterator<Item = &'a DependencyEdge>) -> Self {
        let mut graph = Self::new();
        for edge in edges {
            if edge.dep_type == DependencyType::Blocks {
                graph.add_edge(&edge.source_issue_id, &edge.target_issue_id);
            }
        }
        graph
    }

    fn node(&mut self, id: &IssueId) -> NodeIndex {
        if let Some(&index) = self.nodes.get(id) {
            return index;
        }
        let index = self.graph.add_node(id.clone());
        self.nodes.insert(id.clone(), index);
        index
    }

    pub(crate) fn add_edge(&mut self, source: &IssueId, target: &IssueId) {
        let from = self.node(source);
        let to = self.node(target);
        self.graph.add_edge(from, to, ());
    }

    /// Returns `true` if `to` can be reached from `from` along `blocks` edges.
    ///
    /// A node always reaches itself. Inserting `source -> target` closes a
    /// cycle exactly when `reaches(target, source)`.
    pub(crate) fn reaches(&self, from: &IssueId, to: &IssueId) -> bool {
        if from == to {
            return true;
        }
        let (Some(&start), Some(&goal)) = (self.nodes.get(from), self.nodes.get(to)) else {
            return false;
        };

        let mut visited = vec![false; self.graph.node_count()];
        let mut stack = vec![start];
        visited[start.index()] = true;

        while let Some(node) = stack.pop() {
            for next in self.graph.neighbors_directed(node, Direction::Outgoing) {
                if next == goal {
                    return true;
                }
                if !visited[next.index()] {
                    visited[next.index()] = true;
                    stack.push(next);
                }
            }
        }

        false
    }
}

/// Kahn's algorithm over nodes `0..node_count`.
///
/// The ready queue is a min-heap, so among nodes whose blockers are all
/// placed the lowest index goes first. Nodes on a cycle never become ready
/// and are left out of the result.
pub(crate) fn topological_order(node_count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    let mut successors = vec![Vec::new(); node_count];
    let mut in_degree = vec![0_usize; node_count];
    for &(from, to) in edges {
        successors[from].push(to);
        in_degree[to] += 1;
    }

    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, degree)| **degree == 0)
        .map(|(node, _)| Reverse(node))
        .collect();

    let mut order = Vec::with_capacity(node_count);
    while let Some(Reverse(node)) = ready.pop() {
        order.push(node);
        for &next in &successors[node] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.push(Reverse(next));
            }
        }
    }

    order
}

/// Longest chain (in edges) through a DAG on nodes `0..node_count`.
///
/// Returns node indices from the start of the chain to its end. Ties resolve
/// to the first node in topological order reaching the maximum distance, and
/// a node keeps its first predecessor unless a strictly longer one appears.
/// Nodes missing from the topological order keep distance zero.
pub(crate) fn longest_chain(node_count: usize, edges: &[(usize, usize)]) -> Vec<usize> {
    if node_count == 0 {
        return Vec::new();
    }

    let order = topological_order(node_count, edges);
    let mut successors = vec![Vec::new(); node_count];
    for &(from, to) in edges {
        successors[from].push(to);
    }

    let mut dist = vec![0_usize; node_count];
    let mut pred: Vec<Option<usize>> = vec![None; node_count];
    for &node in &order {
        for &next in &successors[node] {
            if dist[node] + 1 > dist[next] {
                dist[next] = dist[node] + 1;
                pred[next] = Some(node);
            }
        }
    }

    let mut end = order.first().copied().unwrap_or(0);
    for &node in &order {
        if dist[node] > dist[end] {
            end = node;
        }
    }

    let mut chain = vec![end];
    let mut current = end;
    while let Some(previous) = pred[current] {
        // pred only ever points backwards in topological order
        if chain.len() > node_count {
            break;
        }
        chain.push(previous);
        current = previous;
    }
    chain.reverse();
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    fn id(s: &str) -> IssueId {
        IssueId::new(s)
    }

    fn edge(source: &str, target: &str, dep_type: DependencyType) -> DependencyEdge {
        DependencyEdge {
            id: format!("dep-{source}{target}").into(),
            source_issue_id: id(source),
            target_issue_id: id(target),
            dep_type,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn reaches_follows_multiple_hops() {
        let edges = [
            edge("a", "b", DependencyType::Blocks),
            edge("b", "c", DependencyType::Blocks),
            edge("c", "d", DependencyType::Blocks),
        ];
        let graph = BlocksGraph::from_edges(&edges);

        assert!(graph.reaches(&id("a"), &id("d")));
        assert!(!graph.reaches(&id("d"), &id("a")));
        assert!(graph.reaches(&id("x"), &id("x")));
        assert!(!graph.reaches(&id("a"), &id("unknown")));
    }

    #[test]
    fn non_blocks_edges_are_ignored() {
        let edges = [
            edge("a", "b", DependencyType::Relates),
            edge("b", "c", DependencyType::Duplicates),
        ];
        let graph = BlocksGraph::from_edges(&edges);
        assert!(!graph.reaches(&id("a"), &id("c")));
    }

    #[test]
    fn reaches_terminates_on_diamond_and_long_chain() {
        let mut graph = BlocksGraph::new();
        graph.add_edge(&id("top"), &id("left"));
        graph.add_edge(&id("top"), &id("right"));
        graph.add_edge(&id("left"), &id("bottom"));
        graph.add_edge(&id("right"), &id("bottom"));
        assert!(graph.reaches(&id("top"), &id("bottom")));

        let mut chain = BlocksGraph::new();
        for n in 0..10_000 {
            chain.add_edge(&id(&n.to_string()), &id(&(n + 1).to_string()));
        }
        assert!(chain.reaches(&id("0"), &id("10000")));
    }

    #[test]
    fn topological_order_prefers_lowest_index() {
        // 2 -> 0, 1 and 3 free
        let order = topological_order(4, &[(2, 0)]);
        assert_eq!(order, vec![1, 2, 0, 3]);
    }

    #[test]
    fn topological_order_skips_cycles() {
        let order = topological_order(3, &[(0, 1), (1, 0)]);
        assert_eq!(order, vec![2]);
    }

    #[rstest]
    #[case::empty(0, vec![], vec![])]
    #[case::single_node(1, vec![], vec![0])]
    #[case::no_edges_picks_first(3, vec![], vec![0])]
    #[case::chain(3, vec![(0, 1), (1, 2)], vec![0, 1, 2])]
    #[case::longer_branch_wins(4, vec![(0, 3), (1, 2), (2, 3)], vec![1, 2, 3])]
    fn longest_chain_cases(
        #[case] nodes: usize,
        #[case] edges: Vec<(usize, usize)>,
        #[case] expected: Vec<usize>,
    ) {
        assert_eq!(longest_chain(nodes, &edges), expected);
    }

    #[test]
    fn equal_length_chains_resolve_to_first_in_order() {
        // 0 -> 1 and 2 -> 3 both have length one; node 1 is placed before 3
        assert_eq!(longest_chain(4, &[(0, 1), (2, 3)]), vec![0, 1]);
    }

    #[test]
    fn first_predecessor_kept_on_tie() {
        // 0 -> 2 and 1 -> 2: 0 is processed first and stays the predecessor
        assert_eq!(longest_chain(3, &[(0, 2), (1, 2)]), vec![0, 2]);
    }

    #[test]
    fn cyclic_nodes_are_not_chosen() {
        // 1 <-> 2 cycle, 0 alone
        assert_eq!(longest_chain(3, &[(1, 2), (2, 1)]), vec![0]);
    }
}
