//! Cluster detection
//!
//! Partitions a graph snapshot into connected components under a strength
//! threshold. Components of size one are reported as isolated nodes, not
//! clusters. For a fixed graph and threshold the partition is
//! deterministic; the order of members inside a cluster follows traversal
//! (first-neighbor-first) order, so callers comparing clusters should
//! compare membership as sets.

use crate::graph::{CardId, Graph};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// One connected component of size two or more
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// Member ids in traversal order
    pub members: Vec<CardId>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &CardId) -> bool {
        self.members.iter().any(|m| m == id)
    }
}

/// Result of one detection run: clusters plus the isolated remainder.
///
/// Together these partition the node set exactly: every node appears in
/// exactly one cluster or in `isolated`, never both, never omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterPartition {
    pub clusters: Vec<Cluster>,
    /// Nodes touched by no retained edge
    pub isolated: Vec<CardId>,
}

impl ClusterPartition {
    pub fn cluster_of(&self, id: &CardId) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.contains(id))
    }

    /// Total nodes across clusters and the isolated set
    pub fn node_count(&self) -> usize {
        self.clusters.iter().map(Cluster::len).sum::<usize>() + self.isolated.len()
    }
}

/// Detect connected components using only edges with
/// `strength >= threshold` (all edges when `apply_threshold` is false).
pub fn detect_clusters(graph: &Graph, threshold: f64, apply_threshold: bool) -> ClusterPartition {
    // 1. Adjacency over retained edges, preserving edge order per node
    let mut adjacency: FxHashMap<&CardId, Vec<&CardId>> = FxHashMap::default();
    for edge in graph.edges() {
        if apply_threshold && edge.strength < threshold {
            continue;
        }
        adjacency.entry(&edge.source).or_default().push(&edge.target);
        adjacency.entry(&edge.target).or_default().push(&edge.source);
    }

    // 2. Iterative DFS from each unvisited node, in node insertion order
    let mut visited: FxHashSet<&CardId> = FxHashSet::default();
    let mut clusters = Vec::new();
    let mut isolated = Vec::new();

    for start in graph.node_ids() {
        if visited.contains(start) {
            continue;
        }

        let mut component = Vec::new();
        let mut stack = vec![start];
        visited.insert(start);

        while let Some(current) = stack.pop() {
            component.push(current.clone());
            if let Some(neighbors) = adjacency.get(current) {
                // Reversed so the first-listed neighbor is visited first
                for &neighbor in neighbors.iter().rev() {
                    if visited.insert(neighbor) {
                        stack.push(neighbor);
                    }
                }
            }
        }

        if component.len() >= 2 {
            clusters.push(Cluster { members: component });
        } else {
            isolated.extend(component);
        }
    }

    ClusterPartition { clusters, isolated }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{
        build_graph, Card, CardCategory, EdgeFilter, MetricWeights, NodeFilter, Relationship,
        RelationshipType,
    };
    use chrono::Utc;
    use std::collections::HashSet;

    fn graph_from(rels: &[(&str, &str, f64)], extra_cards: &[&str]) -> Graph {
        let mut ids: Vec<&str> = Vec::new();
        for &(a, b, _) in rels {
            for id in [a, b] {
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
        }
        for &id in extra_cards {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        let cards: Vec<Card> = ids
            .iter()
            .map(|id| Card::new(*id, *id, CardCategory::Insight))
            .collect();
        let relationships: Vec<Relationship> = rels
            .iter()
            .map(|(a, b, s)| Relationship::new(*a, *b, *s, RelationshipType::RelatesTo))
            .collect();
        build_graph(
            &cards,
            &relationships,
            &NodeFilter::all(),
            &EdgeFilter::all(),
            &MetricWeights::default(),
            Utc::now(),
        )
    }

    fn member_set(cluster: &Cluster) -> HashSet<String> {
        cluster.members.iter().map(|m| m.as_str().to_string()).collect()
    }

    #[test]
    fn test_two_components_and_isolated() {
        // 1-2 | 3-4-5 | 6 isolated
        let graph = graph_from(
            &[("1", "2", 0.9), ("3", "4", 0.9), ("4", "5", 0.9)],
            &["6"],
        );
        let partition = detect_clusters(&graph, 0.3, true);

        assert_eq!(partition.clusters.len(), 2);
        assert_eq!(partition.isolated.len(), 1);
        assert_eq!(partition.isolated[0].as_str(), "6");

        let sizes: Vec<usize> = partition.clusters.iter().map(Cluster::len).collect();
        assert!(sizes.contains(&2));
        assert!(sizes.contains(&3));
    }

    #[test]
    fn test_partition_is_exact() {
        let graph = graph_from(
            &[("a", "b", 0.5), ("b", "c", 0.1), ("d", "e", 0.8)],
            &["f"],
        );
        let partition = detect_clusters(&graph, 0.3, true);

        let mut seen: HashSet<String> = HashSet::new();
        for cluster in &partition.clusters {
            for m in &cluster.members {
                assert!(seen.insert(m.as_str().to_string()), "node in two clusters");
            }
        }
        for id in &partition.isolated {
            assert!(seen.insert(id.as_str().to_string()), "isolated node also clustered");
        }
        assert_eq!(seen.len(), graph.node_count());
        assert_eq!(partition.node_count(), graph.node_count());
    }

    #[test]
    fn test_threshold_splits_weak_bridge() {
        // a-b strong, b-c weak: at 0.3 the bridge drops and c isolates
        let graph = graph_from(&[("a", "b", 0.8), ("b", "c", 0.2)], &[]);

        let loose = detect_clusters(&graph, 0.3, false);
        assert_eq!(loose.clusters.len(), 1);
        assert_eq!(loose.clusters[0].len(), 3);

        let strict = detect_clusters(&graph, 0.3, true);
        assert_eq!(strict.clusters.len(), 1);
        assert_eq!(member_set(&strict.clusters[0]), HashSet::from(["a".into(), "b".into()]));
        assert_eq!(strict.isolated.len(), 1);
    }

    #[test]
    fn test_threshold_monotonicity() {
        let graph = graph_from(
            &[
                ("a", "b", 0.9),
                ("b", "c", 0.6),
                ("c", "d", 0.4),
                ("d", "e", 0.2),
                ("x", "y", 0.7),
            ],
            &[],
        );

        let mut previous_max: Option<usize> = None;
        for threshold in [0.0, 0.25, 0.5, 0.75, 1.0] {
            let partition = detect_clusters(&graph, threshold, true);
            let max_size = partition.clusters.iter().map(Cluster::len).max().unwrap_or(0);
            if let Some(prev) = previous_max {
                assert!(
                    max_size <= prev,
                    "cluster grew when threshold rose to {}",
                    threshold
                );
            }
            previous_max = Some(max_size);
        }
    }

    #[test]
    fn test_clusters_are_fresh_values() {
        let graph = graph_from(&[("a", "b", 0.9)], &[]);
        let first = detect_clusters(&graph, 0.3, true);
        let second = detect_clusters(&graph, 0.3, true);
        assert_eq!(first.clusters, second.clusters);
        assert_eq!(first.isolated, second.isolated);
    }

    #[test]
    fn test_empty_graph() {
        let graph = Graph::empty();
        let partition = detect_clusters(&graph, 0.3, true);
        assert!(partition.clusters.is_empty());
        assert!(partition.isolated.is_empty());
    }
}
