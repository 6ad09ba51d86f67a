use std::collections::BTreeMap;
use std::fmt;

use super::types::{NodeType, RepoGraph};

/// Which node types are visible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NodeFilter {
	/// Every node.
	#[default]
	All,
	/// Only nodes of one type.
	Only(NodeType),
}

impl NodeFilter {
	/// Whether a node of type `node_type` passes.
	pub fn matches(self, node_type: NodeType) -> bool {
		match self {
			NodeFilter::All => true,
			NodeFilter::Only(t) => t == node_type,
		}
	}
}

impl fmt::Display for NodeFilter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NodeFilter::All => f.write_str("all"),
			NodeFilter::Only(t) => t.fmt(f),
		}
	}
}

/// The subset of `graph` that `filter` lets through. Edges survive only when
/// both endpoints do. With [`NodeFilter::All`] the result is the input.
pub fn compute_visible(graph: &RepoGraph, filter: NodeFilter) -> RepoGraph {
	if filter == NodeFilter::All {
		return graph.clone();
	}
	let keep = |t: NodeType| filter.matches(t);
	RepoGraph::from_parts(
		graph.name.clone(),
		graph
			.nodes
			.iter()
			.filter(|n| keep(n.node_type))
			.cloned()
			.collect(),
		graph
			.edges
			.iter()
			.filter(|e| keep(e.source.node_type) && keep(e.target.node_type))
			.cloned()
			.collect(),
	)
}

/// Node count per type. All four types are present, zero when absent.
pub fn counts_by_type(graph: &RepoGraph) -> BTreeMap<NodeType, usize> {
	let mut counts = empty_counts();
	for node in &graph.nodes {
		*counts.entry(node.node_type).or_insert(0) += 1;
	}
	counts
}

/// Zero for every type, used before any graph is loaded.
pub fn empty_counts() -> BTreeMap<NodeType, usize> {
	NodeType::ALL.into_iter().map(|t| (t, 0)).collect()
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;
	use std::sync::Arc;

	use proptest::prelude::*;

	use super::*;

	fn node_type() -> impl Strategy<Value = NodeType> {
		prop_oneof![
			Just(NodeType::File),
			Just(NodeType::Class),
			Just(NodeType::Function),
			Just(NodeType::Module),
		]
	}

	fn repo_graph() -> impl Strategy<Value = RepoGraph> {
		prop::collection::vec(node_type(), 0..24).prop_flat_map(|types| {
			let n = types.len().max(1);
			let edges = prop::collection::vec((0..n, 0..n, 1u32..5), 0..40);
			(Just(types), edges).prop_map(|(types, edges)| {
				let mut graph = RepoGraph::new("generated");
				for (i, t) in types.iter().enumerate() {
					graph.add_node(format!("n{i}"), format!("node {i}"), *t);
				}
				for (s, t, v) in edges {
					if s < types.len() && t < types.len() {
						graph.connect(&format!("n{s}"), &format!("n{t}"), v as f64);
					}
				}
				graph
			})
		})
	}

	proptest! {
		#[test]
		fn visible_edges_have_visible_endpoints(graph in repo_graph(), t in node_type()) {
			let visible = compute_visible(&graph, NodeFilter::Only(t));
			let ids: HashSet<_> = visible.nodes.iter().map(|n| n.id.as_str()).collect();
			for edge in &visible.edges {
				prop_assert!(ids.contains(edge.source.id.as_str()));
				prop_assert!(ids.contains(edge.target.id.as_str()));
			}
			prop_assert!(visible.nodes.iter().all(|n| n.node_type == t));
			prop_assert!(visible.is_consistent());
		}

		#[test]
		fn all_is_identity(graph in repo_graph()) {
			let visible = compute_visible(&graph, NodeFilter::All);
			prop_assert_eq!(&visible, &graph);
			for (a, b) in visible.nodes.iter().zip(&graph.nodes) {
				prop_assert!(Arc::ptr_eq(a, b));
			}
		}

		#[test]
		fn counts_sum_to_node_count(graph in repo_graph()) {
			let counts = counts_by_type(&graph);
			prop_assert_eq!(counts.len(), 4);
			prop_assert_eq!(counts.values().sum::<usize>(), graph.nodes.len());
		}
	}

	#[test]
	fn mixed_type_edges_are_dropped() {
		let mut graph = RepoGraph::new("demo");
		graph.add_node("f1", "a.rs", NodeType::File);
		graph.add_node("f2", "b.rs", NodeType::File);
		graph.add_node("c", "C", NodeType::Class);
		graph.connect("f1", "f2", 1.0);
		graph.connect("f1", "c", 1.0);

		let visible = compute_visible(&graph, NodeFilter::Only(NodeType::File));
		assert_eq!(visible.nodes.len(), 2);
		assert_eq!(visible.edges.len(), 1);
		assert_eq!(visible.edges[0].target.id, "f2");
	}

	#[test]
	fn absent_types_count_as_zero() {
		let mut graph = RepoGraph::new("demo");
		graph.add_node("m", "utils", NodeType::Module);
		let counts = counts_by_type(&graph);
		assert_eq!(counts[&NodeType::Module], 1);
		assert_eq!(counts[&NodeType::Class], 0);
		assert_eq!(empty_counts().values().sum::<usize>(), 0);
	}
}
