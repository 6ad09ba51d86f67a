use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::warn;
use serde::{Deserialize, Serialize};

/// Node colours, one per [`NodeType`], shared by every layout and the legend.
const COLORS: &[&str] = &["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728"];

/// Kind of code entity a node stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
	/// A source file.
	File,
	/// A class, struct or similar type definition.
	Class,
	/// A free function or method.
	Function,
	/// A module or package.
	Module,
}

impl NodeType {
	/// Every known type, in legend order.
	pub const ALL: [NodeType; 4] = [
		NodeType::File,
		NodeType::Class,
		NodeType::Function,
		NodeType::Module,
	];

	/// Lowercase wire name.
	pub fn as_str(self) -> &'static str {
		match self {
			NodeType::File => "file",
			NodeType::Class => "class",
			NodeType::Function => "function",
			NodeType::Module => "module",
		}
	}

	/// Capitalised plural used by the filter panel and legend ("Files").
	pub fn plural_label(self) -> &'static str {
		match self {
			NodeType::File => "Files",
			NodeType::Class => "Classes",
			NodeType::Function => "Functions",
			NodeType::Module => "Modules",
		}
	}

	/// Fill colour for nodes of this type.
	pub fn color(self) -> &'static str {
		COLORS[self as usize % COLORS.len()]
	}
}

impl fmt::Display for NodeType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A vertex of the repository graph. Immutable once ingested; layout scratch
/// state lives in the layout engines, keyed by position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphNode {
	/// Unique within one snapshot.
	pub id: String,
	/// Display label.
	pub name: String,
	/// Entity kind.
	pub node_type: NodeType,
	/// Ordinal assigned at ingestion.
	pub index: usize,
}

/// A directed, weighted relation. Endpoints are the same `Arc`s held by the
/// owning [`RepoGraph`], never copies.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
	/// Edge origin.
	pub source: Arc<GraphNode>,
	/// Edge destination.
	pub target: Arc<GraphNode>,
	/// Positive weight.
	pub value: f64,
	/// Ordinal assigned at ingestion.
	pub index: usize,
}

impl GraphEdge {
	/// Stroke width used by every layout: `sqrt(value)`.
	pub fn thickness(&self) -> f64 {
		self.value.max(0.0).sqrt()
	}
}

/// One immutable snapshot of an analysed repository.
///
/// Nodes are added through [`RepoGraph::add_node`] so the id index stays in
/// step with `nodes`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RepoGraph {
	/// Display name.
	pub name: String,
	/// Nodes in discovery order.
	pub nodes: Vec<Arc<GraphNode>>,
	/// Edges whose endpoints all belong to `nodes`.
	pub edges: Vec<GraphEdge>,
	slots: HashMap<String, usize>,
}

impl RepoGraph {
	/// An empty graph with the given display name.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			nodes: Vec::new(),
			edges: Vec::new(),
			slots: HashMap::new(),
		}
	}

	/// Assemble a graph from nodes and edges already known to be consistent,
	/// e.g. a subset of another graph.
	pub(crate) fn from_parts(
		name: String,
		nodes: Vec<Arc<GraphNode>>,
		edges: Vec<GraphEdge>,
	) -> Self {
		let slots = nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.clone(), i))
			.collect();
		Self {
			name,
			nodes,
			edges,
			slots,
		}
	}

	/// Append a node; its ordinal is its position. Returns `None` when the id
	/// is already taken.
	pub fn add_node(
		&mut self,
		id: impl Into<String>,
		name: impl Into<String>,
		node_type: NodeType,
	) -> Option<Arc<GraphNode>> {
		let id = id.into();
		if self.node(&id).is_some() {
			warn!("duplicate node id {id:?} ignored");
			return None;
		}
		let node = Arc::new(GraphNode {
			id,
			name: name.into(),
			node_type,
			index: self.nodes.len(),
		});
		self.slots.insert(node.id.clone(), self.nodes.len());
		self.nodes.push(node.clone());
		Some(node)
	}

	/// Add an edge between two existing nodes, resolved by id. An edge naming
	/// an unknown node is dropped and `false` is returned.
	pub fn connect(&mut self, source: &str, target: &str, value: f64) -> bool {
		let (Some(src), Some(tgt)) = (self.node(source).cloned(), self.node(target).cloned()) else {
			warn!("dropping edge {source:?} -> {target:?}: endpoint not in graph");
			return false;
		};
		let index = self.edges.len();
		self.edges.push(GraphEdge {
			source: src,
			target: tgt,
			value,
			index,
		});
		true
	}

	/// Look a node up by id.
	pub fn node(&self, id: &str) -> Option<&Arc<GraphNode>> {
		self.slot(id).map(|i| &self.nodes[i])
	}

	/// Position of the node with `id` in `nodes`.
	pub fn slot(&self, id: &str) -> Option<usize> {
		self.slots
			.get(id)
			.copied()
			.filter(|&i| self.nodes.get(i).is_some_and(|n| n.id == id))
	}

	/// Whether every edge endpoint is one of this graph's own node handles.
	pub fn is_consistent(&self) -> bool {
		self.edges.iter().all(|edge| {
			[&edge.source, &edge.target]
				.into_iter()
				.all(|end| self.node(&end.id).is_some_and(|n| Arc::ptr_eq(n, end)))
		})
	}

	/// Outgoing edges per node, indexed like `nodes`, each list in edge order.
	pub fn outgoing_by_node(&self) -> Vec<Vec<&GraphEdge>> {
		let mut out = vec![Vec::new(); self.nodes.len()];
		for edge in &self.edges {
			if let Some(i) = self.slot(&edge.source.id) {
				out[i].push(edge);
			}
		}
		out
	}
}
