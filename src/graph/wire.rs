//! JSON shape exchanged with the analysis service.

use log::warn;
use serde::{Deserialize, Serialize};

use super::types::{NodeType, RepoGraph};

fn default_value() -> f64 {
	1.0
}

/// A node as sent over the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireNode {
	/// Node id.
	pub id: String,
	/// Display label.
	pub name: String,
	/// Entity kind.
	#[serde(rename = "type")]
	pub node_type: NodeType,
	/// Ordinal as reported by the service.
	#[serde(default)]
	pub index: usize,
}

/// Either a bare id or an embedded node object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireEndpoint {
	/// `"source": "n1"`
	Id(String),
	/// `"source": { "id": "n1", ... }`
	Node(WireNode),
}

impl WireEndpoint {
	/// The referenced node id.
	pub fn id(&self) -> &str {
		match self {
			WireEndpoint::Id(id) => id,
			WireEndpoint::Node(node) => &node.id,
		}
	}
}

/// An edge as sent over the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireLink {
	/// Edge origin.
	pub source: WireEndpoint,
	/// Edge destination.
	pub target: WireEndpoint,
	/// Weight, 1 when omitted.
	#[serde(default = "default_value")]
	pub value: f64,
	/// Ordinal as reported by the service.
	#[serde(default)]
	pub index: usize,
}

/// Whole graph payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WireGraph {
	/// Repository display name.
	pub name: String,
	/// Nodes.
	#[serde(default)]
	pub nodes: Vec<WireNode>,
	/// Edges, called links on the wire.
	#[serde(default)]
	pub links: Vec<WireLink>,
}

impl From<WireGraph> for RepoGraph {
	fn from(wire: WireGraph) -> Self {
		let mut graph = RepoGraph::new(wire.name);
		for node in wire.nodes {
			graph.add_node(node.id, node.name, node.node_type);
		}
		for link in &wire.links {
			let value = if link.value.is_finite() && link.value > 0.0 {
				link.value
			} else {
				warn!(
					"edge {} -> {} has non-positive weight {}, using 1",
					link.source.id(),
					link.target.id(),
					link.value
				);
				default_value()
			};
			graph.connect(link.source.id(), link.target.id(), value);
		}
		graph
	}
}

impl From<&RepoGraph> for WireGraph {
	fn from(graph: &RepoGraph) -> Self {
		let node = |n: &super::types::GraphNode| WireNode {
			id: n.id.clone(),
			name: n.name.clone(),
			node_type: n.node_type,
			index: n.index,
		};
		Self {
			name: graph.name.clone(),
			nodes: graph.nodes.iter().map(|n| node(n)).collect(),
			links: graph
				.edges
				.iter()
				.map(|e| WireLink {
					source: WireEndpoint::Node(node(&e.source)),
					target: WireEndpoint::Node(node(&e.target)),
					value: e.value,
					index: e.index,
				})
				.collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn accepts_embedded_and_bare_endpoints() {
		let json = r#"{
			"name": "demo",
			"nodes": [
				{ "id": "1", "name": "main.rs", "type": "file", "index": 0 },
				{ "id": "2", "name": "App", "type": "class", "index": 1 }
			],
			"links": [
				{ "source": { "id": "1", "name": "main.rs", "type": "file", "index": 0 },
				  "target": "2", "value": 9, "index": 0 },
				{ "source": "2", "target": "1" }
			]
		}"#;
		let wire: WireGraph = serde_json::from_str(json).unwrap();
		let graph = RepoGraph::from(wire);

		assert_eq!(graph.nodes.len(), 2);
		assert_eq!(graph.edges.len(), 2);
		assert_eq!(graph.edges[0].thickness(), 3.0);
		assert_eq!(graph.edges[1].value, 1.0);
		assert!(graph.is_consistent());
	}

	#[test]
	fn dangling_links_are_dropped_on_ingest() {
		let json = r#"{
			"name": "demo",
			"nodes": [{ "id": "1", "name": "a", "type": "module" }],
			"links": [{ "source": "1", "target": "ghost", "value": 1 }]
		}"#;
		let graph = RepoGraph::from(serde_json::from_str::<WireGraph>(json).unwrap());
		assert!(graph.edges.is_empty());
	}

	#[test]
	fn non_positive_weight_falls_back_to_one() {
		let json = r#"{
			"name": "demo",
			"nodes": [
				{ "id": "1", "name": "a", "type": "module" },
				{ "id": "2", "name": "b", "type": "module" }
			],
			"links": [{ "source": "1", "target": "2", "value": -3 }]
		}"#;
		let graph = RepoGraph::from(serde_json::from_str::<WireGraph>(json).unwrap());
		assert_eq!(graph.edges[0].value, 1.0);
	}

	#[test]
	fn outbound_payload_embeds_nodes() {
		let mut graph = RepoGraph::new("demo");
		graph.add_node("1", "a", NodeType::File);
		graph.add_node("2", "b", NodeType::Function);
		graph.connect("1", "2", 2.0);

		let value = serde_json::to_value(WireGraph::from(&graph)).unwrap();
		assert_eq!(value["links"][0]["source"]["id"], "1");
		assert_eq!(value["links"][0]["target"]["type"], "function");
		assert_eq!(value["nodes"][1]["index"], 1);
	}
}
