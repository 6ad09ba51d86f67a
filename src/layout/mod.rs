//! Layout engines: each turns a (filtered) graph into drawable geometry.

pub mod arc;
pub mod bundle;
pub mod force;
pub mod path;

use std::fmt;

use crate::graph::{GraphNode, RepoGraph};
use path::{Path, Point};

pub use arc::{ArcConfig, ArcLayout};
pub use bundle::{BundleConfig, BundleLayout, Hierarchy};
pub use force::{ForceConfig, ForceSimulation, NodeState};

/// Edge colour shared by every engine.
pub const EDGE_RGB: &str = "153, 153, 153";

/// Which engine draws the graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VisualizationType {
	/// Force-directed network.
	#[default]
	Network,
	/// Radial hierarchical edge bundling.
	Hierarchical,
	/// Arc diagram.
	Arc,
}

impl VisualizationType {
	/// Every engine, in control-panel order.
	pub const ALL: [VisualizationType; 3] = [
		VisualizationType::Network,
		VisualizationType::Hierarchical,
		VisualizationType::Arc,
	];

	/// Human readable name.
	pub fn label(self) -> &'static str {
		match self {
			VisualizationType::Network => "Network Graph",
			VisualizationType::Hierarchical => "Hierarchical Edge Bundling",
			VisualizationType::Arc => "Arc Diagram",
		}
	}

	/// Stable key for form controls.
	pub fn key(self) -> &'static str {
		match self {
			VisualizationType::Network => "network",
			VisualizationType::Hierarchical => "hierarchical",
			VisualizationType::Arc => "arc",
		}
	}
}

impl fmt::Display for VisualizationType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.key())
	}
}

/// Horizontal text anchoring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
	/// Text starts at the anchor.
	Start,
	/// Text is centred on the anchor.
	Center,
	/// Text ends at the anchor.
	End,
}

impl TextAlign {
	/// Canvas `textAlign` value.
	pub fn as_str(self) -> &'static str {
		match self {
			TextAlign::Start => "start",
			TextAlign::Center => "center",
			TextAlign::End => "end",
		}
	}
}

/// Text attached to a node. Drawn in a frame translated to the node centre
/// and rotated by `rotation` radians.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelMark {
	/// Label text.
	pub text: String,
	/// Offset from the node centre inside the rotated frame.
	pub offset: Point,
	/// Frame rotation in radians, clockwise.
	pub rotation: f64,
	/// Anchoring relative to `offset`.
	pub align: TextAlign,
}

/// A node circle.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeMark {
	/// Position of the node in the laid-out graph.
	pub index: usize,
	/// Circle centre.
	pub center: Point,
	/// Circle radius.
	pub radius: f64,
	/// Fill colour.
	pub color: &'static str,
	/// Attached label.
	pub label: LabelMark,
	/// Hover text.
	pub tooltip: String,
}

impl NodeMark {
	fn new(index: usize, node: &GraphNode, center: Point, radius: f64, label: LabelMark) -> Self {
		Self {
			index,
			center,
			radius,
			color: node.node_type.color(),
			label,
			tooltip: format!("{} ({})", node.name, node.node_type),
		}
	}
}

/// A stroked edge.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeMark {
	/// Geometry.
	pub path: Path,
	/// Stroke width.
	pub width: f64,
	/// Stroke opacity.
	pub opacity: f64,
}

/// Everything the renderer needs for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
	/// Edges, drawn first.
	pub edges: Vec<EdgeMark>,
	/// Nodes, drawn over the edges.
	pub nodes: Vec<NodeMark>,
}

impl Scene {
	/// Topmost node whose circle (grown by `slack`) contains `p`.
	pub fn node_at(&self, p: Point, slack: f64) -> Option<usize> {
		self.nodes
			.iter()
			.rev()
			.find(|n| n.center.distance(p) <= n.radius + slack)
			.map(|n| n.index)
	}

	/// Mark for the node at `index`.
	pub fn node(&self, index: usize) -> Option<&NodeMark> {
		self.nodes.iter().find(|n| n.index == index)
	}
}

/// A layout engine instance bound to one graph and one container size.
pub trait Layout {
	/// Geometry for the current state.
	fn scene(&self) -> Scene;

	/// Advance one animation step. Returns `false` once nothing moves.
	fn step(&mut self) -> bool {
		false
	}

	/// The underlying simulation, for engines that support node dragging.
	fn simulation_mut(&mut self) -> Option<&mut ForceSimulation> {
		None
	}
}

/// Start the engine for `kind` from scratch.
pub fn build_layout(
	kind: VisualizationType,
	graph: RepoGraph,
	width: f64,
	height: f64,
) -> Box<dyn Layout> {
	match kind {
		VisualizationType::Network => Box::new(ForceSimulation::new(
			graph,
			width,
			height,
			ForceConfig::default(),
		)),
		VisualizationType::Hierarchical => Box::new(BundleLayout::new(
			graph,
			width,
			height,
			BundleConfig::default(),
		)),
		VisualizationType::Arc => {
			Box::new(ArcLayout::new(graph, width, height, ArcConfig::default()))
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::placeholder_graph;

	#[test]
	fn every_engine_draws_every_node() {
		for kind in VisualizationType::ALL {
			let layout = build_layout(kind, placeholder_graph("demo"), 800.0, 600.0);
			let scene = layout.scene();
			assert_eq!(scene.nodes.len(), 9, "{kind}");
			assert_eq!(scene.edges.len(), 8, "{kind}");
		}
	}

	#[test]
	fn only_network_is_draggable() {
		for kind in VisualizationType::ALL {
			let mut layout = build_layout(kind, placeholder_graph("demo"), 800.0, 600.0);
			assert_eq!(
				layout.simulation_mut().is_some(),
				kind == VisualizationType::Network
			);
		}
	}

	#[test]
	fn hit_testing_prefers_topmost() {
		let graph = placeholder_graph("demo");
		let layout = build_layout(VisualizationType::Arc, graph, 800.0, 600.0);
		let scene = layout.scene();
		let target = &scene.nodes[3];
		assert_eq!(scene.node_at(target.center, 0.0), Some(target.index));
		assert_eq!(scene.node_at(Point::new(-500.0, -500.0), 4.0), None);
	}
}
