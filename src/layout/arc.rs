//! Arc diagram: nodes on one horizontal line, edges as arcs above it.

use std::collections::HashMap;

use super::path::{Path, Point};
use super::{EdgeMark, LabelMark, Layout, NodeMark, Scene, TextAlign};
use crate::graph::RepoGraph;

/// Layout tuning.
#[derive(Clone, Debug, PartialEq)]
pub struct ArcConfig {
	/// Free space at both ends of the axis.
	pub padding: f64,
	/// Arc height as a fraction of the horizontal span.
	pub height_ratio: f64,
	/// Drawn circle radius.
	pub node_radius: f64,
	/// Distance from the axis down to the labels.
	pub label_gap: f64,
}

impl Default for ArcConfig {
	fn default() -> Self {
		Self {
			padding: 20.0,
			height_ratio: 0.3,
			node_radius: 6.0,
			label_gap: 20.0,
		}
	}
}

/// Arc layout of one graph.
pub struct ArcLayout {
	graph: RepoGraph,
	positions: Vec<Point>,
	edges: Vec<EdgeMark>,
	config: ArcConfig,
}

impl ArcLayout {
	/// Place nodes left to right in graph order on the vertical middle.
	pub fn new(graph: RepoGraph, width: f64, height: f64, config: ArcConfig) -> Self {
		let n = graph.nodes.len();
		let step = (width - 2.0 * config.padding) / n.saturating_sub(1).max(1) as f64;
		let positions: Vec<Point> = (0..n)
			.map(|i| Point::new(config.padding + i as f64 * step, height / 2.0))
			.collect();

		let slots: HashMap<&str, usize> = graph
			.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| (node.id.as_str(), i))
			.collect();
		let edges = graph
			.edges
			.iter()
			.filter_map(|edge| {
				let from = positions[*slots.get(edge.source.id.as_str())?];
				let to = positions[*slots.get(edge.target.id.as_str())?];
				Some(EdgeMark {
					path: arc_path(from, to, config.height_ratio),
					width: edge.thickness(),
					opacity: 0.4,
				})
			})
			.collect();

		Self {
			graph,
			positions,
			edges,
			config,
		}
	}

	/// Axis positions in graph order.
	#[cfg(test)]
	pub(crate) fn positions(&self) -> &[Point] {
		&self.positions
	}
}

/// Quadratic arc from `from` to `to`, its control point above the midpoint
/// by `ratio` times the horizontal distance.
pub fn arc_path(from: Point, to: Point, ratio: f64) -> Path {
	let lift = (to.x - from.x).abs() * ratio;
	let mut path = Path::new();
	path.move_to(from);
	path.quad_to(Point::new((from.x + to.x) / 2.0, from.y - lift), to);
	path
}

impl Layout for ArcLayout {
	fn scene(&self) -> Scene {
		Scene {
			edges: self.edges.clone(),
			nodes: self
				.graph
				.nodes
				.iter()
				.zip(&self.positions)
				.enumerate()
				.map(|(i, (node, &center))| {
					let label = LabelMark {
						text: node.name.clone(),
						offset: Point::new(0.0, self.config.label_gap),
						rotation: 0.0,
						align: TextAlign::Center,
					};
					NodeMark::new(i, node, center, self.config.node_radius, label)
				})
				.collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::NodeType;
	use crate::layout::path::PathCommand;

	fn line_graph(n: usize) -> RepoGraph {
		let mut graph = RepoGraph::new("line");
		for i in 0..n {
			graph.add_node(i.to_string(), format!("n{i}"), NodeType::Function);
		}
		graph
	}

	#[test]
	fn nodes_are_evenly_spaced_inside_padding() {
		let layout = ArcLayout::new(line_graph(3), 240.0, 100.0, ArcConfig::default());
		let xs: Vec<f64> = layout.positions().iter().map(|p| p.x).collect();
		assert_eq!(xs, vec![20.0, 120.0, 220.0]);
		assert!(layout.positions().iter().all(|p| p.y == 50.0));
	}

	#[test]
	fn single_node_does_not_divide_by_zero() {
		let layout = ArcLayout::new(line_graph(1), 240.0, 100.0, ArcConfig::default());
		assert_eq!(layout.positions(), &[Point::new(20.0, 50.0)]);
	}

	#[test]
	fn arc_height_grows_with_span() {
		let mut graph = line_graph(4);
		graph.connect("0", "1", 1.0);
		graph.connect("0", "3", 4.0);
		let layout = ArcLayout::new(graph, 340.0, 200.0, ArcConfig::default());
		let scene = layout.scene();

		let lift = |edge: &EdgeMark| match edge.path.commands()[1] {
			PathCommand::QuadTo { ctrl, .. } => 100.0 - ctrl.y,
			other => panic!("expected a quadratic arc, got {other:?}"),
		};
		assert!((lift(&scene.edges[0]) - 30.0).abs() < 1e-9);
		assert!((lift(&scene.edges[1]) - 90.0).abs() < 1e-9);
		assert_eq!(scene.edges[1].width, 2.0);
		let PathCommand::QuadTo { ctrl, to } = scene.edges[1].path.commands()[1] else {
			unreachable!();
		};
		assert_eq!(ctrl.x, 170.0);
		assert_eq!(to, Point::new(320.0, 100.0));
	}

	#[test]
	fn labels_sit_below_the_axis() {
		let layout = ArcLayout::new(line_graph(2), 200.0, 100.0, ArcConfig::default());
		let scene = layout.scene();
		assert_eq!(scene.nodes[1].label.offset, Point::new(0.0, 20.0));
		assert_eq!(scene.nodes[1].label.align, TextAlign::Center);
	}
}
