//! Radial hierarchical edge bundling. Leaves of a [`Hierarchy`] sit on a
//! circle and every edge is routed through the leaves' common ancestors.

use std::collections::HashMap;

use log::debug;

use super::path::{Path, Point};
use super::{EdgeMark, LabelMark, Layout, NodeMark, Scene, TextAlign};
use crate::graph::RepoGraph;

/// Layout tuning.
#[derive(Clone, Debug, PartialEq)]
pub struct BundleConfig {
	/// Distance kept free between the leaf circle and the container edge.
	pub inner_margin: f64,
	/// Bundling strength, 0 straight to 1 fully routed.
	pub beta: f64,
	/// Drawn circle radius.
	pub node_radius: f64,
	/// Gap between a leaf and its label.
	pub label_gap: f64,
}

impl Default for BundleConfig {
	fn default() -> Self {
		Self {
			inner_margin: 120.0,
			beta: 0.85,
			node_radius: 5.0,
			label_gap: 8.0,
		}
	}
}

/// Grouping of graph nodes. Leaves hold the node's position in the graph.
#[derive(Clone, Debug, PartialEq)]
pub enum Hierarchy {
	/// A graph node.
	Leaf(usize),
	/// A group of subtrees.
	Group(Vec<Hierarchy>),
}

impl Hierarchy {
	/// One root whose children are the first `count` nodes.
	pub fn flat(count: usize) -> Self {
		Hierarchy::Group((0..count).map(Hierarchy::Leaf).collect())
	}

	/// Leaf indices, left to right.
	pub fn leaves(&self) -> Vec<usize> {
		let mut out = Vec::new();
		self.collect_leaves(&mut out);
		out
	}

	fn collect_leaves(&self, out: &mut Vec<usize>) {
		match self {
			Hierarchy::Leaf(i) => out.push(*i),
			Hierarchy::Group(children) => children.iter().for_each(|c| c.collect_leaves(out)),
		}
	}
}

/// Flattened hierarchy node with cluster coordinates: `x` in degrees, `y`
/// as distance from the centre.
#[derive(Clone, Debug)]
struct ClusterNode {
	parent: Option<usize>,
	children: Vec<usize>,
	leaf: Option<usize>,
	x: f64,
	y: f64,
}

/// Cluster (dendrogram) layout: every leaf at the same depth, evenly spread
/// over `[0, span)` with double spacing between leaves of different parents;
/// inner nodes at the mean of their children.
struct Cluster {
	nodes: Vec<ClusterNode>,
}

impl Cluster {
	fn layout(tree: &Hierarchy, span: f64, radius: f64) -> Self {
		let mut cluster = Cluster { nodes: Vec::new() };
		cluster.insert(tree, None);

		let mut previous: Option<usize> = None;
		let mut cursor = 0.0;
		let (mut first, mut last) = (None, None);
		for id in cluster.preorder_leaves() {
			if let Some(prev) = previous {
				cursor += cluster.separation(prev, id);
			}
			cluster.nodes[id].x = cursor;
			cluster.nodes[id].y = 0.0;
			previous = Some(id);
			first.get_or_insert(id);
			last = Some(id);
		}
		// Children are always inserted after their parent, so a reverse walk
		// visits every child before its parent.
		for id in (0..cluster.nodes.len()).rev() {
			let children = &cluster.nodes[id].children;
			if children.is_empty() {
				continue;
			}
			let n = children.len() as f64;
			let x = children.iter().map(|&c| cluster.nodes[c].x).sum::<f64>() / n;
			let y = 1.0 + children.iter().map(|&c| cluster.nodes[c].y).fold(0.0, f64::max);
			cluster.nodes[id].x = x;
			cluster.nodes[id].y = y;
		}

		let (Some(first), Some(last)) = (first, last) else {
			return cluster;
		};
		let x0 = cluster.nodes[first].x - cluster.separation(first, last) / 2.0;
		let x1 = cluster.nodes[last].x + cluster.separation(last, first) / 2.0;
		let depth = cluster.nodes[0].y;
		for node in &mut cluster.nodes {
			node.x = (node.x - x0) / (x1 - x0) * span;
			node.y = (1.0 - if depth > 0.0 { node.y / depth } else { 1.0 }) * radius;
		}
		cluster
	}

	fn insert(&mut self, tree: &Hierarchy, parent: Option<usize>) -> usize {
		let id = self.nodes.len();
		self.nodes.push(ClusterNode {
			parent,
			children: Vec::new(),
			leaf: None,
			x: 0.0,
			y: 0.0,
		});
		match tree {
			Hierarchy::Leaf(i) => self.nodes[id].leaf = Some(*i),
			Hierarchy::Group(children) => {
				for child in children {
					let c = self.insert(child, Some(id));
					self.nodes[id].children.push(c);
				}
			}
		}
		id
	}

	fn preorder_leaves(&self) -> Vec<usize> {
		let mut out = Vec::new();
		let mut stack = vec![0];
		while let Some(id) = stack.pop() {
			let node = &self.nodes[id];
			if node.leaf.is_some() {
				out.push(id);
			}
			stack.extend(node.children.iter().rev());
		}
		out
	}

	fn separation(&self, a: usize, b: usize) -> f64 {
		if self.nodes[a].parent == self.nodes[b].parent { 1.0 } else { 2.0 }
	}

	/// Cluster nodes from `from` up through the lowest common ancestor and
	/// down to `to`.
	fn route(&self, from: usize, to: usize) -> Vec<usize> {
		let ancestors = |mut id: usize| {
			let mut chain = vec![id];
			while let Some(p) = self.nodes[id].parent {
				chain.push(p);
				id = p;
			}
			chain
		};
		let (up, down) = (ancestors(from), ancestors(to));
		let Some(meet) = up.iter().position(|a| down.contains(a)) else {
			return Vec::new();
		};
		let common = up[meet];
		let mut route = up[..=meet].to_vec();
		let tail = down.iter().position(|&d| d == common).unwrap_or(down.len());
		route.extend(down[..tail].iter().rev());
		route
	}
}

#[derive(Clone, Copy, Debug)]
struct Placement {
	angle: f64,
	point: Point,
}

/// Bundled layout of one graph.
pub struct BundleLayout {
	graph: RepoGraph,
	placements: Vec<Option<Placement>>,
	edges: Vec<EdgeMark>,
	config: BundleConfig,
}

impl BundleLayout {
	/// Lay `graph` out on a flat one-level hierarchy.
	pub fn new(graph: RepoGraph, width: f64, height: f64, config: BundleConfig) -> Self {
		let tree = Hierarchy::flat(graph.nodes.len());
		Self::with_hierarchy(graph, &tree, width, height, config)
	}

	/// Lay `graph` out along an explicit grouping. Nodes missing from `tree`
	/// are not drawn and edges touching them are dropped.
	pub fn with_hierarchy(
		graph: RepoGraph,
		tree: &Hierarchy,
		width: f64,
		height: f64,
		config: BundleConfig,
	) -> Self {
		let center = Point::new(width / 2.0, height / 2.0);
		let radius = (width.min(height) / 2.0 - config.inner_margin).max(0.0);
		let cluster = Cluster::layout(tree, 360.0, radius);
		let to_point = |id: usize| {
			let n = &cluster.nodes[id];
			center.polar(n.x, n.y)
		};

		let mut placements = vec![None; graph.nodes.len()];
		let mut slot_of_leaf = HashMap::new();
		for (id, node) in cluster.nodes.iter().enumerate() {
			if let Some(leaf) = node.leaf.filter(|&l| l < graph.nodes.len()) {
				placements[leaf] = Some(Placement {
					angle: node.x,
					point: to_point(id),
				});
				slot_of_leaf.insert(graph.nodes[leaf].id.as_str(), id);
			}
		}

		let outgoing = graph.outgoing_by_node();
		let mut edges = Vec::new();
		for leaf in tree.leaves() {
			let (Some(source), Some(leaving)) = (graph.nodes.get(leaf), outgoing.get(leaf)) else {
				continue;
			};
			let Some(&from) = slot_of_leaf.get(source.id.as_str()) else {
				continue;
			};
			for edge in leaving {
				let Some(&to) = slot_of_leaf.get(edge.target.id.as_str()) else {
					debug!("bundle: target {} not on the circle, skipped", edge.target.id);
					continue;
				};
				if from == to {
					continue;
				}
				let points: Vec<Point> = cluster.route(from, to).into_iter().map(to_point).collect();
				edges.push(EdgeMark {
					path: Path::bundle(&points, config.beta),
					width: edge.thickness(),
					opacity: 0.4,
				});
			}
		}

		Self {
			graph,
			placements,
			edges,
			config,
		}
	}

	/// Angle of the node at `index` in degrees, clockwise from twelve o'clock.
	#[cfg(test)]
	pub(crate) fn angle(&self, index: usize) -> Option<f64> {
		self.placements.get(index).copied().flatten().map(|p| p.angle)
	}

	/// Number of drawn edge paths.
	#[cfg(test)]
	pub(crate) fn path_count(&self) -> usize {
		self.edges.len()
	}

	fn label(&self, text: &str, angle: f64) -> LabelMark {
		let gap = self.config.label_gap;
		if angle < 180.0 {
			LabelMark {
				text: text.to_owned(),
				offset: Point::new(gap, 0.0),
				rotation: (angle - 90.0).to_radians(),
				align: TextAlign::Start,
			}
		} else {
			LabelMark {
				text: text.to_owned(),
				offset: Point::new(-gap, 0.0),
				rotation: (angle + 90.0).to_radians(),
				align: TextAlign::End,
			}
		}
	}
}

impl Layout for BundleLayout {
	fn scene(&self) -> Scene {
		Scene {
			edges: self.edges.clone(),
			nodes: self
				.graph
				.nodes
				.iter()
				.enumerate()
				.filter_map(|(i, node)| {
					let placed = self.placements[i]?;
					let label = self.label(&node.name, placed.angle);
					Some(NodeMark::new(
						i,
						node,
						placed.point,
						self.config.node_radius,
						label,
					))
				})
				.collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::time::{Duration, Instant};

	use super::*;
	use crate::graph::{NodeFilter, NodeType, compute_visible};
	use crate::layout::path::PathCommand;

	fn ring(n: usize) -> RepoGraph {
		let mut graph = RepoGraph::new("ring");
		for i in 0..n {
			graph.add_node(format!("n{i}"), format!("node{i}"), NodeType::File);
		}
		for i in 0..n {
			graph.connect(&format!("n{i}"), &format!("n{}", (i + 1) % n), 1.0);
		}
		graph
	}

	#[test]
	fn leaves_are_spread_evenly() {
		let layout = BundleLayout::new(ring(4), 600.0, 600.0, BundleConfig::default());
		let angles: Vec<f64> = (0..4).map(|i| layout.angle(i).unwrap()).collect();
		assert_eq!(angles, vec![45.0, 135.0, 225.0, 315.0]);

		let scene = layout.scene();
		for node in &scene.nodes {
			let r = node.center.distance(Point::new(300.0, 300.0));
			assert!((r - 180.0).abs() < 1e-9, "{r}");
		}
	}

	#[test]
	fn edges_bend_towards_the_centre() {
		let layout = BundleLayout::new(ring(2), 400.0, 400.0, BundleConfig::default());
		assert_eq!(layout.path_count(), 2);
		let scene = layout.scene();
		let (start, end) = (scene.nodes[0].center, scene.nodes[1].center);
		let edge = &scene.edges[0];
		assert_eq!(edge.path.commands()[0], PathCommand::MoveTo(start));
		assert_eq!(edge.path.end(), Some(end));
		// Leaves are diametrically opposite, so the routed curve passes
		// through the middle rather than away from it.
		let PathCommand::CubicTo { to, .. } = edge.path.commands()[2] else {
			panic!("expected a cubic segment");
		};
		assert!(to.distance(Point::new(200.0, 200.0)) < start.distance(Point::new(200.0, 200.0)));
	}

	#[test]
	fn edges_to_missing_leaves_are_dropped() {
		let mut graph = RepoGraph::new("mixed");
		graph.add_node("a", "a.rs", NodeType::File);
		graph.add_node("b", "b.rs", NodeType::File);
		graph.add_node("c", "C", NodeType::Class);
		graph.connect("a", "b", 1.0);
		graph.connect("a", "c", 1.0);
		graph.connect("c", "b", 1.0);

		let full = BundleLayout::new(graph.clone(), 500.0, 500.0, BundleConfig::default());
		assert_eq!(full.path_count(), 3);

		// Only two of the three nodes are placed on the circle.
		let tree = Hierarchy::Group(vec![Hierarchy::Leaf(0), Hierarchy::Leaf(1)]);
		let partial =
			BundleLayout::with_hierarchy(graph.clone(), &tree, 500.0, 500.0, BundleConfig::default());
		assert_eq!(partial.path_count(), 1);
		assert_eq!(partial.scene().nodes.len(), 2);

		let files = compute_visible(&graph, NodeFilter::Only(NodeType::File));
		let filtered = BundleLayout::new(files, 500.0, 500.0, BundleConfig::default());
		assert_eq!(filtered.path_count(), 1);
	}

	#[test]
	fn labels_stay_upright() {
		let layout = BundleLayout::new(ring(4), 600.0, 600.0, BundleConfig::default());
		let scene = layout.scene();
		let right = &scene.nodes[0].label;
		assert_eq!(right.align, TextAlign::Start);
		assert!(right.offset.x > 0.0);
		let left = &scene.nodes[2].label;
		assert_eq!(left.align, TextAlign::End);
		assert!(left.offset.x < 0.0);
		// 225° rotated by a further half turn reads left to right.
		assert!((left.rotation - 315f64.to_radians()).abs() < 1e-9);
	}

	#[test]
	fn nested_groups_route_through_ancestors() {
		let tree = Hierarchy::Group(vec![
			Hierarchy::Group(vec![Hierarchy::Leaf(0), Hierarchy::Leaf(1)]),
			Hierarchy::Group(vec![Hierarchy::Leaf(2), Hierarchy::Leaf(3)]),
		]);
		assert_eq!(tree.leaves(), vec![0, 1, 2, 3]);
		let cluster = Cluster::layout(&tree, 360.0, 100.0);
		let leaves = cluster.preorder_leaves();
		// Leaf 0 to leaf 2 climbs to the root and back down.
		assert_eq!(cluster.route(leaves[0], leaves[2]).len(), 5);
		// Siblings meet at their own group.
		assert_eq!(cluster.route(leaves[0], leaves[1]).len(), 3);
		// Gaps of 1, 2, 1 between leaves plus half a cross-group gap at
		// either end spread the circle into sixths.
		let xs: Vec<f64> = leaves.iter().map(|&l| cluster.nodes[l].x).collect();
		for (x, want) in xs.iter().zip([60.0, 120.0, 240.0, 300.0]) {
			assert!((x - want).abs() < 1e-9, "{xs:?}");
		}
	}

	#[test]
	fn large_graphs_lay_out_quickly() {
		let n = 20_000;
		let mut graph = ring(n);
		for i in 0..n {
			graph.connect(&format!("n{i}"), &format!("n{}", (i * 7 + 3) % n), 1.0);
		}
		let started = Instant::now();
		let layout = BundleLayout::new(graph, 800.0, 800.0, BundleConfig::default());
		// Self-loops from the second pass are skipped.
		let loops = (0..n).filter(|&i| (i * 7 + 3) % n == i).count();
		assert_eq!(layout.path_count(), 2 * n - loops);
		assert!(started.elapsed() < Duration::from_secs(5), "{:?}", started.elapsed());
	}

	#[test]
	fn empty_graph_draws_nothing() {
		let layout = BundleLayout::new(RepoGraph::new("empty"), 300.0, 300.0, BundleConfig::default());
		assert!(layout.scene().nodes.is_empty());
		assert_eq!(layout.path_count(), 0);
	}
}
