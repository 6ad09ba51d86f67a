use log::{debug, info};

use crate::graph::{NodeFilter, RepoGraph, compute_visible};
use crate::layout::path::Point;
use crate::layout::{Layout, Scene, VisualizationType, build_layout};

/// Extra pick radius around node circles, in graph units.
pub const HIT_SLACK: f64 = 4.0;

#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<usize>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// One rendering session: a layout engine bound to the filtered graph, plus
/// the pointer interaction around it. Rebuilt from scratch whenever the
/// graph, filter, visualization type or container size changes.
pub struct GraphViewState {
	layout: Box<dyn Layout>,
	pub scene: Scene,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub hover: Option<usize>,
	pub width: f64,
	pub height: f64,
}

impl GraphViewState {
	pub fn new(
		graph: &RepoGraph,
		filter: NodeFilter,
		kind: VisualizationType,
		width: f64,
		height: f64,
	) -> Self {
		let visible = compute_visible(graph, filter);
		info!(
			"laying out {:?} as {kind} ({filter}): {} of {} nodes, {}x{}",
			graph.name,
			visible.nodes.len(),
			graph.nodes.len(),
			width,
			height
		);
		let layout = build_layout(kind, visible, width, height);
		let scene = layout.scene();
		Self {
			layout,
			scene,
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			hover: None,
			width,
			height,
		}
	}

	/// Start a session for the current inputs, or `None` when there is
	/// nothing to lay out yet: no graph, or a container without area.
	pub fn session(
		graph: Option<&RepoGraph>,
		filter: NodeFilter,
		kind: VisualizationType,
		width: f64,
		height: f64,
	) -> Option<Self> {
		let Some(graph) = graph else {
			debug!("no graph loaded, nothing to lay out");
			return None;
		};
		if width <= 0.0 || height <= 0.0 {
			debug!("container has no size yet ({width}x{height})");
			return None;
		}
		Some(Self::new(graph, filter, kind, width, height))
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Point {
		Point::new(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		self.scene.node_at(self.screen_to_graph(sx, sy), HIT_SLACK)
	}

	/// Advance the layout one frame. Returns whether anything moved.
	pub fn tick(&mut self) -> bool {
		if self.layout.step() {
			self.scene = self.layout.scene();
			true
		} else {
			false
		}
	}

	/// Pointer pressed at screen position `(x, y)`: grab a node when the
	/// engine supports dragging and one is under the pointer, else start
	/// panning.
	pub fn pointer_down(&mut self, x: f64, y: f64) {
		let hit = self.node_at_position(x, y);
		if let (Some(idx), Some(sim)) = (hit, self.layout.simulation_mut()) {
			let Some(start) = sim.position(idx) else {
				return;
			};
			sim.drag_start(idx);
			self.drag = DragState {
				active: true,
				node_idx: Some(idx),
				start_x: x,
				start_y: y,
				node_start_x: start.x,
				node_start_y: start.y,
			};
		} else {
			self.pan = PanState {
				active: true,
				start_x: x,
				start_y: y,
				transform_start_x: self.transform.x,
				transform_start_y: self.transform.y,
			};
		}
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		if !self.drag.active {
			self.hover = self.node_at_position(x, y);
		}

		if self.drag.active {
			let Some(idx) = self.drag.node_idx else {
				return;
			};
			let (dx, dy) = (
				(x - self.drag.start_x) / self.transform.k,
				(y - self.drag.start_y) / self.transform.k,
			);
			let (nx, ny) = (self.drag.node_start_x + dx, self.drag.node_start_y + dy);
			if let Some(sim) = self.layout.simulation_mut() {
				sim.drag_move(idx, nx, ny);
			}
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		}
	}

	/// Pointer released or left the surface: drop whatever is held.
	pub fn pointer_up(&mut self) {
		if let Some(idx) = self.drag.node_idx.take() {
			if let Some(sim) = self.layout.simulation_mut() {
				sim.drag_end(idx);
			}
		}
		self.drag.active = false;
		self.pan.active = false;
	}

	pub fn pointer_leave(&mut self) {
		self.pointer_up();
		self.hover = None;
	}

	/// Zoom about the pointer.
	pub fn zoom(&mut self, x: f64, y: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{NodeType, placeholder_graph};

	fn network() -> GraphViewState {
		GraphViewState::new(
			&placeholder_graph("demo"),
			NodeFilter::All,
			VisualizationType::Network,
			800.0,
			600.0,
		)
	}

	#[test]
	fn filter_is_applied_before_layout() {
		let state = GraphViewState::new(
			&placeholder_graph("demo"),
			NodeFilter::Only(NodeType::File),
			VisualizationType::Arc,
			800.0,
			600.0,
		);
		assert_eq!(state.scene.nodes.len(), 3);
	}

	#[test]
	fn dragging_a_node_moves_it_with_the_pointer() {
		let mut state = network();
		let node = state.scene.nodes[2].center;
		state.pointer_down(node.x, node.y);
		assert!(state.drag.active);
		state.pointer_move(node.x + 30.0, node.y - 10.0);
		state.tick();
		let moved = state.scene.node(2).unwrap().center;
		assert!(moved.distance(Point::new(node.x + 30.0, node.y - 10.0)) < 1e-9);
		state.pointer_up();
		assert!(!state.drag.active);
		assert_eq!(state.drag.node_idx, None);
	}

	#[test]
	fn background_drag_pans() {
		let mut state = network();
		state.pointer_down(-1000.0, -1000.0);
		assert!(state.pan.active && !state.drag.active);
		state.pointer_move(-990.0, -995.0);
		assert_eq!((state.transform.x, state.transform.y), (10.0, 5.0));
		state.pointer_leave();
		assert!(!state.pan.active);
	}

	#[test]
	fn nodes_in_static_layouts_pan_instead_of_drag() {
		let mut state = GraphViewState::new(
			&placeholder_graph("demo"),
			NodeFilter::All,
			VisualizationType::Hierarchical,
			800.0,
			600.0,
		);
		let node = state.scene.nodes[0].center;
		state.pointer_down(node.x, node.y);
		assert!(state.pan.active && !state.drag.active);
		assert!(!state.tick());
	}

	#[test]
	fn no_session_without_graph_or_area() {
		let graph = placeholder_graph("demo");
		let kind = VisualizationType::Network;
		assert!(GraphViewState::session(None, NodeFilter::All, kind, 800.0, 600.0).is_none());
		assert!(GraphViewState::session(Some(&graph), NodeFilter::All, kind, 0.0, 600.0).is_none());
		assert!(GraphViewState::session(Some(&graph), NodeFilter::All, kind, 800.0, 0.0).is_none());
		assert!(GraphViewState::session(Some(&graph), NodeFilter::All, kind, 800.0, 600.0).is_some());
	}

	#[test]
	fn new_inputs_start_from_scratch() {
		let graph = placeholder_graph("demo");
		let mut first =
			GraphViewState::session(Some(&graph), NodeFilter::All, VisualizationType::Network, 800.0, 600.0)
				.unwrap();
		while first.tick() {}
		first.zoom(10.0, 10.0, -1.0);
		let cooled = first.layout.simulation_mut().unwrap().alpha();
		assert!(cooled < 0.001);

		// Different filter: fresh, hot simulation over the smaller graph.
		let mut filtered = GraphViewState::session(
			Some(&graph),
			NodeFilter::Only(NodeType::Class),
			VisualizationType::Network,
			800.0,
			600.0,
		)
		.unwrap();
		assert_eq!(filtered.scene.nodes.len(), 2);
		assert_eq!(filtered.layout.simulation_mut().unwrap().alpha(), 1.0);
		assert_eq!(filtered.transform.k, 1.0);

		// Different type: another engine, same nodes.
		let mut arc =
			GraphViewState::session(Some(&graph), NodeFilter::All, VisualizationType::Arc, 800.0, 600.0)
				.unwrap();
		assert!(arc.layout.simulation_mut().is_none());
		assert_eq!(arc.scene.nodes.len(), 9);
		assert_ne!(arc.scene, first.scene);
	}

	#[test]
	fn zoom_keeps_pointer_fixed() {
		let mut state = network();
		let before = state.screen_to_graph(200.0, 100.0);
		state.zoom(200.0, 100.0, -1.0);
		assert!((state.transform.k - 1.1).abs() < 1e-12);
		let after = state.screen_to_graph(200.0, 100.0);
		assert!(before.distance(after) < 1e-9);
	}
}
