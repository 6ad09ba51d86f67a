//! Force-directed layout: velocity-integrated simulation with a decaying
//! energy (`alpha`), edge springs, many-body repulsion and centring.

use std::collections::HashMap;
use std::f64::consts::PI;

use log::{debug, warn};

use super::path::{Path, Point};
use super::{EdgeMark, LabelMark, Layout, NodeMark, Scene, TextAlign};
use crate::graph::RepoGraph;

/// Simulation tuning.
#[derive(Clone, Debug, PartialEq)]
pub struct ForceConfig {
	/// Many-body strength; negative repels.
	pub charge_strength: f64,
	/// Spring rest length.
	pub link_distance: f64,
	/// Squared distance below which repulsion stops growing.
	pub distance_min2: f64,
	/// Fraction of the centroid offset removed per tick.
	pub center_strength: f64,
	/// Energy below which the simulation stops.
	pub alpha_min: f64,
	/// Per-tick approach rate of `alpha` towards its target.
	pub alpha_decay: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,
	/// Energy target held while a node is dragged.
	pub drag_alpha_target: f64,
	/// Drawn circle radius.
	pub node_radius: f64,
}

impl Default for ForceConfig {
	fn default() -> Self {
		let alpha_min = 0.001;
		Self {
			charge_strength: -300.0,
			link_distance: 100.0,
			distance_min2: 1.0,
			center_strength: 1.0,
			alpha_min,
			alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
			velocity_decay: 0.4,
			drag_alpha_target: 0.3,
			node_radius: 8.0,
		}
	}
}

/// Per-node scratch state, indexed by the node's position in the graph.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeState {
	/// Position.
	pub x: f64,
	/// Position.
	pub y: f64,
	/// Velocity.
	pub vx: f64,
	/// Velocity.
	pub vy: f64,
	/// Pinned x, set while dragged.
	pub fx: Option<f64>,
	/// Pinned y, set while dragged.
	pub fy: Option<f64>,
}

#[derive(Clone, Copy, Debug)]
struct Spring {
	source: usize,
	target: usize,
	strength: f64,
	bias: f64,
	width: f64,
}

/// Linear congruential source for the tiny displacement that separates
/// coincident nodes.
#[derive(Clone, Debug)]
struct Jiggle(u64);

impl Jiggle {
	fn next(&mut self) -> f64 {
		const A: u64 = 1_664_525;
		const C: u64 = 1_013_904_223;
		const M: u64 = 1 << 32;
		self.0 = (A * self.0 + C) % M;
		(self.0 as f64 / M as f64 - 0.5) * 1e-6
	}
}

/// A running simulation over one graph.
pub struct ForceSimulation {
	graph: RepoGraph,
	nodes: Vec<NodeState>,
	springs: Vec<Spring>,
	center: Point,
	alpha: f64,
	alpha_target: f64,
	running: bool,
	config: ForceConfig,
	jiggle: Jiggle,
}

impl ForceSimulation {
	/// Seed positions on a spiral around the container centre and wire up
	/// one spring per edge. Edges naming nodes outside `graph` are dropped.
	pub fn new(graph: RepoGraph, width: f64, height: f64, config: ForceConfig) -> Self {
		let center = Point::new(width / 2.0, height / 2.0);
		let spiral = PI * (3.0 - 5f64.sqrt());
		let nodes: Vec<NodeState> = (0..graph.nodes.len())
			.map(|i| {
				let (radius, angle) = (10.0 * (0.5 + i as f64).sqrt(), i as f64 * spiral);
				NodeState {
					x: center.x + radius * angle.cos(),
					y: center.y + radius * angle.sin(),
					..NodeState::default()
				}
			})
			.collect();

		let slots: HashMap<&str, usize> = graph
			.nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.id.as_str(), i))
			.collect();
		let mut ends = Vec::new();
		for edge in &graph.edges {
			match (slots.get(edge.source.id.as_str()), slots.get(edge.target.id.as_str())) {
				(Some(&s), Some(&t)) if s != t => ends.push((s, t, edge.thickness())),
				(Some(_), Some(_)) => debug!("skipping self-loop on {}", edge.source.id),
				_ => warn!(
					"edge {} -> {} references a node outside the layout",
					edge.source.id, edge.target.id
				),
			}
		}
		let mut degree = vec![0usize; nodes.len()];
		for &(s, t, _) in &ends {
			degree[s] += 1;
			degree[t] += 1;
		}
		let springs = ends
			.into_iter()
			.map(|(source, target, width)| {
				let (ds, dt) = (degree[source] as f64, degree[target] as f64);
				Spring {
					source,
					target,
					strength: 1.0 / ds.min(dt),
					bias: ds / (ds + dt),
					width,
				}
			})
			.collect();

		debug!(
			"force layout for {} nodes centred at ({}, {})",
			nodes.len(),
			center.x,
			center.y
		);
		Self {
			graph,
			nodes,
			springs,
			center,
			alpha: 1.0,
			alpha_target: 0.0,
			running: true,
			config,
			jiggle: Jiggle(1),
		}
	}

	/// Current energy.
	#[cfg(test)]
	pub(crate) fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Whether the simulation has cooled down and stopped.
	#[cfg(test)]
	pub(crate) fn is_settled(&self) -> bool {
		!self.running
	}

	/// State of the node at `index`.
	#[cfg(test)]
	pub(crate) fn node(&self, index: usize) -> Option<&NodeState> {
		self.nodes.get(index)
	}

	/// Position of the node at `index`.
	pub fn position(&self, index: usize) -> Option<Point> {
		self.nodes.get(index).map(|n| Point::new(n.x, n.y))
	}

	/// Resume ticking after the simulation stopped.
	pub fn restart(&mut self) {
		self.running = true;
	}

	/// Hold the node at `index` at `(x, y)`.
	pub fn pin(&mut self, index: usize, x: f64, y: f64) {
		if let Some(node) = self.nodes.get_mut(index) {
			node.fx = Some(x);
			node.fy = Some(y);
		}
	}

	/// Release the node at `index`.
	pub fn unpin(&mut self, index: usize) {
		if let Some(node) = self.nodes.get_mut(index) {
			node.fx = None;
			node.fy = None;
		}
	}

	/// Reheat and pin the grabbed node where it currently is.
	pub fn drag_start(&mut self, index: usize) {
		let Some(&NodeState { x, y, .. }) = self.nodes.get(index) else {
			return;
		};
		self.alpha_target = self.config.drag_alpha_target;
		self.restart();
		self.pin(index, x, y);
	}

	/// Move the pin of a grabbed node.
	pub fn drag_move(&mut self, index: usize, x: f64, y: f64) {
		self.pin(index, x, y);
	}

	/// Let the node go and let the energy decay again. The node keeps its
	/// current position; physics takes over from there.
	pub fn drag_end(&mut self, index: usize) {
		self.alpha_target = 0.0;
		self.unpin(index);
	}

	/// Advance exactly one step, regardless of whether the simulation stopped.
	pub fn tick(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		let alpha = self.alpha;

		self.apply_springs(alpha);
		self.apply_charge(alpha);
		self.apply_centering();

		let keep = 1.0 - self.config.velocity_decay;
		for node in &mut self.nodes {
			match node.fx {
				Some(fx) => {
					node.x = fx;
					node.vx = 0.0;
				}
				None => {
					node.vx *= keep;
					node.x += node.vx;
				}
			}
			match node.fy {
				Some(fy) => {
					node.y = fy;
					node.vy = 0.0;
				}
				None => {
					node.vy *= keep;
					node.y += node.vy;
				}
			}
		}
	}

	fn jiggle_if_zero(&mut self, d: f64) -> f64 {
		if d == 0.0 { self.jiggle.next() } else { d }
	}

	fn apply_springs(&mut self, alpha: f64) {
		for i in 0..self.springs.len() {
			let spring = self.springs[i];
			let (src, tgt) = (self.nodes[spring.source], self.nodes[spring.target]);
			let mut dx = self.jiggle_if_zero(tgt.x + tgt.vx - src.x - src.vx);
			let mut dy = self.jiggle_if_zero(tgt.y + tgt.vy - src.y - src.vy);
			let len = dx.hypot(dy);
			let l = (len - self.config.link_distance) / len * alpha * spring.strength;
			dx *= l;
			dy *= l;

			let target = &mut self.nodes[spring.target];
			target.vx -= dx * spring.bias;
			target.vy -= dy * spring.bias;
			let source = &mut self.nodes[spring.source];
			source.vx += dx * (1.0 - spring.bias);
			source.vy += dy * (1.0 - spring.bias);
		}
	}

	fn apply_charge(&mut self, alpha: f64) {
		let n = self.nodes.len();
		let strength = self.config.charge_strength * alpha;
		for i in 0..n {
			let (mut ax, mut ay) = (0.0, 0.0);
			for j in 0..n {
				if i == j {
					continue;
				}
				let dx = self.jiggle_if_zero(self.nodes[j].x - self.nodes[i].x);
				let dy = self.jiggle_if_zero(self.nodes[j].y - self.nodes[i].y);
				let mut l = dx * dx + dy * dy;
				if l < self.config.distance_min2 {
					l = (self.config.distance_min2 * l).sqrt();
				}
				let w = strength / l;
				ax += dx * w;
				ay += dy * w;
			}
			self.nodes[i].vx += ax;
			self.nodes[i].vy += ay;
		}
	}

	fn apply_centering(&mut self) {
		if self.nodes.is_empty() {
			return;
		}
		let n = self.nodes.len() as f64;
		let (sx, sy) = self
			.nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let strength = self.config.center_strength;
		let (sx, sy) = ((sx / n - self.center.x) * strength, (sy / n - self.center.y) * strength);
		for node in &mut self.nodes {
			node.x -= sx;
			node.y -= sy;
		}
	}
}

impl Layout for ForceSimulation {
	fn scene(&self) -> Scene {
		let at = |i: usize| Point::new(self.nodes[i].x, self.nodes[i].y);
		Scene {
			edges: self
				.springs
				.iter()
				.map(|s| EdgeMark {
					path: Path::line(at(s.source), at(s.target)),
					width: s.width,
					opacity: 0.6,
				})
				.collect(),
			nodes: self
				.graph
				.nodes
				.iter()
				.enumerate()
				.map(|(i, node)| {
					let label = LabelMark {
						text: node.name.clone(),
						offset: Point::new(self.config.node_radius + 4.0, 0.0),
						rotation: 0.0,
						align: TextAlign::Start,
					};
					NodeMark::new(i, node, at(i), self.config.node_radius, label)
				})
				.collect(),
		}
	}

	fn step(&mut self) -> bool {
		if !self.running {
			return false;
		}
		self.tick();
		if self.alpha < self.config.alpha_min {
			debug!("force layout settled");
			self.running = false;
		}
		true
	}

	fn simulation_mut(&mut self) -> Option<&mut ForceSimulation> {
		Some(self)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::NodeType;

	fn chain(ids: &[&str]) -> RepoGraph {
		let mut graph = RepoGraph::new("chain");
		for id in ids {
			graph.add_node(*id, *id, NodeType::Module);
		}
		for pair in ids.windows(2) {
			graph.connect(pair[0], pair[1], 1.0);
		}
		graph
	}

	fn separation(sim: &ForceSimulation) -> f64 {
		sim.position(0).unwrap().distance(sim.position(1).unwrap())
	}

	fn run_to_rest(sim: &mut ForceSimulation) -> usize {
		let mut ticks = 0;
		while sim.step() {
			ticks += 1;
			assert!(ticks < 10_000, "simulation never settled");
		}
		ticks
	}

	#[test]
	fn spring_converges_to_rest_length() {
		let config = ForceConfig {
			charge_strength: 0.0,
			..ForceConfig::default()
		};
		let mut sim = ForceSimulation::new(chain(&["a", "b"]), 800.0, 600.0, config);
		sim.pin(0, 0.0, 0.0);
		sim.pin(1, 400.0, 300.0);
		sim.tick();
		sim.unpin(0);
		sim.unpin(1);

		run_to_rest(&mut sim);
		assert!((separation(&sim) - 100.0).abs() < 0.5, "{}", separation(&sim));
	}

	#[test]
	fn repulsion_keeps_pair_near_rest_length() {
		let mut sim =
			ForceSimulation::new(chain(&["a", "b"]), 800.0, 600.0, ForceConfig::default());
		run_to_rest(&mut sim);
		// Charge pushes the equilibrium slightly past the rest length.
		let d = separation(&sim);
		assert!(d > 100.0 && d < 110.0, "{d}");
	}

	#[test]
	fn simulation_cools_down_and_stops() {
		let mut sim = ForceSimulation::new(
			chain(&["a", "b", "c", "d"]),
			400.0,
			400.0,
			ForceConfig::default(),
		);
		let ticks = run_to_rest(&mut sim);
		assert!(sim.is_settled());
		assert!(sim.alpha() < 0.001);
		assert!((250..350).contains(&ticks), "{ticks}");
		assert!(!sim.step());
	}

	#[test]
	fn single_node_sits_at_centre() {
		let mut sim = ForceSimulation::new(chain(&["solo"]), 300.0, 200.0, ForceConfig::default());
		sim.tick();
		let p = sim.position(0).unwrap();
		assert!((p.x - 150.0).abs() < 1e-9 && (p.y - 100.0).abs() < 1e-9);
	}

	#[test]
	fn edgeless_graph_still_spreads_out() {
		let mut graph = RepoGraph::new("loose");
		for id in ["a", "b", "c"] {
			graph.add_node(id, id, NodeType::File);
		}
		let mut sim = ForceSimulation::new(graph, 600.0, 600.0, ForceConfig::default());
		let before = separation(&sim);
		run_to_rest(&mut sim);
		assert!(separation(&sim) > before);

		let (sx, sy) = (0..3)
			.map(|i| sim.position(i).unwrap())
			.fold((0.0, 0.0), |(x, y), p| (x + p.x, y + p.y));
		assert!((sx / 3.0 - 300.0).abs() < 1e-6 && (sy / 3.0 - 300.0).abs() < 1e-6);
	}

	#[test]
	fn dragged_node_stays_pinned() {
		let mut sim = ForceSimulation::new(
			chain(&["a", "b", "c"]),
			500.0,
			500.0,
			ForceConfig::default(),
		);
		run_to_rest(&mut sim);

		sim.drag_start(1);
		assert!(!sim.is_settled());
		sim.drag_move(1, 42.5, 17.25);
		for _ in 0..50 {
			sim.step();
			let node = sim.node(1).unwrap();
			assert_eq!((node.x, node.y), (42.5, 17.25));
		}
		assert!(sim.alpha() > 0.1);

		sim.drag_end(1);
		assert_eq!(sim.node(1).unwrap().fx, None);
		assert_eq!(sim.position(1).unwrap(), Point::new(42.5, 17.25));
		for _ in 0..20 {
			sim.step();
		}
		assert_ne!(sim.position(1).unwrap(), Point::new(42.5, 17.25));
	}

	#[test]
	fn drag_reheats_a_settled_simulation() {
		let mut sim =
			ForceSimulation::new(chain(&["a", "b"]), 200.0, 200.0, ForceConfig::default());
		run_to_rest(&mut sim);
		sim.drag_start(0);
		assert!(sim.step());
		sim.drag_end(0);
		run_to_rest(&mut sim);
		assert!(sim.is_settled());
	}

	#[test]
	fn scene_follows_positions() {
		let mut sim =
			ForceSimulation::new(chain(&["a", "b"]), 200.0, 200.0, ForceConfig::default());
		sim.tick();
		let scene = sim.scene();
		assert_eq!(scene.nodes[1].center, sim.position(1).unwrap());
		assert_eq!(
			scene.edges[0].path,
			Path::line(sim.position(0).unwrap(), sim.position(1).unwrap())
		);
		assert_eq!(scene.nodes[0].tooltip, "a (module)");
	}
}
