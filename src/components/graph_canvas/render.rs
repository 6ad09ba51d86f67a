use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::GraphViewState;
use crate::layout::path::{Path, PathCommand};
use crate::layout::{EDGE_RGB, EdgeMark, NodeMark};

const BACKGROUND: &str = "#1a1a2e";
const LABEL_COLOR: &str = "rgba(255, 255, 255, 0.8)";

pub fn render(state: &GraphViewState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	for edge in &state.scene.edges {
		draw_edge(edge, ctx);
	}
	for node in &state.scene.nodes {
		draw_node(node, ctx);
	}
	let k = state.transform.k;
	ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
	ctx.set_text_baseline("middle");
	for node in &state.scene.nodes {
		draw_label(node, ctx);
	}
	if let Some(node) = state.hover.and_then(|i| state.scene.node(i)) {
		draw_tooltip(node, k, ctx);
	}
	ctx.restore();
}

fn trace(path: &Path, ctx: &CanvasRenderingContext2d) {
	ctx.begin_path();
	for cmd in path.commands() {
		match *cmd {
			PathCommand::MoveTo(p) => ctx.move_to(p.x, p.y),
			PathCommand::LineTo(p) => ctx.line_to(p.x, p.y),
			PathCommand::QuadTo { ctrl, to } => ctx.quadratic_curve_to(ctrl.x, ctrl.y, to.x, to.y),
			PathCommand::CubicTo { ctrl1, ctrl2, to } => {
				ctx.bezier_curve_to(ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y)
			}
		}
	}
}

fn draw_edge(edge: &EdgeMark, ctx: &CanvasRenderingContext2d) {
	if edge.path.is_empty() {
		return;
	}
	ctx.set_stroke_style_str(&format!("rgba({EDGE_RGB}, {})", edge.opacity));
	ctx.set_line_width(edge.width);
	trace(&edge.path, ctx);
	ctx.stroke();
}

fn draw_node(node: &NodeMark, ctx: &CanvasRenderingContext2d) {
	ctx.begin_path();
	let _ = ctx.arc(node.center.x, node.center.y, node.radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(node.color);
	ctx.fill();
}

fn draw_label(node: &NodeMark, ctx: &CanvasRenderingContext2d) {
	let label = &node.label;
	ctx.save();
	let _ = ctx.translate(node.center.x, node.center.y);
	if label.rotation != 0.0 {
		let _ = ctx.rotate(label.rotation);
	}
	ctx.set_text_align(label.align.as_str());
	ctx.set_fill_style_str(LABEL_COLOR);
	let _ = ctx.fill_text(&label.text, label.offset.x, label.offset.y);
	ctx.restore();
}

fn draw_tooltip(node: &NodeMark, k: f64, ctx: &CanvasRenderingContext2d) {
	let (pad, line) = (4.0 / k, 14.0 / k);
	let width = ctx
		.measure_text(&node.tooltip)
		.map(|m| m.width())
		.unwrap_or(node.tooltip.len() as f64 * 6.0 / k);
	let (x, y) = (node.center.x + node.radius + pad, node.center.y - node.radius - line);
	ctx.set_fill_style_str("rgba(0, 0, 0, 0.75)");
	ctx.fill_rect(x, y - line / 2.0, width + 2.0 * pad, line);
	ctx.set_text_align("start");
	ctx.set_fill_style_str("white");
	let _ = ctx.fill_text(&node.tooltip, x + pad, y);
}
