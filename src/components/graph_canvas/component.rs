use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use leptos::ev;
use leptos::prelude::*;
use log::warn;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::render;
use super::state::GraphViewState;
use crate::graph::{NodeFilter, RepoGraph};
use crate::layout::VisualizationType;

const RESIZE_SETTLE: Duration = Duration::from_millis(150);
const EMPTY_TEXT: &str = "Please load a repository to visualize its structure";

type Frame = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok()??.dyn_into().ok()
}

/// Draws `graph` with the chosen engine, after filtering, sized to the parent
/// element. Any change of input tears the session down and starts a new one.
#[component]
pub fn GraphCanvas(
	#[prop(into)] graph: Signal<Option<Arc<RepoGraph>>>,
	#[prop(into)] kind: Signal<VisualizationType>,
	#[prop(into)] filter: Signal<NodeFilter>,
) -> impl IntoView {
	let container_ref = NodeRef::<leptos::html::Div>::new();
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let size = RwSignal::new((0.0_f64, 0.0_f64));
	let state: Rc<RefCell<Option<GraphViewState>>> = Rc::new(RefCell::new(None));
	let animate: Frame = Rc::new(RefCell::new(None));
	let pending: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));

	let measure = move || {
		if let Some(el) = container_ref.get_untracked() {
			let next = (el.client_width() as f64, el.client_height() as f64);
			if size.get_untracked() != next {
				size.set(next);
			}
		}
	};
	// The container may only become visible once a graph arrives.
	Effect::new(move |_| {
		graph.track();
		if container_ref.get().is_some() {
			measure();
		}
	});
	// Re-measure once the window stops resizing; every rebuild re-runs the layout.
	let settle: StoredValue<Option<TimeoutHandle>> = StoredValue::new(None);
	let resize = window_event_listener(ev::resize, move |_| {
		if let Some(handle) = settle.get_value() {
			handle.clear();
		}
		settle.set_value(set_timeout_with_handle(measure, RESIZE_SETTLE).ok());
	});
	on_cleanup(move || resize.remove());

	let (state_init, animate_init, pending_init) = (state.clone(), animate.clone(), pending.clone());
	Effect::new(move |_| {
		let graph = graph.get();
		let (kind, filter, (w, h)) = (kind.get(), filter.get(), size.get());
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let Some(window) = web_sys::window() else {
			return;
		};

		if let Some(id) = pending_init.take() {
			let _ = window.cancel_animation_frame(id);
		}
		*animate_init.borrow_mut() = None;
		*state_init.borrow_mut() = None;

		let Some(session) = GraphViewState::session(graph.as_deref(), filter, kind, w, h) else {
			return;
		};

		let canvas: HtmlCanvasElement = canvas.into();
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		let Some(ctx) = context_2d(&canvas) else {
			warn!("2d canvas context unavailable");
			return;
		};
		*state_init.borrow_mut() = Some(session);

		let (state_anim, animate_inner, pending_anim) =
			(state_init.clone(), animate_init.clone(), pending_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			pending_anim.set(None);
			if !canvas.is_connected() {
				return;
			}
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick();
				render::render(s, &ctx);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				pending_anim.set(
					web_sys::window()
						.and_then(|win| win.request_animation_frame(cb.as_ref().unchecked_ref()).ok()),
				);
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			pending_init.set(window.request_animation_frame(cb.as_ref().unchecked_ref()).ok());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_md.borrow_mut() {
			s.pointer_down(x, y);
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			s.pointer_move(x, y);
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.pointer_up();
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.pointer_leave();
		}
	};

	let state_wh = state;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.zoom(x, y, ev.delta_y());
		}
	};

	let loaded = move || graph.with(|g| g.is_some());

	view! {
		<div node_ref=container_ref class="graph-canvas">
			<canvas
				node_ref=canvas_ref
				class="graph-canvas__surface"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style:display=move || if loaded() { "block" } else { "none" }
			/>
			<div
				class="graph-canvas__empty"
				style:display=move || if loaded() { "none" } else { "flex" }
			>
				<p>{EMPTY_TEXT}</p>
			</div>
		</div>
	}
}
