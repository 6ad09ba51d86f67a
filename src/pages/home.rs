use std::sync::Arc;

use leptos::prelude::*;
use log::info;

use crate::components::chat_panel::ChatPanel;
use crate::components::controls::VisualizationControls;
use crate::components::graph_canvas::GraphCanvas;
use crate::components::header::Header;
use crate::components::legend::Legend;
use crate::components::repo_input::RepoInput;
use crate::graph::{NodeFilter, RepoGraph, counts_by_type, empty_counts};
use crate::layout::VisualizationType;

/// Repository input until a graph is loaded, then the explorer.
#[component]
pub fn Home() -> impl IntoView {
	let graph = RwSignal::new(None::<Arc<RepoGraph>>);
	let kind = RwSignal::new(VisualizationType::default());
	let filter = RwSignal::new(NodeFilter::default());

	let on_loaded = Callback::new(move |next: RepoGraph| {
		info!(
			"showing {:?}: {} nodes, {} edges",
			next.name,
			next.nodes.len(),
			next.edges.len()
		);
		// A filter chosen for the previous graph may hide everything here.
		filter.set(NodeFilter::All);
		graph.set(Some(Arc::new(next)));
	});

	let counts = Signal::derive(move || {
		graph.with(|g| g.as_deref().map(counts_by_type).unwrap_or_else(empty_counts))
	});
	let loaded = move || graph.with(|g| g.is_some());
	let name = move || graph.with(|g| g.as_ref().map(|g| g.name.clone()).unwrap_or_default());
	let summary = move || {
		graph.with(|g| {
			g.as_ref()
				.map(|g| format!("{} nodes and {} connections", g.nodes.len(), g.edges.len()))
				.unwrap_or_default()
		})
	};

	view! {
		<div class="app">
			<Header />
			<main class="app__main">
				<div class="intro" style:display=move || if loaded() { "none" } else { "block" }>
					<h1>"Codescope"</h1>
					<p class="subtitle">"Explore your codebase through visualization and conversation"</p>
					<RepoInput on_loaded=on_loaded />
				</div>
				<div class="explorer" style:display=move || if loaded() { "grid" } else { "none" }>
					<div class="explorer__main">
						<section class="card summary">
							<h2>"Repository: " {name}</h2>
							<p>{summary}</p>
							<button class="link" on:click=move |_| graph.set(None)>
								"Load another repository"
							</button>
						</section>
						<div class="explorer__graph">
							<GraphCanvas graph=graph kind=kind filter=filter />
						</div>
						<div class="explorer__panels">
							<VisualizationControls kind=kind filter=filter counts=counts />
							<Legend />
						</div>
					</div>
					<div class="explorer__chat">
						<ChatPanel graph=graph />
					</div>
				</div>
			</main>
		</div>
	}
}
