use std::collections::BTreeMap;

use leptos::prelude::*;

use crate::graph::{NodeFilter, NodeType};
use crate::layout::VisualizationType;

/// Visualization type radio group and node-type filter.
#[component]
pub fn VisualizationControls(
	kind: RwSignal<VisualizationType>,
	filter: RwSignal<NodeFilter>,
	#[prop(into)] counts: Signal<BTreeMap<NodeType, usize>>,
) -> impl IntoView {
	let kinds = VisualizationType::ALL
		.into_iter()
		.map(|k| {
			view! {
				<label class="controls__option">
					<input
						type="radio"
						name="visualization"
						value=k.key()
						prop:checked=move || kind.get() == k
						on:change=move |_| kind.set(k)
					/>
					{k.label()}
				</label>
			}
		})
		.collect_view();

	let types = NodeType::ALL
		.into_iter()
		.map(|t| {
			let count = move || counts.with(|c| c.get(&t).copied().unwrap_or(0));
			view! {
				<label class="controls__option" class:empty=move || count() == 0>
					<input
						type="checkbox"
						prop:checked=move || filter.get() == NodeFilter::Only(t)
						disabled=move || count() == 0
						on:change=move |_| {
							filter.update(|f| {
								*f = if *f == NodeFilter::Only(t) { NodeFilter::All } else { NodeFilter::Only(t) }
							})
						}
					/>
					{t.plural_label()}
					<span class="controls__count">{move || format!("({})", count())}</span>
				</label>
			}
		})
		.collect_view();

	view! {
		<section class="card controls">
			<h3>"Visualization Type"</h3>
			{kinds}
			<h3>"Filter Nodes"</h3>
			<label class="controls__option">
				<input
					type="checkbox"
					prop:checked=move || filter.get() == NodeFilter::All
					on:change=move |_| filter.set(NodeFilter::All)
				/>
				"All"
			</label>
			{types}
		</section>
	}
}
