use leptos::prelude::*;

use crate::graph::NodeType;

#[component]
pub fn Legend() -> impl IntoView {
	view! {
		<section class="card legend">
			<h3>"Legend"</h3>
			<div class="legend__items">
				{NodeType::ALL
					.into_iter()
					.map(|t| {
						view! {
							<div class="legend__item">
								<span class="legend__swatch" style:background-color=t.color()></span>
								<span>{t.plural_label()}</span>
							</div>
						}
					})
					.collect_view()}
			</div>
		</section>
	}
}
