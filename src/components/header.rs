use leptos::prelude::*;

use crate::gateway::{FallbackPolicy, GatewayConfig};

#[component]
pub fn Header() -> impl IntoView {
	let config = expect_context::<GatewayConfig>();
	let offline = config.fallback == FallbackPolicy::Always;

	view! {
		<header class="header">
			<h1>"Codescope"</h1>
			<span class="header__badge">"Beta"</span>
			<span
				class="header__badge header__badge--offline"
				title="The analysis service is not contacted; sample data is shown"
				style:display=if offline { "inline-block" } else { "none" }
			>
				"Offline demo"
			</span>
		</header>
	}
}
