use js_sys::Uint8Array;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{error, info, warn};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlInputElement, SubmitEvent};

use super::toast::Toasts;
use crate::gateway::{
	Analysis, FallbackPolicy, Gateway, GatewayConfig, GatewayError, RepoSource, validate_archive,
};
use crate::graph::RepoGraph;

const ANALYZED: &str = "Repository analyzed successfully!";

/// Hand a finished submission to the page and tell the user how it went.
/// `checked` names what to check on failure ("URL" or "file").
fn announce(
	result: Result<Analysis, GatewayError>,
	policy: FallbackPolicy,
	checked: &str,
	toasts: Toasts,
	on_loaded: Callback<RepoGraph>,
) {
	match result {
		Ok(Analysis {
			graph,
			fallback: Some(err),
		}) => {
			warn!("showing placeholder after failed analysis: {err}");
			on_loaded.run(graph);
			toasts.error(format!("Analysis service unavailable, showing sample data. ({err})"));
		}
		Ok(Analysis { graph, .. }) => {
			on_loaded.run(graph);
			if policy == FallbackPolicy::Always {
				toasts.success("Offline demo: showing sample data");
			} else {
				toasts.success(ANALYZED);
			}
		}
		Err(err) => {
			error!("analysis failed: {err}");
			toasts.error(format!(
				"Failed to analyze repository. Please check the {checked} and try again. ({err})"
			));
		}
	}
}

/// URL form plus archive upload. Only one analysis runs at a time; both
/// triggers are disabled while it is outstanding.
#[component]
pub fn RepoInput(#[prop(into)] on_loaded: Callback<RepoGraph>) -> impl IntoView {
	let toasts = expect_context::<Toasts>();
	let gateway = Gateway::from_config(&expect_context::<GatewayConfig>());
	let url = RwSignal::new(String::new());
	let loading = RwSignal::new(false);

	let submit_gateway = gateway.clone();
	let on_submit = move |ev: SubmitEvent| {
		ev.prevent_default();
		if loading.get_untracked() {
			return;
		}
		let source = match RepoSource::url(&url.get_untracked()) {
			Ok(source) => source,
			Err(err) => {
				toasts.error(err.to_string());
				return;
			}
		};
		info!("analysing {source:?}");
		loading.set(true);
		let gateway = submit_gateway.clone();
		spawn_local(async move {
			let result = gateway.submit_repository(source).await;
			announce(result, gateway.fallback(), "URL", toasts, on_loaded);
			loading.set(false);
		});
	};

	let on_file = move |ev: leptos::ev::Event| {
		let input: HtmlInputElement = event_target(&ev);
		let Some(file) = input.files().and_then(|files| files.get(0)) else {
			return;
		};
		let (name, mime) = (file.name(), file.type_());
		if let Err(err) = validate_archive(&name, &mime) {
			toasts.error(err.to_string());
			input.set_value("");
			return;
		}
		loading.set(true);
		let gateway = gateway.clone();
		spawn_local(async move {
			let result = match JsFuture::from(file.array_buffer()).await {
				Ok(buffer) => {
					let bytes = Uint8Array::new(&buffer).to_vec();
					info!("uploading {name} ({} bytes)", bytes.len());
					match RepoSource::archive(name, mime, bytes) {
						Ok(source) => gateway.submit_repository(source).await,
						Err(err) => Err(err),
					}
				}
				Err(err) => {
					error!("reading {name} failed: {err:?}");
					Err(GatewayError::Validation(format!("Could not read {name}")))
				}
			};
			announce(result, gateway.fallback(), "file", toasts, on_loaded);
			loading.set(false);
			input.set_value("");
		});
	};

	view! {
		<section class="card repo-input">
			<h2>"Repository Input"</h2>
			<h3>"Option 1: GitHub URL"</h3>
			<form class="repo-input__url" on:submit=on_submit>
				<input
					type="text"
					placeholder="https://github.com/username/repo"
					prop:value=move || url.get()
					on:input=move |ev| url.set(event_target_value(&ev))
				/>
				<button type="submit" disabled=move || loading.get()>
					{move || if loading.get() { "Analyzing..." } else { "Analyze" }}
				</button>
			</form>
			<div class="divider">
				<span>"Or"</span>
			</div>
			<h3>"Option 2: Upload ZIP"</h3>
			<label class="repo-input__upload">
				<input
					type="file"
					accept=".zip"
					style="display: none;"
					disabled=move || loading.get()
					on:change=on_file
				/>
				<span>
					{move || if loading.get() { "Uploading..." } else { "Click to upload ZIP file" }}
				</span>
			</label>
		</section>
	}
}
