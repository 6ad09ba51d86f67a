//! Codescope: explore a repository as a graph and ask questions about it.
//!
//! The browser app lives in [`App`]; [`graph`], [`layout`], [`gateway`] and
//! [`chat`] are plain Rust and usable (and tested) without a DOM.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

pub mod chat;
pub mod gateway;
pub mod graph;
pub mod layout;

mod components;
mod pages;

use crate::components::toast::{ToastHost, Toasts};
use crate::gateway::GatewayConfig;
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// The app shell: gateway configuration and notifications in context, the
/// explorer at `/`, and a 404 page for everything else.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();
	let config = GatewayConfig::from_build_env();
	info!("analysis service at {} (fallback {})", config.base_url, config.fallback);
	provide_context(config);
	provide_context(Toasts::default());

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		<Title text="Codescope" />

		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
		<ToastHost />
	}
}
