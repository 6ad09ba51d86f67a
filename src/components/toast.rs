use std::time::Duration;

use leptos::prelude::*;
use uuid::Uuid;

const DISMISS_AFTER: Duration = Duration::from_secs(4);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
	Success,
	Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
	id: String,
	kind: ToastKind,
	text: String,
}

/// Transient notifications, shared through context.
#[derive(Clone, Copy)]
pub struct Toasts {
	items: RwSignal<Vec<Toast>>,
}

impl Default for Toasts {
	fn default() -> Self {
		Self {
			items: RwSignal::new(Vec::new()),
		}
	}
}

impl Toasts {
	pub fn success(&self, text: impl Into<String>) {
		self.push(ToastKind::Success, text.into());
	}

	pub fn error(&self, text: impl Into<String>) {
		self.push(ToastKind::Error, text.into());
	}

	fn push(&self, kind: ToastKind, text: String) {
		let id = Uuid::new_v4().to_string();
		self.items.update(|items| {
			items.push(Toast {
				id: id.clone(),
				kind,
				text,
			})
		});
		let this = *self;
		set_timeout(move || this.dismiss(&id), DISMISS_AFTER);
	}

	pub fn dismiss(&self, id: &str) {
		self.items.update(|items| items.retain(|t| t.id != id));
	}
}

#[component]
pub fn ToastHost() -> impl IntoView {
	let toasts = expect_context::<Toasts>();

	view! {
		<div class="toasts">
			<For
				each=move || toasts.items.get()
				key=|toast| toast.id.clone()
				children=move |toast: Toast| {
					let class = match toast.kind {
						ToastKind::Success => "toast toast--success",
						ToastKind::Error => "toast toast--error",
					};
					let id = toast.id;
					view! {
						<div class=class role="status" on:click=move |_| toasts.dismiss(&id)>
							{toast.text}
						</div>
					}
				}
			/>
		</div>
	}
}
