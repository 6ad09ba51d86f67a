use std::sync::Arc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, error};
use web_sys::SubmitEvent;

use super::toast::Toasts;
use crate::chat::{ChatLog, ChatMessage, Role};
use crate::gateway::{Gateway, GatewayConfig};
use crate::graph::RepoGraph;

#[component]
pub fn ChatPanel(#[prop(into)] graph: Signal<Option<Arc<RepoGraph>>>) -> impl IntoView {
	let toasts = expect_context::<Toasts>();
	let gateway = Gateway::from_config(&expect_context::<GatewayConfig>());
	let log = RwSignal::new(ChatLog::default());
	let draft = RwSignal::new(String::new());
	let pending = RwSignal::new(false);
	let list_ref = NodeRef::<leptos::html::Div>::new();

	// New graph, new conversation.
	Effect::new(move |_| {
		let next = graph.with(|g| g.as_ref().map(|g| ChatLog::welcome(&g.name)));
		log.set(next.unwrap_or_default());
	});

	Effect::new(move |_| {
		log.track();
		pending.track();
		if let Some(list) = list_ref.get() {
			list.set_scroll_top(list.scroll_height());
		}
	});

	let on_submit = move |ev: SubmitEvent| {
		ev.prevent_default();
		let text = draft.get_untracked();
		if pending.get_untracked() || text.trim().is_empty() {
			return;
		}
		let Some(asked_about) = graph.get_untracked() else {
			return;
		};
		log.update(|l| l.push(ChatMessage::user(text.clone())));
		draft.set(String::new());
		pending.set(true);
		let gateway = gateway.clone();
		spawn_local(async move {
			let answer = gateway.ask_question(&text, &asked_about).await;
			let current = graph.with_untracked(|g| g.as_ref().is_some_and(|g| Arc::ptr_eq(g, &asked_about)));
			match answer {
				Ok(reply) if current => log.update(|l| l.push(ChatMessage::assistant(reply))),
				Ok(_) => debug!("dropping answer for a graph that is no longer shown"),
				Err(err) => {
					error!("question failed: {err}");
					toasts.error("Failed to get a response. Please try again.");
				}
			}
			pending.set(false);
		});
	};

	let loaded = move || graph.with(|g| g.is_some());
	let send_disabled = move || !loaded() || pending.get() || draft.with(|d| d.trim().is_empty());

	view! {
		<section class="card chat">
			<h2>"Chat with Your Code"</h2>
			<div class="chat__messages" node_ref=list_ref>
				{move || {
					log.with(|l| {
						if l.is_empty() {
							let hint = if loaded() {
								"Start asking questions about your code..."
							} else {
								"Please load a repository to start the conversation"
							};
							view! { <p class="chat__hint">{hint}</p> }.into_any()
						} else {
							l.messages()
								.iter()
								.map(|m| {
									let class = match m.role {
										Role::User => "chat__message chat__message--user",
										Role::Assistant => "chat__message chat__message--assistant",
									};
									view! {
										<div class=class>
											<div class="chat__content">{m.content.clone()}</div>
											<div class="chat__time">{m.time_label()}</div>
										</div>
									}
								})
								.collect_view()
								.into_any()
						}
					})
				}}
				<div class="chat__typing" style:display=move || if pending.get() { "flex" } else { "none" }>
					<span></span>
					<span></span>
					<span></span>
				</div>
			</div>
			<form class="chat__form" on:submit=on_submit>
				<input
					type="text"
					placeholder=move || {
						if loaded() { "Ask a question about your code..." } else { "Load a repository first" }
					}
					disabled=move || !loaded() || pending.get()
					prop:value=move || draft.get()
					on:input=move |ev| draft.set(event_target_value(&ev))
				/>
				<button type="submit" disabled=send_disabled>
					"Send"
				</button>
			</form>
		</section>
	}
}
