//! Boundary to the external analysis and question-answering service.
//!
//! [`Gateway`] wraps a [`Transport`] with a [`FallbackPolicy`]; the UI only
//! ever sees a graph, an answer, or a validation error.

mod config;
mod error;
mod source;
mod transport;

use log::{info, warn};

pub use config::{FallbackPolicy, GatewayConfig};
pub use error::{ConfigError, GatewayError};
pub use source::{Archive, RepoSource, validate_archive};
pub use transport::{ChatReply, ChatRequest, HttpTransport, Transport};

use crate::graph::{RepoGraph, WireGraph, placeholder_graph};

/// Answer substituted when a question cannot be delivered.
pub fn apology(query: &str) -> String {
	format!(
		"I'm having trouble analyzing your query about \"{query}\". The backend service might be unavailable. Please try again later."
	)
}

/// Canned answer used when the service is never contacted.
fn canned_answer(query: &str) -> String {
	let templates: [fn(&str) -> String; 4] = [
		|q| format!("I've analyzed the repository and found that {q} relates to several components in the codebase."),
		|q| format!("Based on the repository structure, {q} appears to be implemented in the main module."),
		|q| format!("The repository contains code related to {q} in the file structure."),
		|q| format!("Looking at the codebase, I can see that {q} is connected to multiple functions."),
	];
	let pick = query.bytes().map(usize::from).sum::<usize>() % templates.len();
	templates[pick](query)
}

/// Outcome of a repository submission.
#[derive(Debug)]
pub struct Analysis {
	/// Graph to show.
	pub graph: RepoGraph,
	/// The transport failure when `graph` is the placeholder substituted for
	/// a real analysis.
	pub fallback: Option<GatewayError>,
}

/// Analysis service client with an explicit fallback policy.
#[derive(Clone, Debug)]
pub struct Gateway<T = HttpTransport> {
	transport: T,
	fallback: FallbackPolicy,
}

impl Gateway<HttpTransport> {
	/// HTTP gateway for `config`.
	pub fn from_config(config: &GatewayConfig) -> Self {
		Self::new(HttpTransport::new(config.clone()), config.fallback)
	}
}

impl<T: Transport> Gateway<T> {
	/// Gateway over an arbitrary transport.
	pub fn new(transport: T, fallback: FallbackPolicy) -> Self {
		Self { transport, fallback }
	}

	/// Active policy.
	pub fn fallback(&self) -> FallbackPolicy {
		self.fallback
	}

	/// Analyse a repository. Input is validated first; transport failures
	/// become a placeholder graph, reported in [`Analysis::fallback`], unless
	/// the policy is [`FallbackPolicy::Never`].
	pub async fn submit_repository(&self, source: RepoSource) -> Result<Analysis, GatewayError> {
		source.validate()?;
		let name = source.placeholder_name();
		if self.fallback == FallbackPolicy::Always {
			info!("analysis service disabled, serving placeholder {name:?}");
			return Ok(Analysis {
				graph: placeholder_graph(name),
				fallback: None,
			});
		}
		match self.transport.analyze(&source).await {
			Ok(wire) => {
				let graph = RepoGraph::from(wire);
				info!(
					"analysed {:?}: {} nodes, {} edges",
					graph.name,
					graph.nodes.len(),
					graph.edges.len()
				);
				Ok(Analysis {
					graph,
					fallback: None,
				})
			}
			Err(err) if err.is_transport() && self.fallback == FallbackPolicy::OnFailure => {
				warn!("repository analysis failed: {err}; using placeholder graph");
				Ok(Analysis {
					graph: placeholder_graph(format!("{name} (Fallback)")),
					fallback: Some(err),
				})
			}
			Err(err) => Err(err),
		}
	}

	/// Ask a question about `graph`. Transport failures become an apology
	/// unless the policy is [`FallbackPolicy::Never`].
	pub async fn ask_question(&self, text: &str, graph: &RepoGraph) -> Result<String, GatewayError> {
		let query = text.trim();
		if query.is_empty() {
			return Err(GatewayError::Validation("Question must not be empty".into()));
		}
		if self.fallback == FallbackPolicy::Always {
			return Ok(canned_answer(query));
		}
		let request = ChatRequest {
			query,
			repo_data: WireGraph::from(graph),
		};
		match self.transport.chat(&request).await {
			Ok(reply) => Ok(reply.response),
			Err(err) if err.is_transport() && self.fallback == FallbackPolicy::OnFailure => {
				warn!("question failed: {err}; answering with apology");
				Ok(apology(query))
			}
			Err(err) => Err(err),
		}
	}
}
