use log::debug;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use super::config::GatewayConfig;
use super::error::GatewayError;
use super::source::RepoSource;
use crate::graph::WireGraph;

/// Body of a chat request.
#[derive(Clone, Debug, Serialize)]
pub struct ChatRequest<'a> {
	/// The user's question.
	pub query: &'a str,
	/// Graph the question is about.
	pub repo_data: WireGraph,
}

/// Body of a chat response.
#[derive(Clone, Debug, Deserialize)]
pub struct ChatReply {
	/// Answer text.
	pub response: String,
}

#[derive(Serialize)]
struct AnalyzeUrl<'a> {
	url: &'a str,
}

/// Raw access to the analysis service. Implementations report every failure
/// as a [`GatewayError`]; fallback decisions are made by the caller.
#[allow(async_fn_in_trait)]
pub trait Transport {
	/// Submit a repository for analysis.
	async fn analyze(&self, source: &RepoSource) -> Result<WireGraph, GatewayError>;

	/// Ask a question about a graph.
	async fn chat(&self, request: &ChatRequest<'_>) -> Result<ChatReply, GatewayError>;
}

/// [`Transport`] over HTTP.
#[derive(Clone, Debug)]
pub struct HttpTransport {
	client: reqwest::Client,
	config: GatewayConfig,
}

impl HttpTransport {
	/// Client for the service described by `config`.
	pub fn new(config: GatewayConfig) -> Self {
		Self {
			client: reqwest::Client::new(),
			config,
		}
	}

	async fn read<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, GatewayError> {
		let status = response.status();
		if !status.is_success() {
			return Err(GatewayError::Server {
				status: status.as_u16(),
				reason: status.canonical_reason().unwrap_or_default().to_owned(),
			});
		}
		let body = response.text().await?;
		Ok(serde_json::from_str(&body)?)
	}
}

impl Transport for HttpTransport {
	async fn analyze(&self, source: &RepoSource) -> Result<WireGraph, GatewayError> {
		let url = self.config.endpoint("analyze-repo");
		let request = match source {
			RepoSource::Url(repo_url) => {
				debug!("POST {url} for {repo_url}");
				self.client.post(&url).json(&AnalyzeUrl { url: repo_url })
			}
			RepoSource::Archive(archive) => {
				debug!("POST {url} with {} ({} bytes)", archive.file_name, archive.bytes.len());
				let mime = if archive.mime.is_empty() {
					"application/zip"
				} else {
					archive.mime.as_str()
				};
				let part = Part::bytes(archive.bytes.clone())
					.file_name(archive.file_name.clone())
					.mime_str(mime)?;
				self.client.post(&url).multipart(Form::new().part("file", part))
			}
		};
		Self::read(request.send().await?).await
	}

	async fn chat(&self, request: &ChatRequest<'_>) -> Result<ChatReply, GatewayError> {
		let url = self.config.endpoint("chat");
		debug!("POST {url}");
		Self::read(self.client.post(&url).json(request).send().await?).await
	}
}
