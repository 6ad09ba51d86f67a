use thiserror::Error;

/// Failures at the analysis-service boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
	/// Malformed user input, rejected before any request is made.
	#[error("Validation error: {0}")]
	Validation(String),

	/// The service could not be reached.
	#[error("Network error: {0}")]
	Network(String),

	/// The service answered with a non-2xx status.
	#[error("Server error: {status} {reason}")]
	Server {
		/// HTTP status code.
		status: u16,
		/// Canonical reason phrase.
		reason: String,
	},

	/// The response body did not have the expected shape.
	#[error("Malformed response: {0}")]
	Decode(String),
}

impl GatewayError {
	/// Whether the failure happened in transit rather than in the input.
	pub fn is_transport(&self) -> bool {
		!matches!(self, GatewayError::Validation(_))
	}
}

impl From<reqwest::Error> for GatewayError {
	fn from(err: reqwest::Error) -> Self {
		match err.status() {
			Some(status) => GatewayError::Server {
				status: status.as_u16(),
				reason: status.canonical_reason().unwrap_or_default().to_owned(),
			},
			None if err.is_decode() => GatewayError::Decode(err.to_string()),
			None => GatewayError::Network(err.to_string()),
		}
	}
}

impl From<serde_json::Error> for GatewayError {
	fn from(err: serde_json::Error) -> Self {
		GatewayError::Decode(err.to_string())
	}
}

/// Unusable configuration value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
	/// Unknown fallback policy name.
	#[error("unknown fallback policy {0:?}, expected never, on-failure or always")]
	UnknownFallback(String),

	/// Base URL is empty.
	#[error("gateway base URL must not be empty")]
	EmptyBaseUrl,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn only_validation_is_not_transport() {
		assert!(!GatewayError::Validation("empty".into()).is_transport());
		assert!(GatewayError::Network("down".into()).is_transport());
		assert!(
			GatewayError::Server {
				status: 502,
				reason: "Bad Gateway".into()
			}
			.is_transport()
		);
		assert!(GatewayError::Decode("eof".into()).is_transport());
	}

	#[test]
	fn server_error_message() {
		let err = GatewayError::Server {
			status: 404,
			reason: "Not Found".into(),
		};
		assert_eq!(err.to_string(), "Server error: 404 Not Found");
	}
}
