use std::fmt;
use std::str::FromStr;

use log::warn;

use super::error::ConfigError;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// What to do when the analysis service is unavailable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
	/// Surface transport failures to the caller.
	Never,
	/// Substitute placeholder results when a request fails in transit.
	#[default]
	OnFailure,
	/// Never contact the service; always answer with placeholders.
	Always,
}

impl FromStr for FallbackPolicy {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"never" => Ok(FallbackPolicy::Never),
			"on-failure" | "on_failure" => Ok(FallbackPolicy::OnFailure),
			"always" => Ok(FallbackPolicy::Always),
			other => Err(ConfigError::UnknownFallback(other.to_owned())),
		}
	}
}

impl fmt::Display for FallbackPolicy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			FallbackPolicy::Never => "never",
			FallbackPolicy::OnFailure => "on-failure",
			FallbackPolicy::Always => "always",
		})
	}
}

/// Where the analysis service lives and how failures are handled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayConfig {
	/// Service root, without a trailing slash.
	pub base_url: String,
	/// Failure handling.
	pub fallback: FallbackPolicy,
}

impl Default for GatewayConfig {
	fn default() -> Self {
		Self {
			base_url: DEFAULT_BASE_URL.to_owned(),
			fallback: FallbackPolicy::default(),
		}
	}
}

impl GatewayConfig {
	/// Build from raw values, `None` meaning "use the default".
	pub fn from_values(base_url: Option<&str>, fallback: Option<&str>) -> Result<Self, ConfigError> {
		let base_url = match base_url.map(str::trim) {
			None => DEFAULT_BASE_URL.to_owned(),
			Some("") => return Err(ConfigError::EmptyBaseUrl),
			Some(url) => url.trim_end_matches('/').to_owned(),
		};
		let fallback = fallback.map(str::parse::<FallbackPolicy>).transpose()?.unwrap_or_default();
		Ok(Self { base_url, fallback })
	}

	/// Values baked in at build time through `CODESCOPE_API_URL` and
	/// `CODESCOPE_FALLBACK`. Invalid values are logged and replaced by
	/// defaults.
	pub fn from_build_env() -> Self {
		Self::from_values(option_env!("CODESCOPE_API_URL"), option_env!("CODESCOPE_FALLBACK"))
			.unwrap_or_else(|err| {
				warn!("{err}; using default gateway configuration");
				Self::default()
			})
	}

	/// Absolute URL of an endpoint.
	pub fn endpoint(&self, path: &str) -> String {
		format!("{}/{}", self.base_url, path.trim_start_matches('/'))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_policies() {
		assert_eq!("never".parse(), Ok(FallbackPolicy::Never));
		assert_eq!(" On-Failure ".parse(), Ok(FallbackPolicy::OnFailure));
		assert_eq!("always".parse(), Ok(FallbackPolicy::Always));
		assert!(matches!(
			"sometimes".parse::<FallbackPolicy>(),
			Err(ConfigError::UnknownFallback(_))
		));
	}

	#[test]
	fn defaults_apply_when_unset() {
		let config = GatewayConfig::from_values(None, None).unwrap();
		assert_eq!(config, GatewayConfig::default());
		assert_eq!(config.endpoint("/chat"), "http://localhost:8000/chat");
	}

	#[test]
	fn trailing_slash_is_normalised() {
		let config = GatewayConfig::from_values(Some("https://api.test/v1/"), Some("never")).unwrap();
		assert_eq!(config.endpoint("analyze-repo"), "https://api.test/v1/analyze-repo");
		assert_eq!(config.fallback, FallbackPolicy::Never);
	}

	#[test]
	fn blank_url_is_rejected() {
		assert_eq!(
			GatewayConfig::from_values(Some("  "), None),
			Err(ConfigError::EmptyBaseUrl)
		);
	}
}
