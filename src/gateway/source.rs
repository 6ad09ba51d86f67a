use super::error::GatewayError;

const ARCHIVE_MIME_TYPES: &[&str] = &["application/zip", "application/x-zip-compressed"];

/// An uploaded repository archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Archive {
	/// File name as picked by the user.
	pub file_name: String,
	/// MIME type reported by the browser, possibly empty.
	pub mime: String,
	/// Raw archive bytes.
	pub bytes: Vec<u8>,
}

/// What to analyse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RepoSource {
	/// A hosted repository URL.
	Url(String),
	/// An uploaded archive.
	Archive(Archive),
}

impl RepoSource {
	/// Validated URL source.
	pub fn url(raw: &str) -> Result<Self, GatewayError> {
		let source = RepoSource::Url(raw.trim().to_owned());
		source.validate()?;
		Ok(source)
	}

	/// Validated archive source.
	pub fn archive(
		file_name: impl Into<String>,
		mime: impl Into<String>,
		bytes: Vec<u8>,
	) -> Result<Self, GatewayError> {
		let source = RepoSource::Archive(Archive {
			file_name: file_name.into(),
			mime: mime.into(),
			bytes,
		});
		source.validate()?;
		Ok(source)
	}

	/// Reject empty URLs and non-zip uploads.
	pub fn validate(&self) -> Result<(), GatewayError> {
		match self {
			RepoSource::Url(url) => {
				if url.trim().is_empty() {
					return Err(GatewayError::Validation(
						"Please enter a repository URL".into(),
					));
				}
				if url.trim().chars().any(char::is_whitespace) {
					return Err(GatewayError::Validation(format!(
						"{url:?} is not a valid repository URL"
					)));
				}
				Ok(())
			}
			RepoSource::Archive(archive) => validate_archive(&archive.file_name, &archive.mime),
		}
	}

	/// Display name for the placeholder graph: `Sample of <last segment>`
	/// for URLs, `Uploaded <file stem>` for archives.
	pub fn placeholder_name(&self) -> String {
		match self {
			RepoSource::Url(url) => {
				let segment = url
					.trim_end_matches('/')
					.rsplit('/')
					.next()
					.filter(|s| !s.is_empty())
					.unwrap_or("Repository");
				format!("Sample of {segment}")
			}
			RepoSource::Archive(archive) => {
				format!("Uploaded {}", archive.file_name.replace(".zip", ""))
			}
		}
	}
}

/// Check an upload before reading it. When the browser reports no MIME type
/// the `.zip` extension decides.
pub fn validate_archive(file_name: &str, mime: &str) -> Result<(), GatewayError> {
	let accepted = if mime.is_empty() {
		file_name.to_ascii_lowercase().ends_with(".zip")
	} else {
		ARCHIVE_MIME_TYPES.contains(&mime)
	};
	if accepted {
		Ok(())
	} else {
		Err(GatewayError::Validation("Please upload a ZIP file".into()))
	}
}
