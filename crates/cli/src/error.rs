use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
	#[error(transparent)]
	Provisioning(#[from] provisioning::Error),

	#[error("invalid settings file {}: {source}", path.display())]
	Settings {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("invalid --basic credentials: expected USER:PASS")]
	BasicCredentials,

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
