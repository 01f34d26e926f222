//! Optional JSON settings file.
//!
//! Lives at `<config dir>/provision/config.json` unless `--config` points
//! elsewhere. Every field is optional; command-line flags take precedence.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

/// On-disk settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
	#[serde(default)]
	pub submit_uri: Option<String>,
	#[serde(default)]
	pub ca_certs: Vec<PathBuf>,
	#[serde(default)]
	pub insecure: bool,
	#[serde(default)]
	pub delete_session: bool,
	#[serde(default)]
	pub auth: Option<AuthSettings>,
	#[serde(default)]
	pub poll: Option<PollSettings>,
}

/// Credentials stored in the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum AuthSettings {
	None,
	Basic { username: String, password: String },
	Bearer { token: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollSettings {
	#[serde(default)]
	pub max_attempts: Option<u32>,
	#[serde(default)]
	pub period_ms: Option<u64>,
}

impl Settings {
	pub fn default_path() -> Option<PathBuf> {
		dirs::config_dir().map(|dir| dir.join("provision").join("config.json"))
	}

	/// Loads settings from `path`, or from [`Settings::default_path`].
	///
	/// A missing default file yields empty settings; a missing explicit file
	/// is an error.
	pub fn load(path: Option<&Path>) -> Result<Self> {
		match path {
			Some(path) => Self::read(path),
			None => match Self::default_path() {
				Some(path) => Self::read_if_exists(&path),
				None => Ok(Self::default()),
			},
		}
	}

	fn read_if_exists(path: &Path) -> Result<Self> {
		match fs::read_to_string(path) {
			Ok(content) => Self::parse(path, &content),
			Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
			Err(err) => Err(anyhow::Error::new(err)
				.context(format!("cannot read settings file {}", path.display()))
				.into()),
		}
	}

	fn read(path: &Path) -> Result<Self> {
		let content = fs::read_to_string(path)
			.map_err(|err| anyhow::Error::new(err).context(format!("cannot read settings file {}", path.display())))?;
		Self::parse(path, &content)
	}

	fn parse(path: &Path, content: &str) -> Result<Self> {
		serde_json::from_str(content).map_err(|source| CliError::Settings {
			path: path.to_path_buf(),
			source,
		})
	}
}
