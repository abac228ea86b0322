//! Daemon configuration stored as TOML.
//!
//! The file lives at `$XDG_CONFIG_HOME/surfingbro/config.toml` unless a path
//! is given. A missing file is created with defaults, and blank tokens are
//! generated and written back so the daemon never starts unauthenticated by
//! accident. `SURF_ADDR`, `SURF_API_TOKEN` and `SURF_ADMIN_TOKEN` override
//! the file when set.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use surf::{ReduceOptions, Reducer, SnapshotStore};
use surf_runtime::BridgeOptions;
use thiserror::Error;

pub const DEFAULT_ADDR: &str = "127.0.0.1:9099";
pub const DEFAULT_MAX_SNAPSHOTS: usize = 64;

const CONFIG_DIR: &str = "surfingbro";
const CONFIG_FILE: &str = "config.toml";

pub const ENV_ADDR: &str = "SURF_ADDR";
pub const ENV_API_TOKEN: &str = "SURF_API_TOKEN";
pub const ENV_ADMIN_TOKEN: &str = "SURF_ADMIN_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read config file at {path}: {source}")]
	Read {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to write config file at {path}: {source}")]
	Write {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse config file at {path}: {source}")]
	Parse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("failed to encode config: {0}")]
	Encode(#[from] toml::ser::Error),

	#[error("invalid value for '{field}': {message}")]
	Validation { field: &'static str, message: String },

	#[error("could not determine config directory")]
	NoConfigDir,
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	pub daemon: DaemonConfig,
	pub auth: AuthConfig,
	pub snapshot: SnapshotConfig,
	pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
	pub addr: String,
	pub write_timeout_ms: u64,
	pub command_timeout_ms: u64,
	/// Exact `Origin` values accepted on `/ws`. Empty accepts any origin.
	pub allowed_origins: Vec<String>,
}

impl Default for DaemonConfig {
	fn default() -> Self {
		Self {
			addr: DEFAULT_ADDR.to_string(),
			write_timeout_ms: surf_runtime::DEFAULT_WRITE_TIMEOUT.as_millis() as u64,
			command_timeout_ms: surf_runtime::DEFAULT_COMMAND_TIMEOUT.as_millis() as u64,
			allowed_origins: Vec::new(),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
	pub api_token: String,
	pub admin_token: String,
}

impl AuthConfig {
	/// Generates any blank token. Returns whether something changed.
	pub fn fill_missing_tokens(&mut self) -> bool {
		let mut changed = false;
		for token in [&mut self.api_token, &mut self.admin_token] {
			if token.trim().is_empty() {
				*token = generate_token();
				changed = true;
			}
		}
		changed
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
	pub max_text: usize,
	pub max_elements: usize,
	/// Reduced snapshots kept in memory. `0` keeps all of them.
	pub max_snapshots: usize,
}

impl Default for SnapshotConfig {
	fn default() -> Self {
		Self {
			max_text: surf::page::DEFAULT_MAX_TEXT,
			max_elements: surf::page::DEFAULT_MAX_ELEMENTS,
			max_snapshots: DEFAULT_MAX_SNAPSHOTS,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
	/// `EnvFilter` directives used when no `-v` flag or `RUST_LOG` is given.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub level: Option<String>,
}

/// A loaded config plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
	pub config: Config,
	pub path: PathBuf,
	/// The file was created or had tokens generated.
	pub written: bool,
}

fn generate_token() -> String {
	uuid::Uuid::new_v4().simple().to_string()
}

pub fn default_path() -> ConfigResult<PathBuf> {
	dirs::config_dir()
		.map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
		.ok_or(ConfigError::NoConfigDir)
}

impl Config {
	pub fn load(path: &Path) -> ConfigResult<Self> {
		let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
			path: path.to_path_buf(),
			source,
		})?;
		toml::from_str(&contents).map_err(|source| ConfigError::Parse {
			path: path.to_path_buf(),
			source,
		})
	}

	pub fn save(&self, path: &Path) -> ConfigResult<()> {
		let contents = toml::to_string_pretty(self)?;
		let write_err = |source| ConfigError::Write {
			path: path.to_path_buf(),
			source,
		};
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			std::fs::create_dir_all(parent).map_err(write_err)?;
		}
		std::fs::write(path, contents).map_err(write_err)
	}

	/// Loads `path` (or the default location), creating it when missing and
	/// persisting generated tokens.
	pub fn load_or_create(path: Option<&Path>) -> ConfigResult<LoadedConfig> {
		let path = match path {
			Some(path) => path.to_path_buf(),
			None => default_path()?,
		};
		let exists = path.exists();
		let mut config = if exists { Self::load(&path)? } else { Self::default() };

		let generated = config.auth.fill_missing_tokens();
		let written = !exists || generated;
		if written {
			config.save(&path)?;
		}
		Ok(LoadedConfig { config, path, written })
	}

	/// Applies `SURF_*` overrides read through `lookup`. Blank values are ignored.
	pub fn apply_env_with<F>(&mut self, lookup: F)
	where
		F: Fn(&str) -> Option<String>,
	{
		let set = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
		if let Some(addr) = set(ENV_ADDR) {
			self.daemon.addr = addr;
		}
		if let Some(token) = set(ENV_API_TOKEN) {
			self.auth.api_token = token;
		}
		if let Some(token) = set(ENV_ADMIN_TOKEN) {
			self.auth.admin_token = token;
		}
	}

	pub fn apply_env(&mut self) {
		self.apply_env_with(|name| std::env::var(name).ok());
	}

	pub fn validate(&self) -> ConfigResult<()> {
		self.socket_addr()?;
		if self.daemon.write_timeout_ms == 0 {
			return Err(ConfigError::Validation {
				field: "daemon.write_timeout_ms",
				message: "must be greater than zero".into(),
			});
		}
		if self.daemon.command_timeout_ms == 0 {
			return Err(ConfigError::Validation {
				field: "daemon.command_timeout_ms",
				message: "must be greater than zero".into(),
			});
		}
		Ok(())
	}

	pub fn socket_addr(&self) -> ConfigResult<SocketAddr> {
		self.daemon.addr.parse().map_err(|e: std::net::AddrParseError| ConfigError::Validation {
			field: "daemon.addr",
			message: format!("{}: {e}", self.daemon.addr),
		})
	}

	pub fn bridge_options(&self) -> BridgeOptions {
		BridgeOptions {
			write_timeout: Duration::from_millis(self.daemon.write_timeout_ms),
			command_timeout: Duration::from_millis(self.daemon.command_timeout_ms),
		}
	}

	pub fn reducer(&self) -> Reducer {
		Reducer::new(ReduceOptions {
			max_text: self.snapshot.max_text,
			max_elements: self.snapshot.max_elements,
		})
	}

	pub fn snapshot_store(&self) -> SnapshotStore {
		SnapshotStore::with_capacity(self.snapshot.max_snapshots)
	}
}
