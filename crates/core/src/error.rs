//! Errors surfaced by browser operations.

use surf_protocol::{CommandKind, ErrorCode};
use thiserror::Error;

/// Result type alias for browser operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by [`BrowserClient`](crate::BrowserClient).
#[derive(Debug, Error)]
pub enum Error {
	/// Routing, transport, timeout, or remote failure from the bridge.
	#[error(transparent)]
	Bridge(#[from] surf_runtime::Error),

	/// A required argument was missing; nothing was sent.
	#[error("{0}")]
	InvalidInput(String),

	/// The extension answered with data of the wrong shape.
	#[error("decode {kind} result: {source}")]
	Decode {
		kind: CommandKind,
		source: serde_json::Error,
	},

	/// A screenshot data URL could not be decoded.
	#[error("invalid screenshot data: {0}")]
	Screenshot(String),
}

impl Error {
	pub(crate) fn required(what: &str) -> Self {
		Error::InvalidInput(format!("{what} is required"))
	}

	/// Machine-readable code, either local or from the extension.
	pub fn code(&self) -> Option<ErrorCode> {
		match self {
			Error::InvalidInput(_) => Some(ErrorCode::InvalidInput),
			Error::Bridge(err) => err.code().cloned(),
			_ => None,
		}
	}

	pub fn is_routing(&self) -> bool {
		matches!(self, Error::Bridge(err) if err.is_routing())
	}

	pub fn is_timeout(&self) -> bool {
		matches!(self, Error::Bridge(err) if err.is_timeout())
	}

	pub fn is_remote(&self) -> bool {
		matches!(self, Error::Bridge(surf_runtime::Error::Remote { .. }))
	}
}
