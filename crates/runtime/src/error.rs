//! Error types for the extension bridge.

use std::time::Duration;

use surf_protocol::{ErrorCode, Response};
use thiserror::Error;

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while routing a command to an extension.
#[derive(Debug, Error)]
pub enum Error {
	/// No session is connected, so there is nothing to route to.
	#[error("no active browser session")]
	NoActiveSession,

	/// An explicit session id did not match any connected session.
	#[error("browser session not found: {0}")]
	UnknownSession(String),

	/// A command id is already waiting for a reply.
	#[error("command id already in flight: {0}")]
	DuplicateRequest(String),

	/// The session's socket rejected the frame.
	#[error("transport error: {0}")]
	Transport(String),

	/// The frame could not be written within the write deadline.
	#[error("write to browser session timed out after {}ms", .0.as_millis())]
	WriteTimeout(Duration),

	/// No reply arrived before the command deadline.
	#[error("timed out after {}ms waiting for response to {id}", .timeout.as_millis())]
	Timeout { id: String, timeout: Duration },

	/// The reply slot was discarded before a response arrived.
	#[error("reply slot for {0} was dropped")]
	ReplyDropped(String),

	/// The extension answered with `ok: false`.
	#[error("{message}")]
	Remote {
		/// Message combined with the code, as shown to callers.
		message: String,
		code: Option<ErrorCode>,
	},

	/// JSON serialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

impl Error {
	/// Session resolution failed before anything was sent.
	pub fn is_routing(&self) -> bool {
		matches!(self, Error::NoActiveSession | Error::UnknownSession(_))
	}

	pub fn is_timeout(&self) -> bool {
		matches!(self, Error::Timeout { .. } | Error::WriteTimeout(_))
	}

	/// Extension-supplied failure code, if any.
	pub fn code(&self) -> Option<&ErrorCode> {
		match self {
			Error::Remote { code, .. } => code.as_ref(),
			_ => None,
		}
	}
}

/// Converts a failed [`Response`] into [`Error::Remote`].
pub trait ResponseExt {
	/// Returns the `data` of a successful response, or the remote failure.
	fn into_result(self) -> Result<Option<serde_json::Value>>;
}

impl ResponseExt for Response {
	fn into_result(self) -> Result<Option<serde_json::Value>> {
		if self.ok {
			return Ok(self.data);
		}
		Err(Error::Remote {
			message: self.failure_message(),
			code: self.error_code,
		})
	}
}
