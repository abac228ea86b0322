//! Reply envelope and machine-readable failure codes.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::de::null_as_default;

/// Machine-readable failure code attached to a failed [`Response`].
///
/// Codes the extension may send that are not listed here are preserved in
/// [`ErrorCode::Other`] so they survive a round trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorCode {
	NoActiveTab,
	ElementNotFound,
	InvalidInput,
	InvalidTarget,
	OptionNotFound,
	Timeout,
	NoActiveElement,
	UnsupportedCommand,
	CommandFailed,
	ScreenshotFailed,
	Other(String),
}

impl ErrorCode {
	pub fn as_str(&self) -> &str {
		match self {
			ErrorCode::NoActiveTab => "NO_ACTIVE_TAB",
			ErrorCode::ElementNotFound => "ELEMENT_NOT_FOUND",
			ErrorCode::InvalidInput => "INVALID_INPUT",
			ErrorCode::InvalidTarget => "INVALID_TARGET",
			ErrorCode::OptionNotFound => "OPTION_NOT_FOUND",
			ErrorCode::Timeout => "TIMEOUT",
			ErrorCode::NoActiveElement => "NO_ACTIVE_ELEMENT",
			ErrorCode::UnsupportedCommand => "UNSUPPORTED_COMMAND",
			ErrorCode::CommandFailed => "COMMAND_FAILED",
			ErrorCode::ScreenshotFailed => "SCREENSHOT_FAILED",
			ErrorCode::Other(code) => code,
		}
	}
}

impl From<String> for ErrorCode {
	fn from(code: String) -> Self {
		match code.as_str() {
			"NO_ACTIVE_TAB" => ErrorCode::NoActiveTab,
			"ELEMENT_NOT_FOUND" => ErrorCode::ElementNotFound,
			"INVALID_INPUT" => ErrorCode::InvalidInput,
			"INVALID_TARGET" => ErrorCode::InvalidTarget,
			"OPTION_NOT_FOUND" => ErrorCode::OptionNotFound,
			"TIMEOUT" => ErrorCode::Timeout,
			"NO_ACTIVE_ELEMENT" => ErrorCode::NoActiveElement,
			"UNSUPPORTED_COMMAND" => ErrorCode::UnsupportedCommand,
			"COMMAND_FAILED" => ErrorCode::CommandFailed,
			"SCREENSHOT_FAILED" => ErrorCode::ScreenshotFailed,
			_ => ErrorCode::Other(code),
		}
	}
}

impl From<ErrorCode> for String {
	fn from(code: ErrorCode) -> Self {
		match code {
			ErrorCode::Other(code) => code,
			known => known.as_str().to_string(),
		}
	}
}

impl fmt::Display for ErrorCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Reply to a [`Command`](crate::Command), matched by `id`.
///
/// The extension sends at most one response per command it acts upon; the
/// bridge never requires one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
	#[serde(default, deserialize_with = "null_as_default")]
	pub id: String,
	#[serde(default, deserialize_with = "null_as_default")]
	pub ok: bool,
	/// Human-readable failure description.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error_code: Option<ErrorCode>,
	/// Command-specific result.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<Value>,
}

impl Response {
	pub fn success(id: impl Into<String>, data: Option<Value>) -> Self {
		Self {
			id: id.into(),
			ok: true,
			error: None,
			error_code: None,
			data,
		}
	}

	pub fn failure(id: impl Into<String>, code: Option<ErrorCode>, message: impl Into<String>) -> Self {
		let message = message.into();
		Self {
			id: id.into(),
			ok: false,
			error: (!message.is_empty()).then_some(message),
			error_code: code,
			data: None,
		}
	}

	/// Failure text combining the message and code, as shown to callers.
	///
	/// Falls back to a generic message when the peer supplied neither.
	pub fn failure_message(&self) -> String {
		let message = self.error.as_deref().filter(|m| !m.is_empty());
		match (message, &self.error_code) {
			(Some(message), Some(code)) => format!("{message} ({code})"),
			(Some(message), None) => message.to_string(),
			(None, Some(code)) => format!("browser action failed ({code})"),
			(None, None) => "browser action failed".to_string(),
		}
	}
}
