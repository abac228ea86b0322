//! Typed `data` payloads returned by the extension.
//!
//! Every field defaults, so a missing or partial `data` object still decodes.

use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use surf_protocol::null_as_default;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickResult {
	#[serde(deserialize_with = "null_as_default")]
	pub status: String,
	#[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
	pub selector: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScrollResult {
	#[serde(deserialize_with = "null_as_default")]
	pub delta_x: i64,
	#[serde(deserialize_with = "null_as_default")]
	pub delta_y: i64,
	#[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
	pub selector: String,
	#[serde(deserialize_with = "null_as_default")]
	pub behavior: String,
	#[serde(deserialize_with = "null_as_default")]
	pub block: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverResult {
	#[serde(deserialize_with = "null_as_default")]
	pub selector: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypeResult {
	#[serde(deserialize_with = "null_as_default")]
	pub selector: String,
	#[serde(deserialize_with = "null_as_default")]
	pub text_length: u64,
	#[serde(deserialize_with = "null_as_default")]
	pub press_enter: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnterResult {
	#[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
	pub selector: String,
	#[serde(deserialize_with = "null_as_default")]
	pub key: String,
	#[serde(deserialize_with = "null_as_default")]
	pub used_active_element: bool,
}

/// Result of `back` / `forward`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryResult {
	#[serde(deserialize_with = "null_as_default")]
	pub direction: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WaitForSelectorResult {
	#[serde(deserialize_with = "null_as_default")]
	pub selector: String,
	#[serde(deserialize_with = "null_as_default")]
	pub timeout_ms: u64,
	#[serde(deserialize_with = "null_as_default")]
	pub found: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindMatch {
	#[serde(deserialize_with = "null_as_default")]
	pub index: u64,
	#[serde(deserialize_with = "null_as_default")]
	pub snippet: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FindResult {
	#[serde(deserialize_with = "null_as_default")]
	pub query: String,
	#[serde(deserialize_with = "null_as_default")]
	pub limit: u32,
	#[serde(deserialize_with = "null_as_default")]
	pub radius: u32,
	#[serde(deserialize_with = "null_as_default")]
	pub case_sensitive: bool,
	#[serde(deserialize_with = "null_as_default")]
	pub total: u64,
	#[serde(deserialize_with = "null_as_default")]
	pub returned: u64,
	#[serde(deserialize_with = "null_as_default")]
	pub results: Vec<FindMatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigateResult {
	#[serde(deserialize_with = "null_as_default")]
	pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectResult {
	#[serde(deserialize_with = "null_as_default")]
	pub selector: String,
	#[serde(deserialize_with = "null_as_default")]
	pub value: String,
	#[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
	pub label: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub index: Option<u32>,
	#[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
	pub values: Vec<String>,
	#[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
	pub labels: Vec<String>,
	#[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
	pub indices: Vec<u32>,
	#[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
	pub match_mode: String,
	#[serde(deserialize_with = "null_as_default")]
	pub toggle: bool,
	#[serde(deserialize_with = "null_as_default")]
	pub multiple: bool,
	#[serde(deserialize_with = "null_as_default")]
	pub selected_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScreenshotResult {
	#[serde(skip_serializing_if = "String::is_empty", deserialize_with = "null_as_default")]
	pub selector: String,
	/// `data:image/<format>;base64,<bytes>`
	#[serde(deserialize_with = "null_as_default")]
	pub data_url: String,
	#[serde(deserialize_with = "null_as_default")]
	pub width: u32,
	#[serde(deserialize_with = "null_as_default")]
	pub height: u32,
	#[serde(deserialize_with = "null_as_default")]
	pub format: String,
}

impl ScreenshotResult {
	/// Decodes the image bytes carried in `data_url`.
	pub fn image_bytes(&self) -> Result<Vec<u8>> {
		let (header, body) = self
			.data_url
			.split_once(',')
			.ok_or_else(|| Error::Screenshot("missing data URL separator".into()))?;
		if !header.ends_with(";base64") {
			return Err(Error::Screenshot(format!("unsupported encoding: {header}")));
		}
		base64::prelude::BASE64_STANDARD
			.decode(body)
			.map_err(|e| Error::Screenshot(e.to_string()))
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingState {
	#[serde(deserialize_with = "null_as_default")]
	pub recording: bool,
	#[serde(deserialize_with = "null_as_default")]
	pub count: u64,
}

/// One user interaction captured while recording.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordedAction {
	#[serde(rename = "type", deserialize_with = "null_as_default")]
	pub kind: String,
	#[serde(deserialize_with = "null_as_default")]
	pub payload: Map<String, Value>,
	#[serde(deserialize_with = "null_as_default")]
	pub timestamp: i64,
	#[serde(deserialize_with = "null_as_default")]
	pub url: String,
	#[serde(deserialize_with = "null_as_default")]
	pub title: String,
}

/// Browser tab as reported by the extension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TabInfo {
	#[serde(deserialize_with = "null_as_default")]
	pub id: i64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub window_id: Option<i64>,
	#[serde(deserialize_with = "null_as_default")]
	pub url: String,
	#[serde(deserialize_with = "null_as_default")]
	pub title: String,
	#[serde(deserialize_with = "null_as_default")]
	pub active: bool,
	#[serde(deserialize_with = "null_as_default")]
	pub pinned: bool,
	/// Extension-specific fields such as claim or sharing state.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
