//! Outbound command envelope and the typed payload for every command type.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::target::Target;

fn is_false(value: &bool) -> bool {
	!*value
}

/// The closed set of command types understood by the extension.
///
/// Serialized as the `type` field of a [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandKind {
	#[serde(rename = "click")]
	Click,
	#[serde(rename = "snapshot")]
	Snapshot,
	#[serde(rename = "scroll")]
	Scroll,
	#[serde(rename = "hover")]
	Hover,
	#[serde(rename = "type")]
	Type,
	#[serde(rename = "enter")]
	Enter,
	#[serde(rename = "back")]
	Back,
	#[serde(rename = "forward")]
	Forward,
	#[serde(rename = "waitForSelector")]
	WaitForSelector,
	#[serde(rename = "find")]
	Find,
	#[serde(rename = "navigate")]
	Navigate,
	#[serde(rename = "select")]
	Select,
	#[serde(rename = "screenshot")]
	Screenshot,
	#[serde(rename = "start_recording")]
	StartRecording,
	#[serde(rename = "stop_recording")]
	StopRecording,
	#[serde(rename = "get_recording")]
	GetRecording,
	#[serde(rename = "list_tabs")]
	ListTabs,
	#[serde(rename = "open_tab")]
	OpenTab,
	#[serde(rename = "close_tab")]
	CloseTab,
	#[serde(rename = "claim_tab")]
	ClaimTab,
	#[serde(rename = "release_tab")]
	ReleaseTab,
	#[serde(rename = "set_tab_sharing")]
	SetTabSharing,
}

impl CommandKind {
	pub const ALL: [CommandKind; 22] = [
		CommandKind::Click,
		CommandKind::Snapshot,
		CommandKind::Scroll,
		CommandKind::Hover,
		CommandKind::Type,
		CommandKind::Enter,
		CommandKind::Back,
		CommandKind::Forward,
		CommandKind::WaitForSelector,
		CommandKind::Find,
		CommandKind::Navigate,
		CommandKind::Select,
		CommandKind::Screenshot,
		CommandKind::StartRecording,
		CommandKind::StopRecording,
		CommandKind::GetRecording,
		CommandKind::ListTabs,
		CommandKind::OpenTab,
		CommandKind::CloseTab,
		CommandKind::ClaimTab,
		CommandKind::ReleaseTab,
		CommandKind::SetTabSharing,
	];

	/// Wire name used in the `type` field.
	pub fn as_str(self) -> &'static str {
		match self {
			CommandKind::Click => "click",
			CommandKind::Snapshot => "snapshot",
			CommandKind::Scroll => "scroll",
			CommandKind::Hover => "hover",
			CommandKind::Type => "type",
			CommandKind::Enter => "enter",
			CommandKind::Back => "back",
			CommandKind::Forward => "forward",
			CommandKind::WaitForSelector => "waitForSelector",
			CommandKind::Find => "find",
			CommandKind::Navigate => "navigate",
			CommandKind::Select => "select",
			CommandKind::Screenshot => "screenshot",
			CommandKind::StartRecording => "start_recording",
			CommandKind::StopRecording => "stop_recording",
			CommandKind::GetRecording => "get_recording",
			CommandKind::ListTabs => "list_tabs",
			CommandKind::OpenTab => "open_tab",
			CommandKind::CloseTab => "close_tab",
			CommandKind::ClaimTab => "claim_tab",
			CommandKind::ReleaseTab => "release_tab",
			CommandKind::SetTabSharing => "set_tab_sharing",
		}
	}
}

impl fmt::Display for CommandKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Returned when parsing a string that names no [`CommandKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCommandKind(pub String);

impl fmt::Display for UnknownCommandKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "unknown command type: {}", self.0)
	}
}

impl std::error::Error for UnknownCommandKind {}

impl FromStr for CommandKind {
	type Err = UnknownCommandKind;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		CommandKind::ALL
			.into_iter()
			.find(|kind| kind.as_str() == s)
			.ok_or_else(|| UnknownCommandKind(s.to_string()))
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickPayload {
	#[serde(default)]
	pub selector: String,
}

/// Options forwarded to the extension's page capture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotPayload {
	#[serde(rename = "includeHidden", default, skip_serializing_if = "is_false")]
	pub include_hidden: bool,
	#[serde(rename = "maxElements", default, skip_serializing_if = "Option::is_none")]
	pub max_elements: Option<u32>,
	#[serde(rename = "maxText", default, skip_serializing_if = "Option::is_none")]
	pub max_text: Option<u32>,
	#[serde(rename = "includeHTML", default, skip_serializing_if = "is_false")]
	pub include_html: bool,
	#[serde(rename = "maxHTML", default, skip_serializing_if = "Option::is_none")]
	pub max_html: Option<u32>,
	#[serde(rename = "maxHTMLTokens", default, skip_serializing_if = "Option::is_none")]
	pub max_html_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollPayload {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub delta_x: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub delta_y: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub selector: Option<String>,
	/// `auto` or `smooth`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub behavior: Option<String>,
	/// `start`, `center`, `end` or `nearest` when scrolling an element into view.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub block: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoverPayload {
	#[serde(default)]
	pub selector: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypePayload {
	#[serde(default)]
	pub selector: String,
	#[serde(default)]
	pub text: String,
	#[serde(default, skip_serializing_if = "is_false")]
	pub press_enter: bool,
}

/// Key press against a selector, or against the focused element when no
/// selector is given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterPayload {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub selector: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigatePayload {
	#[serde(default)]
	pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindPayload {
	#[serde(default)]
	pub text: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub limit: Option<u32>,
	/// Characters of surrounding text returned with each match.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub radius: Option<u32>,
	#[serde(default, skip_serializing_if = "is_false")]
	pub case_sensitive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitForSelectorPayload {
	#[serde(default)]
	pub selector: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub timeout_ms: Option<u64>,
}

/// Option selection on a `<select>` element.
///
/// Single-value fields (`value`, `label`, `index`) and their plural forms are
/// mutually exclusive on the extension side; the bridge forwards them as given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectPayload {
	#[serde(default)]
	pub selector: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub value: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub index: Option<u32>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub values: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub labels: Vec<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub indices: Vec<u32>,
	/// `exact` or `contains`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub match_mode: Option<String>,
	#[serde(default, skip_serializing_if = "is_false")]
	pub toggle: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotPayload {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub selector: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub padding: Option<u32>,
	/// `png` or `jpeg`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub format: Option<String>,
	/// JPEG quality in `0.0..=1.0`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub quality: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_width: Option<u32>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenTabPayload {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	#[serde(default, skip_serializing_if = "is_false")]
	pub active: bool,
	#[serde(default, skip_serializing_if = "is_false")]
	pub pinned: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseTabPayload {
	#[serde(default)]
	pub tab_id: i64,
}

/// Claims a tab for the calling agent so other agents cannot drive it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimTabPayload {
	#[serde(default)]
	pub tab_id: i64,
	/// `exclusive` or `shared`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub mode: Option<String>,
	#[serde(default, skip_serializing_if = "is_false")]
	pub require_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseTabPayload {
	#[serde(default)]
	pub tab_id: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTabSharingPayload {
	#[serde(default)]
	pub tab_id: i64,
	#[serde(default)]
	pub allow_shared: bool,
}

/// Typed command payload, one variant per [`CommandKind`].
///
/// Commands without options are unit variants and travel as `"payload": {}`.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandBody {
	Click(ClickPayload),
	Snapshot(SnapshotPayload),
	Scroll(ScrollPayload),
	Hover(HoverPayload),
	Type(TypePayload),
	Enter(EnterPayload),
	Back,
	Forward,
	WaitForSelector(WaitForSelectorPayload),
	Find(FindPayload),
	Navigate(NavigatePayload),
	Select(SelectPayload),
	Screenshot(ScreenshotPayload),
	StartRecording,
	StopRecording,
	GetRecording,
	ListTabs,
	OpenTab(OpenTabPayload),
	CloseTab(CloseTabPayload),
	ClaimTab(ClaimTabPayload),
	ReleaseTab(ReleaseTabPayload),
	SetTabSharing(SetTabSharingPayload),
}

impl CommandBody {
	pub fn kind(&self) -> CommandKind {
		match self {
			CommandBody::Click(_) => CommandKind::Click,
			CommandBody::Snapshot(_) => CommandKind::Snapshot,
			CommandBody::Scroll(_) => CommandKind::Scroll,
			CommandBody::Hover(_) => CommandKind::Hover,
			CommandBody::Type(_) => CommandKind::Type,
			CommandBody::Enter(_) => CommandKind::Enter,
			CommandBody::Back => CommandKind::Back,
			CommandBody::Forward => CommandKind::Forward,
			CommandBody::WaitForSelector(_) => CommandKind::WaitForSelector,
			CommandBody::Find(_) => CommandKind::Find,
			CommandBody::Navigate(_) => CommandKind::Navigate,
			CommandBody::Select(_) => CommandKind::Select,
			CommandBody::Screenshot(_) => CommandKind::Screenshot,
			CommandBody::StartRecording => CommandKind::StartRecording,
			CommandBody::StopRecording => CommandKind::StopRecording,
			CommandBody::GetRecording => CommandKind::GetRecording,
			CommandBody::ListTabs => CommandKind::ListTabs,
			CommandBody::OpenTab(_) => CommandKind::OpenTab,
			CommandBody::CloseTab(_) => CommandKind::CloseTab,
			CommandBody::ClaimTab(_) => CommandKind::ClaimTab,
			CommandBody::ReleaseTab(_) => CommandKind::ReleaseTab,
			CommandBody::SetTabSharing(_) => CommandKind::SetTabSharing,
		}
	}

	/// Rebuilds a body from its wire `type` and `payload`.
	///
	/// A `null` or missing payload decodes to the payload's default.
	pub fn from_parts(kind: CommandKind, payload: Value) -> serde_json::Result<Self> {
		let body = match kind {
			CommandKind::Click => CommandBody::Click(decode(payload)?),
			CommandKind::Snapshot => CommandBody::Snapshot(decode(payload)?),
			CommandKind::Scroll => CommandBody::Scroll(decode(payload)?),
			CommandKind::Hover => CommandBody::Hover(decode(payload)?),
			CommandKind::Type => CommandBody::Type(decode(payload)?),
			CommandKind::Enter => CommandBody::Enter(decode(payload)?),
			CommandKind::Back => CommandBody::Back,
			CommandKind::Forward => CommandBody::Forward,
			CommandKind::WaitForSelector => CommandBody::WaitForSelector(decode(payload)?),
			CommandKind::Find => CommandBody::Find(decode(payload)?),
			CommandKind::Navigate => CommandBody::Navigate(decode(payload)?),
			CommandKind::Select => CommandBody::Select(decode(payload)?),
			CommandKind::Screenshot => CommandBody::Screenshot(decode(payload)?),
			CommandKind::StartRecording => CommandBody::StartRecording,
			CommandKind::StopRecording => CommandBody::StopRecording,
			CommandKind::GetRecording => CommandBody::GetRecording,
			CommandKind::ListTabs => CommandBody::ListTabs,
			CommandKind::OpenTab => CommandBody::OpenTab(decode(payload)?),
			CommandKind::CloseTab => CommandBody::CloseTab(decode(payload)?),
			CommandKind::ClaimTab => CommandBody::ClaimTab(decode(payload)?),
			CommandKind::ReleaseTab => CommandBody::ReleaseTab(decode(payload)?),
			CommandKind::SetTabSharing => CommandBody::SetTabSharing(decode(payload)?),
		};
		Ok(body)
	}
}

fn decode<T: DeserializeOwned + Default>(payload: Value) -> serde_json::Result<T> {
	if payload.is_null() {
		return Ok(T::default());
	}
	serde_json::from_value(payload)
}

/// Serializes only the payload half of a [`CommandBody`].
struct PayloadRef<'a>(&'a CommandBody);

impl Serialize for PayloadRef<'_> {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self.0 {
			CommandBody::Click(p) => p.serialize(serializer),
			CommandBody::Snapshot(p) => p.serialize(serializer),
			CommandBody::Scroll(p) => p.serialize(serializer),
			CommandBody::Hover(p) => p.serialize(serializer),
			CommandBody::Type(p) => p.serialize(serializer),
			CommandBody::Enter(p) => p.serialize(serializer),
			CommandBody::WaitForSelector(p) => p.serialize(serializer),
			CommandBody::Find(p) => p.serialize(serializer),
			CommandBody::Navigate(p) => p.serialize(serializer),
			CommandBody::Select(p) => p.serialize(serializer),
			CommandBody::Screenshot(p) => p.serialize(serializer),
			CommandBody::OpenTab(p) => p.serialize(serializer),
			CommandBody::CloseTab(p) => p.serialize(serializer),
			CommandBody::ClaimTab(p) => p.serialize(serializer),
			CommandBody::ReleaseTab(p) => p.serialize(serializer),
			CommandBody::SetTabSharing(p) => p.serialize(serializer),
			CommandBody::Back
			| CommandBody::Forward
			| CommandBody::StartRecording
			| CommandBody::StopRecording
			| CommandBody::GetRecording
			| CommandBody::ListTabs => serializer.serialize_map(Some(0))?.end(),
		}
	}
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireCommandRef<'a> {
	id: &'a str,
	#[serde(rename = "type")]
	kind: CommandKind,
	#[serde(skip_serializing_if = "Option::is_none")]
	session_id: Option<&'a str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	tab_id: Option<i64>,
	payload: PayloadRef<'a>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireCommand {
	id: String,
	#[serde(rename = "type")]
	kind: CommandKind,
	#[serde(default)]
	session_id: Option<String>,
	#[serde(default)]
	tab_id: Option<i64>,
	#[serde(default)]
	payload: Value,
}

impl TryFrom<WireCommand> for Command {
	type Error = serde_json::Error;

	fn try_from(wire: WireCommand) -> Result<Self, Self::Error> {
		Ok(Command {
			id: wire.id,
			session_id: wire.session_id,
			tab_id: wire.tab_id,
			body: CommandBody::from_parts(wire.kind, wire.payload)?,
		})
	}
}

/// A single request sent to an extension session.
///
/// `id` correlates the eventual [`Response`](crate::Response); it must be
/// unique among in-flight commands. `session_id` selects the destination
/// session on the bridge side and `tab_id` selects the tab inside it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "WireCommand")]
pub struct Command {
	pub id: String,
	pub session_id: Option<String>,
	pub tab_id: Option<i64>,
	pub body: CommandBody,
}

impl Serialize for Command {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		WireCommandRef {
			id: &self.id,
			kind: self.body.kind(),
			session_id: self.session_id.as_deref(),
			tab_id: self.tab_id,
			payload: PayloadRef(&self.body),
		}
		.serialize(serializer)
	}
}

impl Command {
	/// Creates an untargeted command with a fresh v4 UUID as its id.
	pub fn new(body: CommandBody) -> Self {
		Self::with_id(uuid::Uuid::new_v4().to_string(), body)
	}

	pub fn with_id(id: impl Into<String>, body: CommandBody) -> Self {
		Self {
			id: id.into(),
			session_id: None,
			tab_id: None,
			body,
		}
	}

	/// Copies the set fields of `target` into the routing fields.
	pub fn targeted(mut self, target: &Target) -> Self {
		if let Some(session_id) = target.session_id.as_deref().filter(|s| !s.is_empty()) {
			self.session_id = Some(session_id.to_string());
		}
		if let Some(tab_id) = target.tab_id {
			self.tab_id = Some(tab_id);
		}
		self
	}

	pub fn kind(&self) -> CommandKind {
		self.body.kind()
	}

	/// Routing fields as a [`Target`].
	pub fn target(&self) -> Target {
		Target {
			session_id: self.session_id.clone(),
			tab_id: self.tab_id,
		}
	}

	pub fn to_json(&self) -> serde_json::Result<String> {
		serde_json::to_string(self)
	}
}
