use serde::{Deserialize, Serialize};
use surf_protocol::{Element, SnapshotData};

/// Unreduced page capture, exactly as the extension reports it.
pub type RawPage = SnapshotData;

fn is_empty(value: &str) -> bool {
	value.is_empty()
}

/// High-level interaction suggested for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
	Open,
	Click,
	Toggle,
	Select,
	Type,
}

impl Verb {
	pub fn as_str(self) -> &'static str {
		match self {
			Verb::Open => "open",
			Verb::Click => "click",
			Verb::Toggle => "toggle",
			Verb::Select => "select",
			Verb::Type => "type",
		}
	}
}

impl std::fmt::Display for Verb {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
	pub verb: Verb,
	pub selector: String,
	#[serde(default, skip_serializing_if = "is_empty")]
	pub label: String,
	/// `href=…`, `type=…` or `name=…`.
	#[serde(default, skip_serializing_if = "is_empty")]
	pub hint: String,
}

/// Bounded, reduced view of a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
	/// Assigned by the [`SnapshotStore`](super::SnapshotStore).
	#[serde(skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
	pub url: String,
	#[serde(skip_serializing_if = "is_empty")]
	pub title: String,
	#[serde(skip_serializing_if = "is_empty")]
	pub text: String,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub elements: Vec<Element>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub actions: Vec<Action>,
}
