//! Page capture returned by the `snapshot` command.

use serde::{Deserialize, Serialize};

use crate::de::null_as_default;

fn is_empty(value: &str) -> bool {
	value.is_empty()
}

/// One actionable DOM node.
///
/// Absent attributes are empty strings and are omitted on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Element {
	#[serde(skip_serializing_if = "is_empty", deserialize_with = "null_as_default")]
	pub tag: String,
	#[serde(skip_serializing_if = "is_empty", deserialize_with = "null_as_default")]
	pub text: String,
	#[serde(skip_serializing_if = "is_empty", deserialize_with = "null_as_default")]
	pub selector: String,
	#[serde(skip_serializing_if = "is_empty", deserialize_with = "null_as_default")]
	pub href: String,
	#[serde(skip_serializing_if = "is_empty", deserialize_with = "null_as_default")]
	pub input_type: String,
	#[serde(skip_serializing_if = "is_empty", deserialize_with = "null_as_default")]
	pub name: String,
	#[serde(skip_serializing_if = "is_empty", deserialize_with = "null_as_default")]
	pub id: String,
	#[serde(skip_serializing_if = "is_empty", deserialize_with = "null_as_default")]
	pub aria_label: String,
	#[serde(skip_serializing_if = "is_empty", deserialize_with = "null_as_default")]
	pub title: String,
	#[serde(skip_serializing_if = "is_empty", deserialize_with = "null_as_default")]
	pub alt: String,
	#[serde(skip_serializing_if = "is_empty", deserialize_with = "null_as_default")]
	pub value: String,
	#[serde(skip_serializing_if = "is_empty", deserialize_with = "null_as_default")]
	pub placeholder: String,
	/// Text of neighbouring nodes, for disambiguating similar elements.
	#[serde(skip_serializing_if = "is_empty", deserialize_with = "null_as_default")]
	pub context: String,
}

/// Unreduced capture as sent by the extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotData {
	#[serde(deserialize_with = "null_as_default")]
	pub url: String,
	#[serde(skip_serializing_if = "is_empty", deserialize_with = "null_as_default")]
	pub title: String,
	#[serde(skip_serializing_if = "is_empty", deserialize_with = "null_as_default")]
	pub text: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub html: Option<String>,
	#[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
	pub elements: Vec<Element>,
}
