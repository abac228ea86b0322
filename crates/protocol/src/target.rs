use serde::{Deserialize, Serialize};

/// Optional `(session, tab)` routing descriptor.
///
/// An empty target leaves the choice to the bridge (active session) and to the
/// extension (its active tab).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub session_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tab_id: Option<i64>,
}

impl Target {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn session(id: impl Into<String>) -> Self {
		Self::new().with_session(id)
	}

	pub fn tab(id: i64) -> Self {
		Self::new().with_tab(id)
	}

	pub fn with_session(mut self, id: impl Into<String>) -> Self {
		self.session_id = Some(id.into());
		self
	}

	pub fn with_tab(mut self, id: i64) -> Self {
		self.tab_id = Some(id);
		self
	}

	/// Returns `true` when neither field selects anything.
	pub fn is_empty(&self) -> bool {
		self.session_id.as_deref().is_none_or(str::is_empty) && self.tab_id.is_none()
	}
}
