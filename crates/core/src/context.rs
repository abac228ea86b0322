use std::time::Duration;

use surf_protocol::Target;

/// Per-call routing and deadline passed to every browser operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallContext {
	target: Option<Target>,
	timeout: Option<Duration>,
}

impl CallContext {
	pub fn new() -> Self {
		Self::default()
	}

	/// Attaches `target` if it selects a session or a tab.
	///
	/// An empty session id and a tab id of `0` count as unset, so an empty
	/// target leaves the context unchanged.
	pub fn with_target(mut self, target: Target) -> Self {
		let target = Target {
			session_id: target.session_id.filter(|id| !id.is_empty()),
			tab_id: target.tab_id.filter(|id| *id != 0),
		};
		if !target.is_empty() {
			self.target = Some(target);
		}
		self
	}

	/// Overrides the client's round-trip deadline for this call.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);
		self
	}

	pub fn target(&self) -> Option<&Target> {
		self.target.as_ref()
	}

	pub fn timeout(&self) -> Option<Duration> {
		self.timeout
	}
}
