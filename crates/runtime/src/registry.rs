//! Connected sessions and the active-session designation.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::session::{Session, SessionInfo, SessionMeta};
use crate::transport::FrameSink;

#[derive(Default)]
struct RegistryState {
	/// Insertion order is connection order.
	sessions: IndexMap<String, Arc<Session>>,
	active: Option<String>,
}

/// Set of live sessions.
///
/// `active` is `None` exactly when the map is empty, and otherwise names a
/// member of it. The newest connection always becomes active; when the
/// active session leaves, the most recently connected survivor takes over.
#[derive(Default)]
pub struct SessionRegistry {
	state: RwLock<RegistryState>,
}

impl SessionRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a new connection under a fresh id and makes it active.
	pub fn connect(&self, sink: Box<dyn FrameSink>, meta: SessionMeta) -> Arc<Session> {
		let id = uuid::Uuid::new_v4().to_string();
		let session = Arc::new(Session::new(id.clone(), sink, meta));

		let mut state = self.state.write();
		state.sessions.insert(id.clone(), Arc::clone(&session));
		state.active = Some(id);
		session
	}

	/// Removes a session, reassigning `active` if it pointed there.
	///
	/// Returns `None` if the session was already gone.
	pub fn disconnect(&self, id: &str) -> Option<Arc<Session>> {
		let mut state = self.state.write();
		let removed = state.sessions.shift_remove(id)?;
		if state.active.as_deref() == Some(id) {
			state.active = state.sessions.last().map(|(id, _)| id.clone());
		}
		Some(removed)
	}

	/// Picks the session a command should go to.
	///
	/// `None` or an empty id selects the active session.
	pub fn resolve(&self, session_id: Option<&str>) -> Result<Arc<Session>> {
		self.resolve_with_active(session_id).map(|(session, _)| session)
	}

	/// Like [`resolve`](Self::resolve), also reporting whether the session
	/// was active at the moment it was picked.
	pub fn resolve_with_active(&self, session_id: Option<&str>) -> Result<(Arc<Session>, bool)> {
		let state = self.state.read();
		let session = match session_id.filter(|id| !id.is_empty()) {
			Some(id) => state
				.sessions
				.get(id)
				.cloned()
				.ok_or_else(|| Error::UnknownSession(id.to_string()))?,
			None => state
				.active
				.as_ref()
				.and_then(|id| state.sessions.get(id))
				.cloned()
				.ok_or(Error::NoActiveSession)?,
		};
		let active = state.active.as_deref() == Some(session.id());
		Ok((session, active))
	}

	pub fn get(&self, id: &str) -> Option<Arc<Session>> {
		self.state.read().sessions.get(id).cloned()
	}

	pub fn active_id(&self) -> Option<String> {
		self.state.read().active.clone()
	}

	pub fn count(&self) -> usize {
		self.state.read().sessions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.state.read().sessions.is_empty()
	}

	/// Snapshot of all sessions in connection order.
	pub fn list_sessions(&self) -> Vec<SessionInfo> {
		let state = self.state.read();
		state
			.sessions
			.values()
			.map(|session| session.info(state.active.as_deref() == Some(session.id())))
			.collect()
	}

	/// All session handles in connection order.
	pub fn sessions(&self) -> Vec<Arc<Session>> {
		self.state.read().sessions.values().cloned().collect()
	}
}
