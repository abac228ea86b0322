//! Request/response bridge over extension sessions.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use surf_protocol::{Command, Response};

use crate::error::{Error, Result};
use crate::pending::PendingTable;
use crate::registry::SessionRegistry;
use crate::session::{Session, SessionInfo, SessionMeta};
use crate::transport::{FrameSink, InboundFrame};

/// Deadline for writing one frame to a session.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Deadline for a reply when the caller gives none.
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(15);

/// Timing knobs for a [`Bridge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeOptions {
	pub write_timeout: Duration,
	pub command_timeout: Duration,
}

impl Default for BridgeOptions {
	fn default() -> Self {
		Self {
			write_timeout: DEFAULT_WRITE_TIMEOUT,
			command_timeout: DEFAULT_COMMAND_TIMEOUT,
		}
	}
}

/// Routes commands to connected extensions and correlates their replies.
///
/// Each command is matched to its response by id through a [`PendingTable`];
/// sessions are chosen through a [`SessionRegistry`]. Commands to different
/// sessions, and concurrent commands to the same session, proceed
/// independently. Only frame writes on one socket are serialized.
#[derive(Default)]
pub struct Bridge {
	registry: SessionRegistry,
	pending: PendingTable,
	options: BridgeOptions,
}

impl Bridge {
	pub fn new(options: BridgeOptions) -> Self {
		Self {
			registry: SessionRegistry::new(),
			pending: PendingTable::new(),
			options,
		}
	}

	pub fn options(&self) -> BridgeOptions {
		self.options
	}

	pub fn registry(&self) -> &SessionRegistry {
		&self.registry
	}

	pub fn pending(&self) -> &PendingTable {
		&self.pending
	}

	/// Registers a freshly upgraded socket. The new session becomes active.
	pub fn connect(&self, sink: Box<dyn FrameSink>, meta: SessionMeta) -> Arc<Session> {
		let session = self.registry.connect(sink, meta);
		tracing::info!(
			target = "surf.bridge",
			session = %session.id(),
			remote = session.meta().remote_addr.as_deref().unwrap_or("-"),
			sessions = self.registry.count(),
			"browser session connected"
		);
		session
	}

	pub fn list_sessions(&self) -> Vec<SessionInfo> {
		self.registry.list_sessions()
	}

	pub fn session_count(&self) -> usize {
		self.registry.count()
	}

	pub fn active_session_id(&self) -> Option<String> {
		self.registry.active_id()
	}

	/// Force-disconnects a session and returns its final state.
	///
	/// `"active"` or an empty id selects the active session.
	pub async fn disconnect_session(&self, id: &str) -> Result<SessionInfo> {
		let lookup = match id {
			"" | "active" => None,
			id => Some(id),
		};
		let (session, was_active) = self.registry.resolve_with_active(lookup)?;
		let info = session.info(was_active);

		self.remove_session(session.id());
		session.close(self.options.write_timeout).await;
		tracing::info!(target = "surf.bridge", session = %info.id, "browser session disconnected by admin");
		Ok(info)
	}

	/// Sends `command` and waits up to the default deadline for its reply.
	pub async fn send_command(&self, command: &Command) -> Result<Response> {
		self.send_command_with_timeout(command, self.options.command_timeout)
			.await
	}

	/// Sends `command` and waits up to `timeout` for its reply.
	///
	/// The reply slot is open before the frame is written, so a fast reply
	/// cannot be missed. Failing `ok` responses are returned as-is; see
	/// [`ResponseExt`](crate::ResponseExt) to turn them into errors.
	pub async fn send_command_with_timeout(&self, command: &Command, timeout: Duration) -> Result<Response> {
		let session = self.registry.resolve(command.session_id.as_deref())?;
		let frame = command.to_json()?;
		let reply = self.pending.register(&command.id)?;

		tracing::debug!(
			target = "surf.bridge",
			id = %command.id,
			kind = %command.kind(),
			session = %session.id(),
			"sending command"
		);

		// A failed write only costs this command its slot; the read loop
		// decides when the session is gone.
		if let Err(err) = session.send_text(frame, self.options.write_timeout).await {
			drop(reply);
			tracing::warn!(target = "surf.bridge", id = %command.id, session = %session.id(), error = %err, "write failed");
			return Err(err);
		}

		let response = reply.wait(timeout).await;
		if let Err(Error::Timeout { id, .. }) = &response {
			tracing::debug!(target = "surf.bridge", id = %id, "command timed out");
		}
		response
	}

	/// Hands a response to its waiter. Unknown ids are ignored.
	pub fn deliver(&self, response: Response) -> bool {
		let delivered = self.pending.deliver(response);
		if !delivered {
			tracing::debug!(target = "surf.bridge", "response without a waiter");
		}
		delivered
	}

	/// Parses one inbound text frame and delivers it.
	pub fn handle_frame(&self, session: &Session, text: &str) {
		match serde_json::from_str::<Response>(text) {
			Ok(response) if response.id.is_empty() => {
				tracing::trace!(target = "surf.bridge", session = %session.id(), "ignoring frame without id");
			}
			Ok(response) => {
				self.deliver(response);
			}
			Err(err) => {
				tracing::warn!(target = "surf.bridge", session = %session.id(), error = %err, "unparseable frame");
			}
		}
	}

	/// Drives a session's read half until the peer goes away.
	///
	/// On exit the session is removed from the registry; outstanding
	/// commands to it simply run into their deadlines.
	pub async fn run_session<S, E>(&self, session: Arc<Session>, mut frames: S)
	where
		S: Stream<Item = std::result::Result<InboundFrame, E>> + Unpin,
		E: Display,
	{
		loop {
			let frame = tokio::select! {
				frame = frames.next() => frame,
				_ = session.closed() => break,
			};
			match frame {
				Some(Ok(InboundFrame::Text(text))) => {
					session.touch();
					self.handle_frame(&session, &text);
				}
				Some(Ok(InboundFrame::Binary(bytes))) => {
					session.touch();
					match std::str::from_utf8(&bytes) {
						Ok(text) => self.handle_frame(&session, text),
						Err(_) => {
							tracing::warn!(target = "surf.bridge", session = %session.id(), "non-utf8 binary frame");
						}
					}
				}
				Some(Ok(InboundFrame::Control)) => session.touch(),
				Some(Ok(InboundFrame::Close)) | None => break,
				Some(Err(err)) => {
					tracing::debug!(target = "surf.bridge", session = %session.id(), error = %err, "read failed");
					break;
				}
			}
		}

		if self.remove_session(session.id()) {
			tracing::info!(target = "surf.bridge", session = %session.id(), "browser session disconnected");
		}
	}

	fn remove_session(&self, id: &str) -> bool {
		let removed = self.registry.disconnect(id).is_some();
		if removed {
			tracing::debug!(
				target = "surf.bridge",
				session = %id,
				active = self.registry.active_id().as_deref().unwrap_or("-"),
				"session removed"
			);
		}
		removed
	}
}

#[cfg(test)]
mod tests;
