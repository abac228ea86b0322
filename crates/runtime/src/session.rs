//! A single connected extension.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, watch};

use crate::error::{Error, Result};
use crate::transport::FrameSink;

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_millis() as u64)
		.unwrap_or_default()
}

/// Connection details captured at upgrade time.
#[derive(Debug, Clone, Default)]
pub struct SessionMeta {
	pub remote_addr: Option<String>,
	pub user_agent: Option<String>,
}

/// Point-in-time view of a session for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
	pub id: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub remote_addr: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user_agent: Option<String>,
	pub connected_at: u64,
	pub last_seen: u64,
	pub active: bool,
}

/// One extension connection.
///
/// Writes go through an async mutex so at most one frame is in flight on
/// the socket at a time; reads happen on the session's own read loop.
pub struct Session {
	id: String,
	meta: SessionMeta,
	connected_at: u64,
	last_seen: AtomicU64,
	sink: Mutex<Box<dyn FrameSink>>,
	shutdown: watch::Sender<bool>,
}

impl Session {
	pub(crate) fn new(id: String, sink: Box<dyn FrameSink>, meta: SessionMeta) -> Self {
		let now = now_ms();
		let (shutdown, _) = watch::channel(false);
		Self {
			id,
			meta,
			connected_at: now,
			last_seen: AtomicU64::new(now),
			sink: Mutex::new(sink),
			shutdown,
		}
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn meta(&self) -> &SessionMeta {
		&self.meta
	}

	pub fn connected_at(&self) -> u64 {
		self.connected_at
	}

	pub fn last_seen(&self) -> u64 {
		self.last_seen.load(Ordering::Relaxed)
	}

	/// Records inbound activity.
	pub fn touch(&self) {
		self.last_seen.store(now_ms(), Ordering::Relaxed);
	}

	pub fn info(&self, active: bool) -> SessionInfo {
		SessionInfo {
			id: self.id.clone(),
			remote_addr: self.meta.remote_addr.clone(),
			user_agent: self.meta.user_agent.clone(),
			connected_at: self.connected_at,
			last_seen: self.last_seen(),
			active,
		}
	}

	/// Writes one text frame, bounded by `deadline`.
	///
	/// The deadline covers waiting for the write lock as well as the write.
	pub async fn send_text(&self, text: String, deadline: Duration) -> Result<()> {
		let write = async {
			let mut sink = self.sink.lock().await;
			sink.send_text(text).await
		};
		tokio::time::timeout(deadline, write)
			.await
			.map_err(|_| Error::WriteTimeout(deadline))?
	}

	/// Signals the read loop to stop and sends a best-effort close frame.
	pub async fn close(&self, deadline: Duration) {
		self.shutdown.send_replace(true);
		let close = async {
			let mut sink = self.sink.lock().await;
			sink.close().await
		};
		match tokio::time::timeout(deadline, close).await {
			Ok(Ok(())) => {}
			Ok(Err(err)) => {
				tracing::debug!(target = "surf.bridge", session = %self.id, error = %err, "close frame failed");
			}
			Err(_) => {
				tracing::debug!(target = "surf.bridge", session = %self.id, "close frame timed out");
			}
		}
	}

	pub fn is_closed(&self) -> bool {
		*self.shutdown.borrow()
	}

	/// Resolves once [`Session::close`] has been called.
	pub async fn closed(&self) {
		let mut rx = self.shutdown.subscribe();
		let _ = rx.wait_for(|closed| *closed).await;
	}
}

impl std::fmt::Debug for Session {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Session")
			.field("id", &self.id)
			.field("meta", &self.meta)
			.field("connected_at", &self.connected_at)
			.finish_non_exhaustive()
	}
}
