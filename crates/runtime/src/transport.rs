//! Frame-level seam between the bridge and a concrete socket.
//!
//! The bridge never touches a WebSocket type directly. Servers split their
//! socket into a [`FrameSink`] for outbound text frames and a stream of
//! [`InboundFrame`]s for the read loop.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::{Error, Result};

mod ws;

pub use ws::{WebSocketSink, split_websocket};

/// Write half of a session's socket.
///
/// Callers serialize access; implementations need not be reentrant.
#[async_trait]
pub trait FrameSink: Send {
	/// Writes one text frame.
	async fn send_text(&mut self, text: String) -> Result<()>;

	/// Sends a close frame. Errors are ignored by the bridge.
	async fn close(&mut self) -> Result<()>;
}

/// Frame received from a session's socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
	Text(String),
	Binary(Vec<u8>),
	/// Ping or pong; only refreshes liveness.
	Control,
	Close,
}

/// [`FrameSink`] backed by a bounded channel.
///
/// Writes block while the channel is full, so the bridge's write deadline
/// applies exactly as it would to a slow socket.
pub struct ChannelSink {
	tx: mpsc::Sender<String>,
}

impl ChannelSink {
	pub fn new(capacity: usize) -> (Self, mpsc::Receiver<String>) {
		let (tx, rx) = mpsc::channel(capacity);
		(Self { tx }, rx)
	}
}

#[async_trait]
impl FrameSink for ChannelSink {
	async fn send_text(&mut self, text: String) -> Result<()> {
		self.tx
			.send(text)
			.await
			.map_err(|_| Error::Transport("peer channel closed".into()))
	}

	async fn close(&mut self) -> Result<()> {
		Ok(())
	}
}
