//! Adapter from an upgraded axum [`WebSocket`] to the bridge seam.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, Stream, StreamExt};

use super::{FrameSink, InboundFrame};
use crate::bridge::Bridge;
use crate::error::{Error, Result};
use crate::session::{Session, SessionMeta};

/// Write half of an axum WebSocket.
pub struct WebSocketSink {
	inner: SplitSink<WebSocket, Message>,
}

#[async_trait]
impl FrameSink for WebSocketSink {
	async fn send_text(&mut self, text: String) -> Result<()> {
		self.inner
			.send(Message::Text(text.into()))
			.await
			.map_err(|err| Error::Transport(err.to_string()))
	}

	async fn close(&mut self) -> Result<()> {
		self.inner
			.send(Message::Close(None))
			.await
			.map_err(|err| Error::Transport(err.to_string()))
	}
}

fn inbound(message: Message) -> InboundFrame {
	match message {
		Message::Text(text) => InboundFrame::Text(text.as_str().to_owned()),
		Message::Binary(bytes) => InboundFrame::Binary(bytes.to_vec()),
		Message::Ping(_) | Message::Pong(_) => InboundFrame::Control,
		Message::Close(_) => InboundFrame::Close,
	}
}

/// Splits a socket into the bridge's sink and inbound frame stream.
pub fn split_websocket(
	socket: WebSocket,
) -> (
	WebSocketSink,
	impl Stream<Item = std::result::Result<InboundFrame, axum::Error>> + Unpin,
) {
	let (sink, stream) = socket.split();
	(WebSocketSink { inner: sink }, stream.map(|frame| frame.map(inbound)))
}

impl Bridge {
	/// Registers `socket` as a new session and runs its read loop to the end.
	pub async fn serve_websocket(&self, socket: WebSocket, meta: SessionMeta) -> Arc<Session> {
		let (sink, frames) = split_websocket(socket);
		let session = self.connect(Box::new(sink), meta);
		self.run_session(Arc::clone(&session), frames).await;
		session
	}
}
