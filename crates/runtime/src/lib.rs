//! Runtime side of the extension bridge.
//!
//! Browser extensions connect over WebSocket and register as sessions. The
//! daemon sends them [`surf_protocol::Command`]s and waits for the matching
//! [`surf_protocol::Response`]:
//!
//! - **Registry**: live sessions plus the active-session designation
//! - **Pending table**: one reply slot per in-flight command id
//! - **Bridge**: `send_command` / `deliver` and the per-session read loop
//! - **Transport**: the [`FrameSink`] / [`InboundFrame`] seam to real sockets
//!
//! ```text
//! caller ──send_command──► Bridge ──frame──► Session (socket)
//!   ▲                        │                    │
//!   └──── oneshot ◄── PendingTable ◄──deliver─── read loop
//! ```

pub mod bridge;
pub mod error;
pub mod pending;
pub mod registry;
pub mod session;
pub mod transport;

pub use bridge::{Bridge, BridgeOptions, DEFAULT_COMMAND_TIMEOUT, DEFAULT_WRITE_TIMEOUT};
pub use error::{Error, ResponseExt, Result};
pub use pending::{PendingReply, PendingTable};
pub use registry::SessionRegistry;
pub use session::{Session, SessionInfo, SessionMeta, now_ms};
pub use transport::{ChannelSink, FrameSink, InboundFrame, WebSocketSink, split_websocket};
