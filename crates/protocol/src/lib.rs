//! Wire protocol shared by the bridge daemon and browser extensions.
//!
//! Every frame on the extension WebSocket is a single JSON object. The daemon
//! sends [`Command`]s and the extension answers each one it acts upon with a
//! [`Response`] carrying the same `id`:
//!
//! ```text
//! Command:  { id, type, sessionId?, tabId?, payload }
//! Response: { id, ok, error?, errorCode?, data? }
//! ```
//!
//! # Main Types
//!
//! - [`Command`] - Envelope with a typed [`CommandBody`] and optional routing
//! - [`CommandKind`] - The closed set of `type` strings
//! - [`Response`] - Reply envelope with [`ErrorCode`] for machine-readable failures
//! - [`Target`] - Optional `(session, tab)` routing descriptor
//! - [`SnapshotData`] / [`Element`] - Raw page capture returned by `snapshot`

mod command;
mod de;
mod response;
mod snapshot;
mod target;

pub use command::{
	ClaimTabPayload, ClickPayload, CloseTabPayload, Command, CommandBody, CommandKind,
	EnterPayload, FindPayload, HoverPayload, NavigatePayload, OpenTabPayload,
	ReleaseTabPayload, ScreenshotPayload, ScrollPayload, SelectPayload, SetTabSharingPayload,
	SnapshotPayload, TypePayload, UnknownCommandKind, WaitForSelectorPayload,
};
pub use de::null_as_default;
pub use response::{ErrorCode, Response};
pub use snapshot::{Element, SnapshotData};
pub use target::Target;

#[cfg(test)]
mod tests;
