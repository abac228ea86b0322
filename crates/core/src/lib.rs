//! SurfingBro browser layer.
//!
//! Drives browser extensions connected to a [`surf_runtime::Bridge`] and
//! turns their raw page captures into compact snapshots an agent can act on.
//!
//! # Main Types
//!
//! - [`BrowserClient`] - One async method per extension command
//! - [`CallContext`] - Optional session/tab target and deadline for a call
//! - [`Reducer`] - Raw page capture to bounded [`Snapshot`]
//! - [`SnapshotStore`] - Reduced snapshots by id plus "latest"
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use surf::{BrowserClient, CallContext};
//! use surf_protocol::{SnapshotPayload, Target};
//! use surf_runtime::{Bridge, BridgeOptions};
//!
//! let bridge = Arc::new(Bridge::new(BridgeOptions::default()));
//! let client = BrowserClient::new(bridge);
//! let ctx = CallContext::new().with_target(Target::tab(42));
//! let snapshot = client.snapshot(&ctx, SnapshotPayload::default()).await?;
//! for action in &snapshot.actions {
//!     println!("{} {} {}", action.verb, action.selector, action.label);
//! }
//! ```

pub mod client;
pub mod context;
pub mod error;
pub mod page;
pub mod results;

pub use client::{BrowserClient, validate};
pub use context::CallContext;
pub use error::{Error, Result};
pub use page::{
	Action, LATEST, RawPage, ReduceOptions, Reducer, Snapshot, SnapshotStore, Verb,
};
pub use results::{
	ClickResult, EnterResult, FindMatch, FindResult, HistoryResult, HoverResult, NavigateResult,
	RecordedAction, RecordingState, ScreenshotResult, ScrollResult, SelectResult, TabInfo,
	TypeResult, WaitForSelectorResult,
};
