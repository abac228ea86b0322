use std::time::Duration;

use axum::Json;
use axum::extract::{Query, State};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use surf::{CallContext, TabInfo};
use surf_protocol::Target;
use surf_runtime::SessionInfo;

use super::AppState;
use crate::error::ApiError;

/// Per-session budget for the tab listing in `/admin/browsers`.
const TABS_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Status {
	pub uptime_secs: u64,
	pub browser_sessions: usize,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub active_session: Option<String>,
	pub snapshots: usize,
}

pub async fn status(State(state): State<AppState>) -> Json<Status> {
	Json(Status {
		uptime_secs: state.started_at.elapsed().as_secs(),
		browser_sessions: state.bridge.session_count(),
		active_session: state.bridge.active_session_id(),
		snapshots: state.client.store().len(),
	})
}

/// A session plus its tabs, or the reason they could not be listed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserEntry {
	#[serde(flatten)]
	pub session: SessionInfo,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tabs: Option<Vec<TabInfo>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tabs_error: Option<String>,
}

pub async fn browsers(State(state): State<AppState>) -> Json<Vec<BrowserEntry>> {
	let lookups = state.bridge.list_sessions().into_iter().map(|session| {
		let client = state.client.clone();
		async move {
			let ctx = CallContext::new()
				.with_target(Target::session(session.id.clone()))
				.with_timeout(TABS_TIMEOUT);
			match client.list_tabs(&ctx).await {
				Ok(tabs) => BrowserEntry {
					session,
					tabs: Some(tabs),
					tabs_error: None,
				},
				Err(err) => BrowserEntry {
					session,
					tabs: None,
					tabs_error: Some(err.to_string()),
				},
			}
		}
	});
	Json(join_all(lookups).await)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisconnectQuery {
	#[serde(default)]
	pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisconnectReply {
	pub ok: bool,
	/// The id as requested, so `active` is echoed back.
	pub id: String,
	pub session: SessionInfo,
}

/// `?id=<session>` or `?id=active`.
pub async fn disconnect(
	State(state): State<AppState>,
	Query(query): Query<DisconnectQuery>,
) -> Result<Json<DisconnectReply>, ApiError> {
	let id = query.id.trim();
	if id.is_empty() {
		return Err(ApiError::BadRequest("missing id".into()));
	}
	let session = state
		.bridge
		.disconnect_session(id)
		.await
		.map_err(|err| ApiError::NotFound(err.to_string()))?;
	Ok(Json(DisconnectReply {
		ok: true,
		id: id.to_string(),
		session,
	}))
}
