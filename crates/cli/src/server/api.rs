use std::time::Duration;

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::Value;
use surf::{CallContext, Snapshot};
use surf_protocol::{CommandBody, CommandKind, Response, SnapshotPayload, Target};

use super::AppState;
use crate::error::ApiError;

/// Optional routing and deadline shared by API requests.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RouteParams {
	pub session_id: Option<String>,
	pub tab_id: Option<i64>,
	pub timeout_ms: Option<u64>,
}

impl RouteParams {
	pub fn context(&self) -> CallContext {
		let target = Target {
			session_id: self.session_id.clone(),
			tab_id: self.tab_id,
		};
		let ctx = CallContext::new().with_target(target);
		match self.timeout_ms {
			Some(ms) if ms > 0 => ctx.with_timeout(Duration::from_millis(ms)),
			_ => ctx,
		}
	}
}

/// Body of `POST /api/command`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandRequest {
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(default)]
	pub payload: Value,
	#[serde(flatten)]
	pub route: RouteParams,
}

impl CommandRequest {
	pub fn body(&self) -> Result<CommandBody, ApiError> {
		let kind: CommandKind = self
			.kind
			.parse()
			.map_err(|err: surf_protocol::UnknownCommandKind| ApiError::BadRequest(err.to_string()))?;
		CommandBody::from_parts(kind, self.payload.clone())
			.map_err(|err| ApiError::BadRequest(format!("invalid {kind} payload: {err}")))
	}
}

/// Body of `POST /api/snapshot`: snapshot options plus routing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotRequest {
	#[serde(flatten)]
	pub options: SnapshotPayload,
	#[serde(flatten)]
	pub route: RouteParams,
}

/// Runs any command and returns the extension's envelope, failed or not.
pub async fn command(
	State(state): State<AppState>,
	Json(request): Json<CommandRequest>,
) -> Result<Json<Response>, ApiError> {
	let body = request.body()?;
	tracing::debug!(target = "surf.http", kind = %body.kind(), "api command");
	let response = state.client.execute(&request.route.context(), body).await?;
	Ok(Json(response))
}

pub async fn snapshot(
	State(state): State<AppState>,
	Json(request): Json<SnapshotRequest>,
) -> Result<Json<Snapshot>, ApiError> {
	let snapshot = state
		.client
		.snapshot(&request.route.context(), request.options)
		.await?;
	Ok(Json(snapshot))
}

/// `{id}` is a snapshot id or `latest`.
pub async fn stored_snapshot(
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<Snapshot>, ApiError> {
	state
		.client
		.store()
		.resolve(&id)
		.map(|snapshot| Json(Snapshot::clone(&snapshot)))
		.ok_or_else(|| ApiError::NotFound(format!("snapshot not found: {id}")))
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use surf_protocol::ClickPayload;

	use super::*;

	#[test]
	fn test_command_request_decodes_type_and_route() {
		let request: CommandRequest = serde_json::from_value(json!({
			"type": "click",
			"payload": {"selector": "#go"},
			"sessionId": "s1",
			"tabId": 7,
			"timeoutMs": 500
		}))
		.unwrap();

		assert_eq!(
			request.body().unwrap(),
			CommandBody::Click(ClickPayload {
				selector: "#go".into()
			})
		);
		let ctx = request.route.context();
		assert_eq!(ctx.target(), Some(&Target::session("s1").with_tab(7)));
		assert_eq!(ctx.timeout(), Some(Duration::from_millis(500)));
	}

	#[test]
	fn test_command_request_without_payload() {
		let request: CommandRequest = serde_json::from_value(json!({"type": "list_tabs"})).unwrap();
		assert_eq!(request.body().unwrap(), CommandBody::ListTabs);
		assert!(request.route.context().target().is_none());
	}

	#[test]
	fn test_command_request_rejects_unknown_type() {
		let request: CommandRequest = serde_json::from_value(json!({"type": "teleport"})).unwrap();
		let err = request.body().unwrap_err();
		assert!(matches!(err, ApiError::BadRequest(ref msg) if msg.contains("teleport")));

		let request: CommandRequest =
			serde_json::from_value(json!({"type": "close_tab", "payload": {"tabId": "nope"}})).unwrap();
		assert!(matches!(request.body(), Err(ApiError::BadRequest(_))));
	}

	#[test]
	fn test_snapshot_request_mixes_options_and_route() {
		let request: SnapshotRequest = serde_json::from_value(json!({
			"includeHTML": true,
			"maxElements": 12,
			"tabId": 4
		}))
		.unwrap();
		assert!(request.options.include_html);
		assert_eq!(request.options.max_elements, Some(12));
		assert_eq!(request.route.context().target(), Some(&Target::tab(4)));
	}
}
