//! HTTP-facing errors and their status codes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use surf_runtime::Error as BridgeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
	#[error("server auth not configured")]
	AuthNotConfigured,

	#[error("unauthorized")]
	Unauthorized,

	#[error("origin not allowed: {0}")]
	OriginNotAllowed(String),

	#[error("{0}")]
	BadRequest(String),

	#[error("{0}")]
	NotFound(String),

	#[error(transparent)]
	Browser(#[from] surf::Error),
}

impl From<BridgeError> for ApiError {
	fn from(err: BridgeError) -> Self {
		ApiError::Browser(err.into())
	}
}

fn bridge_status(err: &BridgeError) -> StatusCode {
	match err {
		BridgeError::NoActiveSession | BridgeError::DuplicateRequest(_) => StatusCode::CONFLICT,
		BridgeError::UnknownSession(_) => StatusCode::NOT_FOUND,
		BridgeError::Timeout { .. } | BridgeError::WriteTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
		BridgeError::Transport(_) | BridgeError::ReplyDropped(_) | BridgeError::Remote { .. } => {
			StatusCode::BAD_GATEWAY
		}
		BridgeError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
	}
}

impl ApiError {
	pub fn status(&self) -> StatusCode {
		match self {
			ApiError::AuthNotConfigured | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
			ApiError::OriginNotAllowed(_) => StatusCode::FORBIDDEN,
			ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
			ApiError::NotFound(_) => StatusCode::NOT_FOUND,
			ApiError::Browser(surf::Error::InvalidInput(_)) => StatusCode::BAD_REQUEST,
			ApiError::Browser(surf::Error::Bridge(err)) => bridge_status(err),
			ApiError::Browser(surf::Error::Decode { .. } | surf::Error::Screenshot(_)) => StatusCode::BAD_GATEWAY,
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = self.status();
		if status.is_server_error() {
			tracing::warn!(target = "surf.http", status = status.as_u16(), error = %self, "request failed");
		} else {
			tracing::debug!(target = "surf.http", status = status.as_u16(), error = %self, "request rejected");
		}

		let mut body = json!({"ok": false, "error": self.to_string()});
		if let ApiError::Browser(err) = &self {
			if let Some(code) = err.code() {
				body["errorCode"] = json!(code);
			}
		}
		(status, Json(body)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use surf_protocol::{CommandKind, ErrorCode};

	use super::*;

	#[test]
	fn test_browser_errors_map_to_statuses() {
		let cases = [
			(ApiError::from(BridgeError::NoActiveSession), StatusCode::CONFLICT),
			(ApiError::from(BridgeError::UnknownSession("s9".into())), StatusCode::NOT_FOUND),
			(
				ApiError::from(BridgeError::Timeout {
					id: "c1".into(),
					timeout: Duration::from_secs(1),
				}),
				StatusCode::GATEWAY_TIMEOUT,
			),
			(
				ApiError::from(BridgeError::WriteTimeout(Duration::from_secs(1))),
				StatusCode::GATEWAY_TIMEOUT,
			),
			(
				ApiError::from(BridgeError::Remote {
					message: "boom".into(),
					code: Some(ErrorCode::ElementNotFound),
				}),
				StatusCode::BAD_GATEWAY,
			),
			(ApiError::from(surf::Error::InvalidInput("selector is required".into())), StatusCode::BAD_REQUEST),
			(
				ApiError::from(surf::Error::Decode {
					kind: CommandKind::Scroll,
					source: serde_json::from_str::<u8>("x").unwrap_err(),
				}),
				StatusCode::BAD_GATEWAY,
			),
		];
		for (err, status) in cases {
			assert_eq!(err.status(), status, "{err}");
		}
	}

	#[test]
	fn test_auth_and_request_errors() {
		assert_eq!(ApiError::AuthNotConfigured.status(), StatusCode::UNAUTHORIZED);
		assert_eq!(ApiError::AuthNotConfigured.to_string(), "server auth not configured");
		assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
		assert_eq!(ApiError::OriginNotAllowed("https://evil.test".into()).status(), StatusCode::FORBIDDEN);
		assert_eq!(ApiError::BadRequest("missing id".into()).status(), StatusCode::BAD_REQUEST);
	}
}
