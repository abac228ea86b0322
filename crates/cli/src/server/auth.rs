use std::net::SocketAddr;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use super::AppState;
use crate::error::ApiError;

const AUTHORIZATION: &str = "authorization";
const X_AUTH_TOKEN: &str = "x-auth-token";
const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Token from `Authorization: Bearer <t>` or `X-Auth-Token`.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
	let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
	if let Some(token) = header(AUTHORIZATION).and_then(|v| v.strip_prefix("Bearer ")) {
		return Some(token);
	}
	header(X_AUTH_TOKEN).filter(|t| !t.is_empty())
}

fn authorize(expected: &str, headers: &HeaderMap) -> Result<(), ApiError> {
	if expected.is_empty() {
		return Err(ApiError::AuthNotConfigured);
	}
	match token_from_headers(headers) {
		Some(token) if token == expected => Ok(()),
		_ => Err(ApiError::Unauthorized),
	}
}

pub async fn require_api_token(
	State(state): State<AppState>,
	request: Request,
	next: Next,
) -> Result<Response, ApiError> {
	authorize(&state.access.api_token, request.headers())?;
	Ok(next.run(request).await)
}

pub async fn require_admin_token(
	State(state): State<AppState>,
	request: Request,
	next: Next,
) -> Result<Response, ApiError> {
	authorize(&state.access.admin_token, request.headers())?;
	Ok(next.run(request).await)
}

/// Empty `allowed` accepts everything, otherwise `origin` must match exactly.
pub fn origin_allowed(allowed: &[String], origin: Option<&str>) -> bool {
	if allowed.is_empty() {
		return true;
	}
	origin.is_some_and(|origin| allowed.iter().any(|a| a == origin))
}

/// Client address, preferring proxy headers over the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr) -> String {
	let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
	if let Some(first) = header(X_FORWARDED_FOR)
		.and_then(|xff| xff.split(',').next())
		.map(str::trim)
		.filter(|ip| !ip.is_empty())
	{
		return first.to_string();
	}
	if let Some(real) = header(X_REAL_IP).filter(|ip| !ip.is_empty()) {
		return real.to_string();
	}
	peer.ip().to_string()
}
