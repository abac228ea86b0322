//! HTTP surface of the daemon.
//!
//! `/ws` accepts extension sockets, `/api` drives browsers for agents and
//! `/admin` inspects or kicks sessions. The two route groups are guarded by
//! separate tokens.

mod admin;
mod api;
mod auth;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::{ConnectInfo, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::http::header::{ORIGIN, USER_AGENT};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use surf::BrowserClient;
use surf_runtime::{Bridge, SessionMeta};
use tokio::net::TcpListener;

pub use admin::{BrowserEntry, DisconnectReply, Status};
pub use api::{CommandRequest, RouteParams, SnapshotRequest};
pub use auth::{client_ip, origin_allowed, token_from_headers};

use crate::config::Config;
use crate::error::ApiError;

/// Tokens and origin policy checked on every request.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
	pub api_token: String,
	pub admin_token: String,
	pub allowed_origins: Vec<String>,
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
	pub bridge: Arc<Bridge>,
	pub client: BrowserClient,
	pub access: Arc<AccessPolicy>,
	pub started_at: Instant,
}

impl AppState {
	/// Builds the bridge, snapshot store and browser client described by `config`.
	pub fn from_config(config: &Config) -> Self {
		let bridge = Arc::new(Bridge::new(config.bridge_options()));
		let client = BrowserClient::new(Arc::clone(&bridge))
			.with_reducer(config.reducer())
			.with_store(Arc::new(config.snapshot_store()))
			.with_timeout(config.bridge_options().command_timeout);
		let access = AccessPolicy {
			api_token: config.auth.api_token.clone(),
			admin_token: config.auth.admin_token.clone(),
			allowed_origins: config.daemon.allowed_origins.clone(),
		};
		Self {
			bridge,
			client,
			access: Arc::new(access),
			started_at: Instant::now(),
		}
	}
}

pub fn router(state: AppState) -> Router {
	let api = Router::new()
		.route("/command", post(api::command))
		.route("/snapshot", post(api::snapshot))
		.route("/snapshots/{id}", get(api::stored_snapshot))
		.route_layer(middleware::from_fn_with_state(state.clone(), auth::require_api_token));

	let admin = Router::new()
		.route("/status", get(admin::status))
		.route("/browsers", get(admin::browsers))
		.route("/browsers/disconnect", post(admin::disconnect))
		.route_layer(middleware::from_fn_with_state(state.clone(), auth::require_admin_token));

	Router::new()
		.route("/health", get(|| async { "OK" }))
		.route("/ws", get(extension_socket))
		.nest("/api", api)
		.nest("/admin", admin)
		.with_state(state)
}

async fn extension_socket(
	ws: WebSocketUpgrade,
	State(state): State<AppState>,
	ConnectInfo(peer): ConnectInfo<SocketAddr>,
	headers: HeaderMap,
) -> Result<Response, ApiError> {
	let origin = headers.get(ORIGIN).and_then(|v| v.to_str().ok());
	if !origin_allowed(&state.access.allowed_origins, origin) {
		return Err(ApiError::OriginNotAllowed(origin.unwrap_or("<none>").to_string()));
	}

	let meta = SessionMeta {
		remote_addr: Some(client_ip(&headers, peer)),
		user_agent: headers
			.get(USER_AGENT)
			.and_then(|v| v.to_str().ok())
			.map(str::to_string),
	};
	Ok(ws
		.on_upgrade(move |socket| async move {
			state.bridge.serve_websocket(socket, meta).await;
		})
		.into_response())
}

/// Serves until `shutdown` resolves, then closes every browser session.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
	F: Future<Output = ()> + Send + 'static,
{
	let bridge = Arc::clone(&state.bridge);
	let app = router(state).into_make_service_with_connect_info::<SocketAddr>();
	let served = axum::serve(listener, app)
		.with_graceful_shutdown(shutdown)
		.await
		.context("HTTP server error");

	for info in bridge.list_sessions() {
		if let Err(err) = bridge.disconnect_session(&info.id).await {
			tracing::debug!(target = "surf.http", session = %info.id, error = %err, "session already gone at shutdown");
		}
	}
	served
}

/// Binds `addr` and serves until `shutdown` resolves.
pub async fn bind_and_serve<F>(addr: SocketAddr, state: AppState, shutdown: F) -> Result<()>
where
	F: Future<Output = ()> + Send + 'static,
{
	let listener = TcpListener::bind(addr)
		.await
		.with_context(|| format!("failed to bind bridge daemon to {addr}"))?;
	let local = listener.local_addr().context("reading bound address")?;
	tracing::info!(target = "surf.http", addr = %local, "bridge daemon listening");
	serve(listener, state, shutdown).await
}
