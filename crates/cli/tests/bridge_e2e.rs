//! Drives the daemon over real sockets: a fake extension on `/ws` and an
//! agent on the HTTP API.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use surf::Snapshot;
use surf_cli::config::Config;
use surf_cli::server::{self, AppState, BrowserEntry, Status};
use surf_protocol::{Command, CommandKind, ErrorCode, Response};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{self, Message};

const API_TOKEN: &str = "api-secret";
const ADMIN_TOKEN: &str = "admin-secret";

struct Daemon {
	addr: SocketAddr,
	state: AppState,
	http: reqwest::Client,
	shutdown: oneshot::Sender<()>,
	task: JoinHandle<anyhow::Result<()>>,
}

impl Daemon {
	async fn start(config: Config) -> Self {
		let state = AppState::from_config(&config);
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let (shutdown, stop) = oneshot::channel::<()>();
		let task = tokio::spawn(server::serve(listener, state.clone(), async move {
			let _ = stop.await;
		}));
		Self {
			addr,
			state,
			http: reqwest::Client::new(),
			shutdown,
			task,
		}
	}

	fn url(&self, path: &str) -> String {
		format!("http://{}{path}", self.addr)
	}

	fn ws_url(&self) -> String {
		format!("ws://{}/ws", self.addr)
	}

	async fn api(&self, path: &str, body: Value) -> reqwest::Response {
		self.http
			.post(self.url(path))
			.bearer_auth(API_TOKEN)
			.json(&body)
			.send()
			.await
			.unwrap()
	}

	async fn admin_get(&self, path: &str) -> reqwest::Response {
		self.http
			.get(self.url(path))
			.header("X-Auth-Token", ADMIN_TOKEN)
			.send()
			.await
			.unwrap()
	}

	async fn wait_for_sessions(&self, expected: usize) {
		for _ in 0..200 {
			if self.state.bridge.session_count() == expected {
				return;
			}
			tokio::time::sleep(Duration::from_millis(10)).await;
		}
		panic!(
			"expected {expected} sessions, have {}",
			self.state.bridge.session_count()
		);
	}
}

fn test_config() -> Config {
	let mut config = Config::default();
	config.auth.api_token = API_TOKEN.into();
	config.auth.admin_token = ADMIN_TOKEN.into();
	config.daemon.command_timeout_ms = 2_000;
	config
}

fn answer(command: &Command) -> Response {
	let id = command.id.clone();
	match command.kind() {
		CommandKind::ListTabs => Response::success(
			id,
			Some(json!([{"id": 1, "url": "https://example.com/", "title": "Example", "active": true}])),
		),
		CommandKind::Snapshot => Response::success(
			id,
			Some(json!({
				"url": "https://example.com/",
				"title": "Example",
				"html": "<body><p>Hello   world</p><a id=\"start\" href=\"/start\">Start here</a></body>"
			})),
		),
		CommandKind::Click => Response::failure(id, Some(ErrorCode::ElementNotFound), "no such element"),
		_ => Response::success(id, None),
	}
}

/// Connects a fake extension that answers every command with [`answer`].
async fn connect_extension(url: &str) -> JoinHandle<()> {
	let (mut socket, _) = connect_async(url).await.unwrap();
	tokio::spawn(async move {
		while let Some(Ok(message)) = socket.next().await {
			let Message::Text(text) = message else {
				continue;
			};
			let command: Command = serde_json::from_str(&text).unwrap();
			let reply = serde_json::to_string(&answer(&command)).unwrap();
			if socket.send(Message::text(reply)).await.is_err() {
				break;
			}
		}
	})
}

#[tokio::test]
async fn health_is_public_and_routes_need_tokens() {
	let daemon = Daemon::start(test_config()).await;

	let health = daemon.http.get(daemon.url("/health")).send().await.unwrap();
	assert_eq!(health.status().as_u16(), 200);
	assert_eq!(health.text().await.unwrap(), "OK");

	let anonymous = daemon
		.http
		.post(daemon.url("/api/command"))
		.json(&json!({"type": "list_tabs"}))
		.send()
		.await
		.unwrap();
	assert_eq!(anonymous.status().as_u16(), 401);

	let wrong_group = daemon
		.http
		.get(daemon.url("/admin/status"))
		.bearer_auth(API_TOKEN)
		.send()
		.await
		.unwrap();
	assert_eq!(wrong_group.status().as_u16(), 401);

	let admin = daemon.admin_get("/admin/status").await;
	assert_eq!(admin.status().as_u16(), 200);
}

#[tokio::test]
async fn blank_server_token_is_rejected() {
	let mut config = test_config();
	config.auth.admin_token.clear();
	let daemon = Daemon::start(config).await;

	let response = daemon
		.http
		.get(daemon.url("/admin/status"))
		.bearer_auth("")
		.send()
		.await
		.unwrap();
	assert_eq!(response.status().as_u16(), 401);
	let body: Value = response.json().await.unwrap();
	assert_eq!(body["error"], "server auth not configured");
}

#[tokio::test]
async fn command_without_extension_is_a_conflict() {
	let daemon = Daemon::start(test_config()).await;

	let response = daemon.api("/api/command", json!({"type": "back"})).await;
	assert_eq!(response.status().as_u16(), 409);
	let body: Value = response.json().await.unwrap();
	assert_eq!(body["ok"], false);
	assert_eq!(body["error"], "no active browser session");
}

#[tokio::test]
async fn commands_round_trip_through_the_extension() {
	let daemon = Daemon::start(test_config()).await;
	let _extension = connect_extension(&daemon.ws_url()).await;
	daemon.wait_for_sessions(1).await;

	let response = daemon.api("/api/command", json!({"type": "list_tabs"})).await;
	assert_eq!(response.status().as_u16(), 200);
	let envelope: Response = response.json().await.unwrap();
	assert!(envelope.ok);
	assert_eq!(envelope.data.unwrap()[0]["url"], "https://example.com/");

	let response = daemon
		.api("/api/command", json!({"type": "click", "payload": {"selector": "#missing"}}))
		.await;
	assert_eq!(response.status().as_u16(), 200);
	let envelope: Response = response.json().await.unwrap();
	assert!(!envelope.ok);
	assert_eq!(envelope.error_code, Some(ErrorCode::ElementNotFound));

	let blank = daemon
		.api("/api/command", json!({"type": "click", "payload": {"selector": " "}}))
		.await;
	assert_eq!(blank.status().as_u16(), 400);

	let unknown = daemon.api("/api/command", json!({"type": "teleport"})).await;
	assert_eq!(unknown.status().as_u16(), 400);

	let unknown_session = daemon
		.api("/api/command", json!({"type": "back", "sessionId": "nope"}))
		.await;
	assert_eq!(unknown_session.status().as_u16(), 404);
}

#[tokio::test]
async fn snapshots_are_reduced_and_retrievable() {
	let daemon = Daemon::start(test_config()).await;
	let _extension = connect_extension(&daemon.ws_url()).await;
	daemon.wait_for_sessions(1).await;

	let response = daemon.api("/api/snapshot", json!({"includeHTML": true})).await;
	assert_eq!(response.status().as_u16(), 200);
	let snapshot: Snapshot = response.json().await.unwrap();
	assert_eq!(snapshot.text, "Hello world Start here");
	assert_eq!(snapshot.elements[0].selector, "#start");
	let id = snapshot.id.clone().unwrap();

	for key in ["latest", id.as_str()] {
		let stored = daemon
			.http
			.get(daemon.url(&format!("/api/snapshots/{key}")))
			.header("X-Auth-Token", API_TOKEN)
			.send()
			.await
			.unwrap();
		assert_eq!(stored.status().as_u16(), 200);
		let stored: Snapshot = stored.json().await.unwrap();
		assert_eq!(stored.id.as_deref(), Some(id.as_str()));
	}

	let missing = daemon
		.http
		.get(daemon.url("/api/snapshots/unknown"))
		.bearer_auth(API_TOKEN)
		.send()
		.await
		.unwrap();
	assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn admin_lists_and_disconnects_sessions() {
	let daemon = Daemon::start(test_config()).await;
	let extension = connect_extension(&daemon.ws_url()).await;
	daemon.wait_for_sessions(1).await;

	let status: Status = daemon.admin_get("/admin/status").await.json().await.unwrap();
	assert_eq!(status.browser_sessions, 1);
	assert!(status.active_session.is_some());

	let browsers: Vec<BrowserEntry> = daemon.admin_get("/admin/browsers").await.json().await.unwrap();
	assert_eq!(browsers.len(), 1);
	assert!(browsers[0].session.active);
	assert_eq!(browsers[0].session.remote_addr.as_deref(), Some("127.0.0.1"));
	assert_eq!(browsers[0].tabs.as_ref().map(Vec::len), Some(1));
	assert!(browsers[0].tabs_error.is_none());

	let disconnect = |query: &'static str| {
		daemon
			.http
			.post(daemon.url(&format!("/admin/browsers/disconnect{query}")))
			.bearer_auth(ADMIN_TOKEN)
			.send()
	};
	assert_eq!(disconnect("").await.unwrap().status().as_u16(), 400);
	assert_eq!(disconnect("?id=nope").await.unwrap().status().as_u16(), 404);

	let kicked = disconnect("?id=active").await.unwrap();
	assert_eq!(kicked.status().as_u16(), 200);
	let body: Value = kicked.json().await.unwrap();
	assert_eq!(body["id"], "active");
	assert_eq!(body["session"]["id"], json!(status.active_session));

	daemon.wait_for_sessions(0).await;
	tokio::time::timeout(Duration::from_secs(5), extension)
		.await
		.expect("extension socket should be closed")
		.unwrap();

	let response = daemon.api("/api/command", json!({"type": "back"})).await;
	assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
async fn origin_policy_guards_the_socket() {
	let mut config = test_config();
	config.daemon.allowed_origins = vec!["chrome-extension://good".into()];
	let daemon = Daemon::start(config).await;

	let err = connect_async(daemon.ws_url()).await.unwrap_err();
	assert!(matches!(err, tungstenite::Error::Http(ref response) if response.status().as_u16() == 403));

	let mut request = daemon.ws_url().into_client_request().unwrap();
	request
		.headers_mut()
		.insert("Origin", HeaderValue::from_static("chrome-extension://evil"));
	assert!(connect_async(request).await.is_err());

	let mut request = daemon.ws_url().into_client_request().unwrap();
	request
		.headers_mut()
		.insert("Origin", HeaderValue::from_static("chrome-extension://good"));
	let (_socket, _) = connect_async(request).await.unwrap();
	daemon.wait_for_sessions(1).await;
}

#[tokio::test]
async fn shutdown_closes_browser_sessions() {
	let daemon = Daemon::start(test_config()).await;
	let extension = connect_extension(&daemon.ws_url()).await;
	daemon.wait_for_sessions(1).await;

	let Daemon {
		state,
		http,
		shutdown,
		task,
		..
	} = daemon;
	drop(http);
	shutdown.send(()).unwrap();

	tokio::time::timeout(Duration::from_secs(5), task)
		.await
		.expect("server should stop")
		.unwrap()
		.unwrap();
	assert_eq!(state.bridge.session_count(), 0);
	tokio::time::timeout(Duration::from_secs(5), extension)
		.await
		.expect("extension socket should be closed")
		.unwrap();
}
