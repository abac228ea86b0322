use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use surf_protocol::{ClickPayload, CommandBody, ErrorCode, Target};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;

use super::*;
use crate::error::ResponseExt;
use crate::transport::ChannelSink;

fn create_test_bridge() -> Arc<Bridge> {
	Arc::new(Bridge::new(BridgeOptions::default()))
}

fn connect_peer(bridge: &Bridge, capacity: usize) -> (Arc<Session>, mpsc::Receiver<String>) {
	let (sink, rx) = ChannelSink::new(capacity);
	let session = bridge.connect(Box::new(sink), SessionMeta::default());
	(session, rx)
}

/// Answers every command it reads with `{"peer": tag}`.
fn spawn_responder(bridge: Arc<Bridge>, mut rx: mpsc::Receiver<String>, tag: &'static str) -> JoinHandle<()> {
	tokio::spawn(async move {
		while let Some(frame) = rx.recv().await {
			let command: Command = serde_json::from_str(&frame).unwrap();
			bridge.deliver(Response::success(command.id, Some(json!({ "peer": tag }))));
		}
	})
}

fn click(id: &str) -> Command {
	Command::with_id(
		id,
		CommandBody::Click(ClickPayload {
			selector: "#go".into(),
		}),
	)
}

#[tokio::test]
async fn test_send_without_sessions_fails_fast() {
	let bridge = create_test_bridge();

	let err = bridge.send_command(&click("1")).await.unwrap_err();
	assert!(matches!(err, Error::NoActiveSession));
	assert!(bridge.pending().is_empty());
}

#[tokio::test]
async fn test_command_round_trip() {
	let bridge = create_test_bridge();
	let (_session, rx) = connect_peer(&bridge, 8);
	spawn_responder(Arc::clone(&bridge), rx, "a");

	let response = bridge.send_command(&click("cmd-1")).await.unwrap();
	assert_eq!(response.id, "cmd-1");
	assert!(response.ok);
	assert_eq!(response.data, Some(json!({"peer": "a"})));
	assert!(bridge.pending().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_timeout_leaves_no_pending_entry() {
	let bridge = create_test_bridge();
	let (_session, _rx) = connect_peer(&bridge, 8);

	let err = bridge
		.send_command_with_timeout(&click("slow"), Duration::from_millis(100))
		.await
		.unwrap_err();
	assert!(matches!(err, Error::Timeout { ref id, .. } if id == "slow"));
	assert!(bridge.pending().is_empty());

	// A late reply finds nobody waiting.
	assert!(!bridge.deliver(Response::success("slow", None)));
}

#[tokio::test]
async fn test_deliver_unknown_id_is_noop() {
	let bridge = create_test_bridge();
	assert!(!bridge.deliver(Response::success("nobody", None)));
	assert!(bridge.pending().is_empty());
}

#[tokio::test]
async fn test_explicit_session_routing_and_active_fallback() {
	let bridge = create_test_bridge();
	let (a, a_rx) = connect_peer(&bridge, 8);
	let (b, b_rx) = connect_peer(&bridge, 8);
	spawn_responder(Arc::clone(&bridge), a_rx, "a");
	spawn_responder(Arc::clone(&bridge), b_rx, "b");
	assert_eq!(bridge.active_session_id().as_deref(), Some(b.id()));

	let to_a = click("1").targeted(&Target::session(a.id()));
	let response = bridge.send_command(&to_a).await.unwrap();
	assert_eq!(response.data, Some(json!({"peer": "a"})));

	let response = bridge.send_command(&click("2")).await.unwrap();
	assert_eq!(response.data, Some(json!({"peer": "b"})));

	// B's socket closes; A takes over.
	let empty = tokio_stream::iter(Vec::<std::result::Result<InboundFrame, String>>::new());
	bridge.run_session(Arc::clone(&b), empty).await;
	assert_eq!(bridge.active_session_id().as_deref(), Some(a.id()));

	let response = bridge.send_command(&click("3")).await.unwrap();
	assert_eq!(response.data, Some(json!({"peer": "a"})));

	let stale = click("4").targeted(&Target::session(b.id()));
	let err = bridge.send_command(&stale).await.unwrap_err();
	assert!(err.is_routing());
}

#[tokio::test(start_paused = true)]
async fn test_sessions_do_not_block_each_other() {
	let bridge = create_test_bridge();
	let (a, _a_rx) = connect_peer(&bridge, 8);
	let (_b, b_rx) = connect_peer(&bridge, 8);
	spawn_responder(Arc::clone(&bridge), b_rx, "b");

	let stuck = {
		let bridge = Arc::clone(&bridge);
		let command = click("to-a").targeted(&Target::session(a.id()));
		tokio::spawn(async move { bridge.send_command(&command).await })
	};
	tokio::task::yield_now().await;

	let response = bridge.send_command(&click("to-b")).await.unwrap();
	assert_eq!(response.data, Some(json!({"peer": "b"})));
	assert!(!stuck.is_finished());
	assert!(bridge.pending().contains("to-a"));

	let err = stuck.await.unwrap().unwrap_err();
	assert!(err.is_timeout());
	assert!(bridge.pending().is_empty());
}

#[tokio::test]
async fn test_concurrent_commands_on_one_session() {
	let bridge = create_test_bridge();
	let (_session, rx) = connect_peer(&bridge, 4);
	spawn_responder(Arc::clone(&bridge), rx, "a");

	let handles: Vec<_> = (0..20)
		.map(|n| {
			let bridge = Arc::clone(&bridge);
			tokio::spawn(async move { bridge.send_command(&click(&format!("c{n}"))).await })
		})
		.collect();

	for (n, handle) in handles.into_iter().enumerate() {
		let response = handle.await.unwrap().unwrap();
		assert_eq!(response.id, format!("c{n}"));
	}
	assert!(bridge.pending().is_empty());
}

#[tokio::test]
async fn test_write_failure_keeps_session() {
	let bridge = create_test_bridge();
	let (session, rx) = connect_peer(&bridge, 1);
	drop(rx);

	let err = bridge.send_command(&click("1")).await.unwrap_err();
	assert!(matches!(err, Error::Transport(_)));
	assert!(bridge.pending().is_empty());
	assert!(bridge.registry().get(session.id()).is_some());
	assert!(!session.is_closed());
	assert_eq!(bridge.active_session_id().as_deref(), Some(session.id()));
}

#[tokio::test(start_paused = true)]
async fn test_write_deadline_applies_to_stalled_socket() {
	let bridge = create_test_bridge();
	let (session, _rx) = connect_peer(&bridge, 1);

	// Fills the only buffer slot, then times out waiting for a reply.
	let err = bridge
		.send_command_with_timeout(&click("1"), Duration::from_millis(10))
		.await
		.unwrap_err();
	assert!(matches!(err, Error::Timeout { .. }));

	let err = bridge.send_command(&click("2")).await.unwrap_err();
	assert!(matches!(err, Error::WriteTimeout(d) if d == DEFAULT_WRITE_TIMEOUT));
	assert!(bridge.registry().get(session.id()).is_some());
	assert!(bridge.pending().is_empty());
}

#[tokio::test]
async fn test_abandoned_caller_releases_slot() {
	let bridge = create_test_bridge();
	let (_session, mut rx) = connect_peer(&bridge, 8);

	let task = {
		let bridge = Arc::clone(&bridge);
		tokio::spawn(async move { bridge.send_command(&click("gone")).await })
	};

	// The frame is only written after the slot exists.
	rx.recv().await.unwrap();
	assert!(bridge.pending().contains("gone"));

	task.abort();
	assert!(task.await.unwrap_err().is_cancelled());
	assert!(bridge.pending().is_empty());
}

#[tokio::test]
async fn test_read_loop_delivers_and_skips_bad_frames() {
	let bridge = create_test_bridge();
	let (session, mut out_rx) = connect_peer(&bridge, 8);
	let (in_tx, in_rx) = mpsc::channel::<std::result::Result<InboundFrame, String>>(8);

	let reader = {
		let bridge = Arc::clone(&bridge);
		let session = Arc::clone(&session);
		tokio::spawn(async move { bridge.run_session(session, ReceiverStream::new(in_rx)).await })
	};

	let caller = {
		let bridge = Arc::clone(&bridge);
		tokio::spawn(async move { bridge.send_command(&click("r1")).await })
	};

	let frame = out_rx.recv().await.unwrap();
	let command: Command = serde_json::from_str(&frame).unwrap();
	assert_eq!(command.id, "r1");

	in_tx.send(Ok(InboundFrame::Text("not json".into()))).await.unwrap();
	in_tx.send(Ok(InboundFrame::Text(r#"{"ok":true}"#.into()))).await.unwrap();
	in_tx.send(Ok(InboundFrame::Control)).await.unwrap();
	let reply = Response::failure("r1", Some(ErrorCode::ElementNotFound), "missing");
	let reply = serde_json::to_vec(&reply).unwrap();
	in_tx.send(Ok(InboundFrame::Binary(reply))).await.unwrap();

	let response = caller.await.unwrap().unwrap();
	assert!(!response.ok);
	let err = response.into_result().unwrap_err();
	assert_eq!(err.code(), Some(&ErrorCode::ElementNotFound));
	assert_eq!(err.to_string(), "missing (ELEMENT_NOT_FOUND)");

	in_tx.send(Ok(InboundFrame::Close)).await.unwrap();
	reader.await.unwrap();
	assert!(bridge.registry().is_empty());
}

#[tokio::test]
async fn test_disconnect_active_alias() {
	let bridge = create_test_bridge();
	let (a, _a_rx) = connect_peer(&bridge, 8);
	let (b, _b_rx) = connect_peer(&bridge, 8);

	let info = bridge.disconnect_session("active").await.unwrap();
	assert_eq!(info.id, b.id());
	assert!(info.active);
	assert!(b.is_closed());
	assert_eq!(bridge.active_session_id().as_deref(), Some(a.id()));

	let err = bridge.disconnect_session(b.id()).await.unwrap_err();
	assert!(matches!(err, Error::UnknownSession(_)));
}

#[tokio::test]
async fn test_disconnect_reports_inactive_session() {
	let bridge = create_test_bridge();
	let (a, _a_rx) = connect_peer(&bridge, 8);
	let (b, _b_rx) = connect_peer(&bridge, 8);

	let info = bridge.disconnect_session(a.id()).await.unwrap();
	assert_eq!(info.id, a.id());
	assert!(!info.active);
	assert!(a.is_closed());
	assert_eq!(bridge.active_session_id().as_deref(), Some(b.id()));
}

#[tokio::test]
async fn test_closed_session_stops_read_loop() {
	let bridge = create_test_bridge();
	let (session, _out_rx) = connect_peer(&bridge, 8);
	let (_in_tx, in_rx) = mpsc::channel::<std::result::Result<InboundFrame, String>>(1);

	let reader = {
		let bridge = Arc::clone(&bridge);
		let session = Arc::clone(&session);
		tokio::spawn(async move { bridge.run_session(session, ReceiverStream::new(in_rx)).await })
	};

	bridge.disconnect_session(session.id()).await.unwrap();
	tokio::time::timeout(Duration::from_secs(1), reader)
		.await
		.unwrap()
		.unwrap();
}
