use serde_json::json;

use super::*;

fn round_trip(command: &Command) -> Command {
	let json = serde_json::to_string(command).unwrap();
	serde_json::from_str(&json).unwrap()
}

#[test]
fn test_command_round_trip_with_routing() {
	let command = Command::with_id(
		"cmd-1",
		CommandBody::Type(TypePayload {
			selector: "#q".into(),
			text: "rust".into(),
			press_enter: true,
		}),
	)
	.targeted(&Target::session("sess-a").with_tab(42));

	assert_eq!(round_trip(&command), command);
}

#[test]
fn test_command_round_trip_without_routing_or_payload() {
	for body in [
		CommandBody::Back,
		CommandBody::Forward,
		CommandBody::StartRecording,
		CommandBody::StopRecording,
		CommandBody::GetRecording,
		CommandBody::ListTabs,
		CommandBody::Snapshot(SnapshotPayload::default()),
		CommandBody::Screenshot(ScreenshotPayload::default()),
	] {
		let command = Command::with_id("cmd-2", body);
		assert_eq!(round_trip(&command), command);
	}
}

#[test]
fn test_command_wire_shape() {
	let command = Command::with_id(
		"abc",
		CommandBody::Click(ClickPayload {
			selector: "#start".into(),
		}),
	)
	.targeted(&Target::tab(7));

	let value = serde_json::to_value(&command).unwrap();
	assert_eq!(
		value,
		json!({"id": "abc", "type": "click", "tabId": 7, "payload": {"selector": "#start"}})
	);
}

#[test]
fn test_payloadless_command_emits_empty_object() {
	let value = serde_json::to_value(Command::with_id("x", CommandBody::ListTabs)).unwrap();
	assert_eq!(value["type"], "list_tabs");
	assert_eq!(value["payload"], json!({}));
	assert!(value.get("sessionId").is_none());
}

#[test]
fn test_missing_or_null_payload_decodes_to_default() {
	let missing: Command = serde_json::from_str(r#"{"id":"1","type":"snapshot"}"#).unwrap();
	assert_eq!(missing.body, CommandBody::Snapshot(SnapshotPayload::default()));

	let null: Command = serde_json::from_str(r#"{"id":"1","type":"back","payload":null}"#).unwrap();
	assert_eq!(null.body, CommandBody::Back);
}

#[test]
fn test_snapshot_payload_uses_original_field_names() {
	let payload = SnapshotPayload {
		include_html: true,
		max_html: Some(2000),
		max_html_tokens: Some(500),
		..Default::default()
	};
	let value = serde_json::to_value(payload).unwrap();
	assert_eq!(value, json!({"includeHTML": true, "maxHTML": 2000, "maxHTMLTokens": 500}));
}

#[test]
fn test_unknown_command_type_is_rejected() {
	let err = serde_json::from_str::<Command>(r#"{"id":"1","type":"teleport","payload":{}}"#);
	assert!(err.is_err());
	assert_eq!(
		"teleport".parse::<CommandKind>(),
		Err(UnknownCommandKind("teleport".into()))
	);
}

#[test]
fn test_command_kind_names_parse_back() {
	for kind in CommandKind::ALL {
		assert_eq!(kind.as_str().parse::<CommandKind>(), Ok(kind));
		let encoded = serde_json::to_value(kind).unwrap();
		assert_eq!(encoded, json!(kind.as_str()));
	}
}

#[test]
fn test_targeted_ignores_empty_fields() {
	let command = Command::with_id("1", CommandBody::Back).targeted(&Target::default());
	assert!(command.session_id.is_none());
	assert!(command.tab_id.is_none());
	assert!(command.target().is_empty());
	assert!(Target::session("").is_empty());
}

#[test]
fn test_response_parses_known_and_unknown_codes() {
	let resp: Response = serde_json::from_str(
		r#"{"id":"9","ok":false,"error":"no such element","errorCode":"ELEMENT_NOT_FOUND"}"#,
	)
	.unwrap();
	assert_eq!(resp.error_code, Some(ErrorCode::ElementNotFound));
	assert_eq!(resp.failure_message(), "no such element (ELEMENT_NOT_FOUND)");

	let resp: Response =
		serde_json::from_str(r#"{"id":"9","ok":false,"errorCode":"TAB_LOCKED"}"#).unwrap();
	assert_eq!(resp.error_code, Some(ErrorCode::Other("TAB_LOCKED".into())));
	let encoded = serde_json::to_value(&resp).unwrap();
	assert_eq!(encoded["errorCode"], "TAB_LOCKED");
}

#[test]
fn test_failure_message_synthesized_when_empty() {
	let resp = Response::failure("1", None, "");
	assert_eq!(resp.error, None);
	assert_eq!(resp.failure_message(), "browser action failed");

	let resp = Response::failure("1", Some(ErrorCode::Timeout), "");
	assert_eq!(resp.failure_message(), "browser action failed (TIMEOUT)");
}

#[test]
fn test_snapshot_data_tolerates_sparse_payload() {
	let data: SnapshotData = serde_json::from_value(json!({
		"url": "https://example.com",
		"elements": [{"tag": "a", "selector": "#x", "ariaLabel": "Home"}]
	}))
	.unwrap();
	assert_eq!(data.elements[0].aria_label, "Home");
	assert!(data.html.is_none());
	assert!(data.text.is_empty());
}

#[test]
fn test_snapshot_data_reads_null_as_empty() {
	let data: SnapshotData = serde_json::from_value(json!({
		"url": "https://example.com",
		"title": null,
		"text": null,
		"html": null,
		"elements": [
			{"tag": "button", "text": "Go", "name": null, "ariaLabel": null, "id": null, "href": null}
		]
	}))
	.unwrap();
	assert!(data.title.is_empty());
	assert!(data.html.is_none());
	let element = &data.elements[0];
	assert_eq!(element.text, "Go");
	assert!(element.name.is_empty());
	assert!(element.aria_label.is_empty());

	let data: SnapshotData = serde_json::from_value(json!({"url": null, "elements": null})).unwrap();
	assert_eq!(data, SnapshotData::default());
}

#[test]
fn test_response_with_null_fields() {
	let resp: Response = serde_json::from_str(r#"{"id":"4","ok":null,"error":null,"data":null}"#).unwrap();
	assert_eq!(resp.id, "4");
	assert!(!resp.ok);
	assert!(resp.error.is_none());
	assert!(resp.data.is_none());
}
