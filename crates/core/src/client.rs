//! Typed browser operations over the extension bridge.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use surf_protocol::{
	ClaimTabPayload, ClickPayload, CloseTabPayload, Command, CommandBody, EnterPayload, FindPayload,
	HoverPayload, NavigatePayload, OpenTabPayload, ReleaseTabPayload, Response, ScreenshotPayload,
	ScrollPayload, SelectPayload, SetTabSharingPayload, SnapshotData, SnapshotPayload, TypePayload,
	WaitForSelectorPayload,
};
use surf_runtime::{Bridge, DEFAULT_COMMAND_TIMEOUT, ResponseExt};

use crate::context::CallContext;
use crate::error::{Error, Result};
use crate::page::{Reducer, Snapshot, SnapshotStore};
use crate::results::{
	ClickResult, EnterResult, FindResult, HistoryResult, HoverResult, NavigateResult,
	RecordedAction, RecordingState, ScreenshotResult, ScrollResult, SelectResult, TabInfo,
	TypeResult, WaitForSelectorResult,
};

/// Extra time granted beyond an in-page wait before the round trip gives up.
const WAIT_GRACE: Duration = Duration::from_secs(2);

fn require(value: &str, what: &str) -> Result<()> {
	if value.trim().is_empty() {
		return Err(Error::required(what));
	}
	Ok(())
}

/// Rejects commands whose required arguments are blank.
pub fn validate(body: &CommandBody) -> Result<()> {
	match body {
		CommandBody::Click(p) => require(&p.selector, "selector"),
		CommandBody::Hover(p) => require(&p.selector, "selector"),
		CommandBody::Type(p) => require(&p.selector, "selector"),
		CommandBody::WaitForSelector(p) => require(&p.selector, "selector"),
		CommandBody::Select(p) => require(&p.selector, "selector"),
		CommandBody::Navigate(p) => require(&p.url, "url"),
		CommandBody::Find(p) => require(&p.text, "text"),
		_ => Ok(()),
	}
}

/// Browser operations against whichever session a [`CallContext`] selects.
///
/// Snapshots are reduced and stored before they are returned.
#[derive(Clone)]
pub struct BrowserClient {
	bridge: Arc<Bridge>,
	reducer: Reducer,
	store: Arc<SnapshotStore>,
	timeout: Duration,
}

impl BrowserClient {
	pub fn new(bridge: Arc<Bridge>) -> Self {
		Self {
			bridge,
			reducer: Reducer::default(),
			store: Arc::new(SnapshotStore::new()),
			timeout: DEFAULT_COMMAND_TIMEOUT,
		}
	}

	pub fn with_reducer(mut self, reducer: Reducer) -> Self {
		self.reducer = reducer;
		self
	}

	pub fn with_store(mut self, store: Arc<SnapshotStore>) -> Self {
		self.store = store;
		self
	}

	/// Default round-trip deadline. Zero keeps the current one.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		if !timeout.is_zero() {
			self.timeout = timeout;
		}
		self
	}

	pub fn bridge(&self) -> &Arc<Bridge> {
		&self.bridge
	}

	pub fn store(&self) -> &Arc<SnapshotStore> {
		&self.store
	}

	pub fn reducer(&self) -> &Reducer {
		&self.reducer
	}

	fn deadline(&self, ctx: &CallContext, body: &CommandBody) -> Duration {
		if let Some(timeout) = ctx.timeout() {
			return timeout;
		}
		match body {
			CommandBody::WaitForSelector(WaitForSelectorPayload {
				timeout_ms: Some(ms), ..
			}) => self.timeout.max(Duration::from_millis(*ms) + WAIT_GRACE),
			_ => self.timeout,
		}
	}

	/// Sends `body` and returns the raw response, failed or not.
	pub async fn execute(&self, ctx: &CallContext, body: CommandBody) -> Result<Response> {
		validate(&body)?;
		let timeout = self.deadline(ctx, &body);
		let mut command = Command::new(body);
		if let Some(target) = ctx.target() {
			command = command.targeted(target);
		}
		Ok(self
			.bridge
			.send_command_with_timeout(&command, timeout)
			.await?)
	}

	async fn call(&self, ctx: &CallContext, body: CommandBody) -> Result<Option<Value>> {
		Ok(self.execute(ctx, body).await?.into_result()?)
	}

	async fn call_as<T>(&self, ctx: &CallContext, body: CommandBody) -> Result<T>
	where
		T: DeserializeOwned + Default,
	{
		let kind = body.kind();
		match self.call(ctx, body).await? {
			None | Some(Value::Null) => Ok(T::default()),
			Some(data) => serde_json::from_value(data).map_err(|source| Error::Decode { kind, source }),
		}
	}

	pub async fn click(&self, ctx: &CallContext, selector: &str) -> Result<ClickResult> {
		let body = CommandBody::Click(ClickPayload {
			selector: selector.to_string(),
		});
		self.call(ctx, body).await?;
		Ok(ClickResult {
			status: "ok".into(),
			selector: selector.to_string(),
		})
	}

	/// Captures the page, reduces it, and stores the result.
	///
	/// `max_text` / `max_elements` in `options` also bound the reduction.
	pub async fn snapshot(&self, ctx: &CallContext, options: SnapshotPayload) -> Result<Snapshot> {
		let reducer = self.reducer.with_limits(
			options.max_text.map(|n| n as usize),
			options.max_elements.map(|n| n as usize),
		);
		let raw: SnapshotData = self.call_as(ctx, CommandBody::Snapshot(options)).await?;

		let mut snapshot = reducer.reduce(raw);
		let id = self.store.put(snapshot.clone());
		snapshot.id = Some(id);
		tracing::debug!(
			target = "surf.client",
			id = snapshot.id.as_deref().unwrap_or_default(),
			elements = snapshot.elements.len(),
			actions = snapshot.actions.len(),
			"stored snapshot"
		);
		Ok(snapshot)
	}

	pub async fn scroll(&self, ctx: &CallContext, options: ScrollPayload) -> Result<ScrollResult> {
		self.call_as(ctx, CommandBody::Scroll(options)).await
	}

	pub async fn hover(&self, ctx: &CallContext, selector: &str) -> Result<HoverResult> {
		let body = CommandBody::Hover(HoverPayload {
			selector: selector.to_string(),
		});
		self.call_as(ctx, body).await
	}

	pub async fn type_text(&self, ctx: &CallContext, selector: &str, text: &str, press_enter: bool) -> Result<TypeResult> {
		let body = CommandBody::Type(TypePayload {
			selector: selector.to_string(),
			text: text.to_string(),
			press_enter,
		});
		self.call_as(ctx, body).await
	}

	/// Presses `key` (Enter by default) on `selector` or the focused element.
	pub async fn enter(&self, ctx: &CallContext, selector: Option<&str>, key: Option<&str>) -> Result<EnterResult> {
		let body = CommandBody::Enter(EnterPayload {
			selector: selector.filter(|s| !s.is_empty()).map(str::to_string),
			key: key.filter(|k| !k.is_empty()).map(str::to_string),
		});
		self.call_as(ctx, body).await
	}

	pub async fn back(&self, ctx: &CallContext) -> Result<HistoryResult> {
		self.call_as(ctx, CommandBody::Back).await
	}

	pub async fn forward(&self, ctx: &CallContext) -> Result<HistoryResult> {
		self.call_as(ctx, CommandBody::Forward).await
	}

	pub async fn wait_for_selector(
		&self,
		ctx: &CallContext,
		selector: &str,
		timeout_ms: Option<u64>,
	) -> Result<WaitForSelectorResult> {
		let body = CommandBody::WaitForSelector(WaitForSelectorPayload {
			selector: selector.to_string(),
			timeout_ms,
		});
		self.call_as(ctx, body).await
	}

	pub async fn find(&self, ctx: &CallContext, options: FindPayload) -> Result<FindResult> {
		self.call_as(ctx, CommandBody::Find(options)).await
	}

	pub async fn navigate(&self, ctx: &CallContext, url: &str) -> Result<NavigateResult> {
		let body = CommandBody::Navigate(NavigatePayload { url: url.to_string() });
		self.call_as(ctx, body).await
	}

	pub async fn select(&self, ctx: &CallContext, options: SelectPayload) -> Result<SelectResult> {
		self.call_as(ctx, CommandBody::Select(options)).await
	}

	pub async fn screenshot(&self, ctx: &CallContext, options: ScreenshotPayload) -> Result<ScreenshotResult> {
		self.call_as(ctx, CommandBody::Screenshot(options)).await
	}

	pub async fn start_recording(&self, ctx: &CallContext) -> Result<RecordingState> {
		self.call_as(ctx, CommandBody::StartRecording).await
	}

	pub async fn stop_recording(&self, ctx: &CallContext) -> Result<RecordingState> {
		self.call_as(ctx, CommandBody::StopRecording).await
	}

	pub async fn get_recording(&self, ctx: &CallContext) -> Result<Vec<RecordedAction>> {
		self.call_as(ctx, CommandBody::GetRecording).await
	}

	pub async fn list_tabs(&self, ctx: &CallContext) -> Result<Vec<TabInfo>> {
		self.call_as(ctx, CommandBody::ListTabs).await
	}

	pub async fn open_tab(&self, ctx: &CallContext, options: OpenTabPayload) -> Result<TabInfo> {
		self.call_as(ctx, CommandBody::OpenTab(options)).await
	}

	pub async fn close_tab(&self, ctx: &CallContext, tab_id: i64) -> Result<()> {
		self.call(ctx, CommandBody::CloseTab(CloseTabPayload { tab_id }))
			.await
			.map(drop)
	}

	pub async fn claim_tab(&self, ctx: &CallContext, options: ClaimTabPayload) -> Result<TabInfo> {
		self.call_as(ctx, CommandBody::ClaimTab(options)).await
	}

	pub async fn release_tab(&self, ctx: &CallContext, tab_id: i64) -> Result<()> {
		self.call(ctx, CommandBody::ReleaseTab(ReleaseTabPayload { tab_id }))
			.await
			.map(drop)
	}

	pub async fn set_tab_sharing(&self, ctx: &CallContext, tab_id: i64, allow_shared: bool) -> Result<()> {
		let body = CommandBody::SetTabSharing(SetTabSharingPayload { tab_id, allow_shared });
		self.call(ctx, body).await.map(drop)
	}
}
