//! Correlation of outstanding command ids to their waiters.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use surf_protocol::Response;
use tokio::sync::oneshot;

use crate::error::{Error, Result};

type Slots = Arc<Mutex<HashMap<String, oneshot::Sender<Response>>>>;

/// Table of reply slots keyed by command id.
///
/// A slot is consumed by exactly one of: delivery, timeout, or the waiter
/// being dropped. Removal happens under the lock and the hand-off after it,
/// so a response is delivered at most once.
#[derive(Default, Clone)]
pub struct PendingTable {
	slots: Slots,
}

impl PendingTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Opens a slot for `id`. Must happen before the command is written.
	pub fn register(&self, id: &str) -> Result<PendingReply> {
		let (tx, rx) = oneshot::channel();
		{
			let mut slots = self.slots.lock();
			if slots.contains_key(id) {
				return Err(Error::DuplicateRequest(id.to_string()));
			}
			slots.insert(id.to_string(), tx);
		}
		Ok(PendingReply {
			id: id.to_string(),
			rx,
			slots: Arc::clone(&self.slots),
			completed: false,
		})
	}

	/// Hands a response to its waiter.
	///
	/// Returns `false` when nobody is waiting on that id; the response is
	/// dropped without effect.
	pub fn deliver(&self, response: Response) -> bool {
		let Some(tx) = self.slots.lock().remove(&response.id) else {
			return false;
		};
		tx.send(response).is_ok()
	}

	/// Discards a slot without delivering anything.
	pub fn cancel(&self, id: &str) -> bool {
		self.slots.lock().remove(id).is_some()
	}

	pub fn contains(&self, id: &str) -> bool {
		self.slots.lock().contains_key(id)
	}

	pub fn len(&self) -> usize {
		self.slots.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.lock().is_empty()
	}
}

/// Waiter side of a registered slot.
///
/// Dropping it before completion removes the slot.
pub struct PendingReply {
	id: String,
	rx: oneshot::Receiver<Response>,
	slots: Slots,
	completed: bool,
}

impl PendingReply {
	pub fn id(&self) -> &str {
		&self.id
	}

	/// Waits up to `timeout` for the response.
	pub async fn wait(mut self, timeout: Duration) -> Result<Response> {
		let result = match tokio::time::timeout(timeout, &mut self.rx).await {
			Ok(Ok(response)) => Ok(response),
			Ok(Err(_)) => Err(Error::ReplyDropped(self.id.clone())),
			Err(_) => {
				if self.slots.lock().remove(&self.id).is_some() {
					Err(Error::Timeout {
						id: self.id.clone(),
						timeout,
					})
				} else {
					// A delivery took the slot just as the deadline fired; its
					// send follows the removal without yielding.
					(&mut self.rx).await.map_err(|_| Error::Timeout {
						id: self.id.clone(),
						timeout,
					})
				}
			}
		};
		self.completed = true;
		result
	}
}

impl Drop for PendingReply {
	fn drop(&mut self) {
		if self.completed {
			return;
		}
		if self.slots.lock().remove(&self.id).is_some() {
			tracing::debug!(target = "surf.bridge", id = %self.id, "removed abandoned reply slot");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_deliver_wakes_waiter() {
		let table = PendingTable::new();
		let reply = table.register("a").unwrap();

		assert!(table.deliver(Response::success("a", None)));
		let response = reply.wait(Duration::from_secs(1)).await.unwrap();
		assert_eq!(response.id, "a");
		assert!(table.is_empty());
	}

	#[test]
	fn test_deliver_unknown_id_is_noop() {
		let table = PendingTable::new();
		let _reply = table.register("a").unwrap();

		assert!(!table.deliver(Response::success("b", None)));
		assert!(table.contains("a"));
		assert_eq!(table.len(), 1);
	}

	#[test]
	fn test_duplicate_registration_rejected() {
		let table = PendingTable::new();
		let _reply = table.register("a").unwrap();
		assert!(matches!(table.register("a"), Err(Error::DuplicateRequest(id)) if id == "a"));
	}

	#[tokio::test(start_paused = true)]
	async fn test_timeout_removes_slot() {
		let table = PendingTable::new();
		let reply = table.register("a").unwrap();

		let err = reply.wait(Duration::from_millis(50)).await.unwrap_err();
		assert!(err.is_timeout());
		assert!(table.is_empty());
		assert!(!table.deliver(Response::success("a", None)));
	}

	#[test]
	fn test_dropped_waiter_removes_slot() {
		let table = PendingTable::new();
		let reply = table.register("a").unwrap();
		drop(reply);
		assert!(table.is_empty());
	}

	#[tokio::test]
	async fn test_second_delivery_is_ignored() {
		let table = PendingTable::new();
		let reply = table.register("a").unwrap();

		assert!(table.deliver(Response::success("a", Some(serde_json::json!(1)))));
		assert!(!table.deliver(Response::success("a", Some(serde_json::json!(2)))));

		let response = reply.wait(Duration::from_secs(1)).await.unwrap();
		assert_eq!(response.data, Some(serde_json::json!(1)));
	}

	#[tokio::test]
	async fn test_cancel_wakes_waiter_with_error() {
		let table = PendingTable::new();
		let reply = table.register("a").unwrap();
		assert!(table.cancel("a"));
		assert!(matches!(
			reply.wait(Duration::from_secs(1)).await,
			Err(Error::ReplyDropped(_))
		));
	}
}
