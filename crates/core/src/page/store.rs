//! In-memory store of reduced snapshots.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::types::Snapshot;

/// Key that always resolves to the most recently stored snapshot.
pub const LATEST: &str = "latest";

#[derive(Default)]
struct StoreState {
	/// Oldest first.
	items: IndexMap<String, Arc<Snapshot>>,
	latest: Option<String>,
}

/// Snapshots by id plus a "latest" pointer.
///
/// Unbounded by default. With a capacity, the oldest entry is evicted once
/// the store is full; the latest entry is never evicted.
#[derive(Default)]
pub struct SnapshotStore {
	state: RwLock<StoreState>,
	capacity: Option<usize>,
}

impl SnapshotStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// A store holding at most `capacity` snapshots. Zero means unbounded.
	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			state: RwLock::default(),
			capacity: (capacity > 0).then_some(capacity),
		}
	}

	/// Stores `snapshot`, assigning an id if it has none, and marks it latest.
	pub fn put(&self, mut snapshot: Snapshot) -> String {
		let id = match snapshot.id.take().filter(|id| !id.is_empty()) {
			Some(id) => id,
			None => uuid::Uuid::new_v4().to_string(),
		};
		snapshot.id = Some(id.clone());

		let mut state = self.state.write();
		state.items.shift_remove(&id);
		state.items.insert(id.clone(), Arc::new(snapshot));
		state.latest = Some(id.clone());
		if let Some(capacity) = self.capacity {
			while state.items.len() > capacity {
				state.items.shift_remove_index(0);
			}
		}
		id
	}

	pub fn get(&self, id: &str) -> Option<Arc<Snapshot>> {
		self.state.read().items.get(id).cloned()
	}

	pub fn latest(&self) -> Option<Arc<Snapshot>> {
		let state = self.state.read();
		state.latest.as_ref().and_then(|id| state.items.get(id)).cloned()
	}

	/// Looks up an id, or the latest snapshot for `"latest"`.
	pub fn resolve(&self, key: &str) -> Option<Arc<Snapshot>> {
		match key {
			LATEST => self.latest(),
			id => self.get(id),
		}
	}

	pub fn len(&self) -> usize {
		self.state.read().items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.state.read().items.is_empty()
	}
}
