//! Page reduction: raw capture in, bounded [`Snapshot`] out.

mod actions;
mod reducer;
mod selector;
mod store;
mod types;

pub use actions::{build_actions, hint_for, label_for, verb_for};
pub use reducer::{DEFAULT_MAX_ELEMENTS, DEFAULT_MAX_TEXT, ReduceOptions, Reducer, compact_whitespace};
pub use selector::escape_attr_value;
pub use store::{LATEST, SnapshotStore};
pub use types::{Action, RawPage, Snapshot, Verb};
