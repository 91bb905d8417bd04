//! Conflict detection and resolution
//!
//! A bidirectional pass compares each side's modification time against the
//! last time the path was synced. When both sides moved, the item is a
//! conflict and the configured resolution decides what happens.

mod resolver;

pub use resolver::{ConflictAction, ConflictResolver};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::strategies::{ConflictKind, ConflictResolution};

/// A path whose local and remote versions both changed since the last sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictItem {
	/// Vault path of the note
	pub path: String,

	pub local_modified: DateTime<Utc>,
	pub remote_modified: DateTime<Utc>,

	pub kind: ConflictKind,

	/// Resolution applied, `None` while the conflict awaits the user
	pub resolution: Option<ConflictResolution>,
}

impl ConflictItem {
	pub fn new(
		path: impl Into<String>,
		local_modified: DateTime<Utc>,
		remote_modified: DateTime<Utc>,
		kind: ConflictKind,
	) -> Self {
		ConflictItem { path: path.into(), local_modified, remote_modified, kind, resolution: None }
	}
}

/// Which sides changed since the last sync of a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeState {
	Unchanged,
	LocalChanged,
	RemoteChanged,
	BothChanged,
}

impl ChangeState {
	/// Compare both modification times against the last sync.
	///
	/// A side counts as changed only if it is strictly newer.
	pub fn detect(
		local_modified: DateTime<Utc>,
		remote_modified: DateTime<Utc>,
		last_sync: DateTime<Utc>,
	) -> Self {
		match (local_modified > last_sync, remote_modified > last_sync) {
			(false, false) => ChangeState::Unchanged,
			(true, false) => ChangeState::LocalChanged,
			(false, true) => ChangeState::RemoteChanged,
			(true, true) => ChangeState::BothChanged,
		}
	}
}

/// Classify a conflict by what actually differs between the two versions
pub fn conflict_kind(content_differs: bool, metadata_differs: bool) -> ConflictKind {
	match (content_differs, metadata_differs) {
		(true, true) => ConflictKind::Both,
		(false, true) => ConflictKind::Metadata,
		// Identical versions with both timestamps moved still count as content
		_ => ConflictKind::Content,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;

	fn at(secs: i64) -> DateTime<Utc> {
		Utc.timestamp_opt(secs, 0).unwrap()
	}

	#[test]
	fn test_detect_change_state() {
		let last = at(100);
		assert_eq!(ChangeState::detect(at(50), at(90), last), ChangeState::Unchanged);
		assert_eq!(ChangeState::detect(at(150), at(90), last), ChangeState::LocalChanged);
		assert_eq!(ChangeState::detect(at(50), at(150), last), ChangeState::RemoteChanged);
		assert_eq!(ChangeState::detect(at(150), at(200), last), ChangeState::BothChanged);
	}

	#[test]
	fn test_equal_timestamp_is_not_a_change() {
		assert_eq!(ChangeState::detect(at(100), at(100), at(100)), ChangeState::Unchanged);
	}

	#[test]
	fn test_epoch_last_sync_sees_both_changed() {
		let epoch = DateTime::<Utc>::UNIX_EPOCH;
		assert_eq!(ChangeState::detect(at(1), at(1), epoch), ChangeState::BothChanged);
	}

	#[test]
	fn test_conflict_kind() {
		assert_eq!(conflict_kind(true, true), ConflictKind::Both);
		assert_eq!(conflict_kind(true, false), ConflictKind::Content);
		assert_eq!(conflict_kind(false, true), ConflictKind::Metadata);
		assert_eq!(conflict_kind(false, false), ConflictKind::Content);
	}
}

// vim: ts=4
