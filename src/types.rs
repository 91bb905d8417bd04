use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::conflict::ConflictItem;

/// Outcome of one sync pass or one watched-file sync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
	pub success: bool,
	pub message: String,
	pub synced: usize,
	pub failed: usize,

	/// Conflicts left for the user to resolve
	pub conflicts: Vec<ConflictItem>,

	/// One `"<path>: <error>"` line per failed item
	pub errors: Vec<String>,
}

impl SyncResult {
	/// A result for a pass that did no work
	pub fn failure(message: impl Into<String>) -> Self {
		SyncResult {
			success: false,
			message: message.into(),
			synced: 0,
			failed: 0,
			conflicts: Vec::new(),
			errors: Vec::new(),
		}
	}

	/// An empty successful result, to be filled by a pass
	pub fn empty() -> Self {
		SyncResult { success: true, ..Self::failure(String::new()) }
	}

	pub fn record_success(&mut self) {
		self.synced += 1;
	}

	pub fn record_failure(&mut self, path: &str, error: impl std::fmt::Display) {
		self.failed += 1;
		self.errors.push(format!("{}: {}", path, error));
	}

	/// Short status line for the user
	pub fn summary(&self) -> String {
		if !self.success {
			return self.message.clone();
		}
		let mut parts = vec![format!("{} synced", self.synced)];
		if self.failed > 0 {
			parts.push(format!("{} failed", self.failed));
		}
		if !self.conflicts.is_empty() {
			parts.push(format!("{} conflicts need manual resolution", self.conflicts.len()));
		}
		format!("Sync finished: {}", parts.join(", "))
	}
}

/// A local modification reported by the file watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
	/// Vault path of the modified note
	pub path: String,

	pub modified: DateTime<Utc>,
}

impl FileEvent {
	pub fn new(path: impl Into<String>, modified: DateTime<Utc>) -> Self {
		FileEvent { path: path.into(), modified }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::strategies::ConflictKind;

	#[test]
	fn test_failure_result() {
		let result = SyncResult::failure("Sync already in progress");
		assert!(!result.success);
		assert_eq!(result.synced, 0);
		assert_eq!(result.summary(), "Sync already in progress");
	}

	#[test]
	fn test_record_failure_formats_path() {
		let mut result = SyncResult::empty();
		result.record_success();
		result.record_failure("notes/a.md", "boom");
		assert_eq!(result.errors, vec!["notes/a.md: boom".to_string()]);
		assert_eq!(result.summary(), "Sync finished: 1 synced, 1 failed");
	}

	#[test]
	fn test_summary_mentions_conflicts() {
		let mut result = SyncResult::empty();
		result.conflicts.push(ConflictItem::new("a.md", Utc::now(), Utc::now(), ConflictKind::Both));
		assert!(result.summary().contains("1 conflicts need manual resolution"));
	}
}

// vim: ts=4
