//! Engine state shared across passes
//!
//! Holds the per-path last-synced timestamps, the checksum cache and the
//! single-flight flag. Nothing here is persisted: a new engine starts with
//! every path unsynced.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::cache::ChecksumCache;

pub(crate) struct SyncState {
	last_synced: Mutex<HashMap<String, DateTime<Utc>>>,
	checksums: Mutex<ChecksumCache>,
	in_progress: AtomicBool,
}

impl SyncState {
	pub fn new(checksum_ttl: Duration) -> Self {
		SyncState {
			last_synced: Mutex::new(HashMap::new()),
			checksums: Mutex::new(ChecksumCache::new(checksum_ttl)),
			in_progress: AtomicBool::new(false),
		}
	}

	/// Last successful sync of a path; the epoch if it was never synced
	pub fn last_synced(&self, path: &str) -> DateTime<Utc> {
		self.last_synced
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.get(path)
			.copied()
			.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
	}

	pub fn mark_synced(&self, path: &str, at: DateTime<Utc>) {
		self.last_synced.lock().unwrap_or_else(|e| e.into_inner()).insert(path.to_string(), at);
	}

	pub fn cached_checksum(&self, path: &str) -> Option<String> {
		self.checksums.lock().unwrap_or_else(|e| e.into_inner()).get(path).map(str::to_string)
	}

	pub fn store_checksum(&self, path: &str, checksum: String) {
		self.checksums.lock().unwrap_or_else(|e| e.into_inner()).set(path, checksum);
	}

	pub fn set_checksum_ttl(&self, ttl: Duration) {
		self.checksums.lock().unwrap_or_else(|e| e.into_inner()).set_ttl(ttl);
	}

	/// Claim the single-flight flag, `None` if a pass already holds it
	pub fn try_begin(&self) -> Option<SyncGuard<'_>> {
		self.in_progress
			.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
			.ok()
			.map(|_| SyncGuard { flag: &self.in_progress })
	}

	pub fn is_syncing(&self) -> bool {
		self.in_progress.load(Ordering::Acquire)
	}
}

/// Holds the single-flight flag for the duration of a pass
pub(crate) struct SyncGuard<'a> {
	flag: &'a AtomicBool,
}

impl Drop for SyncGuard<'_> {
	fn drop(&mut self) {
		// Released on every exit path, including errors and panics
		self.flag.store(false, Ordering::Release);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_guard_is_exclusive_and_released_on_drop() {
		let state = SyncState::new(Duration::from_secs(60));
		let guard = state.try_begin();
		assert!(guard.is_some());
		assert!(state.is_syncing());
		assert!(state.try_begin().is_none());

		drop(guard);
		assert!(!state.is_syncing());
		assert!(state.try_begin().is_some());
	}

	#[test]
	fn test_unsynced_path_defaults_to_epoch() {
		let state = SyncState::new(Duration::from_secs(60));
		assert_eq!(state.last_synced("a.md"), DateTime::<Utc>::UNIX_EPOCH);

		let now = Utc::now();
		state.mark_synced("a.md", now);
		assert_eq!(state.last_synced("a.md"), now);
	}

	#[test]
	fn test_checksums() {
		let state = SyncState::new(Duration::from_secs(60));
		state.store_checksum("a.md", "abc".to_string());
		assert_eq!(state.cached_checksum("a.md").as_deref(), Some("abc"));
		assert_eq!(state.cached_checksum("b.md"), None);
	}
}

// vim: ts=4
