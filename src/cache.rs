//! Checksum cache for change detection
//!
//! Remembers the checksum of the last content pushed for each vault path so
//! unchanged notes are not written to the wiki again. Entries expire after a
//! fixed TTL; expired entries read as absent and are compacted lazily by
//! `size()`. There is no capacity bound: keys are bounded by the vault size.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Content checksum used for change detection
pub fn content_checksum(content: &str) -> String {
	blake3::hash(content.as_bytes()).to_hex().to_string()
}

/// Cache entry for a single path
#[derive(Debug, Clone)]
struct CacheEntry {
	checksum: String,

	/// `None` when the TTL reaches past what `Instant` can represent
	expires_at: Option<Instant>,
}

impl CacheEntry {
	fn is_live(&self, now: Instant) -> bool {
		self.expires_at.map_or(true, |at| at > now)
	}
}

/// Time-bounded map from vault path to pushed checksum
#[derive(Debug)]
pub struct ChecksumCache {
	entries: HashMap<String, CacheEntry>,
	ttl: Duration,
}

impl ChecksumCache {
	pub fn new(ttl: Duration) -> Self {
		ChecksumCache { entries: HashMap::new(), ttl }
	}

	/// Get the cached checksum, if present and not expired
	pub fn get(&self, key: &str) -> Option<&str> {
		self.get_at(key, Instant::now())
	}

	/// Store or refresh the checksum for a path
	pub fn set(&mut self, key: &str, checksum: String) {
		self.set_at(key, checksum, Instant::now());
	}

	/// Forget a single path
	pub fn remove(&mut self, key: &str) {
		self.entries.remove(key);
	}

	/// Clear all cache entries
	pub fn clear(&mut self) {
		self.entries.clear();
	}

	/// Number of live entries; drops expired ones as a side effect
	pub fn size(&mut self) -> usize {
		self.compact_at(Instant::now());
		self.entries.len()
	}

	/// Change the TTL for entries written from now on
	pub fn set_ttl(&mut self, ttl: Duration) {
		self.ttl = ttl;
	}

	fn get_at(&self, key: &str, now: Instant) -> Option<&str> {
		self.entries
			.get(key)
			.filter(|entry| entry.is_live(now))
			.map(|entry| entry.checksum.as_str())
	}

	fn set_at(&mut self, key: &str, checksum: String, now: Instant) {
		self.entries.insert(key.to_string(), CacheEntry { checksum, expires_at: now.checked_add(self.ttl) });
	}

	fn compact_at(&mut self, now: Instant) {
		self.entries.retain(|_, entry| entry.is_live(now));
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_checksum_is_stable_and_content_sensitive() {
		assert_eq!(content_checksum("hello"), content_checksum("hello"));
		assert_ne!(content_checksum("hello"), content_checksum("hello!"));
		assert_eq!(content_checksum("").len(), 64);
	}

	#[test]
	fn test_cache_set_and_get() {
		let mut cache = ChecksumCache::new(Duration::from_secs(60));
		cache.set("notes/a.md", "abc".to_string());

		assert_eq!(cache.get("notes/a.md"), Some("abc"));
		assert_eq!(cache.get("notes/b.md"), None);
		assert_eq!(cache.size(), 1);
	}

	#[test]
	fn test_expired_entry_reads_as_absent() {
		let mut cache = ChecksumCache::new(Duration::from_secs(60));
		let start = Instant::now();
		cache.set_at("notes/a.md", "abc".to_string(), start);

		assert_eq!(cache.get_at("notes/a.md", start + Duration::from_secs(59)), Some("abc"));
		assert_eq!(cache.get_at("notes/a.md", start + Duration::from_secs(60)), None);

		// Still physically present until compacted
		assert_eq!(cache.entries.len(), 1);
		cache.compact_at(start + Duration::from_secs(61));
		assert_eq!(cache.entries.len(), 0);
	}

	#[test]
	fn test_set_refreshes_expiry() {
		let mut cache = ChecksumCache::new(Duration::from_secs(10));
		let start = Instant::now();
		cache.set_at("a.md", "v1".to_string(), start);
		cache.set_at("a.md", "v2".to_string(), start + Duration::from_secs(8));

		assert_eq!(cache.get_at("a.md", start + Duration::from_secs(15)), Some("v2"));
	}

	#[test]
	fn test_zero_ttl_never_hits() {
		let mut cache = ChecksumCache::new(Duration::ZERO);
		cache.set("a.md", "v1".to_string());
		assert_eq!(cache.get("a.md"), None);
		assert_eq!(cache.size(), 0);
	}

	#[test]
	fn test_huge_ttl_never_expires() {
		let mut cache = ChecksumCache::new(Duration::from_secs(u64::MAX));
		let start = Instant::now();
		cache.set_at("a.md", "v1".to_string(), start);

		assert_eq!(cache.get_at("a.md", start + Duration::from_secs(365 * 24 * 3600)), Some("v1"));
		assert_eq!(cache.size(), 1);
	}

	#[test]
	fn test_clear_and_remove() {
		let mut cache = ChecksumCache::new(Duration::from_secs(60));
		cache.set("a.md", "1".to_string());
		cache.set("b.md", "2".to_string());

		cache.remove("a.md");
		assert_eq!(cache.size(), 1);

		cache.clear();
		assert_eq!(cache.size(), 0);
	}
}

// vim: ts=4
