//! Exclusion rules for vault paths
//!
//! A path is excluded when it sits inside an excluded folder, equals an
//! excluded file entry, or matches an excluded glob pattern. Excluded paths
//! are skipped in every direction.

mod patterns;

pub use patterns::PatternMatcher;

use std::collections::HashSet;

use crate::config::SyncConfig;
use crate::error::SyncError;

/// Combined exclusion check built from a configuration snapshot
#[derive(Debug, Clone)]
pub struct ExclusionRules {
	folders: Vec<String>,
	files: HashSet<String>,
	pattern_matcher: PatternMatcher,
}

impl ExclusionRules {
	/// Build rules from folder and file entries
	pub fn new(folders: &[String], files: &[String]) -> Result<Self, SyncError> {
		let folders = folders
			.iter()
			.map(|f| normalize_path(f))
			.filter(|f| !f.is_empty())
			.collect();

		// Every entry matches its own literal path; entries with glob
		// characters additionally match as patterns
		let files: HashSet<String> = files.iter().map(|f| normalize_path(f)).collect();
		let globs: Vec<String> = files.iter().filter(|f| patterns::is_glob(f)).cloned().collect();

		let pattern_matcher = PatternMatcher::new(&globs)?;

		Ok(Self { folders, files, pattern_matcher })
	}

	pub fn from_config(config: &SyncConfig) -> Result<Self, SyncError> {
		Self::new(&config.excluded_folders, &config.excluded_files)
	}

	/// Check if a vault path should be skipped
	pub fn is_excluded(&self, path: &str) -> bool {
		let path = normalize_path(path);

		if self.pattern_matcher.is_excluded(&path) {
			return true;
		}

		if self.files.contains(&path) {
			return true;
		}

		self.folders.iter().any(|folder| {
			path == *folder
				|| (path.starts_with(folder.as_str()) && path[folder.len()..].starts_with('/'))
		})
	}

	/// Check if a vault path is a note that takes part in sync
	pub fn is_syncable(&self, path: &str) -> bool {
		path.to_lowercase().ends_with(".md") && !self.is_excluded(path)
	}
}

/// Normalize a vault path: forward slashes, no leading or trailing slash
pub fn normalize_path(path: &str) -> String {
	path.replace('\\', "/").trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn rules(folders: &[&str], files: &[&str]) -> ExclusionRules {
		let folders: Vec<String> = folders.iter().map(|s| s.to_string()).collect();
		let files: Vec<String> = files.iter().map(|s| s.to_string()).collect();
		ExclusionRules::new(&folders, &files).unwrap()
	}

	#[test]
	fn test_folder_and_nested_paths_excluded() {
		let rules = rules(&["Private/"], &[]);

		assert!(rules.is_excluded("Private"));
		assert!(rules.is_excluded("Private/a.md"));
		assert!(rules.is_excluded("/Private/deep/b.md"));
		// Prefix of a different folder name is not nested
		assert!(!rules.is_excluded("PrivateNotes/c.md"));
	}

	#[test]
	fn test_exact_file_excluded() {
		let rules = rules(&[], &["notes/secret.md"]);

		assert!(rules.is_excluded("notes/secret.md"));
		assert!(!rules.is_excluded("notes/secret.md.bak"));
		assert!(!rules.is_excluded("other/secret.md"));
	}

	#[test]
	fn test_entry_with_glob_characters_matches_literally() {
		let rules = rules(&[], &["notes/{draft}.md", "notes/[wip].md"]);

		assert!(rules.is_excluded("notes/{draft}.md"));
		assert!(rules.is_excluded("notes/[wip].md"));
		assert!(!rules.is_excluded("notes/other.md"));
	}

	#[test]
	fn test_glob_file_entries() {
		let rules = rules(&[], &["**/*.tmp.md"]);

		assert!(rules.is_excluded("a/b/c.tmp.md"));
		assert!(!rules.is_excluded("a/b/c.md"));
	}

	#[test]
	fn test_is_syncable_requires_markdown() {
		let rules = rules(&["Templates"], &[]);

		assert!(rules.is_syncable("notes/a.md"));
		assert!(!rules.is_syncable("notes/image.png"));
		assert!(!rules.is_syncable("Templates/daily.md"));
		assert!(!rules.is_syncable(".obsidian/app.md"));
		assert!(!rules.is_syncable(".trash/old.md"));
	}

	#[test]
	fn test_normalize_path() {
		assert_eq!(normalize_path("\\notes\\a.md"), "notes/a.md");
		assert_eq!(normalize_path("/docs/"), "docs");
	}
}

// vim: ts=4
