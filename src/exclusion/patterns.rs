//! Glob-based file exclusion

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::SyncError;

/// Characters that turn an excluded-file entry into a glob pattern
const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Check whether an excluded-file entry should be compiled as a glob
pub fn is_glob(entry: &str) -> bool {
	entry.contains(GLOB_META)
}

/// Pattern matcher using globset for efficient matching
#[derive(Debug, Clone)]
pub struct PatternMatcher {
	/// Compiled user patterns
	exclude_set: GlobSet,

	/// Always-excluded patterns (built-in)
	always_exclude: GlobSet,
}

impl PatternMatcher {
	/// Create a new pattern matcher from user glob patterns
	pub fn new(patterns: &[String]) -> Result<Self, SyncError> {
		let always_exclude = Self::build_always_excluded()?;
		let exclude_set = Self::build_glob_set(patterns)?;
		Ok(Self { exclude_set, always_exclude })
	}

	/// Vault housekeeping that never belongs on the wiki
	fn build_always_excluded() -> Result<GlobSet, SyncError> {
		let patterns = [
			".obsidian/**", // Vault settings and plugins
			".trash/**",    // Vault trash
			"**/.DS_Store", // macOS cruft
			"**/*.swp",     // Vim swap files
			"**/*~",        // Editor backups
		];

		Self::build_glob_set(&patterns.into_iter().map(String::from).collect::<Vec<_>>())
	}

	fn build_glob_set(patterns: &[String]) -> Result<GlobSet, SyncError> {
		let mut builder = GlobSetBuilder::new();

		for pattern in patterns {
			let glob = GlobBuilder::new(pattern).literal_separator(true).build().map_err(|e| {
				SyncError::InvalidConfig { message: format!("Invalid exclusion pattern {}: {}", pattern, e) }
			})?;
			builder.add(glob);
		}

		Ok(builder.build()?)
	}

	/// Check if a normalized vault path is excluded by any pattern
	pub fn is_excluded(&self, path: &str) -> bool {
		self.always_exclude.is_match(path) || self.exclude_set.is_match(path)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_basic_exclusion() {
		let matcher = PatternMatcher::new(&["*.excalidraw.md".to_string()]).unwrap();

		assert!(matcher.is_excluded("drawing.excalidraw.md"));
		assert!(!matcher.is_excluded("notes/drawing.excalidraw.md"));
		assert!(!matcher.is_excluded("note.md"));
	}

	#[test]
	fn test_recursive_patterns() {
		let matcher = PatternMatcher::new(&["**/draft-*.md".to_string()]).unwrap();

		assert!(matcher.is_excluded("deep/nested/draft-1.md"));
		assert!(matcher.is_excluded("draft-2.md"));
		assert!(!matcher.is_excluded("deep/final.md"));
	}

	#[test]
	fn test_always_excluded() {
		let matcher = PatternMatcher::new(&[]).unwrap();

		assert!(matcher.is_excluded(".obsidian/workspace.json"));
		assert!(matcher.is_excluded(".trash/old.md"));
		assert!(matcher.is_excluded("notes/.DS_Store"));
		assert!(!matcher.is_excluded("notes/a.md"));
	}

	#[test]
	fn test_is_glob() {
		assert!(is_glob("*.md"));
		assert!(is_glob("notes/{a,b}.md"));
		assert!(!is_glob("notes/a.md"));
	}
}

// vim: ts=4
