//! Unified configuration for wikisync
//!
//! The configuration follows a priority chain:
//! 1. Built-in defaults (SyncConfig::default())
//! 2. Config file (TOML, JSON or JSON5)
//! 3. Environment variables (WIKISYNC_* prefix)
//!
//! The engine never reads a config object owned by someone else: a new
//! configuration is handed over by value through `SyncEngine::update_settings`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::SyncError;
use crate::retry::RetryConfig;
use crate::strategies::{ConflictResolution, SyncDirection};

/// Prefix for configuration environment variables
pub const ENV_PREFIX: &str = "WIKISYNC_";

// ============================================================================
// MAIN CONFIGURATION STRUCT
// ============================================================================

/// Configuration consumed by the sync engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncConfig {
	// ========================================================================
	// SYNC BEHAVIOR
	// ========================================================================
	/// Direction of full sync passes
	pub sync_direction: SyncDirection,

	/// Policy applied when both sides changed since the last sync
	pub conflict_resolution: ConflictResolution,

	/// Run full passes periodically
	pub auto_sync: bool,

	/// Seconds between periodic passes (0 disables the timer)
	pub sync_interval_secs: u64,

	/// Quiet period after a local modification before it is pushed
	pub watch_debounce_ms: u64,

	// ========================================================================
	// EXCLUSION
	// ========================================================================
	/// Vault folders never synced, including everything nested below them
	pub excluded_folders: Vec<String>,

	/// Vault files never synced (exact paths or glob patterns)
	pub excluded_files: Vec<String>,

	// ========================================================================
	// MAPPING
	// ========================================================================
	/// Vault prefix to wiki prefix translations
	pub path_mappings: Vec<PathMapping>,

	/// Extra frontmatter keys copied into wiki metadata and back
	pub metadata_mappings: Vec<MetadataMapping>,

	// ========================================================================
	// WIKI TARGET
	// ========================================================================
	/// Locale of created pages
	pub locale: String,

	/// Editor of created pages
	pub editor: String,

	/// Publish pages unless the frontmatter says otherwise
	pub publish_by_default: bool,

	/// Mark pages private unless the frontmatter says otherwise
	pub private_by_default: bool,

	// ========================================================================
	// PERFORMANCE
	// ========================================================================
	/// Items per batch when pushing
	pub batch_size: usize,

	/// Remote operations in flight within a batch
	pub concurrency: usize,

	/// Pause between batches in milliseconds
	pub batch_delay_ms: u64,

	/// Page size for remote listing
	pub list_page_size: usize,

	// ========================================================================
	// CACHING & RETRY
	// ========================================================================
	/// How long a pushed checksum is trusted, in seconds
	pub checksum_ttl_secs: u64,

	/// Retry policy for remote calls
	pub retry: RetryConfig,
}

impl Default for SyncConfig {
	fn default() -> Self {
		SyncConfig {
			// Sync behavior
			sync_direction: SyncDirection::Bidirectional,
			conflict_resolution: ConflictResolution::Manual,
			auto_sync: false,
			sync_interval_secs: 300,
			watch_debounce_ms: 5000,

			// Exclusions
			excluded_folders: vec![],
			excluded_files: vec![],

			// Mapping
			path_mappings: vec![],
			metadata_mappings: vec![],

			// Wiki target
			locale: "en".to_string(),
			editor: "markdown".to_string(),
			publish_by_default: true,
			private_by_default: false,

			// Performance
			batch_size: 10,
			concurrency: 3,
			batch_delay_ms: 100,
			list_page_size: 1000,

			// Caching & retry
			checksum_ttl_secs: 30 * 60,
			retry: RetryConfig::default(),
		}
	}
}

// ============================================================================
// NESTED CONFIGURATION STRUCTS
// ============================================================================

/// Translation between a vault folder and a wiki path prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathMapping {
	/// Vault-relative folder, e.g. "Projects/Docs"
	pub obsidian_path: String,

	/// Wiki path prefix, e.g. "docs"
	pub wiki_path: String,

	/// Disabled mappings are ignored
	#[serde(default = "default_true")]
	pub enabled: bool,
}

impl PathMapping {
	pub fn new(obsidian_path: impl Into<String>, wiki_path: impl Into<String>) -> Self {
		PathMapping { obsidian_path: obsidian_path.into(), wiki_path: wiki_path.into(), enabled: true }
	}
}

/// Frontmatter key carried over to a wiki metadata field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataMapping {
	/// Frontmatter key in the vault note
	pub obsidian_field: String,

	/// Field name in the wiki page metadata
	pub wiki_field: String,
}

impl MetadataMapping {
	pub fn new(obsidian_field: impl Into<String>, wiki_field: impl Into<String>) -> Self {
		MetadataMapping { obsidian_field: obsidian_field.into(), wiki_field: wiki_field.into() }
	}
}

fn default_true() -> bool {
	true
}

// ============================================================================
// LOADING
// ============================================================================

impl SyncConfig {
	/// Load a configuration file, choosing the format by extension
	pub fn load(path: &Path) -> Result<Self, SyncError> {
		let contents = std::fs::read_to_string(path)?;
		let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_lowercase();

		let config: SyncConfig = match ext.as_str() {
			"toml" => toml::from_str(&contents).map_err(|e| SyncError::InvalidConfig {
				message: format!("{}: {}", path.display(), e),
			})?,
			"json" | "json5" => json5::from_str(&contents).map_err(|e| SyncError::InvalidConfig {
				message: format!("{}: {}", path.display(), e),
			})?,
			other => {
				return Err(SyncError::InvalidConfig {
					message: format!("Unsupported config format '{}' for {}", other, path.display()),
				})
			}
		};

		config.validate()?;
		Ok(config)
	}

	/// Apply WIKISYNC_* environment variables on top of this configuration
	pub fn apply_env(&mut self) -> Result<(), SyncError> {
		self.apply_overrides(|key| std::env::var(format!("{}{}", ENV_PREFIX, key)).ok())
	}

	/// Apply overrides from a key lookup (keys without the WIKISYNC_ prefix)
	pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), SyncError>
	where
		F: Fn(&str) -> Option<String>,
	{
		if let Some(v) = lookup("DIRECTION") {
			self.sync_direction = SyncDirection::from_str(&v)
				.map_err(|message| SyncError::InvalidConfig { message })?;
		}
		if let Some(v) = lookup("CONFLICT_RESOLUTION") {
			self.conflict_resolution = ConflictResolution::from_str(&v)
				.map_err(|message| SyncError::InvalidConfig { message })?;
		}
		if let Some(v) = lookup("AUTO_SYNC") {
			self.auto_sync = parse_bool(&v).ok_or_else(|| SyncError::InvalidConfig {
				message: format!("{}AUTO_SYNC: expected a boolean, got '{}'", ENV_PREFIX, v),
			})?;
		}
		if let Some(v) = lookup("SYNC_INTERVAL") {
			self.sync_interval_secs = v.trim().parse().map_err(|_| SyncError::InvalidConfig {
				message: format!("{}SYNC_INTERVAL: expected seconds, got '{}'", ENV_PREFIX, v),
			})?;
		}
		if let Some(v) = lookup("EXCLUDED_FOLDERS") {
			self.excluded_folders = split_list(&v);
		}
		if let Some(v) = lookup("EXCLUDED_FILES") {
			self.excluded_files = split_list(&v);
		}
		if let Some(v) = lookup("LOCALE") {
			self.locale = v;
		}
		Ok(())
	}

	/// Reject configurations the engine cannot run with
	pub fn validate(&self) -> Result<(), SyncError> {
		if self.batch_size == 0 {
			return Err(SyncError::InvalidConfig {
				message: "batchSize must be greater than 0".to_string(),
			});
		}
		if self.concurrency == 0 {
			return Err(SyncError::InvalidConfig {
				message: "concurrency must be greater than 0".to_string(),
			});
		}
		if self.list_page_size == 0 {
			return Err(SyncError::InvalidConfig {
				message: "listPageSize must be greater than 0".to_string(),
			});
		}
		if self.retry.backoff_factor < 1.0 {
			return Err(SyncError::InvalidConfig {
				message: format!("retry.backoffFactor must be at least 1, got {}", self.retry.backoff_factor),
			});
		}
		if self.retry.max_retries > 100 {
			return Err(SyncError::InvalidConfig {
				message: format!("retry.maxRetries too high: {}", self.retry.max_retries),
			});
		}
		for mapping in &self.path_mappings {
			if mapping.obsidian_path.trim_matches('/').is_empty() && mapping.wiki_path.is_empty() {
				return Err(SyncError::InvalidConfig {
					message: "path mapping needs an obsidianPath or a wikiPath".to_string(),
				});
			}
		}
		// Glob syntax errors surface here rather than in the middle of a pass
		crate::exclusion::ExclusionRules::from_config(self)?;
		Ok(())
	}

	pub fn debounce(&self) -> Duration {
		Duration::from_millis(self.watch_debounce_ms)
	}

	pub fn batch_delay(&self) -> Duration {
		Duration::from_millis(self.batch_delay_ms)
	}

	pub fn checksum_ttl(&self) -> Duration {
		Duration::from_secs(self.checksum_ttl_secs)
	}

	/// Period of the auto-sync timer, if enabled
	pub fn sync_interval(&self) -> Option<Duration> {
		if self.auto_sync && self.sync_interval_secs > 0 {
			Some(Duration::from_secs(self.sync_interval_secs))
		} else {
			None
		}
	}
}

fn parse_bool(s: &str) -> Option<bool> {
	match s.trim().to_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Some(true),
		"0" | "false" | "no" | "off" => Some(false),
		_ => None,
	}
}

fn split_list(s: &str) -> Vec<String> {
	s.split(',').map(str::trim).filter(|p| !p.is_empty()).map(String::from).collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	#[test]
	fn test_config_default() {
		let config = SyncConfig::default();
		assert_eq!(config.sync_direction, SyncDirection::Bidirectional);
		assert_eq!(config.conflict_resolution, ConflictResolution::Manual);
		assert_eq!(config.watch_debounce_ms, 5000);
		assert_eq!(config.checksum_ttl(), Duration::from_secs(1800));
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_config_serialization() {
		let mut config = SyncConfig::default();
		config.path_mappings.push(PathMapping::new("Projects", "projects"));
		let json = serde_json::to_string(&config).expect("Failed to serialize");
		assert!(json.contains("\"syncDirection\":\"bidirectional\""));
		let deserialized: SyncConfig = serde_json::from_str(&json).expect("Failed to deserialize");
		assert_eq!(config, deserialized);
	}

	#[test]
	fn test_partial_toml_uses_defaults() {
		let config: SyncConfig = toml::from_str(
			r#"
			syncDirection = "push"
			excludedFolders = ["Private"]

			[[pathMappings]]
			obsidianPath = "Docs"
			wikiPath = "docs"
			"#,
		)
		.unwrap();

		assert_eq!(config.sync_direction, SyncDirection::LocalToRemote);
		assert_eq!(config.excluded_folders, vec!["Private".to_string()]);
		assert!(config.path_mappings[0].enabled);
		assert_eq!(config.batch_size, 10);
	}

	#[test]
	fn test_env_overrides() {
		let vars: HashMap<&str, &str> = [
			("DIRECTION", "pull"),
			("CONFLICT_RESOLUTION", "remote"),
			("AUTO_SYNC", "yes"),
			("SYNC_INTERVAL", "60"),
			("EXCLUDED_FOLDERS", "Private, Archive ,"),
		]
		.into_iter()
		.collect();

		let mut config = SyncConfig::default();
		config.apply_overrides(|k| vars.get(k).map(|v| v.to_string())).unwrap();

		assert_eq!(config.sync_direction, SyncDirection::RemoteToLocal);
		assert_eq!(config.conflict_resolution, ConflictResolution::Remote);
		assert_eq!(config.sync_interval(), Some(Duration::from_secs(60)));
		assert_eq!(config.excluded_folders, vec!["Private".to_string(), "Archive".to_string()]);
	}

	#[test]
	fn test_env_override_rejects_garbage() {
		let mut config = SyncConfig::default();
		let result = config.apply_overrides(|k| (k == "AUTO_SYNC").then(|| "maybe".to_string()));
		assert!(result.is_err());
	}

	#[test]
	fn test_validate_rejects_zero_concurrency() {
		let config = SyncConfig { concurrency: 0, ..Default::default() };
		let err = config.validate().unwrap_err();
		assert!(err.to_string().contains("concurrency"));
	}

	#[test]
	fn test_validate_rejects_bad_glob() {
		let config = SyncConfig { excluded_files: vec!["notes/[abc.md".to_string()], ..Default::default() };
		assert!(config.validate().is_err());
	}

	#[test]
	fn test_interval_disabled_without_auto_sync() {
		let config = SyncConfig { auto_sync: false, sync_interval_secs: 10, ..Default::default() };
		assert_eq!(config.sync_interval(), None);
	}
}

// vim: ts=4
