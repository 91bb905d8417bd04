/// Configuration loading: file formats, environment overrides and validation
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

use wikisync::config::PathMapping;
use wikisync::strategies::{ConflictResolution, SyncDirection};
use wikisync::{SyncConfig, SyncError};

#[test]
fn test_toml_config() {
	let temp_dir = TempDir::new().expect("Failed to create temp dir");
	let path = temp_dir.path().join("wikisync.toml");
	fs::write(
		&path,
		r#"
syncDirection = "local-to-remote"
conflictResolution = "remote"
excludedFolders = ["private", "templates/"]
excludedFiles = ["*.excalidraw.md"]
concurrency = 5

[[pathMappings]]
obsidianPath = "Projects"
wikiPath = "projects"

[retry]
maxRetries = 1
"#,
	)
	.unwrap();

	let config = SyncConfig::load(&path).unwrap();
	assert_eq!(config.sync_direction, SyncDirection::LocalToRemote);
	assert_eq!(config.conflict_resolution, ConflictResolution::Remote);
	assert_eq!(config.excluded_folders, vec!["private", "templates/"]);
	assert_eq!(config.concurrency, 5);
	assert_eq!(config.path_mappings, vec![PathMapping::new("Projects", "projects")]);
	assert_eq!(config.retry.max_retries, 1);
	// Untouched fields keep their defaults
	assert_eq!(config.batch_size, 10);
	assert_eq!(config.retry.initial_delay_ms, 1000);
}

#[test]
fn test_json5_config() {
	let temp_dir = TempDir::new().expect("Failed to create temp dir");
	let path = temp_dir.path().join("wikisync.json5");
	fs::write(
		&path,
		r#"{
	// comments are allowed
	syncDirection: "pull",
	metadataMappings: [{ obsidianField: "summary", wikiField: "description" }],
	autoSync: true,
}"#,
	)
	.unwrap();

	let config = SyncConfig::load(&path).unwrap();
	assert_eq!(config.sync_direction, SyncDirection::RemoteToLocal);
	assert_eq!(config.metadata_mappings.len(), 1);
	assert!(config.auto_sync);
	assert!(config.sync_interval().is_some());
}

#[test]
fn test_invalid_values_are_rejected() {
	let temp_dir = TempDir::new().expect("Failed to create temp dir");

	let zero = temp_dir.path().join("zero.toml");
	fs::write(&zero, "batchSize = 0\n").unwrap();
	assert!(matches!(SyncConfig::load(&zero), Err(SyncError::InvalidConfig { .. })));

	let glob = temp_dir.path().join("glob.toml");
	fs::write(&glob, "excludedFiles = [\"notes/[unclosed\"]\n").unwrap();
	assert!(matches!(SyncConfig::load(&glob), Err(SyncError::InvalidConfig { .. })));

	let unknown = temp_dir.path().join("config.yaml");
	fs::write(&unknown, "a: b\n").unwrap();
	assert!(SyncConfig::load(&unknown).is_err());
}

#[test]
fn test_environment_overrides() {
	let env: HashMap<&str, &str> = [
		("DIRECTION", "both"),
		("CONFLICT_RESOLUTION", "prefer-local"),
		("AUTO_SYNC", "yes"),
		("SYNC_INTERVAL", "60"),
		("EXCLUDED_FOLDERS", "a, b"),
	]
	.into_iter()
	.collect();

	let mut config = SyncConfig { sync_direction: SyncDirection::LocalToRemote, ..Default::default() };
	config.apply_overrides(|key| env.get(key).map(|v| v.to_string())).unwrap();

	assert_eq!(config.sync_direction, SyncDirection::Bidirectional);
	assert_eq!(config.conflict_resolution, ConflictResolution::Local);
	assert!(config.auto_sync);
	assert_eq!(config.sync_interval_secs, 60);
	assert_eq!(config.excluded_folders, vec!["a", "b"]);
}

#[test]
fn test_bad_environment_value() {
	let mut config = SyncConfig::default();
	let result = config.apply_overrides(|key| (key == "DIRECTION").then(|| "sideways".to_string()));
	assert!(matches!(result, Err(SyncError::InvalidConfig { .. })));
}

// vim: ts=4
