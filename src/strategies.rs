//! Consolidated strategy and mode enums
//!
//! Each enum includes a FromStr implementation for CLI, environment and
//! config parsing, and a Display implementation producing the canonical name.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// SYNC DIRECTION
// ============================================================================

/// Which way a full sync pass moves content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SyncDirection {
	/// Push local notes to the wiki, never touch the vault
	#[serde(alias = "push", alias = "obsidian-to-wiki")]
	LocalToRemote,

	/// Pull wiki pages into the vault, never touch the wiki
	#[serde(alias = "pull", alias = "wiki-to-obsidian")]
	RemoteToLocal,

	/// Push or pull per item, detecting conflicts (default)
	#[default]
	#[serde(alias = "both")]
	Bidirectional,
}

impl FromStr for SyncDirection {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"local-to-remote" | "obsidian-to-wiki" | "push" => Ok(Self::LocalToRemote),
			"remote-to-local" | "wiki-to-obsidian" | "pull" => Ok(Self::RemoteToLocal),
			"bidirectional" | "both" => Ok(Self::Bidirectional),
			_ => Err(format!(
				"Unknown sync direction: {}. Valid options: local-to-remote, remote-to-local, bidirectional",
				s
			)),
		}
	}
}

impl std::fmt::Display for SyncDirection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::LocalToRemote => write!(f, "local-to-remote"),
			Self::RemoteToLocal => write!(f, "remote-to-local"),
			Self::Bidirectional => write!(f, "bidirectional"),
		}
	}
}

// ============================================================================
// CONFLICT RESOLUTION
// ============================================================================

/// Strategy applied when both sides changed since the last sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictResolution {
	/// Local version wins, remote changes are overwritten
	Local,

	/// Remote version wins, local changes are overwritten
	Remote,

	/// Touch neither side and report the conflict (default)
	#[default]
	Manual,
}

impl FromStr for ConflictResolution {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"local" | "prefer-local" | "obsidian" => Ok(Self::Local),
			"remote" | "prefer-remote" | "wiki" => Ok(Self::Remote),
			"manual" | "ask" => Ok(Self::Manual),
			_ => Err(format!(
				"Unknown conflict resolution: {}. Valid options: local, remote, manual",
				s
			)),
		}
	}
}

impl std::fmt::Display for ConflictResolution {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Local => write!(f, "local"),
			Self::Remote => write!(f, "remote"),
			Self::Manual => write!(f, "manual"),
		}
	}
}

impl ConflictResolution {
	/// Check if the strategy resolves conflicts without user involvement
	pub fn is_automatic(&self) -> bool {
		!matches!(self, ConflictResolution::Manual)
	}
}

// ============================================================================
// CONFLICT KIND
// ============================================================================

/// What diverged between the two versions of a conflicted item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictKind {
	Content,
	Metadata,
	Both,
}

impl std::fmt::Display for ConflictKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Content => write!(f, "content"),
			Self::Metadata => write!(f, "metadata"),
			Self::Both => write!(f, "both"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_sync_direction_from_str() {
		assert_eq!(SyncDirection::from_str("push").unwrap(), SyncDirection::LocalToRemote);
		assert_eq!(
			SyncDirection::from_str("wiki-to-obsidian").unwrap(),
			SyncDirection::RemoteToLocal
		);
		assert_eq!(SyncDirection::from_str("Bidirectional").unwrap(), SyncDirection::Bidirectional);
		assert!(SyncDirection::from_str("sideways").is_err());
	}

	#[test]
	fn test_conflict_resolution_from_str() {
		assert_eq!(ConflictResolution::from_str("local").unwrap(), ConflictResolution::Local);
		assert_eq!(ConflictResolution::from_str("wiki").unwrap(), ConflictResolution::Remote);
		assert_eq!(ConflictResolution::from_str("manual").unwrap(), ConflictResolution::Manual);
		assert!(ConflictResolution::from_str("newest").is_err());
	}

	#[test]
	fn test_display_round_trips_through_from_str() {
		for dir in
			[SyncDirection::LocalToRemote, SyncDirection::RemoteToLocal, SyncDirection::Bidirectional]
		{
			assert_eq!(SyncDirection::from_str(&dir.to_string()).unwrap(), dir);
		}
	}

	#[test]
	fn test_is_automatic() {
		assert!(ConflictResolution::Local.is_automatic());
		assert!(ConflictResolution::Remote.is_automatic());
		assert!(!ConflictResolution::Manual.is_automatic());
	}
}

// vim: ts=4
