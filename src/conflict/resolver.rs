//! Conflict resolution logic

use super::ConflictItem;
use crate::strategies::ConflictResolution;

/// What the engine does with a conflicted item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictAction {
	/// Overwrite the wiki page with the note
	PushLocal,

	/// Overwrite the note with the wiki page
	PullRemote,

	/// Leave both sides alone and report the conflict
	Defer,
}

/// Resolves conflicts using the configured strategy
#[derive(Debug, Clone, Copy)]
pub struct ConflictResolver {
	strategy: ConflictResolution,
}

impl ConflictResolver {
	pub fn new(strategy: ConflictResolution) -> Self {
		ConflictResolver { strategy }
	}

	/// Decide the action for a conflict and record the applied resolution
	pub fn resolve(&self, conflict: &mut ConflictItem) -> ConflictAction {
		match self.strategy {
			ConflictResolution::Local => {
				conflict.resolution = Some(ConflictResolution::Local);
				ConflictAction::PushLocal
			}
			ConflictResolution::Remote => {
				conflict.resolution = Some(ConflictResolution::Remote);
				ConflictAction::PullRemote
			}
			ConflictResolution::Manual => ConflictAction::Defer,
		}
	}

	pub fn strategy(&self) -> ConflictResolution {
		self.strategy
	}

	/// Get a human-readable description of the strategy
	pub fn strategy_description(strategy: ConflictResolution) -> &'static str {
		match strategy {
			ConflictResolution::Local => "Keep the local note, overwrite the wiki page",
			ConflictResolution::Remote => "Keep the wiki page, overwrite the local note",
			ConflictResolution::Manual => "Leave both versions and report the conflict",
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::strategies::ConflictKind;
	use chrono::Utc;

	fn conflict() -> ConflictItem {
		ConflictItem::new("notes/a.md", Utc::now(), Utc::now(), ConflictKind::Content)
	}

	#[test]
	fn test_local_strategy_pushes() {
		let mut item = conflict();
		assert_eq!(ConflictResolver::new(ConflictResolution::Local).resolve(&mut item), ConflictAction::PushLocal);
		assert_eq!(item.resolution, Some(ConflictResolution::Local));
	}

	#[test]
	fn test_remote_strategy_pulls() {
		let mut item = conflict();
		assert_eq!(
			ConflictResolver::new(ConflictResolution::Remote).resolve(&mut item),
			ConflictAction::PullRemote
		);
		assert_eq!(item.resolution, Some(ConflictResolution::Remote));
	}

	#[test]
	fn test_manual_strategy_defers_unresolved() {
		let mut item = conflict();
		assert_eq!(ConflictResolver::new(ConflictResolution::Manual).resolve(&mut item), ConflictAction::Defer);
		assert_eq!(item.resolution, None);
	}

	#[test]
	fn test_strategy_description() {
		assert!(ConflictResolver::strategy_description(ConflictResolution::Manual).contains("report"));

		let resolver = ConflictResolver::new(ConflictResolution::Remote);
		let described = ConflictResolver::strategy_description(resolver.strategy());
		assert!(described.starts_with("Keep the wiki page"));
		assert_ne!(described, ConflictResolver::strategy_description(ConflictResolution::Local));
	}
}

// vim: ts=4
