//! Callback trait for progress reporting and status events

use crate::conflict::{ConflictItem, ConflictResolver};
use crate::strategies::SyncDirection;
use crate::types::SyncResult;

/// Events emitted while syncing
#[derive(Debug, Clone)]
pub enum SyncEvent {
	/// A full pass passed its connectivity check and is starting
	PassStarted { direction: SyncDirection },

	/// Items processed so far out of the total for the current phase
	Progress { processed: usize, total: usize },

	/// An item was written to one side; `pushed` is true for note to wiki
	ItemSynced { path: String, pushed: bool },

	/// An item failed; the pass continues
	ItemFailed { path: String, error: String },

	/// Both sides changed; `resolution` on the item tells whether it was
	/// resolved automatically
	ConflictDetected { conflict: ConflictItem },

	/// A pass or a single watched-file sync finished
	PassFinished { result: SyncResult },
}

/// Receives sync events
pub trait SyncProgressCallback: Send + Sync {
	fn on_event(&self, _event: SyncEvent) {}
}

impl<T: Fn(SyncEvent) + Send + Sync> SyncProgressCallback for T {
	fn on_event(&self, event: SyncEvent) {
		self(event);
	}
}

/// Callback that ignores every event
pub struct NoCallbacks;

impl SyncProgressCallback for NoCallbacks {}

/// Callback that logs status lines through tracing
pub struct LogCallbacks;

impl SyncProgressCallback for LogCallbacks {
	fn on_event(&self, event: SyncEvent) {
		match event {
			SyncEvent::PassStarted { direction } => tracing::info!("Starting {} sync", direction),
			SyncEvent::Progress { processed, total } => tracing::debug!("Progress {}/{}", processed, total),
			SyncEvent::ItemSynced { path, pushed } => {
				tracing::debug!("{} {}", if pushed { "Pushed" } else { "Pulled" }, path)
			}
			SyncEvent::ItemFailed { path, error } => tracing::warn!("{} failed: {}", path, error),
			SyncEvent::ConflictDetected { conflict } => match conflict.resolution {
				Some(resolution) => tracing::info!(
					"Conflict on {} resolved as {}: {}",
					conflict.path,
					resolution,
					ConflictResolver::strategy_description(resolution)
				),
				None => tracing::warn!("Conflict on {} needs manual resolution", conflict.path),
			},
			SyncEvent::PassFinished { result } => tracing::info!("{}", result.summary()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::{Arc, Mutex};

	#[test]
	fn test_closure_is_a_callback() {
		let seen = Arc::new(Mutex::new(Vec::new()));
		let sink = seen.clone();
		let callback = move |event: SyncEvent| {
			if let SyncEvent::Progress { processed, total } = event {
				sink.lock().unwrap().push((processed, total));
			}
		};

		let boxed: Box<dyn SyncProgressCallback> = Box::new(callback);
		boxed.on_event(SyncEvent::Progress { processed: 1, total: 2 });
		NoCallbacks.on_event(SyncEvent::Progress { processed: 9, total: 9 });

		assert_eq!(*seen.lock().unwrap(), vec![(1, 2)]);
	}
}

// vim: ts=4
