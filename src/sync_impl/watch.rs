//! Debounced reaction to local file modifications

use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::exclusion::normalize_path;
use crate::logging::*;
use crate::types::FileEvent;

use super::SyncEngine;

/// Collect modification events and queue a push for each path once it has
/// been quiet for the debounce period.
pub(super) async fn watch_loop(engine: SyncEngine, mut events: mpsc::Receiver<FileEvent>) {
	let mut pending: HashMap<String, Instant> = HashMap::new();
	let mut open = true;
	debug!("File watcher started");

	while open || !pending.is_empty() {
		let next_due = pending.values().min().copied();

		tokio::select! {
			event = events.recv(), if open => match event {
				Some(event) => {
					let path = normalize_path(&event.path);
					if !engine.settings().exclusion.is_syncable(&path) {
						debug!("Ignoring change to {}", path);
						continue;
					}
					// A new event restarts the quiet period for its path
					pending.insert(path, Instant::now() + engine.settings().config.debounce());
				}
				None => open = false,
			},
			_ = sleep_until(next_due), if next_due.is_some() => {
				let now = Instant::now();
				let mut due: Vec<String> =
					pending.iter().filter(|(_, at)| **at <= now).map(|(path, _)| path.clone()).collect();
				due.sort();
				for path in due {
					pending.remove(&path);
					debug!("Queueing push of {}", path);
					engine.enqueue_push(path);
				}
			}
		}
	}
	debug!("File watcher stopped");
}

async fn sleep_until(deadline: Option<Instant>) {
	match deadline {
		Some(deadline) => tokio::time::sleep_until(deadline).await,
		None => std::future::pending().await,
	}
}

// vim: ts=4
