//! Note to wiki direction

use crate::batch::batch_process;
use crate::cache::content_checksum;
use crate::callbacks::SyncEvent;
use crate::error::SyncError;
use crate::logging::*;
use crate::retry::retry;
use crate::types::SyncResult;

use super::{sync_time, ItemOutcome, PassContext};

impl PassContext<'_> {
	/// Push every syncable note, a batch at a time
	pub async fn push_all(&self) -> Result<SyncResult, SyncError> {
		let paths: Vec<String> = self
			.vault
			.list_notes()
			.await?
			.into_iter()
			.map(|entry| entry.path)
			.filter(|path| self.settings.exclusion.is_syncable(path))
			.collect();
		debug!("Pushing {} notes", paths.len());

		let outcomes = batch_process(
			paths,
			|path| self.push_one(path, false),
			&self.settings.batch_options(),
			|processed, total| self.callbacks.on_event(SyncEvent::Progress { processed, total }),
		)
		.await;

		let mut result = SyncResult::empty();
		self.collect(outcomes, &mut result);
		Ok(result)
	}

	/// Push one note and report the outcome instead of failing
	pub async fn push_one(&self, path: String, force: bool) -> ItemOutcome {
		match self.push_note(&path, force).await {
			Ok(true) => {
				self.callbacks.on_event(SyncEvent::ItemSynced { path, pushed: true });
				ItemOutcome::Pushed
			}
			Ok(false) => ItemOutcome::Skipped,
			Err(e) => self.report_failure(&path, e),
		}
	}

	/// Create or update the page for a note.
	///
	/// Returns false if the note's content matches the last pushed content,
	/// unless `force` is set.
	async fn push_note(&self, path: &str, force: bool) -> Result<bool, SyncError> {
		let read_mtime = self.vault.stat(path).await?.map(|entry| entry.modified);
		let content = self.vault.read(path).await?;
		let checksum = content_checksum(&content);
		if !force && self.state.cached_checksum(path).as_deref() == Some(checksum.as_str()) {
			debug!("Unchanged since last push: {}", path);
			return Ok(false);
		}

		let preview = self.settings.page_input(path, &content)?;
		let input = &preview.input;
		let policy = &self.settings.config.retry;

		let existing = retry(policy, || self.wiki.get_page(&preview.wiki_path)).await?;
		let response = match existing {
			Some(page) => {
				debug!("Updating page {} (id {}) from {}", page.path, page.id, path);
				retry(policy, || self.wiki.update_page(page.id, input)).await?
			}
			None => {
				debug!("Creating page {} from {}", preview.wiki_path, path);
				retry(policy, || self.wiki.create_page(input)).await?
			}
		};
		let page = response.into_result()?;

		let mut synced_at = sync_time(page.map(|p| p.updated_at));
		let current_mtime = self.vault.stat(path).await.ok().flatten().map(|entry| entry.modified);
		if current_mtime != read_mtime {
			// Edited while the push was in flight; the edit stays a local change
			warn!("{} changed during push, it will be pushed again", path);
			if let Some(read_mtime) = read_mtime {
				synced_at = synced_at.min(read_mtime);
			}
		}
		self.state.mark_synced(path, synced_at);
		self.state.store_checksum(path, checksum);
		Ok(true)
	}
}

// vim: ts=4
