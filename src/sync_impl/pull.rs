//! Wiki to note direction

use crate::cache::content_checksum;
use crate::callbacks::SyncEvent;
use crate::error::SyncError;
use crate::logging::*;
use crate::retry::retry;
use crate::types::SyncResult;
use crate::vault::parent_dir;
use crate::wiki::WikiPage;

use super::{sync_time, ItemOutcome, PassContext};

impl PassContext<'_> {
	/// Fetch every page, `list_page_size` at a time
	pub async fn list_remote(&self) -> Result<Vec<WikiPage>, SyncError> {
		let limit = self.settings.config.list_page_size.max(1);
		let policy = &self.settings.config.retry;
		let mut pages = Vec::new();
		let mut offset = 0;

		loop {
			let batch = retry(policy, || self.wiki.list_pages(limit, offset)).await?;
			let received = batch.len();
			pages.extend(batch);
			if received < limit {
				break;
			}
			offset += received;
		}
		debug!("Listed {} wiki pages", pages.len());
		Ok(pages)
	}

	/// Pull every page whose note path is syncable, one after another
	pub async fn pull_all(&self) -> Result<SyncResult, SyncError> {
		let pages = self.list_remote().await?;
		let pages: Vec<(String, WikiPage)> = pages
			.into_iter()
			.filter_map(|page| {
				let local = self.settings.mapper.to_local(&page.path);
				if self.settings.exclusion.is_syncable(&local) {
					Some((local, page))
				} else {
					debug!("Skipping excluded page {} ({})", page.path, local);
					None
				}
			})
			.collect();

		let total = pages.len();
		let mut result = SyncResult::empty();
		for (idx, (local, page)) in pages.into_iter().enumerate() {
			let outcome = self.pull_one(&local, &page).await;
			self.collect(vec![outcome], &mut result);
			self.callbacks.on_event(SyncEvent::Progress { processed: idx + 1, total });
		}
		Ok(result)
	}

	/// Pull one page and report the outcome instead of failing
	pub async fn pull_one(&self, local: &str, page: &WikiPage) -> ItemOutcome {
		match self.pull_page(local, page).await {
			Ok(()) => {
				self.callbacks.on_event(SyncEvent::ItemSynced { path: local.to_string(), pushed: false });
				ItemOutcome::Pulled
			}
			Err(e) => self.report_failure(local, e),
		}
	}

	/// Write a page into the vault, merging into an existing note
	async fn pull_page(&self, local: &str, page: &WikiPage) -> Result<(), SyncError> {
		let existing = match self.vault.stat(local).await? {
			Some(_) => Some(self.vault.read(local).await?),
			None => None,
		};

		let content = self
			.settings
			.converter
			.pulled_content(existing.as_deref(), page)
			.map_err(|e| SyncError::Metadata { path: local.to_string(), message: e.to_string() })?;

		if existing.is_some() {
			debug!("Updating note {} from page {}", local, page.path);
			self.vault.write(local, &content).await?;
		} else {
			debug!("Creating note {} from page {}", local, page.path);
			if let Some(parent) = parent_dir(local) {
				self.vault.create_dir_all(parent).await?;
			}
			self.vault.create(local, &content).await?;
		}

		self.state.mark_synced(local, sync_time(Some(page.updated_at)));
		// The note now holds exactly what the wiki has; no need to push it back
		self.state.store_checksum(local, content_checksum(&content));
		Ok(())
	}
}

// vim: ts=4
