//! Two-way pass with conflict detection

use std::collections::HashMap;

use crate::batch::batch_process;
use crate::callbacks::SyncEvent;
use crate::conflict::{conflict_kind, ChangeState, ConflictAction, ConflictItem, ConflictResolver};
use crate::error::SyncError;
use crate::exclusion::normalize_path;
use crate::logging::*;
use crate::strategies::ConflictKind;
use crate::types::SyncResult;
use crate::vault::VaultEntry;
use crate::wiki::WikiPage;

use super::{ItemOutcome, PassContext};

impl PassContext<'_> {
	/// Push or pull each note depending on which side changed since its last
	/// sync, then pull pages that have no note yet
	pub async fn sync_both(&self) -> Result<SyncResult, SyncError> {
		let mut remote: HashMap<String, WikiPage> =
			self.list_remote().await?.into_iter().map(|page| (normalize_path(&page.path), page)).collect();

		let notes: Vec<(VaultEntry, Option<WikiPage>)> = self
			.vault
			.list_notes()
			.await?
			.into_iter()
			.filter(|entry| self.settings.exclusion.is_syncable(&entry.path))
			.map(|entry| {
				let wiki_path = normalize_path(&self.settings.mapper.to_wiki(&entry.path));
				let page = remote.remove(&wiki_path);
				(entry, page)
			})
			.collect();

		let resolver = ConflictResolver::new(self.settings.config.conflict_resolution);
		let outcomes = batch_process(
			notes,
			|(entry, page)| self.sync_note(entry, page, resolver),
			&self.settings.batch_options(),
			|processed, total| self.callbacks.on_event(SyncEvent::Progress { processed, total }),
		)
		.await;

		let mut result = SyncResult::empty();
		self.collect(outcomes, &mut result);

		// Pages nobody has a note for yet
		let mut remote_only: Vec<WikiPage> = remote.into_values().collect();
		remote_only.sort_by(|a, b| a.path.cmp(&b.path));
		for page in remote_only {
			let local = self.settings.mapper.to_local(&page.path);
			if !self.settings.exclusion.is_syncable(&local) {
				debug!("Skipping excluded page {} ({})", page.path, local);
				continue;
			}
			if self.vault.stat(&local).await.ok().flatten().is_some() {
				// The note exists but maps elsewhere; pulling would clobber it
				debug!("Skipping page {}: {} maps to another page", page.path, local);
				continue;
			}
			let outcome = self.pull_one(&local, &page).await;
			self.collect(vec![outcome], &mut result);
		}

		Ok(result)
	}

	async fn sync_note(&self, entry: VaultEntry, page: Option<WikiPage>, resolver: ConflictResolver) -> ItemOutcome {
		let Some(page) = page else {
			// Local-only note
			return self.push_one(entry.path, false).await;
		};

		let last_sync = self.state.last_synced(&entry.path);
		match ChangeState::detect(entry.modified, page.updated_at, last_sync) {
			ChangeState::Unchanged => ItemOutcome::Skipped,
			ChangeState::LocalChanged => self.push_one(entry.path, false).await,
			ChangeState::RemoteChanged => self.pull_one(&entry.path, &page).await,
			ChangeState::BothChanged => {
				let kind = match self.classify(&entry.path, &page).await {
					Ok(kind) => kind,
					Err(e) => return self.report_failure(&entry.path, e),
				};
				let mut conflict = ConflictItem::new(&entry.path, entry.modified, page.updated_at, kind);
				let action = resolver.resolve(&mut conflict);
				info!(
					"Conflict on {} ({}): {}",
					entry.path,
					kind,
					ConflictResolver::strategy_description(resolver.strategy())
				);
				self.callbacks.on_event(SyncEvent::ConflictDetected { conflict: conflict.clone() });

				match action {
					ConflictAction::PushLocal => self.push_one(entry.path, true).await,
					ConflictAction::PullRemote => self.pull_one(&entry.path, &page).await,
					ConflictAction::Defer => ItemOutcome::Conflict(conflict),
				}
			}
		}
	}

	/// Work out whether the body, the metadata or both differ
	async fn classify(&self, path: &str, page: &WikiPage) -> Result<ConflictKind, SyncError> {
		let content = self.vault.read(path).await?;
		let local = self.settings.page_input(path, &content)?.input;

		let content_differs = local.content.trim() != page.content.trim();
		let metadata_differs = local.title != page.title
			|| local.tags != page.tags
			|| local.description != page.description.clone().unwrap_or_default();
		Ok(conflict_kind(content_differs, metadata_differs))
	}
}

// vim: ts=4
