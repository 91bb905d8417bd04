//! Sync engine
//!
//! `SyncEngine` runs full passes in one of three directions, tracks when each
//! path was last synced, and turns watched file modifications into debounced
//! single-note pushes serialized through a `TaskQueue`.

mod bidirectional;
mod pull;
mod push;
mod state;
mod watch;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::batch::BatchOptions;
use crate::callbacks::{SyncEvent, SyncProgressCallback};
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::exclusion::{normalize_path, ExclusionRules};
use crate::logging::*;
use crate::metadata::{DefaultMetadataConverter, Frontmatter, MetadataConverter};
use crate::path_mapper::{DefaultPathMapper, PathMapper};
use crate::queue::TaskQueue;
use crate::strategies::SyncDirection;
use crate::types::{FileEvent, SyncResult};
use crate::vault::Vault;
use crate::wiki::{WikiClient, WikiPageInput};

use state::SyncState;

/// Configuration snapshot a pass runs against
pub(crate) struct EngineSettings {
	pub config: SyncConfig,
	pub exclusion: ExclusionRules,
	pub mapper: Arc<dyn PathMapper>,
	pub converter: Arc<dyn MetadataConverter>,
}

impl EngineSettings {
	fn build(
		config: SyncConfig,
		mapper: Option<&Arc<dyn PathMapper>>,
		converter: Option<&Arc<dyn MetadataConverter>>,
	) -> Result<Self, SyncError> {
		config.validate()?;
		let exclusion = ExclusionRules::from_config(&config)?;
		let mapper = match mapper {
			Some(mapper) => mapper.clone(),
			None => Arc::new(DefaultPathMapper::new(&config.path_mappings)) as Arc<dyn PathMapper>,
		};
		let converter = match converter {
			Some(converter) => converter.clone(),
			None => Arc::new(DefaultMetadataConverter::new(&config.metadata_mappings))
				as Arc<dyn MetadataConverter>,
		};
		Ok(EngineSettings { config, exclusion, mapper, converter })
	}

	pub fn batch_options(&self) -> BatchOptions {
		BatchOptions {
			batch_size: self.config.batch_size,
			concurrency: self.config.concurrency,
			delay: self.config.batch_delay(),
		}
	}

	/// Build the page a push of `path` would send
	pub fn page_input(&self, path: &str, content: &str) -> Result<PagePreview, SyncError> {
		let metadata_error = |e: crate::metadata::MetadataError| SyncError::Metadata {
			path: path.to_string(),
			message: e.to_string(),
		};

		let doc = self.converter.extract_frontmatter(content).map_err(metadata_error)?;
		let meta = self.converter.to_wiki(&doc.frontmatter).map_err(metadata_error)?;
		let wiki_path = self.mapper.to_wiki(path);

		let input = WikiPageInput {
			path: wiki_path.clone(),
			title: meta.title.unwrap_or_else(|| note_title(path)),
			content: doc.body,
			description: meta.description.unwrap_or_default(),
			tags: meta.tags,
			is_published: meta.is_published.unwrap_or(self.config.publish_by_default),
			is_private: meta.is_private.unwrap_or(self.config.private_by_default),
			locale: self.config.locale.clone(),
			editor: self.config.editor.clone(),
		};
		Ok(PagePreview { wiki_path, input, custom_data: meta.custom_data })
	}
}

/// File name of a note without folder and extension
fn note_title(path: &str) -> String {
	let name = path.rsplit('/').next().unwrap_or(path);
	Path::new(name).file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_else(|| name.to_string())
}

/// What a push of one note would send to the wiki
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePreview {
	pub wiki_path: String,
	pub input: WikiPageInput,

	/// Frontmatter fields with no page property of their own
	pub custom_data: Frontmatter,
}

struct EngineInner {
	wiki: Arc<dyn WikiClient>,
	vault: Arc<dyn Vault>,
	settings: RwLock<Arc<EngineSettings>>,
	custom_mapper: Option<Arc<dyn PathMapper>>,
	custom_converter: Option<Arc<dyn MetadataConverter>>,
	callbacks: Arc<dyn SyncProgressCallback>,
	state: SyncState,
	queue: TaskQueue,
}

/// Everything one pass works with, borrowed from the engine
pub(crate) struct PassContext<'a> {
	pub wiki: &'a dyn WikiClient,
	pub vault: &'a dyn Vault,
	pub settings: &'a EngineSettings,
	pub state: &'a SyncState,
	pub callbacks: &'a dyn SyncProgressCallback,
}

/// What happened to one item during a pass
#[derive(Debug)]
pub(crate) enum ItemOutcome {
	Pushed,
	Pulled,
	Skipped,
	Conflict(crate::conflict::ConflictItem),
	Failed { path: String, error: SyncError },
}

impl PassContext<'_> {
	/// Fold item outcomes into a result, in item order
	pub fn collect(&self, outcomes: Vec<ItemOutcome>, result: &mut SyncResult) {
		for outcome in outcomes {
			match outcome {
				ItemOutcome::Pushed | ItemOutcome::Pulled => result.record_success(),
				ItemOutcome::Skipped => {}
				ItemOutcome::Conflict(conflict) => result.conflicts.push(conflict),
				ItemOutcome::Failed { path, error } => result.record_failure(&path, error),
			}
		}
	}

	pub fn report_failure(&self, path: &str, error: SyncError) -> ItemOutcome {
		warn!("Failed to sync {}: {}", path, error);
		self.callbacks.on_event(SyncEvent::ItemFailed { path: path.to_string(), error: error.to_string() });
		ItemOutcome::Failed { path: path.to_string(), error }
	}
}

/// Bidirectional sync engine between a vault and a wiki
#[derive(Clone)]
pub struct SyncEngine {
	inner: Arc<EngineInner>,
}

impl SyncEngine {
	pub(crate) fn from_parts(
		wiki: Arc<dyn WikiClient>,
		vault: Arc<dyn Vault>,
		config: SyncConfig,
		custom_mapper: Option<Arc<dyn PathMapper>>,
		custom_converter: Option<Arc<dyn MetadataConverter>>,
		callbacks: Arc<dyn SyncProgressCallback>,
	) -> Result<Self, SyncError> {
		let state = SyncState::new(config.checksum_ttl());
		let settings = EngineSettings::build(config, custom_mapper.as_ref(), custom_converter.as_ref())?;
		Ok(SyncEngine {
			inner: Arc::new(EngineInner {
				wiki,
				vault,
				settings: RwLock::new(Arc::new(settings)),
				custom_mapper,
				custom_converter,
				callbacks,
				state,
				queue: TaskQueue::new(),
			}),
		})
	}

	/// Engine with the default mapper and converter and no callbacks
	pub fn new(wiki: Arc<dyn WikiClient>, vault: Arc<dyn Vault>, config: SyncConfig) -> Result<Self, SyncError> {
		Self::from_parts(wiki, vault, config, None, None, Arc::new(crate::callbacks::NoCallbacks))
	}

	fn settings(&self) -> Arc<EngineSettings> {
		self.inner.settings.read().unwrap_or_else(|e| e.into_inner()).clone()
	}

	fn context<'a>(&'a self, settings: &'a EngineSettings) -> PassContext<'a> {
		PassContext {
			wiki: self.inner.wiki.as_ref(),
			vault: self.inner.vault.as_ref(),
			settings,
			state: &self.inner.state,
			callbacks: self.inner.callbacks.as_ref(),
		}
	}

	/// Current configuration
	pub fn config(&self) -> SyncConfig {
		self.settings().config.clone()
	}

	/// True while a full pass runs
	pub fn is_syncing(&self) -> bool {
		self.inner.state.is_syncing()
	}

	/// Run one full pass in the configured direction.
	///
	/// Returns a failure without doing anything if another pass is running
	/// or the wiki does not answer the connectivity check.
	pub async fn sync(&self) -> SyncResult {
		let Some(_guard) = self.inner.state.try_begin() else {
			warn!("Sync requested while another pass is running");
			return SyncResult::failure(SyncError::AlreadyInProgress.to_string());
		};

		let settings = self.settings();
		let mut result = match self.run_pass(&settings).await {
			Ok(result) => result,
			Err(e) => {
				error!("Sync failed: {}", e);
				SyncResult::failure(e.to_string())
			}
		};
		if result.success {
			result.message = result.summary();
			info!("{}", result.message);
		}

		self.inner.callbacks.on_event(SyncEvent::PassFinished { result: result.clone() });
		result
	}

	async fn run_pass(&self, settings: &EngineSettings) -> Result<SyncResult, SyncError> {
		self.check_connection().await?;

		let direction = settings.config.sync_direction;
		self.inner.callbacks.on_event(SyncEvent::PassStarted { direction });
		info!("Starting {} sync", direction);

		let ctx = self.context(settings);
		match direction {
			SyncDirection::LocalToRemote => ctx.push_all().await,
			SyncDirection::RemoteToLocal => ctx.pull_all().await,
			SyncDirection::Bidirectional => ctx.sync_both().await,
		}
	}

	async fn check_connection(&self) -> Result<(), SyncError> {
		match self.inner.wiki.test_connection().await {
			Ok(true) => Ok(()),
			Ok(false) => Err(SyncError::ConnectionFailed { message: "wiki did not respond".to_string() }),
			Err(e) => Err(SyncError::ConnectionFailed { message: e.to_string() }),
		}
	}

	/// Push a single note, skipping it if its content was already pushed
	pub async fn sync_file(&self, path: &str) -> SyncResult {
		let path = normalize_path(path);
		let settings = self.settings();
		if !settings.exclusion.is_syncable(&path) {
			debug!("Not syncing excluded path {}", path);
			return SyncResult::failure(SyncError::Excluded { path }.to_string());
		}

		let ctx = self.context(&settings);
		let mut result = SyncResult::empty();
		let outcome = ctx.push_one(path, false).await;
		ctx.collect(vec![outcome], &mut result);
		result.message = result.summary();

		self.inner.callbacks.on_event(SyncEvent::PassFinished { result: result.clone() });
		result
	}

	/// Swap in a new configuration; the next pass uses it
	pub fn update_settings(&self, config: SyncConfig) -> Result<(), SyncError> {
		let ttl = config.checksum_ttl();
		let settings = EngineSettings::build(
			config,
			self.inner.custom_mapper.as_ref(),
			self.inner.custom_converter.as_ref(),
		)?;
		self.inner.state.set_checksum_ttl(ttl);
		*self.inner.settings.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(settings);
		info!("Sync settings updated");
		Ok(())
	}

	/// Show what a push of `path` would send, without contacting the wiki
	pub async fn preview_page(&self, path: &str) -> Result<PagePreview, SyncError> {
		let path = normalize_path(path);
		let settings = self.settings();
		if !settings.exclusion.is_syncable(&path) {
			return Err(SyncError::Excluded { path });
		}
		let content = self.inner.vault.read(&path).await?;
		settings.page_input(&path, &content)
	}

	/// Watch local modifications arriving on `events`.
	///
	/// Each modified note is pushed once its path has been quiet for the
	/// configured debounce period. The task ends when the sender is dropped
	/// and pending pushes have been queued.
	pub fn start_watching(&self, events: mpsc::Receiver<FileEvent>) -> JoinHandle<()> {
		let engine = self.clone();
		tokio::spawn(async move { watch::watch_loop(engine, events).await })
	}

	/// Queue a single-note push unless a full pass is running
	pub(crate) fn enqueue_push(&self, path: String) {
		if self.is_syncing() {
			debug!("Full sync in progress, not queueing {}", path);
			return;
		}
		let engine = self.clone();
		let _ = self.inner.queue.add(move || async move {
			if engine.is_syncing() {
				debug!("Full sync in progress, dropping queued push of {}", path);
				return Ok(());
			}
			let result = engine.sync_file(&path).await;
			if result.failed > 0 {
				return Err(SyncError::Other { message: result.errors.join("; ") });
			}
			debug!("{}", result.message);
			Ok(())
		});
	}

	/// Wait until all queued single-note pushes have run
	pub async fn wait_idle(&self) {
		self.inner.queue.wait_idle().await;
	}

	/// Run `sync()` periodically if auto-sync is enabled.
	///
	/// The timer stops once auto-sync is switched off through
	/// `update_settings`.
	pub fn start_auto_sync(&self) -> Option<JoinHandle<()>> {
		let period = self.settings().config.sync_interval()?;
		let engine = self.clone();
		info!("Auto-sync every {:?}", period);

		Some(tokio::spawn(async move {
			let mut ticker = tokio::time::interval(period);
			ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
			ticker.tick().await;
			loop {
				ticker.tick().await;
				if engine.settings().config.sync_interval().is_none() {
					info!("Auto-sync disabled");
					break;
				}
				let result = engine.sync().await;
				debug!("Auto-sync: {}", result.message);
			}
		}))
	}

	/// Time of the last successful sync of a vault path, if any
	pub fn last_synced(&self, path: &str) -> Option<DateTime<Utc>> {
		let at = self.inner.state.last_synced(&normalize_path(path));
		(at != DateTime::<Utc>::UNIX_EPOCH).then_some(at)
	}
}

/// Later of now and a remote timestamp, so the next pass does not mistake
/// our own write for a change
pub(crate) fn sync_time(remote: Option<DateTime<Utc>>) -> DateTime<Utc> {
	let now = Utc::now();
	remote.map_or(now, |remote| remote.max(now))
}


// vim: ts=4
