//! Builder for the sync engine

use std::sync::Arc;

use crate::callbacks::{NoCallbacks, SyncProgressCallback};
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::metadata::MetadataConverter;
use crate::path_mapper::PathMapper;
use crate::sync_impl::SyncEngine;
use crate::vault::Vault;
use crate::wiki::WikiClient;

/// Assembles a `SyncEngine` from its collaborators
///
/// A wiki client and a vault are required. The path mapper and metadata
/// converter default to the built-in ones configured from `SyncConfig`; a
/// custom one set here survives `update_settings`.
pub struct SyncBuilder {
	wiki: Option<Arc<dyn WikiClient>>,
	vault: Option<Arc<dyn Vault>>,
	config: SyncConfig,
	mapper: Option<Arc<dyn PathMapper>>,
	converter: Option<Arc<dyn MetadataConverter>>,
	callbacks: Option<Arc<dyn SyncProgressCallback>>,
}

impl SyncBuilder {
	pub fn new() -> Self {
		SyncBuilder {
			wiki: None,
			vault: None,
			config: SyncConfig::default(),
			mapper: None,
			converter: None,
			callbacks: None,
		}
	}

	pub fn wiki(mut self, wiki: Arc<dyn WikiClient>) -> Self {
		self.wiki = Some(wiki);
		self
	}

	pub fn vault(mut self, vault: Arc<dyn Vault>) -> Self {
		self.vault = Some(vault);
		self
	}

	pub fn config(mut self, config: SyncConfig) -> Self {
		self.config = config;
		self
	}

	pub fn path_mapper(mut self, mapper: Arc<dyn PathMapper>) -> Self {
		self.mapper = Some(mapper);
		self
	}

	pub fn metadata_converter(mut self, converter: Arc<dyn MetadataConverter>) -> Self {
		self.converter = Some(converter);
		self
	}

	/// Receive progress and status events
	pub fn callbacks(mut self, callbacks: Arc<dyn SyncProgressCallback>) -> Self {
		self.callbacks = Some(callbacks);
		self
	}

	pub fn build(self) -> Result<SyncEngine, SyncError> {
		let wiki = self
			.wiki
			.ok_or_else(|| SyncError::InvalidConfig { message: "No wiki client configured".to_string() })?;
		let vault =
			self.vault.ok_or_else(|| SyncError::InvalidConfig { message: "No vault configured".to_string() })?;

		SyncEngine::from_parts(
			wiki,
			vault,
			self.config,
			self.mapper,
			self.converter,
			self.callbacks.unwrap_or_else(|| Arc::new(NoCallbacks)),
		)
	}
}

impl Default for SyncBuilder {
	fn default() -> Self {
		Self::new()
	}
}


// vim: ts=4
