//! Local note store
//!
//! The engine reads and writes notes only through the `Vault` trait. Paths
//! are vault-relative with forward slashes. `FsVault` stores notes on disk
//! under a root directory, `MemoryVault` keeps them in memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use crate::error::SyncError;
use crate::exclusion::normalize_path;

/// A note in the vault and its last-modified time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultEntry {
	pub path: String,
	pub modified: DateTime<Utc>,
}

/// Operations the engine needs from the local store
#[async_trait]
pub trait Vault: Send + Sync {
	/// Every Markdown note in the vault
	async fn list_notes(&self) -> Result<Vec<VaultEntry>, SyncError>;

	/// Metadata of one note, `None` if it does not exist
	async fn stat(&self, path: &str) -> Result<Option<VaultEntry>, SyncError>;

	async fn read(&self, path: &str) -> Result<String, SyncError>;

	/// Overwrite an existing note
	async fn write(&self, path: &str, content: &str) -> Result<(), SyncError>;

	/// Create a note that does not exist yet
	async fn create(&self, path: &str, content: &str) -> Result<(), SyncError>;

	/// Create a folder and all of its parents
	async fn create_dir_all(&self, path: &str) -> Result<(), SyncError>;
}

/// Check if a vault path stays inside the vault
pub fn is_path_safe(path: &str) -> bool {
	!Path::new(path)
		.components()
		.any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
}

/// Parent folder of a vault path, if it has one
pub fn parent_dir(path: &str) -> Option<&str> {
	path.rsplit_once('/').map(|(parent, _)| parent).filter(|p| !p.is_empty())
}

fn unsafe_path(path: &str) -> SyncError {
	SyncError::Io(io::Error::new(
		io::ErrorKind::InvalidInput,
		format!("Path escapes the vault: {}", path),
	))
}

// ============================================================================
// FILESYSTEM VAULT
// ============================================================================

/// Vault stored on disk
#[derive(Debug, Clone)]
pub struct FsVault {
	root: PathBuf,
}

impl FsVault {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		FsVault { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	fn resolve(&self, path: &str) -> Result<PathBuf, SyncError> {
		let rel = normalize_path(path);
		if rel.is_empty() || !is_path_safe(&rel) {
			return Err(unsafe_path(path));
		}
		Ok(self.root.join(rel))
	}
}

fn modified_time(meta: &std::fs::Metadata) -> DateTime<Utc> {
	meta.modified().map(DateTime::<Utc>::from).unwrap_or_else(|_| DateTime::<Utc>::UNIX_EPOCH)
}

#[async_trait]
impl Vault for FsVault {
	async fn list_notes(&self) -> Result<Vec<VaultEntry>, SyncError> {
		let root = self.root.clone();
		let entries = tokio::task::spawn_blocking(move || {
			let mut entries = Vec::new();
			for result in ignore::WalkBuilder::new(&root).standard_filters(false).build() {
				let entry = match result {
					Ok(entry) => entry,
					Err(e) => {
						tracing::debug!("Skipping unreadable vault entry: {}", e);
						continue;
					}
				};
				if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
					continue;
				}
				let rel = match entry.path().strip_prefix(&root) {
					Ok(rel) => normalize_path(&rel.to_string_lossy()),
					Err(_) => continue,
				};
				if !rel.to_lowercase().ends_with(".md") {
					continue;
				}
				let modified = entry.metadata().map(|m| modified_time(&m)).unwrap_or_default();
				entries.push(VaultEntry { path: rel, modified });
			}
			entries.sort_by(|a, b| a.path.cmp(&b.path));
			entries
		})
		.await
		.map_err(|e| SyncError::Other { message: format!("Vault scan failed: {}", e) })?;

		Ok(entries)
	}

	async fn stat(&self, path: &str) -> Result<Option<VaultEntry>, SyncError> {
		let full = self.resolve(path)?;
		match tokio::fs::metadata(&full).await {
			Ok(meta) if meta.is_file() => {
				Ok(Some(VaultEntry { path: normalize_path(path), modified: modified_time(&meta) }))
			}
			Ok(_) => Ok(None),
			Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
			Err(e) => Err(e.into()),
		}
	}

	async fn read(&self, path: &str) -> Result<String, SyncError> {
		Ok(tokio::fs::read_to_string(self.resolve(path)?).await?)
	}

	async fn write(&self, path: &str, content: &str) -> Result<(), SyncError> {
		let full = self.resolve(path)?;
		if !tokio::fs::try_exists(&full).await? {
			return Err(io::Error::new(io::ErrorKind::NotFound, format!("No such note: {}", path)).into());
		}
		tokio::fs::write(&full, content).await?;
		Ok(())
	}

	async fn create(&self, path: &str, content: &str) -> Result<(), SyncError> {
		use tokio::io::AsyncWriteExt;

		let full = self.resolve(path)?;
		let mut file = tokio::fs::OpenOptions::new().write(true).create_new(true).open(&full).await?;
		file.write_all(content.as_bytes()).await?;
		file.flush().await?;
		Ok(())
	}

	async fn create_dir_all(&self, path: &str) -> Result<(), SyncError> {
		tokio::fs::create_dir_all(self.resolve(path)?).await?;
		Ok(())
	}
}

// ============================================================================
// IN-MEMORY VAULT
// ============================================================================

#[derive(Debug, Clone)]
struct MemoryNote {
	content: String,
	modified: DateTime<Utc>,
}

#[derive(Default)]
struct MemoryVaultState {
	notes: BTreeMap<String, MemoryNote>,
	dirs: BTreeSet<String>,
	failing_reads: BTreeSet<String>,
	writes: Vec<String>,
}

/// Vault kept entirely in memory
#[derive(Default)]
pub struct MemoryVault {
	state: Mutex<MemoryVaultState>,
}

impl MemoryVault {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add or replace a note with an explicit modification time
	pub fn insert(&self, path: &str, content: &str, modified: DateTime<Utc>) {
		let mut state = self.lock();
		state
			.notes
			.insert(normalize_path(path), MemoryNote { content: content.to_string(), modified });
	}

	/// Change the modification time of an existing note
	pub fn touch(&self, path: &str, modified: DateTime<Utc>) {
		if let Some(note) = self.lock().notes.get_mut(&normalize_path(path)) {
			note.modified = modified;
		}
	}

	/// Make reads of `path` fail
	pub fn fail_reads(&self, path: &str) {
		self.lock().failing_reads.insert(normalize_path(path));
	}

	pub fn content(&self, path: &str) -> Option<String> {
		self.lock().notes.get(&normalize_path(path)).map(|n| n.content.clone())
	}

	pub fn has_dir(&self, path: &str) -> bool {
		self.lock().dirs.contains(&normalize_path(path))
	}

	/// Paths written or created so far, in order
	pub fn writes(&self) -> Vec<String> {
		self.lock().writes.clone()
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, MemoryVaultState> {
		self.state.lock().unwrap_or_else(|e| e.into_inner())
	}
}

#[async_trait]
impl Vault for MemoryVault {
	async fn list_notes(&self) -> Result<Vec<VaultEntry>, SyncError> {
		Ok(self
			.lock()
			.notes
			.iter()
			.filter(|(path, _)| path.to_lowercase().ends_with(".md"))
			.map(|(path, note)| VaultEntry { path: path.clone(), modified: note.modified })
			.collect())
	}

	async fn stat(&self, path: &str) -> Result<Option<VaultEntry>, SyncError> {
		let path = normalize_path(path);
		Ok(self
			.lock()
			.notes
			.get(&path)
			.map(|note| VaultEntry { path: path.clone(), modified: note.modified }))
	}

	async fn read(&self, path: &str) -> Result<String, SyncError> {
		let path = normalize_path(path);
		let state = self.lock();
		if state.failing_reads.contains(&path) {
			return Err(io::Error::new(io::ErrorKind::PermissionDenied, format!("Cannot read {}", path)).into());
		}
		state
			.notes
			.get(&path)
			.map(|note| note.content.clone())
			.ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("No such note: {}", path)).into())
	}

	async fn write(&self, path: &str, content: &str) -> Result<(), SyncError> {
		let path = normalize_path(path);
		let mut state = self.lock();
		match state.notes.get_mut(&path) {
			Some(note) => {
				note.content = content.to_string();
				note.modified = Utc::now();
			}
			None => {
				return Err(io::Error::new(io::ErrorKind::NotFound, format!("No such note: {}", path)).into())
			}
		}
		state.writes.push(path);
		Ok(())
	}

	async fn create(&self, path: &str, content: &str) -> Result<(), SyncError> {
		let path = normalize_path(path);
		if !is_path_safe(&path) {
			return Err(unsafe_path(&path));
		}
		let mut state = self.lock();
		if state.notes.contains_key(&path) {
			return Err(io::Error::new(io::ErrorKind::AlreadyExists, format!("Note exists: {}", path)).into());
		}
		if let Some(parent) = parent_dir(&path) {
			if !state.dirs.contains(parent) {
				return Err(
					io::Error::new(io::ErrorKind::NotFound, format!("No such folder: {}", parent)).into()
				);
			}
		}
		state.notes.insert(path.clone(), MemoryNote { content: content.to_string(), modified: Utc::now() });
		state.writes.push(path);
		Ok(())
	}

	async fn create_dir_all(&self, path: &str) -> Result<(), SyncError> {
		let path = normalize_path(path);
		if !is_path_safe(&path) {
			return Err(unsafe_path(&path));
		}
		let mut state = self.lock();
		let mut current = String::new();
		for part in path.split('/').filter(|p| !p.is_empty()) {
			if !current.is_empty() {
				current.push('/');
			}
			current.push_str(part);
			state.dirs.insert(current.clone());
		}
		Ok(())
	}
}


// vim: ts=4
