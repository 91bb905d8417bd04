//! Remote wiki contract
//!
//! The engine talks to the wiki only through the `WikiClient` trait. The
//! GraphQL transport lives outside this crate; `MemoryWiki` is a complete
//! in-process implementation used for dry runs and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::error::RemoteError;

/// Result type for remote operations
pub type RemoteResult<T> = Result<T, RemoteError>;

/// A page as stored on the wiki
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WikiPage {
	pub id: u64,
	pub path: String,
	pub title: String,
	pub content: String,
	pub description: Option<String>,
	pub tags: Vec<String>,
	pub updated_at: DateTime<Utc>,
	pub is_published: bool,
	pub is_private: bool,
	pub locale: String,
}

/// Payload for creating or updating a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WikiPageInput {
	pub path: String,
	pub title: String,
	pub content: String,
	pub description: String,
	pub tags: Vec<String>,
	pub is_published: bool,
	pub is_private: bool,
	pub locale: String,
	pub editor: String,
}

/// Outcome reported by the wiki for a write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
	pub succeeded: bool,
	pub message: Option<String>,
	pub page: Option<WikiPage>,
}

impl PageResponse {
	pub fn ok(page: WikiPage) -> Self {
		PageResponse { succeeded: true, message: None, page: Some(page) }
	}

	pub fn failed(message: impl Into<String>) -> Self {
		PageResponse { succeeded: false, message: Some(message.into()), page: None }
	}

	/// Turn a refused write into an error
	pub fn into_result(self) -> RemoteResult<Option<WikiPage>> {
		if self.succeeded {
			Ok(self.page)
		} else {
			Err(RemoteError::Rejected {
				message: self.message.unwrap_or_else(|| "no reason given".to_string()),
			})
		}
	}
}

/// CRUD operations the engine needs from the wiki
///
/// Pages are never deleted through this interface.
#[async_trait]
pub trait WikiClient: Send + Sync {
	/// Lightweight connectivity check
	async fn test_connection(&self) -> RemoteResult<bool>;

	/// Fetch a single page by path
	async fn get_page(&self, path: &str) -> RemoteResult<Option<WikiPage>>;

	/// List pages, `limit` at a time starting at `offset`
	async fn list_pages(&self, limit: usize, offset: usize) -> RemoteResult<Vec<WikiPage>>;

	async fn create_page(&self, input: &WikiPageInput) -> RemoteResult<PageResponse>;

	async fn update_page(&self, id: u64, input: &WikiPageInput) -> RemoteResult<PageResponse>;
}

// ============================================================================
// IN-MEMORY WIKI
// ============================================================================

/// A recorded call against `MemoryWiki`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WikiCall {
	TestConnection,
	Get(String),
	List { limit: usize, offset: usize },
	Create(String),
	Update(u64),
}

#[derive(Default)]
struct MemoryState {
	pages: BTreeMap<String, WikiPage>,
	next_id: u64,
	calls: Vec<WikiCall>,
	failing_paths: HashSet<String>,
}

/// Wiki kept entirely in memory
pub struct MemoryWiki {
	state: Mutex<MemoryState>,
	online: AtomicBool,
}

impl MemoryWiki {
	pub fn new() -> Self {
		MemoryWiki {
			state: Mutex::new(MemoryState { next_id: 1, ..Default::default() }),
			online: AtomicBool::new(true),
		}
	}

	/// Simulate the wiki going away or coming back
	pub fn set_online(&self, online: bool) {
		self.online.store(online, Ordering::SeqCst);
	}

	/// Make every call touching `path` fail with a network error
	pub fn fail_path(&self, path: &str) {
		self.lock().failing_paths.insert(normalize(path));
	}

	/// Insert or replace a page directly, assigning an id if it has none
	pub fn insert_page(&self, mut page: WikiPage) -> WikiPage {
		let mut state = self.lock();
		page.path = normalize(&page.path);
		if page.id == 0 {
			page.id = state.next_id;
			state.next_id += 1;
		} else {
			state.next_id = state.next_id.max(page.id + 1);
		}
		state.pages.insert(page.path.clone(), page.clone());
		page
	}

	/// Set the last-updated time of an existing page
	pub fn touch(&self, path: &str, updated_at: DateTime<Utc>) {
		if let Some(page) = self.lock().pages.get_mut(&normalize(path)) {
			page.updated_at = updated_at;
		}
	}

	pub fn page(&self, path: &str) -> Option<WikiPage> {
		self.lock().pages.get(&normalize(path)).cloned()
	}

	pub fn pages(&self) -> Vec<WikiPage> {
		self.lock().pages.values().cloned().collect()
	}

	/// All calls received so far, in order
	pub fn calls(&self) -> Vec<WikiCall> {
		self.lock().calls.clone()
	}

	/// Number of create and update calls received
	pub fn write_count(&self) -> usize {
		self.lock()
			.calls
			.iter()
			.filter(|c| matches!(c, WikiCall::Create(_) | WikiCall::Update(_)))
			.count()
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
		self.state.lock().unwrap_or_else(|e| e.into_inner())
	}

	fn check_online(&self) -> RemoteResult<()> {
		if self.online.load(Ordering::SeqCst) {
			Ok(())
		} else {
			Err(RemoteError::Network { message: "connection refused".to_string() })
		}
	}

	fn check_path(state: &MemoryState, path: &str) -> RemoteResult<()> {
		if state.failing_paths.contains(path) {
			Err(RemoteError::Network { message: format!("request for {} timed out", path) })
		} else {
			Ok(())
		}
	}
}

impl Default for MemoryWiki {
	fn default() -> Self {
		Self::new()
	}
}

fn normalize(path: &str) -> String {
	path.trim_matches('/').to_string()
}

fn page_from_input(id: u64, input: &WikiPageInput) -> WikiPage {
	WikiPage {
		id,
		path: normalize(&input.path),
		title: input.title.clone(),
		content: input.content.clone(),
		description: if input.description.is_empty() { None } else { Some(input.description.clone()) },
		tags: input.tags.clone(),
		updated_at: Utc::now(),
		is_published: input.is_published,
		is_private: input.is_private,
		locale: input.locale.clone(),
	}
}

#[async_trait]
impl WikiClient for MemoryWiki {
	async fn test_connection(&self) -> RemoteResult<bool> {
		self.lock().calls.push(WikiCall::TestConnection);
		Ok(self.online.load(Ordering::SeqCst))
	}

	async fn get_page(&self, path: &str) -> RemoteResult<Option<WikiPage>> {
		let path = normalize(path);
		let mut state = self.lock();
		state.calls.push(WikiCall::Get(path.clone()));
		self.check_online()?;
		Self::check_path(&state, &path)?;
		Ok(state.pages.get(&path).cloned())
	}

	async fn list_pages(&self, limit: usize, offset: usize) -> RemoteResult<Vec<WikiPage>> {
		let mut state = self.lock();
		state.calls.push(WikiCall::List { limit, offset });
		self.check_online()?;
		Ok(state.pages.values().skip(offset).take(limit).cloned().collect())
	}

	async fn create_page(&self, input: &WikiPageInput) -> RemoteResult<PageResponse> {
		let path = normalize(&input.path);
		let mut state = self.lock();
		state.calls.push(WikiCall::Create(path.clone()));
		self.check_online()?;
		Self::check_path(&state, &path)?;

		if state.pages.contains_key(&path) {
			return Ok(PageResponse::failed(format!("A page already exists at {}", path)));
		}

		let id = state.next_id;
		state.next_id += 1;
		let page = page_from_input(id, input);
		state.pages.insert(path, page.clone());
		Ok(PageResponse::ok(page))
	}

	async fn update_page(&self, id: u64, input: &WikiPageInput) -> RemoteResult<PageResponse> {
		let path = normalize(&input.path);
		let mut state = self.lock();
		state.calls.push(WikiCall::Update(id));
		self.check_online()?;
		Self::check_path(&state, &path)?;

		let old_path = match state.pages.values().find(|p| p.id == id) {
			Some(page) => page.path.clone(),
			None => return Err(RemoteError::NotFound { id }),
		};
		state.pages.remove(&old_path);
		let page = page_from_input(id, input);
		state.pages.insert(path, page.clone());
		Ok(PageResponse::ok(page))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn input(path: &str, title: &str) -> WikiPageInput {
		WikiPageInput {
			path: path.to_string(),
			title: title.to_string(),
			content: "body".to_string(),
			description: String::new(),
			tags: vec![],
			is_published: true,
			is_private: false,
			locale: "en".to_string(),
			editor: "markdown".to_string(),
		}
	}

	#[tokio::test]
	async fn test_create_then_get() {
		let wiki = MemoryWiki::new();
		let created = wiki.create_page(&input("/docs/a", "A")).await.unwrap();
		assert!(created.succeeded);

		let page = wiki.get_page("docs/a").await.unwrap().unwrap();
		assert_eq!(page.title, "A");
		assert_eq!(page.description, None);
	}

	#[tokio::test]
	async fn test_duplicate_create_is_rejected() {
		let wiki = MemoryWiki::new();
		wiki.create_page(&input("a", "A")).await.unwrap();
		let second = wiki.create_page(&input("a", "A")).await.unwrap();
		assert!(!second.succeeded);
		assert!(second.into_result().is_err());
	}

	#[tokio::test]
	async fn test_update_unknown_id() {
		let wiki = MemoryWiki::new();
		let result = wiki.update_page(99, &input("a", "A")).await;
		assert_eq!(result.unwrap_err(), RemoteError::NotFound { id: 99 });
	}

	#[tokio::test]
	async fn test_list_pages_paginates() {
		let wiki = MemoryWiki::new();
		for i in 0..5 {
			wiki.create_page(&input(&format!("p{}", i), "T")).await.unwrap();
		}
		assert_eq!(wiki.list_pages(2, 0).await.unwrap().len(), 2);
		assert_eq!(wiki.list_pages(2, 4).await.unwrap().len(), 1);
		assert!(wiki.list_pages(2, 6).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_offline_wiki() {
		let wiki = MemoryWiki::new();
		wiki.set_online(false);
		assert!(!wiki.test_connection().await.unwrap());
		assert!(wiki.get_page("a").await.is_err());
	}
}

// vim: ts=4
