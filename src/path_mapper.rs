//! Path translation between vault notes and wiki pages
//!
//! Vault paths look like `notes/a.md`, wiki paths like `notes/a`. Mapping
//! rules rewrite a leading folder on one side into a leading folder on the
//! other; the longest matching rule wins.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::config::PathMapping;
use crate::exclusion::normalize_path;

/// Bidirectional, deterministic path translation
pub trait PathMapper: Send + Sync {
	/// Vault path to wiki path
	fn to_wiki(&self, local_path: &str) -> String;

	/// Wiki path to vault path
	fn to_local(&self, wiki_path: &str) -> String;
}

#[derive(Debug, Clone)]
struct Rule {
	local: String,
	wiki: String,
}

/// Prefix-rule mapper with a memo cache per direction
#[derive(Debug, Default)]
pub struct DefaultPathMapper {
	rules: Vec<Rule>,
	to_wiki_cache: Mutex<HashMap<String, String>>,
	to_local_cache: Mutex<HashMap<String, String>>,
}

impl DefaultPathMapper {
	/// Build a mapper from the enabled mappings
	pub fn new(mappings: &[PathMapping]) -> Self {
		let rules = mappings
			.iter()
			.filter(|m| m.enabled)
			.map(|m| Rule { local: normalize_path(&m.obsidian_path), wiki: normalize_path(&m.wiki_path) })
			.collect();
		DefaultPathMapper { rules, ..Default::default() }
	}

	/// Drop memoized translations
	pub fn clear_cache(&self) {
		self.to_wiki_cache.lock().unwrap_or_else(|e| e.into_inner()).clear();
		self.to_local_cache.lock().unwrap_or_else(|e| e.into_inner()).clear();
	}

	fn map_wiki(&self, local_path: &str) -> String {
		let path = normalize_path(local_path);
		let stem = strip_md(&path);
		let best = self
			.rules
			.iter()
			.filter_map(|r| strip_folder(stem, &r.local).map(|rest| (r, rest)))
			.max_by_key(|(r, _)| r.local.len());

		match best {
			Some((rule, rest)) => join(&rule.wiki, rest),
			None => stem.to_string(),
		}
	}

	fn map_local(&self, wiki_path: &str) -> String {
		let path = normalize_path(wiki_path);
		let best = self
			.rules
			.iter()
			.filter_map(|r| strip_folder(&path, &r.wiki).map(|rest| (r, rest)))
			.max_by_key(|(r, _)| r.wiki.len());

		let stem = match best {
			Some((rule, rest)) => join(&rule.local, rest),
			None => path,
		};
		format!("{}.md", stem)
	}
}

impl PathMapper for DefaultPathMapper {
	fn to_wiki(&self, local_path: &str) -> String {
		memoized(&self.to_wiki_cache, local_path, || self.map_wiki(local_path))
	}

	fn to_local(&self, wiki_path: &str) -> String {
		memoized(&self.to_local_cache, wiki_path, || self.map_local(wiki_path))
	}
}

fn memoized<F: FnOnce() -> String>(cache: &Mutex<HashMap<String, String>>, key: &str, compute: F) -> String {
	if let Some(hit) = cache.lock().unwrap_or_else(|e| e.into_inner()).get(key) {
		return hit.clone();
	}
	let value = compute();
	cache.lock().unwrap_or_else(|e| e.into_inner()).insert(key.to_string(), value.clone());
	value
}

fn strip_md(path: &str) -> &str {
	let cut = path.len().saturating_sub(3);
	match path.get(cut..) {
		Some(ext) if ext.eq_ignore_ascii_case(".md") => &path[..cut],
		_ => path,
	}
}

/// Remainder of `path` below `folder`, if `path` is `folder` or lies under it.
/// An empty folder matches everything.
fn strip_folder<'a>(path: &'a str, folder: &str) -> Option<&'a str> {
	if folder.is_empty() {
		return Some(path);
	}
	if path == folder {
		return Some("");
	}
	path.strip_prefix(folder).and_then(|rest| rest.strip_prefix('/'))
}

fn join(folder: &str, rest: &str) -> String {
	match (folder.is_empty(), rest.is_empty()) {
		(true, _) => rest.to_string(),
		(false, true) => folder.to_string(),
		(false, false) => format!("{}/{}", folder, rest),
	}
}


// vim: ts=4
