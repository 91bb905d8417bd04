//! Default frontmatter ↔ page converter

use serde_json::{json, Value};

use super::{frontmatter, Document, Frontmatter, MetadataConverter, MetadataError, WikiMetadata};
use crate::config::MetadataMapping;
use crate::wiki::WikiPage;

/// Fields the engine records on pulled notes
pub const WIKI_ID_FIELD: &str = "wikiId";
pub const WIKI_PATH_FIELD: &str = "wikiPath";
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Fields mapped onto dedicated page properties or owned by the engine
const RESERVED: &[&str] = &[
	"title",
	"tags",
	"description",
	"published",
	"isPublished",
	"private",
	"isPrivate",
	WIKI_ID_FIELD,
	WIKI_PATH_FIELD,
	UPDATED_AT_FIELD,
];

/// Converter for the common Obsidian frontmatter fields plus user-defined
/// field renames
#[derive(Debug, Clone, Default)]
pub struct DefaultMetadataConverter {
	mappings: Vec<MetadataMapping>,
}

impl DefaultMetadataConverter {
	pub fn new(mappings: &[MetadataMapping]) -> Self {
		DefaultMetadataConverter { mappings: mappings.to_vec() }
	}

	fn wiki_field<'a>(&'a self, obsidian_field: &'a str) -> &'a str {
		self.mappings
			.iter()
			.find(|m| m.obsidian_field == obsidian_field)
			.map(|m| m.wiki_field.as_str())
			.unwrap_or(obsidian_field)
	}

	/// True for note fields that mirror a page property rather than
	/// belonging to the note alone
	fn is_page_field(&self, obsidian_field: &str) -> bool {
		RESERVED.contains(&self.wiki_field(obsidian_field))
	}

	fn obsidian_field<'a>(&'a self, wiki_field: &'a str) -> &'a str {
		self.mappings
			.iter()
			.find(|m| m.wiki_field == wiki_field)
			.map(|m| m.obsidian_field.as_str())
			.unwrap_or(wiki_field)
	}
}

fn string_field(view: &Frontmatter, field: &str) -> Result<Option<String>, MetadataError> {
	match view.get(field) {
		None | Some(Value::Null) => Ok(None),
		Some(Value::String(s)) => Ok(Some(s.clone())),
		Some(Value::Number(n)) => Ok(Some(n.to_string())),
		Some(Value::Bool(b)) => Ok(Some(b.to_string())),
		Some(_) => Err(MetadataError::InvalidField {
			field: field.to_string(),
			message: "expected a single value".to_string(),
		}),
	}
}

fn bool_field(view: &Frontmatter, fields: &[&str]) -> Result<Option<bool>, MetadataError> {
	for field in fields {
		match view.get(*field) {
			None | Some(Value::Null) => continue,
			Some(Value::Bool(b)) => return Ok(Some(*b)),
			Some(Value::String(s)) if s.eq_ignore_ascii_case("yes") => return Ok(Some(true)),
			Some(Value::String(s)) if s.eq_ignore_ascii_case("no") => return Ok(Some(false)),
			Some(_) => {
				return Err(MetadataError::InvalidField {
					field: field.to_string(),
					message: "expected true or false".to_string(),
				})
			}
		}
	}
	Ok(None)
}

fn normalize_tag(tag: &str) -> Option<String> {
	let tag = tag.trim().trim_start_matches('#').trim();
	(!tag.is_empty()).then(|| tag.to_string())
}

/// Tags from a list, or from a comma or space separated string
fn tags_field(view: &Frontmatter) -> Result<Vec<String>, MetadataError> {
	match view.get("tags") {
		None | Some(Value::Null) => Ok(Vec::new()),
		Some(Value::String(s)) => Ok(s.split([',', ' ']).filter_map(normalize_tag).collect()),
		Some(Value::Array(items)) => items
			.iter()
			.map(|item| match item {
				Value::String(s) => Ok(normalize_tag(s)),
				Value::Number(n) => Ok(Some(n.to_string())),
				_ => Err(MetadataError::InvalidField {
					field: "tags".to_string(),
					message: "tags must be plain values".to_string(),
				}),
			})
			.filter_map(Result::transpose)
			.collect(),
		Some(_) => Err(MetadataError::InvalidField {
			field: "tags".to_string(),
			message: "expected a list".to_string(),
		}),
	}
}

impl MetadataConverter for DefaultMetadataConverter {
	fn extract_frontmatter(&self, content: &str) -> Result<Document, MetadataError> {
		let (frontmatter, body) = frontmatter::split(content)?;
		Ok(Document { frontmatter, body: body.to_string() })
	}

	fn to_wiki(&self, fm: &Frontmatter) -> Result<WikiMetadata, MetadataError> {
		// View of the note's fields under their wiki names
		let view: Frontmatter =
			fm.iter().map(|(key, value)| (self.wiki_field(key).to_string(), value.clone())).collect();

		let custom_data = view
			.iter()
			.filter(|(key, _)| !RESERVED.contains(&key.as_str()))
			.map(|(key, value)| (key.clone(), value.clone()))
			.collect();

		Ok(WikiMetadata {
			title: string_field(&view, "title")?.filter(|t| !t.trim().is_empty()),
			tags: tags_field(&view)?,
			description: string_field(&view, "description")?,
			is_published: bool_field(&view, &["published", "isPublished"])?,
			is_private: bool_field(&view, &["private", "isPrivate"])?,
			custom_data,
		})
	}

	fn from_wiki(&self, page: &WikiPage) -> Frontmatter {
		let mut fields = vec![("title", json!(page.title))];
		if !page.tags.is_empty() {
			fields.push(("tags", json!(page.tags)));
		}
		if let Some(description) = page.description.as_deref().filter(|d| !d.is_empty()) {
			fields.push(("description", json!(description)));
		}
		fields.push(("published", json!(page.is_published)));
		fields.push(("private", json!(page.is_private)));
		fields.push((WIKI_ID_FIELD, json!(page.id)));
		fields.push((WIKI_PATH_FIELD, json!(format!("/{}", page.path.trim_start_matches('/')))));
		fields.push((UPDATED_AT_FIELD, json!(page.updated_at.to_rfc3339())));

		fields.into_iter().map(|(field, value)| (self.obsidian_field(field).to_string(), value)).collect()
	}

	fn merge_frontmatter(&self, existing: &str, incoming: &Frontmatter) -> Result<String, MetadataError> {
		let (mut merged, body) = frontmatter::split(existing)?;
		// Page fields the incoming side no longer carries were cleared on the wiki
		merged.retain(|key, _| incoming.contains_key(key) || !self.is_page_field(key));
		for (key, value) in incoming {
			merged.insert(key.clone(), value.clone());
		}
		Ok(self.compose(&merged, body))
	}
}


// vim: ts=4
