//! Metadata conversion between note frontmatter and wiki page fields
//!
//! The engine never interprets frontmatter itself. It hands note content to a
//! `MetadataConverter`, which splits it, maps fields onto the wiki's page
//! properties and back, and merges pulled metadata into existing notes.

mod converter;
pub mod frontmatter;

pub use converter::DefaultMetadataConverter;

use serde_json::{Map, Value};
use std::error::Error;

use crate::wiki::WikiPage;

/// Frontmatter of a note, keyed by field name
pub type Frontmatter = Map<String, Value>;

/// Errors that can occur during metadata operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
	/// The frontmatter block is malformed
	Parse { line: usize, message: String },

	/// A field holds a value of the wrong type
	InvalidField { field: String, message: String },
}

impl MetadataError {
	pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
		MetadataError::Parse { line, message: message.into() }
	}
}

impl std::fmt::Display for MetadataError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			MetadataError::Parse { line, message } => {
				write!(f, "Frontmatter parse error at line {}: {}", line, message)
			}
			MetadataError::InvalidField { field, message } => {
				write!(f, "Invalid frontmatter field '{}': {}", field, message)
			}
		}
	}
}

impl Error for MetadataError {}

/// A note split into frontmatter and body
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
	pub frontmatter: Frontmatter,
	pub body: String,
}

/// Page properties derived from note frontmatter
///
/// `None` means the note does not say; the engine then falls back to its
/// configured defaults.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WikiMetadata {
	pub title: Option<String>,
	pub tags: Vec<String>,
	pub description: Option<String>,
	pub is_published: Option<bool>,
	pub is_private: Option<bool>,

	/// Fields with no dedicated page property
	pub custom_data: Frontmatter,
}

/// Bidirectional, pure metadata translation
pub trait MetadataConverter: Send + Sync {
	/// Split note content into frontmatter and body
	fn extract_frontmatter(&self, content: &str) -> Result<Document, MetadataError>;

	/// Map note frontmatter onto page properties
	fn to_wiki(&self, frontmatter: &Frontmatter) -> Result<WikiMetadata, MetadataError>;

	/// Frontmatter describing a wiki page
	fn from_wiki(&self, page: &WikiPage) -> Frontmatter;

	/// Merge `incoming` into the frontmatter of `existing`, keeping fields
	/// only the note has, and return the new content with the existing body
	fn merge_frontmatter(&self, existing: &str, incoming: &Frontmatter) -> Result<String, MetadataError>;

	/// Assemble a note from frontmatter and body
	fn compose(&self, frontmatter: &Frontmatter, body: &str) -> String {
		frontmatter::render(frontmatter, body)
	}

	/// Note content for a pulled page: the page body under the page's
	/// metadata, merged into the current note if there is one
	fn pulled_content(&self, existing: Option<&str>, page: &WikiPage) -> Result<String, MetadataError> {
		let incoming = self.from_wiki(page);
		match existing {
			Some(existing) => {
				let merged = self.merge_frontmatter(existing, &incoming)?;
				let doc = self.extract_frontmatter(&merged)?;
				Ok(self.compose(&doc.frontmatter, &page.content))
			}
			None => Ok(self.compose(&incoming, &page.content)),
		}
	}
}

// vim: ts=4
