//! # wikisync - Markdown vault ↔ Wiki.js synchronization
//!
//! wikisync keeps a folder of Markdown notes with YAML frontmatter and a
//! Wiki.js instance in step. A pass pushes notes to the wiki, pulls pages into
//! the vault, or does both while detecting notes edited on both sides.
//!
//! ## Using the Builder Pattern
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wikisync::{FsVault, SyncBuilder, SyncConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = SyncBuilder::new()
//!         .wiki(Arc::new(my_wiki_client))
//!         .vault(Arc::new(FsVault::new("./vault")))
//!         .config(SyncConfig::load("wikisync.toml".as_ref())?)
//!         .build()?;
//!     let result = engine.sync().await;
//!     println!("{}", result.message);
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod cache;
pub mod callbacks;
pub mod config;
pub mod conflict;
pub mod error;
pub mod exclusion;
pub mod logging;
pub mod metadata;
pub mod path_mapper;
pub mod queue;
pub mod retry;
pub mod strategies;
pub mod sync;
pub mod types;
pub mod vault;
pub mod wiki;

mod sync_impl;

// Re-export commonly used types and functions
pub use config::SyncConfig;
pub use error::{RemoteError, SyncError};
pub use sync::SyncBuilder;
pub use sync_impl::{PagePreview, SyncEngine};
pub use types::{FileEvent, SyncResult};
pub use vault::{FsVault, MemoryVault, Vault};
pub use wiki::{MemoryWiki, WikiClient, WikiPage, WikiPageInput};

// vim: ts=4
