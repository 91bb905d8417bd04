//! Error types for wikisync operations

use std::error::Error;
use std::fmt;
use std::io;

/// Main error type for sync operations
#[derive(Debug)]
pub enum SyncError {
	/// The remote wiki could not be reached
	ConnectionFailed { message: String },

	/// A remote client call failed
	Remote(RemoteError),

	/// I/O error on the local vault
	Io(io::Error),

	/// Frontmatter could not be parsed or rendered
	Metadata { path: String, message: String },

	/// Invalid configuration
	InvalidConfig { message: String },

	/// A full sync pass is already running
	AlreadyInProgress,

	/// The path is excluded from sync
	Excluded { path: String },

	/// Generic error message
	Other { message: String },
}

impl fmt::Display for SyncError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SyncError::ConnectionFailed { message } => {
				write!(f, "Cannot connect to wiki: {}", message)
			}
			SyncError::Remote(e) => write!(f, "Remote error: {}", e),
			SyncError::Io(e) => write!(f, "I/O error: {}", e),
			SyncError::Metadata { path, message } => {
				write!(f, "Invalid frontmatter in {}: {}", path, message)
			}
			SyncError::InvalidConfig { message } => {
				write!(f, "Invalid configuration: {}", message)
			}
			SyncError::AlreadyInProgress => write!(f, "Sync already in progress"),
			SyncError::Excluded { path } => write!(f, "Path is excluded from sync: {}", path),
			SyncError::Other { message } => write!(f, "{}", message),
		}
	}
}

impl Error for SyncError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			SyncError::Remote(e) => Some(e),
			SyncError::Io(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for SyncError {
	fn from(e: io::Error) -> Self {
		SyncError::Io(e)
	}
}

impl From<String> for SyncError {
	fn from(e: String) -> Self {
		SyncError::Other { message: e }
	}
}

impl From<RemoteError> for SyncError {
	fn from(e: RemoteError) -> Self {
		SyncError::Remote(e)
	}
}

impl From<globset::Error> for SyncError {
	fn from(e: globset::Error) -> Self {
		SyncError::InvalidConfig { message: e.to_string() }
	}
}

/// Remote client errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
	/// Transport-level failure (timeout, refused connection, DNS)
	Network { message: String },

	/// The wiki answered but refused the write
	Rejected { message: String },

	/// No page with the given id
	NotFound { id: u64 },

	/// The response could not be understood
	InvalidResponse { message: String },
}

impl fmt::Display for RemoteError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RemoteError::Network { message } => write!(f, "Network error: {}", message),
			RemoteError::Rejected { message } => write!(f, "Request rejected: {}", message),
			RemoteError::NotFound { id } => write!(f, "Page {} not found", id),
			RemoteError::InvalidResponse { message } => {
				write!(f, "Invalid response: {}", message)
			}
		}
	}
}

impl Error for RemoteError {}


// vim: ts=4
