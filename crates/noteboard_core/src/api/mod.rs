//! Remote Client contracts.
//!
//! # Responsibility
//! - Define the four logical operations against the `notes` resource.
//! - Define the error taxonomy shared by every implementation.
//!
//! # Invariants
//! - Every call is a single attempt; retry policy belongs to the caller.
//! - Notes returned from `create`/`update` pass `Note::validate()`.
//!
//! # See also
//! - `rest.rs` for the HTTP implementation.

pub mod rest;

use crate::model::note::{Note, NoteId};
use async_trait::async_trait;

pub type ApiResult<T> = Result<T, ApiError>;

/// Failure of one Remote Client call.
///
/// `Display` renders the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Request URL could not be built from the configured base.
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
    /// Success response without the row the operation requires.
    #[error("no data received from server")]
    NoData,
    /// Body is not valid JSON or does not match the note schema.
    #[error("failed to process server data: {0}")]
    Decoding(String),
    /// Transport failure: connectivity, TLS, timeout.
    #[error("network error: {0}")]
    Network(String),
    /// Well-formed response with a status the operation does not accept.
    #[error("server error: {0}")]
    Server(u16),
}

impl ApiError {
    /// HTTP status for `Server` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server(code) => Some(*code),
            _ => None,
        }
    }
}

/// Logical operations on the remote `notes` resource.
#[async_trait]
pub trait NotesApi: Send + Sync {
    /// Fetches every note, in server order.
    async fn list(&self) -> ApiResult<Vec<Note>>;
    /// Creates one note and returns the persisted row.
    async fn create(&self, title: &str) -> ApiResult<Note>;
    /// Replaces the title of note `id` and returns the updated row.
    async fn update(&self, id: &NoteId, title: &str) -> ApiResult<Note>;
    /// Deletes note `id`. Unknown ids are not an error at this layer.
    async fn delete(&self, id: &NoteId) -> ApiResult<()>;
}

#[cfg(test)]
mod tests {
    use super::ApiError;

    #[test]
    fn status_is_only_reported_for_server_errors() {
        assert_eq!(ApiError::Server(503).status(), Some(503));
        assert_eq!(ApiError::NoData.status(), None);
    }

    #[test]
    fn display_is_human_readable() {
        assert_eq!(ApiError::Server(404).to_string(), "server error: 404");
        assert_eq!(ApiError::NoData.to_string(), "no data received from server");
    }
}
