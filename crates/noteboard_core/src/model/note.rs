//! Note domain model.
//!
//! # Responsibility
//! - Mirror the `notes` row schema (`id`, `created_at`, `title`).
//! - Validate server-assigned fields after decoding.
//!
//! # Invariants
//! - `id` is opaque and assigned by the remote store.
//! - `created_at` is immutable once assigned.
//! - Draft titles are never blank after trimming.

use serde::{Deserialize, Serialize};

/// Opaque identifier assigned by the remote store.
pub type NoteId = String;

/// A note as confirmed by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Server-assigned timestamp, kept verbatim (ISO-8601 in practice).
    pub created_at: String,
    pub title: String,
}

impl Note {
    pub fn new(
        id: impl Into<NoteId>,
        created_at: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            created_at: created_at.into(),
            title: title.into(),
        }
    }

    /// Checks the persisted-note invariants.
    ///
    /// # Errors
    /// - `MissingId` when `id` is empty.
    /// - `MissingCreatedAt` when `created_at` is empty.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.id.is_empty() {
            return Err(NoteValidationError::MissingId);
        }
        if self.created_at.is_empty() {
            return Err(NoteValidationError::MissingCreatedAt {
                id: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// Create/update payload. Only the title travels; the server owns the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteDraft {
    pub title: String,
}

impl NoteDraft {
    /// Builds a draft, rejecting titles that are blank after trimming.
    ///
    /// The title is kept exactly as typed.
    pub fn new(title: impl Into<String>) -> Result<Self, NoteValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(NoteValidationError::EmptyTitle);
        }
        Ok(Self { title })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoteValidationError {
    #[error("note title cannot be empty")]
    EmptyTitle,
    #[error("note record is missing its id")]
    MissingId,
    #[error("note record `{id}` is missing its creation timestamp")]
    MissingCreatedAt { id: NoteId },
}
