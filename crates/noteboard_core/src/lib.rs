//! Core of the noteboard client: a REST-backed note list.
//!
//! `api` talks to the remote `notes` resource, `store` mirrors confirmed
//! server state for a front-end to observe.

pub mod api;
pub mod config;
pub mod logging;
pub mod model;
pub mod store;

pub use api::rest::RestNotesClient;
pub use api::{ApiError, ApiResult, NotesApi};
pub use config::{ClientConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Note, NoteDraft, NoteId, NoteValidationError};
pub use store::view::{compare_titles, derived_view, SortMode};
pub use store::{EditorState, NoteStore, StoreError, StoreState};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
