//! Domain model for remotely persisted notes.
//!
//! # Responsibility
//! - Define the record shape exchanged with the REST resource.
//! - Keep persisted notes and not-yet-persisted drafts as distinct types.
//!
//! # Invariants
//! - A persisted `Note` always carries a non-empty `id` and `created_at`.
//! - A `NoteDraft` never carries server-assigned fields.

pub mod note;
