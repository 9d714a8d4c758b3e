//! Note Store: in-memory mirror of server-confirmed notes.
//!
//! # Responsibility
//! - Own the note collection plus search, sort, loading, error and editor state.
//! - Route every mutation through a [`NotesApi`] and apply only confirmed results.
//! - Publish a snapshot to observers after every state change.
//!
//! # Invariants
//! - No optimistic updates: the collection changes only after a successful call.
//! - A failed call keeps the previous collection and sets `error_message`.
//! - Mutating methods take `&mut self`, so one store has a single writer and
//!   completions can never interleave.
//! - Entries are matched by `id`, never by position.

pub mod view;

use crate::api::{ApiError, NotesApi};
use crate::model::note::{Note, NoteDraft, NoteId};
use log::{info, warn};
use tokio::sync::watch;
use view::{derived_view, SortMode};

/// Which note form, if any, is open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditorState {
    #[default]
    Closed,
    Creating,
    /// Editing the selected note.
    Editing(Note),
}

/// Observable store state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    /// Notes in last-fetched order, with local appends at the end.
    pub notes: Vec<Note>,
    pub search_text: String,
    pub sort_mode: SortMode,
    pub is_loading: bool,
    /// Human-readable message of the last failure, until cleared.
    pub error_message: Option<String>,
    pub editor: EditorState,
}

impl StoreState {
    /// Filtered and sorted view for the current search text and sort mode.
    pub fn visible_notes(&self) -> Vec<Note> {
        derived_view(&self.notes, &self.search_text, self.sort_mode)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Title was blank after trimming; no request was issued.
    #[error("note title cannot be empty")]
    EmptyTitle,
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct NoteStore<A: NotesApi> {
    api: A,
    state: StoreState,
    publisher: watch::Sender<StoreState>,
}

impl<A: NotesApi> NoteStore<A> {
    /// Creates an empty store; call [`NoteStore::refresh`] to load notes.
    pub fn new(api: A) -> Self {
        let (publisher, _) = watch::channel(StoreState::default());
        Self {
            api,
            state: StoreState::default(),
            publisher,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn notes(&self) -> &[Note] {
        &self.state.notes
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    pub fn error_message(&self) -> Option<&str> {
        self.state.error_message.as_deref()
    }

    pub fn editor(&self) -> &EditorState {
        &self.state.editor
    }

    /// Recomputed on every call.
    pub fn visible_notes(&self) -> Vec<Note> {
        self.state.visible_notes()
    }

    /// Returns a receiver that sees a fresh snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.publisher.subscribe()
    }

    /// Replaces the whole collection with the server's list.
    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        self.begin_request();
        match self.api.list().await {
            Ok(notes) => {
                info!("event=store_refresh module=store status=ok count={}", notes.len());
                self.state.notes = notes;
                self.finish_request();
                Ok(())
            }
            Err(err) => Err(self.fail("refresh", err.into())),
        }
    }

    /// Creates a note and appends the confirmed row.
    ///
    /// Blank titles are rejected before any request is made.
    pub async fn create_note(&mut self, title: &str) -> Result<Note, StoreError> {
        let draft = match NoteDraft::new(title) {
            Ok(draft) => draft,
            Err(_) => return Err(self.fail("create", StoreError::EmptyTitle)),
        };

        self.begin_request();
        match self.api.create(&draft.title).await {
            Ok(note) => {
                info!("event=store_create module=store status=ok id={}", note.id);
                self.state.notes.push(note.clone());
                if self.state.editor == EditorState::Creating {
                    self.state.editor = EditorState::Closed;
                }
                self.finish_request();
                Ok(note)
            }
            Err(err) => Err(self.fail("create", err.into())),
        }
    }

    /// Renames `existing` and replaces the entry with the same id in place.
    pub async fn rename_note(
        &mut self,
        existing: &Note,
        new_title: &str,
    ) -> Result<Note, StoreError> {
        let draft = match NoteDraft::new(new_title) {
            Ok(draft) => draft,
            Err(_) => return Err(self.fail("rename", StoreError::EmptyTitle)),
        };

        self.begin_request();
        match self.api.update(&existing.id, &draft.title).await {
            Ok(updated) => {
                info!("event=store_rename module=store status=ok id={}", existing.id);
                if let Some(slot) = self
                    .state
                    .notes
                    .iter_mut()
                    .find(|note| note.id == existing.id)
                {
                    *slot = updated.clone();
                }
                if matches!(self.state.editor, EditorState::Editing(_)) {
                    self.state.editor = EditorState::Closed;
                }
                self.finish_request();
                Ok(updated)
            }
            Err(err) => Err(self.fail("rename", err.into())),
        }
    }

    /// Deletes `note` remotely, then drops every entry with its id.
    pub async fn remove_note(&mut self, note: &Note) -> Result<(), StoreError> {
        self.remove_note_by_id(&note.id).await
    }

    /// Deletes by id alone. An id missing from the collection is not an error.
    pub async fn remove_note_by_id(&mut self, id: &NoteId) -> Result<(), StoreError> {
        self.begin_request();
        match self.api.delete(id).await {
            Ok(()) => {
                info!("event=store_remove module=store status=ok id={}", id);
                self.state.notes.retain(|held| &held.id != id);
                let editing_removed = matches!(
                    &self.state.editor,
                    EditorState::Editing(selected) if &selected.id == id
                );
                if editing_removed {
                    self.state.editor = EditorState::Closed;
                }
                self.finish_request();
                Ok(())
            }
            Err(err) => Err(self.fail("remove", err.into())),
        }
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) {
        self.state.search_text = text.into();
        self.publish();
    }

    pub fn set_sort_mode(&mut self, mode: SortMode) {
        self.state.sort_mode = mode;
        self.publish();
    }

    /// Opens the creation form.
    pub fn begin_create(&mut self) {
        self.state.editor = EditorState::Creating;
        self.publish();
    }

    /// Opens the edit form for `note`.
    pub fn select_note_for_edit(&mut self, note: &Note) {
        self.state.editor = EditorState::Editing(note.clone());
        self.publish();
    }

    /// Closes any open form without saving.
    pub fn dismiss_editor(&mut self) {
        self.state.editor = EditorState::Closed;
        self.publish();
    }

    pub fn clear_error(&mut self) {
        self.state.error_message = None;
        self.publish();
    }

    fn begin_request(&mut self) {
        self.state.is_loading = true;
        self.state.error_message = None;
        self.publish();
    }

    fn finish_request(&mut self) {
        self.state.is_loading = false;
        self.publish();
    }

    fn fail(&mut self, op: &str, err: StoreError) -> StoreError {
        warn!("event=store_{} module=store status=error error={}", op, err);
        self.state.is_loading = false;
        self.state.error_message = Some(err.to_string());
        self.publish();
        err
    }

    fn publish(&self) {
        self.publisher.send_replace(self.state.clone());
    }
}
