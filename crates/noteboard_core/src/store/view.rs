//! Derived (filtered + sorted) projections of the held note collection.
//!
//! # Invariants
//! - Views are computed from the collection on every call; nothing is cached.
//! - Creation order compares the raw `created_at` strings, not parsed times.
//! - Both orderings are stable for equal keys.
//! - Title order follows Unicode collation at secondary strength: accents
//!   count, case does not.

use crate::model::note::Note;
use icu_collator::{Collator, CollatorOptions, Strength};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

thread_local! {
    static TITLE_COLLATOR: Collator = {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Secondary);
        Collator::try_new(&Default::default(), options)
            .expect("root collation data is compiled in")
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Newest first by lexical `created_at`.
    #[default]
    ByCreationDescending,
    /// Locale-aware, case-insensitive A-Z by title.
    ByTitleAscending,
}

impl SortMode {
    pub const ALL: [SortMode; 2] = [Self::ByCreationDescending, Self::ByTitleAscending];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ByCreationDescending => "created",
            Self::ByTitleAscending => "title",
        }
    }
}

impl Display for SortMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "created" | "creation" | "date" => Ok(Self::ByCreationDescending),
            "title" => Ok(Self::ByTitleAscending),
            other => Err(format!("unsupported sort mode `{other}`; expected created|title")),
        }
    }
}

/// Returns the notes whose title contains `filter` (case-insensitive),
/// ordered by `sort`. An empty filter keeps every note.
pub fn derived_view(notes: &[Note], filter: &str, sort: SortMode) -> Vec<Note> {
    let needle = filter.to_lowercase();
    let mut view: Vec<Note> = notes
        .iter()
        .filter(|note| needle.is_empty() || note.title.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    match sort {
        SortMode::ByCreationDescending => {
            view.sort_by(|left, right| right.created_at.cmp(&left.created_at))
        }
        SortMode::ByTitleAscending => {
            view.sort_by(|left, right| compare_titles(&left.title, &right.title))
        }
    }
    view
}

/// Locale-aware, case-insensitive title ordering.
///
/// Titles that collate equal fall back to raw text so the order is total.
pub fn compare_titles(left: &str, right: &str) -> Ordering {
    TITLE_COLLATOR
        .with(|collator| collator.compare(left, right))
        .then_with(|| left.cmp(right))
}
