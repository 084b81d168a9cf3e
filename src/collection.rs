//! The note collection manager.
//!
//! `NoteCollection` is the authoritative, caller-owned sequence of notes,
//! most recent first. Mutations go through its methods; after each one the
//! caller persists the whole collection with `NotesStorage::save`.
//!
//! The read side (`search`, `filter_favorites`, `sort`, `compose`, `recent`)
//! is a set of pure functions over a borrowed slice, so a view can be
//! re-derived on every keystroke without the collection caching anything.

use chrono::Utc;
use log::{debug, info, trace};

use crate::{compare_titles, fold_case, CnError, Note, NoteDraft, Result, SortMode};

/// Owned, ordered collection of notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteCollection {
    notes: Vec<Note>,
}

impl NoteCollection {
    /// Wraps notes in their stored order.
    pub fn new(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn into_notes(self) -> Vec<Note> {
        self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Looks up a note by id.
    pub fn get(&self, id: i64) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    /// Creates a note stamped with the current time and puts it first.
    pub fn create(&mut self, draft: NoteDraft) -> Note {
        self.create_at(draft, Utc::now().timestamp_millis())
    }

    /// Creates a note as if the clock read `now_ms`.
    ///
    /// Ids are strictly increasing within a collection: when `now_ms` is not
    /// past every existing id, the note gets the next id after the largest
    /// one, so two notes created in the same millisecond never collide.
    pub fn create_at(&mut self, draft: NoteDraft, now_ms: i64) -> Note {
        let id = self.next_id(now_ms);
        if id != now_ms {
            debug!("Clock reading {} already taken, using id {}", now_ms, id);
        }

        let note = Note::from_draft(draft, id);
        self.notes.insert(0, note.clone());

        info!("Created note {} ({})", note.id, note.title);
        note
    }

    fn next_id(&self, now_ms: i64) -> i64 {
        match self.notes.iter().map(|note| note.id).max() {
            Some(max_id) if max_id >= now_ms => max_id + 1,
            _ => now_ms,
        }
    }

    /// Replaces the content of a note, leaving every other field unchanged.
    pub fn update_content(&mut self, id: i64, content: impl Into<String>) -> Result<Note> {
        let note = self.get_mut(id)?;
        note.content = content.into();

        info!("Updated content of note {}", id);
        Ok(note.clone())
    }

    /// Flips the favorite flag of a note.
    pub fn toggle_favorite(&mut self, id: i64) -> Result<Note> {
        let note = self.get_mut(id)?;
        note.is_favorite = !note.is_favorite;

        info!("Note {} favorite: {}", id, note.is_favorite);
        Ok(note.clone())
    }

    /// Removes a note. Returns whether anything was removed; deleting an id
    /// that is not present is a no-op.
    pub fn delete(&mut self, id: i64) -> bool {
        let before = self.notes.len();
        self.notes.retain(|note| note.id != id);
        let removed = self.notes.len() != before;

        if removed {
            info!("Deleted note {}", id);
        } else {
            debug!("Delete of note {} was a no-op", id);
        }
        removed
    }

    fn get_mut(&mut self, id: i64) -> Result<&mut Note> {
        self.notes
            .iter_mut()
            .find(|note| note.id == id)
            .ok_or(CnError::NoteNotFound { id })
    }
}

impl From<Vec<Note>> for NoteCollection {
    fn from(notes: Vec<Note>) -> Self {
        Self::new(notes)
    }
}

/// Notes whose title or content contains `query`, ignoring case.
///
/// The query is trimmed; an empty query matches every note.
pub fn search<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    search_refs(notes.iter(), query)
}

fn search_refs<'a>(notes: impl Iterator<Item = &'a Note>, query: &str) -> Vec<&'a Note> {
    let needle = fold_case(query.trim());
    if needle.is_empty() {
        return notes.collect();
    }

    notes
        .filter(|note| {
            fold_case(&note.title).contains(&needle) || fold_case(&note.content).contains(&needle)
        })
        .collect()
}

/// Keeps only favorite notes.
pub fn filter_favorites(notes: &[Note]) -> Vec<&Note> {
    notes.iter().filter(|note| note.is_favorite).collect()
}

/// Returns the notes in the requested order without touching the input.
///
/// The sort is stable: notes with equal keys keep their relative order.
pub fn sort(notes: &[Note], mode: SortMode) -> Vec<&Note> {
    let mut sorted: Vec<&Note> = notes.iter().collect();
    sort_refs(&mut sorted, mode);
    sorted
}

fn sort_refs(notes: &mut [&Note], mode: SortMode) {
    trace!("Sorting {} notes by {}", notes.len(), mode);
    match mode {
        SortMode::Newest => notes.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms)),
        SortMode::Oldest => notes.sort_by(|a, b| a.created_at_ms.cmp(&b.created_at_ms)),
        SortMode::Title => notes.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        // Plain byte order, unlike titles.
        SortMode::Color => notes.sort_by(|a, b| a.color.cmp(&b.color)),
    }
}

/// The display pipeline: favorites filter, then search, then sort.
pub fn compose<'a>(
    notes: &'a [Note],
    query: &str,
    favorites_only: bool,
    mode: SortMode,
) -> Vec<&'a Note> {
    let candidates = notes
        .iter()
        .filter(|note| !favorites_only || note.is_favorite);
    let mut view = search_refs(candidates, query);
    sort_refs(&mut view, mode);

    debug!(
        "Composed {} of {} notes (query={:?}, favorites_only={}, sort={})",
        view.len(),
        notes.len(),
        query,
        favorites_only,
        mode
    );
    view
}

/// The `limit` newest notes, optionally favorites only.
pub fn recent(notes: &[Note], favorites_only: bool, limit: usize) -> Vec<&Note> {
    let mut view = compose(notes, "", favorites_only, SortMode::Newest);
    view.truncate(limit);
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NotebookStyle;

    fn draft(title: &str) -> NoteDraft {
        NoteDraft::new(title, "#2563eb", NotebookStyle::Plain).unwrap()
    }

    fn note(id: i64, title: &str, color: &str, created_at_ms: i64, is_favorite: bool) -> Note {
        Note {
            id,
            title: title.to_string(),
            color: color.to_string(),
            created_at: String::new(),
            created_at_ms,
            content: String::new(),
            notebook_style: NotebookStyle::Plain,
            is_favorite,
        }
    }

    fn ids(notes: &[&Note]) -> Vec<i64> {
        notes.iter().map(|note| note.id).collect()
    }

    #[test]
    fn test_create_sets_defaults_and_prepends() {
        let mut collection = NoteCollection::default();
        let first = collection.create_at(draft("First"), 1_000);
        let second = collection.create_at(draft("Second").with_content("body"), 2_000);

        assert_eq!(first.id, 1_000);
        assert_eq!(first.created_at_ms, first.id);
        assert!(!first.is_favorite);
        assert_eq!(first.content, "");
        assert_eq!(second.content, "body");
        assert!(!second.created_at.is_empty());
        assert_eq!(ids(&collection.notes().iter().collect::<Vec<_>>()), vec![2_000, 1_000]);
    }

    #[test]
    fn test_create_in_same_millisecond_gets_next_id() {
        let mut collection = NoteCollection::default();
        let a = collection.create_at(draft("A"), 5_000);
        let b = collection.create_at(draft("B"), 5_000);
        let c = collection.create_at(draft("C"), 4_000);

        assert_eq!(a.id, 5_000);
        assert_eq!(b.id, 5_001);
        assert_eq!(c.id, 5_002);
        assert_eq!(b.created_at_ms, b.id);
        assert_eq!(c.created_at_ms, c.id);
    }

    #[test]
    fn test_create_uses_current_clock() {
        let before = Utc::now().timestamp_millis();
        let mut collection = NoteCollection::default();
        let note = collection.create(draft("Now"));
        let after = Utc::now().timestamp_millis();

        assert!(note.id >= before && note.id <= after);
        assert_eq!(note.created_at_ms, note.id);
    }

    #[test]
    fn test_update_content_changes_only_content() {
        let mut collection = NoteCollection::default();
        let original = collection.create_at(draft("Lecture"), 10);

        let updated = collection.update_content(original.id, "new body").unwrap();
        assert_eq!(updated.content, "new body");
        assert_eq!(
            Note {
                content: original.content.clone(),
                ..updated.clone()
            },
            original
        );
        assert_eq!(collection.get(original.id), Some(&updated));
    }

    #[test]
    fn test_update_content_missing_note() {
        let mut collection = NoteCollection::default();
        let err = collection.update_content(42, "x").unwrap_err();
        assert!(matches!(err, CnError::NoteNotFound { id: 42 }));
    }

    #[test]
    fn test_toggle_favorite_is_its_own_inverse() {
        let mut collection = NoteCollection::default();
        let note = collection.create_at(draft("Fav"), 10);

        assert!(collection.toggle_favorite(note.id).unwrap().is_favorite);
        assert!(!collection.toggle_favorite(note.id).unwrap().is_favorite);
        assert!(matches!(
            collection.toggle_favorite(99),
            Err(CnError::NoteNotFound { id: 99 })
        ));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut collection = NoteCollection::default();
        collection.create_at(draft("Keep"), 1);
        let gone = collection.create_at(draft("Gone"), 2);

        assert!(collection.delete(gone.id));
        let after_first = collection.clone();
        assert!(!collection.delete(gone.id));
        assert_eq!(collection, after_first);
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_search_matches_title_or_content_ignoring_case() {
        let mut notes = vec![
            note(1, "Mikroekonomi ödevi", "#2563eb", 1, false),
            note(2, "Biology", "#2563eb", 2, false),
        ];
        notes[1].content = "Mitosis and MIKRO organisms".to_string();

        assert_eq!(ids(&search(&notes, "mikro")), vec![1, 2]);
        assert_eq!(ids(&search(&notes, "MİKRO")), vec![1, 2]);
        assert_eq!(ids(&search(&notes, "ödev")), vec![1]);
        assert_eq!(ids(&search(&notes, "  biology ")), vec![2]);
        assert!(search(&notes, "chemistry").is_empty());
    }

    #[test]
    fn test_empty_query_matches_all() {
        let notes = vec![note(1, "A", "#000000", 1, false), note(2, "B", "#000000", 2, false)];
        assert_eq!(ids(&search(&notes, "")), vec![1, 2]);
        assert_eq!(ids(&search(&notes, "   ")), vec![1, 2]);
    }

    #[test]
    fn test_filter_favorites() {
        let notes = vec![note(1, "A", "#000000", 1, true), note(2, "B", "#000000", 2, false)];
        assert_eq!(ids(&filter_favorites(&notes)), vec![1]);
        assert!(filter_favorites(&[]).is_empty());
    }

    #[test]
    fn test_sort_newest_is_reverse_of_oldest() {
        let notes = vec![
            note(1, "A", "#000000", 300, false),
            note(2, "B", "#000000", 100, false),
            note(3, "C", "#000000", 200, false),
        ];
        let newest = ids(&sort(&notes, SortMode::Newest));
        let mut oldest = ids(&sort(&notes, SortMode::Oldest));
        oldest.reverse();

        assert_eq!(newest, vec![1, 3, 2]);
        assert_eq!(newest, oldest);
    }

    #[test]
    fn test_sort_is_stable_and_non_mutating() {
        let notes = vec![
            note(1, "A", "#111111", 100, false),
            note(2, "B", "#000000", 100, false),
            note(3, "C", "#111111", 50, false),
        ];
        assert_eq!(ids(&sort(&notes, SortMode::Newest)), vec![1, 2, 3]);
        assert_eq!(ids(&sort(&notes, SortMode::Oldest)), vec![3, 1, 2]);
        assert_eq!(ids(&sort(&notes, SortMode::Color)), vec![2, 1, 3]);
        assert_eq!(notes[0].id, 1);
    }

    #[test]
    fn test_title_sort_is_locale_aware_but_color_sort_is_not() {
        let notes = vec![
            note(1, "Dilbilgisi", "#ffffff", 1, false),
            note(2, "Çalışma", "#FFFFFF", 2, false),
            note(3, "calculus", "#aaaaaa", 3, false),
            note(4, "Calculus", "#AAAAAA", 4, false),
        ];

        // Turkish alphabet: c < ç < d, lowercase before uppercase on ties.
        assert_eq!(ids(&sort(&notes, SortMode::Title)), vec![3, 4, 2, 1]);
        // Byte order: uppercase hex digits sort before lowercase ones.
        assert_eq!(ids(&sort(&notes, SortMode::Color)), vec![4, 2, 3, 1]);
    }

    #[test]
    fn test_compose_with_defaults_equals_sort() {
        let notes = vec![
            note(1, "A", "#000000", 100, false),
            note(2, "B", "#000000", 200, true),
        ];
        assert_eq!(
            ids(&compose(&notes, "", false, SortMode::Newest)),
            ids(&sort(&notes, SortMode::Newest))
        );
    }

    #[test]
    fn test_compose_filters_favorites_before_sorting() {
        let notes = vec![
            note(1, "A", "#000000", 100, false),
            note(2, "B", "#000000", 200, true),
        ];
        assert_eq!(ids(&compose(&notes, "", true, SortMode::Oldest)), vec![2]);
        assert!(compose(&notes, "a", true, SortMode::Oldest).is_empty());
        assert!(compose(&[], "anything", true, SortMode::Title).is_empty());
    }

    #[test]
    fn test_recent_truncates_newest_first() {
        let notes = vec![
            note(1, "A", "#000000", 100, true),
            note(2, "B", "#000000", 400, false),
            note(3, "C", "#000000", 300, true),
            note(4, "D", "#000000", 200, true),
        ];
        assert_eq!(ids(&recent(&notes, false, 3)), vec![2, 3, 4]);
        assert_eq!(ids(&recent(&notes, true, 2)), vec![3, 4]);
        assert_eq!(ids(&recent(&notes, true, 10)), vec![3, 4, 1]);
    }
}
