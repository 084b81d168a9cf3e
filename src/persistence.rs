//! Persistence of the note collection.
//!
//! The whole collection is stored as one JSON array under a single key. Each
//! save rewrites the blob; loading repairs records field by field so that an
//! old or hand-edited blob still yields usable notes.
use std::collections::HashSet;

use chrono::Utc;
use log::{debug, error, info, warn};
use serde_json::{Map, Value};

use crate::{
    format_created_at, CnError, KeyValueStore, Note, NotebookStyle, Result, DEFAULT_NOTE_COLOR,
    UNTITLED_NOTE_TITLE,
};

/// Storage key holding the serialized note collection.
pub const NOTES_KEY: &str = "NOTES_V1";

/// Loads and saves the note collection through a key-value store.
pub struct NotesStorage<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> NotesStorage<S> {
    /// Creates a storage that uses the standard notes key.
    pub fn new(store: S) -> Self {
        Self::with_key(store, NOTES_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the stored collection.
    ///
    /// Never fails: a missing key means no notes yet, and a read failure or a
    /// blob that is not a JSON array is logged and treated as empty.
    pub async fn load(&self) -> Vec<Note> {
        self.try_load().await.unwrap_or_else(|e| {
            error!("Failed to read notes from {}: {}", self.key, e);
            Vec::new()
        })
    }

    /// Like [`load`](Self::load), but a store read failure is returned
    /// instead of being treated as an empty collection.
    ///
    /// A missing key or an unreadable blob still yields an empty collection;
    /// only the store itself failing is an error, so callers that save after
    /// loading never overwrite notes they could not read.
    pub async fn try_load(&self) -> Result<Vec<Note>> {
        let raw = match self.store.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No notes stored under {}", self.key);
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(CnError::Persistence {
                    message: e.to_string(),
                })
            }
        };

        match parse_notes(&raw, Utc::now().timestamp_millis()) {
            Ok(notes) => {
                info!("Loaded {} notes", notes.len());
                Ok(notes)
            }
            Err(e) => {
                error!("Stored notes under {} are unreadable: {}", self.key, e);
                Ok(Vec::new())
            }
        }
    }

    /// Serializes the full collection and overwrites the stored blob.
    ///
    /// On failure the stored blob is left as it was and the error is
    /// returned; the caller's in-memory notes stay authoritative.
    pub async fn save(&self, notes: &[Note]) -> Result<()> {
        let json = serde_json::to_string(notes).map_err(|e| {
            error!("Failed to serialize notes: {}", e);
            CnError::Serialization(e)
        })?;

        self.store.set(&self.key, &json).await.map_err(|e| {
            error!("Failed to save {} notes: {}", notes.len(), e);
            CnError::Persistence {
                message: e.to_string(),
            }
        })?;

        debug!("Saved {} notes under {}", notes.len(), self.key);
        Ok(())
    }
}

/// Parses a stored blob, repairing each record.
///
/// Ids stay unique: a record whose id is missing, unusable or already taken
/// by an earlier record gets `max(now_ms, largest id so far + 1)`.
pub fn parse_notes(raw: &str, now_ms: i64) -> Result<Vec<Note>> {
    let value: Value = serde_json::from_str(raw)?;
    let Value::Array(records) = value else {
        return Err(CnError::Persistence {
            message: "stored notes are not a JSON array".to_string(),
        });
    };

    let mut used = HashSet::with_capacity(records.len());
    let mut max_seen: Option<i64> = None;
    let mut notes = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let fields = match record {
            Value::Object(fields) => fields,
            other => {
                warn!("Skipping stored note #{}: not an object ({})", index, other);
                continue;
            }
        };

        let id = match stored_id(&fields) {
            Some(id) if !used.contains(&id) => id,
            stored => {
                let id = match max_seen {
                    Some(max) if max >= now_ms => max + 1,
                    _ => now_ms,
                };
                match stored {
                    Some(taken) => {
                        warn!("Stored note #{} repeats id {}, assigning {}", index, taken, id)
                    }
                    None => warn!("Stored note #{} has no usable id, assigning {}", index, id),
                }
                id
            }
        };

        used.insert(id);
        max_seen = Some(max_seen.map_or(id, |max| max.max(id)));
        notes.push(repair_note(&fields, id));
    }
    Ok(notes)
}

fn stored_id(fields: &Map<String, Value>) -> Option<i64> {
    fields.get("id").and_then(as_millis).filter(|&id| id != 0)
}

/// Maps whatever was stored for one note to a complete `Note` with the given
/// id, substituting a default for every field that is missing or has the
/// wrong type.
fn repair_note(fields: &Map<String, Value>, id: i64) -> Note {
    let created_at_ms = fields
        .get("createdAtMs")
        .and_then(as_millis)
        .unwrap_or(id);

    Note {
        id,
        title: string_field(fields, "title").unwrap_or_else(|| UNTITLED_NOTE_TITLE.to_string()),
        color: string_field(fields, "color").unwrap_or_else(|| DEFAULT_NOTE_COLOR.to_string()),
        created_at: string_field(fields, "createdAt")
            .unwrap_or_else(|| format_created_at(created_at_ms)),
        created_at_ms,
        content: string_field(fields, "content").unwrap_or_default(),
        notebook_style: fields
            .get("notebookStyle")
            .and_then(Value::as_str)
            .and_then(NotebookStyle::parse)
            .unwrap_or_default(),
        is_favorite: fields
            .get("isFavorite")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    }
}

// Timestamps are numbers, but older blobs may hold them as floats or
// numeric strings.
fn as_millis(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string_field(fields: &Map<String, Value>, name: &str) -> Option<String> {
    fields.get(name).and_then(Value::as_str).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, NoteCollection, NoteDraft};

    const NOW: i64 = 1_760_000_000_000;

    #[test]
    fn test_parse_fills_every_missing_field() {
        let notes = parse_notes("[{}]", NOW).unwrap();
        let note = &notes[0];

        assert_eq!(note.id, NOW);
        assert_eq!(note.created_at_ms, NOW);
        assert_eq!(note.title, UNTITLED_NOTE_TITLE);
        assert_eq!(note.color, DEFAULT_NOTE_COLOR);
        assert_eq!(note.created_at, format_created_at(NOW));
        assert_eq!(note.content, "");
        assert_eq!(note.notebook_style, NotebookStyle::Plain);
        assert!(!note.is_favorite);
    }

    #[test]
    fn test_parse_missing_style_defaults_to_plain() {
        let raw = r##"[{"id":5,"title":"A","color":"#2563eb","createdAt":"x","createdAtMs":5,"content":"c","isFavorite":true}]"##;
        let note = &parse_notes(raw, NOW).unwrap()[0];

        assert_eq!(note.notebook_style, NotebookStyle::Plain);
        assert_eq!(note.title, "A");
        assert_eq!(note.created_at, "x");
        assert!(note.is_favorite);
    }

    #[test]
    fn test_parse_derives_created_at_ms_from_id() {
        let note = &parse_notes(r#"[{"id":1234}]"#, NOW).unwrap()[0];
        assert_eq!(note.id, 1234);
        assert_eq!(note.created_at_ms, 1234);
        assert_eq!(note.created_at, format_created_at(1234));
    }

    #[test]
    fn test_parse_accepts_numeric_string_ids() {
        let notes = parse_notes(r#"[{"id":"77"},{"id":"abc"},{"id":0}]"#, NOW).unwrap();
        assert_eq!(notes[0].id, 77);
        assert_eq!(notes[1].id, NOW);
        assert_eq!(notes[2].id, NOW + 1);
    }

    #[test]
    fn test_parse_gives_each_repaired_note_its_own_id() {
        let raw = r#"[{"title":"A"},{"title":"B"},{"id":"x","title":"C"}]"#;
        let mut collection = NoteCollection::new(parse_notes(raw, 5000).unwrap());

        let ids: Vec<i64> = collection.notes().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![5000, 5001, 5002]);

        // Each note is reachable on its own
        collection.toggle_favorite(5000).unwrap();
        let favorites: Vec<bool> = collection.notes().iter().map(|n| n.is_favorite).collect();
        assert_eq!(favorites, vec![true, false, false]);

        assert!(collection.delete(5000));
        assert_eq!(collection.len(), 2);
    }

    #[test]
    fn test_parse_reassigns_repeated_ids() {
        let raw = r#"[{"id":9000,"title":"first"},{"id":9000,"title":"second"},{"id":"9000"}]"#;
        let notes = parse_notes(raw, 100).unwrap();

        let ids: Vec<i64> = notes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![9000, 9001, 9002]);
        assert_eq!(notes[0].title, "first");
        assert_eq!(notes[1].title, "second");
        // A reassigned note without its own timestamp dates from its new id
        assert_eq!(notes[1].created_at_ms, 9001);
    }

    #[test]
    fn test_parse_accepts_float_and_string_timestamps() {
        let raw = r#"[{"id":1,"createdAtMs":1700000000000.0},{"id":2,"createdAtMs":"1700000000123"}]"#;
        let notes = parse_notes(raw, NOW).unwrap();

        assert_eq!(notes[0].created_at_ms, 1_700_000_000_000);
        assert_eq!(notes[1].created_at_ms, 1_700_000_000_123);
    }

    #[test]
    fn test_parse_replaces_wrongly_typed_fields() {
        let raw = r#"[{"id":9,"title":3,"color":null,"notebookStyle":"checkered","isFavorite":"yes","content":[1]}]"#;
        let note = &parse_notes(raw, NOW).unwrap()[0];

        assert_eq!(note.title, UNTITLED_NOTE_TITLE);
        assert_eq!(note.color, DEFAULT_NOTE_COLOR);
        assert_eq!(note.notebook_style, NotebookStyle::Plain);
        assert!(!note.is_favorite);
        assert_eq!(note.content, "");
    }

    #[test]
    fn test_parse_skips_non_object_records() {
        let notes = parse_notes(r#"[{"id":1}, 42, null, "x", {"id":2}]"#, NOW).unwrap();
        assert_eq!(notes.iter().map(|n| n.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_parse_rejects_non_array_and_garbage() {
        assert!(parse_notes(r#"{"id":1}"#, NOW).is_err());
        assert!(parse_notes("not json", NOW).is_err());
    }

    /// Store whose every call fails, as an unreadable or full disk would.
    struct FailingStore;

    impl KeyValueStore for FailingStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(CnError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read denied",
            )))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(CnError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        }

        async fn remove(&self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_load_read_failure_is_empty() {
        let storage = NotesStorage::new(FailingStore);
        assert!(storage.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_try_load_reports_read_failure() {
        let storage = NotesStorage::new(FailingStore);
        assert!(matches!(
            storage.try_load().await,
            Err(CnError::Persistence { .. })
        ));
    }

    #[tokio::test]
    async fn test_try_load_treats_missing_and_corrupt_as_empty() {
        let store = MemoryStore::new();
        let storage = NotesStorage::new(store);
        assert!(storage.try_load().await.unwrap().is_empty());

        storage.store().set(NOTES_KEY, "nope").await.unwrap();
        assert!(storage.try_load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_keeps_collection_unchanged() {
        let mut collection = NoteCollection::default();
        collection.create_at(
            NoteDraft::new("Kimya", "#2563eb", NotebookStyle::Plain).unwrap(),
            1_000,
        );
        let before = collection.clone();

        let storage = NotesStorage::new(FailingStore);
        let err = storage.save(collection.notes()).await.unwrap_err();

        assert!(matches!(err, CnError::Persistence { .. }));
        assert!(collection == before);
        assert_eq!(collection.len(), 1);
    }

    #[tokio::test]
    async fn test_load_non_array_blob_is_empty() {
        let store = MemoryStore::new();
        store.set(NOTES_KEY, r#"{"id":1}"#).await.unwrap();

        let storage = NotesStorage::new(store);
        assert!(storage.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_key_is_empty() {
        let storage = NotesStorage::new(MemoryStore::new());
        assert!(storage.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_corrupt_blob_is_empty() {
        let store = MemoryStore::new();
        store.set(NOTES_KEY, "[{\"id\":").await.unwrap();

        let storage = NotesStorage::new(store);
        assert!(storage.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let mut collection = NoteCollection::default();
        let first = collection.create_at(
            NoteDraft::new("Mikroekonomi ödevi", "#F97316", NotebookStyle::Lined)
                .unwrap()
                .with_content("Arz ve talep"),
            1_000,
        );
        collection.create_at(
            NoteDraft::new("Grid page", "#10b981", NotebookStyle::Grid).unwrap(),
            2_000,
        );
        collection.toggle_favorite(first.id).unwrap();

        let storage = NotesStorage::new(MemoryStore::new());
        storage.save(collection.notes()).await.unwrap();

        assert_eq!(storage.load().await, collection.into_notes());
    }

    #[tokio::test]
    async fn test_custom_key_is_used() {
        let storage = NotesStorage::with_key(MemoryStore::new(), "NOTES_TEST");
        storage.save(&[]).await.unwrap();

        assert_eq!(
            storage.store().get("NOTES_TEST").await.unwrap().as_deref(),
            Some("[]")
        );
        assert_eq!(storage.store().get(NOTES_KEY).await.unwrap(), None);
    }
}
