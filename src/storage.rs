use std::{
    cmp::Reverse,
    collections::{BTreeSet, HashMap},
    fs,
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
};

use log::{debug, error, info, trace, warn};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::{
    load_note_from_file, normalize_tag, normalize_tags, validate_fields, LoadSummary, Note,
    NoteError, NoteStats, Result, DEFAULT_NOTES_DIR,
};

/// Manages the storage, retrieval and querying of notes.
///
/// The in-memory map is the source of truth for reads. Every mutation is
/// written to `<notes_dir>/<id>.json` before it returns, and a failed write
/// leaves memory exactly as it was before the call.
#[derive(Debug)]
pub struct NoteStorage {
    /// Directory holding one JSON file per note
    notes_dir: PathBuf,

    /// In-memory index of notes, keyed by note ID
    notes: HashMap<u64, Note>,

    /// ID handed to the next created note
    next_id: u64,

    /// Outcome of the startup directory scan
    last_load: LoadSummary,
}

impl NoteStorage {
    /// Opens the store rooted at `notes_dir`, creating the directory if needed
    /// and loading every note file it contains.
    ///
    /// # Arguments
    ///
    /// * `notes_dir` - The persistence root; an empty path means `notes`
    ///
    /// # Returns
    ///
    /// The ready-to-use store, or a `DirectoryError` if the root cannot be
    /// created, is not a directory, cannot be written or cannot be listed
    pub fn open(notes_dir: impl AsRef<Path>) -> Result<Self> {
        let notes_dir = notes_dir.as_ref();
        let notes_dir = if notes_dir.as_os_str().is_empty() {
            PathBuf::from(DEFAULT_NOTES_DIR)
        } else {
            notes_dir.to_path_buf()
        };

        info!("Opening note storage at {}", notes_dir.display());

        if !notes_dir.exists() {
            debug!(
                "Notes directory does not exist, creating: {}",
                notes_dir.display()
            );
            fs::create_dir_all(&notes_dir).map_err(|e| {
                error!("Failed to create notes directory: {}", e);
                NoteError::DirectoryError {
                    path: notes_dir.clone(),
                    source: e,
                }
            })?;
        } else if !notes_dir.is_dir() {
            error!("Notes path is not a directory: {}", notes_dir.display());
            return Err(NoteError::DirectoryError {
                source: io::Error::new(ErrorKind::InvalidInput, "not a directory"),
                path: notes_dir,
            });
        }

        // Every save creates a temp file in the root
        if let Err(e) = NamedTempFile::new_in(&notes_dir) {
            error!("Notes directory is not writable: {}", e);
            return Err(NoteError::DirectoryError {
                path: notes_dir,
                source: e,
            });
        }

        let mut storage = Self {
            notes_dir,
            notes: HashMap::new(),
            next_id: 1,
            last_load: LoadSummary::default(),
        };

        storage.load_notes()?;
        Ok(storage)
    }

    /// Loads all notes from disk into memory, replacing what was there.
    ///
    /// Files that fail to load are logged and reported in the summary; they
    /// never abort the load. Failing to list the root itself does, and leaves
    /// the store untouched.
    fn load_notes(&mut self) -> Result<()> {
        let mut notes_buffer: HashMap<u64, Note> = HashMap::new();
        let mut skipped_files = Vec::new();

        for entry in WalkDir::new(&self.notes_dir)
            .min_depth(1) // Skip the root directory
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    error!(
                        "Failed to read notes directory {}: {}",
                        self.notes_dir.display(),
                        e
                    );
                    return Err(NoteError::DirectoryError {
                        path: self.notes_dir.clone(),
                        source: e.into(),
                    });
                }
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    warn!("Failed to read directory entry {}: {}", path.display(), e);
                    skipped_files.push((path, e.to_string()));
                    continue;
                }
            };
            let path = entry.path();

            // Only process JSON files
            if !entry.file_type().is_file() || !path.extension().is_some_and(|ext| ext == "json")
            {
                trace!("Ignoring {}", path.display());
                continue;
            }

            match load_note_from_file(path) {
                Ok(note) => {
                    if let Some(previous) = notes_buffer.insert(note.id, note) {
                        warn!(
                            "Note {} found in more than one file, keeping {}",
                            previous.id,
                            path.display()
                        );
                    }
                }
                Err(e) => {
                    let error_msg = format!("Failed to load note from {}: {}", path.display(), e);
                    warn!("{}", error_msg);
                    skipped_files.push((path.to_path_buf(), error_msg));
                }
            }
        }

        // Never move the counter backwards over IDs this store already handed out
        let loaded_next = notes_buffer.keys().max().map_or(1, |max| max + 1);
        self.next_id = self.next_id.max(loaded_next);
        self.notes = notes_buffer;

        if !skipped_files.is_empty() {
            warn!(
                "Skipped {} unreadable note files in {}",
                skipped_files.len(),
                self.notes_dir.display()
            );
        }
        info!("Loaded {} notes", self.notes.len());

        self.last_load = LoadSummary {
            notes_loaded: self.notes.len(),
            next_id: self.next_id,
            skipped_files,
        };
        Ok(())
    }

    /// Summary of the most recent directory load
    pub fn last_load(&self) -> &LoadSummary {
        &self.last_load
    }

    /// The persistence root
    pub fn notes_dir(&self) -> &Path {
        &self.notes_dir
    }

    /// Number of notes held, archived included
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Creates a note, assigning the next ID and persisting it.
    ///
    /// Validation happens before an ID is taken, so rejected input never
    /// leaves a gap. A failed write removes the note again and gives the ID
    /// back.
    pub fn create_note(&mut self, title: &str, content: &str, tags: &[String]) -> Result<Note> {
        let mut note = Note::new(title, content, tags);
        note.validate()?;

        note.id = self.next_id;
        self.next_id += 1;
        self.notes.insert(note.id, note.clone());

        if let Err(e) = self.save_note(&note) {
            error!("Rolling back creation of note {}: {}", note.id, e);
            self.notes.remove(&note.id);
            self.next_id -= 1;
            return Err(e);
        }

        info!("Created note {}: {}", note.id, note.title);
        Ok(note)
    }

    /// Retrieves a note by its ID
    pub fn get_note(&self, id: u64) -> Result<Note> {
        trace!("Retrieving note by ID: {}", id);
        self.notes
            .get(&id)
            .cloned()
            .ok_or(NoteError::NoteNotFound { id })
    }

    /// Replaces title, content and tags of an existing note.
    ///
    /// The candidate values are validated first; an invalid update leaves the
    /// note untouched.
    pub fn update_note(
        &mut self,
        id: u64,
        title: &str,
        content: &str,
        tags: &[String],
    ) -> Result<Note> {
        info!("Updating note: {}", id);
        if !self.notes.contains_key(&id) {
            return Err(NoteError::NoteNotFound { id });
        }
        validate_fields(title, content)?;

        self.mutate(id, |note| {
            note.title = title.trim().to_string();
            note.content = content.trim().to_string();
            note.tags = normalize_tags(tags);
            note.touch();
        })
    }

    /// Deletes a note from disk and memory.
    ///
    /// The file goes first: if it cannot be removed the note stays indexed.
    pub fn delete_note(&mut self, id: u64) -> Result<()> {
        info!("Deleting note: {}", id);
        if !self.notes.contains_key(&id) {
            return Err(NoteError::NoteNotFound { id });
        }

        let file_path = self.get_note_path(id);
        match fs::remove_file(&file_path) {
            Ok(()) => debug!("Note file deleted: {}", file_path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    "Note file {} was already missing, removing note from index",
                    file_path.display()
                );
            }
            Err(e) => {
                error!("Failed to delete note file {}: {}", file_path.display(), e);
                return Err(NoteError::Io(e));
            }
        }

        self.notes.remove(&id);
        info!("Note {} successfully deleted", id);
        Ok(())
    }

    /// Adds a normalized tag. Adding a tag already present changes nothing
    /// but the timestamp.
    pub fn add_tag(&mut self, id: u64, tag: &str) -> Result<Note> {
        debug!("Adding tag '{}' to note {}", tag, id);
        self.mutate(id, |note| {
            note.add_tag(tag);
            note.touch();
        })
    }

    /// Removes a normalized tag. Removing an absent tag changes nothing but
    /// the timestamp.
    pub fn remove_tag(&mut self, id: u64, tag: &str) -> Result<Note> {
        debug!("Removing tag '{}' from note {}", tag, id);
        self.mutate(id, |note| {
            note.remove_tag(tag);
            note.touch();
        })
    }

    pub fn toggle_favorite(&mut self, id: u64) -> Result<Note> {
        debug!("Toggling favorite on note {}", id);
        self.mutate(id, Note::toggle_favorite)
    }

    /// Archives the note, or restores it if it is already archived.
    pub fn archive_note(&mut self, id: u64) -> Result<Note> {
        debug!("Toggling archive on note {}", id);
        self.mutate(id, Note::toggle_archived)
    }

    /// Every note, newest first
    pub fn get_all_notes(&self) -> Vec<Note> {
        self.collect_sorted(|_| true)
    }

    /// Notes that are not archived, newest first
    pub fn get_active_notes(&self) -> Vec<Note> {
        self.collect_sorted(|note| !note.is_archived)
    }

    /// Favorite notes, archived or not, newest first
    pub fn get_favorite_notes(&self) -> Vec<Note> {
        self.collect_sorted(|note| note.is_favorite)
    }

    /// Non-archived notes carrying `tag`, compared case-insensitively
    pub fn get_notes_by_tag(&self, tag: &str) -> Vec<Note> {
        let search_tag = normalize_tag(tag);
        let notes = self.collect_sorted(|note| !note.is_archived && note.has_tag(&search_tag));
        debug!("Found {} notes with tag: {}", notes.len(), search_tag);
        notes
    }

    /// Distinct tags across non-archived notes, sorted
    pub fn get_all_tags(&self) -> Vec<String> {
        self.distinct_tags().into_iter().collect()
    }

    /// Searches non-archived notes by title, content and tags.
    ///
    /// An empty query returns the active notes. Otherwise results are ordered
    /// by descending score; equal scores keep the newest-first order.
    pub fn search_notes(&self, query: &str) -> Vec<Note> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.get_active_notes();
        }

        info!("Searching notes with query: '{}'", query);

        let mut matched: Vec<(u32, Note)> = self
            .get_active_notes()
            .into_iter()
            .filter_map(|note| {
                let score = note.search_score(&query);
                (score > 0).then_some((score, note))
            })
            .collect();

        // sort_by_key is stable
        matched.sort_by_key(|(score, _)| Reverse(*score));

        debug!("Returning {} search results", matched.len());
        matched.into_iter().map(|(_, note)| note).collect()
    }

    /// Aggregate counts computed in a single pass
    pub fn get_stats(&self) -> NoteStats {
        let mut stats = NoteStats {
            total: self.notes.len(),
            ..NoteStats::default()
        };
        let mut tags = BTreeSet::new();

        for note in self.notes.values() {
            if note.is_archived {
                stats.archived += 1;
            } else {
                stats.active += 1;
                tags.extend(note.tags.iter().map(String::as_str));
            }

            if note.is_favorite {
                stats.favorites += 1;
            }
        }

        stats.tags = tags.len();
        stats
    }

    /// Applies `change` to a stored note and persists it, restoring the
    /// previous state if the write fails.
    fn mutate<F>(&mut self, id: u64, change: F) -> Result<Note>
    where
        F: FnOnce(&mut Note),
    {
        let note = self
            .notes
            .get_mut(&id)
            .ok_or(NoteError::NoteNotFound { id })?;

        let previous = note.clone();
        change(note);
        let updated = note.clone();

        if let Err(e) = self.save_note(&updated) {
            error!("Rolling back in-memory change to note {}: {}", id, e);
            self.notes.insert(id, previous);
            return Err(e);
        }

        Ok(updated)
    }

    /// Saves a note to its file using an atomic rename
    fn save_note(&self, note: &Note) -> Result<()> {
        let file_path = self.get_note_path(note.id);
        debug!("Saving note {} to {}", note.id, file_path.display());

        // Create a temporary file in the same directory (for atomic operation)
        let mut temp_file = NamedTempFile::new_in(&self.notes_dir).map_err(|e| {
            error!("Failed to create temporary file: {}", e);
            NoteError::Io(e)
        })?;

        trace!("Serializing note to JSON");
        let json = serde_json::to_string_pretty(note).map_err(|e| {
            error!("Failed to serialize note: {}", e);
            NoteError::Serialization(e)
        })?;

        temp_file.write_all(json.as_bytes()).map_err(|e| {
            error!("Failed to write to temporary file: {}", e);
            NoteError::Io(e)
        })?;

        temp_file.flush().map_err(|e| {
            error!("Failed to flush temporary file: {}", e);
            NoteError::Io(e)
        })?;

        temp_file.persist(&file_path).map_err(|e| {
            error!(
                "Failed to persist file {}: {}",
                file_path.display(),
                e.error
            );
            NoteError::Io(e.error)
        })?;

        trace!("Note {} written", note.id);
        Ok(())
    }

    /// Helper method to get the file path for a note
    fn get_note_path(&self, id: u64) -> PathBuf {
        self.notes_dir.join(format!("{}.json", id))
    }

    fn distinct_tags(&self) -> BTreeSet<String> {
        self.notes
            .values()
            .filter(|note| !note.is_archived)
            .flat_map(|note| note.tags.iter().cloned())
            .collect()
    }

    /// Clones the notes matching `keep`, newest created first
    fn collect_sorted<P>(&self, keep: P) -> Vec<Note>
    where
        P: Fn(&Note) -> bool,
    {
        let mut notes: Vec<Note> = self.notes.values().filter(|&note| keep(note)).cloned().collect();
        // Notes created within the same instant fall back to ID order
        notes.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        notes
    }
}
