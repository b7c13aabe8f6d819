use std::{fs, path::Path};

use log::{debug, error, trace};

use crate::{Note, NoteError, Result};

/// Helper method to load a single note from file
pub fn load_note_from_file(path: &Path) -> Result<Note> {
    debug!("Loading note from file: {}", path.display());
    let content = fs::read_to_string(path).map_err(|e| {
        error!("Failed to open note file {}: {}", path.display(), e);
        NoteError::Io(e)
    })?;

    let note: Note = serde_json::from_str(&content)?;

    // IDs are assigned from 1, so 0 only appears in hand-edited files
    if note.id == 0 {
        let error_mgs = format!("Note from {} has an invalid ID 0", path.display());
        error!("{}", error_mgs);
        return Err(NoteError::InvalidFormat { message: error_mgs });
    }

    trace!("Successfully loaded note: {}", note.id);
    Ok(note)
}

/// Lowercases and trims a single tag.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

// Helper method for parsing tags
pub fn parse_tags(tags: Option<&str>) -> Vec<String> {
    tags.map(|t| {
        t.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

/// Parses a note ID given on the command line or through the console.
pub fn parse_note_id(raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| NoteError::invalid_command(format!("invalid note ID: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_tags() {
        assert_eq!(
            parse_tags(Some(" go, data-structures ,,slices")),
            vec!["go", "data-structures", "slices"]
        );
        assert!(parse_tags(None).is_empty());
        assert!(parse_tags(Some(" , ")).is_empty());
    }

    #[test]
    fn test_parse_note_id() {
        assert_eq!(parse_note_id("12").unwrap(), 12);
        assert_eq!(parse_note_id(" 3 ").unwrap(), 3);
        assert!(matches!(
            parse_note_id("abc"),
            Err(NoteError::InvalidCommand { .. })
        ));
        assert!(parse_note_id("0").is_err());
        assert!(parse_note_id("-1").is_err());
    }

    #[test]
    fn test_load_note_from_file_rejects_zero_id() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("0.json");
        let mut note = Note::new("t", "c", &[]);
        note.id = 0;
        fs::write(&path, serde_json::to_string_pretty(&note).unwrap()).unwrap();

        assert!(matches!(
            load_note_from_file(&path),
            Err(NoteError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_load_note_from_file_reports_bad_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("1.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            load_note_from_file(&path),
            Err(NoteError::Serialization(_))
        ));
    }
}
