//! Name-based command dispatch behind `/api/cli/execute`.
//!
//! The browser console sends a command name and positional string arguments;
//! each command maps onto exactly one storage operation.

use serde::Serialize;
use serde_json::{json, Value};

use crate::{parse_note_id, NoteError, NoteStorage, Result};

/// One entry of the console help listing
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CommandHelp {
    pub name: &'static str,
    pub description: &'static str,
    pub example: &'static str,
}

pub const COMMANDS: &[CommandHelp] = &[
    CommandHelp {
        name: "list",
        description: "List all active notes",
        example: "quicknotes.list()",
    },
    CommandHelp {
        name: "create",
        description: "Create a new note (args: title, content, tags...)",
        example: "quicknotes.create('My Note', 'Note content', 'tag1', 'tag2')",
    },
    CommandHelp {
        name: "view",
        description: "View a specific note (args: id)",
        example: "quicknotes.view(1)",
    },
    CommandHelp {
        name: "delete",
        description: "Delete a note (args: id)",
        example: "quicknotes.delete(1)",
    },
    CommandHelp {
        name: "search",
        description: "Search notes (args: query)",
        example: "quicknotes.search('important')",
    },
    CommandHelp {
        name: "stats",
        description: "Get statistics",
        example: "quicknotes.stats()",
    },
    CommandHelp {
        name: "tags",
        description: "List all tags of active notes",
        example: "quicknotes.tags()",
    },
    CommandHelp {
        name: "favorite",
        description: "Toggle the favorite flag (args: id)",
        example: "quicknotes.favorite(1)",
    },
    CommandHelp {
        name: "archive",
        description: "Archive or unarchive a note (args: id)",
        example: "quicknotes.archive(1)",
    },
    CommandHelp {
        name: "tag",
        description: "Tag operations (args: add/remove, note_id, tag)",
        example: "quicknotes.tag('add', 1, 'important')",
    },
];

/// Runs a console command and returns its JSON result.
pub fn execute_command(storage: &mut NoteStorage, command: &str, args: &[String]) -> Result<Value> {
    let value = match command {
        "list" => json!(storage.get_active_notes()),
        "create" => {
            let [title, content, tags @ ..] = args else {
                return Err(NoteError::invalid_command(
                    "create requires at least title and content",
                ));
            };
            json!(storage.create_note(title, content, tags)?)
        }
        "view" => json!(storage.get_note(id_arg(args, "view")?)?),
        "delete" => {
            storage.delete_note(id_arg(args, "delete")?)?;
            json!({ "message": "Note deleted successfully" })
        }
        "search" => {
            let query = args
                .first()
                .ok_or_else(|| NoteError::invalid_command("search requires query"))?;
            json!(storage.search_notes(query))
        }
        "stats" => json!(storage.get_stats()),
        "tags" => json!(storage.get_all_tags()),
        "favorite" => json!(storage.toggle_favorite(id_arg(args, "favorite")?)?),
        "archive" => json!(storage.archive_note(id_arg(args, "archive")?)?),
        "tag" => {
            let [operation, id, tag, ..] = args else {
                return Err(NoteError::invalid_command(
                    "tag requires operation, note ID, and tag",
                ));
            };
            let id = parse_note_id(id)?;
            match operation.as_str() {
                "add" => json!(storage.add_tag(id, tag)?),
                "remove" => json!(storage.remove_tag(id, tag)?),
                other => {
                    return Err(NoteError::invalid_command(format!(
                        "invalid operation: {}",
                        other
                    )))
                }
            }
        }
        other => {
            return Err(NoteError::invalid_command(format!(
                "unknown command: {}",
                other
            )))
        }
    };

    Ok(value)
}

fn id_arg(args: &[String], command: &str) -> Result<u64> {
    let raw = args
        .first()
        .ok_or_else(|| NoteError::invalid_command(format!("{} requires note ID", command)))?;
    parse_note_id(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn storage() -> (TempDir, NoteStorage) {
        let dir = tempdir().unwrap();
        let storage = NoteStorage::open(dir.path().join("notes")).unwrap();
        (dir, storage)
    }

    #[test]
    fn test_create_view_and_tag() {
        let (_dir, mut storage) = storage();

        let created = execute_command(
            &mut storage,
            "create",
            &args(&["My Note", "Note content", "Tag1", "tag2"]),
        )
        .unwrap();
        assert_eq!(created["id"], 1);
        assert_eq!(created["tags"], json!(["tag1", "tag2"]));

        let viewed = execute_command(&mut storage, "view", &args(&["1"])).unwrap();
        assert_eq!(viewed["title"], "My Note");

        let tagged = execute_command(&mut storage, "tag", &args(&["add", "1", "extra"])).unwrap();
        assert_eq!(tagged["tags"], json!(["tag1", "tag2", "extra"]));

        let untagged =
            execute_command(&mut storage, "tag", &args(&["remove", "1", "tag1"])).unwrap();
        assert_eq!(untagged["tags"], json!(["tag2", "extra"]));
    }

    #[test]
    fn test_stats_and_delete() {
        let (_dir, mut storage) = storage();
        execute_command(&mut storage, "create", &args(&["a", "b"])).unwrap();
        execute_command(&mut storage, "archive", &args(&["1"])).unwrap();

        let stats = execute_command(&mut storage, "stats", &[]).unwrap();
        assert_eq!(stats["total"], 1);
        assert_eq!(stats["archived"], 1);

        let deleted = execute_command(&mut storage, "delete", &args(&["1"])).unwrap();
        assert_eq!(deleted["message"], "Note deleted successfully");
        assert!(storage.is_empty());
    }

    #[test]
    fn test_usage_errors() {
        let (_dir, mut storage) = storage();

        for (command, arguments) in [
            ("create", args(&["only title"])),
            ("view", args(&[])),
            ("view", args(&["abc"])),
            ("search", args(&[])),
            ("tag", args(&["add", "1"])),
            ("tag", args(&["rename", "1", "x"])),
            ("launch", args(&[])),
        ] {
            let result = execute_command(&mut storage, command, &arguments);
            assert!(
                matches!(result, Err(NoteError::InvalidCommand { .. })),
                "{} {:?} should be a usage error",
                command,
                arguments
            );
        }

        assert!(matches!(
            execute_command(&mut storage, "view", &args(&["9"])),
            Err(NoteError::NoteNotFound { id: 9 })
        ));
    }
}
