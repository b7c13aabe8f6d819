//! CLI module for the quicknotes application
//!
//! This module handles the command-line interface for interacting with the
//! note storage system.
use std::{
    io::{stdin, stdout, Write},
    sync::Arc,
};

use console::style;
use log::{debug, info};
use tokio::sync::Mutex;

use crate::{
    parse_note_id, parse_tags, server, Commands, Config, Note, NoteError, NoteStats,
    NoteStorage, Result,
};

const SUMMARY_LEN: usize = 80;

/// CLI Application handler - processes CLI commands and interfaces with NoteStorage
pub struct App {
    /// The note storage backend
    note_storage: Arc<Mutex<NoteStorage>>,

    /// Application configuration
    config: Config,

    /// Whether to display verbose output
    verbose: bool,
}

impl App {
    /// Create a new CLI application with the given storage backend and config
    pub fn new(note_storage: Arc<Mutex<NoteStorage>>, config: Config, verbose: bool) -> Self {
        Self {
            note_storage,
            config,
            verbose,
        }
    }

    /// Run the CLI application with the given command
    pub async fn run(&self, command: Commands) -> Result<()> {
        if self.verbose {
            let storage = self.note_storage.lock().await;
            println!(
                "{}",
                style(format!(
                    "Using notes directory {} ({} notes)",
                    storage.notes_dir().display(),
                    storage.len()
                ))
                .dim()
            );
        }

        match command {
            Commands::Create {
                title,
                content,
                tags,
            } => self.create_note(&title, &content, tags.as_deref()).await?,

            Commands::List {
                all,
                favorites,
                tag,
                limit,
                json,
            } => self.list_notes(all, favorites, tag, limit, json).await?,

            Commands::View { id, json } => self.view_note(&id, json).await?,

            Commands::Edit {
                id,
                title,
                content,
                tags,
            } => self.edit_note(&id, title, content, tags).await?,

            Commands::Delete { id, force } => self.handle_delete(&id, force).await?,

            Commands::Search { query, limit, json } => {
                self.handle_search(&query, limit, json).await?
            }

            Commands::Stats => self.show_stats().await,

            Commands::Tag {
                id,
                tags,
                remove,
                list,
            } => self.handle_tag(id, tags, remove, list).await?,

            Commands::Favorite { id } => self.toggle_favorite(&id).await?,

            Commands::Archive { id } => self.toggle_archive(&id).await?,

            Commands::Serve { address, port } => self.serve(address, port).await?,
        }

        Ok(())
    }

    async fn create_note(&self, title: &str, content: &str, tags: Option<&str>) -> Result<()> {
        let parsed_tags = parse_tags(tags);
        let note = self
            .note_storage
            .lock()
            .await
            .create_note(title, content, &parsed_tags)?;

        println!("{}", style("Note created successfully!").green());
        println!("ID: {}", note.id);
        println!("Title: {}", note.title);
        println!("Content: {}", note.content);
        if !note.tags.is_empty() {
            println!("Tags: {}", note.tags.join(", "));
        }
        println!("Created: {}", note.created_at.format("%Y-%m-%d %H:%M:%S"));
        Ok(())
    }

    /// List notes according to provided filters and options
    async fn list_notes(
        &self,
        all: bool,
        favorites: bool,
        tag: Option<String>,
        limit: usize,
        json: bool,
    ) -> Result<()> {
        let mut notes = {
            let storage = self.note_storage.lock().await;
            match (favorites, tag, all) {
                (true, _, _) => storage.get_favorite_notes(),
                (false, Some(tag), _) => storage.get_notes_by_tag(&tag),
                (false, None, true) => storage.get_all_notes(),
                (false, None, false) => storage.get_active_notes(),
            }
        };

        apply_limit(&mut notes, limit);

        if json {
            println!("{}", serde_json::to_string_pretty(&notes)?);
            return Ok(());
        }

        if notes.is_empty() {
            println!("No notes found.");
            return Ok(());
        }

        println!(
            "{}",
            style(format!("Notes ({} found):", notes.len())).cyan()
        );
        self.display_notes(&notes);
        Ok(())
    }

    async fn view_note(&self, id: &str, json: bool) -> Result<()> {
        let id = parse_note_id(id)?;
        let note = self.note_storage.lock().await.get_note(id)?;

        if json {
            println!("{}", serde_json::to_string_pretty(&note)?);
        } else {
            println!("{}", format_note_detail(&note));
        }
        Ok(())
    }

    async fn edit_note(
        &self,
        id: &str,
        title: Option<String>,
        content: Option<String>,
        tags: Option<String>,
    ) -> Result<()> {
        let id = parse_note_id(id)?;
        if title.is_none() && content.is_none() && tags.is_none() {
            return Err(NoteError::invalid_command(
                "nothing to change: pass --title, --content or --tags",
            ));
        }

        let mut storage = self.note_storage.lock().await;
        let current = storage.get_note(id)?;

        let title = title.unwrap_or(current.title);
        let content = content.unwrap_or(current.content);
        let tags = match tags {
            Some(raw) => parse_tags(Some(raw.as_str())),
            None => current.tags,
        };

        let note = storage.update_note(id, &title, &content, &tags)?;
        println!(
            "{}",
            style(format!("Note {} updated successfully", note.id)).green()
        );
        Ok(())
    }

    async fn handle_delete(&self, id: &str, force: bool) -> Result<()> {
        let id = parse_note_id(id)?;

        // Fetch first so the prompt can show what is about to go
        let note = self.note_storage.lock().await.get_note(id)?;

        if !force {
            println!("{}", style("About to delete note:").yellow());
            println!("{}", format_note_summary(&note));

            print!("Are you sure? (y/N): ");
            stdout().flush()?;

            let mut input = String::new();
            stdin().read_line(&mut input)?;

            if !is_confirmation(&input) {
                println!("{}", style("Deletion cancelled.").green());
                return Ok(());
            }
        }

        self.note_storage.lock().await.delete_note(id)?;

        println!(
            "{}",
            style(format!(
                "Note '{}' (ID: {}) deleted successfully.",
                note.title, note.id
            ))
            .green()
        );
        Ok(())
    }

    async fn handle_search(&self, query: &str, limit: usize, json: bool) -> Result<()> {
        let mut results = self.note_storage.lock().await.search_notes(query);
        apply_limit(&mut results, limit);

        if json {
            println!("{}", serde_json::to_string_pretty(&results)?);
            return Ok(());
        }

        if results.is_empty() {
            println!("No notes found matching '{}'", query);
            return Ok(());
        }

        println!(
            "{}",
            style(format!(
                "Search results for '{}' ({} found):",
                query,
                results.len()
            ))
            .cyan()
        );
        self.display_notes(&results);
        Ok(())
    }

    async fn show_stats(&self) {
        let stats = self.note_storage.lock().await.get_stats();
        println!("{}", format_stats(&stats));
    }

    async fn handle_tag(
        &self,
        id: Option<String>,
        tags: Option<String>,
        remove: Option<String>,
        list: bool,
    ) -> Result<()> {
        if list {
            return self.list_all_tags().await;
        }

        let id = match id {
            Some(raw) => parse_note_id(&raw)?,
            None => {
                return Err(NoteError::invalid_command(
                    "tag command requires a note ID (or --list)",
                ))
            }
        };

        let mut storage = self.note_storage.lock().await;

        if let Some(tag) = remove {
            let note = storage.remove_tag(id, &tag)?;
            println!(
                "{}",
                style(format!("Removed tag '{}' from note '{}'", tag, note.title)).green()
            );
            return Ok(());
        }

        let tags = parse_tags(tags.as_deref());
        if tags.is_empty() {
            return Err(NoteError::invalid_command(
                "tag command requires note ID and tags",
            ));
        }

        for tag in tags {
            let note = storage.add_tag(id, &tag)?;
            println!(
                "{}",
                style(format!("Added tag '{}' to note '{}'", tag, note.title)).green()
            );
        }
        Ok(())
    }

    async fn list_all_tags(&self) -> Result<()> {
        let storage = self.note_storage.lock().await;
        let tags = storage.get_all_tags();

        if tags.is_empty() {
            println!("No tags found.");
            return Ok(());
        }

        println!(
            "{}",
            style(format!("All tags ({} found):", tags.len())).cyan()
        );
        for tag in tags {
            let count = storage.get_notes_by_tag(&tag).len();
            println!("  {}", style(format!("{} ({} notes)", tag, count)).green());
        }
        Ok(())
    }

    async fn toggle_favorite(&self, id: &str) -> Result<()> {
        let id = parse_note_id(id)?;
        let note = self.note_storage.lock().await.toggle_favorite(id)?;
        let state = if note.is_favorite {
            "marked as favorite"
        } else {
            "removed from favorites"
        };
        println!(
            "{}",
            style(format!("Note '{}' {}", note.title, state)).green()
        );
        Ok(())
    }

    async fn toggle_archive(&self, id: &str) -> Result<()> {
        let id = parse_note_id(id)?;
        let note = self.note_storage.lock().await.archive_note(id)?;
        let state = if note.is_archived {
            "archived"
        } else {
            "restored from archive"
        };
        println!(
            "{}",
            style(format!("Note '{}' {}", note.title, state)).green()
        );
        Ok(())
    }

    async fn serve(&self, address: Option<String>, port: Option<u16>) -> Result<()> {
        let mut config = self.config.clone();
        if let Some(address) = address {
            config.server_address = address;
        }
        if let Some(port) = port {
            config.server_port = port;
        }

        info!("Starting web server on {}", config.bind_address());
        server::serve(Arc::clone(&self.note_storage), &config.bind_address()).await
    }

    /// Display notes separated by a rule sized to the terminal
    fn display_notes(&self, notes: &[Note]) {
        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);
        debug!("Rendering {} notes at width {}", notes.len(), term_width);

        for (i, note) in notes.iter().enumerate() {
            if i > 0 {
                println!("{}", style("-".repeat(term_width.min(50))).dim());
            }
            println!("{}", format_note_summary(note));
        }
    }
}

/// Truncate to `limit` entries; 0 keeps everything
fn apply_limit(notes: &mut Vec<Note>, limit: usize) {
    if limit > 0 && notes.len() > limit {
        notes.truncate(limit);
    }
}

fn is_confirmation(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Multi-line summary used by list and search output
pub fn format_note_summary(note: &Note) -> String {
    let mut status = String::new();
    if note.is_archived {
        status.push_str("[archived] ");
    }
    if note.is_favorite {
        status.push_str("[favorite] ");
    }

    let title = if note.is_favorite {
        style(&note.title).bold().yellow()
    } else {
        style(&note.title).bold()
    };

    let mut lines = vec![
        format!("{}[{}] {}", status, note.id, title),
        format!("   {}", note.summary(SUMMARY_LEN)),
    ];

    if !note.tags.is_empty() {
        lines.push(format!(
            "   {}",
            style(format!("Tags: {}", note.tags.join(", "))).green()
        ));
    }

    lines.push(format!(
        "   {}",
        style(format!(
            "Created: {} | Updated: {}",
            note.created_at.format("%Y-%m-%d %H:%M"),
            note.updated_at.format("%Y-%m-%d %H:%M")
        ))
        .dim()
    ));

    lines.join("\n")
}

/// Full rendering used by `view`
pub fn format_note_detail(note: &Note) -> String {
    let rule = "-".repeat(50);
    let mut lines = vec![
        style("Note Details").cyan().to_string(),
        style("=".repeat(50)).cyan().to_string(),
    ];

    let mut status = Vec::new();
    if note.is_archived {
        status.push("Archived");
    }
    if note.is_favorite {
        status.push("Favorite");
    }
    if !status.is_empty() {
        lines.push(style(format!("Status: {}", status.join(", "))).yellow().to_string());
    }

    lines.push(format!("ID: {}", note.id));
    lines.push(format!("Title: {}", style(&note.title).bold()));
    lines.push(String::new());
    lines.push("Content:".to_string());
    lines.push(rule.clone());
    lines.push(note.content.clone());
    lines.push(rule);

    if !note.tags.is_empty() {
        lines.push(style(format!("Tags: {}", note.tags.join(", "))).green().to_string());
    }

    lines.push(
        style(format!(
            "Created: {}",
            note.created_at.format("%Y-%m-%d %H:%M:%S")
        ))
        .dim()
        .to_string(),
    );
    lines.push(
        style(format!(
            "Updated: {}",
            note.updated_at.format("%Y-%m-%d %H:%M:%S")
        ))
        .dim()
        .to_string(),
    );

    lines.join("\n")
}

/// Statistics block with active and favorite rates
pub fn format_stats(stats: &NoteStats) -> String {
    let mut lines = vec![
        style("Note Statistics").cyan().to_string(),
        style("=".repeat(31)).cyan().to_string(),
        format!("Total Notes: {}", stats.total),
        style(format!("Active Notes: {}", stats.active)).green().to_string(),
        style(format!("Archived Notes: {}", stats.archived)).yellow().to_string(),
        style(format!("Favorite Notes: {}", stats.favorites)).magenta().to_string(),
        style(format!("Unique Tags: {}", stats.tags)).blue().to_string(),
    ];

    if stats.total > 0 {
        let active_rate = stats.active as f64 / stats.total as f64 * 100.0;
        let favorite_rate = stats.favorites as f64 / stats.total as f64 * 100.0;
        lines.push(String::new());
        lines.push(style(format!("Active Rate: {:.1}%", active_rate)).dim().to_string());
        lines.push(style(format!("Favorite Rate: {:.1}%", favorite_rate)).dim().to_string());
    }

    lines.join("\n")
}
