use std::path::PathBuf;

use clap::Parser;

use crate::Commands;

/// Main CLI application arguments and command structure
#[derive(Parser, Debug)]
#[clap(
    name = "quicknotes",
    version,
    about = "A simple note-taking application with a CLI and a REST API"
)]
pub struct Cli {
    /// Path to the configuration file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Path to the notes directory
    #[clap(long, value_parser)]
    pub notes_dir: Option<String>,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands for the quicknotes application
    #[clap(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_create_with_tags() {
        let cli = Cli::try_parse_from([
            "quicknotes",
            "--notes-dir",
            "/tmp/n",
            "create",
            "Go Slices",
            "Slices are dynamic arrays",
            "--tags",
            "go,data-structures",
        ])
        .unwrap();

        assert_eq!(cli.notes_dir.as_deref(), Some("/tmp/n"));
        match cli.command {
            Commands::Create {
                title,
                content,
                tags,
            } => {
                assert_eq!(title, "Go Slices");
                assert_eq!(content, "Slices are dynamic arrays");
                assert_eq!(tags.as_deref(), Some("go,data-structures"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_tag_remove() {
        let cli = Cli::try_parse_from(["quicknotes", "tag", "3", "--remove", "practice"]).unwrap();
        match cli.command {
            Commands::Tag {
                id, tags, remove, list,
            } => {
                assert_eq!(id.as_deref(), Some("3"));
                assert!(tags.is_none());
                assert_eq!(remove.as_deref(), Some("practice"));
                assert!(!list);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
