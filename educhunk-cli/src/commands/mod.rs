//! CLI command implementations

use anyhow::Result;
use clap::Subcommand;
use educhunk_core::{list_pattern_tables, Category, Dimension};

pub mod generate_config;
pub mod process;
pub mod validate;

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Chunk textbook chapters into scored learning units
    Process(process::ProcessArgs),

    /// List available components
    List {
        #[command(subcommand)]
        subcommand: ListCommands,
    },

    /// Check a pattern table and its rule examples
    Validate(validate::ValidateArgs),

    /// Write a commented configuration file template
    GenerateConfig(generate_config::GenerateConfigArgs),
}

/// List subcommands
#[derive(Debug, Subcommand)]
pub enum ListCommands {
    /// List embedded pattern tables
    Tables,

    /// List element categories
    Categories,

    /// List quality dimensions
    Dimensions,

    /// List available output formats
    Formats,
}

impl Commands {
    /// Run the selected command
    pub fn execute(&self) -> Result<()> {
        match self {
            Commands::Process(args) => args.execute(),
            Commands::List { subcommand } => subcommand.execute(),
            Commands::Validate(args) => args.execute(),
            Commands::GenerateConfig(args) => args.execute(),
        }
    }
}

impl ListCommands {
    /// Print the requested listing
    pub fn execute(&self) -> Result<()> {
        for line in self.lines() {
            println!("{line}");
        }
        Ok(())
    }

    fn lines(&self) -> Vec<String> {
        match self {
            ListCommands::Tables => list_pattern_tables()
                .into_iter()
                .map(str::to_string)
                .collect(),
            ListCommands::Categories => Category::ALL.iter().map(|c| c.to_string()).collect(),
            ListCommands::Dimensions => Dimension::ALL.iter().map(|d| d.to_string()).collect(),
            ListCommands::Formats => vec![
                "text      One line per chunk with its quality".to_string(),
                "json      Array of documents with full chunk records".to_string(),
                "markdown  One section per chunk with a score table".to_string(),
            ],
        }
    }
}
