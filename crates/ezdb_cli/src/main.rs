//! EzDB CLI
//!
//! Command-line tools for inspecting and editing an EzDB database folder.
//!
//! # Commands
//!
//! - `init` - Create an empty database
//! - `list` / `show` - Display keys and their content
//! - `add`, `rename`, `set`, `unset`, `describe`, `remove` - Edit keys
//! - `verify` - Compare the manifest with the record files
//! - `demo` - Fill a database with numbered keys

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// EzDB command-line database tools.
#[derive(Parser)]
#[command(name = "ezdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the database directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty database if none exists
    Init,

    /// List all keys
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show the properties and description of a key
    Show {
        /// Key name
        key: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Add a new key
    Add {
        /// Key name
        name: String,
    },

    /// Rename a key
    Rename {
        /// Current name
        old: String,
        /// New name
        new: String,
    },

    /// Set a property
    Set {
        /// Key name
        key: String,
        /// Property name
        property: String,
        /// Property value
        value: String,
    },

    /// Remove a property
    Unset {
        /// Key name
        key: String,
        /// Property name
        property: String,
    },

    /// Set or clear the description of a key
    Describe {
        /// Key name
        key: String,
        /// Description text (omit to clear)
        text: Option<String>,
    },

    /// Remove a key and delete its record file
    Remove {
        /// Key name
        key: String,
    },

    /// Verify that the manifest and the record files agree
    Verify,

    /// Add numbered keys and print the database
    Demo {
        /// Number of keys to add
        #[arg(short, long, default_value = "16")]
        count: usize,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Commands::Version = cli.command {
        println!("EzDB CLI v{}", env!("CARGO_PKG_VERSION"));
        println!("EzDB Core v{}", ezdb_core::VERSION);
        return Ok(());
    }

    let path = cli.path.ok_or("Database path required (--path)")?;

    match cli.command {
        Commands::Init => commands::edit::init(&path)?,
        Commands::List { format } => commands::inspect::list(&path, &format)?,
        Commands::Show { key, format } => commands::inspect::show(&path, &key, &format)?,
        Commands::Add { name } => commands::edit::add(&path, &name)?,
        Commands::Rename { old, new } => commands::edit::rename(&path, &old, &new)?,
        Commands::Set {
            key,
            property,
            value,
        } => commands::edit::set(&path, &key, &property, &value)?,
        Commands::Unset { key, property } => commands::edit::unset(&path, &key, &property)?,
        Commands::Describe { key, text } => commands::edit::describe(&path, &key, text)?,
        Commands::Remove { key } => commands::edit::remove(&path, &key)?,
        Commands::Verify => commands::verify::run(&path)?,
        Commands::Demo { count } => commands::demo::run(&path, count)?,
        Commands::Version => {}
    }

    Ok(())
}
