use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vidshelf")]
#[command(about = "Organize YouTube videos into collections and pin your favourites")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding the shelf data (overrides VIDSHELF_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// User id to act as (overrides VIDSHELF_USER)
    #[arg(long, global = true)]
    pub user: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new collection
    Create {
        name: String,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Rename a collection
    Rename { collection: String, name: String },

    /// Delete a collection together with its pin and videos
    Delete { collection: String },

    /// List all collections
    Collections,

    /// Add a video (URL or ID) to a collection
    Add { collection: String, video: String },

    /// Remove a video from a collection
    Remove { collection: String, video: String },

    /// List the videos in a collection
    Videos { collection: String },

    /// Open a collection: record the visit and list its videos
    Open { collection: String },

    /// Pin a collection for quick access
    Pin { collection: String },

    /// Unpin a collection
    Unpin { collection: String },

    /// Unpin `old` and pin `new` at the end of the list
    Replace { old: String, new: String },

    /// Move the pin at position FROM to position TO (1-based, as listed)
    Move { from: usize, to: usize },

    /// List pinned collections
    Pinned,

    /// List recently opened collections that are not pinned
    Recent,

    /// Open TUI interface
    Tui,
}
