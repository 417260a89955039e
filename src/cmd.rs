use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the repository scaffold
    Init {
        /// Root path (defaults to the current directory)
        root_path: Option<PathBuf>,
    },

    /// Print an object's payload
    CatFile {
        /// Pretty-print the object's content
        #[arg(short = 'p')]
        pretty: bool,

        /// Object id, 40 hex characters
        object: String,
    },

    /// Hash a file as a blob object
    HashObject {
        /// Write the object to the store as well
        #[arg(short = 'w')]
        write: bool,

        /// File to hash
        file: PathBuf,
    },

    /// List a tree object's entries
    LsTree {
        /// Print entry names only
        #[arg(long)]
        name_only: bool,

        /// Tree object id
        object: String,
    },

    /// Store the working directory as tree objects
    WriteTree {},

    /// Create a commit object for a stored tree
    CommitTree {
        /// Tree object id
        tree: String,

        /// Parent commit id
        #[arg(short = 'p')]
        parent: Option<String>,

        /// Commit message
        #[arg(short = 'm')]
        message: String,
    },
}
