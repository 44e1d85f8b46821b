pub mod commands;
pub mod context;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Keep users, keys and repository access lists consistent.
#[derive(Parser, Debug)]
#[command(name = "keywarden", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// State directory holding config.toml, the stores and the audit log
    #[arg(long, global = true, env = "KEYWARDEN_DIR")]
    pub dir: Option<String>,

    /// authorized_keys file to manage (overrides config.toml)
    #[arg(long, global = true, env = "KEYWARDEN_AUTHORIZED_KEYS")]
    pub authorized_keys: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the state directory with a default configuration
    Init {
        /// Command forced on every managed key
        #[arg(long, default_value = "/usr/local/bin/keywarden-serve")]
        bin_path: String,
    },

    /// Manage users and their keys
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage repository access lists
    Repo {
        #[command(subcommand)]
        action: RepoAction,
    },

    /// Show operation history
    Log {
        /// Filter by author
        #[arg(long)]
        author: Option<String>,
        /// Filter by user or repository name
        #[arg(long)]
        subject: Option<String>,
        /// Filter entries since this date (ISO 8601)
        #[arg(long)]
        since: Option<String>,
        /// Show last N entries
        #[arg(long)]
        last: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserAction {
    /// Create a user and authorize its keys
    Create {
        /// User name (ASCII letters, digits, '.' and '@')
        name: String,
        /// Public key to authorize; repeat for several
        #[arg(short, long = "key")]
        keys: Vec<String>,
    },
    /// Remove a user, its repository access and its keys
    Remove {
        name: String,
    },
    /// Add a public key to an existing user
    AddKey {
        name: String,
        key: String,
    },
    /// List users and key fingerprints
    List,
}

#[derive(Subcommand, Debug)]
pub enum RepoAction {
    /// Register a repository with its initial users
    Create {
        name: String,
        /// User with access; repeat for several
        #[arg(short, long = "user", required = true)]
        users: Vec<String>,
    },
    /// List repositories and their users
    List,
}
