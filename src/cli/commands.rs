//! Command and subcommand definitions.

use clap::{Args, Subcommand};

/// Key and value arguments shared by `add` and `update`.
#[derive(Args, Debug, Clone, Default)]
pub struct ValueArgs {
    /// Key path inside the secret (e.g. db.password, hosts.0, smtp\.host)
    #[arg(short, long)]
    pub key: Option<String>,

    /// Value to store
    #[arg(short, long)]
    pub value: Option<String>,

    /// Parse the value as JSON instead of storing it as a string
    #[arg(long)]
    pub json: bool,
}

/// Operations available in awssm.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a new key (fails if the key already exists)
    Add(ValueArgs),
    /// Print the secret's metadata
    Describe,
    /// Print the value of a key
    Read {
        /// Key path inside the secret
        #[arg(short, long)]
        key: Option<String>,
    },
    /// Remove a key (fails if the key does not exist)
    Remove {
        /// Key path inside the secret
        #[arg(short, long)]
        key: Option<String>,
    },
    /// Print the whole secret document
    Show,
    /// Change the value of an existing key (fails if the key does not exist)
    Update(ValueArgs),
}
