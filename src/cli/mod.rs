//! Command-line interface, parsed with clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// wthrn - location and weather typeahead for the compose widget
#[derive(Parser)]
#[command(name = "wthrn")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    #[command(alias = "-d", alias = "--daemon")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Print the suggestions for a typeahead text as JSON
    #[command(alias = "t")]
    Typeahead {
        /// Text as typed, e.g. "France: Pari"
        #[arg(num_args = 0.., trailing_var_arg = true)]
        text: Vec<String>,
    },

    /// Print the weather card for a selection as JSON
    #[command(alias = "r")]
    Resolve {
        /// Selection JSON as returned in a suggestion's `text`
        text: String,
    },
}

impl Cli {
    /// `Serve` when no subcommand is given.
    #[must_use]
    pub fn command(self) -> Commands {
        self.command.unwrap_or(Commands::Serve)
    }
}
