//! CLI argument definitions using clap derive macros.
//!
//! Each invocation performs one request's worth of work on a persisted
//! session. `next-request` crosses a request boundary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// flashsess - drive a persisted session request by request
#[derive(Parser, Debug)]
#[command(name = "flashsess")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Session ID to operate on
    #[arg(short, long, global = true, env = "FLASHSESS_SESSION")]
    pub session: Option<String>,

    /// Directory holding session files (overrides storage.session_dir)
    #[arg(long, global = true, env = "FLASHSESS_DIR")]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    // ─────────────────────────────────────────────────────────────────────────
    // Store access
    // ─────────────────────────────────────────────────────────────────────────
    /// Print the value at a dotted path
    Get {
        /// Dotted path, e.g. user.name
        path: String,
        /// Printed when the path is absent (JSON or plain string)
        #[arg(short, long)]
        default: Option<String>,
    },

    /// Set a value (JSON, or a plain string if it does not parse)
    Set {
        /// Dotted path
        path: String,
        /// Value to store
        value: String,
    },

    /// Check whether a non-null value exists at a path
    Has {
        /// Dotted path
        path: String,
    },

    /// Print and remove the value at a path
    Pull {
        /// Dotted path
        path: String,
    },

    /// Append a value to the array at a path
    Push {
        /// Dotted path
        path: String,
        /// Value to append
        value: String,
    },

    /// Remove the value at a path
    Forget {
        /// Dotted path
        path: String,
    },

    /// Print the whole session tree
    All,

    /// Remove every key from the session
    Clear,

    // ─────────────────────────────────────────────────────────────────────────
    // Flash data
    // ─────────────────────────────────────────────────────────────────────────
    /// Flash a value for this request and the next one
    Flash {
        /// Dotted key
        key: String,
        /// Value to flash
        value: String,
        /// Only keep the value for the current request
        #[arg(long)]
        now: bool,
    },

    /// Keep selected old flash keys for one more request
    Keep {
        /// Keys to keep
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Keep all old flash keys for one more request
    Reflash,

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Start the next request: expire old flash data, rotate new into old
    NextRequest,

    /// Show flash bookkeeping for the session
    Status {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Delete the session
    Destroy,

    /// Show version
    Version,
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
    fn test_parse_flash_now() {
        let cli = Cli::try_parse_from(["flashsess", "-s", "abc", "flash", "notice", "hi", "--now"])
            .unwrap();
        assert_eq!(cli.session.as_deref(), Some("abc"));
        match cli.command {
            Commands::Flash { key, value, now } => {
                assert_eq!(key, "notice");
                assert_eq!(value, "hi");
                assert!(now);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_dir_flag_reads_config_override_env() {
        let command = Cli::command();
        let dir = command
            .get_arguments()
            .find(|arg| arg.get_id() == "dir")
            .expect("dir argument");
        assert_eq!(
            dir.get_env().and_then(|env| env.to_str()),
            Some(crate::config::SESSION_DIR_ENV)
        );
    }

    #[test]
    fn test_keep_requires_keys() {
        assert!(Cli::try_parse_from(["flashsess", "keep"]).is_err());
        let cli = Cli::try_parse_from(["flashsess", "keep", "a", "b"]).unwrap();
        assert!(matches!(cli.command, Commands::Keep { ref keys } if keys.len() == 2));
    }
}
