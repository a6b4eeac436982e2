// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recap - a Telegram group-chat logging and summarization bot.
//!
//! This is the binary entry point. It loads configuration, sets up tracing and
//! dispatches to the selected subcommand.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod admin;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use recap_core::ChatId;

use crate::serve::ServeMode;

/// Recap - logs group chats and summarizes them on demand.
#[derive(Parser, Debug)]
#[command(name = "recap", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Run the bot and, when enabled, the health gateway.
    Serve,
    /// Run only the Telegram bot.
    Bot,
    /// Run only the health gateway.
    Web,
    /// Delete stored messages of one chat older than a number of days.
    Cleanup {
        /// Chat whose history is trimmed.
        #[arg(long, allow_hyphen_values = true)]
        chat_id: ChatId,
        /// Age threshold in days; defaults to `retention.default_days`.
        #[arg(long)]
        days: Option<u32>,
    },
    /// List known groups with their stored message counts.
    Groups {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match cli.config.as_deref() {
        Some(path) => recap_config::load_and_validate_path(path),
        None => recap_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            recap_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.bot.log_level);

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve::run_serve(config, ServeMode::All).await,
        Commands::Bot => serve::run_serve(config, ServeMode::BotOnly).await,
        Commands::Web => serve::run_serve(config, ServeMode::WebOnly).await,
        Commands::Cleanup { chat_id, days } => {
            admin::run_cleanup(&config, chat_id, days).await.map(|deleted| {
                println!("deleted {deleted} message(s) from chat {chat_id}");
            })
        }
        Commands::Groups { json } => admin::run_groups(&config, json).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber. `RUST_LOG` overrides the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("recap={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the stats epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["recap"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn cleanup_accepts_negative_chat_ids() {
        let cli =
            Cli::try_parse_from(["recap", "cleanup", "--chat-id", "-1001234", "--days", "7"])
                .unwrap();
        assert_eq!(
            cli.command,
            Some(Commands::Cleanup {
                chat_id: -1001234,
                days: Some(7),
            })
        );
    }

    #[test]
    fn cleanup_requires_chat_id() {
        assert!(Cli::try_parse_from(["recap", "cleanup"]).is_err());
    }

    #[test]
    fn config_flag_is_global() {
        let cli =
            Cli::try_parse_from(["recap", "groups", "--json", "--config", "/tmp/recap.toml"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/recap.toml")));
        assert_eq!(cli.command, Some(Commands::Groups { json: true }));
    }
}
