//! # ChatAdv relay CLI (`chatadv`)
//!
//! Runs the chat relay server and offers a couple of terminal helpers around
//! the same pipeline.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `chatadv serve` | Start the HTTP relay |
//! | `chatadv ask "<message>"` | Relay one turn from the terminal |
//! | `chatadv check` | Resolve configuration and print a summary |
//!
//! ## Examples
//!
//! ```bash
//! # Start the relay with settings from ./config/chatadv.toml and ./.env
//! chatadv serve
//!
//! # Ask a question, then continue the same conversation
//! chatadv ask "What are the prerequisites for ISA 401?"
//! chatadv ask "And for ISA 491?" --previous-response-id resp_abc123
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use chatadv_relay::config::{self, Config, EnvFile, RelaySettings};
use chatadv_relay::relay::Relay;
use chatadv_relay::request::ChatRequest;
use chatadv_relay::server;

/// ChatAdv relay: forwards chat turns to the OpenAI Responses API with
/// file search over a configured vector store.
#[derive(Parser)]
#[command(name = "chatadv", version, about)]
struct Cli {
    /// Path to the configuration file (TOML). Optional; defaults apply when absent.
    #[arg(long, global = true, default_value = "./config/chatadv.toml")]
    config: PathBuf,

    /// Path to a `.env` file loaded before reading the environment.
    #[arg(long, global = true, default_value = ".env")]
    env_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP relay.
    Serve {
        /// Override `[server].bind`.
        #[arg(long)]
        bind: Option<String>,
    },

    /// Relay a single message and print the answer.
    Ask {
        message: String,

        /// Continue the conversation started by an earlier reply.
        #[arg(long)]
        previous_response_id: Option<String>,

        /// Print the full reply as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Resolve configuration and print a summary (secrets redacted).
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // `.env` may set RUST_LOG, so it is read before the subscriber starts.
    let env_file = config::load_env_file(&cli.env_file);

    // Logs go to stderr so `ask --json` output stays parseable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = cli.env_file.display();
    match env_file {
        EnvFile::Loaded => tracing::debug!(path = %path, "loaded env file"),
        EnvFile::Missing => tracing::debug!(path = %path, "no env file"),
        EnvFile::Failed(error) => {
            tracing::warn!(path = %path, error = %error, "failed to load env file")
        }
    }

    let mut cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                cfg.server.bind = bind;
            }
            let relay = resolve(&cfg).and_then(Relay::new);
            server::run_server(&cfg, relay).await?;
        }
        Commands::Ask {
            message,
            previous_response_id,
            json,
        } => {
            let relay = resolve(&cfg).and_then(Relay::new)?;
            let request = ChatRequest::new(message, previous_response_id)?;
            let reply = relay.chat(&request).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&reply)?);
            } else {
                println!("{}", reply.text.as_deref().unwrap_or("(no text in reply)"));
                if let Some(id) = &reply.previous_response_id {
                    println!();
                    println!("previous_response_id: {}", id);
                }
            }
        }
        Commands::Check => {
            let settings = resolve(&cfg).context("configuration is incomplete")?;
            print_summary(&cfg, &settings);
        }
    }

    Ok(())
}

fn resolve(cfg: &Config) -> Result<RelaySettings, chatadv_relay::error::RelayError> {
    RelaySettings::resolve(cfg, Path::new("."), |key| std::env::var(key).ok())
}

fn print_summary(cfg: &Config, settings: &RelaySettings) {
    println!("Configuration OK");
    println!("  bind:                   {}", cfg.server.bind);
    println!("  chat path:              {}", cfg.server.path);
    println!("  endpoint:               {}", settings.endpoint);
    println!("  model:                  {}", settings.model);
    println!("  vector store:           {}", settings.vector_store_id);
    println!("  timeout:                {}s", settings.timeout.as_secs());
    println!("  instructions:           {} chars", settings.instructions.chars().count());
    println!("  include search results: {}", settings.include_search_results);
    println!("  include debug:          {}", settings.include_debug);
    println!("  answer tag:             {}", settings.answer_tag);
}
