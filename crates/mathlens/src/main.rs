//! mathlens - relay photographed math problems to vision-capable LLMs.
//!
//! Accepts an image upload, forwards it to Perplexity, Gemini or OpenAI with
//! a fixed solving prompt, and answers with the model's raw reply plus any
//! JSON object recovered from it.
//!
//! # Usage
//!
//! ```bash
//! # Start the HTTP server
//! mathlens serve --bind 0.0.0.0:8000
//!
//! # View configuration
//! mathlens config show
//!
//! # Write a default config file
//! mathlens config init
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mathlens_core::Config;

mod cli;
mod logging;

/// mathlens - math problem image relay for vision LLMs.
#[derive(Parser, Debug)]
#[command(name = "mathlens")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "MATHLENS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(cli::serve::ServeArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Provider keys commonly live in a local .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .as_ref()
        .map(|p| PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).into_owned()));

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match &config_path {
        Some(path) if path.exists() => Config::load_from(path)?,
        Some(path) => {
            eprintln!(
                "Warning: Config file {} not found, using default configuration.",
                path.display()
            );
            Config::default()
        }
        None => match Config::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to load config: {e}\n  \
                     Using default configuration. Check your config file with `mathlens config path`."
                );
                Config::default()
            }
        },
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("mathlens v{}", mathlens_core::VERSION);

    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, &config, config_path.as_deref()).await,
    }
}
