#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use crate::commands::config::ConfigCommands;
use crate::commands::history::HistoryCommands;
use crate::commands::utils::PageArgs;
use formaid::config::Config;
use formaid::errors::FormaidError;
use formaid::session::GuidanceMode;
use formaid::types::OutputFormat;

const EXIT_SUCCESS: i32 = 0;

#[derive(Parser)]
#[command(name = "formaid", disable_help_subcommand = true)]
#[command(about = "Contextual guidance for government web forms", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Guidance API root (overrides config file and FORMAID_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Config file (defaults to ~/.formaid/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// How selects, radios and checkboxes are answered
    #[arg(long, global = true)]
    mode: Option<GuidanceMode>,

    /// Form context sent with every guidance request
    #[arg(long, global = true)]
    form_context: Option<String>,

    /// Debounce delay for focus and click events, in milliseconds
    #[arg(long, global = true)]
    debounce_ms: Option<u64>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

impl Cli {
    fn config_path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Config::default_path(),
        }
    }

    /// Config file and environment, overridden by flags
    fn effective_config(&self, path: &std::path::Path) -> Result<Config> {
        let mut config = Config::load(Some(path))?;
        if let Some(url) = &self.api_url {
            config.api_url = Some(url.clone());
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(context) = &self.form_context {
            config.form_context = context.clone();
        }
        if let Some(ms) = self.debounce_ms {
            config.debounce_ms = ms;
        }
        if let Some(secs) = self.timeout {
            config.timeout_secs = secs;
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct the question and options of one form control
    Interpret {
        #[command(flatten)]
        page: PageArgs,

        /// CSS selector for the control (or a label bound to it)
        selector: String,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Interpret every form control on a page
    Scan {
        #[command(flatten)]
        page: PageArgs,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Run one guidance cycle for a control and show the panel
    Help {
        #[command(flatten)]
        page: PageArgs,

        /// CSS selector for the control (or a label bound to it)
        selector: String,

        /// Answer the clarification question with this option (1-based)
        #[arg(long)]
        select: Option<usize>,

        /// Output format
        #[arg(short, long, default_value = "simple")]
        format: OutputFormat,
    },

    /// Replay a JSON script of focus, click and select events
    Replay {
        #[command(flatten)]
        page: PageArgs,

        /// Script file
        script: PathBuf,

        /// Output format (json prints one panel update per line)
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Ask a free-form question about the page
    Chat {
        #[command(flatten)]
        page: PageArgs,

        /// Message to send
        message: String,

        /// Output format
        #[arg(short, long, default_value = "simple")]
        format: OutputFormat,
    },

    /// Manage stored chat transcripts
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() {
    let result = run().await;

    match result {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(err) => {
            // Convert to our error type to get proper exit code
            let formaid_err: FormaidError = err.into();

            // Output JSON error to stdout for programmatic consumption
            let error_json = json!({
                "error": true,
                "message": formaid_err.to_string(),
                "exit_code": formaid_err.exit_code()
            });
            println!(
                "{}",
                serde_json::to_string(&error_json).unwrap_or_else(|_| "{}".to_string())
            );

            // Also log to stderr for human reading
            eprintln!("Error: {}", formaid_err);
            std::process::exit(formaid_err.exit_code());
        }
    }
}

async fn run() -> Result<()> {
    // Initialize tracing to stderr (so JSON output to stdout remains clean)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "formaid=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let cli = Cli::parse();
    let config_path = cli.config_path()?;
    let config = cli.effective_config(&config_path)?;

    match cli.command {
        Commands::Interpret {
            page,
            selector,
            format,
        } => commands::interpret::handle_interpret(page, selector, format, &config).await?,

        Commands::Scan { page, format } => {
            commands::scan::handle_scan(page, format, &config).await?
        }

        Commands::Help {
            page,
            selector,
            select,
            format,
        } => commands::help::handle_help(page, selector, select, format, &config).await?,

        Commands::Replay {
            page,
            script,
            format,
        } => commands::replay::handle_replay(page, &script, format, &config).await?,

        Commands::Chat {
            page,
            message,
            format,
        } => commands::chat::handle_chat(page, message, format, &config).await?,

        Commands::History { command } => commands::history::handle_history(command).await?,

        Commands::Config { command } => {
            commands::config::handle_config(command, &config, &config_path).await?
        }
    }

    Ok(())
}
