mod cmd_chat;
mod feedback;
mod view;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use convotree::ConversationConfig;
use convotree_responder::{ResponderConfig, ResponderKind};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "convotree")]
#[command(about = "Grow and navigate branching AI conversations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Log more (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a conversation session, reading commands from stdin
    Chat {
        #[command(flatten)]
        responder: ResponderArgs,

        /// Directory for /feedback reports
        #[arg(long, default_value = "feedback")]
        feedback_dir: PathBuf,

        /// Write the final snapshot to this file on exit
        #[arg(long)]
        snapshot_out: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct ResponderArgs {
    /// Responder that produces AI turns: mock, backend, or openai
    #[arg(long, default_value = "mock")]
    responder: String,

    /// Base URL of the chat backend (requests go to <url>/chat)
    #[arg(long, default_value = convotree_responder::DEFAULT_BACKEND_URL)]
    backend_url: String,

    /// OpenAI-compatible chat completions endpoint
    #[arg(long, default_value = convotree_responder::DEFAULT_OPENAI_URL)]
    openai_url: String,

    /// Model name for the openai responder
    #[arg(long, default_value = convotree_responder::DEFAULT_MODEL)]
    model: String,

    /// Seed for the mock responder
    #[arg(long)]
    seed: Option<u64>,

    /// System prompt sent ahead of every conversation
    #[arg(long, default_value = convotree::DEFAULT_SYSTEM_PROMPT)]
    system_prompt: String,

    /// Mode sent to the chat backend as llm_choice
    #[arg(long, default_value = convotree::DEFAULT_MODE)]
    mode: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = convotree_responder::DEFAULT_TIMEOUT.as_secs())]
    timeout: u64,
}

impl ResponderArgs {
    fn responder_config(&self) -> Result<ResponderConfig> {
        let kind: ResponderKind = self
            .responder
            .parse()
            .with_context(|| format!("invalid --responder value: {}", self.responder))?;
        let mut config = ResponderConfig::default()
            .with_kind(kind)
            .with_backend_url(&self.backend_url)
            .with_openai_url(&self.openai_url)
            .with_model(&self.model)
            .with_timeout(Duration::from_secs(self.timeout));
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        Ok(config)
    }

    fn conversation_config(&self) -> ConversationConfig {
        ConversationConfig::default()
            .with_system_prompt(&self.system_prompt)
            .with_mode(&self.mode)
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Chat {
            responder,
            feedback_dir,
            snapshot_out,
        } => cmd_chat::run(
            responder.responder_config()?,
            responder.conversation_config(),
            feedback_dir,
            snapshot_out,
            cli.pretty,
        ),
    }
}
