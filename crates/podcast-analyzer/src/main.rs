#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use podcast_analyzer::{config::Config, run_batch, run_server, telemetry};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "podcast-analyzer", version, about = "Score podcast transcripts for freshness and insight")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Analyze every transcript and write batch_summary.json
    Batch {
        /// User whose preferences drive the analysis
        #[arg(long, default_value = "default")]
        user: String,
        /// Re-analyze even when a cached result exists
        #[arg(long)]
        force: bool,
    },
}

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing();

    let cfg = Config::from_env()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => run_server(cfg).await,
        Command::Batch { user, force } => run_batch(cfg, &user, force).await.map(|_| ()),
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    println!("CLI feature not enabled. Enable with --features cli");
}
