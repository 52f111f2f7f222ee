use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

mod client;
mod console;
mod controller;
mod events;
mod session;
mod settings;
mod store;

#[derive(Debug, Parser)]
#[command(name = "service_chat")]
#[command(about = "Terminal chat console for a machine service assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Start {
        /// Chat endpoint URL
        #[arg(long)]
        endpoint: Option<String>,
        /// Machine model for the first conversation
        #[arg(long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Start { endpoint, model } => {
            let overrides = settings::CliOverrides { endpoint, model };
            let settings = settings::resolve_settings(&overrides)?;
            console::run_repl(settings).await?;
        }
    }
    Ok(())
}
