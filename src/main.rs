//! modelmux - Preference-aware LLM routing.
//!
//! A chat back-end that asks a meta-model which LLM should answer each
//! prompt, then forwards the prompt to the chosen model.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use modelmux::Config;

#[derive(Parser)]
#[command(name = "modelmux")]
#[command(about = "Preference-aware LLM routing via meta-model selection")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.toml")]
        config: String,

        /// Override listen address
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Validate configuration file
    Check {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.toml")]
        config: String,
    },

    /// Show the model catalog
    Models {
        /// Path to configuration file
        #[arg(short, long, default_value = "config.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "modelmux=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, listen } => {
            tracing::info!(config = %config, "Loading configuration");
            let (mut config, key_source) = Config::from_file(&config)?;
            tracing::info!(key_source = %key_source, "Resolved upstream API key");

            if let Some(addr) = listen {
                tracing::info!(listen = %addr, "Override listen address");
                config.server.listen = addr;
            }

            modelmux::api::run_server(config).await
        }

        Commands::Check { config } => {
            let (config, key_source) = Config::from_file(&config)?;
            println!("Configuration OK");
            println!("  listen:         {}", config.server.listen);
            println!("  upstream:       {}", config.upstream.url);
            println!("  selector model: {}", config.upstream.selector_model);
            println!("  fallback model: {}", config.upstream.fallback_model);
            println!("  api key:        {}", key_source);
            println!("  catalog:        {} models", config.catalog().len());
            Ok(())
        }

        Commands::Models { config } => {
            let (config, _) = Config::from_file(&config)?;
            for model in config.catalog().models() {
                println!("{}", model.name);
                println!("    {}", model.description);
            }
            Ok(())
        }
    }
}
