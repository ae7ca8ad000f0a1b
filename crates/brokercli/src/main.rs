// crates/brokercli/src/main.rs

use anyhow::{Context, Result};
use brokercore::{DataHandler, ExecutionMetadata, HandlerRegistry, MemoryContext, Value, DEFAULT_LOCALE};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flowbroker")]
#[command(about = "Inspect and exercise flowbroker node handlers", long_about = None)]
struct Cli {
    /// Show debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered handlers
    Nodes,

    /// Print the locale data a handler resolves for a locale
    Locale {
        /// Handler id, e.g. "flowbroker/change"
        id: String,

        /// Requested locale, e.g. "pt-BR"
        locale: String,

        /// Locale used when the requested one has no file
        #[arg(long, env = "FLOWBROKER_DEFAULT_LOCALE", default_value = DEFAULT_LOCALE)]
        default_locale: String,
    },

    /// Run a single message through a handler
    Handle {
        /// Handler id, e.g. "flowbroker/change"
        id: String,

        /// Node configuration as a JSON object
        #[arg(short, long, default_value = "{}")]
        config: String,

        /// Message as a JSON object
        #[arg(short, long)]
        message: String,

        /// Execution metadata as a JSON object
        #[arg(
            long,
            default_value = r#"{"tenant": "admin", "flowId": "cli", "originatorDeviceId": "cli"}"#
        )]
        metadata: String,
    },
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut registry = HandlerRegistry::new();
    brokernodes::register_all(&mut registry)?;

    match cli.command {
        Commands::Nodes => list_nodes(&registry),
        Commands::Locale {
            id,
            locale,
            default_locale,
        } => print_locale(&registry, &id, &locale, &default_locale).await?,
        Commands::Handle {
            id,
            config,
            message,
            metadata,
        } => handle_message(&registry, &id, &config, &message, &metadata).await?,
    }

    Ok(())
}

fn list_nodes(registry: &HandlerRegistry) {
    println!("📦 Registered handlers:");
    println!();

    for id in registry.list_ids() {
        if let Some(metadata) = registry.metadata(&id) {
            println!("  • {} (v{})", id, metadata.version);
            println!("    module: {}, name: {}", metadata.module, metadata.name);
        }
    }
}

async fn print_locale(
    registry: &HandlerRegistry,
    id: &str,
    locale: &str,
    default_locale: &str,
) -> Result<()> {
    let handler = registry.get(id)?;
    let data = handler.locale_data_or(locale, default_locale).await;

    println!("{}", serde_json::to_string_pretty(&*data)?);
    Ok(())
}

async fn handle_message(
    registry: &HandlerRegistry,
    id: &str,
    config: &str,
    message: &str,
    metadata: &str,
) -> Result<()> {
    let handler = registry.get(id)?;

    let config: Value = serde_json::from_str(config).context("config is not valid JSON")?;
    let message: Value = serde_json::from_str(message).context("message is not valid JSON")?;
    let metadata: ExecutionMetadata =
        serde_json::from_str(metadata).context("metadata is not valid execution metadata")?;

    handler.validate_config(&config)?;

    let context = MemoryContext::new();
    let output = handler
        .handle_message(&config, &message, &metadata, &context)
        .await?;

    tracing::info!(id = %id, messages = output.message_count(), "Handler completed");

    let ports: BTreeMap<String, Vec<Value>> = output.ports.into_iter().collect();
    println!("{}", serde_json::to_string_pretty(&ports)?);
    Ok(())
}
