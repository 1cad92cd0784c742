//! Painpoint Entry Point
//!
//! Three subcommands:
//! - `embed`: encode the knowledge base and write the embeddings file
//! - `query`: rank features for one pain point and print JSON
//! - `mcp`: serve Model Context Protocol over stdio for AI clients

use clap::{Args, Parser, Subcommand};
use painpoint_core::{FinderConfig, DEFAULT_CACHE_CAPACITY, DEFAULT_LIMIT};
use painpoint_server::mcp::McpServer;
use painpoint_server::{
    generate_embeddings, EncoderConfig, EncoderKind, ServerResult, ServiceConfig, SolutionService,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "painpoint")]
#[command(about = "Match customer pain points to product features")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode the knowledge base and write the embeddings file
    Embed {
        /// Knowledge base JSON
        #[arg(long, default_value = "knowledge_base.json")]
        catalog: PathBuf,

        /// Where to write the embeddings
        #[arg(long, short, default_value = "kb.bin")]
        output: PathBuf,

        #[command(flatten)]
        encoder: EncoderArgs,
    },
    /// Rank features for a single pain point
    Query {
        #[command(flatten)]
        files: ServeArgs,

        /// Maximum number of results
        #[arg(short, default_value_t = DEFAULT_LIMIT)]
        k: usize,

        /// Free-text pain point description
        text: String,
    },
    /// Run in MCP (Model Context Protocol) mode for AI clients
    Mcp {
        #[command(flatten)]
        files: ServeArgs,
    },
}

#[derive(Args)]
struct EncoderArgs {
    /// Sentence encoder; must match the one used by `embed`
    #[arg(long, value_enum, default_value_t = EncoderKind::Hash)]
    encoder: EncoderKind,

    /// Hash encoder dimension
    #[arg(long, default_value_t = 384)]
    dimension: usize,

    /// Model cache directory (falls back to $PAINPOINT_MODELS_PATH)
    #[arg(long)]
    models_dir: Option<PathBuf>,

    /// Query embeddings kept in memory
    #[arg(long, default_value_t = DEFAULT_CACHE_CAPACITY)]
    cache_capacity: usize,
}

impl EncoderArgs {
    fn config(&self) -> EncoderConfig {
        EncoderConfig {
            kind: self.encoder,
            dimension: self.dimension,
            models_dir: self.models_dir.clone(),
            cache_capacity: self.cache_capacity,
        }
    }
}

#[derive(Args)]
struct ServeArgs {
    /// Knowledge base JSON
    #[arg(long, default_value = "knowledge_base.json")]
    catalog: PathBuf,

    /// Embeddings file produced by `embed`
    #[arg(long, default_value = "kb.bin")]
    embeddings: PathBuf,

    /// Keyword weight in [0, 1]; the rest goes to semantic similarity
    #[arg(long, default_value_t = 0.4)]
    alpha: f32,

    #[command(flatten)]
    encoder: EncoderArgs,
}

impl ServeArgs {
    fn config(&self) -> ServiceConfig {
        ServiceConfig {
            catalog_path: self.catalog.clone(),
            embeddings_path: self.embeddings.clone(),
            finder: FinderConfig::default().with_alpha(self.alpha),
            encoder: self.encoder.config(),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_filter = if matches!(cli.command, Command::Mcp { .. }) {
        // stdout carries the protocol; logs go to stderr either way
        "painpoint=debug,painpoint_server=debug,painpoint_core=info"
    } else {
        "painpoint=info,painpoint_server=info,painpoint_core=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli.command).await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command) -> ServerResult<()> {
    match command {
        Command::Embed {
            catalog,
            output,
            encoder,
        } => {
            let embeddings = generate_embeddings(&catalog, &output, &encoder.config())?;
            println!(
                "Wrote {} embeddings ({} dimensions, model {}) to {}",
                embeddings.len(),
                embeddings.dimension,
                embeddings.model,
                output.display()
            );
        }
        Command::Query { files, k, text } => {
            let service = SolutionService::load(&files.config())?;
            let solutions = service.find_solutions(text, k).await?;
            println!("{}", serde_json::to_string_pretty(&solutions)?);
        }
        Command::Mcp { files } => {
            tracing::info!("Starting painpoint MCP server");
            let service = SolutionService::load(&files.config())?;
            let mut server = McpServer::new(Arc::new(service));
            server.run().await?;
        }
    }
    Ok(())
}
