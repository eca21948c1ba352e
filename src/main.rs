use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use lingon::config::Config;
use lingon::notion::{Database, NotionGateway};
use lingon::server;
use lingon::tools::{tool_definitions, ToolContext};

/// Lingon - Swedish language learning MCP server backed by Notion
#[derive(Parser)]
#[command(name = "lingon")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Swedish language learning MCP server backed by Notion", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server on stdio (the default)
    Serve,

    /// Validate configuration and connectivity to both databases
    Check,

    /// List the tools this server exposes
    Tools,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the protocol, so logs always go to stderr.
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let config = Config::from_env()?;
            let ctx = ToolContext {
                gateway: NotionGateway::new(&config),
                scheduler: config.scheduler.clone(),
            };
            server::serve(ctx).await?;
        }
        Commands::Check => {
            let config = Config::from_env()?;
            let gateway = NotionGateway::new(&config);

            let vocab = gateway.query_database(Database::Vocabulary, None).await?;
            println!("Vocabulary database reachable ({} entries)", vocab.len());
            let grammar = gateway.query_database(Database::Grammar, None).await?;
            println!("Grammar database reachable ({} entries)", grammar.len());

            info!("Configuration and connectivity OK");
        }
        Commands::Tools => {
            for tool in tool_definitions() {
                println!(
                    "{:<32} {}",
                    tool["name"].as_str().unwrap_or("?"),
                    tool["description"].as_str().unwrap_or("")
                );
            }
        }
    }

    Ok(())
}
