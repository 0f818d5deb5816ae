use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use graphlens::api::HttpGraphApi;
use graphlens::config::{
    apply_env_overrides, default_config_path, load_config, save_config, GraphLensConfig,
};
use graphlens::errors::{GraphLensError, Result};
use graphlens::mcp::{get_tool_definitions, handle_tool_call, McpServer, ProgressReporter, ToolContext};
use tracing_subscriber::EnvFilter;

/// Knowledge-graph text analysis for AI assistants.
#[derive(Parser)]
#[command(name = "graphlens", version, about = "Knowledge-graph text analysis over MCP")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server over stdio (default)
    Serve,
    /// Write a default configuration file
    InitConfig {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Print the tool definitions as JSON
    Tools,
    /// Invoke a single tool and print its result
    Call {
        /// Tool name, e.g. generate_content_gaps
        tool: String,
        /// Tool arguments as a JSON object
        #[arg(default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("GRAPHLENS_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let config = resolve_config(&config_path)?;
            let api = HttpGraphApi::new(&config);
            McpServer::new(Box::new(api), config).run().await?;
        }
        Commands::InitConfig { force } => {
            if config_path.exists() && !force {
                return Err(GraphLensError::Config {
                    message: format!(
                        "'{}' already exists; pass --force to overwrite",
                        config_path.display()
                    ),
                });
            }
            save_config(&config_path, &GraphLensConfig::default())?;
            println!("Wrote default configuration to {}", config_path.display());
        }
        Commands::Tools => {
            println!("{}", serde_json::to_string_pretty(&get_tool_definitions())?);
        }
        Commands::Call { tool, args } => {
            let config = resolve_config(&config_path)?;
            let arguments: serde_json::Value = serde_json::from_str(&args)?;
            let api = HttpGraphApi::new(&config);
            let ctx = ToolContext {
                api: &api,
                config: &config,
                progress: ProgressReporter::disabled(),
            };
            let result = tokio::task::block_in_place(|| handle_tool_call(&ctx, &tool, arguments))?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}

/// Loads the configuration file and applies environment overrides.
fn resolve_config(path: &std::path::Path) -> Result<GraphLensConfig> {
    let config = load_config(path)?;
    apply_env_overrides(config, |key| std::env::var(key).ok())
}
