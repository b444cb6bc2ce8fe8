//! Webcam MCP server entry point.

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use webcam::Platform;
use webcam_mcp::config::ServerConfig;
use webcam_mcp::protocol::ProtocolHandler;
use webcam_mcp::resources::ResourceRegistry;
use webcam_mcp::session::{self, DeviceSession};
use webcam_mcp::tools::ToolRegistry;
use webcam_mcp::transport::StdioTransport;

#[derive(Parser)]
#[command(
    name = "webcam-mcp",
    about = "MCP server for webcam capture, recording and camera settings",
    version
)]
struct Cli {
    /// Directory holding captures/, recordings/ and the camera preference.
    /// Falls back to $WEBCAM_MCP_DIR, then the working directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server over stdio (default).
    Serve,

    /// Print server capabilities, tools and resources as JSON.
    Info,

    /// Print the cameras detected on this machine as JSON.
    Cameras,

    /// Generate shell completion scripts.
    ///
    /// Examples:
    ///   webcam-mcp completions bash > ~/.local/share/bash-completion/completions/webcam-mcp
    ///   webcam-mcp completions zsh > ~/.zfunc/_webcam-mcp
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    // stdout carries protocol frames.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = ServerConfig::resolve(cli.data_dir.as_deref());

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            tracing::info!("Webcam MCP server v{}", env!("CARGO_PKG_VERSION"));
            tracing::info!("Data dir: {}", config.data_dir.display());
            let backend = Platform::current().backend();
            let session = session::shared(DeviceSession::open(&config, backend));
            let handler = ProtocolHandler::new(session);
            let transport = StdioTransport::new(handler);
            transport.run().await?;
        }

        Commands::Info => {
            let capabilities = webcam_mcp::types::InitializeResult::default_result();
            let tools = ToolRegistry::list_tools();
            let resources = ResourceRegistry::list_resources();
            let info = serde_json::json!({
                "server": capabilities.server_info,
                "protocol_version": capabilities.protocol_version,
                "capabilities": capabilities.capabilities,
                "platform": Platform::current().label(),
                "tools": tools.iter().map(|t| &t.name).collect::<Vec<_>>(),
                "tool_count": tools.len(),
                "resources": resources.iter().map(|r| &r.uri).collect::<Vec<_>>(),
                "data_dir": config.data_dir.display().to_string(),
                "captures_dir": config.captures_dir.display().to_string(),
                "recordings_dir": config.recordings_dir.display().to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }

        Commands::Cameras => {
            let cameras = Platform::current().backend().enumerate_cameras().await;
            println!("{}", serde_json::to_string_pretty(&cameras)?);
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "webcam-mcp", &mut std::io::stdout());
        }
    }

    Ok(())
}
