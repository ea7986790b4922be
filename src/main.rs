use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::eyre};
use livedit::bridge::RebuildBridge;
use livedit::config::{DEFAULT_PORT, ResolvedConfig};
use livedit::fs_ops::MutationEngine;
use livedit::navigation::PendingNavigation;
use livedit::paths::DirectoryUrls;
use livedit::session::EditorState;
use livedit::{logging, serve, watcher};
use owo_colors::OwoColorize;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "livedit", about = "Live editing sidecar for docs previews")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the editing endpoint for a docs directory
    Serve {
        /// Project directory (looks for .config/livedit.kdl here)
        #[arg()]
        path: Option<Utf8PathBuf>,

        /// Docs directory (uses .config/livedit.kdl if not specified)
        #[arg(short, long)]
        docs: Option<Utf8PathBuf>,

        /// Address to bind on
        #[arg(short, long)]
        address: Option<String>,

        /// Port to serve on
        #[arg(short, long)]
        port: Option<u16>,

        /// Verbose client-side logging in the browser bridge
        #[arg(long)]
        debug: bool,
    },
}

/// Resolved settings for a serve run
struct ResolvedServeConfig {
    docs_dir: Utf8PathBuf,
    address: String,
    port: u16,
}

/// Resolve serve settings from CLI args or the config file
fn resolve_serve(
    path: Option<Utf8PathBuf>,
    docs: Option<Utf8PathBuf>,
    address: Option<String>,
    port: Option<u16>,
) -> Result<ResolvedServeConfig> {
    let config = if let Some(ref project_path) = path {
        ResolvedConfig::discover_from(project_path)?
    } else {
        ResolvedConfig::discover()?
    };

    let docs_dir = match (docs, &config) {
        (Some(d), _) => d,
        (None, Some(cfg)) => cfg.docs_dir.clone(),
        (None, None) => {
            let config_path = path
                .as_ref()
                .map(|p| format!("{p}/.config/livedit.kdl"))
                .unwrap_or_else(|| ".config/livedit.kdl".to_string());
            return Err(eyre!(
                "{}\n\n\
                     Create a config file at {} with:\n\n\
                     \x20   {}\n\n\
                     Or specify {} on the command line.",
                "No configuration found.".red().bold(),
                config_path.cyan(),
                "docs \"path/to/docs\"".green(),
                "--docs".yellow()
            ));
        }
    };

    if !docs_dir.is_dir() {
        return Err(eyre!("docs directory {docs_dir} does not exist"));
    }

    let address = address
        .or_else(|| config.as_ref().and_then(|c| c.host.clone()))
        .unwrap_or_else(|| "0.0.0.0".to_string());
    let port = port
        .or_else(|| config.as_ref().and_then(|c| c.port))
        .unwrap_or(DEFAULT_PORT);

    Ok(ResolvedServeConfig {
        docs_dir,
        address,
        port,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    logging::init_standard_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            path,
            docs,
            address,
            port,
            debug,
        } => {
            let cfg = resolve_serve(path, docs, address, port)?;
            if debug {
                tracing::info!("browser bridge debug logging enabled");
            }

            let urls = Arc::new(DirectoryUrls::new(cfg.docs_dir.clone()));
            let nav = Arc::new(PendingNavigation::new());
            let engine = MutationEngine::new(cfg.docs_dir.clone(), urls.clone());
            let state = Arc::new(EditorState::new(engine, nav.clone()));
            let bridge = Arc::new(RebuildBridge::new(nav, urls));

            // Must stay alive for the watch to continue
            let _watcher = watcher::spawn_rebuild_watcher(&cfg.docs_dir, bridge)?;

            let listener = serve::bind(&cfg.address, cfg.port).await?;
            print_server_urls(&cfg.address, cfg.port);
            serve::run(listener, state).await?;
        }
    }

    Ok(())
}

/// Print endpoint URLs with terminal hyperlinks
fn print_server_urls(address: &str, port: u16) {
    println!("\n{}", "Live-edit endpoint running at:".bold());

    if address == "0.0.0.0" {
        // List all interfaces
        if let Ok(interfaces) = if_addrs::get_if_addrs() {
            for iface in interfaces {
                if let if_addrs::IfAddr::V4(addr) = iface.addr {
                    let ip = addr.ip;
                    let url = format!("ws://{ip}:{port}");
                    println!("  {} {}", "→".cyan(), terminal_link(&url, &url));
                }
            }
        }
    } else {
        let url = format!("ws://{address}:{port}");
        println!("  {} {}", "→".cyan(), terminal_link(&url, &url));
    }
    println!();
}

/// Create an OSC 8 terminal hyperlink
fn terminal_link(url: &str, text: &str) -> String {
    format!(
        "\x1b]8;;{}\x1b\\{}\x1b]8;;\x1b\\",
        url,
        text.blue().underline()
    )
}
