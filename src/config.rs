//! Configuration file discovery and parsing
//!
//! Searches for `.config/livedit.kdl` walking up from the current directory.
//! The project root is the parent of `.config/`. Every setting is optional;
//! command-line flags override whatever the file says.
//!
//! ```kdl
//! docs "docs/"
//! host "127.0.0.1"
//! port 8484
//! connection-timeout 5
//! debug true
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use color_eyre::eyre::{Result, eyre};
use kdl::KdlDocument;
use std::env;
use std::fs;

const CONFIG_DIR: &str = ".config";
const CONFIG_FILE: &str = "livedit.kdl";

/// Port the browser bridge connects to unless told otherwise.
pub const DEFAULT_PORT: u16 = 8484;

/// Seconds the browser bridge waits before declaring the connection dead.
pub const DEFAULT_CONNECTION_TIMEOUT: u64 = 3;

/// Discovered configuration with resolved paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to the docs directory
    pub docs_dir: Utf8PathBuf,
    /// Host the editing endpoint binds to
    pub host: Option<String>,
    /// Port the editing endpoint binds to
    pub port: Option<u16>,
    /// Connection timeout handed to the browser bridge, in seconds
    pub connection_timeout: u64,
    /// Verbose client-side logging in the browser bridge
    pub debug_mode: bool,
}

impl ResolvedConfig {
    /// Discover and load configuration from current directory
    pub fn discover() -> Result<Option<Self>> {
        match find_config_file()? {
            Some(path) => Ok(Some(load_config(&path)?)),
            None => Ok(None),
        }
    }

    /// Discover and load configuration from a specific project path
    pub fn discover_from(project_path: &Utf8Path) -> Result<Option<Self>> {
        let config_file = project_path.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_file.exists() {
            Ok(Some(load_config(&config_file)?))
        } else {
            Ok(None)
        }
    }
}

/// Search for `.config/livedit.kdl` walking up from current directory
fn find_config_file() -> Result<Option<Utf8PathBuf>> {
    let cwd = env::current_dir()?;
    let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| {
        eyre!(
            "Current directory is not valid UTF-8: {}",
            e.as_path().display()
        )
    })?;

    let mut current = cwd.as_path();

    loop {
        let config_file = current.join(CONFIG_DIR).join(CONFIG_FILE);
        if config_file.exists() {
            return Ok(Some(config_file));
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return Ok(None),
        }
    }
}

/// Load and resolve configuration from a config file path
fn load_config(config_path: &Utf8Path) -> Result<ResolvedConfig> {
    let content = fs::read_to_string(config_path)?;

    // Project root is the parent of .config/
    let config_dir = config_path
        .parent()
        .ok_or_else(|| eyre!("Config file has no parent directory"))?;
    let root = config_dir
        .parent()
        .ok_or_else(|| eyre!(".config directory has no parent"))?;

    parse_config(&content, root)
}

fn parse_config(content: &str, root: &Utf8Path) -> Result<ResolvedConfig> {
    let doc: KdlDocument = content
        .parse()
        .map_err(|e| eyre!("While loading config: {e}"))?;

    let string_arg = |name: &str| {
        doc.get_arg(name)
            .and_then(|v| v.as_string())
            .map(str::to_owned)
    };
    let int_arg = |name: &str| doc.get_arg(name).and_then(|v| v.as_i64());

    let docs = string_arg("docs").unwrap_or_else(|| "docs".to_string());
    let docs_dir = root.join(docs);

    let port = match int_arg("port") {
        Some(p) => Some(
            u16::try_from(p).map_err(|_| eyre!("port {p} is out of range"))?,
        ),
        None => None,
    };

    let connection_timeout = match int_arg("connection-timeout") {
        Some(t) if t > 0 => t as u64,
        Some(t) => return Err(eyre!("connection-timeout {t} must be positive")),
        None => DEFAULT_CONNECTION_TIMEOUT,
    };

    let debug_mode = doc
        .get_arg("debug")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    Ok(ResolvedConfig {
        docs_dir,
        host: string_arg("host"),
        port,
        connection_timeout,
        debug_mode,
    })
}
