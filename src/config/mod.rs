mod session;
mod store;

pub use session::{PendingInput, Session};
pub use store::{Config, PdfSettings, StoreSettings};

use crate::error::{InvoiceError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Get the config directory path (XDG config dir, or ~/.flooreno/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "flooreno") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| {
        InvoiceError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".flooreno"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve the configured output directory. Relative paths are taken
/// relative to the config directory.
pub fn resolve_output_dir(output_dir: &str, config_dir: &Path) -> PathBuf {
    let path = expand_path(output_dir);
    if path.is_absolute() {
        path
    } else {
        config_dir.join(path)
    }
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(InvoiceError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| InvoiceError::ConfigParse { path, source: e })
}

/// Load session.toml (empty session if missing)
pub fn load_session(config_dir: &Path) -> Result<Session> {
    let path = config_dir.join("session.toml");
    if !path.exists() {
        debug!(path = %path.display(), "no session file, starting empty");
        return Ok(Session::default());
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| InvoiceError::ConfigParse { path, source: e })
}

/// Save session.toml
pub fn save_session(config_dir: &Path, session: &Session) -> Result<()> {
    let path = config_dir.join("session.toml");
    let content = toml::to_string_pretty(session).map_err(|e| InvoiceError::ConfigWrite {
        path: path.clone(),
        source: e,
    })?;
    fs::write(&path, content)?;
    debug!(path = %path.display(), items = session.items.len(), "session saved");
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[store]
brand = "Flooreno"
default_location = "NY"   # one of: NY, Sauga, Dragona, Ottawa

[pdf]
output_dir = "output"     # relative to this directory, or an absolute / ~/ path
"#;
