//! Configuration loading and resolution.

use std::path::{Path, PathBuf};

use webcam::PREFERENCES_FILE;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "WEBCAM_MCP_DIR";

/// Where the server keeps its artifacts and preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub captures_dir: PathBuf,
    pub recordings_dir: PathBuf,
    pub preferences_path: PathBuf,
}

impl ServerConfig {
    pub fn from_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            captures_dir: data_dir.join("captures"),
            recordings_dir: data_dir.join("recordings"),
            preferences_path: data_dir.join(PREFERENCES_FILE),
            data_dir,
        }
    }

    /// Resolve from an explicit flag, then the environment, then the
    /// working directory.
    pub fn resolve(explicit: Option<&Path>) -> Self {
        Self::from_data_dir(resolve_data_dir(explicit))
    }

    /// Create the output directories. Failure is logged; captures and
    /// recordings create them again on demand.
    pub fn ensure_directories(&self) {
        for dir in [&self.captures_dir, &self.recordings_dir] {
            if let Err(e) = std::fs::create_dir_all(dir) {
                tracing::warn!("Failed to create directory {}: {e}", dir.display());
            }
        }
    }
}

fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    if let Some(env_path) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(env_path);
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
