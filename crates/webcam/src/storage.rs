//! Selected-camera preference file.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::WebcamResult;

/// File name of the preference record inside the data directory.
pub const PREFERENCES_FILE: &str = ".camera-preferences.json";

/// The only state that survives a restart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(rename = "selectedCamera", default)]
    pub selected_camera: Option<String>,
}

/// Reads and writes [`Preferences`] at a fixed path.
#[derive(Debug, Clone)]
pub struct PreferencesStore {
    path: PathBuf,
}

impl PreferencesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored preferences. A missing or unreadable file means no
    /// selection.
    pub fn load(&self) -> Preferences {
        let file = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Preferences::default(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Cannot open preferences: {}", e);
                return Preferences::default();
            }
        };
        match Self::read_from(&mut std::io::BufReader::new(file)) {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Ignoring corrupt preferences: {}", e);
                Preferences::default()
            }
        }
    }

    /// Replace the stored preferences. Writes a sibling temp file and renames
    /// it over the old one so a crash never leaves a truncated record.
    pub fn save(&self, prefs: &Preferences) -> WebcamResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        {
            let mut file = std::fs::File::create(&tmp)?;
            Self::write_to(prefs, &mut file)?;
            file.sync_all()?;
        }
        std::fs::rename(&tmp, &self.path)?;

        tracing::info!(
            path = %self.path.display(),
            selected = prefs.selected_camera.as_deref().unwrap_or("none"),
            "Saved camera preference"
        );
        Ok(())
    }

    pub fn read_from<R: Read>(reader: &mut R) -> WebcamResult<Preferences> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn write_to<W: Write>(prefs: &Preferences, writer: &mut W) -> WebcamResult<()> {
        serde_json::to_writer_pretty(&mut *writer, prefs)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}
