use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use which::which;

use crate::{CnError, Result};

/// Number of notes shown by `recent` unless configured otherwise.
pub const DEFAULT_RECENT_LIMIT: usize = 3;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "clevernote", "clevernote")
}

/// Application configuration settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Directory holding the key-value store (notes, login state, credentials)
    pub data_dir: PathBuf,

    /// Editor command used to write note content
    pub editor_command: Option<String>,

    /// How many notes `recent` shows
    pub recent_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".clevernote"));

        Self {
            data_dir,
            editor_command: None,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

impl Config {
    /// Location of the config file when none is given on the command line.
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Reads the config file at `path`, or the default location when `path`
    /// is `None`. A missing file yields the defaults; fields missing from
    /// the file keep their default values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => path,
            None => {
                debug!("No config location available, using defaults");
                return Ok(Self::default());
            }
        };

        if !path.exists() {
            debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path)?;
        let config: Config = serde_json::from_str(&raw).map_err(|e| CnError::ConfigError {
            message: format!("{}: {}", path.display(), e),
        })?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Writes the config as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    // This method provides smart fallbacks when no editor is configured
    pub fn get_editor_command(&self) -> String {
        // First try the configured editor
        if let Some(editor) = &self.editor_command {
            return editor.clone();
        }

        if let Ok(editor) = std::env::var("EDITOR") {
            return editor;
        }

        // Fall back to platform defaults
        if cfg!(windows) {
            "notepad".to_string()
        } else if cfg!(target_os = "macos") {
            "open -W -t".to_string()
        } else {
            for editor in &["nano", "vim", "vi", "emacs"] {
                if which(editor).is_ok() {
                    return editor.to_string();
                }
            }
            "nano".to_string()
        }
    }
}
