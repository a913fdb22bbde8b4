//! Editor settings

use serde::{Deserialize, Serialize};

/// Undo history settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySettings {
    /// Oldest done commands are evicted beyond this count. `None` keeps everything.
    pub max_commands: Option<usize>,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing_subscriber` filter used when `RUST_LOG` is not set
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "vcad_editor=info".to_string(),
        }
    }
}

/// Model import settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSettings {
    /// Accepted file extensions, lowercase, without the dot
    pub extensions: Vec<String>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            extensions: vec!["stl".into(), "off".into(), "obj".into()],
        }
    }
}

impl ImportSettings {
    pub fn accepts(&self, extension: &str) -> bool {
        let extension = extension.to_ascii_lowercase();
        self.extensions.iter().any(|e| *e == extension)
    }
}

/// All editor settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorSettings {
    #[serde(default)]
    pub history: HistorySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub import: ImportSettings,
}

impl EditorSettings {
    /// Load settings from file, or return default if not found
    pub fn load() -> Self {
        if let Some(dirs) = directories::ProjectDirs::from("com", "vcad", "vcad-editor") {
            let config_path = dirs.config_dir().join("settings.json");
            if let Ok(json) = std::fs::read_to_string(&config_path) {
                match Self::from_json(&json) {
                    Ok(settings) => return settings,
                    Err(e) => tracing::warn!(path = %config_path.display(), "ignoring settings: {e}"),
                }
            }
        }
        Self::default()
    }

    /// Save settings to file
    pub fn save(&self) -> std::io::Result<()> {
        let Some(dirs) = directories::ProjectDirs::from("com", "vcad", "vcad-editor") else {
            return Ok(());
        };
        let config_dir = dirs.config_dir();
        std::fs::create_dir_all(config_dir)?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(config_dir.join("settings.json"), json)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
