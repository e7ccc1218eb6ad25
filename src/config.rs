// SPDX-License-Identifier: GPL-3.0-only

use std::fs;
use std::path::Path;

use anywho::anywho;
use serde::{Deserialize, Serialize};

pub const APP_ID: &str = "dev.mariinkys.TickTotp";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `tracing` filter used when `RUST_LOG` is not set
    pub log_filter: String,
    /// Whether `:copy` talks to the system clipboard
    pub clipboard: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: String::from("info"),
            clipboard: true,
        }
    }
}

impl Config {
    /// Loads `config.ron` from the user config directory, writing the
    /// defaults there first if it does not exist yet
    pub async fn load(app_id: &str) -> Result<Self, anywho::Error> {
        let app_id = app_id.to_string();

        smol::unblock(move || {
            let config_dir = dirs::config_dir()
                .ok_or_else(|| anywho!("Could not determine config directory"))?
                .join(&app_id);

            Self::load_from(&config_dir.join("config.ron"))
        })
        .await
        .map_err(|e| anywho!("Error loading config: {}", e))
    }

    /// Blocking variant of [`Config::load`] for an explicit path
    pub fn load_from(config_path: &Path) -> Result<Self, anywho::Error> {
        if config_path.exists() {
            let config_content = fs::read_to_string(config_path)
                .map_err(|e| anywho!("Failed to read config file: {}", e))?;

            Self::from_ron(&config_content)
        } else {
            // create config directory if it doesn't exist
            if let Some(config_dir) = config_path.parent() {
                fs::create_dir_all(config_dir)
                    .map_err(|e| anywho!("Failed to create config directory: {}", e))?;
            }

            let config = Config::default();
            fs::write(config_path, config.to_ron()?)
                .map_err(|e| anywho!("Failed to write config file: {}", e))?;

            Ok(config)
        }
    }

    pub fn from_ron(content: &str) -> Result<Self, anywho::Error> {
        ron::from_str(content).map_err(|e| anywho!("Failed to parse config file: {}", e))
    }

    pub fn to_ron(&self) -> Result<String, anywho::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| anywho!("Failed to serialize config: {}", e))
    }
}
