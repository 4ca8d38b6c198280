//! `slate.toml` loading and parsing.
//!
//! Sections: `[connection]` (surface host/port), `[theme]` (hex `#rrggbb`
//! colors), `[editor]` (tab width). Unknown fields are ignored so the file can
//! grow without breaking older binaries. A missing file yields defaults; an
//! unparseable file is logged and also yields defaults, never a startup
//! failure.

use anyhow::Result;
use core_protocol::Color;
use core_render::Theme;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

#[derive(Debug, Deserialize, Clone)]
pub struct ConnectionConfig {
    #[serde(default = "ConnectionConfig::default_host")]
    pub host: String,
    #[serde(default = "ConnectionConfig::default_port")]
    pub port: u16,
}

impl ConnectionConfig {
    fn default_host() -> String {
        "127.0.0.1".to_string()
    }
    const fn default_port() -> u16 {
        5005
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

/// Colors as written in the file. Resolved against `Theme::default()` field
/// by field so one bad color does not discard the rest.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ThemeConfig {
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub cursor: Option<String>,
    #[serde(default)]
    pub status_background: Option<String>,
    #[serde(default)]
    pub status_text: Option<String>,
    #[serde(default)]
    pub selection: Option<String>,
}

impl ThemeConfig {
    pub fn resolve(&self) -> Theme {
        let mut theme = Theme::default();
        let apply = |slot: &mut Color, raw: &Option<String>, field: &'static str| {
            if let Some(raw) = raw {
                match raw.parse() {
                    Ok(color) => *slot = color,
                    Err(_) => {
                        warn!(target: "config", field, value = %raw, "invalid theme color, using default");
                    }
                }
            }
        };
        apply(&mut theme.background, &self.background, "background");
        apply(&mut theme.text, &self.text, "text");
        apply(&mut theme.cursor, &self.cursor, "cursor");
        apply(
            &mut theme.status_background,
            &self.status_background,
            "status_background",
        );
        apply(&mut theme.status_text, &self.status_text, "status_text");
        apply(&mut theme.selection, &self.selection, "selection");
        theme
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EditorConfig {
    #[serde(default = "EditorConfig::default_tab_width")]
    pub tab_width: usize,
}

impl EditorConfig {
    const fn default_tab_width() -> usize {
        4
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_width: Self::default_tab_width(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub editor: EditorConfig,
}

/// Best-effort config path: `slate.toml` in the working directory first, then
/// the platform config dir (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("slate.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("slate").join("slate.toml");
    }
    PathBuf::from("slate.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    match fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<Config>(&content) {
            Ok(config) => {
                info!(target: "config", path = %path.display(), "loaded configuration");
                Ok(config)
            }
            Err(e) => {
                warn!(target: "config", path = %path.display(), error = %e, "config parse failed, using defaults");
                Ok(Config::default())
            }
        },
        Err(_) => Ok(Config::default()),
    }
}
