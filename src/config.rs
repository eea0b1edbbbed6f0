//! Settings for the traceability feature
//!
//! Read from YAML (`~/.config/intocps/traceability.yaml` by default), with
//! `INTOCPS_TRACE_ENABLED` and `INTOCPS_TRACE_URL` overriding the file.

use crate::environment::ProjectContext;
use crate::error::{TraceError, TraceResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_ENABLED: &str = "INTOCPS_TRACE_ENABLED";
pub const ENV_URL: &str = "INTOCPS_TRACE_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Master switch; when off nothing is recorded or sent
    pub enabled: bool,
    /// Root of the store's REST API
    pub base_url: String,
    /// Send `OSLC-Core-Version: 3.0` with every request
    pub oslc_core_version: bool,
    /// Keep a local copy of every pushed message
    pub save_snapshots: bool,
    /// Project-relative directory for message snapshots
    pub messages_dir: PathBuf,
    /// Link each recorded activity to the current user automatically
    pub auto_associate: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "http://localhost:8080/v2/".to_string(),
            oslc_core_version: true,
            save_snapshots: true,
            messages_dir: PathBuf::from("traceability/messages"),
            auto_associate: false,
        }
    }
}

impl TraceConfig {
    /// `<config dir>/intocps/traceability.yaml`
    pub fn default_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_default().join(".config"));
        config_dir.join("intocps").join("traceability.yaml")
    }

    pub fn load(path: &Path) -> TraceResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Like [`load`](Self::load), but a missing file gives the defaults
    pub fn load_or_default(path: &Path) -> TraceResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_yaml(text: &str) -> TraceResult<Self> {
        serde_yaml::from_str(text).map_err(|e| TraceError::Config(e.to_string()))
    }

    /// Apply environment overrides
    pub fn with_env(self) -> TraceResult<Self> {
        self.with_overrides(std::env::var(ENV_ENABLED).ok(), std::env::var(ENV_URL).ok())
    }

    fn with_overrides(mut self, enabled: Option<String>, url: Option<String>) -> TraceResult<Self> {
        if let Some(value) = enabled {
            self.enabled = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                other => {
                    return Err(TraceError::Config(format!("{}: not a boolean: {}", ENV_ENABLED, other)));
                }
            };
        }
        if let Some(url) = url {
            self.base_url = url;
        }
        Ok(self)
    }

    /// Snapshot directory for `project`, or `None` when snapshots are off
    pub fn snapshot_dir(&self, project: &ProjectContext) -> Option<PathBuf> {
        self.save_snapshots
            .then(|| project.root_path.join(&self.messages_dir))
    }
}
