//! Configuration for the trellis CLI.
//!
//! A project directory may carry a `trellis.yaml`; every field has a
//! default so a missing or partial file still yields a working setup.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use trellis_engine::layout::LayoutOptions;

/// Name of the configuration file inside a project directory.
pub const CONFIG_FILE_NAME: &str = "trellis.yaml";

/// Project-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrellisConfig {
    /// Organization id threaded into notifications.
    pub org: String,

    /// Directory holding `nodes.jsonl`, `edges.jsonl`, `requests.jsonl`,
    /// relative to the project directory unless absolute.
    pub snapshot_dir: PathBuf,

    /// JSONL file the notification sink appends to, relative to the
    /// project directory unless absolute.
    pub notification_log: PathBuf,

    /// Grid layout tunables.
    pub layout: LayoutOptions,
}

impl Default for TrellisConfig {
    fn default() -> Self {
        Self {
            org: "local".to_string(),
            snapshot_dir: PathBuf::from("."),
            notification_log: PathBuf::from("notifications.jsonl"),
            layout: LayoutOptions::default(),
        }
    }
}

impl TrellisConfig {
    /// Load configuration from `dir/trellis.yaml`, falling back to
    /// defaults when the file does not exist.
    pub async fn load_or_default(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                let config: Self = serde_yaml::from_str(&contents)?;
                debug!(path = %path.display(), "loaded configuration");
                Ok(config)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no configuration file, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Resolve the snapshot directory against the project directory.
    #[must_use]
    pub fn snapshot_dir_in(&self, project_dir: &Path) -> PathBuf {
        resolve(project_dir, &self.snapshot_dir)
    }

    /// Resolve the notification log path against the project directory.
    #[must_use]
    pub fn notification_log_in(&self, project_dir: &Path) -> PathBuf {
        resolve(project_dir, &self.notification_log)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let config: TrellisConfig = serde_yaml::from_str("org: acme\n").unwrap();
        assert_eq!(config.org, "acme");
        assert_eq!(config.snapshot_dir, PathBuf::from("."));
        assert_eq!(config.layout.columns, 5);
    }

    #[test]
    fn layout_section_overrides() {
        let yaml = "layout:\n  columns: 3\n  x_gap: 10.0\n";
        let config: TrellisConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.layout.columns, 3);
        assert_eq!(config.layout.x_gap, 10.0);
        // Unspecified layout fields keep their defaults.
        assert_eq!(config.layout.y_gap, LayoutOptions::default().y_gap);
    }

    #[test]
    fn absolute_paths_are_left_alone() {
        let config = TrellisConfig {
            snapshot_dir: PathBuf::from("/data/snap"),
            ..TrellisConfig::default()
        };
        assert_eq!(
            config.snapshot_dir_in(Path::new("/proj")),
            PathBuf::from("/data/snap")
        );
        assert_eq!(
            config.notification_log_in(Path::new("/proj")),
            PathBuf::from("/proj/notifications.jsonl")
        );
    }
}
