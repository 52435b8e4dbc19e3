use std::{
    io,
    path::{Path, PathBuf},
};

use novelty_tree::Order;
use novelty_view::LayoutOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub const CONFIG_FILE_NAME: &str = "novelty.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutOptions,
    pub traversal: TraversalConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    pub order: Order,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Config {
    /// Load from a config file, or from `novelty.toml` inside a directory.
    /// A missing file gives the defaults.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let path = if path.is_dir() {
            path.join(CONFIG_FILE_NAME)
        } else {
            path.to_path_buf()
        };

        let code = match tokio::fs::read_to_string(&path).await {
            Ok(code) => code,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                debug!(path = ?path, "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        let config: Config =
            toml::from_str(&code).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?;
        info!(path = ?path, "loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [layout]
            horizontal_spacing = 30.0

            [traversal]
            order = "bfs"
            "#,
        )
        .unwrap();
        assert_eq!(config.layout.horizontal_spacing, 30.0);
        assert_eq!(config.layout.vertical_spacing, 12.0);
        assert_eq!(config.traversal.order, Order::Bfs);
    }

    #[tokio::test]
    async fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).await.unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.traversal.order, Order::Dfs);
    }

    #[tokio::test]
    async fn reads_file_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[traversal]\norder = \"bfs\"\n",
        )
        .unwrap();
        let config = Config::load(dir.path()).await.unwrap();
        assert_eq!(config.traversal.order, Order::Bfs);
    }

    #[tokio::test]
    async fn invalid_order_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[traversal]\norder = \"sideways\"\n").unwrap();
        let err = Config::load(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
