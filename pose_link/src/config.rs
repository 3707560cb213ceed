use std::{
    env, fs, io,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    time::Duration,
};

use bevy::prelude::Resource;
use serde::Deserialize;
use thiserror::Error;

pub const BUILTIN_LINK_CONFIG: &str = include_str!("data/link_config.json");
pub const LINK_CONFIG_PATH_ENV: &str = "POSE_LINK_CONFIG_PATH";

pub const DEFAULT_PORT: u16 = 12345;

/// Listener settings for the pose link.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub bind: SocketAddr,
    pub poll_interval_ms: u64,
    pub read_buffer_bytes: usize,
    pub read_timeout_ms: u64,
    pub accept_error_backoff_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            poll_interval_ms: 20,
            read_buffer_bytes: 1024,
            read_timeout_ms: 1000,
            accept_error_backoff_ms: 200,
        }
    }
}

impl LinkConfig {
    pub fn builtin() -> Self {
        serde_json::from_str(BUILTIN_LINK_CONFIG).expect("builtin link config should parse")
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, LinkConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| LinkConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = LinkConfig::from_json_str(&contents)?;
        Ok(config)
    }

    /// Loopback address on an OS-assigned port.
    pub fn ephemeral() -> Self {
        Self {
            bind: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
            ..Self::default()
        }
    }

    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Never zero: a zero timeout is rejected by the socket layer.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms.max(1))
    }

    pub fn accept_error_backoff(&self) -> Duration {
        Duration::from_millis(self.accept_error_backoff_ms)
    }

    pub fn read_buffer_bytes(&self) -> usize {
        self.read_buffer_bytes.max(1)
    }
}

#[derive(Debug, Error)]
pub enum LinkConfigError {
    #[error("failed to parse link config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read link config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Load the link config from `POSE_LINK_CONFIG_PATH`, falling back to the
/// builtin settings when the variable is unset or the file is unusable.
pub fn load_link_config_from_env() -> (LinkConfig, Option<PathBuf>) {
    let Some(path) = env::var(LINK_CONFIG_PATH_ENV).ok().map(PathBuf::from) else {
        tracing::info!(target: "pose_link::config", "link_config.loaded=builtin");
        return (LinkConfig::builtin(), None);
    };

    match LinkConfig::from_file(&path) {
        Ok(config) => {
            tracing::info!(
                target: "pose_link::config",
                path = %path.display(),
                bind = %config.bind,
                "link_config.loaded=file"
            );
            (config, Some(path))
        }
        Err(err) => {
            tracing::warn!(
                target: "pose_link::config",
                path = %path.display(),
                error = %err,
                "link_config.load_failed"
            );
            (LinkConfig::builtin(), None)
        }
    }
}
