use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TTL: u8 = 64;
pub const DEFAULT_RECEIVE_TIMEOUT_MILLIS: u64 = 250;
pub const DEFAULT_IDENTIFIER_PORT: u16 = 0;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("failed to read configuration file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed configuration")]
    Parse(#[from] serde_json::Error),
    #[error("ttl must be at least 1")]
    ZeroTtl,
    #[error("receive_timeout_millis must be at least 1")]
    ZeroTimeout,
}

/// Settings of one sweep.
///
/// Missing fields in a JSON file take their default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfiguration {
    /// Hop limit of every echo request.
    pub ttl: u8,
    /// How long each probe waits for its reply.
    pub receive_timeout_millis: u64,
    /// Written into the echo identifier field.
    pub identifier_port: u16,
}

impl Default for ScanConfiguration {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            receive_timeout_millis: DEFAULT_RECEIVE_TIMEOUT_MILLIS,
            identifier_port: DEFAULT_IDENTIFIER_PORT,
        }
    }
}

impl ScanConfiguration {
    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_millis)
    }

    pub fn decode(data: &str) -> Result<Self, ConfigurationError> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigurationError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode(&data)
    }

    /// Defaults, or the content of `path` when given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn with_overrides(
        mut self,
        ttl: Option<u8>,
        receive_timeout_millis: Option<u64>,
        identifier_port: Option<u16>,
    ) -> Self {
        if let Some(ttl) = ttl {
            self.ttl = ttl;
        }
        if let Some(timeout) = receive_timeout_millis {
            self.receive_timeout_millis = timeout;
        }
        if let Some(identifier) = identifier_port {
            self.identifier_port = identifier;
        }
        self
    }

    pub fn validate(self) -> Result<Self, ConfigurationError> {
        if self.ttl == 0 {
            return Err(ConfigurationError::ZeroTtl);
        }
        if self.receive_timeout_millis == 0 {
            return Err(ConfigurationError::ZeroTimeout);
        }
        Ok(self)
    }
}
