use std::{io, path::PathBuf};

/// Failures of the file half of the lifecycle (Open/Save and the startup path).
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is too large ({len} bytes, limit is {limit})", path.display())]
    TooLarge { path: PathBuf, len: u64, limit: u64 },
}

impl FileError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Read { path, .. } | Self::Write { path, .. } | Self::TooLarge { path, .. } => {
                path
            }
        }
    }
}

/// The markdown converter rejected its input.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("markdown conversion failed: {0}")]
pub struct ConversionError(pub String);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
