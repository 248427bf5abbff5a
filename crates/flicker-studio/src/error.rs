use std::io;
use std::path::PathBuf;

use flicker_engine::paint::ParseColorError;
use thiserror::Error;

/// Failures detected while assembling the settings, before anything runs.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("config file does not define control `{name}` and it was not given on the command line")]
    MissingControl { name: &'static str },

    #[error("invalid color for `{name}`")]
    InvalidColor {
        name: &'static str,
        #[source]
        source: ParseColorError,
    },

    #[error("invalid value for `{name}`: {reason}")]
    InvalidValue { name: &'static str, reason: String },

    #[error("failed to read config {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
