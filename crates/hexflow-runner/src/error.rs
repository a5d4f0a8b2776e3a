//! Error types for the headless runner.

use hexflow_data::LoadError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The config file exists but is not valid TOML for [`RunConfig`].
    ///
    /// [`RunConfig`]: crate::config::RunConfig
    #[error("invalid config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Neither the config file nor the command line named a save file.
    #[error("no save file given (pass one on the command line or set `save_file`)")]
    MissingSaveFile,

    #[error("failed to load {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: LoadError,
    },

    #[error("snapshot serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
