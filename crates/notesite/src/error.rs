//! CLI error types.

use notesite_config::ConfigError;
use notesite_server::ServeError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Serve(#[from] ServeError),
}
