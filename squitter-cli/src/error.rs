//! Errors surfaced by the CLI.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid point {0:?}: expected LAT,LON[,ALT_FT]")]
    InvalidPoint(String),
    #[error("no origin: pass --from or set a receiver position with `squitter config`")]
    NoOrigin,
}
