use dart::{DartError, ErrorKind};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Dart(#[from] DartError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub(crate) const fn exit_code(&self) -> u8 {
        match self {
            Self::Dart(e) => match e.kind() {
                ErrorKind::NotFound => 2,
                ErrorKind::FetchFailure => 3,
                ErrorKind::Initialization => 4,
                ErrorKind::InvalidInput => 64,
            },
            Self::Serialization(_) => 70,
            Self::Io(_) => 74,
        }
    }
}
