// crates/filer-core/src/error.rs - Error taxonomy
//
// Every module has its own error enum. `FilerError` gathers them so a single
// top-level handler can report any fatal condition with its category.
//
// CATEGORIES:
// - Configuration: unsupported platform, missing selector, bad arguments
// - Resolution: the site directory could not answer
// - Persistence: the bookmark could not be planned or written
// - Validation: the client executable is missing
// - Launch: the shell could not be started
//
// Unverified-client warnings are not errors; see `client::SupportWarning`.

use std::fmt;
use std::io;
use thiserror::Error;

use crate::bookmark::PersistenceError;
use crate::client::ClientError;
use crate::config::ConfigError;
use crate::connection::ResolveError;
use crate::platform::PlatformError;
use crate::validate::ValidationError;

/// Any fatal condition of a launcher invocation
#[derive(Error, Debug)]
pub enum FilerError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to start '{command}': {source}")]
    Launch {
        command: String,
        #[source]
        source: io::Error,
    },
}

/// Result type for a whole launcher invocation
pub type FilerResult<T> = Result<T, FilerError>;

/// Coarse classification used when reporting errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Resolution,
    Persistence,
    Validation,
    Launch,
}

impl FilerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Platform(_) | Self::Client(_) | Self::Config(_) => ErrorCategory::Configuration,
            Self::Resolve(_) => ErrorCategory::Resolution,
            Self::Persistence(_) => ErrorCategory::Persistence,
            Self::Validation(_) => ErrorCategory::Validation,
            Self::Launch { .. } => ErrorCategory::Launch,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Configuration => "configuration error",
            Self::Resolution => "lookup failed",
            Self::Persistence => "bookmark error",
            Self::Validation => "client not found",
            Self::Launch => "launch failed",
        })
    }
}
