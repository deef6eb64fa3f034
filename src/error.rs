use std::fmt;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for palspr operations
#[derive(Error, Diagnostic, Debug)]
pub enum SprError {
    #[error("Cannot open {path}: {message}")]
    #[diagnostic(code(palspr::open))]
    CannotOpen { path: PathBuf, message: String },

    #[error("Bad format: {message}")]
    #[diagnostic(code(palspr::format))]
    BadFormat {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("Out of memory: {message}")]
    #[diagnostic(code(palspr::memory))]
    OutOfMemory { message: String },

    #[error("Read error with {path}: {message}")]
    #[diagnostic(code(palspr::read))]
    ReadFailure { path: PathBuf, message: String },

    #[error("Write error with {path}: {message}")]
    #[diagnostic(code(palspr::write))]
    WriteFailure { path: PathBuf, message: String },

    #[error("Limit exceeded: {message}")]
    #[diagnostic(code(palspr::limit))]
    LimitExceeded {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl SprError {
    pub fn bad_format(message: impl Into<String>) -> Self {
        SprError::BadFormat {
            message: message.into(),
            help: None,
        }
    }

    pub fn limit(message: impl Into<String>) -> Self {
        SprError::LimitExceeded {
            message: message.into(),
            help: None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SprError>;

/// Allocate a zero-filled buffer, reporting allocation failure instead of aborting.
pub fn alloc_zeroed<T: Clone + Default>(len: usize, what: &str) -> Result<Vec<T>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|e| SprError::OutOfMemory {
        message: format!("{} ({} elements): {}", what, len, e),
    })?;
    buf.resize(len, T::default());
    Ok(buf)
}

/// Pipeline stage a failure happened in; each stage exits with its own status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Options,
    Load,
    Palette,
    Convert,
    Save,
}

impl Stage {
    pub fn exit_code(self) -> u8 {
        match self {
            Stage::Options => OPTIONS_EXIT_CODE,
            Stage::Load => 2,
            Stage::Palette => 4,
            Stage::Convert => 6,
            Stage::Save => 8,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Options => write!(f, "reading options"),
            Stage::Load => write!(f, "loading images"),
            Stage::Palette => write!(f, "loading palette"),
            Stage::Convert => write!(f, "converting colours"),
            Stage::Save => write!(f, "saving output"),
        }
    }
}

/// Exit status for malformed command line options.
pub const OPTIONS_EXIT_CODE: u8 = 11;

/// An error tagged with the stage that produced it.
#[derive(Debug)]
pub struct StageError {
    pub stage: Stage,
    pub error: SprError,
}

impl fmt::Display for StageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.error)
    }
}

impl std::error::Error for StageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Attach a pipeline stage to a result.
pub trait StageExt<T> {
    fn stage(self, stage: Stage) -> std::result::Result<T, StageError>;
}

impl<T> StageExt<T> for Result<T> {
    fn stage(self, stage: Stage) -> std::result::Result<T, StageError> {
        self.map_err(|error| StageError { stage, error })
    }
}
