//! Errors raised while staging and packaging.
//!
//! Packagers return [`Result`]. Two extension traits keep call sites short:
//!
//! - [`Context`] wraps an error (or a `None`) with a message
//! - [`ErrorExt::fs_context`] attaches the operation and path to an I/O error
//!
//! [`bail!`](crate::bail) returns a formatted [`Error::GenericError`].
//!
//! ```no_run
//! use electronifier_release::bail;
//! use electronifier_release::bundler::{Context, ErrorExt, Result};
//! use std::path::Path;
//!
//! fn read_control(path: &Path) -> Result<String> {
//!     let contents = std::fs::read_to_string(path).fs_context("reading control file", path)?;
//!     if !contents.starts_with("Package:") {
//!         bail!("control file {} has no Package field", path.display());
//!     }
//!     contents
//!         .lines()
//!         .next()
//!         .map(str::to_string)
//!         .context("control file is empty")
//! }
//! ```

use std::{
    fmt::Display,
    io,
    path::{self, PathBuf},
};
use thiserror::Error as DeriveError;

/// Packaging failure.
#[derive(Debug, DeriveError)]
pub enum Error {
    /// A failure wrapped with a description of what was being attempted
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// I/O failure on a known path
    #[error("{context} {path}: {error}")]
    Fs {
        /// Operation, e.g. "copying file"
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        error: io::Error,
    },

    /// I/O failure without a path
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// Directory walk failure
    #[error("{0}")]
    WalkdirError(#[from] walkdir::Error),

    /// Walked path outside its root
    #[error("{0}")]
    StripError(#[from] path::StripPrefixError),

    /// Zip encoder failure
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Launch settings serialization failure
    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    /// `Info.plist` write failure
    #[error("{0}")]
    Plist(#[from] plist::Error),

    /// Blocking archive task panicked or was cancelled
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Anything else, described by its message
    #[error("{0}")]
    GenericError(String),
}

/// Packaging result.
pub type Result<T> = std::result::Result<T, Error>;

/// Adds a message to a failed [`Result`] or a `None`.
pub trait Context<T> {
    /// Wraps the failure with `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Wraps the failure with a lazily built message.
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.with_context(|| context)
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|inner| Error::Context(f().to_string(), Box::new(inner)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.with_context(|| context)
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Attaches an operation and path to I/O errors.
pub trait ErrorExt<T> {
    /// `context` is a present-tense phrase such as "creating directory".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for io::Result<T> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Returns early with a formatted [`Error::GenericError`].
#[macro_export]
macro_rules! bail {
    ($($arg:tt)+) => {
        return Err($crate::bundler::error::Error::GenericError(format!($($arg)+)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_wraps_inner_error() {
        let result: Result<()> = Err(Error::GenericError("disk full".into()));
        let err = result.context("writing data.tar.gz").unwrap_err();
        assert_eq!(err.to_string(), "writing data.tar.gz: disk full");
    }

    #[test]
    fn test_option_context_becomes_generic_error() {
        let missing: Option<u8> = None;
        let err = missing.context("no executable found").unwrap_err();
        assert!(matches!(err, Error::GenericError(ref m) if m == "no executable found"));
    }

    #[test]
    fn test_fs_context_records_path() {
        let result: io::Result<()> = Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let err = result.fs_context("opening icon", "/tmp/icon.png").unwrap_err();
        assert_eq!(err.to_string(), "opening icon /tmp/icon.png: gone");
    }

    fn bails(value: u32) -> Result<u32> {
        if value > 3 {
            bail!("value {} out of range", value);
        }
        Ok(value)
    }

    #[test]
    fn test_bail_formats_message() {
        assert_eq!(bails(2).unwrap(), 2);
        assert_eq!(bails(9).unwrap_err().to_string(), "value 9 out of range");
    }
}
