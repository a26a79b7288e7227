//! Error taxonomy for per-item conversion failures.
//!
//! Every failure is classified into a [`FailureKind`] so the final report can
//! group them. Only `DeviceFull` halts the whole batch; everything else is
//! recorded and the batch moves on to the next item.

use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Coarse failure category carried into the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    PermissionDenied,
    UnrecognizedFormat,
    SystemError,
    DeviceFull,
    Unexpected,
}

impl FailureKind {
    pub fn label(&self) -> &'static str {
        match self {
            FailureKind::NotFound => "not found",
            FailureKind::PermissionDenied => "permission denied",
            FailureKind::UnrecognizedFormat => "unrecognized format",
            FailureKind::SystemError => "system error",
            FailureKind::DeviceFull => "device full",
            FailureKind::Unexpected => "unexpected",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("unrecognized image data in {}: {detail}", .path.display())]
    UnrecognizedFormat { path: PathBuf, detail: String },

    #[error("I/O error on {}: {source}", .path.display())]
    System {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("device full while writing {}, aborting batch", .0.display())]
    DeviceFull(PathBuf),

    #[error("unexpected error on {}: {detail}", .path.display())]
    Unexpected { path: PathBuf, detail: String },
}

impl ConvertError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ConvertError::NotFound(_) => FailureKind::NotFound,
            ConvertError::PermissionDenied(_) => FailureKind::PermissionDenied,
            ConvertError::UnrecognizedFormat { .. } => FailureKind::UnrecognizedFormat,
            ConvertError::System { .. } => FailureKind::SystemError,
            ConvertError::DeviceFull(_) => FailureKind::DeviceFull,
            ConvertError::Unexpected { .. } => FailureKind::Unexpected,
        }
    }

    /// The one category that must halt the whole batch.
    pub fn halts_batch(&self) -> bool {
        self.kind() == FailureKind::DeviceFull
    }

    /// Classifies a raw I/O error against the path it happened on.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ConvertError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => ConvertError::PermissionDenied(path.to_path_buf()),
            io::ErrorKind::StorageFull | io::ErrorKind::QuotaExceeded => {
                ConvertError::DeviceFull(path.to_path_buf())
            }
            _ => ConvertError::System {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// Classifies a codec-library error. Decode failures on a file that
    /// matched a supported extension are format problems, not batch bugs.
    pub fn from_image(path: &Path, err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(io_err) => Self::from_io(path, io_err),
            image::ImageError::Decoding(_) | image::ImageError::Unsupported(_) => {
                ConvertError::UnrecognizedFormat {
                    path: path.to_path_buf(),
                    detail: err.to_string(),
                }
            }
            other => ConvertError::Unexpected {
                path: path.to_path_buf(),
                detail: other.to_string(),
            },
        }
    }
}
