//! Decode errors. Every variant raised during decoding carries the key path of the failure.

use crate::key::{Key, KeyPath};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("key not found: {key} has no integer value (at {path})")]
    KeyNotFound { key: Key, path: KeyPath },
    #[error("out of bounds at {path}: needed {needed} bytes at offset {offset}, region holds {available}")]
    OutOfBounds {
        path: KeyPath,
        offset: usize,
        needed: usize,
        available: usize,
    },
    #[error("malformed string at {path}: {reason}")]
    MalformedString { path: KeyPath, reason: StringError },
    #[error("data corrupted at {path}: {message}")]
    DataCorrupted { path: KeyPath, message: String },
    #[error("unknown layout: {0}")]
    UnknownLayout(String),
}

impl DecodeError {
    /// Key path of the failing decode, when there is one.
    pub fn path(&self) -> Option<&KeyPath> {
        match self {
            DecodeError::KeyNotFound { path, .. }
            | DecodeError::OutOfBounds { path, .. }
            | DecodeError::MalformedString { path, .. }
            | DecodeError::DataCorrupted { path, .. } => Some(path),
            DecodeError::UnknownLayout(_) => None,
        }
    }
}

/// Why a string could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StringError {
    #[error("no null terminator before the end of the region")]
    Unterminated,
    #[error("invalid UTF-8 after {valid_up_to} valid bytes")]
    InvalidUtf8 { valid_up_to: usize },
}
