//! # Core Type Definitions
//!
//! This module contains the shared types of the catalog:
//! - Entity identifiers (`SongId`, `GenreId`)
//! - Caller-visible errors (`CatalogError`) and driver status codes (`StatusType`)
//! - Internal store and configuration errors (`KeyStoreError`, `ConfigError`)
//!
//! Song ids and genre ids live in independent namespaces. A numeric
//! collision between a song and a genre is harmless.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// ENTITY IDENTIFIERS
// =============================================================================

/// Identifier of a song. Immutable for the lifetime of the song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SongId(pub i32);

/// Identifier of a genre.
///
/// A genre id names the current root of one merge family. Merging two
/// genres hands the family a fresh id and recycles the two consumed ids
/// as new, empty genres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GenreId(pub i32);

impl SongId {
    /// Ids must be strictly positive.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 > 0
    }
}

impl GenreId {
    /// Ids must be strictly positive.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "song#{}", self.0)
    }
}

impl fmt::Display for GenreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "genre#{}", self.0)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors returned by catalog operations.
///
/// - `InvalidInput` is checked first and never mutates state
/// - `OperationFailed` leaves state unchanged
/// - `AllocationError` leaves state consistent, never half-mutated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Malformed arguments: a non-positive id or repeated merge operands.
    #[error("invalid input")]
    InvalidInput,

    /// Well-formed arguments that contradict the catalog state.
    #[error("operation failed")]
    OperationFailed,

    /// Storage exhausted while creating records or growing a table.
    #[error("allocation error")]
    AllocationError,
}

impl CatalogError {
    /// Status code a driver reports for this error.
    #[must_use]
    pub const fn status(self) -> StatusType {
        match self {
            Self::InvalidInput => StatusType::InvalidInput,
            Self::OperationFailed => StatusType::Failure,
            Self::AllocationError => StatusType::AllocationError,
        }
    }
}

impl From<KeyStoreError> for CatalogError {
    fn from(err: KeyStoreError) -> Self {
        match err {
            KeyStoreError::KeyNotFound => Self::OperationFailed,
            KeyStoreError::AllocationError => Self::AllocationError,
        }
    }
}

/// Flat status codes, in the order external drivers print them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusType {
    Success,
    AllocationError,
    InvalidInput,
    Failure,
}

impl StatusType {
    /// Collapse an operation result into its status code.
    #[must_use]
    pub fn of<T>(result: &Result<T, CatalogError>) -> Self {
        match result {
            Ok(_) => Self::Success,
            Err(err) => err.status(),
        }
    }

    /// Upper-case name used in driver transcripts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::AllocationError => "ALLOCATION_ERROR",
            Self::InvalidInput => "INVALID_INPUT",
            Self::Failure => "FAILURE",
        }
    }
}

impl fmt::Display for StatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by a `KeyStore`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KeyStoreError {
    /// `remove` was called for a key that is not stored.
    #[error("key not found")]
    KeyNotFound,

    /// The store hit its record limit or the allocator refused to grow it.
    #[error("key store allocation failed")]
    AllocationError,
}

/// Errors raised while loading a `CatalogConfig`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The TOML document could not be decoded.
    #[error("config parse error: {0}")]
    Parse(String),

    /// A value decoded but is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// =============================================================================
// TESTS
// =============================================================================
