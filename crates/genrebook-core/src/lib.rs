//! # genrebook-core
//!
//! In-memory catalog of musical genres and the songs assigned to them.
//!
//! The catalog answers three questions:
//! - which genre a song currently belongs to
//! - how many songs a genre currently holds
//! - how many times a song's genre has changed through merges
//!
//! Genre membership is a disjoint-set forest (union by song count, path
//! compression) whose nodes carry lazy change counters. Genres and songs
//! are looked up by id through two resizable chained hash tables.
//!
//! ## Architectural Constraints
//!
//! - Single-threaded and synchronous: no async, no I/O, no internal locking
//! - Every operation commits all of its mutations or none of them
//! - Errors are values (`CatalogError`); no caller-reachable panics
//! - The core emits `tracing` events but never installs a subscriber

// =============================================================================
// MODULES
// =============================================================================

pub mod catalog;
pub mod config;
pub mod forest;
pub mod keystore;
pub mod primitives;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{CatalogError, ConfigError, GenreId, KeyStoreError, SongId, StatusType};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use catalog::{Catalog, CatalogStats};
pub use config::CatalogConfig;
pub use forest::{Forest, NodeHandle, NodeKind};
pub use keystore::{KeyStore, StoreKey};
