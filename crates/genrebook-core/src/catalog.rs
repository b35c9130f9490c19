//! # Catalog
//!
//! Genre and song bookkeeping on top of two key stores and one merge forest.
//!
//! Every public operation is a single transaction:
//! - Arguments are validated first (`InvalidInput`, no mutation)
//! - Existence is checked next (`OperationFailed`, no mutation)
//! - All storage is reserved before the first visible mutation, so
//!   `AllocationError` always leaves the catalog as it was
//!
//! Path compression performed by lookups is not a visible mutation.

use crate::config::CatalogConfig;
use crate::forest::{Forest, NodeHandle};
use crate::keystore::KeyStore;
use crate::{CatalogError, GenreId, SongId};
use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR LOGGING HELPERS
// =============================================================================

/// Log storage exhaustion before handing the result back.
///
/// Validation failures are the caller's business and stay quiet.
#[inline]
fn warn_on_exhaustion<T>(
    result: Result<T, CatalogError>,
    operation: &'static str,
) -> Result<T, CatalogError> {
    if let Err(CatalogError::AllocationError) = result {
        tracing::warn!(operation, "storage exhausted; catalog unchanged");
    }
    result
}

// =============================================================================
// STATS
// =============================================================================

/// Size snapshot of a catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    /// Songs ever added.
    pub songs: usize,
    /// Genre ids currently live.
    pub genres: usize,
    /// Forest nodes, including genres retired by merges.
    pub forest_nodes: usize,
    /// Buckets of the song store.
    pub song_buckets: usize,
    /// Buckets of the genre store.
    pub genre_buckets: usize,
}

// =============================================================================
// GENRE ENTRY
// =============================================================================

/// Record stored under a live genre id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GenreEntry {
    /// Root of the genre's merge family.
    node: NodeHandle,
    /// Re-created by a merge and untouched since. `add_genre` may claim it
    /// once.
    recycled: bool,
}

// =============================================================================
// CATALOG
// =============================================================================

/// In-memory catalog of genres and songs.
///
/// Every live genre id maps to the root of its merge family; every song id
/// maps to its own forest node.
#[derive(Debug, Clone)]
pub struct Catalog {
    songs: KeyStore<SongId, NodeHandle>,
    genres: KeyStore<GenreId, GenreEntry>,
    forest: Forest,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// Create an empty catalog with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&CatalogConfig::default())
    }

    /// Create an empty catalog from `config`.
    #[must_use]
    pub fn with_config(config: &CatalogConfig) -> Self {
        Self {
            songs: KeyStore::with_floor(config.min_buckets).with_limit(config.max_songs),
            genres: KeyStore::with_floor(config.min_buckets).with_limit(config.max_genres),
            forest: Forest::new(),
        }
    }

    /// Size snapshot. Does not compress any path.
    #[must_use]
    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            songs: self.songs.len(),
            genres: self.genres.len(),
            forest_nodes: self.forest.len(),
            song_buckets: self.songs.bucket_count(),
            genre_buckets: self.genres.bucket_count(),
        }
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Create an empty genre named `genre_id`.
    ///
    /// An id recycled by `merge_genres` already names an empty genre; the
    /// first `add_genre` on it claims that genre and succeeds, provided no
    /// song was added to it in between.
    pub fn add_genre(&mut self, genre_id: GenreId) -> Result<(), CatalogError> {
        warn_on_exhaustion(self.try_add_genre(genre_id), "add_genre")
    }

    fn try_add_genre(&mut self, genre_id: GenreId) -> Result<(), CatalogError> {
        if !genre_id.is_valid() {
            return Err(CatalogError::InvalidInput);
        }
        if let Some(entry) = self.genres.find_mut(genre_id) {
            if !entry.recycled {
                return Err(CatalogError::OperationFailed);
            }
            entry.recycled = false;
            tracing::debug!(genre_id = genre_id.0, "recycled genre claimed");
            return Ok(());
        }

        self.forest.reserve(1)?;
        self.genres.reserve(1)?;

        let node = self.forest.add_genre(genre_id)?;
        self.genres.insert(
            genre_id,
            GenreEntry {
                node,
                recycled: false,
            },
        )?;

        tracing::debug!(genre_id = genre_id.0, "genre added");
        Ok(())
    }

    /// Add song `song_id` to the genre currently named `genre_id`.
    pub fn add_song(&mut self, song_id: SongId, genre_id: GenreId) -> Result<(), CatalogError> {
        warn_on_exhaustion(self.try_add_song(song_id, genre_id), "add_song")
    }

    fn try_add_song(&mut self, song_id: SongId, genre_id: GenreId) -> Result<(), CatalogError> {
        if !song_id.is_valid() || !genre_id.is_valid() {
            return Err(CatalogError::InvalidInput);
        }
        let genre = self
            .genres
            .find(genre_id)
            .map(|entry| entry.node)
            .ok_or(CatalogError::OperationFailed)?;
        if self.songs.contains_key(song_id) {
            return Err(CatalogError::OperationFailed);
        }

        self.forest.reserve(1)?;
        self.songs.reserve(1)?;

        let root = self.forest.find_root(genre);
        let song = self.forest.add_song(root)?;
        self.songs.insert(song_id, song)?;
        if let Some(entry) = self.genres.find_mut(genre_id) {
            entry.recycled = false;
        }

        tracing::debug!(song_id = song_id.0, genre_id = genre_id.0, "song added");
        Ok(())
    }

    /// Merge the genres named `first` and `second` into one named `merged`.
    ///
    /// Every song of both genres records one genre change. Afterwards
    /// `first` and `second` name brand-new empty genres.
    ///
    /// If both ids resolve to the same root the merge is refused with
    /// `OperationFailed`; live genre ids always name distinct roots, so this
    /// only guards against a broken invariant.
    pub fn merge_genres(
        &mut self,
        first: GenreId,
        second: GenreId,
        merged: GenreId,
    ) -> Result<(), CatalogError> {
        warn_on_exhaustion(self.try_merge_genres(first, second, merged), "merge_genres")
    }

    fn try_merge_genres(
        &mut self,
        first: GenreId,
        second: GenreId,
        merged: GenreId,
    ) -> Result<(), CatalogError> {
        if !first.is_valid() || !second.is_valid() || !merged.is_valid() {
            return Err(CatalogError::InvalidInput);
        }
        if first == second || first == merged || second == merged {
            return Err(CatalogError::InvalidInput);
        }

        let first_node = self.genre_node(first)?;
        let second_node = self.genre_node(second)?;
        if self.genres.contains_key(merged) {
            return Err(CatalogError::OperationFailed);
        }

        let first_root = self.forest.find_root(first_node);
        let second_root = self.forest.find_root(second_node);
        if first_root == second_root {
            return Err(CatalogError::OperationFailed);
        }

        // Net growth: one genre id, two fresh genre nodes
        self.forest.reserve(2)?;
        self.genres.reserve(1)?;

        let root = self.forest.union(first_root, second_root);
        self.forest.relabel(root, merged);
        self.genres.insert(
            merged,
            GenreEntry {
                node: root,
                recycled: false,
            },
        )?;

        // Recycle the consumed ids as unrelated, empty genres
        for id in [first, second] {
            self.genres.remove(id)?;
            let node = self.forest.add_genre(id)?;
            self.genres.insert(
                id,
                GenreEntry {
                    node,
                    recycled: true,
                },
            )?;
        }

        tracing::debug!(
            first = first.0,
            second = second.0,
            merged = merged.0,
            song_count = self.forest.song_count(root),
            "genres merged"
        );
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Id of the genre `song_id` currently belongs to.
    pub fn get_song_genre(&mut self, song_id: SongId) -> Result<GenreId, CatalogError> {
        let song = self.song_node(song_id)?;
        self.forest
            .label(song)
            .ok_or(CatalogError::OperationFailed)
    }

    /// Number of songs in the genre currently named `genre_id`.
    pub fn get_number_of_songs_by_genre(&mut self, genre_id: GenreId) -> Result<u64, CatalogError> {
        if !genre_id.is_valid() {
            return Err(CatalogError::InvalidInput);
        }
        let genre = self.genre_node(genre_id)?;
        Ok(self.forest.song_count(genre))
    }

    /// Number of merges the genre of `song_id` went through since the song
    /// was added.
    pub fn get_number_of_genre_changes(&mut self, song_id: SongId) -> Result<u64, CatalogError> {
        let song = self.song_node(song_id)?;
        Ok(self.forest.changes(song))
    }

    fn genre_node(&self, genre_id: GenreId) -> Result<NodeHandle, CatalogError> {
        self.genres
            .find(genre_id)
            .map(|entry| entry.node)
            .ok_or(CatalogError::OperationFailed)
    }

    fn song_node(&self, song_id: SongId) -> Result<NodeHandle, CatalogError> {
        if !song_id.is_valid() {
            return Err(CatalogError::InvalidInput);
        }
        self.songs
            .find(song_id)
            .copied()
            .ok_or(CatalogError::OperationFailed)
    }
}

// =============================================================================
// TESTS
// =============================================================================
