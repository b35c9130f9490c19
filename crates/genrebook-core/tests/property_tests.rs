//! # Property-Based Tests
//!
//! Random operation sequences checked against a naive reference model
//! that tracks genre membership and change counts explicitly.

use genrebook_core::{Catalog, CatalogError, GenreId, SongId};
use proptest::collection::vec;
use proptest::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// REFERENCE MODEL
// =============================================================================

#[derive(Debug, Clone, Copy)]
enum Op {
    AddGenre(i32),
    AddSong(i32, i32),
    Merge(i32, i32, i32),
}

/// Explicit bookkeeping: every live genre id names a family, every song
/// records its family and how many merges moved it.
#[derive(Debug, Default)]
struct Model {
    genres: BTreeMap<i32, u64>,
    songs: BTreeMap<i32, (u64, u64)>,
    recycled: BTreeSet<i32>,
    next_family: u64,
}

impl Model {
    fn family(&mut self) -> u64 {
        self.next_family += 1;
        self.next_family
    }

    fn add_genre(&mut self, id: i32) -> Result<(), CatalogError> {
        if id <= 0 {
            return Err(CatalogError::InvalidInput);
        }
        if self.genres.contains_key(&id) {
            return if self.recycled.remove(&id) {
                Ok(())
            } else {
                Err(CatalogError::OperationFailed)
            };
        }
        let family = self.family();
        self.genres.insert(id, family);
        Ok(())
    }

    fn add_song(&mut self, song: i32, genre: i32) -> Result<(), CatalogError> {
        if song <= 0 || genre <= 0 {
            return Err(CatalogError::InvalidInput);
        }
        let Some(&family) = self.genres.get(&genre) else {
            return Err(CatalogError::OperationFailed);
        };
        if self.songs.contains_key(&song) {
            return Err(CatalogError::OperationFailed);
        }
        self.songs.insert(song, (family, 0));
        self.recycled.remove(&genre);
        Ok(())
    }

    fn merge(&mut self, a: i32, b: i32, c: i32) -> Result<(), CatalogError> {
        if a <= 0 || b <= 0 || c <= 0 || a == b || a == c || b == c {
            return Err(CatalogError::InvalidInput);
        }
        let (Some(&fa), Some(&fb)) = (self.genres.get(&a), self.genres.get(&b)) else {
            return Err(CatalogError::OperationFailed);
        };
        if self.genres.contains_key(&c) {
            return Err(CatalogError::OperationFailed);
        }

        let merged = self.family();
        for (family, changes) in self.songs.values_mut() {
            if *family == fa || *family == fb {
                *family = merged;
                *changes += 1;
            }
        }
        self.genres.insert(c, merged);
        for id in [a, b] {
            let fresh = self.family();
            self.genres.insert(id, fresh);
            self.recycled.insert(id);
        }
        Ok(())
    }

    fn song_genre(&self, song: i32) -> Option<i32> {
        let (family, _) = self.songs.get(&song)?;
        self.genres
            .iter()
            .find(|(_, f)| *f == family)
            .map(|(id, _)| *id)
    }

    fn song_count(&self, genre: i32) -> Option<u64> {
        let family = self.genres.get(&genre)?;
        Some(self.songs.values().filter(|(f, _)| f == family).count() as u64)
    }
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-1i32..10).prop_map(Op::AddGenre),
        (-1i32..30, -1i32..10).prop_map(|(s, g)| Op::AddSong(s, g)),
        (-1i32..10, -1i32..10, -1i32..12).prop_map(|(a, b, c)| Op::Merge(a, b, c)),
    ]
}

type Outcome = Result<(), CatalogError>;

/// Run `op` on both sides and return (catalog, model) results.
fn apply(catalog: &mut Catalog, model: &mut Model, op: Op) -> (Outcome, Outcome) {
    match op {
        Op::AddGenre(g) => (catalog.add_genre(GenreId(g)), model.add_genre(g)),
        Op::AddSong(s, g) => (
            catalog.add_song(SongId(s), GenreId(g)),
            model.add_song(s, g),
        ),
        Op::Merge(a, b, c) => (
            catalog.merge_genres(GenreId(a), GenreId(b), GenreId(c)),
            model.merge(a, b, c),
        ),
    }
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Every operation result and every final query agrees with the model.
    #[test]
    fn catalog_matches_reference_model(ops in vec(op_strategy(), 1..200)) {
        let mut catalog = Catalog::new();
        let mut model = Model::default();

        for op in ops {
            let (actual, expected) = apply(&mut catalog, &mut model, op);
            prop_assert_eq!(actual, expected, "op {:?}", op);
        }

        for (&song, &(_, changes)) in &model.songs {
            prop_assert_eq!(catalog.get_number_of_genre_changes(SongId(song)), Ok(changes));
            let genre = model.song_genre(song).map(GenreId);
            prop_assert_eq!(catalog.get_song_genre(SongId(song)).ok(), genre);
        }
        for &genre in model.genres.keys() {
            prop_assert_eq!(
                catalog.get_number_of_songs_by_genre(GenreId(genre)).ok(),
                model.song_count(genre)
            );
        }
        prop_assert_eq!(catalog.stats().songs, model.songs.len());
        prop_assert_eq!(catalog.stats().genres, model.genres.len());
    }

    /// Reads never change what later reads observe.
    #[test]
    fn reads_are_idempotent(ops in vec(op_strategy(), 1..150)) {
        let mut catalog = Catalog::new();
        let mut model = Model::default();
        for op in ops {
            let _ = apply(&mut catalog, &mut model, op);
        }

        for &song in model.songs.keys() {
            let first = (
                catalog.get_song_genre(SongId(song)),
                catalog.get_number_of_genre_changes(SongId(song)),
            );
            let second = (
                catalog.get_song_genre(SongId(song)),
                catalog.get_number_of_genre_changes(SongId(song)),
            );
            prop_assert_eq!(first, second);
        }
    }

    /// Live genre ids always name pairwise distinct roots, so a merge of two
    /// live ids never meets a shared root.
    #[test]
    fn live_genres_have_distinct_families(ops in vec(op_strategy(), 1..150)) {
        let mut catalog = Catalog::new();
        let mut model = Model::default();
        for op in ops {
            let _ = apply(&mut catalog, &mut model, op);
        }

        let live: Vec<i32> = model.genres.keys().copied().collect();
        for pair in live.windows(2) {
            let target = 1000 + pair[0];
            prop_assert_eq!(
                catalog.merge_genres(GenreId(pair[0]), GenreId(pair[1]), GenreId(target)),
                Ok(())
            );
            // The consumed id is live again, and empty
            prop_assert_eq!(catalog.get_number_of_songs_by_genre(GenreId(pair[0])), Ok(0));
        }
    }
}
