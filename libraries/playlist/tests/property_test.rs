//! Property-based tests for the playlist
//!
//! Uses proptest to drive random operation sequences against a plain `Vec`
//! model. Every step checks size, front, playback order and the sorted track
//! view, plus the contents of an earlier copy that must never change.

use playlist::{Playlist, PlaylistError, TryClone};
use proptest::prelude::*;
use std::collections::BTreeMap;

type Model = Vec<(u8, u16)>;

#[derive(Debug, Clone)]
enum Op {
    Push(u8, u16),
    Pop,
    Remove(u8),
    Clear,
    Snapshot,
    SetParams(usize, u16),
}

// ===== Helpers =====

fn arbitrary_op() -> impl Strategy<Value = Op> {
    // Few distinct tracks so that duplicates are common
    prop_oneof![
        4 => (0u8..8, any::<u16>()).prop_map(|(track, params)| Op::Push(track, params)),
        2 => Just(Op::Pop),
        1 => (0u8..10).prop_map(Op::Remove),
        1 => Just(Op::Clear),
        1 => Just(Op::Snapshot),
        1 => (0usize..32, any::<u16>()).prop_map(|(index, params)| Op::SetParams(index, params)),
    ]
}

fn contents(playlist: &Playlist<u8, u16>) -> Model {
    playlist.plays().map(|(track, params)| (*track, *params)).collect()
}

fn sorted_counts(model: &Model) -> Vec<(u8, usize)> {
    let mut counts = BTreeMap::new();
    for (track, _) in model {
        *counts.entry(*track).or_insert(0usize) += 1;
    }
    counts.into_iter().collect()
}

fn check(playlist: &Playlist<u8, u16>, model: &Model) -> Result<(), TestCaseError> {
    prop_assert_eq!(playlist.size(), model.len());
    prop_assert_eq!(&contents(playlist), model);

    match model.first() {
        Some((track, params)) => {
            let front = playlist.front().map(|(t, p)| (*t, *p)).ok();
            prop_assert_eq!(front, Some((*track, *params)));
        }
        None => prop_assert!(matches!(playlist.front(), Err(PlaylistError::EmptyContainer))),
    }

    let counts: Vec<(u8, usize)> = playlist.tracks().map(|(track, n)| (*track, n)).collect();
    prop_assert_eq!(&counts, &sorted_counts(model));
    prop_assert_eq!(playlist.track_count(), counts.len());
    Ok(())
}

// ===== Property Tests =====

proptest! {
    /// Property: playlist behaves like a Vec of plays, and copies never see later mutations
    #[test]
    fn matches_vec_model(ops in prop::collection::vec(arbitrary_op(), 1..80)) {
        let mut playlist: Playlist<u8, u16> = Playlist::new();
        let mut model: Model = Vec::new();
        let mut snapshot: Option<(Playlist<u8, u16>, Model)> = None;

        for op in ops {
            match op {
                Op::Push(track, params) => {
                    playlist.push_back(&track, &params).unwrap();
                    model.push((track, params));
                }
                Op::Pop => {
                    let result = playlist.pop_front();
                    if model.is_empty() {
                        prop_assert!(matches!(result, Err(PlaylistError::EmptyContainer)));
                    } else {
                        prop_assert!(result.is_ok());
                        model.remove(0);
                    }
                }
                Op::Remove(track) => {
                    let expected = model.iter().filter(|(t, _)| *t == track).count();
                    let result = playlist.remove(&track);
                    if expected == 0 {
                        prop_assert!(matches!(result, Err(PlaylistError::UnknownTrack)));
                    } else {
                        prop_assert_eq!(result.ok(), Some(expected));
                        model.retain(|(t, _)| *t != track);
                    }
                }
                Op::Clear => {
                    playlist.clear();
                    model.clear();
                }
                Op::Snapshot => {
                    snapshot = Some((playlist.try_clone().unwrap(), model.clone()));
                }
                Op::SetParams(index, params) => {
                    if !model.is_empty() {
                        let index = index % model.len();
                        let mut cursor = playlist.play_begin();
                        for _ in 0..index {
                            cursor = playlist.play_next(cursor).unwrap();
                        }
                        *playlist.params_mut(cursor).unwrap() = params;
                        model[index].1 = params;
                    }
                }
            }

            check(&playlist, &model)?;
            if let Some((copy, copy_model)) = &snapshot {
                check(copy, copy_model)?;
            }
        }
    }

    /// Property: sorted cursors visit each distinct track once, in order
    #[test]
    fn sorted_cursor_visits_distinct_tracks(tracks in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut playlist: Playlist<u8, ()> = Playlist::new();
        for track in &tracks {
            playlist.push_back(track, &()).unwrap();
        }

        let mut visited = Vec::new();
        let mut cursor = playlist.sorted_begin();
        while cursor != playlist.sorted_end() {
            visited.push(*playlist.pay(cursor).unwrap().0);
            cursor = playlist.sorted_next(cursor).unwrap();
        }

        let mut expected = tracks.clone();
        expected.sort_unstable();
        expected.dedup();
        prop_assert_eq!(visited, expected);
    }

    /// Property: cursors to plays that are not removed keep pointing at them
    #[test]
    fn untouched_cursors_survive(
        tracks in prop::collection::vec(0u8..6, 2..40),
        removed in 0u8..6
    ) {
        let mut playlist: Playlist<u8, usize> = Playlist::new();
        let cursors: Vec<_> = tracks
            .iter()
            .enumerate()
            .map(|(i, track)| playlist.push_back(track, &i).unwrap())
            .collect();

        let expected = tracks.iter().filter(|track| **track == removed).count();
        let result = playlist.remove(&removed);
        if expected == 0 {
            prop_assert!(matches!(result, Err(PlaylistError::UnknownTrack)));
        } else {
            prop_assert_eq!(result.ok(), Some(expected));
        }
        playlist.push_back(&99, &usize::MAX).unwrap();

        for (i, (track, cursor)) in tracks.iter().zip(&cursors).enumerate() {
            let seen = playlist.play(*cursor);
            if *track == removed {
                prop_assert!(matches!(seen, Err(PlaylistError::InvalidCursor)));
            } else {
                prop_assert_eq!(seen.ok(), Some((track, &i)));
            }
        }
    }
}
