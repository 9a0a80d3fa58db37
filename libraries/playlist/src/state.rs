//! Playlist state
//!
//! The play sequence and the track registry, kept in step with each other:
//!
//! ```text
//! Registry (track order)          Sequence (playback order)
//! ──────────────────────          ─────────────────────────
//!   A  count 2  first ──────────▶ #0 A ─▶ #1 B ─▶ #2 A ─▶ #3 C
//!               last  ──────────▶ #2
//!   B  count 1  first/last ─────▶ #1
//!   C  count 1  first/last ─────▶ #3
//! ```
//!
//! Every play names its registry entry, and every entry threads an occurrence
//! list through exactly the plays of its track (`prev_same`/`next_same`).
//!
//! Mutations are split in two. Staging does everything that can fail
//! (comparisons, copies of caller values) without touching the state; commit
//! applies the staged result using only steps that cannot fail. A failure
//! therefore leaves the state exactly as it was.

use crate::arena::Key;
use crate::error::{PlaylistError, Result, ValueError};
use crate::registry::{Lookup, Position, TrackRegistry};
use crate::sequence::PlaySequence;
use crate::types::PlaylistConfig;
use crate::value::{TrackOrd, TryClone};

/// Play sequence plus track registry
#[derive(Debug)]
pub(crate) struct PlaylistState<T, P> {
    pub plays: PlaySequence<P>,
    pub tracks: TrackRegistry<T>,
}

/// Track half of a staged `push_back`
#[derive(Debug)]
enum StagedTrack<T> {
    /// Track already registered
    Existing(Key),

    /// First play of this track; carries its canonical copy
    New { position: Position, track: T },
}

/// A `push_back` with all fallible work done
#[derive(Debug)]
pub(crate) struct StagedPlay<T, P> {
    track: StagedTrack<T>,
    params: P,
}

impl<T, P> PlaylistState<T, P> {
    /// Create an empty state
    pub fn new(config: &PlaylistConfig) -> Self {
        Self {
            plays: PlaySequence::with_capacity(config.play_capacity),
            tracks: TrackRegistry::with_capacity(config.track_capacity),
        }
    }

    /// Empty state whose keys never collide with keys of `self`
    pub fn successor(&self) -> Self {
        Self {
            plays: self.plays.successor(),
            tracks: self.tracks.successor(),
        }
    }

    /// Number of plays
    pub fn len(&self) -> usize {
        self.plays.len()
    }

    /// Stage appending a play of `track` with `params`
    ///
    /// Looks the track up, copies it if it has never been played, then copies
    /// the params. Nothing is modified.
    pub fn stage_push(&self, track: &T, params: &P) -> Result<StagedPlay<T, P>>
    where
        T: TrackOrd + TryClone,
        P: TryClone,
    {
        let track = match self.tracks.lookup(track)? {
            Lookup::Found(entry) => StagedTrack::Existing(entry),
            Lookup::Vacant(position) => StagedTrack::New {
                position,
                track: track.try_clone()?,
            },
        };
        let params = params.try_clone()?;

        Ok(StagedPlay { track, params })
    }

    /// Apply a staged play
    ///
    /// `staged` must come from `stage_push` on this state or on the state it
    /// was duplicated from, with no mutation in between.
    pub fn commit_push(&mut self, staged: StagedPlay<T, P>) -> Key {
        let entry = match staged.track {
            StagedTrack::Existing(entry) => entry,
            StagedTrack::New { position, track } => self.tracks.insert_at(position, track),
        };
        let play = self.plays.push_back(entry, staged.params);
        self.link_occurrence(entry, play);
        play
    }

    /// Append `play` to the occurrence list of `entry`
    fn link_occurrence(&mut self, entry: Key, play: Key) {
        let last = self.tracks[entry].last;
        match last {
            Some(last) => self.plays[last].next_same = Some(play),
            None => self.tracks[entry].first = Some(play),
        }

        let node = &mut self.plays[play];
        node.prev_same = last;
        node.next_same = None;

        let record = &mut self.tracks[entry];
        record.last = Some(play);
        record.count += 1;
    }

    /// Take `play` out of its track's occurrence list
    ///
    /// Returns the entry it belonged to.
    fn unlink_occurrence(&mut self, play: Key) -> Key {
        let node = &self.plays[play];
        let (entry, prev, next) = (node.track, node.prev_same, node.next_same);

        match prev {
            Some(prev) => self.plays[prev].next_same = next,
            None => self.tracks[entry].first = next,
        }
        match next {
            Some(next) => self.plays[next].prev_same = prev,
            None => self.tracks[entry].last = prev,
        }
        self.tracks[entry].count -= 1;
        entry
    }

    /// Remove the front play, dropping its track's entry if it was the last play
    pub fn pop_front(&mut self) -> Result<()> {
        let front = self.plays.head().ok_or(PlaylistError::EmptyContainer)?;

        let entry = self.unlink_occurrence(front);
        if self.tracks[entry].count == 0 {
            self.tracks.erase(entry);
        }
        self.plays.unlink(front);
        Ok(())
    }

    /// Registry entry for `track`
    ///
    /// Fails with `UnknownTrack` when absent; comparison failures propagate.
    pub fn find(&self, track: &T) -> Result<Key>
    where
        T: TrackOrd,
    {
        match self.tracks.lookup(track)? {
            Lookup::Found(entry) => Ok(entry),
            Lookup::Vacant(_) => Err(PlaylistError::UnknownTrack),
        }
    }

    /// Remove every play of `entry`, then the entry itself
    ///
    /// Returns the number of plays removed.
    pub fn erase_track(&mut self, entry: Key) -> usize {
        let mut removed = 0;
        let mut cursor = self.tracks[entry].first;
        while let Some(play) = cursor {
            cursor = self.plays[play].next_same;
            self.plays.unlink(play);
            removed += 1;
        }
        self.tracks.erase(entry);
        removed
    }

    /// Front play's track and params
    pub fn front(&self) -> Result<(&T, &P)> {
        let front = self.plays.head().ok_or(PlaylistError::EmptyContainer)?;
        let node = &self.plays[front];
        Ok((&self.tracks[node.track].track, &node.params))
    }

    /// Track and params of a live play
    pub fn play(&self, play: Key) -> Option<(&T, &P)> {
        let node = self.plays.get(play)?;
        Some((&self.tracks[node.track].track, &node.params))
    }

    /// Track and play count of a live registry entry
    pub fn pay(&self, entry: Key) -> Option<(&T, usize)> {
        self.tracks.get(entry).map(|entry| (&entry.track, entry.count))
    }

    /// Mutable params of a live play
    pub fn params_mut(&mut self, play: Key) -> Option<&mut P> {
        self.plays.get_mut(play).map(|node| &mut node.params)
    }

    /// Deep copy
    ///
    /// Tracks are copied once per registry entry and params once per play.
    /// Keys are preserved, so every cross-reference and every cursor that is
    /// valid for `self` is valid for the copy.
    pub fn duplicate(&self) -> std::result::Result<Self, ValueError>
    where
        T: TryClone,
        P: TryClone,
    {
        Ok(Self {
            tracks: self.tracks.try_duplicate(T::try_clone)?,
            plays: self.plays.try_duplicate(P::try_clone)?,
        })
    }
}

#[cfg(test)]
impl<T: TrackOrd, P> PlaylistState<T, P> {
    /// Panic unless sequence and registry agree with each other
    pub fn assert_consistent(&self) {
        // Walk playback order, counting plays per entry.
        let mut seen = std::collections::HashMap::new();
        let mut walked = 0;
        let mut cursor = self.plays.head();
        while let Some(play) = cursor {
            let node = &self.plays[play];
            assert!(
                self.tracks.get(node.track).is_some(),
                "play points at a dead registry entry"
            );
            *seen.entry(node.track).or_insert(0usize) += 1;
            walked += 1;
            cursor = node.next;
        }
        assert_eq!(walked, self.plays.len(), "sequence length out of sync");

        // Every entry's occurrence list is exactly its plays, and is non-empty.
        self.tracks.assert_consistent();
        let keys: Vec<Key> = self.tracks.keys().collect();
        for &entry in &keys {
            let record = &self.tracks[entry];
            assert!(record.count > 0, "registry entry with no plays");
            assert_eq!(seen.get(&entry).copied(), Some(record.count));

            let mut listed = 0;
            let mut prev = None;
            let mut cursor = record.first;
            while let Some(play) = cursor {
                let node = &self.plays[play];
                assert_eq!(node.track, entry, "occurrence list crosses tracks");
                assert_eq!(node.prev_same, prev, "occurrence back-link broken");
                listed += 1;
                prev = Some(play);
                cursor = node.next_same;
            }
            assert_eq!(record.last, prev);
            assert_eq!(listed, record.count);
        }
        assert_eq!(seen.len(), keys.len(), "play refers to an unlisted entry");
    }
}
