//! Cursors and iterators
//!
//! Cursors are plain `Copy` positions. They do not borrow the playlist, so they
//! survive mutations; each use goes through the playlist, which checks that the
//! position is still live. Iterators borrow the playlist and walk it in one go.

use crate::arena::Key;
use crate::state::PlaylistState;

/// Position in playback order
///
/// Stays valid until its own play is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayCursor(pub(crate) Option<Key>);

impl PlayCursor {
    pub(crate) const END: Self = Self(None);

    /// Whether this is the past-the-end position
    pub fn is_end(&self) -> bool {
        self.0.is_none()
    }
}

/// Position in track order
///
/// Stays valid until its track's last play is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortedCursor(pub(crate) Option<Key>);

impl SortedCursor {
    pub(crate) const END: Self = Self(None);

    /// Whether this is the past-the-end position
    pub fn is_end(&self) -> bool {
        self.0.is_none()
    }
}

/// Plays in playback order, as `(track, params)`
pub struct Plays<'a, T, P> {
    state: &'a PlaylistState<T, P>,
    next: Option<Key>,
    remaining: usize,
}

impl<'a, T, P> Plays<'a, T, P> {
    pub(crate) fn new(state: &'a PlaylistState<T, P>) -> Self {
        Self {
            state,
            next: state.plays.head(),
            remaining: state.len(),
        }
    }
}

impl<'a, T, P> Iterator for Plays<'a, T, P> {
    type Item = (&'a T, &'a P);

    fn next(&mut self) -> Option<Self::Item> {
        let play = self.next?;
        let node = &self.state.plays[play];
        self.next = node.next;
        self.remaining -= 1;
        Some((&self.state.tracks[node.track].track, &node.params))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, P> ExactSizeIterator for Plays<'_, T, P> {}

/// Distinct tracks in track order, as `(track, play count)`
pub struct Tracks<'a, T, P> {
    state: &'a PlaylistState<T, P>,
    next: Option<Key>,
    remaining: usize,
}

impl<'a, T, P> Tracks<'a, T, P> {
    pub(crate) fn new(state: &'a PlaylistState<T, P>) -> Self {
        Self {
            state,
            next: state.tracks.first(),
            remaining: state.tracks.len(),
        }
    }
}

impl<'a, T, P> Iterator for Tracks<'a, T, P> {
    type Item = (&'a T, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = &self.state.tracks[self.next?];
        self.next = entry.next;
        self.remaining -= 1;
        Some((&entry.track, entry.count))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, P> ExactSizeIterator for Tracks<'_, T, P> {}
