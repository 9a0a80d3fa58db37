//! Playlist handle - copy-on-write value type
//!
//! A `Playlist` points at a reference-counted state. Copies share that state
//! until one of them mutates it; the mutating handle then detaches onto a deep
//! copy of its own. Every mutation stages its fallible work against the
//! current (possibly shared) state first, so a failure neither changes the
//! contents nor breaks sharing.

use crate::{
    cursor::{PlayCursor, Plays, SortedCursor, Tracks},
    error::{PlaylistError, Result, ValueError},
    state::PlaylistState,
    types::PlaylistConfig,
    value::{TrackOrd, TryClone},
};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace};

/// Ordered list of plays with deduplicated track storage
///
/// Each play pairs a track `T` with its own params `P`. Equal tracks (by
/// [`TrackOrd`]) are stored once, in the first form they were pushed.
///
/// Copy with [`TryClone::try_clone`]: O(1) while the handle is shareable.
pub struct Playlist<T, P> {
    /// State shared with every handle copied from this one
    state: Rc<PlaylistState<T, P>>,

    /// False while a `params_mut` reference may be outstanding
    shareable: bool,
}

impl<T, P> Playlist<T, P> {
    /// Create an empty playlist
    pub fn new() -> Self {
        Self::with_config(&PlaylistConfig::default())
    }

    /// Create an empty playlist with capacities from `config`
    pub fn with_config(config: &PlaylistConfig) -> Self {
        Self {
            state: Rc::new(PlaylistState::new(config)),
            shareable: true,
        }
    }

    /// Number of plays
    pub fn size(&self) -> usize {
        self.state.len()
    }

    /// Check if there are no plays
    pub fn is_empty(&self) -> bool {
        self.state.len() == 0
    }

    /// Number of distinct tracks
    pub fn track_count(&self) -> usize {
        self.state.tracks.len()
    }

    /// Next play's track and params
    pub fn front(&self) -> Result<(&T, &P)> {
        self.state.front()
    }

    /// Drop every play
    ///
    /// Swaps in a fresh empty state; handles that shared the old one keep it.
    /// Cursors taken before the call are invalidated.
    pub fn clear(&mut self) {
        trace!(plays = self.state.len(), "clearing playlist");
        self.state = Rc::new(self.state.successor());
        self.shareable = true;
    }

    /// Whether copies of this handle may share its state
    pub fn is_shareable(&self) -> bool {
        self.shareable
    }

    /// Whether both handles currently point at the same state
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    // ===== Cursors =====

    /// Cursor at the front play
    pub fn play_begin(&self) -> PlayCursor {
        PlayCursor(self.state.plays.head())
    }

    /// Past-the-end play cursor
    pub fn play_end(&self) -> PlayCursor {
        PlayCursor::END
    }

    /// Cursor at the smallest track
    pub fn sorted_begin(&self) -> SortedCursor {
        SortedCursor(self.state.tracks.first())
    }

    /// Past-the-end track cursor
    pub fn sorted_end(&self) -> SortedCursor {
        SortedCursor::END
    }

    /// Advance a play cursor
    ///
    /// Fails with `InvalidCursor` on the end cursor or a removed play.
    pub fn play_next(&self, at: PlayCursor) -> Result<PlayCursor> {
        at.0
            .and_then(|play| self.state.plays.next_of(play))
            .map(PlayCursor)
            .ok_or(PlaylistError::InvalidCursor)
    }

    /// Advance a track cursor
    ///
    /// Fails with `InvalidCursor` on the end cursor or an erased track.
    pub fn sorted_next(&self, at: SortedCursor) -> Result<SortedCursor> {
        at.0
            .and_then(|entry| self.state.tracks.next_of(entry))
            .map(SortedCursor)
            .ok_or(PlaylistError::InvalidCursor)
    }

    /// Track and params of the play at `at`
    pub fn play(&self, at: PlayCursor) -> Result<(&T, &P)> {
        at.0
            .and_then(|play| self.state.play(play))
            .ok_or(PlaylistError::InvalidCursor)
    }

    /// Track at `at` and how many times it is played
    pub fn pay(&self, at: SortedCursor) -> Result<(&T, usize)> {
        at.0
            .and_then(|entry| self.state.pay(entry))
            .ok_or(PlaylistError::InvalidCursor)
    }

    /// Params of the play at `at`, read-only; never detaches
    pub fn params(&self, at: PlayCursor) -> Result<&P> {
        self.play(at).map(|(_, params)| params)
    }

    // ===== Iterators =====

    /// Plays in playback order
    pub fn plays(&self) -> Plays<'_, T, P> {
        Plays::new(&self.state)
    }

    /// Distinct tracks in track order, with play counts
    pub fn tracks(&self) -> Tracks<'_, T, P> {
        Tracks::new(&self.state)
    }
}

/// Make `state` exclusively owned by the caller's handle
///
/// Deep-copies a shared state. If the copy fails the handle keeps the shared
/// state and stays valid.
fn detach<T: TryClone, P: TryClone>(
    state: &mut Rc<PlaylistState<T, P>>,
) -> Result<&mut PlaylistState<T, P>> {
    if Rc::get_mut(state).is_none() {
        let copy = state.duplicate()?;
        trace!(plays = copy.len(), tracks = copy.tracks.len(), "detached shared playlist state");
        *state = Rc::new(copy);
    }
    Ok(Rc::get_mut(state).expect("detached playlist state has a single owner"))
}

impl<T: TryClone, P: TryClone> Playlist<T, P> {
    /// Remove the front play
    ///
    /// Fails with `EmptyContainer` when there is nothing to remove.
    pub fn pop_front(&mut self) -> Result<()> {
        if self.is_empty() {
            return Err(PlaylistError::EmptyContainer);
        }
        detach(&mut self.state)?.pop_front()?;
        self.shareable = true;
        Ok(())
    }

    /// Mutable params of the play at `at`
    ///
    /// Detaches like a mutation, and marks the handle unshareable: copies made
    /// from it deep-copy until its next structural mutation.
    pub fn params_mut(&mut self, at: PlayCursor) -> Result<&mut P> {
        let play = at.0.ok_or(PlaylistError::InvalidCursor)?;
        if self.state.play(play).is_none() {
            return Err(PlaylistError::InvalidCursor);
        }

        let state = detach(&mut self.state)?;
        self.shareable = false;
        state.params_mut(play).ok_or(PlaylistError::InvalidCursor)
    }
}

impl<T: TrackOrd + TryClone, P: TryClone> Playlist<T, P> {
    /// Append a play of `track` with `params`
    ///
    /// A track equal to one already present reuses the stored copy. On any
    /// failure the playlist is unchanged and still shares storage as before.
    pub fn push_back(&mut self, track: &T, params: &P) -> Result<PlayCursor> {
        let staged = self.state.stage_push(track, params).map_err(|err| {
            debug!(error = %err, "push_back discarded before commit");
            err
        })?;

        let play = detach(&mut self.state)?.commit_push(staged);
        self.shareable = true;
        Ok(PlayCursor(Some(play)))
    }

    /// Remove every play of `track`
    ///
    /// Fails with `UnknownTrack` if the track is absent. The lookup happens
    /// before anything is touched, so a failing comparison changes nothing.
    /// Returns the number of plays removed.
    pub fn remove(&mut self, track: &T) -> Result<usize> {
        let entry = self.state.find(track).map_err(|err| {
            debug!(error = %err, "remove discarded before commit");
            err
        })?;

        let removed = detach(&mut self.state)?.erase_track(entry);
        self.shareable = true;
        Ok(removed)
    }
}

impl<T: TryClone, P: TryClone> TryClone for Playlist<T, P> {
    /// Share the state, or deep-copy it if this handle is unshareable
    fn try_clone(&self) -> std::result::Result<Self, ValueError> {
        if self.shareable {
            return Ok(Self {
                state: Rc::clone(&self.state),
                shareable: true,
            });
        }

        let copy = self.state.duplicate()?;
        trace!(plays = copy.len(), "deep-copied unshareable playlist");
        Ok(Self {
            state: Rc::new(copy),
            shareable: true,
        })
    }
}

impl<T, P> Default for Playlist<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, P: fmt::Debug> fmt::Debug for Playlist<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.plays()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist_of(tracks: &[u32]) -> Playlist<u32, String> {
        let mut playlist = Playlist::new();
        for &track in tracks {
            playlist.push_back(&track, &format!("p{}", track)).unwrap();
        }
        playlist
    }

    fn order<T: Copy, P>(playlist: &Playlist<T, P>) -> Vec<T> {
        playlist.plays().map(|(track, _)| *track).collect()
    }

    #[test]
    fn create_empty_playlist() {
        let playlist = Playlist::<u32, u32>::new();
        assert_eq!(playlist.size(), 0);
        assert!(playlist.is_empty());
        assert!(playlist.is_shareable());
        assert_eq!(playlist.play_begin(), playlist.play_end());
        assert_eq!(playlist.sorted_begin(), playlist.sorted_end());
    }

    #[test]
    fn push_back_then_front() {
        let playlist = playlist_of(&[7, 3]);
        assert_eq!(playlist.front().unwrap(), (&7, &"p7".to_string()));
        assert_eq!(playlist.size(), 2);
    }

    #[test]
    fn front_and_pop_on_empty() {
        let mut playlist = Playlist::<u32, u32>::new();
        assert!(matches!(playlist.front(), Err(PlaylistError::EmptyContainer)));
        assert!(matches!(playlist.pop_front(), Err(PlaylistError::EmptyContainer)));
    }

    #[test]
    fn copy_shares_until_mutation() {
        let mut original = playlist_of(&[1, 2]);
        let copy = original.try_clone().unwrap();
        assert!(original.shares_storage_with(&copy));

        original.push_back(&3, &"p3".to_string()).unwrap();
        assert!(!original.shares_storage_with(&copy));
        assert_eq!(order(&original), vec![1, 2, 3]);
        assert_eq!(order(&copy), vec![1, 2]);
    }

    #[test]
    fn unique_handle_mutates_in_place() {
        let mut playlist = playlist_of(&[1]);
        let before = Rc::as_ptr(&playlist.state);
        playlist.push_back(&2, &"p2".to_string()).unwrap();
        assert_eq!(Rc::as_ptr(&playlist.state), before);
    }

    #[test]
    fn failed_remove_keeps_sharing() {
        let mut original = playlist_of(&[1, 2]);
        let copy = original.try_clone().unwrap();

        assert!(matches!(original.remove(&9), Err(PlaylistError::UnknownTrack)));
        assert!(original.shares_storage_with(&copy));
    }

    #[test]
    fn params_mut_marks_unshareable() {
        let mut playlist = playlist_of(&[1, 2]);
        let front = playlist.play_begin();
        playlist.params_mut(front).unwrap().push('!');
        assert!(!playlist.is_shareable());

        let copy = playlist.try_clone().unwrap();
        assert!(!playlist.shares_storage_with(&copy));
        assert!(copy.is_shareable());
        assert_eq!(copy.params(front).unwrap(), "p1!");

        playlist.pop_front().unwrap();
        assert!(playlist.is_shareable());
    }

    #[test]
    fn params_mut_rejects_end_cursor() {
        let mut playlist = playlist_of(&[1]);
        let end = playlist.play_end();
        assert!(matches!(playlist.params_mut(end), Err(PlaylistError::InvalidCursor)));
        assert!(playlist.is_shareable());
    }

    #[test]
    fn clear_leaves_copies_alone() {
        let mut playlist = playlist_of(&[1, 2, 3]);
        let copy = playlist.try_clone().unwrap();
        let cursor = playlist.play_begin();

        playlist.clear();
        assert!(playlist.is_empty());
        assert_eq!(copy.size(), 3);

        playlist.push_back(&4, &"p4".to_string()).unwrap();
        assert!(matches!(playlist.play(cursor), Err(PlaylistError::InvalidCursor)));
        assert_eq!(copy.play(cursor).unwrap().0, &1);
    }

    #[test]
    fn cursor_walks_to_end() {
        let playlist = playlist_of(&[4, 5]);
        let mut cursor = playlist.play_begin();
        cursor = playlist.play_next(cursor).unwrap();
        assert_eq!(playlist.play(cursor).unwrap().0, &5);
        cursor = playlist.play_next(cursor).unwrap();
        assert!(cursor.is_end());
        assert!(matches!(playlist.play_next(cursor), Err(PlaylistError::InvalidCursor)));
    }

    #[test]
    fn debug_lists_plays() {
        let playlist = playlist_of(&[1]);
        assert_eq!(format!("{:?}", playlist), r#"[(1, "p1")]"#);
    }
}
