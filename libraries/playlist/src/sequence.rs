//! Play sequence
//!
//! Plays in playback order (front = next to play), stored as a doubly-linked
//! list threaded through an arena so that removing one play never moves another.
//!
//! Every play also carries the links of its track's occurrence list. Those are
//! owned by the playlist state, which keeps them in step with the registry.

use crate::arena::{Arena, Key};

/// One occurrence of a track in playback order
#[derive(Debug)]
pub(crate) struct PlayNode<P> {
    /// Registry entry of the track being played
    pub track: Key,

    /// Neighbours in playback order
    pub prev: Option<Key>,
    pub next: Option<Key>,

    /// Neighbours in the track's occurrence list
    pub prev_same: Option<Key>,
    pub next_same: Option<Key>,

    /// Per-play parameters
    pub params: P,
}

/// Arena-backed linked list of plays
#[derive(Debug)]
pub(crate) struct PlaySequence<P> {
    nodes: Arena<PlayNode<P>>,
    head: Option<Key>,
    tail: Option<Key>,
}

impl<P> PlaySequence<P> {
    /// Create an empty sequence
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    /// Empty sequence whose keys never collide with keys of `self`
    pub fn successor(&self) -> Self {
        Self {
            nodes: self.nodes.successor(),
            head: None,
            tail: None,
        }
    }

    /// Append a play for `track` at the back
    ///
    /// The occurrence links start empty.
    pub fn push_back(&mut self, track: Key, params: P) -> Key {
        let key = self.nodes.insert(PlayNode {
            track,
            prev: self.tail,
            next: None,
            prev_same: None,
            next_same: None,
            params,
        });

        match self.tail {
            Some(tail) => self.nodes[tail].next = Some(key),
            None => self.head = Some(key),
        }
        self.tail = Some(key);
        key
    }

    /// Detach a play from playback order and hand back the node
    ///
    /// Occurrence links inside the node are left as they were.
    pub fn unlink(&mut self, key: Key) -> Option<PlayNode<P>> {
        let node = self.nodes.remove(key)?;

        match node.prev {
            Some(prev) => self.nodes[prev].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.nodes[next].prev = node.prev,
            None => self.tail = node.prev,
        }
        Some(node)
    }

    /// Front play
    pub fn head(&self) -> Option<Key> {
        self.head
    }

    /// Play following `key`, if `key` is live
    pub fn next_of(&self, key: Key) -> Option<Option<Key>> {
        self.nodes.get(key).map(|node| node.next)
    }

    pub fn get(&self, key: Key) -> Option<&PlayNode<P>> {
        self.nodes.get(key)
    }

    pub fn get_mut(&mut self, key: Key) -> Option<&mut PlayNode<P>> {
        self.nodes.get_mut(key)
    }

    /// Number of plays
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Copy every play, keeping keys and links intact
    pub fn try_duplicate<E>(
        &self,
        mut copy_params: impl FnMut(&P) -> Result<P, E>,
    ) -> Result<Self, E> {
        let nodes = self.nodes.try_duplicate(|node| -> Result<PlayNode<P>, E> {
            Ok(PlayNode {
                track: node.track,
                prev: node.prev,
                next: node.next,
                prev_same: node.prev_same,
                next_same: node.next_same,
                params: copy_params(&node.params)?,
            })
        })?;

        Ok(Self {
            nodes,
            head: self.head,
            tail: self.tail,
        })
    }
}

impl<P> std::ops::Index<Key> for PlaySequence<P> {
    type Output = PlayNode<P>;

    fn index(&self, key: Key) -> &PlayNode<P> {
        &self.nodes[key]
    }
}

impl<P> std::ops::IndexMut<Key> for PlaySequence<P> {
    fn index_mut(&mut self, key: Key) -> &mut PlayNode<P> {
        &mut self.nodes[key]
    }
}
