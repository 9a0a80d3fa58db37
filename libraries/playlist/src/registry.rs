//! Track registry
//!
//! One entry per distinct track, holding the canonical copy of the track and
//! the ends of its occurrence list. Entries live in an arena so plays can point
//! at them, and form an AVL tree ordered by track. Every entry also links to
//! its neighbours in track order, so sorted iteration and erasing by key never
//! search.
//!
//! Only `lookup` compares tracks. Insertion at a looked-up position and
//! erasure relink keys and cannot fail.

use crate::arena::{Arena, Key};
use crate::error::ValueError;
use crate::value::TrackOrd;
use std::cmp::Ordering;

/// Registry entry for one distinct track
#[derive(Debug)]
pub(crate) struct TrackEntry<T> {
    /// Canonical copy, the first one inserted
    pub track: T,

    /// Ends of the occurrence list, in playback order
    pub first: Option<Key>,
    pub last: Option<Key>,

    /// Length of the occurrence list
    pub count: usize,

    /// Neighbours in track order
    prev: Option<Key>,
    pub next: Option<Key>,

    // Tree links
    parent: Option<Key>,
    left: Option<Key>,
    right: Option<Key>,
    height: u32,
}

/// Which child slot of the parent a new entry takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// Empty tree slot where a missing track belongs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Position {
    parent: Option<Key>,
    side: Side,
}

/// Outcome of a registry lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lookup {
    /// Track already has an entry
    Found(Key),

    /// Track is new and belongs at this position
    Vacant(Position),
}

/// Sorted map from track to its occurrence list
#[derive(Debug)]
pub(crate) struct TrackRegistry<T> {
    entries: Arena<TrackEntry<T>>,
    root: Option<Key>,

    /// Entry with the smallest track
    head: Option<Key>,
}

impl<T> TrackRegistry<T> {
    /// Create an empty registry
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arena::with_capacity(capacity),
            root: None,
            head: None,
        }
    }

    /// Empty registry whose keys never collide with keys of `self`
    pub fn successor(&self) -> Self {
        Self {
            entries: self.entries.successor(),
            root: None,
            head: None,
        }
    }

    /// Find `track`, or the position a new entry for it would take
    ///
    /// Performs O(log n) comparisons and touches nothing, so a failing
    /// comparison leaves the registry exactly as it was.
    pub fn lookup(&self, track: &T) -> Result<Lookup, ValueError>
    where
        T: TrackOrd,
    {
        let mut position = Position {
            parent: None,
            side: Side::Left,
        };
        let mut cursor = self.root;
        while let Some(key) = cursor {
            let entry = &self.entries[key];
            position.parent = Some(key);
            match entry.track.try_cmp(track)? {
                Ordering::Less => {
                    position.side = Side::Right;
                    cursor = entry.right;
                }
                Ordering::Greater => {
                    position.side = Side::Left;
                    cursor = entry.left;
                }
                Ordering::Equal => return Ok(Lookup::Found(key)),
            }
        }
        Ok(Lookup::Vacant(position))
    }

    /// Add an entry with an empty occurrence list at `position`
    ///
    /// `position` must come from a `Lookup::Vacant` on this registry (or on the
    /// registry it was duplicated from) with no insertion or erase in between.
    pub fn insert_at(&mut self, position: Position, track: T) -> Key {
        let (prev, next) = match position.parent {
            None => (None, None),
            Some(parent) => match position.side {
                Side::Left => (self.entries[parent].prev, Some(parent)),
                Side::Right => (Some(parent), self.entries[parent].next),
            },
        };

        let key = self.entries.insert(TrackEntry {
            track,
            first: None,
            last: None,
            count: 0,
            prev,
            next,
            parent: position.parent,
            left: None,
            right: None,
            height: 1,
        });

        match prev {
            Some(prev) => self.entries[prev].next = Some(key),
            None => self.head = Some(key),
        }
        if let Some(next) = next {
            self.entries[next].prev = Some(key);
        }

        match position.parent {
            None => self.root = Some(key),
            Some(parent) => match position.side {
                Side::Left => self.entries[parent].left = Some(key),
                Side::Right => self.entries[parent].right = Some(key),
            },
        }
        self.rebalance_from(position.parent);
        key
    }

    /// Drop an entry from the tree and from track order
    pub fn erase(&mut self, key: Key) -> Option<TrackEntry<T>> {
        let entry = self.entries.get(key)?;
        let (parent, left, right) = (entry.parent, entry.left, entry.right);
        let (prev, next, height) = (entry.prev, entry.next, entry.height);

        let rebalance_at = match (left, right) {
            (Some(left), Some(right)) => {
                // With a right subtree, `next` is its leftmost entry
                let successor = next.unwrap_or(right);

                let start = match self.entries[successor].parent {
                    Some(above) if above != key => {
                        let inner = self.entries[successor].right;
                        self.entries[above].left = inner;
                        if let Some(inner) = inner {
                            self.entries[inner].parent = Some(above);
                        }
                        self.entries[successor].right = Some(right);
                        self.entries[right].parent = Some(successor);
                        above
                    }
                    _ => successor,
                };

                self.entries[successor].left = Some(left);
                self.entries[left].parent = Some(successor);
                self.entries[successor].parent = parent;
                self.entries[successor].height = height;
                self.replace_child(parent, key, Some(successor));
                Some(start)
            }
            (child, None) | (None, child) => {
                if let Some(child) = child {
                    self.entries[child].parent = parent;
                }
                self.replace_child(parent, key, child);
                parent
            }
        };
        self.rebalance_from(rebalance_at);

        match prev {
            Some(prev) => self.entries[prev].next = next,
            None => self.head = next,
        }
        if let Some(next) = next {
            self.entries[next].prev = prev;
        }

        self.entries.remove(key)
    }

    /// Entry with the smallest track
    pub fn first(&self) -> Option<Key> {
        self.head
    }

    /// Entry following `key` in track order, if `key` is live
    pub fn next_of(&self, key: Key) -> Option<Option<Key>> {
        self.entries.get(key).map(|entry| entry.next)
    }

    pub fn get(&self, key: Key) -> Option<&TrackEntry<T>> {
        self.entries.get(key)
    }

    /// Number of distinct tracks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Copy every entry, keeping keys and links intact
    ///
    /// Each distinct track is copied exactly once.
    pub fn try_duplicate<E>(
        &self,
        mut copy_track: impl FnMut(&T) -> Result<T, E>,
    ) -> Result<Self, E> {
        let entries = self.entries.try_duplicate(|entry| -> Result<TrackEntry<T>, E> {
            Ok(TrackEntry {
                track: copy_track(&entry.track)?,
                first: entry.first,
                last: entry.last,
                count: entry.count,
                prev: entry.prev,
                next: entry.next,
                parent: entry.parent,
                left: entry.left,
                right: entry.right,
                height: entry.height,
            })
        })?;

        Ok(Self {
            entries,
            root: self.root,
            head: self.head,
        })
    }

    // ===== Balancing =====

    fn height_of(&self, key: Option<Key>) -> u32 {
        key.map_or(0, |key| self.entries[key].height)
    }

    fn balance_of(&self, key: Key) -> i64 {
        let entry = &self.entries[key];
        i64::from(self.height_of(entry.left)) - i64::from(self.height_of(entry.right))
    }

    fn update_height(&mut self, key: Key) {
        let entry = &self.entries[key];
        let height = 1 + self.height_of(entry.left).max(self.height_of(entry.right));
        self.entries[key].height = height;
    }

    /// Point whatever held `old` (a parent's child slot or the root) at `new`
    fn replace_child(&mut self, parent: Option<Key>, old: Key, new: Option<Key>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let entry = &mut self.entries[parent];
                if entry.left == Some(old) {
                    entry.left = new;
                } else {
                    entry.right = new;
                }
            }
        }
    }

    /// Returns the key now at the top of the rotated subtree
    fn rotate_left(&mut self, key: Key) -> Key {
        let Some(pivot) = self.entries[key].right else {
            return key;
        };
        let parent = self.entries[key].parent;
        let inner = self.entries[pivot].left;

        self.entries[key].right = inner;
        if let Some(inner) = inner {
            self.entries[inner].parent = Some(key);
        }
        self.replace_child(parent, key, Some(pivot));
        self.entries[pivot].parent = parent;
        self.entries[pivot].left = Some(key);
        self.entries[key].parent = Some(pivot);

        self.update_height(key);
        self.update_height(pivot);
        pivot
    }

    /// Returns the key now at the top of the rotated subtree
    fn rotate_right(&mut self, key: Key) -> Key {
        let Some(pivot) = self.entries[key].left else {
            return key;
        };
        let parent = self.entries[key].parent;
        let inner = self.entries[pivot].right;

        self.entries[key].left = inner;
        if let Some(inner) = inner {
            self.entries[inner].parent = Some(key);
        }
        self.replace_child(parent, key, Some(pivot));
        self.entries[pivot].parent = parent;
        self.entries[pivot].right = Some(key);
        self.entries[key].parent = Some(pivot);

        self.update_height(key);
        self.update_height(pivot);
        pivot
    }

    /// Rotate `key` back into balance, returning the new subtree top
    fn restore_balance(&mut self, key: Key) -> Key {
        let balance = self.balance_of(key);
        if balance > 1 {
            if let Some(left) = self.entries[key].left {
                if self.balance_of(left) < 0 {
                    self.rotate_left(left);
                }
            }
            self.rotate_right(key)
        } else if balance < -1 {
            if let Some(right) = self.entries[key].right {
                if self.balance_of(right) > 0 {
                    self.rotate_right(right);
                }
            }
            self.rotate_left(key)
        } else {
            key
        }
    }

    /// Fix heights and balance walking up from `cursor`
    ///
    /// Stops at the first subtree whose height did not change.
    fn rebalance_from(&mut self, mut cursor: Option<Key>) {
        while let Some(key) = cursor {
            let before = self.entries[key].height;
            self.update_height(key);
            let top = self.restore_balance(key);
            if self.entries[top].height == before {
                break;
            }
            cursor = self.entries[top].parent;
        }
    }
}

#[cfg(test)]
impl<T: TrackOrd> TrackRegistry<T> {
    /// Entry keys in track order
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        std::iter::successors(self.head, |&key| self.entries[key].next)
    }

    /// Panic unless tree, order links and heights agree
    pub fn assert_consistent(&self) {
        let mut in_order = Vec::new();
        self.check_subtree(self.root, None, &mut in_order);
        assert_eq!(in_order.len(), self.len(), "tree misses entries");

        let threaded: Vec<Key> = self.keys().collect();
        assert_eq!(threaded, in_order, "order links disagree with tree");

        if let Some(&head) = in_order.first() {
            assert_eq!(self.entries[head].prev, None);
        }
        for pair in in_order.windows(2) {
            let (low, high) = (&self.entries[pair[0]], &self.entries[pair[1]]);
            assert_eq!(high.prev, Some(pair[0]), "order back-link broken");
            assert_eq!(low.track.try_cmp(&high.track).ok(), Some(Ordering::Less));
        }
    }

    fn check_subtree(&self, node: Option<Key>, parent: Option<Key>, out: &mut Vec<Key>) -> u32 {
        let Some(key) = node else {
            return 0;
        };
        let entry = &self.entries[key];
        assert_eq!(entry.parent, parent, "parent link broken");

        let left = self.check_subtree(entry.left, Some(key), out);
        out.push(key);
        let right = self.check_subtree(entry.right, Some(key), out);

        assert!(left.abs_diff(right) <= 1, "subtree out of balance");
        assert_eq!(entry.height, 1 + left.max(right), "stale height");
        entry.height
    }
}

impl<T> std::ops::Index<Key> for TrackRegistry<T> {
    type Output = TrackEntry<T>;

    fn index(&self, key: Key) -> &TrackEntry<T> {
        &self.entries[key]
    }
}

impl<T> std::ops::IndexMut<Key> for TrackRegistry<T> {
    fn index_mut(&mut self, key: Key) -> &mut TrackEntry<T> {
        &mut self.entries[key]
    }
}
