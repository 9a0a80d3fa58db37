//! Playlist - copy-on-write play queue with deduplicated tracks
//!
//! This crate provides:
//! - An ordered list of plays, each pairing a track with its own params
//! - Single storage per distinct track, however often it is played
//! - A sorted view over distinct tracks with play counts
//! - Copy-on-write value semantics: copies are O(1) until one is mutated
//! - All-or-nothing mutations: a failing copy or comparison of a caller value
//!   leaves the playlist untouched
//!
//! # Architecture
//!
//! Plays and tracks reference each other through generational arena keys, not
//! pointers. Cursors are plain keys as well, so a cursor survives unrelated
//! mutations and reports [`PlaylistError::InvalidCursor`] once its play or track
//! is gone.
//!
//! # Example: Basic Usage
//!
//! ```rust
//! use playlist::{Playlist, PlaylistError};
//!
//! let mut playlist: Playlist<&str, u8> = Playlist::new();
//! playlist.push_back(&"intro", &80)?;
//! playlist.push_back(&"outro", &60)?;
//! playlist.push_back(&"intro", &100)?;
//!
//! assert_eq!(playlist.size(), 3);
//! assert_eq!(playlist.front()?, (&"intro", &80));
//!
//! // Distinct tracks, sorted, with play counts
//! let tracks: Vec<_> = playlist.tracks().collect();
//! assert_eq!(tracks, vec![(&"intro", 2), (&"outro", 1)]);
//!
//! // Remove every play of a track
//! assert_eq!(playlist.remove(&"intro")?, 2);
//! assert_eq!(playlist.front()?, (&"outro", &60));
//! # Ok::<(), PlaylistError>(())
//! ```
//!
//! # Example: Copy-on-Write
//!
//! ```rust
//! use playlist::{Playlist, TryClone};
//!
//! let mut original: Playlist<u32, String> = Playlist::new();
//! original.push_back(&1, &"loud".to_string())?;
//!
//! let copy = original.try_clone()?;
//! assert!(copy.shares_storage_with(&original));
//!
//! // Mutating one handle detaches it; the copy is unaffected
//! let front = original.play_begin();
//! original.params_mut(front)?.push_str("er");
//! assert_eq!(original.params(front)?, "louder");
//! assert_eq!(copy.params(front)?, "loud");
//! # Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
//! ```

mod arena;
mod cursor;
mod error;
mod playlist;
mod registry;
mod sequence;
mod state;
pub mod types;
mod value;

// Public exports
pub use cursor::{PlayCursor, Plays, SortedCursor, Tracks};
pub use error::{PlaylistError, Result, ValueError};
pub use playlist::Playlist;
pub use types::PlaylistConfig;
pub use value::{TrackOrd, TryClone};
