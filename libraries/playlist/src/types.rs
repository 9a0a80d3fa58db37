//! Configuration types

use serde::{Deserialize, Serialize};

/// Playlist construction settings
///
/// Capacities are reserved up front so that a playlist filled to the expected
/// size does not reallocate its arenas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistConfig {
    /// Plays to reserve room for
    pub play_capacity: usize,

    /// Distinct tracks to reserve room for
    pub track_capacity: usize,
}

impl PlaylistConfig {
    /// Config reserving room for `plays` plays of `tracks` distinct tracks
    pub fn with_capacity(plays: usize, tracks: usize) -> Self {
        Self {
            play_capacity: plays,
            track_capacity: tracks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_reserves_nothing() {
        let config = PlaylistConfig::default();
        assert_eq!(config.play_capacity, 0);
        assert_eq!(config.track_capacity, 0);
    }

    #[test]
    fn with_capacity_sets_both() {
        let config = PlaylistConfig::with_capacity(128, 16);
        assert_eq!(config, PlaylistConfig { play_capacity: 128, track_capacity: 16 });
    }

    #[test]
    fn missing_fields_fall_back_to_default() {
        let config: PlaylistConfig = serde_json::from_str(r#"{"play_capacity": 8}"#).unwrap();
        assert_eq!(config, PlaylistConfig::with_capacity(8, 0));
    }
}
