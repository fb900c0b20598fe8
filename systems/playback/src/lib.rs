#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round timeline that steps a world forward and scrubs it backwards.
//!
//! Replay is forward-only: moving back restores the newest cached snapshot
//! at or before the target and re-applies rounds from there. Snapshots share
//! the terrain with the live world, so caching one costs only the dynamic
//! layers.

use std::collections::BTreeMap;

use mapwright_core::{Event, Round};
use mapwright_world::{self as world, World, WorldError};
use serde::{Deserialize, Serialize};

const DEFAULT_SNAPSHOT_INTERVAL: u32 = 50;

/// Tunables for the playback timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Rounds between cached snapshots; at least one.
    pub snapshot_interval: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            snapshot_interval: DEFAULT_SNAPSHOT_INTERVAL,
        }
    }
}

impl PlaybackConfig {
    /// Creates a configuration, rejecting a zero interval.
    pub fn new(snapshot_interval: u32) -> Result<Self, PlaybackError> {
        let config = Self { snapshot_interval };
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration's invariants.
    pub fn validate(&self) -> Result<(), PlaybackError> {
        if self.snapshot_interval == 0 {
            return Err(PlaybackError::ZeroSnapshotInterval);
        }
        Ok(())
    }
}

/// Failures raised by the timeline.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    /// The snapshot interval must be at least one round.
    #[error("snapshot interval must be at least 1")]
    ZeroSnapshotInterval,
    /// The requested position lies beyond the recorded rounds.
    #[error("cannot seek to round {requested}; only {available} rounds are recorded")]
    OutOfRange {
        /// Requested number of applied rounds.
        requested: usize,
        /// Number of recorded rounds.
        available: usize,
    },
    /// The world rejected a round.
    #[error("round {position} could not be applied: {source}")]
    Apply {
        /// Zero-based position of the round in the timeline.
        position: usize,
        /// Underlying world failure.
        #[source]
        source: WorldError,
    },
}

/// Recorded rounds plus the world they have been applied to.
#[derive(Debug)]
pub struct Timeline {
    config: PlaybackConfig,
    rounds: Vec<Round>,
    current: World,
    applied: usize,
    snapshots: BTreeMap<usize, World>,
}

impl Timeline {
    /// Creates a timeline positioned before the first round.
    pub fn new(initial: World, config: PlaybackConfig) -> Result<Self, PlaybackError> {
        config.validate()?;
        let mut snapshots = BTreeMap::new();
        let _ = snapshots.insert(0, initial.copy());
        Ok(Self {
            config,
            rounds: Vec::new(),
            current: initial,
            applied: 0,
            snapshots,
        })
    }

    /// Appends a decoded round to the end of the timeline.
    pub fn push_round(&mut self, round: Round) {
        self.rounds.push(round);
    }

    /// World after the applied rounds.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.current
    }

    /// Number of rounds applied to the current world.
    #[must_use]
    pub fn applied(&self) -> usize {
        self.applied
    }

    /// Number of recorded rounds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    /// Reports whether no rounds are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    /// Number of cached snapshots, including the initial world.
    #[must_use]
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    /// Applies the next round, returning `false` at the end of the timeline.
    pub fn step(&mut self, out_events: &mut Vec<Event>) -> Result<bool, PlaybackError> {
        let Some(round) = self.rounds.get(self.applied) else {
            return Ok(false);
        };
        world::apply(&mut self.current, round, out_events).map_err(|source| {
            PlaybackError::Apply {
                position: self.applied,
                source,
            }
        })?;
        self.applied += 1;

        let interval = self.config.snapshot_interval as usize;
        if self.applied % interval == 0 && !self.snapshots.contains_key(&self.applied) {
            let _ = self.snapshots.insert(self.applied, self.current.copy());
            tracing::debug!(
                target: "mapwright::playback",
                applied = self.applied,
                "snapshot.cached"
            );
        }
        Ok(true)
    }

    /// Moves to the state with exactly `target` rounds applied.
    ///
    /// Events produced while re-applying rounds are discarded; callers
    /// redraw from the resulting world.
    pub fn seek(&mut self, target: usize) -> Result<(), PlaybackError> {
        if target > self.rounds.len() {
            return Err(PlaybackError::OutOfRange {
                requested: target,
                available: self.rounds.len(),
            });
        }

        if target < self.applied {
            if let Some((position, snapshot)) = self.snapshots.range(..=target).next_back() {
                self.current = snapshot.copy();
                self.applied = *position;
            }
        }

        let mut scratch = Vec::new();
        while self.applied < target {
            scratch.clear();
            let _ = self.step(&mut scratch)?;
        }

        tracing::info!(
            target: "mapwright::playback",
            applied = self.applied,
            snapshots = self.snapshots.len(),
            "timeline.seek"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapwright_core::Symmetry;
    use mapwright_world::{query, StaticMap};

    fn timeline(rounds: u32, interval: u32) -> Timeline {
        let world = World::new(StaticMap::blank(4, 4, Symmetry::Rotational));
        let config = PlaybackConfig::new(interval).expect("positive interval");
        let mut timeline = Timeline::new(world, config).expect("valid config");
        for number in 1..=rounds {
            timeline.push_round(Round::new(number));
        }
        timeline
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert_eq!(
            PlaybackConfig::new(0),
            Err(PlaybackError::ZeroSnapshotInterval)
        );
    }

    #[test]
    fn default_interval_is_fifty_rounds() {
        assert_eq!(PlaybackConfig::default().snapshot_interval, 50);
    }

    #[test]
    fn config_fields_default_when_missing_from_toml() {
        let parsed: PlaybackConfig = toml::from_str("").expect("empty table parses");
        assert_eq!(parsed, PlaybackConfig::default());

        let parsed: PlaybackConfig =
            toml::from_str("snapshot_interval = 10").expect("interval parses");
        assert_eq!(parsed.snapshot_interval, 10);
    }

    #[test]
    fn step_stops_at_the_end() {
        let mut timeline = timeline(2, 5);
        let mut events = Vec::new();
        assert_eq!(timeline.step(&mut events), Ok(true));
        assert_eq!(timeline.step(&mut events), Ok(true));
        assert_eq!(timeline.step(&mut events), Ok(false));
        assert_eq!(timeline.applied(), 2);
        assert_eq!(
            events,
            vec![
                Event::RoundApplied { number: 1 },
                Event::RoundApplied { number: 2 },
            ]
        );
    }

    #[test]
    fn snapshots_are_cached_on_the_interval() {
        let mut timeline = timeline(7, 3);
        timeline.seek(7).expect("in range");
        assert_eq!(timeline.snapshot_count(), 3);
    }

    #[test]
    fn seeking_backwards_restores_round_count() {
        let mut timeline = timeline(9, 4);
        timeline.seek(9).expect("in range");
        timeline.seek(5).expect("in range");
        assert_eq!(timeline.applied(), 5);
        assert_eq!(query::rounds_applied(timeline.world()), 5);
    }

    #[test]
    fn seeking_past_the_end_is_rejected() {
        let mut timeline = timeline(3, 2);
        assert_eq!(
            timeline.seek(4),
            Err(PlaybackError::OutOfRange {
                requested: 4,
                available: 3,
            })
        );
        assert_eq!(timeline.applied(), 0);
    }
}
