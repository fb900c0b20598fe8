use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use mapwright_core::{
    EntityId, EntityKind, Event, IslandDelta, PaintDelta, Round, SpawnedBody, Symmetry, Team,
    WellDelta,
};
use mapwright_system_playback::{PlaybackConfig, PlaybackError, Timeline};
use mapwright_world::{query, StaticMap, StreamError, World, WorldError};

const WIDTH: u32 = 8;
const HEIGHT: u32 = 8;
const ROUNDS: u32 = 24;

#[test]
fn deterministic_replay_produces_identical_outcomes() {
    let first = replay(scripted_rounds());
    let second = replay(scripted_rounds());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert_eq!(first.summary.rounds_applied, ROUNDS);
}

#[test]
fn seeking_back_matches_a_fresh_replay() {
    let mut scrubbed = timeline(5);
    scrubbed.seek(ROUNDS as usize).expect("in range");
    scrubbed.seek(13).expect("in range");

    let mut fresh = timeline(5);
    fresh.seek(13).expect("in range");

    assert_eq!(scrubbed.world(), fresh.world());
    assert_eq!(
        query::summary(scrubbed.world()),
        query::summary(fresh.world())
    );
}

#[test]
fn snapshots_are_not_disturbed_by_later_rounds() {
    let mut timeline = timeline(4);
    timeline.seek(4).expect("in range");
    let cached = timeline.world().copy();

    timeline.seek(ROUNDS as usize).expect("in range");
    assert_ne!(timeline.world(), &cached);

    timeline.seek(4).expect("in range");
    assert_eq!(timeline.world(), &cached);
}

#[test]
fn inconsistent_round_stops_the_timeline() {
    let mut timeline = timeline(5);
    let mut bogus = Round::new(ROUNDS + 1);
    bogus.died.push(EntityId::new(999));
    timeline.push_round(bogus);

    timeline.seek(ROUNDS as usize).expect("recorded rounds are consistent");
    let error = timeline
        .seek(ROUNDS as usize + 1)
        .expect_err("unknown body is fatal");
    assert_eq!(
        error,
        PlaybackError::Apply {
            position: ROUNDS as usize,
            source: WorldError::Stream(StreamError::UnknownBody { id: 999 }),
        }
    );
    assert_eq!(timeline.applied(), ROUNDS as usize);
}

fn terrain() -> StaticMap {
    let mut header = StaticMap::blank(WIDTH, HEIGHT, Symmetry::Rotational).to_header();
    header.resources[9] = 1;
    header.resources[54] = 2;
    for index in [18, 19, 26, 27] {
        header.islands[index] = 1;
    }
    for index in [36, 37, 44, 45] {
        header.islands[index] = 2;
    }
    StaticMap::from_header(header).expect("scripted map is valid")
}

fn timeline(interval: u32) -> Timeline {
    let config = PlaybackConfig::new(interval).expect("positive interval");
    let mut timeline = Timeline::new(World::new(terrain()), config).expect("valid config");
    for round in scripted_rounds() {
        timeline.push_round(round);
    }
    timeline
}

fn scripted_rounds() -> Vec<Round> {
    let cells = WIDTH * HEIGHT;
    (1..=ROUNDS)
        .map(|number| {
            let mut round = Round::new(number);
            let team = if number % 2 == 0 { Team::A } else { Team::B };
            round.spawned.push(SpawnedBody {
                id: EntityId::new(number),
                x: number % WIDTH,
                y: (number / WIDTH) % HEIGHT,
                team,
                kind: EntityKind::Soldier,
            });
            if number > 3 {
                round.died.push(EntityId::new(number - 3));
            }
            round.painted.push(PaintDelta {
                index: (number * 7) % cells,
                value: u8::try_from(number % 5).unwrap_or(0),
            });
            round.wells.push(WellDelta {
                index: if number % 2 == 0 { 9 } else { 54 },
                resource: if number % 2 == 0 { 1 } else { 2 },
                adamantium: i32::try_from(number).unwrap_or(0),
                mana: i32::try_from(number * 2).unwrap_or(0),
                elixir: 0,
                acceleration: i32::from(number > 12),
            });
            if number % 6 == 0 {
                round.islands.push(IslandDelta {
                    island: 1 + number % 2,
                    owner: u8::try_from(1 + (number / 6) % 2).unwrap_or(0),
                    turnover: i32::try_from(number).unwrap_or(0),
                });
            }
            round
        })
        .collect()
}

fn replay(rounds: Vec<Round>) -> ReplayOutcome {
    let mut world = World::new(terrain());
    let mut events = Vec::new();
    for round in &rounds {
        mapwright_world::apply(&mut world, round, &mut events).expect("scripted round is consistent");
    }
    ReplayOutcome {
        summary: query::summary(&world),
        paint: query::paint(&world).to_vec(),
        events,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    summary: query::WorldSummary,
    paint: Vec<u8>,
    events: Vec<Event>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}
