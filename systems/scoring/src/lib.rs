#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scoring system that turns kill events into points.
//!
//! Points are looked up in a flat rule table keyed by the victim's kind at
//! the moment it died. Every rule that matches fires, so a kind listed twice
//! is paid twice; walkers caught while telegraphing are worth both of their
//! entries.

use skirmish_core::{EntityKind, Event, Phase};
use tracing::debug;

/// Points paid for killing an entity of the given kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreRule {
    /// Victim the rule applies to.
    pub victim: EntityKind,
    /// Points awarded when the rule matches.
    pub points: u32,
}

/// Every scoring rule, in the order they are checked.
pub const SCORE_RULES: [ScoreRule; 6] = [
    ScoreRule {
        victim: EntityKind::Beam(Phase::Telegraph),
        points: 100,
    },
    ScoreRule {
        victim: EntityKind::Beam(Phase::Armed),
        points: 111,
    },
    ScoreRule {
        victim: EntityKind::Shooter(Phase::Telegraph),
        points: 100,
    },
    ScoreRule {
        victim: EntityKind::Shooter(Phase::Armed),
        points: 85,
    },
    ScoreRule {
        victim: EntityKind::Walker(Phase::Telegraph),
        points: 21,
    },
    ScoreRule {
        victim: EntityKind::Walker(Phase::Telegraph),
        points: 24,
    },
];

/// Total points paid for killing an entity of `kind`.
#[must_use]
pub fn points_for(kind: EntityKind) -> u32 {
    SCORE_RULES
        .iter()
        .filter(|rule| rule.victim == kind)
        .map(|rule| rule.points)
        .sum()
}

/// Running score of a single game.
#[derive(Clone, Debug, Default)]
pub struct Scoring {
    total: u32,
    kills: u32,
    player_killed: bool,
}

impl Scoring {
    /// Creates a scoring system with nothing recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events, paying out every reported kill.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            let Event::EntityKilled { slot, kind, .. } = event else {
                continue;
            };

            if kind.is_player() {
                self.player_killed = true;
                continue;
            }

            let points = points_for(*kind);
            self.total = self.total.saturating_add(points);
            self.kills = self.kills.saturating_add(1);
            debug!(slot = slot.get(), ?kind, points, total = self.total, "kill scored");
        }
    }

    /// Points accumulated so far.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }

    /// Number of non-player entities killed so far.
    #[must_use]
    pub const fn kills(&self) -> u32 {
        self.kills
    }

    /// Whether a kill event for the player has been observed.
    #[must_use]
    pub const fn player_killed(&self) -> bool {
        self.player_killed
    }
}
