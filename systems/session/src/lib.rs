#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn orchestration for Skirmish.
//!
//! A [`Game`] bundles one world with its score and turn counters and knows
//! how to resolve a single turn: apply the player's action, then let every
//! settled entity act once in ascending slot order. A [`Session`] wraps the
//! current game with the state machine around it, answering help requests,
//! refusing play once the player is dead and rebuilding the game on restart.

use skirmish_core::{Command, EntityKind, EntitySlot, Event, PlayerAction};
use skirmish_system_enemy_ai::EnemyAi;
use skirmish_system_scoring::Scoring;
use skirmish_world::{self as world, query, World};
use tracing::{debug, info};

/// Where world seeds come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SeedPolicy {
    /// Every game draws a fresh seed from the thread-local generator.
    #[default]
    Entropy,
    /// The first game uses the given seed; each restart uses the next value.
    Fixed(u64),
}

impl SeedPolicy {
    /// Seed for the game started after `restarts` restarts.
    #[must_use]
    pub fn seed_for(self, restarts: u32) -> u64 {
        match self {
            Self::Entropy => rand::random(),
            Self::Fixed(seed) => seed.wrapping_add(u64::from(restarts)),
        }
    }
}

/// Settings chosen when the session is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct SessionConfig {
    /// Source of world seeds.
    pub seed: SeedPolicy,
}

/// One playthrough: a world plus the counters reported to the player.
#[derive(Debug)]
pub struct Game {
    world: World,
    scoring: Scoring,
    turns: u32,
    ai: EnemyAi,
}

impl Game {
    /// Starts a game on a world generated from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_world(World::new(seed))
    }

    /// Starts a game on an existing world.
    #[must_use]
    pub fn with_world(world: World) -> Self {
        Self {
            world,
            scoring: Scoring::new(),
            turns: 0,
            ai: EnemyAi::new(),
        }
    }

    /// World the game is played on.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the world, needed by readers that generate tiles.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Score accumulated so far.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.scoring.total()
    }

    /// Number of turns completed.
    #[must_use]
    pub const fn turns(&self) -> u32 {
        self.turns
    }

    /// Kill bookkeeping for the game.
    #[must_use]
    pub const fn scoring(&self) -> &Scoring {
        &self.scoring
    }

    /// Whether the player has been killed.
    #[must_use]
    pub fn player_dead(&self) -> bool {
        query::player(&self.world).dead
    }

    /// Applies a command outside of turn resolution, scoring any kills it causes.
    pub fn apply(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.scoring.handle(&events);
        events
    }

    /// Resolves one full turn for an action that spends one.
    ///
    /// `on_frame` runs after the player's action and after every entity
    /// update so that adapters can animate the pass. Actions that do not
    /// spend a turn are ignored.
    pub fn play_turn<F>(&mut self, action: PlayerAction, mut on_frame: F)
    where
        F: FnMut(&mut Game),
    {
        if !action.spends_turn() {
            return;
        }

        self.player_action(action);
        on_frame(self);

        self.turns = self.turns.saturating_add(1);
        debug!(turn = self.turns, "entity pass");

        let mut slot = EntitySlot::PLAYER;
        while slot.index() < query::entity_count(&self.world) {
            let entity = query::entity(&self.world, slot);
            if !slot.is_player() && !entity.dead && !entity.just_spawned {
                let mut events = Vec::new();
                self.ai.update(&mut self.world, slot, &mut events);
                self.scoring.handle(&events);
                on_frame(self);
            }
            let _ = self.apply(Command::SettleSpawn { slot });
            slot = EntitySlot::new(slot.get() + 1);
        }
    }

    fn player_action(&mut self, action: PlayerAction) {
        let player = query::player(&self.world);
        let EntityKind::Player { aiming } = player.kind else {
            unreachable!("slot zero always holds the player");
        };

        match action {
            PlayerAction::Move(direction) if aiming => {
                let _ = self.apply(Command::Spawn {
                    kind: EntityKind::Projectile(direction),
                    at: player.position.step(direction),
                });
                let _ = self.apply(Command::SetKind {
                    slot: EntitySlot::PLAYER,
                    kind: EntityKind::Player { aiming: false },
                });
            }
            PlayerAction::Move(direction) => {
                let _ = self.apply(Command::MoveTo {
                    slot: EntitySlot::PLAYER,
                    to: player.position.step(direction),
                });
            }
            PlayerAction::Aim => {
                let _ = self.apply(Command::SetKind {
                    slot: EntitySlot::PLAYER,
                    kind: EntityKind::Player { aiming: true },
                });
            }
            PlayerAction::Pass
            | PlayerAction::Restart
            | PlayerAction::Quit
            | PlayerAction::Help => {}
        }
    }
}

/// Whether the session is accepting moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// The player is alive and every action is accepted.
    Playing,
    /// The player died; only restart and quit are accepted.
    Dead,
}

/// What the caller should do after an action was handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading input.
    Continue,
    /// Leave the game.
    Quit,
}

/// Message the session wants shown to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    /// The key reference was requested.
    Help,
    /// The player was killed during the turn just resolved.
    Died,
    /// An action other than restart or quit arrived while dead.
    AwaitingRestart,
}

/// Outcome of handling a single action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Response {
    /// Whether to keep going.
    pub flow: Flow,
    /// Message to display, if any.
    pub notice: Option<Notice>,
}

impl Response {
    const fn proceed(notice: Option<Notice>) -> Self {
        Self {
            flow: Flow::Continue,
            notice,
        }
    }

    const fn quit() -> Self {
        Self {
            flow: Flow::Quit,
            notice: None,
        }
    }
}

/// Session that owns the current game and reacts to player input.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    game: Game,
    state: SessionState,
    restarts: u32,
}

impl Session {
    /// Creates a session and starts its first game.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let seed = config.seed.seed_for(0);
        info!(seed, "game started");
        Self::with_game(config, Game::new(seed))
    }

    /// Creates a session around an already prepared game.
    #[must_use]
    pub fn with_game(config: SessionConfig, game: Game) -> Self {
        let state = if game.player_dead() {
            SessionState::Dead
        } else {
            SessionState::Playing
        };
        Self {
            config,
            game,
            state,
            restarts: 0,
        }
    }

    /// Game currently being played.
    #[must_use]
    pub const fn game(&self) -> &Game {
        &self.game
    }

    /// Mutable access to the current game.
    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    /// Current state of the session.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Number of restarts performed.
    #[must_use]
    pub const fn restarts(&self) -> u32 {
        self.restarts
    }

    /// Handles `action` without observing intermediate frames.
    pub fn handle(&mut self, action: PlayerAction) -> Response {
        self.handle_with(action, |_| {})
    }

    /// Handles `action`, calling `on_frame` whenever the board changed
    /// during turn resolution.
    pub fn handle_with<F>(&mut self, action: PlayerAction, on_frame: F) -> Response
    where
        F: FnMut(&mut Game),
    {
        match (self.state, action) {
            (_, PlayerAction::Quit) => Response::quit(),
            (_, PlayerAction::Restart) => {
                self.restart();
                Response::proceed(None)
            }
            (SessionState::Dead, _) => Response::proceed(Some(Notice::AwaitingRestart)),
            (SessionState::Playing, PlayerAction::Help) => Response::proceed(Some(Notice::Help)),
            (SessionState::Playing, action) => {
                self.game.play_turn(action, on_frame);
                if self.game.player_dead() {
                    self.state = SessionState::Dead;
                    info!(
                        score = self.game.score(),
                        turns = self.game.turns(),
                        "player died"
                    );
                    Response::proceed(Some(Notice::Died))
                } else {
                    Response::proceed(None)
                }
            }
        }
    }

    fn restart(&mut self) {
        self.restarts = self.restarts.saturating_add(1);
        let seed = self.config.seed.seed_for(self.restarts);
        info!(seed, restarts = self.restarts, "game restarted");
        self.game = Game::new(seed);
        self.state = SessionState::Playing;
    }
}
