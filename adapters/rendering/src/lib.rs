#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Skirmish adapters.
//!
//! The board is presented through a square window centred on the player.
//! Adapters implement [`RenderingBackend`] to put glyphs on screen and read
//! keys; everything about what a cell looks like and where it lands is
//! decided here so that every backend draws the same picture.

use anyhow::Result as AnyResult;
use glam::UVec2;
use skirmish_core::{Command, Direction, EntityKind, Occupant, Phase, PlayerAction, VIEW_RADIUS};
use skirmish_world::{self as world, query, Tile, World};

/// Number of cells along each side of the window.
pub const WINDOW_SIDE: u32 = VIEW_RADIUS.unsigned_abs() * 2 + 1;

/// Screen row that carries the score and turn counters.
pub const STATS_ROW: u32 = 0;

/// Screen row used for messages to the player.
pub const MESSAGE_ROW: u32 = WINDOW_SIDE + 1;

/// Maps a window cell to its screen location.
///
/// Cells are two columns wide so the board reads roughly square, and the
/// whole board sits one row below the counters.
#[must_use]
pub const fn screen_position(cell: UVec2) -> UVec2 {
    UVec2::new(cell.x * 2, cell.y + 1)
}

/// Foreground colour of a glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tint {
    /// Terminal default.
    Plain,
    /// Alert enemies, the player and projectiles.
    Yellow,
    /// Enemies winding up their next move.
    Green,
    /// Walls.
    Blue,
    /// The player while holding a shot.
    Black,
}

/// Character and styling used to present one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Glyph {
    /// Character drawn in the cell.
    pub symbol: char,
    /// Foreground colour.
    pub tint: Tint,
    /// Whether foreground and background are swapped.
    pub reversed: bool,
}

impl Glyph {
    /// Creates an unreversed glyph.
    #[must_use]
    pub const fn new(symbol: char, tint: Tint) -> Self {
        Self {
            symbol,
            tint,
            reversed: false,
        }
    }

    /// Returns the glyph with foreground and background swapped.
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self {
            reversed: true,
            ..self
        }
    }
}

fn phase_tint(phase: Phase) -> Tint {
    if phase.is_alert() {
        Tint::Yellow
    } else {
        Tint::Green
    }
}

/// Glyph for an entity of the given kind.
#[must_use]
pub fn entity_glyph(kind: EntityKind) -> Glyph {
    match kind {
        EntityKind::Player { aiming: false } => Glyph::new('@', Tint::Yellow),
        EntityKind::Player { aiming: true } => Glyph::new('@', Tint::Black),
        EntityKind::Walker(phase) => Glyph::new('+', phase_tint(phase)),
        EntityKind::Shooter(phase) => Glyph::new('H', phase_tint(phase)),
        EntityKind::Beam(phase) => Glyph::new('W', phase_tint(phase)),
        EntityKind::Projectile(direction) => {
            let symbol = match direction {
                Direction::Up => '^',
                Direction::Down => 'v',
                Direction::Left => '<',
                Direction::Right => '>',
            };
            Glyph::new(symbol, Tint::Yellow)
        }
    }
}

/// Glyph for a tile, given the kind of the entity standing on it.
///
/// `occupant_kind` is only consulted when the tile references an entity.
#[must_use]
pub fn glyph_for(tile: Tile, occupant_kind: Option<EntityKind>) -> Glyph {
    let glyph = match (tile.occupant(), occupant_kind) {
        (Occupant::Wall, _) => Glyph::new('x', Tint::Blue),
        (Occupant::Entity(_), Some(kind)) => entity_glyph(kind),
        (Occupant::Empty, _) | (Occupant::Entity(_), None) => {
            if tile.beam_pending() {
                Glyph::new('|', Tint::Plain)
            } else {
                Glyph::new('.', Tint::Plain)
            }
        }
    };

    if tile.beam_active() {
        glyph.reversed()
    } else {
        glyph
    }
}

/// Key press delivered by a backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// One of the four arrow keys.
    Arrow(Direction),
    /// A printable character.
    Char(char),
    /// Anything the backend could not name.
    Other,
}

/// Key that ends the game.
pub const QUIT_KEY: char = 'q';
/// Key that starts a new game.
pub const RESTART_KEY: char = 'r';
/// Key that turns the next arrow into a shot.
pub const AIM_KEY: char = 's';
/// Key that shows the key reference.
pub const HELP_KEY: char = 'h';

/// Resolves the action bound to `key`, or `None` for an unbound key.
#[must_use]
pub fn action_for_key(key: Key) -> Option<PlayerAction> {
    match key {
        Key::Arrow(direction) => Some(PlayerAction::Move(direction)),
        Key::Char(QUIT_KEY) => Some(PlayerAction::Quit),
        Key::Char(RESTART_KEY) => Some(PlayerAction::Restart),
        Key::Char(AIM_KEY) => Some(PlayerAction::Aim),
        Key::Char(HELP_KEY) => Some(PlayerAction::Help),
        Key::Char(_) | Key::Other => None,
    }
}

/// Single cell of a captured window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneCell {
    /// Window coordinate, with the player at the centre.
    pub cell: UVec2,
    /// Glyph drawn in the cell.
    pub glyph: Glyph,
}

/// Everything a backend needs to draw one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scene {
    /// Cells in column-major order, matching the draw order of the board.
    pub cells: Vec<SceneCell>,
    /// Score shown in the counters row.
    pub score: u32,
    /// Turn count shown in the counters row.
    pub turns: u32,
}

impl Scene {
    /// Captures the window around the player.
    ///
    /// Cells entering the window for the first time are generated, which may
    /// place new enemies on the board.
    #[must_use]
    pub fn capture(world: &mut World, score: u32, turns: u32) -> Self {
        let centre = query::player(world).position;
        let mut cells = Vec::with_capacity((WINDOW_SIDE * WINDOW_SIDE) as usize);

        for dx in -VIEW_RADIUS..=VIEW_RADIUS {
            for dy in -VIEW_RADIUS..=VIEW_RADIUS {
                let tile = world.tile(centre.offset(dx, dy));
                let kind = tile
                    .occupant()
                    .slot()
                    .map(|slot| query::entity(world, slot).kind);
                cells.push(SceneCell {
                    cell: UVec2::new(
                        (dx + VIEW_RADIUS).unsigned_abs(),
                        (dy + VIEW_RADIUS).unsigned_abs(),
                    ),
                    glyph: glyph_for(tile, kind),
                });
            }
        }

        Self {
            cells,
            score,
            turns,
        }
    }

    /// Glyph captured for `cell`, if it lies inside the window.
    #[must_use]
    pub fn glyph_at(&self, cell: UVec2) -> Option<Glyph> {
        if cell.x >= WINDOW_SIDE || cell.y >= WINDOW_SIDE {
            return None;
        }
        let index = (cell.x * WINDOW_SIDE + cell.y) as usize;
        self.cells.get(index).map(|scene_cell| scene_cell.glyph)
    }
}

/// Rendering backend capable of presenting Skirmish scenes.
pub trait RenderingBackend {
    /// Draws `glyph` in the window cell `cell`.
    fn render_tile(&mut self, cell: UVec2, glyph: Glyph) -> AnyResult<()>;

    /// Draws the score and turn counters.
    fn render_stats(&mut self, score: u32, turns: u32) -> AnyResult<()>;

    /// Replaces the message row with `message`.
    fn render_message(&mut self, message: &str) -> AnyResult<()>;

    /// Blanks the message row.
    fn clear_message(&mut self) -> AnyResult<()>;

    /// Flushes everything drawn since the last call to the screen.
    fn present(&mut self) -> AnyResult<()>;

    /// Blocks until the next key press.
    fn read_key(&mut self) -> AnyResult<Key>;
}

/// Draws the window around the player if anything visible changed.
///
/// Returns whether a frame was drawn. Drawing acknowledges the change so the
/// next call is a no-op until the world is touched near the player again.
pub fn draw<B>(backend: &mut B, world: &mut World, score: u32, turns: u32) -> AnyResult<bool>
where
    B: RenderingBackend + ?Sized,
{
    if !query::needs_redraw(world) {
        return Ok(false);
    }

    let scene = Scene::capture(world, score, turns);
    for scene_cell in &scene.cells {
        backend.render_tile(scene_cell.cell, scene_cell.glyph)?;
    }
    backend.render_stats(scene.score, scene.turns)?;
    backend.present()?;

    // Only spawns from freshly generated cells surface here; nothing scores them.
    let mut events = Vec::new();
    world::apply(world, Command::AcknowledgeRedraw, &mut events);
    Ok(true)
}
