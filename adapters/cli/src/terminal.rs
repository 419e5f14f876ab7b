//! Crossterm backend that draws the board on an alternate screen.

use std::io::{self, Stdout, Write};

use anyhow::Result as AnyResult;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{self, ClearType},
};
use glam::UVec2;
use skirmish_core::Direction;
use skirmish_rendering::{
    screen_position, Glyph, Key, RenderingBackend, Tint, MESSAGE_ROW, STATS_ROW,
};
use thiserror::Error;

/// Failures raised while driving the terminal.
#[derive(Debug, Error)]
pub(crate) enum TerminalError {
    /// Raw mode could not be switched on.
    #[error("failed to enable raw mode")]
    RawMode(#[source] io::Error),
    /// The alternate screen could not be entered.
    #[error("failed to enter the alternate screen")]
    Screen(#[source] io::Error),
    /// Output could not be written or flushed.
    #[error("failed to draw to the terminal")]
    Draw(#[source] io::Error),
    /// Reading the next key failed.
    #[error("failed to read input")]
    Input(#[source] io::Error),
    /// A screen location does not fit the terminal's coordinate range.
    #[error("screen location {column},{row} is out of range")]
    OutOfRange {
        /// Requested column.
        column: u32,
        /// Requested row.
        row: u32,
    },
}

/// Terminal session that restores the previous screen when dropped.
pub(crate) struct CrosstermBackend {
    out: Stdout,
}

impl CrosstermBackend {
    /// Switches the terminal to raw mode on the alternate screen.
    pub(crate) fn enter() -> Result<Self, TerminalError> {
        terminal::enable_raw_mode().map_err(TerminalError::RawMode)?;

        let mut out = io::stdout();
        if let Err(error) = execute!(
            out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(ClearType::All)
        ) {
            let _ = terminal::disable_raw_mode();
            return Err(TerminalError::Screen(error));
        }

        Ok(Self { out })
    }

    fn move_to(&mut self, column: u32, row: u32) -> Result<(), TerminalError> {
        let out_of_range = || TerminalError::OutOfRange { column, row };
        let x = u16::try_from(column).map_err(|_| out_of_range())?;
        let y = u16::try_from(row).map_err(|_| out_of_range())?;
        queue!(self.out, cursor::MoveTo(x, y)).map_err(TerminalError::Draw)
    }

    fn message_row(&mut self) -> Result<(), TerminalError> {
        self.move_to(0, MESSAGE_ROW)?;
        queue!(self.out, terminal::Clear(ClearType::CurrentLine)).map_err(TerminalError::Draw)
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

impl RenderingBackend for CrosstermBackend {
    fn render_tile(&mut self, cell: UVec2, glyph: Glyph) -> AnyResult<()> {
        let screen = screen_position(cell);
        self.move_to(screen.x, screen.y)?;
        let reverse = if glyph.reversed {
            Attribute::Reverse
        } else {
            Attribute::NoReverse
        };
        queue!(
            self.out,
            SetAttribute(reverse),
            SetForegroundColor(color_for(glyph.tint)),
            Print(glyph.symbol),
            SetAttribute(Attribute::Reset)
        )
        .map_err(TerminalError::Draw)?;
        Ok(())
    }

    fn render_stats(&mut self, score: u32, turns: u32) -> AnyResult<()> {
        self.move_to(0, STATS_ROW)?;
        queue!(
            self.out,
            terminal::Clear(ClearType::UntilNewLine),
            Print(format!("SCORE: {score} --- TURNS: {turns}"))
        )
        .map_err(TerminalError::Draw)?;
        Ok(())
    }

    fn render_message(&mut self, message: &str) -> AnyResult<()> {
        self.message_row()?;
        queue!(self.out, Print(message)).map_err(TerminalError::Draw)?;
        Ok(())
    }

    fn clear_message(&mut self) -> AnyResult<()> {
        self.message_row()?;
        Ok(())
    }

    fn present(&mut self) -> AnyResult<()> {
        self.out.flush().map_err(TerminalError::Draw)?;
        Ok(())
    }

    fn read_key(&mut self) -> AnyResult<Key> {
        loop {
            if let Event::Key(key) = event::read().map_err(TerminalError::Input)? {
                if key.kind != KeyEventKind::Release {
                    return Ok(key_for_code(key.code));
                }
            }
        }
    }
}

fn color_for(tint: Tint) -> Color {
    match tint {
        Tint::Plain => Color::Reset,
        Tint::Yellow => Color::Yellow,
        Tint::Green => Color::Green,
        Tint::Blue => Color::Blue,
        Tint::Black => Color::Black,
    }
}

/// Translates a crossterm key code into the keys the game understands.
pub(crate) fn key_for_code(code: KeyCode) -> Key {
    match code {
        KeyCode::Up => Key::Arrow(Direction::Up),
        KeyCode::Down => Key::Arrow(Direction::Down),
        KeyCode::Left => Key::Arrow(Direction::Left),
        KeyCode::Right => Key::Arrow(Direction::Right),
        KeyCode::Char(symbol) => Key::Char(symbol),
        _ => Key::Other,
    }
}
