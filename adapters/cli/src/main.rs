#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Skirmish in the terminal.

mod messages;
mod terminal;

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use skirmish_core::PlayerAction;
use skirmish_rendering::{action_for_key, draw, RenderingBackend};
use skirmish_system_session::{Flow, Game, SeedPolicy, Session, SessionConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::terminal::CrosstermBackend;

/// Turn-based survival on an endless board.
#[derive(Debug, Parser)]
#[command(name = "skirmish", version, about)]
struct CliArgs {
    /// Fixes the world seed; each restart uses the next seed in sequence.
    #[arg(long)]
    seed: Option<u64>,
    /// Pause after every animated frame while enemies act, in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 0)]
    frame_delay_ms: u64,
    /// Writes diagnostics to this file. Nothing is logged without it.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl CliArgs {
    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            seed: self.seed.map_or(SeedPolicy::Entropy, SeedPolicy::Fixed),
        }
    }
}

/// Entry point for the Skirmish command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    if let Some(path) = &args.log_file {
        init_tracing(path)?;
    }

    let session = Session::new(args.session_config());
    let frame_delay = Duration::from_millis(args.frame_delay_ms);

    let mut backend = CrosstermBackend::enter().context("failed to prepare the terminal")?;
    let outcome = run(&mut backend, session, frame_delay);
    drop(backend);

    match &outcome {
        Ok(()) => info!("session ended"),
        Err(error) => error!("session aborted: {error:#}"),
    }
    outcome
}

fn init_tracing(path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

/// Reads keys and feeds them to the session until the player quits.
fn run<B>(backend: &mut B, mut session: Session, frame_delay: Duration) -> Result<()>
where
    B: RenderingBackend,
{
    let _ = redraw(backend, session.game_mut())?;
    backend.present()?;

    loop {
        let key = backend.read_key()?;
        backend.clear_message()?;

        let action = action_for_key(key);
        let mut frame_error = None;
        let response = session.handle_with(action.unwrap_or(PlayerAction::Pass), |game| {
            if frame_error.is_some() {
                return;
            }
            match redraw(backend, game) {
                Ok(true) if !frame_delay.is_zero() => thread::sleep(frame_delay),
                Ok(_) => {}
                Err(error) => frame_error = Some(error),
            }
        });
        if let Some(error) = frame_error {
            return Err(error.context("failed to animate the turn"));
        }

        if response.flow == Flow::Quit {
            return Ok(());
        }

        let _ = redraw(backend, session.game_mut())?;
        // The board may be unchanged while the counters moved on.
        backend.render_stats(session.game().score(), session.game().turns())?;
        if action.is_none() {
            backend.render_message(&messages::unknown_key_text(key))?;
        }
        if let Some(notice) = response.notice {
            backend.render_message(&messages::notice_text(notice))?;
        }
        backend.present()?;
    }
}

fn redraw<B>(backend: &mut B, game: &mut Game) -> Result<bool>
where
    B: RenderingBackend,
{
    let score = game.score();
    let turns = game.turns();
    draw(backend, game.world_mut(), score, turns)
}
