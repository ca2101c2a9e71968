//! Snowdrift headless runner
//!
//! Loads assets from disk and drives the simulation with scripted input for
//! `ticks` frames. Windowing, drawing and sound output are left to a platform
//! layer; here the draw list is only counted and sounds are logged.
//!
//! ```text
//! snowdrift title=Snowdrift tile_width=32 tile_height=32 width=40 height=22 fps=30 mode=platformer
//! ```

#[cfg(not(target_arch = "wasm32"))]
use anyhow::Context;
#[cfg(not(target_arch = "wasm32"))]
use glam::Vec2;
#[cfg(not(target_arch = "wasm32"))]
use snowdrift::{
    Config, Game, GameMode,
    assets::DiskAssets,
    audio::{AudioManager, LogSink},
    game::Status,
    sim::TickInput,
};

/// Deterministic stand-in for a player
#[cfg(not(target_arch = "wasm32"))]
fn scripted_input(mode: GameMode, t: u64, half: Vec2) -> TickInput {
    match mode {
        GameMode::Platformer => {
            let right = (t / 120) % 2 == 0;
            TickInput {
                right,
                left: !right,
                jump: t % 90 == 45,
                ..Default::default()
            }
        }
        GameMode::TopDown => TickInput {
            mouse: Some(half + Vec2::from_angle(t as f32 * 0.02) * 150.0),
            fire: t % 30 == 0,
            ..Default::default()
        },
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_args(std::env::args().skip(1)).context("invalid configuration")?;
    log::info!("{} (headless) starting...", config.title);

    let (mode, ticks, fps, half) = (config.mode, config.ticks, config.fps, config.half_window());
    let mut game = Game::load(config, &DiskAssets).context("failed to load game assets")?;
    let mut audio = AudioManager::new(LogSink);
    audio.load_sounds(game.sounds());

    let mut status = Status::Running;
    let mut sprites = 0;
    for t in 0..ticks {
        status = game.step(&scripted_input(mode, t, half), &mut audio);
        sprites = game.draw().len();
        if status != Status::Running {
            break;
        }
    }

    let state = game.state();
    log::info!(
        "Finished after {} ticks ({:.1}s at {} fps): {}, level {}, score {}, {} sprites, player at ({:.0}, {:.0})",
        state.time_ticks,
        state.time_ticks as f64 / f64::from(fps),
        fps,
        status.as_str(),
        game.level(),
        game.score(),
        sprites,
        state.player.entity.pos.x,
        state.player.entity.pos.y
    );
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Browser builds are driven by the platform layer
}
