//! Level loading and progression
//!
//! `Game` owns everything loaded at startup (frame arena, sprite sheets,
//! parsed levels) and the live simulation state. All asset I/O happens in
//! [`Game::load`]; stepping never touches the filesystem and never fails.

use std::collections::BTreeMap;

use crate::assets::{Assets, FrameArena, LevelIndex, load_layout, load_level_index};
use crate::audio::{AudioManager, AudioSink, SoundBank};
use crate::config::{Config, GameMode};
use crate::error::{AssetLoadError, Result};
use crate::render::{DrawList, SpriteInstance};
use crate::sim::{
    GameEvent, GamePhase, GameState, LevelLayout, PhysicsBody, Sheets, TickInput, View, tick,
};

/// Where the run as a whole stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    /// Last level's objective reached
    Victory,
    GameOver,
    Quit,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Running => "running",
            Status::Victory => "victory",
            Status::GameOver => "game over",
            Status::Quit => "quit",
        }
    }
}

/// A parsed level ready to be instantiated
#[derive(Debug, Clone)]
struct Level {
    layout: LevelLayout,
    score_needed: Option<u32>,
    next: Option<String>,
}

pub struct Game {
    config: Config,
    arena: FrameArena,
    sheets: Sheets,
    sounds: SoundBank,
    levels: BTreeMap<String, Level>,
    level: String,
    state: GameState,
    draw: DrawList,
    status: Status,
    /// Score banked from completed levels
    total_score: u32,
    last_events: Vec<GameEvent>,
}

impl Game {
    /// Load every asset the run needs and start the configured level
    pub fn load<A: Assets + ?Sized>(config: Config, assets: &A) -> Result<Self> {
        let mut arena = FrameArena::new();
        let sheets = arena.load_sheets(assets, &config)?;
        let sounds = SoundBank::load(assets, &config.sounds)?;
        let view = View::from_config(&config);

        let mut levels = BTreeMap::new();
        let state = match config.mode {
            GameMode::Platformer => {
                let index = load_level_index(assets, &config.levels_dir)?;
                levels = load_level_chain(assets, &config, &index, &mut arena)?;
                let level = levels
                    .get(&config.level)
                    .ok_or_else(|| AssetLoadError::UnknownLevel(config.level.clone()))?;
                level_state(level, &sheets, view, &config)
            }
            GameMode::TopDown => {
                arena.load_map_images(assets, &config.map_images, None)?;
                let mut state = GameState::top_down(
                    sheets.clone(),
                    view,
                    config.camera,
                    config.enemy_count,
                    config.seed,
                );
                if config.camera_bounds {
                    state.clamp_camera(view.world);
                }
                state
            }
        };

        log::info!(
            "{}: {} mode, {} images, {} levels, starting at level {}",
            config.title,
            config.mode.as_str(),
            arena.len(),
            levels.len(),
            config.level
        );

        Ok(Self {
            level: config.level.clone(),
            config,
            arena,
            sheets,
            sounds,
            levels,
            state,
            draw: DrawList::new(),
            status: Status::Running,
            total_score: 0,
            last_events: Vec::new(),
        })
    }

    /// Advance one frame, play its sounds and handle level transitions
    pub fn step<S: AudioSink>(&mut self, input: &TickInput, audio: &mut AudioManager<S>) -> Status {
        if self.status != Status::Running {
            return self.status;
        }

        tick(&mut self.state, input);
        self.last_events = self.state.drain_events();
        for event in &self.last_events {
            log::debug!("tick {}: {:?}", self.state.time_ticks, event);
        }
        audio.handle_events(&self.last_events);

        match self.state.phase {
            GamePhase::Playing => {}
            GamePhase::LevelComplete => self.advance_level(),
            GamePhase::GameOver => {
                log::info!("Game over on level {} with score {}", self.level, self.score());
                self.status = Status::GameOver;
            }
            GamePhase::Quit => self.status = Status::Quit,
        }
        self.status
    }

    fn advance_level(&mut self) {
        self.total_score += self.state.score;
        let next = self.levels.get(&self.level).and_then(|l| l.next.clone());
        let Some(level) = next.as_ref().and_then(|id| self.levels.get(id)) else {
            log::info!("Level {} was the last, final score {}", self.level, self.total_score);
            self.status = Status::Victory;
            return;
        };

        let view = View::from_config(&self.config);
        self.state = level_state(level, &self.sheets, view, &self.config);
        self.draw.reset();
        if let Some(id) = next {
            log::info!("Level {} complete, loading level {}", self.level, id);
            self.level = id;
        }
    }

    /// Build this tick's draw list
    pub fn draw(&mut self) -> &[SpriteInstance] {
        self.draw.build(&self.state, &self.arena)
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Current level id
    pub fn level(&self) -> &str {
        &self.level
    }

    /// Banked score plus the current level's score
    pub fn score(&self) -> u32 {
        self.total_score + self.state.score
    }

    pub fn last_events(&self) -> &[GameEvent] {
        &self.last_events
    }

    /// Sound files for [`AudioManager::load_sounds`]
    pub fn sounds(&self) -> &SoundBank {
        &self.sounds
    }

    pub fn arena(&self) -> &FrameArena {
        &self.arena
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Parse the start level and every level reachable through `next`
fn load_level_chain<A: Assets + ?Sized>(
    assets: &A,
    config: &Config,
    index: &LevelIndex,
    arena: &mut FrameArena,
) -> Result<BTreeMap<String, Level>> {
    let mut levels = BTreeMap::new();
    let mut id = Some(config.level.clone());
    while let Some(current) = id.take() {
        if levels.contains_key(&current) {
            log::warn!("level chain loops back to level {current}");
            break;
        }
        let info = index
            .get(&current)
            .ok_or_else(|| AssetLoadError::UnknownLevel(current.clone()))?;
        let layout = load_layout(assets, config, &current)?;
        arena.load_map_images(assets, &config.map_images, Some(&layout.map))?;

        // A zero objective means the level has none
        let points = info.objectives.points;
        id = info.next.clone();
        levels.insert(
            current,
            Level {
                layout,
                score_needed: (points > 0).then_some(points),
                next: info.next.clone(),
            },
        );
    }
    Ok(levels)
}

fn level_state(level: &Level, sheets: &Sheets, view: View, config: &Config) -> GameState {
    let mut state = GameState::platformer(
        level.layout.clone(),
        sheets.clone(),
        view,
        config.camera,
        level.score_needed,
    );
    state.player.body = PhysicsBody::default().with_lift_model(config.lift_model);
    if config.camera_bounds {
        state.clamp_camera(level.layout.map.pixel_size());
    }
    state
}
