//! Sound effects
//!
//! Playback itself belongs to the platform. The game only decides which
//! effect to fire and how loud; an [`AudioSink`] does the rest.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::assets::AssetSource;
use crate::consts::SFX_VOLUME;
use crate::error::AssetLoadError;
use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Snowball thrown
    Throw,
    /// Snowball hit an enemy, or an item was picked up
    Hit,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 2] = [SoundEffect::Throw, SoundEffect::Hit];

    pub fn file_name(&self) -> &'static str {
        match self {
            SoundEffect::Throw => "throw.wav",
            SoundEffect::Hit => "hit.wav",
        }
    }

    pub fn path(&self, sounds_dir: &Path) -> PathBuf {
        sounds_dir.join(self.file_name())
    }

    /// Effect a game event should trigger, if any
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Thrown { .. } => Some(SoundEffect::Throw),
            GameEvent::EnemyHit { .. } | GameEvent::ItemCollected { .. } => Some(SoundEffect::Hit),
            _ => None,
        }
    }
}

/// Resolved sound file of every effect, checked once at startup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SoundBank {
    paths: HashMap<SoundEffect, PathBuf>,
}

impl SoundBank {
    /// Resolve every effect under `dir`. A missing file is fatal.
    pub fn load<A: AssetSource + ?Sized>(assets: &A, dir: &Path) -> Result<Self, AssetLoadError> {
        let mut paths = HashMap::new();
        for effect in SoundEffect::ALL {
            let path = effect.path(dir);
            if !assets.exists(&path) {
                return Err(AssetLoadError::NotFound(path));
            }
            paths.insert(effect, path);
        }
        log::info!("Loaded {} sound effects from {}", paths.len(), dir.display());
        Ok(Self { paths })
    }

    pub fn path(&self, effect: SoundEffect) -> Option<&Path> {
        self.paths.get(&effect).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SoundEffect, &Path)> {
        SoundEffect::ALL
            .into_iter()
            .filter_map(|effect| self.path(effect).map(|path| (effect, path)))
    }
}

/// Fire-and-forget sound output
pub trait AudioSink {
    /// Prepare the file an effect plays from
    fn load(&mut self, effect: SoundEffect, path: &Path);

    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Writes effects to the log instead of a speaker
#[derive(Debug, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn load(&mut self, effect: SoundEffect, path: &Path) {
        log::debug!("sfx {:?} from {}", effect, path.display());
    }

    fn play(&mut self, effect: SoundEffect, volume: f32) {
        log::debug!("sfx {:?} at volume {:.2}", effect, volume);
    }
}

/// Remembers everything loaded and played
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub loaded: Vec<(SoundEffect, PathBuf)>,
    pub played: Vec<(SoundEffect, f32)>,
}

impl AudioSink for RecordingSink {
    fn load(&mut self, effect: SoundEffect, path: &Path) {
        self.loaded.push((effect, path.to_path_buf()));
    }

    fn play(&mut self, effect: SoundEffect, volume: f32) {
        self.played.push((effect, volume));
    }
}

/// Audio manager for the game
pub struct AudioManager<S: AudioSink> {
    sink: S,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<S: AudioSink> AudioManager<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            master_volume: 1.0,
            sfx_volume: SFX_VOLUME,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Hand every resolved sound file to the sink
    pub fn load_sounds(&mut self, bank: &SoundBank) {
        for (effect, path) in bank.iter() {
            self.sink.load(effect, path);
        }
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.sink.play(effect, vol);
    }

    /// Play whatever the tick's events call for
    pub fn handle_events(&mut self, events: &[GameEvent]) {
        for effect in events.iter().filter_map(SoundEffect::for_event) {
            self.play(effect);
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
