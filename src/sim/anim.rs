//! Frame-count animation
//!
//! Frames are numbered from 1. One frame per tick, no wall-clock timing.

use std::collections::BTreeMap;

/// Animation clips used by the game's sprite sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Clip {
    Idle,
    Walk,
    Jump,
    Dead,
    Shot,
}

impl Clip {
    pub const ALL: [Clip; 5] = [Clip::Idle, Clip::Walk, Clip::Jump, Clip::Dead, Clip::Shot];

    /// Directory/key name of the clip
    pub fn as_str(&self) -> &'static str {
        match self {
            Clip::Idle => "idle",
            Clip::Walk => "walk",
            Clip::Jump => "jump",
            Clip::Dead => "dead",
            Clip::Shot => "shot",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "idle" => Some(Clip::Idle),
            "walk" => Some(Clip::Walk),
            "jump" => Some(Clip::Jump),
            "dead" => Some(Clip::Dead),
            "shot" => Some(Clip::Shot),
            _ => None,
        }
    }
}

/// Frame counts of every clip one kind of entity owns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpriteSet {
    counts: BTreeMap<Clip, u16>,
}

impl SpriteSet {
    pub fn new(counts: impl IntoIterator<Item = (Clip, u16)>) -> Self {
        Self {
            counts: counts.into_iter().map(|(c, n)| (c, n.max(1))).collect(),
        }
    }

    /// Frame count of `clip`, 1 for clips the set lacks
    pub fn count(&self, clip: Clip) -> u16 {
        self.counts.get(&clip).copied().unwrap_or(1)
    }

    pub fn has(&self, clip: Clip) -> bool {
        self.counts.contains_key(&clip)
    }

    pub fn clips(&self) -> impl Iterator<Item = (Clip, u16)> + '_ {
        self.counts.iter().map(|(c, n)| (*c, *n))
    }
}

/// Playback position within one clip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Animation {
    clip: Clip,
    /// Current frame, `1..=frame_count`
    frame: u16,
    frame_count: u16,
}

impl Animation {
    pub fn new(clip: Clip, frame_count: u16) -> Self {
        Self {
            clip,
            frame: 1,
            frame_count: frame_count.max(1),
        }
    }

    pub fn start(clip: Clip, set: &SpriteSet) -> Self {
        Self::new(clip, set.count(clip))
    }

    #[inline]
    pub fn clip(&self) -> Clip {
        self.clip
    }

    #[inline]
    pub fn frame(&self) -> u16 {
        self.frame
    }

    #[inline]
    pub fn frame_count(&self) -> u16 {
        self.frame_count
    }

    /// Switch clips, restarting at frame 1. Same clip keeps its position.
    pub fn play(&mut self, clip: Clip, set: &SpriteSet) {
        if clip != self.clip {
            *self = Self::start(clip, set);
        }
    }

    /// Next frame of a looping clip, wrapping to 1
    pub fn advance(&mut self) {
        self.frame = if self.frame >= self.frame_count {
            1
        } else {
            self.frame + 1
        };
    }

    /// Next frame of a one-shot clip.
    ///
    /// Returns `true` once the last frame has already been shown, i.e. the
    /// clip has played to completion.
    pub fn advance_once(&mut self) -> bool {
        if self.frame < self.frame_count {
            self.frame += 1;
            false
        } else {
            true
        }
    }
}
