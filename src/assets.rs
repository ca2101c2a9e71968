//! Asset tables and the preloaded frame arena
//!
//! Sprite sets live in one directory each:
//!
//! ```text
//! player/info.json      {"idle": {"count": 16}, "walk": {"count": 15}, ...}
//! player/idle/1.png
//! player/idle/2.png
//! ...
//! ```
//!
//! Every frame is registered once at startup and gets a stable slot. The
//! render service loads images by slot; the simulation never sees a path.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use glam::UVec2;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::AssetLoadError;
use crate::sim::{Clip, LevelLayout, Sheet, Sheets, SpriteSet, TileCode, TileMap};

/// Index of a registered image
pub type Slot = u32;

/// Reads text assets (clip tables, level info, level maps)
pub trait AssetSource {
    fn read_text(&self, path: &Path) -> Result<String, AssetLoadError>;

    /// Whether a file the platform opens itself (sounds) is present
    fn exists(&self, path: &Path) -> bool;
}

/// Inspects image assets without keeping pixel data
pub trait ImageSource {
    /// Pixel dimensions of the image at `path`
    fn image_size(&self, path: &Path) -> Result<UVec2, AssetLoadError>;
}

/// Filesystem-backed assets; PNG headers are decoded for frame sizes
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskAssets;

fn io_error(path: &Path, source: io::Error) -> AssetLoadError {
    if source.kind() == io::ErrorKind::NotFound {
        AssetLoadError::NotFound(path.to_path_buf())
    } else {
        AssetLoadError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl AssetSource for DiskAssets {
    fn read_text(&self, path: &Path) -> Result<String, AssetLoadError> {
        fs::read_to_string(path).map_err(|e| io_error(path, e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

impl ImageSource for DiskAssets {
    fn image_size(&self, path: &Path) -> Result<UVec2, AssetLoadError> {
        let file = File::open(path).map_err(|e| io_error(path, e))?;
        let decoder = png::Decoder::new(BufReader::new(file));
        let reader = decoder.read_info().map_err(|source| AssetLoadError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let info = reader.info();
        Ok(UVec2::new(info.width, info.height))
    }
}

/// In-memory assets for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    texts: HashMap<PathBuf, String>,
    images: HashMap<PathBuf, UVec2>,
    /// Opaque files that only need to exist
    files: HashSet<PathBuf>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.texts.insert(path.into(), text.into());
        self
    }

    pub fn with_image(mut self, path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
        self.images.insert(path.into(), UVec2::new(width, height));
        self
    }

    pub fn insert_text(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.texts.insert(path.into(), text.into());
    }

    pub fn insert_image(&mut self, path: impl Into<PathBuf>, width: u32, height: u32) {
        self.images.insert(path.into(), UVec2::new(width, height));
    }

    pub fn insert_file(&mut self, path: impl Into<PathBuf>) {
        self.files.insert(path.into());
    }

    pub fn remove(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.texts.remove(path);
        self.images.remove(path);
        self.files.remove(path);
    }
}

impl AssetSource for MemoryAssets {
    fn read_text(&self, path: &Path) -> Result<String, AssetLoadError> {
        self.texts
            .get(path)
            .cloned()
            .ok_or_else(|| AssetLoadError::NotFound(path.to_path_buf()))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains(path) || self.texts.contains_key(path) || self.images.contains_key(path)
    }
}

impl ImageSource for MemoryAssets {
    fn image_size(&self, path: &Path) -> Result<UVec2, AssetLoadError> {
        self.images
            .get(path)
            .copied()
            .ok_or_else(|| AssetLoadError::NotFound(path.to_path_buf()))
    }
}

/// Anything that can serve both text and images
pub trait Assets: AssetSource + ImageSource {}

impl<T: AssetSource + ImageSource> Assets for T {}

/// One clip entry of a sprite set's `info.json`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ClipInfo {
    pub count: u16,
    /// Accepted for compatibility; playback is one frame per tick
    #[serde(default)]
    pub fps: Option<u32>,
}

/// Score objective of a level
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Objectives {
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub enemies: u32,
}

/// Metadata for one level in the levels directory's `info.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LevelInfo {
    #[serde(default)]
    pub objectives: Objectives,
    /// Level loaded after this one; `None` ends the game
    #[serde(default)]
    pub next: Option<String>,
}

/// All level metadata, keyed by level id
pub type LevelIndex = BTreeMap<String, LevelInfo>;

fn read_json<T, A>(assets: &A, path: &Path) -> Result<T, AssetLoadError>
where
    T: DeserializeOwned,
    A: AssetSource + ?Sized,
{
    let text = assets.read_text(path)?;
    serde_json::from_str(&text).map_err(|source| AssetLoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Which kind of entity a sprite set belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SetKind {
    Player,
    Mob,
    Item,
    Shot,
}

impl SetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetKind::Player => "player",
            SetKind::Mob => "mob",
            SetKind::Item => "item",
            SetKind::Shot => "shot",
        }
    }

    /// Clip that must exist because entities of this kind spawn with it
    pub fn required_clip(&self) -> Clip {
        match self {
            SetKind::Shot => Clip::Shot,
            _ => Clip::Idle,
        }
    }

    fn dir<'a>(&self, config: &'a Config) -> &'a Path {
        match self {
            SetKind::Player => config.player_images.as_path(),
            SetKind::Mob => config.mob_images.as_path(),
            SetKind::Item => config.item_images.as_path(),
            SetKind::Shot => config.snowball_images.as_path(),
        }
    }
}

/// A registered image and its pixel size
#[derive(Debug, Clone, PartialEq)]
pub struct ImageEntry {
    pub path: PathBuf,
    pub size: UVec2,
}

/// Every image the game can draw, registered once at startup
#[derive(Debug, Clone, Default)]
pub struct FrameArena {
    images: Vec<ImageEntry>,
    frames: HashMap<(SetKind, Clip, u16), Slot>,
    tiles: HashMap<TileCode, Slot>,
    background: Option<Slot>,
}

impl FrameArena {
    pub fn new() -> Self {
        Self::default()
    }

    fn register(&mut self, path: PathBuf, size: UVec2) -> Slot {
        let slot = self.images.len() as Slot;
        self.images.push(ImageEntry { path, size });
        slot
    }

    /// Slot of one animation frame, `None` if it failed to load
    pub fn frame(&self, set: SetKind, clip: Clip, frame: u16) -> Option<Slot> {
        self.frames.get(&(set, clip, frame)).copied()
    }

    pub fn tile(&self, code: TileCode) -> Option<Slot> {
        self.tiles.get(&code).copied()
    }

    pub fn background(&self) -> Option<Slot> {
        self.background
    }

    pub fn image(&self, slot: Slot) -> Option<&ImageEntry> {
        self.images.get(slot as usize)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Register a sprite set and return its clip table and entity size.
    ///
    /// The first frame of the kind's required clip must load; it defines the
    /// entity size. Any other missing frame is logged and skipped.
    pub fn load_sheet<A: Assets + ?Sized>(
        &mut self,
        assets: &A,
        kind: SetKind,
        dir: &Path,
    ) -> Result<Sheet, AssetLoadError> {
        let table: BTreeMap<String, ClipInfo> = read_json(assets, &dir.join("info.json"))?;

        let mut counts = Vec::new();
        for (name, info) in &table {
            match Clip::from_str(name) {
                Some(clip) => counts.push((clip, info.count)),
                None => log::warn!("{}: ignoring unknown clip `{}`", dir.display(), name),
            }
        }
        let clips = SpriteSet::new(counts);

        let required = kind.required_clip();
        if !clips.has(required) {
            return Err(AssetLoadError::MissingClip {
                dir: dir.to_path_buf(),
                clip: required.as_str().to_owned(),
            });
        }

        let mut size = None;
        for (clip, count) in clips.clips() {
            for frame in 1..=count {
                let path = frame_path(dir, clip, frame);
                match assets.image_size(&path) {
                    Ok(px) => {
                        if clip == required && frame == 1 {
                            size = Some(px);
                        }
                        let slot = self.register(path, px);
                        self.frames.insert((kind, clip, frame), slot);
                    }
                    Err(AssetLoadError::NotFound(_)) if !(clip == required && frame == 1) => {
                        log::warn!("missing frame {}, holding previous frame", path.display());
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        let size = size.ok_or_else(|| {
            AssetLoadError::NotFound(frame_path(dir, required, 1))
        })?;
        log::info!(
            "Loaded {} sprites from {}: {} clips, {}x{} px",
            kind.as_str(),
            dir.display(),
            table.len(),
            size.x,
            size.y
        );

        Ok(Sheet {
            clips,
            size: size.as_vec2(),
        })
    }

    /// Register all four sprite sets named by the config
    pub fn load_sheets<A: Assets + ?Sized>(
        &mut self,
        assets: &A,
        config: &Config,
    ) -> Result<Sheets, AssetLoadError> {
        Ok(Sheets {
            player: self.load_sheet(assets, SetKind::Player, SetKind::Player.dir(config))?,
            mob: self.load_sheet(assets, SetKind::Mob, SetKind::Mob.dir(config))?,
            item: self.load_sheet(assets, SetKind::Item, SetKind::Item.dir(config))?,
            shot: self.load_sheet(assets, SetKind::Shot, SetKind::Shot.dir(config))?,
        })
    }

    /// Register the background and one image per solid tile code of `map`
    pub fn load_map_images<A: Assets + ?Sized>(
        &mut self,
        assets: &A,
        dir: &Path,
        map: Option<&TileMap>,
    ) -> Result<(), AssetLoadError> {
        if self.background.is_none() {
            let path = dir.join("background.png");
            let size = assets.image_size(&path)?;
            self.background = Some(self.register(path, size));
        }

        let Some(map) = map else { return Ok(()) };
        for (_, code) in map.solid_tiles() {
            if self.tiles.contains_key(&code) {
                continue;
            }
            let path = dir.join(format!("{}.png", code.as_str()));
            match assets.image_size(&path) {
                Ok(size) => {
                    let slot = self.register(path, size);
                    self.tiles.insert(code, slot);
                }
                Err(AssetLoadError::NotFound(_)) => {
                    log::warn!("no image for tile `{}` at {}", code, path.display());
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// `<dir>/<clip>/<frame>.png`
pub fn frame_path(dir: &Path, clip: Clip, frame: u16) -> PathBuf {
    dir.join(clip.as_str()).join(format!("{frame}.png"))
}

/// Level metadata from `<levels>/info.json`
pub fn load_level_index<A: AssetSource + ?Sized>(
    assets: &A,
    levels_dir: &Path,
) -> Result<LevelIndex, AssetLoadError> {
    read_json(assets, &levels_dir.join("info.json"))
}

/// Parse `<levels>/<id>.txt` with the config's tile size and floor check
pub fn load_layout<A: AssetSource + ?Sized>(
    assets: &A,
    config: &Config,
    level: &str,
) -> Result<LevelLayout, AssetLoadError> {
    let path = config.levels_dir.join(format!("{level}.txt"));
    let text = assets.read_text(&path)?;
    let mut layout = LevelLayout::parse(level, &text, config.tile_width, config.tile_height)?;
    layout.map = layout.map.with_floor_check(config.floor_check);
    Ok(layout)
}

#[cfg(test)]
pub(crate) mod testutils {
    use super::*;

    /// Sprite sets, map images and two levels under `res/`
    pub fn assets() -> MemoryAssets {
        let mut assets = MemoryAssets::new();
        let sets: [(&str, &[(&str, u16)], (u32, u32)); 4] = [
            ("res/player", &[("idle", 4), ("walk", 6), ("jump", 3), ("dead", 3)], (32, 64)),
            ("res/mob", &[("idle", 2), ("dead", 3)], (32, 32)),
            ("res/item", &[("idle", 1)], (16, 16)),
            ("res/snowball", &[("shot", 2)], (8, 8)),
        ];
        for (dir, clips, (w, h)) in sets {
            let table = clips
                .iter()
                .map(|(name, count)| format!("\"{name}\": {{\"count\": {count}, \"fps\": 12}}"))
                .collect::<Vec<_>>()
                .join(", ");
            assets.insert_text(format!("{dir}/info.json"), format!("{{{table}}}"));
            for (name, count) in clips.iter() {
                for n in 1..=*count {
                    assets.insert_image(format!("{dir}/{name}/{n}.png"), w, h);
                }
            }
        }
        assets.insert_image("res/map/background.png", 320, 256);
        assets.insert_image("res/map/01.png", 32, 32);
        assets.insert_file("res/sounds/throw.wav");
        assets.insert_file("res/sounds/hit.wav");
        assets.insert_text(
            "res/levels/info.json",
            r#"{
                "1": {"objectives": {"points": 1, "enemies": 0}, "next": "2"},
                "2": {"objectives": {"points": 5, "enemies": 0}}
            }"#,
        );
        assets.insert_text("res/levels/1.txt", "..........\n..--14....\n..........\n0101010101\n");
        assets.insert_text("res/levels/2.txt", "..........\n..--..00..\n..........\n0101010101\n");
        assets
    }

    pub fn config() -> Config {
        Config::from_args([
            "title=test",
            "tile_width=32",
            "tile_height=32",
            "width=10",
            "height=8",
            "fps=30",
            "levels=res/levels",
            "player_images=res/player",
            "mob_images=res/mob",
            "item_images=res/item",
            "snowball_images=res/snowball",
            "map_images=res/map",
            "sounds=res/sounds",
        ])
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::testutils::*;
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_clip_info_ignores_fps() {
        let table: BTreeMap<String, ClipInfo> =
            serde_json::from_str(r#"{"idle": {"count": 16, "fps": 8}, "dead": {"count": 7}}"#).unwrap();
        assert_eq!(table["idle"].count, 16);
        assert_eq!(table["dead"].fps, None);
    }

    #[test]
    fn test_level_index_next_is_optional() {
        let index = load_level_index(&assets(), Path::new("res/levels")).unwrap();
        assert_eq!(index["1"].objectives.points, 1);
        assert_eq!(index["1"].next.as_deref(), Some("2"));
        assert_eq!(index["2"].next, None);
    }

    #[test]
    fn test_load_sheets_registers_every_frame() {
        let mut arena = FrameArena::new();
        let sheets = arena.load_sheets(&assets(), &config()).unwrap();
        assert_eq!(sheets.player.size, Vec2::new(32.0, 64.0));
        assert_eq!(sheets.player.clips.count(Clip::Walk), 6);
        assert_eq!(sheets.shot.size, Vec2::new(8.0, 8.0));
        assert_eq!(arena.len(), 4 + 6 + 3 + 3 + 2 + 3 + 1 + 2);

        let slot = arena.frame(SetKind::Mob, Clip::Dead, 3).unwrap();
        assert_eq!(
            arena.image(slot).map(|i| i.path.clone()),
            Some(PathBuf::from("res/mob/dead/3.png"))
        );
        assert_eq!(arena.frame(SetKind::Mob, Clip::Dead, 4), None);
    }

    #[test]
    fn test_missing_frame_is_skipped() {
        let assets = assets().with_text(
            "res/player/info.json",
            r#"{"idle": {"count": 4}, "walk": {"count": 7}}"#,
        );
        let mut arena = FrameArena::new();
        let sheet = arena
            .load_sheet(&assets, SetKind::Player, Path::new("res/player"))
            .unwrap();
        assert_eq!(sheet.clips.count(Clip::Walk), 7);
        assert!(arena.frame(SetKind::Player, Clip::Walk, 6).is_some());
        assert!(arena.frame(SetKind::Player, Clip::Walk, 7).is_none());
    }

    #[test]
    fn test_required_clip_must_exist() {
        let assets = assets().with_text("res/mob/info.json", r#"{"dead": {"count": 3}}"#);
        let err = FrameArena::new()
            .load_sheet(&assets, SetKind::Mob, Path::new("res/mob"))
            .unwrap_err();
        assert!(matches!(err, AssetLoadError::MissingClip { .. }));
    }

    #[test]
    fn test_first_required_frame_is_fatal() {
        let mut assets = assets();
        assets.remove("res/item/idle/1.png");
        let err = FrameArena::new()
            .load_sheet(&assets, SetKind::Item, Path::new("res/item"))
            .unwrap_err();
        assert!(matches!(err, AssetLoadError::NotFound(_)));
    }

    #[test]
    fn test_bad_json_reports_path() {
        let assets = assets().with_text("res/item/info.json", "{not json");
        let err = FrameArena::new()
            .load_sheet(&assets, SetKind::Item, Path::new("res/item"))
            .unwrap_err();
        match err {
            AssetLoadError::Json { path, .. } => assert_eq!(path, PathBuf::from("res/item/info.json")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_map_images_register_once() {
        let assets = assets();
        let config = config();
        let layout = load_layout(&assets, &config, "1").unwrap();
        let mut arena = FrameArena::new();
        arena.load_map_images(&assets, &config.map_images, Some(&layout.map)).unwrap();
        arena.load_map_images(&assets, &config.map_images, Some(&layout.map)).unwrap();
        assert_eq!(arena.len(), 2);
        assert!(arena.background().is_some());
        assert!(arena.tile(TileCode::new(*b"01")).is_some());
    }

    #[test]
    fn test_disk_assets_missing_file() {
        let err = DiskAssets
            .read_text(Path::new("/nonexistent/snowdrift/info.json"))
            .unwrap_err();
        assert!(matches!(err, AssetLoadError::NotFound(_)));
        assert!(!DiskAssets.exists(Path::new("/nonexistent/snowdrift/hit.wav")));
    }

    #[test]
    fn test_memory_assets_exists() {
        let mut assets = assets();
        assert!(assets.exists(Path::new("res/sounds/hit.wav")));
        assert!(assets.exists(Path::new("res/levels/1.txt")));
        assets.remove("res/sounds/hit.wav");
        assert!(!assets.exists(Path::new("res/sounds/hit.wav")));
    }
}
