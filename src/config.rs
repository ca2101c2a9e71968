//! Startup configuration
//!
//! Built once from `key=value` command-line tokens and passed by reference
//! to whatever needs it. Window dimensions are derived here and nowhere else.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use glam::Vec2;

use crate::consts::{WORLD_HEIGHT, WORLD_WIDTH};
use crate::error::ConfigError;
use crate::sim::{CameraMode, FloorCheck, LiftModel};

/// Which game loop to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameMode {
    /// Keyboard walking, jumping and tile floors
    #[default]
    Platformer,
    /// Mouse-follow movement through a large scrolling world
    TopDown,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Platformer => "platformer",
            GameMode::TopDown => "topdown",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "platformer" | "platform" => Some(GameMode::Platformer),
            "topdown" | "top-down" | "top_down" => Some(GameMode::TopDown),
            _ => None,
        }
    }

    /// Camera behaviour when the `camera` key is absent
    pub fn default_camera(&self) -> CameraMode {
        match self {
            GameMode::Platformer => CameraMode::Fixed,
            GameMode::TopDown => CameraMode::Follow,
        }
    }
}

/// Split tokens into positional arguments and `key=value` pairs.
///
/// Only the first `=` separates key from value, so values may contain `=`.
pub fn parse_kwargs<I, S>(tokens: I) -> (Vec<String>, HashMap<String, String>)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut positional = Vec::new();
    let mut kwargs = HashMap::new();
    for token in tokens {
        let token = token.as_ref();
        match token.split_once('=') {
            Some((key, value)) => {
                kwargs.insert(key.to_owned(), value.to_owned());
            }
            None => positional.push(token.to_owned()),
        }
    }
    (positional, kwargs)
}

/// Immutable game configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub title: String,
    pub tile_width: u32,
    pub tile_height: u32,
    /// Window width in tiles
    pub width_tiles: u32,
    /// Window height in tiles
    pub height_tiles: u32,
    pub fps: u32,
    pub mode: GameMode,

    // === Levels ===
    /// Starting level id
    pub level: String,
    /// Directory holding `<id>.txt` maps and `info.json`
    pub levels_dir: PathBuf,

    // === Sprite sets ===
    pub player_images: PathBuf,
    pub mob_images: PathBuf,
    pub item_images: PathBuf,
    pub snowball_images: PathBuf,
    pub map_images: PathBuf,
    pub sounds: PathBuf,

    // === Top-down ===
    pub enemy_count: u32,
    pub seed: u64,
    pub world_size: Vec2,

    pub camera: CameraMode,
    /// Keep the camera view inside the world (or level map)
    pub camera_bounds: bool,
    pub floor_check: FloorCheck,
    pub lift_model: LiftModel,

    /// Number of ticks the headless runner simulates
    pub ticks: u64,
}

impl Config {
    /// Build from parsed `key=value` pairs
    pub fn from_kwargs(kwargs: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &'static str| kwargs.get(key).map(String::as_str);
        let path_or = |key: &'static str, default: &str| {
            PathBuf::from(get(key).unwrap_or(default))
        };

        let mode = match get("mode") {
            Some(v) => GameMode::from_str(v).ok_or_else(|| ConfigError::Malformed {
                key: "mode",
                value: v.to_owned(),
                expected: "`platformer` or `topdown`",
            })?,
            None => GameMode::default(),
        };
        let camera = match get("camera") {
            Some(v) => CameraMode::from_str(v).ok_or_else(|| ConfigError::Malformed {
                key: "camera",
                value: v.to_owned(),
                expected: "`follow` or `fixed`",
            })?,
            None => mode.default_camera(),
        };
        let floor_check = match get("floor") {
            Some(v) => FloorCheck::from_str(v).ok_or_else(|| ConfigError::Malformed {
                key: "floor",
                value: v.to_owned(),
                expected: "`lenient` or `strict`",
            })?,
            None => FloorCheck::default(),
        };
        let lift_model = match get("jump") {
            Some(v) => LiftModel::from_str(v).ok_or_else(|| ConfigError::Malformed {
                key: "jump",
                value: v.to_owned(),
                expected: "`squared` or `linear`",
            })?,
            None => LiftModel::default(),
        };

        let config = Self {
            title: require(kwargs, "title")?.to_owned(),
            tile_width: parse_required(kwargs, "tile_width", "a positive integer")?,
            tile_height: parse_required(kwargs, "tile_height", "a positive integer")?,
            width_tiles: parse_required(kwargs, "width", "a positive integer")?,
            height_tiles: parse_required(kwargs, "height", "a positive integer")?,
            fps: parse_required(kwargs, "fps", "a positive integer")?,
            mode,
            level: get("level").unwrap_or("1").to_owned(),
            levels_dir: path_or("levels", "./resources/levels"),
            player_images: path_or("player_images", "./resources/player"),
            mob_images: path_or("mob_images", "./resources/mob"),
            item_images: path_or("item_images", "./resources/item"),
            snowball_images: path_or("snowball_images", "./resources/snowball"),
            map_images: path_or("map_images", "./resources/map_gen"),
            sounds: path_or("sounds", "./resources/sounds"),
            enemy_count: parse_optional(kwargs, "enemy_count", "an integer")?.unwrap_or(0),
            seed: parse_optional(kwargs, "seed", "an integer")?.unwrap_or(0),
            world_size: Vec2::new(
                parse_optional(kwargs, "world_width", "a number")?.unwrap_or(WORLD_WIDTH),
                parse_optional(kwargs, "world_height", "a number")?.unwrap_or(WORLD_HEIGHT),
            ),
            camera,
            camera_bounds: parse_optional(kwargs, "camera_bounds", "`true` or `false`")?
                .unwrap_or(false),
            floor_check,
            lift_model,
            ticks: parse_optional(kwargs, "ticks", "an integer")?.unwrap_or(600),
        };

        for (key, value) in [
            ("tile_width", config.tile_width),
            ("tile_height", config.tile_height),
            ("width", config.width_tiles),
            ("height", config.height_tiles),
            ("fps", config.fps),
        ] {
            if value == 0 {
                return Err(ConfigError::Malformed {
                    key,
                    value: "0".to_owned(),
                    expected: "a positive integer",
                });
            }
        }

        for (key, tiles, tile) in [
            ("width", config.width_tiles, config.tile_width),
            ("height", config.height_tiles, config.tile_height),
        ] {
            if tiles.checked_mul(tile).is_none() {
                return Err(ConfigError::Malformed {
                    key,
                    value: tiles.to_string(),
                    expected: "a window that fits in u32 pixels",
                });
            }
        }

        Ok(config)
    }

    /// Parse straight from command-line tokens (program name excluded)
    pub fn from_args<I, S>(tokens: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (_, kwargs) = parse_kwargs(tokens);
        Self::from_kwargs(&kwargs)
    }

    /// Window size in pixels
    pub fn window_size(&self) -> Vec2 {
        Vec2::new(
            self.width_tiles as f32 * self.tile_width as f32,
            self.height_tiles as f32 * self.tile_height as f32,
        )
    }

    /// Integer half of the window size, the point the camera centers on
    pub fn half_window(&self) -> Vec2 {
        let size = self.window_size();
        Vec2::new((size.x / 2.0).floor(), (size.y / 2.0).floor())
    }
}

fn require<'a>(
    kwargs: &'a HashMap<String, String>,
    key: &'static str,
) -> Result<&'a str, ConfigError> {
    kwargs
        .get(key)
        .map(String::as_str)
        .ok_or(ConfigError::Missing(key))
}

fn parse_required<T: FromStr>(
    kwargs: &HashMap<String, String>,
    key: &'static str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    let value = require(kwargs, key)?;
    parse_value(key, value, expected)
}

fn parse_optional<T: FromStr>(
    kwargs: &HashMap<String, String>,
    key: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    kwargs
        .get(key)
        .map(|value| parse_value(key, value, expected))
        .transpose()
}

fn parse_value<T: FromStr>(
    key: &'static str,
    value: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Malformed {
        key,
        value: value.to_owned(),
        expected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_tokens() -> Vec<&'static str> {
        vec![
            "title=Snow Game",
            "tile_width=32",
            "tile_height=32",
            "width=25",
            "height=16",
            "fps=30",
        ]
    }

    #[test]
    fn test_parse_kwargs_splits_positional() {
        let (pos, kw) = parse_kwargs(["run", "a=1", "b=x=y", "verbose"]);
        assert_eq!(pos, vec!["run".to_owned(), "verbose".to_owned()]);
        assert_eq!(kw.get("a").map(String::as_str), Some("1"));
        assert_eq!(kw.get("b").map(String::as_str), Some("x=y"));
    }

    #[test]
    fn test_config_defaults_and_derived_sizes() {
        let config = Config::from_args(base_tokens()).unwrap();
        assert_eq!(config.title, "Snow Game");
        assert_eq!(config.mode, GameMode::Platformer);
        assert_eq!(config.camera, CameraMode::Fixed);
        assert_eq!(config.floor_check, FloorCheck::Lenient);
        assert_eq!(config.level, "1");
        assert_eq!(config.window_size(), Vec2::new(800.0, 512.0));
        assert_eq!(config.half_window(), Vec2::new(400.0, 256.0));
        assert_eq!(config.world_size, Vec2::new(1920.0, 1080.0));
        assert!(!config.camera_bounds);
        assert_eq!(config.lift_model, LiftModel::Squared);
    }

    #[test]
    fn test_optional_modes() {
        let mut tokens = base_tokens();
        tokens.extend(["camera_bounds=true", "jump=linear", "floor=strict"]);
        let config = Config::from_args(tokens).unwrap();
        assert!(config.camera_bounds);
        assert_eq!(config.lift_model, LiftModel::Linear);
        assert_eq!(config.floor_check, FloorCheck::Strict);

        let mut tokens = base_tokens();
        tokens.push("jump=cubic");
        assert!(matches!(
            Config::from_args(tokens).unwrap_err(),
            ConfigError::Malformed { key: "jump", .. }
        ));
    }

    #[test]
    fn test_window_pixel_overflow_rejected() {
        let mut tokens = base_tokens();
        tokens.extend(["tile_width=70000", "width=70000"]);
        assert_eq!(
            Config::from_args(tokens).unwrap_err(),
            ConfigError::Malformed {
                key: "width",
                value: "70000".to_owned(),
                expected: "a window that fits in u32 pixels",
            }
        );

        let mut tokens = base_tokens();
        tokens.extend(["tile_height=65536", "height=65536"]);
        assert!(matches!(
            Config::from_args(tokens).unwrap_err(),
            ConfigError::Malformed { key: "height", .. }
        ));
    }

    #[test]
    fn test_topdown_follows_by_default() {
        let mut tokens = base_tokens();
        tokens.push("mode=topdown");
        tokens.push("enemy_count=50");
        let config = Config::from_args(tokens).unwrap();
        assert_eq!(config.mode, GameMode::TopDown);
        assert_eq!(config.camera, CameraMode::Follow);
        assert_eq!(config.enemy_count, 50);
    }

    #[test]
    fn test_missing_key() {
        let tokens: Vec<_> = base_tokens()
            .into_iter()
            .filter(|t| !t.starts_with("fps"))
            .collect();
        assert_eq!(
            Config::from_args(tokens).unwrap_err(),
            ConfigError::Missing("fps")
        );
    }

    #[test]
    fn test_malformed_values() {
        let mut tokens = base_tokens();
        tokens.push("tile_width=wide");
        assert!(matches!(
            Config::from_args(tokens).unwrap_err(),
            ConfigError::Malformed { key: "tile_width", .. }
        ));

        let mut tokens = base_tokens();
        tokens.push("mode=racing");
        assert!(matches!(
            Config::from_args(tokens).unwrap_err(),
            ConfigError::Malformed { key: "mode", .. }
        ));

        let mut tokens = base_tokens();
        tokens.push("height=0");
        assert!(matches!(
            Config::from_args(tokens).unwrap_err(),
            ConfigError::Malformed { key: "height", .. }
        ));
    }
}
