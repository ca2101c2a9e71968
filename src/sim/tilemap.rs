//! Tile map and floor query
//!
//! Levels are text grids of 2-character tile codes, one row per line:
//!
//! ```text
//! ..........
//! ..--....14
//! 0101010101
//! ```
//!
//! Any code containing a `.` is empty. `--`, `00` and `14` mark the player,
//! enemy and item spawns and are stored as empty tiles. Everything else is
//! solid ground whose image the asset service bakes into the background.

use std::fmt;

use glam::Vec2;

use crate::Point2D;
use crate::error::AssetLoadError;

/// One grid cell
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCode([u8; 2]);

impl TileCode {
    pub const EMPTY: TileCode = TileCode(*b"..");
    pub const PLAYER_SPAWN: TileCode = TileCode(*b"--");
    pub const ENEMY_SPAWN: TileCode = TileCode(*b"00");
    pub const ITEM_SPAWN: TileCode = TileCode(*b"14");

    pub const fn new(code: [u8; 2]) -> Self {
        Self(code)
    }

    /// Passable for floor purposes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.contains(&b'.')
    }

    #[inline]
    pub fn is_solid(&self) -> bool {
        !self.is_empty()
    }

    pub fn as_str(&self) -> &str {
        // Only built from ASCII
        std::str::from_utf8(&self.0).unwrap_or("??")
    }
}

impl fmt::Debug for TileCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TileCode({})", self.as_str())
    }
}

impl fmt::Display for TileCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How many feet must touch a solid tile to count as floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FloorCheck {
    /// Left OR right column solid. An entity can stand on a ledge with one foot.
    #[default]
    Lenient,
    /// Left AND right column solid
    Strict,
}

impl FloorCheck {
    pub fn as_str(&self) -> &'static str {
        match self {
            FloorCheck::Lenient => "lenient",
            FloorCheck::Strict => "strict",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lenient" | "either" => Some(FloorCheck::Lenient),
            "strict" | "both" => Some(FloorCheck::Strict),
            _ => None,
        }
    }
}

/// Rectangular, immutable grid of tile codes
#[derive(Debug, Clone, PartialEq)]
pub struct TileMap {
    tiles: Vec<TileCode>,
    rows: usize,
    cols: usize,
    tile_width: u32,
    tile_height: u32,
    floor_check: FloorCheck,
}

impl TileMap {
    /// Build from rows of codes; every row must have the same length
    pub fn from_rows(
        rows: Vec<Vec<TileCode>>,
        tile_width: u32,
        tile_height: u32,
    ) -> Result<Self, String> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(format!("row {} has {} tiles, expected {}", i, row.len(), cols));
        }
        if tile_width == 0 || tile_height == 0 {
            return Err("tile size must be positive".to_owned());
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            tiles: rows.into_iter().flatten().collect(),
            tile_width,
            tile_height,
            floor_check: FloorCheck::default(),
        })
    }

    pub fn with_floor_check(mut self, check: FloorCheck) -> Self {
        self.floor_check = check;
        self
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn tile_size(&self) -> Vec2 {
        Vec2::new(self.tile_width as f32, self.tile_height as f32)
    }

    /// Size of the whole map in pixels
    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new(
            (self.cols as u32 * self.tile_width) as f32,
            (self.rows as u32 * self.tile_height) as f32,
        )
    }

    pub fn tile(&self, row: usize, col: usize) -> Option<TileCode> {
        if row < self.rows && col < self.cols {
            Some(self.tiles[row * self.cols + col])
        } else {
            None
        }
    }

    /// Solid tiles with their top-left pixel position, for baking the background
    pub fn solid_tiles(&self) -> impl Iterator<Item = (Point2D, TileCode)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_solid())
            .map(|(i, t)| {
                let (row, col) = (i / self.cols, i % self.cols);
                let pos = Vec2::new(
                    (col as u32 * self.tile_width) as f32,
                    (row as u32 * self.tile_height) as f32,
                );
                (pos, *t)
            })
    }

    fn column_of(&self, x: f32) -> Option<usize> {
        let col = (x / self.tile_width as f32).floor();
        (col >= 0.0 && (col as usize) < self.cols).then_some(col as usize)
    }

    fn is_solid_at(&self, row: usize, col: Option<usize>) -> bool {
        col.and_then(|c| self.tile(row, c))
            .is_some_and(|t| t.is_solid())
    }

    /// Row of the nearest solid floor at or below an entity's bottom edge.
    ///
    /// Both points share the bottom edge's y. Scanning starts at the row that
    /// contains the pixel just above the edge, so an entity standing exactly
    /// on a tile finds that tile. Returns `rows()` when nothing solid lies
    /// below: the bottom of the world is an implicit floor.
    pub fn get_floor(&self, bottom_left: Point2D, bottom_right: Point2D) -> usize {
        let left = self.column_of(bottom_left.x);
        let right = self.column_of(bottom_right.x);
        let start = ((bottom_left.y - 1.0) / self.tile_height as f32).floor().max(0.0) as usize;

        (start..self.rows)
            .find(|&row| {
                let (l, r) = (self.is_solid_at(row, left), self.is_solid_at(row, right));
                match self.floor_check {
                    FloorCheck::Lenient => l || r,
                    FloorCheck::Strict => l && r,
                }
            })
            .unwrap_or(self.rows)
    }

    /// Pixel y of the top edge of `row`
    #[inline]
    pub fn row_top(&self, row: usize) -> f32 {
        (row as u32 * self.tile_height) as f32
    }
}

/// A parsed level: tile grid plus spawn points
#[derive(Debug, Clone)]
pub struct LevelLayout {
    pub map: TileMap,
    pub player: Point2D,
    pub enemies: Vec<Point2D>,
    pub items: Vec<Point2D>,
}

impl LevelLayout {
    /// Parse level text. Trailing blank lines are ignored.
    pub fn parse(
        level: &str,
        text: &str,
        tile_width: u32,
        tile_height: u32,
    ) -> Result<Self, AssetLoadError> {
        let malformed = |line: usize, reason: String| AssetLoadError::MalformedLevel {
            level: level.to_owned(),
            line,
            reason,
        };

        let lines: Vec<&str> = text.lines().map(|l| l.trim_end_matches('\r')).collect();
        let used = lines
            .iter()
            .rposition(|l| !l.is_empty())
            .map_or(0, |i| i + 1);

        let (tw, th) = (tile_width as f32, tile_height as f32);
        let mut rows = Vec::with_capacity(used);
        let mut player = None;
        let mut enemies = Vec::new();
        let mut items = Vec::new();

        for (row, line) in lines[..used].iter().enumerate() {
            let bytes = line.as_bytes();
            if !line.is_ascii() {
                return Err(malformed(row + 1, "non-ASCII tile code".to_owned()));
            }
            if bytes.len() % 2 != 0 {
                return Err(malformed(
                    row + 1,
                    format!("odd line length {}", bytes.len()),
                ));
            }

            let mut codes = Vec::with_capacity(bytes.len() / 2);
            for (col, pair) in bytes.chunks_exact(2).enumerate() {
                let code = TileCode::new([pair[0], pair[1]]);
                let x = col as f32 * tw;
                let y = row as f32 * th;
                let code = match code {
                    TileCode::PLAYER_SPAWN => {
                        if player.is_some() {
                            log::warn!("level {level}: extra player spawn at row {row}, col {col}");
                        }
                        player = Some(Vec2::new(x, y - th));
                        TileCode::EMPTY
                    }
                    TileCode::ENEMY_SPAWN => {
                        enemies.push(Vec2::new(x, y - th));
                        TileCode::EMPTY
                    }
                    TileCode::ITEM_SPAWN => {
                        items.push(Vec2::new(x, y));
                        TileCode::EMPTY
                    }
                    other => other,
                };
                codes.push(code);
            }
            rows.push(codes);
        }

        let map = TileMap::from_rows(rows, tile_width, tile_height)
            .map_err(|reason| malformed(0, reason))?;
        let player = player.ok_or_else(|| AssetLoadError::NoPlayerSpawn(level.to_owned()))?;

        log::info!(
            "Parsed level {}: {}x{} tiles, {} enemies, {} items",
            level,
            map.cols(),
            map.rows(),
            enemies.len(),
            items.len()
        );

        Ok(Self {
            map,
            player,
            enemies,
            items,
        })
    }
}
