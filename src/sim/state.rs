//! Game state and core simulation types
//!
//! Entities keep their authoritative world position. Screen positions are
//! derived from it and the camera offset every tick and never fed back.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::anim::{Animation, Clip, SpriteSet};
use super::camera::{Camera, CameraMode};
use super::collision::Rect;
use super::physics::PhysicsBody;
use super::tilemap::{LevelLayout, TileMap};
use crate::config::{Config, GameMode};
use crate::consts::PROJECTILE_SPEED;
use crate::{Point2D, angle_to_vector};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Score objective reached, waiting for the next level to be loaded
    LevelComplete,
    /// Player's death animation finished
    GameOver,
    /// Quit requested by the input service
    Quit,
}

/// Things that happened during a tick, for audio and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A projectile was thrown
    Thrown { id: u32 },
    /// A projectile hit an enemy
    EnemyHit { id: u32 },
    /// An enemy's death animation finished
    EnemyRemoved { id: u32 },
    /// The player picked up an item
    ItemCollected { id: u32 },
    /// The player tried to leave the world and was put back
    PlayerBlocked,
    /// The player touched an enemy
    PlayerKilled,
    /// The player's death animation finished
    PlayerRemoved,
    /// Score objective reached
    LevelComplete { score: u32 },
}

/// Clip table and pixel size of one kind of sprite
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub clips: SpriteSet,
    pub size: Vec2,
}

/// Sheets for every kind of entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheets {
    pub player: Sheet,
    pub mob: Sheet,
    pub item: Sheet,
    pub shot: Sheet,
}

/// Window and world dimensions, computed once at startup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    /// Window size in pixels
    pub window: Vec2,
    /// Integer half window, where the tracked entity is drawn
    pub half: Vec2,
    /// World bounds for top-down movement and projectiles
    pub world: Vec2,
}

impl View {
    pub fn from_config(config: &Config) -> Self {
        Self {
            window: config.window_size(),
            half: config.half_window(),
            world: config.world_size,
        }
    }
}

/// Position, size and animation shared by every entity
#[derive(Debug, Clone)]
pub struct Entity {
    /// World position of the top-left corner
    pub pos: Point2D,
    /// Position at the start of the tick, for reverting invalid moves
    pub prev_pos: Point2D,
    pub size: Vec2,
    /// `pos` plus camera offset, recomputed every tick
    pub screen_pos: Point2D,
    pub anim: Animation,
    /// Mirror horizontally when drawn
    pub flip_x: bool,
}

impl Entity {
    pub fn new(pos: Point2D, size: Vec2, anim: Animation) -> Self {
        Self {
            pos,
            prev_pos: pos,
            size,
            screen_pos: pos,
            anim,
            flip_x: false,
        }
    }

    /// World-space rectangle
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    #[inline]
    pub fn remember(&mut self) {
        self.prev_pos = self.pos;
    }

    #[inline]
    pub fn revert(&mut self) {
        self.pos = self.prev_pos;
    }

    #[inline]
    pub fn moved(&self) -> bool {
        self.pos != self.prev_pos
    }

    /// Show `clip`: restart it when it is new, otherwise step its loop
    pub fn animate(&mut self, clip: Clip, clips: &SpriteSet) {
        if self.anim.clip() == clip {
            self.anim.advance();
        } else {
            self.anim.play(clip, clips);
        }
    }

    pub fn refresh_screen(&mut self, camera: &Camera) {
        self.screen_pos = camera.apply(self.pos);
    }
}

/// What an entity needs to update itself for one tick
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    pub sheets: &'a Sheets,
    pub view: View,
}

/// Self-contained per-tick behaviour of a non-player entity
pub trait Updatable {
    /// Advance one tick. Returns `false` once the entity should be removed.
    fn advance(&mut self, ctx: &TickContext<'_>) -> bool;
}

/// The controllable player
#[derive(Debug, Clone)]
pub struct Player {
    pub entity: Entity,
    pub body: PhysicsBody,
    /// Within the arrival threshold of the steering target (top-down)
    pub arrived: bool,
}

impl Player {
    pub fn new(pos: Point2D, sheet: &Sheet) -> Self {
        Self {
            entity: Entity::new(pos, sheet.size, Animation::start(Clip::Idle, &sheet.clips)),
            body: PhysicsBody::default(),
            arrived: true,
        }
    }
}

/// A stationary enemy
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub entity: Entity,
    /// Playing its death animation
    pub dying: bool,
}

impl Enemy {
    /// Start the death animation
    pub fn kill(&mut self, clips: &SpriteSet) {
        self.dying = true;
        self.entity.anim.play(Clip::Dead, clips);
    }
}

impl Updatable for Enemy {
    fn advance(&mut self, ctx: &TickContext<'_>) -> bool {
        if self.dying {
            return !self.entity.anim.advance_once();
        }
        self.entity.animate(Clip::Idle, &ctx.sheets.mob.clips);
        true
    }
}

/// A collectible item
#[derive(Debug, Clone)]
pub struct Item {
    pub id: u32,
    pub entity: Entity,
}

impl Updatable for Item {
    fn advance(&mut self, _ctx: &TickContext<'_>) -> bool {
        self.entity.anim.advance();
        true
    }
}

/// A thrown projectile flying in a straight line
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: u32,
    pub entity: Entity,
    /// Flight direction (radians from +x, y down)
    pub angle: f32,
}

impl Projectile {
    #[inline]
    pub fn velocity(&self, speed: f32) -> Vec2 {
        angle_to_vector(self.angle) * speed
    }
}

impl Updatable for Projectile {
    /// Fly straight on; gone once outside the world
    fn advance(&mut self, ctx: &TickContext<'_>) -> bool {
        self.entity.animate(Clip::Shot, &ctx.sheets.shot.clips);
        self.entity.remember();
        self.entity.pos += self.velocity(PROJECTILE_SPEED);
        let (pos, world) = (self.entity.pos, ctx.view.world);
        pos.x > 0.0 && pos.x < world.x && pos.y > 0.0 && pos.y < world.y
    }
}

/// Complete simulation state for one level
#[derive(Debug, Clone)]
pub struct GameState {
    pub mode: GameMode,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub phase: GamePhase,
    pub score: u32,
    /// Score that completes the level, if the level has an objective
    pub score_needed: Option<u32>,
    pub player: Player,
    /// Enemies (sorted by id for determinism)
    pub enemies: Vec<Enemy>,
    /// Items (sorted by id for determinism)
    pub items: Vec<Item>,
    /// Projectiles (sorted by id for determinism)
    pub projectiles: Vec<Projectile>,
    /// Floor map, platformer only
    pub map: Option<TileMap>,
    pub camera: Camera,
    pub sheets: Sheets,
    pub view: View,
    /// Events of the latest tick, drained by the caller
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    fn empty(mode: GameMode, player: Player, sheets: Sheets, view: View, camera: CameraMode) -> Self {
        Self {
            mode,
            time_ticks: 0,
            phase: GamePhase::Playing,
            score: 0,
            score_needed: None,
            player,
            enemies: Vec::new(),
            items: Vec::new(),
            projectiles: Vec::new(),
            map: None,
            camera: Camera::new(camera),
            sheets,
            view,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// A platformer level from a parsed layout
    pub fn platformer(
        layout: LevelLayout,
        sheets: Sheets,
        view: View,
        camera: CameraMode,
        score_needed: Option<u32>,
    ) -> Self {
        let player = Player::new(layout.player, &sheets.player);
        let mut state = Self::empty(GameMode::Platformer, player, sheets, view, camera);
        state.score_needed = score_needed;
        for pos in layout.enemies {
            state.spawn_enemy(pos);
        }
        for pos in layout.items {
            state.spawn_item(pos);
        }
        state.map = Some(layout.map);
        state.refresh_screen();
        state
    }

    /// A top-down world with `enemy_count` enemies scattered from `seed`
    pub fn top_down(
        sheets: Sheets,
        view: View,
        camera: CameraMode,
        enemy_count: u32,
        seed: u64,
    ) -> Self {
        let player = Player::new(view.half, &sheets.player);
        let mut state = Self::empty(GameMode::TopDown, player, sheets, view, camera);

        let mut rng = Pcg32::seed_from_u64(seed);
        for _ in 0..enemy_count {
            let pos = Vec2::new(
                rng.random_range(0.0..=view.window.x),
                rng.random_range(0.0..=view.window.y),
            );
            state.spawn_enemy(pos.round());
        }
        state.refresh_screen();
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn spawn_enemy(&mut self, pos: Point2D) -> u32 {
        let id = self.next_entity_id();
        let sheet = &self.sheets.mob;
        self.enemies.push(Enemy {
            id,
            entity: Entity::new(pos, sheet.size, Animation::start(Clip::Idle, &sheet.clips)),
            dying: false,
        });
        id
    }

    pub fn spawn_item(&mut self, pos: Point2D) -> u32 {
        let id = self.next_entity_id();
        let sheet = &self.sheets.item;
        self.items.push(Item {
            id,
            entity: Entity::new(pos, sheet.size, Animation::start(Clip::Idle, &sheet.clips)),
        });
        id
    }

    pub fn spawn_projectile(&mut self, pos: Point2D, angle: f32) -> u32 {
        let id = self.next_entity_id();
        let sheet = &self.sheets.shot;
        self.projectiles.push(Projectile {
            id,
            entity: Entity::new(pos, sheet.size, Animation::start(Clip::Shot, &sheet.clips)),
            angle,
        });
        id
    }

    /// Keep the camera view inside `[0, world]`
    pub fn clamp_camera(&mut self, world: Vec2) {
        self.camera = std::mem::take(&mut self.camera).with_bounds(world);
        let tracked = self.player.entity.pos;
        self.camera.update(tracked, self.view.half);
        self.refresh_screen();
    }

    /// Derive every screen position from the current camera offset
    pub fn refresh_screen(&mut self) {
        let camera = &self.camera;
        self.player.entity.refresh_screen(camera);
        for e in &mut self.enemies {
            e.entity.refresh_screen(camera);
        }
        for i in &mut self.items {
            i.entity.refresh_screen(camera);
        }
        for p in &mut self.projectiles {
            p.entity.refresh_screen(camera);
        }
    }

    /// Restore id order after out-of-order inserts
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.items.sort_by_key(|i| i.id);
        self.projectiles.sort_by_key(|p| p.id);
    }

    /// Take the events of the latest tick
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}


#[cfg(test)]
mod tests {
    use super::testutils::*;
    use super::*;

    #[test]
    fn test_platformer_spawns_from_layout() {
        let text = "..........\n..--....14\n00........\n0101010101\n";
        let layout = LevelLayout::parse("1", text, 32, 32).unwrap();
        let state = GameState::platformer(layout, sheets(), view(), CameraMode::Fixed, Some(3));
        assert_eq!(state.player.entity.pos, Vec2::new(32.0, 0.0));
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.enemies[0].id, 1);
        assert_eq!(state.items[0].id, 2);
        assert_eq!(state.items[0].entity.size, Vec2::new(16.0, 16.0));
        assert_eq!(state.score_needed, Some(3));
        assert!(state.map.is_some());
    }

    #[test]
    fn test_top_down_scatter_is_seeded() {
        let a = GameState::top_down(sheets(), view(), CameraMode::Follow, 20, 7);
        let b = GameState::top_down(sheets(), view(), CameraMode::Follow, 20, 7);
        let c = GameState::top_down(sheets(), view(), CameraMode::Follow, 20, 8);
        let positions = |s: &GameState| s.enemies.iter().map(|e| e.entity.pos).collect::<Vec<_>>();
        assert_eq!(positions(&a), positions(&b));
        assert_ne!(positions(&a), positions(&c));
        for pos in positions(&a) {
            assert!(pos.x >= 0.0 && pos.x <= 320.0);
            assert!(pos.y >= 0.0 && pos.y <= 256.0);
        }
    }

    #[test]
    fn test_animate_restarts_new_clip() {
        let set = SpriteSet::new([(Clip::Idle, 4), (Clip::Walk, 6)]);
        let mut e = Entity::new(Vec2::ZERO, Vec2::ONE, Animation::start(Clip::Idle, &set));
        e.animate(Clip::Idle, &set);
        assert_eq!(e.anim.frame(), 2);
        e.animate(Clip::Walk, &set);
        assert_eq!((e.anim.clip(), e.anim.frame()), (Clip::Walk, 1));
    }

    #[test]
    fn test_dying_enemy_plays_out_then_leaves() {
        let sheets = sheets();
        let ctx = TickContext {
            sheets: &sheets,
            view: view(),
        };
        let mut state = GameState::top_down(sheets.clone(), view(), CameraMode::Follow, 1, 3);
        let enemy = &mut state.enemies[0];
        assert!(enemy.advance(&ctx));
        enemy.kill(&sheets.mob.clips);
        assert_eq!((enemy.entity.anim.clip(), enemy.entity.anim.frame()), (Clip::Dead, 1));
        assert!(enemy.advance(&ctx));
        assert!(enemy.advance(&ctx));
        assert!(!enemy.advance(&ctx));
    }

    #[test]
    fn test_projectile_leaves_world() {
        let sheets = sheets();
        let ctx = TickContext {
            sheets: &sheets,
            view: view(),
        };
        let mut state = GameState::top_down(sheets.clone(), view(), CameraMode::Follow, 0, 0);
        let id = state.spawn_projectile(Vec2::new(1905.0, 500.0), 0.0);
        assert_eq!(id, 1);
        let p = &mut state.projectiles[0];
        assert!(p.advance(&ctx));
        assert_eq!(p.entity.pos, Vec2::new(1915.0, 500.0));
        assert!(!p.advance(&ctx));
    }

    #[test]
    fn test_clamp_camera_stops_at_world_edge() {
        let mut state = GameState::top_down(sheets(), view(), CameraMode::Follow, 0, 0);
        state.player.entity.pos = Vec2::new(10.0, 10.0);
        state.clamp_camera(view().world);
        assert_eq!(state.camera.offset(), Vec2::ZERO);
        assert_eq!(state.player.entity.screen_pos, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn test_revert_restores_previous_position() {
        let mut e = Entity::new(Vec2::new(5.0, 5.0), Vec2::ONE, Animation::new(Clip::Idle, 1));
        e.remember();
        e.pos = Vec2::new(-3.0, 5.0);
        assert!(e.moved());
        e.revert();
        assert_eq!(e.pos, Vec2::new(5.0, 5.0));
    }
}
