//! Draw list for the external render service
//!
//! Each tick produces a flat list of sprite instances in painter's order:
//! background (with baked tiles), player, items, enemies, projectiles. The
//! list is `Pod`, so a GPU backend can upload it as an instance buffer
//! without conversion.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::assets::{FrameArena, SetKind, Slot};
use crate::sim::{Enemy, Entity, GameState, Item, Player, Projectile};

/// Mirror horizontally
pub const FLAG_FLIP_X: u32 = 1;

/// One textured quad in screen space
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Top-left corner in screen pixels
    pub position: [f32; 2],
    pub size: [f32; 2],
    /// Radians around the quad center
    pub rotation: f32,
    /// Image slot in the frame arena
    pub slot: u32,
    pub flags: u32,
}

impl SpriteInstance {
    pub fn new(position: Vec2, size: Vec2, slot: Slot) -> Self {
        Self {
            position: position.to_array(),
            size: size.to_array(),
            rotation: 0.0,
            slot,
            flags: 0,
        }
    }

    #[inline]
    pub fn flipped(&self) -> bool {
        self.flags & FLAG_FLIP_X != 0
    }
}

/// Identity of a drawn entity across ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawKey {
    Player,
    Enemy(u32),
    Item(u32),
    Projectile(u32),
}

/// Something with an animated sprite
pub trait Drawable {
    fn key(&self) -> DrawKey;
    fn set(&self) -> SetKind;
    fn entity(&self) -> &Entity;

    fn rotation(&self) -> f32 {
        0.0
    }
}

impl Drawable for Player {
    fn key(&self) -> DrawKey {
        DrawKey::Player
    }
    fn set(&self) -> SetKind {
        SetKind::Player
    }
    fn entity(&self) -> &Entity {
        &self.entity
    }
}

impl Drawable for Enemy {
    fn key(&self) -> DrawKey {
        DrawKey::Enemy(self.id)
    }
    fn set(&self) -> SetKind {
        SetKind::Mob
    }
    fn entity(&self) -> &Entity {
        &self.entity
    }
}

impl Drawable for Item {
    fn key(&self) -> DrawKey {
        DrawKey::Item(self.id)
    }
    fn set(&self) -> SetKind {
        SetKind::Item
    }
    fn entity(&self) -> &Entity {
        &self.entity
    }
}

impl Drawable for Projectile {
    fn key(&self) -> DrawKey {
        DrawKey::Projectile(self.id)
    }
    fn set(&self) -> SetKind {
        SetKind::Shot
    }
    fn entity(&self) -> &Entity {
        &self.entity
    }
    fn rotation(&self) -> f32 {
        self.angle
    }
}

/// Per-tick sprite list plus the last slot each entity resolved to
#[derive(Debug, Default)]
pub struct DrawList {
    sprites: Vec<SpriteInstance>,
    held: HashMap<DrawKey, Slot>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget held frames, e.g. when a new level reuses entity ids
    pub fn reset(&mut self) {
        self.sprites.clear();
        self.held.clear();
    }

    pub fn sprites(&self) -> &[SpriteInstance] {
        &self.sprites
    }

    /// Raw instance buffer
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.sprites)
    }

    /// Rebuild the list from the current state
    pub fn build(&mut self, state: &GameState, arena: &FrameArena) -> &[SpriteInstance] {
        self.sprites.clear();
        let previous = std::mem::take(&mut self.held);
        let offset = state.camera.offset();

        if let Some(slot) = arena.background() {
            let size = arena.image(slot).map_or(state.view.window, |i| i.size.as_vec2());
            self.sprites.push(SpriteInstance::new(offset, size, slot));
        }
        if let Some(map) = &state.map {
            let tile_size = map.tile_size();
            for (pos, code) in map.solid_tiles() {
                if let Some(slot) = arena.tile(code) {
                    self.sprites
                        .push(SpriteInstance::new(pos + offset, tile_size, slot));
                }
            }
        }

        self.push(&state.player, arena, &previous);
        for item in &state.items {
            self.push(item, arena, &previous);
        }
        for enemy in &state.enemies {
            self.push(enemy, arena, &previous);
        }
        for projectile in &state.projectiles {
            self.push(projectile, arena, &previous);
        }

        &self.sprites
    }

    fn push<D: Drawable>(&mut self, drawable: &D, arena: &FrameArena, previous: &HashMap<DrawKey, Slot>) {
        let entity = drawable.entity();
        let key = drawable.key();
        let anim = &entity.anim;

        let slot = match arena.frame(drawable.set(), anim.clip(), anim.frame()) {
            Some(slot) => slot,
            None => match previous.get(&key) {
                Some(&held) => {
                    log::trace!("{:?}: no {:?} frame {}, holding", key, anim.clip(), anim.frame());
                    held
                }
                // Nothing valid shown yet
                None => return,
            },
        };
        self.held.insert(key, slot);

        let mut sprite = SpriteInstance::new(entity.screen_pos, entity.size, slot);
        sprite.rotation = drawable.rotation();
        if entity.flip_x {
            sprite.flags |= FLAG_FLIP_X;
        }
        self.sprites.push(sprite);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::testutils::{assets, config};
    use crate::assets::{MemoryAssets, load_layout};
    use crate::sim::state::testutils::view;
    use crate::sim::{Animation, Camera, CameraMode, Clip, GameState};

    fn setup(assets: &MemoryAssets) -> (GameState, FrameArena) {
        let config = config();
        let mut arena = FrameArena::new();
        let sheets = arena.load_sheets(assets, &config).unwrap();
        let layout = load_layout(assets, &config, "2").unwrap();
        arena
            .load_map_images(assets, &config.map_images, Some(&layout.map))
            .unwrap();
        let state = GameState::platformer(layout, sheets, view(), CameraMode::Fixed, None);
        (state, arena)
    }

    #[test]
    fn test_draw_order() {
        let (mut state, arena) = setup(&assets());
        state.spawn_item(Vec2::new(200.0, 32.0));
        state.spawn_projectile(Vec2::new(10.0, 10.0), 1.0);
        state.refresh_screen();

        let mut list = DrawList::new();
        let sprites = list.build(&state, &arena).to_vec();
        // background + 5 tiles + player + item + enemy + projectile
        assert_eq!(sprites.len(), 1 + 5 + 4);
        assert_eq!(Some(sprites[0].slot), arena.background());
        let slot = |set, clip| arena.frame(set, clip, 1);
        assert_eq!(Some(sprites[6].slot), slot(SetKind::Player, Clip::Idle));
        assert_eq!(Some(sprites[7].slot), slot(SetKind::Item, Clip::Idle));
        assert_eq!(Some(sprites[8].slot), slot(SetKind::Mob, Clip::Idle));
        assert_eq!(Some(sprites[9].slot), slot(SetKind::Shot, Clip::Shot));
        assert_eq!(sprites[9].rotation, 1.0);
        assert_eq!(list.as_bytes().len(), sprites.len() * std::mem::size_of::<SpriteInstance>());
    }

    #[test]
    fn test_camera_offset_moves_world_sprites() {
        let (mut state, arena) = setup(&assets());
        state.camera = Camera::new(CameraMode::Follow);
        state.camera.update(Vec2::new(400.0, 128.0), state.view.half);
        state.refresh_screen();

        let mut list = DrawList::new();
        let sprites = list.build(&state, &arena);
        assert_eq!(sprites[0].position, [-240.0, 0.0]);
        // First tile: row 3, col 0
        assert_eq!(sprites[1].position, [-240.0, 96.0]);
    }

    #[test]
    fn test_flip_flag() {
        let (mut state, arena) = setup(&assets());
        state.player.entity.flip_x = true;
        let mut list = DrawList::new();
        let sprites = list.build(&state, &arena);
        assert!(sprites[6].flipped());
        assert!(!sprites[7].flipped());
    }

    #[test]
    fn test_missing_frame_holds_previous() {
        let assets = assets().with_text(
            "res/player/info.json",
            r#"{"idle": {"count": 4}, "walk": {"count": 7}}"#,
        );
        let (mut state, arena) = setup(&assets);
        let mut anim = Animation::new(Clip::Walk, 7);
        for _ in 0..5 {
            anim.advance();
        }
        state.player.entity.anim = anim;

        let mut list = DrawList::new();
        let sixth = list.build(&state, &arena)[6].slot;
        assert_eq!(Some(sixth), arena.frame(SetKind::Player, Clip::Walk, 6));

        state.player.entity.anim.advance();
        assert_eq!(state.player.entity.anim.frame(), 7);
        let held = list.build(&state, &arena)[6].slot;
        assert_eq!(held, sixth);
    }
}
