//! Frame-stepped simulation tick
//!
//! One call advances the state by exactly one frame: input, movement,
//! collisions, animation, then the camera and screen positions.

use glam::Vec2;

use super::anim::Clip;
use super::physics::Intent;
use super::state::{GameEvent, GamePhase, GameState, TickContext, Updatable};
use super::steering::{mouse_target, steer};
use crate::angle_between;
use crate::config::GameMode;
use crate::consts::PLAYER_MAX_SPEED;

/// Input snapshot for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Mouse position in window space, `None` when the window lacks focus
    pub mouse: Option<Vec2>,
    /// Mouse button pressed this tick (top-down: throw)
    pub fire: bool,
    /// Walk left key held
    pub left: bool,
    /// Walk right key held
    pub right: bool,
    /// Jump key held
    pub jump: bool,
    /// Quit event received
    pub quit: bool,
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput) {
    if input.quit {
        state.phase = GamePhase::Quit;
        return;
    }
    if state.phase != GamePhase::Playing {
        return;
    }

    state.time_ticks += 1;

    match state.mode {
        GameMode::Platformer => tick_platformer(state, input),
        GameMode::TopDown => tick_top_down(state, input),
    }

    state.normalize_order();
    let tracked = state.player.entity.pos;
    state.camera.update(tracked, state.view.half);
    state.refresh_screen();
}

fn tick_platformer(state: &mut GameState, input: &TickInput) {
    if let Some(needed) = state.score_needed {
        if state.score >= needed {
            state.phase = GamePhase::LevelComplete;
            state.events.push(GameEvent::LevelComplete { score: state.score });
            return;
        }
    }

    let player = &mut state.player;
    if !player.body.is_dying() {
        player.body.intent = if input.left {
            Intent::Left
        } else if input.right {
            Intent::Right
        } else {
            Intent::Idle
        };
        if input.jump {
            player.body.request_jump();
        }
    }

    // Floor under the footprint before moving
    let mut rect = player.entity.rect();
    let floor_y = match &state.map {
        Some(map) => map.row_top(map.get_floor(rect.bottom_left(), rect.bottom_right())),
        None => state.view.window.y,
    };

    player.entity.remember();
    let step = player.body.advance(&mut rect, floor_y, state.view.window.x);
    player.entity.pos = rect.pos;

    // Pickups
    let player_rect = player.entity.rect();
    let mut collected = Vec::new();
    state.items.retain(|item| {
        let hit = item.entity.rect().collides(&player_rect);
        if hit {
            collected.push(item.id);
        }
        !hit
    });
    for id in collected {
        state.score += 1;
        state.events.push(GameEvent::ItemCollected { id });
    }

    // Enemy contact
    let mut killed = false;
    if !state.player.body.is_dying()
        && state
            .enemies
            .iter()
            .any(|e| !e.dying && e.entity.rect().collides(&player_rect))
    {
        state.player.body.kill();
        let clips = &state.sheets.player.clips;
        state.player.entity.anim.play(Clip::Dead, clips);
        state.events.push(GameEvent::PlayerKilled);
        killed = true;
    }

    animate_enemies(state);
    let ctx = TickContext {
        sheets: &state.sheets,
        view: state.view,
    };
    state.items.retain_mut(|item| item.advance(&ctx));

    // Player animation
    let clips = &state.sheets.player.clips;
    let player = &mut state.player;
    if player.body.is_dying() {
        // The first dead frame stays up on the tick of the kill
        if !killed && player.entity.anim.advance_once() {
            state.phase = GamePhase::GameOver;
            state.events.push(GameEvent::PlayerRemoved);
        }
    } else if player.body.is_airborne() && clips.has(Clip::Jump) {
        player.entity.animate(Clip::Jump, clips);
    } else if step.dx == 0.0 {
        player.entity.animate(Clip::Idle, clips);
    } else {
        player.entity.flip_x = step.dx < 0.0;
        player.entity.animate(Clip::Walk, clips);
    }
}

fn tick_top_down(state: &mut GameState, input: &TickInput) {
    let view = state.view;
    let player = &mut state.player;
    player.entity.remember();

    match input.mouse {
        Some(mouse) => {
            let target = mouse_target(mouse, view.half, player.entity.pos);
            let s = steer(player.entity.pos, target, PLAYER_MAX_SPEED);
            player.entity.pos = s.pos;
            player.arrived = s.arrived;
        }
        // No target: standing still
        None => player.arrived = true,
    }

    // World border: put the player back and show the dead frames
    let rect = player.entity.rect();
    let blocked = rect.left() <= 0.0
        || rect.right() >= view.world.x
        || rect.top() <= 0.0
        || rect.bottom() >= view.world.y;
    let clips = &state.sheets.player.clips;
    if blocked {
        player.entity.revert();
        player.entity.animate(Clip::Dead, clips);
        state.events.push(GameEvent::PlayerBlocked);
    } else if player.arrived {
        player.entity.animate(Clip::Idle, clips);
    } else {
        player.entity.animate(Clip::Walk, clips);
    }

    if input.fire {
        if let Some(mouse) = input.mouse {
            let origin = state.player.entity.pos;
            let angle = angle_between(view.half, mouse);
            let id = state.spawn_projectile(origin, angle);
            state.events.push(GameEvent::Thrown { id });
        }
    }

    // Projectiles fly on until they leave the world
    let ctx = TickContext {
        sheets: &state.sheets,
        view,
    };
    state.projectiles.retain_mut(|p| p.advance(&ctx));

    animate_enemies(state);

    // Projectile/enemy hits, one enemy per projectile
    let enemies = &state.enemies;
    let mut hits: Vec<u32> = Vec::new();
    state.projectiles.retain(|p| {
        let rect = p.entity.rect();
        let target = enemies
            .iter()
            .find(|e| !e.dying && !hits.contains(&e.id) && e.entity.rect().collides(&rect))
            .map(|e| e.id);
        match target {
            Some(id) => {
                hits.push(id);
                false
            }
            None => true,
        }
    });
    let mob_clips = &state.sheets.mob.clips;
    for enemy_id in hits {
        if let Some(enemy) = state.enemies.iter_mut().find(|e| e.id == enemy_id) {
            enemy.kill(mob_clips);
        }
        state.score += 1;
        state.events.push(GameEvent::EnemyHit { id: enemy_id });
    }
}

/// Loop idle enemies; play dying ones out and remove them
fn animate_enemies(state: &mut GameState) {
    let ctx = TickContext {
        sheets: &state.sheets,
        view: state.view,
    };
    let mut removed = Vec::new();
    state.enemies.retain_mut(|enemy| {
        let keep = enemy.advance(&ctx);
        if !keep {
            removed.push(enemy.id);
        }
        keep
    });
    for id in removed {
        state.events.push(GameEvent::EnemyRemoved { id });
    }
}
