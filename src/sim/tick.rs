//! Fixed timestep simulation tick
//!
//! One call advances a session by one step. The order of the stages is fixed:
//! time, timers, input, spawning, physics, collisions, outcomes, purge. Level
//! completion and the Time-Attack clock are judged after the purge.

use glam::Vec2;

use super::collision::colliding_in_priority_order;
use super::powerup::{SCORE_MULTIPLIER_DURATION_MS, SCORE_MULTIPLIER_FACTOR};
use super::scoring::catch_points;
use super::shape::{ShapeKind, ShapeType, SpecialShape};
use super::state::{GameEvent, GameState, GameStatus};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Left movement key currently held
    pub move_left: bool,
    /// Right movement key currently held
    pub move_right: bool,
    /// One-off left step (tap/swipe)
    pub step_left: bool,
    /// One-off right step (tap/swipe)
    pub step_right: bool,
    pub change_shape: bool,
    pub change_color: bool,
    /// Pause toggle
    pub pause: bool,
    /// Demo mode - the catcher steers itself
    pub autopilot: bool,
}

/// Advance the game state by one fixed timestep. Returns what happened, in order.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if input.pause {
        state.toggle_pause();
    }

    match state.status {
        GameStatus::Playing => {}
        GameStatus::LevelTransition => {
            state.transition_timer -= f64::from(dt) * 1000.0;
            if state.transition_timer <= 0.0 {
                events.extend(state.advance_level());
            }
            return events;
        }
        GameStatus::Menu | GameStatus::Paused | GameStatus::GameOver => return events,
    }

    let dt_ms = f64::from(dt) * 1000.0;

    // 1. Time counters
    state.time_ticks += 1;
    state.game_time += dt_ms;
    state.level_time += dt_ms;
    state.spawn_timer += dt_ms;
    if let Some(remaining) = state.time_remaining.as_mut() {
        *remaining -= dt_ms;
    }

    // 2. Decay timers
    state.combo.update(dt);
    state.catcher.update(dt);
    if state.powerups.update(dt) {
        events.push(GameEvent::PowerUpExpired);
    }

    // 3. Continuous input
    if input.autopilot {
        let mut steered = input.clone();
        steer_autopilot(state, &mut steered);
        apply_input(state, &steered);
    } else {
        apply_input(state, input);
    }

    // 4. Spawning
    if state.spawn_timer >= state.levels.current_config().spawn_interval {
        state.spawn_timer = 0.0;
        state.spawn_shape();
    }

    // 5. Physics
    state.physics.update_shapes(&mut state.shapes, dt);

    // 6-7. Collisions and their outcomes
    let consumed = resolve_collisions(state, &mut events);

    // 8. Purge consumed and off-screen shapes
    state.shapes.retain(|shape| !consumed.contains(&shape.id));
    state.physics.retain_on_screen(&mut state.shapes);

    if state.status == GameStatus::Playing {
        if state.is_time_up() {
            events.extend(state.end_game());
        } else if state.config.mode.has_level_progression()
            && state.levels.check_level_complete(state.level_stats.catches)
        {
            events.extend(state.complete_level());
        }
    }

    events
}

fn apply_input(state: &mut GameState, input: &TickInput) {
    let catcher = &mut state.catcher;
    if input.move_left || input.step_left {
        catcher.move_left();
    }
    if input.move_right || input.step_right {
        catcher.move_right();
    }
    if input.change_shape {
        catcher.cycle_shape();
    }
    if input.change_color {
        catcher.cycle_color();
    }
}

/// Resolve every shape touching the catcher, highest priority first.
/// Returns the ids of the shapes consumed.
fn resolve_collisions(state: &mut GameState, events: &mut Vec<GameEvent>) -> Vec<u32> {
    let hits = colliding_in_priority_order(&state.shapes, &state.catcher);
    let mut consumed = Vec::with_capacity(hits.len());

    for (index, result) in hits {
        // Nothing resolves after the session has ended
        if state.status == GameStatus::GameOver {
            break;
        }
        let shape = &state.shapes[index];
        let (id, kind, pos) = (shape.id, shape.kind, shape.pos);
        consumed.push(id);

        if kind.is_bomb() {
            on_bomb(state, id, pos, events);
        } else if result.is_match {
            on_catch(state, id, kind, events);
        } else {
            on_miss(state, id, kind, events);
        }
    }

    consumed
}

fn on_catch(state: &mut GameState, id: u32, kind: ShapeKind, events: &mut Vec<GameEvent>) {
    // Points use the streak multiplier earned before this catch
    let points = catch_points(
        &kind,
        state.combo.multiplier(),
        state.powerups.score_multiplier() * state.config.mode.score_multiplier(),
    );
    state.score = state.score.saturating_add(points);
    let tier = state.combo.increment().copied();

    state.level_stats.catches += 1;
    state.level_stats.max_combo = state.level_stats.max_combo.max(state.combo.count());

    events.push(GameEvent::Caught {
        id,
        kind,
        points,
        combo: state.combo.count(),
    });
    if let Some(tier) = tier {
        events.push(GameEvent::ComboTierReached(tier));
    }

    match kind {
        ShapeKind::Special(SpecialShape::TimeBonus) => {
            if let Some(remaining) = state.time_remaining.as_mut() {
                *remaining += TIME_BONUS_MS;
                events.push(GameEvent::TimeExtended { ms: TIME_BONUS_MS });
            }
        }
        ShapeKind::Special(SpecialShape::Multiplier) => {
            state
                .powerups
                .activate_score_multiplier(SCORE_MULTIPLIER_FACTOR, SCORE_MULTIPLIER_DURATION_MS);
            events.push(GameEvent::PowerUpActivated {
                multiplier: SCORE_MULTIPLIER_FACTOR,
                duration_ms: SCORE_MULTIPLIER_DURATION_MS,
            });
        }
        _ => {}
    }
}

fn on_miss(state: &mut GameState, id: u32, kind: ShapeKind, events: &mut Vec<GameEvent>) {
    state.level_stats.misses += 1;
    events.push(GameEvent::Missed { id, kind });
    state.combo.reset();
    events.extend(state.lose_life());
}

/// Bombs "match" every catcher but always take the penalty path
fn on_bomb(state: &mut GameState, id: u32, pos: Vec2, events: &mut Vec<GameEvent>) {
    state.level_stats.bombs += 1;

    let penalty = BOMB_PENALTY.min(state.score);
    state.score -= penalty;
    state.combo.reset();
    state.catcher.stun(BOMB_STUN_SECS);
    state
        .physics
        .apply_explosion(&mut state.shapes, pos, BOMB_BLAST_RADIUS, BOMB_BLAST_FORCE);

    events.push(GameEvent::BombHit { id, penalty });
    events.extend(state.lose_life());
}

/// Chase the lowest catchable shape and dial in its shape/color
fn steer_autopilot(state: &GameState, input: &mut TickInput) {
    let catcher = &state.catcher;
    let target = state
        .shapes
        .iter()
        .filter(|shape| !shape.kind.is_bomb() && shape.pos.y < catcher.pos.y)
        .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y));

    let Some(target) = target else {
        return;
    };

    let dx = target.pos.x - catcher.pos.x;
    input.move_left = dx < -CATCHER_SPEED / 2.0;
    input.move_right = dx > CATCHER_SPEED / 2.0;

    let (want_shape, want_color) = match target.kind {
        ShapeKind::Regular { shape, color } => (Some(shape), Some(color)),
        ShapeKind::Special(SpecialShape::Diamond { color }) => (None, Some(color)),
        ShapeKind::Special(SpecialShape::Rainbow { shape }) => (Some(shape), None),
        ShapeKind::Special(SpecialShape::GoldenStar { color }) => (Some(ShapeType::Star), Some(color)),
        ShapeKind::Special(_) => (None, None),
    };

    // Only cycle toward options the palette can actually reach
    input.change_shape = want_shape.is_some_and(|shape| {
        shape != catcher.current_shape && catcher.available_shapes().contains(&shape)
    });
    input.change_color = want_color.is_some_and(|color| {
        color != catcher.current_color && catcher.available_colors().contains(&color)
    });
}
