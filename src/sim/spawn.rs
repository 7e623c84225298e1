//! Shape spawning
//!
//! All randomness comes from the session's seeded `Pcg32`, so a seed plus an input
//! sequence always reproduces the same stream of shapes.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::level::LevelConfig;
use super::shape::{Shape, ShapeKind, SpecialShape};
use crate::consts::{CANVAS_WIDTH, SHAPE_SIZE, SHAPE_SPAWN_MARGIN};

/// Specials other than the bomb, drawn uniformly once the special roll succeeds
const SPECIAL_POOL: usize = 5;

fn pick<T: Copy>(rng: &mut Pcg32, items: &[T]) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    Some(items[rng.random_range(0..items.len())])
}

/// Weighted choice between bomb, special and regular for one spawn.
///
/// A single roll in [0, 1): below `bomb_chance` is a bomb, below
/// `bomb_chance + special_shape_chance` is one of the other five specials,
/// anything else is a regular shape from the level palette.
pub fn choose_kind(rng: &mut Pcg32, config: &LevelConfig) -> ShapeKind {
    let shapes = config.shape_palette();
    let colors = config.color_palette();
    let roll: f64 = rng.random();

    if roll < config.bomb_chance {
        return ShapeKind::Special(SpecialShape::Bomb);
    }

    if roll < config.bomb_chance + config.special_shape_chance {
        let special = match rng.random_range(0..SPECIAL_POOL) {
            0 => pick(rng, colors).map(|color| SpecialShape::Diamond { color }),
            1 => pick(rng, shapes).map(|shape| SpecialShape::Rainbow { shape }),
            2 => pick(rng, colors).map(|color| SpecialShape::GoldenStar { color }),
            3 => Some(SpecialShape::TimeBonus),
            _ => Some(SpecialShape::Multiplier),
        };
        if let Some(special) = special {
            return ShapeKind::Special(special);
        }
    }

    match (pick(rng, shapes), pick(rng, colors)) {
        (Some(shape), Some(color)) => ShapeKind::Regular { shape, color },
        // Palettes are never empty after sanitising; fall back to a safe pickup
        _ => ShapeKind::Special(SpecialShape::TimeBonus),
    }
}

/// Random x inside the spawn margins
pub fn spawn_x(rng: &mut Pcg32) -> f32 {
    let min_x = SHAPE_SPAWN_MARGIN + SHAPE_SIZE / 2.0;
    let max_x = CANVAS_WIDTH - SHAPE_SPAWN_MARGIN - SHAPE_SIZE / 2.0;
    rng.random_range(min_x..max_x)
}

/// Build a new shape just above the playfield, falling at the level's speed
pub fn spawn_shape(rng: &mut Pcg32, id: u32, config: &LevelConfig) -> Shape {
    let kind = choose_kind(rng, config);
    let x = spawn_x(rng);
    let mut shape = Shape::new(id, kind, Vec2::new(x, -SHAPE_SIZE));
    shape.set_fall_speed(config.fall_speed);
    log::debug!("Spawned shape {} {:?} at x={:.1}", id, kind, x);
    shape
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::LevelTable;
    use crate::sim::shape::{ShapeColor, ShapeType};
    use rand::SeedableRng;

    #[test]
    fn test_level_one_spawns_only_regular_palette_shapes() {
        let config = LevelTable::authored().config_for(1);
        let mut rng = Pcg32::seed_from_u64(7);
        for id in 0..500 {
            let shape = spawn_shape(&mut rng, id, &config);
            match shape.kind {
                ShapeKind::Regular { shape, color } => {
                    assert!(matches!(shape, ShapeType::Square | ShapeType::Triangle));
                    assert!(matches!(color, ShapeColor::Red | ShapeColor::Blue));
                }
                ShapeKind::Special(_) => panic!("level 1 has no specials"),
            }
            assert_eq!(shape.vel.y, 1.5);
            assert_eq!(shape.pos.y, -SHAPE_SIZE);
            assert!(shape.pos.x >= SHAPE_SPAWN_MARGIN + SHAPE_SIZE / 2.0);
            assert!(shape.pos.x <= CANVAS_WIDTH - SHAPE_SPAWN_MARGIN - SHAPE_SIZE / 2.0);
        }
    }

    #[test]
    fn test_all_bombs_when_bomb_chance_is_one() {
        let mut config = LevelTable::authored().config_for(5);
        config.bomb_chance = 1.0;
        config.special_shape_chance = 0.0;
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..50 {
            assert!(choose_kind(&mut rng, &config).is_bomb());
        }
    }

    #[test]
    fn test_special_frequencies_roughly_follow_config() {
        let config = LevelTable::authored().config_for(20);
        let mut rng = Pcg32::seed_from_u64(42);
        let n = 20_000;
        let (mut bombs, mut specials) = (0, 0);
        for _ in 0..n {
            let kind = choose_kind(&mut rng, &config);
            if kind.is_bomb() {
                bombs += 1;
            } else if kind.is_special() {
                specials += 1;
            }
        }
        let bomb_rate = bombs as f64 / n as f64;
        let special_rate = specials as f64 / n as f64;
        assert!((bomb_rate - 0.25).abs() < 0.02, "bomb rate {bomb_rate}");
        assert!((special_rate - 0.5).abs() < 0.02, "special rate {special_rate}");
    }

    #[test]
    fn test_special_payloads_respect_palette() {
        let mut config = LevelTable::authored().config_for(3);
        config.special_shape_chance = 1.0;
        let colors = config.color_palette();
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..500 {
            match choose_kind(&mut rng, &config) {
                ShapeKind::Special(SpecialShape::Diamond { color })
                | ShapeKind::Special(SpecialShape::GoldenStar { color }) => {
                    assert!(colors.contains(&color));
                }
                ShapeKind::Special(_) => {}
                ShapeKind::Regular { .. } => panic!("special chance is 1.0"),
            }
        }
    }

    #[test]
    fn test_same_seed_same_stream() {
        let config = LevelTable::authored().config_for(12);
        let mut a = Pcg32::seed_from_u64(99);
        let mut b = Pcg32::seed_from_u64(99);
        for id in 0..100 {
            let sa = spawn_shape(&mut a, id, &config);
            let sb = spawn_shape(&mut b, id, &config);
            assert_eq!(sa.kind, sb.kind);
            assert_eq!(sa.pos, sb.pos);
        }
    }
}
