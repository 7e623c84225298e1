//! Collision detection and match resolution
//!
//! Two stages: a forgiving AABB overlap test, then a rule oracle that decides
//! whether the overlapping shape counts as a match for the catcher's current
//! shape/color selection.

use super::catcher::Catcher;
use super::shape::{Shape, ShapeKind, ShapeType, SpecialShape};
use crate::consts::COLLISION_BUFFER;

/// Result of a collision check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionResult {
    /// Whether the shape physically touched the catcher
    pub has_collision: bool,
    /// Whether the contact satisfies the shape's matching rule.
    /// Always false without a collision. True for bombs, which callers must
    /// route to the penalty path.
    pub is_match: bool,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            has_collision: false,
            is_match: false,
        }
    }
}

/// Check one shape against the catcher
pub fn check_collision(shape: &Shape, catcher: &Catcher) -> CollisionResult {
    let hit = shape
        .bounds()
        .overlaps(&catcher.bounds().expanded(COLLISION_BUFFER));

    if !hit {
        return CollisionResult::miss();
    }

    CollisionResult {
        has_collision: true,
        is_match: is_match(&shape.kind, catcher),
    }
}

/// Matching rule for a shape kind against the catcher's selection
pub fn is_match(kind: &ShapeKind, catcher: &Catcher) -> bool {
    match *kind {
        ShapeKind::Regular { shape, color } => {
            shape == catcher.current_shape && color == catcher.current_color
        }
        ShapeKind::Special(SpecialShape::Diamond { color }) => color == catcher.current_color,
        ShapeKind::Special(SpecialShape::Rainbow { shape }) => shape == catcher.current_shape,
        ShapeKind::Special(SpecialShape::GoldenStar { color }) => {
            color == catcher.current_color && catcher.current_shape == ShapeType::Star
        }
        ShapeKind::Special(SpecialShape::Bomb)
        | ShapeKind::Special(SpecialShape::TimeBonus)
        | ShapeKind::Special(SpecialShape::Multiplier) => true,
    }
}

/// Shape-type score multiplier. Negative for bombs.
pub fn score_multiplier(kind: &ShapeKind) -> f64 {
    match kind {
        ShapeKind::Regular { .. } => 1.0,
        ShapeKind::Special(special) => match special {
            SpecialShape::Diamond { .. } => 2.0,
            SpecialShape::Rainbow { .. } => 1.5,
            SpecialShape::GoldenStar { .. } => 3.0,
            SpecialShape::Bomb => -1.0,
            // Flat bonus points instead
            SpecialShape::TimeBonus | SpecialShape::Multiplier => 1.0,
        },
    }
}

/// Resolution order when several shapes touch the catcher in one tick (higher first)
pub fn collision_priority(kind: &ShapeKind) -> u8 {
    match kind {
        ShapeKind::Regular { .. } => 1,
        ShapeKind::Special(special) => match special {
            SpecialShape::Bomb => 10,
            SpecialShape::GoldenStar { .. } => 8,
            SpecialShape::TimeBonus | SpecialShape::Multiplier => 6,
            SpecialShape::Diamond { .. } | SpecialShape::Rainbow { .. } => 4,
        },
    }
}

/// Indices of shapes touching the catcher, in resolution order: priority
/// descending, then entity id ascending.
pub fn colliding_in_priority_order(shapes: &[Shape], catcher: &Catcher) -> Vec<(usize, CollisionResult)> {
    let mut hits: Vec<(usize, CollisionResult)> = shapes
        .iter()
        .enumerate()
        .filter_map(|(i, shape)| {
            let result = check_collision(shape, catcher);
            result.has_collision.then_some((i, result))
        })
        .collect();

    hits.sort_by(|(a, _), (b, _)| {
        collision_priority(&shapes[*b].kind)
            .cmp(&collision_priority(&shapes[*a].kind))
            .then(shapes[*a].id.cmp(&shapes[*b].id))
    });
    hits
}

/// Center-to-center distance
pub fn effective_distance(shape: &Shape, catcher: &Catcher) -> f32 {
    shape.pos.distance(catcher.pos)
}

/// Within `threshold` pixels of the catcher center
pub fn is_near_collision(shape: &Shape, catcher: &Catcher, threshold: f32) -> bool {
    effective_distance(shape, catcher) <= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::shape::ShapeColor;
    use glam::Vec2;

    fn catcher_with(shape: ShapeType, color: ShapeColor) -> Catcher {
        let mut catcher = Catcher::default();
        catcher.set_shape(shape);
        catcher.set_color(color);
        catcher
    }

    fn shape_at_catcher(id: u32, kind: ShapeKind, catcher: &Catcher) -> Shape {
        Shape::new(id, kind, catcher.pos)
    }

    #[test]
    fn test_regular_truth_table() {
        for &shape_type in &ShapeType::ALL {
            for &color in &ShapeColor::ALL {
                for &catcher_shape in &ShapeType::ALL {
                    for &catcher_color in &ShapeColor::ALL {
                        let catcher = catcher_with(catcher_shape, catcher_color);
                        let kind = ShapeKind::Regular {
                            shape: shape_type,
                            color,
                        };
                        let result = check_collision(&shape_at_catcher(1, kind, &catcher), &catcher);
                        assert!(result.has_collision);
                        assert_eq!(
                            result.is_match,
                            shape_type == catcher_shape && color == catcher_color
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_special_rules() {
        for &catcher_shape in &ShapeType::ALL {
            for &catcher_color in &ShapeColor::ALL {
                let catcher = catcher_with(catcher_shape, catcher_color);
                for &color in &ShapeColor::ALL {
                    let diamond = ShapeKind::Special(SpecialShape::Diamond { color });
                    assert_eq!(is_match(&diamond, &catcher), color == catcher_color);

                    let star = ShapeKind::Special(SpecialShape::GoldenStar { color });
                    assert_eq!(
                        is_match(&star, &catcher),
                        color == catcher_color && catcher_shape == ShapeType::Star
                    );
                }
                for &shape in &ShapeType::ALL {
                    let rainbow = ShapeKind::Special(SpecialShape::Rainbow { shape });
                    assert_eq!(is_match(&rainbow, &catcher), shape == catcher_shape);
                }
                for special in [SpecialShape::Bomb, SpecialShape::TimeBonus, SpecialShape::Multiplier] {
                    assert!(is_match(&ShapeKind::Special(special), &catcher));
                }
            }
        }
    }

    #[test]
    fn test_diamond_ignores_shape() {
        let catcher = catcher_with(ShapeType::Circle, ShapeColor::Blue);
        let diamond = ShapeKind::Special(SpecialShape::Diamond {
            color: ShapeColor::Blue,
        });
        assert!(is_match(&diamond, &catcher));
    }

    #[test]
    fn test_golden_star_needs_star_catcher() {
        let catcher = catcher_with(ShapeType::Square, ShapeColor::Yellow);
        let star = ShapeKind::Special(SpecialShape::GoldenStar {
            color: ShapeColor::Yellow,
        });
        assert!(!is_match(&star, &catcher));
    }

    #[test]
    fn test_no_collision_never_matches() {
        let catcher = Catcher::default();
        let far = Shape::new(1, ShapeKind::Special(SpecialShape::Bomb), Vec2::new(10.0, 10.0));
        assert_eq!(check_collision(&far, &catcher), CollisionResult::miss());
    }

    #[test]
    fn test_buffer_extends_hitbox() {
        let catcher = Catcher::default();
        // Shape bottom edge sits 4px above the catcher's top edge
        let y = catcher.bounds().top - 4.0 - 20.0;
        let shape = Shape::new(1, ShapeKind::Special(SpecialShape::TimeBonus), Vec2::new(catcher.pos.x, y));
        assert!(check_collision(&shape, &catcher).has_collision);

        let shape = Shape::new(2, ShapeKind::Special(SpecialShape::TimeBonus), Vec2::new(catcher.pos.x, y - 2.0));
        assert!(!check_collision(&shape, &catcher).has_collision);
    }

    #[test]
    fn test_multipliers() {
        let regular = ShapeKind::Regular {
            shape: ShapeType::Square,
            color: ShapeColor::Red,
        };
        assert_eq!(score_multiplier(&regular), 1.0);
        assert_eq!(
            score_multiplier(&ShapeKind::Special(SpecialShape::Diamond { color: ShapeColor::Red })),
            2.0
        );
        assert_eq!(
            score_multiplier(&ShapeKind::Special(SpecialShape::Rainbow { shape: ShapeType::Star })),
            1.5
        );
        assert_eq!(
            score_multiplier(&ShapeKind::Special(SpecialShape::GoldenStar { color: ShapeColor::Red })),
            3.0
        );
        assert_eq!(score_multiplier(&ShapeKind::Special(SpecialShape::Bomb)), -1.0);
        assert_eq!(score_multiplier(&ShapeKind::Special(SpecialShape::TimeBonus)), 1.0);
    }

    #[test]
    fn test_priority_order() {
        let catcher = catcher_with(ShapeType::Square, ShapeColor::Red);
        let shapes = vec![
            shape_at_catcher(
                1,
                ShapeKind::Regular {
                    shape: ShapeType::Square,
                    color: ShapeColor::Red,
                },
                &catcher,
            ),
            shape_at_catcher(2, ShapeKind::Special(SpecialShape::Diamond { color: ShapeColor::Red }), &catcher),
            shape_at_catcher(3, ShapeKind::Special(SpecialShape::Multiplier), &catcher),
            shape_at_catcher(4, ShapeKind::Special(SpecialShape::GoldenStar { color: ShapeColor::Red }), &catcher),
            shape_at_catcher(5, ShapeKind::Special(SpecialShape::Bomb), &catcher),
            shape_at_catcher(6, ShapeKind::Special(SpecialShape::TimeBonus), &catcher),
            Shape::new(7, ShapeKind::Special(SpecialShape::Bomb), Vec2::new(10.0, 10.0)),
        ];

        let order: Vec<u32> = colliding_in_priority_order(&shapes, &catcher)
            .into_iter()
            .map(|(i, _)| shapes[i].id)
            .collect();
        assert_eq!(order, vec![5, 4, 3, 6, 2, 1]);
    }

    #[test]
    fn test_near_collision() {
        let catcher = Catcher::default();
        let shape = Shape::new(1, ShapeKind::Special(SpecialShape::Bomb), catcher.pos + Vec2::new(30.0, 40.0));
        assert_eq!(effective_distance(&shape, &catcher), 50.0);
        assert!(is_near_collision(&shape, &catcher, 50.0));
        assert!(!is_near_collision(&shape, &catcher, 49.0));
    }
}
