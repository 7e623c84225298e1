//! Falling shape entities
//!
//! A shape is either a regular piece (one of four types in one of six colors) or one
//! of six special pieces with their own matching and scoring rules. The variant is
//! fixed at spawn.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{CANVAS_HEIGHT, ROTATION_SPEED, SHAPE_SIZE};

/// Base shape types, in palette order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeType {
    Square,
    Triangle,
    Circle,
    Star,
}

impl ShapeType {
    pub const ALL: [Self; 4] = [Self::Square, Self::Triangle, Self::Circle, Self::Star];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Square => "square",
            Self::Triangle => "triangle",
            Self::Circle => "circle",
            Self::Star => "star",
        }
    }
}

/// Base colors, in palette order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Orange,
}

impl ShapeColor {
    pub const ALL: [Self; 6] = [
        Self::Red,
        Self::Blue,
        Self::Green,
        Self::Yellow,
        Self::Purple,
        Self::Orange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
            Self::Orange => "orange",
        }
    }
}

/// Special pieces. Each variant carries only the attribute its matching rule reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialShape {
    /// Matches on color alone
    Diamond { color: ShapeColor },
    /// Matches on shape type alone
    Rainbow { shape: ShapeType },
    /// Matches on color, and only while the catcher shows a star
    GoldenStar { color: ShapeColor },
    /// Always triggers; routed to the penalty path
    Bomb,
    /// Always collected
    TimeBonus,
    /// Always collected
    Multiplier,
}

/// Discriminant of [`SpecialShape`] without payload (for events and statistics)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialKind {
    Diamond,
    Rainbow,
    GoldenStar,
    Bomb,
    TimeBonus,
    Multiplier,
}

impl SpecialKind {
    pub const ALL: [Self; 6] = [
        Self::Diamond,
        Self::Rainbow,
        Self::GoldenStar,
        Self::Bomb,
        Self::TimeBonus,
        Self::Multiplier,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Diamond => "diamond",
            Self::Rainbow => "rainbow",
            Self::GoldenStar => "golden_star",
            Self::Bomb => "bomb",
            Self::TimeBonus => "time_bonus",
            Self::Multiplier => "multiplier",
        }
    }
}

impl SpecialShape {
    pub fn kind(&self) -> SpecialKind {
        match self {
            Self::Diamond { .. } => SpecialKind::Diamond,
            Self::Rainbow { .. } => SpecialKind::Rainbow,
            Self::GoldenStar { .. } => SpecialKind::GoldenStar,
            Self::Bomb => SpecialKind::Bomb,
            Self::TimeBonus => SpecialKind::TimeBonus,
            Self::Multiplier => SpecialKind::Multiplier,
        }
    }
}

/// What a shape is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    Regular { shape: ShapeType, color: ShapeColor },
    Special(SpecialShape),
}

impl ShapeKind {
    pub fn is_special(&self) -> bool {
        matches!(self, Self::Special(_))
    }

    pub fn special_kind(&self) -> Option<SpecialKind> {
        match self {
            Self::Special(special) => Some(special.kind()),
            Self::Regular { .. } => None,
        }
    }

    pub fn is_bomb(&self) -> bool {
        matches!(self, Self::Special(SpecialShape::Bomb))
    }
}

/// Axis-aligned bounds (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Bounds {
    /// Bounds of a box centered on `center` with the given half extents
    pub fn from_center(center: Vec2, half_width: f32, half_height: f32) -> Self {
        Self {
            left: center.x - half_width,
            right: center.x + half_width,
            top: center.y - half_height,
            bottom: center.y + half_height,
        }
    }

    /// Grow every side by `amount`
    pub fn expanded(&self, amount: f32) -> Self {
        Self {
            left: self.left - amount,
            right: self.right + amount,
            top: self.top - amount,
            bottom: self.bottom + amount,
        }
    }

    /// Overlap unless separated on an axis. Touching edges count as overlap.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        !(self.right < other.left
            || self.left > other.right
            || self.bottom < other.top
            || self.top > other.bottom)
    }
}

/// A falling shape entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shape {
    pub id: u32,
    pub kind: ShapeKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Edge length / diameter
    pub size: f32,
    /// Radians, cosmetic only
    pub rotation: f32,
    /// Configured fall speed (pixels per 60 Hz frame). Gravity never accelerates past it.
    #[serde(default)]
    pub fall_speed: Option<f32>,
}

impl Shape {
    pub fn new(id: u32, kind: ShapeKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            size: SHAPE_SIZE,
            rotation: 0.0,
            fall_speed: None,
        }
    }

    /// Pin the falling speed to a level's configured value
    pub fn set_fall_speed(&mut self, speed: f32) {
        self.vel.y = speed;
        self.fall_speed = Some(speed);
    }

    /// Integrate position and spin. Velocity is per 60 Hz frame, scaled by `dt`.
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt * 60.0;

        self.rotation += ROTATION_SPEED * dt;
        if self.rotation > std::f32::consts::TAU {
            self.rotation -= std::f32::consts::TAU;
        }
    }

    pub fn bounds(&self) -> Bounds {
        let half = self.size / 2.0;
        Bounds::from_center(self.pos, half, half)
    }

    /// Fully below the playfield
    pub fn is_off_screen(&self) -> bool {
        self.pos.y > CANVAS_HEIGHT + self.size
    }
}
