//! The player's catcher

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::shape::{Bounds, ShapeColor, ShapeType};
use crate::consts::*;

/// Catcher condition with its remaining duration (seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CatcherState {
    Normal,
    /// Movement and cycling are ignored
    Stunned { remaining: f32 },
    /// Misses and bombs cost nothing
    Invulnerable { remaining: f32 },
}

/// The player's catcher. Moves along x only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catcher {
    pub pos: Vec2,
    pub width: f32,
    pub height: f32,
    pub current_shape: ShapeType,
    pub current_color: ShapeColor,
    pub state: CatcherState,
    available_shapes: Vec<ShapeType>,
    available_colors: Vec<ShapeColor>,
}

impl Default for Catcher {
    fn default() -> Self {
        Self {
            pos: Vec2::new(CANVAS_WIDTH / 2.0, CATCHER_Y),
            width: CATCHER_WIDTH,
            height: CATCHER_HEIGHT,
            current_shape: ShapeType::Square,
            current_color: ShapeColor::Red,
            state: CatcherState::Normal,
            available_shapes: ShapeType::ALL.to_vec(),
            available_colors: ShapeColor::ALL.to_vec(),
        }
    }
}

impl Catcher {
    /// Catcher with palettes limited to the given sizes
    pub fn with_palettes(shapes: &[ShapeType], colors: &[ShapeColor]) -> Self {
        let mut catcher = Self::default();
        catcher.set_available_shapes(shapes);
        catcher.set_available_colors(colors);
        catcher
    }

    /// Count down stun/invulnerability
    pub fn update(&mut self, dt: f32) {
        match &mut self.state {
            CatcherState::Normal => {}
            CatcherState::Stunned { remaining } | CatcherState::Invulnerable { remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    self.state = CatcherState::Normal;
                }
            }
        }
    }

    pub fn is_stunned(&self) -> bool {
        matches!(self.state, CatcherState::Stunned { .. })
    }

    pub fn is_invulnerable(&self) -> bool {
        matches!(self.state, CatcherState::Invulnerable { .. })
    }

    pub fn move_left(&mut self) {
        if self.is_stunned() {
            return;
        }
        self.pos.x = (self.pos.x - CATCHER_SPEED).max(self.width / 2.0);
    }

    pub fn move_right(&mut self) {
        if self.is_stunned() {
            return;
        }
        self.pos.x = (self.pos.x + CATCHER_SPEED).min(CANVAS_WIDTH - self.width / 2.0);
    }

    /// Advance to the next shape in the palette (wraps)
    pub fn cycle_shape(&mut self) {
        if self.is_stunned() {
            return;
        }
        self.current_shape = next_in(&self.available_shapes, self.current_shape);
    }

    /// Advance to the next color in the palette (wraps)
    pub fn cycle_color(&mut self) {
        if self.is_stunned() {
            return;
        }
        self.current_color = next_in(&self.available_colors, self.current_color);
    }

    /// Select a shape directly; ignored if it is not in the palette
    pub fn set_shape(&mut self, shape: ShapeType) {
        if self.available_shapes.contains(&shape) {
            self.current_shape = shape;
        }
    }

    /// Select a color directly; ignored if it is not in the palette
    pub fn set_color(&mut self, color: ShapeColor) {
        if self.available_colors.contains(&color) {
            self.current_color = color;
        }
    }

    pub fn stun(&mut self, duration: f32) {
        self.state = CatcherState::Stunned {
            remaining: duration,
        };
    }

    pub fn make_invulnerable(&mut self, duration: f32) {
        self.state = CatcherState::Invulnerable {
            remaining: duration,
        };
    }

    /// Replace the shape palette. An empty slice is ignored; the current shape falls
    /// back to the first entry if it is no longer available.
    pub fn set_available_shapes(&mut self, shapes: &[ShapeType]) {
        if shapes.is_empty() {
            return;
        }
        self.available_shapes = shapes.to_vec();
        if !self.available_shapes.contains(&self.current_shape) {
            self.current_shape = shapes[0];
        }
    }

    /// Replace the color palette. Same clamping rules as shapes.
    pub fn set_available_colors(&mut self, colors: &[ShapeColor]) {
        if colors.is_empty() {
            return;
        }
        self.available_colors = colors.to_vec();
        if !self.available_colors.contains(&self.current_color) {
            self.current_color = colors[0];
        }
    }

    pub fn available_shapes(&self) -> &[ShapeType] {
        &self.available_shapes
    }

    pub fn available_colors(&self) -> &[ShapeColor] {
        &self.available_colors
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_center(self.pos, self.width / 2.0, self.height / 2.0)
    }
}

fn next_in<T: Copy + PartialEq>(palette: &[T], current: T) -> T {
    match palette.iter().position(|&item| item == current) {
        Some(i) => palette[(i + 1) % palette.len()],
        None => palette.first().copied().unwrap_or(current),
    }
}
