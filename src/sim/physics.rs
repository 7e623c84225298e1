//! Falling-shape physics
//!
//! Velocities are expressed per 60 Hz frame and scaled by the real step, so the
//! integration is frame-rate independent.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::shape::Shape;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Downward acceleration (pixels per frame²)
    pub gravity: f32,
    /// Maximum downward speed (pixels per frame)
    pub terminal_velocity: f32,
    /// Horizontal velocity retained each step (0-1)
    pub air_resistance: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.2,
            terminal_velocity: 10.0,
            air_resistance: 0.99,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhysicsEngine {
    config: PhysicsConfig,
}

impl PhysicsEngine {
    pub fn new(config: PhysicsConfig) -> Self {
        let mut engine = Self::default();
        engine.set_gravity(config.gravity);
        engine.set_terminal_velocity(config.terminal_velocity);
        engine.set_air_resistance(config.air_resistance);
        engine
    }

    pub fn config(&self) -> PhysicsConfig {
        self.config
    }

    /// Advance one shape by `dt` seconds
    pub fn update_shape(&self, shape: &mut Shape, dt: f32) {
        let gravity = self.config.gravity * dt * 60.0;

        // A configured fall speed holds the shape at that speed. Gravity brings a
        // slowed shape back up to it; extra downward speed bleeds off at the air
        // resistance rate.
        match shape.fall_speed {
            Some(speed) if shape.vel.y > speed => {
                shape.vel.y = speed + (shape.vel.y - speed) * self.config.air_resistance;
            }
            Some(speed) => shape.vel.y = (shape.vel.y + gravity).min(speed),
            None => shape.vel.y += gravity,
        }
        shape.vel.y = shape.vel.y.min(self.config.terminal_velocity);

        shape.vel.x *= self.config.air_resistance;

        shape.integrate(dt);
    }

    pub fn update_shapes(&self, shapes: &mut [Shape], dt: f32) {
        for shape in shapes.iter_mut() {
            self.update_shape(shape, dt);
        }
    }

    pub fn set_gravity(&mut self, gravity: f32) {
        self.config.gravity = gravity;
    }

    pub fn set_terminal_velocity(&mut self, velocity: f32) {
        self.config.terminal_velocity = velocity;
    }

    pub fn set_air_resistance(&mut self, resistance: f32) {
        self.config.air_resistance = resistance.clamp(0.0, 1.0);
    }

    pub fn set_fall_speed(&self, shape: &mut Shape, speed: f32) {
        shape.set_fall_speed(speed);
    }

    /// Add to velocity
    pub fn apply_force(&self, shape: &mut Shape, force: Vec2) {
        shape.vel += force;
    }

    /// Replace velocity outright
    pub fn apply_impulse(&self, shape: &mut Shape, impulse: Vec2) {
        shape.vel = impulse;
    }

    /// Horizontal push on every shape
    pub fn apply_wind(&self, shapes: &mut [Shape], wind: f32) {
        for shape in shapes.iter_mut() {
            self.apply_force(shape, Vec2::new(wind, 0.0));
        }
    }

    /// Radial push away from `center`, falling off linearly to zero at `radius`
    pub fn apply_explosion(&self, shapes: &mut [Shape], center: Vec2, radius: f32, force: f32) {
        for shape in shapes.iter_mut() {
            let offset = shape.pos - center;
            let distance = offset.length();
            if distance > 0.0 && distance < radius {
                let falloff = 1.0 - distance / radius;
                self.apply_force(shape, offset / distance * force * falloff);
            }
        }
    }

    /// Drop shapes that have left the bottom of the playfield. Returns how many went.
    pub fn retain_on_screen(&self, shapes: &mut Vec<Shape>) -> usize {
        let before = shapes.len();
        shapes.retain(|shape| !shape.is_off_screen());
        before - shapes.len()
    }

    pub fn reset(&mut self) {
        self.config = PhysicsConfig::default();
    }
}
