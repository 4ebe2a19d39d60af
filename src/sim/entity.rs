//! Simulated entities: the player, non-player entities, and visual particles
//!
//! Non-player entities share one struct with a kind tag rather than a type
//! hierarchy, so collision and cleanup logic dispatch on an exhaustive match
//! instead of downcasts.

use glam::Vec2;

/// Palette indices used as cosmetic color tags; the draw pass maps them to
/// actual colors. Not gameplay-relevant.
pub mod palette {
    pub const PLAYER: u32 = 0;
    pub const PICKUP: u32 = 1;
    pub const PURSUER: u32 = 2;
    /// Pickup collection sparks
    pub const SPARK: u32 = 3;
    /// Explosion embers
    pub const EMBER: u32 = 4;
    /// Hypernova flash
    pub const FLASH: u32 = 5;
}

/// What a non-player entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Hostile; aimed at the player's position at spawn time, fatal on contact
    Pursuer,
    /// Beneficial and stationary; grants score and energy on contact
    Pickup,
}

/// A non-player entity
#[derive(Debug, Clone)]
pub struct Entity {
    pub kind: EntityKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Collision extent and draw size; fixed at spawn, always > 0
    pub radius: f32,
    pub color: u32,
    /// Monotonic deletion flag; once set the entity is pruned at the next
    /// cleanup pass and never reused
    pub dead: bool,
}

impl Entity {
    /// A stationary pickup
    pub fn pickup(pos: Vec2, radius: f32) -> Self {
        Self {
            kind: EntityKind::Pickup,
            pos,
            vel: Vec2::ZERO,
            radius,
            color: palette::PICKUP,
            dead: false,
        }
    }

    /// A pursuer with its velocity fixed at spawn
    pub fn pursuer(pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            kind: EntityKind::Pursuer,
            pos,
            vel,
            radius,
            color: palette::PURSUER,
            dead: false,
        }
    }

    /// Advance position by one explicit Euler step. No collision response.
    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }
}

/// Per-instance particle decay range (life units per second)
pub const PARTICLE_DECAY_MIN: f32 = 0.6;
pub const PARTICLE_DECAY_MAX: f32 = 1.8;

/// A decaying visual-only particle; never affects gameplay
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    /// Starts at 1.0, strictly decreasing; the particle expires at <= 0.
    /// Draw-time opacity is `life.clamp(0, 1)`.
    pub life: f32,
    /// Decay rate, randomized per instance at spawn
    pub decay: f32,
    pub size: f32,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2, color: u32, decay: f32, size: f32) -> Self {
        Self {
            pos,
            vel,
            color,
            life: 1.0,
            decay,
            size,
        }
    }

    /// Integrate position and burn lifespan
    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.life -= self.decay * dt;
    }

    pub fn expired(&self) -> bool {
        self.life <= 0.0
    }
}

/// The user-controlled avatar
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    /// Most recent pointer/touch position; overwritten directly by input
    /// events and chased each frame
    pub target: Vec2,
    pub radius: f32,
    /// Cosmetic spin, monotonically increasing; wraps implicitly via trig
    pub angle: f32,
}

impl Player {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            target: pos,
            radius,
            angle: 0.0,
        }
    }

    /// Step toward the pointer target, clamped to `max_speed * dt`
    pub fn follow(&mut self, dt: f32, max_speed: f32) {
        let to_target = self.target - self.pos;
        let step = max_speed * dt;
        if to_target.length() <= step {
            self.pos = self.target;
        } else {
            self.pos += to_target.normalize_or_zero() * step;
        }
    }
}
