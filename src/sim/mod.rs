//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (insertion order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod state;
pub mod tick;

pub use collision::{circles_overlap, outside_view};
pub use entity::{Entity, EntityKind, Particle, Player};
pub use state::{GameEvent, GamePhase, GameState, GameStats};
pub use tick::{TickInput, fire_hypernova, tick};
