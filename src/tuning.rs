//! Data-driven game balance
//!
//! Every gameplay magic number lives in one table so hosts can rebalance the
//! game from JSON without touching the simulation. Two historical tunings of
//! this game disagreed on the energy pool, hypernova cost, difficulty
//! multiplier and spawn constant; the defaults below are the canonical set.

use serde::{Deserialize, Serialize};

/// Gameplay constant table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Energy ===
    /// Energy pool size; energy is clamped to [0, max_energy]
    pub max_energy: f32,
    /// Passive energy drain per second while playing
    pub energy_decay: f32,

    // === Hypernova ===
    /// Energy cost of one hypernova; the ability is a no-op below this
    pub hypernova_cost: f32,
    /// Blast radius around the player (pixels)
    pub hypernova_radius: f32,
    /// Score awarded per pursuer destroyed by the blast
    pub hypernova_bonus: f32,
    /// Particles in the central burst
    pub hypernova_burst: usize,
    /// Particles in the per-pursuer explosion
    pub explosion_burst: usize,

    // === Pickups ===
    /// Score for collecting a pickup
    pub pickup_reward: f32,
    /// Energy restored by a pickup (clamped to max_energy)
    pub pickup_energy: f32,
    /// Particles in the collection burst
    pub pickup_burst: usize,
    pub pickup_radius: f32,

    // === Spawning / difficulty ===
    /// k in the spawn threshold `1 / (1 + level * k)`; higher = faster ramp
    pub spawn_constant: f32,
    /// Probability a spawn is a pursuer rather than a pickup
    pub pursuer_chance: f64,
    /// Multiplier applied to every pursuer's speed
    pub difficulty: f32,
    pub pursuer_speed_min: f32,
    pub pursuer_speed_max: f32,
    pub pursuer_radius_min: f32,
    pub pursuer_radius_max: f32,
    /// How far beyond the viewport edge pursuers spawn (pixels)
    pub spawn_margin: f32,
    /// How far beyond the viewport an entity may drift before being pruned
    pub cull_margin: f32,

    // === Player ===
    pub player_radius: f32,
    /// Maximum speed at which the player chases the pointer (pixels/second)
    pub player_speed: f32,
    /// Cosmetic spin rate (radians/second)
    pub spin_rate: f32,

    // === Scoring ===
    /// Score per level: level = 1 + floor(score / level_step)
    pub level_step: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_energy: 200.0,
            energy_decay: 4.0,
            hypernova_cost: 30.0,
            hypernova_radius: 400.0,
            hypernova_bonus: 25.0,
            hypernova_burst: 60,
            explosion_burst: 12,
            pickup_reward: 10.0,
            pickup_energy: 30.0,
            pickup_burst: 5,
            pickup_radius: 7.0,
            spawn_constant: 0.24,
            pursuer_chance: 0.7,
            difficulty: 1.2,
            pursuer_speed_min: 60.0,
            pursuer_speed_max: 160.0,
            pursuer_radius_min: 9.0,
            pursuer_radius_max: 16.0,
            spawn_margin: 40.0,
            cull_margin: 80.0,
            player_radius: 12.0,
            player_speed: 600.0,
            spin_rate: 2.5,
            level_step: 500.0,
        }
    }
}

impl Tuning {
    /// Parse a host-supplied override; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
