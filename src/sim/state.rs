//! Game state and derived stats
//!
//! One `GameState` owns every entity container, the spawn timer and the seeded
//! RNG. The engine resets it on `start()` and drives it through `tick`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::tuning::Tuning;

use super::entity::{Entity, Particle, Player};

/// Current phase of the engine state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Initial; the frame loop is not running
    Menu,
    /// Active gameplay
    Playing,
    /// Run ended by a pursuer collision
    GameOver,
}

/// Events produced during a tick, drained by the engine after it.
/// Everything else the host needs is in the per-frame stats snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// A pursuer reached the player; carries the score at the transition
    GameOver { score: f32 },
}

/// Immutable per-frame stats snapshot for the host HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GameStats {
    pub score: f32,
    pub energy: f32,
    pub max_energy: f32,
    pub level: u32,
}

/// Level derived deterministically from score
pub fn level_for_score(score: f32, level_step: f32) -> u32 {
    1 + (score / level_step).floor() as u32
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub player: Player,
    /// Active non-player entities, insertion order
    pub entities: Vec<Entity>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub score: f32,
    /// Clamped to [0, tuning.max_energy]
    pub energy: f32,
    pub level: u32,
    /// Accumulates dt; fires a spawn when it exceeds the level threshold
    pub spawn_timer: f32,
    /// Viewport size in CSS pixels; updated by the engine on resize
    pub view: Vec2,
    /// Events from the most recent tick, drained by the engine
    pub events: Vec<GameEvent>,
    pub tuning: Tuning,
}

impl GameState {
    /// Create a state in the Menu phase; `start_run` begins gameplay
    pub fn new(seed: u64, view: Vec2, tuning: Tuning) -> Self {
        let player = Player::new(view * 0.5, tuning.player_radius);
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Menu,
            player,
            entities: Vec::new(),
            particles: Vec::new(),
            score: 0.0,
            energy: tuning.max_energy,
            level: 1,
            spawn_timer: 0.0,
            view,
            events: Vec::new(),
            tuning,
        }
    }

    /// Reset all mutable run state and enter Playing. Legal from any phase;
    /// calling while already Playing simply restarts.
    pub fn start_run(&mut self) {
        self.player = Player::new(self.view * 0.5, self.tuning.player_radius);
        self.entities.clear();
        self.particles.clear();
        self.events.clear();
        self.score = 0.0;
        self.energy = self.tuning.max_energy;
        self.level = 1;
        self.spawn_timer = 0.0;
        self.phase = GamePhase::Playing;
    }

    /// Snapshot the derived stats for the host
    pub fn stats(&self) -> GameStats {
        GameStats {
            score: self.score,
            energy: self.energy,
            max_energy: self.tuning.max_energy,
            level: self.level,
        }
    }
}
