//! Per-frame simulation step
//!
//! `tick` advances the whole game by one variable-dt frame: player movement,
//! the spawner, entity collisions, particle aging, cleanup, energy decay and
//! level recomputation, strictly in that order.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::collision::{circles_overlap, outside_view};
use super::entity::{
    Entity, EntityKind, PARTICLE_DECAY_MAX, PARTICLE_DECAY_MIN, Particle, palette,
};
use super::state::{GameEvent, GamePhase, GameState, level_for_score};

/// Particle burst speed ranges (pixels/second)
const SPARK_SPEED: (f32, f32) = (40.0, 160.0);
const EMBER_SPEED: (f32, f32) = (30.0, 140.0);
const FLASH_SPEED: (f32, f32) = (80.0, 420.0);
const PARTICLE_SIZE: (f32, f32) = (1.5, 4.0);

/// Input state for one frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Latest pointer/touch position; persists across frames
    pub target: Option<Vec2>,
    /// Trigger the hypernova (one-shot, cleared by the engine each frame)
    pub hypernova: bool,
}

/// Spawn interval in seconds for a given level; strictly decreasing in level
pub fn spawn_threshold(level: u32, k: f32) -> f32 {
    1.0 / (1.0 + level as f32 * k)
}

/// Advance the game state by one frame of `dt` wall-clock seconds.
///
/// Does nothing unless the phase is `Playing`; after a pursuer collision has
/// transitioned the state to `GameOver`, further calls are no-ops.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if state.phase != GamePhase::Playing {
        return;
    }
    state.events.clear();
    let tun = state.tuning.clone();

    // 1. Player: cosmetic spin, then chase the pointer
    state.player.angle += tun.spin_rate * dt;
    if let Some(target) = input.target {
        state.player.target = target;
    }
    state.player.follow(dt, tun.player_speed);

    // 2. Hypernova (input processing, before anything moves)
    if input.hypernova {
        fire_hypernova(state);
    }

    // 3. Spawner
    state.spawn_timer += dt;
    if state.spawn_timer > spawn_threshold(state.level, tun.spawn_constant) {
        // Excess time is discarded, not carried over
        state.spawn_timer = 0.0;
        // A hidden or not-yet-laid-out canvas reports a zero-size view;
        // there is nowhere to place anything until the next resize
        if state.view.x > 0.0 && state.view.y > 0.0 {
            if state.rng.random_bool(tun.pursuer_chance) {
                spawn_pursuer(state);
            } else {
                spawn_pickup(state);
            }
        }
    }

    // 4. Move every entity and resolve collisions against the player
    let player_pos = state.player.pos;
    let player_radius = state.player.radius;
    let mut fatal = false;
    for entity in &mut state.entities {
        entity.update(dt);
        if entity.dead {
            continue;
        }
        if !circles_overlap(entity.pos, entity.radius, player_pos, player_radius) {
            continue;
        }
        match entity.kind {
            EntityKind::Pickup => {
                entity.dead = true;
                state.score += tun.pickup_reward;
                state.energy = (state.energy + tun.pickup_energy).min(tun.max_energy);
                spawn_burst(
                    &mut state.rng,
                    &mut state.particles,
                    entity.pos,
                    palette::SPARK,
                    tun.pickup_burst,
                    SPARK_SPEED,
                );
            }
            EntityKind::Pursuer => {
                // First transition wins; simultaneous hits are equivalent
                fatal = true;
                break;
            }
        }
    }
    if fatal {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::GameOver { score: state.score });
        log::info!("game over at score {}", state.score);
        return;
    }

    // 5. Age particles
    for particle in &mut state.particles {
        particle.update(dt);
    }

    // 6. Prune dead and far-off-screen entities, then expired particles
    let view = state.view;
    state
        .entities
        .retain(|e| !e.dead && !outside_view(e.pos, view, tun.cull_margin));
    state.particles.retain(|p| !p.expired());

    // 7. Passive energy drain, floored at zero
    state.energy = (state.energy - tun.energy_decay * dt).max(0.0);

    // 8. Level is a pure function of score
    state.level = level_for_score(state.score, tun.level_step);
}

/// Fire the area-clear ability. Returns false (leaving the state untouched)
/// when energy is below the cost.
pub fn fire_hypernova(state: &mut GameState) -> bool {
    let tun = state.tuning.clone();
    if state.energy < tun.hypernova_cost {
        return false;
    }
    state.energy -= tun.hypernova_cost;

    let center = state.player.pos;
    spawn_burst(
        &mut state.rng,
        &mut state.particles,
        center,
        palette::FLASH,
        tun.hypernova_burst,
        FLASH_SPEED,
    );

    let mut destroyed = 0u32;
    for entity in &mut state.entities {
        if entity.kind != EntityKind::Pursuer || entity.dead {
            continue;
        }
        if entity.pos.distance(center) < tun.hypernova_radius {
            entity.dead = true;
            destroyed += 1;
            spawn_burst(
                &mut state.rng,
                &mut state.particles,
                entity.pos,
                palette::EMBER,
                tun.explosion_burst,
                EMBER_SPEED,
            );
        }
    }
    state.score += tun.hypernova_bonus * destroyed as f32;
    log::debug!("hypernova destroyed {destroyed} pursuers");
    true
}

/// Spawn a pickup at a uniformly random point inside the viewport
fn spawn_pickup(state: &mut GameState) {
    let pos = Vec2::new(
        state.rng.random_range(0.0..state.view.x),
        state.rng.random_range(0.0..state.view.y),
    );
    let radius = state.tuning.pickup_radius;
    state.entities.push(Entity::pickup(pos, radius));
}

/// Spawn a pursuer on one of the four off-screen bands, aimed at the player's
/// current position. The aim is fixed at spawn; pursuers do not home.
fn spawn_pursuer(state: &mut GameState) {
    let tun = state.tuning.clone();
    let view = state.view;
    let margin = tun.spawn_margin;

    // Vertical pair (left/right) or horizontal pair (top/bottom), then which
    // band of the pair, each with equal probability
    let pos = if state.rng.random_bool(0.5) {
        let x = if state.rng.random_bool(0.5) { -margin } else { view.x + margin };
        Vec2::new(x, state.rng.random_range(0.0..view.y))
    } else {
        let y = if state.rng.random_bool(0.5) { -margin } else { view.y + margin };
        Vec2::new(state.rng.random_range(0.0..view.x), y)
    };

    let dir = (state.player.pos - pos).normalize_or_zero();
    let speed = state
        .rng
        .random_range(tun.pursuer_speed_min..=tun.pursuer_speed_max)
        * tun.difficulty;
    let radius = state
        .rng
        .random_range(tun.pursuer_radius_min..=tun.pursuer_radius_max);
    state.entities.push(Entity::pursuer(pos, dir * speed, radius));
}

/// Spawn `count` decorative particles radiating from `pos` in uniformly
/// random directions at randomized speed
fn spawn_burst(
    rng: &mut Pcg32,
    particles: &mut Vec<Particle>,
    pos: Vec2,
    color: u32,
    count: usize,
    speed: (f32, f32),
) {
    for _ in 0..count {
        let theta = rng.random_range(0.0..TAU);
        let vel = Vec2::new(theta.cos(), theta.sin()) * rng.random_range(speed.0..speed.1);
        let decay = rng.random_range(PARTICLE_DECAY_MIN..PARTICLE_DECAY_MAX);
        let size = rng.random_range(PARTICLE_SIZE.0..PARTICLE_SIZE.1);
        particles.push(Particle::new(pos, vel, color, decay, size));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn playing_state() -> GameState {
        let mut state = GameState::new(12345, Vec2::new(800.0, 600.0), Tuning::default());
        state.start_run();
        state
    }

    #[test]
    fn test_tick_is_noop_outside_playing() {
        let mut state = GameState::new(1, Vec2::new(800.0, 600.0), Tuning::default());
        assert_eq!(state.phase, GamePhase::Menu);
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::Menu);
        assert!(state.entities.is_empty());
        assert_eq!(state.energy, state.tuning.max_energy);
    }

    #[test]
    fn test_player_angle_advances() {
        let mut state = playing_state();
        let before = state.player.angle;
        tick(&mut state, &TickInput::default(), DT);
        assert!(state.player.angle > before);
    }

    #[test]
    fn test_input_target_moves_player() {
        let mut state = playing_state();
        let input = TickInput {
            target: Some(Vec2::new(500.0, 300.0)),
            ..Default::default()
        };
        tick(&mut state, &input, DT);
        assert!(state.player.pos.x > 400.0);
        // Target persists on the player even without fresh input
        assert_eq!(state.player.target, Vec2::new(500.0, 300.0));
    }

    #[test]
    fn test_pickup_collision_scenario() {
        // Pickup at the player's exact position, collected in one tick
        let mut state = playing_state();
        assert_eq!(state.score, 0.0);
        assert_eq!(state.energy, 200.0);
        let pos = state.player.pos;
        state
            .entities
            .push(Entity::pickup(pos, state.tuning.pickup_radius));

        tick(&mut state, &TickInput::default(), 0.016);

        assert_eq!(state.score, 10.0);
        // Gain would exceed the pool; clamped back to max, then decayed by
        // at most energy_decay * dt
        assert!(state.energy <= 200.0);
        assert!(state.energy >= 200.0 - state.tuning.energy_decay * 0.016 - 1e-4);
        assert!(state.entities.iter().all(|e| e.kind != EntityKind::Pickup));
        assert_eq!(state.particles.len(), 5);
    }

    #[test]
    fn test_pickup_energy_gain_is_clamped() {
        let mut state = playing_state();
        state.energy = 190.0;
        let pos = state.player.pos;
        state
            .entities
            .push(Entity::pickup(pos, state.tuning.pickup_radius));
        tick(&mut state, &TickInput::default(), 0.016);
        // 190 + 30 clamps to 200, then decays slightly
        assert!(state.energy <= 200.0);
        assert!(state.energy > 199.0);
    }

    #[test]
    fn test_pursuer_collision_ends_run_once() {
        let mut state = playing_state();
        let pos = state.player.pos;
        state.entities.push(Entity::pursuer(pos, Vec2::ZERO, 10.0));

        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        let game_overs = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(game_overs, 1);

        // A second tick simulates nothing: no movement, no new events
        state.entities[0].vel = Vec2::new(100.0, 0.0);
        let frozen = state.entities[0].pos;
        let energy = state.energy;
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.entities[0].pos, frozen);
        assert_eq!(state.energy, energy);
        assert_eq!(
            state
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::GameOver { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn test_game_over_reports_score_at_transition() {
        let mut state = playing_state();
        state.score = 130.0;
        let pos = state.player.pos;
        state.entities.push(Entity::pursuer(pos, Vec2::ZERO, 10.0));
        tick(&mut state, &TickInput::default(), DT);
        assert!(
            state
                .events
                .contains(&GameEvent::GameOver { score: 130.0 })
        );
    }

    #[test]
    fn test_hypernova_clears_pursuers_in_radius() {
        let mut state = playing_state();
        let center = state.player.pos;
        // Two in range, one outside the 400px blast, one pickup untouched
        state
            .entities
            .push(Entity::pursuer(center + Vec2::new(100.0, 0.0), Vec2::ZERO, 10.0));
        state
            .entities
            .push(Entity::pursuer(center + Vec2::new(0.0, 399.0), Vec2::ZERO, 10.0));
        state
            .entities
            .push(Entity::pursuer(center + Vec2::new(450.0, 0.0), Vec2::ZERO, 10.0));
        state
            .entities
            .push(Entity::pickup(center + Vec2::new(50.0, 50.0), 7.0));

        let energy_before = state.energy;
        let input = TickInput {
            hypernova: true,
            ..Default::default()
        };
        tick(&mut state, &input, DT);

        let pursuers_left = state
            .entities
            .iter()
            .filter(|e| e.kind == EntityKind::Pursuer)
            .count();
        assert_eq!(pursuers_left, 1);
        assert_eq!(
            state
                .entities
                .iter()
                .filter(|e| e.kind == EntityKind::Pickup)
                .count(),
            1
        );
        assert_eq!(state.score, 2.0 * state.tuning.hypernova_bonus);
        // Cost deducted exactly, minus the frame's passive decay
        let expected = energy_before - state.tuning.hypernova_cost - state.tuning.energy_decay * DT;
        assert!((state.energy - expected).abs() < 1e-3);
        assert!(!state.particles.is_empty());
    }

    #[test]
    fn test_hypernova_underfunded_is_noop() {
        // Energy 20 against a cost of 30: nothing may change
        let mut state = playing_state();
        state.energy = 20.0;
        let center = state.player.pos;
        state
            .entities
            .push(Entity::pursuer(center + Vec2::new(100.0, 0.0), Vec2::ZERO, 10.0));

        let fired = fire_hypernova(&mut state);
        assert!(!fired);
        assert_eq!(state.energy, 20.0);
        assert!(state.particles.is_empty());
        assert_eq!(state.entities.len(), 1);
        assert!(!state.entities[0].dead);
        assert_eq!(state.score, 0.0);
    }

    #[test]
    fn test_energy_decays_and_floors_at_zero() {
        let mut state = playing_state();
        state.energy = 0.05;
        tick(&mut state, &TickInput::default(), DT);
        assert!(state.energy >= 0.0);
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.energy, 0.0);
    }

    #[test]
    fn test_level_tracks_score() {
        let mut state = playing_state();
        state.score = 1200.0;
        tick(&mut state, &TickInput::default(), DT);
        assert_eq!(state.level, 3);
        assert_eq!(state.stats().level, 3);
    }

    #[test]
    fn test_spawn_threshold_decreases_with_level() {
        let k = 0.24;
        assert!((spawn_threshold(1, k) - 1.0 / 1.24).abs() < 1e-5);
        let mut last = f32::INFINITY;
        for level in 1..20 {
            let t = spawn_threshold(level, k);
            assert!(t < last);
            last = t;
        }
    }

    #[test]
    fn test_spawner_fires_within_long_frame() {
        // Timer 0, level 1, k 0.24 gives a ~0.806s threshold; a 5s frame
        // must fire the spawner
        let mut state = playing_state();
        assert_eq!(state.spawn_timer, 0.0);
        tick(&mut state, &TickInput::default(), 5.0);
        // Timer resets to zero on the frame it fires; 5.0 would remain if not
        assert_eq!(state.spawn_timer, 0.0);
    }

    #[test]
    fn test_zero_size_view_spawns_nothing() {
        // A hidden or minimized canvas reports zero client size; the spawn
        // ranges would be empty, so the spawner must skip the frame instead
        let mut state = GameState::new(5, Vec2::ZERO, Tuning::default());
        state.start_run();
        tick(&mut state, &TickInput::default(), 5.0);
        assert!(state.entities.is_empty());
        // The timer still fired and reset
        assert_eq!(state.spawn_timer, 0.0);
        assert_eq!(state.phase, GamePhase::Playing);

        // Spawning resumes once the host resizes the view back
        state.view = Vec2::new(800.0, 600.0);
        tick(&mut state, &TickInput::default(), 1.0);
        assert_eq!(state.entities.len(), 1);
    }

    #[test]
    fn test_spawner_accumulates_below_threshold() {
        let mut state = playing_state();
        tick(&mut state, &TickInput::default(), 0.1);
        assert!((state.spawn_timer - 0.1).abs() < 1e-5);
        assert!(state.entities.is_empty());
    }

    #[test]
    fn test_spawned_pursuers_start_off_screen_aimed_at_player() {
        let mut state = playing_state();
        // Drive the spawner until it has produced a few pursuers
        for _ in 0..200 {
            tick(&mut state, &TickInput::default(), 0.5);
            if state.phase != GamePhase::Playing {
                break;
            }
        }
        // Spawn positions sit on the off-screen bands, so every pursuer must
        // have entered with a velocity pointing toward the viewport
        for e in state.entities.iter().filter(|e| e.kind == EntityKind::Pursuer) {
            assert!(e.vel.length() > 0.0);
            assert!(e.radius >= state.tuning.pursuer_radius_min);
            assert!(e.radius <= state.tuning.pursuer_radius_max);
        }
    }

    #[test]
    fn test_particles_pruned_after_expiry() {
        let mut state = playing_state();
        state
            .particles
            .push(Particle::new(Vec2::ZERO, Vec2::ZERO, palette::SPARK, 100.0, 2.0));
        tick(&mut state, &TickInput::default(), DT);
        // Life went negative on the first step but the particle survives at
        // most one more cleanup pass; it is never revived
        for _ in 0..2 {
            tick(&mut state, &TickInput::default(), DT);
        }
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_offscreen_entities_pruned() {
        let mut state = playing_state();
        // Moving away, already at the edge; one tick pushes it past the margin
        state.entities.push(Entity::pursuer(
            Vec2::new(-state.tuning.cull_margin, 300.0),
            Vec2::new(-500.0, 0.0),
            10.0,
        ));
        tick(&mut state, &TickInput::default(), 0.1);
        assert!(state.entities.is_empty());
    }

    #[test]
    fn test_determinism() {
        let tuning = Tuning::default();
        let mut a = GameState::new(99999, Vec2::new(800.0, 600.0), tuning.clone());
        let mut b = GameState::new(99999, Vec2::new(800.0, 600.0), tuning);
        a.start_run();
        b.start_run();

        let input = TickInput {
            target: Some(Vec2::new(200.0, 150.0)),
            ..Default::default()
        };
        for _ in 0..600 {
            tick(&mut a, &input, DT);
            tick(&mut b, &input, DT);
        }
        assert_eq!(a.score, b.score);
        assert_eq!(a.entities.len(), b.entities.len());
        assert_eq!(a.particles.len(), b.particles.len());
        assert_eq!(a.player.pos, b.player.pos);
    }

    proptest! {
        #[test]
        fn prop_energy_always_clamped(
            seed in 0u64..1000,
            steps in 1usize..120,
            dt in 0.001f32..0.2,
            nova_every in 1usize..10,
        ) {
            let mut state = GameState::new(seed, Vec2::new(800.0, 600.0), Tuning::default());
            state.start_run();
            for step in 0..steps {
                // Feed it pickups and hypernovas to exercise gain and spend
                if step % 3 == 0 {
                    let pos = state.player.pos;
                    let r = state.tuning.pickup_radius;
                    state.entities.push(Entity::pickup(pos, r));
                }
                let input = TickInput {
                    hypernova: step % nova_every == 0,
                    ..Default::default()
                };
                tick(&mut state, &input, dt);
                prop_assert!(state.energy >= 0.0);
                prop_assert!(state.energy <= state.tuning.max_energy);
                if state.phase != GamePhase::Playing {
                    break;
                }
            }
        }

        #[test]
        fn prop_level_matches_score(score in 0.0f32..100_000.0) {
            let mut state = GameState::new(1, Vec2::new(800.0, 600.0), Tuning::default());
            state.start_run();
            state.score = score;
            tick(&mut state, &TickInput::default(), DT);
            if state.phase == GamePhase::Playing {
                prop_assert_eq!(state.level, 1 + (state.score / 500.0).floor() as u32);
            }
        }
    }
}
