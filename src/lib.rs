//! Hypernova - a pointer-chasing arcade survival game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, movement, collisions, scoring)
//! - `engine`: Canvas engine - input listeners, frame loop, lifecycle (wasm only)
//! - `render`: 2D canvas draw pass (wasm only)
//! - `tuning`: Data-driven game balance

pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod engine;
#[cfg(target_arch = "wasm32")]
pub mod render;

pub use tuning::Tuning;

/// Frame-loop constants
pub mod consts {
    /// Longest frame the engine will integrate in one step (seconds).
    /// A backgrounded tab can report multi-second gaps between animation
    /// frames; the clamp keeps entities from teleporting across the screen.
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// dt assumed for the very first frame, before a previous timestamp exists
    pub const FIRST_FRAME_DT: f32 = 1.0 / 60.0;
    /// Two taps within this window count as a double-tap (milliseconds)
    pub const DOUBLE_TAP_WINDOW_MS: f64 = 300.0;
}
