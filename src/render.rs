//! 2D canvas draw pass
//!
//! Redraws the whole frame from scratch after each update; no partial
//! invalidation. Every shape is a stroked or filled circle passthrough to
//! the canvas API, so nothing in here affects gameplay.

use std::f64::consts::TAU;

use web_sys::CanvasRenderingContext2d;

use crate::sim::{GameState, entity::palette};

const BACKGROUND: &str = "#090a14";

/// Map a palette index to its display color
fn color_for(index: u32) -> &'static str {
    match index {
        palette::PLAYER => "#4deeea",
        palette::PICKUP => "#ffd166",
        palette::PURSUER => "#ef476f",
        palette::SPARK => "#ffe8a3",
        palette::EMBER => "#ff8c42",
        palette::FLASH => "#f4f7ff",
        _ => "#ffffff",
    }
}

fn fill_circle(ctx: &CanvasRenderingContext2d, x: f64, y: f64, radius: f64) {
    ctx.begin_path();
    let _ = ctx.arc(x, y, radius.max(0.1), 0.0, TAU);
    ctx.fill();
}

/// Render one complete frame of the current state
pub fn draw(ctx: &CanvasRenderingContext2d, state: &GameState) {
    let view = state.view;
    ctx.set_fill_style_str(BACKGROUND);
    ctx.fill_rect(0.0, 0.0, view.x as f64, view.y as f64);

    // Particles first so live entities draw over them
    for particle in &state.particles {
        ctx.set_global_alpha(particle.life.clamp(0.0, 1.0) as f64);
        ctx.set_fill_style_str(color_for(particle.color));
        fill_circle(
            ctx,
            particle.pos.x as f64,
            particle.pos.y as f64,
            particle.size as f64,
        );
    }
    ctx.set_global_alpha(1.0);

    for entity in &state.entities {
        ctx.set_fill_style_str(color_for(entity.color));
        fill_circle(
            ctx,
            entity.pos.x as f64,
            entity.pos.y as f64,
            entity.radius as f64,
        );
    }

    draw_player(ctx, state);
}

/// The avatar: a filled circle with four spinning spike accents driven by
/// the cosmetic angle
fn draw_player(ctx: &CanvasRenderingContext2d, state: &GameState) {
    let player = &state.player;
    let r = player.radius as f64;

    ctx.save();
    let _ = ctx.translate(player.pos.x as f64, player.pos.y as f64);
    let _ = ctx.rotate(player.angle as f64);

    ctx.set_fill_style_str(color_for(palette::PLAYER));
    fill_circle(ctx, 0.0, 0.0, r);

    ctx.set_stroke_style_str(color_for(palette::PLAYER));
    ctx.set_line_width(2.0);
    for i in 0..4 {
        let theta = TAU * f64::from(i) / 4.0;
        ctx.begin_path();
        ctx.move_to(theta.cos() * (r + 3.0), theta.sin() * (r + 3.0));
        ctx.line_to(theta.cos() * (r + 9.0), theta.sin() * (r + 9.0));
        ctx.stroke();
    }

    ctx.restore();
}
