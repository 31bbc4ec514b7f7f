use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::engine::entity::{Firefly, Oscillator, Wander};
use crate::engine::motion::outside;
use crate::engine::scene::{Origin, SpawnCtx, span};
use crate::engine::{Fate, Pen, Tick};
use rand::RngExt;

const MARGIN: f64 = 30.0;

pub fn spawn(ctx: &mut SpawnCtx) -> Firefly {
    let (w, h) = (ctx.bounds.width, ctx.bounds.height);
    let rng = &mut *ctx.rng;
    let (x, y, heading) = match ctx.origin {
        Origin::Scatter => (span(rng, 0.0, w), span(rng, 0.0, h), rng.random_range(0.0..TAU)),
        Origin::Enter => {
            // Pick an edge and head roughly inward.
            let jitter = rng.random_range(-0.6..0.6);
            match rng.random_range(0..4) {
                0 => (0.0, span(rng, 0.0, h), jitter),
                1 => (w, span(rng, 0.0, h), PI + jitter),
                2 => (span(rng, 0.0, w), 0.0, FRAC_PI_2 + jitter),
                _ => (span(rng, 0.0, w), h, -FRAC_PI_2 + jitter),
            }
        }
    };
    Firefly {
        x,
        y,
        heading,
        speed: rng.random_range(0.25..0.7),
        radius: rng.random_range(1.5..3.0),
        opacity: rng.random_range(0.35..0.5),
        wander: Wander::new(rng, 0.05, 0.08, 45),
        blink: Oscillator {
            phase: rng.random_range(0.0..TAU),
            speed: rng.random_range(0.015..0.05),
            amplitude: 1.0,
        },
    }
}

pub fn step(f: &mut Firefly, tick: &mut Tick) -> Fate {
    let turn = f.wander.advance(tick.rng);
    f.heading = (f.heading + turn * tick.step) % TAU;
    f.blink.advance(tick.step);
    f.x += f.heading.cos() * f.speed * tick.step;
    f.y += f.heading.sin() * f.speed * tick.step;

    if outside(f.x, f.y, tick.bounds.width, tick.bounds.height, MARGIN) {
        Fate::Expired
    } else {
        Fate::Alive
    }
}

/// Blink envelope: long dark stretches, short bright pulses.
pub fn blink_fade(f: &Firefly) -> f64 {
    f.blink.unit().powi(3)
}

pub fn draw(f: &Firefly, pen: &mut Pen) {
    let fade = blink_fade(f);
    let halo = pen.shade(1, f.opacity * 0.6, fade);
    if !halo.is_visible() {
        return;
    }
    pen.surface.glow(f.x, f.y, f.radius * 5.0, halo);
    let core = pen.shade(0, f.opacity, fade);
    pen.surface.fill_circle(f.x, f.y, f.radius, core);
}
