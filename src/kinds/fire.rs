use crate::engine::entity::{Ember, Glow, Oscillator};
use crate::engine::motion::{life_fade, outside};
use crate::engine::scene::{Origin, SpawnCtx, span};
use crate::engine::{Fate, Pen, Tick};
use rand::RngExt;

const MARGIN: f64 = 20.0;

pub fn spawn_glow(ctx: &mut SpawnCtx) -> Glow {
    let (w, h) = (ctx.bounds.width, ctx.bounds.height);
    Glow {
        x: w * 0.5,
        y: h,
        radius: (w.max(h) * 0.45).max(1.0),
        opacity: 0.35,
        pulse: Oscillator::random(ctx.rng, 0.02..0.04, 0.06..0.12),
    }
}

pub fn step_glow(g: &mut Glow, tick: &mut Tick) -> Fate {
    g.pulse.advance(tick.step);
    Fate::Alive
}

pub fn draw_glow(g: &Glow, pen: &mut Pen) {
    let paint = pen.shade(0, g.opacity, 1.0 + g.pulse.value().min(0.0));
    pen.surface.glow(g.x, g.y, g.radius * (1.0 + g.pulse.value()), paint);
}

/// Embers rise from a band along the bottom, clustered toward the middle.
pub fn spawn_ember(ctx: &mut SpawnCtx) -> Ember {
    let (w, h) = (ctx.bounds.width, ctx.bounds.height);
    let rng = &mut *ctx.rng;
    let center = (span(rng, 0.0, w) + span(rng, 0.0, w)) * 0.5;
    let max_life = rng.random_range(90.0..240.0);
    let (y, life) = match ctx.origin {
        Origin::Scatter => (span(rng, 0.0, h), rng.random_range(1.0..max_life)),
        Origin::Enter => (h + rng.random_range(0.0..6.0), max_life),
    };
    Ember {
        x: center,
        y,
        vx: rng.random_range(-0.3..0.3),
        vy: -rng.random_range(0.8..2.4),
        size: rng.random_range(0.8..2.2),
        opacity: rng.random_range(0.35..0.5),
        life,
        max_life,
        flicker: Oscillator::random(rng, 0.1..0.3, 0.2..0.6),
    }
}

pub fn step_ember(e: &mut Ember, tick: &mut Tick) -> Fate {
    e.flicker.advance(tick.step);
    e.vx += (tick.wind * 0.02 + e.flicker.value() * 0.04) * tick.step;
    // Rising embers lose heat and slow down.
    e.vy *= 0.997f64.powf(tick.step);
    e.x += e.vx * tick.step;
    e.y += e.vy * tick.step;
    e.life -= tick.step;

    if e.life <= 0.0 || outside(e.x, e.y, tick.bounds.width, tick.bounds.height, MARGIN) {
        Fate::Expired
    } else {
        Fate::Alive
    }
}

pub fn draw_ember(e: &Ember, pen: &mut Pen) {
    let age = 1.0 - (e.life / e.max_life).clamp(0.0, 1.0);
    let fade = life_fade(e.life, e.max_life, 0.12) * (0.75 + 0.25 * e.flicker.unit());
    let paint = pen.paint(pen.palette.ramp.sample(age), e.opacity, fade);
    if !paint.is_visible() {
        return;
    }
    pen.surface.fill_circle(e.x, e.y, e.size, paint);
    if age < 0.5 {
        let halo = pen.paint(pen.palette.ramp.sample(age), e.opacity * 0.35, fade);
        pen.surface.glow(e.x, e.y, e.size * 4.0, halo);
    }
}
