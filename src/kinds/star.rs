use crate::engine::entity::{Oscillator, Star};
use crate::engine::motion::{parallax_size, parallax_speed};
use crate::engine::scene::{Origin, SpawnCtx, span};
use crate::engine::{Fate, Pen, Tick};
use rand::RngExt;

const MARGIN: f64 = 6.0;

pub fn spawn(ctx: &mut SpawnCtx) -> Star {
    let (w, h) = (ctx.bounds.width, ctx.bounds.height);
    let rng = &mut *ctx.rng;
    let x = match ctx.origin {
        Origin::Scatter => span(rng, 0.0, w),
        Origin::Enter => -rng.random_range(0.0..MARGIN),
    };
    Star {
        x,
        y: span(rng, 0.0, h),
        // Skewed toward the far field so most stars are small and slow.
        z: rng.random_range(0.0f64..1.0).powi(2),
        speed: rng.random_range(0.05..0.2),
        size: rng.random_range(0.8..1.6),
        opacity: rng.random_range(0.25..0.5),
        twinkle: Oscillator::random(rng, 0.02..0.08, 1.0..1.5),
    }
}

pub fn step(s: &mut Star, tick: &mut Tick) -> Fate {
    s.twinkle.advance(tick.step);
    s.x += parallax_speed(s.speed, s.z) * tick.step;
    if s.x > tick.bounds.width + MARGIN {
        return Fate::Expired;
    }
    Fate::Alive
}

pub fn draw(s: &Star, pen: &mut Pen) {
    let twinkle = 0.45 + 0.55 * s.twinkle.unit();
    let paint = pen.shade(if s.z > 0.6 { 1 } else { 0 }, s.opacity, twinkle);
    if !paint.is_visible() {
        return;
    }
    let radius = parallax_size(s.size, s.z);
    pen.surface.fill_circle(s.x, s.y, radius, paint);
    if s.z > 0.8 && twinkle > 0.9 {
        // Diffraction spikes on the brightest near stars.
        let arm = radius * 4.0;
        let spike = pen.shade(1, s.opacity * 0.5, twinkle);
        pen.surface.line(s.x - arm, s.y, s.x + arm, s.y, 0.5, spike);
        pen.surface.line(s.x, s.y - arm, s.x, s.y + arm, 0.5, spike);
    }
}
