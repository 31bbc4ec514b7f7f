use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::engine::entity::{Koi, Oscillator, Ripple, Wander};
use crate::engine::motion::outside;
use crate::engine::scene::{Origin, SpawnCtx, span};
use crate::engine::{Fate, Pen, Tick};
use rand::RngExt;

const BODY_SEGMENTS: usize = 7;

pub fn spawn_koi(ctx: &mut SpawnCtx) -> Koi {
    let (w, h) = (ctx.bounds.width, ctx.bounds.height);
    let rng = &mut *ctx.rng;
    let length = rng.random_range(26.0..44.0);
    let (x, y, heading) = match ctx.origin {
        Origin::Scatter => (span(rng, 0.0, w), span(rng, 0.0, h), rng.random_range(0.0..TAU)),
        Origin::Enter => {
            let jitter = rng.random_range(-0.5..0.5);
            match rng.random_range(0..4) {
                0 => (-length, span(rng, 0.0, h), jitter),
                1 => (w + length, span(rng, 0.0, h), PI + jitter),
                2 => (span(rng, 0.0, w), -length, FRAC_PI_2 + jitter),
                _ => (span(rng, 0.0, w), h + length, -FRAC_PI_2 + jitter),
            }
        }
    };
    Koi {
        x,
        y,
        heading,
        speed: rng.random_range(0.5..1.1),
        length,
        opacity: rng.random_range(0.35..0.5),
        variant: rng.random_range(0..3),
        wander: Wander::new(rng, 0.03, 0.05, 90),
        tail: Oscillator::random(rng, 0.12..0.22, 0.3..0.45),
    }
}

pub fn step_koi(k: &mut Koi, tick: &mut Tick) -> Fate {
    let turn = k.wander.advance(tick.rng);
    k.heading = (k.heading + turn * tick.step) % TAU;
    k.tail.advance(tick.step);
    // Each tail stroke gives a little push.
    let thrust = 1.0 + 0.25 * k.tail.value().abs();
    k.x += k.heading.cos() * k.speed * thrust * tick.step;
    k.y += k.heading.sin() * k.speed * thrust * tick.step;

    if outside(k.x, k.y, tick.bounds.width, tick.bounds.height, k.length * 2.0) {
        Fate::Expired
    } else {
        Fate::Alive
    }
}

/// Points along the spine from head to tail, bent by the tail oscillator.
fn spine(k: &Koi) -> [(f64, f64, f64); BODY_SEGMENTS] {
    let (c, s) = (k.heading.cos(), k.heading.sin());
    let mut points = [(0.0, 0.0, 0.0); BODY_SEGMENTS];
    for (i, point) in points.iter_mut().enumerate() {
        let t = i as f64 / (BODY_SEGMENTS - 1) as f64;
        let back = t * k.length;
        let bend = (k.tail.phase - t * 2.2).sin() * k.tail.amplitude * t * k.length * 0.3;
        let x = k.x - c * back - s * bend;
        let y = k.y - s * back + c * bend;
        let radius = k.length * 0.17 * (1.0 - t * 0.75);
        *point = (x, y, radius);
    }
    points
}

pub fn draw_koi(k: &Koi, pen: &mut Pen) {
    let body = pen.shade(k.variant, k.opacity, 1.0);
    if !body.is_visible() {
        return;
    }
    let shadow = pen.shade(4, k.opacity * 0.4, 1.0);
    let points = spine(k);
    for &(x, y, r) in &points {
        pen.surface.fill_circle(x + 3.0, y + 4.0, r, shadow);
    }
    for &(x, y, r) in &points {
        pen.surface.fill_circle(x, y, r, body);
    }

    // Pectoral fins just behind the head, tail fin at the end of the spine.
    let fin = pen.shade(3, k.opacity * 0.8, 1.0);
    let (hx, hy, hr) = points[1];
    let (c, s) = (k.heading.cos(), k.heading.sin());
    let flap = 1.0 + 0.3 * k.tail.value();
    for side in [-1.0, 1.0] {
        let fx = hx - s * side * hr * 1.6 * flap;
        let fy = hy + c * side * hr * 1.6 * flap;
        pen.surface.line(hx, hy, fx - c * hr, fy - s * hr, hr * 0.5, fin);
    }
    let (tx, ty, _) = points[BODY_SEGMENTS - 1];
    let sweep = k.tail.value();
    let spread = k.length * 0.18;
    for side in [-1.0, 1.0] {
        let a = k.heading + PI + side * 0.5 + sweep;
        pen.surface.line(tx, ty, tx + a.cos() * spread, ty + a.sin() * spread, spread * 0.3, fin);
    }
}

pub fn spawn_ripple(ctx: &mut SpawnCtx) -> Ripple {
    let (w, h) = (ctx.bounds.width, ctx.bounds.height);
    let rng = &mut *ctx.rng;
    let max_radius = rng.random_range(30.0..80.0);
    let radius = match ctx.origin {
        // Staggered so the initial scene does not pulse in unison.
        Origin::Scatter => rng.random_range(0.0..max_radius * 0.9),
        Origin::Enter => 0.0,
    };
    Ripple {
        x: span(rng, 0.0, w),
        y: span(rng, 0.0, h),
        radius,
        max_radius,
        growth: rng.random_range(0.15..0.4),
        opacity: rng.random_range(0.2..0.35),
    }
}

pub fn step_ripple(r: &mut Ripple, tick: &mut Tick) -> Fate {
    r.radius += r.growth * tick.step;
    if r.radius >= r.max_radius {
        Fate::Expired
    } else {
        Fate::Alive
    }
}

pub fn draw_ripple(r: &Ripple, pen: &mut Pen) {
    let fade = 1.0 - (r.radius / r.max_radius).clamp(0.0, 1.0);
    let paint = pen.shade(5, r.opacity, fade);
    if !paint.is_visible() {
        return;
    }
    pen.surface.ring(r.x, r.y, r.radius, 1.0, paint);
    if r.radius > 12.0 {
        let inner = pen.shade(5, r.opacity * 0.5, fade);
        pen.surface.ring(r.x, r.y, r.radius - 8.0, 1.0, inner);
    }
}
