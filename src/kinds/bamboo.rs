use crate::engine::entity::{Oscillator, Stalk};
use crate::engine::motion::parallax_size;
use crate::engine::scene::{SpawnCtx, span};
use crate::engine::{Fate, Pen, Tick};
use rand::RngExt;

/// Deepest layer index used by bamboo themes; maps layer depth onto z.
const FRONT_DEPTH: f64 = 3.0;

pub fn spawn(ctx: &mut SpawnCtx) -> Stalk {
    let (w, h) = (ctx.bounds.width, ctx.bounds.height);
    let z = (ctx.depth as f64 / FRONT_DEPTH).clamp(0.1, 1.0);
    let rng = &mut *ctx.rng;
    // Even spacing with jitter so stalks neither clump nor line up.
    let cell = w / ctx.population.max(1) as f64;
    let x = (ctx.slot as f64 + rng.random_range(0.15..0.85)) * cell;
    Stalk {
        x: x.clamp(0.0, w),
        base: h + span(rng, 0.0, 12.0),
        height: h * rng.random_range(0.55..1.15) * (0.6 + 0.4 * z),
        width: parallax_size(rng.random_range(3.0..6.0), z),
        z,
        nodes: rng.random_range(4..9),
        opacity: rng.random_range(0.3..0.45),
        shade: (ctx.depth as usize).saturating_sub(1).min(2),
        sway: Oscillator::random(rng, 0.008..0.02, 0.01..0.035),
    }
}

pub fn step(s: &mut Stalk, tick: &mut Tick) -> Fate {
    s.sway.advance(tick.step);
    Fate::Alive
}

/// Joint positions from base to tip. Bend grows toward the tip.
fn joints(s: &Stalk, wind: f64) -> Vec<(f64, f64)> {
    let lean = s.sway.value() + wind * 0.04 * (0.5 + s.z);
    let nodes = s.nodes.max(1) as usize;
    let segment = s.height / nodes as f64;
    let mut points = Vec::with_capacity(nodes + 1);
    let (mut x, mut y) = (s.x, s.base);
    points.push((x, y));
    for i in 1..=nodes {
        let t = i as f64 / nodes as f64;
        let angle = lean * t.powf(1.5);
        x += angle.sin() * segment;
        y -= angle.cos() * segment;
        points.push((x, y));
    }
    points
}

pub fn draw(s: &Stalk, pen: &mut Pen) {
    let fade = 0.55 + 0.45 * s.z;
    let stem = pen.shade(s.shade, s.opacity, fade);
    if !stem.is_visible() {
        return;
    }
    let points = joints(s, pen.wind);
    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        pen.surface.line(x0, y0, x1, y1, s.width, stem);
    }

    let node = pen.shade(5, s.opacity, fade);
    for &(x, y) in &points[1..points.len() - 1] {
        pen.surface.fill_rect(x - s.width * 0.6, y - 1.0, s.width * 1.2, 2.0, node);
    }

    let leaf = pen.shade(3, s.opacity, fade);
    let reach = s.width * 5.0;
    for (i, &(x, y)) in points.iter().enumerate().skip(points.len() / 2) {
        let side = if i % 2 == 0 { 1.0 } else { -1.0 };
        // Leaves hang slightly below horizontal and flutter with time.
        let droop = 0.35 + 0.15 * (pen.time * 1.5 + i as f64).sin();
        let (tx, ty) = (x + side * droop.cos() * reach, y + droop.sin() * reach);
        pen.surface.line(x, y, tx, ty, s.width * 0.6, leaf);
    }
}
