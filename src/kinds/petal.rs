use crate::engine::entity::{Leaf, Oscillator, Petal};
use crate::engine::motion::{ease, outside};
use crate::engine::scene::{Origin, SpawnCtx, span};
use crate::engine::{Fate, Pen, Tick};
use rand::RngExt;

const MARGIN: f64 = 24.0;

/// Share of recycled entities that blow in from the upwind side rather than
/// dropping in from the top.
const SIDE_ENTRY: f64 = 0.3;

/// Entry point for tumbling things: anywhere when scattering; when recycling,
/// just above the top edge or, with wind, just past the upwind side edge.
/// Entry points stay inside the recycle margin.
fn entry(ctx: &mut SpawnCtx) -> (f64, f64) {
    let (w, h) = (ctx.bounds.width, ctx.bounds.height);
    match ctx.origin {
        Origin::Scatter => (span(ctx.rng, 0.0, w), span(ctx.rng, 0.0, h)),
        Origin::Enter => {
            if ctx.wind != 0.0 && ctx.rng.random_range(0.0..1.0) < SIDE_ENTRY {
                let x = if ctx.wind > 0.0 { -MARGIN * 0.5 } else { w + MARGIN * 0.5 };
                (x, span(ctx.rng, 0.0, h))
            } else {
                (span(ctx.rng, 0.0, w), -ctx.rng.random_range(4.0..MARGIN * 0.5))
            }
        }
    }
}

pub fn spawn_petal(ctx: &mut SpawnCtx) -> Petal {
    let (x, y) = entry(ctx);
    let rng = &mut *ctx.rng;
    Petal {
        x,
        y,
        vx: rng.random_range(-0.5..0.5),
        vy: rng.random_range(0.5..1.1),
        rotation: rng.random_range(0.0..std::f64::consts::TAU),
        spin: rng.random_range(-0.06..0.06),
        size: rng.random_range(3.0..6.0),
        opacity: rng.random_range(0.3..0.5),
        shade: rng.random_range(0..4),
        flutter: Oscillator::random(rng, 0.04..0.1, 0.3..1.0),
    }
}

pub fn step_petal(p: &mut Petal, tick: &mut Tick) -> Fate {
    p.flutter.advance(tick.step);
    p.rotation += p.spin * tick.step;
    let rate = (0.05 * tick.step).min(1.0);
    p.vx = ease(p.vx, tick.wind + p.flutter.value(), rate);
    // Falling slows while the petal is broadside to its motion.
    let fall = 0.6 + 0.4 * p.flutter.phase.cos().abs();
    p.vy = ease(p.vy, fall, rate * 0.5);
    p.x += p.vx * tick.step;
    p.y += p.vy * tick.step;

    if outside(p.x, p.y, tick.bounds.width, tick.bounds.height, MARGIN) {
        Fate::Expired
    } else {
        Fate::Alive
    }
}

pub fn draw_petal(p: &Petal, pen: &mut Pen) {
    let face = p.rotation.cos().abs();
    let paint = pen.shade(p.shade, p.opacity, 0.55 + 0.45 * face);
    if !paint.is_visible() {
        return;
    }
    let r = p.size * (0.45 + 0.55 * face);
    let (dx, dy) = (p.rotation.cos() * r * 0.6, p.rotation.sin() * r * 0.6);
    pen.surface.fill_circle(p.x - dx * 0.5, p.y - dy * 0.5, r * 0.7, paint);
    pen.surface.fill_circle(p.x + dx * 0.5, p.y + dy * 0.5, r * 0.5, paint);
}

pub fn spawn_leaf(ctx: &mut SpawnCtx) -> Leaf {
    let (x, y) = entry(ctx);
    let rng = &mut *ctx.rng;
    Leaf {
        x,
        y,
        vx: rng.random_range(-0.3..0.3),
        vy: rng.random_range(0.3..0.7),
        rotation: rng.random_range(0.0..std::f64::consts::TAU),
        spin: rng.random_range(-0.04..0.04),
        size: rng.random_range(5.0..10.0),
        opacity: rng.random_range(0.25..0.45),
        shade: rng.random_range(3..5),
        flutter: Oscillator::random(rng, 0.02..0.06, 0.5..1.4),
    }
}

pub fn step_leaf(l: &mut Leaf, tick: &mut Tick) -> Fate {
    l.flutter.advance(tick.step);
    l.rotation += (l.spin + l.flutter.value() * 0.01) * tick.step;
    let rate = (0.03 * tick.step).min(1.0);
    l.vx = ease(l.vx, tick.wind * 0.8 + l.flutter.value(), rate);
    l.vy = ease(l.vy, 0.45, rate);
    l.x += l.vx * tick.step;
    l.y += l.vy * tick.step;

    if outside(l.x, l.y, tick.bounds.width, tick.bounds.height, MARGIN) {
        Fate::Expired
    } else {
        Fate::Alive
    }
}

pub fn draw_leaf(l: &Leaf, pen: &mut Pen) {
    let paint = pen.shade(l.shade, l.opacity, 1.0);
    if !paint.is_visible() {
        return;
    }
    let (c, s) = (l.rotation.cos(), l.rotation.sin());
    let half = l.size * 0.5;
    pen.surface.line(l.x - c * half, l.y - s * half, l.x + c * half, l.y + s * half, l.size * 0.35, paint);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::testing::Bench;

    #[test]
    fn test_scattered_petals_start_in_view() {
        let mut bench = Bench::new(640.0, 480.0);
        for _ in 0..100 {
            let p = spawn_petal(&mut bench.ctx(Origin::Scatter));
            assert!(bench.bounds.contains(p.x, p.y));
            assert!(p.shade < 4);
        }
    }

    #[test]
    fn test_recycled_entities_survive_their_first_step() {
        let mut bench = Bench::new(1280.0, 720.0);
        for wind in [1.0, -1.0] {
            bench.wind = wind;
            let mut from_side = 0;
            for _ in 0..500 {
                let mut p = spawn_petal(&mut bench.ctx(Origin::Enter));
                if p.y >= 0.0 {
                    from_side += 1;
                    assert!(if wind > 0.0 { p.x < 0.0 } else { p.x > 1280.0 });
                }
                assert_eq!(step_petal(&mut p, &mut bench.tick()), Fate::Alive);
                let mut l = spawn_leaf(&mut bench.ctx(Origin::Enter));
                assert_eq!(step_leaf(&mut l, &mut bench.tick()), Fate::Alive);
            }
            assert!(from_side > 0);
        }
    }

    #[test]
    fn test_calm_recycle_drops_in_from_top() {
        let mut bench = Bench::new(640.0, 480.0);
        for _ in 0..100 {
            let p = spawn_petal(&mut bench.ctx(Origin::Enter));
            assert!(p.y < 0.0 && p.y >= -MARGIN);
            assert!((0.0..=640.0).contains(&p.x));
        }
    }

    #[test]
    fn test_petal_drifting_out_expires() {
        let mut bench = Bench::new(640.0, 480.0);
        let mut p = spawn_petal(&mut bench.ctx(Origin::Scatter));
        p.x = 640.0 + MARGIN + 5.0;
        assert_eq!(step_petal(&mut p, &mut bench.tick()), Fate::Expired);
    }

    #[test]
    fn test_leaf_keeps_falling() {
        let mut bench = Bench::new(640.0, 480.0);
        let mut l = spawn_leaf(&mut bench.ctx(Origin::Scatter));
        l.y = 10.0;
        let start = l.y;
        for _ in 0..120 {
            step_leaf(&mut l, &mut bench.tick());
        }
        assert!(l.y > start);
    }
}
