use crate::engine::entity::{Flake, Oscillator};
use crate::engine::motion::{outside, parallax_size, parallax_speed};
use crate::engine::scene::{Origin, SpawnCtx, span};
use crate::engine::{Fate, Pen, Tick};
use rand::RngExt;

const MARGIN: f64 = 12.0;

pub fn spawn(ctx: &mut SpawnCtx) -> Flake {
    let rng = &mut *ctx.rng;
    let (w, h) = (ctx.bounds.width, ctx.bounds.height);
    let y = match ctx.origin {
        Origin::Scatter => span(rng, 0.0, h),
        Origin::Enter => -rng.random_range(2.0..MARGIN),
    };
    Flake {
        x: span(rng, 0.0, w),
        y,
        z: rng.random_range(0.05..=1.0),
        speed: rng.random_range(0.4..1.2),
        size: rng.random_range(1.2..2.6),
        opacity: rng.random_range(0.3..0.5),
        sway: Oscillator::random(rng, 0.01..0.04, 0.2..0.8),
    }
}

pub fn step(f: &mut Flake, tick: &mut Tick) -> Fate {
    let w = tick.bounds.width;
    f.sway.advance(tick.step);
    f.y += parallax_speed(f.speed, f.z) * tick.step;
    f.x += (f.sway.value() + tick.wind * (0.4 + f.z * 0.6)) * tick.step;

    // Horizontal drift wraps; only falling out the bottom recycles.
    if w > 0.0 {
        if f.x < -MARGIN {
            f.x += w + 2.0 * MARGIN;
        } else if f.x > w + MARGIN {
            f.x -= w + 2.0 * MARGIN;
        }
    }
    if f.y > tick.bounds.height + MARGIN || outside(f.x, f.y, w, tick.bounds.height, MARGIN * 4.0) {
        return Fate::Expired;
    }
    Fate::Alive
}

pub fn draw(f: &Flake, pen: &mut Pen) {
    let radius = parallax_size(f.size, f.z);
    // Far flakes are dimmer as well as smaller.
    let depth_fade = 0.35 + 0.65 * f.z;
    let paint = pen.shade(0, f.opacity, depth_fade);
    if !paint.is_visible() {
        return;
    }
    pen.surface.fill_circle(f.x, f.y, radius, paint);
    if f.z > 0.75 {
        let halo = pen.shade(1, f.opacity * 0.3, depth_fade);
        pen.surface.glow(f.x, f.y, radius * 2.5, halo);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::surface::recording::{Op, RecordingSurface};
    use crate::kinds::testing::{Bench, palette};

    fn still(z: f64) -> Flake {
        Flake {
            x: 100.0,
            y: 100.0,
            z,
            speed: 1.0,
            size: 2.0,
            opacity: 0.4,
            sway: Oscillator { phase: 0.0, speed: 0.0, amplitude: 0.0 },
        }
    }

    #[test]
    fn test_near_flake_moves_and_renders_larger() {
        let mut bench = Bench::new(400.0, 400.0);
        let mut near = still(1.0);
        let mut far = still(0.1);
        {
            let mut tick = bench.tick();
            step(&mut near, &mut tick);
            step(&mut far, &mut tick);
        }
        assert!((near.y - 101.2).abs() < 1e-9);
        assert!((far.y - 100.66).abs() < 1e-9);

        let palette = palette();
        let mut surface = RecordingSurface::new(400.0, 400.0);
        let mut pen = Pen {
            surface: &mut surface,
            palette: &palette,
            opacity: 50.0,
            time: 0.0,
            wind: 0.0,
            bounds: bench.bounds,
            geometry: &bench.geometry,
        };
        draw(&near, &mut pen);
        draw(&far, &mut pen);
        let radii: Vec<f64> = surface
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Circle { r, .. } => Some(*r),
                _ => None,
            })
            .collect();
        assert!((radii[0] - 3.6).abs() < 1e-9);
        assert!((radii[1] - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_flake_below_bottom_expires() {
        let mut bench = Bench::new(400.0, 400.0);
        let mut f = still(0.5);
        f.y = 400.0 + MARGIN + 1.0;
        assert_eq!(step(&mut f, &mut bench.tick()), Fate::Expired);
    }

    #[test]
    fn test_recycled_flake_enters_from_top() {
        let mut bench = Bench::new(400.0, 400.0);
        for _ in 0..50 {
            let f = spawn(&mut bench.ctx(Origin::Enter));
            assert!(f.y < 0.0 && f.y >= -MARGIN);
            assert!((0.0..=400.0).contains(&f.x));
        }
    }
}
