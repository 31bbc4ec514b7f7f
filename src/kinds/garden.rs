use crate::engine::entity::{Oscillator, Rake, Stone};
use crate::engine::scene::{PLACEMENT_ATTEMPTS, SpawnCtx, Zone, place_clear, span};
use crate::engine::{Fate, Pen, Tick};
use rand::RngExt;

/// Width of the raked rings around each stone; rake lines stay outside it.
const RING_BAND: f64 = 26.0;
const RING_SPACING: f64 = 8.0;
/// Minimum gap between neighbouring ring bands.
const STONE_GAP: f64 = 10.0;
const RAKE_SEGMENT: f64 = 6.0;

/// Place a stone clear of every earlier stone's rings. `None` when the
/// garden is too crowded to find a spot within the attempt budget.
pub fn spawn_stone(ctx: &mut SpawnCtx) -> Option<Stone> {
    let (w, h) = (ctx.bounds.width, ctx.bounds.height);
    let radius = ctx.rng.random_range(16.0..38.0);
    let edge = radius + RING_BAND * 0.5;
    let (x, y) = place_clear(ctx.rng, ctx.geometry, PLACEMENT_ATTEMPTS, radius + RING_BAND + STONE_GAP, |rng| {
        (span(rng, edge, w - edge), span(rng, edge, h - edge))
    })?;
    ctx.geometry.zones.push(Zone { x, y, radius: radius + RING_BAND });
    Some(Stone {
        x,
        y,
        radius,
        opacity: ctx.rng.random_range(0.4..0.5),
        shade: ctx.rng.random_range(0..3),
    })
}

pub fn draw_stone(s: &Stone, pen: &mut Pen) {
    let body = pen.shade(s.shade, s.opacity, 1.0);
    if !body.is_visible() {
        return;
    }
    let rings = pen.shade(3, s.opacity * 0.6, 1.0);
    let mut r = s.radius + RING_SPACING;
    while r <= s.radius + RING_BAND {
        pen.surface.ring(s.x, s.y, r, 1.0, rings);
        r += RING_SPACING;
    }
    let shadow = pen.shade(4, s.opacity * 0.5, 1.0);
    pen.surface.fill_circle(s.x + s.radius * 0.15, s.y + s.radius * 0.2, s.radius, shadow);
    pen.surface.fill_circle(s.x, s.y, s.radius, body);
    let highlight = pen.shade(5, s.opacity * 0.5, 1.0);
    pen.surface.fill_circle(s.x - s.radius * 0.3, s.y - s.radius * 0.35, s.radius * 0.35, highlight);
}

pub fn spawn_rake(ctx: &mut SpawnCtx) -> Rake {
    let h = ctx.bounds.height;
    let spacing = h / ctx.population.max(1) as f64;
    Rake {
        y: (ctx.slot as f64 + 0.5) * spacing,
        opacity: ctx.rng.random_range(0.3..0.4),
        wave: Oscillator::random(ctx.rng, 0.003..0.008, 1.5..3.0),
    }
}

pub fn step_rake(r: &mut Rake, tick: &mut Tick) -> Fate {
    r.wave.advance(tick.step);
    Fate::Alive
}

/// Height of a rake groove at `x`.
fn groove_y(r: &Rake, x: f64) -> f64 {
    r.y + (x * 0.015 + r.wave.phase).sin() * r.wave.amplitude
}

pub fn draw_rake(r: &Rake, pen: &mut Pen) {
    let paint = pen.shade(3, r.opacity, 1.0);
    if !paint.is_visible() {
        return;
    }
    let width = pen.bounds.width;
    let mut x = 0.0;
    while x < width {
        let x1 = (x + RAKE_SEGMENT).min(width);
        let (y0, y1) = (groove_y(r, x), groove_y(r, x1));
        let (mx, my) = ((x + x1) * 0.5, (y0 + y1) * 0.5);
        if pen.geometry.is_clear(mx, my, 0.0) {
            pen.surface.line(x, y0, x1, y1, 1.0, paint);
        }
        x = x1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scene::Origin;
    use crate::engine::surface::recording::{Op, RecordingSurface};
    use crate::kinds::testing::{Bench, palette};

    #[test]
    fn test_stones_never_overlap_rings() {
        let mut bench = Bench::new(1200.0, 800.0);
        let stones: Vec<Stone> = (0..12).filter_map(|_| spawn_stone(&mut bench.ctx(Origin::Scatter))).collect();
        assert!(!stones.is_empty());
        for (i, a) in stones.iter().enumerate() {
            for b in &stones[i + 1..] {
                let d = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
                assert!(d >= a.radius + b.radius + 2.0 * RING_BAND);
            }
        }
        assert_eq!(bench.geometry.zones.len(), stones.len());
    }

    #[test]
    fn test_crowded_garden_skips_stones() {
        let mut bench = Bench::new(150.0, 150.0);
        let placed = (0..20).filter_map(|_| spawn_stone(&mut bench.ctx(Origin::Scatter))).count();
        assert!(placed < 20);
        assert!(placed >= 1);
    }

    #[test]
    fn test_rake_skips_stone_zones() {
        let mut bench = Bench::new(300.0, 100.0);
        let rake = Rake { y: 50.0, opacity: 0.4, wave: Oscillator { phase: 0.0, speed: 0.0, amplitude: 0.0 } };
        let palette = palette();

        let count_lines = |geometry: &crate::engine::scene::Geometry| {
            let mut surface = RecordingSurface::new(300.0, 100.0);
            let mut pen = Pen {
                surface: &mut surface,
                palette: &palette,
                opacity: 50.0,
                time: 0.0,
                wind: 0.0,
                bounds: bench.bounds,
                geometry,
            };
            draw_rake(&rake, &mut pen);
            surface.ops.iter().filter(|op| matches!(op, Op::Line { .. })).count()
        };

        let open = count_lines(&bench.geometry);
        bench.geometry.zones.push(Zone { x: 150.0, y: 50.0, radius: 40.0 });
        let blocked = count_lines(&bench.geometry);
        assert_eq!(open, 50);
        assert!(blocked < open);
    }

    #[test]
    fn test_rakes_spread_evenly() {
        let mut bench = Bench::new(300.0, 280.0);
        let mut ctx = bench.ctx(Origin::Scatter);
        ctx.population = 10;
        ctx.slot = 3;
        let r = spawn_rake(&mut ctx);
        assert_eq!(r.y, 98.0);
    }
}
