use crate::engine::entity::{Cactus, Grain, Oscillator, Ridge};
use crate::engine::motion::{life_fade, outside};
use crate::engine::scene::{Origin, PLACEMENT_ATTEMPTS, SpawnCtx, Zone, place_clear, span};
use crate::engine::{Fate, Pen, Tick};
use noise::{NoiseFn, Perlin};
use rand::RngExt;

/// Horizontal spacing of ridge profile samples.
const RIDGE_STEP: f64 = 8.0;
/// Baseline of each ridge as a fraction of height, back to front.
const RIDGE_BASE: [f64; 3] = [0.55, 0.68, 0.8];
const RIDGE_AMPLITUDE: [f64; 3] = [0.09, 0.07, 0.05];
const CACTUS_GAP: f64 = 30.0;
const GRAIN_MARGIN: f64 = 16.0;

/// One sand ridge with a Perlin profile. The frontmost ridge publishes its
/// profile as the scene horizon so later layers can stand on it.
pub fn spawn_ridge(ctx: &mut SpawnCtx) -> Ridge {
    let (w, h) = (ctx.bounds.width, ctx.bounds.height);
    let band = ctx.slot.min(RIDGE_BASE.len() - 1);
    let perlin = Perlin::new(ctx.geometry.noise_seed.wrapping_add(ctx.slot as u32));
    let samples = (w / RIDGE_STEP).ceil() as usize + 2;
    let freq = 0.004 + 0.002 * band as f64;
    let profile: Vec<f64> = (0..samples)
        .map(|i| {
            let x = i as f64 * RIDGE_STEP;
            let n = perlin.get([x * freq, band as f64 * 7.3]) + 0.5 * perlin.get([x * freq * 2.3, band as f64 * 3.1]);
            h * (RIDGE_BASE[band] + RIDGE_AMPLITUDE[band] * n / 1.5)
        })
        .collect();

    if ctx.slot + 1 == ctx.population {
        ctx.geometry.horizon = profile.clone();
        ctx.geometry.horizon_step = RIDGE_STEP;
    }
    Ridge {
        profile,
        step: RIDGE_STEP,
        opacity: 0.45 + 0.05 * band as f64,
        shade: band,
        shimmer: Oscillator::random(ctx.rng, 0.01..0.02, 0.5..1.0),
    }
}

pub fn step_ridge(r: &mut Ridge, tick: &mut Tick) -> Fate {
    r.shimmer.advance(tick.step);
    Fate::Alive
}

pub fn draw_ridge(r: &Ridge, pen: &mut Pen) {
    let body = pen.shade(r.shade, r.opacity, 1.0);
    if !body.is_visible() {
        return;
    }
    pen.surface.fill_below(&r.profile, r.step, body);
    // Light catching the crest.
    let crest = pen.shade(5, r.opacity * 0.4, 0.6 + 0.4 * r.shimmer.unit());
    for (i, pair) in r.profile.windows(2).enumerate() {
        let x0 = i as f64 * r.step;
        pen.surface.line(x0, pair[0], x0 + r.step, pair[1], 1.0, crest);
    }
}

/// Stand a cactus on the front ridge, clear of earlier cacti.
pub fn spawn_cactus(ctx: &mut SpawnCtx) -> Option<Cactus> {
    let (w, h) = (ctx.bounds.width, ctx.bounds.height);
    let height = ctx.rng.random_range(28.0..64.0);
    let ground = &*ctx.geometry;
    let (x, base) = place_clear(ctx.rng, ground, PLACEMENT_ATTEMPTS, CACTUS_GAP, |rng| {
        let x = span(rng, 12.0, w - 12.0);
        (x, ground.ground_at(x).unwrap_or(h * RIDGE_BASE[2]))
    })?;
    ctx.geometry.zones.push(Zone { x, y: base, radius: height * 0.5 });
    Some(Cactus {
        x,
        base: base + 2.0,
        height,
        arms: ctx.rng.random_range(0..3),
        opacity: ctx.rng.random_range(0.4..0.5),
    })
}

pub fn draw_cactus(c: &Cactus, pen: &mut Pen) {
    let paint = pen.shade(4, c.opacity, 1.0);
    if !paint.is_visible() {
        return;
    }
    let trunk = (c.height * 0.16).max(2.0);
    let top = c.base - c.height;
    pen.surface.line(c.x, c.base, c.x, top + trunk * 0.5, trunk, paint);
    pen.surface.fill_circle(c.x, top + trunk * 0.5, trunk * 0.5, paint);
    for arm in 0..c.arms {
        let side = if arm == 0 { -1.0 } else { 1.0 };
        let elbow_y = c.base - c.height * (0.45 + 0.15 * arm as f64);
        let reach = c.x + side * c.height * 0.28;
        let arm_w = trunk * 0.7;
        pen.surface.line(c.x, elbow_y, reach, elbow_y, arm_w, paint);
        pen.surface.line(reach, elbow_y, reach, elbow_y - c.height * 0.3, arm_w, paint);
        pen.surface.fill_circle(reach, elbow_y - c.height * 0.3, arm_w * 0.5, paint);
    }
}

/// Sand grains blow in from the upwind edge.
pub fn spawn_grain(ctx: &mut SpawnCtx) -> Grain {
    let (w, h) = (ctx.bounds.width, ctx.bounds.height);
    let wind = ctx.wind;
    let rng = &mut *ctx.rng;
    let max_life = rng.random_range(120.0..300.0);
    let x = match ctx.origin {
        Origin::Scatter => span(rng, 0.0, w),
        Origin::Enter if wind >= 0.0 => -rng.random_range(0.0..GRAIN_MARGIN * 0.5),
        Origin::Enter => w + rng.random_range(0.0..GRAIN_MARGIN * 0.5),
    };
    let life = match ctx.origin {
        Origin::Scatter => rng.random_range(1.0..max_life),
        Origin::Enter => max_life,
    };
    let drift = if wind >= 0.0 { 1.0 } else { -1.0 };
    Grain {
        x,
        y: span(rng, h * 0.45, h),
        vx: drift * rng.random_range(0.8..2.4),
        vy: rng.random_range(-0.15..0.1),
        size: rng.random_range(0.6..1.4),
        opacity: rng.random_range(0.3..0.5),
        life,
        max_life,
        bob: Oscillator::random(rng, 0.05..0.15, 0.2..0.6),
    }
}

pub fn step_grain(g: &mut Grain, tick: &mut Tick) -> Fate {
    g.bob.advance(tick.step);
    g.x += (g.vx + tick.wind * 0.5) * tick.step;
    g.y += (g.vy + g.bob.value() * 0.3) * tick.step;
    g.life -= tick.step;
    if g.life <= 0.0 || outside(g.x, g.y, tick.bounds.width, tick.bounds.height, GRAIN_MARGIN) {
        Fate::Expired
    } else {
        Fate::Alive
    }
}

pub fn draw_grain(g: &Grain, pen: &mut Pen) {
    let paint = pen.shade(3, g.opacity, life_fade(g.life, g.max_life, 0.15));
    if paint.is_visible() {
        pen.surface.fill_circle(g.x, g.y, g.size, paint);
    }
}
