//! Per-kind generators, update rules and draw rules, dispatched on the
//! entity's tag.

mod bamboo;
mod desert;
mod fire;
mod firefly;
mod flake;
mod garden;
mod petal;
mod pond;
mod star;

use crate::engine::entity::{Body, Kind};
use crate::engine::scene::SpawnCtx;
use crate::engine::{Fate, Pen, Tick};

/// Generate one entity of `kind`. `None` when a placement-constrained kind
/// finds no free spot.
pub fn spawn(kind: Kind, ctx: &mut SpawnCtx) -> Option<Body> {
    match kind {
        Kind::Flake => Some(Body::Flake(flake::spawn(ctx))),
        Kind::Petal => Some(Body::Petal(petal::spawn_petal(ctx))),
        Kind::Leaf => Some(Body::Leaf(petal::spawn_leaf(ctx))),
        Kind::Firefly => Some(Body::Firefly(firefly::spawn(ctx))),
        Kind::Star => Some(Body::Star(star::spawn(ctx))),
        Kind::Koi => Some(Body::Koi(pond::spawn_koi(ctx))),
        Kind::Ripple => Some(Body::Ripple(pond::spawn_ripple(ctx))),
        Kind::Stone => garden::spawn_stone(ctx).map(Body::Stone),
        Kind::Rake => Some(Body::Rake(garden::spawn_rake(ctx))),
        Kind::Glow => Some(Body::Glow(fire::spawn_glow(ctx))),
        Kind::Ember => Some(Body::Ember(fire::spawn_ember(ctx))),
        Kind::Stalk => Some(Body::Stalk(bamboo::spawn(ctx))),
        Kind::Ridge => Some(Body::Ridge(desert::spawn_ridge(ctx))),
        Kind::Cactus => desert::spawn_cactus(ctx).map(Body::Cactus),
        Kind::Grain => Some(Body::Grain(desert::spawn_grain(ctx))),
    }
}

/// Advance one entity by one tick.
pub fn step(body: &mut Body, tick: &mut Tick) -> Fate {
    match body {
        Body::Flake(e) => flake::step(e, tick),
        Body::Petal(e) => petal::step_petal(e, tick),
        Body::Leaf(e) => petal::step_leaf(e, tick),
        Body::Firefly(e) => firefly::step(e, tick),
        Body::Star(e) => star::step(e, tick),
        Body::Koi(e) => pond::step_koi(e, tick),
        Body::Ripple(e) => pond::step_ripple(e, tick),
        Body::Stone(_) => Fate::Alive,
        Body::Rake(e) => garden::step_rake(e, tick),
        Body::Glow(e) => fire::step_glow(e, tick),
        Body::Ember(e) => fire::step_ember(e, tick),
        Body::Stalk(e) => bamboo::step(e, tick),
        Body::Ridge(e) => desert::step_ridge(e, tick),
        Body::Cactus(_) => Fate::Alive,
        Body::Grain(e) => desert::step_grain(e, tick),
    }
}

pub fn draw(body: &Body, pen: &mut Pen) {
    match body {
        Body::Flake(e) => flake::draw(e, pen),
        Body::Petal(e) => petal::draw_petal(e, pen),
        Body::Leaf(e) => petal::draw_leaf(e, pen),
        Body::Firefly(e) => firefly::draw(e, pen),
        Body::Star(e) => star::draw(e, pen),
        Body::Koi(e) => pond::draw_koi(e, pen),
        Body::Ripple(e) => pond::draw_ripple(e, pen),
        Body::Stone(e) => garden::draw_stone(e, pen),
        Body::Rake(e) => garden::draw_rake(e, pen),
        Body::Glow(e) => fire::draw_glow(e, pen),
        Body::Ember(e) => fire::draw_ember(e, pen),
        Body::Stalk(e) => bamboo::draw(e, pen),
        Body::Ridge(e) => desert::draw_ridge(e, pen),
        Body::Cactus(e) => desert::draw_cactus(e, pen),
        Body::Grain(e) => desert::draw_grain(e, pen),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::engine::palette::{ColorGradient, ColorStop, Palette, Rgb};
    use crate::engine::scene::{Bounds, Geometry, Origin, SpawnCtx};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const COLORS: &[Rgb] = &[
        Rgb(255, 255, 255),
        Rgb(200, 220, 255),
        Rgb(255, 180, 120),
        Rgb(120, 140, 160),
        Rgb(20, 20, 30),
        Rgb(240, 240, 230),
    ];
    const RAMP: &[ColorStop] = &[
        ColorStop { t: 0.0, color: Rgb(255, 240, 180) },
        ColorStop { t: 1.0, color: Rgb(120, 20, 0) },
    ];

    pub fn palette() -> Palette {
        Palette { background: Rgb(0, 0, 0), colors: COLORS, ramp: ColorGradient::new(RAMP) }
    }

    /// Owns everything a `SpawnCtx` or `Tick` borrows.
    pub struct Bench {
        pub bounds: Bounds,
        pub rng: StdRng,
        pub geometry: Geometry,
        pub wind: f64,
    }

    impl Bench {
        pub fn new(width: f64, height: f64) -> Self {
            Bench {
                bounds: Bounds::new(width, height),
                rng: StdRng::seed_from_u64(17),
                geometry: Geometry::default(),
                wind: 0.0,
            }
        }

        pub fn ctx(&mut self, origin: Origin) -> SpawnCtx<'_> {
            SpawnCtx {
                bounds: self.bounds,
                rng: &mut self.rng,
                geometry: &mut self.geometry,
                origin,
                slot: 0,
                population: 1,
                depth: 0,
                wind: self.wind,
            }
        }

        pub fn tick(&mut self) -> crate::engine::Tick<'_> {
            crate::engine::Tick {
                step: 1.0,
                bounds: self.bounds,
                wind: self.wind,
                rng: &mut self.rng,
            }
        }
    }
}
