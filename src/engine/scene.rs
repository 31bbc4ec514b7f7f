//! Scene state shared by every theme, plus the population rule that sizes
//! each layer from the view.

use rand::RngExt;
use rand::rngs::StdRng;

use super::entity::{Entity, EntityId, Kind};

/// Default bound on proposals when placing an entity clear of others.
pub const PLACEMENT_ATTEMPTS: usize = 50;

/// Logical view size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        let clean = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Bounds { width: clean(width), height: clean(height) }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    #[cfg(test)]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }
}

/// A disc other entities must keep out of.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl Zone {
    pub fn contains(&self, x: f64, y: f64, pad: f64) -> bool {
        let r = self.radius + pad;
        (x - self.x).powi(2) + (y - self.y).powi(2) < r * r
    }
}

/// Geometry derived while generating a scene and shared between kinds.
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    /// Exclusion discs registered by placed entities.
    pub zones: Vec<Zone>,
    /// Front terrain profile: surface y sampled every `horizon_step` px.
    pub horizon: Vec<f64>,
    pub horizon_step: f64,
    /// Seed for procedural noise, fixed per generation.
    pub noise_seed: u32,
}

impl Geometry {
    /// Terrain surface height at `x`, linearly interpolated; `None` without a horizon.
    pub fn ground_at(&self, x: f64) -> Option<f64> {
        if self.horizon.is_empty() || self.horizon_step <= 0.0 {
            return None;
        }
        let pos = (x / self.horizon_step).max(0.0);
        let i = (pos.floor() as usize).min(self.horizon.len() - 1);
        let j = (i + 1).min(self.horizon.len() - 1);
        let t = (pos - i as f64).clamp(0.0, 1.0);
        Some(self.horizon[i] + (self.horizon[j] - self.horizon[i]) * t)
    }

    pub fn is_clear(&self, x: f64, y: f64, pad: f64) -> bool {
        self.zones.iter().all(|z| !z.contains(x, y, pad))
    }
}

/// How many entities a layer holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Density {
    /// `max(min, floor(width * height / divisor * scale))`
    Area { divisor: f64, min: usize },
    /// `max(min, floor(width / divisor * scale))`
    Width { divisor: f64, min: usize },
    /// `max(min, floor(height / divisor * scale))`
    Height { divisor: f64, min: usize },
    Fixed(usize),
    /// Starts empty; emits `rate` entities per nominal frame, never more than `cap` alive.
    Spawned { rate: f64, cap: usize },
}

impl Density {
    /// Population at generation time for the given view and density scale.
    pub fn population(&self, bounds: Bounds, scale: f64) -> usize {
        let scaled = |measure: f64, divisor: f64, min: usize| {
            if divisor <= 0.0 {
                return min;
            }
            ((measure / divisor * scale).floor() as usize).max(min)
        };
        match *self {
            Density::Area { divisor, min } => scaled(bounds.area(), divisor, min),
            Density::Width { divisor, min } => scaled(bounds.width, divisor, min),
            Density::Height { divisor, min } => scaled(bounds.height, divisor, min),
            Density::Fixed(n) => n,
            Density::Spawned { .. } => 0,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Density::Spawned { .. })
    }
}

/// Static description of one layer in a theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerSpec {
    pub kind: Kind,
    /// Draw order; lower is further back.
    pub depth: u8,
    pub density: Density,
}

/// Live entities of one layer.
#[derive(Debug, Clone)]
pub struct Layer {
    pub spec: LayerSpec,
    pub entities: Vec<Entity>,
    pub(crate) emitter: super::emitter::Emitter,
}

impl Layer {
    pub fn new(spec: LayerSpec) -> Self {
        Layer { spec, entities: Vec::new(), emitter: Default::default() }
    }
}

/// Everything one animation instance simulates.
#[derive(Debug, Clone)]
pub struct Scene {
    pub bounds: Bounds,
    /// Simulated seconds since generation.
    pub time: f64,
    /// Frames simulated since generation.
    pub frame: u64,
    /// Ambient wind shared by drifting kinds, in px per nominal frame.
    pub wind: f64,
    pub wind_target: f64,
    pub layers: Vec<Layer>,
    pub geometry: Geometry,
    next_id: EntityId,
}

impl Scene {
    pub fn empty(bounds: Bounds) -> Self {
        Scene {
            bounds,
            time: 0.0,
            frame: 0,
            wind: 0.0,
            wind_target: 0.0,
            layers: Vec::new(),
            geometry: Geometry::default(),
            next_id: 1,
        }
    }

    pub fn next_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Continue id allocation after `previous` so ids are never reused across regenerations.
    pub fn resume_ids(&mut self, previous: &Scene) {
        self.next_id = self.next_id.max(previous.next_id);
    }

    pub fn entity_count(&self) -> usize {
        self.layers.iter().map(|l| l.entities.len()).sum()
    }

    #[cfg(test)]
    pub fn layer(&self, kind: Kind) -> Option<&Layer> {
        self.layers.iter().find(|l| l.spec.kind == kind)
    }

    #[cfg(test)]
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.layers.iter().flat_map(|l| l.entities.iter())
    }

    /// Layer indices in back-to-front draw order (stable for equal depths).
    pub fn draw_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.layers.len()).collect();
        order.sort_by_key(|&i| self.layers[i].spec.depth);
        order
    }
}

/// Where a spawned entity should appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Scene build: anywhere in (or just around) the view.
    Scatter,
    /// Recycle or emission: at the kind's entry edge.
    Enter,
}

/// Inputs a kind's generator receives.
pub struct SpawnCtx<'a> {
    pub bounds: Bounds,
    pub rng: &'a mut StdRng,
    pub geometry: &'a mut Geometry,
    pub origin: Origin,
    /// Position of this entity within its layer at generation time.
    pub slot: usize,
    /// Population of the layer at generation time.
    pub population: usize,
    pub depth: u8,
    pub wind: f64,
}

/// Rejection sampling: propose up to `attempts` points until one is clear of
/// every registered zone (padded by `pad`). `None` when all proposals fail.
pub fn place_clear(
    rng: &mut StdRng,
    geometry: &Geometry,
    attempts: usize,
    pad: f64,
    mut propose: impl FnMut(&mut StdRng) -> (f64, f64),
) -> Option<(f64, f64)> {
    (0..attempts).find_map(|_| {
        let (x, y) = propose(rng);
        geometry.is_clear(x, y, pad).then_some((x, y))
    })
}

/// Uniform in `lo..hi`, or `lo` when the range is empty.
pub fn span(rng: &mut StdRng, lo: f64, hi: f64) -> f64 {
    if hi > lo { rng.random_range(lo..hi) } else { lo }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_area_density_scales_and_floors() {
        let d = Density::Area { divisor: 15000.0, min: 0 };
        assert_eq!(d.population(Bounds::new(1920.0, 1080.0), 1.0), 138);
        assert_eq!(d.population(Bounds::new(0.0, 0.0), 1.0), 0);
        let floored = Density::Area { divisor: 22000.0, min: 12 };
        assert_eq!(floored.population(Bounds::new(0.0, 0.0), 1.0), 12);
        assert_eq!(floored.population(Bounds::new(1920.0, 1080.0), 2.0), 188);
    }

    #[test]
    fn test_width_and_fixed_density() {
        let b = Bounds::new(1300.0, 10.0);
        assert_eq!(Density::Width { divisor: 260.0, min: 3 }.population(b, 1.0), 5);
        assert_eq!(Density::Height { divisor: 28.0, min: 0 }.population(b, 1.0), 0);
        assert_eq!(Density::Fixed(3).population(b, 2.0), 3);
        assert_eq!(Density::Spawned { rate: 1.0, cap: 10 }.population(b, 1.0), 0);
    }

    #[test]
    fn test_bounds_reject_garbage() {
        let b = Bounds::new(f64::NAN, -4.0);
        assert_eq!(b.area(), 0.0);
    }

    #[test]
    fn test_place_clear_exhausts_attempts() {
        let mut rng = StdRng::seed_from_u64(1);
        let geometry = Geometry {
            zones: vec![Zone { x: 50.0, y: 50.0, radius: 1000.0 }],
            ..Default::default()
        };
        let mut proposals = 0;
        let placed = place_clear(&mut rng, &geometry, PLACEMENT_ATTEMPTS, 0.0, |r| {
            proposals += 1;
            (r.random_range(0.0..100.0), r.random_range(0.0..100.0))
        });
        assert!(placed.is_none());
        assert_eq!(proposals, PLACEMENT_ATTEMPTS);
    }

    #[test]
    fn test_place_clear_accepts_free_point() {
        let mut rng = StdRng::seed_from_u64(1);
        let geometry = Geometry {
            zones: vec![Zone { x: 0.0, y: 0.0, radius: 5.0 }],
            ..Default::default()
        };
        let placed = place_clear(&mut rng, &geometry, 10, 1.0, |_| (20.0, 20.0));
        assert_eq!(placed, Some((20.0, 20.0)));
    }

    #[test]
    fn test_ground_interpolates() {
        let g = Geometry { horizon: vec![10.0, 20.0], horizon_step: 10.0, ..Default::default() };
        assert_eq!(g.ground_at(5.0), Some(15.0));
        assert_eq!(g.ground_at(500.0), Some(20.0));
        assert_eq!(Geometry::default().ground_at(1.0), None);
    }
}
