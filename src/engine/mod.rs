//! Generic particle-animation engine.
//!
//! One `Engine` runs one theme: it builds a [`Scene`] from the view size,
//! advances it with [`Engine::update`] and paints it with [`Engine::render`].
//! Per-kind behavior lives in `crate::kinds`; themes are pure data in
//! `crate::themes`.

pub mod driver;
pub mod emitter;
pub mod entity;
pub mod host;
pub mod motion;
pub mod palette;
pub mod scene;
pub mod surface;

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use crate::kinds;
use crate::themes::ThemeSpec;
use entity::Entity;
use host::HostConfig;
use motion::{ease, step_factor};
use palette::{Palette, Rgb};
use scene::{Bounds, Geometry, Layer, Origin, Scene, SpawnCtx};
use surface::{Paint, Surface};

/// Global opacity value that leaves entity alpha unchanged.
pub const NEUTRAL_OPACITY: f64 = 50.0;

/// Frames between re-rolls of the ambient wind target.
const WIND_PERIOD: u64 = 180;

/// Clamp the global opacity knob into its contract range `0..=100`.
pub fn clamp_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() {
        return NEUTRAL_OPACITY;
    }
    opacity.clamp(0.0, 100.0)
}

/// `base × (global / 50) × fade`, clamped to `0..=1`.
pub fn effective_alpha(base: f64, global_opacity: f64, fade: f64) -> f64 {
    let global = clamp_opacity(global_opacity) / NEUTRAL_OPACITY;
    let alpha = base.max(0.0) * global * fade.clamp(0.0, 1.0);
    if alpha.is_finite() { alpha.clamp(0.0, 1.0) } else { 0.0 }
}

/// Result of stepping one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fate {
    Alive,
    /// Left the view, ran out of life or outgrew its radius.
    Expired,
}

/// Per-frame inputs for a kind's update rule.
pub struct Tick<'a> {
    /// Elapsed time in nominal frames.
    pub step: f64,
    pub bounds: Bounds,
    pub wind: f64,
    pub rng: &'a mut StdRng,
}

/// Drawing context for a kind's draw rule.
pub struct Pen<'a> {
    pub surface: &'a mut dyn Surface,
    pub palette: &'a Palette,
    pub opacity: f64,
    /// Simulated seconds since generation.
    pub time: f64,
    /// Eased ambient wind, as the update step last saw it.
    pub wind: f64,
    pub bounds: Bounds,
    pub geometry: &'a Geometry,
}

impl Pen<'_> {
    pub fn alpha(&self, base: f64, fade: f64) -> f64 {
        effective_alpha(base, self.opacity, fade)
    }

    pub fn paint(&self, color: Rgb, base: f64, fade: f64) -> Paint {
        Paint::new(color, self.alpha(base, fade))
    }

    /// Paint using the active palette's indexed color.
    pub fn shade(&self, index: usize, base: f64, fade: f64) -> Paint {
        self.paint(self.palette.color(index), base, fade)
    }
}

/// Tuning that is not part of a theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    /// Population multiplier, 0.5–2.0.
    pub scale: f64,
    /// Fixed RNG seed; `None` draws one from thread entropy.
    pub seed: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings { scale: 1.0, seed: None }
    }
}

/// One running instance of a theme.
pub struct Engine {
    theme: &'static ThemeSpec,
    scale: f64,
    rng: StdRng,
    scene: Scene,
}

impl Engine {
    /// Build an engine and generate its first scene for `width × height`.
    pub fn new(theme: &'static ThemeSpec, settings: EngineSettings, width: f64, height: f64) -> Self {
        let seed = settings.seed.unwrap_or_else(|| rand::rng().random());
        let mut engine = Engine {
            theme,
            scale: settings.scale.clamp(0.5, 2.0),
            rng: StdRng::seed_from_u64(seed),
            scene: Scene::empty(Bounds::new(width, height)),
        };
        engine.generate(width, height);
        engine
    }

    #[cfg(test)]
    pub fn theme(&self) -> &'static ThemeSpec {
        self.theme
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[cfg(test)]
    pub(crate) fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Discard every entity and build a fresh scene for the new view size.
    pub fn generate(&mut self, width: f64, height: f64) {
        let bounds = Bounds::new(width, height);
        let mut scene = Scene::empty(bounds);
        scene.resume_ids(&self.scene);
        scene.geometry.noise_seed = self.rng.random();
        let (lo, hi) = self.theme.wind;
        scene.wind = (lo + hi) * 0.5;
        scene.wind_target = scene.wind;

        for spec in self.theme.layers {
            let mut layer = Layer::new(*spec);
            let population = spec.density.population(bounds, self.scale);
            for slot in 0..population {
                let body = {
                    let mut ctx = SpawnCtx {
                        bounds,
                        rng: &mut self.rng,
                        geometry: &mut scene.geometry,
                        origin: Origin::Scatter,
                        slot,
                        population,
                        depth: spec.depth,
                        wind: scene.wind,
                    };
                    kinds::spawn(spec.kind, &mut ctx)
                };
                match body {
                    Some(body) => {
                        let id = scene.next_id();
                        layer.entities.push(Entity { id, body });
                    }
                    None => trace!("{:?} slot {} skipped: no clear position", spec.kind, slot),
                }
            }
            scene.layers.push(layer);
        }

        debug!(
            "generated {} scene {:.0}x{:.0} with {} entities",
            self.theme.name,
            bounds.width,
            bounds.height,
            scene.entity_count()
        );
        self.scene = scene;
    }

    /// Advance the scene by `dt` seconds.
    pub fn update(&mut self, dt: f64) {
        let step = step_factor(dt);
        let scene = &mut self.scene;
        scene.time += step * motion::NOMINAL_STEP;
        scene.frame += 1;

        if scene.frame % WIND_PERIOD == 1 {
            let (lo, hi) = self.theme.wind;
            scene.wind_target = scene::span(&mut self.rng, lo, hi);
        }
        scene.wind = ease(scene.wind, scene.wind_target, (0.01 * step).min(1.0));

        for li in 0..scene.layers.len() {
            let spec = scene.layers[li].spec;

            let expired: Vec<bool> = {
                let mut tick = Tick {
                    step,
                    bounds: scene.bounds,
                    wind: scene.wind,
                    rng: &mut self.rng,
                };
                scene.layers[li]
                    .entities
                    .iter_mut()
                    .map(|e| kinds::step(&mut e.body, &mut tick) == Fate::Expired)
                    .collect()
            };

            if expired.iter().any(|&x| x) {
                let mut keep = vec![true; expired.len()];
                for (i, _) in expired.iter().enumerate().filter(|(_, x)| **x) {
                    if spec.density.is_transient() {
                        keep[i] = false;
                        continue;
                    }
                    let body = {
                        let mut ctx = SpawnCtx {
                            bounds: scene.bounds,
                            rng: &mut self.rng,
                            geometry: &mut scene.geometry,
                            origin: Origin::Enter,
                            slot: i,
                            population: expired.len(),
                            depth: spec.depth,
                            wind: scene.wind,
                        };
                        kinds::spawn(spec.kind, &mut ctx)
                    };
                    match body {
                        Some(body) => {
                            let id = scene.next_id();
                            scene.layers[li].entities[i] = Entity { id, body };
                        }
                        None => keep[i] = false,
                    }
                }
                let mut flags = keep.into_iter();
                scene.layers[li].entities.retain(|_| flags.next().unwrap_or(true));
            }

            if let scene::Density::Spawned { rate, cap } = spec.density {
                let due = scene.layers[li].emitter.due(rate, step);
                for slot in 0..due {
                    let body = {
                        let mut ctx = SpawnCtx {
                            bounds: scene.bounds,
                            rng: &mut self.rng,
                            geometry: &mut scene.geometry,
                            origin: Origin::Enter,
                            slot,
                            population: due,
                            depth: spec.depth,
                            wind: scene.wind,
                        };
                        kinds::spawn(spec.kind, &mut ctx)
                    };
                    if let Some(body) = body {
                        let id = scene.next_id();
                        scene.layers[li].entities.push(Entity { id, body });
                    }
                }
                let dropped = emitter::trim_to_cap(&mut scene.layers[li].entities, cap);
                if dropped > 0 {
                    trace!("{:?} layer over cap, dropped {} oldest", spec.kind, dropped);
                }
            }
        }
    }

    /// Clear `surface` and draw the scene back to front.
    pub fn render(&self, surface: &mut dyn Surface, config: &HostConfig) {
        let palette = self.theme.palettes.pick(config.dark);
        surface.clear(palette.background);
        let scene = &self.scene;
        let (width, height) = surface.size();
        let mut pen = Pen {
            surface,
            palette,
            opacity: config.opacity(),
            time: scene.time,
            wind: scene.wind,
            bounds: Bounds::new(width, height),
            geometry: &scene.geometry,
        };
        for li in scene.draw_order() {
            for entity in &scene.layers[li].entities {
                kinds::draw(&entity.body, &mut pen);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::entity::{Body, Kind};
    use crate::engine::surface::recording::{Op, RecordingSurface};
    use crate::themes;
    use std::collections::HashSet;

    const DT: f64 = motion::NOMINAL_STEP;

    fn engine(name: &str, w: f64, h: f64) -> Engine {
        let theme = themes::find(name).unwrap();
        Engine::new(theme, EngineSettings { scale: 1.0, seed: Some(42) }, w, h)
    }

    fn fixed_counts(engine: &Engine) -> Vec<usize> {
        engine
            .scene()
            .layers
            .iter()
            .filter(|l| !l.spec.density.is_transient())
            .map(|l| l.entities.len())
            .collect()
    }

    #[test]
    fn test_opacity_rule_neutral_point() {
        assert_eq!(effective_alpha(0.4, 50.0, 1.0), 0.4);
        assert_eq!(effective_alpha(0.4, 100.0, 1.0), 0.8);
        assert_eq!(effective_alpha(0.4, 25.0, 0.5), 0.1);
        assert_eq!(effective_alpha(0.4, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_opacity_is_clamped_and_monotonic() {
        assert_eq!(effective_alpha(0.4, 500.0, 1.0), 0.8);
        assert_eq!(effective_alpha(0.4, -20.0, 1.0), 0.0);
        assert_eq!(effective_alpha(0.9, 100.0, 1.0), 1.0);
        assert_eq!(effective_alpha(-1.0, 50.0, 1.0), 0.0);
        let mut last = 0.0;
        for global in [0.0, 10.0, 50.0, 75.0, 100.0] {
            let a = effective_alpha(0.3, global, 0.7);
            assert!(a >= last);
            last = a;
        }
    }

    #[test]
    fn test_snow_population_matches_divisor() {
        let e = engine("snowfall", 1920.0, 1080.0);
        assert_eq!(e.scene().layer(Kind::Flake).unwrap().entities.len(), 138);
        let empty = engine("snowfall", 0.0, 0.0);
        assert_eq!(empty.scene().layer(Kind::Flake).unwrap().entities.len(), 0);
    }

    #[test]
    fn test_population_floor_on_tiny_view() {
        let e = engine("sakura", 0.0, 0.0);
        assert_eq!(e.scene().layer(Kind::Petal).unwrap().entities.len(), 12);
    }

    #[test]
    fn test_population_is_stable_across_frames() {
        for theme in themes::THEMES {
            let mut e = Engine::new(theme, EngineSettings { scale: 1.0, seed: Some(9) }, 1280.0, 720.0);
            let before = fixed_counts(&e);
            for _ in 0..600 {
                e.update(DT);
            }
            assert_eq!(fixed_counts(&e), before, "theme {}", theme.name);
        }
    }

    #[test]
    fn test_transient_layers_respect_caps() {
        for theme in themes::THEMES {
            let mut e = Engine::new(theme, EngineSettings { scale: 1.0, seed: Some(3) }, 1600.0, 900.0);
            for _ in 0..400 {
                e.update(DT * 4.0);
                for layer in &e.scene().layers {
                    if let scene::Density::Spawned { cap, .. } = layer.spec.density {
                        assert!(layer.entities.len() <= cap, "theme {}", theme.name);
                    }
                }
            }
        }
    }

    #[test]
    fn test_regenerate_discards_old_scene() {
        let mut e = engine("snowfall", 1920.0, 1080.0);
        for _ in 0..10 {
            e.update(DT);
        }
        let old_ids: HashSet<u64> = e.scene().entities().map(|x| x.id).collect();
        e.generate(800.0, 600.0);
        assert_eq!(e.scene().bounds, Bounds::new(800.0, 600.0));
        assert_eq!(e.scene().layer(Kind::Flake).unwrap().entities.len(), 32);
        assert_eq!(e.scene().time, 0.0);
        let bounds = Bounds::new(800.0, 600.0);
        for entity in e.scene().entities() {
            let (x, y) = entity.body.position().unwrap();
            assert!(bounds.contains(x, y), "{:?} at ({}, {})", entity.body.kind(), x, y);
        }
        assert!(e.scene().entities().all(|x| !old_ids.contains(&x.id)));
    }

    #[test]
    fn test_positioned_kinds_spawn_inside_view() {
        for name in ["fireflies", "koi", "zen", "starfield"] {
            let e = engine(name, 1024.0, 768.0);
            for entity in e.scene().entities() {
                if let Some((x, y)) = entity.body.position() {
                    assert!(e.scene().bounds.contains(x, y), "{} {:?}", name, entity.body.kind());
                }
            }
        }
    }

    #[test]
    fn test_expired_entity_is_replaced_next_frame() {
        let mut e = engine("snowfall", 800.0, 600.0);
        let victim = {
            let layer = &mut e.scene_mut().layers[0];
            let entity = &mut layer.entities[0];
            if let Body::Flake(f) = &mut entity.body {
                f.y = 10_000.0;
            }
            entity.id
        };
        let count = e.scene().entity_count();
        e.update(DT);
        assert!(e.scene().entities().all(|x| x.id != victim));
        assert_eq!(e.scene().entity_count(), count);
    }

    #[test]
    fn test_expired_ripple_is_replaced() {
        let mut e = engine("koi", 1300.0, 800.0);
        let victim = {
            let layer = e.scene_mut().layers.iter_mut().find(|l| l.spec.kind == Kind::Ripple).unwrap();
            let entity = &mut layer.entities[0];
            if let Body::Ripple(r) = &mut entity.body {
                r.radius = r.max_radius;
            }
            entity.id
        };
        e.update(DT);
        assert!(e.scene().entities().all(|x| x.id != victim));
    }

    #[test]
    fn test_render_clears_then_draws_back_to_front() {
        let e = engine("bamboo", 1200.0, 800.0);
        let mut surface = RecordingSurface::new(1200.0, 800.0);
        e.render(&mut surface, &HostConfig::new(true, 50.0, true));
        assert!(matches!(surface.ops[0], Op::Clear(_)));
        assert_eq!(surface.ops.iter().filter(|op| matches!(op, Op::Clear(_))).count(), 1);
        let order = e.scene().draw_order();
        let depths: Vec<u8> = order.iter().map(|&i| e.scene().layers[i].spec.depth).collect();
        assert!(depths.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_render_spans_the_surface_extent() {
        let e = engine("zen", 400.0, 300.0);
        let lines = |width: f64| {
            let mut surface = RecordingSurface::new(width, 300.0);
            e.render(&mut surface, &HostConfig::new(true, 50.0, true));
            surface.ops.iter().filter(|op| matches!(op, Op::Line { .. })).count()
        };
        assert!(lines(800.0) > lines(400.0));
    }

    #[test]
    fn test_render_palette_switch() {
        let e = engine("snowfall", 400.0, 300.0);
        let theme = e.theme();
        let mut surface = RecordingSurface::new(400.0, 300.0);
        e.render(&mut surface, &HostConfig::new(true, 50.0, true));
        assert_eq!(surface.ops[0], Op::Clear(theme.palettes.dark.background));
        e.render(&mut surface, &HostConfig::new(false, 50.0, true));
        assert_eq!(surface.ops[0], Op::Clear(theme.palettes.light.background));
    }

    #[test]
    fn test_render_alpha_never_exceeds_one() {
        for theme in themes::THEMES {
            let mut e = Engine::new(theme, EngineSettings { scale: 1.0, seed: Some(5) }, 900.0, 700.0);
            for _ in 0..30 {
                e.update(DT);
            }
            let mut surface = RecordingSurface::new(900.0, 700.0);
            e.render(&mut surface, &HostConfig::new(false, 100.0, true));
            for op in &surface.ops {
                if let Some(paint) = op.paint() {
                    assert!((0.0..=1.0).contains(&paint.alpha), "theme {}", theme.name);
                }
            }
        }
    }

    #[test]
    fn test_zero_opacity_draws_nothing_visible() {
        let e = engine("sakura", 900.0, 700.0);
        let mut surface = RecordingSurface::new(900.0, 700.0);
        e.render(&mut surface, &HostConfig::new(true, 0.0, true));
        assert!(surface.ops.iter().filter_map(Op::paint).all(|p| p.alpha == 0.0));
    }

    #[test]
    fn test_same_seed_same_scene() {
        let a = engine("dunes", 1000.0, 600.0);
        let b = engine("dunes", 1000.0, 600.0);
        let bodies = |e: &Engine| e.scene().entities().map(|x| x.body.clone()).collect::<Vec<_>>();
        assert_eq!(bodies(&a), bodies(&b));
    }
}
