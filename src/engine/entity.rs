//! Scene entity model: plain records, one shape per drawable kind.
//!
//! Records carry no behavior of their own; the per-kind modules under
//! `crate::kinds` spawn, step and draw them.

use rand::RngExt;
use rand::rngs::StdRng;

use super::motion::ease;

/// Identity of one entity instance within a scene. Recycling assigns a new id.
pub type EntityId = u64;

/// A drawable kind. One layer holds entities of exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Flake,
    Petal,
    Firefly,
    Star,
    Koi,
    Ripple,
    Stone,
    Rake,
    Glow,
    Ember,
    Stalk,
    Leaf,
    Ridge,
    Cactus,
    Grain,
}

/// Independent sinusoidal oscillator (sway, wobble, flutter, twinkle).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oscillator {
    /// Radians.
    pub phase: f64,
    /// Radians per nominal frame.
    pub speed: f64,
    pub amplitude: f64,
}

impl Oscillator {
    pub fn random(rng: &mut StdRng, speed: std::ops::Range<f64>, amplitude: std::ops::Range<f64>) -> Self {
        Oscillator {
            phase: rng.random_range(0.0..std::f64::consts::TAU),
            speed: rng.random_range(speed),
            amplitude: rng.random_range(amplitude),
        }
    }

    pub fn advance(&mut self, step: f64) {
        self.phase = (self.phase + self.speed * step) % std::f64::consts::TAU;
    }

    pub fn value(&self) -> f64 {
        self.phase.sin() * self.amplitude
    }

    /// Oscillator output remapped to `0.0..=1.0`, ignoring amplitude.
    pub fn unit(&self) -> f64 {
        0.5 + 0.5 * self.phase.sin()
    }
}

/// Turning behavior for wandering entities: the turn rate eases toward a
/// target that is re-chosen every `every` frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wander {
    pub turn: f64,
    pub target: f64,
    pub max_turn: f64,
    pub rate: f64,
    pub every: u32,
    pub countdown: u32,
}

impl Wander {
    pub fn new(rng: &mut StdRng, max_turn: f64, rate: f64, every: u32) -> Self {
        Wander {
            turn: 0.0,
            target: rng.random_range(-max_turn..=max_turn),
            max_turn,
            rate,
            every: every.max(1),
            countdown: rng.random_range(0..every.max(1)),
        }
    }

    /// Advance one frame and return the current turn rate.
    pub fn advance(&mut self, rng: &mut StdRng) -> f64 {
        if self.countdown == 0 {
            self.target = rng.random_range(-self.max_turn..=self.max_turn);
            self.countdown = self.every;
        } else {
            self.countdown -= 1;
        }
        self.turn = ease(self.turn, self.target, self.rate);
        self.turn
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Flake {
    pub x: f64,
    pub y: f64,
    /// Parallax depth in `0.0..=1.0`; 1.0 is nearest.
    pub z: f64,
    pub speed: f64,
    pub size: f64,
    pub opacity: f64,
    pub sway: Oscillator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Petal {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub rotation: f64,
    pub spin: f64,
    pub size: f64,
    pub opacity: f64,
    pub shade: usize,
    pub flutter: Oscillator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Firefly {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub speed: f64,
    pub radius: f64,
    pub opacity: f64,
    pub wander: Wander,
    pub blink: Oscillator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub speed: f64,
    pub size: f64,
    pub opacity: f64,
    pub twinkle: Oscillator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Koi {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub speed: f64,
    pub length: f64,
    pub opacity: f64,
    pub variant: usize,
    pub wander: Wander,
    pub tail: Oscillator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ripple {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub max_radius: f64,
    pub growth: f64,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stone {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub opacity: f64,
    pub shade: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rake {
    pub y: f64,
    pub opacity: f64,
    pub wave: Oscillator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Glow {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub opacity: f64,
    pub pulse: Oscillator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ember {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub size: f64,
    pub opacity: f64,
    /// Frames left.
    pub life: f64,
    pub max_life: f64,
    pub flicker: Oscillator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stalk {
    pub x: f64,
    pub base: f64,
    pub height: f64,
    pub width: f64,
    pub z: f64,
    pub nodes: u8,
    pub opacity: f64,
    pub shade: usize,
    pub sway: Oscillator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub rotation: f64,
    pub spin: f64,
    pub size: f64,
    pub opacity: f64,
    pub shade: usize,
    pub flutter: Oscillator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ridge {
    /// Surface height samples, one every `step` px starting at x = 0.
    pub profile: Vec<f64>,
    pub step: f64,
    pub opacity: f64,
    pub shade: usize,
    pub shimmer: Oscillator,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cactus {
    pub x: f64,
    pub base: f64,
    pub height: f64,
    pub arms: u8,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grain {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub size: f64,
    pub opacity: f64,
    pub life: f64,
    pub max_life: f64,
    pub bob: Oscillator,
}

/// The closed set of entity shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Flake(Flake),
    Petal(Petal),
    Firefly(Firefly),
    Star(Star),
    Koi(Koi),
    Ripple(Ripple),
    Stone(Stone),
    Rake(Rake),
    Glow(Glow),
    Ember(Ember),
    Stalk(Stalk),
    Leaf(Leaf),
    Ridge(Ridge),
    Cactus(Cactus),
    Grain(Grain),
}

#[cfg(test)]
impl Body {
    pub fn kind(&self) -> Kind {
        match self {
            Body::Flake(_) => Kind::Flake,
            Body::Petal(_) => Kind::Petal,
            Body::Firefly(_) => Kind::Firefly,
            Body::Star(_) => Kind::Star,
            Body::Koi(_) => Kind::Koi,
            Body::Ripple(_) => Kind::Ripple,
            Body::Stone(_) => Kind::Stone,
            Body::Rake(_) => Kind::Rake,
            Body::Glow(_) => Kind::Glow,
            Body::Ember(_) => Kind::Ember,
            Body::Stalk(_) => Kind::Stalk,
            Body::Leaf(_) => Kind::Leaf,
            Body::Ridge(_) => Kind::Ridge,
            Body::Cactus(_) => Kind::Cactus,
            Body::Grain(_) => Kind::Grain,
        }
    }

    /// Position for kinds that have a single anchor point.
    pub fn position(&self) -> Option<(f64, f64)> {
        match self {
            Body::Flake(e) => Some((e.x, e.y)),
            Body::Petal(e) => Some((e.x, e.y)),
            Body::Firefly(e) => Some((e.x, e.y)),
            Body::Star(e) => Some((e.x, e.y)),
            Body::Koi(e) => Some((e.x, e.y)),
            Body::Ripple(e) => Some((e.x, e.y)),
            Body::Stone(e) => Some((e.x, e.y)),
            Body::Glow(e) => Some((e.x, e.y)),
            Body::Ember(e) => Some((e.x, e.y)),
            Body::Stalk(e) => Some((e.x, e.base)),
            Body::Leaf(e) => Some((e.x, e.y)),
            Body::Cactus(e) => Some((e.x, e.base)),
            Body::Grain(e) => Some((e.x, e.y)),
            Body::Rake(_) | Body::Ridge(_) => None,
        }
    }
}

/// A live entity: identity plus record.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub body: Body,
}
