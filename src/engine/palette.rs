/// An opaque 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Linear blend toward `other` by `t` (0.0 = self, 1.0 = other).
    pub fn mix(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(lerp(self.0, other.0), lerp(self.1, other.1), lerp(self.2, other.2))
    }
}

/// One complete color scheme for a theme.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Rgb,
    /// Indexed entity colors; lookups wrap around.
    pub colors: &'static [Rgb],
    /// Color over a transient entity's life (0 = newborn, 1 = dying).
    pub ramp: ColorGradient,
}

impl Palette {
    pub fn color(&self, index: usize) -> Rgb {
        if self.colors.is_empty() {
            return self.background;
        }
        self.colors[index % self.colors.len()]
    }
}

/// The two fixed palettes of a theme. Selection is wholesale, never blended.
#[derive(Debug, Clone, Copy)]
pub struct PalettePair {
    pub dark: Palette,
    pub light: Palette,
}

impl PalettePair {
    pub fn pick(&self, dark: bool) -> &Palette {
        if dark { &self.dark } else { &self.light }
    }
}

/// A color stop in a gradient.
#[derive(Debug, Clone, Copy)]
pub struct ColorStop {
    pub t: f64,
    pub color: Rgb,
}

/// Piecewise-linear gradient over `0.0..=1.0`, used for age-driven particle colors.
#[derive(Debug, Clone, Copy)]
pub struct ColorGradient {
    stops: &'static [ColorStop],
}

impl ColorGradient {
    /// Stops must be sorted by `t`.
    pub const fn new(stops: &'static [ColorStop]) -> Self {
        ColorGradient { stops }
    }

    pub fn sample(&self, t: f64) -> Rgb {
        let Some(first) = self.stops.first() else {
            return Rgb(255, 255, 255);
        };
        let t = t.clamp(0.0, 1.0);
        if t <= first.t {
            return first.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.t {
                let span = (b.t - a.t).max(f64::EPSILON);
                return a.color.mix(b.color, (t - a.t) / span);
            }
        }
        self.stops[self.stops.len() - 1].color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STOPS: &[ColorStop] = &[
        ColorStop { t: 0.0, color: Rgb(255, 200, 0) },
        ColorStop { t: 0.5, color: Rgb(255, 0, 0) },
        ColorStop { t: 1.0, color: Rgb(0, 0, 0) },
    ];

    #[test]
    fn test_gradient_endpoints_and_midpoint() {
        let g = ColorGradient::new(STOPS);
        assert_eq!(g.sample(-1.0), Rgb(255, 200, 0));
        assert_eq!(g.sample(0.5), Rgb(255, 0, 0));
        assert_eq!(g.sample(2.0), Rgb(0, 0, 0));
        assert_eq!(g.sample(0.25), Rgb(255, 100, 0));
    }

    #[test]
    fn test_palette_pick_is_wholesale() {
        const DARK: &[Rgb] = &[Rgb(1, 1, 1)];
        const LIGHT: &[Rgb] = &[Rgb(2, 2, 2)];
        let ramp = ColorGradient::new(STOPS);
        let pair = PalettePair {
            dark: Palette { background: Rgb(0, 0, 0), colors: DARK, ramp },
            light: Palette { background: Rgb(9, 9, 9), colors: LIGHT, ramp },
        };
        assert_eq!(pair.pick(true).color(5), Rgb(1, 1, 1));
        assert_eq!(pair.pick(false).background, Rgb(9, 9, 9));
    }
}
