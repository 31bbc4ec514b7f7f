//! Scene definitions. Each theme is immutable data handed to the engine at
//! construction; nothing here is mutated at runtime.

use crate::engine::entity::Kind;
use crate::engine::palette::{ColorGradient, ColorStop, Palette, PalettePair, Rgb};
use crate::engine::scene::{Density, LayerSpec};
use crate::error::ThemeError;

pub struct ThemeSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub palettes: PalettePair,
    /// Range the ambient wind target is re-rolled in, px per nominal frame.
    pub wind: (f64, f64),
    /// Generated in this order; drawn stable-sorted by depth.
    pub layers: &'static [LayerSpec],
}

const fn layer(kind: Kind, depth: u8, density: Density) -> LayerSpec {
    LayerSpec { kind, depth, density }
}

const fn palette(background: Rgb, colors: &'static [Rgb], ramp: &'static [ColorStop]) -> Palette {
    Palette { background, colors, ramp: ColorGradient::new(ramp) }
}

const fn stop(t: f64, color: Rgb) -> ColorStop {
    ColorStop { t, color }
}

/// Neutral ramp for themes without age-colored particles.
const FADE: &[ColorStop] = &[stop(0.0, Rgb(255, 255, 255)), stop(1.0, Rgb(160, 160, 160))];

/// White-hot to dull red over an ember's life.
const EMBER_DARK: &[ColorStop] = &[
    stop(0.0, Rgb(255, 250, 200)),
    stop(0.3, Rgb(255, 190, 60)),
    stop(0.7, Rgb(230, 80, 20)),
    stop(1.0, Rgb(90, 20, 10)),
];
const EMBER_LIGHT: &[ColorStop] = &[
    stop(0.0, Rgb(250, 170, 60)),
    stop(0.5, Rgb(220, 90, 30)),
    stop(1.0, Rgb(120, 50, 40)),
];

pub static THEMES: &[ThemeSpec] = &[
    ThemeSpec {
        name: "snowfall",
        description: "Snow drifting down with depth parallax",
        palettes: PalettePair {
            dark: palette(
                Rgb(8, 12, 24),
                &[Rgb(235, 242, 255), Rgb(170, 200, 255), Rgb(200, 215, 240), Rgb(120, 140, 170), Rgb(20, 28, 48), Rgb(255, 255, 255)],
                FADE,
            ),
            light: palette(
                Rgb(226, 234, 244),
                &[Rgb(120, 140, 170), Rgb(90, 120, 170), Rgb(150, 165, 190), Rgb(80, 95, 120), Rgb(200, 210, 225), Rgb(60, 70, 90)],
                FADE,
            ),
        },
        wind: (-0.4, 0.6),
        layers: &[layer(Kind::Flake, 0, Density::Area { divisor: 15000.0, min: 0 })],
    },
    ThemeSpec {
        name: "sakura",
        description: "Cherry blossom petals tumbling in gusts",
        palettes: PalettePair {
            dark: palette(
                Rgb(24, 14, 28),
                &[Rgb(255, 183, 197), Rgb(255, 160, 180), Rgb(250, 210, 220), Rgb(230, 130, 160), Rgb(110, 70, 90), Rgb(255, 235, 240)],
                FADE,
            ),
            light: palette(
                Rgb(252, 240, 243),
                &[Rgb(230, 120, 150), Rgb(214, 96, 130), Rgb(240, 160, 180), Rgb(200, 80, 120), Rgb(170, 120, 135), Rgb(255, 200, 215)],
                FADE,
            ),
        },
        wind: (0.2, 1.4),
        layers: &[layer(Kind::Petal, 0, Density::Area { divisor: 22000.0, min: 12 })],
    },
    ThemeSpec {
        name: "fireflies",
        description: "Fireflies wandering and blinking at dusk",
        palettes: PalettePair {
            dark: palette(
                Rgb(6, 12, 10),
                &[Rgb(230, 255, 140), Rgb(180, 230, 90), Rgb(255, 240, 170), Rgb(90, 120, 60), Rgb(10, 20, 14), Rgb(255, 255, 210)],
                FADE,
            ),
            light: palette(
                Rgb(232, 240, 222),
                &[Rgb(150, 170, 40), Rgb(190, 200, 80), Rgb(130, 150, 30), Rgb(90, 110, 50), Rgb(200, 210, 190), Rgb(110, 130, 20)],
                FADE,
            ),
        },
        wind: (0.0, 0.0),
        layers: &[layer(Kind::Firefly, 0, Density::Area { divisor: 40000.0, min: 12 })],
    },
    ThemeSpec {
        name: "starfield",
        description: "Twinkling stars drifting past at different depths",
        palettes: PalettePair {
            dark: palette(
                Rgb(2, 3, 10),
                &[Rgb(200, 210, 255), Rgb(255, 255, 255), Rgb(255, 220, 180), Rgb(140, 150, 200), Rgb(10, 10, 30), Rgb(230, 235, 255)],
                FADE,
            ),
            light: palette(
                Rgb(236, 238, 246),
                &[Rgb(110, 120, 170), Rgb(60, 70, 130), Rgb(150, 120, 90), Rgb(130, 140, 180), Rgb(210, 214, 230), Rgb(80, 90, 140)],
                FADE,
            ),
        },
        wind: (0.0, 0.0),
        layers: &[layer(Kind::Star, 0, Density::Area { divisor: 6000.0, min: 40 })],
    },
    ThemeSpec {
        name: "koi",
        description: "Koi gliding through a pond with spreading ripples",
        palettes: PalettePair {
            dark: palette(
                Rgb(6, 24, 32),
                &[Rgb(255, 120, 40), Rgb(245, 245, 240), Rgb(230, 60, 40), Rgb(255, 200, 150), Rgb(2, 10, 14), Rgb(120, 180, 200)],
                FADE,
            ),
            light: palette(
                Rgb(200, 228, 232),
                &[Rgb(235, 100, 30), Rgb(250, 250, 245), Rgb(200, 40, 30), Rgb(240, 170, 120), Rgb(120, 160, 170), Rgb(90, 150, 170)],
                FADE,
            ),
        },
        wind: (0.0, 0.0),
        layers: &[
            layer(Kind::Ripple, 0, Density::Width { divisor: 300.0, min: 3 }),
            layer(Kind::Koi, 1, Density::Width { divisor: 260.0, min: 3 }),
        ],
    },
    ThemeSpec {
        name: "zen",
        description: "Raked sand garden flowing around placed stones",
        palettes: PalettePair {
            dark: palette(
                Rgb(22, 20, 18),
                &[Rgb(110, 108, 104), Rgb(90, 86, 80), Rgb(130, 124, 116), Rgb(70, 66, 60), Rgb(8, 8, 6), Rgb(170, 165, 155)],
                FADE,
            ),
            light: palette(
                Rgb(232, 224, 206),
                &[Rgb(120, 116, 108), Rgb(96, 92, 86), Rgb(140, 134, 124), Rgb(196, 186, 164), Rgb(150, 142, 126), Rgb(210, 205, 195)],
                FADE,
            ),
        },
        wind: (0.0, 0.0),
        // Stones are generated first so rakes can route around them; rakes draw underneath.
        layers: &[
            layer(Kind::Stone, 1, Density::Area { divisor: 120000.0, min: 3 }),
            layer(Kind::Rake, 0, Density::Height { divisor: 28.0, min: 0 }),
        ],
    },
    ThemeSpec {
        name: "embers",
        description: "Embers rising from a banked fire",
        palettes: PalettePair {
            dark: palette(
                Rgb(14, 6, 4),
                &[Rgb(255, 110, 30), Rgb(255, 180, 60), Rgb(200, 60, 20), Rgb(120, 40, 10), Rgb(6, 2, 0), Rgb(255, 230, 160)],
                EMBER_DARK,
            ),
            light: palette(
                Rgb(246, 232, 220),
                &[Rgb(240, 130, 60), Rgb(230, 150, 70), Rgb(200, 80, 40), Rgb(160, 70, 40), Rgb(220, 200, 190), Rgb(250, 180, 100)],
                EMBER_LIGHT,
            ),
        },
        wind: (-0.3, 0.3),
        layers: &[
            layer(Kind::Glow, 0, Density::Fixed(1)),
            layer(Kind::Ember, 1, Density::Spawned { rate: 1.2, cap: 200 }),
        ],
    },
    ThemeSpec {
        name: "bamboo",
        description: "Layered bamboo grove swaying with falling leaves",
        palettes: PalettePair {
            dark: palette(
                Rgb(8, 16, 10),
                &[Rgb(30, 60, 36), Rgb(50, 96, 52), Rgb(80, 140, 70), Rgb(110, 170, 80), Rgb(140, 190, 100), Rgb(150, 180, 120)],
                FADE,
            ),
            light: palette(
                Rgb(230, 240, 224),
                &[Rgb(170, 200, 160), Rgb(120, 170, 110), Rgb(70, 130, 60), Rgb(90, 150, 60), Rgb(120, 170, 70), Rgb(60, 100, 50)],
                FADE,
            ),
        },
        wind: (-1.0, 1.0),
        layers: &[
            layer(Kind::Stalk, 1, Density::Width { divisor: 90.0, min: 0 }),
            layer(Kind::Stalk, 2, Density::Width { divisor: 70.0, min: 0 }),
            layer(Kind::Stalk, 3, Density::Width { divisor: 55.0, min: 0 }),
            layer(Kind::Leaf, 4, Density::Area { divisor: 50000.0, min: 8 }),
        ],
    },
    ThemeSpec {
        name: "dunes",
        description: "Desert ridges with cacti and blowing sand",
        palettes: PalettePair {
            dark: palette(
                Rgb(16, 12, 24),
                &[Rgb(70, 50, 60), Rgb(110, 76, 64), Rgb(150, 104, 70), Rgb(220, 180, 120), Rgb(40, 60, 40), Rgb(230, 190, 140)],
                FADE,
            ),
            light: palette(
                Rgb(250, 226, 190),
                &[Rgb(226, 186, 140), Rgb(214, 164, 110), Rgb(196, 140, 86), Rgb(170, 120, 70), Rgb(70, 110, 60), Rgb(255, 240, 210)],
                FADE,
            ),
        },
        wind: (0.6, 1.8),
        layers: &[
            layer(Kind::Ridge, 0, Density::Fixed(3)),
            layer(Kind::Cactus, 1, Density::Width { divisor: 240.0, min: 0 }),
            layer(Kind::Grain, 2, Density::Spawned { rate: 0.8, cap: 150 }),
        ],
    },
];

/// Look up a theme by name (case-insensitive).
pub fn find(name: &str) -> Result<&'static ThemeSpec, ThemeError> {
    THEMES
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| ThemeError::Unknown(name.to_string()))
}

pub fn names() -> impl Iterator<Item = &'static str> {
    THEMES.iter().map(|t| t.name)
}

/// The theme `offset` places after `current`, wrapping. Unknown names start from the first theme.
pub fn cycle(current: &str, offset: isize) -> &'static ThemeSpec {
    let len = THEMES.len() as isize;
    let at = THEMES.iter().position(|t| t.name == current).unwrap_or(0) as isize;
    &THEMES[(at + offset).rem_euclid(len) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_unique_and_findable() {
        let names: HashSet<&str> = names().collect();
        assert_eq!(names.len(), THEMES.len());
        for name in names {
            assert_eq!(find(name).unwrap().name, name);
        }
        assert_eq!(find(" Koi ").unwrap().name, "koi");
    }

    #[test]
    fn test_unknown_theme() {
        assert_eq!(find("volcano").err(), Some(ThemeError::Unknown("volcano".into())));
    }

    #[test]
    fn test_palettes_cover_drawn_indices() {
        for theme in THEMES {
            for p in [&theme.palettes.dark, &theme.palettes.light] {
                assert!(p.colors.len() >= 6, "theme {}", theme.name);
                assert_ne!(p.background, p.colors[0], "theme {}", theme.name);
            }
        }
    }

    #[test]
    fn test_cycle_wraps() {
        let last = THEMES[THEMES.len() - 1].name;
        assert_eq!(cycle(last, 1).name, THEMES[0].name);
        assert_eq!(cycle(THEMES[0].name, -1).name, last);
        assert_eq!(cycle("nope", 0).name, THEMES[0].name);
    }

    #[test]
    fn test_wind_ranges_ordered() {
        for theme in THEMES {
            assert!(theme.wind.0 <= theme.wind.1, "theme {}", theme.name);
        }
    }
}
