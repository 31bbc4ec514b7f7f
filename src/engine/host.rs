use super::clamp_opacity;
use super::driver::{Driver, Host};
use super::surface::Surface;
use super::EngineSettings;
use crate::themes::ThemeSpec;

/// The inputs an embedding component hands to an animation instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostConfig {
    /// Dark palette when true, light palette otherwise.
    pub dark: bool,
    opacity: f64,
    pub active: bool,
}

impl HostConfig {
    /// `opacity` is clamped to `0..=100`; 50 is neutral.
    pub fn new(dark: bool, opacity: f64, active: bool) -> Self {
        HostConfig { dark, opacity: clamp_opacity(opacity), active }
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn with_opacity(self, opacity: f64) -> Self {
        HostConfig { opacity: clamp_opacity(opacity), ..self }
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        HostConfig::new(true, super::NEUTRAL_OPACITY, true)
    }
}

/// Create a driver for `theme` and activate it if possible.
///
/// A missing surface or `active == false` leaves the driver idle without
/// touching the host's scheduler.
pub fn mount<S: Surface>(
    theme: &'static ThemeSpec,
    surface: Option<S>,
    dark: bool,
    opacity: f64,
    active: bool,
    host: &mut dyn Host,
    settings: EngineSettings,
) -> Driver<S> {
    let mut driver = Driver::new(theme, settings, HostConfig::new(dark, opacity, active), surface);
    driver.activate(host);
    driver
}
