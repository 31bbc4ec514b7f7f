//! Animation driver: owns one engine instance and its host registrations.
//!
//! `Idle → Running → Disposed`. The host calls [`Driver::on_frame`] when a
//! requested frame comes due and [`Driver::on_resize`] when a listened-for
//! resize happens; nothing here sleeps or spawns.

use log::debug;

use super::host::HostConfig;
use super::surface::Surface;
use super::{Engine, EngineSettings};
use crate::themes::ThemeSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(pub u64);

/// What the embedding environment provides: the view size, a frame
/// scheduler and resize notifications.
pub trait Host {
    /// Current view size in logical pixels.
    fn viewport(&self) -> (f64, f64);

    /// Ask for one frame callback.
    fn request_frame(&mut self) -> FrameHandle;

    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Start delivering resize events to this driver.
    fn listen_resize(&mut self) -> ListenerHandle;

    fn unlisten_resize(&mut self, handle: ListenerHandle);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Running,
    Disposed,
}

pub struct Driver<S: Surface> {
    theme: &'static ThemeSpec,
    settings: EngineSettings,
    config: HostConfig,
    surface: Option<S>,
    engine: Option<Engine>,
    state: State,
    frame: Option<FrameHandle>,
    listener: Option<ListenerHandle>,
}

impl<S: Surface> Driver<S> {
    pub fn new(theme: &'static ThemeSpec, settings: EngineSettings, config: HostConfig, surface: Option<S>) -> Self {
        Driver {
            theme,
            settings,
            config,
            surface,
            engine: None,
            state: State::Idle,
            frame: None,
            listener: None,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn theme(&self) -> &'static ThemeSpec {
        self.theme
    }

    pub fn config(&self) -> HostConfig {
        self.config
    }

    pub fn engine(&self) -> Option<&Engine> {
        self.engine.as_ref()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// Enter `Running` if the instance is enabled and has a surface.
    /// Returns whether the driver is running afterwards.
    pub fn activate(&mut self, host: &mut dyn Host) -> bool {
        if self.state == State::Running {
            return true;
        }
        if !self.config.active {
            debug!("{}: activation skipped, instance disabled", self.theme.name);
            return false;
        }
        if self.surface.is_none() {
            debug!("{}: activation skipped, no drawing surface", self.theme.name);
            return false;
        }

        let (width, height) = host.viewport();
        self.engine = Some(Engine::new(self.theme, self.settings, width, height));
        self.listener = Some(host.listen_resize());
        self.frame = Some(host.request_frame());
        self.state = State::Running;
        debug!("{}: running at {:.0}x{:.0}", self.theme.name, width, height);
        true
    }

    /// Run one frame if `handle` is the outstanding request: update, render,
    /// then re-arm. Returns whether a frame was drawn.
    pub fn on_frame(&mut self, host: &mut dyn Host, handle: FrameHandle, dt: f64) -> bool {
        if self.state != State::Running || self.frame != Some(handle) {
            return false;
        }
        self.frame = None;
        let (Some(engine), Some(surface)) = (self.engine.as_mut(), self.surface.as_mut()) else {
            return false;
        };
        engine.update(dt);
        engine.render(surface, &self.config);
        self.frame = Some(host.request_frame());
        true
    }

    /// Rebuild the whole scene for the host's current viewport.
    pub fn on_resize(&mut self, host: &mut dyn Host) {
        if self.state != State::Running || self.listener.is_none() {
            return;
        }
        let (width, height) = host.viewport();
        if let Some(engine) = self.engine.as_mut() {
            engine.generate(width, height);
        }
    }

    /// Cancel the pending frame, stop listening for resizes and drop the scene.
    pub fn deactivate(&mut self, host: &mut dyn Host) {
        if self.state != State::Running {
            return;
        }
        if let Some(handle) = self.frame.take() {
            host.cancel_frame(handle);
        }
        if let Some(handle) = self.listener.take() {
            host.unlisten_resize(handle);
        }
        self.engine = None;
        self.state = State::Disposed;
        debug!("{}: disposed", self.theme.name);
    }

    /// Tear down and restart on another theme. Re-activation is a full rebuild.
    pub fn switch_theme(&mut self, host: &mut dyn Host, theme: &'static ThemeSpec) {
        self.deactivate(host);
        self.theme = theme;
        self.state = State::Idle;
        self.activate(host);
    }

    /// Apply new host inputs. Palette and opacity take effect on the next
    /// frame; flipping `active` activates or deactivates.
    pub fn configure(&mut self, host: &mut dyn Host, config: HostConfig) {
        self.config = config;
        match (self.state == State::Running, config.active) {
            (true, false) => self.deactivate(host),
            (false, true) => {
                self.activate(host);
            }
            _ => {}
        }
    }
}
