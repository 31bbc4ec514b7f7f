mod config;
mod engine;
mod error;
mod external;
mod kinds;
mod logging;
mod render;
mod themes;

use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, terminal,
};
use engine::driver::{Driver, FrameHandle, Host, ListenerHandle, State};
use engine::host::mount;
use engine::{EngineSettings, NEUTRAL_OPACITY};
use external::{CurrentState, ParamsSource};
use log::{info, warn};
use render::{Canvas, ColorMode, halfblock};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "backdrop", about = "Ambient particle backgrounds for the terminal")]
struct Cli {
    /// Theme to play (use --list to see all)
    theme: Option<String>,

    /// Use the light palette instead of the dark one
    #[arg(long)]
    light: bool,

    /// Global opacity, 0-100 (50 = as designed)
    #[arg(short, long)]
    opacity: Option<f64>,

    /// Color mode
    #[arg(short, long, value_enum)]
    color: Option<ColorMode>,

    /// Target FPS (1-120)
    #[arg(short, long)]
    fps: Option<u32>,

    /// Scale factor for entity counts (0.5-2.0)
    #[arg(short, long)]
    scale: Option<f64>,

    /// Fixed random seed for reproducible scenes
    #[arg(long)]
    seed: Option<u64>,

    /// List available themes and exit
    #[arg(short, long)]
    list: bool,

    /// Cycle through all themes (seconds per theme, 0 = disabled)
    #[arg(long)]
    cycle: Option<u32>,

    /// Hide the status bar
    #[arg(long)]
    clean: bool,

    /// Color quantization step (0 = off, 4/8/16 = coarser colors)
    #[arg(long)]
    color_quant: Option<u8>,

    /// Watch a file for JSON-lines host parameters (theme, dark, opacity, active)
    #[arg(long, conflicts_with = "params_stdin")]
    params_file: Option<PathBuf>,

    /// Read JSON-lines host parameters from stdin
    #[arg(long)]
    params_stdin: bool,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level: error, warn, info, debug, trace
    #[arg(long)]
    log_level: Option<String>,

    /// Print the config file path and exit
    #[arg(long)]
    show_config: bool,

    /// Write a commented default config file and exit
    #[arg(long)]
    init_config: bool,
}

/// Everything resolved from CLI, config file and defaults.
struct Settings {
    theme: &'static themes::ThemeSpec,
    dark: bool,
    opacity: f64,
    color: ColorMode,
    color_quant: u8,
    fps: u32,
    cycle: u32,
    clean: bool,
    engine: EngineSettings,
}

const COLOR_MODES: [ColorMode; 4] = [ColorMode::TrueColor, ColorMode::Ansi256, ColorMode::Ansi16, ColorMode::Mono];
const OPACITY_STEP: f64 = 10.0;

/// The terminal as an animation host: one frame slot, one resize slot.
#[derive(Default)]
struct TerminalHost {
    cols: usize,
    rows: usize,
    next: u64,
    pending: Option<FrameHandle>,
    listener: Option<ListenerHandle>,
}

impl TerminalHost {
    fn new(cols: usize, rows: usize) -> Self {
        TerminalHost { cols, rows, ..Default::default() }
    }
}

impl Host for TerminalHost {
    fn viewport(&self) -> (f64, f64) {
        Canvas::logical_size(self.cols, self.rows)
    }

    fn request_frame(&mut self) -> FrameHandle {
        self.next += 1;
        let handle = FrameHandle(self.next);
        self.pending = Some(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
    }

    fn listen_resize(&mut self) -> ListenerHandle {
        self.next += 1;
        let handle = ListenerHandle(self.next);
        self.listener = Some(handle);
        handle
    }

    fn unlisten_resize(&mut self, handle: ListenerHandle) {
        if self.listener == Some(handle) {
            self.listener = None;
        }
    }
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    if cli.list {
        println!("Available themes:");
        for theme in themes::THEMES {
            println!("  {:<12} {}", theme.name, theme.description);
        }
        println!("\nColor modes: mono, ansi16, ansi256, true-color");
        return Ok(());
    }

    if cli.show_config {
        match config::config_path() {
            Some(path) => {
                let state = if path.exists() { "exists" } else { "not found" };
                println!("{} ({})", path.display(), state);
            }
            None => println!("no config directory on this platform"),
        }
        return Ok(());
    }

    if cli.init_config {
        let path = config::init_config().map_err(io::Error::other)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let (cfg, config_error) = match config::load_config() {
        Ok(cfg) => (cfg, None),
        Err(e) => (config::Config::default(), Some(e)),
    };
    let log_file = cli.log_file.clone().or_else(|| cfg.log_file.clone());
    let level = logging::parse_level(cli.log_level.as_deref().or(cfg.log_level.as_deref()));
    logging::init(log_file.as_deref(), level)?;
    if let Some(e) = config_error {
        warn!("{}; using defaults", e);
    }

    let theme_name = cli.theme.clone().or_else(|| cfg.theme.clone()).unwrap_or_else(|| "snowfall".to_string());
    let theme = match themes::find(&theme_name) {
        Ok(theme) => theme,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("available: {}", themes::names().collect::<Vec<_>>().join(", "));
            std::process::exit(2);
        }
    };
    let settings = Settings {
        theme,
        dark: !(cli.light || cfg.light.unwrap_or(false)),
        opacity: cli.opacity.or(cfg.opacity).unwrap_or(NEUTRAL_OPACITY),
        color: cli.color.or(cfg.color.map(Into::into)).unwrap_or(ColorMode::TrueColor),
        color_quant: cli.color_quant.or(cfg.color_quant).unwrap_or(0),
        fps: cli.fps.or(cfg.fps).unwrap_or(30).clamp(1, 120),
        cycle: cli.cycle.or(cfg.cycle).unwrap_or(0),
        clean: cli.clean || cfg.clean.unwrap_or(false),
        engine: EngineSettings {
            scale: cli.scale.or(cfg.scale).unwrap_or(1.0).clamp(0.5, 2.0),
            seed: cli.seed.or(cfg.seed),
        },
    };

    let params_rx = if cli.params_stdin {
        Some(external::spawn_reader(ParamsSource::Stdin))
    } else {
        cli.params_file.clone().map(|path| external::spawn_reader(ParamsSource::File(path)))
    };

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;

    let mut writer = BufWriter::with_capacity(256 * 1024, stdout);
    let result = run_loop(&mut writer, &settings, params_rx);

    // Cleanup
    execute!(writer, cursor::Show, terminal::LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    log::logger().flush();

    result
}

/// Rows available to the animation.
fn display_rows(rows: u16, hide_status: bool) -> usize {
    if hide_status { rows as usize } else { (rows as usize).saturating_sub(1) }
}

/// Apply a new terminal geometry to the canvas and, if listening, the scene.
fn relayout(driver: &mut Driver<Canvas>, host: &mut TerminalHost, cols: u16, rows: usize) {
    host.cols = cols as usize;
    host.rows = rows;
    if let Some(canvas) = driver.surface_mut() {
        canvas.resize(host.cols, host.rows);
    }
    if host.listener.is_some() {
        driver.on_resize(host);
    }
}

fn run_loop(
    stdout: &mut BufWriter<io::Stdout>,
    settings: &Settings,
    params_rx: Option<std::sync::mpsc::Receiver<external::HostParams>>,
) -> io::Result<()> {
    let (mut cols, mut rows) = terminal::size()?;
    let mut hide_status = settings.clean;
    let frame_dur = Duration::from_secs_f64(1.0 / settings.fps as f64);

    let mut canvas = Canvas::new(cols as usize, display_rows(rows, hide_status), settings.color);
    canvas.color_quant = settings.color_quant;
    let mut host = TerminalHost::new(canvas.cols, canvas.rows);
    let mut driver = mount(
        settings.theme,
        Some(canvas),
        settings.dark,
        settings.opacity,
        true,
        &mut host,
        settings.engine,
    );
    info!("started {} at {}x{} cells", settings.theme.name, cols, rows);

    let mut external_state = CurrentState::default();
    let mut last_frame = Instant::now();
    let mut cycle_start = Instant::now();
    let mut frame_count: u64 = 0;
    let mut actual_fps: f64 = 0.0;
    let mut fps_update = Instant::now();
    let mut needs_clear = true;

    loop {
        let mut config = driver.config();
        let mut next_theme: Option<&'static themes::ThemeSpec> = None;

        // Handle input (non-blocking)
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Resize(w, h) => {
                    if w >= 10 && h >= 5 {
                        cols = w;
                        rows = h;
                        relayout(&mut driver, &mut host, cols, display_rows(rows, hide_status));
                        needs_clear = true;
                    }
                }
                Event::Key(KeyEvent { code, .. }) => match code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Right | KeyCode::Char('n') => {
                        next_theme = Some(themes::cycle(driver.theme().name, 1));
                    }
                    KeyCode::Left | KeyCode::Char('p') => {
                        next_theme = Some(themes::cycle(driver.theme().name, -1));
                    }
                    KeyCode::Char('d') => config.dark = !config.dark,
                    KeyCode::Char('+') | KeyCode::Char('=') => {
                        config = config.with_opacity(config.opacity() + OPACITY_STEP);
                    }
                    KeyCode::Char('-') => config = config.with_opacity(config.opacity() - OPACITY_STEP),
                    KeyCode::Char(' ') => config.active = !config.active,
                    // Cycle color mode
                    KeyCode::Char('c') => {
                        if let Some(canvas) = driver.surface_mut() {
                            let idx = COLOR_MODES.iter().position(|&m| m == canvas.color_mode).unwrap_or(0);
                            canvas.color_mode = COLOR_MODES[(idx + 1) % COLOR_MODES.len()];
                        }
                        needs_clear = true;
                    }
                    // Toggle status bar
                    KeyCode::Char('h') => {
                        hide_status = !hide_status;
                        relayout(&mut driver, &mut host, cols, display_rows(rows, hide_status));
                        needs_clear = true;
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        // External host parameters
        if let Some(rx) = &params_rx {
            while let Ok(params) = rx.try_recv() {
                external_state.merge(params);
            }
            if let Some(name) = external_state.take_theme_change() {
                match themes::find(&name) {
                    Ok(theme) => next_theme = Some(theme),
                    Err(e) => warn!("{}", e),
                }
            }
            config = external_state.take_config(config);
        }

        // Cycle themes
        if settings.cycle > 0 && cycle_start.elapsed() >= Duration::from_secs(settings.cycle as u64) {
            next_theme = Some(themes::cycle(driver.theme().name, 1));
        }

        if config != driver.config() {
            if config.active != driver.config().active {
                needs_clear = true;
            }
            driver.configure(&mut host, config);
        }
        if let Some(theme) = next_theme.filter(|t| t.name != driver.theme().name) {
            info!("switching to {}", theme.name);
            driver.switch_theme(&mut host, theme);
            cycle_start = Instant::now();
        }

        if needs_clear {
            write!(stdout, "\x1b[0m\x1b[2J\x1b[H")?;
            needs_clear = false;
        }

        // Timing
        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f64();
        last_frame = now;

        // Deliver the frame the driver asked for, if any
        let drew = match host.pending.take() {
            Some(handle) => driver.on_frame(&mut host, handle, dt),
            None => false,
        };
        if drew && let Some(canvas) = driver.surface() {
            stdout.write_all(b"\x1b[H")?;
            stdout.write_all(halfblock::encode(canvas).as_bytes())?;
        }

        // Status bar
        frame_count += 1;
        if fps_update.elapsed() >= Duration::from_secs(1) {
            actual_fps = frame_count as f64 / fps_update.elapsed().as_secs_f64();
            frame_count = 0;
            fps_update = Instant::now();
        }
        if !hide_status {
            let config = driver.config();
            let entities = driver.engine().map_or(0, |e| e.scene().entity_count());
            let state = match driver.state() {
                State::Running => "",
                State::Idle | State::Disposed => " [paused]",
            };
            let status = format!(
                " {} | {} | opacity {:.0} | {:.0} fps | {} entities{} | [←/→] theme  [d] palette  [+/-] opacity  [space] pause  [c] color  [h] hide  [q] quit ",
                driver.theme().name,
                if config.dark { "dark" } else { "light" },
                config.opacity(),
                actual_fps,
                entities,
                state,
            );
            let w = cols as usize;
            let truncated: String = status.chars().take(w).collect();
            let padded = format!("{:<width$}", truncated, width = w);
            write!(stdout, "\x1b[{};1H\x1b[7m{}\x1b[0m", rows, padded)?;
        }

        // Single flush per frame
        stdout.flush()?;

        // Sleep to target FPS
        let elapsed = last_frame.elapsed();
        if elapsed < frame_dur {
            std::thread::sleep(frame_dur - elapsed);
        }
    }
}
