use crate::engine::host::HostConfig;
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

/// One line of live host input. Absent fields leave the current value alone.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
pub struct HostParams {
    pub theme: Option<String>,
    pub dark: Option<bool>,
    pub opacity: Option<f64>,
    pub active: Option<bool>,
}

impl HostParams {
    /// Parse one JSON line; blank or malformed lines yield `None`.
    pub fn parse(line: &str) -> Option<HostParams> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match serde_json::from_str(line) {
            Ok(params) => Some(params),
            Err(e) => {
                debug!("ignoring params line: {}", e);
                None
            }
        }
    }
}

/// Accumulated external input between frames.
#[derive(Debug, Clone, Default)]
pub struct CurrentState {
    theme_pending: Option<String>,
    dark: Option<bool>,
    opacity: Option<f64>,
    active: Option<bool>,
}

impl CurrentState {
    pub fn merge(&mut self, p: HostParams) {
        if let Some(v) = p.theme {
            self.theme_pending = Some(v);
        }
        if let Some(v) = p.dark {
            self.dark = Some(v);
        }
        if let Some(v) = p.opacity {
            self.opacity = Some(v);
        }
        if let Some(v) = p.active {
            self.active = Some(v);
        }
    }

    pub fn take_theme_change(&mut self) -> Option<String> {
        self.theme_pending.take()
    }

    /// Overlay the accumulated inputs on `config` and forget them.
    pub fn take_config(&mut self, config: HostConfig) -> HostConfig {
        let mut next = config;
        if let Some(dark) = self.dark.take() {
            next.dark = dark;
        }
        if let Some(active) = self.active.take() {
            next.active = active;
        }
        if let Some(opacity) = self.opacity.take() {
            next = next.with_opacity(opacity);
        }
        next
    }
}

pub enum ParamsSource {
    Stdin,
    File(PathBuf),
}

fn send_last_line(path: &Path, tx: &Sender<HostParams>) -> bool {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return true;
    };
    match contents.lines().rev().find_map(HostParams::parse) {
        Some(params) => tx.send(params).is_ok(),
        None => true,
    }
}

fn watch_file(path: PathBuf, tx: Sender<HostParams>) {
    // Read the file once on startup if it already exists
    if !send_last_line(&path, &tx) {
        return;
    }

    let (file_tx, file_rx) = mpsc::channel();
    let mut watcher = match notify::recommended_watcher(move |res| {
        let _ = file_tx.send(res);
    }) {
        Ok(w) => w,
        Err(e) => {
            warn!("cannot watch {}: {}", path.display(), e);
            return;
        }
    };
    if let Err(e) = notify::Watcher::watch(&mut watcher, &path, notify::RecursiveMode::NonRecursive) {
        warn!("cannot watch {}: {}", path.display(), e);
        return;
    }
    debug!("watching {} for params", path.display());
    while let Ok(Ok(_event)) = file_rx.recv() {
        if !send_last_line(&path, &tx) {
            break;
        }
    }
}

fn read_stdin(tx: Sender<HostParams>) {
    use std::io::BufRead;
    let stdin = std::io::BufReader::new(std::io::stdin());
    for line in stdin.lines() {
        let Ok(line) = line else { break };
        if let Some(params) = HostParams::parse(&line)
            && tx.send(params).is_err()
        {
            break;
        }
    }
}

pub fn spawn_reader(source: ParamsSource) -> Receiver<HostParams> {
    let (tx, rx) = mpsc::channel::<HostParams>();
    match source {
        ParamsSource::Stdin => {
            std::thread::spawn(move || read_stdin(tx));
        }
        ParamsSource::File(path) => {
            std::thread::spawn(move || watch_file(path, tx));
        }
    }
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_line() {
        let p = HostParams::parse(r#"{"opacity": 80, "dark": false}"#).unwrap();
        assert_eq!(p.opacity, Some(80.0));
        assert_eq!(p.dark, Some(false));
        assert_eq!(p.theme, None);
        assert_eq!(HostParams::parse("   "), None);
        assert_eq!(HostParams::parse("{not json"), None);
    }

    #[test]
    fn test_merge_then_take_config() {
        let mut state = CurrentState::default();
        state.merge(HostParams { opacity: Some(300.0), ..Default::default() });
        state.merge(HostParams { dark: Some(false), theme: Some("zen".into()), ..Default::default() });
        let config = state.take_config(HostConfig::default());
        assert!(!config.dark);
        assert!(config.active);
        assert_eq!(config.opacity(), 100.0);
        assert_eq!(state.take_theme_change().as_deref(), Some("zen"));
        assert_eq!(state.take_theme_change(), None);
        assert_eq!(state.take_config(config), config);
    }

    #[test]
    fn test_file_source_delivers_last_line() {
        let path = std::env::temp_dir().join(format!("backdrop-params-{}.jsonl", std::process::id()));
        std::fs::write(&path, "{\"theme\":\"koi\"}\n{\"active\":false}\n\n").unwrap();
        let (tx, rx) = mpsc::channel();
        assert!(send_last_line(&path, &tx));
        std::fs::remove_file(&path).unwrap();
        assert_eq!(rx.try_recv().unwrap(), HostParams { active: Some(false), ..Default::default() });
    }
}
