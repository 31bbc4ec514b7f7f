use log::{LevelFilter, Log, Metadata, Record, info};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

/// Appends records to a file. The terminal itself is owned by the animation,
/// so this is the only place log output can go.
struct FileLogger {
    out: Mutex<BufWriter<File>>,
    start: Instant,
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut out) = self.out.lock() {
            let _ = writeln!(
                out,
                "{:>9.3} {:<5} {}: {}",
                self.start.elapsed().as_secs_f64(),
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        if let Ok(mut out) = self.out.lock() {
            let _ = out.flush();
        }
    }
}

/// Parse a level name; unknown names fall back to `info`.
pub fn parse_level(name: Option<&str>) -> LevelFilter {
    name.and_then(|n| n.trim().parse().ok()).unwrap_or(LevelFilter::Info)
}

/// Install the file logger. Without a path logging stays off.
pub fn init(path: Option<&Path>, level: LevelFilter) -> std::io::Result<()> {
    let Some(path) = path else {
        log::set_max_level(LevelFilter::Off);
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let logger = FileLogger { out: Mutex::new(BufWriter::new(file)), start: Instant::now() };
    log::set_boxed_logger(Box::new(logger)).map_err(std::io::Error::other)?;
    log::set_max_level(level);
    info!("logging to {} at {}", path.display(), level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level(Some("debug")), LevelFilter::Debug);
        assert_eq!(parse_level(Some(" TRACE ")), LevelFilter::Trace);
        assert_eq!(parse_level(Some("loud")), LevelFilter::Info);
        assert_eq!(parse_level(None), LevelFilter::Info);
    }
}
