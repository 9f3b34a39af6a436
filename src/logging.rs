// The terminal belongs to the TUI, so log records go to
// <project_dir>/.garden/garden.log instead.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::pipeline::store::GARDEN_DIR;

const LOG_FILE: &str = "garden.log";

pub struct FileLogger {
    level: log::LevelFilter,
    file: Mutex<File>,
}

impl FileLogger {
    pub fn open(path: &Path, level: log::LevelFilter) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { level, file: Mutex::new(file) })
    }
}

impl log::Log for FileLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!(
            "{} {:<5} {}: {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        );
        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

pub fn log_path(project_dir: &Path) -> PathBuf {
    project_dir.join(GARDEN_DIR).join(LOG_FILE)
}

/// Installs the file logger as the global `log` backend.
pub fn init(project_dir: &Path, level: log::LevelFilter) -> anyhow::Result<()> {
    let logger = FileLogger::open(&log_path(project_dir), level)?;
    log::set_boxed_logger(Box::new(logger))
        .map_err(|e| anyhow::anyhow!("logger already installed: {e}"))?;
    log::set_max_level(level);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Log;

    #[test]
    fn writes_records_at_or_above_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = log_path(dir.path());
        let logger = FileLogger::open(&path, log::LevelFilter::Info).unwrap();
        logger.log(
            &log::Record::builder()
                .level(log::Level::Warn)
                .target("soundgarden::store")
                .args(format_args!("skipping broken.json"))
                .build(),
        );
        logger.log(
            &log::Record::builder()
                .level(log::Level::Debug)
                .args(format_args!("too chatty"))
                .build(),
        );
        logger.flush();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("WARN  soundgarden::store: skipping broken.json"));
        assert!(!text.contains("too chatty"));
    }

    #[test]
    fn init_installs_the_global_logger_once() {
        let dir = tempfile::tempdir().unwrap();
        init(dir.path(), log::LevelFilter::Info).unwrap();
        log::warn!(target: "soundgarden::startup", "audio disabled");
        log::logger().flush();
        let text = std::fs::read_to_string(log_path(dir.path())).unwrap();
        assert!(text.contains("WARN  soundgarden::startup: audio disabled"));
        assert!(init(dir.path(), log::LevelFilter::Info).is_err());
    }
}
