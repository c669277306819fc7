//! ClientLogger implementation
//!
//! Bridges simulation logging to Bevy tracing (info!/warn!/error!) + logs/game.log file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use bevy::log::{debug, error, info, warn};
use meadow_simulation::{LogLevel, LogPrinter};

const LOG_PATH: &str = "logs/game.log";

pub struct ClientLogger {
    // None если файл открыть не удалось — тогда пишем только в tracing
    file: Mutex<Option<File>>,
}

impl ClientLogger {
    /// Новая сессия: старый лог удаляется
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .map_err(|e| eprintln!("❌ Failed to open log file {:?}: {}", path, e))
            .ok()
            .map(|mut file| {
                let _ = writeln!(
                    file,
                    "=== MEADOW session {} ===",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
                );
                file
            });

        Self {
            file: Mutex::new(file),
        }
    }
}

impl LogPrinter for ClientLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => debug!("{}", message),
            LogLevel::Info => info!("{}", message),
            LogLevel::Warning => warn!("{}", message),
            LogLevel::Error => error!("{}", message),
        }

        let mut guard = self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(file) = guard.as_mut() {
            let _ = writeln!(file, "[{}] {}", level.as_str(), message);
        }
    }
}

/// Подменяет ConsoleLogger симуляции (вызывать до App::run)
pub fn install() {
    meadow_simulation::set_logger(Box::new(ClientLogger::open(LOG_PATH)));
}
