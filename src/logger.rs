use chrono::Local;
use env_logger::{Builder, Env};
use log::{Level, LevelFilter};
use std::io::Write;
use std::sync::Mutex;

pub fn init() {
    Builder::new()
        .format(|buf, record| {
            writeln!(buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .parse_env(Env::default())
        .init();

    log::info!("Logger initialized.");
}

/// Logging handle handed to components that report failures they do not propagate.
pub trait LogSink: Send + Sync {
    fn log(&self, level: Level, message: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GlobalLog;

impl LogSink for GlobalLog {
    fn log(&self, level: Level, message: &str) {
        log::log!(level, "{}", message);
    }
}

#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        MemoryLog::default()
    }

    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(level, _)| *level == Level::Error)
            .map(|(_, msg)| msg)
            .collect()
    }
}

impl LogSink for MemoryLog {
    fn log(&self, level: Level, message: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((level, message.to_string()));
    }
}
