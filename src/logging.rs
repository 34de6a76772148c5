//! Console + file logger behind the `log` facade.
//!
//! Every record is printed with a wall-clock timestamp and appended to
//! `<exe_dir>/logs/document_capture.log`.

use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

const LOG_FILE_NAME: &str = "document_capture.log";

struct CaptureLogger {
    level: LevelFilter,
    file_path: PathBuf,
}

impl Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format_line(&Local::now().format("%H:%M:%S%.3f").to_string(), record);
        print!("{}", line);

        if let Ok(mut file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)
        {
            let _ = file.write_all(line.as_bytes());
        }
    }

    fn flush(&self) {
        let _ = std::io::stdout().flush();
    }
}

fn format_line(timestamp: &str, record: &Record) -> String {
    format!("[{}] {:<5} {}\n", timestamp, record.level(), record.args())
}

/// Installs the logger. Calling it twice is harmless; the second call is ignored.
pub fn init(level: LevelFilter) {
    let logger = CaptureLogger {
        level,
        file_path: crate::paths::get_logs_dir().join(LOG_FILE_NAME),
    };

    // The logger lives for the rest of the process
    if log::set_logger(Box::leak(Box::new(logger))).is_ok() {
        log::set_max_level(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn test_format_line_includes_level_and_message() {
        let line = format_line(
            "12:00:00.000",
            &Record::builder()
                .args(format_args!("threshold = {}", 117))
                .level(Level::Info)
                .build(),
        );
        assert_eq!(line, "[12:00:00.000] INFO  threshold = 117\n");
    }

    #[test]
    fn test_init_installs_logger_once() {
        init(LevelFilter::Debug);
        assert_eq!(log::max_level(), LevelFilter::Debug);

        // Second install is ignored and keeps the first level
        init(LevelFilter::Trace);
        assert_eq!(log::max_level(), LevelFilter::Debug);
        log::debug!("logger installed");
    }

    #[test]
    fn test_logger_filters_by_level() {
        let logger = CaptureLogger {
            level: LevelFilter::Warn,
            file_path: PathBuf::from("unused.log"),
        };

        let debug = Metadata::builder().level(Level::Debug).build();
        let error = Metadata::builder().level(Level::Error).build();
        assert!(!logger.enabled(&debug));
        assert!(logger.enabled(&error));
    }
}
