//! File-activity classifier

use super::FileFlag;
use crate::collector::FileObservation;
use crate::config::FileMonitorConfig;
use crate::window::SlidingWindow;

/// Flags files that grow too often, or too much at once, within the
/// configured window. Write frequency wins over single-cycle growth when
/// both trip in the same cycle.
pub struct FileActivityDetector {
    config: FileMonitorConfig,
    window: SlidingWindow<String>,
}

impl FileActivityDetector {
    pub fn new(config: FileMonitorConfig) -> Self {
        let window = SlidingWindow::new(config.window_seconds);
        Self { config, window }
    }

    /// Classify one file observation. Returns `None` when the file is
    /// unremarkable this cycle, and always on first sight (the first
    /// observation only records the size baseline).
    pub fn check(&mut self, obs: &FileObservation, now: u64) -> Option<FileFlag> {
        let stat = self.window.observe_growth(&obs.name, now, obs.size_bytes)?;

        if stat.write_count > self.config.max_writes_in_window {
            return Some(FileFlag {
                filename: obs.name.clone(),
                current_size_bytes: obs.size_bytes,
                write_count: stat.write_count as u64,
                reason: format!(
                    "Frequent file writes ({} times in {}s)",
                    stat.write_count, self.config.window_seconds
                ),
            });
        }

        if stat.delta > self.config.max_size_growth_bytes as i64 {
            return Some(FileFlag {
                filename: obs.name.clone(),
                current_size_bytes: obs.size_bytes,
                write_count: stat.write_count as u64,
                reason: format!("Large file size growth ({} bytes)", stat.delta),
            });
        }

        None
    }

    /// Number of files currently tracked.
    pub fn tracked_files(&self) -> usize {
        self.window.tracked()
    }

    /// Retained write timestamps for a file, if tracked.
    pub fn write_history(&self, name: &str) -> Option<&[(u64, u64)]> {
        self.window.history(&name.to_string())
    }
}
