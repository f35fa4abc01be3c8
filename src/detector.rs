//! Suspicion records and verdicts

pub mod file;
pub mod network;
pub mod process;

pub use file::FileActivityDetector;
pub use network::ConnectionRateDetector;
pub use process::ProcessDetector;

/// Suspicious file activity, one row per flagged file per cycle. Immutable
/// once produced; the result store deduplicates by exact content equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFlag {
    pub filename: String,
    pub current_size_bytes: u64,
    pub write_count: u64,
    pub reason: String,
}

/// Sustained connection activity for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetFlag {
    pub pid: u32,
    pub process_name: String,
    pub connection_count: u64,
    pub times_exceeded: u64,
    pub reason: String,
}

/// Runtime/whitelist classification of one process. Produced for every
/// process every cycle, suspicious or not; correlation consumes the latest
/// row per PID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessFlag {
    pub pid: u32,
    pub process_name: String,
    pub runtime: String,
    pub suspicious: bool,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictLabel {
    Normal,
    SuspiciousKeylogger,
}

impl VerdictLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictLabel::Normal => "NORMAL",
            VerdictLabel::SuspiciousKeylogger => "SUSPICIOUS_KEYLOGGER",
        }
    }
}

/// Final per-process classification. Regenerated wholesale on each
/// correlation pass, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub pid: u32,
    pub process_name: String,
    pub verdict: VerdictLabel,
    pub reason: String,
}

/// Format a runtime in seconds as HH:MM:SS.
pub fn format_runtime(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}
