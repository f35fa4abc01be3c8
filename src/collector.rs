//! Observation adapters (read host state on Linux)

mod linux;

pub use linux::{CommandUiCollector, LinuxFileCollector, LinuxNetCollector, LinuxProcessCollector};

use std::collections::HashSet;

/// Composite process identity. PIDs are recycled by the OS; pairing the PID
/// with the process start time keeps a recycled PID from inheriting the
/// history of the process that previously owned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcKey {
    pub pid: u32,
    pub start_time: u64,
}

/// One regular file in the watched directory, as seen this cycle.
#[derive(Debug, Clone)]
pub struct FileObservation {
    pub name: String,
    pub size_bytes: u64,
}

/// TCP connection count for one process, as seen this cycle.
#[derive(Debug, Clone)]
pub struct ConnObservation {
    pub key: ProcKey,
    pub name: String,
    pub connection_count: u64,
}

/// Metadata for one running process.
#[derive(Debug, Clone)]
pub struct ProcessInfo {
    pub pid: u32,
    pub start_time: u64,
    pub name: String,
    pub cmdline: String,
    pub runtime_seconds: u64,
}

impl ProcessInfo {
    pub fn key(&self) -> ProcKey {
        ProcKey {
            pid: self.pid,
            start_time: self.start_time,
        }
    }
}

pub trait FileCollector: Send + Sync {
    /// Regular files of the watched directory. Entries that fail to stat
    /// are skipped for this cycle.
    fn scan(&self) -> Vec<FileObservation>;
}

pub trait NetCollector: Send + Sync {
    /// Per-process TCP connection counts. Only sockets with a resolved
    /// owning process count toward a total.
    fn scan(&self) -> Vec<ConnObservation>;
}

pub trait ProcessCollector: Send + Sync {
    fn list_processes(&self) -> Vec<ProcessInfo>;
    fn get_process(&self, pid: u32) -> Option<ProcessInfo>;
}

pub trait UiCollector: Send + Sync {
    /// PIDs owning at least one currently visible top-level window.
    fn visible_pids(&self) -> anyhow::Result<HashSet<u32>>;
}
