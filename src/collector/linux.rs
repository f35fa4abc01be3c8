use super::{
    ConnObservation, FileCollector, FileObservation, NetCollector, ProcKey, ProcessCollector,
    ProcessInfo, UiCollector,
};
use anyhow::Context;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Scans one directory for regular files and their sizes.
pub struct LinuxFileCollector {
    dir: PathBuf,
}

impl LinuxFileCollector {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileCollector for LinuxFileCollector {
    fn scan(&self) -> Vec<FileObservation> {
        let mut files = Vec::new();
        if let Ok(entries) = fs::read_dir(&self.dir) {
            for entry in entries.flatten() {
                let Ok(meta) = entry.metadata() else { continue };
                if !meta.is_file() {
                    continue;
                }
                let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                    continue;
                };
                files.push(FileObservation {
                    name,
                    size_bytes: meta.len(),
                });
            }
        }
        files
    }
}

/// Reads process metadata from /proc.
pub struct LinuxProcessCollector {
    clock_ticks: u64,
    boot_time: u64,
}

impl LinuxProcessCollector {
    pub fn new() -> Self {
        let clock_ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) as u64 }.max(1);
        let boot_time = Self::get_boot_time();
        Self {
            clock_ticks,
            boot_time,
        }
    }

    fn get_boot_time() -> u64 {
        let stat = fs::read_to_string("/proc/stat").unwrap_or_default();
        for line in stat.lines() {
            if line.starts_with("btime ") {
                return line[6..].trim().parse().unwrap_or(0);
            }
        }
        0
    }

    fn parse_process(&self, pid: u32) -> Option<ProcessInfo> {
        let proc_path = format!("/proc/{}", pid);
        let proc_dir = Path::new(&proc_path);
        if !proc_dir.exists() {
            return None;
        }

        let stat_content = fs::read_to_string(proc_dir.join("stat")).ok()?;
        // comm can contain spaces; stat fields after the parenthesized comm
        // are positionally stable, so split on the closing paren first.
        let open = stat_content.find('(')?;
        let close = stat_content.rfind(')')?;
        let name = stat_content.get(open + 1..close)?.to_string();
        let rest: Vec<&str> = stat_content.get(close + 1..)?.split_whitespace().collect();
        // rest[0] is field 3 (state); starttime is field 22.
        let start_time_ticks: u64 = rest.get(19)?.parse().ok()?;

        let start_time = self.boot_time + (start_time_ticks / self.clock_ticks);
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let runtime_seconds = now.saturating_sub(start_time);

        let cmdline = fs::read_to_string(proc_dir.join("cmdline"))
            .unwrap_or_default()
            .replace('\0', " ")
            .trim()
            .to_string();

        Some(ProcessInfo {
            pid,
            start_time,
            name,
            cmdline,
            runtime_seconds,
        })
    }
}

impl Default for LinuxProcessCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessCollector for LinuxProcessCollector {
    fn list_processes(&self) -> Vec<ProcessInfo> {
        let mut processes = Vec::new();
        if let Ok(entries) = fs::read_dir("/proc") {
            for entry in entries.flatten() {
                if let Some(name) = entry.file_name().to_str() {
                    if let Ok(pid) = name.parse::<u32>() {
                        if let Some(info) = self.parse_process(pid) {
                            processes.push(info);
                        }
                    }
                }
            }
        }
        processes
    }

    fn get_process(&self, pid: u32) -> Option<ProcessInfo> {
        self.parse_process(pid)
    }
}

/// Counts TCP connections per owning process by joining /proc/net/tcp{,6}
/// socket inodes against /proc/<pid>/fd.
pub struct LinuxNetCollector {
    processes: LinuxProcessCollector,
}

impl LinuxNetCollector {
    pub fn new() -> Self {
        Self {
            processes: LinuxProcessCollector::new(),
        }
    }

    /// Socket inodes of non-listening TCP connections.
    fn tcp_inodes() -> HashSet<u64> {
        let mut inodes = HashSet::new();
        for table in ["/proc/net/tcp", "/proc/net/tcp6"] {
            let Ok(content) = fs::read_to_string(table) else {
                continue;
            };
            for line in content.lines().skip(1) {
                let fields: Vec<&str> = line.split_whitespace().collect();
                if fields.len() < 10 {
                    continue;
                }
                // st 0A is LISTEN; only live connections count.
                if fields[3] == "0A" {
                    continue;
                }
                if let Ok(inode) = fields[9].parse::<u64>() {
                    if inode != 0 {
                        inodes.insert(inode);
                    }
                }
            }
        }
        inodes
    }

    /// Attribute socket inodes to owning PIDs via fd symlinks. Processes we
    /// cannot inspect (gone, access denied) are skipped for this cycle.
    fn count_by_pid(inodes: &HashSet<u64>) -> HashMap<u32, u64> {
        let mut counts: HashMap<u32, u64> = HashMap::new();
        let Ok(entries) = fs::read_dir("/proc") else {
            return counts;
        };
        for entry in entries.flatten() {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let Ok(pid) = name.parse::<u32>() else { continue };
            let Ok(fds) = fs::read_dir(entry.path().join("fd")) else {
                continue;
            };
            for fd in fds.flatten() {
                let Ok(target) = fs::read_link(fd.path()) else {
                    continue;
                };
                let Some(target) = target.to_str() else { continue };
                let Some(inode) = target
                    .strip_prefix("socket:[")
                    .and_then(|s| s.strip_suffix(']'))
                    .and_then(|s| s.parse::<u64>().ok())
                else {
                    continue;
                };
                if inodes.contains(&inode) {
                    *counts.entry(pid).or_insert(0) += 1;
                }
            }
        }
        counts
    }
}

impl Default for LinuxNetCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl NetCollector for LinuxNetCollector {
    fn scan(&self) -> Vec<ConnObservation> {
        let inodes = Self::tcp_inodes();
        let counts = Self::count_by_pid(&inodes);
        let mut observations = Vec::with_capacity(counts.len());
        for (pid, connection_count) in counts {
            // A process that vanished between the fd walk and here is
            // skipped; the next cycle resolves it.
            let Some(info) = self.processes.get_process(pid) else {
                continue;
            };
            observations.push(ConnObservation {
                key: ProcKey {
                    pid,
                    start_time: info.start_time,
                },
                name: info.name,
                connection_count,
            });
        }
        observations
    }
}

/// Lists PIDs owning visible top-level windows by driving `wmctrl -lp`.
pub struct CommandUiCollector;

impl CommandUiCollector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CommandUiCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl UiCollector for CommandUiCollector {
    fn visible_pids(&self) -> anyhow::Result<HashSet<u32>> {
        let output = Command::new("wmctrl")
            .arg("-lp")
            .output()
            .context("failed to run wmctrl")?;
        if !output.status.success() {
            anyhow::bail!("wmctrl exited with {}", output.status);
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut pids = HashSet::new();
        // wmctrl -lp lines: <window id> <desktop> <pid> <host> <title>
        for line in stdout.lines() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if let Some(pid) = fields.get(2).and_then(|f| f.parse::<u32>().ok()) {
                if pid != 0 {
                    pids.insert(pid);
                }
            }
        }
        debug!("ui snapshot: {} window-owning pids", pids.len());
        Ok(pids)
    }
}
