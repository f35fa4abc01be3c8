//! Process runtime/whitelist classifier

use super::{format_runtime, ProcessFlag};
use crate::collector::ProcessInfo;
use crate::config::ProcessMonitorConfig;
use std::collections::HashSet;

/// Coarse per-process suspicion: whitelisted names are never suspicious, a
/// known malicious invocation marker in the command line always is, and
/// anything else is suspicious once it has run longer than the threshold.
/// High false-positive rate on its own; meant as one input to correlation,
/// never a standalone verdict.
pub struct ProcessDetector {
    whitelist: HashSet<String>,
    runtime_threshold_seconds: u64,
    malicious_marker: String,
}

impl ProcessDetector {
    pub fn new(config: ProcessMonitorConfig) -> Self {
        let whitelist = config
            .whitelist
            .iter()
            .map(|name| name.to_lowercase())
            .collect();
        Self {
            whitelist,
            runtime_threshold_seconds: config.runtime_threshold_seconds,
            malicious_marker: config.malicious_marker.to_lowercase(),
        }
    }

    /// Case-insensitive exact name match against the whitelist.
    pub fn is_whitelisted(&self, name: &str) -> bool {
        self.whitelist.contains(&name.to_lowercase())
    }

    pub fn add_whitelist(&mut self, name: String) {
        self.whitelist.insert(name.to_lowercase());
    }

    /// Classify one process. Produces a row whether suspicious or not.
    pub fn check(&self, process: &ProcessInfo) -> ProcessFlag {
        let (suspicious, reason) = self.classify(process);
        ProcessFlag {
            pid: process.pid,
            process_name: process.name.clone(),
            runtime: format_runtime(process.runtime_seconds),
            suspicious,
            reason,
        }
    }

    fn classify(&self, process: &ProcessInfo) -> (bool, String) {
        if self.is_whitelisted(&process.name) {
            return (false, String::new());
        }

        if !self.malicious_marker.is_empty()
            && process.cmdline.to_lowercase().contains(&self.malicious_marker)
        {
            return (
                true,
                "Known malicious invocation detected via command line".to_string(),
            );
        }

        if process.runtime_seconds > self.runtime_threshold_seconds {
            return (true, "Long runtime (non-whitelisted process)".to_string());
        }

        (false, String::new())
    }
}
