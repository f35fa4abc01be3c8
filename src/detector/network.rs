//! Connection-frequency classifier

use super::NetFlag;
use crate::collector::{ConnObservation, ProcKey};
use crate::config::NetworkMonitorConfig;
use crate::window::SlidingWindow;

/// Flags processes whose TCP connection count stays over the per-cycle
/// ceiling for enough cycles within the window. A single burst (a browser
/// opening many connections once) never trips it; sustained over-ceiling
/// behavior does.
pub struct ConnectionRateDetector {
    config: NetworkMonitorConfig,
    window: SlidingWindow<ProcKey>,
}

impl ConnectionRateDetector {
    pub fn new(config: NetworkMonitorConfig) -> Self {
        let window = SlidingWindow::new(config.window_seconds);
        Self { config, window }
    }

    /// Record this cycle's connection count and classify. Every cycle is
    /// recorded, over-ceiling or not, so quiet cycles age the signal out
    /// of the window.
    pub fn check(&mut self, obs: &ConnObservation, now: u64) -> Option<NetFlag> {
        self.window
            .observe_every(&obs.key, now, obs.connection_count);
        let times_exceeded = self.window.count_over(&obs.key, self.config.max_connections);

        if times_exceeded < self.config.repeated_threshold {
            return None;
        }

        Some(NetFlag {
            pid: obs.key.pid,
            process_name: obs.name.clone(),
            connection_count: obs.connection_count,
            times_exceeded: times_exceeded as u64,
            reason: format!(
                "Sustained connection activity ({} over-limit cycles in {}s, currently {} connections)",
                times_exceeded, self.config.window_seconds, obs.connection_count
            ),
        })
    }

    /// Number of processes currently tracked.
    pub fn tracked_processes(&self) -> usize {
        self.window.tracked()
    }
}
