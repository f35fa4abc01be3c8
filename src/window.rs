//! Sliding time-window event histories

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as unix seconds.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Windowed statistic for a growth-tracked entity.
#[derive(Debug, Clone, Copy)]
pub struct GrowthStat {
    /// Number of growth events retained in the window, including this cycle's.
    pub write_count: usize,
    /// Size delta against the last known baseline. Negative on truncation.
    pub delta: i64,
}

#[derive(Debug, Clone)]
struct EventHistory {
    /// (timestamp_secs, observed_value), timestamps non-decreasing.
    events: Vec<(u64, u64)>,
    last_value: u64,
}

/// Per-entity event histories over a trailing time window.
///
/// Owns a map from entity key to history; created at monitor start and
/// dropped at monitor stop. Entities that stop appearing in observations
/// simply stop being updated.
pub struct SlidingWindow<K> {
    window_seconds: u64,
    entities: HashMap<K, EventHistory>,
}

impl<K: Eq + Hash + Clone> SlidingWindow<K> {
    pub fn new(window_seconds: u64) -> Self {
        Self {
            window_seconds,
            entities: HashMap::new(),
        }
    }

    pub fn window_seconds(&self) -> u64 {
        self.window_seconds
    }

    /// Record a size-like observation, counting only positive deltas as
    /// activity. Returns `None` on first sight of the entity: the first
    /// observation only establishes the baseline, so a freshly created
    /// file can never be a signal by itself.
    pub fn observe_growth(&mut self, key: &K, now: u64, value: u64) -> Option<GrowthStat> {
        if !self.entities.contains_key(key) {
            self.entities.insert(
                key.clone(),
                EventHistory {
                    events: Vec::new(),
                    last_value: value,
                },
            );
            return None;
        }

        let window = self.window_seconds;
        let history = self.entities.get_mut(key)?;
        history
            .events
            .retain(|(ts, _)| now.saturating_sub(*ts) <= window);

        let delta = value as i64 - history.last_value as i64;
        if delta > 0 {
            history.events.push((now, value));
            history.last_value = value;
        }

        Some(GrowthStat {
            write_count: history.events.len(),
            delta,
        })
    }

    /// Record an observation unconditionally. Used where the absence of an
    /// over-ceiling reading is itself informative and must age out of the
    /// window, so every cycle is kept.
    pub fn observe_every(&mut self, key: &K, now: u64, value: u64) {
        let window = self.window_seconds;
        let history = self.entities.entry(key.clone()).or_insert(EventHistory {
            events: Vec::new(),
            last_value: value,
        });
        history
            .events
            .retain(|(ts, _)| now.saturating_sub(*ts) <= window);
        history.events.push((now, value));
        history.last_value = value;
    }

    /// Count of retained entries whose value exceeds `ceiling`.
    pub fn count_over(&self, key: &K, ceiling: u64) -> usize {
        self.entities
            .get(key)
            .map(|h| h.events.iter().filter(|(_, v)| *v > ceiling).count())
            .unwrap_or(0)
    }

    /// Count of retained entries.
    pub fn event_count(&self, key: &K) -> usize {
        self.entities.get(key).map(|h| h.events.len()).unwrap_or(0)
    }

    /// Retained (timestamp, value) entries for an entity.
    pub fn history(&self, key: &K) -> Option<&[(u64, u64)]> {
        self.entities.get(key).map(|h| h.events.as_slice())
    }

    /// Number of tracked entities.
    pub fn tracked(&self) -> usize {
        self.entities.len()
    }
}
