//! keywatch: host-based heuristic keylogger-pattern detector.
//!
//! Three independent monitors sample file-write frequency, per-process TCP
//! connection counts, and process lifecycle / UI visibility on a fixed
//! interval. Sliding-window trackers turn the raw observations into
//! suspicion flags, and a correlation pass merges the flags into one final
//! verdict per process.

pub mod collector;
pub mod config;
pub mod correlator;
pub mod detector;
pub mod notifier;
pub mod store;
pub mod window;
