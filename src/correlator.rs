//! Correlation engine: merges per-source suspicion into final verdicts

use crate::detector::{ProcessFlag, Verdict, VerdictLabel};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Produce one verdict per process known to the runtime/whitelist
/// classifier.
///
/// A process is `SUSPICIOUS_KEYLOGGER` iff its classifier row is suspicious
/// and its PID is absent from the UI-visible set. File-activity reasons are
/// global and not attributed to a specific process, so they are appended to
/// the reason text as weak corroboration only; they are never required and
/// never sufficient on their own. Everything else is `NORMAL` with an empty
/// reason.
///
/// Deterministic: output is sorted by PID, and identical inputs yield
/// identical output. Missing signals (empty UI set, no file reasons, a PID
/// with no classifier row) degrade to "not suspicious", never to an error.
pub fn correlate(
    process_flags: &[ProcessFlag],
    ui_visible_pids: &HashSet<u32>,
    file_reasons: &[String],
) -> Vec<Verdict> {
    // Latest row wins when a PID appears more than once; BTreeMap keeps the
    // output ordered by PID.
    let mut latest: BTreeMap<u32, &ProcessFlag> = BTreeMap::new();
    for flag in process_flags {
        latest.insert(flag.pid, flag);
    }

    let corroboration = file_corroboration(file_reasons);

    latest
        .values()
        .map(|flag| {
            if flag.suspicious && !ui_visible_pids.contains(&flag.pid) {
                let mut reason = format!("{} + no visible UI", flag.reason);
                if let Some(files) = &corroboration {
                    reason.push_str(files);
                }
                Verdict {
                    pid: flag.pid,
                    process_name: flag.process_name.clone(),
                    verdict: VerdictLabel::SuspiciousKeylogger,
                    reason,
                }
            } else {
                Verdict {
                    pid: flag.pid,
                    process_name: flag.process_name.clone(),
                    verdict: VerdictLabel::Normal,
                    reason: String::new(),
                }
            }
        })
        .collect()
}

/// Sorted, deduplicated file reasons as a reason-text suffix.
fn file_corroboration(file_reasons: &[String]) -> Option<String> {
    if file_reasons.is_empty() {
        return None;
    }
    let unique: BTreeSet<&str> = file_reasons.iter().map(String::as_str).collect();
    let joined: Vec<&str> = unique.into_iter().collect();
    Some(format!(" + file activity ({})", joined.join("; ")))
}
