use keywatch::correlator::correlate;
use keywatch::detector::{ProcessFlag, VerdictLabel};
use std::collections::HashSet;

fn flag(pid: u32, name: &str, suspicious: bool, reason: &str) -> ProcessFlag {
    ProcessFlag {
        pid,
        process_name: name.to_string(),
        runtime: "00:05:00".to_string(),
        suspicious,
        reason: reason.to_string(),
    }
}

#[test]
fn test_suspicious_without_ui_is_keylogger() {
    let flags = vec![flag(42, "logger", true, "Long runtime (non-whitelisted process)")];
    let visible = HashSet::new();

    let verdicts = correlate(&flags, &visible, &[]);
    assert_eq!(verdicts.len(), 1);
    assert_eq!(verdicts[0].verdict, VerdictLabel::SuspiciousKeylogger);
    assert!(verdicts[0].reason.contains("no visible UI"));
    assert!(verdicts[0].reason.contains("Long runtime"));
}

#[test]
fn test_suspicious_with_ui_is_normal() {
    let flags = vec![flag(42, "logger", true, "Long runtime (non-whitelisted process)")];
    let visible: HashSet<u32> = [42].into_iter().collect();

    let verdicts = correlate(&flags, &visible, &[]);
    assert_eq!(verdicts[0].verdict, VerdictLabel::Normal);
    assert!(verdicts[0].reason.is_empty());
}

#[test]
fn test_clean_process_is_normal_even_without_ui() {
    let flags = vec![flag(7, "daemon", false, "")];
    let verdicts = correlate(&flags, &HashSet::new(), &[]);
    assert_eq!(verdicts[0].verdict, VerdictLabel::Normal);
    assert!(verdicts[0].reason.is_empty());
}

#[test]
fn test_file_activity_is_corroboration_only() {
    let file_reasons = vec!["Frequent file writes (3 times in 30s)".to_string()];

    // Appended to a flagged verdict...
    let flags = vec![flag(42, "logger", true, "Long runtime (non-whitelisted process)")];
    let verdicts = correlate(&flags, &HashSet::new(), &file_reasons);
    assert_eq!(verdicts[0].verdict, VerdictLabel::SuspiciousKeylogger);
    assert!(verdicts[0].reason.contains("file activity"));
    assert!(verdicts[0].reason.contains("Frequent file writes"));

    // ...but never sufficient on its own.
    let flags = vec![flag(7, "daemon", false, "")];
    let verdicts = correlate(&flags, &HashSet::new(), &file_reasons);
    assert_eq!(verdicts[0].verdict, VerdictLabel::Normal);
    assert!(verdicts[0].reason.is_empty());
}

#[test]
fn test_file_activity_not_required() {
    let flags = vec![flag(42, "logger", true, "Long runtime (non-whitelisted process)")];
    let verdicts = correlate(&flags, &HashSet::new(), &[]);
    assert_eq!(verdicts[0].verdict, VerdictLabel::SuspiciousKeylogger);
    assert!(!verdicts[0].reason.contains("file activity"));
}

#[test]
fn test_file_reasons_deduplicated_and_sorted() {
    let file_reasons = vec![
        "b reason".to_string(),
        "a reason".to_string(),
        "b reason".to_string(),
    ];
    let flags = vec![flag(1, "p", true, "r")];
    let verdicts = correlate(&flags, &HashSet::new(), &file_reasons);
    assert!(verdicts[0].reason.ends_with("(a reason; b reason)"));
}

#[test]
fn test_output_sorted_by_pid() {
    let flags = vec![
        flag(30, "c", false, ""),
        flag(10, "a", false, ""),
        flag(20, "b", false, ""),
    ];
    let verdicts = correlate(&flags, &HashSet::new(), &[]);
    let pids: Vec<u32> = verdicts.iter().map(|v| v.pid).collect();
    assert_eq!(pids, vec![10, 20, 30]);
}

#[test]
fn test_duplicate_pid_latest_row_wins() {
    let flags = vec![
        flag(42, "logger", false, ""),
        flag(42, "logger", true, "Long runtime (non-whitelisted process)"),
    ];
    let verdicts = correlate(&flags, &HashSet::new(), &[]);
    assert_eq!(verdicts.len(), 1);
    assert_eq!(verdicts[0].verdict, VerdictLabel::SuspiciousKeylogger);
}

#[test]
fn test_idempotent_on_identical_inputs() {
    let flags = vec![
        flag(1, "a", true, "Long runtime (non-whitelisted process)"),
        flag(2, "b", false, ""),
        flag(3, "c", true, "Known malicious invocation detected via command line"),
    ];
    let visible: HashSet<u32> = [2, 3].into_iter().collect();
    let file_reasons = vec!["Large file size growth (11 bytes)".to_string()];

    let first = correlate(&flags, &visible, &file_reasons);
    let second = correlate(&flags, &visible, &file_reasons);
    assert_eq!(first, second);
}

#[test]
fn test_empty_inputs_do_not_crash() {
    let verdicts = correlate(&[], &HashSet::new(), &[]);
    assert!(verdicts.is_empty());
}
