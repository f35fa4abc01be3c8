use keywatch::detector::{FileFlag, NetFlag, ProcessFlag, Verdict, VerdictLabel};
use keywatch::store::{NoUiProcess, Store};
use tempfile::tempdir;

fn open_store(dir: &tempfile::TempDir) -> Store {
    let store = Store::open(&dir.path().join("results.db")).unwrap();
    store.init_schema().unwrap();
    store
}

fn file_flag() -> FileFlag {
    FileFlag {
        filename: "keys.log".to_string(),
        current_size_bytes: 115,
        write_count: 3,
        reason: "Frequent file writes (3 times in 30s)".to_string(),
    }
}

#[test]
fn test_create_store() {
    let dir = tempdir().unwrap();
    let _ = open_store(&dir);
    assert!(dir.path().join("results.db").exists());
}

#[test]
fn test_file_flags_deduplicate_exact_rows() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir);

    assert!(store.insert_file_flag(&file_flag()).unwrap());
    assert!(!store.insert_file_flag(&file_flag()).unwrap());

    let mut other = file_flag();
    other.current_size_bytes = 200;
    assert!(store.insert_file_flag(&other).unwrap());

    assert_eq!(store.get_file_flags().unwrap().len(), 2);
}

#[test]
fn test_file_reasons_are_distinct() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir);

    store.insert_file_flag(&file_flag()).unwrap();
    let mut other = file_flag();
    other.current_size_bytes = 200;
    store.insert_file_flag(&other).unwrap();

    let reasons = store.get_file_reasons().unwrap();
    assert_eq!(reasons, vec!["Frequent file writes (3 times in 30s)".to_string()]);
}

#[test]
fn test_net_flag_roundtrip() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir);

    let flag = NetFlag {
        pid: 42,
        process_name: "exfil".to_string(),
        connection_count: 9,
        times_exceeded: 3,
        reason: "Sustained connection activity (3 over-limit cycles in 60s, currently 9 connections)".to_string(),
    };
    assert!(store.insert_net_flag(&flag).unwrap());
    assert!(!store.insert_net_flag(&flag).unwrap());

    let stored = store.get_net_flags().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0], flag);
}

#[test]
fn test_process_flags_replaced_wholesale() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir);

    let first = vec![ProcessFlag {
        pid: 1,
        process_name: "old".to_string(),
        runtime: "00:00:10".to_string(),
        suspicious: false,
        reason: String::new(),
    }];
    store.replace_process_flags(&first).unwrap();

    let second = vec![
        ProcessFlag {
            pid: 2,
            process_name: "logger".to_string(),
            runtime: "00:02:00".to_string(),
            suspicious: true,
            reason: "Long runtime (non-whitelisted process)".to_string(),
        },
        ProcessFlag {
            pid: 3,
            process_name: "daemon".to_string(),
            runtime: "01:00:00".to_string(),
            suspicious: false,
            reason: String::new(),
        },
    ];
    store.replace_process_flags(&second).unwrap();

    let stored = store.get_process_flags().unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].pid, 2);
    assert!(stored[0].suspicious);
    assert_eq!(stored[1].pid, 3);
    assert!(!stored[1].suspicious);
}

#[test]
fn test_no_ui_snapshot_replaced_wholesale() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir);

    store
        .replace_no_ui(&[NoUiProcess {
            pid: 10,
            process_name: "old".to_string(),
            cmdline: String::new(),
        }])
        .unwrap();
    store
        .replace_no_ui(&[
            NoUiProcess {
                pid: 20,
                process_name: "a".to_string(),
                cmdline: "/bin/a".to_string(),
            },
            NoUiProcess {
                pid: 30,
                process_name: "b".to_string(),
                cmdline: "/bin/b".to_string(),
            },
        ])
        .unwrap();

    let pids = store.get_no_ui_pids().unwrap();
    assert!(!pids.contains(&10));
    assert!(pids.contains(&20));
    assert!(pids.contains(&30));
}

#[test]
fn test_verdicts_roundtrip_and_replace() {
    let dir = tempdir().unwrap();
    let store = open_store(&dir);

    let verdicts = vec![
        Verdict {
            pid: 42,
            process_name: "logger".to_string(),
            verdict: VerdictLabel::SuspiciousKeylogger,
            reason: "Long runtime (non-whitelisted process) + no visible UI".to_string(),
        },
        Verdict {
            pid: 99,
            process_name: "daemon".to_string(),
            verdict: VerdictLabel::Normal,
            reason: String::new(),
        },
    ];
    store.replace_verdicts(&verdicts).unwrap();
    assert_eq!(store.get_verdicts().unwrap(), verdicts);

    // A new pass replaces the old set entirely.
    store.replace_verdicts(&verdicts[1..]).unwrap();
    let stored = store.get_verdicts().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].pid, 99);
}
