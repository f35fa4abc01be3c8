use keywatch::window::SlidingWindow;

#[test]
fn test_first_sight_records_baseline_only() {
    let mut window: SlidingWindow<String> = SlidingWindow::new(30);
    let stat = window.observe_growth(&"log.txt".to_string(), 100, 500);
    assert!(stat.is_none());
    assert_eq!(window.event_count(&"log.txt".to_string()), 0);
}

#[test]
fn test_growth_events_accumulate() {
    let mut window: SlidingWindow<String> = SlidingWindow::new(30);
    let key = "log.txt".to_string();
    assert!(window.observe_growth(&key, 0, 100).is_none());

    let stat = window.observe_growth(&key, 5, 110).unwrap();
    assert_eq!(stat.write_count, 1);
    assert_eq!(stat.delta, 10);

    let stat = window.observe_growth(&key, 12, 130).unwrap();
    assert_eq!(stat.write_count, 2);
    assert_eq!(stat.delta, 20);
}

#[test]
fn test_shrinkage_is_not_activity() {
    let mut window: SlidingWindow<String> = SlidingWindow::new(30);
    let key = "log.txt".to_string();
    window.observe_growth(&key, 0, 100);

    let stat = window.observe_growth(&key, 5, 40).unwrap();
    assert_eq!(stat.write_count, 0);
    assert_eq!(stat.delta, -60);

    // Baseline stays at the last known high-water mark.
    let stat = window.observe_growth(&key, 10, 120).unwrap();
    assert_eq!(stat.write_count, 1);
    assert_eq!(stat.delta, 20);
}

#[test]
fn test_pruning_invariant_growth() {
    let mut window: SlidingWindow<String> = SlidingWindow::new(30);
    let key = "log.txt".to_string();
    window.observe_growth(&key, 0, 100);
    window.observe_growth(&key, 5, 110);
    window.observe_growth(&key, 20, 120);

    // The event from t=5 is now 35s old and must be gone.
    let stat = window.observe_growth(&key, 40, 130).unwrap();
    assert_eq!(stat.write_count, 2);
    for (ts, _) in window.history(&key).unwrap() {
        assert!(40 - ts <= 30, "retained entry at t={} outside window", ts);
    }
}

#[test]
fn test_observe_every_ages_out() {
    let mut window: SlidingWindow<u32> = SlidingWindow::new(60);
    window.observe_every(&7, 0, 10);
    window.observe_every(&7, 30, 10);
    assert_eq!(window.count_over(&7, 3), 2);

    // t=0 entry falls out of the 60s window.
    window.observe_every(&7, 70, 1);
    assert_eq!(window.count_over(&7, 3), 1);
    assert_eq!(window.event_count(&7), 2);
    for (ts, _) in window.history(&7).unwrap() {
        assert!(70 - ts <= 60);
    }
}

#[test]
fn test_count_over_uses_strict_comparison() {
    let mut window: SlidingWindow<u32> = SlidingWindow::new(60);
    window.observe_every(&1, 0, 3);
    window.observe_every(&1, 1, 4);
    assert_eq!(window.count_over(&1, 3), 1);
}

#[test]
fn test_entities_are_independent() {
    let mut window: SlidingWindow<String> = SlidingWindow::new(30);
    let a = "a.txt".to_string();
    let b = "b.txt".to_string();
    window.observe_growth(&a, 0, 100);
    window.observe_growth(&a, 5, 200);
    window.observe_growth(&b, 5, 50);

    assert_eq!(window.event_count(&a), 1);
    assert_eq!(window.event_count(&b), 0);
    assert_eq!(window.tracked(), 2);
}
