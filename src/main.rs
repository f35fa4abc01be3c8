use anyhow::Result;
use keywatch::{
    collector::{
        CommandUiCollector, FileCollector, LinuxFileCollector, LinuxNetCollector,
        LinuxProcessCollector, NetCollector, ProcessCollector, UiCollector,
    },
    config::{Config, FileMonitorConfig, NetworkMonitorConfig, ProcessMonitorConfig},
    correlator::correlate,
    detector::{
        ConnectionRateDetector, FileActivityDetector, ProcessDetector, Verdict, VerdictLabel,
    },
    notifier,
    store::{NoUiProcess, Store},
    window::unix_now,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

/// Upper bound on a single OS enumeration; a hung call skips that cycle
/// instead of wedging the monitor.
const ADAPTER_TIMEOUT: Duration = Duration::from_secs(5);

/// Run a blocking observation adapter off the runtime, bounded in time.
async fn observe<T, F>(what: &'static str, f: F) -> Option<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(ADAPTER_TIMEOUT, tokio::task::spawn_blocking(f)).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(e)) => {
            error!("{} observation failed: {}", what, e);
            None
        }
        Err(_) => {
            warn!("{} observation timed out after {:?}", what, ADAPTER_TIMEOUT);
            None
        }
    }
}

async fn file_monitor(
    config: FileMonitorConfig,
    poll_seconds: u64,
    store: Arc<Mutex<Store>>,
    mut stop: broadcast::Receiver<()>,
) {
    let collector = Arc::new(LinuxFileCollector::new(config.watch_dir.clone()));
    let mut detector = FileActivityDetector::new(config);
    let mut interval = tokio::time::interval(Duration::from_secs(poll_seconds));

    info!("file monitor watching {:?}", collector.dir());
    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = stop.recv() => break,
        }

        let scanner = Arc::clone(&collector);
        let Some(observations) = observe("file", move || scanner.scan()).await else {
            continue;
        };

        let now = unix_now();
        let mut flagged = Vec::new();
        for obs in &observations {
            if let Some(flag) = detector.check(obs, now) {
                flagged.push(flag);
            }
        }
        debug!(
            "file cycle: {} files seen, {} tracked, {} flagged",
            observations.len(),
            detector.tracked_files(),
            flagged.len()
        );

        if flagged.is_empty() {
            continue;
        }
        let store = store.lock().await;
        for flag in &flagged {
            match store.insert_file_flag(flag) {
                Ok(true) => info!("file flagged: {} ({})", flag.filename, flag.reason),
                Ok(false) => {}
                Err(e) => error!("failed to save file flag: {}", e),
            }
        }
    }
    info!("file monitor stopped");
}

async fn network_monitor(
    config: NetworkMonitorConfig,
    poll_seconds: u64,
    store: Arc<Mutex<Store>>,
    mut stop: broadcast::Receiver<()>,
) {
    let collector = Arc::new(LinuxNetCollector::new());
    let mut detector = ConnectionRateDetector::new(config);
    let mut interval = tokio::time::interval(Duration::from_secs(poll_seconds));

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = stop.recv() => break,
        }

        let scanner = Arc::clone(&collector);
        let Some(observations) = observe("network", move || scanner.scan()).await else {
            continue;
        };

        let now = unix_now();
        let mut flagged = Vec::new();
        for obs in &observations {
            if let Some(flag) = detector.check(obs, now) {
                flagged.push(flag);
            }
        }
        debug!(
            "network cycle: {} connected processes, {} tracked, {} flagged",
            observations.len(),
            detector.tracked_processes(),
            flagged.len()
        );

        if flagged.is_empty() {
            continue;
        }
        let store = store.lock().await;
        for flag in &flagged {
            match store.insert_net_flag(flag) {
                Ok(true) => info!(
                    "network flagged: pid {} {} ({})",
                    flag.pid, flag.process_name, flag.reason
                ),
                Ok(false) => {}
                Err(e) => error!("failed to save network flag: {}", e),
            }
        }
    }
    info!("network monitor stopped");
}

async fn process_monitor(
    config: ProcessMonitorConfig,
    poll_seconds: u64,
    store: Arc<Mutex<Store>>,
    mut stop: broadcast::Receiver<()>,
) {
    let processes = Arc::new(LinuxProcessCollector::new());
    let ui = Arc::new(CommandUiCollector::new());
    let detector = ProcessDetector::new(config);
    let mut interval = tokio::time::interval(Duration::from_secs(poll_seconds));

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = stop.recv() => break,
        }

        let lister = Arc::clone(&processes);
        let Some(process_list) = observe("process", move || lister.list_processes()).await else {
            continue;
        };

        let checker = Arc::clone(&ui);
        let visible = match observe("ui", move || checker.visible_pids()).await {
            Some(Ok(pids)) => Some(pids),
            Some(Err(e)) => {
                warn!("ui snapshot unavailable: {:#}", e);
                None
            }
            None => None,
        };

        let flags: Vec<_> = process_list.iter().map(|p| detector.check(p)).collect();
        let suspicious = flags.iter().filter(|f| f.suspicious).count();

        // Without UI data every process is treated as visible, so UI
        // absence never becomes evidence on a degraded cycle.
        let no_ui: Vec<NoUiProcess> = match &visible {
            Some(pids) => process_list
                .iter()
                .filter(|p| !pids.contains(&p.pid))
                .map(|p| NoUiProcess {
                    pid: p.pid,
                    process_name: p.name.clone(),
                    cmdline: p.cmdline.clone(),
                })
                .collect(),
            None => Vec::new(),
        };

        debug!(
            "process cycle: {} processes, {} suspicious, {} without UI",
            process_list.len(),
            suspicious,
            no_ui.len()
        );

        let store = store.lock().await;
        if let Err(e) = store.replace_process_flags(&flags) {
            error!("failed to save process flags: {}", e);
        }
        if let Err(e) = store.replace_no_ui(&no_ui) {
            error!("failed to save ui snapshot: {}", e);
        }
    }
    info!("process monitor stopped");
}

/// Merge the accumulated per-source results into one verdict per process
/// and persist the verdict set atomically.
async fn run_correlation(store: &Mutex<Store>) -> Result<Vec<Verdict>> {
    let store = store.lock().await;
    let flags = store.get_process_flags()?;
    let no_ui = store.get_no_ui_pids()?;
    let file_reasons = store.get_file_reasons()?;

    let visible: HashSet<u32> = flags
        .iter()
        .map(|f| f.pid)
        .filter(|pid| !no_ui.contains(pid))
        .collect();

    let verdicts = correlate(&flags, &visible, &file_reasons);
    store.replace_verdicts(&verdicts)?;
    Ok(verdicts)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    info!("keywatch daemon starting...");

    let config_path = Config::config_path();
    let config = if config_path.exists() {
        Config::load(&config_path).unwrap_or_else(|e| {
            warn!("failed to load config: {}, using defaults", e);
            Config::default()
        })
    } else {
        info!("no config file found, using defaults");
        Config::default()
    };

    let store = Store::open_default()?;
    store.init_schema()?;
    let store = Arc::new(Mutex::new(store));

    let (stop_tx, _) = broadcast::channel(1);
    let poll = config.general.poll_interval_seconds;

    let tasks = vec![
        tokio::spawn(file_monitor(
            config.file.clone(),
            poll,
            Arc::clone(&store),
            stop_tx.subscribe(),
        )),
        tokio::spawn(network_monitor(
            config.network.clone(),
            poll,
            Arc::clone(&store),
            stop_tx.subscribe(),
        )),
        tokio::spawn(process_monitor(
            config.process.clone(),
            poll,
            Arc::clone(&store),
            stop_tx.subscribe(),
        )),
    ];

    info!("monitors running; interrupt to stop and produce verdicts");
    tokio::signal::ctrl_c().await?;
    info!("stop requested, finishing in-flight cycles...");
    let _ = stop_tx.send(());
    for task in tasks {
        let _ = task.await;
    }

    let verdicts = run_correlation(&store).await?;
    let mut suspicious = 0;
    for verdict in &verdicts {
        if verdict.verdict != VerdictLabel::SuspiciousKeylogger {
            continue;
        }
        suspicious += 1;
        warn!(
            "verdict: pid {} {} -> {} ({})",
            verdict.pid,
            verdict.process_name,
            verdict.verdict.as_str(),
            verdict.reason
        );
        let title = format!("keywatch: {}", verdict.process_name);
        if let Err(e) = notifier::send_notification(&title, &verdict.reason) {
            warn!("notification failed: {}", e);
        }
    }

    info!(
        "final detection completed: {} processes, {} suspicious, results at {:?}",
        verdicts.len(),
        suspicious,
        Store::default_path()
    );
    Ok(())
}
