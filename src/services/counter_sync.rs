/// Counter sync worker
///
/// One background thread owns a current-thread Tokio runtime and runs every
/// counter call as a task in a `JoinSet`. The UI thread enqueues jobs through a
/// bounded channel and drains results from a single-consumer channel.
///
/// Results are delivered in the order responses arrive, not the order requests
/// were issued. Under network jitter an older response can overwrite a newer
/// one; `seq` only lets the consumer notice that happened.
use crate::config::AppConfig;
use crate::constants::{MAX_IN_FLIGHT_SYNCS, SYNC_QUEUE_CAPACITY, WORKER_SHUTDOWN_GRACE_MILLIS};
use crate::state::orb_state::OrbKind;
use crate::utils::errors::SyncError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinSet;

/// Why a sync call was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    Startup,
    Timer,
    Click(OrbKind),
}

impl std::fmt::Display for SyncTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncTrigger::Startup => write!(f, "startup"),
            SyncTrigger::Timer => write!(f, "timer"),
            SyncTrigger::Click(orb) => write!(f, "click:{}", orb.name()),
        }
    }
}

/// Result of one finished sync call
#[derive(Debug)]
pub struct SyncOutcome {
    pub seq: u64,
    pub trigger: SyncTrigger,
    pub result: Result<u64, SyncError>,
}

/// Called after each outcome is queued so the UI can wake up
pub type RepaintNotifier = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub url: String,
    pub timeout: Duration,
    pub queue_capacity: usize,
    pub max_in_flight: usize,
}

impl From<&AppConfig> for SyncSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            url: config.counter_url.clone(),
            timeout: config.request_timeout,
            queue_capacity: SYNC_QUEUE_CAPACITY,
            max_in_flight: MAX_IN_FLIGHT_SYNCS,
        }
    }
}

struct SyncJob {
    seq: u64,
    trigger: SyncTrigger,
}

pub struct CounterSync {
    job_tx: Option<tokio::sync::mpsc::Sender<SyncJob>>,
    outcome_rx: Receiver<SyncOutcome>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: usize,
    next_seq: u64,
    worker: Option<JoinHandle<()>>,
}

impl CounterSync {
    /// Spawn the worker thread. Calls are only issued through `request`.
    pub fn start(settings: SyncSettings, notify: RepaintNotifier) -> Self {
        let (job_tx, job_rx) = tokio::sync::mpsc::channel(settings.queue_capacity.max(1));
        let (outcome_tx, outcome_rx) = channel();
        let in_flight = Arc::new(AtomicUsize::new(0));
        let max_in_flight = settings.max_in_flight.max(1);

        log::info!(
            "[CounterSync] Starting worker for {} (timeout {:?})",
            settings.url,
            settings.timeout
        );

        let in_flight_clone = Arc::clone(&in_flight);
        let worker = std::thread::spawn(move || {
            run_worker(settings, job_rx, outcome_tx, in_flight_clone, notify);
        });

        Self {
            job_tx: Some(job_tx),
            outcome_rx,
            in_flight,
            max_in_flight,
            next_seq: 0,
            worker: Some(worker),
        }
    }

    /// Issue one sync call without blocking. Returns the call's sequence number,
    /// or `None` if the call was not issued (timer tick skipped, queue full,
    /// worker gone).
    pub fn request(&mut self, trigger: SyncTrigger) -> Option<u64> {
        if trigger == SyncTrigger::Timer && self.in_flight() >= self.max_in_flight {
            log::debug!(
                "[CounterSync] Skipping timer sync, {} calls still in flight",
                self.in_flight()
            );
            return None;
        }

        let Some(job_tx) = self.job_tx.as_ref() else {
            log::warn!("[CounterSync] {} sync dropped: {}", trigger, SyncError::Unavailable);
            return None;
        };

        self.next_seq += 1;
        let seq = self.next_seq;
        self.in_flight.fetch_add(1, Ordering::SeqCst);

        match job_tx.try_send(SyncJob { seq, trigger }) {
            Ok(()) => {
                log::debug!("[CounterSync] Queued sync #{} ({})", seq, trigger);
                Some(seq)
            }
            Err(TrySendError::Full(_)) => {
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                log::warn!("[CounterSync] Sync queue full, dropping #{} ({})", seq, trigger);
                None
            }
            Err(TrySendError::Closed(_)) => {
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
                log::warn!("[CounterSync] {} sync dropped: {}", trigger, SyncError::Unavailable);
                None
            }
        }
    }

    /// Next finished call, in arrival order
    pub fn try_recv(&self) -> Option<SyncOutcome> {
        self.outcome_rx.try_recv().ok()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Cancel every in-flight call and join the worker thread
    pub fn shutdown(&mut self) {
        // Dropping the sender ends the worker's receive loop
        if self.job_tx.take().is_none() {
            return;
        }

        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("[CounterSync] Worker thread panicked");
            }
        }
        log::info!("[CounterSync] Worker stopped");
    }
}

impl Drop for CounterSync {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(
    settings: SyncSettings,
    mut job_rx: tokio::sync::mpsc::Receiver<SyncJob>,
    outcome_tx: Sender<SyncOutcome>,
    in_flight: Arc<AtomicUsize>,
    notify: RepaintNotifier,
) {
    let rt = match crate::utils::error_handling::create_runtime() {
        Ok(r) => r,
        Err(e) => {
            log::error!("[CounterSync] {}", e);
            return; // Receiver drops; later requests report Unavailable
        }
    };

    let client = match crate::utils::http::counter_client(settings.timeout) {
        Ok(c) => c,
        Err(e) => {
            log::error!("[CounterSync] Failed to build HTTP client: {}", e);
            return;
        }
    };

    let url = Arc::new(settings.url);

    rt.block_on(async move {
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                job = job_rx.recv() => {
                    let Some(SyncJob { seq, trigger }) = job else {
                        break;
                    };
                    let client = client.clone();
                    let url = Arc::clone(&url);
                    let outcome_tx = outcome_tx.clone();
                    let in_flight = Arc::clone(&in_flight);
                    let notify = Arc::clone(&notify);

                    tasks.spawn(async move {
                        let result = crate::api::counter::fetch_or_increment(&client, &url).await;
                        in_flight.fetch_sub(1, Ordering::SeqCst);

                        match &result {
                            Ok(count) => log::debug!("[CounterSync] #{} ({}) -> {}", seq, trigger, count),
                            Err(e) => log::warn!("[CounterSync] Sync #{} ({}) failed: {}", seq, trigger, e),
                        }

                        if outcome_tx.send(SyncOutcome { seq, trigger, result }).is_ok() {
                            (*notify)();
                        }
                    });
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            log::error!("[CounterSync] Sync task panicked: {}", e);
                        }
                    }
                }
            }
        }

        if !tasks.is_empty() {
            log::info!("[CounterSync] Cancelling {} in-flight sync call(s)", tasks.len());
        }
        tasks.shutdown().await;
    });

    // Blocking resolver lookups may still be parked; don't let them hold up close
    crate::utils::error_handling::shutdown_runtime(rt, Duration::from_millis(WORKER_SHUTDOWN_GRACE_MILLIS));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::counter::test_server::{always, spawn};
    use crate::state::counter_state::CounterState;
    use std::time::Instant;

    fn settings(url: &str) -> SyncSettings {
        SyncSettings {
            url: url.to_string(),
            timeout: Duration::from_secs(2),
            queue_capacity: 16,
            max_in_flight: 4,
        }
    }

    fn no_repaint() -> RepaintNotifier {
        Arc::new(|| {})
    }

    fn wait_for(sync: &CounterSync, n: usize) -> Vec<SyncOutcome> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut outcomes = Vec::new();
        while outcomes.len() < n && Instant::now() < deadline {
            match sync.outcome_rx.recv_timeout(Duration::from_millis(50)) {
                Ok(outcome) => outcomes.push(outcome),
                Err(_) => continue,
            }
        }
        outcomes
    }

    #[test]
    fn click_delivers_server_count_and_wakes_ui() {
        let server = spawn(always(200, r#"{"count": 42}"#));
        let repaints = Arc::new(AtomicUsize::new(0));
        let repaints_clone = Arc::clone(&repaints);
        let mut sync = CounterSync::start(
            settings(&server.url),
            Arc::new(move || {
                repaints_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let seq = sync.request(SyncTrigger::Click(OrbKind::Red));
        assert_eq!(seq, Some(1));

        let outcomes = wait_for(&sync, 1);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].seq, 1);
        assert_eq!(outcomes[0].trigger, SyncTrigger::Click(OrbKind::Red));
        assert_eq!(outcomes[0].result.as_ref().ok(), Some(&42));

        // notify runs right after the outcome is sent
        let deadline = Instant::now() + Duration::from_secs(2);
        while repaints.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(repaints.load(Ordering::SeqCst), 1);
        assert_eq!(sync.in_flight(), 0);
    }

    #[test]
    fn server_error_is_reported_as_failed_outcome() {
        let server = spawn(always(500, "oops"));
        let mut sync = CounterSync::start(settings(&server.url), no_repaint());
        sync.request(SyncTrigger::Startup);

        let outcomes = wait_for(&sync, 1);
        assert!(matches!(outcomes[0].result, Err(SyncError::Status(500))));
    }

    #[test]
    fn responses_apply_in_arrival_order() {
        // First request is slow, second is fast: the older response lands last
        let server = spawn(Box::new(|index| match index {
            0 => (Duration::from_millis(400), 200, r#"{"count": 1}"#.to_string()),
            _ => (Duration::ZERO, 200, r#"{"count": 2}"#.to_string()),
        }));
        let mut sync = CounterSync::start(settings(&server.url), no_repaint());

        sync.request(SyncTrigger::Click(OrbKind::Blue));
        std::thread::sleep(Duration::from_millis(100));
        sync.request(SyncTrigger::Timer);

        let outcomes = wait_for(&sync, 2);
        let order: Vec<u64> = outcomes.iter().map(|o| o.seq).collect();
        assert_eq!(order, vec![2, 1]);

        let mut state = CounterState::new(Duration::from_millis(500), Instant::now());
        for outcome in &outcomes {
            state.apply(outcome);
        }
        assert_eq!(state.value(), 1);
    }

    #[test]
    fn timer_ticks_are_skipped_at_the_in_flight_limit() {
        let server = spawn(Box::new(|_| (Duration::from_millis(800), 200, r#"{"count": 3}"#.into())));
        let mut sync = CounterSync::start(
            SyncSettings {
                max_in_flight: 1,
                ..settings(&server.url)
            },
            no_repaint(),
        );

        assert!(sync.request(SyncTrigger::Startup).is_some());
        assert_eq!(sync.request(SyncTrigger::Timer), None);
        // Clicks are never skipped
        assert!(sync.request(SyncTrigger::Click(OrbKind::Blue)).is_some());
        assert_eq!(sync.in_flight(), 2);

        let outcomes = wait_for(&sync, 2);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(sync.in_flight(), 0);
        assert!(sync.request(SyncTrigger::Timer).is_some());
    }

    #[test]
    fn shutdown_cancels_hung_calls_promptly() {
        let server = spawn(Box::new(|_| (Duration::from_secs(30), 200, "{}".into())));
        let mut sync = CounterSync::start(
            SyncSettings {
                timeout: Duration::from_secs(30),
                ..settings(&server.url)
            },
            no_repaint(),
        );
        sync.request(SyncTrigger::Startup);
        std::thread::sleep(Duration::from_millis(100));

        let started = Instant::now();
        sync.shutdown();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(sync.try_recv().is_none());
    }

    #[test]
    fn requests_after_shutdown_are_not_issued() {
        let server = spawn(always(200, r#"{"count": 1}"#));
        let mut sync = CounterSync::start(settings(&server.url), no_repaint());
        sync.shutdown();
        assert_eq!(sync.request(SyncTrigger::Click(OrbKind::Red)), None);
        assert_eq!(sync.in_flight(), 0);
    }
}
