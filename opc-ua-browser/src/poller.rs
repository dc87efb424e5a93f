use crate::inventory::{Inventory, build_inventory};
use arc_swap::ArcSwap;
use opc_ua_client::{
    ConnectionState, NodeClass, NodeHandle, NodeId, SessionError, SessionResult, UaSession,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Lifecycle state of the poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    /// Not started, or start failed; a fresh start request is required.
    Idle,
    /// Establishing the session.
    Connecting,
    /// Rebuild task running on the fixed interval.
    Polling,
    /// Explicitly stopped; the last snapshot stays readable.
    Stopped,
}

/// Owns the inventory lifecycle: one immediate build on start, then a full
/// wholesale rebuild per tick.
///
/// Rebuilds are serialized structurally: a single task awaits each rebuild
/// before taking the next tick, and missed ticks are skipped, so two
/// rebuilds never run concurrently against one snapshot. Readers see either
/// the old or the new complete inventory, never a half-built one.
pub struct Poller {
    session: Arc<dyn UaSession>,
    snapshot: Arc<ArcSwap<Inventory>>,
    state_tx: watch::Sender<PollerState>,
    poll_interval: Duration,
    op_timeout: Duration,
    stop_tx: Option<watch::Sender<bool>>,
}

impl Poller {
    pub fn new(session: Arc<dyn UaSession>, poll_interval: Duration, op_timeout: Duration) -> Self {
        let (state_tx, _) = watch::channel(PollerState::Idle);
        Self {
            session,
            snapshot: Arc::new(ArcSwap::from_pointee(Inventory::new())),
            state_tx,
            poll_interval,
            op_timeout,
            stop_tx: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PollerState {
        *self.state_tx.borrow()
    }

    /// Watch channel for state transitions, for callers that want to react
    /// rather than poll.
    pub fn state_watch(&self) -> watch::Receiver<PollerState> {
        self.state_tx.subscribe()
    }

    /// The current inventory snapshot. Always complete: empty before the
    /// first successful build, last-known after a stop.
    pub fn snapshot(&self) -> Arc<Inventory> {
        self.snapshot.load_full()
    }

    /// Connect (if not already connected) and begin polling.
    ///
    /// The first rebuild fires immediately, then once per interval. Starting
    /// an already-polling instance is a no-op.
    ///
    /// # Errors
    /// Returns `Err` and falls back to `Idle` when the session cannot be
    /// established; there is no retry loop, a fresh start request is
    /// required.
    pub async fn start(&mut self, endpoint: &str) -> SessionResult<()> {
        match self.state() {
            PollerState::Connecting | PollerState::Polling => {
                tracing::debug!("start requested while already active, ignoring");
                return Ok(());
            }
            PollerState::Idle | PollerState::Stopped => {}
        }

        self.set_state(PollerState::Connecting);
        if let Err(error) = self.establish(endpoint).await {
            tracing::error!(endpoint = %endpoint, error = %error, "connect failed");
            self.set_state(PollerState::Idle);
            return Err(error);
        }
        tracing::info!(endpoint = %endpoint, "session established, polling started");

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let session = Arc::clone(&self.session);
        let snapshot = Arc::clone(&self.snapshot);
        let poll_interval = self.poll_interval;
        let op_timeout = self.op_timeout;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    // Stop wins over a due tick: no rebuild starts after the
                    // stop request, an in-flight one has already finished.
                    biased;
                    _ = stop_rx.changed() => break,
                    _ = ticker.tick() => {
                        rebuild_once(session.as_ref(), &snapshot, op_timeout).await;
                    }
                }
            }
            tracing::debug!("poll task exiting cleanly");
        });

        self.stop_tx = Some(stop_tx);
        self.set_state(PollerState::Polling);
        Ok(())
    }

    /// Stop polling. Effective before the next tick fires; an in-flight
    /// rebuild is allowed to complete. The last-known snapshot remains
    /// readable until a new start request replaces it.
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
            tracing::info!("polling stopped");
        }
        self.set_state(PollerState::Stopped);
    }

    async fn establish(&self, endpoint: &str) -> SessionResult<()> {
        if self.session.state() != ConnectionState::Connected {
            tokio::time::timeout(self.op_timeout, self.session.connect(endpoint))
                .await
                .map_err(|_| SessionError::Timeout {
                    operation: "connect",
                    secs: self.op_timeout.as_secs(),
                })??;
        }
        if self.session.state() != ConnectionState::Connected {
            return Err(SessionError::Connection(format!(
                "session to {endpoint} did not reach connected state"
            )));
        }
        Ok(())
    }

    fn set_state(&self, state: PollerState) {
        self.state_tx.send_replace(state);
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
        }
    }
}

/// One tick: rebuild wholesale and swap the snapshot atomically. Failures
/// keep the previous snapshot and the timer alive; the next tick retries
/// from scratch.
async fn rebuild_once(
    session: &dyn UaSession,
    snapshot: &ArcSwap<Inventory>,
    op_timeout: Duration,
) {
    let root = NodeHandle::new(NodeId::objects_folder(), "Objects", NodeClass::Object);
    match tokio::time::timeout(op_timeout, build_inventory(session, &root)).await {
        Ok(Ok(inventory)) => {
            snapshot.store(Arc::new(inventory));
        }
        Ok(Err(error)) => {
            tracing::warn!(error = %error, "rebuild failed, keeping previous snapshot");
        }
        Err(_) => {
            tracing::warn!(
                timeout_secs = op_timeout.as_secs(),
                "rebuild timed out, keeping previous snapshot"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::TypeTag;
    use async_trait::async_trait;
    use opc_ua_client::{Value, WriteResult};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Session fake that serves one Int32 variable and records rebuild
    /// concurrency: `active` counts walks in flight, `overlap` latches if
    /// two ever run at once.
    struct CountingSession {
        connected: AtomicBool,
        fail_connect: bool,
        fail_browse: AtomicBool,
        browse_delay: Duration,
        rebuilds: AtomicUsize,
        active: AtomicUsize,
        overlap: AtomicBool,
    }

    impl CountingSession {
        fn new(browse_delay: Duration) -> Self {
            Self {
                connected: AtomicBool::new(false),
                fail_connect: false,
                fail_browse: AtomicBool::new(false),
                browse_delay,
                rebuilds: AtomicUsize::new(0),
                active: AtomicUsize::new(0),
                overlap: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl UaSession for CountingSession {
        async fn connect(&self, _endpoint: &str) -> SessionResult<()> {
            if self.fail_connect {
                return Err(SessionError::Connection("endpoint unreachable".into()));
            }
            self.connected.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn state(&self) -> ConnectionState {
            if self.connected.load(Ordering::SeqCst) {
                ConnectionState::Connected
            } else {
                ConnectionState::Disconnected
            }
        }

        async fn browse_children(&self, node: &NodeId) -> SessionResult<Vec<NodeHandle>> {
            if self.fail_browse.load(Ordering::SeqCst) {
                return Err(SessionError::Browse {
                    node: node.clone(),
                    message: "connection dropped".into(),
                });
            }
            if node.as_str() == "i=85" {
                if self.active.fetch_add(1, Ordering::SeqCst) > 0 {
                    self.overlap.store(true, Ordering::SeqCst);
                }
                tokio::time::sleep(self.browse_delay).await;
                self.active.fetch_sub(1, Ordering::SeqCst);
                self.rebuilds.fetch_add(1, Ordering::SeqCst);
                return Ok(vec![NodeHandle::new(
                    "ns=2;s=Speed",
                    "Speed",
                    NodeClass::Variable,
                )]);
            }
            Ok(Vec::new())
        }

        async fn read_value(&self, _node: &NodeId) -> SessionResult<Option<Value>> {
            Ok(Some(Value::Int32(7)))
        }

        async fn write_value(&self, _node: &NodeId, _value: Value) -> SessionResult<WriteResult> {
            Ok(WriteResult::good())
        }
    }

    fn poller_with(session: Arc<CountingSession>, interval_ms: u64) -> Poller {
        Poller::new(
            session,
            Duration::from_millis(interval_ms),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_start_builds_immediately_and_keeps_rebuilding() {
        let session = Arc::new(CountingSession::new(Duration::ZERO));
        let mut poller = poller_with(Arc::clone(&session), 20);

        poller.start("opc.tcp://localhost:4840").await.unwrap();
        assert_eq!(poller.state(), PollerState::Polling);

        tokio::time::sleep(Duration::from_millis(10)).await;
        let first = poller.snapshot();
        assert_eq!(first.tags(), vec![TypeTag::Int32]);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(session.rebuilds.load(Ordering::SeqCst) >= 2);
        // Snapshots are replaced wholesale, not mutated.
        assert!(!Arc::ptr_eq(&first, &poller.snapshot()));
        poller.stop();
    }

    #[tokio::test]
    async fn test_connect_failure_falls_back_to_idle() {
        let mut session = CountingSession::new(Duration::ZERO);
        session.fail_connect = true;
        let mut poller = poller_with(Arc::new(session), 20);

        let result = poller.start("opc.tcp://nowhere:4840").await;
        assert!(matches!(result, Err(SessionError::Connection(_))));
        assert_eq!(poller.state(), PollerState::Idle);
        assert!(poller.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_ticks_never_overlap() {
        // Each rebuild takes 3x the interval; missed ticks must be skipped,
        // never run concurrently.
        let session = Arc::new(CountingSession::new(Duration::from_millis(30)));
        let mut poller = poller_with(Arc::clone(&session), 10);

        poller.start("opc.tcp://localhost:4840").await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        poller.stop();

        assert!(session.rebuilds.load(Ordering::SeqCst) >= 2);
        assert!(!session.overlap.load(Ordering::SeqCst), "rebuilds overlapped");
    }

    #[tokio::test]
    async fn test_tick_failure_keeps_timer_and_snapshot() {
        let session = Arc::new(CountingSession::new(Duration::ZERO));
        let mut poller = poller_with(Arc::clone(&session), 10);

        poller.start("opc.tcp://localhost:4840").await.unwrap();
        tokio::time::sleep(Duration::from_millis(25)).await;
        let before = poller.snapshot();
        assert!(!before.is_empty());

        // Simulate the connection dropping: every rebuild now fails.
        session.fail_browse.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(poller.state(), PollerState::Polling);
        assert!(Arc::ptr_eq(&before, &poller.snapshot()));

        // And recovers on its own once the server is reachable again.
        session.fail_browse.store(false, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(!Arc::ptr_eq(&before, &poller.snapshot()));
        poller.stop();
    }

    #[tokio::test]
    async fn test_stop_halts_rebuilds_and_keeps_last_snapshot() {
        let session = Arc::new(CountingSession::new(Duration::ZERO));
        let mut poller = poller_with(Arc::clone(&session), 10);

        poller.start("opc.tcp://localhost:4840").await.unwrap();
        tokio::time::sleep(Duration::from_millis(25)).await;
        poller.stop();
        assert_eq!(poller.state(), PollerState::Stopped);

        let at_stop = session.rebuilds.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(session.rebuilds.load(Ordering::SeqCst), at_stop);

        // Stale-but-available: the last inventory is still readable.
        assert_eq!(poller.snapshot().tags(), vec![TypeTag::Int32]);
    }

    #[tokio::test]
    async fn test_restart_after_stop() {
        let session = Arc::new(CountingSession::new(Duration::ZERO));
        let mut poller = poller_with(Arc::clone(&session), 10);

        poller.start("opc.tcp://localhost:4840").await.unwrap();
        poller.stop();
        poller.start("opc.tcp://localhost:4840").await.unwrap();
        assert_eq!(poller.state(), PollerState::Polling);
        tokio::time::sleep(Duration::from_millis(15)).await;
        assert!(!poller.snapshot().is_empty());
        poller.stop();
    }
}
