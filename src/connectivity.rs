use crate::{
    error::{Result, ZenMatError},
    provider::{ConnectivityProvider, SimulatedProvider},
    types::{ConnectionState, ConnectionStatus, MatTelemetry, ProviderKind, SimulationConfig},
};
use futures::future::{AbortHandle, AbortRegistration, Abortable, Aborted};
use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Weak,
    },
};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

/// Connectivity operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Establish the mat link
    Connect,
    /// Tear the mat link down
    Disconnect,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connect"),
            Self::Disconnect => write!(f, "disconnect"),
        }
    }
}

/// Connection state container for a ZenMat
///
/// `Connectivity` owns the [`ConnectionState`] of the mat and drives a single
/// [`ConnectivityProvider`]. It is created once by the application root and handed
/// to screens, which read the state synchronously, subscribe to changes, and
/// request `connect`/`disconnect`. Cloning yields another handle to the same state.
///
/// # State machine
///
/// - Every operation sets the status to [`ConnectionStatus::Connecting`] and clears
///   `last_error` before the provider is called.
/// - A successful connect settles on `Connected`; a failed connect settles on
///   `Disconnected` with the failure message in `last_error`.
/// - A disconnect always settles on `Disconnected`. A transport failure is recorded
///   in `last_error` but the link is treated as gone.
/// - A cancelled connect settles on `Disconnected` with no `last_error`, so a cancel
///   shows no error. A cancelled disconnect restores the status held before it.
///
/// Only the most recently issued operation may settle the state. An older operation
/// that resolves afterwards is reported as [`ZenMatError::Superseded`] and writes
/// nothing, so overlapping requests can never leave the status stuck at
/// `Connecting`.
///
/// # Examples
///
/// ```no_run
/// use zenmat::{Connectivity, SimulationConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let connectivity = Connectivity::simulated(SimulationConfig::default())?;
///
///     match connectivity.connect().await {
///         Ok(()) => println!("Connected: {}", connectivity.status()),
///         Err(e) => println!("Failed: {}", e.user_message()),
///     }
///
///     connectivity.disconnect().await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Connectivity {
    inner: Arc<ConnectivityInner>,
}

struct ConnectivityInner {
    provider: Arc<dyn ConnectivityProvider>,
    state: watch::Sender<ConnectionState>,
    generation: AtomicU64,
}

/// Bookkeeping for one issued operation
#[derive(Debug, Clone, Copy)]
struct Ticket {
    generation: u64,
    operation: OperationKind,
    resting_before: ConnectionStatus,
}

impl Connectivity {
    /// Create a container driving the given provider, starting `Disconnected`
    pub fn new<P>(provider: P) -> Self
    where
        P: ConnectivityProvider + 'static,
    {
        Self::with_provider(Arc::new(provider))
    }

    /// Create a container driving an already shared provider
    #[must_use]
    pub fn with_provider(provider: Arc<dyn ConnectivityProvider>) -> Self {
        let (state, _) = watch::channel(ConnectionState::default());
        Self {
            inner: Arc::new(ConnectivityInner {
                provider,
                state,
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Create a container backed by the simulator
    ///
    /// # Errors
    ///
    /// Returns [`ZenMatError::InvalidParameters`] if the configuration is invalid.
    pub fn simulated(config: SimulationConfig) -> Result<Self> {
        Ok(Self::new(SimulatedProvider::new(config)?))
    }

    /// Kind of provider behind this container
    #[must_use]
    pub fn provider_kind(&self) -> ProviderKind {
        self.inner.provider.kind()
    }

    /// Current connection state
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.inner.state.borrow().clone()
    }

    /// Current connection status
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.inner.state.borrow().status
    }

    /// Check if the mat is connected
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.state.borrow().is_connected()
    }

    /// Subscribe to state changes
    #[must_use]
    pub fn subscribe(&self) -> StatusSubscription {
        StatusSubscription {
            receiver: self.inner.state.subscribe(),
        }
    }

    /// Connect to the mat and wait for the outcome
    ///
    /// Re-invoking while connected restarts the handshake. The operation runs on
    /// its own task: dropping the returned future detaches it, and it still settles
    /// the state.
    ///
    /// # Errors
    ///
    /// Returns the provider error (typically [`ZenMatError::ConnectionFailed`]) when
    /// the attempt fails; the same message is stored in `last_error`. Returns
    /// [`ZenMatError::Superseded`] if another operation was issued before this one
    /// settled.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub async fn connect(&self) -> Result<()> {
        self.spawn(OperationKind::Connect).wait().await
    }

    /// Disconnect from the mat and wait for the outcome
    ///
    /// Like [`connect`](Self::connect), dropping the returned future detaches the
    /// operation rather than abandoning it.
    ///
    /// # Errors
    ///
    /// Returns [`ZenMatError::DisconnectFailed`] if a transport provider reports a
    /// failure (the state still settles `Disconnected`), or
    /// [`ZenMatError::Superseded`] if another operation was issued first.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub async fn disconnect(&self) -> Result<()> {
        self.spawn(OperationKind::Disconnect).wait().await
    }

    /// Start a connect in the background
    ///
    /// The status is `Connecting` as soon as this returns. The returned handle can
    /// be awaited, cancelled or detached.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    #[must_use = "dropping the handle detaches the operation"]
    pub fn begin_connect(&self) -> PendingOperation {
        self.spawn(OperationKind::Connect)
    }

    /// Start a disconnect in the background
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    #[must_use = "dropping the handle detaches the operation"]
    pub fn begin_disconnect(&self) -> PendingOperation {
        self.spawn(OperationKind::Disconnect)
    }

    /// Link details from the provider
    ///
    /// # Errors
    ///
    /// Returns [`ZenMatError::NotConnected`] unless the mat is connected.
    pub async fn telemetry(&self) -> Result<MatTelemetry> {
        if !self.is_connected() {
            return Err(ZenMatError::NotConnected);
        }
        Ok(self.inner.provider.telemetry().await)
    }

    fn spawn(&self, operation: OperationKind) -> PendingOperation {
        let ticket = self.inner.begin(operation);
        let (abort, registration) = AbortHandle::new_pair();
        let handle = tokio::spawn(drive(
            Arc::downgrade(&self.inner),
            Arc::clone(&self.inner.provider),
            ticket,
            registration,
        ));

        PendingOperation {
            operation,
            handle,
            abort,
        }
    }
}

impl fmt::Debug for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connectivity")
            .field("provider", &self.provider_kind())
            .field("state", &*self.inner.state.borrow())
            .finish()
    }
}

impl ConnectivityInner {
    /// Mark a new operation in flight and return its ticket
    fn begin(&self, operation: OperationKind) -> Ticket {
        let mut ticket = Ticket {
            generation: 0,
            operation,
            resting_before: ConnectionStatus::Disconnected,
        };

        // Generation and status change together under the watch lock.
        self.state.send_modify(|state| {
            ticket.generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            if state.status.is_settled() {
                ticket.resting_before = state.status;
            }
            state.status = ConnectionStatus::Connecting;
            state.last_error = None;
        });

        info!("Starting mat {}", operation);
        ticket
    }

    /// Write the terminal state for a ticket, unless a newer operation owns the state
    fn settle(
        &self,
        ticket: Ticket,
        outcome: std::result::Result<Result<()>, Aborted>,
    ) -> Result<()> {
        let (status, last_error, result) = match (ticket.operation, outcome) {
            (OperationKind::Connect, Ok(Ok(()))) => (ConnectionStatus::Connected, None, Ok(())),
            (OperationKind::Disconnect, Ok(Ok(()))) => {
                (ConnectionStatus::Disconnected, None, Ok(()))
            }
            (_, Ok(Err(e))) => (
                ConnectionStatus::Disconnected,
                Some(e.user_message()),
                Err(e),
            ),
            (OperationKind::Connect, Err(Aborted)) => (
                ConnectionStatus::Disconnected,
                None,
                Err(ZenMatError::Cancelled),
            ),
            (OperationKind::Disconnect, Err(Aborted)) => {
                (ticket.resting_before, None, Err(ZenMatError::Cancelled))
            }
        };

        let written = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != ticket.generation {
                return false;
            }
            state.status = status;
            state.last_error.clone_from(&last_error);
            true
        });

        if !written {
            debug!(
                "Discarding result of superseded mat {} (generation {})",
                ticket.operation, ticket.generation
            );
            return Err(ZenMatError::Superseded);
        }

        match &result {
            Ok(()) => info!("Mat {} settled: {}", ticket.operation, status),
            Err(ZenMatError::Cancelled) => info!("Mat {} cancelled: {}", ticket.operation, status),
            Err(e) => warn!("Mat {} failed: {}", ticket.operation, e),
        }
        result
    }
}

/// Run the provider call for a ticket and settle the outcome
///
/// Holds only a weak reference to the container while the provider is working, so
/// an owner that goes away in the meantime is never written to.
async fn drive(
    inner: Weak<ConnectivityInner>,
    provider: Arc<dyn ConnectivityProvider>,
    ticket: Ticket,
    registration: AbortRegistration,
) -> Result<()> {
    let outcome = match ticket.operation {
        OperationKind::Connect => Abortable::new(provider.connect(), registration).await,
        OperationKind::Disconnect => Abortable::new(provider.disconnect(), registration).await,
    };

    let Some(inner) = inner.upgrade() else {
        debug!(
            "Connectivity dropped before mat {} settled; discarding result",
            ticket.operation
        );
        return Err(ZenMatError::Detached);
    };

    inner.settle(ticket, outcome)
}

/// Handle to a connectivity operation running in the background
///
/// Dropping the handle detaches: the operation still runs to completion and
/// settles the state of its container.
#[derive(Debug)]
pub struct PendingOperation {
    operation: OperationKind,
    handle: JoinHandle<Result<()>>,
    abort: AbortHandle,
}

impl PendingOperation {
    /// Which operation this is
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.operation
    }

    /// Check if the operation has finished
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Abort the provider call
    ///
    /// A cancelled connect settles `Disconnected`; a cancelled disconnect restores
    /// the status held before it started. Has no effect once the provider has
    /// returned.
    pub fn cancel(&self) {
        self.abort.abort();
    }

    /// Let the operation finish on its own
    pub fn detach(self) {
        drop(self);
    }

    /// Wait for the operation to settle
    ///
    /// # Errors
    ///
    /// Returns the operation's error, [`ZenMatError::Cancelled`] after
    /// [`cancel`](Self::cancel), or [`ZenMatError::TaskFailed`] if the task panicked.
    pub async fn wait(self) -> Result<()> {
        self.handle.await?
    }
}

/// Receiver side of the connection state, handed to views
#[derive(Debug, Clone)]
pub struct StatusSubscription {
    receiver: watch::Receiver<ConnectionState>,
}

impl StatusSubscription {
    /// Latest state, marking it as seen
    pub fn current(&mut self) -> ConnectionState {
        self.receiver.borrow_and_update().clone()
    }

    /// Check if a state change arrived since the last read
    ///
    /// # Errors
    ///
    /// Returns [`ZenMatError::Detached`] if the container is gone.
    pub fn has_changed(&self) -> Result<bool> {
        self.receiver
            .has_changed()
            .map_err(|_| ZenMatError::Detached)
    }

    /// Wait for the next state change
    ///
    /// # Errors
    ///
    /// Returns [`ZenMatError::Detached`] if the container is dropped.
    pub async fn changed(&mut self) -> Result<ConnectionState> {
        self.receiver
            .changed()
            .await
            .map_err(|_| ZenMatError::Detached)?;
        Ok(self.receiver.borrow_and_update().clone())
    }

    /// Wait until the status is no longer `Connecting`
    ///
    /// # Errors
    ///
    /// Returns [`ZenMatError::Detached`] if the container is dropped first.
    pub async fn settled(&mut self) -> Result<ConnectionState> {
        let state = self
            .receiver
            .wait_for(|state| state.status.is_settled())
            .await
            .map_err(|_| ZenMatError::Detached)?;
        Ok(state.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CONNECTION_FAILED_MESSAGE;
    use async_trait::async_trait;
    use rand::{rngs::StdRng, SeedableRng};
    use std::time::Duration;
    use tokio_test::{assert_pending, assert_ready_ok};

    fn succeeding() -> Connectivity {
        Connectivity::new(SimulatedProvider::always_succeed(
            SimulationConfig::default(),
        ))
    }

    fn failing() -> Connectivity {
        Connectivity::new(SimulatedProvider::always_fail(SimulationConfig::default()))
    }

    /// Transport stand-in whose teardown always fails
    struct BrokenTeardown;

    #[async_trait]
    impl ConnectivityProvider for BrokenTeardown {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Transport
        }

        async fn connect(&self) -> Result<()> {
            Ok(())
        }

        async fn disconnect(&self) -> Result<()> {
            Err(ZenMatError::DisconnectFailed(
                "Error disconnecting from device.".to_string(),
            ))
        }

        async fn telemetry(&self) -> MatTelemetry {
            MatTelemetry::new(crate::types::SignalStrength::Fair, 20)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_forced_success() {
        let connectivity = succeeding();
        assert_eq!(connectivity.status(), ConnectionStatus::Disconnected);

        connectivity.connect().await.unwrap();

        let state = connectivity.state();
        assert_eq!(state.status, ConnectionStatus::Connected);
        assert!(state.last_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_forced_failure() {
        let connectivity = failing();

        let result = connectivity.connect().await;
        assert!(matches!(result, Err(ZenMatError::ConnectionFailed(_))));

        let state = connectivity.state();
        assert_eq!(state.status, ConnectionStatus::Disconnected);
        assert_eq!(state.last_error.as_deref(), Some(CONNECTION_FAILED_MESSAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_from_connected() {
        let connectivity = succeeding();
        connectivity.connect().await.unwrap();

        connectivity.disconnect().await.unwrap();

        let state = connectivity.state();
        assert_eq!(state.status, ConnectionStatus::Disconnected);
        assert!(state.last_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_when_already_disconnected() {
        let connectivity = failing();
        connectivity.connect().await.unwrap_err();
        assert!(connectivity.state().last_error.is_some());

        let pending = connectivity.begin_disconnect();
        assert_eq!(connectivity.status(), ConnectionStatus::Connecting);
        assert!(connectivity.state().last_error.is_none());

        pending.wait().await.unwrap();
        assert_eq!(connectivity.state(), ConnectionState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_is_connecting_while_in_flight() {
        let connectivity = succeeding();
        let mut connect = tokio_test::task::spawn(connectivity.connect());

        assert_pending!(connect.poll());
        assert_eq!(connectivity.status(), ConnectionStatus::Connecting);
        // Let the operation task start its handshake timer.
        tokio::task::yield_now().await;

        tokio::time::advance(Duration::from_millis(1_500)).await;
        assert_pending!(connect.poll());
        assert_eq!(connectivity.status(), ConnectionStatus::Connecting);

        tokio::time::advance(Duration::from_millis(500)).await;
        let state = connectivity.subscribe().settled().await.unwrap();
        assert_eq!(state.status, ConnectionStatus::Connected);
        assert_ready_ok!(connect.poll());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_connect_future_still_settles() {
        let connectivity = failing();

        let timed_out =
            tokio::time::timeout(Duration::from_millis(500), connectivity.connect()).await;
        assert!(timed_out.is_err());
        assert_eq!(connectivity.status(), ConnectionStatus::Connecting);

        tokio::time::sleep(Duration::from_secs(10)).await;

        let state = connectivity.state();
        assert_eq!(state.status, ConnectionStatus::Disconnected);
        assert_eq!(state.last_error.as_deref(), Some(CONNECTION_FAILED_MESSAGE));

        // A fresh request is accepted once the abandoned one has settled.
        connectivity.connect().await.unwrap_err();
        assert!(!connectivity.state().is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_disconnect_future_still_settles() {
        let connectivity = succeeding();
        connectivity.connect().await.unwrap();

        let timed_out =
            tokio::time::timeout(Duration::from_millis(200), connectivity.disconnect()).await;
        assert!(timed_out.is_err());
        assert_eq!(connectivity.status(), ConnectionStatus::Connecting);

        let state = connectivity.subscribe().settled().await.unwrap();
        assert_eq!(state.status, ConnectionStatus::Disconnected);
        assert!(state.last_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconnect_restarts_handshake() {
        let connectivity = succeeding();
        connectivity.connect().await.unwrap();

        let pending = connectivity.begin_connect();
        assert_eq!(pending.kind(), OperationKind::Connect);
        assert_eq!(connectivity.status(), ConnectionStatus::Connecting);

        pending.wait().await.unwrap();
        assert!(connectivity.is_connected());
    }

    #[tokio::test]
    async fn test_terminal_state_is_always_consistent() {
        let provider =
            SimulatedProvider::with_rng(SimulationConfig::instant(), StdRng::seed_from_u64(7))
                .unwrap();
        let connectivity = Connectivity::new(provider);

        for _ in 0..500 {
            let result = connectivity.connect().await;
            let state = connectivity.state();
            match state.status {
                ConnectionStatus::Connected => {
                    assert!(result.is_ok());
                    assert!(state.last_error.is_none());
                }
                ConnectionStatus::Disconnected => {
                    assert!(result.is_err());
                    assert!(state.last_error.as_deref().is_some_and(|m| !m.is_empty()));
                }
                ConnectionStatus::Connecting => panic!("connect left the status in flight"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_connect() {
        let connectivity = succeeding();
        let pending = connectivity.begin_connect();

        tokio::time::sleep(Duration::from_millis(500)).await;
        pending.cancel();

        assert!(matches!(pending.wait().await, Err(ZenMatError::Cancelled)));
        let state = connectivity.state();
        assert_eq!(state.status, ConnectionStatus::Disconnected);
        assert!(state.last_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_disconnect_restores_connection() {
        let connectivity = succeeding();
        connectivity.connect().await.unwrap();

        let pending = connectivity.begin_disconnect();
        pending.cancel();

        assert!(matches!(pending.wait().await, Err(ZenMatError::Cancelled)));
        assert_eq!(connectivity.status(), ConnectionStatus::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_requests_last_issued_wins() {
        let connectivity = succeeding();

        let connect = connectivity.begin_connect();
        let disconnect = connectivity.begin_disconnect();

        // The disconnect finishes first, the older connect resolves afterwards.
        disconnect.wait().await.unwrap();
        assert!(matches!(connect.wait().await, Err(ZenMatError::Superseded)));

        assert_eq!(connectivity.status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detached_operation_does_not_outlive_owner() {
        let connectivity = succeeding();
        let pending = connectivity.begin_connect();
        let mut subscription = connectivity.subscribe();
        drop(connectivity);

        assert!(matches!(pending.wait().await, Err(ZenMatError::Detached)));
        assert!(subscription.changed().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_detach_keeps_settling_state() {
        let connectivity = succeeding();
        let mut subscription = connectivity.subscribe();

        connectivity.begin_connect().detach();

        let state = subscription.settled().await.unwrap();
        assert_eq!(state.status, ConnectionStatus::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscription_observes_transitions() {
        let connectivity = succeeding();
        let mut subscription = connectivity.subscribe();
        assert!(!subscription.has_changed().unwrap());

        let pending = connectivity.begin_connect();
        let state = subscription.changed().await.unwrap();
        assert_eq!(state.status, ConnectionStatus::Connecting);

        let state = subscription.changed().await.unwrap();
        assert_eq!(state.status, ConnectionStatus::Connected);
        pending.wait().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_teardown_still_disconnects() {
        let connectivity = Connectivity::new(BrokenTeardown);
        assert_eq!(connectivity.provider_kind(), ProviderKind::Transport);
        connectivity.connect().await.unwrap();

        let result = connectivity.disconnect().await;
        assert!(matches!(result, Err(ZenMatError::DisconnectFailed(_))));

        let state = connectivity.state();
        assert_eq!(state.status, ConnectionStatus::Disconnected);
        assert_eq!(
            state.last_error.as_deref(),
            Some("Error disconnecting from device.")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_telemetry_requires_connection() {
        let connectivity = succeeding();
        assert!(matches!(
            connectivity.telemetry().await,
            Err(ZenMatError::NotConnected)
        ));

        connectivity.connect().await.unwrap();
        let telemetry = connectivity.telemetry().await.unwrap();
        assert_eq!(telemetry.battery_percent, 87);
    }

    #[test]
    fn test_invalid_simulation_config() {
        let config = SimulationConfig {
            success_probability: -1.0,
            ..SimulationConfig::default()
        };
        assert!(Connectivity::simulated(config).is_err());
    }
}
