//! The swap session coordinator
//!
//! One instance owns one user interaction session: the token set, the
//! selected pair, the derived output amount, the auto-refresh timer, and
//! the confirmation countdown. All state mutation happens inside the
//! instance's lock; timer tasks only ever call back into coordinator
//! operations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use swap_models::{
    parse_amount, validate_swap, ConfirmPhase, ConfirmationWindow, SwapError, SwapReceipt,
    SwapSession, Token, TokenSet,
};

use crate::config::CoordinatorConfig;
use crate::settlement::{Settlement, SimulatedSettlement};
use crate::source::PriceSource;

/// Mutable session state, guarded by the coordinator's lock.
#[derive(Debug)]
struct SessionState {
    tokens: TokenSet,
    session: SwapSession,
    loading: bool,
    refreshing: bool,
    error: Option<SwapError>,
    confirmation: ConfirmationWindow,
    receipts: Vec<SwapReceipt>,
    /// Set on shutdown; a stray tick that slipped past an abort must not
    /// mutate state afterwards
    torn_down: bool,
}

impl SessionState {
    fn new(countdown_secs: u32) -> Self {
        Self {
            tokens: TokenSet::default(),
            session: SwapSession::default(),
            loading: false,
            refreshing: false,
            error: None,
            confirmation: ConfirmationWindow::idle(countdown_secs),
            receipts: Vec::new(),
            torn_down: false,
        }
    }
}

struct Inner {
    config: CoordinatorConfig,
    source: Arc<dyn PriceSource>,
    settlement: Arc<dyn Settlement>,
    state: RwLock<SessionState>,
    /// Guard serializing refreshes: a request arriving while one is
    /// outstanding is dropped, not queued
    refresh_in_flight: AtomicBool,
    refresh_timer: Mutex<Option<JoinHandle<()>>>,
    countdown_timer: Mutex<Option<JoinHandle<()>>>,
}

/// Point-in-time view of the session for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub tokens: Vec<Token>,
    pub from_token: Option<Token>,
    pub to_token: Option<Token>,
    pub input_amount: String,
    pub output_amount: String,
    pub loading: bool,
    pub refreshing: bool,
    pub error: Option<SwapError>,
    pub confirmation: ConfirmationWindow,
}

/// Coordinator for one swap session.
///
/// Exclusively owned by one user interaction session. Timers are fields of
/// the instance with an explicit start/stop lifecycle and are aborted on
/// [`shutdown`](Self::shutdown) and on drop.
pub struct SwapCoordinator {
    inner: Arc<Inner>,
}

impl SwapCoordinator {
    /// Build a coordinator with the default simulated settlement backend.
    pub fn new(source: Arc<dyn PriceSource>, config: CoordinatorConfig) -> Self {
        let settlement = Arc::new(SimulatedSettlement::new(config.settlement_delay()));
        Self::with_settlement(source, settlement, config)
    }

    pub fn with_settlement(
        source: Arc<dyn PriceSource>,
        settlement: Arc<dyn Settlement>,
        config: CoordinatorConfig,
    ) -> Self {
        let countdown_secs = config.countdown_secs;
        Self {
            inner: Arc::new(Inner {
                config,
                source,
                settlement,
                state: RwLock::new(SessionState::new(countdown_secs)),
                refresh_in_flight: AtomicBool::new(false),
                refresh_timer: Mutex::new(None),
                countdown_timer: Mutex::new(None),
            }),
        }
    }

    // =========================================================================
    // Price operations
    // =========================================================================

    /// Fetch the full token set once at startup.
    ///
    /// On failure the error is recorded and the prior token set (empty on
    /// first load) is kept. No automatic retry.
    pub async fn load_initial_prices(&self) {
        {
            let mut st = self.inner.state.write().await;
            st.loading = true;
        }

        let result = self.inner.source.fetch().await;

        let mut st = self.inner.state.write().await;
        st.loading = false;
        match result {
            Ok(raw) => {
                st.tokens = TokenSet::from_raw(raw);
                st.error = None;
                tracing::info!(count = st.tokens.len(), "token prices loaded");
            }
            Err(cause) => {
                tracing::error!("initial price load failed: {}", cause);
                st.error = Some(SwapError::PriceFetchFailed { cause });
            }
        }
    }

    /// Re-fetch prices. A no-op if a refresh is already in flight.
    pub async fn refresh_prices(&self) {
        Inner::refresh_prices(&self.inner).await;
    }

    // =========================================================================
    // Session operations
    // =========================================================================

    /// Select the token to swap from, by currency. Returns false if the
    /// currency is not in the current token set.
    pub async fn select_from(&self, currency: &str) -> bool {
        let found = {
            let mut st = self.inner.state.write().await;
            match st.tokens.get(currency).cloned() {
                Some(token) => {
                    st.session.from_token = Some(token);
                    st.session.recompute_output(self.inner.config.output_decimals);
                    true
                }
                None => false,
            }
        };
        self.sync_auto_refresh().await;
        found
    }

    /// Select the token to swap to, by currency.
    pub async fn select_to(&self, currency: &str) -> bool {
        let found = {
            let mut st = self.inner.state.write().await;
            match st.tokens.get(currency).cloned() {
                Some(token) => {
                    st.session.to_token = Some(token);
                    st.session.recompute_output(self.inner.config.output_decimals);
                    true
                }
                None => false,
            }
        };
        self.sync_auto_refresh().await;
        found
    }

    /// Clear the from-side selection.
    pub async fn clear_from(&self) {
        {
            let mut st = self.inner.state.write().await;
            st.session.from_token = None;
            st.session.recompute_output(self.inner.config.output_decimals);
        }
        self.sync_auto_refresh().await;
    }

    /// Clear the to-side selection.
    pub async fn clear_to(&self) {
        {
            let mut st = self.inner.state.write().await;
            st.session.to_token = None;
            st.session.recompute_output(self.inner.config.output_decimals);
        }
        self.sync_auto_refresh().await;
    }

    /// Set the input amount (kept verbatim; the derived output updates).
    pub async fn set_input_amount(&self, amount: &str) {
        {
            let mut st = self.inner.state.write().await;
            st.session.input_amount = amount.to_string();
            st.session.recompute_output(self.inner.config.output_decimals);
        }
        self.sync_auto_refresh().await;
    }

    /// Clear the current error notice.
    pub async fn dismiss_error(&self) {
        let mut st = self.inner.state.write().await;
        st.error = None;
    }

    // =========================================================================
    // Swap flow
    // =========================================================================

    /// Validate the current session and open the confirmation window.
    ///
    /// Validation failures are returned synchronously and mutate nothing.
    pub async fn submit_swap(&self) -> Result<(), SwapError> {
        {
            let mut st = self.inner.state.write().await;
            let validation = validate_swap(
                st.session.from_token.as_ref(),
                st.session.to_token.as_ref(),
                &st.session.input_amount,
            );
            if !validation.is_valid() {
                return Err(SwapError::ValidationFailed {
                    messages: validation.errors,
                });
            }
            st.confirmation = ConfirmationWindow::open(self.inner.config.countdown_secs);
        }
        self.start_countdown().await;
        Ok(())
    }

    /// Commit the swap. Returns false (and does nothing) when no window is
    /// open, confirm is disabled, or a commit is already running.
    pub async fn confirm(&self) -> bool {
        let pending = {
            let mut st = self.inner.state.write().await;
            if !st.confirmation.is_open() || st.confirmation.confirm_disabled || st.loading {
                return false;
            }
            let (Some(from), Some(to)) =
                (st.session.from_token.clone(), st.session.to_token.clone())
            else {
                return false;
            };
            let input = parse_amount(&st.session.input_amount).unwrap_or(0.0);
            let output = st.session.output_amount.parse::<f64>().unwrap_or(0.0);
            let rate = if to.price == 0.0 {
                0.0
            } else {
                from.price / to.price
            };
            st.loading = true;
            SwapReceipt::new(from.currency, to.currency, input, output, rate)
        };

        self.stop_countdown().await;

        let result = self.inner.settlement.settle(&pending).await;

        {
            let mut st = self.inner.state.write().await;
            st.loading = false;
            st.confirmation = ConfirmationWindow::closed(self.inner.config.countdown_secs);
            match result {
                Ok(()) => {
                    st.session.clear_amounts();
                    st.error = None;
                    tracing::info!(receipt = %pending.id, "swap committed");
                    st.receipts.push(pending);
                }
                Err(e) => {
                    tracing::error!("swap settlement failed: {}", e);
                    st.error = Some(SwapError::SwapCommitFailed {
                        message: e.to_string(),
                    });
                }
            }
        }

        // Input was cleared on success, so the arming condition may have
        // just gone false
        self.sync_auto_refresh().await;
        true
    }

    /// Dismiss the confirmation window without committing. Amounts are left
    /// untouched.
    pub async fn cancel(&self) {
        self.stop_countdown().await;
        let mut st = self.inner.state.write().await;
        if st.confirmation.is_open() {
            st.confirmation = ConfirmationWindow::closed(self.inner.config.countdown_secs);
        }
    }

    /// Tear the session down: stop both timers and mark the state so no
    /// late tick can mutate it.
    pub async fn shutdown(&self) {
        self.stop_countdown().await;
        {
            let mut guard = self.inner.refresh_timer.lock().await;
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
        let mut st = self.inner.state.write().await;
        st.torn_down = true;
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Snapshot of everything the presentation layer renders.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let st = self.inner.state.read().await;
        SessionSnapshot {
            tokens: st.tokens.to_sorted_vec(),
            from_token: st.session.from_token.clone(),
            to_token: st.session.to_token.clone(),
            input_amount: st.session.input_amount.clone(),
            output_amount: st.session.output_amount.clone(),
            loading: st.loading,
            refreshing: st.refreshing,
            error: st.error.clone(),
            confirmation: st.confirmation.clone(),
        }
    }

    /// Receipts of the swaps committed in this session.
    pub async fn receipts(&self) -> Vec<SwapReceipt> {
        self.inner.state.read().await.receipts.clone()
    }

    /// Whether the auto-refresh timer is currently armed.
    pub async fn auto_refresh_armed(&self) -> bool {
        self.inner.refresh_timer.lock().await.is_some()
    }

    // =========================================================================
    // Timers
    // =========================================================================

    /// Arm or disarm the recurring refresh to match the session state:
    /// armed exactly while both tokens are selected and the input amount is
    /// positive.
    async fn sync_auto_refresh(&self) {
        let wanted = {
            let st = self.inner.state.read().await;
            !st.torn_down && st.session.conversion_active()
        };

        let mut guard = self.inner.refresh_timer.lock().await;
        if wanted && guard.is_none() {
            let inner = Arc::clone(&self.inner);
            let period = self.inner.config.refresh_interval();
            *guard = Some(tokio::spawn(async move {
                let start = tokio::time::Instant::now() + period;
                let mut interval = tokio::time::interval_at(start, period);
                loop {
                    interval.tick().await;
                    // Detached, so disarming never aborts a fetch that is
                    // mid-flight holding the refresh guard
                    let inner = Arc::clone(&inner);
                    tokio::spawn(async move {
                        Inner::refresh_prices(&inner).await;
                    });
                }
            }));
            tracing::debug!("auto-refresh armed");
        } else if !wanted {
            if let Some(handle) = guard.take() {
                handle.abort();
                tracing::debug!("auto-refresh disarmed");
            }
        }
    }

    /// (Re)start the confirmation countdown, tearing down any previous one.
    async fn start_countdown(&self) {
        let mut guard = self.inner.countdown_timer.lock().await;
        if let Some(prev) = guard.take() {
            prev.abort();
        }
        let inner = Arc::clone(&self.inner);
        *guard = Some(tokio::spawn(Inner::run_countdown(inner)));
    }

    async fn stop_countdown(&self) {
        let mut guard = self.inner.countdown_timer.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
        }
    }
}

impl Drop for SwapCoordinator {
    fn drop(&mut self) {
        // No tick may fire once the session is gone
        if let Ok(mut guard) = self.inner.refresh_timer.try_lock() {
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
        if let Ok(mut guard) = self.inner.countdown_timer.try_lock() {
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
    }
}

impl Inner {
    /// Re-fetch prices, guarded so at most one fetch is outstanding.
    async fn refresh_prices(inner: &Arc<Inner>) {
        if inner
            .refresh_in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            // Dropped, not queued
            return;
        }

        {
            let mut st = inner.state.write().await;
            if st.torn_down {
                inner.refresh_in_flight.store(false, Ordering::SeqCst);
                return;
            }
            st.refreshing = true;
        }

        let result = inner.source.fetch().await;

        {
            let mut st = inner.state.write().await;
            st.refreshing = false;
            if st.torn_down {
                inner.refresh_in_flight.store(false, Ordering::SeqCst);
                return;
            }
            match result {
                Ok(raw) => {
                    let tokens = TokenSet::from_raw(raw);
                    // Re-resolve the selected pair against the new set; a
                    // currency that disappeared keeps its prior (now stale)
                    // snapshot
                    if let Some(from) = &st.session.from_token {
                        if let Some(updated) = tokens.get(&from.currency) {
                            st.session.from_token = Some(updated.clone());
                        }
                    }
                    if let Some(to) = &st.session.to_token {
                        if let Some(updated) = tokens.get(&to.currency) {
                            st.session.to_token = Some(updated.clone());
                        }
                    }
                    st.tokens = tokens;
                    st.session.recompute_output(inner.config.output_decimals);
                    st.error = None;
                    tracing::debug!(count = st.tokens.len(), "prices refreshed");
                }
                Err(cause) => {
                    tracing::warn!("price refresh failed: {}", cause);
                    st.error = Some(SwapError::PriceRefreshFailed { cause });
                }
            }
        }

        inner.refresh_in_flight.store(false, Ordering::SeqCst);
    }

    /// Drive the confirmation countdown.
    ///
    /// Ticks once per second; when the last second elapses, confirm is
    /// frozen and a refresh is forced, then the countdown restarts after a
    /// short pause. The loop never closes the window on its own.
    async fn run_countdown(inner: Arc<Inner>) {
        let countdown_secs = inner.config.countdown_secs;

        loop {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                let mut st = inner.state.write().await;
                if st.torn_down || st.confirmation.phase != ConfirmPhase::CountingDown {
                    return;
                }
                if st.confirmation.seconds_remaining > 1 {
                    st.confirmation.seconds_remaining -= 1;
                } else {
                    st.confirmation.phase = ConfirmPhase::RefreshingBeforeRestart;
                    st.confirmation.confirm_disabled = true;
                    st.confirmation.seconds_remaining = countdown_secs;
                    break;
                }
            }

            // The countdown restarts whether or not this refresh succeeds.
            // The fetch runs detached so a cancel that aborts this task
            // cannot strand the refresh guard.
            let refresh = tokio::spawn({
                let inner = Arc::clone(&inner);
                async move {
                    Inner::refresh_prices(&inner).await;
                }
            });
            let _ = refresh.await;
            tokio::time::sleep(inner.config.restart_delay()).await;

            let mut st = inner.state.write().await;
            if st.torn_down || st.confirmation.phase != ConfirmPhase::RefreshingBeforeRestart {
                return;
            }
            st.confirmation.phase = ConfirmPhase::CountingDown;
            st.confirmation.seconds_remaining = countdown_secs;
            st.confirmation.confirm_disabled = false;
        }
    }
}
