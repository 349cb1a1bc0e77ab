//! Debounced backend uniqueness checks.
//!
//! Every change restarts a 500 ms timer; only the value still present
//! when the timer fires is sent. Changing the value again, cancelling or
//! dropping the watcher aborts the pending check, so a stale answer can
//! never land on the form.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use megui_client::ResourceApi;
use megui_schema::UniqueCheck;

/// Quiet period before a check is sent.
pub const UNIQUE_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniqueState {
    /// Nothing to check.
    Idle,
    /// Waiting for the timer or for the backend.
    Pending,
    Clear,
    Conflict,
    /// The check itself failed. Does not block submit.
    Failed(String),
}

pub struct UniquenessWatcher {
    api: Arc<dyn ResourceApi>,
    check: UniqueCheck,
    delay: Duration,
    pending: Option<JoinHandle<()>>,
    state: Arc<watch::Sender<UniqueState>>,
}

impl UniquenessWatcher {
    pub fn new(api: Arc<dyn ResourceApi>, check: UniqueCheck) -> Self {
        Self::with_delay(api, check, UNIQUE_DEBOUNCE)
    }

    pub fn with_delay(api: Arc<dyn ResourceApi>, check: UniqueCheck, delay: Duration) -> Self {
        let (tx, _) = watch::channel(UniqueState::Idle);
        Self {
            api,
            check,
            delay,
            pending: None,
            state: Arc::new(tx),
        }
    }

    pub fn check(&self) -> &UniqueCheck {
        &self.check
    }

    pub fn state(&self) -> UniqueState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UniqueState> {
        self.state.subscribe()
    }

    /// The watched value changed. Restarts the timer with `params`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn changed(&mut self, params: Vec<(String, String)>) {
        self.abort();
        self.state.send_replace(UniqueState::Pending);

        let api = Arc::clone(&self.api);
        let check = self.check.clone();
        let state = Arc::clone(&self.state);
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!(field = %check.field, ?params, "uniqueness check");
            let next = match api.check_unique(&check, &params).await {
                Ok(true) => UniqueState::Conflict,
                Ok(false) => UniqueState::Clear,
                Err(e) => {
                    warn!(field = %check.field, "uniqueness check failed: {}", e);
                    UniqueState::Failed(e.to_string())
                }
            };
            state.send_replace(next);
        }));
    }

    /// Drop any pending check and go back to idle.
    pub fn cancel(&mut self) {
        self.abort();
        self.state.send_replace(UniqueState::Idle);
    }

    /// Wait until the current check (if any) has an answer.
    pub async fn settled(&self) -> UniqueState {
        let mut rx = self.subscribe();
        match rx.wait_for(|s| *s != UniqueState::Pending).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }

    fn abort(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for UniquenessWatcher {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeApi, equipo_schema};
    use megui_core::CrudError;

    fn params(numero: &str) -> Vec<(String, String)> {
        vec![
            ("numeroEquipo".to_string(), numero.to_string()),
            ("tipoEquipoId".to_string(), "1".to_string()),
        ]
    }

    fn watcher(api: &Arc<FakeApi>) -> UniquenessWatcher {
        let check = equipo_schema().unique_checks[0].clone();
        UniquenessWatcher::new(api.clone(), check)
    }

    #[tokio::test(start_paused = true)]
    async fn only_the_last_value_is_checked() {
        let api = Arc::new(FakeApi::new(equipo_schema()));
        let mut w = watcher(&api);

        w.changed(params("EQ1"));
        tokio::time::sleep(Duration::from_millis(200)).await;
        w.changed(params("EQ12"));
        tokio::time::sleep(Duration::from_millis(200)).await;
        w.changed(params("EQ123"));
        assert_eq!(w.state(), UniqueState::Pending);

        assert_eq!(w.settled().await, UniqueState::Clear);
        assert_eq!(api.unique_calls(), vec![params("EQ123")]);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_is_sent_before_the_delay() {
        let api = Arc::new(FakeApi::new(equipo_schema()));
        let mut w = watcher(&api);
        w.changed(params("EQ1"));
        tokio::time::sleep(Duration::from_millis(499)).await;
        assert!(api.unique_calls().is_empty());
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(api.unique_calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn conflict_is_reported() {
        let api = Arc::new(FakeApi::new(equipo_schema()));
        api.set_taken("EQ9");
        let mut w = watcher(&api);
        w.changed(params("EQ9"));
        assert_eq!(w.settled().await, UniqueState::Conflict);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_does_not_block() {
        let api = Arc::new(FakeApi::new(equipo_schema()));
        api.fail_next(CrudError::Network("down".into()));
        let mut w = watcher(&api);
        w.changed(params("EQ1"));
        assert!(matches!(w.settled().await, UniqueState::Failed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn drop_and_cancel_abort_pending_check() {
        let api = Arc::new(FakeApi::new(equipo_schema()));

        let mut w = watcher(&api);
        w.changed(params("EQ1"));
        drop(w);

        let mut w = watcher(&api);
        w.changed(params("EQ2"));
        w.cancel();
        assert_eq!(w.state(), UniqueState::Idle);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(api.unique_calls().is_empty());
    }
}
