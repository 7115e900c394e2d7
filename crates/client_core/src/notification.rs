use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex as StdMutex, PoisonError,
    },
    time::Duration,
};

use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time::Instant,
};
use tracing::debug;

use crate::view_state::{publish, Notice, ViewEvent, ViewState};

/// Shows a [`Notice`] in the shared view state and hides it again after a
/// fixed wall-clock duration.
///
/// Every `show` restarts the countdown. The previous countdown task is aborted
/// and, in case it already woke up, refuses to hide a notice newer than the
/// one it was started for. Dropping the timer aborts whatever is pending.
pub struct NotificationTimer {
    state: Arc<Mutex<ViewState>>,
    events: broadcast::Sender<ViewEvent>,
    duration: Duration,
    generation: Arc<AtomicU64>,
    pending: StdMutex<Option<JoinHandle<()>>>,
}

impl NotificationTimer {
    pub fn new(
        state: Arc<Mutex<ViewState>>,
        events: broadcast::Sender<ViewEvent>,
        duration: Duration,
    ) -> Self {
        Self {
            state,
            events,
            duration,
            generation: Arc::new(AtomicU64::new(0)),
            pending: StdMutex::new(None),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// The view-state guard is held from the generation bump until the new
    /// countdown is stored, so overlapping calls commit in one order.
    pub async fn show(&self, notice: Notice) {
        let mut guard = self.state.lock().await;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        guard.show_notice(notice);
        publish(&self.events, &guard);

        let deadline = Instant::now() + self.duration;
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let current = Arc::clone(&self.generation);
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let mut guard = state.lock().await;
            if current.load(Ordering::SeqCst) != generation {
                return;
            }
            if guard.clear_notice() {
                debug!(generation, "notification expired");
                publish(&events, &guard);
                let _ = events.send(ViewEvent::NotificationExpired);
            }
        });

        if let Some(previous) = self.replace_pending(Some(handle)) {
            previous.abort();
        }
        drop(guard);
    }

    /// Explicit close from the presentation layer.
    pub async fn dismiss(&self) {
        let mut guard = self.state.lock().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(previous) = self.replace_pending(None) {
            previous.abort();
        }
        if guard.clear_notice() {
            publish(&self.events, &guard);
        }
    }

    fn replace_pending(&self, handle: Option<JoinHandle<()>>) -> Option<JoinHandle<()>> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *pending, handle)
    }
}

impl Drop for NotificationTimer {
    fn drop(&mut self) {
        let pending = self
            .pending
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = pending {
            handle.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/notification_tests.rs"]
mod tests;
