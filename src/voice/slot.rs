//! Single-slot ownership of the utterance currently being spoken

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;

/// Cancellation flag shared with an utterance's blocking work
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    /// Whether the owning utterance has been released
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// An utterance in flight
///
/// Dropping it cancels the speech: the flag is raised for work that cannot be
/// aborted (audio playback) and the task is aborted, which kills any child
/// process it owns.
#[derive(Debug)]
pub struct Utterance {
    task: JoinHandle<()>,
    cancellation: Cancellation,
}

impl Utterance {
    /// Whether the speech has finished on its own
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for Utterance {
    fn drop(&mut self) {
        self.cancellation.cancel();
        self.task.abort();
    }
}

/// Holds at most one utterance
#[derive(Debug, Default)]
pub struct UtteranceSlot {
    current: Mutex<Option<Utterance>>,
}

impl UtteranceSlot {
    /// Create an empty slot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Release the current utterance, then spawn and hold a new one
    ///
    /// Skips silently when called outside a tokio runtime.
    pub fn replace_with<F, Fut>(&self, speak: F)
    where
        F: FnOnce(Cancellation) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        drop(current.take());

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no async runtime, skipping announcement");
            return;
        };

        let cancellation = Cancellation::default();
        let task = handle.spawn(speak(cancellation.clone()));
        *current = Some(Utterance { task, cancellation });
    }

    /// Release the current utterance, if any
    pub fn clear(&self) {
        let previous = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(previous);
    }

    /// Whether an utterance is still being spoken
    #[must_use]
    pub fn is_speaking(&self) -> bool {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|u| !u.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_replace_cancels_previous() {
        let slot = UtteranceSlot::new();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let first_tx = tx.clone();
        slot.replace_with(move |cancel| async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            let _ = first_tx.send(("first", cancel.is_cancelled()));
        });
        slot.replace_with(move |_| async move {
            let _ = tx.send(("second", false));
        });

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(rx.recv().await, Some(("second", false)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_raises_cancellation() {
        let slot = UtteranceSlot::new();
        let seen = Arc::new(Mutex::new(None));
        let seen_clone = Arc::clone(&seen);

        slot.replace_with(move |cancel| {
            *seen_clone.lock().unwrap() = Some(cancel.clone());
            async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
        });
        assert!(slot.is_speaking());

        slot.clear();
        assert!(!slot.is_speaking());
        let cancel = seen.lock().unwrap().clone().unwrap();
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_outside_runtime_is_noop() {
        let slot = UtteranceSlot::new();
        slot.replace_with(|_| async {});
        assert!(!slot.is_speaking());
    }
}
