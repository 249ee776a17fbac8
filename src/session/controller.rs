//! Drives a session on a one-second tick

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::machine::{self, Cue, Transition};
use super::state::SessionState;
use crate::voice::Announcer;

/// Interval between ticks
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// State shared between the controller and its tick task
struct Shared {
    state: SessionState,
    /// Bumped whenever the tick source is retired; a tick from an older
    /// generation must not touch state
    generation: u64,
}

/// Owns the session state, the tick source and the announcer
///
/// At most one tick task is alive at a time. `start` and `stop` retire the
/// previous task under the same lock the task mutates state with, so no tick
/// can land after either returns.
pub struct SessionController {
    shared: Arc<Mutex<Shared>>,
    announcer: Arc<dyn Announcer>,
    updates: watch::Sender<SessionState>,
    ticker: Option<JoinHandle<()>>,
}

impl SessionController {
    /// Create an idle controller
    #[must_use]
    pub fn new(announcer: Arc<dyn Announcer>) -> Self {
        let state = SessionState::default();
        let (updates, _) = watch::channel(state.clone());
        Self {
            shared: Arc::new(Mutex::new(Shared {
                state,
                generation: 0,
            })),
            announcer,
            updates,
            ticker: None,
        }
    }

    /// Start a new session, resetting any session in progress
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime
    pub fn start(&mut self) {
        let generation = {
            let mut shared = lock(&self.shared);
            shared.generation += 1;
            if let Some(ticker) = self.ticker.take() {
                tracing::debug!("retiring previous tick source");
                ticker.abort();
            }

            let transition = machine::start();
            apply(&mut shared, transition, &self.updates, self.announcer.as_ref());
            shared.generation
        };

        tracing::info!(voice = self.announcer.name(), "meditation started");

        self.ticker = Some(tokio::spawn(run_ticker(
            Arc::clone(&self.shared),
            Arc::clone(&self.announcer),
            self.updates.clone(),
            generation,
        )));
    }

    /// End the session from any phase
    ///
    /// Safe to call when idle; always resets to idle and says so.
    pub fn stop(&mut self) {
        let mut shared = lock(&self.shared);
        shared.generation += 1;
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        self.announcer.cancel();

        apply(&mut shared, machine::stop(), &self.updates, self.announcer.as_ref());
        tracing::info!("meditation ended");
    }

    /// Copy of the current state
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        lock(&self.shared).state.clone()
    }

    /// Receive every published state
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.updates.subscribe()
    }

    /// Whether a session is in progress
    #[must_use]
    pub fn is_running(&self) -> bool {
        lock(&self.shared).state.running
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        lock(&self.shared).generation += 1;
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        self.announcer.cancel();
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Store a transition's state, publish it, then speak its cues in order
fn apply(
    shared: &mut Shared,
    transition: Transition,
    updates: &watch::Sender<SessionState>,
    announcer: &dyn Announcer,
) {
    shared.state = transition.state;
    updates.send_replace(shared.state.clone());
    for cue in &transition.cues {
        announce(announcer, *cue);
    }
}

fn announce(announcer: &dyn Announcer, cue: Cue) {
    let phrase = cue.phrase();
    tracing::debug!(?cue, phrase = phrase.as_str(), "announcing");
    announcer.announce(&phrase);
}

async fn run_ticker(
    shared: Arc<Mutex<Shared>>,
    announcer: Arc<dyn Announcer>,
    updates: watch::Sender<SessionState>,
    generation: u64,
) {
    let mut interval = tokio::time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let mut guard = lock(&shared);
        if guard.generation != generation {
            break;
        }

        let transition = machine::tick(&guard.state);
        let finished = transition.is_final();
        if !transition.cues.is_empty() {
            tracing::debug!(
                phase = %transition.state.phase,
                cycle = transition.state.cycle_index,
                "phase transition"
            );
        }
        apply(&mut guard, transition, &updates, announcer.as_ref());

        if finished {
            tracing::info!("meditation complete");
            break;
        }
    }
}
