//! Rotating status phrases shown while a request is in flight.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Phrases used when none are configured.
pub const DEFAULT_PHRASES: &[&str] = &[
    "Warming up the canvas...",
    "Sketching the composition...",
    "Mixing the colors...",
    "Adding the final touches...",
];

/// Default time between phrases.
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(2500);

/// Publishes the current status phrase and owns the timer that advances it.
///
/// The timer only runs while a [`Ticker`] returned by [`start`](Self::start)
/// is alive.
pub struct LoadingIndicator {
    phrases: Arc<[String]>,
    period: Duration,
    current: Arc<watch::Sender<Option<String>>>,
}

impl LoadingIndicator {
    /// Create an idle indicator cycling through `phrases` every `period`.
    #[must_use]
    pub fn new(phrases: Vec<String>, period: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self { phrases: phrases.into(), period, current: Arc::new(current) }
    }

    /// The phrase currently shown, if running.
    #[must_use]
    pub fn phrase(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    /// Watch phrase changes. `None` means the indicator is stopped.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.current.subscribe()
    }

    /// Show the first phrase now and advance one phrase per period until the
    /// returned ticker is stopped or dropped.
    ///
    /// Must be called within a tokio runtime.
    #[must_use = "the indicator stops as soon as the ticker is dropped"]
    pub fn start(&self) -> Ticker {
        let Some(first) = self.phrases.first() else {
            self.current.send_replace(None);
            return Ticker { task: None, current: Arc::clone(&self.current) };
        };
        self.current.send_replace(Some(first.clone()));

        let phrases = Arc::clone(&self.phrases);
        let current = Arc::clone(&self.current);
        let period = self.period;
        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut index = 0;
            loop {
                interval.tick().await;
                index = (index + 1) % phrases.len();
                current.send_replace(Some(phrases[index].clone()));
            }
        });

        Ticker { task: Some(task), current: Arc::clone(&self.current) }
    }
}

impl Default for LoadingIndicator {
    fn default() -> Self {
        Self::new(DEFAULT_PHRASES.iter().map(ToString::to_string).collect(), DEFAULT_PERIOD)
    }
}

/// Scoped handle to a running indicator. Dropping it stops the timer and
/// clears the phrase.
pub struct Ticker {
    task: Option<JoinHandle<()>>,
    current: Arc<watch::Sender<Option<String>>>,
}

impl Ticker {
    /// Stop advancing and clear the phrase.
    pub fn stop(self) {}
}

impl Drop for Ticker {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.current.send_replace(None);
    }
}
