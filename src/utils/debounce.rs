use std::time::Duration;
use tokio::time::Instant;

/// Coalesces bursts of triggers into a single firing.
///
/// Every [`trigger`](Debouncer::trigger) re-arms the deadline at the fixed
/// delay from now, so only the last trigger of a burst survives.
/// [`expired`](Debouncer::expired) resolves once the armed deadline passes
/// and stays pending forever while unarmed, which makes it safe to poll as
/// one branch of a `tokio::select!` loop.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Create an unarmed debouncer with a fixed delay
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            deadline: None,
        }
    }

    /// Arm the deadline at the fixed delay from now, superseding any
    /// pending one
    pub fn trigger(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    /// Drop any pending deadline without firing
    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    /// True while a firing is pending
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Resolve once the armed deadline passes, disarming on the way out.
    /// Pends forever while unarmed.
    pub async fn expired(&mut self) {
        match self.deadline {
            Some(deadline) => {
                tokio::time::sleep_until(deadline).await;
                self.deadline = None;
            }
            None => std::future::pending::<()>().await,
        }
    }
}
