//! # Last-request-wins gate
//!
//! Search-as-you-type fires one query per keystroke. Responses can arrive
//! out of order, so each request takes a generation number and only the
//! newest generation is allowed to publish its result.
//!
//! The HTTP search endpoint is stateless per request; a client keeps one gate
//! per search box and wraps each `/api/search` call in [`LatestRequestGate::run`].

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket(u64);

#[derive(Debug, Default)]
pub struct LatestRequestGate {
    generation: AtomicU64,
}

impl LatestRequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request; every ticket issued earlier becomes stale.
    pub fn issue(&self) -> RequestTicket {
        RequestTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Runs `request` under a fresh ticket. Yields `None` when a newer
    /// request was issued while this one was in flight.
    pub async fn run<F, T>(&self, request: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let ticket = self.issue();
        let output = request.await;
        if self.is_current(ticket) {
            Some(output)
        } else {
            tracing::debug!(generation = ticket.0, "discarding stale response");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn newer_ticket_invalidates_older() {
        let gate = LatestRequestGate::new();
        let first = gate.issue();
        assert!(gate.is_current(first));
        let second = gate.issue();
        assert!(!gate.is_current(first));
        assert!(gate.is_current(second));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_early_response_cannot_overwrite_fast_later_one() {
        let gate = LatestRequestGate::new();

        let slow = gate.run(async {
            tokio::time::sleep(Duration::from_millis(400)).await;
            "sup"
        });
        let fast = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            gate.run(async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                "supreme"
            })
            .await
        };

        let (slow, fast) = tokio::join!(slow, fast);
        assert_eq!(slow, None);
        assert_eq!(fast, Some("supreme"));
    }
}
