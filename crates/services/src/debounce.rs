//! # Debouncer
//!
//! Collapses bursts of values into the last one, emitted after a quiet
//! period. Filter edits go through this before they become navigable state.
//!
//! The server only sees the settled query string; a client drives
//! [`filter_debouncer`] from its filter controls and navigates to
//! `/api/items?<encoded filter>` from the sink.

use std::time::Duration;

use domains::FilterState;
use tokio::sync::mpsc;

/// Quiet period applied to filter changes.
pub const FILTER_DEBOUNCE: Duration = Duration::from_millis(300);

pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawns the timer task on the current tokio runtime. When the handle
    /// is dropped, a pending value is flushed immediately.
    pub fn spawn<F>(delay: Duration, mut sink: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();
        tokio::spawn(async move {
            while let Some(mut latest) = rx.recv().await {
                loop {
                    tokio::select! {
                        next = rx.recv() => match next {
                            Some(value) => latest = value,
                            None => {
                                sink(latest);
                                return;
                            }
                        },
                        _ = tokio::time::sleep(delay) => {
                            sink(latest);
                            break;
                        }
                    }
                }
            }
        });
        Self { tx }
    }

    /// Returns false once the timer task has stopped.
    pub fn push(&self, value: T) -> bool {
        self.tx.send(value).is_ok()
    }
}

/// Debouncer for feed filters, emitting the encoded query string.
pub fn filter_debouncer<F>(mut on_navigate: F) -> Debouncer<FilterState>
where
    F: FnMut(String) + Send + 'static,
{
    Debouncer::spawn(FILTER_DEBOUNCE, move |state: FilterState| {
        on_navigate(crate::filter_codec::encode_query_string(&state))
    })
}
