//! Trailing-edge debouncing driven by an explicit clock.
//!
//! The engine never sleeps or spawns timers. The orchestration layer passes
//! the current `Instant` when an input changes and when it polls; a pending
//! payload fires once the coalescing window has elapsed since the most
//! recent `schedule`. Scheduling always replaces the pending payload, so an
//! older computation can never be applied after a newer one.

use std::time::{Duration, Instant};

/// Identifies one scheduled payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

#[derive(Debug)]
struct Pending<T> {
    ticket: Ticket,
    due: Instant,
    payload: T,
}

/// Coalesces bursts of triggers into a single trailing event.
///
/// # Examples
///
/// ```rust
/// use geoview::debounce::Debouncer;
/// use std::time::{Duration, Instant};
///
/// let start = Instant::now();
/// let mut search = Debouncer::new(Duration::from_millis(300));
///
/// search.schedule("s", start);
/// search.schedule("si", start + Duration::from_millis(100));
/// search.schedule("sil", start + Duration::from_millis(200));
///
/// assert_eq!(search.poll(start + Duration::from_millis(400)), None);
/// assert_eq!(search.poll(start + Duration::from_millis(500)), Some("sil"));
/// assert_eq!(search.poll(start + Duration::from_millis(900)), None);
/// ```
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    next_ticket: u64,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            next_ticket: 0,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Schedule `payload`, cancelling anything not yet fired.
    pub fn schedule(&mut self, payload: T, now: Instant) -> Ticket {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);

        if let Some(previous) = self.pending.take() {
            log::trace!("Debounce ticket {:?} superseded by {:?}", previous.ticket, ticket);
        }

        self.pending = Some(Pending {
            ticket,
            due: now + self.window,
            payload,
        });
        ticket
    }

    /// Take the pending payload if its window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.as_ref().is_some_and(|p| now >= p.due) {
            self.pending.take().map(|p| p.payload)
        } else {
            None
        }
    }

    /// Take the pending payload regardless of its deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.payload)
    }

    /// Drop the pending payload. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_ticket(&self) -> Option<Ticket> {
        self.pending.as_ref().map(|p| p.ticket)
    }

    /// When the pending payload becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }
}
