//! Address-ordered fetch sequencing.
//!
//! When the address changes while an earlier fetch is still in flight,
//! the earlier response must be discarded rather than rendered: results
//! apply in address-change order, not response-arrival order. There is
//! no cancellation primitive; the stale check happens at the single
//! point where a response is committed.

use std::sync::atomic::{AtomicU64, Ordering};

/// Ticket identifying one address change. Issued by [`FetchSequencer::begin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Issues tickets per address change and admits at most the latest one.
///
/// `begin` is called when a new address resolves; `commit` when that
/// address's fetch completes. A commit succeeds only while its ticket is
/// still the newest issued, and never after a newer ticket committed, so
/// a slow response for a superseded address can never overwrite a newer
/// result.
#[derive(Debug, Default)]
pub struct FetchSequencer {
    issued: AtomicU64,
    committed: AtomicU64,
}

impl FetchSequencer {
    /// Create a sequencer with no tickets issued.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            committed: AtomicU64::new(0),
        }
    }

    /// Register an address change and get its ticket.
    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` still identifies the latest address change.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.issued.load(Ordering::SeqCst)
    }

    /// Try to commit the response for `ticket`.
    ///
    /// Returns `false` for stale responses: a newer ticket has been
    /// issued, or a newer response already committed.
    pub fn commit(&self, ticket: Ticket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        let mut prev = self.committed.load(Ordering::SeqCst);
        loop {
            if ticket.0 <= prev {
                return false;
            }
            match self.committed.compare_exchange(
                prev,
                ticket.0,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return true,
                Err(current) => prev = current,
            }
        }
    }
}
