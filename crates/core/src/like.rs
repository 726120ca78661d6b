//! Optimistic like-toggle state machine.
//!
//! One machine per rendered like button. The lifecycle is
//! `Unknown -> Idle` on hydration from a status fetch, `Idle -> Pending`
//! on a press (the flip is applied speculatively before the request goes
//! out), and `Pending -> Idle` on either the authoritative server reply
//! or a rollback to the pre-press snapshot.
//!
//! The machine is UI-free: the caller decides what a press outcome means
//! (dispatch the toggle request, show a refusal notice, or do nothing).

/// The `(liked, count)` pair for one post as seen by the current actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeState {
    /// Whether the current actor has liked the post.
    pub liked: bool,
    /// Total like count across all actors.
    pub count: u64,
}

impl LikeState {
    /// Create a like state.
    #[must_use]
    pub const fn new(liked: bool, count: u64) -> Self {
        Self { liked, count }
    }
}

/// Outcome of a press, decided client-side before any request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    /// The optimistic flip was applied; dispatch the toggle request now.
    Dispatch,
    /// Unliking without a credential is not permitted; nothing changed
    /// and no request may be issued.
    Refused,
    /// A toggle is already in flight (or the state is not hydrated yet);
    /// presses are not queued.
    Ignored,
}

/// Per-instance like-toggle state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LikeToggle {
    /// Status fetch has not resolved yet.
    #[default]
    Unknown,
    /// Settled state; presses are accepted.
    Idle(LikeState),
    /// A toggle request is in flight. `shown` is the optimistic guess,
    /// `snapshot` the exact pre-press pair restored on failure.
    Pending {
        shown: LikeState,
        snapshot: LikeState,
    },
}

impl LikeToggle {
    /// Machine for a freshly rendered instance, before the status fetch.
    #[must_use]
    pub const fn new() -> Self {
        Self::Unknown
    }

    /// Machine hydrated directly from a fetched status.
    #[must_use]
    pub const fn idle(state: LikeState) -> Self {
        Self::Idle(state)
    }

    /// Apply the mount-time status fetch.
    ///
    /// Only meaningful from `Unknown`; a late status fetch must not
    /// clobber an in-flight toggle.
    pub fn hydrate(&mut self, state: LikeState) {
        if matches!(self, Self::Unknown) {
            *self = Self::Idle(state);
        }
    }

    /// The pair the UI should currently display, once known.
    #[must_use]
    pub const fn shown(&self) -> Option<LikeState> {
        match self {
            Self::Unknown => None,
            Self::Idle(state) => Some(*state),
            Self::Pending { shown, .. } => Some(*shown),
        }
    }

    /// Whether a toggle request is in flight.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// Handle a press from the current actor.
    ///
    /// `credentialed` says whether an access token is held locally. An
    /// anonymous actor may like but not unlike; that refusal happens
    /// here, without a server round-trip.
    pub fn press(&mut self, credentialed: bool) -> Press {
        let current = match self {
            Self::Idle(state) => *state,
            Self::Unknown | Self::Pending { .. } => return Press::Ignored,
        };

        if current.liked && !credentialed {
            return Press::Refused;
        }

        let shown = LikeState {
            liked: !current.liked,
            count: if current.liked {
                current.count.saturating_sub(1)
            } else {
                current.count + 1
            },
        };
        *self = Self::Pending {
            shown,
            snapshot: current,
        };
        Press::Dispatch
    }

    /// Apply the server's authoritative reply to the toggle request.
    ///
    /// The reply replaces the optimistic guess unconditionally; this is
    /// what corrects drift from concurrent likes by other actors or a
    /// toggle the server treated as a no-op.
    pub fn settle(&mut self, authoritative: LikeState) {
        if self.is_pending() {
            *self = Self::Idle(authoritative);
        }
    }

    /// The toggle request failed: restore the pre-press pair exactly.
    pub fn rollback(&mut self) {
        if let Self::Pending { snapshot, .. } = self {
            let restored = *snapshot;
            *self = Self::Idle(restored);
        }
    }
}
