//! Screen wake-lock coordination.
//!
//! The platform wake lock is best effort: it may be missing, may need a user
//! gesture first, and is revoked whenever the tab is backgrounded. The
//! coordinator keeps at most one request outstanding and at most one
//! sentinel held, and decides when a new request should be issued.
//!
//! It does no I/O. Each method returns what the caller must do next (issue a
//! request with a [`RequestId`], release a sentinel) and the caller feeds the
//! platform's answers back in.
//!
//! ```text
//!            acquire()                 granted(id)
//! Unlocked ──────────────▶ Acquiring ──────────────▶ Held
//!    ▲                         │                       │
//!    └──────── denied(id) ─────┘                       │
//!    └──────────── released(id) / teardown() ──────────┘
//! ```

use crate::Error;

/// Identifies one wake-lock request from issue to grant or revocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

impl RequestId {
    /// Raw value, useful for logging.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Observable coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeLockState {
    /// No lock held and none requested
    Unlocked,
    /// A request is in flight
    Acquiring,
    /// The platform granted a lock and has not revoked it
    Held,
}

#[derive(Debug)]
enum Slot<S> {
    Unlocked,
    Acquiring(RequestId),
    Held(RequestId, S),
}

/// What to do with a sentinel the platform just handed over.
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub enum Grant<S> {
    /// The sentinel is now owned by the coordinator.
    Stored,
    /// Nobody is waiting for this sentinel (stale request or torn down);
    /// the caller must release it.
    Release(S),
}

/// Owns the single wake-lock sentinel `S` and its transitions.
#[derive(Debug)]
pub struct WakeLockCoordinator<S> {
    slot: Slot<S>,
    self_heal: bool,
    active: bool,
    next_id: u64,
}

impl<S> WakeLockCoordinator<S> {
    /// Create a coordinator.
    ///
    /// With `self_heal`, a revocation while the document is visible
    /// immediately triggers a new request instead of waiting for the next
    /// visibility change.
    pub fn new(self_heal: bool) -> Self {
        Self {
            slot: Slot::Unlocked,
            self_heal,
            active: true,
            next_id: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> WakeLockState {
        match self.slot {
            Slot::Unlocked => WakeLockState::Unlocked,
            Slot::Acquiring(_) => WakeLockState::Acquiring,
            Slot::Held(..) => WakeLockState::Held,
        }
    }

    /// Whether a sentinel is currently held.
    pub fn is_held(&self) -> bool {
        matches!(self.slot, Slot::Held(..))
    }

    /// Whether [`teardown`](Self::teardown) has not been called yet.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Start a new request if one is needed.
    ///
    /// Returns the id to issue the platform request with, or `None` when the
    /// capability is unsupported, a request is already in flight, a sentinel
    /// is already held, or the coordinator was torn down.
    pub fn acquire(&mut self, supported: bool) -> Option<RequestId> {
        if !self.active || !supported {
            return None;
        }
        match self.slot {
            Slot::Unlocked => {
                let id = RequestId(self.next_id);
                self.next_id += 1;
                self.slot = Slot::Acquiring(id);
                tracing::trace!(request = id.0, "wake lock: unlocked -> acquiring");
                Some(id)
            }
            Slot::Acquiring(_) | Slot::Held(..) => None,
        }
    }

    /// The platform granted request `id`.
    pub fn granted(&mut self, id: RequestId, sentinel: S) -> Grant<S> {
        match self.slot {
            Slot::Acquiring(pending) if pending == id && self.active => {
                self.slot = Slot::Held(id, sentinel);
                tracing::debug!(request = id.0, "wake lock: acquiring -> held");
                Grant::Stored
            }
            Slot::Acquiring(pending) if pending == id => {
                // Torn down while the request was in flight.
                self.slot = Slot::Unlocked;
                tracing::warn!(request = id.0, "wake lock granted after teardown, releasing");
                Grant::Release(sentinel)
            }
            _ => {
                tracing::warn!(request = id.0, "unexpected wake lock grant, releasing");
                Grant::Release(sentinel)
            }
        }
    }

    /// The platform rejected request `id`. The error is swallowed.
    pub fn denied(&mut self, id: RequestId, error: &Error) {
        if matches!(self.slot, Slot::Acquiring(pending) if pending == id) {
            self.slot = Slot::Unlocked;
            tracing::debug!(request = id.0, %error, "wake lock: acquiring -> unlocked");
        }
    }

    /// The platform revoked the sentinel granted for `id`.
    ///
    /// Returns a follow-up request id when self-heal applies: the coordinator
    /// is configured for it, still active, and the document is `visible`.
    pub fn released(&mut self, id: RequestId, visible: bool) -> Option<RequestId> {
        if !matches!(self.slot, Slot::Held(held, _) if held == id) {
            return None;
        }
        self.slot = Slot::Unlocked;
        tracing::debug!(request = id.0, "wake lock: held -> unlocked (revoked)");

        if self.self_heal && visible {
            self.acquire(true)
        } else {
            None
        }
    }

    /// The document's visibility changed.
    pub fn visibility_changed(&mut self, visible: bool, supported: bool) -> Option<RequestId> {
        if visible {
            self.acquire(supported)
        } else {
            None
        }
    }

    /// Stop coordinating. Returns the held sentinel, which the caller must
    /// release exactly once. A request still in flight is released when its
    /// grant arrives.
    pub fn teardown(&mut self) -> Option<S> {
        if !self.active {
            return None;
        }
        self.active = false;
        match std::mem::replace(&mut self.slot, Slot::Unlocked) {
            Slot::Held(id, sentinel) => {
                tracing::debug!(request = id.0, "wake lock: held -> unlocked (teardown)");
                Some(sentinel)
            }
            Slot::Acquiring(id) => {
                self.slot = Slot::Acquiring(id);
                None
            }
            Slot::Unlocked => None,
        }
    }
}
