//! Coordination between user input and externally supplied content.
//!
//! The editing surface has one writer at a time. While the user is typing,
//! content arriving from outside (a reload, a restored draft, an import) is
//! held back; the most recent arrival is applied once input settles.
//!
//! ```text
//!            user input                 input settled
//!   Idle ───────────────▶ Editing ─────────────────────▶ Idle
//!    │                     │  ▲                            ▲
//!    │ external content    │  │ user input                 │ sync finished
//!    ▼                     │  │                            │
//!  Syncing ◀───────────────┘ (settled with queued content) ┘
//! ```

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SyncState {
    #[default]
    Idle,
    /// The user owns the document.
    Editing,
    /// External content is being applied.
    Syncing,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Editing => "editing",
            Self::Syncing => "syncing",
        })
    }
}

/// State machine over a payload type `T` (the external content).
///
/// # Laws
///
/// - **L1 (No overwrite while editing)**: in `Editing`, `external` never
///   returns content to apply.
/// - **L2 (Latest wins)**: of several arrivals while editing, only the last
///   is returned by `settle`.
/// - **L3 (Single writer)**: content returned for applying must be followed by
///   `finish_sync` before the machine is `Idle` again.
#[derive(Debug, Clone)]
pub struct SyncMachine<T> {
    state: SyncState,
    queued: Option<T>,
}

impl<T> Default for SyncMachine<T> {
    fn default() -> Self {
        Self {
            state: SyncState::Idle,
            queued: None,
        }
    }
}

impl<T> SyncMachine<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn has_queued(&self) -> bool {
        self.queued.is_some()
    }

    /// The user changed the document.
    pub fn user_input(&mut self) {
        if self.state != SyncState::Editing {
            log::trace!("sync: {} -> editing", self.state);
        }
        self.state = SyncState::Editing;
    }

    /// External content arrived. Returns it when it may be applied now;
    /// otherwise it is queued, replacing anything queued before.
    pub fn external(&mut self, content: T) -> Option<T> {
        match self.state {
            SyncState::Editing => {
                if self.queued.replace(content).is_some() {
                    log::debug!("sync: superseded queued external content");
                }
                None
            }
            SyncState::Idle | SyncState::Syncing => {
                self.state = SyncState::Syncing;
                Some(content)
            }
        }
    }

    /// User input went quiet. Returns queued content to apply, if any.
    pub fn settle(&mut self) -> Option<T> {
        if self.state != SyncState::Editing {
            return None;
        }
        match self.queued.take() {
            Some(content) => {
                self.state = SyncState::Syncing;
                Some(content)
            }
            None => {
                self.state = SyncState::Idle;
                None
            }
        }
    }

    /// The content returned by `external` or `settle` has been applied.
    pub fn finish_sync(&mut self) {
        if self.state == SyncState::Syncing {
            self.state = SyncState::Idle;
        }
    }
}
