//! Deferred actions with cancel and supersede semantics.
//!
//! The scheduler runs on a logical millisecond clock that the host advances
//! from its event loop. Scheduling an action under a key that already has a
//! pending action replaces it; the replaced action never runs.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

use crate::models::NoteId;

/// Kinds of deferred work. A key has at most one pending action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKey {
    /// Remove an abandoned placeholder note
    PlaceholderCleanup(NoteId),
    /// Debounced sync after an editor save
    Save,
    /// Delayed status message update
    Status,
}

struct PendingTimer {
    generation: u64,
    due_ms: u64,
    action: Box<dyn FnOnce()>,
}

#[derive(Default)]
pub struct Scheduler {
    now_ms: Cell<u64>,
    next_generation: Cell<u64>,
    pending: RefCell<HashMap<TimerKey, PendingTimer>>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current logical time in milliseconds
    pub fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    /// Schedule `action` to run once `delay` has elapsed, superseding any
    /// pending action with the same key.
    pub fn schedule(
        &self,
        key: TimerKey,
        delay: Duration,
        action: impl FnOnce() + 'static,
    ) {
        let generation = self.next_generation.get();
        self.next_generation.set(generation + 1);
        let due_ms = self
            .now_ms()
            .saturating_add(u64::try_from(delay.as_millis()).unwrap_or(u64::MAX));

        let replaced = self.pending.borrow_mut().insert(
            key,
            PendingTimer {
                generation,
                due_ms,
                action: Box::new(action),
            },
        );
        if replaced.is_some() {
            tracing::debug!(?key, "Superseded pending timer");
        }
    }

    /// Cancel whatever is pending under `key`.
    pub fn cancel_key(&self, key: TimerKey) -> bool {
        self.pending.borrow_mut().remove(&key).is_some()
    }

    pub fn is_pending(&self, key: TimerKey) -> bool {
        self.pending.borrow().contains_key(&key)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Earliest due time among pending actions
    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.pending
            .borrow()
            .values()
            .map(|timer| timer.due_ms)
            .min()
    }

    /// Move the clock forward and run every action that became due.
    /// Returns the number of actions run.
    pub fn advance(&self, elapsed: Duration) -> usize {
        let elapsed = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.now_ms.set(self.now_ms().saturating_add(elapsed));
        self.run_due()
    }

    /// Run every action due at the current time, oldest deadline first.
    /// Actions may schedule further work; anything due immediately runs in
    /// the same call.
    pub fn run_due(&self) -> usize {
        let mut ran = 0;
        while let Some(action) = self.take_next_due() {
            action();
            ran += 1;
        }
        ran
    }

    fn take_next_due(&self) -> Option<Box<dyn FnOnce()>> {
        let now = self.now_ms();
        let mut pending = self.pending.borrow_mut();
        let key = pending
            .iter()
            .filter(|(_, timer)| timer.due_ms <= now)
            .min_by_key(|(_, timer)| (timer.due_ms, timer.generation))
            .map(|(key, _)| *key)?;
        pending.remove(&key).map(|timer| timer.action)
    }
}
