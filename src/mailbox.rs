//! A single-slot mailbox guarding the `have` set across negotiation rounds.
//!
//! Preserved per the design note in spec.md §9 even though this crate's
//! scheduling model is synchronous: it documents the take-modify-put
//! discipline that keeps the `have` set consistent, and survives a future
//! move to true parallelism without changing the fetch driver's call sites.

use std::sync::Mutex;

/// A single-slot cell: exactly one value lives in it at a time, taken out
/// for modification and always put back before the next take.
pub struct Mailbox<T> {
    slot: Mutex<Option<T>>,
}

impl<T> Mailbox<T> {
    /// Create a mailbox initialised with `value`.
    pub fn new(value: T) -> Self {
        Self { slot: Mutex::new(Some(value)) }
    }

    /// Take the current value out of the slot.
    ///
    /// # Panics
    /// Panics if the slot is already empty — callers must always `put`
    /// before the next `take`; this is the single-owner discipline the
    /// mailbox exists to document.
    pub fn take(&self) -> T {
        self.slot
            .lock()
            .expect("mailbox mutex poisoned")
            .take()
            .expect("mailbox take-modify-put discipline violated: slot was empty")
    }

    /// Put a value back into the slot.
    pub fn put(&self, value: T) {
        *self.slot.lock().expect("mailbox mutex poisoned") = Some(value);
    }
}
