//! Session Initialisation Gate
//!
//! `initChat` may only go out once the connection is open AND the report
//! list has loaded. The two complete independently and in either order; the
//! gate releases exactly once, on whichever arrives second.

/// Two-precondition, fire-once latch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InitGate {
    connection_open: bool,
    reports_loaded: bool,
    released: bool,
}

impl InitGate {
    /// Create a closed gate
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the connection is open
    ///
    /// Returns `true` if this call released the gate.
    pub fn connection_opened(&mut self) -> bool {
        self.connection_open = true;
        self.try_release()
    }

    /// Record that the report list has loaded
    ///
    /// Returns `true` if this call released the gate.
    pub fn reports_loaded(&mut self) -> bool {
        self.reports_loaded = true;
        self.try_release()
    }

    /// Whether `initChat` has been released
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    fn try_release(&mut self) -> bool {
        if self.released || !(self.connection_open && self.reports_loaded) {
            return false;
        }
        self.released = true;
        true
    }
}
