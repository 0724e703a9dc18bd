use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Selects bcrypt (`true`) or legacy SHA-512 (`false`) for new credentials.
///
/// Clones share the same value, so a reload in one place is seen by every
/// hasher on its next call.
#[derive(Debug, Clone, Default)]
pub struct MigrationFlag(Arc<AtomicBool>);

impl MigrationFlag {
    pub fn new(bcrypt: bool) -> Self {
        Self(Arc::new(AtomicBool::new(bcrypt)))
    }

    pub fn uses_bcrypt(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Update the flag. Returns the previous value.
    pub fn set(&self, bcrypt: bool) -> bool {
        self.0.swap(bcrypt, Ordering::Relaxed)
    }
}
