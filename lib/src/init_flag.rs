//! Atomic initialization and state flags.
//!
//! `InitFlag` tracks "has X been done" (monotonic false -> true);
//! `StateFlag` tracks "is X currently happening" (can toggle).

use core::sync::atomic::{AtomicBool, Ordering};

#[repr(transparent)]
pub struct InitFlag {
    flag: AtomicBool,
}

impl InitFlag {
    #[inline]
    pub const fn new() -> Self {
        Self {
            flag: AtomicBool::new(false),
        }
    }

    /// Atomically attempt to initialize.
    ///
    /// Returns `true` if this call performed the initialization (flag was
    /// previously unset), `false` if already initialized. `SeqCst` so the
    /// transition is visible to all CPUs.
    #[inline]
    pub fn init_once(&self) -> bool {
        !self.flag.swap(true, Ordering::SeqCst)
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Relaxed probe for fast paths (logging guards) that don't need to
    /// observe initialization side-effects.
    #[inline]
    pub fn is_set_relaxed(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Mark completion at a specific point when initialization happens in
    /// stages.
    #[inline]
    pub fn mark_set(&self) {
        self.flag.store(true, Ordering::Release);
    }
}

impl Default for InitFlag {
    fn default() -> Self {
        Self::new()
    }
}

#[repr(transparent)]
pub struct StateFlag {
    flag: AtomicBool,
}

impl StateFlag {
    #[inline]
    pub const fn new() -> Self {
        Self {
            flag: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn set_active(&self) {
        self.flag.store(true, Ordering::Release);
    }

    #[inline]
    pub fn set_inactive(&self) {
        self.flag.store(false, Ordering::Release);
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Atomically check-and-clear (consume pattern). Returns `true` if the
    /// flag was active and is now inactive.
    #[inline]
    pub fn take(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }
}

impl Default for StateFlag {
    fn default() -> Self {
        Self::new()
    }
}
