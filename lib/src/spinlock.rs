use core::cell::UnsafeCell;
use core::hint::spin_loop;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

use crate::cpu;

pub struct Spinlock {
    locked: AtomicBool,
}

/// Mutex that disables interrupt delivery on the current processor while
/// held. Required for state touched from both worker and interrupt context;
/// taking it with interrupts live would self-deadlock against the interrupt
/// handler.
pub struct IrqMutex<T> {
    lock: AtomicBool,
    data: UnsafeCell<T>,
}

// SAFETY: IrqMutex provides exclusive access through atomic locking with
// interrupt delivery disabled, making it safe to share across contexts.
unsafe impl<T: Send> Send for IrqMutex<T> {}
unsafe impl<T: Send> Sync for IrqMutex<T> {}

pub struct IrqMutexGuard<'a, T> {
    mutex: &'a IrqMutex<T>,
    reenable: bool,
}

impl<T> IrqMutex<T> {
    #[inline]
    pub const fn new(data: T) -> Self {
        Self {
            lock: AtomicBool::new(false),
            data: UnsafeCell::new(data),
        }
    }

    #[inline]
    pub fn lock(&self) -> IrqMutexGuard<'_, T> {
        let reenable = cpu::interrupts_enabled();
        cpu::disable_interrupts();

        while self
            .lock
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            spin_loop();
        }

        IrqMutexGuard {
            mutex: self,
            reenable,
        }
    }

    #[inline]
    pub fn try_lock(&self) -> Option<IrqMutexGuard<'_, T>> {
        let reenable = cpu::interrupts_enabled();
        cpu::disable_interrupts();

        if self
            .lock
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            Some(IrqMutexGuard {
                mutex: self,
                reenable,
            })
        } else {
            if reenable {
                cpu::enable_interrupts();
            }
            None
        }
    }
}

impl<'a, T> Deref for IrqMutexGuard<'a, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        unsafe { &*self.mutex.data.get() }
    }
}

impl<'a, T> DerefMut for IrqMutexGuard<'a, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.mutex.data.get() }
    }
}

impl<'a, T> Drop for IrqMutexGuard<'a, T> {
    #[inline]
    fn drop(&mut self) {
        self.mutex.lock.store(false, Ordering::Release);
        if self.reenable {
            cpu::enable_interrupts();
        }
    }
}

impl Spinlock {
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }

    #[inline(always)]
    pub fn lock(&self) {
        while self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            spin_loop();
        }
    }

    #[inline(always)]
    pub fn unlock(&self) {
        self.locked.store(false, Ordering::Release);
    }

    /// Lock with interrupt delivery suppressed; returns whether interrupts
    /// were live so `unlock_irqrestore` can restore them.
    #[inline(always)]
    pub fn lock_irqsave(&self) -> bool {
        let was_enabled = cpu::interrupts_enabled();
        cpu::disable_interrupts();
        self.lock();
        was_enabled
    }

    #[inline(always)]
    pub fn unlock_irqrestore(&self, was_enabled: bool) {
        self.locked.store(false, Ordering::Release);
        if was_enabled {
            cpu::enable_interrupts();
        }
    }
}

impl Default for Spinlock {
    fn default() -> Self {
        Self::new()
    }
}
