//! TSC-based delays and deadlines.
//!
//! The capture core needs three things from a clock: a PLL settle delay, the
//! 1 ms page-poll granularity, and DMA completion deadlines. All are built on
//! the cycle counter with a once-estimated cycles-per-millisecond factor.

use core::sync::atomic::{AtomicU64, Ordering};

use crate::{cpu, tsc};

/// Fallback when CPUID does not report a base frequency (3 GHz).
const DEFAULT_CYCLES_PER_MS: u64 = 3_000_000;

static CACHED_CYCLES_PER_MS: AtomicU64 = AtomicU64::new(0);

/// Estimate CPU cycles per millisecond using CPUID leaf 0x16 if available.
pub fn cycles_per_ms() -> u64 {
    let cached = CACHED_CYCLES_PER_MS.load(Ordering::Relaxed);
    if cached != 0 {
        return cached;
    }

    let (max_leaf, _, _, _) = cpu::cpuid(0);
    let mut cycles_per_ms = DEFAULT_CYCLES_PER_MS;
    if max_leaf >= 0x16 {
        let (freq_mhz, _, _, _) = cpu::cpuid(0x16);
        if freq_mhz != 0 {
            cycles_per_ms = freq_mhz as u64 * 1_000;
        }
    }

    CACHED_CYCLES_PER_MS.store(cycles_per_ms, Ordering::Relaxed);
    cycles_per_ms
}

/// A point in cycle time after which an operation is considered stalled.
#[derive(Clone, Copy)]
pub struct Deadline {
    expiry: u64,
}

impl Deadline {
    pub fn after_ms(ms: u32) -> Self {
        Self {
            expiry: tsc::rdtsc().wrapping_add(ms as u64 * cycles_per_ms()),
        }
    }

    pub fn expired(&self) -> bool {
        // Wrapping comparison: the TSC outlives any deadline span we use.
        tsc::rdtsc().wrapping_sub(self.expiry) < (1 << 62)
    }
}

/// Busy-wait for at least `ms` milliseconds.
pub fn delay_ms(ms: u32) {
    let deadline = Deadline::after_ms(ms);
    while !deadline.expired() {
        cpu::pause();
    }
}
