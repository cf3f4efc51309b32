#![no_std]

#[cfg(test)]
extern crate std;

pub mod cpu {
    //! Processor primitives shared by both execution contexts.
    //!
    //! Interrupt masking is a privileged operation; hosted builds (unit
    //! tests) run with interrupt delivery owned by the host kernel, so the
    //! masking calls compile to nothing there and `interrupts_enabled()`
    //! reports false.

    #[inline(always)]
    pub fn pause() {
        core::hint::spin_loop();
    }

    #[cfg(target_os = "none")]
    #[inline(always)]
    pub fn enable_interrupts() {
        x86_64::instructions::interrupts::enable();
    }

    #[cfg(target_os = "none")]
    #[inline(always)]
    pub fn disable_interrupts() {
        x86_64::instructions::interrupts::disable();
    }

    #[cfg(target_os = "none")]
    #[inline(always)]
    pub fn interrupts_enabled() -> bool {
        x86_64::instructions::interrupts::are_enabled()
    }

    #[cfg(not(target_os = "none"))]
    #[inline(always)]
    pub fn enable_interrupts() {}

    #[cfg(not(target_os = "none"))]
    #[inline(always)]
    pub fn disable_interrupts() {}

    #[cfg(not(target_os = "none"))]
    #[inline(always)]
    pub fn interrupts_enabled() -> bool {
        false
    }

    #[cfg(target_arch = "x86_64")]
    #[inline(always)]
    pub fn cpuid(leaf: u32) -> (u32, u32, u32, u32) {
        #[allow(unused_unsafe)]
        unsafe {
            let res = core::arch::x86_64::__cpuid(leaf);
            (res.eax, res.ebx, res.ecx, res.edx)
        }
    }

    #[cfg(not(target_arch = "x86_64"))]
    #[inline(always)]
    pub fn cpuid(_leaf: u32) -> (u32, u32, u32, u32) {
        (0, 0, 0, 0)
    }
}

pub mod tsc {
    #[cfg(target_arch = "x86_64")]
    #[inline(always)]
    pub fn rdtsc() -> u64 {
        let lo: u32;
        let hi: u32;
        unsafe {
            core::arch::asm!(
                "rdtsc",
                out("eax") lo,
                out("edx") hi,
                options(nomem, nostack, preserves_flags)
            );
        }
        ((hi as u64) << 32) | (lo as u64)
    }

    // No cycle counter off x86; a monotonic software counter keeps the time
    // helpers functional for hosted builds on other architectures.
    #[cfg(not(target_arch = "x86_64"))]
    #[inline(always)]
    pub fn rdtsc() -> u64 {
        use core::sync::atomic::{AtomicU64, Ordering};
        static TICKS: AtomicU64 = AtomicU64::new(0);
        TICKS.fetch_add(1, Ordering::Relaxed)
    }
}

pub mod init_flag;
pub mod klog;
pub mod ring_buffer;
pub mod spinlock;
pub mod time;

pub use init_flag::{InitFlag, StateFlag};
pub use klog::{KlogLevel, klog_attach_serial, klog_get_level, klog_set_level};
pub use ring_buffer::RingBuffer;
pub use spinlock::{IrqMutex, IrqMutexGuard, Spinlock};
