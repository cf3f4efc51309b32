//! Driver diagnostics: event ring and per-source counters.
//!
//! Interrupt context records here instead of propagating errors; worker
//! context (and the test rigs) inspect the trail afterwards. The ring
//! overwrites its oldest entry when full, so recording never blocks on a
//! consumer.

use core::sync::atomic::{AtomicU64, Ordering};

use vcap_abi::NR_DMA_CHANNELS;
use vcap_lib::{IrqMutex, RingBuffer};

use crate::device::Subsys;

pub const DIAG_RING_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagEvent {
    /// Subsystem finished init during bring-up
    Bringup(Subsys),
    /// Subsystem teardown ran
    Teardown(Subsys),
    /// Hardware identifier was not recognized; fell back to the minimal
    /// configuration
    ChipFallback(u8),
    /// Bus reported a transaction error (raw fault status)
    BusFault(u32),
    /// DMA channel signalled completion
    DmaComplete(u8),
    /// DMA channel completed with a non-zero error code
    DmaFault { ch: u8, code: u32 },
    /// DMA channel timed out awaiting completion
    DmaStall(u8),
    /// Page-flip poll exhausted its retry budget
    FlipTimeout,
}

#[derive(Default)]
pub struct Counters {
    pub irq_total: AtomicU64,
    pub irq_foreign: AtomicU64,
    pub bus_faults: AtomicU64,
    pub dma_complete: [AtomicU64; NR_DMA_CHANNELS],
    pub cbus_events: AtomicU64,
    pub vin_events: AtomicU64,
    pub enc_events: AtomicU64,
    pub aud_events: AtomicU64,
}

pub struct Diag {
    ring: IrqMutex<RingBuffer<DiagEvent, DIAG_RING_CAPACITY>>,
    pub counters: Counters,
}

impl Diag {
    pub fn new() -> Self {
        Self {
            ring: IrqMutex::new(RingBuffer::new()),
            counters: Counters::default(),
        }
    }

    /// Safe from interrupt context: short IrqMutex hold, no blocking.
    pub fn record(&self, event: DiagEvent) {
        self.ring.lock().push(event);
    }

    /// Drain the oldest-first event trail into `out`; returns the count.
    pub fn drain(&self, out: &mut [Option<DiagEvent>]) -> usize {
        let mut ring = self.ring.lock();
        let mut n = 0;
        for slot in out.iter_mut() {
            match ring.pop() {
                Some(ev) => {
                    *slot = Some(ev);
                    n += 1;
                }
                None => break,
            }
        }
        n
    }

    #[inline]
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for Diag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diag_record_drain_order() {
        let diag = Diag::new();
        diag.record(DiagEvent::ChipFallback(4));
        diag.record(DiagEvent::FlipTimeout);
        let mut out = [None; DIAG_RING_CAPACITY];
        assert_eq!(diag.drain(&mut out), 2);
        assert_eq!(out[0], Some(DiagEvent::ChipFallback(4)));
        assert_eq!(out[1], Some(DiagEvent::FlipTimeout));
        assert_eq!(diag.drain(&mut out), 0);
    }
}
