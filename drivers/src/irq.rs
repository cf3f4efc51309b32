//! Shared-interrupt dispatch.
//!
//! One status register reports every subunit; the line itself is shared
//! with other devices, so a zero status means the interrupt is not ours.
//! Routing is an explicit ordered table: bus errors first (they can mean
//! the whole bus is unreliable), then DMA completions in channel order,
//! then the bus peripherals. Everything called from here runs in interrupt
//! context and must not block.

use vcap_abi::IrqStatus;

use crate::device::Device;
use crate::diag::{Diag, DiagEvent};
use crate::{audio, cbus, dma, enc, regs, vin};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqReturn {
    /// Status was zero; the interrupt belongs to another device on the line.
    NotOurs,
    Handled,
}

type Handler = fn(&Device);

/// Priority-ordered routing. The table *is* the contract; dispatch walks it
/// top to bottom.
pub(crate) const DISPATCH_ORDER: [(IrqStatus, Handler); 9] = [
    (IrqStatus::BUS_FAULT, bus_fault_isr),
    (IrqStatus::DMA_0, isr_dma0),
    (IrqStatus::DMA_1, isr_dma1),
    (IrqStatus::DMA_2, isr_dma2),
    (IrqStatus::DMA_3, isr_dma3),
    (IrqStatus::CONTROL_BUS, cbus::isr),
    (IrqStatus::VIDEO_IN, vin::isr),
    (IrqStatus::ENCODER, enc::isr),
    (IrqStatus::AUDIO, audio::isr),
];

fn isr_dma0(dev: &Device) {
    dma::complete_isr(dev, 0);
}

fn isr_dma1(dev: &Device) {
    dma::complete_isr(dev, 1);
}

fn isr_dma2(dev: &Device) {
    dma::complete_isr(dev, 2);
}

fn isr_dma3(dev: &Device) {
    dma::complete_isr(dev, 3);
}

fn bus_fault_isr(dev: &Device) {
    let fault = dev.bus().read(regs::BUS_FAULT_STATUS);
    Diag::bump(&dev.diag().counters.bus_faults);
    dev.diag().record(DiagEvent::BusFault(fault));
}

/// Interrupt entry point, installed on the shared line by the platform.
pub fn dispatch(dev: &Device) -> IrqReturn {
    let bus = dev.bus();

    let raw = bus.read(regs::IRQ_STATUS);
    if raw == 0 {
        Diag::bump(&dev.diag().counters.irq_foreign);
        return IrqReturn::NotOurs;
    }

    // Clear events we are not currently handling before acting on the
    // masked-in subset, so a later enable cannot observe them twice.
    let mask = bus.irq_mask();
    let stale = raw & !mask;
    if stale != 0 {
        bus.write(regs::IRQ_STATUS, stale);
    }
    let status = IrqStatus::from_bits_truncate(raw & mask);

    Diag::bump(&dev.diag().counters.irq_total);

    for (bit, handler) in DISPATCH_ORDER {
        if status.contains(bit) {
            handler(dev);
        }
    }

    // Acknowledge exactly what was observed as enabled-and-set.
    bus.write(regs::IRQ_STATUS, status.bits());

    IrqReturn::Handled
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::Ordering;

    use crate::device::testutil::probe_rig;
    use crate::diag::{DIAG_RING_CAPACITY, DiagEvent};

    #[test]
    fn test_irq_dispatch_table_priority() {
        assert_eq!(DISPATCH_ORDER[0].0, IrqStatus::BUS_FAULT);
        for ch in 0..4 {
            assert_eq!(DISPATCH_ORDER[1 + ch].0, IrqStatus::dma_channel(ch));
        }
        assert_eq!(DISPATCH_ORDER[5].0, IrqStatus::CONTROL_BUS);
        assert_eq!(DISPATCH_ORDER[6].0, IrqStatus::VIDEO_IN);
        assert_eq!(DISPATCH_ORDER[7].0, IrqStatus::ENCODER);
        assert_eq!(DISPATCH_ORDER[8].0, IrqStatus::AUDIO);
    }

    #[test]
    fn test_irq_dispatch_not_ours_on_zero_status() {
        let rig = probe_rig(7, &[]).unwrap();
        assert_eq!(rig.dev.handle_interrupt(), IrqReturn::NotOurs);
        assert_eq!(
            rig.dev.diag().counters.irq_foreign.load(Ordering::Relaxed),
            1
        );
    }

    #[test]
    fn test_irq_dispatch_clears_stale_and_acks_enabled() {
        let mut rig = probe_rig(7, &[]).unwrap();
        let win = rig.window();

        // ENCODER events are pending but no longer enabled; DMA_2 is live.
        rig.dev.irq_off(IrqStatus::ENCODER);
        win.write_u32(
            regs::IRQ_STATUS,
            (IrqStatus::ENCODER | IrqStatus::DMA_2).bits(),
        );

        assert_eq!(rig.dev.handle_interrupt(), IrqReturn::Handled);

        // The stale bit was never routed; the ack wrote back exactly the
        // observed enabled-and-set subset.
        assert_eq!(
            rig.dev.diag().counters.enc_events.load(Ordering::Relaxed),
            0
        );
        assert_eq!(
            rig.dev.diag().counters.dma_complete[2].load(Ordering::Relaxed),
            1
        );
        assert_eq!(win.read_u32(regs::IRQ_STATUS), IrqStatus::DMA_2.bits());
    }

    #[test]
    fn test_irq_dispatch_bus_fault_before_dma() {
        let mut rig = probe_rig(7, &[]).unwrap();
        let win = rig.window();

        // Flush the bring-up trail so only dispatch events remain.
        let mut events = [None; DIAG_RING_CAPACITY];
        rig.dev.diag().drain(&mut events);

        win.write_u32(regs::BUS_FAULT_STATUS, 0xBAD);
        win.write_u32(
            regs::IRQ_STATUS,
            (IrqStatus::BUS_FAULT | IrqStatus::DMA_2).bits(),
        );
        assert_eq!(rig.dev.handle_interrupt(), IrqReturn::Handled);

        let n = rig.dev.diag().drain(&mut events);
        assert_eq!(
            &events[..n],
            &[
                Some(DiagEvent::BusFault(0xBAD)),
                Some(DiagEvent::DmaComplete(2))
            ]
        );
    }
}
