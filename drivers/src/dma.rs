//! DMA channel gateway.
//!
//! The external engine owns descriptor handling; this layer owns channel
//! arbitration and completion. Channels are a scarce shared resource and
//! each is aliased across two unrelated functions, so exactly one transfer
//! may be in flight per channel: the per-channel token serializes callers,
//! the interrupt handler only signals completion.

use core::sync::atomic::{AtomicBool, Ordering};

use vcap_abi::{DmaDescriptor, DmaDirection, IrqStatus, NR_DMA_CHANNELS, VcapError, VcapResult};
use vcap_lib::time::Deadline;
use vcap_lib::{IrqMutex, cpu};

use crate::device::Device;
use crate::diag::{Diag, DiagEvent};
use crate::regs;

/// Per-channel state. Lifetime equals the device's.
pub struct DmaChannel {
    /// One-in-flight token; held by the worker for the whole transfer.
    token: spin::Mutex<()>,
    /// Descriptor slot the engine consumes on submit.
    submitted: IrqMutex<Option<DmaDescriptor>>,
    /// Last submitted descriptor, kept for inspection after a fault or
    /// stall. Never cleared by the driver.
    last_desc: IrqMutex<Option<DmaDescriptor>>,
    done: AtomicBool,
}

impl DmaChannel {
    pub(crate) const fn new() -> Self {
        Self {
            token: spin::Mutex::new(()),
            submitted: IrqMutex::new(None),
            last_desc: IrqMutex::new(None),
            done: AtomicBool::new(false),
        }
    }

    /// Engine side of the submit contract: latch the pending descriptor.
    pub fn take_submitted(&self) -> Option<DmaDescriptor> {
        self.submitted.lock().take()
    }

    /// Descriptor of the most recent transfer, for diagnostics.
    pub fn last_descriptor(&self) -> Option<DmaDescriptor> {
        *self.last_desc.lock()
    }

    pub(crate) fn signal_complete(&self) {
        self.done.store(true, Ordering::Release);
    }
}

/// Completion handler, invoked by the dispatcher in interrupt context.
pub(crate) fn complete_isr(dev: &Device, ch: usize) {
    let chan = dev.dma_channel(ch);
    chan.signal_complete();
    Diag::bump(&dev.diag().counters.dma_complete[ch]);
    dev.diag().record(DiagEvent::DmaComplete(ch as u8));
}

/// Move device memory into a host buffer, blocking until completion.
pub fn read_from_device(
    dev: &Device,
    ch: usize,
    dest: &mut [u8],
    device_addr: u32,
) -> VcapResult<()> {
    let desc = DmaDescriptor {
        direction: DmaDirection::FromDevice,
        host_addr: dest.as_mut_ptr() as u64,
        device_addr,
        length: dest.len() as u32,
    };
    transfer(dev, ch, desc)
}

/// Move a host buffer into device memory, blocking until completion.
pub fn write_to_device(dev: &Device, ch: usize, src: &[u8], device_addr: u32) -> VcapResult<()> {
    let desc = DmaDescriptor {
        direction: DmaDirection::ToDevice,
        host_addr: src.as_ptr() as u64,
        device_addr,
        length: src.len() as u32,
    };
    transfer(dev, ch, desc)
}

fn transfer(dev: &Device, ch: usize, desc: DmaDescriptor) -> VcapResult<()> {
    if ch >= NR_DMA_CHANNELS || desc.length == 0 {
        return Err(VcapError::InvalidArgument);
    }

    let chan = dev.dma_channel(ch);
    let _token = chan.token.lock();

    chan.done.store(false, Ordering::Release);
    *chan.last_desc.lock() = Some(desc);
    *chan.submitted.lock() = Some(desc);

    let bus = dev.bus();
    bus.write(regs::dma_ch_host_lo(ch), desc.host_addr as u32);
    bus.write(regs::dma_ch_host_hi(ch), (desc.host_addr >> 32) as u32);
    bus.write(regs::dma_ch_ext(ch), desc.device_addr);
    bus.write(regs::dma_ch_len(ch), desc.length);
    let mut cfg = regs::DMA_CH_CFG_GO;
    if desc.direction == DmaDirection::ToDevice {
        cfg |= regs::DMA_CH_CFG_WRITE;
    }
    bus.write(regs::dma_ch_cfg(ch), cfg);

    let deadline = Deadline::after_ms(dev.dma_timeout_ms());
    while !chan.done.load(Ordering::Acquire) {
        if deadline.expired() {
            // Leave the descriptor where it is for inspection; retry policy
            // belongs to the caller.
            dev.diag().record(DiagEvent::DmaStall(ch as u8));
            return Err(VcapError::DmaStall);
        }
        cpu::pause();
    }

    let err = bus.read(regs::dma_ch_err(ch));
    if err != 0 {
        bus.write(regs::dma_ch_err(ch), 0);
        dev.diag().record(DiagEvent::DmaFault {
            ch: ch as u8,
            code: err,
        });
        return Err(VcapError::DmaFault);
    }

    Ok(())
}

/// DMA engine bring-up: global timing configuration plus the completion
/// interrupts.
pub fn engine_init(dev: &Device) -> VcapResult<()> {
    let bus = dev.bus();
    if bus.read(regs::DMA_STATUS) & regs::DMA_STATUS_FAULT != 0 {
        return Err(VcapError::HwFault);
    }

    let sdram = if dev.nr_chans() >= 8 { 2 } else { 1 };
    bus.write(
        regs::DMA_CTRL,
        regs::dma_ctrl_refresh_cycle(1)
            | regs::dma_ctrl_sdram_size(sdram)
            | regs::DMA_CTRL_SDRAM_CLK_INVERT
            | regs::DMA_CTRL_READ_CLK_SELECT
            | regs::dma_ctrl_latency(1),
    );

    dev.irq_on(IrqStatus::dma_all());
    Ok(())
}

pub fn engine_exit(dev: &Device) {
    dev.irq_off(IrqStatus::dma_all());
    dev.bus().write(regs::DMA_CTRL, 0);
}
