//! Audio encoder bring-up. The sample pipeline is external; the core only
//! gates its clock and interrupt.

use vcap_abi::{IrqStatus, VcapError, VcapResult};
use vcap_lib::klog_error;

use crate::device::Device;
use crate::diag::Diag;
use crate::regs;

/// 8 kHz telephony rate of the on-chip codec.
const AUD_SAMPLE_RATE_8K: u32 = 1 << 4;
const AUD_CTRL_ENABLE: u32 = 1 << 0;

pub fn init(dev: &Device) -> VcapResult<()> {
    let bus = dev.bus();
    if bus.read(regs::AUD_STATUS) & regs::AUD_STATUS_FAULT != 0 {
        klog_error!("vc6: audio encoder reports a fault");
        return Err(VcapError::HwFault);
    }

    bus.write(regs::AUD_CTRL, AUD_CTRL_ENABLE | AUD_SAMPLE_RATE_8K);
    dev.irq_on(IrqStatus::AUDIO);
    Ok(())
}

pub fn exit(dev: &Device) {
    dev.irq_off(IrqStatus::AUDIO);
    dev.bus().write(regs::AUD_CTRL, 0);
}

pub(crate) fn isr(dev: &Device) {
    Diag::bump(&dev.diag().counters.aud_events);
}
