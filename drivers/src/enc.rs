//! Encoder pipeline and encoder-to-capture bridge bring-up.
//!
//! The compression pipeline itself is out of the core's hands; these steps
//! gate its clocks, its interrupt and the bridge that feeds it from the
//! capture engine. The bridge depends on the encoder being up, hence the
//! separate, later bring-up slot.

use vcap_abi::{IrqStatus, VcapError, VcapResult};
use vcap_lib::klog_error;

use crate::device::Device;
use crate::diag::Diag;
use crate::regs;

const EB_CTRL_ENABLE: u32 = 1 << 0;

pub fn encoder_init(dev: &Device) -> VcapResult<()> {
    let bus = dev.bus();
    if bus.read(regs::ENC_STATUS) & regs::ENC_STATUS_FAULT != 0 {
        klog_error!("vc6: encoder pipeline reports a fault");
        return Err(VcapError::HwFault);
    }

    bus.write(regs::ENC_CTRL, 0);
    dev.irq_on(IrqStatus::ENCODER);
    Ok(())
}

pub fn encoder_exit(dev: &Device) {
    dev.irq_off(IrqStatus::ENCODER);
    dev.bus().write(regs::ENC_CTRL, 0);
}

pub fn bridge_init(dev: &Device) -> VcapResult<()> {
    let bus = dev.bus();
    if bus.read(regs::EB_STATUS) & regs::EB_STATUS_FAULT != 0 {
        klog_error!("vc6: capture bridge reports a fault");
        return Err(VcapError::HwFault);
    }

    bus.write(regs::EB_CTRL, EB_CTRL_ENABLE);
    Ok(())
}

pub fn bridge_exit(dev: &Device) {
    dev.bus().write(regs::EB_CTRL, 0);
}

pub(crate) fn isr(dev: &Device) {
    Diag::bump(&dev.diag().counters.enc_events);
}
