//! Control-bus controller bring-up.
//!
//! The serial control bus programs the external video decoder chips. Its
//! transfer state machine is owned elsewhere; the core only sequences the
//! controller's clock, its interrupt and its notification point.

use vcap_abi::{IrqStatus, VcapError, VcapResult};
use vcap_lib::klog_error;

use crate::device::{CLOCK_MHZ, Device};
use crate::diag::Diag;
use crate::regs;

/// Controller clock divider from the device clock.
const CB_CLOCK_DIV: u32 = CLOCK_MHZ / 4;

pub fn init(dev: &Device) -> VcapResult<()> {
    let bus = dev.bus();
    if bus.read(regs::CB_STATUS) & regs::CB_STATUS_FAULT != 0 {
        klog_error!("vc6: control-bus controller reports a fault");
        return Err(VcapError::HwFault);
    }

    bus.write(
        regs::CB_CFG,
        regs::CB_CFG_ENABLE | regs::cb_cfg_clock_div(CB_CLOCK_DIV),
    );
    dev.irq_on(IrqStatus::CONTROL_BUS);
    Ok(())
}

pub fn exit(dev: &Device) {
    dev.irq_off(IrqStatus::CONTROL_BUS);
    dev.bus().write(regs::CB_CFG, 0);
}

/// Notification point for the bus-master state machine; interrupt context.
pub(crate) fn isr(dev: &Device) {
    Diag::bump(&dev.diag().counters.cbus_events);
}
