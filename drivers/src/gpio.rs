//! GPIO bank setup. Pin-level control is an external concern; bring-up only
//! establishes directions and a known output state.

use vcap_abi::VcapResult;

use crate::device::Device;
use crate::regs;

/// Lower 16 pins are outputs (relay and LED drivers on the reference
/// boards), the rest stay inputs.
const GPIO_OUTPUT_MASK: u32 = 0x0000_FFFF;

pub fn init(dev: &Device) -> VcapResult<()> {
    let bus = dev.bus();
    bus.write(regs::GPIO_CFG, GPIO_OUTPUT_MASK);
    bus.write(regs::GPIO_DATA, 0);
    Ok(())
}

pub fn exit(dev: &Device) {
    dev.bus().write(regs::GPIO_CFG, 0);
}
