//! Analog front-end detection.
//!
//! Decoder chips strap a presence bit per video input. Nothing here is
//! fatal: a board with unpopulated inputs still captures on the ones that
//! exist.

use core::sync::atomic::Ordering;

use vcap_abi::VcapResult;
use vcap_lib::{klog_info, klog_warn};

use crate::device::Device;
use crate::regs;

pub fn init(dev: &Device) -> VcapResult<()> {
    let straps = dev.bus().read(regs::AFE_DETECT);
    let populated = (straps as u16) & (((1u32 << dev.nr_chans()) - 1) as u16);
    dev.inputs_present.store(populated, Ordering::Relaxed);

    if populated == 0 {
        klog_warn!("vc6: no front-end chips detected");
    } else {
        klog_info!(
            "vc6: {} of {} video inputs populated",
            populated.count_ones(),
            dev.nr_chans()
        );
    }
    Ok(())
}

pub fn exit(dev: &Device) {
    dev.inputs_present.store(0, Ordering::Relaxed);
}
