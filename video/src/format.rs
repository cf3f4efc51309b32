//! Input enumeration and capture-format negotiation.
//!
//! The pipeline runs one fixed format derived from the configured geometry;
//! negotiation is a matter of rejecting everything else. Input selection
//! drives the blanked window reprogramming in the display path.

use vcap_abi::{CaptureFormat, InputInfo, PIX_FMT_UYVY, VcapError, VcapResult};
use vcap_drivers::{Device, vout};

pub fn input_count(dev: &Device) -> u8 {
    dev.nr_chans()
}

pub fn input_info(dev: &Device, index: u8) -> VcapResult<InputInfo> {
    if index >= dev.nr_chans() {
        return Err(VcapError::InvalidArgument);
    }
    Ok(InputInfo {
        index,
        standard: dev.geometry().standard,
    })
}

pub fn current_input(dev: &Device) -> u8 {
    dev.current_input()
}

/// Select the camera shown full-frame; blanks the display for the switch.
pub fn select_input(dev: &Device, index: u8) -> VcapResult<()> {
    vout::select_channel(dev, index)
}

/// The one format the capture path produces.
pub fn query_format(dev: &Device) -> CaptureFormat {
    let geometry = dev.geometry();
    CaptureFormat {
        width: geometry.hsize,
        height: geometry.vsize * 2,
        pixel_format: PIX_FMT_UYVY,
        bytes_per_line: geometry.bytes_per_line() as u32,
        image_size: geometry.image_bytes() as u32,
        standard: geometry.standard,
    }
}

/// Reject any requested geometry or encoding other than the running
/// configuration.
pub fn try_format(dev: &Device, requested: &CaptureFormat) -> VcapResult<()> {
    if *requested != query_format(dev) {
        return Err(VcapError::InvalidArgument);
    }
    Ok(())
}

/// Like `try_format`, but additionally refuses to touch the format while a
/// reader is pulling frames.
pub fn set_format(dev: &Device, requested: &CaptureFormat) -> VcapResult<()> {
    if dev.reader_active() {
        return Err(VcapError::Busy);
    }
    try_format(dev, requested)
}
