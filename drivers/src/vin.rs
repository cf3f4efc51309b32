//! Video-input front end: input clocking, active windows, per-standard
//! playback timing and the capture engine's base/bandwidth/scale setup.

use vcap_abi::{IrqStatus, VcapResult, VideoStandard};

use crate::device::Device;
use crate::diag::Diag;
use crate::{regs, vout};

const VIN_HSTART: u32 = 8;
const VIN_VSTART: u32 = 2;
const VOUT_HSTART: u32 = 6;
const VOUT_VSTART: u32 = 8;
const VCLK_DELAY: u32 = 3;
const PROGRESSIVE_VSIZE: u32 = 1024;
const PROG_HSIZE: u32 = 1280 - 16;
const PROG_VSIZE: u32 = 1024 - 16;
const CAPTURE_MAX_BANDWIDTH: u32 = 32;

fn vin_config(dev: &Device) {
    let bus = dev.bus();
    let vsize = dev.geometry().vsize as u32;

    let mut vclk = regs::vclk_select(2);
    for pair in 0..8 {
        vclk |= regs::vclk_vin_delay(pair, VCLK_DELAY);
    }
    bus.write(regs::SYS_VCLK, vclk);

    bus.write(
        regs::VI_ACT_I_P,
        regs::vi_h_start(VIN_HSTART)
            | regs::vi_v_start(VIN_VSTART)
            | regs::vi_v_stop(VIN_VSTART + vsize),
    );
    bus.write(
        regs::VI_ACT_I_S,
        regs::vi_h_start(VOUT_HSTART)
            | regs::vi_v_start(VOUT_VSTART)
            | regs::vi_v_stop(VOUT_VSTART + vsize),
    );
    bus.write(
        regs::VI_ACT_P,
        regs::vi_h_start(0) | regs::vi_v_start(1) | regs::vi_v_stop(PROGRESSIVE_VSIZE),
    );

    bus.write(
        regs::VI_CH_FORMAT,
        regs::vi_fd_sel_mask(0) | regs::vi_prog_mask(0),
    );

    bus.write(regs::VI_FMT_CFG, 0);
    bus.write(regs::VI_CH_ENA, 0xFFFF);
    bus.write(regs::VI_PAGE_SW, 2);

    match dev.geometry().standard {
        VideoStandard::Ntsc => {
            bus.write(regs::VI_PB_CONFIG, regs::VI_PB_USER_MODE);
            bus.write(
                regs::VI_PB_RANGE_HV,
                regs::vi_pb_hsize(858) | regs::vi_pb_vsize(246),
            );
            bus.write(
                regs::VI_PB_ACT_H,
                regs::vi_pb_hstart(16) | regs::vi_pb_hstop(16 + 720),
            );
            bus.write(
                regs::VI_PB_ACT_V,
                regs::vi_pb_vstart(4) | regs::vi_pb_vstop(4 + 240),
            );
        }
        VideoStandard::Pal => {
            bus.write(regs::VI_PB_CONFIG, regs::VI_PB_USER_MODE | regs::VI_PB_PAL);
            bus.write(
                regs::VI_PB_RANGE_HV,
                regs::vi_pb_hsize(864) | regs::vi_pb_vsize(294),
            );
            bus.write(
                regs::VI_PB_ACT_H,
                regs::vi_pb_hstart(16) | regs::vi_pb_hstop(16 + 720),
            );
            bus.write(
                regs::VI_PB_ACT_V,
                regs::vi_pb_vstart(4) | regs::vi_pb_vstop(4 + 288),
            );
        }
    }
}

fn cap_config(dev: &Device) {
    let bus = dev.bus();
    let width = dev.geometry().hsize as u32;
    let height = dev.geometry().vsize as u32;

    bus.write(
        regs::CAP_BASE,
        regs::cap_max_page(regs::CAP_BANK_PAGES * dev.nr_chans() as u32)
            | regs::cap_base_addr(0),
    );
    bus.write(
        regs::CAP_BTW,
        (1 << 17) | regs::cap_prog_bandwidth(2) | regs::cap_max_bandwidth(CAPTURE_MAX_BANDWIDTH),
    );

    let scales = [
        (width, height),
        (width / 2, height),
        (width / 2, height / 2),
        (width / 3, height / 3),
        (width / 4, height / 2),
    ];
    for (n, (w, h)) in scales.iter().enumerate() {
        bus.write(
            regs::dim_scale(n),
            regs::dim_h_mb(w / 16) | regs::dim_v_mb_frame(h / 8) | regs::dim_v_mb_field(h / 16),
        );
    }

    bus.write(
        regs::DIM_PROG,
        regs::dim_h_mb(PROG_HSIZE / 16)
            | regs::dim_v_mb_frame(PROG_VSIZE / 16)
            | regs::dim_v_mb_field(PROG_VSIZE / 16),
    );
}

pub fn init(dev: &Device) -> VcapResult<()> {
    vin_config(dev);
    cap_config(dev);

    // Default display channel; leaves the display blanked until the first
    // frame read.
    vout::select_channel(dev, 0)?;

    dev.irq_on(IrqStatus::VIDEO_IN);
    Ok(())
}

pub fn exit(dev: &Device) {
    dev.irq_off(IrqStatus::VIDEO_IN);
}

/// Page index the capture engine is currently writing.
pub fn current_page(dev: &Device) -> u8 {
    regs::vi_status_page(dev.bus().read(regs::VI_STATUS0))
}

pub(crate) fn isr(dev: &Device) {
    Diag::bump(&dev.diag().counters.vin_events);
}
