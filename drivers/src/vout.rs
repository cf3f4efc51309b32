//! Display output: format/timing programming, the erase bracket, and the
//! per-channel preview windows.
//!
//! Window reprogramming is always done blanked: switching the displayed
//! channel raises the erase flag first, and the display is restored on the
//! next frame read (which delivers one blanked frame instead of tearing).

use vcap_abi::{VcapError, VcapResult, VideoStandard};

use crate::device::Device;
use crate::regs;

/// Horizontal line stride of a display frame page in external SDRAM.
pub const LINE_PITCH: usize = 2048;

const VOUT_HSTART: u32 = 6;
const VOUT_VSTART: u32 = 8;
const ERASE_COUNT: u32 = 8;

pub fn init(dev: &Device) -> VcapResult<()> {
    let bus = dev.bus();
    let hsize = dev.geometry().hsize as u32;
    let vsize = dev.geometry().vsize as u32;

    bus.write(
        regs::VO_BORDER_LINE_COLOR,
        (0xa0 << 24) | (0x88 << 16) | (0xa0 << 8) | 0x88,
    );
    bus.write(
        regs::VO_BORDER_FILL_COLOR,
        (0x10 << 24) | (0x8f << 16) | (0x10 << 8) | 0x8f,
    );
    bus.write(regs::VO_BKG_COLOR, (16 << 24) | (128 << 16) | (16 << 8) | 128);

    let fmt_type = match dev.geometry().standard {
        VideoStandard::Ntsc => 0,
        VideoStandard::Pal => regs::VO_FMT_TYPE_PAL,
    };
    bus.write(regs::VO_FMT_ENC, fmt_type | regs::VO_USER_COLOR_SET_NAV);

    bus.write(
        regs::VO_ACT_H,
        regs::vo_h_start(VOUT_HSTART) | regs::vo_h_stop(VOUT_HSTART + hsize),
    );
    bus.write(
        regs::VO_ACT_V,
        regs::vo_v_start(VOUT_VSTART) | regs::vo_v_stop(VOUT_VSTART + vsize),
    );
    bus.write(
        regs::VO_RANGE_HV,
        regs::vo_h_len(hsize) | regs::vo_v_len(vsize),
    );

    bus.write(regs::VI_WIN_SW, 5);

    bus.write(
        regs::VO_DISP_CTRL,
        regs::VO_DISP_ON
            | regs::vo_disp_erase_count(ERASE_COUNT)
            | regs::vo_disp_base(regs::disp_base_addr(dev.nr_chans())),
    );

    erase_on(dev);

    // Mute the input slots this variant does not populate.
    for ch in dev.nr_chans()..16 {
        let ena = bus.read(regs::VI_CH_ENA) & (!(1u32 << ch) & 0xFFFF);
        bus.write(regs::VI_CH_ENA, ena);
    }

    bus.write(regs::WATCHDOG, 0);

    Ok(())
}

pub fn exit(dev: &Device) {
    dev.bus().write(regs::VO_DISP_CTRL, 0);
}

/// Blank the display and remember that reconfiguration is in progress.
pub fn erase_on(dev: &Device) {
    dev.bus().write(regs::VO_DISP_ERASE, regs::VO_DISP_ERASE_ON);
    dev.erasing.set_active();
}

/// If the display was blanked, un-blank it and report that the caller must
/// not trust the current frame pages.
pub fn restore_display(dev: &Device) -> bool {
    if !dev.erasing.take() {
        return false;
    }
    dev.bus().write(regs::VO_DISP_ERASE, 0);
    true
}

fn program_window(dev: &Device, ch: u8, on: bool) {
    let bus = dev.bus();
    let hsize = dev.geometry().hsize as u32;
    let vsize = dev.geometry().vsize as u32;
    let ch = ch as usize;

    bus.write(
        regs::vi_win_ctrl0(ch),
        regs::vi_win_channel(ch as u32)
            | regs::vi_win_scale(if on { 1 } else { 0 })
            | regs::vi_win_sx(if on { 0 } else { hsize })
            | regs::vi_win_ex(hsize),
    );
    bus.write(
        regs::vi_win_ctrl1(ch),
        regs::vi_win_sy(if on { 0 } else { vsize }) | regs::vi_win_ey(vsize),
    );
    bus.write(regs::vi_win_on(ch), 0x0000_0001);

    bus.write(regs::vo_exp(0), regs::VO_EXP_ON | regs::vo_exp_size(0));
    bus.write(regs::vo_exp(1), regs::VO_EXP_ON | regs::vo_exp_size(2));
    bus.write(regs::vo_exp(2), regs::VO_EXP_ON | regs::vo_exp_size(698));
    bus.write(regs::vo_exp(2), regs::VO_EXP_ON | regs::vo_exp_size(700));
}

/// Show `ch` full-frame and scale every other window to zero. Blanks the
/// display first; the next frame read restores it.
pub fn select_channel(dev: &Device, ch: u8) -> VcapResult<()> {
    if ch >= dev.nr_chans() {
        return Err(VcapError::InvalidArgument);
    }

    erase_on(dev);

    for i in 0..dev.nr_chans() {
        program_window(dev, i, i == ch);
    }

    dev.cur_ch.store(ch, core::sync::atomic::Ordering::Relaxed);
    Ok(())
}

/// Bytes one frame page occupies in external SDRAM (hardware pitch, both
/// fields).
pub fn hw_frame_bytes(dev: &Device) -> usize {
    LINE_PITCH * dev.geometry().frame_lines()
}

/// SDRAM address of one of the two display frame pages.
pub fn frame_address(dev: &Device, page: u8) -> u32 {
    regs::disp_base_addr(dev.nr_chans()) + page as u32 * hw_frame_bytes(dev) as u32
}
