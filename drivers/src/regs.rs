//! VC6 register map.
//!
//! All registers are 32 bits wide. Offsets are bytes into BAR 0. Field
//! builders are const fns so whole-register values can be composed at
//! compile time where the inputs are constants.

/// Size of the BAR 0 register window the core requires.
pub const REG_WINDOW_LEN: usize = 0x1000;

// System block
pub const CHIP_OPTION: usize = 0x0000;
pub const CHIP_ID_MASK: u32 = 0x0000_0007;
pub const SYS_CFG: usize = 0x0004;
pub const SYS_VCLK: usize = 0x0008;
pub const TIMER_CLOCK_NUM: usize = 0x000C;
pub const WATCHDOG: usize = 0x0010;
pub const IRQ_STATUS: usize = 0x0014;
pub const IRQ_ENABLE: usize = 0x0018;
pub const BUS_FAULT_STATUS: usize = 0x001C;

pub const SYS_CFG_SDRAM64BIT: u32 = 1 << 0;

pub const fn sys_cfg_input_div(n: u32) -> u32 {
    (n & 0xFF) << 2
}

pub const fn sys_cfg_feedback_div(n: u32) -> u32 {
    (n & 0x1FF) << 10
}

pub const fn sys_cfg_out_div(n: u32) -> u32 {
    (n & 0x7) << 19
}

pub const fn vclk_select(n: u32) -> u32 {
    n & 0x3
}

/// Input clock delay for one pair of adjacent video inputs (pair 0 covers
/// inputs 0/1, pair 7 covers 14/15).
pub const fn vclk_vin_delay(pair: u32, delay: u32) -> u32 {
    (delay & 0x3) << (2 + pair * 2)
}

// Control bus controller
pub const CB_CFG: usize = 0x0080;
pub const CB_STATUS: usize = 0x0084;
pub const CB_CFG_ENABLE: u32 = 1 << 31;
pub const CB_STATUS_FAULT: u32 = 1 << 31;

pub const fn cb_cfg_clock_div(n: u32) -> u32 {
    n & 0xFF
}

// GPIO
pub const GPIO_CFG: usize = 0x0090;
pub const GPIO_DATA: usize = 0x0094;

// Analog front-end presence straps, one bit per video input
pub const AFE_DETECT: usize = 0x00A0;

// DMA engine
pub const DMA_CTRL: usize = 0x0100;
pub const DMA_STATUS: usize = 0x0104;
pub const DMA_STATUS_FAULT: u32 = 1 << 31;

pub const fn dma_ctrl_latency(n: u32) -> u32 {
    n & 0x3
}

pub const DMA_CTRL_READ_CLK_SELECT: u32 = 1 << 2;
pub const DMA_CTRL_SDRAM_CLK_INVERT: u32 = 1 << 3;

pub const fn dma_ctrl_sdram_size(n: u32) -> u32 {
    (n & 0x3) << 4
}

pub const fn dma_ctrl_refresh_cycle(n: u32) -> u32 {
    (n & 0x3) << 6
}

// Per-channel submit registers, stride 0x20
pub const DMA_CH_CFG_GO: u32 = 1 << 31;
pub const DMA_CH_CFG_WRITE: u32 = 1 << 30;

pub const fn dma_ch_cfg(ch: usize) -> usize {
    0x0110 + ch * 0x20
}

pub const fn dma_ch_host_lo(ch: usize) -> usize {
    0x0114 + ch * 0x20
}

pub const fn dma_ch_host_hi(ch: usize) -> usize {
    0x0118 + ch * 0x20
}

pub const fn dma_ch_ext(ch: usize) -> usize {
    0x011C + ch * 0x20
}

pub const fn dma_ch_len(ch: usize) -> usize {
    0x0120 + ch * 0x20
}

pub const fn dma_ch_err(ch: usize) -> usize {
    0x0124 + ch * 0x20
}

// Video input
pub const VI_CH_FORMAT: usize = 0x0200;
pub const VI_FMT_CFG: usize = 0x0204;
pub const VI_CH_ENA: usize = 0x0208;
pub const VI_PAGE_SW: usize = 0x020C;
pub const VI_ACT_I_P: usize = 0x0210;
pub const VI_ACT_I_S: usize = 0x0214;
pub const VI_ACT_P: usize = 0x0218;
pub const VI_STATUS0: usize = 0x021C;
pub const VI_PB_CONFIG: usize = 0x0220;
pub const VI_PB_RANGE_HV: usize = 0x0224;
pub const VI_PB_ACT_H: usize = 0x0228;
pub const VI_PB_ACT_V: usize = 0x022C;
pub const VI_WIN_SW: usize = 0x0230;

pub const fn vi_fd_sel_mask(n: u32) -> u32 {
    n & 0xFFFF
}

pub const fn vi_prog_mask(n: u32) -> u32 {
    (n & 0xFFFF) << 16
}

pub const fn vi_h_start(n: u32) -> u32 {
    (n & 0x7FF) << 21
}

pub const fn vi_v_start(n: u32) -> u32 {
    (n & 0x3FF) << 11
}

pub const fn vi_v_stop(n: u32) -> u32 {
    n & 0x7FF
}

pub const fn vi_status_page(status: u32) -> u8 {
    (status & 0x3) as u8
}

pub const VI_PB_USER_MODE: u32 = 1 << 31;
pub const VI_PB_PAL: u32 = 1 << 30;

pub const fn vi_pb_hsize(n: u32) -> u32 {
    (n & 0xFFF) << 12
}

pub const fn vi_pb_vsize(n: u32) -> u32 {
    n & 0xFFF
}

pub const fn vi_pb_hstart(n: u32) -> u32 {
    (n & 0xFFF) << 12
}

pub const fn vi_pb_hstop(n: u32) -> u32 {
    n & 0xFFF
}

pub const fn vi_pb_vstart(n: u32) -> u32 {
    (n & 0xFFF) << 12
}

pub const fn vi_pb_vstop(n: u32) -> u32 {
    n & 0xFFF
}

// Per-channel display windows
pub const fn vi_win_ctrl0(ch: usize) -> usize {
    0x0240 + ch * 8
}

pub const fn vi_win_ctrl1(ch: usize) -> usize {
    0x0244 + ch * 8
}

pub const fn vi_win_on(ch: usize) -> usize {
    0x02C0 + ch * 4
}

pub const fn vi_win_channel(ch: u32) -> u32 {
    (ch & 0xF) << 24
}

pub const fn vi_win_scale(s: u32) -> u32 {
    (s & 0x3) << 22
}

pub const fn vi_win_sx(x: u32) -> u32 {
    (x & 0x7FF) << 11
}

pub const fn vi_win_ex(x: u32) -> u32 {
    x & 0x7FF
}

pub const fn vi_win_sy(y: u32) -> u32 {
    (y & 0x7FF) << 11
}

pub const fn vi_win_ey(y: u32) -> u32 {
    y & 0x7FF
}

// Video output / display
pub const VO_FMT_ENC: usize = 0x0300;
pub const VO_ACT_H: usize = 0x0304;
pub const VO_ACT_V: usize = 0x0308;
pub const VO_RANGE_HV: usize = 0x030C;
pub const VO_DISP_CTRL: usize = 0x0310;
pub const VO_DISP_ERASE: usize = 0x0314;
pub const VO_BORDER_LINE_COLOR: usize = 0x0318;
pub const VO_BORDER_FILL_COLOR: usize = 0x031C;
pub const VO_BKG_COLOR: usize = 0x0320;

pub const VO_FMT_TYPE_PAL: u32 = 1 << 0;
pub const VO_USER_COLOR_SET_NAV: u32 = 1 << 28;
pub const VO_DISP_ON: u32 = 1 << 31;
pub const VO_DISP_ERASE_ON: u32 = 1 << 0;

pub const fn vo_disp_erase_count(n: u32) -> u32 {
    (n & 0xF) << 24
}

pub const fn vo_disp_base(addr: u32) -> u32 {
    (addr >> 16) & 0xFFFF
}

pub const fn vo_h_start(n: u32) -> u32 {
    (n & 0xFFF) << 12
}

pub const fn vo_h_stop(n: u32) -> u32 {
    n & 0xFFF
}

pub const fn vo_v_start(n: u32) -> u32 {
    (n & 0xFFF) << 12
}

pub const fn vo_v_stop(n: u32) -> u32 {
    n & 0xFFF
}

pub const fn vo_h_len(n: u32) -> u32 {
    (n & 0xFFF) << 12
}

pub const fn vo_v_len(n: u32) -> u32 {
    n & 0xFFF
}

pub const fn vo_exp(n: usize) -> usize {
    0x0330 + n * 4
}

pub const VO_EXP_ON: u32 = 1 << 31;

pub const fn vo_exp_size(n: u32) -> u32 {
    n & 0x3FF
}

// Capture engine
pub const CAP_BASE: usize = 0x0400;
pub const CAP_BTW: usize = 0x0404;

pub const fn cap_max_page(n: u32) -> u32 {
    (n & 0xFFFF) << 16
}

pub const fn cap_base_addr(addr16: u32) -> u32 {
    addr16 & 0xFFFF
}

pub const fn cap_prog_bandwidth(n: u32) -> u32 {
    (n & 0xF) << 8
}

pub const fn cap_max_bandwidth(n: u32) -> u32 {
    n & 0xFF
}

pub const fn dim_scale(n: usize) -> usize {
    0x0410 + n * 4
}

pub const DIM_PROG: usize = 0x0424;

pub const fn dim_h_mb(n: u32) -> u32 {
    (n & 0xFF) << 16
}

pub const fn dim_v_mb_frame(n: u32) -> u32 {
    (n & 0xFF) << 8
}

pub const fn dim_v_mb_field(n: u32) -> u32 {
    n & 0xFF
}

// Encoder pipeline
pub const ENC_CTRL: usize = 0x0500;
pub const ENC_STATUS: usize = 0x0504;
pub const ENC_STATUS_FAULT: u32 = 1 << 31;

// Encoder-to-capture bridge
pub const EB_CTRL: usize = 0x0540;
pub const EB_STATUS: usize = 0x0544;
pub const EB_STATUS_FAULT: u32 = 1 << 31;

// Audio encoder
pub const AUD_CTRL: usize = 0x0580;
pub const AUD_STATUS: usize = 0x0584;
pub const AUD_STATUS_FAULT: u32 = 1 << 31;

// Serial configuration memory: control register plus a 64-word shadow
pub const EE_CTRL: usize = 0x0700;
pub const EE_CTRL_PROGRAM_EN: u32 = 1 << 8;

pub const fn ee_word(idx: usize) -> usize {
    0x0710 + idx * 4
}

/// External SDRAM layout: one capture bank per channel from the bottom of
/// the part, the two display frame pages right after the capture region.
pub const CAP_BANK_BYTES: u32 = 0x0008_0000;
pub const CAP_BANK_PAGES: u32 = 8;

pub const fn disp_base_addr(nr_chans: u8) -> u32 {
    nr_chans as u32 * CAP_BANK_BYTES
}
