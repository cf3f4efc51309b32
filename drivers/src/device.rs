//! Device lifecycle: ordered bring-up with rollback, paired teardown.
//!
//! All per-device mutable state lives here, on one exclusively-owned
//! instance. The instance never exists partially: `probe` discards it if
//! any bring-up step fails, after unwinding everything already initialized
//! in strict reverse order.

use core::array;
use core::sync::atomic::{AtomicU8, AtomicU16, AtomicU32, AtomicU64, Ordering};

use vcap_abi::{IrqStatus, NR_DMA_CHANNELS, VcapError, VcapResult, VideoGeometry};
use vcap_hw::{HostBridge, PciDeviceId, PciFunction};
use vcap_lib::time;
use vcap_lib::{StateFlag, klog_error, klog_info, klog_warn};

use crate::diag::{Diag, DiagEvent};
use crate::dma::{self, DmaChannel};
use crate::regio::RegisterBus;
use crate::regs;
use crate::{afe, audio, cbus, enc, gpio, irq, vin, vout};

/// Device clock in MHz; every divider below is derived from it.
pub const CLOCK_MHZ: u32 = 108;

const DEFAULT_DMA_TIMEOUT_MS: u32 = 100;
/// Page-flip poll budget, in 1 ms retries.
const DEFAULT_FLIP_RETRY_LIMIT: u32 = 300;

/// PCI IDs this core drives.
pub const SUPPORTED_IDS: [PciDeviceId; 1] = [PciDeviceId {
    vendor: 0x9413,
    device: 0x6010,
}];

pub fn is_supported(id: PciDeviceId) -> bool {
    SUPPORTED_IDS.contains(&id)
}

/// Subsystems in bring-up order. Teardown is the exact reverse; no
/// subsystem's exit may assume a later one still exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsys {
    ControlBus,
    DmaEngine,
    DisplayOut,
    Gpio,
    FrontEnd,
    VideoIn,
    Encoder,
    CaptureBridge,
    AudioEncoder,
}

impl Subsys {
    pub fn name(&self) -> &'static str {
        match self {
            Subsys::ControlBus => "control-bus",
            Subsys::DmaEngine => "dma-engine",
            Subsys::DisplayOut => "display-out",
            Subsys::Gpio => "gpio",
            Subsys::FrontEnd => "front-end",
            Subsys::VideoIn => "video-in",
            Subsys::Encoder => "encoder",
            Subsys::CaptureBridge => "capture-bridge",
            Subsys::AudioEncoder => "audio-encoder",
        }
    }
}

struct SubsysEntry {
    id: Subsys,
    init: fn(&Device) -> VcapResult<()>,
    exit: fn(&Device),
}

const BRINGUP_ORDER: [SubsysEntry; 9] = [
    SubsysEntry {
        id: Subsys::ControlBus,
        init: cbus::init,
        exit: cbus::exit,
    },
    SubsysEntry {
        id: Subsys::DmaEngine,
        init: dma::engine_init,
        exit: dma::engine_exit,
    },
    SubsysEntry {
        id: Subsys::DisplayOut,
        init: vout::init,
        exit: vout::exit,
    },
    SubsysEntry {
        id: Subsys::Gpio,
        init: gpio::init,
        exit: gpio::exit,
    },
    SubsysEntry {
        id: Subsys::FrontEnd,
        init: afe::init,
        exit: afe::exit,
    },
    SubsysEntry {
        id: Subsys::VideoIn,
        init: vin::init,
        exit: vin::exit,
    },
    SubsysEntry {
        id: Subsys::Encoder,
        init: enc::encoder_init,
        exit: enc::encoder_exit,
    },
    SubsysEntry {
        id: Subsys::CaptureBridge,
        init: enc::bridge_init,
        exit: enc::bridge_exit,
    },
    SubsysEntry {
        id: Subsys::AudioEncoder,
        init: audio::init,
        exit: audio::exit,
    },
];

/// Channel-count policy for the hardware identifier. Unrecognized values
/// are not fatal; they degrade to the minimal configuration.
fn channel_policy(chip_id: u8) -> (u8, u8, bool) {
    match chip_id {
        7 => (16, 5, true),
        6 => (8, 2, true),
        5 => (4, 1, true),
        _ => (4, 1, false),
    }
}

pub struct Device {
    bus: RegisterBus,
    chip_id: u8,
    nr_chans: u8,
    nr_ext: u8,
    irq_line: u8,
    geometry: VideoGeometry,

    pub(crate) erasing: StateFlag,
    pub(crate) cur_ch: AtomicU8,
    last_page: AtomicU8,
    frames_since_switch: AtomicU32,
    pub(crate) inputs_present: AtomicU16,

    reader: spin::Mutex<u64>,
    next_reader_cookie: AtomicU64,

    dma: [DmaChannel; NR_DMA_CHANNELS],
    dma_timeout_ms: AtomicU32,
    flip_retry_limit: AtomicU32,

    diag: Diag,
}

impl core::fmt::Debug for Device {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Device")
            .field("chip_id", &self.chip_id)
            .field("nr_chans", &self.nr_chans)
            .field("nr_ext", &self.nr_ext)
            .finish_non_exhaustive()
    }
}

impl Device {
    /// One-shot bring-up. On any failure the already-initialized subsystems
    /// are unwound in reverse order, the interrupt line is returned to the
    /// platform, and the instance is discarded; no partial device is ever
    /// returned.
    pub fn probe(pci: &PciFunction, bridge: &dyn HostBridge) -> VcapResult<Device> {
        let dev = Device::new(pci)?;
        dev.start(bridge)?;
        klog_info!(
            "vc6: probe ok, chip id {:#04x}, {} channels, {} extension banks",
            dev.chip_id,
            dev.nr_chans,
            dev.nr_ext
        );
        Ok(dev)
    }

    /// Prepare the part: validate the register window, quiesce interrupts,
    /// identify the variant and program the global clock/SDRAM
    /// configuration. No subsystem is touched yet.
    pub fn new(pci: &PciFunction) -> VcapResult<Device> {
        if !pci.window.is_mapped() || pci.window.size() < regs::REG_WINDOW_LEN {
            klog_error!("vc6: register window unavailable");
            return Err(VcapError::Unavailable);
        }

        let bus = RegisterBus::new(pci.window);

        // Quiesce the part before anything can fire.
        bus.update_irq_mask(|_| 0);

        let chip_id = (bus.read(regs::CHIP_OPTION) & regs::CHIP_ID_MASK) as u8;
        let (nr_chans, nr_ext, recognized) = channel_policy(chip_id);

        // Global clock and SDRAM configuration, then let the PLL settle.
        bus.write(
            regs::SYS_CFG,
            regs::SYS_CFG_SDRAM64BIT
                | regs::sys_cfg_input_div(25)
                | regs::sys_cfg_feedback_div(CLOCK_MHZ * 2 - 2)
                | regs::sys_cfg_out_div(3),
        );
        bus.write(regs::TIMER_CLOCK_NUM, CLOCK_MHZ - 1);
        time::delay_ms(1);

        let dev = Device {
            bus,
            chip_id,
            nr_chans,
            nr_ext,
            irq_line: pci.irq_line,
            geometry: VideoGeometry::ntsc(),
            erasing: StateFlag::new(),
            cur_ch: AtomicU8::new(0),
            last_page: AtomicU8::new(0),
            frames_since_switch: AtomicU32::new(0),
            inputs_present: AtomicU16::new(0),
            reader: spin::Mutex::new(0),
            next_reader_cookie: AtomicU64::new(1),
            dma: array::from_fn(|_| DmaChannel::new()),
            dma_timeout_ms: AtomicU32::new(DEFAULT_DMA_TIMEOUT_MS),
            flip_retry_limit: AtomicU32::new(DEFAULT_FLIP_RETRY_LIMIT),
            diag: Diag::new(),
        };

        if !recognized {
            klog_warn!(
                "vc6: unrecognized chip id {:#04x}, defaulting to 4 channels",
                chip_id
            );
            dev.diag.record(DiagEvent::ChipFallback(chip_id));
        }

        Ok(dev)
    }

    /// Claim the interrupt line and run the ordered subsystem bring-up.
    /// On step failure the successfully-initialized prefix is torn down in
    /// strict reverse order and the line is released before the error
    /// propagates.
    pub fn start(&self, bridge: &dyn HostBridge) -> VcapResult<()> {
        bridge.request_irq(self.irq_line)?;

        // Bus errors are handled from the start.
        self.irq_on(IrqStatus::BUS_FAULT);

        for (idx, entry) in BRINGUP_ORDER.iter().enumerate() {
            if let Err(err) = (entry.init)(self) {
                klog_error!("vc6: {} init failed ({:?})", entry.id.name(), err);
                for done in BRINGUP_ORDER[..idx].iter().rev() {
                    (done.exit)(self);
                    self.diag.record(DiagEvent::Teardown(done.id));
                }
                self.bus.update_irq_mask(|_| 0);
                bridge.free_irq(self.irq_line);
                return Err(err);
            }
            self.diag.record(DiagEvent::Bringup(entry.id));
        }

        Ok(())
    }

    /// Deliberate-removal teardown: the same reverse-order sequence the
    /// rollback path runs, unconditionally.
    pub fn shutdown(&self, bridge: &dyn HostBridge) {
        for entry in BRINGUP_ORDER.iter().rev() {
            (entry.exit)(self);
            self.diag.record(DiagEvent::Teardown(entry.id));
        }
        self.bus.update_irq_mask(|_| 0);
        bridge.free_irq(self.irq_line);
        klog_info!("vc6: device shut down");
    }

    /// Interrupt entry point for the platform's shared line.
    pub fn handle_interrupt(&self) -> irq::IrqReturn {
        irq::dispatch(self)
    }

    pub fn irq_on(&self, mask: IrqStatus) {
        self.bus.update_irq_mask(|m| m | mask.bits());
    }

    pub fn irq_off(&self, mask: IrqStatus) {
        self.bus.update_irq_mask(|m| m & !mask.bits());
    }

    pub(crate) fn bus(&self) -> &RegisterBus {
        &self.bus
    }

    pub fn chip_id(&self) -> u8 {
        self.chip_id
    }

    pub fn nr_chans(&self) -> u8 {
        self.nr_chans
    }

    pub fn nr_ext(&self) -> u8 {
        self.nr_ext
    }

    pub fn geometry(&self) -> VideoGeometry {
        self.geometry
    }

    pub fn current_input(&self) -> u8 {
        self.cur_ch.load(Ordering::Relaxed)
    }

    pub fn dma_channel(&self, ch: usize) -> &DmaChannel {
        &self.dma[ch]
    }

    pub fn diag(&self) -> &Diag {
        &self.diag
    }

    pub fn dma_timeout_ms(&self) -> u32 {
        self.dma_timeout_ms.load(Ordering::Relaxed)
    }

    pub fn set_dma_timeout_ms(&self, ms: u32) {
        self.dma_timeout_ms.store(ms, Ordering::Relaxed);
    }

    pub fn flip_retry_limit(&self) -> u32 {
        self.flip_retry_limit.load(Ordering::Relaxed)
    }

    pub fn set_flip_retry_limit(&self, retries: u32) {
        self.flip_retry_limit.store(retries, Ordering::Relaxed);
    }

    pub fn last_page(&self) -> u8 {
        self.last_page.load(Ordering::Relaxed)
    }

    pub fn set_last_page(&self, page: u8) {
        self.last_page.store(page, Ordering::Relaxed);
    }

    /// Reads completed since the last display-channel rotation.
    pub fn note_frame_read(&self) -> u32 {
        self.frames_since_switch.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn reset_frame_tally(&self) {
        self.frames_since_switch.store(0, Ordering::Relaxed);
    }

    pub fn is_erasing(&self) -> bool {
        self.erasing.is_active()
    }

    /// Bitmask of video inputs the front end detected at bring-up.
    pub fn inputs_present(&self) -> u16 {
        self.inputs_present.load(Ordering::Relaxed)
    }

    /// Test-and-set the exclusive reader slot. At most one live cookie
    /// exists per device; a second caller gets `Busy` and may retry later.
    pub fn claim_reader(&self) -> VcapResult<u64> {
        let mut slot = self.reader.lock();
        if *slot != 0 {
            return Err(VcapError::Busy);
        }
        let cookie = self.next_reader_cookie.fetch_add(1, Ordering::Relaxed);
        *slot = cookie;
        Ok(cookie)
    }

    /// Clear the reader slot if (and only if) `cookie` owns it. Releasing
    /// with a stale cookie is a no-op.
    pub fn release_reader(&self, cookie: u64) {
        let mut slot = self.reader.lock();
        if *slot == cookie {
            *slot = 0;
        }
    }

    pub fn reader_active(&self) -> bool {
        *self.reader.lock() != 0
    }
}
