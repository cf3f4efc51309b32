//! Mock hardware rig: heap-backed register window, scripted DMA engine,
//! recording host bridge.

use std::boxed::Box;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread;
use std::vec;
use std::vec::Vec;

use vcap_abi::{DmaDescriptor, DmaDirection, IrqStatus, NR_DMA_CHANNELS, VcapResult};
use vcap_drivers::{Device, regs};
use vcap_hw::{HostBridge, MmioRegion, PciDeviceId, PciFunction};

pub struct NullBridge;

impl HostBridge for NullBridge {
    fn request_irq(&self, _line: u8) -> VcapResult<()> {
        Ok(())
    }

    fn free_irq(&self, _line: u8) {}
}

pub static NULL_BRIDGE: NullBridge = NullBridge;

/// Behavior knobs for the engine thread plus its service log.
pub struct EngineScript {
    /// While held, the engine leaves that channel's submissions pending.
    pub hold: [AtomicBool; NR_DMA_CHANNELS],
    /// Error code the engine reports for completions on that channel.
    pub error_code: [AtomicU32; NR_DMA_CHANNELS],
    /// Every serviced transfer, in service order.
    pub serviced: Mutex<Vec<(usize, DmaDescriptor)>>,
}

impl EngineScript {
    fn new() -> Self {
        Self {
            hold: [const { AtomicBool::new(false) }; NR_DMA_CHANNELS],
            error_code: [const { AtomicU32::new(0) }; NR_DMA_CHANNELS],
            serviced: Mutex::new(Vec::new()),
        }
    }
}

/// Byte the mock device "stores" at an external-memory address; lets
/// reassembly tests check exact source offsets.
pub fn pattern(addr: u32) -> u8 {
    (addr % 251) as u8
}

pub struct Rig {
    // Keeps the register window alive; accessed through `win`.
    _mem: Box<[u32]>,
    win: MmioRegion,
    pub dev: Device,
    pub script: EngineScript,
}

impl Rig {
    pub fn probe(chip_id: u32, presets: &[(usize, u32)]) -> Rig {
        let mut mem = vec![0u32; regs::REG_WINDOW_LEN / 4].into_boxed_slice();
        mem[regs::CHIP_OPTION / 4] = chip_id;
        for &(offset, value) in presets {
            mem[offset / 4] = value;
        }
        let win = unsafe { MmioRegion::from_raw(mem.as_mut_ptr() as *mut u8, mem.len() * 4) };

        let pci = PciFunction {
            id: PciDeviceId {
                vendor: 0x9413,
                device: 0x6010,
            },
            bus: 3,
            slot: 0,
            function: 0,
            irq_line: 11,
            window: win,
        };
        let dev = Device::probe(&pci, &NULL_BRIDGE).expect("probe over mock window");

        Rig {
            _mem: mem,
            win,
            dev,
            script: EngineScript::new(),
        }
    }

    pub fn peek(&self, offset: usize) -> u32 {
        self.win.read_u32(offset)
    }

    pub fn poke(&self, offset: usize, value: u32) {
        self.win.write_u32(offset, value);
    }

    /// A copy of the window for helper threads (page flippers).
    pub fn win_copy(&self) -> MmioRegion {
        self.win
    }

    /// Advance the capture engine to the other frame page.
    pub fn flip_page(&self) {
        let status = self.peek(regs::VI_STATUS0);
        self.poke(regs::VI_STATUS0, status ^ 1);
    }

    /// Run `f` with the engine thread servicing DMA submissions.
    pub fn with_engine<R>(&self, f: impl FnOnce() -> R) -> R {
        let stop = AtomicBool::new(false);
        let dev = &self.dev;
        let script = &self.script;
        let win = self.win;
        thread::scope(|s| {
            let stop_ref = &stop;
            s.spawn(move || engine_loop(dev, win, script, stop_ref));
            let result = f();
            stop.store(true, Ordering::Relaxed);
            result
        })
    }
}

fn engine_loop(dev: &Device, win: MmioRegion, script: &EngineScript, stop: &AtomicBool) {
    while !stop.load(Ordering::Relaxed) {
        let mut idle = true;
        for ch in 0..NR_DMA_CHANNELS {
            if script.hold[ch].load(Ordering::Relaxed) {
                continue;
            }
            let Some(desc) = dev.dma_channel(ch).take_submitted() else {
                continue;
            };
            idle = false;

            if desc.direction == DmaDirection::FromDevice {
                let dst = desc.host_addr as *mut u8;
                for k in 0..desc.length {
                    // SAFETY: host_addr/length came from a live submit; the
                    // requester is parked on the completion signal.
                    unsafe {
                        dst.add(k as usize).write(pattern(desc.device_addr + k));
                    }
                }
            }

            win.write_u32(
                regs::dma_ch_err(ch),
                script.error_code[ch].load(Ordering::Relaxed),
            );

            // Raise the channel's status bit and deliver the interrupt; the
            // dispatcher's ack is write-one-to-clear on silicon, so drop the
            // bits afterwards here.
            let status = win.read_u32(regs::IRQ_STATUS);
            win.write_u32(
                regs::IRQ_STATUS,
                status | IrqStatus::dma_channel(ch).bits(),
            );
            dev.handle_interrupt();
            win.write_u32(regs::IRQ_STATUS, 0);

            script.serviced.lock().unwrap().push((ch, desc));
        }
        if idle {
            thread::yield_now();
        }
    }
}
