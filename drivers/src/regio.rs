//! Serialized access to the register window.
//!
//! Both execution contexts go through this type, so the lock disables
//! interrupt delivery for its critical section. The interrupt-enable shadow
//! lives under the same lock: the enable register is read-modify-written
//! here and nowhere else, which is what keeps the shadow and the hardware
//! register equal at all times.

use core::sync::atomic::{Ordering, fence};

use vcap_hw::MmioRegion;
use vcap_lib::IrqMutex;

use crate::regs;

struct RegSpace {
    win: MmioRegion,
    irq_mask: u32,
}

pub struct RegisterBus {
    io: IrqMutex<RegSpace>,
}

impl RegisterBus {
    pub fn new(win: MmioRegion) -> Self {
        Self {
            io: IrqMutex::new(RegSpace { win, irq_mask: 0 }),
        }
    }

    pub fn read(&self, offset: usize) -> u32 {
        let space = self.io.lock();
        space.win.read_u32(offset)
    }

    pub fn write(&self, offset: usize, value: u32) {
        let space = self.io.lock();
        Self::write_flushed(&space.win, offset, value);
    }

    /// Posted writes may retire on the bus after this function would
    /// otherwise return; the barrier plus a read of an unrelated
    /// configuration register forces the write out before the lock drops.
    fn write_flushed(win: &MmioRegion, offset: usize, value: u32) {
        win.write_u32(offset, value);
        fence(Ordering::SeqCst);
        let _ = win.read_u32(regs::CHIP_OPTION);
    }

    /// Current interrupt-enable shadow.
    pub(crate) fn irq_mask(&self) -> u32 {
        self.io.lock().irq_mask
    }

    /// Read-modify-write the interrupt-enable register; the shadow and the
    /// hardware register change together under the lock. Returns the new
    /// mask.
    pub(crate) fn update_irq_mask(&self, f: impl FnOnce(u32) -> u32) -> u32 {
        let mut space = self.io.lock();
        let mask = f(space.irq_mask);
        space.irq_mask = mask;
        Self::write_flushed(&space.win, regs::IRQ_ENABLE, mask);
        mask
    }
}
