//! PCI function descriptor and the platform seam.
//!
//! The platform layer enumerates the bus, maps BAR 0 and fills in a
//! `PciFunction`; the driver consumes it. `HostBridge` is the single
//! interrupt-line registration point, defined as a trait so the driver
//! crates never depend on a concrete platform.

use vcap_abi::VcapResult;

use crate::mmio::MmioRegion;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PciDeviceId {
    pub vendor: u16,
    pub device: u16,
}

/// One discovered PCI function with its register window already mapped.
#[derive(Clone, Copy)]
pub struct PciFunction {
    pub id: PciDeviceId,
    pub bus: u8,
    pub slot: u8,
    pub function: u8,
    /// Shared interrupt line the function is routed to.
    pub irq_line: u8,
    /// BAR 0 register window; empty if the platform could not map it.
    pub window: MmioRegion,
}

/// Platform services consumed by the driver: interrupt line management.
///
/// The line is shared; the installed entry point must recognize foreign
/// interrupts and report "not mine" (see the dispatcher).
pub trait HostBridge: Sync {
    fn request_irq(&self, line: u8) -> VcapResult<()>;
    fn free_irq(&self, line: u8);
}
