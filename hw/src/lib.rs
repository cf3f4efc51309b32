#![no_std]

#[cfg(test)]
extern crate std;

pub mod mmio;
pub mod pci;

pub use mmio::MmioRegion;
pub use pci::{HostBridge, PciDeviceId, PciFunction};
