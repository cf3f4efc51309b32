//! VC6 capture ASIC device core.
//!
//! Owns the register bus, the shared-interrupt dispatcher, the DMA channel
//! gateway and the ordered bring-up/teardown sequence. The capture stream
//! surface lives in `vcap-video` on top of this crate.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod afe;
pub mod audio;
pub mod cbus;
pub mod device;
pub mod diag;
pub mod dma;
pub mod eeprom;
pub mod enc;
pub mod gpio;
pub mod irq;
pub mod regio;
pub mod regs;
pub mod vin;
pub mod vout;

pub use device::{Device, Subsys};
pub use irq::IrqReturn;
