//! Cross-crate scenario tests for the VC6 capture core.
//!
//! Everything here runs hosted: the register window is a heap allocation,
//! the DMA engine is a scripted thread draining the channels' descriptor
//! slots, and interrupts are delivered by calling the dispatch entry point
//! the way the platform would.

#![no_std]

#[cfg(test)]
extern crate std;

#[cfg(test)]
mod rig;

#[cfg(test)]
mod dma_tests;

#[cfg(test)]
mod capture_tests;
