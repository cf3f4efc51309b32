//! VC6 Driver ABI Types
//!
//! This crate provides the canonical definitions for all types shared between
//! the driver crates and their consumers. Having a single source of truth
//! eliminates duplicate type definitions and keeps the error convention in
//! one place.
//!
//! All types crossing an ioctl-style boundary are `#[repr(i32)]` or
//! `#[repr(C)]` for ABI stability.

#![no_std]
#![forbid(unsafe_code)]

pub mod dma;
pub mod error;
pub mod irq;
pub mod video;

pub use dma::*;
pub use error::*;
pub use irq::*;
pub use video::*;
