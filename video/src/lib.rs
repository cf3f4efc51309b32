//! Capture stream surface for the VC6 core.
//!
//! One privileged consumer at a time pulls decoded frames out of the live
//! display pipeline: exclusive reader token, page-flip synchronized reads,
//! and the input/format negotiation surface.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod format;
pub mod frame;
pub mod reader;

pub use format::{
    current_input, input_count, input_info, query_format, select_input, set_format, try_format,
};
pub use frame::{CHUNK_BYTES, READS_PER_ROTATE};
pub use reader::CaptureReader;
