//! Exclusive capture reader.
//!
//! At most one reader exists per device. The token is claimed on open and
//! released on drop; a stale handle releasing after a newer open is a no-op
//! in the device, so ownership can never be stolen. Closing does not
//! interrupt a read already in flight, it only prevents the next open from
//! losing the race.

use vcap_abi::VcapResult;
use vcap_drivers::Device;

use crate::frame::{self, CHUNK_BYTES};

pub struct CaptureReader<'d> {
    dev: &'d Device,
    cookie: u64,
    /// DMA bounce buffer for one hardware chunk; rows are reassembled from
    /// here into the caller's frame buffer.
    scratch: [u8; CHUNK_BYTES],
}

impl<'d> CaptureReader<'d> {
    /// Claim exclusive read access; fails with `Busy` while another reader
    /// is live.
    pub fn open(dev: &'d Device) -> VcapResult<CaptureReader<'d>> {
        let cookie = dev.claim_reader()?;
        Ok(CaptureReader {
            dev,
            cookie,
            scratch: [0; CHUNK_BYTES],
        })
    }

    /// Blocking read of exactly one full frame into `dest`. Returns the
    /// frame size in bytes.
    pub fn read_frame(&mut self, dest: &mut [u8]) -> VcapResult<usize> {
        frame::read_frame(self.dev, &mut self.scratch, dest)
    }

    pub fn device(&self) -> &Device {
        self.dev
    }
}

impl Drop for CaptureReader<'_> {
    fn drop(&mut self) {
        self.dev.release_reader(self.cookie);
    }
}
