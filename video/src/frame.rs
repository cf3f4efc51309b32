//! Frame read protocol.
//!
//! The hardware alternates between two frame pages with no page-flip event,
//! so the read path polls the page index in a bounded sleep-and-retry loop.
//! Once a fresh page is seen, the frame is pulled over the display DMA
//! channel in fixed-size chunks and row-reassembled, because the hardware's
//! line pitch does not match the destination stride.

use vcap_abi::{BLANK_PAIR, DMA_CH_DISPLAY, VcapError, VcapResult};
use vcap_lib::time;
use vcap_drivers::device::Device;
use vcap_drivers::diag::DiagEvent;
use vcap_drivers::{dma, vin, vout};

/// One DMA chunk; 32 hardware lines.
pub const CHUNK_BYTES: usize = 64 * 1024;

/// Minimum sleep between page polls.
const POLL_GRANULARITY_MS: u32 = 1;

/// Completed reads between display-channel rotations (round-robin preview
/// scan).
pub const READS_PER_ROTATE: u32 = 150;

pub(crate) fn read_frame(
    dev: &Device,
    scratch: &mut [u8; CHUNK_BYTES],
    dest: &mut [u8],
) -> VcapResult<usize> {
    let geometry = dev.geometry();
    let image_bytes = geometry.image_bytes();
    if dest.len() < image_bytes {
        return Err(VcapError::InvalidArgument);
    }

    // Wait for the capture engine to move off the page we copied last.
    let last = dev.last_page();
    let mut retries = dev.flip_retry_limit();
    let page = loop {
        let page = vin::current_page(dev);
        if page != last {
            break page;
        }
        if retries == 0 {
            dev.diag().record(DiagEvent::FlipTimeout);
            return Err(VcapError::DmaStall);
        }
        retries -= 1;
        time::delay_ms(POLL_GRANULARITY_MS);
    };
    dev.set_last_page(page);

    // Mid-reconfiguration the page contents are indeterminate: deliver one
    // blanked frame and bring the display back instead of reading.
    if vout::restore_display(dev) {
        for pair in dest[..image_bytes].chunks_exact_mut(2) {
            pair.copy_from_slice(&BLANK_PAIR);
        }
        return Ok(image_bytes);
    }

    if dev.note_frame_read() >= READS_PER_ROTATE {
        dev.reset_frame_tally();
        let next = (dev.current_input() + 1) % dev.nr_chans();
        vout::select_channel(dev, next)?;
    }

    let hw_frame = vout::hw_frame_bytes(dev);
    let frame_base = vout::frame_address(dev, page);
    let stride = geometry.bytes_per_line();
    let lines_per_chunk = CHUNK_BYTES / vout::LINE_PITCH;
    debug_assert!(hw_frame % CHUNK_BYTES == 0);

    for chunk in 0..hw_frame / CHUNK_BYTES {
        dma::read_from_device(
            dev,
            DMA_CH_DISPLAY,
            scratch,
            frame_base + (chunk * CHUNK_BYTES) as u32,
        )?;

        // The hardware packs one video line per LINE_PITCH bytes; the
        // destination is packed back-to-back.
        for row in 0..lines_per_chunk {
            let line = chunk * lines_per_chunk + row;
            let src = &scratch[row * vout::LINE_PITCH..row * vout::LINE_PITCH + stride];
            dest[line * stride..(line + 1) * stride].copy_from_slice(src);
        }
    }

    Ok(image_bytes)
}
