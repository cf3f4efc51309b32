//! Capture stream scenarios: reader exclusivity, page-flip synchronization,
//! blanked frames, row reassembly, channel rotation and format negotiation.

use std::sync::Barrier;
use std::thread;
use std::time::Duration;
use std::vec;
use std::vec::Vec;

use vcap_abi::{PIX_FMT_UYVY, VcapError};
use vcap_drivers::{regs, vout};
use vcap_video::{CaptureReader, READS_PER_ROTATE, format};

use crate::rig::{Rig, pattern};

fn frame_buf(rig: &Rig) -> Vec<u8> {
    vec![0u8; rig.dev.geometry().image_bytes()]
}

#[test]
fn test_reader_concurrent_open_single_winner() {
    let rig = Rig::probe(7, &[]);
    let barrier = Barrier::new(2);

    let outcomes: Vec<bool> = thread::scope(|s| {
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let dev = &rig.dev;
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    let reader = CaptureReader::open(dev);
                    // Hold any claimed token until both attempts happened.
                    barrier.wait();
                    match reader {
                        Ok(_) => true,
                        Err(err) => {
                            assert_eq!(err, VcapError::Busy);
                            false
                        }
                    }
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
    // Both readers dropped; the slot is free again.
    assert!(CaptureReader::open(&rig.dev).is_ok());
}

#[test]
fn test_reader_close_frees_slot() {
    let rig = Rig::probe(5, &[]);
    let reader = CaptureReader::open(&rig.dev).unwrap();
    assert!(rig.dev.reader_active());
    drop(reader);
    assert!(!rig.dev.reader_active());
}

#[test]
fn test_read_undersized_buffer_rejected() {
    let rig = Rig::probe(7, &[]);
    let mut reader = CaptureReader::open(&rig.dev).unwrap();
    let mut short = vec![0u8; 128];
    assert_eq!(
        reader.read_frame(&mut short).unwrap_err(),
        VcapError::InvalidArgument
    );
}

#[test]
fn test_read_while_erasing_blanks_frame_without_dma() {
    let rig = Rig::probe(7, &[]);
    let mut reader = CaptureReader::open(&rig.dev).unwrap();
    let mut frame = frame_buf(&rig);

    // Bring-up left the display blanked for the initial channel setup.
    assert!(rig.dev.is_erasing());
    rig.flip_page();
    let n = reader.read_frame(&mut frame).unwrap();

    assert_eq!(n, rig.dev.geometry().image_bytes());
    assert!(frame[..n].iter().all(|b| *b == 0x80));
    // Zero transfers: the engine never ran and nothing is pending.
    assert!(rig.dev.dma_channel(2).take_submitted().is_none());
    assert!(!rig.dev.is_erasing());
}

#[test]
fn test_read_frame_row_reassembly() {
    let rig = Rig::probe(7, &[]);
    rig.dev.set_dma_timeout_ms(2000);
    let mut reader = CaptureReader::open(&rig.dev).unwrap();
    let mut frame = frame_buf(&rig);

    // First read consumes the blank bracket left by bring-up.
    rig.flip_page();
    reader.read_frame(&mut frame).unwrap();

    // Second read pulls live data from page 0.
    rig.flip_page();
    let n = rig.with_engine(|| reader.read_frame(&mut frame).unwrap());
    assert_eq!(n, rig.dev.geometry().image_bytes());

    let stride = rig.dev.geometry().bytes_per_line();
    let base = vout::frame_address(&rig.dev, 0);
    for line in 0..rig.dev.geometry().frame_lines() {
        let src_line = base + (line * vout::LINE_PITCH) as u32;
        for x in (0..stride).step_by(97) {
            assert_eq!(
                frame[line * stride + x],
                pattern(src_line + x as u32),
                "line {} byte {}",
                line,
                x
            );
        }
    }
}

#[test]
fn test_read_page_poll_times_out() {
    let rig = Rig::probe(7, &[]);
    rig.dev.set_flip_retry_limit(3);
    let mut reader = CaptureReader::open(&rig.dev).unwrap();
    let mut frame = frame_buf(&rig);

    // Page never moves off the last-observed index.
    assert_eq!(
        reader.read_frame(&mut frame).unwrap_err(),
        VcapError::DmaStall
    );
}

#[test]
fn test_read_waits_for_late_page_flip() {
    let rig = Rig::probe(7, &[]);
    rig.dev.set_dma_timeout_ms(2000);
    let mut reader = CaptureReader::open(&rig.dev).unwrap();
    let mut frame = frame_buf(&rig);

    rig.flip_page();
    reader.read_frame(&mut frame).unwrap();

    // The flip arrives mid-poll this time.
    let win = rig.win_copy();
    let n = rig.with_engine(|| {
        thread::scope(|s| {
            s.spawn(move || {
                thread::sleep(Duration::from_millis(5));
                let status = win.read_u32(regs::VI_STATUS0);
                win.write_u32(regs::VI_STATUS0, status ^ 1);
            });
            reader.read_frame(&mut frame).unwrap()
        })
    });
    assert_eq!(n, rig.dev.geometry().image_bytes());
}

#[test]
fn test_rotation_after_150_reads() {
    let rig = Rig::probe(7, &[]);
    rig.dev.set_dma_timeout_ms(2000);
    let mut reader = CaptureReader::open(&rig.dev).unwrap();
    let mut frame = frame_buf(&rig);

    rig.flip_page();
    reader.read_frame(&mut frame).unwrap();
    assert_eq!(rig.dev.current_input(), 0);

    rig.with_engine(|| {
        for _ in 0..READS_PER_ROTATE {
            rig.flip_page();
            reader.read_frame(&mut frame).unwrap();
        }
    });

    // The 150th live read rotated the preview to the next input and left
    // the display blanked for the switch.
    assert_eq!(rig.dev.current_input(), 1);
    assert!(rig.dev.is_erasing());

    rig.flip_page();
    reader.read_frame(&mut frame).unwrap();
    assert!(frame.iter().all(|b| *b == 0x80));
    assert!(!rig.dev.is_erasing());
}

#[test]
fn test_format_negotiation_rejects_foreign_geometry() {
    let rig = Rig::probe(7, &[]);
    let fmt = format::query_format(&rig.dev);
    assert_eq!(fmt.width, 704);
    assert_eq!(fmt.height, 480);
    assert_eq!(fmt.pixel_format, PIX_FMT_UYVY);
    assert_eq!(fmt.image_size, 704 * 240 * 4);

    assert!(format::try_format(&rig.dev, &fmt).is_ok());

    let mut wrong = fmt;
    wrong.width = 640;
    assert_eq!(
        format::try_format(&rig.dev, &wrong).unwrap_err(),
        VcapError::InvalidArgument
    );

    let reader = CaptureReader::open(&rig.dev).unwrap();
    assert_eq!(
        format::set_format(&rig.dev, &fmt).unwrap_err(),
        VcapError::Busy
    );
    drop(reader);
    assert!(format::set_format(&rig.dev, &fmt).is_ok());
}

#[test]
fn test_input_enumeration_bounds() {
    let rig = Rig::probe(6, &[]);
    assert_eq!(format::input_count(&rig.dev), 8);
    assert!(format::input_info(&rig.dev, 7).is_ok());
    assert_eq!(
        format::input_info(&rig.dev, 8).unwrap_err(),
        VcapError::InvalidArgument
    );

    format::select_input(&rig.dev, 5).unwrap();
    assert_eq!(format::current_input(&rig.dev), 5);
    assert_eq!(
        format::select_input(&rig.dev, 8).unwrap_err(),
        VcapError::InvalidArgument
    );
}
