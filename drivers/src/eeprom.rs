//! Serial configuration memory accessor.
//!
//! The part shadows a 64-word serial EEPROM behind the register window.
//! Reads are plain word transactions; writes only stick while the
//! programming-enable bracket is open.

use vcap_abi::{VcapError, VcapResult};

use crate::device::Device;
use crate::regs;

pub const EEPROM_BYTES: usize = 128;
const EEPROM_WORDS: usize = EEPROM_BYTES / 2;

fn program_enable(dev: &Device, on: bool) {
    let value = if on { regs::EE_CTRL_PROGRAM_EN } else { 0 };
    dev.bus().write(regs::EE_CTRL, value);
}

fn read_word(dev: &Device, idx: usize) -> u16 {
    dev.bus().read(regs::ee_word(idx)) as u16
}

fn write_word(dev: &Device, idx: usize, value: u16) {
    dev.bus().write(regs::ee_word(idx), value as u32);
}

/// Read the whole configuration memory as 64 word transactions.
pub fn read_blob(dev: &Device, out: &mut [u8; EEPROM_BYTES]) {
    for idx in 0..EEPROM_WORDS {
        let word = read_word(dev, idx);
        out[idx * 2..idx * 2 + 2].copy_from_slice(&word.to_le_bytes());
    }
}

/// Persist a full 128-byte blob: 64 word writes inside the
/// programming-enable bracket. Partial blobs are rejected before any
/// register is touched.
pub fn write_blob(dev: &Device, data: &[u8]) -> VcapResult<()> {
    if data.len() != EEPROM_BYTES {
        return Err(VcapError::InvalidArgument);
    }

    program_enable(dev, true);

    for idx in 0..EEPROM_WORDS {
        let word = u16::from_le_bytes([data[idx * 2], data[idx * 2 + 1]]);
        write_word(dev, idx, word);
    }

    program_enable(dev, false);
    Ok(())
}
