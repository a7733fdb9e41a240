//! Synthetic-image builders shared by the detection and calibration tests.
//! Tiny crafted buffers stand in for real BIOS dumps; no firmware images
//! ship with the repository.

use pad_types::{PadDescriptor, PadDirection, PadReset};

/// GPIO input on PLTRST: TX buffer disabled.
pub const GPI_DW0: u32 = 0x8000_0100;
/// GPIO output-high on PLTRST: RX buffer disabled, TX latch set.
pub const GPO_DW0: u32 = 0x8000_0201;
/// NF1 on PLTRST, both buffers enabled.
pub const NF1_PLTRST_DW0: u32 = 0x8000_0400;
/// NF1 on DEEP, both buffers enabled (the usual VGPIO shape).
pub const NF1_DEEP_DW0: u32 = 0x4000_0400;
/// GPIO with both buffers disabled: rejected by the validator.
pub const DEAD_GPIO_DW0: u32 = 0x8000_0300;

/// DW1 with the termination field set to NATIVE (0xF). Any 8-byte window
/// straddling two entries then reads a mode nibble of 0xF and is rejected,
/// which keeps the wrong-stride scans from hallucinating runs inside a
/// crafted table.
pub const SAFE_DW1: u32 = 0x0000_3C00;

pub fn put_pad(buf: &mut [u8], offset: usize, dw0: u32, dw1: u32) {
    buf[offset..offset + 4].copy_from_slice(&dw0.to_le_bytes());
    buf[offset + 4..offset + 8].copy_from_slice(&dw1.to_le_bytes());
}

/// Writes a physical pad table of 8-byte entries: the five signature pads
/// (GPIO + 4x NF1, all PLTRST) followed by alternating input/NF1 fillers.
pub fn synth_physical_table(buf: &mut [u8], offset: usize, count: usize) {
    for i in 0..count {
        let dw0 = match i {
            0 => GPI_DW0,
            1..=4 => NF1_PLTRST_DW0,
            _ if i % 2 == 0 => GPI_DW0,
            _ => NF1_PLTRST_DW0,
        };
        put_pad(buf, offset + i * 8, dw0, SAFE_DW1);
    }
}

/// Writes a VGPIO-style table: NF1/DEEP descriptors padded to `entry_size`.
pub fn synth_vgpio_table(buf: &mut [u8], offset: usize, count: usize, entry_size: usize) {
    for i in 0..count {
        put_pad(buf, offset + i * entry_size, NF1_DEEP_DW0, SAFE_DW1);
        for pad_byte in 8..entry_size {
            buf[offset + i * entry_size + pad_byte] = 0;
        }
    }
}

/// Deterministic pseudo-random buffer (xorshift64*).
pub fn xorshift_buffer(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        state ^= state >> 12;
        state ^= state << 25;
        state ^= state >> 27;
        let word = state.wrapping_mul(0x2545_f491_4f6c_dd1d);
        for byte in word.to_le_bytes() {
            if out.len() < len {
                out.push(byte);
            }
        }
    }
    out
}

/// The (mode raw, reset, direction) triple a descriptor decodes to, as the
/// scoring stage sees it.
pub fn triple_of(descriptor: &PadDescriptor) -> (u8, PadReset, Option<PadDirection>) {
    let mode = descriptor.mode().expect("synthetic pads decode");
    let direction = match mode {
        pad_types::PadMode::Gpio => Some(descriptor.direction()),
        _ => None,
    };
    (mode.raw(), descriptor.reset(), direction)
}
