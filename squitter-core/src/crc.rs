//! CRC-24 parity for Mode S replies.
//!
//! ICAO standard polynomial: x^24 + x^23 + x^22 + ... + x^10 + x^3 + 1
//! Generator: 0xFFF409
//!
//! The last 24 bits of every reply are the parity field. For DF11/17/18 it is
//! the plain CRC, so an intact frame leaves remainder 0. For the surveillance
//! and Comm-B replies it is the CRC XOR'd with the ICAO address.

const GENERATOR: u32 = 0xFFF409;

/// Width of the parity field in bytes.
pub const PARITY_BYTES: usize = 3;

const fn build_crc_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u32) << 16;
        let mut bit = 0;
        while bit < 8 {
            if crc & 0x800000 != 0 {
                crc = (crc << 1) ^ GENERATOR;
            } else {
                crc <<= 1;
            }
            crc &= 0xFFFFFF;
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

static CRC_TABLE: [u32; 256] = build_crc_table();

/// CRC-24 polynomial division of the payload bytes (everything before the
/// parity field).
pub fn calc_parity(payload: &[u8]) -> u32 {
    let mut crc = 0u32;
    for &byte in payload {
        crc = ((crc << 8) ^ CRC_TABLE[((crc >> 16) ^ byte as u32) as usize & 0xFF]) & 0xFFFFFF;
    }
    crc
}

/// The transmitted 24-bit parity field (last 3 bytes of the frame).
pub fn parity(frame: &[u8]) -> u32 {
    frame
        .iter()
        .rev()
        .take(PARITY_BYTES)
        .rev()
        .fold(0u32, |acc, &b| (acc << 8) | b as u32)
}

/// Remainder of the whole frame: computed parity XOR transmitted parity.
///
/// - DF11/17/18: 0 when the frame is intact.
/// - DF0/4/5/16/20/21: the ICAO address of the transponder.
pub fn crc24(frame: &[u8]) -> u32 {
    if frame.len() <= PARITY_BYTES {
        return parity(frame);
    }
    let payload_len = frame.len() - PARITY_BYTES;
    calc_parity(&frame[..payload_len]) ^ parity(frame)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
