//! Shared types, error enum, downlink format table and hex helpers.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// All errors produced by squitter-core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SquitterError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    #[error("invalid frame length: expected {expected} bits, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("downlink format {0} is not an extended squitter (expected 17 or 18)")]
    NotExtendedSquitter(u8),
    #[error("position has no usable {0}")]
    MissingCoordinate(Coordinate),
}

pub type Result<T> = std::result::Result<T, SquitterError>;

/// Names one field of a [`Position`](crate::Position).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coordinate {
    Longitude,
    Latitude,
    Altitude,
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coordinate::Longitude => write!(f, "longitude"),
            Coordinate::Latitude => write!(f, "latitude"),
            Coordinate::Altitude => write!(f, "altitude"),
        }
    }
}

// ---------------------------------------------------------------------------
// Downlink Format metadata
// ---------------------------------------------------------------------------

/// Short (56-bit) Mode S frame length.
pub const SHORT_FRAME_BITS: usize = 56;

/// Long (112-bit) Mode S frame length.
pub const LONG_FRAME_BITS: usize = 112;

/// Metadata for a Downlink Format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DfInfo {
    pub name: &'static str,
    pub bits: usize,
}

/// Known Downlink Format table.
pub const DF_TABLE: &[(u8, DfInfo)] = &[
    (
        0,
        DfInfo {
            name: "Short air-air surveillance",
            bits: SHORT_FRAME_BITS,
        },
    ),
    (
        4,
        DfInfo {
            name: "Surveillance altitude reply",
            bits: SHORT_FRAME_BITS,
        },
    ),
    (
        5,
        DfInfo {
            name: "Surveillance identity reply",
            bits: SHORT_FRAME_BITS,
        },
    ),
    (
        11,
        DfInfo {
            name: "All-call reply",
            bits: SHORT_FRAME_BITS,
        },
    ),
    (
        16,
        DfInfo {
            name: "Long air-air surveillance",
            bits: LONG_FRAME_BITS,
        },
    ),
    (
        17,
        DfInfo {
            name: "ADS-B extended squitter",
            bits: LONG_FRAME_BITS,
        },
    ),
    (
        18,
        DfInfo {
            name: "TIS-B / ADS-R",
            bits: LONG_FRAME_BITS,
        },
    ),
    (
        19,
        DfInfo {
            name: "Military extended squitter",
            bits: LONG_FRAME_BITS,
        },
    ),
    (
        20,
        DfInfo {
            name: "Comm-B altitude reply",
            bits: LONG_FRAME_BITS,
        },
    ),
    (
        21,
        DfInfo {
            name: "Comm-B identity reply",
            bits: LONG_FRAME_BITS,
        },
    ),
    (
        24,
        DfInfo {
            name: "Comm-D extended length message",
            bits: LONG_FRAME_BITS,
        },
    ),
];

/// Look up DF metadata. Returns `None` for unrecognized DFs.
pub fn df_info(df: u8) -> Option<&'static DfInfo> {
    DF_TABLE
        .iter()
        .find(|(d, _)| *d == df)
        .map(|(_, info)| info)
}

/// Expected frame length in bits for a downlink format.
///
/// Unlisted formats follow the Annex 10 rule: DF 0-15 are short, 16-31 long.
pub fn expected_bits(df: u8) -> usize {
    match df_info(df) {
        Some(info) => info.bits,
        None if df < 16 => SHORT_FRAME_BITS,
        None => LONG_FRAME_BITS,
    }
}

/// True for the two downlink formats that carry an ME field.
pub fn is_extended_squitter_df(df: u8) -> bool {
    df == 17 || df == 18
}

// ---------------------------------------------------------------------------
// ICAO address helpers
// ---------------------------------------------------------------------------

/// 3-byte ICAO address.
pub type Icao = [u8; 3];

/// Format ICAO address as 6-char uppercase hex string.
pub fn icao_to_string(icao: &Icao) -> String {
    format!("{:02X}{:02X}{:02X}", icao[0], icao[1], icao[2])
}

/// Parse a 6-char hex string into an ICAO address.
pub fn icao_from_hex(hex: &str) -> Option<Icao> {
    if hex.len() != 6 {
        return None;
    }
    let val = u32::from_str_radix(hex, 16).ok()?;
    Some([
        ((val >> 16) & 0xFF) as u8,
        ((val >> 8) & 0xFF) as u8,
        (val & 0xFF) as u8,
    ])
}

// ---------------------------------------------------------------------------
// Hex utilities
// ---------------------------------------------------------------------------

/// Decode a hex string into bytes. Case-insensitive, must be even length.
pub fn hex_decode(hex: &str) -> Result<Vec<u8>> {
    let hex = hex.trim();
    if !hex.len().is_multiple_of(2) {
        return Err(SquitterError::InvalidHex(hex.to_string()));
    }
    let mut bytes = Vec::with_capacity(hex.len() / 2);
    for chunk in hex.as_bytes().chunks(2) {
        match (hex_digit(chunk[0]), hex_digit(chunk[1])) {
            (Some(high), Some(low)) => bytes.push((high << 4) | low),
            _ => return Err(SquitterError::InvalidHex(hex.to_string())),
        }
    }
    Ok(bytes)
}

/// Encode bytes as uppercase hex string.
pub fn hex_encode(data: &[u8]) -> String {
    let mut s = String::with_capacity(data.len() * 2);
    for &b in data {
        s.push(HEX_CHARS[(b >> 4) as usize] as char);
        s.push(HEX_CHARS[(b & 0x0F) as usize] as char);
    }
    s
}

const HEX_CHARS: &[u8; 16] = b"0123456789ABCDEF";

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
