//! Mode S extended squitter (DF17/18) field extraction.
//!
//! Layout of the 88-bit payload (frame minus parity), per ICAO Annex 10:
//!
//! ```text
//! byte  0        1..=3     4..=10
//!       DF | CA  AA        ME (56 bits, first 5 bits = format type code)
//! ```

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::reply::{ModeSReply, Reply};
use crate::types::{hex_encode, is_extended_squitter_df, Icao, Result, SquitterError};

/// Length of the ME field in bytes.
pub const MESSAGE_BYTES: usize = 7;

/// Payload bytes needed to reach the end of the ME field.
const MIN_PAYLOAD_BYTES: usize = 4 + MESSAGE_BYTES;

/// A decoded extended squitter: capability, address and ME field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ExtendedSquitter {
    downlink_format: u8,
    capability: u8,
    address: Icao,
    format_type_code: u8,
    message: [u8; MESSAGE_BYTES],
    #[serde(skip)]
    payload: Vec<u8>,
}

impl ExtendedSquitter {
    /// Extract the squitter fields from a reply payload.
    ///
    /// Fails with [`SquitterError::NotExtendedSquitter`] unless the downlink
    /// format is 17 or 18, and with [`SquitterError::InvalidLength`] if the
    /// payload stops before the end of the ME field.
    pub fn decode(downlink_format: u8, payload: &[u8]) -> Result<Self> {
        if !is_extended_squitter_df(downlink_format) {
            debug!(downlink_format, "not an extended squitter");
            return Err(SquitterError::NotExtendedSquitter(downlink_format));
        }
        if payload.len() < MIN_PAYLOAD_BYTES {
            debug!(len = payload.len(), "extended squitter payload too short");
            return Err(SquitterError::InvalidLength {
                expected: MIN_PAYLOAD_BYTES * 8,
                actual: payload.len() * 8,
            });
        }

        let capability = payload[0] & 0b0000_0111;

        let mut message = [0u8; MESSAGE_BYTES];
        message.copy_from_slice(&payload[4..MIN_PAYLOAD_BYTES]);

        let format_type_code = (message[0] >> 3) & 0b0001_1111;

        Ok(ExtendedSquitter {
            downlink_format,
            capability,
            address: [payload[1], payload[2], payload[3]],
            format_type_code,
            message,
            payload: payload.to_vec(),
        })
    }

    /// Parse a hex frame and decode it as an extended squitter.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let reply = ModeSReply::from_hex(hex_str)?;
        Self::try_from(&reply)
    }

    /// Transponder capability (CA), 0-7.
    pub fn capability(&self) -> u8 {
        self.capability
    }

    /// ADS-B format type code, 0-31.
    pub fn format_type_code(&self) -> u8 {
        self.format_type_code
    }

    /// The 56-bit ME field.
    pub fn message(&self) -> &[u8; MESSAGE_BYTES] {
        &self.message
    }

    /// Announced address (AA field). For DF18 this may be a non-ICAO address.
    pub fn address(&self) -> Icao {
        self.address
    }
}

impl TryFrom<&ModeSReply> for ExtendedSquitter {
    type Error = SquitterError;

    fn try_from(reply: &ModeSReply) -> Result<Self> {
        ExtendedSquitter::decode(reply.downlink_format(), reply.payload())
    }
}

impl Reply for ExtendedSquitter {
    fn downlink_format(&self) -> u8 {
        self.downlink_format
    }

    fn payload(&self) -> &[u8] {
        &self.payload
    }
}

impl fmt::Display for ExtendedSquitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Extended squitter (DF{}):", self.downlink_format)?;
        writeln!(f, "  type code:   {}", self.format_type_code)?;
        writeln!(f, "  capability:  {}", self.capability)?;
        write!(f, "  ME:          {}", hex_encode(&self.message))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
