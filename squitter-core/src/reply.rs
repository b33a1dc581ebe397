//! Parse raw hex strings into Mode S replies.
//!
//! Responsibilities:
//! - Classify Downlink Format (DF) from the first 5 bits
//! - Check the frame length against the DF (56 or 112 bits)
//! - Split the frame into payload and 24-bit parity field
//! - Route extended squitters (DF17/18) to their own type

use tracing::debug;

use crate::crc;
use crate::squitter::ExtendedSquitter;
use crate::types::{df_info, expected_bits, hex_decode, is_extended_squitter_df, Result, SquitterError};

/// Behavior shared by every reply type.
pub trait Reply {
    /// 5-bit Downlink Format code.
    fn downlink_format(&self) -> u8;

    /// Frame bytes without the trailing parity field.
    fn payload(&self) -> &[u8];

    /// Human-readable Downlink Format name.
    fn df_name(&self) -> &'static str {
        df_info(self.downlink_format())
            .map(|info| info.name)
            .unwrap_or("Unknown")
    }
}

// ---------------------------------------------------------------------------
// ModeSReply
// ---------------------------------------------------------------------------

/// A Mode S reply that has been length-checked but not interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModeSReply {
    downlink_format: u8,
    first_field: u8,
    payload: Vec<u8>,
    parity: u32,
}

impl ModeSReply {
    /// Parse a reply from its hex representation (14 or 28 hex digits).
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let raw = hex_decode(hex_str)?;
        Self::from_bytes(&raw)
    }

    /// Parse a reply from raw frame bytes, parity field included.
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        let Some(&first) = raw.first() else {
            return Err(SquitterError::InvalidLength {
                expected: expected_bits(0),
                actual: 0,
            });
        };

        let downlink_format = (first >> 3) & 0x1F;
        let expected = expected_bits(downlink_format);
        let actual = raw.len() * 8;
        if actual != expected {
            return Err(SquitterError::InvalidLength { expected, actual });
        }

        let payload_len = raw.len() - crc::PARITY_BYTES;
        Ok(ModeSReply {
            downlink_format,
            first_field: first & 0x07,
            payload: raw[..payload_len].to_vec(),
            parity: crc::parity(raw),
        })
    }

    /// The 3 bits following the DF (CA, FS or VS depending on the format).
    pub fn first_field(&self) -> u8 {
        self.first_field
    }

    /// Transmitted 24-bit parity field.
    pub fn parity(&self) -> u32 {
        self.parity
    }

    /// CRC-24 computed over the payload.
    pub fn calc_parity(&self) -> u32 {
        crc::calc_parity(&self.payload)
    }

    /// True if the transmitted parity equals the computed one.
    ///
    /// Only meaningful for DF11/17/18; the other formats overlay the
    /// address on the parity field.
    pub fn check_parity(&self) -> bool {
        self.calc_parity() == self.parity
    }

    /// True if this is a 112-bit (long) reply.
    pub fn is_long(&self) -> bool {
        self.payload.len() + crc::PARITY_BYTES == 14
    }
}

impl Reply for ModeSReply {
    fn downlink_format(&self) -> u8 {
        self.downlink_format
    }

    fn payload(&self) -> &[u8] {
        &self.payload
    }
}

// ---------------------------------------------------------------------------
// DecodedReply
// ---------------------------------------------------------------------------

/// A reply routed by downlink format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedReply {
    ExtendedSquitter(ExtendedSquitter),
    Other(ModeSReply),
}

impl DecodedReply {
    /// Parse and route a hex frame in one step.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        ModeSReply::from_hex(hex_str).map(DecodedReply::from)
    }

    pub fn as_extended_squitter(&self) -> Option<&ExtendedSquitter> {
        match self {
            DecodedReply::ExtendedSquitter(es) => Some(es),
            DecodedReply::Other(_) => None,
        }
    }
}

impl From<ModeSReply> for DecodedReply {
    fn from(reply: ModeSReply) -> Self {
        if !is_extended_squitter_df(reply.downlink_format) {
            return DecodedReply::Other(reply);
        }
        match ExtendedSquitter::try_from(&reply) {
            Ok(es) => DecodedReply::ExtendedSquitter(es),
            Err(e) => {
                debug!(df = reply.downlink_format, error = %e, "keeping reply undecoded");
                DecodedReply::Other(reply)
            }
        }
    }
}

impl Reply for DecodedReply {
    fn downlink_format(&self) -> u8 {
        match self {
            DecodedReply::ExtendedSquitter(es) => es.downlink_format(),
            DecodedReply::Other(reply) => reply.downlink_format(),
        }
    }

    fn payload(&self) -> &[u8] {
        match self {
            DecodedReply::ExtendedSquitter(es) => es.payload(),
            DecodedReply::Other(reply) => reply.payload(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::hex_encode;

    #[test]
    fn test_parse_df17() {
        let reply = ModeSReply::from_hex("8D4840D6202CC371C32CE0576098").unwrap();
        assert_eq!(reply.downlink_format(), 17);
        assert_eq!(reply.first_field(), 5);
        assert_eq!(reply.payload().len(), 11);
        assert_eq!(hex_encode(reply.payload()), "8D4840D6202CC371C32CE0");
        assert_eq!(reply.parity(), 0x576098);
        assert!(reply.check_parity());
        assert!(reply.is_long());
        assert_eq!(reply.df_name(), "ADS-B extended squitter");
    }

    #[test]
    fn test_parse_short_reply() {
        // DF11 all-call reply, 56 bits
        let reply = ModeSReply::from_hex("5D4840D6ABCDEF").unwrap();
        assert_eq!(reply.downlink_format(), 11);
        assert_eq!(reply.payload().len(), 4);
        assert!(!reply.is_long());
    }

    #[test]
    fn test_parse_invalid_length() {
        assert_eq!(
            ModeSReply::from_hex("8D4840D6"),
            Err(SquitterError::InvalidLength {
                expected: 112,
                actual: 32
            })
        );
        assert!(matches!(
            ModeSReply::from_hex(""),
            Err(SquitterError::InvalidLength { actual: 0, .. })
        ));
        // DF17 header on a short frame
        assert!(matches!(
            ModeSReply::from_hex("8D4840D6202CC3"),
            Err(SquitterError::InvalidLength { expected: 112, .. })
        ));
    }

    #[test]
    fn test_parse_invalid_hex() {
        assert!(matches!(
            ModeSReply::from_hex("ZZZZZZZZZZZZZZ"),
            Err(SquitterError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_corrupted_parity() {
        let mut raw = hex_decode("8D4840D6202CC371C32CE0576098").unwrap();
        raw[5] ^= 0x01;
        let reply = ModeSReply::from_bytes(&raw).unwrap();
        assert!(!reply.check_parity());
    }

    #[test]
    fn test_decoded_reply_routes_squitter() {
        let decoded = DecodedReply::from_hex("8D40621D58C382D690C8AC2863A7").unwrap();
        let es = decoded.as_extended_squitter().unwrap();
        assert_eq!(es.format_type_code(), 11);
        assert_eq!(decoded.downlink_format(), 17);
        assert_eq!(decoded.payload().len(), 11);
    }

    #[test]
    fn test_decoded_reply_routes_other() {
        // DF20 Comm-B altitude reply
        let decoded = DecodedReply::from_hex("A0001838CA3E51F0A8000047A0B2").unwrap();
        assert!(matches!(decoded, DecodedReply::Other(_)));
        assert!(decoded.as_extended_squitter().is_none());
        assert_eq!(decoded.downlink_format(), 20);
    }

    #[test]
    fn test_reply_trait_object() {
        let replies: Vec<Box<dyn Reply>> = vec![
            Box::new(ModeSReply::from_hex("5D4840D6ABCDEF").unwrap()),
            Box::new(DecodedReply::from_hex("8D4840D6202CC371C32CE0576098").unwrap()),
        ];
        let dfs: Vec<u8> = replies.iter().map(|r| r.downlink_format()).collect();
        assert_eq!(dfs, vec![11, 17]);
    }
}
