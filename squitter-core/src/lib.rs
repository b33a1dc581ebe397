//! squitter-core: Mode S extended squitter decoding and WGS84 positions.
//!
//! No async, no I/O — just field extraction and geodesy. Replies are parsed
//! from hex, routed by downlink format, and DF17/18 frames are decoded into
//! capability, format type code and the 56-bit ME field. `Position` carries
//! the result of CPR decoding and offers great-circle and 3D distances.

pub mod crc;
pub mod position;
pub mod reply;
pub mod squitter;
pub mod types;

// Re-export commonly used types at crate root
pub use position::Position;
pub use reply::{DecodedReply, ModeSReply, Reply};
pub use squitter::ExtendedSquitter;
pub use types::*;
