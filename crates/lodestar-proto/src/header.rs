//! Fixed-size frame header.
//!
//! ```text
//! 0       4    5         8              12
//! | magic | ver | reserved | payload_len |
//! | "LDST"| u8  | [u8; 3]  | u32 BE      |
//! ```

use zerocopy::{
    FromBytes, Immutable, IntoBytes, KnownLayout,
    byteorder::{BigEndian, U32},
};

use crate::errors::{ProtocolError, Result};

/// Frame header preceding every CBOR payload.
///
/// The struct is the wire layout; every field is alignment 1, so there is no
/// padding and any 12 bytes can be viewed as a header before validation.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct FrameHeader {
    magic: U32<BigEndian>,
    version: u8,
    reserved: [u8; 3],
    payload_len: U32<BigEndian>,
}

const _: () = assert!(size_of::<FrameHeader>() == FrameHeader::SIZE);

impl FrameHeader {
    /// Encoded header size in bytes.
    pub const SIZE: usize = 12;

    /// Magic number identifying Lodestar frames (`"LDST"`).
    pub const MAGIC: u32 = 0x4C44_5354;

    /// Current frame format version.
    pub const VERSION: u8 = 1;

    /// Largest accepted payload (1 MiB).
    pub const MAX_PAYLOAD_SIZE: usize = 1 << 20;

    /// Header for a payload of `payload_len` bytes at the current version.
    pub fn new(payload_len: u32) -> Self {
        Self {
            magic: U32::new(Self::MAGIC),
            version: Self::VERSION,
            reserved: [0; 3],
            payload_len: U32::new(payload_len),
        }
    }

    /// Frame format version.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Length of the payload that follows the header.
    pub fn payload_len(&self) -> usize {
        self.payload_len.get() as usize
    }

    /// Serialize to the on-wire representation.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes.copy_from_slice(self.as_bytes());
        bytes
    }

    /// Parse and validate a header from the start of `bytes`.
    ///
    /// Validation order is magic, version, then length, so garbage input is
    /// rejected before a length is trusted.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (header, _) = Self::ref_from_prefix(bytes).map_err(|_| ProtocolError::Truncated {
            needed: Self::SIZE,
            available: bytes.len(),
        })?;

        let magic = header.magic.get();
        if magic != Self::MAGIC {
            return Err(ProtocolError::BadMagic { found: magic });
        }

        if header.version != Self::VERSION {
            return Err(ProtocolError::UnsupportedVersion { version: header.version });
        }

        if header.payload_len() > Self::MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::PayloadTooLarge {
                size: header.payload_len(),
                max: Self::MAX_PAYLOAD_SIZE,
            });
        }

        Ok(*header)
    }
}
