//! Raw wire formats: exact bit layouts, network byte order, checksums.

use core::fmt;

pub mod checksum;
mod ip;
pub mod ipv4;

pub use self::ip::Protocol;
pub use self::ipv4::Packet as Ipv4RawPacket;
pub use self::ipv4::HEADER_LEN as IPV4_HEADER_LEN;

mod field {
    pub type Field = ::core::ops::Range<usize>;
    pub type Rest = ::core::ops::RangeFrom<usize>;
}

/// Everything that can go wrong while decoding, mutating, or translating a
/// packet. Errors surface immediately at the point of violation; a failed
/// setter leaves the packet unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Input to `parse` is shorter than a full header.
    Truncated { len: usize },
    /// A field assignment does not fit the field's declared bit width.
    FieldRange {
        field: &'static str,
        value: u64,
        width: u32,
    },
    /// A protocol number outside the closed translation table.
    UnknownProtocolNumber(u8),
    /// A protocol keyword outside the closed translation table.
    UnknownProtocolName(String),
    /// A raw flags value with the reserved bit set.
    InvalidRawFlags(u8),
    /// A flags bitmask outside the valid range `0..=3`.
    InvalidFlagsMask(u16),
    /// A flag keyword that is neither `"DF"` nor `"MF"`.
    UnknownFlagName(String),
}

pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Truncated { len } => {
                write!(f, "buffer too short for an ipv4 header: {len} bytes")
            }
            Error::FieldRange {
                field,
                value,
                width,
            } => {
                write!(f, "value {value} does not fit {field} ({width} bits)")
            }
            Error::UnknownProtocolNumber(number) => {
                write!(f, "unrecognized protocol number {number}")
            }
            Error::UnknownProtocolName(name) => {
                write!(f, "unrecognized protocol name {name:?}")
            }
            Error::InvalidRawFlags(raw) => {
                write!(f, "invalid raw flags {raw:#05b}: reserved bit is set")
            }
            Error::InvalidFlagsMask(mask) => {
                write!(f, "invalid flags mask {mask}")
            }
            Error::UnknownFlagName(name) => {
                write!(f, "invalid flags: unrecognized name {name:?}")
            }
        }
    }
}

impl std::error::Error for Error {}
