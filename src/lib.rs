//! Bit-exact model of the RFC 791 IPv4 header wire format.
//!
//! Three layers, leaf to root: the one's-complement checksum engine
//! ([`wire::checksum`]), the raw packet value with byte-level parse and
//! serialize ([`wire::ipv4`]), and a semantic facade with translated
//! protocol and flag views ([`packet`]). IPv4 options, IPv6, and transport
//! parsing are out of scope; the payload is carried opaquely.

#[macro_use]
mod macros;

pub mod packet;
pub mod wire;

pub use self::packet::{Flag, FlagsSpec, Ipv4Packet, ProtocolSpec};
pub use self::wire::{Error, Ipv4RawPacket, Protocol, Result};
