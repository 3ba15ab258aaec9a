//! Typed, validated views over the raw wire model.
//!
//! [`Ipv4Packet`] owns exactly one [`Ipv4RawPacket`] and layers translated
//! accessors for protocol and flags on top of it. Everything without semantic
//! translation is forwarded to the raw packet unchanged via the `forward!`
//! macro, so the facade carries no state of its own.

use core::fmt;
use core::net::Ipv4Addr;
use core::str::FromStr;
use std::collections::BTreeSet;

use crate::wire::{Error, Ipv4RawPacket, Protocol, Result};

/// The reserved high bit of the 3-bit flags field; never valid on the wire.
const FLAG_RESERVED: u8 = 0b100;

/// A named IPv4 control flag bit.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum Flag {
    /// "Don't Fragment", bit value 0b010.
    DontFragment,
    /// "More Fragments", bit value 0b001.
    MoreFragments,
}

impl Flag {
    pub const fn bit(&self) -> u8 {
        match self {
            Flag::DontFragment => 0b010,
            Flag::MoreFragments => 0b001,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Flag::DontFragment => "DF",
            Flag::MoreFragments => "MF",
        }
    }

    /// Translate a flag keyword; the only valid names are `"DF"` and `"MF"`.
    pub fn from_name(name: &str) -> Result<Flag> {
        match name {
            "DF" => Ok(Flag::DontFragment),
            "MF" => Ok(Flag::MoreFragments),
            _ => Err(Error::UnknownFlagName(name.to_owned())),
        }
    }
}

impl FromStr for Flag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Flag> {
        Flag::from_name(s)
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Input to [`Ipv4Packet::set_protocol`]: a raw IANA number or a keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolSpec {
    Number(u8),
    Name(String),
}

impl From<u8> for ProtocolSpec {
    fn from(number: u8) -> ProtocolSpec {
        ProtocolSpec::Number(number)
    }
}

impl From<&str> for ProtocolSpec {
    fn from(name: &str) -> ProtocolSpec {
        ProtocolSpec::Name(name.to_owned())
    }
}

impl From<String> for ProtocolSpec {
    fn from(name: String) -> ProtocolSpec {
        ProtocolSpec::Name(name)
    }
}

/// Input to [`Ipv4Packet::set_flags`]: a raw bitmask or a set of names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagsSpec {
    Raw(u16),
    Names(BTreeSet<Flag>),
}

impl From<u16> for FlagsSpec {
    fn from(mask: u16) -> FlagsSpec {
        FlagsSpec::Raw(mask)
    }
}

impl From<BTreeSet<Flag>> for FlagsSpec {
    fn from(names: BTreeSet<Flag>) -> FlagsSpec {
        FlagsSpec::Names(names)
    }
}

impl<const N: usize> From<[Flag; N]> for FlagsSpec {
    fn from(names: [Flag; N]) -> FlagsSpec {
        FlagsSpec::Names(names.into_iter().collect())
    }
}

impl FromIterator<Flag> for FlagsSpec {
    fn from_iter<I: IntoIterator<Item = Flag>>(iter: I) -> FlagsSpec {
        FlagsSpec::Names(iter.into_iter().collect())
    }
}

/// An IPv4 packet with semantic accessors.
///
/// The facade is the sole owner of its raw packet. `version` is read-only
/// here (fixed to 4 at construction by protocol convention; mutate the raw
/// packet directly if a malformed header is wanted on purpose), protocol and
/// flags are translated through their closed tables, and the remaining
/// fields pass straight through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ipv4Packet {
    raw: Ipv4RawPacket,
}

impl Ipv4Packet {
    pub fn new() -> Ipv4Packet {
        Ipv4Packet::default()
    }

    /// Wrap an already-built raw packet.
    pub fn from_raw(raw: Ipv4RawPacket) -> Ipv4Packet {
        Ipv4Packet { raw }
    }

    /// Decode from wire bytes; see [`Ipv4RawPacket::parse`].
    pub fn parse(data: &[u8]) -> Result<Ipv4Packet> {
        Ok(Ipv4Packet {
            raw: Ipv4RawPacket::parse(data)?,
        })
    }

    pub fn raw(&self) -> &Ipv4RawPacket {
        &self.raw
    }

    pub fn raw_mut(&mut self) -> &mut Ipv4RawPacket {
        &mut self.raw
    }

    pub fn into_raw(self) -> Ipv4RawPacket {
        self.raw
    }

    /// The protocol as its IANA keyword, or an error for numbers outside
    /// the translation table.
    pub fn protocol(&self) -> Result<&'static str> {
        let number = self.raw.protocol();
        Protocol::from(number)
            .name()
            .ok_or(Error::UnknownProtocolNumber(number))
    }

    /// Set the protocol from a number or a keyword; both must exist in the
    /// table.
    pub fn set_protocol<S: Into<ProtocolSpec>>(&mut self, spec: S) -> Result<()> {
        let number = match spec.into() {
            ProtocolSpec::Number(number) => match Protocol::from(number).name() {
                Some(_) => number,
                None => return Err(Error::UnknownProtocolNumber(number)),
            },
            ProtocolSpec::Name(name) => match Protocol::from_name(&name) {
                Some(protocol) => protocol.into(),
                None => return Err(Error::UnknownProtocolName(name)),
            },
        };
        self.raw.set_protocol(number);
        Ok(())
    }

    /// The set of flag names whose bits are set; empty for a zero field.
    /// A raw value with the reserved bit set is an error.
    pub fn flags(&self) -> Result<BTreeSet<Flag>> {
        let raw = self.raw.flags();
        if raw & FLAG_RESERVED != 0 {
            return Err(Error::InvalidRawFlags(raw));
        }
        Ok([Flag::DontFragment, Flag::MoreFragments]
            .into_iter()
            .filter(|flag| raw & flag.bit() != 0)
            .collect())
    }

    /// Set the flags from a raw bitmask (`0..=3`; the reserved bit is never
    /// accepted) or from a set of flag names.
    pub fn set_flags<S: Into<FlagsSpec>>(&mut self, spec: S) -> Result<()> {
        let mask = match spec.into() {
            FlagsSpec::Raw(mask) => {
                if mask & !0b011 != 0 {
                    return Err(Error::InvalidFlagsMask(mask));
                }
                mask as u8
            }
            FlagsSpec::Names(names) => names.iter().fold(0u8, |acc, flag| acc | flag.bit()),
        };
        self.raw.set_flags(mask)
    }

    forward! {
        to raw:
        /// Read-only: the version is fixed by construction and only tracks
        /// the raw packet.
        fn version(&self) -> u8;
        fn dscp(&self) -> u8;
        fn set_dscp(&mut self, value: u8) -> Result<()>;
        fn ecn(&self) -> u8;
        fn set_ecn(&mut self, value: u8) -> Result<()>;
        fn total_len(&self) -> u16;
        fn identification(&self) -> u16;
        fn set_identification(&mut self, value: u16);
        fn fragment_offset(&self) -> u16;
        fn set_fragment_offset(&mut self, value: u16) -> Result<()>;
        fn time_to_live(&self) -> u8;
        fn set_time_to_live(&mut self, value: u8);
        fn header_checksum(&self) -> u16;
        fn set_header_checksum(&mut self, value: u16);
        fn src_addr(&self) -> Ipv4Addr;
        fn set_src_addr(&mut self, addr: Ipv4Addr);
        fn dst_addr(&self) -> Ipv4Addr;
        fn set_dst_addr(&mut self, addr: Ipv4Addr);
        fn payload(&self) -> &[u8];
        fn set_payload(&mut self, payload: Vec<u8>) -> Result<()>;
        fn to_bytes(&self) -> Vec<u8>;
        fn generate_header_checksum(&self) -> u16;
        fn verify_checksum(&self) -> bool;
    }
}

impl From<Ipv4RawPacket> for Ipv4Packet {
    fn from(raw: Ipv4RawPacket) -> Ipv4Packet {
        Ipv4Packet::from_raw(raw)
    }
}

impl fmt::Display for Ipv4Packet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}
