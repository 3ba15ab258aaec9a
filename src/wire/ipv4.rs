use core::fmt;
use core::net::Ipv4Addr;

use byteorder::{ByteOrder, NetworkEndian};
use log::debug;

use super::checksum;
use super::ip::Protocol;
use super::{Error, Result};

mod field {
    use crate::wire::field::*;

    pub const VER_IHL: usize = 0;
    pub const DSCP_ECN: usize = 1;
    pub const LENGTH: Field = 2..4;
    pub const IDENT: Field = 4..6;
    pub const FLG_OFF: Field = 6..8;
    pub const TTL: usize = 8;
    pub const PROTOCOL: usize = 9;
    pub const CHECKSUM: Field = 10..12;
    pub const SRC_ADDR: Field = 12..16;
    pub const DST_ADDR: Field = 16..20;
    pub const PAYLOAD: Rest = 20..;
}

/// Length of a header without options, the only shape this model supports.
pub const HEADER_LEN: usize = field::PAYLOAD.start;

/// The number of 16-bit words the header checksum covers.
const HEADER_WORDS: usize = HEADER_LEN / 2;

/// An IPv4 packet as a plain value: a fixed 20-byte header (no options)
/// unpacked field by field, plus an opaque payload.
///
/// Every field is stored at host width but constrained to its declared wire
/// width; setters on the sub-byte fields reject out-of-range values instead
/// of truncating. Serialization never mutates the packet, and the checksum
/// field is only computed on explicit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    version: u8,
    header_len: u8,
    dscp: u8,
    ecn: u8,
    total_len: u16,
    identification: u16,
    flags: u8,
    fragment_offset: u16,
    time_to_live: u8,
    protocol: u8,
    header_checksum: u16,
    src_addr: Ipv4Addr,
    dst_addr: Ipv4Addr,
    payload: Vec<u8>,
}

impl Default for Packet {
    fn default() -> Packet {
        Packet {
            version: 4,
            header_len: 5,
            dscp: 0,
            ecn: 0,
            total_len: HEADER_LEN as u16,
            identification: 0,
            flags: 0,
            fragment_offset: 0,
            time_to_live: 0,
            protocol: 0,
            header_checksum: 0,
            src_addr: Ipv4Addr::UNSPECIFIED,
            dst_addr: Ipv4Addr::UNSPECIFIED,
            payload: Vec::new(),
        }
    }
}

fn check_width(field: &'static str, value: u64, width: u32) -> Result<()> {
    if value >> width == 0 {
        Ok(())
    } else {
        Err(Error::FieldRange {
            field,
            value,
            width,
        })
    }
}

impl Packet {
    /// An empty packet: version 4, header length 5 words, every other field
    /// zero, no payload.
    pub fn new() -> Packet {
        Packet::default()
    }

    /// Decode a packet from its wire representation.
    ///
    /// The first 20 bytes are the header, network bit and byte order; any
    /// remaining bytes become the payload verbatim. The stored total length
    /// word is kept as read and is not used to bound the payload.
    pub fn parse(data: &[u8]) -> Result<Packet> {
        if data.len() < HEADER_LEN {
            debug!("rejecting truncated ipv4 packet: {} bytes", data.len());
            return Err(Error::Truncated { len: data.len() });
        }
        let ver_ihl = data[field::VER_IHL];
        let dscp_ecn = data[field::DSCP_ECN];
        let flg_off = NetworkEndian::read_u16(&data[field::FLG_OFF]);
        Ok(Packet {
            version: ver_ihl >> 4,
            header_len: ver_ihl & 0x0f,
            dscp: dscp_ecn >> 2,
            ecn: dscp_ecn & 0x03,
            total_len: NetworkEndian::read_u16(&data[field::LENGTH]),
            identification: NetworkEndian::read_u16(&data[field::IDENT]),
            flags: (flg_off >> 13) as u8,
            fragment_offset: flg_off & 0x1fff,
            time_to_live: data[field::TTL],
            protocol: data[field::PROTOCOL],
            header_checksum: NetworkEndian::read_u16(&data[field::CHECKSUM]),
            src_addr: Ipv4Addr::from(NetworkEndian::read_u32(&data[field::SRC_ADDR])),
            dst_addr: Ipv4Addr::from(NetworkEndian::read_u32(&data[field::DST_ADDR])),
            payload: data[field::PAYLOAD].to_vec(),
        })
    }

    /// Encode the packet into its wire representation: the 20-byte header
    /// followed by the payload. The checksum field is written exactly as
    /// stored; generating it is a separate explicit call.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN + self.payload.len()];
        self.emit_header(&mut data, self.header_checksum);
        data[field::PAYLOAD].copy_from_slice(&self.payload);
        data
    }

    fn emit_header(&self, data: &mut [u8], header_checksum: u16) {
        data[field::VER_IHL] = self.version << 4 | self.header_len;
        data[field::DSCP_ECN] = self.dscp << 2 | self.ecn;
        NetworkEndian::write_u16(&mut data[field::LENGTH], self.total_len);
        NetworkEndian::write_u16(&mut data[field::IDENT], self.identification);
        NetworkEndian::write_u16(
            &mut data[field::FLG_OFF],
            u16::from(self.flags) << 13 | self.fragment_offset,
        );
        data[field::TTL] = self.time_to_live;
        data[field::PROTOCOL] = self.protocol;
        NetworkEndian::write_u16(&mut data[field::CHECKSUM], header_checksum);
        NetworkEndian::write_u32(&mut data[field::SRC_ADDR], u32::from(self.src_addr));
        NetworkEndian::write_u32(&mut data[field::DST_ADDR], u32::from(self.dst_addr));
    }

    fn header_words(&self, header_checksum: u16) -> [u16; HEADER_WORDS] {
        let mut header = [0u8; HEADER_LEN];
        self.emit_header(&mut header, header_checksum);
        let mut words = [0u16; HEADER_WORDS];
        NetworkEndian::read_u16_into(&header, &mut words);
        words
    }

    /// The checksum value for the header as currently set: the header is
    /// emitted with the checksum word zeroed and folded one word at a time.
    /// The stored checksum field is left untouched.
    pub fn generate_header_checksum(&self) -> u16 {
        checksum::compute(self.header_words(0))
    }

    /// Fold the header exactly as stored, checksum field included.
    pub fn verify_checksum(&self) -> bool {
        let ok = checksum::verify(self.header_words(self.header_checksum));
        if !ok {
            debug!(
                "ipv4 header checksum mismatch: stored {:#06x}, expected {:#06x}",
                self.header_checksum,
                self.generate_header_checksum()
            );
        }
        ok
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn set_version(&mut self, value: u8) -> Result<()> {
        check_width("version", value.into(), 4)?;
        self.version = value;
        Ok(())
    }

    /// Header length in 32-bit words. Always 5 for the optionless headers
    /// this model produces; kept as a field so parsed values survive.
    pub fn header_len(&self) -> u8 {
        self.header_len
    }

    pub fn set_header_len(&mut self, value: u8) -> Result<()> {
        check_width("header_length", value.into(), 4)?;
        self.header_len = value;
        Ok(())
    }

    pub fn dscp(&self) -> u8 {
        self.dscp
    }

    pub fn set_dscp(&mut self, value: u8) -> Result<()> {
        check_width("dscp", value.into(), 6)?;
        self.dscp = value;
        Ok(())
    }

    pub fn ecn(&self) -> u8 {
        self.ecn
    }

    pub fn set_ecn(&mut self, value: u8) -> Result<()> {
        check_width("ecn", value.into(), 2)?;
        self.ecn = value;
        Ok(())
    }

    /// The total length word as it will appear on the wire. [`set_payload`]
    /// keeps it at `20 + payload length`; parsing preserves whatever the
    /// wire said, which is what the checksum must be computed over.
    ///
    /// [`set_payload`]: #method.set_payload
    pub fn total_len(&self) -> u16 {
        self.total_len
    }

    pub fn identification(&self) -> u16 {
        self.identification
    }

    pub fn set_identification(&mut self, value: u16) {
        self.identification = value;
    }

    /// The raw 3-bit flags field. Bit 2 is reserved, bit 1 is DF, bit 0 is
    /// MF. No semantic validation happens here; see the typed facade.
    pub fn flags(&self) -> u8 {
        self.flags
    }

    pub fn set_flags(&mut self, value: u8) -> Result<()> {
        check_width("flags", value.into(), 3)?;
        self.flags = value;
        Ok(())
    }

    /// Fragment offset in 8-octet units.
    pub fn fragment_offset(&self) -> u16 {
        self.fragment_offset
    }

    pub fn set_fragment_offset(&mut self, value: u16) -> Result<()> {
        check_width("fragment_offset", value.into(), 13)?;
        self.fragment_offset = value;
        Ok(())
    }

    pub fn time_to_live(&self) -> u8 {
        self.time_to_live
    }

    pub fn set_time_to_live(&mut self, value: u8) {
        self.time_to_live = value;
    }

    /// The raw IANA protocol number.
    pub fn protocol(&self) -> u8 {
        self.protocol
    }

    pub fn set_protocol(&mut self, value: u8) {
        self.protocol = value;
    }

    pub fn header_checksum(&self) -> u16 {
        self.header_checksum
    }

    pub fn set_header_checksum(&mut self, value: u16) {
        self.header_checksum = value;
    }

    pub fn src_addr(&self) -> Ipv4Addr {
        self.src_addr
    }

    pub fn set_src_addr(&mut self, addr: Ipv4Addr) {
        self.src_addr = addr;
    }

    pub fn dst_addr(&self) -> Ipv4Addr {
        self.dst_addr
    }

    pub fn set_dst_addr(&mut self, addr: Ipv4Addr) {
        self.dst_addr = addr;
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Replace the payload and refresh the total length word to match.
    /// Rejects payloads that would push the total length past 16 bits.
    pub fn set_payload(&mut self, payload: Vec<u8>) -> Result<()> {
        let total_len = HEADER_LEN as u64 + payload.len() as u64;
        check_width("total_length", total_len, 16)?;
        self.total_len = total_len as u16;
        self.payload = payload;
        Ok(())
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "IPv4 {} -> {} proto={} ttl={} len={}",
            self.src_addr,
            self.dst_addr,
            Protocol::from(self.protocol),
            self.time_to_live,
            self.total_len,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The worked example from the Wikipedia "IPv4 header checksum" article:
    // 192.168.0.1 -> 192.168.0.199, UDP, checksum 0xb861.
    static EXAMPLE_HEADER: [u8; 20] = [
        0x45, 0x00, 0x00, 0x73, 0x00, 0x00, 0x40, 0x00, 0x40, 0x11, 0xb8, 0x61, 0xc0, 0xa8, 0x00,
        0x01, 0xc0, 0xa8, 0x00, 0xc7,
    ];

    static EXAMPLE_PAYLOAD: [u8; 12] = [
        0x00, 0x35, 0xe9, 0x7c, 0x00, 0x5f, 0x27, 0x9f, 0x1e, 0x4b, 0x81, 0x80,
    ];

    fn example_packet() -> Packet {
        let mut data = EXAMPLE_HEADER.to_vec();
        data.extend_from_slice(&EXAMPLE_PAYLOAD);
        Packet::parse(&data).unwrap()
    }

    // A different value in every mutable field.
    fn saturated_packet() -> Packet {
        let mut p = Packet::new();
        p.set_dscp(1).unwrap();
        p.set_ecn(2).unwrap();
        p.set_identification(3);
        p.set_flags(0b100).unwrap();
        p.set_fragment_offset(5).unwrap();
        p.set_time_to_live(6);
        p.set_protocol(7);
        p.set_header_checksum(8);
        p.set_src_addr(Ipv4Addr::new(0, 0, 0, 9));
        p.set_dst_addr(Ipv4Addr::new(0, 0, 0, 10));
        p.set_payload(vec![3, 1, 4, 2, 5, 7, 3, 5, 2]).unwrap();
        p
    }

    #[test]
    fn empty_packet_serializes_to_header_only() {
        assert_eq!(Packet::new().to_bytes().len(), HEADER_LEN);
    }

    #[test]
    fn value_equality() {
        let p1 = saturated_packet();
        let mut p2 = saturated_packet();
        assert_eq!(p1, p2);

        p2.set_protocol(0);
        assert_ne!(p1, p2);

        p2.set_protocol(p1.protocol());
        p2.set_payload(vec![5, 3, 1, 6, 7, 5, 9, 2, 6]).unwrap();
        assert_ne!(p1, p2);
    }

    #[test]
    fn round_trip_default_packet() {
        let p = Packet::new();
        assert_eq!(Packet::parse(&p.to_bytes()).unwrap(), p);
    }

    #[test]
    fn round_trip_saturated_packet() {
        let p = saturated_packet();
        assert_eq!(Packet::parse(&p.to_bytes()).unwrap(), p);
    }

    #[test]
    fn parse_decodes_example_fields() {
        let p = example_packet();
        assert_eq!(p.version(), 4);
        assert_eq!(p.header_len(), 5);
        assert_eq!(p.total_len(), 0x73);
        assert_eq!(p.flags(), 0b010);
        assert_eq!(p.fragment_offset(), 0);
        assert_eq!(p.time_to_live(), 64);
        assert_eq!(p.protocol(), 0x11);
        assert_eq!(p.header_checksum(), 0xb861);
        assert_eq!(p.src_addr(), Ipv4Addr::new(192, 168, 0, 1));
        assert_eq!(p.dst_addr(), Ipv4Addr::new(192, 168, 0, 199));
        assert_eq!(p.payload(), &EXAMPLE_PAYLOAD);
    }

    #[test]
    fn parse_rejects_short_input() {
        assert_eq!(
            Packet::parse(&EXAMPLE_HEADER[..19]),
            Err(Error::Truncated { len: 19 })
        );
        assert_eq!(Packet::parse(&[]), Err(Error::Truncated { len: 0 }));
    }

    #[test]
    fn generate_header_checksum_matches_example() {
        let p = example_packet();
        assert_eq!(p.generate_header_checksum(), 0xb861);
    }

    #[test]
    fn checksum_changes_with_any_field() {
        let mut p = example_packet();
        let before = p.generate_header_checksum();
        p.set_version(6).unwrap();
        assert_ne!(p.generate_header_checksum(), before);
    }

    #[test]
    fn verify_checksum_example() {
        let mut p = example_packet();
        assert!(p.verify_checksum());

        p.set_version(5).unwrap();
        assert!(!p.verify_checksum());
    }

    #[test]
    fn generate_does_not_mutate_stored_checksum() {
        let mut p = example_packet();
        p.set_header_checksum(0x0079);
        assert_eq!(p.generate_header_checksum(), 0xb861);
        assert_eq!(p.header_checksum(), 0x0079);
    }

    #[test]
    fn setters_enforce_field_widths() {
        let mut p = Packet::new();
        assert_eq!(
            p.set_version(16),
            Err(Error::FieldRange {
                field: "version",
                value: 16,
                width: 4
            })
        );
        assert!(p.set_dscp(64).is_err());
        assert!(p.set_ecn(4).is_err());
        assert!(p.set_flags(8).is_err());
        assert!(p.set_fragment_offset(8192).is_err());
        assert!(p.set_header_len(16).is_err());
    }

    #[test]
    fn failed_setter_leaves_packet_unchanged() {
        let mut p = saturated_packet();
        let before = p.clone();
        assert!(p.set_dscp(64).is_err());
        assert!(p.set_flags(8).is_err());
        assert_eq!(p, before);
    }

    #[test]
    fn set_payload_tracks_total_length() {
        let mut p = Packet::new();
        assert_eq!(p.total_len(), 20);
        p.set_payload(vec![0; 9]).unwrap();
        assert_eq!(p.total_len(), 29);
        assert!(p.set_payload(vec![0; 0x10000]).is_err());
        assert_eq!(p.total_len(), 29);
    }

    #[test]
    fn display_summarizes_header() {
        let p = example_packet();
        assert_eq!(
            p.to_string(),
            "IPv4 192.168.0.1 -> 192.168.0.199 proto=UDP ttl=64 len=115"
        );
    }
}
