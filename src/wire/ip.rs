use core::fmt;
use core::str::FromStr;

use super::Error;

enum_with_unknown! {
    /// IP datagram encapsulated protocol.
    pub enum Protocol(u8) {
        HopByHop  = 0x00,
        Icmp      = 0x01,
        Igmp      = 0x02,
        Tcp       = 0x06,
        Udp       = 0x11,
        Ipv6Route = 0x2b,
        Ipv6Frag  = 0x2c,
        IpSecEsp  = 0x32,
        IpSecAh   = 0x33,
        Icmpv6    = 0x3a,
        Ipv6NoNxt = 0x3b,
        Ipv6Opts  = 0x3c
    }
}

impl Protocol {
    /// The IANA keyword for this protocol, or `None` for numbers outside the
    /// table. The table is a closed set; there is no runtime registration.
    pub const fn name(&self) -> Option<&'static str> {
        match self {
            Protocol::HopByHop => Some("HOPOPT"),
            Protocol::Icmp => Some("ICMP"),
            Protocol::Igmp => Some("IGMP"),
            Protocol::Tcp => Some("TCP"),
            Protocol::Udp => Some("UDP"),
            Protocol::Ipv6Route => Some("IPv6-Route"),
            Protocol::Ipv6Frag => Some("IPv6-Frag"),
            Protocol::IpSecEsp => Some("ESP"),
            Protocol::IpSecAh => Some("AH"),
            Protocol::Icmpv6 => Some("IPv6-ICMP"),
            Protocol::Ipv6NoNxt => Some("IPv6-NoNxt"),
            Protocol::Ipv6Opts => Some("IPv6-Opts"),
            Protocol::Unknown(_) => None,
        }
    }

    /// Exact-match reverse lookup of an IANA keyword.
    pub fn from_name(name: &str) -> Option<Protocol> {
        match name {
            "HOPOPT" => Some(Protocol::HopByHop),
            "ICMP" => Some(Protocol::Icmp),
            "IGMP" => Some(Protocol::Igmp),
            "TCP" => Some(Protocol::Tcp),
            "UDP" => Some(Protocol::Udp),
            "IPv6-Route" => Some(Protocol::Ipv6Route),
            "IPv6-Frag" => Some(Protocol::Ipv6Frag),
            "ESP" => Some(Protocol::IpSecEsp),
            "AH" => Some(Protocol::IpSecAh),
            "IPv6-ICMP" => Some(Protocol::Icmpv6),
            "IPv6-NoNxt" => Some(Protocol::Ipv6NoNxt),
            "IPv6-Opts" => Some(Protocol::Ipv6Opts),
            _ => None,
        }
    }
}

/// Parses a keyword or a decimal number, for external text such as
/// configuration values. The result must land inside the table.
impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Protocol, Error> {
        if let Some(protocol) = Protocol::from_name(s) {
            return Ok(protocol);
        }
        match s.parse::<u8>() {
            Ok(number) => {
                let protocol = Protocol::from(number);
                if protocol.name().is_some() {
                    Ok(protocol)
                } else {
                    Err(Error::UnknownProtocolNumber(number))
                }
            }
            Err(_) => Err(Error::UnknownProtocolName(s.to_owned())),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "0x{:02x}", u8::from(*self)),
        }
    }
}
