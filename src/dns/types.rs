//! Core DNS type definitions: record types, classes, opcodes, rcodes.

use std::fmt;

/// DNS record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// IPv4 address record
    A,
    /// Name server record
    NS,
    /// Canonical name record
    CNAME,
    /// Start of authority record
    SOA,
    /// Pointer record
    PTR,
    /// Mail exchange record
    MX,
    /// Text record
    TXT,
    /// IPv6 address record
    AAAA,
    /// OPT pseudo-record for EDNS(0) (RFC 6891)
    OPT,
    /// Query-only pseudo-type matching any record (RFC 8482 discourages it,
    /// but clients still send it)
    ANY,
    /// Any type this server does not model
    Unknown(u16),
}

impl RecordType {
    pub fn from_u16(value: u16) -> Self {
        match value {
            1 => RecordType::A,
            2 => RecordType::NS,
            5 => RecordType::CNAME,
            6 => RecordType::SOA,
            12 => RecordType::PTR,
            15 => RecordType::MX,
            16 => RecordType::TXT,
            28 => RecordType::AAAA,
            41 => RecordType::OPT,
            255 => RecordType::ANY,
            _ => RecordType::Unknown(value),
        }
    }

    pub fn to_u16(self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::NS => 2,
            RecordType::CNAME => 5,
            RecordType::SOA => 6,
            RecordType::PTR => 12,
            RecordType::MX => 15,
            RecordType::TXT => 16,
            RecordType::AAAA => 28,
            RecordType::OPT => 41,
            RecordType::ANY => 255,
            RecordType::Unknown(v) => v,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::A => write!(f, "A"),
            RecordType::NS => write!(f, "NS"),
            RecordType::CNAME => write!(f, "CNAME"),
            RecordType::SOA => write!(f, "SOA"),
            RecordType::PTR => write!(f, "PTR"),
            RecordType::MX => write!(f, "MX"),
            RecordType::TXT => write!(f, "TXT"),
            RecordType::AAAA => write!(f, "AAAA"),
            RecordType::OPT => write!(f, "OPT"),
            RecordType::ANY => write!(f, "ANY"),
            RecordType::Unknown(v) => write!(f, "TYPE{}", v),
        }
    }
}

/// DNS record class (almost always IN)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordClass {
    /// Internet class
    IN,
    /// Chaos class
    CH,
    /// Unknown or unsupported class
    Unknown(u16),
}

impl RecordClass {
    pub fn from_u16(value: u16) -> Self {
        match value {
            1 => RecordClass::IN,
            3 => RecordClass::CH,
            _ => RecordClass::Unknown(value),
        }
    }

    pub fn to_u16(self) -> u16 {
        match self {
            RecordClass::IN => 1,
            RecordClass::CH => 3,
            RecordClass::Unknown(v) => v,
        }
    }
}

impl fmt::Display for RecordClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordClass::IN => write!(f, "IN"),
            RecordClass::CH => write!(f, "CH"),
            RecordClass::Unknown(v) => write!(f, "CLASS{}", v),
        }
    }
}

/// DNS operation code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    /// Standard query
    Query,
    /// Server status request
    Status,
    /// Notify
    Notify,
    /// Update
    Update,
    /// Unknown operation code
    Unknown(u8),
}

impl OpCode {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => OpCode::Query,
            2 => OpCode::Status,
            4 => OpCode::Notify,
            5 => OpCode::Update,
            _ => OpCode::Unknown(value),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            OpCode::Query => 0,
            OpCode::Status => 2,
            OpCode::Notify => 4,
            OpCode::Update => 5,
            OpCode::Unknown(v) => v,
        }
    }
}

/// DNS response code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
    /// No error
    NoError,
    /// Format error
    FormErr,
    /// Server failure
    ServFail,
    /// Non-existent domain
    NXDomain,
    /// Not implemented
    NotImp,
    /// Query refused
    Refused,
    /// Unknown response code
    Unknown(u8),
}

impl ResponseCode {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => ResponseCode::NoError,
            1 => ResponseCode::FormErr,
            2 => ResponseCode::ServFail,
            3 => ResponseCode::NXDomain,
            4 => ResponseCode::NotImp,
            5 => ResponseCode::Refused,
            _ => ResponseCode::Unknown(value),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            ResponseCode::NoError => 0,
            ResponseCode::FormErr => 1,
            ResponseCode::ServFail => 2,
            ResponseCode::NXDomain => 3,
            ResponseCode::NotImp => 4,
            ResponseCode::Refused => 5,
            ResponseCode::Unknown(v) => v,
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseCode::NoError => write!(f, "NOERROR"),
            ResponseCode::FormErr => write!(f, "FORMERR"),
            ResponseCode::ServFail => write!(f, "SERVFAIL"),
            ResponseCode::NXDomain => write!(f, "NXDOMAIN"),
            ResponseCode::NotImp => write!(f, "NOTIMP"),
            ResponseCode::Refused => write!(f, "REFUSED"),
            ResponseCode::Unknown(v) => write!(f, "RCODE{}", v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_type_conversions() {
        assert_eq!(RecordType::from_u16(1), RecordType::A);
        assert_eq!(RecordType::from_u16(5), RecordType::CNAME);
        assert_eq!(RecordType::from_u16(28), RecordType::AAAA);
        assert_eq!(RecordType::from_u16(255), RecordType::ANY);
        assert_eq!(RecordType::ANY.to_u16(), 255);

        let unknown = RecordType::from_u16(64);
        assert_eq!(unknown, RecordType::Unknown(64));
        assert_eq!(unknown.to_u16(), 64);
    }

    #[test]
    fn record_class_conversions() {
        assert_eq!(RecordClass::from_u16(1), RecordClass::IN);
        assert_eq!(RecordClass::IN.to_u16(), 1);
        assert_eq!(RecordClass::from_u16(254), RecordClass::Unknown(254));
    }

    #[test]
    fn opcode_conversions() {
        assert_eq!(OpCode::from_u8(0), OpCode::Query);
        assert_eq!(OpCode::Update.to_u8(), 5);
        assert_eq!(OpCode::from_u8(9), OpCode::Unknown(9));
    }

    #[test]
    fn response_code_conversions() {
        assert_eq!(ResponseCode::from_u8(3), ResponseCode::NXDomain);
        assert_eq!(ResponseCode::NXDomain.to_u8(), 3);
        assert_eq!(ResponseCode::ServFail.to_u8(), 2);
    }

    #[test]
    fn display_formats() {
        assert_eq!(RecordType::A.to_string(), "A");
        assert_eq!(RecordType::Unknown(999).to_string(), "TYPE999");
        assert_eq!(ResponseCode::NXDomain.to_string(), "NXDOMAIN");
        assert_eq!(RecordClass::IN.to_string(), "IN");
    }
}
