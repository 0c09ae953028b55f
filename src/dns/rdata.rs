//! Resource record data variants.
//!
//! Covers the record types this server answers locally (A, CNAME) and the
//! common types that flow through when relaying upstream responses. Record
//! types outside this set are dropped at the wire conversion boundary.

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Typed resource record data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RData {
    /// IPv4 address
    A(Ipv4Addr),
    /// IPv6 address
    AAAA(Ipv6Addr),
    /// Canonical name target (no trailing dot)
    CNAME(String),
    /// Delegated name server
    NS(String),
    /// Reverse-lookup pointer
    PTR(String),
    /// Text strings
    TXT(Vec<String>),
    /// Mail exchange
    MX {
        preference: u16,
        exchange: String,
    },
    /// Start of authority
    SOA {
        mname: String,
        rname: String,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    },
}

impl RData {
    /// Convenience constructor for A records
    pub fn a(addr: Ipv4Addr) -> Self {
        RData::A(addr)
    }

    /// Convenience constructor for CNAME records
    pub fn cname(target: impl Into<String>) -> Self {
        RData::CNAME(target.into())
    }
}

impl fmt::Display for RData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RData::A(addr) => write!(f, "{}", addr),
            RData::AAAA(addr) => write!(f, "{}", addr),
            RData::CNAME(target) => write!(f, "{}", target),
            RData::NS(name) => write!(f, "{}", name),
            RData::PTR(name) => write!(f, "{}", name),
            RData::TXT(texts) => write!(f, "\"{}\"", texts.join("\" \"")),
            RData::MX {
                preference,
                exchange,
            } => write!(f, "{} {}", preference, exchange),
            RData::SOA {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            } => write!(
                f,
                "{} {} {} {} {} {} {}",
                mname, rname, serial, refresh, retry, expire, minimum
            ),
        }
    }
}
