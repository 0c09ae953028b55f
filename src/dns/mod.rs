//! DNS protocol facade
//!
//! Message, question, and resource record types plus wire format
//! conversion (RFC 1035). Wire parsing and serialization are backed by
//! hickory-proto; the rest of the crate only sees the types defined here.

pub mod message;
pub mod question;
pub mod rdata;
pub mod record;
pub mod types;
pub mod wire;

pub use message::Message;
pub use question::Question;
pub use rdata::RData;
pub use record::ResourceRecord;
pub use types::{OpCode, RecordClass, RecordType, ResponseCode};
pub use wire::{parse_message, serialize_message};
