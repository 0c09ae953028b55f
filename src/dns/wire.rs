//! Wire format conversion (RFC 1035) backed by hickory-proto.
//!
//! The rest of the crate works with the facade types from this module's
//! siblings; conversion to and from hickory-proto happens only here.
//! Record types without an `RData` variant are dropped during conversion.

use crate::dns::{Message, Question, RData, RecordClass, RecordType, ResourceRecord};
use crate::{Error, Result};
use hickory_proto::serialize::binary::BinEncodable;

/// Parse a DNS message from wire format bytes.
pub fn parse_message(data: &[u8]) -> Result<Message> {
    use hickory_proto::op::Message as ProtoMessage;
    use hickory_proto::serialize::binary::BinDecodable;

    let proto_msg = ProtoMessage::from_bytes(data)
        .map_err(|e| Error::DnsProtocol(format!("failed to parse DNS message: {}", e)))?;

    convert_from_proto(proto_msg)
}

/// Serialize a DNS message to wire format bytes.
///
/// Names are compressed by the encoder, so the returned length is the
/// length that would go on the wire.
pub fn serialize_message(message: &Message) -> Result<Vec<u8>> {
    use hickory_proto::serialize::binary::BinEncoder;

    let proto_msg = convert_to_proto(message)?;

    let mut buffer = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buffer);
    proto_msg
        .emit(&mut encoder)
        .map_err(|e| Error::DnsProtocol(format!("failed to serialize DNS message: {}", e)))?;

    Ok(buffer)
}

/// Encoded wire length of a message, used for the UDP size bound.
pub fn encoded_len(message: &Message) -> Result<usize> {
    Ok(serialize_message(message)?.len())
}

fn convert_from_proto(proto_msg: hickory_proto::op::Message) -> Result<Message> {
    use hickory_proto::op::OpCode as ProtoOpCode;

    let mut message = Message::new();

    message.set_id(proto_msg.id());
    message.set_response(proto_msg.message_type() == hickory_proto::op::MessageType::Response);
    message.set_authoritative(proto_msg.authoritative());
    message.set_truncated(proto_msg.truncated());
    message.set_recursion_desired(proto_msg.recursion_desired());
    message.set_recursion_available(proto_msg.recursion_available());

    let opcode = match proto_msg.op_code() {
        ProtoOpCode::Query => crate::dns::OpCode::Query,
        ProtoOpCode::Status => crate::dns::OpCode::Status,
        ProtoOpCode::Notify => crate::dns::OpCode::Notify,
        ProtoOpCode::Update => crate::dns::OpCode::Update,
    };
    message.set_opcode(opcode);

    message.set_response_code(crate::dns::ResponseCode::from_u8(
        proto_msg.response_code().low(),
    ));

    for q in proto_msg.queries() {
        // Trailing dots are stripped on the way in so names compare equal
        // across the crate; lookups re-normalize as needed.
        let qname = q.name().to_utf8().trim_end_matches('.').to_string();
        let qtype = RecordType::from_u16(q.query_type().into());
        let qclass = RecordClass::from_u16(q.query_class().into());
        message.add_question(Question::new(qname, qtype, qclass));
    }

    for record in proto_msg.answers() {
        if let Some(rr) = convert_proto_record(record) {
            message.add_answer(rr);
        }
    }
    for record in proto_msg.name_servers() {
        if let Some(rr) = convert_proto_record(record) {
            message.add_authority(rr);
        }
    }
    for record in proto_msg.additionals() {
        if let Some(rr) = convert_proto_record(record) {
            message.add_additional(rr);
        }
    }

    Ok(message)
}

fn convert_proto_record(record: &hickory_proto::rr::Record) -> Option<ResourceRecord> {
    use hickory_proto::rr::RData as ProtoRData;

    let name = record.name().to_utf8().trim_end_matches('.').to_string();
    let rtype = RecordType::from_u16(record.record_type().into());
    let rclass = RecordClass::from_u16(record.dns_class().into());
    let ttl = record.ttl();

    let rdata = match record.data() {
        Some(ProtoRData::A(ipv4)) => RData::A(ipv4.0),
        Some(ProtoRData::AAAA(ipv6)) => RData::AAAA(ipv6.0),
        Some(ProtoRData::CNAME(target)) => {
            RData::CNAME(target.to_utf8().trim_end_matches('.').to_string())
        }
        Some(ProtoRData::NS(ns)) => RData::NS(ns.to_utf8().trim_end_matches('.').to_string()),
        Some(ProtoRData::PTR(ptr)) => RData::PTR(ptr.to_utf8().trim_end_matches('.').to_string()),
        Some(ProtoRData::TXT(txt)) => {
            let texts = txt
                .iter()
                .map(|bytes| String::from_utf8_lossy(bytes).to_string())
                .collect();
            RData::TXT(texts)
        }
        Some(ProtoRData::MX(mx)) => RData::MX {
            preference: mx.preference(),
            exchange: mx.exchange().to_utf8().trim_end_matches('.').to_string(),
        },
        Some(ProtoRData::SOA(soa)) => RData::SOA {
            mname: soa.mname().to_utf8().trim_end_matches('.').to_string(),
            rname: soa.rname().to_utf8().trim_end_matches('.').to_string(),
            serial: soa.serial(),
            refresh: soa.refresh() as u32,
            retry: soa.retry() as u32,
            expire: soa.expire() as u32,
            minimum: soa.minimum(),
        },
        _ => return None,
    };

    Some(ResourceRecord::new(name, rtype, rclass, ttl, rdata))
}

fn convert_to_proto(message: &Message) -> Result<hickory_proto::op::Message> {
    use hickory_proto::op::{Message as ProtoMessage, OpCode as ProtoOpCode, Query};
    use hickory_proto::rr::{Name, RecordType as ProtoRecordType};

    let mut proto_msg = ProtoMessage::new();

    proto_msg.set_id(message.id());
    proto_msg.set_message_type(if message.is_response() {
        hickory_proto::op::MessageType::Response
    } else {
        hickory_proto::op::MessageType::Query
    });
    proto_msg.set_authoritative(message.is_authoritative());
    proto_msg.set_truncated(message.is_truncated());
    proto_msg.set_recursion_desired(message.recursion_desired());
    proto_msg.set_recursion_available(message.recursion_available());

    let opcode = match message.opcode() {
        crate::dns::OpCode::Query => ProtoOpCode::Query,
        crate::dns::OpCode::Status => ProtoOpCode::Status,
        crate::dns::OpCode::Notify => ProtoOpCode::Notify,
        crate::dns::OpCode::Update => ProtoOpCode::Update,
        crate::dns::OpCode::Unknown(_) => ProtoOpCode::Query,
    };
    proto_msg.set_op_code(opcode);

    let rcode = match message.response_code() {
        crate::dns::ResponseCode::NoError => hickory_proto::op::ResponseCode::NoError,
        crate::dns::ResponseCode::FormErr => hickory_proto::op::ResponseCode::FormErr,
        crate::dns::ResponseCode::ServFail => hickory_proto::op::ResponseCode::ServFail,
        crate::dns::ResponseCode::NXDomain => hickory_proto::op::ResponseCode::NXDomain,
        crate::dns::ResponseCode::NotImp => hickory_proto::op::ResponseCode::NotImp,
        crate::dns::ResponseCode::Refused => hickory_proto::op::ResponseCode::Refused,
        crate::dns::ResponseCode::Unknown(_) => hickory_proto::op::ResponseCode::ServFail,
    };
    proto_msg.set_response_code(rcode);

    for q in message.questions() {
        let name = Name::from_utf8(q.qname())
            .map_err(|e| Error::DnsProtocol(format!("invalid domain name: {}", e)))?;
        let rtype: ProtoRecordType = q.qtype().to_u16().into();
        proto_msg.add_query(Query::query(name, rtype));
    }

    for rr in message.answers() {
        proto_msg.add_answer(convert_to_proto_record(rr)?);
    }
    for rr in message.authority() {
        proto_msg.add_name_server(convert_to_proto_record(rr)?);
    }
    for rr in message.additional() {
        proto_msg.add_additional(convert_to_proto_record(rr)?);
    }

    Ok(proto_msg)
}

fn convert_to_proto_record(rr: &ResourceRecord) -> Result<hickory_proto::rr::Record> {
    use hickory_proto::rr::{Name, RData as ProtoRData, Record, RecordType as ProtoRecordType};

    let name = Name::from_utf8(rr.name())
        .map_err(|e| Error::DnsProtocol(format!("invalid record name: {}", e)))?;

    let parse_name = |value: &str, what: &str| -> Result<Name> {
        Name::from_utf8(value)
            .map_err(|e| Error::DnsProtocol(format!("invalid {} name: {}", what, e)))
    };

    let rdata = match rr.rdata() {
        RData::A(ipv4) => ProtoRData::A(hickory_proto::rr::rdata::A(*ipv4)),
        RData::AAAA(ipv6) => ProtoRData::AAAA(hickory_proto::rr::rdata::AAAA(*ipv6)),
        RData::CNAME(target) => {
            ProtoRData::CNAME(hickory_proto::rr::rdata::CNAME(parse_name(target, "CNAME")?))
        }
        RData::NS(ns) => ProtoRData::NS(hickory_proto::rr::rdata::NS(parse_name(ns, "NS")?)),
        RData::PTR(ptr) => ProtoRData::PTR(hickory_proto::rr::rdata::PTR(parse_name(ptr, "PTR")?)),
        RData::TXT(texts) => ProtoRData::TXT(hickory_proto::rr::rdata::TXT::new(texts.clone())),
        RData::MX {
            preference,
            exchange,
        } => ProtoRData::MX(hickory_proto::rr::rdata::MX::new(
            *preference,
            parse_name(exchange, "MX exchange")?,
        )),
        RData::SOA {
            mname,
            rname,
            serial,
            refresh,
            retry,
            expire,
            minimum,
        } => ProtoRData::SOA(hickory_proto::rr::rdata::SOA::new(
            parse_name(mname, "SOA mname")?,
            parse_name(rname, "SOA rname")?,
            *serial,
            *refresh as i32,
            *retry as i32,
            *expire as i32,
            *minimum,
        )),
    };

    let mut record = Record::new();
    record.set_name(name);
    record.set_record_type(ProtoRecordType::from(rr.rtype().to_u16()));
    record.set_dns_class(hickory_proto::rr::DNSClass::from(rr.rclass().to_u16()));
    record.set_ttl(rr.ttl());
    record.set_data(Some(rdata));

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn roundtrip_query() {
        let mut msg = Message::new();
        msg.set_id(1234);
        msg.set_recursion_desired(true);
        msg.add_question(Question::new("example.com", RecordType::A, RecordClass::IN));

        let wire = serialize_message(&msg).unwrap();
        let parsed = parse_message(&wire).unwrap();

        assert_eq!(parsed.id(), 1234);
        assert!(!parsed.is_response());
        assert!(parsed.recursion_desired());
        assert_eq!(parsed.question_count(), 1);
        assert_eq!(parsed.questions()[0].qname(), "example.com");
    }

    #[test]
    fn roundtrip_a_answer() {
        let mut msg = Message::new();
        msg.set_id(1111);
        msg.set_response(true);
        msg.add_question(Question::new("test.example", RecordType::A, RecordClass::IN));
        msg.add_answer(ResourceRecord::new(
            "test.example",
            RecordType::A,
            RecordClass::IN,
            300,
            RData::A(Ipv4Addr::new(192, 168, 1, 1)),
        ));

        let wire = serialize_message(&msg).unwrap();
        let parsed = parse_message(&wire).unwrap();

        assert_eq!(parsed.answer_count(), 1);
        match parsed.answers()[0].rdata() {
            RData::A(ip) => assert_eq!(*ip, Ipv4Addr::new(192, 168, 1, 1)),
            other => panic!("expected A record, got {:?}", other),
        }
    }

    #[test]
    fn roundtrip_aaaa_answer() {
        let mut msg = Message::new();
        msg.set_response(true);
        msg.add_answer(ResourceRecord::new(
            "test.example",
            RecordType::AAAA,
            RecordClass::IN,
            300,
            RData::AAAA(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1)),
        ));

        let wire = serialize_message(&msg).unwrap();
        let parsed = parse_message(&wire).unwrap();

        match parsed.answers()[0].rdata() {
            RData::AAAA(ip) => assert_eq!(*ip, Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1)),
            other => panic!("expected AAAA record, got {:?}", other),
        }
    }

    #[test]
    fn roundtrip_cname_chain() {
        let mut msg = Message::new();
        msg.set_response(true);
        msg.add_answer(ResourceRecord::new(
            "alias.example",
            RecordType::CNAME,
            RecordClass::IN,
            600,
            RData::CNAME("target.example".to_string()),
        ));
        msg.add_answer(ResourceRecord::new(
            "target.example",
            RecordType::A,
            RecordClass::IN,
            600,
            RData::A(Ipv4Addr::new(10, 0, 0, 1)),
        ));

        let wire = serialize_message(&msg).unwrap();
        let parsed = parse_message(&wire).unwrap();

        assert_eq!(parsed.answer_count(), 2);
        match parsed.answers()[0].rdata() {
            RData::CNAME(target) => assert_eq!(target, "target.example"),
            other => panic!("expected CNAME record, got {:?}", other),
        }
    }

    #[test]
    fn roundtrip_flags() {
        let mut msg = Message::new();
        msg.set_id(9);
        msg.set_response(true);
        msg.set_authoritative(true);
        msg.set_truncated(true);
        msg.set_recursion_available(true);
        msg.set_response_code(crate::dns::ResponseCode::NXDomain);

        let wire = serialize_message(&msg).unwrap();
        let parsed = parse_message(&wire).unwrap();

        assert!(parsed.is_authoritative());
        assert!(parsed.is_truncated());
        assert!(parsed.recursion_available());
        assert_eq!(parsed.response_code(), crate::dns::ResponseCode::NXDomain);
    }

    #[test]
    fn parse_rejects_short_input() {
        assert!(parse_message(&[0x00, 0x01, 0x02]).is_err());
        assert!(parse_message(&[]).is_err());
    }

    #[test]
    fn encoded_len_matches_serialization() {
        let mut msg = Message::new();
        msg.add_question(Question::new("example.com", RecordType::A, RecordClass::IN));
        let len = encoded_len(&msg).unwrap();
        assert_eq!(len, serialize_message(&msg).unwrap().len());
        assert!(len > 12);
    }
}
