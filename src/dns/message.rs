//! DNS message: header flags plus question, answer, authority, and
//! additional sections (RFC 1035 section 4).

use super::question::Question;
use super::record::ResourceRecord;
use super::types::{OpCode, ResponseCode};
use std::fmt;

/// A complete DNS message, query or response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Message ID
    id: u16,
    /// Query/Response flag (false = query, true = response)
    qr: bool,
    /// Operation code
    opcode: OpCode,
    /// Authoritative answer flag
    aa: bool,
    /// Truncation flag
    tc: bool,
    /// Recursion desired flag
    rd: bool,
    /// Recursion available flag
    ra: bool,
    /// Response code
    rcode: ResponseCode,

    questions: Vec<Question>,
    answers: Vec<ResourceRecord>,
    authority: Vec<ResourceRecord>,
    additional: Vec<ResourceRecord>,
}

impl Message {
    /// Create an empty query message (QR=0, opcode QUERY, RD set).
    pub fn new() -> Self {
        Self {
            id: 0,
            qr: false,
            opcode: OpCode::Query,
            aa: false,
            tc: false,
            rd: true,
            ra: false,
            rcode: ResponseCode::NoError,
            questions: Vec::new(),
            answers: Vec::new(),
            authority: Vec::new(),
            additional: Vec::new(),
        }
    }

    /// Create a response skeleton for `request`: copies the id, opcode,
    /// RD flag, and question section, and sets QR.
    pub fn reply_to(request: &Message) -> Self {
        let mut msg = Message::new();
        msg.id = request.id;
        msg.qr = true;
        msg.opcode = request.opcode;
        msg.rd = request.rd;
        msg.questions = request.questions.clone();
        msg
    }

    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn set_id(&mut self, id: u16) {
        self.id = id;
    }

    pub fn is_response(&self) -> bool {
        self.qr
    }

    pub fn set_response(&mut self, is_response: bool) {
        self.qr = is_response;
    }

    pub fn opcode(&self) -> OpCode {
        self.opcode
    }

    pub fn set_opcode(&mut self, opcode: OpCode) {
        self.opcode = opcode;
    }

    pub fn is_authoritative(&self) -> bool {
        self.aa
    }

    pub fn set_authoritative(&mut self, aa: bool) {
        self.aa = aa;
    }

    pub fn is_truncated(&self) -> bool {
        self.tc
    }

    pub fn set_truncated(&mut self, tc: bool) {
        self.tc = tc;
    }

    pub fn recursion_desired(&self) -> bool {
        self.rd
    }

    pub fn set_recursion_desired(&mut self, rd: bool) {
        self.rd = rd;
    }

    pub fn recursion_available(&self) -> bool {
        self.ra
    }

    pub fn set_recursion_available(&mut self, ra: bool) {
        self.ra = ra;
    }

    pub fn response_code(&self) -> ResponseCode {
        self.rcode
    }

    pub fn set_response_code(&mut self, rcode: ResponseCode) {
        self.rcode = rcode;
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn add_question(&mut self, question: Question) {
        self.questions.push(question);
    }

    pub fn answers(&self) -> &[ResourceRecord] {
        &self.answers
    }

    pub fn answers_mut(&mut self) -> &mut Vec<ResourceRecord> {
        &mut self.answers
    }

    pub fn add_answer(&mut self, answer: ResourceRecord) {
        self.answers.push(answer);
    }

    pub fn authority(&self) -> &[ResourceRecord] {
        &self.authority
    }

    pub fn add_authority(&mut self, record: ResourceRecord) {
        self.authority.push(record);
    }

    pub fn additional(&self) -> &[ResourceRecord] {
        &self.additional
    }

    pub fn add_additional(&mut self, record: ResourceRecord) {
        self.additional.push(record);
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn answer_count(&self) -> usize {
        self.answers.len()
    }

    pub fn authority_count(&self) -> usize {
        self.authority.len()
    }

    pub fn additional_count(&self) -> usize {
        self.additional.len()
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            ";; id={} qr={} opcode={:?} rcode={} aa={} tc={} rd={} ra={}",
            self.id, self.qr, self.opcode, self.rcode, self.aa, self.tc, self.rd, self.ra
        )?;
        for q in &self.questions {
            writeln!(f, ";; question: {}", q)?;
        }
        for rr in &self.answers {
            writeln!(f, ";; answer: {}", rr)?;
        }
        for rr in &self.authority {
            writeln!(f, ";; authority: {}", rr)?;
        }
        for rr in &self.additional {
            writeln!(f, ";; additional: {}", rr)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::{RData, RecordClass, RecordType};
    use std::net::Ipv4Addr;

    #[test]
    fn new_message_defaults() {
        let msg = Message::new();
        assert_eq!(msg.id(), 0);
        assert!(!msg.is_response());
        assert_eq!(msg.opcode(), OpCode::Query);
        assert_eq!(msg.response_code(), ResponseCode::NoError);
        assert!(msg.recursion_desired());
        assert!(!msg.recursion_available());
    }

    #[test]
    fn reply_to_copies_request_identity() {
        let mut req = Message::new();
        req.set_id(4242);
        req.set_recursion_desired(true);
        req.add_question(Question::new("example.com.", RecordType::A, RecordClass::IN));

        let reply = Message::reply_to(&req);
        assert!(reply.is_response());
        assert_eq!(reply.id(), 4242);
        assert!(reply.recursion_desired());
        assert_eq!(reply.question_count(), 1);
        assert_eq!(reply.questions()[0].qname(), "example.com.");
        assert_eq!(reply.answer_count(), 0);
    }

    #[test]
    fn flags_roundtrip() {
        let mut msg = Message::new();
        msg.set_response(true);
        msg.set_authoritative(true);
        msg.set_truncated(true);
        msg.set_recursion_available(true);
        msg.set_response_code(ResponseCode::NXDomain);

        assert!(msg.is_response());
        assert!(msg.is_authoritative());
        assert!(msg.is_truncated());
        assert!(msg.recursion_available());
        assert_eq!(msg.response_code(), ResponseCode::NXDomain);
    }

    #[test]
    fn sections_and_counts() {
        let mut msg = Message::new();
        msg.add_question(Question::new("example.com", RecordType::A, RecordClass::IN));
        msg.add_answer(ResourceRecord::new(
            "example.com",
            RecordType::A,
            RecordClass::IN,
            300,
            RData::A(Ipv4Addr::new(192, 0, 2, 1)),
        ));
        msg.add_authority(ResourceRecord::new(
            "example.com",
            RecordType::NS,
            RecordClass::IN,
            86400,
            RData::NS("ns1.example.com".to_string()),
        ));
        msg.add_additional(ResourceRecord::new(
            "ns1.example.com",
            RecordType::A,
            RecordClass::IN,
            3600,
            RData::A(Ipv4Addr::new(192, 0, 2, 53)),
        ));

        assert_eq!(msg.question_count(), 1);
        assert_eq!(msg.answer_count(), 1);
        assert_eq!(msg.authority_count(), 1);
        assert_eq!(msg.additional_count(), 1);
    }

    #[test]
    fn answers_mut_allows_tail_drop() {
        let mut msg = Message::new();
        for i in 0..3 {
            msg.add_answer(ResourceRecord::new(
                format!("host{}.example.com", i),
                RecordType::A,
                RecordClass::IN,
                60,
                RData::A(Ipv4Addr::new(192, 0, 2, i)),
            ));
        }
        msg.answers_mut().pop();
        assert_eq!(msg.answer_count(), 2);
        assert_eq!(msg.answers()[1].name(), "host1.example.com");
    }
}
