//! The request pipeline.
//!
//! Every query runs the same stages in order: filter check, cache check,
//! local record resolution (with CNAME chain expansion), and finally
//! upstream forwarding. Whichever stage produces an answer writes it back
//! through the response writer that delivered the request; the reply is
//! cached under a key partitioned by transport first.
//!
//! Replies leaving over UDP are bounded to 512 bytes: answer records are
//! dropped from the tail until the message fits and the TC flag is set,
//! which sends the client back over TCP where the full answer (cached
//! under the TCP key) is served.

use async_trait::async_trait;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::cache::{CacheKey, DnsCache};
use crate::dns::{wire, Message, Question, RData, RecordClass, RecordType, ResourceRecord, ResponseCode};
use crate::filtering::Filter;
use crate::forward::Forwarder;
use crate::records::{RecordData, RecordsStore};
use crate::Result;

/// TTL for answers built from local records.
const DEFAULT_TTL: u32 = 600;

/// Upper bound on CNAME chain expansion; a cycle in the records file
/// stops here and the partial chain is returned.
const MAX_CNAME_CHAIN: usize = 16;

/// Largest reply we put on the wire over UDP without EDNS.
const MAX_UDP_SIZE: usize = 512;

/// Transport a request arrived on. Part of the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    Udp,
    Tcp,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Udp => write!(f, "udp"),
            Transport::Tcp => write!(f, "tcp"),
        }
    }
}

/// Write half of a request: where the reply goes and how.
#[async_trait]
pub trait ResponseWriter: Send {
    /// Peer the request came from.
    fn remote_addr(&self) -> SocketAddr;

    /// Local address the request arrived on.
    fn local_addr(&self) -> SocketAddr;

    /// Transport identity, used for the cache partition.
    fn transport(&self) -> Transport;

    /// Send a reply to the peer.
    async fn write_message(&mut self, msg: &Message) -> Result<()>;
}

/// Handles one parsed DNS request.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn handle(&self, writer: &mut dyn ResponseWriter, request: Message);
}

/// The production handler: filter, cache, local records, forwarder.
pub struct Resolver {
    cache: Arc<DnsCache>,
    records: Arc<RecordsStore>,
    forwarder: Arc<Forwarder>,
    filter: Option<Arc<Filter>>,
}

impl Resolver {
    pub fn new(
        cache: Arc<DnsCache>,
        records: Arc<RecordsStore>,
        forwarder: Arc<Forwarder>,
        filter: Option<Arc<Filter>>,
    ) -> Self {
        Self {
            cache,
            records,
            forwarder,
            filter,
        }
    }

    /// Serve a filtered query: NXDOMAIN, no answers, RA set, not cached.
    async fn write_blocked(&self, writer: &mut dyn ResponseWriter, request: &Message, qname: &str) {
        let q = &request.questions()[0];
        debug!(name = %qname, client = %writer.remote_addr(), "query blocked by filter");

        if let Some(filter) = &self.filter {
            filter.log_blocked(&writer.remote_addr().to_string(), qname, q.qtype());
        }

        let mut reply = Message::reply_to(request);
        reply.set_response_code(ResponseCode::NXDomain);
        reply.set_recursion_available(true);
        self.write(writer, &reply).await;
    }

    /// Answer from a local record, or fall through (`None`) when the
    /// record kind does not serve this query type.
    async fn answer_local(
        &self,
        request: &Message,
        qname: &str,
        record: &RecordData,
    ) -> Option<Message> {
        let q = &request.questions()[0];
        match record {
            RecordData::A(addr) => {
                if !matches!(q.qtype(), RecordType::A | RecordType::ANY) {
                    return None;
                }
                let mut reply = Message::reply_to(request);
                reply.set_recursion_available(true);
                reply.set_authoritative(true);
                reply.add_answer(ResourceRecord::new(
                    qname,
                    RecordType::A,
                    RecordClass::IN,
                    DEFAULT_TTL,
                    RData::A(*addr),
                ));
                Some(reply)
            }
            RecordData::Cname(target) => Some(self.expand_cname_chain(request, qname, target).await),
        }
    }

    /// Follow a CNAME chain through the local records, forwarding the
    /// final target when it leaves the local data.
    async fn expand_cname_chain(
        &self,
        request: &Message,
        qname: &str,
        first_target: &str,
    ) -> Message {
        let mut reply = Message::reply_to(request);
        reply.set_recursion_available(true);
        reply.add_answer(ResourceRecord::new(
            qname,
            RecordType::CNAME,
            RecordClass::IN,
            DEFAULT_TTL,
            RData::CNAME(format!("{}.", first_target)),
        ));

        let mut current = first_target.to_string();
        for _ in 0..MAX_CNAME_CHAIN {
            let current_fqdn = format!("{}.", current);
            match self.records.get(&current_fqdn) {
                Some(rec) => match rec.data {
                    RecordData::A(addr) => {
                        reply.add_answer(ResourceRecord::new(
                            &current_fqdn,
                            RecordType::A,
                            RecordClass::IN,
                            DEFAULT_TTL,
                            RData::A(addr),
                        ));
                        reply.set_authoritative(true);
                        return reply;
                    }
                    RecordData::Cname(next) => {
                        reply.add_answer(ResourceRecord::new(
                            &current_fqdn,
                            RecordType::CNAME,
                            RecordClass::IN,
                            DEFAULT_TTL,
                            RData::CNAME(format!("{}.", next)),
                        ));
                        current = next;
                    }
                },
                None => {
                    debug!(target = %current_fqdn, "CNAME target not local, forwarding");
                    let mut target_query = Message::new();
                    target_query.set_id(request.id());
                    target_query.add_question(Question::new(
                        &current_fqdn,
                        RecordType::A,
                        RecordClass::IN,
                    ));

                    match self.forwarder.forward(&target_query).await {
                        Ok(response) => {
                            for answer in response.answers() {
                                reply.add_answer(answer.clone());
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "failed to forward CNAME target resolution");
                        }
                    }
                    return reply;
                }
            }
        }

        warn!(name = %qname, "CNAME chain exceeded {} steps, returning partial chain", MAX_CNAME_CHAIN);
        reply
    }

    /// Bound a reply to the UDP size limit, cache it, and send it.
    async fn finish(
        &self,
        writer: &mut dyn ResponseWriter,
        key: CacheKey,
        mut reply: Message,
    ) {
        if writer.transport() == Transport::Udp {
            truncate_to_udp_size(&mut reply);
        }
        self.cache.set(key, reply.clone());
        self.write(writer, &reply).await;
    }

    async fn write(&self, writer: &mut dyn ResponseWriter, reply: &Message) {
        if let Err(e) = writer.write_message(reply).await {
            error!(client = %writer.remote_addr(), error = %e, "failed to write response");
        }
    }
}

/// Drop answers from the tail until the encoded message fits in a plain
/// UDP datagram, flagging the truncation.
fn truncate_to_udp_size(reply: &mut Message) {
    loop {
        let len = wire::encoded_len(reply).unwrap_or(0);
        if len <= MAX_UDP_SIZE || reply.answers().is_empty() {
            return;
        }
        reply.answers_mut().pop();
        reply.set_truncated(true);
    }
}

#[async_trait]
impl RequestHandler for Resolver {
    async fn handle(&self, writer: &mut dyn ResponseWriter, request: Message) {
        let Some(q) = request.questions().first() else {
            debug!(client = %writer.remote_addr(), "dropping request without a question");
            return;
        };

        let mut qname = q.qname().to_lowercase();
        if !qname.ends_with('.') {
            qname.push('.');
        }
        let transport = writer.transport();
        let key = CacheKey::new(&qname, q.qtype().to_u16(), transport);

        debug!(
            name = %qname,
            qtype = %q.qtype(),
            client = %writer.remote_addr(),
            transport = %transport,
            id = request.id(),
            "received query"
        );

        // Filter first: blocked names never reach the cache or upstreams
        if let Some(filter) = &self.filter {
            if filter.should_block(&qname) {
                self.write_blocked(writer, &request, &qname).await;
                return;
            }
        }

        if let Some(mut cached) = self.cache.get(&key) {
            debug!(key = %key, "cache hit");
            cached.set_id(request.id());
            cached.set_recursion_available(true);
            self.write(writer, &cached).await;
            return;
        }

        if let Some(record) = self.records.get(&qname) {
            debug!(name = %qname, kind = ?record.data.kind(), "found local record");
            if let Some(reply) = self.answer_local(&request, &qname, &record.data).await {
                self.finish(writer, key, reply).await;
                return;
            }
        } else {
            debug!(name = %qname, "no local record found");
        }

        match self.forwarder.forward(&request).await {
            Ok(reply) => {
                self.finish(writer, key, reply).await;
            }
            Err(e) => {
                error!(name = %qname, error = %e, "upstream DNS servers failed");
            }
        }
    }
}
