//! Test helpers: a stub upstream resolver and a capturing response writer.

use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};

use crate::dns::{wire, Message, RData, RecordClass, RecordType, ResourceRecord};
use crate::server::{ResponseWriter, Transport};
use crate::Result;

/// Canned answer set for one `(qname, qtype)` pair.
#[derive(Debug, Clone)]
pub struct StubResponse {
    rdata: Vec<RData>,
}

impl StubResponse {
    pub fn a(ip: &str) -> Self {
        Self {
            rdata: vec![RData::A(ip.parse::<Ipv4Addr>().unwrap())],
        }
    }

    pub fn aaaa(ip: &str) -> Self {
        Self {
            rdata: vec![RData::AAAA(ip.parse::<Ipv6Addr>().unwrap())],
        }
    }
}

fn stub_key(name: &str, qtype: RecordType) -> (String, u16) {
    (
        name.trim_end_matches('.').to_lowercase(),
        qtype.to_u16(),
    )
}

/// A stub upstream listening on UDP and TCP on one loopback port.
///
/// Unknown questions get an empty NOERROR reply. With `truncate_udp`,
/// UDP replies come back emptied with TC set so callers exercise the
/// TCP retry path; TCP always serves the full canned answer.
pub struct StubUpstream {
    udp: Arc<UdpSocket>,
    tcp: TcpListener,
    responses: HashMap<(String, u16), StubResponse>,
    truncate_udp: bool,
}

impl StubUpstream {
    pub async fn start() -> Self {
        // UDP and TCP must share a port number; retry until a port admits both
        for _ in 0..16 {
            let udp = match UdpSocket::bind("127.0.0.1:0").await {
                Ok(socket) => socket,
                Err(_) => continue,
            };
            let port = udp.local_addr().unwrap().port();
            if let Ok(tcp) = TcpListener::bind(("127.0.0.1", port)).await {
                return Self {
                    udp: Arc::new(udp),
                    tcp,
                    responses: HashMap::new(),
                    truncate_udp: false,
                };
            }
        }
        panic!("could not bind stub upstream to a shared UDP/TCP port");
    }

    pub fn respond(mut self, name: &str, qtype: RecordType, response: StubResponse) -> Self {
        self.responses.insert(stub_key(name, qtype), response);
        self
    }

    pub fn truncate_udp(mut self, truncate: bool) -> Self {
        self.truncate_udp = truncate;
        self
    }

    /// Spawn the serving loops and hand back the reachable address.
    pub fn run(self) -> RunningStub {
        let addr = self.udp.local_addr().unwrap().to_string();
        let responses = Arc::new(self.responses);
        let truncate_udp = self.truncate_udp;

        let udp_socket = Arc::clone(&self.udp);
        let udp_responses = Arc::clone(&responses);
        let udp_task = tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            while let Ok((len, peer)) = udp_socket.recv_from(&mut buf).await {
                let Ok(request) = wire::parse_message(&buf[..len]) else {
                    continue;
                };
                let mut reply = build_reply(&request, &udp_responses);
                if truncate_udp && reply.answer_count() > 0 {
                    reply.answers_mut().clear();
                    reply.set_truncated(true);
                }
                if let Ok(data) = wire::serialize_message(&reply) {
                    let _ = udp_socket.send_to(&data, peer).await;
                }
            }
        });

        let tcp_listener = self.tcp;
        let tcp_responses = Arc::clone(&responses);
        let tcp_task = tokio::spawn(async move {
            while let Ok((mut stream, _)) = tcp_listener.accept().await {
                let responses = Arc::clone(&tcp_responses);
                tokio::spawn(async move {
                    let mut len_buf = [0u8; 2];
                    if stream.read_exact(&mut len_buf).await.is_err() {
                        return;
                    }
                    let msg_len = u16::from_be_bytes(len_buf) as usize;
                    let mut buf = vec![0u8; msg_len];
                    if stream.read_exact(&mut buf).await.is_err() {
                        return;
                    }
                    let Ok(request) = wire::parse_message(&buf) else {
                        return;
                    };
                    let reply = build_reply(&request, &responses);
                    if let Ok(data) = wire::serialize_message(&reply) {
                        let len = data.len() as u16;
                        let _ = stream.write_all(&len.to_be_bytes()).await;
                        let _ = stream.write_all(&data).await;
                    }
                });
            }
        });

        RunningStub {
            addr,
            _udp_task: udp_task,
            _tcp_task: tcp_task,
        }
    }
}

fn build_reply(request: &Message, responses: &HashMap<(String, u16), StubResponse>) -> Message {
    let mut reply = Message::reply_to(request);
    reply.set_recursion_available(true);

    if let Some(q) = request.questions().first() {
        if let Some(response) = responses.get(&stub_key(q.qname(), q.qtype())) {
            for rdata in &response.rdata {
                let rtype = match rdata {
                    RData::A(_) => RecordType::A,
                    RData::AAAA(_) => RecordType::AAAA,
                    RData::CNAME(_) => RecordType::CNAME,
                    _ => RecordType::TXT,
                };
                reply.add_answer(ResourceRecord::new(
                    q.qname(),
                    rtype,
                    RecordClass::IN,
                    300,
                    rdata.clone(),
                ));
            }
        }
    }

    reply
}

/// Serving stub handle; the loops stop when this is dropped.
pub struct RunningStub {
    addr: String,
    _udp_task: tokio::task::JoinHandle<()>,
    _tcp_task: tokio::task::JoinHandle<()>,
}

impl RunningStub {
    pub fn addr(&self) -> String {
        self.addr.clone()
    }
}

impl Drop for RunningStub {
    fn drop(&mut self) {
        self._udp_task.abort();
        self._tcp_task.abort();
    }
}

/// Response writer that captures replies instead of sending them.
pub struct MockWriter {
    transport: Transport,
    remote: SocketAddr,
    local: SocketAddr,
    written: Vec<Message>,
}

impl MockWriter {
    pub fn udp() -> Self {
        Self::new(Transport::Udp)
    }

    pub fn tcp() -> Self {
        Self::new(Transport::Tcp)
    }

    fn new(transport: Transport) -> Self {
        Self {
            transport,
            remote: "127.0.0.1:49152".parse().unwrap(),
            local: "127.0.0.1:5300".parse().unwrap(),
            written: Vec::new(),
        }
    }

    pub fn replies(&self) -> &[Message] {
        &self.written
    }

    /// The one reply the handler wrote; panics when there is not exactly one.
    pub fn single_reply(&self) -> Message {
        assert_eq!(
            self.written.len(),
            1,
            "expected exactly one reply, got {}",
            self.written.len()
        );
        self.written[0].clone()
    }
}

#[async_trait::async_trait]
impl ResponseWriter for MockWriter {
    fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    fn local_addr(&self) -> SocketAddr {
        self.local
    }

    fn transport(&self) -> Transport {
        self.transport
    }

    async fn write_message(&mut self, msg: &Message) -> Result<()> {
        self.written.push(msg.clone());
        Ok(())
    }
}
