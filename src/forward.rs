//! Upstream forwarding with ordered failover.
//!
//! The request is serialized once and relayed byte-for-byte, so anything
//! the client put in the message (including OPT records) reaches the
//! upstream untouched. Upstreams are tried strictly in configured order;
//! there is no load balancing or health tracking.
//!
//! Each attempt starts over UDP. A truncated UDP reply triggers a retry
//! over TCP against the same upstream; if the TCP exchange fails too, the
//! truncated UDP reply is returned and the TC flag tells the client to
//! retry itself.

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::dns::{wire, Message};
use crate::{Error, Result};

/// Per-attempt exchange timeout, applied to UDP and TCP independently.
const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Receive buffer for UDP replies. Upstreams answering without EDNS stay
/// within 512 bytes; the headroom covers upstreams that answer large
/// anyway.
const UDP_RECV_SIZE: usize = 4096;

/// Forwards DNS messages to an ordered list of upstream resolvers.
#[derive(Debug)]
pub struct Forwarder {
    upstreams: Vec<String>,
    timeout: Duration,
}

impl Forwarder {
    /// Create a forwarder that tries each `host:port` upstream in order.
    pub fn new(upstreams: Vec<String>) -> Self {
        Self {
            upstreams,
            timeout: EXCHANGE_TIMEOUT,
        }
    }

    /// Override the per-attempt timeout (tests use short values).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn upstreams(&self) -> &[String] {
        &self.upstreams
    }

    /// Relay `request` to the upstreams until one produces a reply.
    pub async fn forward(&self, request: &Message) -> Result<Message> {
        let request_data = wire::serialize_message(request)?;

        let mut last_err = Error::Upstream("no upstream servers configured".to_string());

        for upstream in &self.upstreams {
            let reply = match self.exchange_udp(&request_data, upstream).await {
                Ok(reply) => reply,
                Err(e) => {
                    warn!(upstream = %upstream, error = %e, "upstream exchange failed, trying next server");
                    last_err = e;
                    continue;
                }
            };

            if !reply.is_truncated() {
                return Ok(reply);
            }

            debug!(upstream = %upstream, "UDP reply truncated, retrying over TCP");
            match self.exchange_tcp(&request_data, upstream).await {
                Ok(tcp_reply) => return Ok(tcp_reply),
                Err(e) => {
                    warn!(upstream = %upstream, error = %e, "TCP retry failed, returning truncated reply");
                    return Ok(reply);
                }
            }
        }

        Err(last_err)
    }

    async fn exchange_udp(&self, request_data: &[u8], upstream: &str) -> Result<Message> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket
            .connect(upstream)
            .await
            .map_err(|e| Error::Upstream(format!("connect {}: {}", upstream, e)))?;

        socket
            .send(request_data)
            .await
            .map_err(|e| Error::Upstream(format!("send to {}: {}", upstream, e)))?;

        let mut buf = vec![0u8; UDP_RECV_SIZE];
        let len = match timeout(self.timeout, socket.recv(&mut buf)).await {
            Ok(Ok(len)) => len,
            Ok(Err(e)) => {
                return Err(Error::Upstream(format!("recv from {}: {}", upstream, e)));
            }
            Err(_) => {
                return Err(Error::Upstream(format!(
                    "timeout waiting for {}",
                    upstream
                )));
            }
        };

        wire::parse_message(&buf[..len])
    }

    async fn exchange_tcp(&self, request_data: &[u8], upstream: &str) -> Result<Message> {
        let exchange = async {
            let mut stream = TcpStream::connect(upstream)
                .await
                .map_err(|e| Error::Upstream(format!("connect {}: {}", upstream, e)))?;

            let len = u16::try_from(request_data.len())
                .map_err(|_| Error::DnsProtocol("request exceeds TCP message limit".to_string()))?;
            stream.write_all(&len.to_be_bytes()).await?;
            stream.write_all(request_data).await?;
            stream.flush().await?;

            let mut len_buf = [0u8; 2];
            stream.read_exact(&mut len_buf).await?;
            let reply_len = u16::from_be_bytes(len_buf) as usize;

            let mut buf = vec![0u8; reply_len];
            stream.read_exact(&mut buf).await?;

            wire::parse_message(&buf)
        };

        match timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(Error::Upstream(format!(
                "TCP timeout waiting for {}",
                upstream
            ))),
        }
    }
}
