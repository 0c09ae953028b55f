//! TCP DNS listener.
//!
//! DNS over TCP frames each message with a 2-byte big-endian length
//! prefix. Clients land here when a UDP reply came back truncated, so
//! replies written on this path are never size-limited by the handler.

use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

use crate::dns::{wire, Message};
use crate::server::{RequestHandler, ResponseWriter, Transport};
use crate::{Error, Result};

/// Largest TCP message we accept from clients.
const MAX_TCP_REQUEST: usize = 16 * 1024;

/// DNS server speaking TCP, one spawned task per connection.
pub struct TcpServer {
    listener: TcpListener,
    handler: Arc<dyn RequestHandler>,
}

impl TcpServer {
    /// Bind the listener on `addr`.
    pub async fn bind(addr: &str, handler: Arc<dyn RequestHandler>) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("TCP server listening on {}", listener.local_addr()?);

        Ok(Self { listener, handler })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the listener fails fatally.
    pub async fn run(&self) -> Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer_addr)) => {
                    debug!(peer = %peer_addr, "accepted connection");
                    let handler = Arc::clone(&self.handler);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, peer_addr, handler).await {
                            debug!(peer = %peer_addr, error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "error accepting TCP connection");
                }
            }
        }
    }
}

/// Read one length-prefixed request, run the handler, close.
async fn handle_connection(
    mut stream: TcpStream,
    peer_addr: SocketAddr,
    handler: Arc<dyn RequestHandler>,
) -> Result<()> {
    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await?;
    let msg_len = u16::from_be_bytes(len_buf) as usize;

    if msg_len > MAX_TCP_REQUEST {
        return Err(Error::DnsProtocol(format!(
            "message too large: {} > {}",
            msg_len, MAX_TCP_REQUEST
        )));
    }

    let mut buf = vec![0u8; msg_len];
    stream.read_exact(&mut buf).await?;

    let request = wire::parse_message(&buf)?;
    let local = stream.local_addr()?;

    let mut writer = TcpResponseWriter {
        stream,
        peer_addr,
        local,
    };
    handler.handle(&mut writer, request).await;
    Ok(())
}

struct TcpResponseWriter {
    stream: TcpStream,
    peer_addr: SocketAddr,
    local: SocketAddr,
}

#[async_trait]
impl ResponseWriter for TcpResponseWriter {
    fn remote_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    fn local_addr(&self) -> SocketAddr {
        self.local
    }

    fn transport(&self) -> Transport {
        Transport::Tcp
    }

    async fn write_message(&mut self, msg: &Message) -> Result<()> {
        let data = wire::serialize_message(msg)?;
        let len = u16::try_from(data.len())
            .map_err(|_| Error::DnsProtocol("response exceeds TCP message limit".to_string()))?;

        self.stream.write_all(&len.to_be_bytes()).await?;
        self.stream.write_all(&data).await?;
        self.stream.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::{Question, RecordClass, RecordType};

    struct EchoHandler;

    #[async_trait]
    impl RequestHandler for EchoHandler {
        async fn handle(&self, writer: &mut dyn ResponseWriter, request: Message) {
            let mut reply = Message::reply_to(&request);
            reply.set_recursion_available(true);
            let _ = writer.write_message(&reply).await;
        }
    }

    #[tokio::test]
    async fn bind_on_ephemeral_port() {
        let server = TcpServer::bind("127.0.0.1:0", Arc::new(EchoHandler))
            .await
            .unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn serves_a_query_end_to_end() {
        let server = TcpServer::bind("127.0.0.1:0", Arc::new(EchoHandler))
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = server.run().await;
        });

        let mut query = Message::new();
        query.set_id(0x4141);
        query.add_question(Question::new(
            "roundtrip.example.",
            RecordType::AAAA,
            RecordClass::IN,
        ));
        let data = wire::serialize_message(&query).unwrap();

        let mut client = TcpStream::connect(addr).await.unwrap();
        let len = data.len() as u16;
        client.write_all(&len.to_be_bytes()).await.unwrap();
        client.write_all(&data).await.unwrap();

        let mut len_buf = [0u8; 2];
        client.read_exact(&mut len_buf).await.unwrap();
        let reply_len = u16::from_be_bytes(len_buf) as usize;
        let mut buf = vec![0u8; reply_len];
        client.read_exact(&mut buf).await.unwrap();

        let reply = wire::parse_message(&buf).unwrap();
        assert!(reply.is_response());
        assert_eq!(reply.id(), 0x4141);
    }

    #[tokio::test]
    async fn oversized_length_prefix_is_rejected() {
        let server = TcpServer::bind("127.0.0.1:0", Arc::new(EchoHandler))
            .await
            .unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = server.run().await;
        });

        let mut client = TcpStream::connect(addr).await.unwrap();
        // Length prefix claims 65535 bytes but the connection goes quiet;
        // the server must drop it without replying
        client.write_all(&0xffffu16.to_be_bytes()).await.unwrap();
        drop(client);
    }
}
