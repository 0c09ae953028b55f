//! UDP DNS listener.

use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::{debug, error, info};

use crate::dns::{wire, Message};
use crate::server::{RequestHandler, ResponseWriter, Transport};
use crate::Result;

/// Largest datagram we accept from clients.
const MAX_UDP_REQUEST: usize = 4096;

/// DNS server speaking plain UDP, one spawned task per datagram.
pub struct UdpServer {
    socket: Arc<UdpSocket>,
    handler: Arc<dyn RequestHandler>,
}

impl UdpServer {
    /// Bind the listener on `addr`.
    pub async fn bind(addr: &str, handler: Arc<dyn RequestHandler>) -> Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        info!("UDP server listening on {}", socket.local_addr()?);

        Ok(Self {
            socket: Arc::new(socket),
            handler,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Receive datagrams until the socket fails fatally.
    pub async fn run(&self) -> Result<()> {
        let mut buf = vec![0u8; MAX_UDP_REQUEST];

        loop {
            match self.socket.recv_from(&mut buf).await {
                Ok((len, peer_addr)) => {
                    debug!(bytes = len, peer = %peer_addr, "received datagram");

                    let request_data = buf[..len].to_vec();
                    let handler = Arc::clone(&self.handler);
                    let socket = Arc::clone(&self.socket);

                    tokio::spawn(async move {
                        handle_datagram(&request_data, peer_addr, handler, socket).await;
                    });
                }
                Err(e) => {
                    error!(error = %e, "error receiving UDP packet");
                    // Transient receive errors do not stop the listener
                }
            }
        }
    }
}

async fn handle_datagram(
    request_data: &[u8],
    peer_addr: SocketAddr,
    handler: Arc<dyn RequestHandler>,
    socket: Arc<UdpSocket>,
) {
    let request = match wire::parse_message(request_data) {
        Ok(request) => request,
        Err(e) => {
            debug!(peer = %peer_addr, error = %e, "dropping unparseable datagram");
            return;
        }
    };

    let local = match socket.local_addr() {
        Ok(addr) => addr,
        Err(e) => {
            error!(error = %e, "UDP socket has no local address");
            return;
        }
    };

    let mut writer = UdpResponseWriter {
        socket,
        peer_addr,
        local,
    };
    handler.handle(&mut writer, request).await;
}

struct UdpResponseWriter {
    socket: Arc<UdpSocket>,
    peer_addr: SocketAddr,
    local: SocketAddr,
}

#[async_trait]
impl ResponseWriter for UdpResponseWriter {
    fn remote_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    fn local_addr(&self) -> SocketAddr {
        self.local
    }

    fn transport(&self) -> Transport {
        Transport::Udp
    }

    async fn write_message(&mut self, msg: &Message) -> Result<()> {
        let data = wire::serialize_message(msg)?;
        self.socket.send_to(&data, self.peer_addr).await?;
        Ok(())
    }
}
