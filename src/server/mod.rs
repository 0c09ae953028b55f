//! DNS server wiring.
//!
//! One `Server` binds UDP and TCP listeners on the same address; both
//! dispatch to the shared request handler. The cache lives alongside the
//! server so a reload can clear it through `clear_cache`.

pub mod handler;
pub mod tcp;
pub mod udp;

pub use handler::{RequestHandler, Resolver, ResponseWriter, Transport};
pub use tcp::TcpServer;
pub use udp::UdpServer;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::cache::DnsCache;
use crate::Result;

/// UDP and TCP DNS servers sharing one handler stack.
pub struct Server {
    udp: UdpServer,
    tcp: TcpServer,
    cache: Arc<DnsCache>,
}

impl Server {
    /// Bind both listeners on `addr`.
    pub async fn bind(
        addr: &str,
        handler: Arc<dyn RequestHandler>,
        cache: Arc<DnsCache>,
    ) -> Result<Self> {
        let udp = UdpServer::bind(addr, Arc::clone(&handler)).await?;
        let tcp = TcpServer::bind(addr, handler).await?;
        Ok(Self { udp, tcp, cache })
    }

    /// Address the UDP listener actually bound to.
    pub fn udp_local_addr(&self) -> Result<SocketAddr> {
        self.udp.local_addr()
    }

    /// Address the TCP listener actually bound to.
    pub fn tcp_local_addr(&self) -> Result<SocketAddr> {
        self.tcp.local_addr()
    }

    /// Serve both transports until one of the loops fails.
    pub async fn run(&self) -> Result<()> {
        tokio::try_join!(self.udp.run(), self.tcp.run())?;
        Ok(())
    }

    /// Drop every cached response; invoked on reload.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}
