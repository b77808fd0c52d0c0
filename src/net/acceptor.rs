//! Acceptor (component E): owns the listening socket, hands each accepted
//! connection to the next reactor, and re-arms.
//!
//! A `TcpListener`
//! built through `socket2`/`TcpSocket` for listen-backlog tuning, a
//! descriptor-exhaustion backoff, and re-arm-immediately for any other
//! accept error.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use socket2::{Domain, Socket, Type};
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::net::reactor::ReactorPool;
use crate::net::session::Session;
use crate::registry::{ClientRegistry, SessionRegistry};
use crate::services::Dispatcher;
use crate::stats;

/// Backlog depth for the listening socket.
const LISTEN_BACKLOG: i32 = 1024;

/// Pause applied after an accept error that indicates descriptor
/// exhaustion rather than busy-looping on it.
const EMFILE_BACKOFF: Duration = Duration::from_millis(100);

pub struct Acceptor {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl Acceptor {
    /// Binds the listening socket. `addr`'s port is expected to already be
    /// validated/defaulted by `config::server` before reaching here.
    pub fn bind(addr: SocketAddr) -> std::io::Result<Self> {
        let domain = if addr.is_ipv6() { Domain::IPV6 } else { Domain::IPV4 };
        let socket = Socket::new(domain, Type::STREAM, None)?;
        socket.set_reuse_address(true)?;
        socket.set_nonblocking(true)?;
        socket.bind(&addr.into())?;
        socket.listen(LISTEN_BACKLOG)?;
        let listener = TcpListener::from_std(socket.into())?;
        let local_addr = listener.local_addr()?;
        Ok(Self { listener, local_addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Runs the accept loop until `shutdown` fires. For each accepted
    /// socket: obtain the next reactor, construct and start a `Session`,
    /// insert it into the global session index, and re-arm.
    pub async fn run(
        self,
        reactors: Arc<ReactorPool>,
        session_registry: Arc<SessionRegistry>,
        client_registry: Arc<ClientRegistry>,
        dispatcher: Arc<Dispatcher>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        tracing::info!(addr = %self.local_addr, "acceptor listening");
        loop {
            tokio::select! {
                biased;
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("acceptor stopping");
                        break;
                    }
                }
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer_addr)) => {
                            let reactor = reactors.next();
                            let session = Session::new(
                                peer_addr,
                                reactor,
                                session_registry.clone(),
                                client_registry.clone(),
                                dispatcher.clone(),
                            );
                            session_registry.insert(session.clone());
                            stats::record_connect();
                            tracing::debug!(session = %session.id, addr = %peer_addr, "accepted connection");
                            session.start(stream);
                        }
                        Err(err) => {
                            if is_descriptor_exhaustion(&err) {
                                tracing::warn!(error = %err, "accept error (descriptor exhaustion), backing off");
                                tokio::time::sleep(EMFILE_BACKOFF).await;
                            } else {
                                tracing::warn!(error = %err, "accept error, re-arming");
                            }
                        }
                    }
                }
            }
        }
    }
}

fn is_descriptor_exhaustion(err: &std::io::Error) -> bool {
    matches!(
        err.raw_os_error(),
        Some(libc_emfile) if libc_emfile == 24 /* EMFILE */ || libc_emfile == 23 /* ENFILE */
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bind_picks_an_ephemeral_port_when_asked() {
        let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
        let acceptor = Acceptor::bind(addr).unwrap();
        assert_ne!(acceptor.local_addr().port(), 0);
    }
}
