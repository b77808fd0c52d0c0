//! Shared integration test harness: boots a full server stack (reactor
//! pool, registries, dispatcher, acceptor) on an ephemeral port and
//! exposes a tiny client helper for sending/receiving raw frames over a
//! real `TcpStream`.

use std::sync::Arc;
use std::time::Duration;

use relaysrv::net::{Acceptor, ReactorPool};
use relaysrv::protocol::frame::{self, Header, MAGIC};
use relaysrv::registry::{ClientRegistry, SessionRegistry};
use relaysrv::services::admin::AdminService;
use relaysrv::services::communication::CommunicationService;
use relaysrv::services::db::DbService;
use relaysrv::services::heart::HeartService;
use relaysrv::services::hello::HelloService;
use relaysrv::services::{Dispatcher, ServiceRegistry};
use relaysrv::db::DbExecutor;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::watch;

/// A running server bound to an ephemeral port. Dropping this does not stop
/// the accept loop; tests run in-process for the lifetime of the test binary
/// and don't need graceful shutdown.
pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub session_registry: Arc<SessionRegistry>,
    _shutdown_tx: watch::Sender<bool>,
}

impl TestServer {
    pub async fn start() -> Self {
        let reactors = Arc::new(ReactorPool::build(2).expect("failed to build reactor pool"));
        let session_registry = Arc::new(SessionRegistry::new());
        let client_registry = Arc::new(ClientRegistry::new());
        let db_executor = Arc::new(DbExecutor::new());

        let service_registry = Arc::new(ServiceRegistry::new());
        service_registry.register(Arc::new(HelloService));
        service_registry.register(Arc::new(HeartService));
        service_registry.register(Arc::new(CommunicationService));
        service_registry.register(Arc::new(DbService::new(db_executor.clone())));
        service_registry.register(Arc::new(AdminService::new(db_executor.clone())));
        let dispatcher = Arc::new(Dispatcher::new(service_registry));

        let addr: std::net::SocketAddr = "127.0.0.1:0".parse().unwrap();
        let acceptor = Acceptor::bind(addr).expect("failed to bind acceptor");
        let bound_addr = acceptor.local_addr();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let reactor_handle = reactors.handle();
        // The spawned task holds its own `Arc<ReactorPool>` clone, so the
        // runtime stays alive for the rest of the test process even after
        // `reactors` goes out of scope here.
        reactor_handle.spawn(acceptor.run(
            reactors.clone(),
            session_registry.clone(),
            client_registry.clone(),
            dispatcher.clone(),
            shutdown_rx,
        ));

        TestServer {
            addr: bound_addr,
            session_registry,
            _shutdown_tx: shutdown_tx,
        }
    }
}

/// A plain TCP client that speaks the frame protocol directly, without
/// going through `Session` — used to drive the server the way a real peer
/// would.
pub struct TestClient {
    stream: TcpStream,
    seq: u32,
}

impl TestClient {
    pub async fn connect(addr: std::net::SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("failed to connect");
        TestClient { stream, seq: 0 }
    }

    pub fn next_header(&mut self, service_id: u16, cmd_id: u16) -> Header {
        self.seq += 1;
        Header {
            magic: MAGIC,
            version: 1,
            service_id,
            cmd_id,
            length: 0,
            seq: self.seq,
        }
    }

    pub async fn send(&mut self, header: Header, body: &[u8]) {
        let buf = frame::encode(header, body);
        self.stream.write_all(&buf).await.expect("write failed");
    }

    pub async fn recv(&mut self) -> (Header, Vec<u8>) {
        let mut header_buf = [0u8; frame::HEADER_SIZE];
        self.stream
            .read_exact(&mut header_buf)
            .await
            .expect("failed to read header");
        let header = Header::decode(&header_buf);
        let mut body = vec![0u8; header.length as usize];
        if header.length > 0 {
            self.stream.read_exact(&mut body).await.expect("failed to read body");
        }
        (header, body)
    }

    pub async fn recv_with_timeout(&mut self, timeout: Duration) -> Option<(Header, Vec<u8>)> {
        tokio::time::timeout(timeout, self.recv()).await.ok()
    }

    /// Waits for the peer to close its write half (a zero-length read),
    /// within `timeout`. Panics if data arrives instead.
    pub async fn expect_eof(&mut self, timeout: Duration) {
        let mut buf = [0u8; 1];
        let read = tokio::time::timeout(timeout, self.stream.read(&mut buf))
            .await
            .expect("timed out waiting for eof")
            .expect("read error while waiting for eof");
        assert_eq!(read, 0, "expected eof, got data instead");
    }
}
