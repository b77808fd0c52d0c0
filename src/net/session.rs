//! Session (component D): owns one TCP connection end to end.
//!
//! A task tree rooted at accept: a read loop, an outbound mpsc queue
//! draining into a writer task, and a heartbeat watchdog, all guarded by
//! a single `stopped` flag and dispatch-by-serviceId routing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use uuid::Uuid;

use crate::errors::FrameError;
use crate::protocol::frame::{self, Header, DEFAULT_MAX_BODY, HEADER_SIZE};
use crate::registry::{ClientRegistry, SessionRegistry};
use crate::services::Dispatcher;
use crate::stats;
use crate::util::bounded_queue::BoundedQueue;
use crate::util::now_millis;

/// Max entries the outbound send queue holds before new frames are dropped.
const SEND_QUEUE_CAPACITY: usize = 1000;

/// Heartbeat watchdog tick interval.
const HEARTBEAT_TICK: Duration = Duration::from_secs(5);

/// Inactivity threshold past which a session is evicted.
const HEARTBEAT_TIMEOUT_MS: i64 = 60_000;

/// `{ip, port, name, isLongConn, connectTime}` attached to a session once it
/// registers a name via `COMM_REGISTER`.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    pub ip: String,
    pub port: u16,
    pub name: String,
    pub is_long_conn: bool,
    pub connect_time: i64,
}

/// One live TCP connection. Always held behind an `Arc` since the read loop,
/// writer task, heartbeat task, the global session index, and any dispatched
/// handler task all hold independent references.
pub struct Session {
    pub id: Uuid,
    pub addr: SocketAddr,
    reactor: Handle,
    stopped: AtomicBool,
    connected_at: i64,
    last_activity: AtomicI64,
    send_queue: BoundedQueue<BytesMut>,
    read_task: Mutex<Option<tokio::task::AbortHandle>>,
    client_info: Mutex<Option<ClientInfo>>,
    session_registry: Arc<SessionRegistry>,
    client_registry: Arc<ClientRegistry>,
    dispatcher: Arc<Dispatcher>,
    max_body: u32,
}

impl Session {
    pub fn new(
        addr: SocketAddr,
        reactor: Handle,
        session_registry: Arc<SessionRegistry>,
        client_registry: Arc<ClientRegistry>,
        dispatcher: Arc<Dispatcher>,
    ) -> Arc<Session> {
        Arc::new(Session {
            id: Uuid::new_v4(),
            addr,
            reactor,
            stopped: AtomicBool::new(false),
            connected_at: now_millis(),
            last_activity: AtomicI64::new(now_millis()),
            send_queue: BoundedQueue::new(SEND_QUEUE_CAPACITY),
            read_task: Mutex::new(None),
            client_info: Mutex::new(None),
            session_registry,
            client_registry,
            dispatcher,
            max_body: DEFAULT_MAX_BODY,
        })
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    pub fn client_name(&self) -> Option<String> {
        self.client_info.lock().as_ref().map(|c| c.name.clone())
    }

    pub fn client_info(&self) -> Option<ClientInfo> {
        self.client_info.lock().clone()
    }

    /// Thin pass-throughs to the client registry (component H) so handlers
    /// only ever touch session state through the session's own API, per the
    /// dispatcher contract.
    pub fn client_registry_add(&self, name: &str) -> bool {
        self.client_registry.add(name, self.id)
    }

    pub fn client_registry_get(&self, name: &str) -> Option<Uuid> {
        self.client_registry.get(name)
    }

    pub fn client_registry_list(&self) -> Vec<String> {
        self.client_registry.list()
    }

    /// Attaches `ClientInfo` the first time a session registers a name.
    /// Returns `false` if a name is already attached (register-once
    /// lifetime invariant).
    pub fn attach_client_info(&self, info: ClientInfo) -> bool {
        let mut guard = self.client_info.lock();
        if guard.is_some() {
            return false;
        }
        *guard = Some(info);
        true
    }

    /// Arms the read loop, the writer, and the heartbeat watchdog, all on
    /// the session's owning reactor.
    pub fn start(self: &Arc<Self>, stream: TcpStream) {
        let (read_half, write_half) = stream.into_split();

        let read_session = self.clone();
        let read_handle = self.reactor.spawn(async move {
            read_session.run_read_loop(read_half).await;
        });
        *self.read_task.lock() = Some(read_handle.abort_handle());

        let write_session = self.clone();
        self.reactor.spawn(async move {
            write_session.run_writer(write_half).await;
        });

        let heartbeat_session = self.clone();
        self.reactor.spawn(async move {
            heartbeat_session.run_heartbeat().await;
        });
    }

    async fn run_read_loop(self: Arc<Self>, mut read_half: OwnedReadHalf) {
        loop {
            let mut header_buf = [0u8; HEADER_SIZE];
            if let Err(err) = read_half.read_exact(&mut header_buf).await {
                match FrameError::from(err) {
                    FrameError::Eof => {
                        tracing::debug!(session = %self.id, "peer closed connection");
                    }
                    other => {
                        tracing::debug!(session = %self.id, error = %other, "read error, closing session");
                    }
                }
                break;
            }

            let header = Header::decode(&header_buf);
            if let Err(err) = header.validate(self.max_body) {
                tracing::warn!(session = %self.id, error = %err, "protocol violation, closing session");
                break;
            }

            let mut body = vec![0u8; header.length as usize];
            if header.length > 0 {
                if let Err(err) = read_half.read_exact(&mut body).await {
                    let err = FrameError::from(err);
                    tracing::debug!(session = %self.id, error = %err, "read error reading body, closing session");
                    break;
                }
            }

            self.last_activity.store(now_millis(), Ordering::Release);

            let dispatcher = self.dispatcher.clone();
            let session = self.clone();
            let session_id = self.id;
            // Concurrent per message: the read loop never awaits handler
            // completion, so a slow handler cannot stall ingress. The
            // handler itself is spawned as its own task so a panic inside
            // it surfaces as a `JoinError` here rather than unwinding into
            // the read loop — a handler exception is
            // logged and the session stays open.
            let handler_task = self.reactor.spawn(async move {
                dispatcher.dispatch(session, header, body).await;
            });
            self.reactor.spawn(async move {
                if let Err(err) = handler_task.await {
                    tracing::error!(session = %session_id, error = %err, "handler task panicked, continuing");
                }
            });
        }

        self.close().await;
    }

    async fn run_writer(&self, mut write_half: OwnedWriteHalf) {
        let mut write_failed = false;
        while let Some(frame) = self.send_queue.pop().await {
            if let Err(err) = write_half.write_all(&frame).await {
                tracing::debug!(session = %self.id, error = %err, "write error, closing session");
                write_failed = true;
                break;
            }
        }
        let _ = write_half.shutdown().await;
        if write_failed {
            self.close().await;
        }
    }

    async fn run_heartbeat(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(HEARTBEAT_TICK);
        ticker.tick().await; // first tick fires immediately, skip it
        loop {
            ticker.tick().await;
            if self.is_stopped() {
                return;
            }
            let idle_for = now_millis() - self.last_activity.load(Ordering::Acquire);
            if idle_for > HEARTBEAT_TIMEOUT_MS {
                tracing::info!(session = %self.id, idle_ms = idle_for, "heartbeat timeout, closing session");
                self.close().await;
                return;
            }
        }
    }

    /// Encodes `header`+`body` and enqueues onto the send queue. Drop-newest
    /// backpressure: a full queue logs a warning and silently drops, never
    /// blocking the caller.
    pub fn send(&self, header: Header, body: &[u8]) {
        if self.is_stopped() {
            return;
        }
        let frame = frame::encode(header, body);
        if self.send_queue.try_push(frame).is_err() {
            tracing::warn!(session = %self.id, "send queue full, dropping frame");
        }
    }

    /// Looks up a peer by UUID in the global session index and forwards
    /// `Send` to it. Returns `false` if no such session is currently open.
    /// Ordering into one peer from one sender is preserved (the peer's send
    /// queue is FIFO); ordering across distinct senders into the same peer
    /// is not guaranteed.
    pub fn send_to_other(&self, target: Uuid, header: Header, body: &[u8]) -> bool {
        match self.session_registry.get(&target) {
            Some(peer) => {
                peer.send(header, body);
                true
            }
            None => false,
        }
    }

    /// Idempotent: the CAS only succeeds once, so a second `close()` call is
    /// a no-op observed identically to the first.
    pub async fn close(&self) {
        if self
            .stopped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        self.session_registry.remove(&self.id);
        if let Some(info) = self.client_info.lock().clone() {
            self.client_registry.remove(&info.name);
        }
        if let Some(handle) = self.read_task.lock().take() {
            handle.abort();
        }
        self.send_queue.stop();
        stats::record_disconnect();
        let duration = chrono::Duration::milliseconds(now_millis() - self.connected_at);
        tracing::info!(
            session = %self.id,
            addr = %self.addr,
            duration = %crate::util::format_duration(&duration),
            "session closed"
        );
    }
}
