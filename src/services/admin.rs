//! `SERVICE_ADMIN`: lightweight in-process introspection, a SHOW-command
//! admin surface. This is observability, not a core protocol feature — it exists
//! so the server's own operators have a way to ask "how many clients, how
//! full are the DB pools" without attaching a debugger.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::db::DbExecutor;
use crate::net::session::Session;
use crate::protocol::{envelope, ids, Header};
use crate::stats::Snapshot;

use super::{Handler, Service};

pub struct AdminService {
    executor: Arc<DbExecutor>,
}

impl AdminService {
    pub fn new(executor: Arc<DbExecutor>) -> Self {
        Self { executor }
    }
}

impl Service for AdminService {
    fn service_id(&self) -> u16 {
        ids::SERVICE_ADMIN
    }

    fn register_cmds(self: Arc<Self>) -> HashMap<u16, Arc<dyn Handler>> {
        let mut cmds: HashMap<u16, Arc<dyn Handler>> = HashMap::new();
        cmds.insert(
            ids::ADMIN_SHOW_STATS,
            Arc::new(ShowStatsHandler {
                executor: self.executor.clone(),
            }),
        );
        cmds
    }
}

struct ShowStatsHandler {
    executor: Arc<DbExecutor>,
}

#[async_trait]
impl Handler for ShowStatsHandler {
    async fn handle(&self, session: Arc<Session>, header: Header, _body: Vec<u8>) {
        let reply_header = Header::reply_to(&header, 0);
        let snapshot = Snapshot::capture(&self.executor).await;
        let response = envelope::ok(&header, snapshot.to_json());
        session.send(reply_header, &response);
    }
}
