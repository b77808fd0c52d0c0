//! Stable service and command identifiers.

pub const SERVICE_HELLO: u16 = 1;
pub const SERVICE_DB: u16 = 2;
pub const SERVICE_COMMUNICATION: u16 = 3;
/// Distinct from the three business services above; handled inline by the
/// session read loop as a heartbeat-equivalent, not privileged on the wire.
pub const SERVICE_HEART: u16 = 4;
/// Not named in the original protocol table; added for the admin/introspection
/// surface.
pub const SERVICE_ADMIN: u16 = 5;

pub const HELLO_TEST: u16 = 1;

pub const DB_EXECUTE: u16 = 1;
pub const DB_CLOSE: u16 = 2;

pub const COMM_REGISTER: u16 = 1;
pub const COMM_CLOSE: u16 = 2;
pub const COMM_SEND: u16 = 3;
pub const COMM_SHOW: u16 = 4;

pub const HEART_RECV: u16 = 1;
pub const HEART_ACK: u16 = 2;

pub const ADMIN_SHOW_STATS: u16 = 1;
