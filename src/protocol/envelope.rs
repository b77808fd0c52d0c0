//! The uniform JSON response envelope business services embed in a frame's
//! body.

use serde::Serialize;
use serde_json::Value;

use super::frame::Header;

#[derive(Debug, Serialize)]
struct EnvelopeHeader {
    #[serde(rename = "serviceId")]
    service_id: u16,
    #[serde(rename = "cmdId")]
    cmd_id: u16,
    seq: u32,
}

#[derive(Debug, Serialize)]
struct Status {
    code: i32,
    message: String,
}

#[derive(Debug, Serialize)]
struct Envelope {
    header: EnvelopeHeader,
    status: Status,
    data: Value,
}

/// Business-level error codes used by the envelope's `status.code`.
pub mod status_code {
    pub const OK: i32 = 0;
    pub const DUPLICATE_CLIENT_NAME: i32 = 20001;
    pub const DB_ACQUIRE_TIMEOUT: i32 = 10001;
    pub const DB_POOL_NOT_FOUND: i32 = 10002;
    pub const DB_QUERY_FAILED: i32 = 10003;
    pub const UNKNOWN_CLIENT: i32 = 20002;
    pub const BAD_REQUEST: i32 = 40000;
}

/// Render a success envelope, echoing the request's routing fields.
pub fn ok(request: &Header, data: Value) -> Vec<u8> {
    envelope(request, status_code::OK, "ok", data)
}

/// Render a business-level error envelope, echoing the request's routing
/// fields. The transport does not close the connection for these.
pub fn error(request: &Header, code: i32, message: impl Into<String>) -> Vec<u8> {
    envelope(request, code, &message.into(), Value::Null)
}

fn envelope(request: &Header, code: i32, message: &str, data: Value) -> Vec<u8> {
    let envelope = Envelope {
        header: EnvelopeHeader {
            service_id: request.service_id,
            cmd_id: request.cmd_id,
            seq: request.seq,
        },
        status: Status {
            code,
            message: message.to_string(),
        },
        data,
    };
    serde_json::to_vec(&envelope).expect("envelope is always serializable")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_envelope_has_zero_status_code() {
        let req = Header {
            magic: super::super::frame::MAGIC,
            version: 1,
            service_id: 1,
            cmd_id: 1,
            length: 0,
            seq: 7,
        };
        let body = ok(&req, json!({"echo": "hi"}));
        let parsed: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["status"]["code"], 0);
        assert_eq!(parsed["header"]["seq"], 7);
        assert_eq!(parsed["data"]["echo"], "hi");
    }
}
