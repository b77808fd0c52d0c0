//! Fixed binary header + opaque body framing (component A).
//!
//! The header is 20 bytes, 1-byte aligned, all integers big-endian on the
//! wire. We only ever byte-swap twice in a frame's lifetime: once on encode
//! (host -> network) and once on decode (network -> host). The header is
//! never touched again in between.

use bytes::{Buf, BufMut, BytesMut};

use crate::errors::FrameError;

/// Magic number identifying a valid frame.
pub const MAGIC: u16 = 0x55AA;

/// Header size on the wire, in bytes.
pub const HEADER_SIZE: usize = 20;

/// Default maximum body size: 64 KiB.
pub const DEFAULT_MAX_BODY: u32 = 64 * 1024;

/// Decoded, host-order header. Constructed fresh for every frame; never
/// mutated in place between network and host representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub magic: u16,
    pub version: u16,
    pub service_id: u16,
    pub cmd_id: u16,
    pub length: u32,
    pub seq: u32,
}

impl Header {
    /// Build a header for a response that echoes a request's routing
    /// fields, per the dispatcher contract in the protocol design.
    pub fn reply_to(request: &Header, length: u32) -> Header {
        Header {
            magic: MAGIC,
            version: request.version,
            service_id: request.service_id,
            cmd_id: request.cmd_id,
            length,
            seq: request.seq,
        }
    }

    /// Validate the invariants that must hold for every frame on valid
    /// ingress/egress: magic must match, and body length must not exceed
    /// the configured maximum.
    pub fn validate(&self, max_body: u32) -> Result<(), FrameError> {
        if self.magic != MAGIC {
            return Err(FrameError::BadMagic(self.magic));
        }
        if self.length > max_body {
            return Err(FrameError::BodyTooLarge(self.length, max_body));
        }
        Ok(())
    }

    /// Decode a header from its 20-byte network-order wire representation.
    pub fn decode(buf: &[u8; HEADER_SIZE]) -> Header {
        let mut cursor = &buf[..];
        Header {
            magic: cursor.get_u16(),
            version: cursor.get_u16(),
            service_id: cursor.get_u16(),
            cmd_id: cursor.get_u16(),
            length: cursor.get_u32(),
            seq: cursor.get_u32(),
        }
    }

    /// Encode this header into its 20-byte network-order wire representation.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE);
        buf.put_u16(self.magic);
        buf.put_u16(self.version);
        buf.put_u16(self.service_id);
        buf.put_u16(self.cmd_id);
        buf.put_u32(self.length);
        buf.put_u32(self.seq);
        let mut out = [0u8; HEADER_SIZE];
        out.copy_from_slice(&buf);
        out
    }
}

/// Encode a header and body into one contiguous send buffer. Length-preserving:
/// `encode(h, b).len() == HEADER_SIZE + b.len()`.
pub fn encode(mut header: Header, body: &[u8]) -> BytesMut {
    header.length = body.len() as u32;
    let mut out = BytesMut::with_capacity(HEADER_SIZE + body.len());
    out.extend_from_slice(&header.encode());
    out.extend_from_slice(body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header(length: u32) -> Header {
        Header {
            magic: MAGIC,
            version: 1,
            service_id: 3,
            cmd_id: 4,
            length,
            seq: 42,
        }
    }

    #[test]
    fn roundtrip_preserves_header_fields() {
        let header = sample_header(5);
        let wire = header.encode();
        let decoded = Header::decode(&wire);
        assert_eq!(decoded, header);
    }

    #[test]
    fn encode_is_length_preserving() {
        let header = sample_header(5);
        let body = b"hello";
        let buf = encode(header, body);
        assert_eq!(buf.len(), HEADER_SIZE + body.len());
        assert_eq!(&buf[HEADER_SIZE..], body);
    }

    #[test]
    fn validate_rejects_bad_magic() {
        let mut header = sample_header(0);
        header.magic = 0x1234;
        assert!(matches!(
            header.validate(DEFAULT_MAX_BODY),
            Err(FrameError::BadMagic(0x1234))
        ));
    }

    #[test]
    fn validate_rejects_oversize_body() {
        let header = sample_header(DEFAULT_MAX_BODY + 1);
        assert!(matches!(
            header.validate(DEFAULT_MAX_BODY),
            Err(FrameError::BodyTooLarge(_, _))
        ));
    }

    #[test]
    fn validate_accepts_body_at_exact_max() {
        let header = sample_header(DEFAULT_MAX_BODY);
        assert!(header.validate(DEFAULT_MAX_BODY).is_ok());
    }
}
