//! The wire protocol: fixed binary header framing (component A) plus the
//! JSON envelope business services render into a frame's body.

pub mod envelope;
pub mod frame;
pub mod ids;

pub use frame::{Header, DEFAULT_MAX_BODY, HEADER_SIZE, MAGIC};
