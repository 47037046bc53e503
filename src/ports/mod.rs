//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the node and an external
//! system. Implementations live in `src/adapters/`.

pub mod transport;

pub use transport::{HttpReply, HttpRequest, HttpTransport};
