//! Transport Layer for the Chat Connection
//!
//! Separates the connection mechanism from the session state machine:
//! - `InProcess`: direct channel communication (embedded backends, tests)
//! - `WebSocket`: the report chat backend's `/ws` endpoint
//!
//! A transport carries opaque text frames out and [`TransportEvent`]s in. It
//! never decodes, reorders or retries; decoding lives in [`crate::decoder`]
//! and sequencing in [`crate::session`].

pub mod in_process;
pub mod traits;
#[cfg(feature = "websocket")]
pub mod websocket;

// Re-exports for convenience
pub use in_process::InProcessTransport;
pub use traits::{ChatTransport, TransportError, TransportEvent};

#[cfg(feature = "websocket")]
pub use websocket::WebSocketTransport;
