//! MTProto handshake and session state.
//!
//! This crate handles:
//! * Auth-key negotiation as a sans-IO step machine ([`handshake`])
//! * Message identifiers and plaintext framing ([`message`])
//! * Encrypted session state: sequencing, salts, pack/unpack ([`session`])
//!
//! It is intentionally transport-agnostic: bring your own byte pipe.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod handshake;
pub mod message;
pub mod session;

pub use message::{Message, MsgIdGen};
pub use session::{EncryptedSession, Session};
