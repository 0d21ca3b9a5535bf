//! High-level MTProto RPC client.
//!
//! The crate splits into a sans-IO engine and a thin async shell:
//!
//! | Module        | Contents                                               |
//! |---------------|--------------------------------------------------------|
//! | [`rpc`]       | [`Rpc`], the per-endpoint protocol state machine       |
//! | [`client`]    | [`Client`], tokio driver tasks and the typed surface   |
//! | [`transport`] | The [`Transport`] collaborator seam                    |
//! | [`storage`]   | The [`Storage`] collaborator seam                      |
//! | [`endpoint`]  | Endpoint descriptors and bootstrap tables              |
//! | [`errors`]    | [`RpcError`] and [`InvocationError`]                   |
//!
//! The engine owns every protocol decision (handshake driving, pending-call
//! tracking, salt/clock recovery, ack batching); transports only move
//! opaque frames and storage only persists opaque bytes, so both are
//! trivially mockable.

#![deny(unsafe_code)]

pub mod client;
pub mod endpoint;
pub mod errors;
pub mod rpc;
pub mod storage;
pub mod transport;

pub use client::{Client, ConnectionParams, LAYER};
pub use endpoint::{Endpoint, endpoint_by_id, production_endpoints, test_endpoints};
pub use errors::{InvocationError, RpcError};
pub use rpc::{Rpc, ServerEvent};
pub use storage::{InMemoryStorage, Storage};
pub use transport::{Transport, TransportErrorKind, TransportEvent};
