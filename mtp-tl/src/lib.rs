//! TL binary codec for the MTProto service schema.
//!
//! # Overview
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`serialize`]   | The two-phase [`Serializable`] trait and primitive impls  |
//! | [`deserialize`] | [`Deserializable`], the [`Cursor`] buffer, error type     |
//! | [`mtproto`]     | Hand-written service constructors (handshake + session)   |
//!
//! Serialization is two-phase by contract: [`Serializable::size`] measures
//! the exact encoded length without allocating, and
//! [`Serializable::to_bytes`] allocates that many bytes once and writes.
//! This lets the session layer precompute frame sizes before touching the
//! wire.
//!
//! ```rust
//! use mtp_tl::{Serializable, mtproto::functions::ReqPqMulti};
//!
//! let req = ReqPqMulti { nonce: [7u8; 16] };
//! let bytes = req.to_bytes();
//! assert_eq!(bytes.len(), req.size());
//! ```

#![deny(unsafe_code)]

pub mod deserialize;
pub mod mtproto;
pub mod serialize;

pub use deserialize::{Cursor, Deserializable};
pub use mtproto::{enums, functions, name_for_id, types};
pub use serialize::Serializable;

/// Bare vector — `vector` (lowercase) as opposed to the boxed `Vector`.
///
/// A length-prefixed list without the usual `0x1cb5c415` constructor ID
/// header. The service schema uses it inside `msg_container`.
#[derive(Clone, Debug, PartialEq)]
pub struct RawVec<T>(pub Vec<T>);

/// Opaque blob of bytes passed through without interpretation.
///
/// Used where the wire value is a fully encoded object whose type is only
/// known to the caller (e.g. the result payload of an RPC call).
#[derive(Clone, Debug, PartialEq)]
pub struct Blob(pub Vec<u8>);

impl From<Vec<u8>> for Blob {
    fn from(v: Vec<u8>) -> Self {
        Self(v)
    }
}

// ─── Core traits ──────────────────────────────────────────────────────────────

/// Every schema type has a unique 32-bit constructor ID.
pub trait Identifiable {
    /// The constructor ID as specified in the TL schema.
    const CONSTRUCTOR_ID: u32;
}

/// Marks a function type that can be sent to the server as an RPC call.
///
/// `Return` is the type the server will respond with.
pub trait RemoteCall: Serializable {
    /// The deserialized response type.
    type Return: Deserializable;
}
