//! Hand-written MTProto service schema.
//!
//! Unlike the API layer, the service schema (handshake and session
//! bookkeeping constructors) is small and frozen, so the definitions are
//! maintained by hand in the same shape code generation would produce:
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`types`]     | Concrete constructors as `struct`s                      |
//! | [`enums`]     | Boxed types as `enum`s over their constructors          |
//! | [`functions`] | Service calls as `struct`s implementing [`RemoteCall`]  |
//!
//! [`RemoteCall`]: crate::RemoteCall

use crate::deserialize::{Buffer, Error, Result};
use crate::{Deserializable, Identifiable, RemoteCall, Serializable};

/// Constructor IDs of envelope-level messages the session layer parses by
/// hand rather than through a schema type (their payloads embed values of
/// caller-determined type).
pub mod ids {
    pub const RPC_RESULT: u32 = 0xf35c6d01;
    pub const MSG_CONTAINER: u32 = 0x73f1f8dc;
    pub const GZIP_PACKED: u32 = 0x3072cfa1;
}

/// Concrete constructors.
pub mod types {
    use super::*;

    /// `resPQ#05162463`
    #[derive(Clone, Debug, PartialEq)]
    pub struct ResPq {
        pub nonce: [u8; 16],
        pub server_nonce: [u8; 16],
        pub pq: Vec<u8>,
        pub server_public_key_fingerprints: Vec<i64>,
    }

    /// `p_q_inner_data#83c95aec`
    #[derive(Clone, Debug, PartialEq)]
    pub struct PQInnerData {
        pub pq: Vec<u8>,
        pub p: Vec<u8>,
        pub q: Vec<u8>,
        pub nonce: [u8; 16],
        pub server_nonce: [u8; 16],
        pub new_nonce: [u8; 32],
    }

    /// `server_DH_params_fail#79cb045d`
    #[derive(Clone, Debug, PartialEq)]
    pub struct ServerDhParamsFail {
        pub nonce: [u8; 16],
        pub server_nonce: [u8; 16],
        pub new_nonce_hash: [u8; 16],
    }

    /// `server_DH_params_ok#d0e8075c`
    #[derive(Clone, Debug, PartialEq)]
    pub struct ServerDhParamsOk {
        pub nonce: [u8; 16],
        pub server_nonce: [u8; 16],
        pub encrypted_answer: Vec<u8>,
    }

    /// `server_DH_inner_data#b5890dba`
    #[derive(Clone, Debug, PartialEq)]
    pub struct ServerDhInnerData {
        pub nonce: [u8; 16],
        pub server_nonce: [u8; 16],
        pub g: i32,
        pub dh_prime: Vec<u8>,
        pub g_a: Vec<u8>,
        pub server_time: i32,
    }

    /// `client_DH_inner_data#6643b654`
    #[derive(Clone, Debug, PartialEq)]
    pub struct ClientDhInnerData {
        pub nonce: [u8; 16],
        pub server_nonce: [u8; 16],
        pub retry_id: i64,
        pub g_b: Vec<u8>,
    }

    /// `dh_gen_ok#3bcbf734`
    #[derive(Clone, Debug, PartialEq)]
    pub struct DhGenOk {
        pub nonce: [u8; 16],
        pub server_nonce: [u8; 16],
        pub new_nonce_hash1: [u8; 16],
    }

    /// `dh_gen_retry#46dc1fb9`
    #[derive(Clone, Debug, PartialEq)]
    pub struct DhGenRetry {
        pub nonce: [u8; 16],
        pub server_nonce: [u8; 16],
        pub new_nonce_hash2: [u8; 16],
    }

    /// `dh_gen_fail#a69dae02`
    #[derive(Clone, Debug, PartialEq)]
    pub struct DhGenFail {
        pub nonce: [u8; 16],
        pub server_nonce: [u8; 16],
        pub new_nonce_hash3: [u8; 16],
    }

    /// `rpc_error#2144ca19`
    #[derive(Clone, Debug, PartialEq)]
    pub struct RpcError {
        pub error_code: i32,
        pub error_message: String,
    }

    /// `pong#347773c5`
    #[derive(Clone, Debug, PartialEq)]
    pub struct Pong {
        pub msg_id: i64,
        pub ping_id: i64,
    }

    /// `msgs_ack#62d6b459`
    #[derive(Clone, Debug, PartialEq)]
    pub struct MsgsAck {
        pub msg_ids: Vec<i64>,
    }

    /// `bad_msg_notification#a7eff811`
    #[derive(Clone, Debug, PartialEq)]
    pub struct BadMsgNotification {
        pub bad_msg_id: i64,
        pub bad_msg_seqno: i32,
        pub error_code: i32,
    }

    /// `bad_server_salt#edab447b`
    #[derive(Clone, Debug, PartialEq)]
    pub struct BadServerSalt {
        pub bad_msg_id: i64,
        pub bad_msg_seqno: i32,
        pub error_code: i32,
        pub new_server_salt: i64,
    }

    /// `new_session_created#9ec20908`
    #[derive(Clone, Debug, PartialEq)]
    pub struct NewSessionCreated {
        pub first_msg_id: i64,
        pub unique_id: i64,
        pub server_salt: i64,
    }

    /// `auth.exportedAuthorization#b434e2b8`
    #[derive(Clone, Debug, PartialEq)]
    pub struct ExportedAuthorization {
        pub id: i64,
        pub bytes: Vec<u8>,
    }

    impl Identifiable for ResPq {
        const CONSTRUCTOR_ID: u32 = 0x05162463;
    }
    impl Identifiable for PQInnerData {
        const CONSTRUCTOR_ID: u32 = 0x83c95aec;
    }
    impl Identifiable for ServerDhParamsFail {
        const CONSTRUCTOR_ID: u32 = 0x79cb045d;
    }
    impl Identifiable for ServerDhParamsOk {
        const CONSTRUCTOR_ID: u32 = 0xd0e8075c;
    }
    impl Identifiable for ServerDhInnerData {
        const CONSTRUCTOR_ID: u32 = 0xb5890dba;
    }
    impl Identifiable for ClientDhInnerData {
        const CONSTRUCTOR_ID: u32 = 0x6643b654;
    }
    impl Identifiable for DhGenOk {
        const CONSTRUCTOR_ID: u32 = 0x3bcbf734;
    }
    impl Identifiable for DhGenRetry {
        const CONSTRUCTOR_ID: u32 = 0x46dc1fb9;
    }
    impl Identifiable for DhGenFail {
        const CONSTRUCTOR_ID: u32 = 0xa69dae02;
    }
    impl Identifiable for RpcError {
        const CONSTRUCTOR_ID: u32 = 0x2144ca19;
    }
    impl Identifiable for Pong {
        const CONSTRUCTOR_ID: u32 = 0x347773c5;
    }
    impl Identifiable for MsgsAck {
        const CONSTRUCTOR_ID: u32 = 0x62d6b459;
    }
    impl Identifiable for BadMsgNotification {
        const CONSTRUCTOR_ID: u32 = 0xa7eff811;
    }
    impl Identifiable for BadServerSalt {
        const CONSTRUCTOR_ID: u32 = 0xedab447b;
    }
    impl Identifiable for NewSessionCreated {
        const CONSTRUCTOR_ID: u32 = 0x9ec20908;
    }
    impl Identifiable for ExportedAuthorization {
        const CONSTRUCTOR_ID: u32 = 0xb434e2b8;
    }

    impl Serializable for ResPq {
        fn size(&self) -> usize {
            16 + 16 + self.pq.size() + self.server_public_key_fingerprints.size()
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            self.nonce.serialize(buf);
            self.server_nonce.serialize(buf);
            self.pq.serialize(buf);
            self.server_public_key_fingerprints.serialize(buf);
        }
    }

    impl Serializable for PQInnerData {
        fn size(&self) -> usize {
            self.pq.size() + self.p.size() + self.q.size() + 16 + 16 + 32
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            self.pq.serialize(buf);
            self.p.serialize(buf);
            self.q.serialize(buf);
            self.nonce.serialize(buf);
            self.server_nonce.serialize(buf);
            self.new_nonce.serialize(buf);
        }
    }

    impl Serializable for ServerDhParamsFail {
        fn size(&self) -> usize {
            16 + 16 + 16
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            self.nonce.serialize(buf);
            self.server_nonce.serialize(buf);
            self.new_nonce_hash.serialize(buf);
        }
    }

    impl Serializable for ServerDhParamsOk {
        fn size(&self) -> usize {
            16 + 16 + self.encrypted_answer.size()
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            self.nonce.serialize(buf);
            self.server_nonce.serialize(buf);
            self.encrypted_answer.serialize(buf);
        }
    }

    impl Serializable for ServerDhInnerData {
        fn size(&self) -> usize {
            16 + 16 + 4 + self.dh_prime.size() + self.g_a.size() + 4
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            self.nonce.serialize(buf);
            self.server_nonce.serialize(buf);
            self.g.serialize(buf);
            self.dh_prime.serialize(buf);
            self.g_a.serialize(buf);
            self.server_time.serialize(buf);
        }
    }

    impl Serializable for ClientDhInnerData {
        fn size(&self) -> usize {
            16 + 16 + 8 + self.g_b.size()
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            self.nonce.serialize(buf);
            self.server_nonce.serialize(buf);
            self.retry_id.serialize(buf);
            self.g_b.serialize(buf);
        }
    }

    impl Serializable for DhGenOk {
        fn size(&self) -> usize {
            16 + 16 + 16
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            self.nonce.serialize(buf);
            self.server_nonce.serialize(buf);
            self.new_nonce_hash1.serialize(buf);
        }
    }

    impl Serializable for DhGenRetry {
        fn size(&self) -> usize {
            16 + 16 + 16
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            self.nonce.serialize(buf);
            self.server_nonce.serialize(buf);
            self.new_nonce_hash2.serialize(buf);
        }
    }

    impl Serializable for DhGenFail {
        fn size(&self) -> usize {
            16 + 16 + 16
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            self.nonce.serialize(buf);
            self.server_nonce.serialize(buf);
            self.new_nonce_hash3.serialize(buf);
        }
    }

    impl Serializable for RpcError {
        fn size(&self) -> usize {
            4 + self.error_message.size()
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            self.error_code.serialize(buf);
            self.error_message.serialize(buf);
        }
    }

    impl Serializable for Pong {
        fn size(&self) -> usize {
            16
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            self.msg_id.serialize(buf);
            self.ping_id.serialize(buf);
        }
    }

    impl Serializable for MsgsAck {
        fn size(&self) -> usize {
            self.msg_ids.size()
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            self.msg_ids.serialize(buf);
        }
    }

    impl Serializable for BadMsgNotification {
        fn size(&self) -> usize {
            16
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            self.bad_msg_id.serialize(buf);
            self.bad_msg_seqno.serialize(buf);
            self.error_code.serialize(buf);
        }
    }

    impl Serializable for BadServerSalt {
        fn size(&self) -> usize {
            24
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            self.bad_msg_id.serialize(buf);
            self.bad_msg_seqno.serialize(buf);
            self.error_code.serialize(buf);
            self.new_server_salt.serialize(buf);
        }
    }

    impl Serializable for NewSessionCreated {
        fn size(&self) -> usize {
            24
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            self.first_msg_id.serialize(buf);
            self.unique_id.serialize(buf);
            self.server_salt.serialize(buf);
        }
    }

    impl Serializable for ExportedAuthorization {
        fn size(&self) -> usize {
            8 + self.bytes.size()
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            self.id.serialize(buf);
            self.bytes.serialize(buf);
        }
    }

    impl Deserializable for ResPq {
        fn deserialize(buf: Buffer) -> Result<Self> {
            Ok(Self {
                nonce: <[u8; 16]>::deserialize(buf)?,
                server_nonce: <[u8; 16]>::deserialize(buf)?,
                pq: Vec::<u8>::deserialize(buf)?,
                server_public_key_fingerprints: Vec::<i64>::deserialize(buf)?,
            })
        }
    }

    impl Deserializable for PQInnerData {
        fn deserialize(buf: Buffer) -> Result<Self> {
            Ok(Self {
                pq: Vec::<u8>::deserialize(buf)?,
                p: Vec::<u8>::deserialize(buf)?,
                q: Vec::<u8>::deserialize(buf)?,
                nonce: <[u8; 16]>::deserialize(buf)?,
                server_nonce: <[u8; 16]>::deserialize(buf)?,
                new_nonce: <[u8; 32]>::deserialize(buf)?,
            })
        }
    }

    impl Deserializable for ServerDhParamsFail {
        fn deserialize(buf: Buffer) -> Result<Self> {
            Ok(Self {
                nonce: <[u8; 16]>::deserialize(buf)?,
                server_nonce: <[u8; 16]>::deserialize(buf)?,
                new_nonce_hash: <[u8; 16]>::deserialize(buf)?,
            })
        }
    }

    impl Deserializable for ServerDhParamsOk {
        fn deserialize(buf: Buffer) -> Result<Self> {
            Ok(Self {
                nonce: <[u8; 16]>::deserialize(buf)?,
                server_nonce: <[u8; 16]>::deserialize(buf)?,
                encrypted_answer: Vec::<u8>::deserialize(buf)?,
            })
        }
    }

    impl Deserializable for ServerDhInnerData {
        fn deserialize(buf: Buffer) -> Result<Self> {
            Ok(Self {
                nonce: <[u8; 16]>::deserialize(buf)?,
                server_nonce: <[u8; 16]>::deserialize(buf)?,
                g: i32::deserialize(buf)?,
                dh_prime: Vec::<u8>::deserialize(buf)?,
                g_a: Vec::<u8>::deserialize(buf)?,
                server_time: i32::deserialize(buf)?,
            })
        }
    }

    impl Deserializable for ClientDhInnerData {
        fn deserialize(buf: Buffer) -> Result<Self> {
            Ok(Self {
                nonce: <[u8; 16]>::deserialize(buf)?,
                server_nonce: <[u8; 16]>::deserialize(buf)?,
                retry_id: i64::deserialize(buf)?,
                g_b: Vec::<u8>::deserialize(buf)?,
            })
        }
    }

    impl Deserializable for DhGenOk {
        fn deserialize(buf: Buffer) -> Result<Self> {
            Ok(Self {
                nonce: <[u8; 16]>::deserialize(buf)?,
                server_nonce: <[u8; 16]>::deserialize(buf)?,
                new_nonce_hash1: <[u8; 16]>::deserialize(buf)?,
            })
        }
    }

    impl Deserializable for DhGenRetry {
        fn deserialize(buf: Buffer) -> Result<Self> {
            Ok(Self {
                nonce: <[u8; 16]>::deserialize(buf)?,
                server_nonce: <[u8; 16]>::deserialize(buf)?,
                new_nonce_hash2: <[u8; 16]>::deserialize(buf)?,
            })
        }
    }

    impl Deserializable for DhGenFail {
        fn deserialize(buf: Buffer) -> Result<Self> {
            Ok(Self {
                nonce: <[u8; 16]>::deserialize(buf)?,
                server_nonce: <[u8; 16]>::deserialize(buf)?,
                new_nonce_hash3: <[u8; 16]>::deserialize(buf)?,
            })
        }
    }

    impl Deserializable for RpcError {
        fn deserialize(buf: Buffer) -> Result<Self> {
            Ok(Self {
                error_code: i32::deserialize(buf)?,
                error_message: String::deserialize(buf)?,
            })
        }
    }

    impl Deserializable for Pong {
        fn deserialize(buf: Buffer) -> Result<Self> {
            Ok(Self {
                msg_id: i64::deserialize(buf)?,
                ping_id: i64::deserialize(buf)?,
            })
        }
    }

    impl Deserializable for MsgsAck {
        fn deserialize(buf: Buffer) -> Result<Self> {
            Ok(Self {
                msg_ids: Vec::<i64>::deserialize(buf)?,
            })
        }
    }

    impl Deserializable for BadMsgNotification {
        fn deserialize(buf: Buffer) -> Result<Self> {
            Ok(Self {
                bad_msg_id: i64::deserialize(buf)?,
                bad_msg_seqno: i32::deserialize(buf)?,
                error_code: i32::deserialize(buf)?,
            })
        }
    }

    impl Deserializable for BadServerSalt {
        fn deserialize(buf: Buffer) -> Result<Self> {
            Ok(Self {
                bad_msg_id: i64::deserialize(buf)?,
                bad_msg_seqno: i32::deserialize(buf)?,
                error_code: i32::deserialize(buf)?,
                new_server_salt: i64::deserialize(buf)?,
            })
        }
    }

    impl Deserializable for NewSessionCreated {
        fn deserialize(buf: Buffer) -> Result<Self> {
            Ok(Self {
                first_msg_id: i64::deserialize(buf)?,
                unique_id: i64::deserialize(buf)?,
                server_salt: i64::deserialize(buf)?,
            })
        }
    }

    impl Deserializable for ExportedAuthorization {
        fn deserialize(buf: Buffer) -> Result<Self> {
            Ok(Self {
                id: i64::deserialize(buf)?,
                bytes: Vec::<u8>::deserialize(buf)?,
            })
        }
    }
}

/// Boxed types, deserialized by constructor ID dispatch.
pub mod enums {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    pub enum ResPq {
        ResPq(types::ResPq),
    }

    #[derive(Clone, Debug, PartialEq)]
    pub enum PQInnerData {
        PQInnerData(types::PQInnerData),
    }

    #[derive(Clone, Debug, PartialEq)]
    pub enum ServerDhParams {
        Fail(types::ServerDhParamsFail),
        Ok(types::ServerDhParamsOk),
    }

    #[derive(Clone, Debug, PartialEq)]
    pub enum ServerDhInnerData {
        ServerDhInnerData(types::ServerDhInnerData),
    }

    #[derive(Clone, Debug, PartialEq)]
    pub enum ClientDhInnerData {
        ClientDhInnerData(types::ClientDhInnerData),
    }

    #[derive(Clone, Debug, PartialEq)]
    pub enum SetClientDhParamsAnswer {
        DhGenOk(types::DhGenOk),
        DhGenRetry(types::DhGenRetry),
        DhGenFail(types::DhGenFail),
    }

    /// `bad_msg_notification` and `bad_server_salt` share a boxed type.
    #[derive(Clone, Debug, PartialEq)]
    pub enum BadMsgNotification {
        Notification(types::BadMsgNotification),
        ServerSalt(types::BadServerSalt),
    }

    #[derive(Clone, Debug, PartialEq)]
    pub enum Pong {
        Pong(types::Pong),
    }

    #[derive(Clone, Debug, PartialEq)]
    pub enum MsgsAck {
        MsgsAck(types::MsgsAck),
    }

    #[derive(Clone, Debug, PartialEq)]
    pub enum NewSessionCreated {
        NewSessionCreated(types::NewSessionCreated),
    }

    #[derive(Clone, Debug, PartialEq)]
    pub enum RpcError {
        RpcError(types::RpcError),
    }

    #[derive(Clone, Debug, PartialEq)]
    pub enum ExportedAuthorization {
        ExportedAuthorization(types::ExportedAuthorization),
    }

    impl Serializable for ResPq {
        fn size(&self) -> usize {
            let Self::ResPq(x) = self;
            4 + x.size()
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            let Self::ResPq(x) = self;
            types::ResPq::CONSTRUCTOR_ID.serialize(buf);
            x.serialize(buf);
        }
    }

    impl Serializable for PQInnerData {
        fn size(&self) -> usize {
            let Self::PQInnerData(x) = self;
            4 + x.size()
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            let Self::PQInnerData(x) = self;
            types::PQInnerData::CONSTRUCTOR_ID.serialize(buf);
            x.serialize(buf);
        }
    }

    impl Serializable for ServerDhParams {
        fn size(&self) -> usize {
            4 + match self {
                Self::Fail(x) => x.size(),
                Self::Ok(x) => x.size(),
            }
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            match self {
                Self::Fail(x) => {
                    types::ServerDhParamsFail::CONSTRUCTOR_ID.serialize(buf);
                    x.serialize(buf);
                }
                Self::Ok(x) => {
                    types::ServerDhParamsOk::CONSTRUCTOR_ID.serialize(buf);
                    x.serialize(buf);
                }
            }
        }
    }

    impl Serializable for ServerDhInnerData {
        fn size(&self) -> usize {
            let Self::ServerDhInnerData(x) = self;
            4 + x.size()
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            let Self::ServerDhInnerData(x) = self;
            types::ServerDhInnerData::CONSTRUCTOR_ID.serialize(buf);
            x.serialize(buf);
        }
    }

    impl Serializable for ClientDhInnerData {
        fn size(&self) -> usize {
            let Self::ClientDhInnerData(x) = self;
            4 + x.size()
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            let Self::ClientDhInnerData(x) = self;
            types::ClientDhInnerData::CONSTRUCTOR_ID.serialize(buf);
            x.serialize(buf);
        }
    }

    impl Serializable for SetClientDhParamsAnswer {
        fn size(&self) -> usize {
            4 + match self {
                Self::DhGenOk(x) => x.size(),
                Self::DhGenRetry(x) => x.size(),
                Self::DhGenFail(x) => x.size(),
            }
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            match self {
                Self::DhGenOk(x) => {
                    types::DhGenOk::CONSTRUCTOR_ID.serialize(buf);
                    x.serialize(buf);
                }
                Self::DhGenRetry(x) => {
                    types::DhGenRetry::CONSTRUCTOR_ID.serialize(buf);
                    x.serialize(buf);
                }
                Self::DhGenFail(x) => {
                    types::DhGenFail::CONSTRUCTOR_ID.serialize(buf);
                    x.serialize(buf);
                }
            }
        }
    }

    impl Serializable for BadMsgNotification {
        fn size(&self) -> usize {
            4 + match self {
                Self::Notification(x) => x.size(),
                Self::ServerSalt(x) => x.size(),
            }
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            match self {
                Self::Notification(x) => {
                    types::BadMsgNotification::CONSTRUCTOR_ID.serialize(buf);
                    x.serialize(buf);
                }
                Self::ServerSalt(x) => {
                    types::BadServerSalt::CONSTRUCTOR_ID.serialize(buf);
                    x.serialize(buf);
                }
            }
        }
    }

    impl Serializable for Pong {
        fn size(&self) -> usize {
            let Self::Pong(x) = self;
            4 + x.size()
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            let Self::Pong(x) = self;
            types::Pong::CONSTRUCTOR_ID.serialize(buf);
            x.serialize(buf);
        }
    }

    impl Serializable for MsgsAck {
        fn size(&self) -> usize {
            let Self::MsgsAck(x) = self;
            4 + x.size()
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            let Self::MsgsAck(x) = self;
            types::MsgsAck::CONSTRUCTOR_ID.serialize(buf);
            x.serialize(buf);
        }
    }

    impl Serializable for NewSessionCreated {
        fn size(&self) -> usize {
            let Self::NewSessionCreated(x) = self;
            4 + x.size()
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            let Self::NewSessionCreated(x) = self;
            types::NewSessionCreated::CONSTRUCTOR_ID.serialize(buf);
            x.serialize(buf);
        }
    }

    impl Serializable for RpcError {
        fn size(&self) -> usize {
            let Self::RpcError(x) = self;
            4 + x.size()
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            let Self::RpcError(x) = self;
            types::RpcError::CONSTRUCTOR_ID.serialize(buf);
            x.serialize(buf);
        }
    }

    impl Serializable for ExportedAuthorization {
        fn size(&self) -> usize {
            let Self::ExportedAuthorization(x) = self;
            4 + x.size()
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            let Self::ExportedAuthorization(x) = self;
            types::ExportedAuthorization::CONSTRUCTOR_ID.serialize(buf);
            x.serialize(buf);
        }
    }

    impl Deserializable for ResPq {
        fn deserialize(buf: Buffer) -> Result<Self> {
            match u32::deserialize(buf)? {
                types::ResPq::CONSTRUCTOR_ID => {
                    Ok(Self::ResPq(types::ResPq::deserialize(buf)?))
                }
                id => Err(Error::UnexpectedConstructor { id }),
            }
        }
    }

    impl Deserializable for PQInnerData {
        fn deserialize(buf: Buffer) -> Result<Self> {
            match u32::deserialize(buf)? {
                types::PQInnerData::CONSTRUCTOR_ID => {
                    Ok(Self::PQInnerData(types::PQInnerData::deserialize(buf)?))
                }
                id => Err(Error::UnexpectedConstructor { id }),
            }
        }
    }

    impl Deserializable for ServerDhParams {
        fn deserialize(buf: Buffer) -> Result<Self> {
            match u32::deserialize(buf)? {
                types::ServerDhParamsFail::CONSTRUCTOR_ID => {
                    Ok(Self::Fail(types::ServerDhParamsFail::deserialize(buf)?))
                }
                types::ServerDhParamsOk::CONSTRUCTOR_ID => {
                    Ok(Self::Ok(types::ServerDhParamsOk::deserialize(buf)?))
                }
                id => Err(Error::UnexpectedConstructor { id }),
            }
        }
    }

    impl Deserializable for ServerDhInnerData {
        fn deserialize(buf: Buffer) -> Result<Self> {
            match u32::deserialize(buf)? {
                types::ServerDhInnerData::CONSTRUCTOR_ID => Ok(Self::ServerDhInnerData(
                    types::ServerDhInnerData::deserialize(buf)?,
                )),
                id => Err(Error::UnexpectedConstructor { id }),
            }
        }
    }

    impl Deserializable for ClientDhInnerData {
        fn deserialize(buf: Buffer) -> Result<Self> {
            match u32::deserialize(buf)? {
                types::ClientDhInnerData::CONSTRUCTOR_ID => Ok(Self::ClientDhInnerData(
                    types::ClientDhInnerData::deserialize(buf)?,
                )),
                id => Err(Error::UnexpectedConstructor { id }),
            }
        }
    }

    impl Deserializable for SetClientDhParamsAnswer {
        fn deserialize(buf: Buffer) -> Result<Self> {
            match u32::deserialize(buf)? {
                types::DhGenOk::CONSTRUCTOR_ID => {
                    Ok(Self::DhGenOk(types::DhGenOk::deserialize(buf)?))
                }
                types::DhGenRetry::CONSTRUCTOR_ID => {
                    Ok(Self::DhGenRetry(types::DhGenRetry::deserialize(buf)?))
                }
                types::DhGenFail::CONSTRUCTOR_ID => {
                    Ok(Self::DhGenFail(types::DhGenFail::deserialize(buf)?))
                }
                id => Err(Error::UnexpectedConstructor { id }),
            }
        }
    }

    impl Deserializable for BadMsgNotification {
        fn deserialize(buf: Buffer) -> Result<Self> {
            match u32::deserialize(buf)? {
                types::BadMsgNotification::CONSTRUCTOR_ID => Ok(Self::Notification(
                    types::BadMsgNotification::deserialize(buf)?,
                )),
                types::BadServerSalt::CONSTRUCTOR_ID => {
                    Ok(Self::ServerSalt(types::BadServerSalt::deserialize(buf)?))
                }
                id => Err(Error::UnexpectedConstructor { id }),
            }
        }
    }

    impl Deserializable for Pong {
        fn deserialize(buf: Buffer) -> Result<Self> {
            match u32::deserialize(buf)? {
                types::Pong::CONSTRUCTOR_ID => Ok(Self::Pong(types::Pong::deserialize(buf)?)),
                id => Err(Error::UnexpectedConstructor { id }),
            }
        }
    }

    impl Deserializable for MsgsAck {
        fn deserialize(buf: Buffer) -> Result<Self> {
            match u32::deserialize(buf)? {
                types::MsgsAck::CONSTRUCTOR_ID => {
                    Ok(Self::MsgsAck(types::MsgsAck::deserialize(buf)?))
                }
                id => Err(Error::UnexpectedConstructor { id }),
            }
        }
    }

    impl Deserializable for NewSessionCreated {
        fn deserialize(buf: Buffer) -> Result<Self> {
            match u32::deserialize(buf)? {
                types::NewSessionCreated::CONSTRUCTOR_ID => Ok(Self::NewSessionCreated(
                    types::NewSessionCreated::deserialize(buf)?,
                )),
                id => Err(Error::UnexpectedConstructor { id }),
            }
        }
    }

    impl Deserializable for RpcError {
        fn deserialize(buf: Buffer) -> Result<Self> {
            match u32::deserialize(buf)? {
                types::RpcError::CONSTRUCTOR_ID => {
                    Ok(Self::RpcError(types::RpcError::deserialize(buf)?))
                }
                id => Err(Error::UnexpectedConstructor { id }),
            }
        }
    }

    impl Deserializable for ExportedAuthorization {
        fn deserialize(buf: Buffer) -> Result<Self> {
            match u32::deserialize(buf)? {
                types::ExportedAuthorization::CONSTRUCTOR_ID => Ok(Self::ExportedAuthorization(
                    types::ExportedAuthorization::deserialize(buf)?,
                )),
                id => Err(Error::UnexpectedConstructor { id }),
            }
        }
    }
}

/// Service calls.
pub mod functions {
    use super::*;

    /// `req_pq_multi#be7e8ef1`
    #[derive(Clone, Debug, PartialEq)]
    pub struct ReqPqMulti {
        pub nonce: [u8; 16],
    }

    /// `req_DH_params#d712e4be`
    #[derive(Clone, Debug, PartialEq)]
    pub struct ReqDhParams {
        pub nonce: [u8; 16],
        pub server_nonce: [u8; 16],
        pub p: Vec<u8>,
        pub q: Vec<u8>,
        pub public_key_fingerprint: i64,
        pub encrypted_data: Vec<u8>,
    }

    /// `set_client_DH_params#f5045f1f`
    #[derive(Clone, Debug, PartialEq)]
    pub struct SetClientDhParams {
        pub nonce: [u8; 16],
        pub server_nonce: [u8; 16],
        pub encrypted_data: Vec<u8>,
    }

    /// `ping#7abe77ec`
    #[derive(Clone, Debug, PartialEq)]
    pub struct Ping {
        pub ping_id: i64,
    }

    /// `auth.exportAuthorization#e5bfffcd`
    #[derive(Clone, Debug, PartialEq)]
    pub struct ExportAuthorization {
        pub dc_id: i32,
    }

    /// `auth.importAuthorization#a57a7dad`
    #[derive(Clone, Debug, PartialEq)]
    pub struct ImportAuthorization {
        pub id: i64,
        pub bytes: Vec<u8>,
    }

    /// `invokeWithLayer#da9b0d0d` — wraps `query` with an API layer number.
    #[derive(Clone, Debug, PartialEq)]
    pub struct InvokeWithLayer<Q> {
        pub layer: i32,
        pub query: Q,
    }

    /// `initConnection#c1cd5ea9` — client identification wrapper.
    ///
    /// The optional `proxy`/`params` fields of the schema are never sent,
    /// so the flags word is always zero.
    #[derive(Clone, Debug, PartialEq)]
    pub struct InitConnection<Q> {
        pub api_id: i32,
        pub device_model: String,
        pub system_version: String,
        pub app_version: String,
        pub system_lang_code: String,
        pub lang_pack: String,
        pub lang_code: String,
        pub query: Q,
    }

    impl Identifiable for ReqPqMulti {
        const CONSTRUCTOR_ID: u32 = 0xbe7e8ef1;
    }
    impl Identifiable for ReqDhParams {
        const CONSTRUCTOR_ID: u32 = 0xd712e4be;
    }
    impl Identifiable for SetClientDhParams {
        const CONSTRUCTOR_ID: u32 = 0xf5045f1f;
    }
    impl Identifiable for Ping {
        const CONSTRUCTOR_ID: u32 = 0x7abe77ec;
    }
    impl Identifiable for ExportAuthorization {
        const CONSTRUCTOR_ID: u32 = 0xe5bfffcd;
    }
    impl Identifiable for ImportAuthorization {
        const CONSTRUCTOR_ID: u32 = 0xa57a7dad;
    }
    impl<Q> Identifiable for InvokeWithLayer<Q> {
        const CONSTRUCTOR_ID: u32 = 0xda9b0d0d;
    }
    impl<Q> Identifiable for InitConnection<Q> {
        const CONSTRUCTOR_ID: u32 = 0xc1cd5ea9;
    }

    impl Serializable for ReqPqMulti {
        fn size(&self) -> usize {
            4 + 16
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            Self::CONSTRUCTOR_ID.serialize(buf);
            self.nonce.serialize(buf);
        }
    }

    impl Serializable for ReqDhParams {
        fn size(&self) -> usize {
            4 + 16 + 16 + self.p.size() + self.q.size() + 8 + self.encrypted_data.size()
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            Self::CONSTRUCTOR_ID.serialize(buf);
            self.nonce.serialize(buf);
            self.server_nonce.serialize(buf);
            self.p.serialize(buf);
            self.q.serialize(buf);
            self.public_key_fingerprint.serialize(buf);
            self.encrypted_data.serialize(buf);
        }
    }

    impl Serializable for SetClientDhParams {
        fn size(&self) -> usize {
            4 + 16 + 16 + self.encrypted_data.size()
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            Self::CONSTRUCTOR_ID.serialize(buf);
            self.nonce.serialize(buf);
            self.server_nonce.serialize(buf);
            self.encrypted_data.serialize(buf);
        }
    }

    impl Serializable for Ping {
        fn size(&self) -> usize {
            4 + 8
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            Self::CONSTRUCTOR_ID.serialize(buf);
            self.ping_id.serialize(buf);
        }
    }

    impl Serializable for ExportAuthorization {
        fn size(&self) -> usize {
            4 + 4
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            Self::CONSTRUCTOR_ID.serialize(buf);
            self.dc_id.serialize(buf);
        }
    }

    impl Serializable for ImportAuthorization {
        fn size(&self) -> usize {
            4 + 8 + self.bytes.size()
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            Self::CONSTRUCTOR_ID.serialize(buf);
            self.id.serialize(buf);
            self.bytes.serialize(buf);
        }
    }

    impl<Q: Serializable> Serializable for InvokeWithLayer<Q> {
        fn size(&self) -> usize {
            4 + 4 + self.query.size()
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            Self::CONSTRUCTOR_ID.serialize(buf);
            self.layer.serialize(buf);
            self.query.serialize(buf);
        }
    }

    impl<Q: Serializable> Serializable for InitConnection<Q> {
        fn size(&self) -> usize {
            4 + 4
                + 4
                + self.device_model.size()
                + self.system_version.size()
                + self.app_version.size()
                + self.system_lang_code.size()
                + self.lang_pack.size()
                + self.lang_code.size()
                + self.query.size()
        }

        fn serialize(&self, buf: &mut impl Extend<u8>) {
            Self::CONSTRUCTOR_ID.serialize(buf);
            0u32.serialize(buf); // flags: no proxy, no params
            self.api_id.serialize(buf);
            self.device_model.serialize(buf);
            self.system_version.serialize(buf);
            self.app_version.serialize(buf);
            self.system_lang_code.serialize(buf);
            self.lang_pack.serialize(buf);
            self.lang_code.serialize(buf);
            self.query.serialize(buf);
        }
    }

    impl RemoteCall for ReqPqMulti {
        type Return = enums::ResPq;
    }
    impl RemoteCall for ReqDhParams {
        type Return = enums::ServerDhParams;
    }
    impl RemoteCall for SetClientDhParams {
        type Return = enums::SetClientDhParamsAnswer;
    }
    impl RemoteCall for Ping {
        type Return = enums::Pong;
    }
    impl RemoteCall for ExportAuthorization {
        type Return = enums::ExportedAuthorization;
    }
    impl RemoteCall for ImportAuthorization {
        type Return = crate::Blob;
    }
    impl<Q: RemoteCall> RemoteCall for InvokeWithLayer<Q> {
        type Return = Q::Return;
    }
    impl<Q: RemoteCall> RemoteCall for InitConnection<Q> {
        type Return = Q::Return;
    }
}

/// Look up the schema name for a constructor ID.
///
/// Covers every ID in this module plus the codec-level ones (`Vector`,
/// the two `Bool` constructors, the envelope IDs). Used for diagnostics
/// when an unknown or unexpected ID is read off the wire.
pub fn name_for_id(id: u32) -> Option<&'static str> {
    Some(match id {
        0x1cb5c415 => "vector",
        0x997275b5 => "boolTrue",
        0xbc799737 => "boolFalse",
        0x05162463 => "resPQ",
        0x83c95aec => "p_q_inner_data",
        0x79cb045d => "server_DH_params_fail",
        0xd0e8075c => "server_DH_params_ok",
        0xb5890dba => "server_DH_inner_data",
        0x6643b654 => "client_DH_inner_data",
        0x3bcbf734 => "dh_gen_ok",
        0x46dc1fb9 => "dh_gen_retry",
        0xa69dae02 => "dh_gen_fail",
        0xf35c6d01 => "rpc_result",
        0x2144ca19 => "rpc_error",
        0x73f1f8dc => "msg_container",
        0x3072cfa1 => "gzip_packed",
        0x62d6b459 => "msgs_ack",
        0xa7eff811 => "bad_msg_notification",
        0xedab447b => "bad_server_salt",
        0x9ec20908 => "new_session_created",
        0x347773c5 => "pong",
        0xbe7e8ef1 => "req_pq_multi",
        0xd712e4be => "req_DH_params",
        0xf5045f1f => "set_client_DH_params",
        0x7abe77ec => "ping",
        0xe5bfffcd => "auth.exportAuthorization",
        0xb434e2b8 => "auth.exportedAuthorization",
        0xa57a7dad => "auth.importAuthorization",
        0xda9b0d0d => "invokeWithLayer",
        0xc1cd5ea9 => "initConnection",
        _ => return None,
    })
}
