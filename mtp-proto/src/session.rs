//! Plaintext and encrypted session state.

use mtp_crypto::{AuthKey, decrypt_data_v2, encrypt_data_v2};

use crate::message::{Message, MsgIdGen};

/// Plaintext session used during the handshake phase.
///
/// Frames carry `auth_key_id = 0` and no sequence numbers; only message
/// ids are allocated, from the same generator the encrypted session will
/// inherit so that monotonicity spans the key exchange.
pub struct Session {
    id_gen: MsgIdGen,
}

impl Session {
    /// Create a fresh session with a known clock offset.
    pub fn new(time_offset: i32) -> Self {
        Self { id_gen: MsgIdGen::new(time_offset) }
    }

    /// Frame a serialized body as a plaintext message.
    pub fn pack(&mut self, body: Vec<u8>) -> (Vec<u8>, i64) {
        let msg_id = self.id_gen.next();
        let msg = Message { msg_id, seq_no: 0, body };
        (msg.to_plaintext_bytes(), msg_id)
    }

    /// Parse an incoming plaintext frame, returning `(msg_id, body)`.
    ///
    /// Returns `None` when the frame is too short or its `auth_key_id`
    /// is not zero.
    pub fn unpack(frame: &[u8]) -> Option<(i64, Vec<u8>)> {
        if frame.len() < 20 || frame[..8] != [0u8; 8] {
            return None;
        }
        let msg_id = i64::from_le_bytes(frame[8..16].try_into().unwrap());
        let len = u32::from_le_bytes(frame[16..20].try_into().unwrap()) as usize;
        if frame.len() < 20 + len {
            return None;
        }
        Some((msg_id, frame[20..20 + len].to_vec()))
    }

    /// Hand the id generator over to the encrypted session.
    pub fn into_id_gen(self) -> MsgIdGen {
        self.id_gen
    }

    /// Access the id generator (clock-offset updates).
    pub fn id_gen_mut(&mut self) -> &mut MsgIdGen {
        &mut self.id_gen
    }
}

// ─── Encrypted session ───────────────────────────────────────────────────────

/// Errors that can occur when decrypting a server frame.
#[derive(Debug, PartialEq)]
pub enum DecryptError {
    /// The underlying crypto layer rejected the frame.
    Crypto(mtp_crypto::DecryptError),
    /// The decrypted envelope was too short to contain a valid header.
    FrameTooShort,
    /// The envelope's session id does not match this session.
    SessionMismatch,
}

impl std::fmt::Display for DecryptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Crypto(e) => write!(f, "crypto: {e}"),
            Self::FrameTooShort => write!(f, "inner plaintext too short"),
            Self::SessionMismatch => write!(f, "session_id mismatch"),
        }
    }
}
impl std::error::Error for DecryptError {}

/// The inner payload extracted from a successfully decrypted frame.
#[derive(Debug, PartialEq)]
pub struct DecryptedMessage {
    /// `salt` sent by the server.
    pub salt: i64,
    /// The `msg_id` of the inner message.
    pub msg_id: i64,
    /// `seq_no` of the inner message.
    pub seq_no: i32,
    /// TL-serialized body of the inner message.
    pub body: Vec<u8>,
}

/// MTProto 2.0 encrypted session state.
///
/// Wraps an [`AuthKey`] and tracks the per-session counters (session id,
/// sequence counter, message id generator, server salt). Use
/// [`pack`](Self::pack) / [`pack_unrelated`](Self::pack_unrelated) for
/// outgoing envelopes and [`unpack`](Self::unpack) for incoming frames.
pub struct EncryptedSession {
    auth_key: AuthKey,
    session_id: i64,
    sequence: i32,
    id_gen: MsgIdGen,
    /// Current server salt to include in outgoing envelopes.
    pub salt: i64,
}

impl EncryptedSession {
    /// Create an encrypted session from a negotiated key and salt.
    pub fn new(auth_key: [u8; 256], first_salt: i64, id_gen: MsgIdGen) -> Self {
        let mut rnd = [0u8; 8];
        getrandom::getrandom(&mut rnd).expect("getrandom");
        Self {
            auth_key: AuthKey::from_bytes(auth_key),
            session_id: i64::from_le_bytes(rnd),
            sequence: 0,
            id_gen,
            salt: first_salt,
        }
    }

    /// Next sequence number: `counter * 2`, plus one (and a counter bump)
    /// for content-related messages.
    fn next_seq_no(&mut self, content_related: bool) -> i32 {
        if content_related {
            let n = self.sequence * 2 + 1;
            self.sequence += 1;
            n
        } else {
            self.sequence * 2
        }
    }

    fn pack_inner(&mut self, body: &[u8], content_related: bool) -> (Vec<u8>, i64) {
        let msg_id = self.id_gen.next();
        let seq_no = self.next_seq_no(content_related);

        let mut envelope = Vec::with_capacity(8 + 8 + 8 + 4 + 4 + body.len());
        envelope.extend(self.salt.to_le_bytes());
        envelope.extend(self.session_id.to_le_bytes());
        envelope.extend(msg_id.to_le_bytes());
        envelope.extend(seq_no.to_le_bytes());
        envelope.extend((body.len() as u32).to_le_bytes());
        envelope.extend_from_slice(body);

        (encrypt_data_v2(&envelope, &self.auth_key), msg_id)
    }

    /// Encrypt a content-related body (RPC call) into a wire frame.
    ///
    /// Returns `(frame, msg_id)` so the caller can register the pending
    /// call before the frame hits the wire.
    pub fn pack(&mut self, body: &[u8]) -> (Vec<u8>, i64) {
        self.pack_inner(body, true)
    }

    /// Encrypt a content-unrelated body (acks) into a wire frame.
    pub fn pack_unrelated(&mut self, body: &[u8]) -> (Vec<u8>, i64) {
        self.pack_inner(body, false)
    }

    /// Decrypt an incoming frame and split out the envelope header.
    pub fn unpack(&self, frame: &mut [u8]) -> Result<DecryptedMessage, DecryptError> {
        let plaintext = decrypt_data_v2(frame, &self.auth_key).map_err(DecryptError::Crypto)?;

        // envelope: salt(8) + session_id(8) + msg_id(8) + seq_no(4) + len(4) + body
        if plaintext.len() < 32 {
            return Err(DecryptError::FrameTooShort);
        }

        let salt = i64::from_le_bytes(plaintext[..8].try_into().unwrap());
        let session_id = i64::from_le_bytes(plaintext[8..16].try_into().unwrap());
        let msg_id = i64::from_le_bytes(plaintext[16..24].try_into().unwrap());
        let seq_no = i32::from_le_bytes(plaintext[24..28].try_into().unwrap());
        let body_len = u32::from_le_bytes(plaintext[28..32].try_into().unwrap()) as usize;

        if session_id != self.session_id {
            return Err(DecryptError::SessionMismatch);
        }
        if plaintext.len() - 32 < body_len {
            return Err(DecryptError::FrameTooShort);
        }

        let body = plaintext[32..32 + body_len].to_vec();
        Ok(DecryptedMessage { salt, msg_id, seq_no, body })
    }

    /// Start over after a reconnect: new session id, counters cleared.
    /// The auth key and salt survive.
    pub fn reset(&mut self) {
        let mut rnd = [0u8; 8];
        getrandom::getrandom(&mut rnd).expect("getrandom");
        self.session_id = i64::from_le_bytes(rnd);
        self.sequence = 0;
        self.id_gen.reset();
    }

    /// The auth key bytes (for persistence).
    pub fn auth_key_bytes(&self) -> [u8; 256] {
        self.auth_key.to_bytes()
    }

    /// The current session id.
    pub fn session_id(&self) -> i64 {
        self.session_id
    }

    /// Access the message id generator (clock resync).
    pub fn id_gen_mut(&mut self) -> &mut MsgIdGen {
        &mut self.id_gen
    }
}
