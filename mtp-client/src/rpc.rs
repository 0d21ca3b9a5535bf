//! The per-endpoint RPC engine.
//!
//! [`Rpc`] is a sans-IO state machine: the owner feeds it
//! [`TransportEvent`]s and ack-deadline ticks, and it writes frames through
//! the [`Transport`] it was given. All session state (handshake progress,
//! pending calls, the ack set) is mutated only from these entry points, so
//! a single owning task preserves the single-writer invariant.

use std::collections::VecDeque;
use std::io::Read;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot};

use mtp_proto::handshake::{self, NextStep};
use mtp_proto::{EncryptedSession, MsgIdGen, Session};
use mtp_tl::mtproto::ids;
use mtp_tl::{Cursor, Deserializable, Identifiable, Serializable, enums, name_for_id, types};

use crate::errors::{InvocationError, RpcError};
use crate::storage::{self, Storage};
use crate::transport::{Transport, TransportErrorKind, TransportEvent};

/// Delay before a batched ack frame goes out, collapsing bursts.
const ACK_FLUSH_DELAY: Duration = Duration::from_millis(500);

/// How many `dh_gen_retry` rounds are attempted before the handshake is
/// abandoned.
const MAX_DH_RETRIES: u8 = 5;

/// Result channel handed back to callers of [`Rpc::call`].
pub type CallReceiver = oneshot::Receiver<Result<Vec<u8>, InvocationError>>;
type CallSender = oneshot::Sender<Result<Vec<u8>, InvocationError>>;

/// A server-pushed message delivered on the engine's event channel.
#[derive(Debug)]
pub struct ServerEvent {
    /// Constructor id of the payload.
    pub constructor_id: u32,
    /// Schema name for the constructor, when known.
    pub name: Option<&'static str>,
    /// The full TL-serialized payload, constructor id included.
    pub payload: Vec<u8>,
}

struct PendingCall {
    msg_id: i64,
    body: Vec<u8>,
    acked: bool,
    sender: CallSender,
}

struct QueuedCall {
    body: Vec<u8>,
    sender: CallSender,
}

enum AuthState {
    /// No key material and no handshake in flight.
    Idle,
    /// `req_pq_multi` sent.
    WaitingResPq { plain: Session, state: handshake::Step1 },
    /// `req_DH_params` sent.
    WaitingDhParams { plain: Session, state: handshake::Step2 },
    /// `set_client_DH_params` sent.
    WaitingDhAnswer { plain: Session, state: handshake::Step3, retries: u8 },
    /// Key negotiated, traffic is encrypted.
    Connected(EncryptedSession),
}

/// Single-endpoint RPC engine.
pub struct Rpc {
    endpoint_id: i32,
    storage: Arc<dyn Storage>,
    transport: Box<dyn Transport>,
    state: AuthState,
    open: bool,
    /// Live calls in registration order; at most one entry per msg id.
    pending: Vec<PendingCall>,
    /// Calls issued before authentication completed.
    wait_queue: VecDeque<QueuedCall>,
    /// Received ids awaiting a batched ack, in arrival order.
    pending_acks: Vec<i64>,
    ack_due: Option<Instant>,
    events: mpsc::UnboundedSender<ServerEvent>,
}

impl Rpc {
    /// Create an engine for one endpoint. Returns the engine and the
    /// receiving half of its push-event channel.
    pub fn new(
        endpoint_id: i32,
        storage: Arc<dyn Storage>,
        transport: Box<dyn Transport>,
    ) -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let rpc = Self {
            endpoint_id,
            storage,
            transport,
            state: AuthState::Idle,
            open: false,
            pending: Vec::new(),
            wait_queue: VecDeque::new(),
            pending_acks: Vec::new(),
            ack_due: None,
            events,
        };
        (rpc, events_rx)
    }

    /// Issue a call with a pre-serialized body.
    ///
    /// Returns a receiver that resolves once the server answers. Calls made
    /// before authentication completes are queued and replayed in issuance
    /// order as soon as the session is up.
    pub fn call(&mut self, body: Vec<u8>) -> CallReceiver {
        let (tx, rx) = oneshot::channel();
        if self.open && matches!(self.state, AuthState::Connected(_)) {
            self.send_call(body, tx);
        } else {
            self.wait_queue.push_back(QueuedCall { body, sender: tx });
        }
        rx
    }

    /// Feed one transport event into the state machine.
    pub fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Open => self.handle_open(),
            TransportEvent::Message(frame) => self.handle_message(frame),
            TransportEvent::Error { kind, code } => self.handle_error(kind, code),
        }
    }

    /// The channel is up: resume with stored key material or start a
    /// handshake from scratch. On reconnect, unresolved calls are reissued
    /// in their original registration order.
    pub fn handle_open(&mut self) {
        self.open = true;

        let stored_key = self.storage.get(&storage::auth_key_key(self.endpoint_id));
        let stored_salt = self.storage.get(&storage::salt_key(self.endpoint_id));
        match (stored_key, stored_salt) {
            (Some(key), Some(salt)) if key.len() == 256 && salt.len() == 8 => {
                let mut auth_key = [0u8; 256];
                auth_key.copy_from_slice(&key);
                let salt = i64::from_le_bytes(salt.try_into().unwrap());
                let id_gen = MsgIdGen::new(self.stored_time_offset());
                // Fresh session id, counters at zero.
                self.state = AuthState::Connected(EncryptedSession::new(auth_key, salt, id_gen));
                log::info!("endpoint {}: resumed with stored key", self.endpoint_id);
                self.reissue_all_pending();
                self.replay_wait_queue();
            }
            _ => self.start_handshake(),
        }
    }

    /// One fully-framed payload arrived.
    pub fn handle_message(&mut self, mut frame: Vec<u8>) {
        if matches!(self.state, AuthState::Connected(_)) {
            self.handle_encrypted(&mut frame);
        } else {
            self.handle_plaintext(&frame);
        }
    }

    /// A transport fault. Code 404 invalidates the stored key and forces a
    /// re-handshake; 429 is a flood signal, log-only; anything else is
    /// logged and ignored at this layer.
    pub fn handle_error(&mut self, kind: TransportErrorKind, code: i32) {
        if kind == TransportErrorKind::Network {
            self.open = false;
        }
        match code {
            404 => {
                log::warn!(
                    "endpoint {}: server rejected the auth key, renegotiating",
                    self.endpoint_id
                );
                self.storage.remove(&storage::auth_key_key(self.endpoint_id));
                self.storage.remove(&storage::salt_key(self.endpoint_id));
                // Unresolved calls go back in line for the next session.
                for call in self.pending.drain(..) {
                    self.wait_queue
                        .push_back(QueuedCall { body: call.body, sender: call.sender });
                }
                self.state = AuthState::Idle;
                if self.open {
                    self.start_handshake();
                }
            }
            429 => log::warn!("endpoint {}: flood signal from transport", self.endpoint_id),
            _ => log::debug!(
                "endpoint {}: transport error {kind:?} code {code}",
                self.endpoint_id
            ),
        }
    }

    /// Force-flush acks and stop accepting traffic. Pending calls stay
    /// registered; they are reissued on the next `handle_open`.
    pub fn teardown(&mut self) {
        self.flush_acks();
        self.open = false;
    }

    // ─── Handshake driving ───────────────────────────────────────────────────

    fn start_handshake(&mut self) {
        let mut plain = Session::new(self.stored_time_offset());
        match handshake::step1() {
            Ok((request, state)) => {
                let (frame, _) = plain.pack(request.to_bytes());
                self.transport.send(&frame);
                self.state = AuthState::WaitingResPq { plain, state };
                log::debug!("endpoint {}: handshake started", self.endpoint_id);
            }
            Err(e) => {
                log::warn!("endpoint {}: handshake could not start: {e}", self.endpoint_id);
                self.state = AuthState::Idle;
            }
        }
    }

    fn handle_plaintext(&mut self, frame: &[u8]) {
        let Some((_msg_id, body)) = Session::unpack(frame) else {
            log::debug!("dropping malformed plaintext frame");
            return;
        };
        let mut cursor = Cursor::from_slice(&body);

        // Any failure below leaves the state at Idle: a broken handshake
        // attempt is fatal and restarts from scratch on the next open.
        match std::mem::replace(&mut self.state, AuthState::Idle) {
            AuthState::WaitingResPq { mut plain, state } => {
                let res_pq = match enums::ResPq::deserialize(&mut cursor) {
                    Ok(v) => v,
                    Err(e) => {
                        log::warn!("handshake aborted: {e}");
                        return;
                    }
                };
                match handshake::step2(state, res_pq) {
                    Ok((request, next)) => {
                        let (frame, _) = plain.pack(request.to_bytes());
                        self.transport.send(&frame);
                        self.state = AuthState::WaitingDhParams { plain, state: next };
                    }
                    Err(e) => log::warn!("handshake aborted: {e}"),
                }
            }
            AuthState::WaitingDhParams { mut plain, state } => {
                let params = match enums::ServerDhParams::deserialize(&mut cursor) {
                    Ok(v) => v,
                    Err(e) => {
                        log::warn!("handshake aborted: {e}");
                        return;
                    }
                };
                match handshake::step3(state, params) {
                    Ok((request, next)) => {
                        let (frame, _) = plain.pack(request.to_bytes());
                        self.transport.send(&frame);
                        self.state = AuthState::WaitingDhAnswer { plain, state: next, retries: 0 };
                    }
                    Err(e) => log::warn!("handshake aborted: {e}"),
                }
            }
            AuthState::WaitingDhAnswer { mut plain, state, retries } => {
                let answer = match enums::SetClientDhParamsAnswer::deserialize(&mut cursor) {
                    Ok(v) => v,
                    Err(e) => {
                        log::warn!("handshake aborted: {e}");
                        return;
                    }
                };
                match handshake::finish(state, answer) {
                    Ok(NextStep::Done(done)) => self.complete_handshake(plain, done),
                    Ok(NextStep::Retry { request, state }) => {
                        if retries + 1 > MAX_DH_RETRIES {
                            log::warn!("handshake aborted: dh_gen retry limit reached");
                            return;
                        }
                        log::debug!("dh_gen retry {}", retries + 1);
                        let (frame, _) = plain.pack(request.to_bytes());
                        self.transport.send(&frame);
                        self.state =
                            AuthState::WaitingDhAnswer { plain, state, retries: retries + 1 };
                    }
                    Err(e) => log::warn!("handshake failed: {e}"),
                }
            }
            other => {
                self.state = other;
                log::debug!("unexpected plaintext frame, dropping");
            }
        }
    }

    fn complete_handshake(&mut self, plain: Session, done: handshake::Finished) {
        self.storage
            .set(&storage::auth_key_key(self.endpoint_id), done.auth_key.to_vec());
        self.storage.set(
            &storage::salt_key(self.endpoint_id),
            done.first_salt.to_le_bytes().to_vec(),
        );
        self.storage
            .set(storage::TIME_OFFSET_KEY, done.time_offset.to_le_bytes().to_vec());

        // The encrypted session inherits the id generator so message ids
        // stay monotonic across the key exchange.
        let mut id_gen = plain.into_id_gen();
        id_gen.set_time_offset(done.time_offset);
        self.state =
            AuthState::Connected(EncryptedSession::new(done.auth_key, done.first_salt, id_gen));
        log::info!("endpoint {}: auth key negotiated", self.endpoint_id);
        // Anything still tracked from before the key exchange cannot be
        // answered under the old key; reissue it alongside the wait queue.
        self.reissue_all_pending();
        self.replay_wait_queue();
    }

    // ─── Encrypted dispatch ──────────────────────────────────────────────────

    fn handle_encrypted(&mut self, frame: &mut [u8]) {
        let message = {
            let AuthState::Connected(session) = &mut self.state else {
                return;
            };
            match session.unpack(frame) {
                Ok(m) => m,
                // Cannot be correlated to anything; drop without touching state.
                Err(e) => {
                    log::debug!("dropping undecryptable frame: {e}");
                    return;
                }
            }
        };
        self.dispatch(message.msg_id, message.body);
    }

    /// Walk one top-level message and, iteratively, any container contents.
    /// Containers inside containers are a protocol violation and are
    /// rejected rather than recursed into.
    fn dispatch(&mut self, msg_id: i64, body: Vec<u8>) {
        let mut queue: VecDeque<(i64, Vec<u8>, bool)> = VecDeque::new();
        queue.push_back((msg_id, body, false));

        while let Some((msg_id, body, from_container)) = queue.pop_front() {
            if msg_id & 1 == 0 {
                log::warn!("dropping server message with even id {msg_id}");
                continue;
            }
            if self.pending_acks.contains(&msg_id) {
                // Duplicate delivery: re-flush the ack, do not reprocess.
                self.ack_due = Some(Instant::now());
                continue;
            }
            if body.len() < 4 {
                log::debug!("dropping truncated message {msg_id}");
                continue;
            }
            let cid = u32::from_le_bytes(body[..4].try_into().unwrap());

            match cid {
                ids::MSG_CONTAINER => {
                    if from_container {
                        log::warn!("rejecting container nested in container");
                        continue;
                    }
                    for (inner_id, inner_body) in parse_container(&body[4..]) {
                        queue.push_back((inner_id, inner_body, true));
                    }
                }
                ids::GZIP_PACKED => match gz_unwrap(&body[4..]) {
                    Ok(inflated) => queue.push_back((msg_id, inflated, from_container)),
                    Err(e) => log::debug!("dropping message {msg_id}: {e}"),
                },
                ids::RPC_RESULT => {
                    self.schedule_ack(msg_id);
                    self.handle_rpc_result(&body[4..]);
                }
                types::MsgsAck::CONSTRUCTOR_ID => self.handle_acks(&body[4..]),
                types::BadServerSalt::CONSTRUCTOR_ID => self.handle_bad_salt(&body[4..]),
                types::BadMsgNotification::CONSTRUCTOR_ID => {
                    self.handle_bad_msg(msg_id, &body[4..])
                }
                types::NewSessionCreated::CONSTRUCTOR_ID => {
                    self.schedule_ack(msg_id);
                    self.handle_new_session(&body[4..]);
                }
                types::Pong::CONSTRUCTOR_ID => {
                    self.schedule_ack(msg_id);
                    self.handle_pong(&body);
                }
                _ => {
                    self.schedule_ack(msg_id);
                    self.emit_event(cid, body);
                }
            }
        }
    }

    fn handle_rpc_result(&mut self, data: &[u8]) {
        if data.len() < 8 {
            log::debug!("dropping short rpc_result");
            return;
        }
        let req_msg_id = i64::from_le_bytes(data[..8].try_into().unwrap());
        let mut result = data[8..].to_vec();

        // The result payload itself may be compressed.
        if result.len() >= 4
            && u32::from_le_bytes(result[..4].try_into().unwrap()) == ids::GZIP_PACKED
        {
            match gz_unwrap(&result[4..]) {
                Ok(inflated) => result = inflated,
                Err(e) => {
                    log::debug!("dropping rpc_result for {req_msg_id}: {e}");
                    return;
                }
            }
        }

        let outcome = if result.len() >= 4
            && u32::from_le_bytes(result[..4].try_into().unwrap())
                == types::RpcError::CONSTRUCTOR_ID
        {
            let mut cursor = Cursor::from_slice(&result[4..]);
            match types::RpcError::deserialize(&mut cursor) {
                Ok(err) => Err(InvocationError::Rpc(RpcError::from_wire(
                    err.error_code,
                    &err.error_message,
                ))),
                Err(e) => Err(InvocationError::Deserialize(e.to_string())),
            }
        } else {
            Ok(result)
        };
        self.resolve_pending(req_msg_id, outcome);
    }

    fn handle_acks(&mut self, data: &[u8]) {
        let mut cursor = Cursor::from_slice(data);
        let Ok(ack) = types::MsgsAck::deserialize(&mut cursor) else {
            log::debug!("dropping malformed msgs_ack");
            return;
        };
        for id in ack.msg_ids {
            if let Some(call) = self.pending.iter_mut().find(|p| p.msg_id == id) {
                call.acked = true;
            }
        }
    }

    fn handle_bad_salt(&mut self, data: &[u8]) {
        let mut cursor = Cursor::from_slice(data);
        let Ok(bad) = types::BadServerSalt::deserialize(&mut cursor) else {
            log::debug!("dropping malformed bad_server_salt");
            return;
        };
        log::debug!("server salt rotated, reissuing message {}", bad.bad_msg_id);
        if let AuthState::Connected(session) = &mut self.state {
            session.salt = bad.new_server_salt;
        }
        self.storage.set(
            &storage::salt_key(self.endpoint_id),
            bad.new_server_salt.to_le_bytes().to_vec(),
        );
        self.reissue_call(bad.bad_msg_id);
    }

    fn handle_bad_msg(&mut self, server_msg_id: i64, data: &[u8]) {
        let mut cursor = Cursor::from_slice(data);
        let Ok(bad) = types::BadMsgNotification::deserialize(&mut cursor) else {
            log::debug!("dropping malformed bad_msg_notification");
            return;
        };
        match bad.error_code {
            // 16: msg_id too low, 17: msg_id too high. Both mean our clock
            // is off: resync from the server's stamp and reissue.
            16 | 17 => {
                let offset = match &mut self.state {
                    AuthState::Connected(session) => {
                        session.id_gen_mut().sync_with(server_msg_id)
                    }
                    _ => return,
                };
                self.storage
                    .set(storage::TIME_OFFSET_KEY, offset.to_le_bytes().to_vec());
                log::debug!(
                    "clock resynced (offset {offset}s), reissuing message {}",
                    bad.bad_msg_id
                );
                self.reissue_call(bad.bad_msg_id);
            }
            code => log::warn!(
                "bad_msg_notification code {code} for message {}",
                bad.bad_msg_id
            ),
        }
    }

    fn handle_new_session(&mut self, data: &[u8]) {
        let mut cursor = Cursor::from_slice(data);
        let Ok(created) = types::NewSessionCreated::deserialize(&mut cursor) else {
            log::debug!("dropping malformed new_session_created");
            return;
        };
        log::debug!("server opened a new session");
        if let AuthState::Connected(session) = &mut self.state {
            session.salt = created.server_salt;
        }
        self.storage.set(
            &storage::salt_key(self.endpoint_id),
            created.server_salt.to_le_bytes().to_vec(),
        );
    }

    fn handle_pong(&mut self, body: &[u8]) {
        let mut cursor = Cursor::from_slice(&body[4..]);
        let Ok(pong) = types::Pong::deserialize(&mut cursor) else {
            log::debug!("dropping malformed pong");
            return;
        };
        // Pongs reference the ping's msg id directly, without rpc_result.
        self.resolve_pending(pong.msg_id, Ok(body.to_vec()));
    }

    fn emit_event(&mut self, cid: u32, payload: Vec<u8>) {
        let event = ServerEvent { constructor_id: cid, name: name_for_id(cid), payload };
        if self.events.send(event).is_err() {
            log::debug!("event receiver gone, push message dropped");
        }
    }

    // ─── Pending-call bookkeeping ────────────────────────────────────────────

    fn send_call(&mut self, body: Vec<u8>, sender: CallSender) {
        let (frame, msg_id) = match &mut self.state {
            AuthState::Connected(session) => session.pack(&body),
            _ => {
                let _ = sender.send(Err(InvocationError::Dropped));
                return;
            }
        };
        self.pending.push(PendingCall { msg_id, body, acked: false, sender });
        self.transport.send(&frame);
    }

    fn resolve_pending(&mut self, msg_id: i64, outcome: Result<Vec<u8>, InvocationError>) {
        let Some(pos) = self.pending.iter().position(|p| p.msg_id == msg_id) else {
            log::debug!("result for unknown message {msg_id}");
            return;
        };
        let call = self.pending.remove(pos);
        let _ = call.sender.send(outcome);
    }

    /// Reissue one unresolved call under a fresh msg id; the original
    /// caller-visible handle is preserved.
    fn reissue_call(&mut self, old_msg_id: i64) {
        if let Some(pos) = self.pending.iter().position(|p| p.msg_id == old_msg_id) {
            let call = self.pending.remove(pos);
            self.send_call(call.body, call.sender);
        }
    }

    fn reissue_all_pending(&mut self) {
        let old = std::mem::take(&mut self.pending);
        for call in old {
            self.send_call(call.body, call.sender);
        }
    }

    fn replay_wait_queue(&mut self) {
        while let Some(queued) = self.wait_queue.pop_front() {
            self.send_call(queued.body, queued.sender);
        }
    }

    // ─── Ack coalescing ──────────────────────────────────────────────────────

    fn schedule_ack(&mut self, msg_id: i64) {
        if !self.pending_acks.contains(&msg_id) {
            self.pending_acks.push(msg_id);
        }
        if self.ack_due.is_none() {
            self.ack_due = Some(Instant::now() + ACK_FLUSH_DELAY);
        }
    }

    /// When the owner should next call [`flush_acks`](Self::flush_acks).
    pub fn ack_deadline(&self) -> Option<Instant> {
        self.ack_due
    }

    /// Send the batched ack frame. A no-op unless the session is
    /// authenticated and open; the set is only cleared when a frame is
    /// actually handed to the transport.
    pub fn flush_acks(&mut self) {
        self.ack_due = None;
        if self.pending_acks.is_empty() || !self.open {
            return;
        }
        let frame = match &mut self.state {
            AuthState::Connected(session) => {
                let ack = enums::MsgsAck::MsgsAck(types::MsgsAck {
                    msg_ids: std::mem::take(&mut self.pending_acks),
                });
                session.pack_unrelated(&ack.to_bytes()).0
            }
            _ => return,
        };
        self.transport.send(&frame);
    }

    // ─── Misc ────────────────────────────────────────────────────────────────

    fn stored_time_offset(&self) -> i32 {
        self.storage
            .get(storage::TIME_OFFSET_KEY)
            .and_then(|v| v.try_into().ok())
            .map(i32::from_le_bytes)
            .unwrap_or(0)
    }

    /// Whether the session has a negotiated key and an open channel.
    pub fn is_authenticated(&self) -> bool {
        self.open && matches!(self.state, AuthState::Connected(_))
    }

    /// The endpoint this engine talks to.
    pub fn endpoint_id(&self) -> i32 {
        self.endpoint_id
    }
}

/// Split a `msg_container` payload into `(msg_id, body)` pairs.
/// `data` starts right after the container's constructor id.
fn parse_container(data: &[u8]) -> Vec<(i64, Vec<u8>)> {
    let mut out = Vec::new();
    if data.len() < 4 {
        return out;
    }
    let count = u32::from_le_bytes(data[..4].try_into().unwrap()) as usize;
    let mut pos = 4usize;
    for _ in 0..count {
        // msg_id(8) ∥ seq_no(4) ∥ len(4) ∥ body
        if pos + 16 > data.len() {
            log::debug!("container truncated mid-header");
            break;
        }
        let msg_id = i64::from_le_bytes(data[pos..pos + 8].try_into().unwrap());
        let len = u32::from_le_bytes(data[pos + 12..pos + 16].try_into().unwrap()) as usize;
        pos += 16;
        if pos + len > data.len() {
            log::debug!("container truncated mid-body");
            break;
        }
        out.push((msg_id, data[pos..pos + len].to_vec()));
        pos += len;
    }
    out
}

/// Inflate a `gzip_packed` payload. `data` starts right after the
/// constructor id and holds one TL byte string.
fn gz_unwrap(data: &[u8]) -> Result<Vec<u8>, InvocationError> {
    let mut cursor = Cursor::from_slice(data);
    let packed = Vec::<u8>::deserialize(&mut cursor)?;
    let mut out = Vec::new();
    if flate2::read::GzDecoder::new(&packed[..]).read_to_end(&mut out).is_ok() && !out.is_empty() {
        return Ok(out);
    }
    out.clear();
    flate2::read::ZlibDecoder::new(&packed[..])
        .read_to_end(&mut out)
        .map_err(|_| InvocationError::Deserialize("decompression failed".into()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_parsing_splits_sub_messages() {
        let mut data = Vec::new();
        data.extend(2u32.to_le_bytes());
        for (id, body) in [(0x11i64, vec![1u8, 2, 3, 4]), (0x13i64, vec![9u8, 9, 9, 9])] {
            data.extend(id.to_le_bytes());
            data.extend(1i32.to_le_bytes());
            data.extend((body.len() as u32).to_le_bytes());
            data.extend(body);
        }
        let parts = parse_container(&data);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], (0x11, vec![1, 2, 3, 4]));
        assert_eq!(parts[1], (0x13, vec![9, 9, 9, 9]));
    }

    #[test]
    fn truncated_container_yields_complete_prefix_only() {
        let mut data = Vec::new();
        data.extend(2u32.to_le_bytes());
        data.extend(0x11i64.to_le_bytes());
        data.extend(1i32.to_le_bytes());
        data.extend(4u32.to_le_bytes());
        data.extend([1u8, 2, 3, 4]);
        data.extend(0x13i64.to_le_bytes()); // second header cut short
        let parts = parse_container(&data);
        assert_eq!(parts.len(), 1);
    }

    #[test]
    fn finishing_a_handshake_reissues_tracked_calls() {
        use crate::storage::InMemoryStorage;

        let sent = Arc::new(std::sync::Mutex::new(Vec::<Vec<u8>>::new()));
        let sink = Arc::clone(&sent);
        let (mut rpc, _events) = Rpc::new(
            2,
            Arc::new(InMemoryStorage::new()),
            Box::new(move |frame: &[u8]| sink.lock().unwrap().push(frame.to_vec())),
        );
        rpc.open = true;

        // A call tracked from before the key exchange completed.
        let (tx, mut rx) = oneshot::channel();
        rpc.pending
            .push(PendingCall { msg_id: 0x44, body: vec![0xab; 8], acked: false, sender: tx });

        rpc.complete_handshake(
            Session::new(0),
            handshake::Finished { auth_key: [7u8; 256], time_offset: 0, first_salt: 1 },
        );

        // Re-sent under the new session, still awaiting its answer.
        assert_eq!(sent.lock().unwrap().len(), 1);
        assert!(matches!(rx.try_recv(), Err(oneshot::error::TryRecvError::Empty)));
        assert_eq!(rpc.pending.len(), 1);
        assert_eq!(rpc.pending[0].body, vec![0xab; 8]);
        assert_ne!(rpc.pending[0].msg_id, 0x44);
    }

    #[test]
    fn gz_unwrap_round_trips() {
        use flate2::Compression;
        use flate2::write::GzEncoder;
        use std::io::Write;

        let payload = b"some server response".to_vec();
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(&payload).unwrap();
        let packed = enc.finish().unwrap();

        let wire = packed.to_bytes(); // TL byte string framing
        assert_eq!(gz_unwrap(&wire).unwrap(), payload);
    }
}
