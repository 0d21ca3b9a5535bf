//! Message identifiers and plaintext framing.

use std::time::{SystemTime, UNIX_EPOCH};

/// Generator for 64-bit message identifiers.
///
/// The upper 32 bits are server-corrected Unix seconds; the lower 32 bits
/// combine the sub-second milliseconds, 16 random bits and the constant
/// `0b100` tag that marks a client message:
///
/// ```text
/// id = (secs + offset) << 32 | millis << 21 | rand16 << 3 | 4
/// ```
///
/// Ids are strictly monotonic: if the clock stalls or steps back, the
/// generator falls back to `last + 4` (which preserves the tag bits).
pub struct MsgIdGen {
    time_offset: i32,
    last: i64,
}

impl MsgIdGen {
    /// Create a generator with a known clock offset (seconds vs. server).
    pub fn new(time_offset: i32) -> Self {
        Self { time_offset, last: 0 }
    }

    /// Current clock offset in seconds.
    pub fn time_offset(&self) -> i32 {
        self.time_offset
    }

    /// Replace the clock offset without touching monotonicity state.
    pub fn set_time_offset(&mut self, offset: i32) {
        self.time_offset = offset;
    }

    /// Allocate the next message id from the system clock.
    pub fn next(&mut self) -> i64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let mut rnd = [0u8; 2];
        getrandom::getrandom(&mut rnd).expect("getrandom");
        self.do_next(
            now.as_secs() as i64,
            now.subsec_millis() as i64,
            u16::from_le_bytes(rnd),
        )
    }

    /// Deterministic form of [`next`](Self::next) for tests.
    pub fn do_next(&mut self, secs: i64, millis: i64, rand16: u16) -> i64 {
        let high = secs + i64::from(self.time_offset);
        let low = (millis << 21) | (i64::from(rand16) << 3) | 4;
        let mut id = (high << 32) | low;
        if id <= self.last {
            id = self.last + 4;
        }
        self.last = id;
        id
    }

    /// Forget the last issued id (reconnect, bad-msg recovery).
    pub fn reset(&mut self) {
        self.last = 0;
    }

    /// Recompute the clock offset from a server-stamped message id and
    /// reset monotonicity state. Returns the new offset.
    pub fn sync_with(&mut self, server_msg_id: i64) -> i32 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        self.do_sync_with(server_msg_id, now)
    }

    /// Deterministic form of [`sync_with`](Self::sync_with) for tests.
    pub fn do_sync_with(&mut self, server_msg_id: i64, now_secs: i64) -> i32 {
        self.time_offset = ((server_msg_id >> 32) - now_secs) as i32;
        self.reset();
        self.time_offset
    }
}

/// A framed message ready to be sent.
#[derive(Debug)]
pub struct Message {
    /// Unique identifier for this message.
    pub msg_id: i64,
    /// Session-scoped sequence number.
    pub seq_no: i32,
    /// The serialized TL body (constructor ID + fields).
    pub body: Vec<u8>,
}

impl Message {
    /// Serialize into the plaintext wire format used before key exchange:
    ///
    /// ```text
    /// auth_key_id:long  (0 for plaintext)
    /// message_id:long
    /// message_data_length:int
    /// message_data:bytes
    /// ```
    pub fn to_plaintext_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(8 + 8 + 4 + self.body.len());
        buf.extend(0i64.to_le_bytes());
        buf.extend(self.msg_id.to_le_bytes());
        buf.extend((self.body.len() as u32).to_le_bytes());
        buf.extend(&self.body);
        buf
    }
}
