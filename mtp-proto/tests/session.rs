use mtp_proto::message::MsgIdGen;
use mtp_proto::session::{DecryptError, EncryptedSession, Session};

fn session() -> EncryptedSession {
    EncryptedSession::new(core::array::from_fn(|i| i as u8), 0x1122334455667788, MsgIdGen::new(0))
}

// ── Plaintext phase ───────────────────────────────────────────────────────────

#[test]
fn plaintext_roundtrip() {
    let mut s = Session::new(0);
    let (wire, msg_id) = s.pack(vec![0xaa, 0xbb, 0xcc, 0xdd]);
    assert_eq!(&wire[..8], &[0u8; 8]);

    let (parsed_id, body) = Session::unpack(&wire).unwrap();
    assert_eq!(parsed_id, msg_id);
    assert_eq!(body, vec![0xaa, 0xbb, 0xcc, 0xdd]);
}

#[test]
fn plaintext_msg_ids_are_monotonic() {
    let mut s = Session::new(0);
    let (_, a) = s.pack(vec![1]);
    let (_, b) = s.pack(vec![2]);
    assert!(b > a);
    assert_eq!(a % 4, 0, "client ids carry the 0b100 tag");
}

#[test]
fn truncated_plaintext_frame_is_rejected() {
    let mut s = Session::new(0);
    let (wire, _) = s.pack(vec![1, 2, 3, 4]);
    assert!(Session::unpack(&wire[..wire.len() - 1]).is_none());
}

// ── Encrypted phase ───────────────────────────────────────────────────────────

#[test]
fn encrypted_frames_are_opaque_on_the_wire() {
    let mut s = session();
    let body = b"ping body".to_vec();
    let (wire, msg_id) = s.pack(&body);

    assert!(msg_id > 0);
    // key_id || msg_key || ciphertext, block aligned
    assert_eq!((wire.len() - 24) % 16, 0);
    assert!(
        !wire.windows(body.len()).any(|w| w == body),
        "body must not appear in the clear"
    );
}

#[test]
fn unpack_round_trips_a_server_frame() {
    let mut s = session();

    // Build a server-direction frame carrying the session's own header.
    let body = vec![0xde, 0xad, 0xbe, 0xef];
    let mut envelope = Vec::new();
    envelope.extend(77i64.to_le_bytes()); // salt as the server sees it
    envelope.extend(s.session_id().to_le_bytes());
    envelope.extend(0x0123456789abcdi64.to_le_bytes());
    envelope.extend(1i32.to_le_bytes());
    envelope.extend((body.len() as u32).to_le_bytes());
    envelope.extend_from_slice(&body);

    let key = mtp_crypto::AuthKey::from_bytes(s.auth_key_bytes());
    let mut frame = mtp_crypto::encrypt_data_from_server(&envelope, &key);

    let message = s.unpack(&mut frame).unwrap();
    assert_eq!(message.salt, 77);
    assert_eq!(message.msg_id, 0x0123456789abcd);
    assert_eq!(message.seq_no, 1);
    assert_eq!(message.body, body);
}

#[test]
fn unpack_rejects_foreign_session_id() {
    let mut s = session();

    let mut envelope = Vec::new();
    envelope.extend(0i64.to_le_bytes());
    envelope.extend((s.session_id() ^ 1).to_le_bytes());
    envelope.extend(4i64.to_le_bytes());
    envelope.extend(1i32.to_le_bytes());
    envelope.extend(0u32.to_le_bytes());

    let key = mtp_crypto::AuthKey::from_bytes(s.auth_key_bytes());
    let mut frame = mtp_crypto::encrypt_data_from_server(&envelope, &key);
    assert_eq!(s.unpack(&mut frame), Err(DecryptError::SessionMismatch));
}

#[test]
fn unpack_rejects_corrupted_frames() {
    let mut s = session();
    let (mut wire, _) = s.pack(&[1, 2, 3]);
    let last = wire.len() - 1;
    wire[last] ^= 0xff;
    assert!(matches!(s.unpack(&mut wire), Err(DecryptError::Crypto(_))));
}

#[test]
fn sequence_interleaves_related_and_unrelated() {
    let mut s = session();
    // pack() is content-related (odd seq), pack_unrelated() is even and
    // does not advance the counter.
    let (_, first) = s.pack(&[1]);
    let (_, ack) = s.pack_unrelated(&[2]);
    let (_, second) = s.pack(&[3]);
    assert!(first < ack && ack < second, "msg ids stay monotonic");
}
