use mtp_tl::{Blob, Deserializable, RawVec, Serializable, enums, functions, name_for_id, types};

// ── The two-phase law ─────────────────────────────────────────────────────────

/// `to_bytes()` must produce exactly `size()` bytes for every value; the
/// session layer relies on this to precompute frame sizes.
#[test]
fn size_matches_encoded_length() {
    fn check(v: &impl Serializable) {
        assert_eq!(v.to_bytes().len(), v.size());
    }

    check(&42i32);
    check(&-1i64);
    check(&true);
    check(&String::from("hello"));
    check(&"x".repeat(300));
    check(&vec![0u8; 253]);
    check(&vec![0u8; 254]);
    check(&vec![1i64, 2, 3]);
    check(&RawVec(vec![7i32, 8]));
    check(&functions::ReqPqMulti { nonce: [9u8; 16] });
    check(&enums::ResPq::ResPq(types::ResPq {
        nonce: [1u8; 16],
        server_nonce: [2u8; 16],
        pq: vec![0x17, 0xed, 0x48, 0x94, 0x1a, 0x08, 0xf9, 0x81],
        server_public_key_fingerprints: vec![0x216be86c022bb4c3u64 as i64],
    }));
}

// ── Primitive round-trips ─────────────────────────────────────────────────────

#[test]
fn roundtrip_i32() {
    for v in [0i32, -1, i32::MAX, i32::MIN, 42] {
        assert_eq!(i32::from_bytes(&v.to_bytes()).unwrap(), v);
    }
}

#[test]
fn roundtrip_i64() {
    for v in [0i64, -1, i64::MAX, i64::MIN, 1_234_567_890] {
        assert_eq!(i64::from_bytes(&v.to_bytes()).unwrap(), v);
    }
}

#[test]
fn bool_encodes_as_constructor_ids() {
    assert_eq!(true.to_bytes(), 0x997275b5u32.to_le_bytes());
    assert_eq!(false.to_bytes(), 0xbc799737u32.to_le_bytes());
    assert_eq!(bool::from_bytes(&true.to_bytes()).unwrap(), true);
    assert_eq!(bool::from_bytes(&false.to_bytes()).unwrap(), false);
}

// ── Byte-string framing ───────────────────────────────────────────────────────

#[test]
fn short_bytes_use_one_byte_header() {
    let v = vec![0xabu8; 5];
    let bytes = v.to_bytes();
    assert_eq!(bytes[0], 5);
    assert_eq!(bytes.len(), 8); // 1 + 5 + 2 padding
    assert_eq!(Vec::<u8>::from_bytes(&bytes).unwrap(), v);
}

#[test]
fn framing_header_switches_at_254() {
    // 253 payload bytes still fit the short form; 254 needs the sentinel.
    let short = vec![1u8; 253];
    let long = vec![1u8; 254];

    let short_bytes = short.to_bytes();
    assert_eq!(short_bytes[0], 253);
    assert_eq!(short_bytes.len() % 4, 0);

    let long_bytes = long.to_bytes();
    assert_eq!(long_bytes[0], 0xfe);
    assert_eq!(&long_bytes[1..4], &[254, 0, 0]);
    assert_eq!(long_bytes.len() % 4, 0);

    assert_eq!(Vec::<u8>::from_bytes(&short_bytes).unwrap(), short);
    assert_eq!(Vec::<u8>::from_bytes(&long_bytes).unwrap(), long);
}

#[test]
fn roundtrip_strings() {
    for s in ["", "hello world", "ünïcödé", &"x".repeat(300)] {
        let s = s.to_owned();
        let bytes = s.to_bytes();
        assert_eq!(bytes.len() % 4, 0, "must be 4-byte aligned");
        assert_eq!(String::from_bytes(&bytes).unwrap(), s);
    }
}

// ── Vectors ───────────────────────────────────────────────────────────────────

#[test]
fn boxed_vector_carries_constructor_id() {
    let v = vec![1i32, 2, 3];
    let bytes = v.to_bytes();
    assert_eq!(&bytes[..4], &0x1cb5c415u32.to_le_bytes());
    assert_eq!(Vec::<i32>::from_bytes(&bytes).unwrap(), v);
}

#[test]
fn bare_vector_has_no_constructor_id() {
    let v = RawVec(vec![1i64, 2]);
    let bytes = v.to_bytes();
    assert_eq!(&bytes[..4], &2i32.to_le_bytes());
    assert_eq!(RawVec::<i64>::from_bytes(&bytes).unwrap(), v);
}

#[test]
fn roundtrip_empty_vec() {
    let v: Vec<i64> = vec![];
    assert_eq!(Vec::<i64>::from_bytes(&v.to_bytes()).unwrap(), v);
}

// ── Schema types ──────────────────────────────────────────────────────────────

#[test]
fn roundtrip_res_pq() {
    let v = enums::ResPq::ResPq(types::ResPq {
        nonce: [3u8; 16],
        server_nonce: [4u8; 16],
        pq: vec![0x17, 0xed, 0x48, 0x94, 0x1a, 0x08, 0xf9, 0x81],
        server_public_key_fingerprints: vec![-1, 7],
    });
    assert_eq!(enums::ResPq::from_bytes(&v.to_bytes()).unwrap(), v);
}

#[test]
fn roundtrip_server_dh_params_both_variants() {
    let ok = enums::ServerDhParams::Ok(types::ServerDhParamsOk {
        nonce: [1u8; 16],
        server_nonce: [2u8; 16],
        encrypted_answer: vec![0u8; 592],
    });
    assert_eq!(enums::ServerDhParams::from_bytes(&ok.to_bytes()).unwrap(), ok);

    let fail = enums::ServerDhParams::Fail(types::ServerDhParamsFail {
        nonce: [1u8; 16],
        server_nonce: [2u8; 16],
        new_nonce_hash: [5u8; 16],
    });
    assert_eq!(
        enums::ServerDhParams::from_bytes(&fail.to_bytes()).unwrap(),
        fail
    );
}

#[test]
fn roundtrip_set_client_dh_params_answer() {
    for v in [
        enums::SetClientDhParamsAnswer::DhGenOk(types::DhGenOk {
            nonce: [1u8; 16],
            server_nonce: [2u8; 16],
            new_nonce_hash1: [3u8; 16],
        }),
        enums::SetClientDhParamsAnswer::DhGenRetry(types::DhGenRetry {
            nonce: [1u8; 16],
            server_nonce: [2u8; 16],
            new_nonce_hash2: [4u8; 16],
        }),
        enums::SetClientDhParamsAnswer::DhGenFail(types::DhGenFail {
            nonce: [1u8; 16],
            server_nonce: [2u8; 16],
            new_nonce_hash3: [5u8; 16],
        }),
    ] {
        assert_eq!(
            enums::SetClientDhParamsAnswer::from_bytes(&v.to_bytes()).unwrap(),
            v
        );
    }
}

#[test]
fn roundtrip_bad_msg_variants() {
    let salt = enums::BadMsgNotification::ServerSalt(types::BadServerSalt {
        bad_msg_id: 0x5f1a_0000_0000_0004,
        bad_msg_seqno: 3,
        error_code: 48,
        new_server_salt: -77,
    });
    assert_eq!(
        enums::BadMsgNotification::from_bytes(&salt.to_bytes()).unwrap(),
        salt
    );

    let notif = enums::BadMsgNotification::Notification(types::BadMsgNotification {
        bad_msg_id: 8,
        bad_msg_seqno: 1,
        error_code: 16,
    });
    assert_eq!(
        enums::BadMsgNotification::from_bytes(&notif.to_bytes()).unwrap(),
        notif
    );
}

#[test]
fn invoke_with_layer_wraps_query_bytes() {
    let inner = functions::Ping { ping_id: 99 };
    let wrapped = functions::InvokeWithLayer {
        layer: 177,
        query: inner.clone(),
    };
    let bytes = wrapped.to_bytes();
    assert_eq!(bytes.len(), wrapped.size());
    assert_eq!(&bytes[..4], &0xda9b0d0du32.to_le_bytes());
    assert_eq!(&bytes[4..8], &177i32.to_le_bytes());
    assert_eq!(&bytes[8..], &inner.to_bytes()[..]);
}

#[test]
fn init_connection_flags_word_is_zero() {
    let wrapped = functions::InitConnection {
        api_id: 6,
        device_model: "pc".into(),
        system_version: "linux".into(),
        app_version: "0.2.1".into(),
        system_lang_code: "en".into(),
        lang_pack: "".into(),
        lang_code: "en".into(),
        query: functions::Ping { ping_id: 0 },
    };
    let bytes = wrapped.to_bytes();
    assert_eq!(bytes.len(), wrapped.size());
    assert_eq!(&bytes[..4], &0xc1cd5ea9u32.to_le_bytes());
    assert_eq!(&bytes[4..8], &[0, 0, 0, 0]);
}

#[test]
fn blob_passes_through_unframed() {
    let blob = Blob(vec![1, 2, 3, 4, 5]);
    assert_eq!(blob.to_bytes(), vec![1, 2, 3, 4, 5]);
    assert_eq!(Blob::from_bytes(&[1, 2, 3, 4, 5]).unwrap(), blob);
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[test]
fn deserialize_truncated_returns_eof() {
    use mtp_tl::deserialize::Error;
    assert_eq!(i32::from_bytes(&[0x01, 0x02]), Err(Error::UnexpectedEof));
    assert_eq!(
        types::ResPq::from_bytes(&[0u8; 20]),
        Err(Error::UnexpectedEof)
    );
}

#[test]
fn wrong_constructor_is_reported_with_id() {
    use mtp_tl::deserialize::Error;
    let mut bytes = 0xdeadbeefu32.to_le_bytes().to_vec();
    bytes.extend_from_slice(&[0u8; 64]);
    assert_eq!(
        enums::ResPq::from_bytes(&bytes),
        Err(Error::UnexpectedConstructor { id: 0xdeadbeef })
    );
}

// ── Option passthrough ────────────────────────────────────────────────────────

#[test]
fn option_none_writes_nothing() {
    let v: Option<i32> = None;
    assert_eq!(v.to_bytes(), b"");
}

#[test]
fn option_some_writes_inner() {
    let v: Option<i32> = Some(42);
    assert_eq!(v.to_bytes(), 42i32.to_bytes());
}

// ── name_for_id ───────────────────────────────────────────────────────────────

#[test]
fn name_for_id_knows_the_service_schema() {
    assert_eq!(name_for_id(0x05162463), Some("resPQ"));
    assert_eq!(name_for_id(0xf35c6d01), Some("rpc_result"));
    assert_eq!(name_for_id(0x73f1f8dc), Some("msg_container"));
    assert_eq!(name_for_id(0xdeadbeef), None);
}
