//! Full negotiation transcripts driven through the deterministic seams,
//! with the test playing the server side of the exchange.

use mtp_crypto::{AuthKey, generate_key_data_from_nonce, ige};
use mtp_proto::handshake::{
    Error, NextStep, Step2, Step3, do_finish, do_step1, do_step2, do_step3,
};
use mtp_tl::{Cursor, Deserializable, Serializable, enums, types};
use num_bigint::BigUint;

const DH_PRIME_HEX: &[u8] =
    b"c71caeb9c6b1c9048e6c522f70f13f73980d40238e3e21c14934d037563d930f\
      48198a0aa7c14058229493d22530f4dbfa336f6e0ac925139543aed44cce7c37\
      20fd51f69458705ac68cd4fe6b6b13abdc9746512969328454f18faf8c595f64\
      2477fe96bb2a941d5bcd1d4ac8cc49880708fa9b378e3c4f3a9060bee67cf9a4\
      a4a695811051907e162753b56b0f6b410dba74d8a84b2a14b3144e0ef1284754\
      fd17ed950d5965b4b9dd46582db1178d169c6bc465b0d6ff9ca3928fef5b9ae4\
      e418fc15e83ebea0f87fa9ff5eed70050ded2849f47bf959d956850ce929851f\
      0d8115f635b105ee2e4e15d04b2454bf6f4fadf034b10403119cd8e3b92fcc5b";

const PQ: u64 = 0x17ed48941a08f981;
const KNOWN_FINGERPRINT: i64 = -3414540481677951611;
const SERVER_NONCE: [u8; 16] = [0x42; 16];
const SERVER_TIME: i32 = 1_700_000_100;
const NOW: i32 = 1_700_000_000;

fn dh_prime() -> BigUint {
    BigUint::parse_bytes(DH_PRIME_HEX, 16).unwrap()
}

fn step1_random() -> [u8; 16] {
    [0x11; 16]
}

fn step2_random() -> [u8; 256] {
    core::array::from_fn(|i| (i * 7 + 1) as u8)
}

fn step3_random() -> [u8; 272] {
    core::array::from_fn(|i| (i * 13 + 5) as u8)
}

fn new_nonce() -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&step2_random()[..32]);
    out
}

fn res_pq(nonce: [u8; 16]) -> enums::ResPq {
    enums::ResPq::ResPq(types::ResPq {
        nonce,
        server_nonce: SERVER_NONCE,
        pq: PQ.to_be_bytes().to_vec(),
        server_public_key_fingerprints: vec![12345, KNOWN_FINGERPRINT],
    })
}

/// The server's DH exponent and its public value `g_a = 3^a mod p`.
fn server_exponent() -> (BigUint, BigUint) {
    let a = BigUint::from_bytes_be(&[0xab; 256]);
    let g_a = BigUint::from(3u32).modpow(&a, &dh_prime());
    (a, g_a)
}

/// Build `server_DH_params_ok` with an encrypted inner answer.
fn server_dh_params(nonce: [u8; 16], g: i32, prime: &BigUint) -> enums::ServerDhParams {
    let (_, g_a) = server_exponent();
    let inner = enums::ServerDhInnerData::ServerDhInnerData(types::ServerDhInnerData {
        nonce,
        server_nonce: SERVER_NONCE,
        g,
        dh_prime: prime.to_bytes_be(),
        g_a: g_a.to_bytes_be(),
        server_time: SERVER_TIME,
    })
    .to_bytes();

    let digest = mtp_crypto::sha1!(&inner);
    let mut answer = Vec::with_capacity(20 + inner.len() + 15);
    answer.extend_from_slice(&digest);
    answer.extend_from_slice(&inner);
    while answer.len() % 16 != 0 {
        answer.push(0);
    }

    let (key, iv) = generate_key_data_from_nonce(&SERVER_NONCE, &new_nonce());
    ige::ige_encrypt(&mut answer, &key, &iv);

    enums::ServerDhParams::Ok(types::ServerDhParamsOk {
        nonce,
        server_nonce: SERVER_NONCE,
        encrypted_answer: answer,
    })
}

/// Decrypt the client's `set_client_DH_params` payload, returning
/// `(retry_id, g_b)`.
fn open_client_dh(encrypted: &[u8]) -> (i64, BigUint) {
    let (key, iv) = generate_key_data_from_nonce(&SERVER_NONCE, &new_nonce());
    let mut plain = encrypted.to_vec();
    ige::ige_decrypt(&mut plain, &key, &iv);

    let mut cursor = Cursor::from_slice(&plain[20..]);
    let enums::ClientDhInnerData::ClientDhInnerData(inner) =
        enums::ClientDhInnerData::deserialize(&mut cursor).unwrap();

    let digest = mtp_crypto::sha1!(&plain[20..20 + cursor.pos()]);
    assert_eq!(plain[..20], digest, "client inner data must be SHA1-prefixed");

    (inner.retry_id, BigUint::from_bytes_be(&inner.g_b))
}

fn auth_key_from_gab(gab: &BigUint) -> AuthKey {
    let mut key = [0u8; 256];
    let bytes = gab.to_bytes_be();
    key[256 - bytes.len()..].copy_from_slice(&bytes);
    AuthKey::from_bytes(key)
}

/// Run steps 1-3 against the mock server, returning the client state and
/// the server-computed shared key.
fn run_to_step3() -> (Step3, AuthKey) {
    let (req1, s1) = do_step1(&step1_random()).unwrap();
    let nonce = req1.nonce;

    let (req2, s2) = do_step2(s1, res_pq(nonce), &step2_random()).unwrap();
    assert_eq!(req2.public_key_fingerprint, KNOWN_FINGERPRINT);
    assert_eq!(req2.encrypted_data.len(), 256);

    let (req3, s3) = do_step3(
        s2,
        server_dh_params(nonce, 3, &dh_prime()),
        &step3_random(),
        NOW,
    )
    .unwrap();

    let (retry_id, g_b) = open_client_dh(&req3.encrypted_data);
    assert_eq!(retry_id, 0);

    let (a, _) = server_exponent();
    let gab = g_b.modpow(&a, &dh_prime());
    (s3, auth_key_from_gab(&gab))
}

fn step2_state() -> (Step2, [u8; 16]) {
    let (req1, s1) = do_step1(&step1_random()).unwrap();
    let nonce = req1.nonce;
    let (_, s2) = do_step2(s1, res_pq(nonce), &step2_random()).unwrap();
    (s2, nonce)
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[test]
fn full_transcript_produces_shared_key() {
    let (s3, server_key) = run_to_step3();

    let ok = enums::SetClientDhParamsAnswer::DhGenOk(types::DhGenOk {
        nonce: [0x11; 16],
        server_nonce: SERVER_NONCE,
        new_nonce_hash1: server_key.calc_new_nonce_hash(&new_nonce(), 1),
    });

    match do_finish(s3, ok, &step3_random()).unwrap() {
        NextStep::Done(finished) => {
            assert_eq!(finished.auth_key, server_key.to_bytes());
            assert_eq!(finished.time_offset, SERVER_TIME - NOW);

            let mut salt = [0u8; 8];
            for ((dst, a), b) in salt.iter_mut().zip(&new_nonce()[..8]).zip(&SERVER_NONCE[..8]) {
                *dst = a ^ b;
            }
            assert_eq!(finished.first_salt, i64::from_le_bytes(salt));
        }
        NextStep::Retry { .. } => panic!("expected Done"),
    }
}

#[test]
fn retry_regenerates_without_restarting_pq() {
    let (s3, first_key) = run_to_step3();

    let retry = enums::SetClientDhParamsAnswer::DhGenRetry(types::DhGenRetry {
        nonce: [0x11; 16],
        server_nonce: SERVER_NONCE,
        new_nonce_hash2: first_key.calc_new_nonce_hash(&new_nonce(), 2),
    });

    // Fresh randomness for the second round so the exponent changes.
    let retry_random: [u8; 272] = core::array::from_fn(|i| (i * 31 + 11) as u8);
    let (request, state) = match do_finish(s3, retry, &retry_random).unwrap() {
        NextStep::Retry { request, state } => (request, state),
        NextStep::Done(_) => panic!("expected Retry"),
    };

    let (retry_id, g_b) = open_client_dh(&request.encrypted_data);
    assert_eq!(retry_id, i64::from_le_bytes(first_key.aux_hash()));

    let (a, _) = server_exponent();
    let second_key = auth_key_from_gab(&g_b.modpow(&a, &dh_prime()));
    assert_ne!(second_key.to_bytes(), first_key.to_bytes());

    let ok = enums::SetClientDhParamsAnswer::DhGenOk(types::DhGenOk {
        nonce: [0x11; 16],
        server_nonce: SERVER_NONCE,
        new_nonce_hash1: second_key.calc_new_nonce_hash(&new_nonce(), 1),
    });
    match do_finish(state, ok, &retry_random).unwrap() {
        NextStep::Done(finished) => assert_eq!(finished.auth_key, second_key.to_bytes()),
        NextStep::Retry { .. } => panic!("expected Done after retry"),
    }
}

#[test]
fn dh_gen_fail_is_fatal() {
    let (s3, server_key) = run_to_step3();
    let fail = enums::SetClientDhParamsAnswer::DhGenFail(types::DhGenFail {
        nonce: [0x11; 16],
        server_nonce: SERVER_NONCE,
        new_nonce_hash3: server_key.calc_new_nonce_hash(&new_nonce(), 3),
    });
    assert_eq!(
        do_finish(s3, fail, &step3_random()).unwrap_err(),
        Error::DhGenFail
    );
}

#[test]
fn forged_confirmation_hash_is_rejected() {
    let (s3, _) = run_to_step3();
    let ok = enums::SetClientDhParamsAnswer::DhGenOk(types::DhGenOk {
        nonce: [0x11; 16],
        server_nonce: SERVER_NONCE,
        new_nonce_hash1: [0u8; 16],
    });
    assert!(matches!(
        do_finish(s3, ok, &step3_random()),
        Err(Error::InvalidNewNonceHash { .. })
    ));
}

// ── Validation failures ───────────────────────────────────────────────────────

#[test]
fn step2_rejects_nonce_mismatch() {
    let (_, s1) = do_step1(&step1_random()).unwrap();
    let response = res_pq([0x99; 16]);
    assert!(matches!(
        do_step2(s1, response, &step2_random()),
        Err(Error::InvalidNonce { .. })
    ));
}

#[test]
fn step2_rejects_unknown_fingerprints() {
    let (req1, s1) = do_step1(&step1_random()).unwrap();
    let response = enums::ResPq::ResPq(types::ResPq {
        nonce: req1.nonce,
        server_nonce: SERVER_NONCE,
        pq: PQ.to_be_bytes().to_vec(),
        server_public_key_fingerprints: vec![1, 2, 3],
    });
    assert_eq!(
        do_step2(s1, response, &step2_random()).unwrap_err(),
        Error::UnknownFingerprints { fingerprints: vec![1, 2, 3] }
    );
}

#[test]
fn step2_rejects_oversized_pq() {
    let (req1, s1) = do_step1(&step1_random()).unwrap();
    let response = enums::ResPq::ResPq(types::ResPq {
        nonce: req1.nonce,
        server_nonce: SERVER_NONCE,
        pq: vec![1; 12],
        server_public_key_fingerprints: vec![KNOWN_FINGERPRINT],
    });
    assert_eq!(
        do_step2(s1, response, &step2_random()).unwrap_err(),
        Error::InvalidPqSize { size: 12 }
    );
}

#[test]
fn step3_rejects_unexpected_generator() {
    let (s2, nonce) = step2_state();
    assert_eq!(
        do_step3(s2, server_dh_params(nonce, 2, &dh_prime()), &step3_random(), NOW).unwrap_err(),
        Error::GUnexpected { got: 2 }
    );
}

#[test]
fn step3_rejects_foreign_prime() {
    let (s2, nonce) = step2_state();
    // Another 2048-bit value; not the pinned modulus.
    let foreign = dh_prime() - BigUint::from(4u32);
    assert_eq!(
        do_step3(s2, server_dh_params(nonce, 3, &foreign), &step3_random(), NOW).unwrap_err(),
        Error::DhPrimeMismatch
    );
}

#[test]
fn step3_rejects_unaligned_answer() {
    let (s2, nonce) = step2_state();
    let response = enums::ServerDhParams::Ok(types::ServerDhParamsOk {
        nonce,
        server_nonce: SERVER_NONCE,
        encrypted_answer: vec![0u8; 33],
    });
    assert_eq!(
        do_step3(s2, response, &step3_random(), NOW).unwrap_err(),
        Error::EncryptedResponseNotPadded { len: 33 }
    );
}

#[test]
fn step3_rejects_tampered_inner_hash() {
    let (s2, nonce) = step2_state();
    let mut response = server_dh_params(nonce, 3, &dh_prime());
    let enums::ServerDhParams::Ok(ref mut ok) = response else {
        unreachable!()
    };
    // Flip one ciphertext bit; the SHA1 prefix check must catch it.
    let last = ok.encrypted_answer.len() - 1;
    ok.encrypted_answer[last] ^= 1;
    assert!(matches!(
        do_step3(s2, response, &step3_random(), NOW),
        Err(Error::InvalidAnswerHash { .. } | Error::InvalidDhInnerData { .. })
    ));
}

#[test]
fn step3_reports_params_failure() {
    let (s2, nonce) = step2_state();
    let digest = mtp_crypto::sha1!(&new_nonce());
    let mut hash = [0u8; 16];
    hash.copy_from_slice(&digest[4..]);
    let response = enums::ServerDhParams::Fail(types::ServerDhParamsFail {
        nonce,
        server_nonce: SERVER_NONCE,
        new_nonce_hash: hash,
    });
    assert_eq!(
        do_step3(s2, response, &step3_random(), NOW).unwrap_err(),
        Error::DhParamsFail
    );
}
