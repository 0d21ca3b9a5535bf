//! Sans-IO authorization key negotiation.
//!
//! # Flow
//!
//! ```text
//! let (req, s1) = handshake::step1()?;
//! // send req, receive resp
//! let (req, s2) = handshake::step2(s1, resp)?;
//! // send req, receive resp
//! let (req, s3) = handshake::step3(s2, resp)?;
//! // send req, receive resp
//! match handshake::finish(s3, resp)? {
//!     NextStep::Done(finished)            => { /* finished.auth_key is ready */ }
//!     NextStep::Retry { request, state }  => { /* resend, then finish again */ }
//! }
//! ```
//!
//! Each step consumes the previous state value, so at most one
//! negotiation can be in flight per context and a completed context
//! cannot be replayed.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use mtp_crypto::{AuthKey, factorize, generate_key_data_from_nonce, ige, rsa};
use mtp_tl::{Cursor, Deserializable, Serializable, enums, functions, types};
use num_bigint::BigUint;
use sha1::{Digest, Sha1};

/// The fixed 2048-bit DH modulus; any other prime offered by the server
/// is rejected outright.
const DH_PRIME_HEX: &[u8] =
    b"c71caeb9c6b1c9048e6c522f70f13f73980d40238e3e21c14934d037563d930f\
      48198a0aa7c14058229493d22530f4dbfa336f6e0ac925139543aed44cce7c37\
      20fd51f69458705ac68cd4fe6b6b13abdc9746512969328454f18faf8c595f64\
      2477fe96bb2a941d5bcd1d4ac8cc49880708fa9b378e3c4f3a9060bee67cf9a4\
      a4a695811051907e162753b56b0f6b410dba74d8a84b2a14b3144e0ef1284754\
      fd17ed950d5965b4b9dd46582db1178d169c6bc465b0d6ff9ca3928fef5b9ae4\
      e418fc15e83ebea0f87fa9ff5eed70050ded2849f47bf959d956850ce929851f\
      0d8115f635b105ee2e4e15d04b2454bf6f4fadf034b10403119cd8e3b92fcc5b";

/// The only generator the server is allowed to offer.
const DH_G: i32 = 3;

// ─── Error ────────────────────────────────────────────────────────────────────

/// Errors that can occur during auth key negotiation.
#[allow(missing_docs)]
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    InvalidNonce { got: [u8; 16], expected: [u8; 16] },
    InvalidPqSize { size: usize },
    FactorizationFailed { pq: u64 },
    UnknownFingerprints { fingerprints: Vec<i64> },
    DhParamsFail,
    InvalidServerNonce { got: [u8; 16], expected: [u8; 16] },
    EncryptedResponseNotPadded { len: usize },
    InvalidDhInnerData { error: mtp_tl::deserialize::Error },
    GUnexpected { got: i32 },
    DhPrimeMismatch,
    GParameterOutOfRange { low: BigUint, high: BigUint },
    DhGenFail,
    InvalidAnswerHash { got: [u8; 20], expected: [u8; 20] },
    InvalidNewNonceHash { got: [u8; 16], expected: [u8; 16] },
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNonce { got, expected } => {
                write!(f, "nonce mismatch: got {got:?}, expected {expected:?}")
            }
            Self::InvalidPqSize { size } => write!(f, "pq size {size} invalid (expected 8)"),
            Self::FactorizationFailed { pq } => write!(f, "could not factorize pq = {pq}"),
            Self::UnknownFingerprints { fingerprints } => {
                write!(f, "no known fingerprint in {fingerprints:?}")
            }
            Self::DhParamsFail => write!(f, "server returned DH params failure"),
            Self::InvalidServerNonce { got, expected } => {
                write!(f, "server_nonce mismatch: got {got:?}, expected {expected:?}")
            }
            Self::EncryptedResponseNotPadded { len } => {
                write!(f, "encrypted answer len {len} is not 16-byte aligned")
            }
            Self::InvalidDhInnerData { error } => {
                write!(f, "DH inner data deserialization error: {error}")
            }
            Self::GUnexpected { got } => write!(f, "unexpected DH generator g = {got}"),
            Self::DhPrimeMismatch => write!(f, "dh_prime is not the known 2048-bit modulus"),
            Self::GParameterOutOfRange { low, high } => {
                write!(f, "g_a not in range ({low}, {high})")
            }
            Self::DhGenFail => write!(f, "DH gen failed"),
            Self::InvalidAnswerHash { got, expected } => {
                write!(f, "answer hash mismatch: got {got:?}, expected {expected:?}")
            }
            Self::InvalidNewNonceHash { got, expected } => {
                write!(f, "new nonce hash mismatch: got {got:?}, expected {expected:?}")
            }
        }
    }
}

// ─── Step state ──────────────────────────────────────────────────────────────

/// State after step 1.
#[derive(Debug)]
pub struct Step1 {
    nonce: [u8; 16],
}

/// State after step 2.
#[derive(Debug)]
pub struct Step2 {
    nonce: [u8; 16],
    server_nonce: [u8; 16],
    new_nonce: [u8; 32],
}

/// State after step 3. Retains everything needed to regenerate the
/// client DH parameters if the server asks for a retry.
#[derive(Debug)]
pub struct Step3 {
    nonce: [u8; 16],
    server_nonce: [u8; 16],
    new_nonce: [u8; 32],
    dh_prime: BigUint,
    g_a: BigUint,
    key: [u8; 32],
    iv: [u8; 32],
    gab: BigUint,
    time_offset: i32,
}

/// The final output of a successful negotiation.
#[derive(Clone, Debug, PartialEq)]
pub struct Finished {
    /// The 256-byte authorization key.
    pub auth_key: [u8; 256],
    /// Clock skew in seconds relative to the server.
    pub time_offset: i32,
    /// Initial server salt (new_nonce[..8] XOR server_nonce[..8]).
    pub first_salt: i64,
}

/// Outcome of [`finish`]: either the key is ready, or the server asked
/// for another DH round (PQ phase is not restarted).
#[derive(Debug)]
pub enum NextStep {
    /// Negotiation complete.
    Done(Finished),
    /// Resend `request` and call [`finish`] again with the new answer.
    Retry {
        /// The regenerated `set_client_DH_params` request.
        request: functions::SetClientDhParams,
        /// State to feed into the next [`finish`] call.
        state: Step3,
    },
}

// ─── Step 1: req_pq_multi ────────────────────────────────────────────────────

/// Generate a `req_pq_multi` request. Returns the request + opaque state.
pub fn step1() -> Result<(functions::ReqPqMulti, Step1), Error> {
    let mut buf = [0u8; 16];
    getrandom::getrandom(&mut buf).expect("getrandom");
    do_step1(&buf)
}

/// Deterministic form of [`step1`] for tests.
pub fn do_step1(random: &[u8; 16]) -> Result<(functions::ReqPqMulti, Step1), Error> {
    let nonce = *random;
    Ok((functions::ReqPqMulti { nonce }, Step1 { nonce }))
}

// ─── Step 2: req_DH_params ───────────────────────────────────────────────────

/// Process `ResPQ` and generate `req_DH_params`.
pub fn step2(
    data: Step1,
    response: enums::ResPq,
) -> Result<(functions::ReqDhParams, Step2), Error> {
    let mut rnd = [0u8; 256];
    getrandom::getrandom(&mut rnd).expect("getrandom");
    do_step2(data, response, &rnd)
}

/// Deterministic form of [`step2`] for tests: `random[..32]` becomes the
/// new nonce, the rest pads the RSA block.
pub fn do_step2(
    data: Step1,
    response: enums::ResPq,
    random: &[u8; 256],
) -> Result<(functions::ReqDhParams, Step2), Error> {
    let Step1 { nonce } = data;
    let enums::ResPq::ResPq(res_pq) = response;

    check_nonce(&res_pq.nonce, &nonce)?;

    if res_pq.pq.len() != 8 {
        return Err(Error::InvalidPqSize { size: res_pq.pq.len() });
    }

    let pq = u64::from_be_bytes(res_pq.pq.as_slice().try_into().unwrap());
    let (p, q) = factorize(pq).ok_or(Error::FactorizationFailed { pq })?;

    let mut new_nonce = [0u8; 32];
    new_nonce.copy_from_slice(&random[..32]);

    fn trim_be(v: u64) -> Vec<u8> {
        let b = v.to_be_bytes();
        let skip = b.iter().position(|&x| x != 0).unwrap_or(7);
        b[skip..].to_vec()
    }

    let p_bytes = trim_be(p);
    let q_bytes = trim_be(q);

    let pq_inner = enums::PQInnerData::PQInnerData(types::PQInnerData {
        pq: pq.to_be_bytes().to_vec(),
        p: p_bytes.clone(),
        q: q_bytes.clone(),
        nonce,
        server_nonce: res_pq.server_nonce,
        new_nonce,
    })
    .to_bytes();

    let fingerprint = res_pq
        .server_public_key_fingerprints
        .iter()
        .copied()
        .find(|&fp| key_for_fingerprint(fp).is_some())
        .ok_or_else(|| Error::UnknownFingerprints {
            fingerprints: res_pq.server_public_key_fingerprints.clone(),
        })?;

    let key = key_for_fingerprint(fingerprint).unwrap();
    let ciphertext = rsa::do_encrypt_hashed(&pq_inner, &key, &random[32..]);

    Ok((
        functions::ReqDhParams {
            nonce,
            server_nonce: res_pq.server_nonce,
            p: p_bytes,
            q: q_bytes,
            public_key_fingerprint: fingerprint,
            encrypted_data: ciphertext,
        },
        Step2 { nonce, server_nonce: res_pq.server_nonce, new_nonce },
    ))
}

// ─── Step 3: set_client_DH_params ────────────────────────────────────────────

/// Process `ServerDhParams` and generate `set_client_DH_params`.
pub fn step3(
    data: Step2,
    response: enums::ServerDhParams,
) -> Result<(functions::SetClientDhParams, Step3), Error> {
    let mut rnd = [0u8; 272]; // 256 for the DH exponent, 16 for padding
    getrandom::getrandom(&mut rnd).expect("getrandom");
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i32;
    do_step3(data, response, &rnd, now)
}

/// Deterministic form of [`step3`] for tests.
pub fn do_step3(
    data: Step2,
    response: enums::ServerDhParams,
    random: &[u8; 272],
    now: i32,
) -> Result<(functions::SetClientDhParams, Step3), Error> {
    let Step2 { nonce, server_nonce, new_nonce } = data;

    let mut server_dh_ok = match response {
        enums::ServerDhParams::Fail(failure) => {
            check_nonce(&failure.nonce, &nonce)?;
            check_server_nonce(&failure.server_nonce, &server_nonce)?;
            let digest = {
                let mut sha = Sha1::new();
                sha.update(new_nonce);
                let out: [u8; 20] = sha.finalize().into();
                out
            };
            let mut expected_hash = [0u8; 16];
            expected_hash.copy_from_slice(&digest[4..]);
            check_new_nonce_hash(&failure.new_nonce_hash, &expected_hash)?;
            return Err(Error::DhParamsFail);
        }
        enums::ServerDhParams::Ok(x) => x,
    };

    check_nonce(&server_dh_ok.nonce, &nonce)?;
    check_server_nonce(&server_dh_ok.server_nonce, &server_nonce)?;

    if server_dh_ok.encrypted_answer.len() % 16 != 0 {
        return Err(Error::EncryptedResponseNotPadded {
            len: server_dh_ok.encrypted_answer.len(),
        });
    }

    let (key, iv) = generate_key_data_from_nonce(&server_nonce, &new_nonce);
    ige::ige_decrypt(&mut server_dh_ok.encrypted_answer, &key, &iv);
    let plain = server_dh_ok.encrypted_answer;

    if plain.len() < 20 {
        return Err(Error::InvalidDhInnerData {
            error: mtp_tl::deserialize::Error::UnexpectedEof,
        });
    }
    let got_hash: [u8; 20] = plain[..20].try_into().unwrap();
    let mut cursor = Cursor::from_slice(&plain[20..]);

    let inner = match enums::ServerDhInnerData::deserialize(&mut cursor) {
        Ok(enums::ServerDhInnerData::ServerDhInnerData(x)) => x,
        Err(e) => return Err(Error::InvalidDhInnerData { error: e }),
    };

    let expected_hash: [u8; 20] = {
        let mut sha = Sha1::new();
        sha.update(&plain[20..20 + cursor.pos()]);
        sha.finalize().into()
    };
    if got_hash != expected_hash {
        return Err(Error::InvalidAnswerHash { got: got_hash, expected: expected_hash });
    }

    check_nonce(&inner.nonce, &nonce)?;
    check_server_nonce(&inner.server_nonce, &server_nonce)?;

    if inner.g != DH_G {
        return Err(Error::GUnexpected { got: inner.g });
    }
    let dh_prime = BigUint::from_bytes_be(&inner.dh_prime);
    if dh_prime != known_dh_prime() {
        return Err(Error::DhPrimeMismatch);
    }
    let g_a = BigUint::from_bytes_be(&inner.g_a);
    check_g_a(&g_a, &dh_prime)?;

    let time_offset = inner.server_time.wrapping_sub(now);

    let (request, gab) = build_client_dh(
        &nonce,
        &server_nonce,
        &dh_prime,
        &g_a,
        &key,
        &iv,
        0,
        random,
    )?;

    Ok((
        request,
        Step3 {
            nonce,
            server_nonce,
            new_nonce,
            dh_prime,
            g_a,
            key,
            iv,
            gab,
            time_offset,
        },
    ))
}

/// Pick a fresh exponent `b`, compute `g_b` and `g_a^b`, and build the
/// encrypted `client_DH_inner_data` payload.
#[allow(clippy::too_many_arguments)]
fn build_client_dh(
    nonce: &[u8; 16],
    server_nonce: &[u8; 16],
    dh_prime: &BigUint,
    g_a: &BigUint,
    key: &[u8; 32],
    iv: &[u8; 32],
    retry_id: i64,
    random: &[u8; 272],
) -> Result<(functions::SetClientDhParams, BigUint), Error> {
    let g = BigUint::from(DH_G as u32);
    let b = BigUint::from_bytes_be(&random[..256]);
    let g_b = g.modpow(&b, dh_prime);
    let gab = g_a.modpow(&b, dh_prime);

    // Sanity on our own public value; a failure here means b was degenerate.
    check_g_a(&g_b, dh_prime)?;

    let client_dh_inner = enums::ClientDhInnerData::ClientDhInnerData(types::ClientDhInnerData {
        nonce: *nonce,
        server_nonce: *server_nonce,
        retry_id,
        g_b: g_b.to_bytes_be(),
    })
    .to_bytes();

    let digest: [u8; 20] = {
        let mut sha = Sha1::new();
        sha.update(&client_dh_inner);
        sha.finalize().into()
    };

    let pad_len = (16 - ((20 + client_dh_inner.len()) % 16)) % 16;

    let mut hashed = Vec::with_capacity(20 + client_dh_inner.len() + pad_len);
    hashed.extend_from_slice(&digest);
    hashed.extend_from_slice(&client_dh_inner);
    hashed.extend_from_slice(&random[256..256 + pad_len]);

    ige::ige_encrypt(&mut hashed, key, iv);

    Ok((
        functions::SetClientDhParams {
            nonce: *nonce,
            server_nonce: *server_nonce,
            encrypted_data: hashed,
        },
        gab,
    ))
}

// ─── finish ──────────────────────────────────────────────────────────────────

/// Finalize the negotiation, or regenerate parameters on `dh_gen_retry`.
pub fn finish(
    data: Step3,
    response: enums::SetClientDhParamsAnswer,
) -> Result<NextStep, Error> {
    let mut rnd = [0u8; 272];
    getrandom::getrandom(&mut rnd).expect("getrandom");
    do_finish(data, response, &rnd)
}

/// Deterministic form of [`finish`] for tests; `random` is only consumed
/// on the retry path.
pub fn do_finish(
    data: Step3,
    response: enums::SetClientDhParamsAnswer,
    random: &[u8; 272],
) -> Result<NextStep, Error> {
    struct DhData {
        nonce: [u8; 16],
        server_nonce: [u8; 16],
        hash: [u8; 16],
        num: u8,
    }

    let dh = match response {
        enums::SetClientDhParamsAnswer::DhGenOk(x) => DhData {
            nonce: x.nonce,
            server_nonce: x.server_nonce,
            hash: x.new_nonce_hash1,
            num: 1,
        },
        enums::SetClientDhParamsAnswer::DhGenRetry(x) => DhData {
            nonce: x.nonce,
            server_nonce: x.server_nonce,
            hash: x.new_nonce_hash2,
            num: 2,
        },
        enums::SetClientDhParamsAnswer::DhGenFail(x) => DhData {
            nonce: x.nonce,
            server_nonce: x.server_nonce,
            hash: x.new_nonce_hash3,
            num: 3,
        },
    };

    check_nonce(&dh.nonce, &data.nonce)?;
    check_server_nonce(&dh.server_nonce, &data.server_nonce)?;

    let mut key_bytes = [0u8; 256];
    let gab_bytes = data.gab.to_bytes_be();
    let skip = 256 - gab_bytes.len();
    key_bytes[skip..].copy_from_slice(&gab_bytes);

    let auth_key = AuthKey::from_bytes(key_bytes);
    let expected_hash = auth_key.calc_new_nonce_hash(&data.new_nonce, dh.num);
    check_new_nonce_hash(&dh.hash, &expected_hash)?;

    match dh.num {
        1 => {
            let first_salt = {
                let mut buf = [0u8; 8];
                for ((dst, a), b) in buf
                    .iter_mut()
                    .zip(&data.new_nonce[..8])
                    .zip(&data.server_nonce[..8])
                {
                    *dst = a ^ b;
                }
                i64::from_le_bytes(buf)
            };
            Ok(NextStep::Done(Finished {
                auth_key: auth_key.to_bytes(),
                time_offset: data.time_offset,
                first_salt,
            }))
        }
        2 => {
            // Same PQ phase, fresh exponent; the rejected key's aux hash
            // becomes the retry id.
            let retry_id = i64::from_le_bytes(auth_key.aux_hash());
            let (request, gab) = build_client_dh(
                &data.nonce,
                &data.server_nonce,
                &data.dh_prime,
                &data.g_a,
                &data.key,
                &data.iv,
                retry_id,
                random,
            )?;
            Ok(NextStep::Retry {
                request,
                state: Step3 { gab, ..data },
            })
        }
        _ => Err(Error::DhGenFail),
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn known_dh_prime() -> BigUint {
    BigUint::parse_bytes(DH_PRIME_HEX, 16).unwrap()
}

fn check_nonce(got: &[u8; 16], expected: &[u8; 16]) -> Result<(), Error> {
    if got == expected {
        Ok(())
    } else {
        Err(Error::InvalidNonce { got: *got, expected: *expected })
    }
}

fn check_server_nonce(got: &[u8; 16], expected: &[u8; 16]) -> Result<(), Error> {
    if got == expected {
        Ok(())
    } else {
        Err(Error::InvalidServerNonce { got: *got, expected: *expected })
    }
}

fn check_new_nonce_hash(got: &[u8; 16], expected: &[u8; 16]) -> Result<(), Error> {
    if got == expected {
        Ok(())
    } else {
        Err(Error::InvalidNewNonceHash { got: *got, expected: *expected })
    }
}

/// `1 < value < p - 1`, and at least `2^(2048-64)` away from both ends.
fn check_g_a(value: &BigUint, dh_prime: &BigUint) -> Result<(), Error> {
    let one = BigUint::from(1u32);
    let safety: BigUint = &one << (2048u32 - 64);

    if !(&one < value && value < &(dh_prime - &one)) {
        return Err(Error::GParameterOutOfRange {
            low: one,
            high: dh_prime - BigUint::from(1u32),
        });
    }
    if !(&safety <= value && value < &(dh_prime - &safety)) {
        return Err(Error::GParameterOutOfRange {
            low: safety.clone(),
            high: dh_prime - &safety,
        });
    }
    Ok(())
}

/// RSA key by server fingerprint. Includes both production and test keys.
#[allow(clippy::unreadable_literal)]
pub fn key_for_fingerprint(fp: i64) -> Option<rsa::Key> {
    Some(match fp {
        -3414540481677951611 => rsa::Key::new(
            "29379598170669337022986177149456128565388431120058863768162556424047512191330847455146576344487764408661701890505066208632169112269581063774293102577308490531282748465986139880977280302242772832972539403531316010870401287642763009136156734339538042419388722777357134487746169093539093850251243897188928735903389451772730245253062963384108812842079887538976360465290946139638691491496062099570836476454855996319192747663615955633778034897140982517446405334423701359108810182097749467210509584293428076654573384828809574217079944388301239431309115013843331317877374435868468779972014486325557807783825502498215169806323",
            "65537"
        )?,
        -5595554452916591101 => rsa::Key::new(
            "25342889448840415564971689590713473206898847759084779052582026594546022463853940585885215951168491965708222649399180603818074200620463776135424884632162512403163793083921641631564740959529419359595852941166848940585952337613333022396096584117954892216031229237302943701877588456738335398602461675225081791820393153757504952636234951323237820036543581047826906120927972487366805292115792231423684261262330394324750785450942589751755390156647751460719351439969059949569615302809050721500330239005077889855323917509948255722081644689442127297605422579707142646660768825302832201908302295573257427896031830742328565032949",
            "65537"
        )?,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn g_a_hard_bounds_are_rejected() {
        let p = known_dh_prime();
        assert!(check_g_a(&BigUint::from(0u32), &p).is_err());
        assert!(check_g_a(&BigUint::from(1u32), &p).is_err());
        assert!(check_g_a(&(&p - 1u32), &p).is_err());
        assert!(check_g_a(&p, &p).is_err());
    }

    #[test]
    fn g_a_safety_band_lower_edge_is_inclusive() {
        let p = known_dh_prime();
        let safety: BigUint = &BigUint::from(1u32) << (2048u32 - 64);
        assert!(check_g_a(&(&safety - 1u32), &p).is_err());
        assert!(check_g_a(&safety, &p).is_ok());
    }

    #[test]
    fn g_a_safety_band_upper_edge_is_exclusive() {
        let p = known_dh_prime();
        let safety: BigUint = &BigUint::from(1u32) << (2048u32 - 64);
        assert!(check_g_a(&(&p - &safety), &p).is_err());
        assert!(check_g_a(&(&p - &safety - 1u32), &p).is_ok());
    }
}
