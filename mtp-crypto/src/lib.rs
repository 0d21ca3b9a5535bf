//! Cryptographic primitives for the MTProto transport.
//!
//! Provides:
//! - AES-256-IGE encryption/decryption
//! - SHA-1 / SHA-256 hash macros
//! - Pollard-rho PQ factorization
//! - RSA encryption of the handshake inner data
//! - `AuthKey` — the 256-byte session key
//! - MTProto 2.0 message encryption / decryption
//! - DH nonce→key derivation
//! - SRP password proofs

#![deny(unsafe_code)]

mod auth_key;
mod factorize;
pub mod ige;
pub mod rsa;
mod sha;
pub mod srp;

pub use auth_key::AuthKey;
pub use factorize::factorize;

// ─── MTProto 2.0 encrypt / decrypt ───────────────────────────────────────────

/// Errors from [`decrypt_data_v2`].
#[derive(Clone, Debug, PartialEq)]
pub enum DecryptError {
    /// Ciphertext too short or not block-aligned.
    InvalidBuffer,
    /// The `auth_key_id` in the ciphertext does not match our key.
    AuthKeyMismatch,
    /// The `msg_key` in the ciphertext does not match our computed value.
    MessageKeyMismatch,
}

impl std::fmt::Display for DecryptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBuffer => write!(f, "invalid ciphertext buffer length"),
            Self::AuthKeyMismatch => write!(f, "auth_key_id mismatch"),
            Self::MessageKeyMismatch => write!(f, "msg_key mismatch"),
        }
    }
}
impl std::error::Error for DecryptError {}

#[derive(Clone, Copy)]
enum Side {
    Client,
    Server,
}

impl Side {
    fn x(&self) -> usize {
        match self {
            Side::Client => 0,
            Side::Server => 8,
        }
    }
}

fn calc_key(auth_key: &AuthKey, msg_key: &[u8; 16], side: Side) -> ([u8; 32], [u8; 32]) {
    let x = side.x();
    let sha_a = sha256!(msg_key, &auth_key.data[x..x + 36]);
    let sha_b = sha256!(&auth_key.data[40 + x..40 + x + 36], msg_key);

    let mut aes_key = [0u8; 32];
    aes_key[..8].copy_from_slice(&sha_a[..8]);
    aes_key[8..24].copy_from_slice(&sha_b[8..24]);
    aes_key[24..].copy_from_slice(&sha_a[24..]);

    let mut aes_iv = [0u8; 32];
    aes_iv[..8].copy_from_slice(&sha_b[..8]);
    aes_iv[8..24].copy_from_slice(&sha_a[8..24]);
    aes_iv[24..].copy_from_slice(&sha_b[24..]);

    (aes_key, aes_iv)
}

/// Smallest padding of at least 12 bytes that makes `len` a multiple of 16.
fn padding_len(len: usize) -> usize {
    let mut pad = (16 - len % 16) % 16;
    if pad < 12 {
        pad += 16;
    }
    pad
}

fn encrypt_data(plain: &[u8], auth_key: &AuthKey, rnd: &[u8; 32], side: Side) -> Vec<u8> {
    let pad = padding_len(plain.len());

    let mut padded = Vec::with_capacity(plain.len() + pad);
    padded.extend_from_slice(plain);
    padded.extend_from_slice(&rnd[..pad]);

    let x = side.x();
    let msg_key_large = sha256!(&auth_key.data[88 + x..88 + x + 32], &padded);
    let mut msg_key = [0u8; 16];
    msg_key.copy_from_slice(&msg_key_large[8..24]);

    let (key, iv) = calc_key(auth_key, &msg_key, side);
    ige::ige_encrypt(&mut padded, &key, &iv);

    let mut out = Vec::with_capacity(24 + padded.len());
    out.extend_from_slice(&auth_key.key_id);
    out.extend_from_slice(&msg_key);
    out.extend_from_slice(&padded);
    out
}

fn decrypt_data<'a>(
    buffer: &'a mut [u8],
    auth_key: &AuthKey,
    side: Side,
) -> Result<&'a [u8], DecryptError> {
    if buffer.len() < 24 || (buffer.len() - 24) % 16 != 0 {
        return Err(DecryptError::InvalidBuffer);
    }
    if auth_key.key_id != buffer[..8] {
        return Err(DecryptError::AuthKeyMismatch);
    }
    let mut msg_key = [0u8; 16];
    msg_key.copy_from_slice(&buffer[8..24]);

    let (key, iv) = calc_key(auth_key, &msg_key, side);
    ige::ige_decrypt(&mut buffer[24..], &key, &iv);

    let x = side.x();
    let our_key = sha256!(&auth_key.data[88 + x..88 + x + 32], &buffer[24..]);
    if msg_key != our_key[8..24] {
        return Err(DecryptError::MessageKeyMismatch);
    }
    Ok(&buffer[24..])
}

/// Encrypt an outgoing (client→server) envelope using MTProto 2.0.
///
/// Returns the wire frame `key_id ∥ msg_key ∥ ciphertext`. The random
/// padding makes every output distinct even for identical envelopes.
pub fn encrypt_data_v2(plain: &[u8], auth_key: &AuthKey) -> Vec<u8> {
    let mut rnd = [0u8; 32];
    getrandom::getrandom(&mut rnd).expect("getrandom failed");
    do_encrypt_data_v2(plain, auth_key, &rnd)
}

pub fn do_encrypt_data_v2(plain: &[u8], auth_key: &AuthKey, rnd: &[u8; 32]) -> Vec<u8> {
    encrypt_data(plain, auth_key, rnd, Side::Client)
}

/// Decrypt an incoming (server→client) MTProto 2.0 frame.
///
/// `buffer` must start with `key_id ∥ msg_key ∥ ciphertext`; the `msg_key`
/// is recomputed from the plaintext and compared byte-for-byte. On success
/// returns the decrypted envelope (including its padding).
pub fn decrypt_data_v2<'a>(
    buffer: &'a mut [u8],
    auth_key: &AuthKey,
) -> Result<&'a [u8], DecryptError> {
    decrypt_data(buffer, auth_key, Side::Server)
}

/// Encrypt an envelope in the server→client direction.
///
/// The engine never sends these; mock servers in tests use it to produce
/// frames that [`decrypt_data_v2`] accepts.
pub fn encrypt_data_from_server(plain: &[u8], auth_key: &AuthKey) -> Vec<u8> {
    let mut rnd = [0u8; 32];
    getrandom::getrandom(&mut rnd).expect("getrandom failed");
    encrypt_data(plain, auth_key, &rnd, Side::Server)
}

/// Decrypt a client→server frame, the counterpart of
/// [`encrypt_data_from_server`] for mock servers.
pub fn decrypt_data_from_client<'a>(
    buffer: &'a mut [u8],
    auth_key: &AuthKey,
) -> Result<&'a [u8], DecryptError> {
    decrypt_data(buffer, auth_key, Side::Client)
}

/// Derive `(key, iv)` from nonces for the encrypted DH answer.
pub fn generate_key_data_from_nonce(
    server_nonce: &[u8; 16],
    new_nonce: &[u8; 32],
) -> ([u8; 32], [u8; 32]) {
    let h1 = sha1!(new_nonce, server_nonce);
    let h2 = sha1!(server_nonce, new_nonce);
    let h3 = sha1!(new_nonce, new_nonce);

    let mut key = [0u8; 32];
    key[..20].copy_from_slice(&h1);
    key[20..].copy_from_slice(&h2[..12]);

    let mut iv = [0u8; 32];
    iv[..8].copy_from_slice(&h2[12..]);
    iv[8..28].copy_from_slice(&h3);
    iv[28..].copy_from_slice(&new_nonce[..4]);

    (key, iv)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> AuthKey {
        AuthKey::from_bytes(core::array::from_fn(|i| i as u8))
    }

    #[test]
    fn padding_is_at_least_12_and_aligns_to_16() {
        for len in 0..200 {
            let pad = padding_len(len);
            assert!(pad >= 12, "len={len} pad={pad}");
            assert!(pad < 28, "len={len} pad={pad}");
            assert_eq!((len + pad) % 16, 0, "len={len} pad={pad}");
        }
    }

    #[test]
    fn client_frames_roundtrip() {
        let key = test_key();
        let plain = b"0123456789abcdef0123456789abcdef";

        let mut frame = do_encrypt_data_v2(plain, &key, &[0x55; 32]);
        assert_eq!(&frame[..8], &key.key_id());
        assert_eq!((frame.len() - 24) % 16, 0);

        let decrypted = decrypt_data_from_client(&mut frame, &key).unwrap();
        assert_eq!(&decrypted[..plain.len()], plain);
    }

    #[test]
    fn server_frames_roundtrip() {
        let key = test_key();
        let plain = [9u8; 48];
        let mut frame = encrypt_data_from_server(&plain, &key);
        let decrypted = decrypt_data_v2(&mut frame, &key).unwrap();
        assert_eq!(&decrypted[..plain.len()], &plain);
    }

    #[test]
    fn directions_are_not_interchangeable() {
        let key = test_key();
        let mut frame = do_encrypt_data_v2(&[1u8; 32], &key, &[0; 32]);
        assert_eq!(
            decrypt_data_v2(&mut frame, &key),
            Err(DecryptError::MessageKeyMismatch)
        );
    }

    #[test]
    fn corrupted_ciphertext_fails_msg_key_check() {
        let key = test_key();
        let mut frame = encrypt_data_from_server(&[7u8; 32], &key);
        let last = frame.len() - 1;
        frame[last] ^= 0xff;
        assert_eq!(
            decrypt_data_v2(&mut frame, &key),
            Err(DecryptError::MessageKeyMismatch)
        );
    }

    #[test]
    fn wrong_key_id_is_rejected() {
        let key = test_key();
        let mut frame = encrypt_data_from_server(&[7u8; 32], &key);
        frame[0] ^= 1;
        assert_eq!(
            decrypt_data_v2(&mut frame, &key),
            Err(DecryptError::AuthKeyMismatch)
        );
    }

    #[test]
    fn short_or_unaligned_frames_are_rejected() {
        let key = test_key();
        assert_eq!(
            decrypt_data_v2(&mut [0u8; 23], &key),
            Err(DecryptError::InvalidBuffer)
        );
        assert_eq!(
            decrypt_data_v2(&mut [0u8; 25], &key),
            Err(DecryptError::InvalidBuffer)
        );
    }

    #[test]
    fn nonce_key_derivation_layout() {
        let server_nonce = [1u8; 16];
        let new_nonce = [2u8; 32];
        let (key, iv) = generate_key_data_from_nonce(&server_nonce, &new_nonce);

        let h1 = sha1!(new_nonce, server_nonce);
        let h2 = sha1!(server_nonce, new_nonce);
        assert_eq!(key[..20], h1);
        assert_eq!(key[20..], h2[..12]);
        assert_eq!(iv[28..], new_nonce[..4]);
    }
}
