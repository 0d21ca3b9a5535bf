//! AES-256 in IGE (Infinite Garble Extension) mode.
//!
//! IGE chains both the previous ciphertext and the previous plaintext
//! block into each step, so a single corrupted block garbles everything
//! after it. The 32-byte IV seeds the two chaining registers.

use aes::Aes256;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};

/// Encrypt `buffer` in place. `buffer.len()` must be a multiple of 16.
pub fn ige_encrypt(buffer: &mut [u8], key: &[u8; 32], iv: &[u8; 32]) {
    assert_eq!(buffer.len() % 16, 0, "IGE input must be block-aligned");

    let cipher = Aes256::new(GenericArray::from_slice(key));

    // x chains ciphertext, y chains plaintext
    let mut x: [u8; 16] = iv[..16].try_into().unwrap();
    let mut y: [u8; 16] = iv[16..].try_into().unwrap();

    for chunk in buffer.chunks_exact_mut(16) {
        let plain: [u8; 16] = chunk.try_into().unwrap();

        for (b, p) in chunk.iter_mut().zip(x.iter()) {
            *b ^= p;
        }
        cipher.encrypt_block(GenericArray::from_mut_slice(chunk));
        for (b, p) in chunk.iter_mut().zip(y.iter()) {
            *b ^= p;
        }

        x.copy_from_slice(chunk);
        y = plain;
    }
}

/// Decrypt `buffer` in place. `buffer.len()` must be a multiple of 16.
pub fn ige_decrypt(buffer: &mut [u8], key: &[u8; 32], iv: &[u8; 32]) {
    assert_eq!(buffer.len() % 16, 0, "IGE input must be block-aligned");

    let cipher = Aes256::new(GenericArray::from_slice(key));

    let mut x: [u8; 16] = iv[..16].try_into().unwrap();
    let mut y: [u8; 16] = iv[16..].try_into().unwrap();

    for chunk in buffer.chunks_exact_mut(16) {
        let encrypted: [u8; 16] = chunk.try_into().unwrap();

        for (b, p) in chunk.iter_mut().zip(y.iter()) {
            *b ^= p;
        }
        cipher.decrypt_block(GenericArray::from_mut_slice(chunk));
        for (b, p) in chunk.iter_mut().zip(x.iter()) {
            *b ^= p;
        }

        x = encrypted;
        y.copy_from_slice(chunk);
    }
}
