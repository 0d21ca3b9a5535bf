//! The 256-byte authorization key produced by the DH handshake.

use crate::sha1;

/// A negotiated authorization key plus its pre-computed identifiers.
#[derive(Clone)]
pub struct AuthKey {
    pub(crate) data: [u8; 256],
    pub(crate) aux_hash: [u8; 8],
    pub(crate) key_id: [u8; 8],
}

impl AuthKey {
    /// Construct from the raw 256-byte DH output.
    pub fn from_bytes(data: [u8; 256]) -> Self {
        let sha = sha1!(&data);
        let mut aux_hash = [0u8; 8];
        aux_hash.copy_from_slice(&sha[..8]);
        let mut key_id = [0u8; 8];
        key_id.copy_from_slice(&sha[12..20]);
        Self { data, aux_hash, key_id }
    }

    /// Return the raw 256-byte representation.
    pub fn to_bytes(&self) -> [u8; 256] {
        self.data
    }

    /// The 8-byte key identifier (SHA-1(key)[12..20]).
    pub fn key_id(&self) -> [u8; 8] {
        self.key_id
    }

    /// The 8-byte auxiliary hash (SHA-1(key)[..8]), used as the retry id
    /// during DH renegotiation.
    pub fn aux_hash(&self) -> [u8; 8] {
        self.aux_hash
    }

    /// Compute the new-nonce hash needed for `dh_gen_{ok,retry,fail}`
    /// verification (`number` is 1, 2 or 3 respectively).
    pub fn calc_new_nonce_hash(&self, new_nonce: &[u8; 32], number: u8) -> [u8; 16] {
        let sha = sha1!(new_nonce, [number], self.aux_hash);
        let mut out = [0u8; 16];
        out.copy_from_slice(&sha[4..]);
        out
    }
}

impl std::fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthKey(id={})", u64::from_le_bytes(self.key_id))
    }
}

impl PartialEq for AuthKey {
    fn eq(&self, other: &Self) -> bool {
        self.key_id == other.key_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_derive_from_sha1() {
        let key = AuthKey::from_bytes([7u8; 256]);
        let sha = sha1!(&[7u8; 256]);
        assert_eq!(key.aux_hash(), sha[..8]);
        assert_eq!(key.key_id(), sha[12..20]);
    }

    #[test]
    fn new_nonce_hash_uses_middle_sixteen_bytes() {
        let key = AuthKey::from_bytes([1u8; 256]);
        let new_nonce = [9u8; 32];
        let expected = sha1!(new_nonce, [2u8], key.aux_hash());
        assert_eq!(key.calc_new_nonce_hash(&new_nonce, 2), expected[4..]);
    }
}
