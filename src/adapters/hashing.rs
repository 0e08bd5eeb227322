use crate::ports::PasswordHasher;

/// Keyed BLAKE3 digests. The key is derived from the application secret and the password salt,
/// so digests do not transfer between deployments with different secrets.
pub struct Blake3PasswordHasher {
    key: [u8; 32],
}

impl Blake3PasswordHasher {
    pub fn new(secret_key: &str, salt: &str) -> Self {
        Self { key: blake3::derive_key(secret_key, salt.as_bytes()) }
    }
}

impl PasswordHasher for Blake3PasswordHasher {
    fn hash(&self, plaintext: &str) -> String {
        blake3::keyed_hash(&self.key, plaintext.as_bytes()).to_hex().to_string()
    }

    fn verify(&self, digest: &str, plaintext: &str) -> bool {
        match blake3::Hash::from_hex(digest) {
            // Hash equality is constant time.
            Ok(expected) => expected == blake3::keyed_hash(&self.key, plaintext.as_bytes()),
            Err(_) => false,
        }
    }
}
