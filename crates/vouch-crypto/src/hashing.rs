/// BLAKE3 digest (32 bytes).
pub type Hash = [u8; 32];

/// Hash arbitrary data using BLAKE3.
pub fn hash(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}

/// Hex-encoded BLAKE3 digest of `data`.
pub fn hash_hex(data: &[u8]) -> String {
    hex::encode(hash(data))
}

/// Hash a sequence of fields with length prefixes so that
/// `["ab", "c"]` and `["a", "bc"]` never collide.
pub fn hash_fields(fields: &[&[u8]]) -> Hash {
    let mut hasher = blake3::Hasher::new();
    for field in fields {
        hasher.update(&(field.len() as u64).to_le_bytes());
        hasher.update(field);
    }
    *hasher.finalize().as_bytes()
}
