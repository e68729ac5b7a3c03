/// Compute the BLAKE3 hex digest of bundle contents
pub fn digest(contents: &[u8]) -> String {
    blake3::hash(contents).to_hex().to_string()
}
