//! Contract digests.
//!
//! A rendered contract is fingerprinted so a request, its log lines and any
//! stored response can be correlated, and so two renderings can be compared
//! cheaply.
//!
//! - algorithm: **FNV-1a 64-bit**
//! - input: the UTF-8 bytes of the rendered prompt
//! - output: `"fnv1a64:<16 lowercase hex digits>"`
//!
//! Not a security primitive.

pub const CONTRACT_DIGEST_PREFIX: &str = "fnv1a64:";

pub fn fnv1a64_digest_bytes(bytes: &[u8]) -> String {
    const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x00000100000001b3;

    let mut hash = FNV_OFFSET_BASIS;
    for b in bytes {
        hash ^= (*b) as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }

    format!("{CONTRACT_DIGEST_PREFIX}{hash:016x}")
}

pub fn contract_digest(prompt: &str) -> String {
    fnv1a64_digest_bytes(prompt.as_bytes())
}
