//! Input digests for count reports.
//!
//! A count is only meaningful together with the exact `.gr` / `.td` inputs it
//! was computed from. Reports carry a **simple, deterministic,
//! non-cryptographic** digest of those inputs:
//!
//! - algorithm: **FNV-1a 64-bit**
//! - input: each part's bytes followed by a `0xff` separator (so that
//!   `["ab", "c"]` and `["a", "bc"]` differ)
//! - output: `"fnv1a64:<16 lowercase hex digits>"`
//!
//! This is an identity tool, not a security primitive.

/// Prefix used in serialized digests.
pub const INPUT_DIGEST_PREFIX: &str = "fnv1a64:";

const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x00000100000001b3;
const PART_SEPARATOR: u8 = 0xff;

/// Digest a sequence of input parts (e.g. conflicts, solutions, decomposition).
pub fn fnv1a64_digest<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut hash = FNV_OFFSET_BASIS;
    for part in parts {
        for &b in part.iter().chain(std::iter::once(&PART_SEPARATOR)) {
            hash ^= b as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }
    format!("{INPUT_DIGEST_PREFIX}{hash:016x}")
}
