//! Score derivation.
//!
//! Every key is placed in the skip list by a 64-bit score, with the raw key
//! bytes breaking ties. How the score is computed decides what the list's
//! natural order means:
//!
//! - [`ScoreMode::Hashed`] spreads keys with FNV-1a. Placement is uniform but
//!   the order carries no meaning for callers.
//! - [`ScoreMode::Ordered`] uses the first eight key bytes as a big-endian
//!   integer. Combined with the key tie-break this is exactly lexicographic
//!   byte order, so prefix scans can seek instead of walking everything.

/// The ordering key of a skip list element.
pub type Score = u64;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// How the store turns a key into a [`Score`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreMode {
    /// FNV-1a hash of the key. Iteration order is arbitrary but stable.
    #[default]
    Hashed,
    /// Big-endian prefix of the key. Iteration order is key order.
    Ordered,
}

impl ScoreMode {
    /// Computes the score for `key` under this mode.
    #[inline]
    pub fn score(self, key: &[u8]) -> Score {
        match self {
            ScoreMode::Hashed => fnv1a(key),
            ScoreMode::Ordered => prefix_score(key),
        }
    }

    /// Returns true if the list order equals lexicographic key order.
    #[inline]
    pub fn preserves_key_order(self) -> bool {
        matches!(self, ScoreMode::Ordered)
    }
}

/// 64-bit FNV-1a over the raw bytes.
#[inline]
pub fn fnv1a(key: &[u8]) -> Score {
    key.iter().fold(FNV_OFFSET_BASIS, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}

/// First eight bytes of `key` read big-endian, zero padded on the right.
#[inline]
pub fn prefix_score(key: &[u8]) -> Score {
    let mut buf = [0u8; 8];
    let n = key.len().min(8);
    buf[..n].copy_from_slice(&key[..n]);
    u64::from_be_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fnv1a_reference_vectors() {
        assert_eq!(fnv1a(b""), 0xcbf29ce484222325);
        assert_eq!(fnv1a(b"a"), 0xaf63dc4c8601ec8c);
        assert_eq!(fnv1a(b"foobar"), 0x85944171f73967e8);
    }

    #[test]
    fn test_hashed_is_deterministic() {
        let mode = ScoreMode::Hashed;
        assert_eq!(mode.score(b"user:1"), mode.score(b"user:1"));
        assert_ne!(mode.score(b"user:1"), mode.score(b"user:2"));
        assert!(!mode.preserves_key_order());
    }

    #[test]
    fn test_prefix_score_agrees_with_key_order() {
        let raw: [&[u8]; 9] = [
            b"\xff", b"b", b"abcdefghi", b"a\0b", b"", b"ab", b"a", b"abcdefgh", b"a\0",
        ];
        let mut keys = raw.to_vec();
        keys.sort();

        // (score, key) pairs must sort the same way as the keys alone
        let mut pairs: Vec<(Score, &[u8])> =
            keys.iter().map(|k| (prefix_score(k), *k)).collect();
        pairs.sort();
        let reordered: Vec<&[u8]> = pairs.into_iter().map(|(_, k)| k).collect();
        assert_eq!(reordered, keys);
        assert!(ScoreMode::Ordered.preserves_key_order());
    }

    #[test]
    fn test_prefix_score_pads_short_keys() {
        assert_eq!(prefix_score(b""), 0);
        assert_eq!(prefix_score(b"\x01"), 0x0100_0000_0000_0000);
        assert_eq!(prefix_score(b"abcdefgh"), prefix_score(b"abcdefghXYZ"));
    }
}
