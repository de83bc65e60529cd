//! Binary representation and total order over `(score, hash)` pairs.
//!
//! A [`ScheduleKey`] is the index key of the schedule table: smaller score sorts
//! first, ties are broken by hash. Rather than registering a custom LMDB
//! comparator, the key is encoded so that plain byte-lexicographic order (the
//! store's default) already matches the desired total order — the alternative
//! spec.md §9 calls out explicitly. `score` is encoded as the big-endian bytes of
//! its IEEE-754 bit pattern (valid because scores are never negative and never
//! NaN, see [`ScheduleKey::new`]), `hash` as big-endian `u64`. Concatenated, the
//! 16-byte key sorts exactly as `(score asc, hash asc)`.

use std::borrow::Cow;
use std::cmp::Ordering;

use crate::error::Error;

pub const ENCODED_LEN: usize = 16;

/// `(score, hash)` index key with the comparator-free total order baked into its
/// byte encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleKey {
    pub score: f64,
    pub hash: u64,
}

impl ScheduleKey {
    /// Builds a key, rejecting NaN scores as spec.md §3 requires.
    pub fn new(score: f64, hash: u64) -> Result<Self, Error> {
        if score.is_nan() {
            return Err(Error::InvalidArgument("score must not be NaN".into()));
        }
        Ok(Self { score, hash })
    }

    pub fn cmp_total(&self, other: &Self) -> Ordering {
        debug_assert!(!self.score.is_nan() && !other.score.is_nan());
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.hash.cmp(&other.hash))
    }

    fn sortable_bits(score: f64) -> u64 {
        debug_assert!(score >= 0.0 && !score.is_nan());
        // For non-negative finite floats the raw IEEE-754 bit pattern already
        // increases monotonically with the value, so no sign-flip is needed.
        score.to_bits()
    }

    pub(crate) fn encode(&self) -> [u8; ENCODED_LEN] {
        let mut buf = [0u8; ENCODED_LEN];
        buf[0..8].copy_from_slice(&Self::sortable_bits(self.score).to_be_bytes());
        buf[8..16].copy_from_slice(&self.hash.to_be_bytes());
        buf
    }

    pub(crate) fn decode(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != ENCODED_LEN {
            // A malformed key size can only come from store corruption or a
            // comparator/codec mismatch; both are fatal internal errors.
            return Err(Error::Internal(format!(
                "schedule key has wrong length: expected {ENCODED_LEN}, got {}",
                bytes.len()
            )));
        }
        let mut score_bits = [0u8; 8];
        score_bits.copy_from_slice(&bytes[0..8]);
        let mut hash_bytes = [0u8; 8];
        hash_bytes.copy_from_slice(&bytes[8..16]);
        let score = f64::from_bits(u64::from_be_bytes(score_bits));
        let hash = u64::from_be_bytes(hash_bytes);
        Ok(Self { score, hash })
    }
}

/// `heed` codec for [`ScheduleKey`], implementing the encoding above.
pub struct ScheduleKeyCodec;

impl<'a> heed::BytesEncode<'a> for ScheduleKeyCodec {
    type EItem = ScheduleKey;

    fn bytes_encode(item: &'a Self::EItem) -> Result<Cow<'a, [u8]>, heed::BoxedError> {
        Ok(Cow::Owned(item.encode().to_vec()))
    }
}

impl<'a> heed::BytesDecode<'a> for ScheduleKeyCodec {
    type DItem = ScheduleKey;

    fn bytes_decode(bytes: &'a [u8]) -> Result<Self::DItem, heed::BoxedError> {
        ScheduleKey::decode(bytes).map_err(|e| Box::new(e) as heed::BoxedError)
    }
}

/// `heed` codec for the `f32` frequency stored alongside each key.
pub struct FreqCodec;

impl<'a> heed::BytesEncode<'a> for FreqCodec {
    type EItem = f32;

    fn bytes_encode(item: &'a Self::EItem) -> Result<Cow<'a, [u8]>, heed::BoxedError> {
        Ok(Cow::Owned(item.to_ne_bytes().to_vec()))
    }
}

impl<'a> heed::BytesDecode<'a> for FreqCodec {
    type DItem = f32;

    fn bytes_decode(bytes: &'a [u8]) -> Result<Self::DItem, heed::BoxedError> {
        let arr: [u8; 4] = bytes.try_into().map_err(|_| {
            Box::new(Error::Internal(format!(
                "frequency value has wrong length: expected 4, got {}",
                bytes.len()
            ))) as heed::BoxedError
        })?;
        Ok(f32::from_ne_bytes(arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_nan_score() {
        assert!(ScheduleKey::new(f64::NAN, 1).is_err());
    }

    #[test]
    fn encode_decode_roundtrip() {
        let k = ScheduleKey::new(3.5, 42).unwrap();
        let decoded = ScheduleKey::decode(&k.encode()).unwrap();
        assert_eq!(k, decoded);
    }

    #[test]
    fn byte_order_matches_numeric_order() {
        let low = ScheduleKey::new(1.0, 5).unwrap();
        let high = ScheduleKey::new(2.0, 0).unwrap();
        assert!(low.encode() < high.encode());
        assert_eq!(low.cmp_total(&high), Ordering::Less);
    }

    #[test]
    fn ties_broken_by_hash() {
        let a = ScheduleKey::new(1.0, 1).unwrap();
        let b = ScheduleKey::new(1.0, 2).unwrap();
        assert!(a.encode() < b.encode());
        assert_eq!(a.cmp_total(&b), Ordering::Less);
    }

    #[test]
    fn zero_score_is_smallest_possible() {
        let zero = ScheduleKey::new(0.0, u64::MAX).unwrap();
        let tiny = ScheduleKey::new(f64::MIN_POSITIVE, 0).unwrap();
        assert!(zero.encode() < tiny.encode());
    }

    proptest::proptest! {
        #[test]
        fn encoded_byte_order_always_matches_total_order(
            s1 in 0.0f64..1e12, h1 in proptest::prelude::any::<u64>(),
            s2 in 0.0f64..1e12, h2 in proptest::prelude::any::<u64>(),
        ) {
            let a = ScheduleKey::new(s1, h1).unwrap();
            let b = ScheduleKey::new(s2, h2).unwrap();
            let byte_order = a.encode().cmp(&b.encode());
            prop_assert_eq!(byte_order, a.cmp_total(&b));
        }
    }
}
