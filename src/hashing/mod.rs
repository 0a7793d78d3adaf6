//! Vector fingerprinting.
//!
//! A [`Fingerprint`] identifies an embedding by its leading components only: the first
//! [`FINGERPRINT_DIMS`] values are rendered with [`FINGERPRINT_PRECISION`] decimals,
//! joined with commas and hashed with BLAKE3. Jitter below the sixth decimal (or in the
//! trailing dimensions) therefore maps to the same key, and hashing cost does not grow with
//! the embedding dimensionality.

use std::fmt::{self, Write};

use crate::constants::{FINGERPRINT_DIMS, FINGERPRINT_PRECISION};

/// BLAKE3 digest of a vector's rounded leading components.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(blake3::Hash);

impl Fingerprint {
    /// Returns the raw 32-byte digest.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    /// Returns the lowercase hex form.
    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Fingerprint").field(&self.to_hex()).finish()
    }
}

/// Builds the string that gets hashed: `"{v0:.6},{v1:.6},..."` over at most 32 components.
///
/// Vectors shorter than 32 components are used as-is.
pub fn fingerprint_key(vector: &[f64]) -> String {
    let mut key = String::with_capacity(FINGERPRINT_DIMS * 10);
    for (i, value) in vector.iter().take(FINGERPRINT_DIMS).enumerate() {
        if i > 0 {
            key.push(',');
        }
        // Writing into a String cannot fail.
        let _ = write!(key, "{:.*}", FINGERPRINT_PRECISION, value);
    }
    key
}

/// Computes the fingerprint of `vector`.
#[inline]
pub fn fingerprint_vector(vector: &[f64]) -> Fingerprint {
    Fingerprint(blake3::hash(fingerprint_key(vector).as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_vector(dim: usize, seed: f64) -> Vec<f64> {
        (0..dim).map(|i| ((i as f64 + seed) * 0.037).sin()).collect()
    }

    #[test]
    fn test_fingerprint_determinism() {
        let v = sample_vector(768, 1.0);

        let a = fingerprint_vector(&v);
        let b = fingerprint_vector(&v);
        let c = fingerprint_vector(&v.clone());

        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_fingerprint_key_format() {
        let key = fingerprint_key(&[0.5, -0.25, 1.0]);
        assert_eq!(key, "0.500000,-0.250000,1.000000");
    }

    #[test]
    fn test_fingerprint_key_empty_vector() {
        assert_eq!(fingerprint_key(&[]), "");
        assert_eq!(fingerprint_vector(&[]), fingerprint_vector(&[]));
    }

    #[test]
    fn test_fingerprint_key_truncates_to_32_components() {
        let v = sample_vector(64, 2.0);
        let key = fingerprint_key(&v);
        assert_eq!(key.split(',').count(), FINGERPRINT_DIMS);
    }

    #[test]
    fn test_jitter_below_sixth_decimal_is_ignored() {
        let base: Vec<f64> = vec![0.123_456_1; 48];
        let mut jittered = base.clone();
        for value in jittered.iter_mut().take(FINGERPRINT_DIMS) {
            *value = 0.123_456_3;
        }

        assert_eq!(fingerprint_vector(&base), fingerprint_vector(&jittered));
    }

    #[test]
    fn test_trailing_dimensions_are_ignored() {
        let mut a = sample_vector(1536, 3.0);
        let b = a.clone();
        a[FINGERPRINT_DIMS] += 0.5;
        a[1535] = -1.0;

        assert_eq!(fingerprint_vector(&a), fingerprint_vector(&b));
    }

    #[test]
    fn test_change_at_sixth_decimal_changes_fingerprint() {
        let a: Vec<f64> = vec![0.25; 32];
        let mut b = a.clone();
        b[31] = 0.250_002;

        assert_ne!(fingerprint_vector(&a), fingerprint_vector(&b));
    }

    #[test]
    fn test_large_components_keep_sixth_decimal() {
        let a: Vec<f64> = vec![12.5; 32];
        let mut b = a.clone();
        b[0] = 12.500_001;

        assert_ne!(fingerprint_vector(&a), fingerprint_vector(&b));
        assert!(fingerprint_key(&b).starts_with("12.500001,"));
    }

    #[test]
    fn test_distinct_embeddings_have_distinct_fingerprints() {
        let fingerprints: std::collections::HashSet<_> = (0..200)
            .map(|seed| fingerprint_vector(&sample_vector(384, seed as f64 * 7.0)))
            .collect();
        assert_eq!(fingerprints.len(), 200);
    }

    #[test]
    fn test_short_vector_uses_all_components() {
        let a = [0.1_f64, 0.2, 0.3];
        let b = [0.1_f64, 0.2, 0.4];
        assert_ne!(fingerprint_vector(&a), fingerprint_vector(&b));
        assert_eq!(fingerprint_key(&a), "0.100000,0.200000,0.300000");
    }

    #[test]
    fn test_display_is_hex() {
        let fp = fingerprint_vector(&[1.0, 2.0]);
        let hex = fp.to_string();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hex, fp.to_hex());
    }
}
