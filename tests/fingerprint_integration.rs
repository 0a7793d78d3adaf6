//! Integration tests for vector fingerprints and the correlation cache.

use std::collections::HashSet;
use std::time::Duration;

use tether::cache::FingerprintCache;
use tether::embedding::MockEmbedder;
use tether::hashing::fingerprint_vector;

const DIM: usize = 768;

fn vector(seed: usize) -> Vec<f64> {
    MockEmbedder::vector_for(&format!("chunk-{seed}"), DIM)
}

#[test]
fn test_fingerprints_unique_across_corpus() {
    let fingerprints: HashSet<_> = (0..5_000).map(|i| fingerprint_vector(&vector(i))).collect();

    assert_eq!(fingerprints.len(), 5_000);
}

#[test]
fn test_fingerprint_survives_json_round_trip() {
    for i in 0..200 {
        let original = vector(i);
        let json = serde_json::to_string(&original).unwrap();
        let parsed: Vec<f64> = serde_json::from_str(&json).unwrap();

        assert_eq!(fingerprint_vector(&original), fingerprint_vector(&parsed));
    }
}

#[test]
fn test_unnormalised_vectors_distinct_at_sixth_decimal() {
    let cache = FingerprintCache::with_limits(16, Duration::from_secs(60));
    let base: Vec<f64> = (0..DIM).map(|i| 1_000.0 + i as f64 * 0.5).collect();
    let mut nudged = base.clone();
    nudged[7] += 0.000_002;

    assert_ne!(fingerprint_vector(&base), fingerprint_vector(&nudged));

    cache.store(&base, "base");
    cache.store(&nudged, "nudged");
    assert_eq!(cache.get(&base).as_deref(), Some("base"));
    assert_eq!(cache.get(&nudged).as_deref(), Some("nudged"));
}

#[test]
fn test_fingerprint_ignores_tail_dimensions() {
    let original = vector(42);
    let mut edited = original.clone();
    for value in &mut edited[32..] {
        *value = -*value;
    }

    assert_eq!(fingerprint_vector(&original), fingerprint_vector(&edited));
}

#[test]
fn test_cache_recovers_text_for_many_queries() {
    let cache = FingerprintCache::with_limits(256, Duration::from_secs(60));

    for i in 0..256 {
        cache.store(&vector(i), format!("query {i}"));
    }

    for i in 0..256 {
        assert_eq!(cache.get(&vector(i)), Some(format!("query {i}")));
    }

    let stats = cache.stats();
    assert_eq!(stats.size, 256);
    assert_eq!(stats.hits, 256);
    assert_eq!(stats.misses, 0);
}

#[test]
fn test_cache_keeps_most_recent_under_pressure() {
    let cache = FingerprintCache::with_limits(100, Duration::from_secs(60));

    for i in 0..1_000 {
        cache.store(&vector(i), format!("query {i}"));
        assert!(cache.len() <= 100);
    }

    assert!(cache.get(&vector(899)).is_none());
    assert_eq!(cache.get(&vector(900)), Some("query 900".to_string()));
    assert_eq!(cache.get(&vector(999)), Some("query 999".to_string()));
}
