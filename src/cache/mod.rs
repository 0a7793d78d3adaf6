//! Query-correlation cache.

pub mod fingerprint;
pub mod types;


pub use fingerprint::FingerprintCache;
pub use types::{
    CacheEntry, CacheStats, SearchStatus, TETHER_STATUS_HEADER, TETHER_STATUS_HEALTHY,
};
