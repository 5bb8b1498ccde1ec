//! Dimension catalogs — the known category labels per breakdown dimension,
//! served through the short-TTL reference cache. In the deployed console
//! these come from a backend reference endpoint; the static defaults below
//! are the loader of last resort.

use trendlens_cache::ReferenceCache;
use trendlens_core::config::CacheConfig;
use trendlens_core::types::{Dimension, AGE_BUCKET_LABELS, UNKNOWN_DIMENSION};

/// Cached lookup of the known label set for each breakdown dimension.
pub struct CatalogService {
    cache: ReferenceCache<Vec<String>>,
}

impl CatalogService {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            cache: ReferenceCache::new(config.ttl_secs, config.max_entries),
        }
    }

    /// Known labels for `dimension`, in catalog order. Open-ended dimensions
    /// (platform, location) have no fixed catalog; their categories are
    /// discovered from the data.
    pub fn known_labels(&self, dimension: Dimension) -> Vec<String> {
        self.cache
            .get_or_insert_with(dimension.as_str(), || default_labels(dimension))
    }
}

fn default_labels(dimension: Dimension) -> Vec<String> {
    match dimension {
        Dimension::Gender => vec![
            "Male".to_string(),
            "Female".to_string(),
            UNKNOWN_DIMENSION.to_string(),
        ],
        Dimension::AgeBucket => AGE_BUCKET_LABELS.iter().map(|l| l.to_string()).collect(),
        Dimension::Platform | Dimension::Location => Vec::new(),
    }
}
