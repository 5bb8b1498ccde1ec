//! Short-TTL in-process cache for reference lookups (category and slot
//! catalogs). Aggregation results are never cached here; every aggregation
//! request recomputes from scratch.

pub mod local;

pub use local::ReferenceCache;
