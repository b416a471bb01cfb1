//! Caching for analysis results

pub mod cache;


pub use cache::{CacheManager, CacheStats, Clock, ManualClock, SystemClock, TtlCache};
