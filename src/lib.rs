//! Mindshare
//!
//! Social sentiment scoring and probability-shift prediction for prediction
//! markets. Posts pulled from social platforms are scored and aggregated with
//! engagement weights, matched to markets by semantic similarity, and turned
//! into bounded shift forecasts with confidence labels.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod matcher;
pub mod prediction;
pub mod sentiment;
pub mod source;
pub mod storage;

#[cfg(test)]
mod error_tests;

pub use analyzer::{TopicAnalysis, TopicAnalyzer};
pub use error::{MindshareError, Result};
