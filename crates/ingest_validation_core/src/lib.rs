//! Shared ingest validation domain primitives.
//!
//! This crate owns invocation contracts, the tabular dataset model, row
//! validity partitioning, and the CSV/Parquet codecs. It intentionally excludes
//! AWS SDK and Lambda runtime concerns.

pub mod codec;
pub mod contract;
pub mod dataset;
pub mod partition;
pub mod predicate;
pub mod rules;
pub mod storage_keys;
