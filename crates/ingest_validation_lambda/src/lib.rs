//! AWS-oriented adapters and handlers for ingest validation.
//!
//! This crate owns runtime integration details (Lambda handlers, the batch
//! partition job, and storage adapters). Domain rules live in
//! `ingest_validation_core`.

pub mod adapters;
pub mod handlers;
pub mod logging;
