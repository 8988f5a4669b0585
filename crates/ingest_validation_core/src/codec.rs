//! Dataset codecs.
//!
//! Sources are header-bearing CSV with per-column type inference; partitions
//! are persisted as Parquet.

use std::fmt;

use crate::dataset::{Dataset, DatasetError};

#[path = "codec/csv_source.rs"]
mod csv_source;
#[path = "codec/parquet_sink.rs"]
mod parquet_sink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecError {
    message: String,
}

impl CodecError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CodecError {}

impl From<DatasetError> for CodecError {
    fn from(error: DatasetError) -> Self {
        Self::new(error.message())
    }
}

impl From<csv::Error> for CodecError {
    fn from(error: csv::Error) -> Self {
        Self::new(format!("CSV parse failed: {error}"))
    }
}

impl From<arrow::error::ArrowError> for CodecError {
    fn from(error: arrow::error::ArrowError) -> Self {
        Self::new(format!("Arrow conversion failed: {error}"))
    }
}

impl From<parquet::errors::ParquetError> for CodecError {
    fn from(error: parquet::errors::ParquetError) -> Self {
        Self::new(format!("Parquet codec failed: {error}"))
    }
}

/// Parse CSV bytes into a dataset.
///
/// The first record names the columns. Empty fields become nulls, and each
/// column gets the narrowest type that fits all of its non-empty fields
/// (integer, float, boolean, then text).
///
/// # Errors
///
/// Returns an error if the input is not UTF-8 or a row's width differs from
/// the header's.
pub fn read_csv(bytes: &[u8]) -> Result<Dataset, CodecError> {
    csv_source::read_csv_impl(bytes)
}

/// Encode a dataset as a single Parquet file.
///
/// Every field is nullable. Identical datasets encode to identical bytes.
///
/// # Errors
///
/// Returns an error if Arrow batch construction or Parquet writing fails.
pub fn encode_parquet(dataset: &Dataset) -> Result<Vec<u8>, CodecError> {
    parquet_sink::encode_parquet_impl(dataset)
}

/// Decode a Parquet file written by [`encode_parquet`].
///
/// # Errors
///
/// Returns an error if the bytes are not Parquet or hold a column type the
/// dataset model has no counterpart for.
pub fn decode_parquet(bytes: Vec<u8>) -> Result<Dataset, CodecError> {
    parquet_sink::decode_parquet_impl(bytes)
}
