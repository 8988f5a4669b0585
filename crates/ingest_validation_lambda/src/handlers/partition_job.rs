use std::fmt;
use std::time::Instant;

use ingest_validation_core::codec::{encode_parquet, read_csv};
use ingest_validation_core::contract::{InvalidInput, PartitionReport};
use ingest_validation_core::dataset::Dataset;
use ingest_validation_core::partition::split_dataset;
use ingest_validation_core::predicate::{NoNullColumns, RowPredicate};
use ingest_validation_core::rules::RulesDocument;
use ingest_validation_core::storage_keys::{ensure_outside, object_uri, Destination};
use serde_json::json;

use crate::adapters::object_store::ObjectStore;
use crate::logging::{log_error, log_info};

const COMPONENT: &str = "partition_job";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionJobConfig {
    pub job_name: String,
    pub input_bucket: String,
    pub input_key: String,
    pub rules_key: Option<String>,
    pub validated: Destination,
    pub rejected: Destination,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionJobError {
    DatasetRead { location: String, message: String },
    DatasetWrite { destination: String, message: String },
    RulesRead { key: String, message: String },
    InvalidConfig { message: String },
}

impl fmt::Display for PartitionJobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DatasetRead { location, message } => {
                write!(f, "failed to read dataset {location}: {message}")
            }
            Self::DatasetWrite {
                destination,
                message,
            } => write!(f, "failed to write dataset to {destination}: {message}"),
            Self::RulesRead { key, message } => {
                write!(f, "failed to load rules document {key}: {message}")
            }
            Self::InvalidConfig { message } => write!(f, "invalid job configuration: {message}"),
        }
    }
}

impl std::error::Error for PartitionJobError {}

pub fn handle_partition_job(
    config: &PartitionJobConfig,
    store: &impl ObjectStore,
    predicate: &impl RowPredicate,
) -> Result<PartitionReport, PartitionJobError> {
    let started_at = Instant::now();
    let source_uri = object_uri(&config.input_bucket, &config.input_key);
    log_info(
        COMPONENT,
        "job_started",
        json!({
            "job_name": config.job_name.clone(),
            "source": source_uri.clone(),
            "validated": config.validated.uri(),
            "rejected": config.rejected.uri(),
            "rules_key": config.rules_key.clone(),
        }),
    );

    match run_partition(config, store, predicate, &source_uri) {
        Ok(report) => {
            log_info(
                COMPONENT,
                "job_completed",
                json!({
                    "job_name": report.job_name.clone(),
                    "validated": report.validated_uri.clone(),
                    "rejected": report.rejected_uri.clone(),
                    "total_rows": report.total_rows,
                    "valid_rows": report.valid_rows,
                    "rejected_rows": report.rejected_rows,
                    "duration_ms": started_at.elapsed().as_millis(),
                }),
            );
            Ok(report)
        }
        Err(error) => {
            log_error(
                COMPONENT,
                "job_failed",
                json!({
                    "job_name": config.job_name.clone(),
                    "source": source_uri,
                    "duration_ms": started_at.elapsed().as_millis(),
                    "error": error.to_string(),
                }),
            );
            Err(error)
        }
    }
}

pub fn handle_partition_job_with_null_checks(
    config: &PartitionJobConfig,
    store: &impl ObjectStore,
) -> Result<PartitionReport, PartitionJobError> {
    handle_partition_job(config, store, &NoNullColumns)
}

fn run_partition(
    config: &PartitionJobConfig,
    store: &impl ObjectStore,
    predicate: &impl RowPredicate,
    source_uri: &str,
) -> Result<PartitionReport, PartitionJobError> {
    ensure_inputs_outside_destinations(config)?;

    let rules = match &config.rules_key {
        Some(key) => Some(load_rules(store, &config.input_bucket, key)?),
        None => None,
    };

    let source = load_source(store, config, source_uri)?;
    let partition = split_dataset(&source, predicate);

    overwrite_destination(store, &config.validated, &partition.valid)?;
    overwrite_destination(store, &config.rejected, &partition.rejected)?;

    Ok(PartitionReport {
        job_name: config.job_name.clone(),
        source_uri: source_uri.to_string(),
        validated_uri: config.validated.uri(),
        rejected_uri: config.rejected.uri(),
        columns: source.columns().len(),
        total_rows: source.len(),
        valid_rows: partition.valid.len(),
        rejected_rows: partition.rejected.len(),
        rules_key: rules.as_ref().map(|rules| rules.key.clone()),
        rules_fingerprint: rules.as_ref().map(RulesDocument::fingerprint),
    })
}

/// Overwriting deletes every key under a destination, so nothing the job reads
/// may live there.
pub fn ensure_inputs_outside_destinations(
    config: &PartitionJobConfig,
) -> Result<(), PartitionJobError> {
    let destinations = [&config.validated, &config.rejected];
    let invalid = |error: InvalidInput| {
        PartitionJobError::InvalidConfig {
            message: error.message().to_string(),
        }
    };

    ensure_outside(
        "input_key",
        &config.input_bucket,
        &config.input_key,
        &destinations,
    )
    .map_err(invalid)?;
    if let Some(rules_key) = &config.rules_key {
        ensure_outside("rules_key", &config.input_bucket, rules_key, &destinations)
            .map_err(invalid)?;
    }
    Ok(())
}

fn load_rules(
    store: &impl ObjectStore,
    bucket: &str,
    key: &str,
) -> Result<RulesDocument, PartitionJobError> {
    let rules_error = |message: String| PartitionJobError::RulesRead {
        key: object_uri(bucket, key),
        message,
    };

    let body = store.read_object(bucket, key).map_err(rules_error)?;
    let rules = RulesDocument::from_utf8(key, body).map_err(rules_error)?;

    log_info(
        COMPONENT,
        "rules_loaded",
        json!({
            "rules_key": rules.key.clone(),
            "fingerprint": rules.fingerprint(),
            "text": rules.text.clone(),
        }),
    );
    Ok(rules)
}

fn load_source(
    store: &impl ObjectStore,
    config: &PartitionJobConfig,
    source_uri: &str,
) -> Result<Dataset, PartitionJobError> {
    let read_error = |message: String| PartitionJobError::DatasetRead {
        location: source_uri.to_string(),
        message,
    };

    let body = store
        .read_object(&config.input_bucket, &config.input_key)
        .map_err(read_error)?;
    let dataset = read_csv(&body).map_err(|error| read_error(error.to_string()))?;

    log_info(
        COMPONENT,
        "dataset_loaded",
        json!({
            "source": source_uri,
            "columns": dataset.column_names().collect::<Vec<_>>(),
            "rows": dataset.len(),
        }),
    );
    Ok(dataset)
}

/// Replace everything under the destination prefix with one Parquet object.
fn overwrite_destination(
    store: &impl ObjectStore,
    destination: &Destination,
    dataset: &Dataset,
) -> Result<(), PartitionJobError> {
    let write_error = |message: String| PartitionJobError::DatasetWrite {
        destination: destination.uri(),
        message,
    };

    let body = encode_parquet(dataset).map_err(|error| write_error(error.to_string()))?;

    let stale_keys = store
        .list_keys(destination.bucket(), destination.prefix())
        .map_err(write_error)?;
    for key in &stale_keys {
        store
            .delete_object(destination.bucket(), key)
            .map_err(write_error)?;
    }

    let part_key = destination.part_object_key();
    store
        .write_object(destination.bucket(), &part_key, &body)
        .map_err(write_error)?;

    log_info(
        COMPONENT,
        "destination_written",
        json!({
            "destination": destination.uri(),
            "object": object_uri(destination.bucket(), &part_key),
            "rows": dataset.len(),
            "replaced_objects": stale_keys.len(),
        }),
    );
    Ok(())
}
