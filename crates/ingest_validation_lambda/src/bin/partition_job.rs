use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ingest_validation_core::contract::{
    InvalidInput, DEFAULT_JOB_NAME, DEFAULT_REJECTED_PREFIX, DEFAULT_VALIDATED_PREFIX,
};
use ingest_validation_core::storage_keys::{ensure_disjoint, ensure_outside, Destination};
use ingest_validation_lambda::adapters::local_store::LocalObjectStore;
use ingest_validation_lambda::adapters::s3_store::S3ObjectStore;
use ingest_validation_lambda::handlers::partition_job::{
    handle_partition_job_with_null_checks, PartitionJobConfig,
};
use ingest_validation_lambda::logging::log_error;
use serde_json::json;

/// Split a CSV object into validated and rejected Parquet partitions.
#[derive(Debug, Parser)]
#[command(name = "partition_job")]
struct Cli {
    #[arg(long = "JOB_NAME", env = "JOB_NAME", default_value = DEFAULT_JOB_NAME)]
    job_name: String,
    /// Bucket holding the source object and the rules document
    #[arg(long = "input_bucket", env = "INPUT_BUCKET")]
    input_bucket: String,
    /// Key of the source CSV object
    #[arg(long = "input_key", env = "INPUT_KEY")]
    input_key: String,
    /// Key of the rules document, loaded and logged but not enforced
    #[arg(long = "rules_key", env = "RULES_KEY")]
    rules_key: Option<String>,
    /// Bucket for both partitions (defaults to the input bucket)
    #[arg(long = "output_bucket", env = "OUTPUT_BUCKET")]
    output_bucket: Option<String>,
    #[arg(long = "validated_prefix", env = "VALIDATED_PREFIX", default_value = DEFAULT_VALIDATED_PREFIX)]
    validated_prefix: String,
    #[arg(long = "rejected_prefix", env = "REJECTED_PREFIX", default_value = DEFAULT_REJECTED_PREFIX)]
    rejected_prefix: String,
    /// Read and write `<root>/<bucket>/<key>` on the local filesystem instead of S3
    #[arg(long = "local_root", env = "LOCAL_OBJECT_ROOT")]
    local_root: Option<PathBuf>,
}

fn build_config(cli: &Cli) -> Result<PartitionJobConfig, InvalidInput> {
    if cli.input_bucket.is_empty() {
        return Err(InvalidInput::for_field(
            "input_bucket",
            "input_bucket cannot be empty",
        ));
    }
    if cli.input_key.is_empty() {
        return Err(InvalidInput::for_field(
            "input_key",
            "input_key cannot be empty",
        ));
    }
    if cli.rules_key.as_deref() == Some("") {
        return Err(InvalidInput::for_field(
            "rules_key",
            "rules_key cannot be empty when provided",
        ));
    }

    let output_bucket = cli
        .output_bucket
        .clone()
        .unwrap_or_else(|| cli.input_bucket.clone());
    let validated = Destination::new(output_bucket.clone(), &cli.validated_prefix)?;
    let rejected = Destination::new(output_bucket, &cli.rejected_prefix)?;
    ensure_disjoint(&validated, &rejected)?;

    let destinations = [&validated, &rejected];
    ensure_outside("input_key", &cli.input_bucket, &cli.input_key, &destinations)?;
    if let Some(rules_key) = &cli.rules_key {
        ensure_outside("rules_key", &cli.input_bucket, rules_key, &destinations)?;
    }

    Ok(PartitionJobConfig {
        job_name: cli.job_name.clone(),
        input_bucket: cli.input_bucket.clone(),
        input_key: cli.input_key.clone(),
        rules_key: cli.rules_key.clone(),
        validated,
        rejected,
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match build_config(&cli) {
        Ok(value) => value,
        Err(error) => {
            log_error(
                "partition_job",
                "invalid_arguments",
                json!({
                    "field": error.field(),
                    "error": error.message(),
                }),
            );
            return ExitCode::from(2);
        }
    };

    let result = match &cli.local_root {
        Some(root) => handle_partition_job_with_null_checks(&config, &LocalObjectStore::new(root)),
        None => {
            let store = S3ObjectStore::from_env().await;
            handle_partition_job_with_null_checks(&config, &store)
        }
    };

    match result {
        Ok(report) => match serde_json::to_string_pretty(&report) {
            Ok(body) => {
                println!("{body}");
                ExitCode::SUCCESS
            }
            Err(error) => {
                log_error(
                    "partition_job",
                    "report_serialization_failed",
                    json!({ "error": error.to_string() }),
                );
                ExitCode::FAILURE
            }
        },
        Err(_) => ExitCode::FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, FromArgMatches};

    use super::*;

    /// Parse from `args` alone, ignoring `INPUT_KEY` and the other env fallbacks.
    fn try_parse(args: &[&str]) -> Result<Cli, clap::Error> {
        let matches = Cli::command()
            .mut_args(|arg| arg.env(None::<&'static str>))
            .try_get_matches_from(std::iter::once("partition_job").chain(args.iter().copied()))?;
        Cli::from_arg_matches(&matches)
    }

    fn parse(args: &[&str]) -> Cli {
        try_parse(args).expect("arguments should parse")
    }

    #[test]
    fn defaults_destinations_to_input_bucket() {
        let cli = parse(&["--input_bucket", "lake", "--input_key", "incoming/a.csv"]);
        let config = build_config(&cli).expect("config should build");

        assert_eq!(config.job_name, DEFAULT_JOB_NAME);
        assert_eq!(config.validated.uri(), "s3://lake/validated/");
        assert_eq!(config.rejected.uri(), "s3://lake/rejected/");
        assert_eq!(config.rules_key, None);
    }

    #[test]
    fn accepts_glue_style_arguments() {
        let cli = parse(&[
            "--JOB_NAME",
            "nightly",
            "--input_bucket",
            "lake",
            "--input_key",
            "incoming/a.csv",
            "--rules_key",
            "config/rules.yml",
            "--output_bucket",
            "curated",
            "--validated_prefix",
            "orders/ok",
        ]);
        let config = build_config(&cli).expect("config should build");

        assert_eq!(config.job_name, "nightly");
        assert_eq!(config.rules_key.as_deref(), Some("config/rules.yml"));
        assert_eq!(config.validated.uri(), "s3://curated/orders/ok/");
        assert_eq!(config.rejected.uri(), "s3://curated/rejected/");
    }

    #[test]
    fn rejects_overlapping_destinations() {
        let cli = parse(&[
            "--input_bucket",
            "lake",
            "--input_key",
            "a.csv",
            "--validated_prefix",
            "out",
            "--rejected_prefix",
            "out/rejected",
        ]);
        let error = build_config(&cli).expect_err("nested destinations should fail");
        assert!(error.message().contains("overlap"));
    }

    #[test]
    fn refuses_source_or_rules_inside_a_destination() {
        let cli = parse(&["--input_bucket", "lake", "--input_key", "validated/orders.csv"]);
        let error = build_config(&cli).expect_err("source under validated/ should fail");
        assert_eq!(error.field(), Some("input_key"));

        let cli = parse(&[
            "--input_bucket",
            "lake",
            "--input_key",
            "incoming/a.csv",
            "--rules_key",
            "rejected/rules.yml",
        ]);
        let error = build_config(&cli).expect_err("rules under rejected/ should fail");
        assert_eq!(error.field(), Some("rules_key"));

        let cli = parse(&[
            "--input_bucket",
            "lake",
            "--input_key",
            "validated/orders.csv",
            "--output_bucket",
            "curated",
        ]);
        assert!(build_config(&cli).is_ok());
    }

    #[test]
    fn rejects_empty_input_key() {
        let cli = parse(&["--input_bucket", "lake", "--input_key", ""]);
        let error = build_config(&cli).expect_err("empty key should fail");
        assert_eq!(error.field(), Some("input_key"));
    }

    #[test]
    fn requires_input_location() {
        let error = try_parse(&["--input_bucket", "lake"]).expect_err("input_key is required");
        assert_eq!(error.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
