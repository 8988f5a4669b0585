use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_JOB_NAME: &str = "ingest-validation";
pub const DEFAULT_VALIDATED_PREFIX: &str = "validated/";
pub const DEFAULT_REJECTED_PREFIX: &str = "rejected/";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvocationRequest {
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvocationDescriptor {
    pub input_bucket: String,
    pub input_key: String,
    pub run_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartitionReport {
    pub job_name: String,
    pub source_uri: String,
    pub validated_uri: String,
    pub rejected_uri: String,
    pub columns: usize,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub rejected_rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_fingerprint: Option<String>,
}

/// A required invocation field is missing, empty, or malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidInput {
    field: Option<&'static str>,
    message: String,
}

impl InvalidInput {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    pub fn for_field(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field: Some(field),
            message: message.into(),
        }
    }

    pub fn field(&self) -> Option<&'static str> {
        self.field
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for InvalidInput {}

pub trait RunIdGenerator {
    fn next_run_id(&self) -> String;
}

/// Random (v4) UUIDs in hyphenated form.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidRunIds;

impl RunIdGenerator for UuidRunIds {
    fn next_run_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

pub fn resolve_invocation(
    request: InvocationRequest,
    run_ids: &impl RunIdGenerator,
) -> Result<InvocationDescriptor, InvalidInput> {
    let input_bucket = required_field("bucket", request.bucket)?;
    let input_key = required_field("key", request.key)?;

    Ok(InvocationDescriptor {
        input_bucket,
        input_key,
        run_id: run_ids.next_run_id(),
    })
}

pub fn resolve(request: InvocationRequest) -> Result<InvocationDescriptor, InvalidInput> {
    resolve_invocation(request, &UuidRunIds)
}

fn required_field(name: &'static str, value: Option<String>) -> Result<String, InvalidInput> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        Some(_) => Err(InvalidInput::for_field(
            name,
            format!("Input must include a non-empty '{name}'"),
        )),
        None => Err(InvalidInput::for_field(
            name,
            format!("Input must include '{name}'"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    struct FixedRunIds;

    impl RunIdGenerator for FixedRunIds {
        fn next_run_id(&self) -> String {
            "run-fixed".to_string()
        }
    }

    fn request(bucket: Option<&str>, key: Option<&str>) -> InvocationRequest {
        InvocationRequest {
            bucket: bucket.map(str::to_string),
            key: key.map(str::to_string),
        }
    }

    #[test]
    fn resolve_copies_location_and_stamps_run_id() {
        let descriptor = resolve_invocation(
            request(Some("landing"), Some("incoming/orders.csv")),
            &FixedRunIds,
        )
        .expect("request should resolve");

        assert_eq!(
            descriptor,
            InvocationDescriptor {
                input_bucket: "landing".to_string(),
                input_key: "incoming/orders.csv".to_string(),
                run_id: "run-fixed".to_string(),
            }
        );
    }

    #[test]
    fn resolve_rejects_empty_bucket() {
        let error = resolve(request(Some(""), Some("x"))).expect_err("request should fail");
        assert_eq!(error.field(), Some("bucket"));
    }

    #[test]
    fn resolve_rejects_missing_fields() {
        let error = resolve(request(None, Some("x"))).expect_err("missing bucket");
        assert_eq!(error.field(), Some("bucket"));

        let error = resolve(request(Some("landing"), None)).expect_err("missing key");
        assert_eq!(error.field(), Some("key"));
        assert_eq!(error.message(), "Input must include 'key'");

        let error = resolve(request(Some("landing"), Some(""))).expect_err("empty key");
        assert_eq!(error.field(), Some("key"));
    }

    #[test]
    fn uuid_run_ids_are_distinct_across_calls() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let descriptor =
                resolve(request(Some("landing"), Some("x.csv"))).expect("request should resolve");
            assert!(!descriptor.run_id.is_empty());
            seen.insert(descriptor.run_id);
        }
        assert_eq!(seen.len(), 10_000);
    }

    #[test]
    fn descriptor_serializes_with_expected_keys() {
        let descriptor = resolve_invocation(request(Some("b"), Some("k")), &FixedRunIds)
            .expect("request should resolve");
        let value = serde_json::to_value(&descriptor).expect("descriptor should serialize");
        assert_eq!(
            value,
            serde_json::json!({"input_bucket": "b", "input_key": "k", "run_id": "run-fixed"})
        );
    }
}
