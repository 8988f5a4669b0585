use crate::contract::InvalidInput;

pub const PART_OBJECT_NAME: &str = "part-0.parquet";

/// Bucket plus key prefix that a partition overwrites wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    bucket: String,
    prefix: String,
}

impl Destination {
    pub fn new(bucket: impl Into<String>, prefix: &str) -> Result<Self, InvalidInput> {
        let bucket = bucket.into();
        if bucket.is_empty() {
            return Err(InvalidInput::for_field(
                "bucket",
                "Destination bucket cannot be empty",
            ));
        }

        let Some(prefix) = normalize_prefix(prefix) else {
            return Err(InvalidInput::for_field(
                "prefix",
                format!("Destination prefix in bucket '{bucket}' cannot be empty"),
            ));
        };

        Ok(Self { bucket, prefix })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Always ends with a single `/`.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn part_object_key(&self) -> String {
        format!("{}{PART_OBJECT_NAME}", self.prefix)
    }

    pub fn uri(&self) -> String {
        object_uri(&self.bucket, &self.prefix)
    }

    /// True when overwriting this destination would delete `bucket/key`.
    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.bucket == bucket && key.trim_start_matches('/').starts_with(&self.prefix)
    }

    /// True when overwriting one destination would erase the other.
    pub fn overlaps(&self, other: &Destination) -> bool {
        self.bucket == other.bucket
            && (self.prefix.starts_with(&other.prefix) || other.prefix.starts_with(&self.prefix))
    }
}

pub fn normalize_prefix(prefix: &str) -> Option<String> {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("{trimmed}/"))
    }
}

pub fn object_uri(bucket: &str, key: &str) -> String {
    format!("s3://{bucket}/{key}")
}

pub fn ensure_disjoint(validated: &Destination, rejected: &Destination) -> Result<(), InvalidInput> {
    if validated.overlaps(rejected) {
        return Err(InvalidInput::new(format!(
            "Destinations {} and {} overlap",
            validated.uri(),
            rejected.uri()
        )));
    }

    Ok(())
}

/// Refuse an object the job reads that sits under a destination it overwrites.
pub fn ensure_outside(
    field: &'static str,
    bucket: &str,
    key: &str,
    destinations: &[&Destination],
) -> Result<(), InvalidInput> {
    match destinations
        .iter()
        .find(|destination| destination.contains(bucket, key))
    {
        Some(destination) => Err(InvalidInput::for_field(
            field,
            format!(
                "{} lies under destination {}, which is overwritten",
                object_uri(bucket, key),
                destination.uri()
            ),
        )),
        None => Ok(()),
    }
}
