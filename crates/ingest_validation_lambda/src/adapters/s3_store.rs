use aws_sdk_s3::primitives::ByteStream;

use crate::adapters::object_store::ObjectStore;

/// S3-backed store. Calls block the current worker, so it must run inside a
/// multi-thread tokio runtime.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(aws_sdk_s3::Client::new(&config))
    }
}

impl ObjectStore for S3ObjectStore {
    fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, String> {
        let bucket = bucket.to_string();
        let object_key = key.to_string();
        let client = self.client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let output = client
                    .get_object()
                    .bucket(bucket)
                    .key(object_key)
                    .send()
                    .await
                    .map_err(|error| format!("failed to read object from s3: {error}"))?;
                output
                    .body
                    .collect()
                    .await
                    .map(|body| body.into_bytes().to_vec())
                    .map_err(|error| format!("failed to stream object body from s3: {error}"))
            })
        })
    }

    fn write_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), String> {
        let bucket = bucket.to_string();
        let object_key = key.to_string();
        let body_bytes = body.to_vec();
        let client = self.client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_object()
                    .bucket(bucket)
                    .key(object_key)
                    .body(ByteStream::from(body_bytes))
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to write object to s3: {error}"))
            })
        })
    }

    fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, String> {
        let bucket = bucket.to_string();
        let prefix = prefix.to_string();
        let client = self.client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let mut keys = Vec::new();
                let mut continuation_token: Option<String> = None;
                loop {
                    let output = client
                        .list_objects_v2()
                        .bucket(&bucket)
                        .prefix(&prefix)
                        .set_continuation_token(continuation_token.take())
                        .send()
                        .await
                        .map_err(|error| format!("failed to list objects in s3: {error}"))?;

                    keys.extend(
                        output
                            .contents()
                            .iter()
                            .filter_map(|object| object.key().map(str::to_string)),
                    );

                    match output.next_continuation_token() {
                        Some(token) if output.is_truncated().unwrap_or(false) => {
                            continuation_token = Some(token.to_string());
                        }
                        _ => break,
                    }
                }
                Ok(keys)
            })
        })
    }

    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), String> {
        let bucket = bucket.to_string();
        let object_key = key.to_string();
        let client = self.client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .delete_object()
                    .bucket(bucket)
                    .key(object_key)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| format!("failed to delete object from s3: {error}"))
            })
        })
    }
}
