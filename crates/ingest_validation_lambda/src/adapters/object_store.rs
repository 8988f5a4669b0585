/// Blocking object storage used by the partition job.
pub trait ObjectStore {
    fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, String>;

    fn write_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), String>;

    /// Keys starting with `prefix`, in no particular order.
    fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, String>;

    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), String>;
}
