use sha2::{Digest, Sha256};

/// Externally supplied validation rules, carried as opaque text.
///
/// The document is loaded and reported but not interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulesDocument {
    pub key: String,
    pub text: String,
}

impl RulesDocument {
    pub fn from_utf8(key: impl Into<String>, body: Vec<u8>) -> Result<Self, String> {
        let key = key.into();
        let text = String::from_utf8(body)
            .map_err(|error| format!("Rules document '{key}' is not valid UTF-8: {error}"))?;
        Ok(Self { key, text })
    }

    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.text.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}
