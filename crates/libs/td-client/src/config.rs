use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_SUBSCRIPTION_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_UNHANDLED_QUEUE_CAPACITY: usize = 256;
pub const DEFAULT_INBOUND_CHANNEL_CAPACITY: usize = 4096;

/// Controls whether raw payloads may appear in decode-failure logs.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RedactionConfig {
    pub enabled: bool,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Default capacity of a queue-backed subscription.
    pub subscription_queue_capacity: usize,
    /// Capacity of the unhandled decode-error channel.
    pub unhandled_queue_capacity: usize,
    /// Capacity of the inbound envelope channel read by the pump.
    pub inbound_channel_capacity: usize,
    pub redaction: RedactionConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            subscription_queue_capacity: DEFAULT_SUBSCRIPTION_QUEUE_CAPACITY,
            unhandled_queue_capacity: DEFAULT_UNHANDLED_QUEUE_CAPACITY,
            inbound_channel_capacity: DEFAULT_INBOUND_CHANNEL_CAPACITY,
            redaction: RedactionConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ClientError> {
        let config: Self =
            toml::from_str(raw).map_err(|err| ClientError::config(format!("parse failed: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|err| ClientError::config(format!("read {} failed: {err}", path.display())))?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        for (key, value) in [
            ("subscription_queue_capacity", self.subscription_queue_capacity),
            ("unhandled_queue_capacity", self.unhandled_queue_capacity),
            ("inbound_channel_capacity", self.inbound_channel_capacity),
        ] {
            if value == 0 {
                return Err(ClientError::config(format!("{key} must be greater than zero")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_gives_defaults() {
        let config = ClientConfig::from_toml_str("").expect("defaults");
        assert_eq!(config, ClientConfig::default());
        assert!(config.redaction.enabled);
    }

    #[test]
    fn partial_document_overrides_named_keys() {
        let config = ClientConfig::from_toml_str(
            "subscription_queue_capacity = 8\n[redaction]\nenabled = false\n",
        )
        .expect("config");
        assert_eq!(config.subscription_queue_capacity, 8);
        assert_eq!(config.unhandled_queue_capacity, DEFAULT_UNHANDLED_QUEUE_CAPACITY);
        assert!(!config.redaction.enabled);
    }

    #[test]
    fn zero_capacity_and_unknown_keys_are_rejected() {
        let err = ClientConfig::from_toml_str("unhandled_queue_capacity = 0").expect_err("zero");
        assert_eq!(err, ClientError::config("unhandled_queue_capacity must be greater than zero"));

        let err = ClientConfig::from_toml_str("strict = true").expect_err("unknown key");
        assert_eq!(err.code(), crate::error::code::CONFIG);
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "inbound_channel_capacity = 16").expect("write config");
        let config = ClientConfig::load(file.path()).expect("load");
        assert_eq!(config.inbound_channel_capacity, 16);

        let missing = file.path().with_extension("missing");
        assert!(ClientConfig::load(missing).is_err());
    }
}
