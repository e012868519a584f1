use serde::{Deserialize, Serialize};

/// Arguments of `setTdlibParameters`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TdlibParameters {
    pub use_test_dc: bool,
    pub database_directory: String,
    pub files_directory: String,
    /// Base64 encoded, as the upstream `bytes` type.
    pub database_encryption_key: String,
    pub use_file_database: bool,
    pub use_chat_info_database: bool,
    pub use_message_database: bool,
    pub use_secret_chats: bool,
    pub api_id: i32,
    pub api_hash: String,
    pub system_language_code: String,
    pub device_model: String,
    pub system_version: String,
    pub application_version: String,
}

impl TdlibParameters {
    pub fn new(api_id: i32, api_hash: impl Into<String>) -> Self {
        Self {
            api_id,
            api_hash: api_hash.into(),
            system_language_code: "en".to_owned(),
            device_model: "td-client".to_owned(),
            application_version: env!("CARGO_PKG_VERSION").to_owned(),
            ..Self::default()
        }
    }

    pub fn with_database_directory(mut self, path: impl Into<String>) -> Self {
        self.database_directory = path.into();
        self
    }
}
