//! Startup configuration file support: model, versioned schema and storage.
//! 啟動設定檔支援：資料模型、版本化格式與儲存。

mod model;
mod paths;
mod schema;
mod store;
mod util;

pub use model::{
    Configuration, MultiProjectConfiguration, ProjectReference, CURRENT_VERSION, LEGACY_VERSION,
};
pub use paths::{ConfigPaths, CONFIG_FILE_SUFFIX, LEGACY_SETTINGS_SUFFIX};
pub use schema::{parse_configuration, serialize_configuration, SchemaError};
pub use store::{ConfigError, ConfigurationStore};
