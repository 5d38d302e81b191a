use super::{ConfigError, ZoloConfig};

/// Metadata about a single configuration property.
#[derive(Debug, Clone)]
pub struct PropertyMeta {
    /// Relative key (e.g., `"pool_size"`).
    pub key: String,
    /// Absolute key (e.g., `"app.database.pool_size"`).
    pub full_key: String,
    /// Rust type name (e.g., `"i64"`).
    pub type_name: &'static str,
    /// Whether the property is required (no default and not `Option`).
    pub required: bool,
    /// Default value as a string, if any.
    pub default_value: Option<String>,
    /// Description from doc comments.
    pub description: Option<String>,
}

/// Trait for strongly-typed configuration sections, implemented by hand
/// against a fixed key prefix:
///
/// ```ignore
/// impl ConfigProperties for DatabaseConfig {
///     fn prefix() -> &'static str { "app.database" }
///     fn properties_metadata() -> Vec<PropertyMeta> { vec![/* ... */] }
///     fn from_config(config: &ZoloConfig) -> Result<Self, ConfigError> {
///         Ok(Self { url: config.get("app.database.url")?, .. })
///     }
/// }
/// ```
pub trait ConfigProperties: Sized {
    /// The configuration key prefix (e.g., `"app.database"`).
    fn prefix() -> &'static str;

    /// Metadata about all expected properties.
    fn properties_metadata() -> Vec<PropertyMeta>;

    /// Construct from an `ZoloConfig` instance.
    fn from_config(config: &ZoloConfig) -> Result<Self, ConfigError>;
}
