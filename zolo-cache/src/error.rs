#[derive(Debug)]
pub enum CacheError {
    /// A `tier` name that doesn't match one of `system`/`pinned`/`schema`/`plugin`.
    UnknownTier(String),
    /// The `system`/`plugin` tier's stat() of the backing file failed.
    Stat(String),
    /// No live connection for the given alias in the schema tier.
    NoConnection(String),
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::UnknownTier(t) => write!(f, "unknown cache tier: {t}"),
            CacheError::Stat(msg) => write!(f, "failed to stat cache source: {msg}"),
            CacheError::NoConnection(alias) => write!(f, "no connection for alias: {alias}"),
        }
    }
}

impl std::error::Error for CacheError {}

zolo_core::map_error! {
    CacheError => Cache,
}
