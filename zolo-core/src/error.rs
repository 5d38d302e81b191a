//! The shared error taxonomy for the engine.
//!
//! Every subsystem crate defines its own leaf error type and converts it
//! `Into<ZoloError>` at the boundary, matching the taxonomy in the error
//! handling design: `ValidationError`, `AccessDenied`, `DispatchError`,
//! `NavigationError`, `CacheError`, `ConnectionError`, `ShutdownTimeout`.

/// A single validation failure detail (step payload, config section, …).
#[derive(Debug, Clone)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub enum ZoloError {
    /// A step payload failed a schema constraint.
    Validation(Vec<ValidationDetail>),
    /// RBAC evaluation denied the step or block.
    AccessDenied(String),
    /// A dispatch subsystem raised unexpectedly.
    Dispatch { key: String, message: String },
    /// A malformed zLink or invalid key-jump target.
    Navigation(String),
    /// Unknown cache tier or corrupted entry.
    Cache(String),
    /// DB adapter or WebSocket client failure.
    Connection(String),
    /// `shutdown(timeout)` did not complete in time.
    ShutdownTimeout,
    /// Anything that doesn't fit the named kinds above.
    Internal(String),
}

impl std::fmt::Display for ZoloError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoloError::Validation(details) => {
                write!(f, "validation failed:")?;
                for d in details {
                    write!(f, " [{}: {}]", d.field, d.message)?;
                }
                Ok(())
            }
            ZoloError::AccessDenied(msg) => write!(f, "access denied: {msg}"),
            ZoloError::Dispatch { key, message } => write!(f, "dispatch error on '{key}': {message}"),
            ZoloError::Navigation(msg) => write!(f, "navigation error: {msg}"),
            ZoloError::Cache(msg) => write!(f, "cache error: {msg}"),
            ZoloError::Connection(msg) => write!(f, "connection error: {msg}"),
            ZoloError::ShutdownTimeout => write!(f, "shutdown timed out"),
            ZoloError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for ZoloError {}

impl From<std::io::Error> for ZoloError {
    fn from(err: std::io::Error) -> Self {
        ZoloError::Internal(err.to_string())
    }
}

/// Generate `From<E> for ZoloError` implementations that map a leaf error
/// type to a specific `ZoloError` variant that carries a `String`.
///
/// ```ignore
/// zolo_core::map_error! {
///     zolo_cache::CacheError => Cache,
///     zolo_nav::NavError => Navigation,
/// }
/// ```
#[macro_export]
macro_rules! map_error {
    ( $( $err_ty:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$err_ty> for $crate::ZoloError {
                fn from(err: $err_ty) -> Self {
                    $crate::ZoloError::$variant(err.to_string())
                }
            }
        )*
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formatting() {
        assert_eq!(
            ZoloError::Navigation("bad zpath".into()).to_string(),
            "navigation error: bad zpath"
        );
        assert_eq!(
            ZoloError::Dispatch { key: "a".into(), message: "boom".into() }.to_string(),
            "dispatch error on 'a': boom"
        );
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ZoloError = io_err.into();
        match err {
            ZoloError::Internal(msg) => assert!(msg.contains("missing")),
            other => panic!("expected Internal, got {other}"),
        }
    }
}
