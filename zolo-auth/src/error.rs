use zolo_core::ZoloError;

/// Security-related errors for JWT validation and authentication.
#[derive(Debug)]
pub enum SecurityError {
    /// The Authorization header is missing from the request.
    MissingAuthHeader,

    /// The authorization scheme is not "Bearer".
    InvalidAuthScheme,

    /// The JWT token is invalid (malformed, bad signature, etc.).
    InvalidToken(String),

    /// The JWT token has expired.
    TokenExpired,

    /// The key ID (kid) from the JWT header is not found in the JWKS.
    UnknownKeyId(String),

    /// Failed to fetch the JWKS from the remote endpoint.
    JwksFetchError(String),

    /// Token validation failed (issuer, audience, or other claim mismatch).
    ValidationFailed(String),
}

impl std::fmt::Display for SecurityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecurityError::MissingAuthHeader => write!(f, "Missing Authorization header"),
            SecurityError::InvalidAuthScheme => write!(f, "Invalid authorization scheme"),
            SecurityError::InvalidToken(msg) => write!(f, "Invalid token: {msg}"),
            SecurityError::TokenExpired => write!(f, "Token expired"),
            SecurityError::UnknownKeyId(kid) => write!(f, "Unknown signing key: {kid}"),
            SecurityError::JwksFetchError(msg) => write!(f, "JWKS fetch error: {msg}"),
            SecurityError::ValidationFailed(msg) => write!(f, "Token validation failed: {msg}"),
        }
    }
}

impl std::error::Error for SecurityError {}

impl SecurityError {
    /// The message safe to surface to a client — never leaks which part of
    /// validation failed.
    pub fn public_message(&self) -> &'static str {
        "Unauthorized"
    }
}

impl From<SecurityError> for ZoloError {
    fn from(err: SecurityError) -> Self {
        ZoloError::AccessDenied(err.public_message().to_string())
    }
}

/// RBAC evaluation errors — distinct from [`SecurityError`] since a denial
/// from `evaluate()` is an expected outcome, not a failure.
#[derive(Debug)]
pub enum RbacError {
    /// No authentication subsystem was wired up; every requirement that
    /// needs auth fails safe-denied rather than panicking.
    NoAuthSubsystem,
}

impl std::fmt::Display for RbacError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RbacError::NoAuthSubsystem => write!(f, "no authentication subsystem configured"),
        }
    }
}

impl std::error::Error for RbacError {}

impl From<RbacError> for ZoloError {
    fn from(err: RbacError) -> Self {
        ZoloError::AccessDenied(err.to_string())
    }
}
