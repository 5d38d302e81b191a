use std::sync::Arc;

use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};
use tracing::{debug, warn};

use crate::config::SecurityConfig;
use crate::error::SecurityError;
use crate::identity::AuthenticatedUser;
use crate::jwks::JwksCache;

/// Source of decoding keys: either a JWKS cache or a static key for testing.
enum KeySource {
    Jwks(Arc<JwksCache>),
    Static(DecodingKey),
}

/// Low-level JWT claims validator.
///
/// Validates JWT tokens and returns raw claims without building an identity.
pub struct JwtClaimsValidator {
    key_source: KeySource,
    config: SecurityConfig,
}

impl JwtClaimsValidator {
    /// Create a new validator backed by a JWKS cache.
    pub fn new(jwks: Arc<JwksCache>, config: SecurityConfig) -> Self {
        Self {
            key_source: KeySource::Jwks(jwks),
            config,
        }
    }

    /// Create a new validator with a static decoding key (useful for testing).
    pub fn new_with_static_key(key: DecodingKey, config: SecurityConfig) -> Self {
        Self {
            key_source: KeySource::Static(key),
            config,
        }
    }

    pub fn config(&self) -> &SecurityConfig {
        &self.config
    }

    /// Validate a JWT token and return the raw claims.
    ///
    /// 1. Decode header to get `kid`/algorithm.
    /// 2. Retrieve the decoding key (JWKS cache or static key).
    /// 3. Validate signature.
    /// 4. Validate standard claims (iss, aud, exp, nbf).
    pub async fn validate(&self, token: &str) -> Result<serde_json::Value, SecurityError> {
        let header = decode_header(token)
            .map_err(|e| SecurityError::InvalidToken(format!("Failed to decode header: {e}")))?;

        let algorithm = header.alg;
        debug!(?algorithm, kid = ?header.kid, "Decoded JWT header");

        if self.config.allowed_algorithms.is_empty() {
            return Err(SecurityError::ValidationFailed(
                "No allowed JWT algorithms configured".into(),
            ));
        }

        if !self.config.allowed_algorithms.contains(&algorithm) {
            return Err(SecurityError::ValidationFailed(format!(
                "Disallowed JWT algorithm: {algorithm:?}"
            )));
        }

        let decoding_key = match &self.key_source {
            KeySource::Static(key) => key.clone(),
            KeySource::Jwks(jwks) => {
                let kid = header.kid.as_deref().ok_or_else(|| {
                    SecurityError::InvalidToken("JWT header missing 'kid' field".into())
                })?;
                jwks.get_key(kid).await?
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.algorithms = self.config.allowed_algorithms.clone();
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let token_data = decode::<serde_json::Value>(token, &decoding_key, &validation).map_err(|e| {
            let err = match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                    SecurityError::ValidationFailed("Invalid issuer".into())
                }
                jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                    SecurityError::ValidationFailed("Invalid audience".into())
                }
                _ => SecurityError::InvalidToken(e.to_string()),
            };
            warn!(error = %err, "JWT claim validation failed");
            err
        })?;

        let sub = token_data
            .claims
            .get("sub")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");

        debug!(sub = %sub, "JWT validated");
        Ok(token_data.claims)
    }
}

/// JWT token validator producing an [`AuthenticatedUser`] directly — the
/// main entry point used by the WebSocket Bridge's `authenticate()` step.
pub struct JwtValidator {
    claims_validator: JwtClaimsValidator,
}

impl JwtValidator {
    pub fn new(jwks: Arc<JwksCache>, config: SecurityConfig) -> Self {
        Self {
            claims_validator: JwtClaimsValidator::new(jwks, config),
        }
    }

    pub fn new_with_static_key(key: DecodingKey, config: SecurityConfig) -> Self {
        Self {
            claims_validator: JwtClaimsValidator::new_with_static_key(key, config),
        }
    }

    pub fn config(&self) -> &SecurityConfig {
        self.claims_validator.config()
    }

    /// The underlying claims validator, for callers that need raw claims
    /// without going through `validate_claims`.
    pub fn claims_validator(&self) -> &JwtClaimsValidator {
        &self.claims_validator
    }

    /// Validate a JWT token and return the authenticated user.
    pub async fn validate(&self, token: &str) -> Result<AuthenticatedUser, SecurityError> {
        let claims = self.claims_validator.validate(token).await?;
        Ok(AuthenticatedUser::from_claims(claims))
    }

    /// Validate a JWT token and return raw claims without building a user.
    pub async fn validate_claims(&self, token: &str) -> Result<serde_json::Value, SecurityError> {
        self.claims_validator.validate(token).await
    }
}
