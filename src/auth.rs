use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::constants::{JWT_ISSUER, TOKEN_TTL_HOURS};
use crate::error::AppError;
use crate::state::AppState;

/// Claims carried by a bearer token. The email is the stable identity used
/// as the owner/renter key throughout the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
}

/// Verifies bearer credentials and resolves them to a caller identity.
/// Per-resource authorization (owner/renter checks) happens in the services,
/// not here.
#[derive(Clone)]
pub struct IdentityGate {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for IdentityGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityGate").finish_non_exhaustive()
    }
}

impl IdentityGate {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Mints a token for the given identity. The production identity
    /// provider is external; this is for tests and local tooling.
    pub fn issue(&self, email: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: email.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
            iss: JWT_ISSUER.to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to mint token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Identity, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[JWT_ISSUER]);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Unauthenticated(format!("invalid bearer token: {}", e)))?;
        if data.claims.email.is_empty() {
            return Err(AppError::Unauthenticated("token carries no identity".to_string()));
        }
        Ok(Identity {
            email: data.claims.email,
        })
    }
}

/// Authenticated caller. Handlers that mutate state take this as a
/// parameter; its presence is what makes an endpoint require credentials.
#[derive(Debug, Clone)]
pub struct Identity {
    pub email: String,
}

#[async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthenticated("missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthenticated("expected 'Bearer <token>'".to_string()))?;

        if token.is_empty() {
            return Err(AppError::Unauthenticated("empty bearer token".to_string()));
        }

        state.gate.verify(token)
    }
}
