use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    axum_http::error_responses::{ApiError, error_response},
    config::config_loader,
};

/// Access token claims issued by the identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub role: Option<String>,
    pub exp: usize,
}

/// Authenticated caller. Entitlement checks re-read the role from the users
/// table, so only the id is carried.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Invalid Authorization header format")]
    MalformedHeader,

    #[error("Invalid or expired access token")]
    InvalidToken(#[source] jsonwebtoken::errors::Error),

    #[error("Invalid user ID in token")]
    InvalidSubject,

    #[error("Token verification is not configured")]
    Configuration(#[source] anyhow::Error),
}

impl ApiError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader | AuthError::MalformedHeader => "UNAUTHORIZED",
            AuthError::InvalidToken(_) | AuthError::InvalidSubject => "INVALID_TOKEN",
            AuthError::Configuration(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Configuration(err) = &self {
            tracing::error!(error = ?err, "auth: JWT secret unavailable");
        }
        error_response(&self)
    }
}

pub fn validate_access_token(token: &str) -> Result<AccessClaims, AuthError> {
    let secret = config_loader::get_jwt_secret().map_err(AuthError::Configuration)?;

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;

    let token_data =
        decode::<AccessClaims>(token, &decoding_key, &validation).map_err(AuthError::InvalidToken)?;

    Ok(token_data.claims)
}

fn bearer_token(parts: &Parts) -> Result<&str, AuthError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?;

    header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::MalformedHeader)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = validate_access_token(bearer_token(parts)?)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidSubject)?;

        Ok(AuthUser { user_id })
    }
}
