/// Explicit request sessions
///
/// The identity provider issues HS256 bearer tokens; a `Session` is derived
/// from one per request and handed to every operation that acts on behalf of
/// a user. There is no process-wide "current user".
use crate::config::AuthConfig;
use crate::error::AppError;
use crate::models::ANONYMOUS_LABEL;
use actix_web::{web, FromRequest, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

/// Claims the wall relies on; anything else in the token is ignored
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (identity-provider user id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
}

/// The authenticated user behind a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub display_name: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Validates bearer tokens and turns them into sessions
#[derive(Clone)]
pub struct SessionVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Session, AppError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            AppError::Unauthorized("Invalid or expired token".to_string())
        })?;

        let user_id = data.claims.sub.trim();
        if user_id.is_empty() {
            return Err(AppError::Unauthorized("Token has no subject".to_string()));
        }

        // Profile claims such as `name` are never surfaced on the wall
        Ok(Session::new(user_id, ANONYMOUS_LABEL))
    }

    /// Verify the value of an `Authorization` header
    pub fn verify_header(&self, header: Option<&str>) -> Result<Session, AppError> {
        let header =
            header.ok_or_else(|| AppError::Unauthorized("Missing Authorization header".into()))?;
        let (scheme, token) = header
            .trim()
            .split_once(' ')
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization scheme".into()))?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(AppError::Unauthorized("Invalid Authorization scheme".into()));
        }

        self.verify(token.trim())
    }
}

impl FromRequest for Session {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<SessionVerifier>>() {
            Some(verifier) => verifier.verify_header(
                req.headers()
                    .get("Authorization")
                    .and_then(|h| h.to_str().ok()),
            ),
            None => Err(AppError::Internal(
                "session verifier is not configured".to_string(),
            )),
        };

        ready(result)
    }
}
