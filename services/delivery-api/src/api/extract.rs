//! Request extractors

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use obra_auth_core::Claims;
use obra_errors::AppError;

use crate::application::Actor;

use super::AppState;

/// Validated access-token claims pulled from the Authorization header
pub struct AuthClaims(pub Claims);

impl FromRequestParts<AppState> for AuthClaims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Authorization header must be a Bearer token"))?;

        let claims = state.tokens.validate_access_token(token)?;
        Ok(AuthClaims(claims))
    }
}

impl AuthClaims {
    pub fn actor(&self) -> Result<Actor, AppError> {
        Actor::from_claims(&self.0)
    }
}
