//! obra-auth-core - JWT claims and role model

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use obra_common::{TenantId, UserId};
use obra_errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Platform role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Platform administrator, no tenant scope
    Master,
    /// Tenant (construction company) administrator
    Admin,
    /// End customer, sees only their own units
    Owner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Master => "MASTER",
            Role::Admin => "ADMIN",
            Role::Owner => "OWNER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MASTER" => Ok(Role::Master),
            "ADMIN" => Ok(Role::Admin),
            "OWNER" => Ok(Role::Owner),
            other => Err(AppError::validation(format!("Unknown role: {}", other))),
        }
    }
}

/// JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Tenant ID; absent for MASTER users
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Role
    pub role: Role,
    /// Expiration time
    pub exp: i64,
    /// Issued at
    pub iat: i64,
    /// JWT ID
    pub jti: String,
    /// Issuer
    #[serde(default)]
    pub iss: String,
    /// Audience
    #[serde(default)]
    pub aud: String,
    /// Token type (access or refresh)
    #[serde(default)]
    pub token_type: String,
}

impl Claims {
    pub fn new(
        user_id: &UserId,
        tenant_id: Option<&TenantId>,
        role: Role,
        expires_in_secs: i64,
        token_type: &str,
        issuer: &str,
        audience: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.0.to_string(),
            tenant_id: tenant_id.map(|t| t.0.to_string()),
            role,
            exp: (now + Duration::seconds(expires_in_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::now_v7().to_string(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            token_type: token_type.to_string(),
        }
    }

    pub fn user_id(&self) -> AppResult<UserId> {
        Uuid::parse_str(&self.sub)
            .map(UserId::from_uuid)
            .map_err(|_| AppError::unauthorized("Invalid user ID in token"))
    }

    pub fn tenant_id(&self) -> AppResult<Option<TenantId>> {
        match &self.tenant_id {
            None => Ok(None),
            Some(raw) => Uuid::parse_str(raw)
                .map(|u| Some(TenantId::from_uuid(u)))
                .map_err(|_| AppError::unauthorized("Invalid tenant ID in token")),
        }
    }

    /// Tenant ID for roles that must be tenant-scoped
    pub fn require_tenant_id(&self) -> AppResult<TenantId> {
        self.tenant_id()?
            .ok_or_else(|| AppError::forbidden("Token is not scoped to a tenant"))
    }

    pub fn is_master(&self) -> bool {
        self.role == Role::Master
    }

    pub fn is_access_token(&self) -> bool {
        self.token_type == "access"
    }

    pub fn is_refresh_token(&self) -> bool {
        self.token_type == "refresh"
    }
}

/// Token service
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: i64,
    refresh_token_expires_in: i64,
    issuer: String,
    audience: String,
}

impl TokenService {
    pub fn new(
        secret: &str,
        access_token_expires_in: i64,
        refresh_token_expires_in: i64,
        issuer: String,
        audience: String,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in,
            refresh_token_expires_in,
            issuer,
            audience,
        }
    }

    pub fn generate_access_token(
        &self,
        user_id: &UserId,
        tenant_id: Option<&TenantId>,
        role: Role,
    ) -> AppResult<String> {
        let claims = Claims::new(
            user_id,
            tenant_id,
            role,
            self.access_token_expires_in,
            "access",
            &self.issuer,
            &self.audience,
        );

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))
    }

    pub fn generate_refresh_token(
        &self,
        user_id: &UserId,
        tenant_id: Option<&TenantId>,
        role: Role,
    ) -> AppResult<String> {
        let claims = Claims::new(
            user_id,
            tenant_id,
            role,
            self.refresh_token_expires_in,
            "refresh",
            &self.issuer,
            &self.audience,
        );

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to generate refresh token: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::unauthorized(format!("Invalid token: {}", e)))?;

        let claims = token_data.claims;

        if claims.token_type.is_empty() {
            return Err(AppError::unauthorized("Token type not specified"));
        }

        if claims.jti.is_empty() {
            return Err(AppError::unauthorized("Token ID (jti) missing"));
        }

        Ok(claims)
    }

    pub fn validate_access_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.validate_token(token)?;

        if !claims.is_access_token() {
            return Err(AppError::unauthorized("Not an access token"));
        }

        Ok(claims)
    }

    pub fn validate_refresh_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.validate_token(token)?;

        if !claims.is_refresh_token() {
            return Err(AppError::unauthorized("Not a refresh token"));
        }

        Ok(claims)
    }

    pub fn access_token_expires_in(&self) -> i64 {
        self.access_token_expires_in
    }
}

/// Role check macro
#[macro_export]
macro_rules! require_role {
    ($claims:expr, $role:expr) => {
        if $claims.role != $role {
            return Err(obra_errors::AppError::forbidden(format!(
                "Requires role: {}",
                $role
            )));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(
            "test-secret",
            3600,
            604800,
            "obra-api".to_string(),
            "obra-web".to_string(),
        )
    }

    #[test]
    fn test_access_token_roundtrip() {
        let svc = service();
        let user_id = UserId::new();
        let tenant_id = TenantId::new();

        let token = svc
            .generate_access_token(&user_id, Some(&tenant_id), Role::Admin)
            .unwrap();
        let claims = svc.validate_access_token(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.tenant_id().unwrap(), Some(tenant_id));
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.is_access_token());
    }

    #[test]
    fn test_master_token_has_no_tenant() {
        let svc = service();
        let user_id = UserId::new();

        let token = svc
            .generate_access_token(&user_id, None, Role::Master)
            .unwrap();
        let claims = svc.validate_access_token(&token).unwrap();

        assert!(claims.is_master());
        assert_eq!(claims.tenant_id().unwrap(), None);
        assert!(claims.require_tenant_id().is_err());
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let svc = service();
        let user_id = UserId::new();

        let token = svc
            .generate_refresh_token(&user_id, None, Role::Master)
            .unwrap();
        assert!(svc.validate_access_token(&token).is_err());
        assert!(svc.validate_refresh_token(&token).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let svc = service();
        let other = TokenService::new(
            "other-secret",
            3600,
            604800,
            "obra-api".to_string(),
            "obra-web".to_string(),
        );

        let token = svc
            .generate_access_token(&UserId::new(), None, Role::Master)
            .unwrap();
        assert!(other.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("MASTER".parse::<Role>().unwrap(), Role::Master);
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("OWNER".parse::<Role>().unwrap(), Role::Owner);
        assert!("SUPERUSER".parse::<Role>().is_err());
    }
}
