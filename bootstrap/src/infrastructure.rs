//! Infrastructure resource management
//!
//! Shared resources built once at startup and handed to the service

use std::sync::Arc;

use obra_adapter_email::{EmailClient, EmailSender, EmailTemplate};
use obra_adapter_postgres::{check_connection, create_pool, PostgresConfig};
use obra_adapter_storage::S3Storage;
use obra_auth_core::TokenService;
use obra_config::AppConfig;
use obra_errors::AppResult;
use obra_ports::ObjectStorage;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tracing::info;

use crate::retry::{with_retry, RetryConfig};

/// Infrastructure resource container
pub struct Infrastructure {
    config: AppConfig,
    postgres_pool: PgPool,
    token_service: Arc<TokenService>,
    email_sender: Arc<dyn EmailSender>,
    storage: Arc<dyn ObjectStorage>,
}

impl Infrastructure {
    /// Build all resources from config, retrying transient failures
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        let retry_config = RetryConfig::default();

        // PostgreSQL pool, required
        let pg_config = PostgresConfig::new(config.database.url.expose_secret())
            .with_max_connections(config.database.max_connections);
        let postgres_pool = with_retry(&retry_config, "PostgreSQL connection", || {
            let cfg = pg_config.clone();
            async move { create_pool(&cfg).await }
        })
        .await?;
        info!(
            "PostgreSQL connection pool created (max_connections: {})",
            config.database.max_connections
        );

        // TokenService
        let token_service = Arc::new(TokenService::new(
            config.jwt.secret.expose_secret(),
            config.jwt.expires_in as i64,
            config.jwt.refresh_expires_in as i64,
            "obra-api".to_string(),
            "obra-web".to_string(),
        ));

        // SMTP client with templates from the conventional directory
        let email_client = match EmailTemplate::new("templates/email") {
            Ok(template) => EmailClient::new(config.email.clone()).with_template(template),
            Err(e) => {
                tracing::warn!("Email templates not loaded ({}), using raw mail only", e);
                EmailClient::new(config.email.clone())
            }
        };
        let email_sender: Arc<dyn EmailSender> = Arc::new(email_client);
        info!("Email client created");

        // Object storage
        let storage: Arc<dyn ObjectStorage> = Arc::new(S3Storage::new(&config.storage)?);
        info!(bucket = %config.storage.bucket, "Object storage client created");

        Ok(Self {
            config,
            postgres_pool,
            token_service,
            email_sender,
            storage,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn postgres_pool(&self) -> PgPool {
        self.postgres_pool.clone()
    }

    pub fn token_service(&self) -> Arc<TokenService> {
        self.token_service.clone()
    }

    pub fn email_sender(&self) -> Arc<dyn EmailSender> {
        self.email_sender.clone()
    }

    pub fn storage(&self) -> Arc<dyn ObjectStorage> {
        self.storage.clone()
    }

    /// Database liveness
    pub async fn check_postgres_connection(&self) -> bool {
        check_connection(&self.postgres_pool).await.is_ok()
    }
}
