use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use delivery_api::application::auth::{
    AuthHandler, ConfirmPasswordResetCommand, LoginCommand, RequestPasswordResetCommand,
};
use delivery_api::domain::entities::{Tenant, User};
use delivery_api::domain::repositories::{TenantRepository, UserRepository};
use delivery_api::domain::services::password;
use delivery_api::domain::value_objects::{Email, Password};
use delivery_api::infrastructure::persistence::{
    PostgresAuditLogRepository, PostgresPasswordResetRepository, PostgresTenantRepository,
    PostgresUserRepository,
};
use obra_adapter_email::EmailSender;
use obra_auth_core::{Role, TokenService};
use obra_cqrs_core::CommandHandler;
use obra_errors::{AppError, AppResult};
use sqlx::PgPool;

/// Captures template contexts instead of talking to an SMTP server
#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<serde_json::Value>>,
    fail: bool,
}

impl RecordingMailer {
    fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn last_context(&self) -> serde_json::Value {
        self.sent.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send_text_email(&self, _to: &str, _subject: &str, _body: &str) -> AppResult<()> {
        Ok(())
    }

    async fn send_html_email(
        &self,
        _to: &str,
        _subject: &str,
        _html_body: &str,
        _text_body: Option<&str>,
    ) -> AppResult<()> {
        Ok(())
    }

    async fn send_template_email(
        &self,
        _to: &str,
        _subject: &str,
        _template_name: &str,
        context: &serde_json::Value,
    ) -> AppResult<()> {
        if self.fail {
            return Err(AppError::external_service("SMTP unreachable"));
        }
        self.sent.lock().unwrap().push(context.clone());
        Ok(())
    }
}

struct Ctx {
    handler: AuthHandler,
    users: Arc<PostgresUserRepository>,
    mailer: Arc<RecordingMailer>,
    tokens: Arc<TokenService>,
}

async fn seed(pool: &PgPool) -> Ctx {
    seed_with_mailer(pool, Arc::new(RecordingMailer::default())).await
}

async fn seed_with_mailer(pool: &PgPool, mailer: Arc<RecordingMailer>) -> Ctx {
    let users = Arc::new(PostgresUserRepository::new(pool.clone()));
    let resets = Arc::new(PostgresPasswordResetRepository::new(pool.clone()));
    let audit = Arc::new(PostgresAuditLogRepository::new(pool.clone()));
    let tokens = Arc::new(TokenService::new(
        "test-secret",
        3600,
        604800,
        "obra-test".to_string(),
        "obra-api".to_string(),
    ));

    let handler = AuthHandler::new(
        users.clone(),
        resets,
        mailer.clone(),
        tokens.clone(),
        audit,
        "http://localhost/reset".to_string(),
        15,
    );

    Ctx {
        handler,
        users,
        mailer,
        tokens,
    }
}

async fn seed_admin(pool: &PgPool, ctx: &Ctx, raw_password: &str) -> User {
    let tenants = PostgresTenantRepository::new(pool.clone());
    let tenant = Tenant::new("Construtora Alfa".to_string(), "alfa".to_string());
    tenants.create(&tenant).await.unwrap();

    let password = Password::new(raw_password).unwrap();
    let user = User::new(
        Some(tenant.id),
        Email::new("admin@alfa.com.br").unwrap(),
        password::hash_password(&password).unwrap(),
        "Ana Admin".to_string(),
        Role::Admin,
    );
    ctx.users.create(&user).await.unwrap();
    user
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_returns_valid_token_pair(pool: PgPool) {
    let ctx = seed(&pool).await;
    let user = seed_admin(&pool, &ctx, "Str0ngPass").await;

    let pair = ctx
        .handler
        .handle(LoginCommand {
            email: "admin@alfa.com.br".to_string(),
            password: "Str0ngPass".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(pair.token_type, "Bearer");
    assert!(pair.expires_in > 0);

    let claims = ctx.tokens.validate_access_token(&pair.access_token).unwrap();
    assert_eq!(claims.user_id().unwrap(), user.id);
    assert_eq!(claims.role, Role::Admin);

    let stored = ctx.users.find_by_id(&user.id).await.unwrap().unwrap();
    assert!(stored.last_login_at.is_some());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_rejects_bad_password(pool: PgPool) {
    let ctx = seed(&pool).await;
    seed_admin(&pool, &ctx, "Str0ngPass").await;

    let err = ctx
        .handler
        .handle(LoginCommand {
            email: "admin@alfa.com.br".to_string(),
            password: "WrongPass1".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_rejects_inactive_user(pool: PgPool) {
    let ctx = seed(&pool).await;
    let mut user = seed_admin(&pool, &ctx, "Str0ngPass").await;

    user.deactivate();
    ctx.users.update(&user).await.unwrap();

    let err = ctx
        .handler
        .handle(LoginCommand {
            email: "admin@alfa.com.br".to_string(),
            password: "Str0ngPass".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_password_reset_flow(pool: PgPool) {
    let ctx = seed(&pool).await;
    seed_admin(&pool, &ctx, "Str0ngPass").await;

    ctx.handler
        .handle(RequestPasswordResetCommand {
            email: "admin@alfa.com.br".to_string(),
        })
        .await
        .unwrap();

    let reset_link = ctx.mailer.last_context()["reset_link"]
        .as_str()
        .unwrap()
        .to_string();
    let raw_token = reset_link.split("?token=").nth(1).unwrap().to_string();

    ctx.handler
        .handle(ConfirmPasswordResetCommand {
            token: raw_token.clone(),
            new_password: "Fresh1Pass".to_string(),
        })
        .await
        .unwrap();

    // new password works, old one does not
    ctx.handler
        .handle(LoginCommand {
            email: "admin@alfa.com.br".to_string(),
            password: "Fresh1Pass".to_string(),
        })
        .await
        .unwrap();

    let err = ctx
        .handler
        .handle(LoginCommand {
            email: "admin@alfa.com.br".to_string(),
            password: "Str0ngPass".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    // the token is single use
    let err = ctx
        .handler
        .handle(ConfirmPasswordResetCommand {
            token: raw_token,
            new_password: "Another1Pass".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reset_request_never_reveals_unknown_emails(pool: PgPool) {
    let ctx = seed(&pool).await;

    ctx.handler
        .handle(RequestPasswordResetCommand {
            email: "nobody@alfa.com.br".to_string(),
        })
        .await
        .unwrap();

    assert!(ctx.mailer.sent.lock().unwrap().is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reset_request_succeeds_when_mail_dispatch_fails(pool: PgPool) {
    let ctx = seed_with_mailer(&pool, Arc::new(RecordingMailer::failing())).await;
    seed_admin(&pool, &ctx, "Str0ngPass").await;

    // a known email must answer exactly like an unknown one, SMTP down or not
    ctx.handler
        .handle(RequestPasswordResetCommand {
            email: "admin@alfa.com.br".to_string(),
        })
        .await
        .unwrap();

    assert!(ctx.mailer.sent.lock().unwrap().is_empty());
}
