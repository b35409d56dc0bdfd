//! PostgreSQL lead repository

use async_trait::async_trait;
use obra_common::{LeadId, PagedResult, Pagination};
use obra_errors::{AppError, AppResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::Lead;
use crate::domain::repositories::LeadRepository;
use crate::domain::value_objects::Email;

const COLUMNS: &str = "id, company_name, contact_name, email, phone, message, source, \
                       converted, created_at";

pub struct PostgresLeadRepository {
    pool: PgPool,
}

impl PostgresLeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadRepository for PostgresLeadRepository {
    async fn create(&self, lead: &Lead) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO leads (id, company_name, contact_name, email, phone, message, source,
                               converted, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(lead.id.0)
        .bind(&lead.company_name)
        .bind(&lead.contact_name)
        .bind(lead.email.as_str())
        .bind(&lead.phone)
        .bind(&lead.message)
        .bind(&lead.source)
        .bind(lead.converted)
        .bind(lead.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create lead: {}", e)))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &LeadId) -> AppResult<Option<Lead>> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {COLUMNS} FROM leads WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find lead: {}", e)))?;

        row.map(LeadRow::into_lead).transpose()
    }

    async fn list(&self, pagination: &Pagination) -> AppResult<PagedResult<Lead>> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM leads")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count leads: {}", e)))?;

        let rows = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {COLUMNS} FROM leads ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list leads: {}", e)))?;

        let leads: AppResult<Vec<_>> = rows.into_iter().map(LeadRow::into_lead).collect();
        Ok(PagedResult::new(leads?, total.0 as u64, pagination))
    }

    async fn mark_converted(&self, id: &LeadId) -> AppResult<()> {
        let result = sqlx::query("UPDATE leads SET converted = true WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to mark lead converted: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Lead not found: {}", id)));
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct LeadRow {
    id: Uuid,
    company_name: String,
    contact_name: String,
    email: String,
    phone: Option<String>,
    message: Option<String>,
    source: Option<String>,
    converted: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl LeadRow {
    fn into_lead(self) -> AppResult<Lead> {
        let email = Email::new(&self.email).map_err(|e| {
            AppError::database(format!("Invalid email in database for lead {}: {}", self.id, e))
        })?;

        Ok(Lead {
            id: LeadId::from_uuid(self.id),
            company_name: self.company_name,
            contact_name: self.contact_name,
            email,
            phone: self.phone,
            message: self.message,
            source: self.source,
            converted: self.converted,
            created_at: self.created_at,
        })
    }
}
