//! PostgreSQL billing history repository

use async_trait::async_trait;
use obra_common::{BillingEntryId, PagedResult, Pagination, TenantId};
use obra_errors::{AppError, AppResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::BillingEntry;
use crate::domain::repositories::BillingRepository;

const COLUMNS: &str = "id, tenant_id, description, amount_cents, currency, reference_month, \
                       paid_at, created_at";

pub struct PostgresBillingRepository {
    pool: PgPool,
}

impl PostgresBillingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BillingRepository for PostgresBillingRepository {
    async fn create(&self, entry: &BillingEntry) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO billing_history (id, tenant_id, description, amount_cents, currency,
                                         reference_month, paid_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.id.0)
        .bind(entry.tenant_id.0)
        .bind(&entry.description)
        .bind(entry.amount_cents)
        .bind(&entry.currency)
        .bind(entry.reference_month)
        .bind(entry.paid_at)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to create billing entry: {}", e)))?;

        Ok(())
    }

    async fn find_by_id(&self, id: &BillingEntryId) -> AppResult<Option<BillingEntry>> {
        let row = sqlx::query_as::<_, BillingRow>(&format!(
            "SELECT {COLUMNS} FROM billing_history WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to find billing entry: {}", e)))?;

        Ok(row.map(BillingRow::into_entry))
    }

    async fn list_by_tenant(
        &self,
        tenant_id: &TenantId,
        pagination: &Pagination,
    ) -> AppResult<PagedResult<BillingEntry>> {
        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM billing_history WHERE tenant_id = $1")
                .bind(tenant_id.0)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to count billing entries: {}", e)))?;

        let rows = sqlx::query_as::<_, BillingRow>(&format!(
            "SELECT {COLUMNS} FROM billing_history WHERE tenant_id = $1 \
             ORDER BY reference_month DESC LIMIT $2 OFFSET $3"
        ))
        .bind(tenant_id.0)
        .bind(pagination.limit() as i64)
        .bind(pagination.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list billing entries: {}", e)))?;

        let entries = rows.into_iter().map(BillingRow::into_entry).collect();
        Ok(PagedResult::new(entries, total.0 as u64, pagination))
    }

    async fn mark_paid(&self, id: &BillingEntryId) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE billing_history SET paid_at = now() WHERE id = $1 AND paid_at IS NULL",
        )
        .bind(id.0)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to mark billing entry paid: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!(
                "Unpaid billing entry not found: {}",
                id
            )));
        }

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct BillingRow {
    id: Uuid,
    tenant_id: Uuid,
    description: String,
    amount_cents: i64,
    currency: String,
    reference_month: chrono::NaiveDate,
    paid_at: Option<chrono::DateTime<chrono::Utc>>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl BillingRow {
    fn into_entry(self) -> BillingEntry {
        BillingEntry {
            id: BillingEntryId::from_uuid(self.id),
            tenant_id: TenantId::from_uuid(self.tenant_id),
            description: self.description,
            amount_cents: self.amount_cents,
            currency: self.currency,
            reference_month: self.reference_month,
            paid_at: self.paid_at,
            created_at: self.created_at,
        }
    }
}
