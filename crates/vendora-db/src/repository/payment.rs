//! SurrealDB implementation of [`PaymentRepository`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;
use vendora_core::error::VendoraResult;
use vendora_core::models::payment::{CreatePayment, Payment, PaymentStatus};
use vendora_core::repository::PaymentRepository;

use crate::error::DbError;

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
pub(crate) struct PaymentRowWithId {
    record_id: String,
    tenant_id: String,
    order_id: String,
    provider: String,
    amount: Decimal,
    currency: String,
    status: String,
    transaction_id: Option<String>,
    processed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

pub(crate) fn parse_status(s: &str) -> Result<PaymentStatus, DbError> {
    match s {
        "Pending" => Ok(PaymentStatus::Pending),
        "Completed" => Ok(PaymentStatus::Completed),
        "Failed" => Ok(PaymentStatus::Failed),
        other => Err(DbError::Query(format!("unknown payment status: {other}"))),
    }
}

impl PaymentRowWithId {
    pub(crate) fn try_into_payment(self) -> Result<Payment, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Query(format!("invalid UUID: {e}")))?;
        let tenant_id = Uuid::parse_str(&self.tenant_id)
            .map_err(|e| DbError::Query(format!("invalid tenant UUID: {e}")))?;
        let order_id = Uuid::parse_str(&self.order_id)
            .map_err(|e| DbError::Query(format!("invalid order UUID: {e}")))?;
        Ok(Payment {
            id,
            tenant_id,
            order_id,
            provider: self.provider,
            amount: self.amount,
            currency: self.currency,
            status: parse_status(&self.status)?,
            transaction_id: self.transaction_id,
            processed_at: self.processed_at,
            created_at: self.created_at,
        })
    }
}

/// Fetch one payment by record id within a tenant.
///
/// Shared with the checkout commit.
pub(crate) async fn fetch_payment<C: Connection>(
    db: &Surreal<C>,
    tenant_id: Uuid,
    id: Uuid,
) -> VendoraResult<Payment> {
    let id_str = id.to_string();

    let mut result = db
        .query(
            "SELECT meta::id(id) AS record_id, * \
             FROM type::record('payment', $id) \
             WHERE tenant_id = $tenant_id",
        )
        .bind(("id", id_str.clone()))
        .bind(("tenant_id", tenant_id.to_string()))
        .await
        .map_err(DbError::from)?;

    let rows: Vec<PaymentRowWithId> = result.take(0).map_err(DbError::from)?;
    let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
        entity: "payment".into(),
        id: id_str,
    })?;

    Ok(row.try_into_payment()?)
}

/// SurrealDB implementation of the Payment repository.
#[derive(Clone)]
pub struct SurrealPaymentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPaymentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PaymentRepository for SurrealPaymentRepository<C> {
    async fn create(&self, input: CreatePayment) -> VendoraResult<Payment> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('payment', $id) SET \
                 tenant_id = $tenant_id, \
                 order_id = $order_id, \
                 provider = $provider, \
                 amount = $amount, \
                 currency = $currency, \
                 status = 'Pending', \
                 transaction_id = NONE, \
                 processed_at = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", input.tenant_id.to_string()))
            .bind(("order_id", input.order_id.to_string()))
            .bind(("provider", input.provider))
            .bind(("amount", input.amount))
            .bind(("currency", input.currency))
            .await
            .map_err(DbError::from)?;

        result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        fetch_payment(&self.db, input.tenant_id, id).await
    }

    async fn get_by_id(&self, tenant_id: Uuid, id: Uuid) -> VendoraResult<Payment> {
        fetch_payment(&self.db, tenant_id, id).await
    }

    async fn list_by_order(&self, tenant_id: Uuid, order_id: Uuid) -> VendoraResult<Vec<Payment>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM payment \
                 WHERE tenant_id = $tenant_id AND order_id = $order_id \
                 ORDER BY created_at DESC",
            )
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("order_id", order_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PaymentRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .map(|row| row.try_into_payment())
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn mark_completed(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        transaction_id: &str,
    ) -> VendoraResult<Payment> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('payment', $id) SET \
                 status = 'Completed', \
                 transaction_id = $transaction_id, \
                 processed_at = time::now() \
                 WHERE tenant_id = $tenant_id \
                 RETURN meta::id(id) AS record_id, *",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .bind(("transaction_id", transaction_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PaymentRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "payment".into(),
            id: id_str,
        })?;

        Ok(row.try_into_payment()?)
    }

    async fn mark_failed(&self, tenant_id: Uuid, id: Uuid) -> VendoraResult<Payment> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('payment', $id) SET \
                 status = 'Failed', \
                 processed_at = time::now() \
                 WHERE tenant_id = $tenant_id \
                 RETURN meta::id(id) AS record_id, *",
            )
            .bind(("id", id_str.clone()))
            .bind(("tenant_id", tenant_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PaymentRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "payment".into(),
            id: id_str,
        })?;

        Ok(row.try_into_payment()?)
    }
}
