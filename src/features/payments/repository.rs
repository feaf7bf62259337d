use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    features::payments::{
        gateway::GatewaySession,
        models::{NewPayment, Payment, PaymentStatus},
    },
    services::{database::Database, memory::MemoryStore},
    utilities::errors::{AppError, unique_violation},
};

const PAYMENT_COLUMNS: &str =
    "id, booking_id, amount, transaction_id, status, checkout_url, created_at, updated_at";

fn duplicate(constraint: &str) -> AppError {
    match constraint {
        "payments_transaction_id_key" => {
            AppError::Conflict("Payment with this transaction id already exists".to_string())
        }
        "payments_booking_id_key" => {
            AppError::Conflict("A payment for this booking already exists".to_string())
        }
        other => AppError::Conflict(format!("Payment violates {other}")),
    }
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, payment: NewPayment) -> Result<Payment, AppError>;
    async fn find_by_booking(&self, booking_id: Uuid) -> Result<Option<Payment>, AppError>;
    async fn update_status(&self, id: Uuid, status: PaymentStatus) -> Result<Payment, AppError>;
    /// Points `id` at a new gateway session for `amount` and reopens it.
    async fn reissue(
        &self,
        id: Uuid,
        amount: BigDecimal,
        session: GatewaySession,
    ) -> Result<Payment, AppError>;
}

#[async_trait]
impl PaymentRepository for Database {
    async fn create(&self, payment: NewPayment) -> Result<Payment, AppError> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            INSERT INTO payments (id, booking_id, amount, transaction_id, checkout_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(payment.booking_id)
        .bind(&payment.amount)
        .bind(&payment.transaction_id)
        .bind(&payment.checkout_url)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(constraint) => duplicate(&constraint),
            None => e.into(),
        })
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> Result<Option<Payment>, AppError> {
        Ok(sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE booking_id = $1"
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn update_status(&self, id: Uuid, status: PaymentStatus) -> Result<Payment, AppError> {
        sqlx::query_as::<_, Payment>(&format!(
            "UPDATE payments SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {PAYMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Payment not found".to_string()))
    }

    async fn reissue(
        &self,
        id: Uuid,
        amount: BigDecimal,
        session: GatewaySession,
    ) -> Result<Payment, AppError> {
        sqlx::query_as::<_, Payment>(&format!(
            r#"
            UPDATE payments
            SET amount = $2, transaction_id = $3, checkout_url = $4, status = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&amount)
        .bind(&session.transaction_id)
        .bind(&session.checkout_url)
        .bind(PaymentStatus::Pending)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match unique_violation(&e) {
            Some(constraint) => duplicate(&constraint),
            None => e.into(),
        })?
        .ok_or_else(|| AppError::NotFoundError("Payment not found".to_string()))
    }
}

#[async_trait]
impl PaymentRepository for MemoryStore {
    async fn create(&self, payment: NewPayment) -> Result<Payment, AppError> {
        let mut tables = self.tables()?;
        if tables
            .payments
            .iter()
            .any(|p| p.transaction_id == payment.transaction_id)
        {
            return Err(duplicate("payments_transaction_id_key"));
        }
        if tables
            .payments
            .iter()
            .any(|p| p.booking_id == payment.booking_id)
        {
            return Err(duplicate("payments_booking_id_key"));
        }

        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4(),
            booking_id: payment.booking_id,
            amount: payment.amount,
            transaction_id: payment.transaction_id,
            status: PaymentStatus::Pending,
            checkout_url: payment.checkout_url,
            created_at: now,
            updated_at: now,
        };
        tables.payments.push(payment.clone());
        Ok(payment)
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> Result<Option<Payment>, AppError> {
        Ok(self
            .tables()?
            .payments
            .iter()
            .find(|p| p.booking_id == booking_id)
            .cloned())
    }

    async fn update_status(&self, id: Uuid, status: PaymentStatus) -> Result<Payment, AppError> {
        let mut tables = self.tables()?;
        let payment = tables
            .payments
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFoundError("Payment not found".to_string()))?;

        payment.status = status;
        payment.updated_at = Utc::now();
        Ok(payment.clone())
    }

    async fn reissue(
        &self,
        id: Uuid,
        amount: BigDecimal,
        session: GatewaySession,
    ) -> Result<Payment, AppError> {
        let mut tables = self.tables()?;
        if tables
            .payments
            .iter()
            .any(|p| p.id != id && p.transaction_id == session.transaction_id)
        {
            return Err(duplicate("payments_transaction_id_key"));
        }
        let payment = tables
            .payments
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::NotFoundError("Payment not found".to_string()))?;

        payment.amount = amount;
        payment.transaction_id = session.transaction_id;
        payment.checkout_url = session.checkout_url;
        payment.status = PaymentStatus::Pending;
        payment.updated_at = Utc::now();
        Ok(payment.clone())
    }
}
