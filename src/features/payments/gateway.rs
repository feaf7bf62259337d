//! Seam for the external payment provider.
//!
//! Only the sandbox is implemented. A real provider plugs in by implementing
//! [`PaymentGateway`] and passing it to `AppState::with_gateway`.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use tracing::debug;
use uuid::Uuid;

use crate::{features::payments::models::PaymentStatus, utilities::errors::AppError};

#[derive(Clone, Debug)]
pub struct PaymentRequest {
    pub booking_id: Uuid,
    pub amount: BigDecimal,
    pub customer_email: String,
    pub description: String,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GatewaySession {
    pub transaction_id: String,
    pub checkout_url: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initiate(&self, request: PaymentRequest) -> Result<GatewaySession, AppError>;
    async fn verify(&self, transaction_id: &str) -> Result<PaymentStatus, AppError>;
}

/// Accepts every payment without contacting anyone.
#[derive(Clone, Debug)]
pub struct SandboxGateway {
    pub checkout_base_url: String,
}

impl Default for SandboxGateway {
    fn default() -> Self {
        Self {
            checkout_base_url: "https://sandbox.payments.local/checkout".to_string(),
        }
    }
}

#[async_trait]
impl PaymentGateway for SandboxGateway {
    async fn initiate(&self, request: PaymentRequest) -> Result<GatewaySession, AppError> {
        let transaction_id = format!("txn-{}", Uuid::new_v4());
        debug!(booking_id = %request.booking_id, %transaction_id, amount = %request.amount, "sandbox payment initiated");

        Ok(GatewaySession {
            checkout_url: Some(format!("{}/{transaction_id}", self.checkout_base_url)),
            transaction_id,
        })
    }

    async fn verify(&self, transaction_id: &str) -> Result<PaymentStatus, AppError> {
        debug!(%transaction_id, "sandbox payment verified");
        Ok(PaymentStatus::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sandbox_issues_unique_transaction_ids() {
        let gateway = SandboxGateway::default();
        let request = PaymentRequest {
            booking_id: Uuid::new_v4(),
            amount: BigDecimal::from(250),
            customer_email: "guest@example.com".into(),
            description: "Booking".into(),
        };

        let first = gateway.initiate(request.clone()).await.unwrap();
        let second = gateway.initiate(request).await.unwrap();

        assert!(first.transaction_id.starts_with("txn-"));
        assert_ne!(first.transaction_id, second.transaction_id);
        assert!(
            first
                .checkout_url
                .as_deref()
                .is_some_and(|url| url.ends_with(&first.transaction_id))
        );
        assert_eq!(
            gateway.verify(&first.transaction_id).await.unwrap(),
            PaymentStatus::Completed
        );
    }
}
