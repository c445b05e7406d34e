//! Payment adapter boundary and settlement service.
//!
//! Concrete providers live behind [`PaymentProvider`]; the service
//! verifies the amount against the order total before any provider is
//! contacted, and records every attempt as its own payment row. A
//! provider failure is not fatal to the order — the customer retries,
//! producing a new payment record.

use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;
use vendora_core::error::{BusinessRule, VendoraError, VendoraResult};
use vendora_core::models::order::{OrderStatus, UpdateOrder};
use vendora_core::models::payment::{CreatePayment, Payment, PaymentStatus};
use vendora_core::repository::{OrderRepository, PaymentRepository};

/// Permitted difference between the order total and the submitted
/// amount, in currency units.
fn amount_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// A request to settle an order.
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub order_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
}

/// A successful provider response.
#[derive(Debug, Clone)]
pub struct ProviderReceipt {
    pub transaction_id: String,
}

/// A provider-side failure. Recorded, surfaced, retryable.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
}

/// The provider-agnostic boundary the settlement service calls.
///
/// Implementations are blocking I/O from the engine's point of view;
/// the surrounding caller applies request-level timeouts and treats a
/// timeout as failed, never as success.
pub trait PaymentProvider: Send + Sync {
    /// Provider identifier recorded on the payment row.
    fn name(&self) -> &str;

    fn process(
        &self,
        intent: &PaymentIntent,
    ) -> impl Future<Output = Result<ProviderReceipt, ProviderError>> + Send;
}

/// A provider for tests and local runs: always succeeds, unless built
/// with [`MockProvider::failing`].
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    fail: bool,
}

impl MockProvider {
    pub fn new() -> Self {
        Self { fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

impl PaymentProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn process(&self, _intent: &PaymentIntent) -> Result<ProviderReceipt, ProviderError> {
        if self.fail {
            return Err(ProviderError {
                message: "mock provider declined".into(),
            });
        }
        Ok(ProviderReceipt {
            transaction_id: format!("mock-{}", Uuid::new_v4()),
        })
    }
}

/// Settles orders through a payment provider.
pub struct PaymentService<O: OrderRepository, P: PaymentRepository> {
    orders: O,
    payments: P,
}

impl<O: OrderRepository, P: PaymentRepository> PaymentService<O, P> {
    pub fn new(orders: O, payments: P) -> Self {
        Self { orders, payments }
    }

    /// Process one settlement attempt for an order.
    ///
    /// On success the payment is `Completed` and the order moves
    /// `Pending -> Confirmed`. On provider failure the payment is
    /// `Failed`, the order stays `Pending`, and the failure surfaces
    /// to the caller for retry.
    pub async fn process(
        &self,
        tenant_id: Uuid,
        intent: PaymentIntent,
        provider: &impl PaymentProvider,
    ) -> VendoraResult<Payment> {
        // 1. The order must exist within this tenant.
        let order = self.orders.get_by_id(tenant_id, intent.order_id).await?;

        // 2. Verify the amount before contacting anyone.
        if (order.total - intent.amount).abs() > amount_tolerance() {
            return Err(VendoraError::BusinessRule(BusinessRule::AmountMismatch {
                expected: order.total,
                actual: intent.amount,
            }));
        }

        // 3. Only one completed payment is valid per order.
        let history = self
            .payments
            .list_by_order(tenant_id, intent.order_id)
            .await?;
        if history.iter().any(|p| p.status == PaymentStatus::Completed) {
            return Err(VendoraError::BusinessRule(BusinessRule::AlreadyPaid {
                order_id: intent.order_id,
            }));
        }

        // 4. Reuse the pending payment created at checkout when the
        //    provider matches; otherwise this attempt gets a new row.
        let payment = match history
            .into_iter()
            .find(|p| p.status == PaymentStatus::Pending && p.provider == provider.name())
        {
            Some(pending) => pending,
            None => {
                self.payments
                    .create(CreatePayment {
                        tenant_id,
                        order_id: intent.order_id,
                        provider: provider.name().to_string(),
                        amount: intent.amount,
                        currency: intent.currency.clone(),
                    })
                    .await?
            }
        };

        // 5. Contact the provider and record the outcome.
        match provider.process(&intent).await {
            Ok(receipt) => {
                let completed = self
                    .payments
                    .mark_completed(tenant_id, payment.id, &receipt.transaction_id)
                    .await?;

                if order.status == OrderStatus::Pending {
                    self.orders
                        .update(
                            tenant_id,
                            order.id,
                            UpdateOrder {
                                status: Some(OrderStatus::Confirmed),
                                ..Default::default()
                            },
                        )
                        .await?;
                }

                info!(
                    %tenant_id,
                    order_id = %order.id,
                    provider = provider.name(),
                    transaction_id = %receipt.transaction_id,
                    "payment completed"
                );
                Ok(completed)
            }
            Err(failure) => {
                // The order stays Pending; the failed attempt is kept
                // as history and the customer may retry.
                self.payments.mark_failed(tenant_id, payment.id).await?;
                warn!(
                    %tenant_id,
                    order_id = %order.id,
                    provider = provider.name(),
                    error = %failure,
                    "payment provider failure"
                );
                Err(VendoraError::Provider {
                    provider: provider.name().to_string(),
                    message: failure.message,
                })
            }
        }
    }
}
