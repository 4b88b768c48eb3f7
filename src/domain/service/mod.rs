// Domain service interfaces

use async_trait::async_trait;

use crate::domain::errors::GatewayResult;
use crate::domain::models::{CheckoutSummary, OrderIntent, PaymentOutcome};

/// A checkout surface that collects one payment.
///
/// Hosted and embedded checkouts both implement this; callers never branch on
/// which one they hold.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Opens checkout for the intent and resolves once the buyer pays,
    /// the gateway declines, or the buyer dismisses the checkout.
    ///
    /// An `Err` means checkout could not be opened at all.
    async fn open(
        &self,
        intent: &OrderIntent,
        summary: &CheckoutSummary,
    ) -> GatewayResult<PaymentOutcome>;
}
