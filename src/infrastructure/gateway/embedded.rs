// src/infrastructure/gateway/embedded.rs
// Checkout through an SDK embedded in the client process

use async_trait::async_trait;
use std::sync::Arc;

use super::options::{CheckoutOptions, CheckoutSettings};
use crate::infrastructure::console::ConsoleInput;
use crate::domain::errors::GatewayResult;
use crate::domain::models::{CheckoutSummary, OrderIntent, PaymentOutcome};
use crate::domain::service::PaymentGateway;

const CANCELLED_CODES: [&str; 2] = ["Cancelled", "PAYMENT_CANCELLED"];

/// Successful SDK result. `order_id` is the order the SDK says was paid.
#[derive(Debug, Clone, PartialEq)]
pub struct SdkPayment {
    pub payment_id: String,
    pub order_id: Option<String>,
}

/// Error raised by the SDK, including user dismissal
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SdkError {
    pub code: String,
    pub description: Option<String>,
    pub message: Option<String>,
}

/// The native checkout SDK
#[async_trait]
pub trait CheckoutSdk: Send + Sync {
    async fn open(&self, options: &CheckoutOptions) -> Result<SdkPayment, SdkError>;
}

pub struct EmbeddedCheckoutGateway<S: CheckoutSdk> {
    sdk: S,
    settings: CheckoutSettings,
}

impl<S: CheckoutSdk> EmbeddedCheckoutGateway<S> {
    pub fn new(sdk: S, settings: CheckoutSettings) -> Self {
        Self { sdk, settings }
    }

    fn outcome(error: SdkError) -> PaymentOutcome {
        if CANCELLED_CODES.contains(&error.code.as_str()) {
            return PaymentOutcome::Cancelled;
        }

        let reason = error
            .description
            .or(error.message)
            .unwrap_or_else(|| "Unknown error".to_string());

        PaymentOutcome::Failed { reason }
    }
}

#[async_trait]
impl<S: CheckoutSdk> PaymentGateway for EmbeddedCheckoutGateway<S> {
    fn name(&self) -> &'static str {
        "embedded"
    }

    async fn open(
        &self,
        intent: &OrderIntent,
        summary: &CheckoutSummary,
    ) -> GatewayResult<PaymentOutcome> {
        let options = CheckoutOptions::new(&self.settings, intent, summary, self.name());
        log::debug!("Opening embedded checkout: {:?}", options);

        match self.sdk.open(&options).await {
            Ok(SdkPayment {
                payment_id,
                order_id: Some(paid_order),
            }) if paid_order != intent.order_id() => {
                log::warn!(
                    "Embedded checkout returned payment {} for order {} while order {} was open",
                    payment_id,
                    paid_order,
                    intent.order_id()
                );
                Ok(PaymentOutcome::Failed {
                    reason: format!("payment {} belongs to order {}", payment_id, paid_order),
                })
            }
            Ok(payment) => {
                log::info!("Embedded checkout succeeded: {}", payment.payment_id);
                Ok(PaymentOutcome::Succeeded {
                    payment_id: payment.payment_id,
                })
            }
            Err(error) => {
                log::info!("Embedded checkout ended with code {}", error.code);
                Ok(Self::outcome(error))
            }
        }
    }
}

/// Reads the outcome of a checkout typed on the console:
/// a payment id, `cancel`, or `fail <reason>`.
pub fn parse_console_outcome(line: &str) -> Option<PaymentOutcome> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head.to_lowercase().as_str() {
        "" => None,
        "cancel" => Some(PaymentOutcome::Cancelled),
        "fail" => Some(PaymentOutcome::Failed {
            reason: if rest.is_empty() {
                "Payment declined".to_string()
            } else {
                rest.to_string()
            },
        }),
        _ if rest.is_empty() => Some(PaymentOutcome::Succeeded {
            payment_id: head.to_string(),
        }),
        _ => None,
    }
}

/// SDK for terminal use: prints the checkout and waits for the operator
/// to type how it ended.
pub struct ConsoleCheckoutSdk {
    input: Arc<ConsoleInput>,
}

impl ConsoleCheckoutSdk {
    pub fn new(input: Arc<ConsoleInput>) -> Self {
        Self { input }
    }
}

#[async_trait]
impl CheckoutSdk for ConsoleCheckoutSdk {
    async fn open(&self, options: &CheckoutOptions) -> Result<SdkPayment, SdkError> {
        println!("{} - {}", options.name, options.description);
        println!(
            "Amount: {} minor units ({}), contact {}",
            options.amount, options.currency, options.prefill.contact
        );
        println!("Enter payment id, 'cancel' or 'fail <reason>':");

        loop {
            let Some(line) = self.input.next_line().await else {
                return Err(SdkError {
                    code: "Cancelled".to_string(),
                    ..Default::default()
                });
            };

            match parse_console_outcome(&line) {
                Some(PaymentOutcome::Succeeded { payment_id }) => {
                    return Ok(SdkPayment {
                        payment_id,
                        order_id: options.notes.get("order_id").cloned(),
                    })
                }
                Some(PaymentOutcome::Cancelled) => {
                    return Err(SdkError {
                        code: "PAYMENT_CANCELLED".to_string(),
                        ..Default::default()
                    })
                }
                Some(PaymentOutcome::Failed { reason }) => {
                    return Err(SdkError {
                        code: "PAYMENT_FAILED".to_string(),
                        description: Some(reason),
                        message: None,
                    })
                }
                None => println!("Unrecognised input, try again:"),
            }
        }
    }
}
