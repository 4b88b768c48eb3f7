// src/application/usecase/payment_usecase.rs
// Drives one checkout attempt from payment to bookings

use std::sync::Arc;
use tokio::time::{timeout, Duration};

use crate::application::usecase::booking_request_usecase::BookingRequest;
use crate::application::usecase::commit_usecase::{BookingCommitter, CommittedBookings};
use crate::application::usecase::reconciliation_usecase::ReconciliationReporter;
use crate::domain::errors::{CheckoutError, CheckoutResult, GatewayError};
use crate::domain::models::{BuyerContact, OrderIntent, PaymentOutcome, PaymentReceipt};
use crate::domain::repository::BookingRepository;
use crate::domain::service::PaymentGateway;

/// States of a single checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
    Idle,
    AwaitingGateway { order_id: String },
    Succeeded { order_id: String, payment_id: String },
    Failed { order_id: String, reason: String },
    Cancelled { order_id: String },
    BookingCreated { order_id: String, payment_id: String },
    BookingCreationFailed { order_id: String, payment_id: String },
}

impl CheckoutState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CheckoutState::Failed { .. }
                | CheckoutState::Cancelled { .. }
                | CheckoutState::BookingCreated { .. }
                | CheckoutState::BookingCreationFailed { .. }
        )
    }

    fn allows(&self, next: &CheckoutState) -> bool {
        use CheckoutState::*;

        match (self, next) {
            (Idle, AwaitingGateway { .. }) => true,
            (AwaitingGateway { order_id: a }, Succeeded { order_id: b, .. })
            | (AwaitingGateway { order_id: a }, Failed { order_id: b, .. })
            | (AwaitingGateway { order_id: a }, Cancelled { order_id: b }) => a == b,
            (
                Succeeded { order_id: a, payment_id: p },
                BookingCreated { order_id: b, payment_id: q },
            )
            | (
                Succeeded { order_id: a, payment_id: p },
                BookingCreationFailed { order_id: b, payment_id: q },
            ) => a == b && p == q,
            _ => false,
        }
    }
}

/// The state machine of one attempt, with its transition history.
#[derive(Debug, Clone)]
pub struct CheckoutAttempt {
    state: CheckoutState,
    history: Vec<CheckoutState>,
}

impl Default for CheckoutAttempt {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutAttempt {
    pub fn new() -> Self {
        Self {
            state: CheckoutState::Idle,
            history: vec![CheckoutState::Idle],
        }
    }

    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    pub fn history(&self) -> &[CheckoutState] {
        &self.history
    }

    /// Moves to `next`. Returns false, leaving the state untouched, when the
    /// transition is not part of the machine.
    pub fn advance(&mut self, next: CheckoutState) -> bool {
        if !self.state.allows(&next) {
            log::error!("Illegal checkout transition {:?} -> {:?}", self.state, next);
            return false;
        }

        log::debug!("Checkout transition {:?} -> {:?}", self.state, next);
        self.state = next.clone();
        self.history.push(next);
        true
    }
}

/// A checkout that ended with every slot booked.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReceipt {
    pub committed: CommittedBookings,
    pub amount_minor: u64,
}

impl CheckoutReceipt {
    pub fn order_id(&self) -> &str {
        &self.committed.receipt.order_id
    }

    pub fn payment_id(&self) -> &str {
        &self.committed.receipt.payment_id
    }
}

pub struct PaymentOrchestrator {
    gateway: Arc<dyn PaymentGateway>,
    repository: Arc<dyn BookingRepository>,
    committer: BookingCommitter,
    reporter: ReconciliationReporter,
    payment_timeout: Duration,
}

impl PaymentOrchestrator {
    pub fn new(
        gateway: Arc<dyn PaymentGateway>,
        repository: Arc<dyn BookingRepository>,
        reporter: ReconciliationReporter,
        payment_timeout: Duration,
    ) -> Self {
        Self {
            gateway,
            committer: BookingCommitter::new(repository.clone()),
            repository,
            reporter,
            payment_timeout,
        }
    }

    /// Runs one attempt. Every call mints a new order id; nothing is retried.
    pub async fn checkout(
        &self,
        request: &BookingRequest,
        buyer: &BuyerContact,
    ) -> CheckoutResult<CheckoutReceipt> {
        let mut attempt = CheckoutAttempt::new();
        self.run(&mut attempt, request, buyer).await
    }

    /// Same as `checkout`, leaving the attempt's states in `attempt`.
    pub async fn run(
        &self,
        attempt: &mut CheckoutAttempt,
        request: &BookingRequest,
        buyer: &BuyerContact,
    ) -> CheckoutResult<CheckoutReceipt> {
        buyer.validate()?;

        let intent = OrderIntent::new(request.amount_minor(), buyer.clone());
        let order_id = intent.order_id().to_string();

        attempt.advance(CheckoutState::AwaitingGateway {
            order_id: order_id.clone(),
        });
        log::info!(
            "Opening {} checkout for order {} ({} slot(s), {} minor units)",
            self.gateway.name(),
            order_id,
            request.slot_count(),
            intent.amount_minor()
        );

        let (outcome, timed_out) =
            match timeout(self.payment_timeout, self.gateway.open(&intent, request.summary())).await
            {
                Ok(Ok(outcome)) => (outcome, false),
                Ok(Err(error)) => (
                    PaymentOutcome::Failed {
                        reason: error.to_string(),
                    },
                    false,
                ),
                Err(_) => (
                    PaymentOutcome::Failed {
                        reason: format!(
                            "no gateway response within {}s",
                            self.payment_timeout.as_secs()
                        ),
                    },
                    true,
                ),
            };

        match outcome {
            PaymentOutcome::Cancelled => {
                attempt.advance(CheckoutState::Cancelled {
                    order_id: order_id.clone(),
                });
                log::info!("Checkout for order {} cancelled by buyer", order_id);
                Err(GatewayError::Cancelled { order_id }.into())
            }
            PaymentOutcome::Failed { reason } => {
                attempt.advance(CheckoutState::Failed {
                    order_id: order_id.clone(),
                    reason: reason.clone(),
                });
                log::warn!("Payment for order {} failed: {}", order_id, reason);

                if let Err(error) = self.repository.report_payment_failure(&order_id).await {
                    log::warn!("Failed to report payment failure for order {}: {}", order_id, error);
                }

                if timed_out {
                    Err(GatewayError::TimedOut { order_id }.into())
                } else {
                    Err(GatewayError::Declined { order_id, reason }.into())
                }
            }
            PaymentOutcome::Succeeded { payment_id } => {
                attempt.advance(CheckoutState::Succeeded {
                    order_id: order_id.clone(),
                    payment_id: payment_id.clone(),
                });
                log::info!("Payment {} captured for order {}", payment_id, order_id);

                let receipt = PaymentReceipt {
                    order_id: order_id.clone(),
                    payment_id: payment_id.clone(),
                };

                match self.committer.commit(&receipt, request.payloads()).await {
                    Ok(committed) => {
                        attempt.advance(CheckoutState::BookingCreated {
                            order_id,
                            payment_id,
                        });
                        Ok(CheckoutReceipt {
                            committed,
                            amount_minor: intent.amount_minor(),
                        })
                    }
                    Err(failure) => {
                        attempt.advance(CheckoutState::BookingCreationFailed {
                            order_id,
                            payment_id,
                        });
                        Err(CheckoutError::BookingCreation(self.reporter.report(&failure)))
                    }
                }
            }
        }
    }
}
