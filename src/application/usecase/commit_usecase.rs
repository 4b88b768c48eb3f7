// src/application/usecase/commit_usecase.rs
// Converts a captured payment into persisted bookings

use futures_util::future::join_all;
use std::sync::Arc;

use crate::domain::errors::BackendError;
use crate::domain::models::{Booking, BookingPayload, PaymentReceipt, TimeSlot};
use crate::domain::repository::BookingRepository;

/// Whether the backend accepted the settlement report.
#[derive(Debug, Clone, PartialEq)]
pub enum Acknowledgement {
    Recorded,
    /// The bookings exist regardless; only the report was lost.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommittedBookings {
    pub receipt: PaymentReceipt,
    pub bookings: Vec<Booking>,
    pub acknowledgement: Acknowledgement,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotFailure {
    pub slot: TimeSlot,
    pub error: BackendError,
}

/// Some bookings of a paid order were not created.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingCreationFailure {
    pub receipt: PaymentReceipt,
    pub created: Vec<Booking>,
    pub failed: Vec<SlotFailure>,
}

pub struct BookingCommitter {
    repository: Arc<dyn BookingRepository>,
}

impl BookingCommitter {
    pub fn new(repository: Arc<dyn BookingRepository>) -> Self {
        Self { repository }
    }

    /// Creates one booking per payload. Multi-slot orders are created
    /// concurrently and every call is awaited before deciding.
    ///
    /// The order is reported settled only when every booking exists. Partial
    /// success is returned as-is; created bookings are never rolled back.
    pub async fn commit(
        &self,
        receipt: &PaymentReceipt,
        payloads: &[BookingPayload],
    ) -> Result<CommittedBookings, BookingCreationFailure> {
        let results = match payloads {
            [single] => vec![self.repository.create_booking(single, receipt).await],
            many => {
                join_all(
                    many.iter()
                        .map(|payload| self.repository.create_booking(payload, receipt)),
                )
                .await
            }
        };

        let mut created = Vec::with_capacity(payloads.len());
        let mut failed = Vec::new();

        for (payload, result) in payloads.iter().zip(results) {
            match result {
                Ok(booking) => {
                    log::info!(
                        "Created booking {} for slot {} (order {})",
                        booking.id,
                        payload.slot,
                        receipt.order_id
                    );
                    created.push(booking);
                }
                Err(error) => {
                    log::error!(
                        "Failed to create booking for slot {} (order {}): {}",
                        payload.slot,
                        receipt.order_id,
                        error
                    );
                    failed.push(SlotFailure {
                        slot: payload.slot,
                        error,
                    });
                }
            }
        }

        if !failed.is_empty() {
            return Err(BookingCreationFailure {
                receipt: receipt.clone(),
                created,
                failed,
            });
        }

        let acknowledgement = match self
            .repository
            .report_payment_success(&receipt.order_id, &receipt.payment_id)
            .await
        {
            Ok(()) => Acknowledgement::Recorded,
            Err(error) => {
                log::warn!(
                    "Bookings for order {} exist but the payment success report failed: {}",
                    receipt.order_id,
                    error
                );
                Acknowledgement::Failed(error.to_string())
            }
        };

        Ok(CommittedBookings {
            receipt: receipt.clone(),
            bookings: created,
            acknowledgement,
        })
    }
}
