// src/application/usecase/booking_request_usecase.rs
// Turns a slot selection into priced booking payloads

use rust_decimal::Decimal;

use crate::domain::errors::{ValidationError, ValidationResult};
use crate::domain::models::{BookingPayload, BookingSelection, CheckoutSummary};
use crate::domain::money::to_minor_units;

/// Everything the payment and commit steps need for one selection.
///
/// Never empty: the builder rejects empty selections.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    payloads: Vec<BookingPayload>,
    total: Decimal,
    amount_minor: u64,
    summary: CheckoutSummary,
}

impl BookingRequest {
    pub fn payloads(&self) -> &[BookingPayload] {
        &self.payloads
    }

    /// Aggregate price, computed once for the whole selection
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// The total in gateway minor units
    pub fn amount_minor(&self) -> u64 {
        self.amount_minor
    }

    pub fn summary(&self) -> &CheckoutSummary {
        &self.summary
    }

    pub fn slot_count(&self) -> usize {
        self.payloads.len()
    }
}

pub struct BookingRequestBuilder;

impl BookingRequestBuilder {
    /// One payload per selected slot, in start-time order
    pub fn build(selection: &BookingSelection) -> ValidationResult<BookingRequest> {
        if selection.is_empty() {
            return Err(ValidationError::EmptySelection);
        }

        let court = selection.court();
        let reference = court.reference();

        let payloads: Vec<BookingPayload> = selection
            .slots()
            .map(|slot| BookingPayload {
                facility_id: reference.facility_id.clone(),
                service_id: reference.service_id.clone(),
                court_id: reference.court_id.clone(),
                date: selection.date(),
                slot: *slot,
                price: court.slot_price(),
            })
            .collect();

        let total = selection.total()?;
        let amount_minor = to_minor_units(total)?;

        log::debug!(
            "Built {} booking payload(s) for court {} on {}: total {}",
            payloads.len(),
            court.id(),
            selection.date(),
            total
        );

        Ok(BookingRequest {
            summary: CheckoutSummary {
                venue_name: reference.venue_name.clone(),
                court_name: reference.court_name.clone(),
                date: selection.date(),
                slot_count: payloads.len(),
            },
            payloads,
            total,
            amount_minor,
        })
    }
}
