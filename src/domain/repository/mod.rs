// Repository interfaces for domain entities

use async_trait::async_trait;

use crate::domain::errors::BackendResult;
use crate::domain::models::{Booking, BookingPayload, PaymentReceipt};

/// Backend booking API
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Create the booking for one paid slot
    async fn create_booking(
        &self,
        payload: &BookingPayload,
        receipt: &PaymentReceipt,
    ) -> BackendResult<Booking>;

    /// Mark an order as settled once all of its bookings exist
    async fn report_payment_success(&self, order_id: &str, payment_id: &str) -> BackendResult<()>;

    /// Mark an order as failed. Safe to repeat.
    async fn report_payment_failure(&self, order_id: &str) -> BackendResult<()>;

    async fn list_bookings(&self) -> BackendResult<Vec<Booking>>;

    async fn get_booking(&self, booking_id: &str) -> BackendResult<Booking>;

    async fn cancel_booking(&self, booking_id: &str) -> BackendResult<()>;
}
