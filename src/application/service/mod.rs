// src/application/service/mod.rs
// Application services

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::Arc;

use crate::application::usecase::{
    BookingRequestBuilder, CheckoutReceipt, PaymentOrchestrator, SlotGenerator,
};
use crate::domain::errors::{AppResult, CheckoutResult};
use crate::domain::models::{
    Booking, BookingHistory, BookingSelection, BookingStatus, BuyerContact, Court, TimeSlot,
};
use crate::domain::repository::BookingRepository;

#[async_trait]
pub trait BookingService: Send + Sync {
    /// Slots a court offers on any day
    fn available_slots(&self, court: &Court) -> Vec<TimeSlot>;

    /// Pay for a selection and book every slot in it
    async fn checkout(
        &self,
        selection: &BookingSelection,
        buyer: &BuyerContact,
    ) -> CheckoutResult<CheckoutReceipt>;

    async fn bookings(&self) -> AppResult<Vec<Booking>>;

    /// Bookings split into upcoming and past as of `now`
    async fn history(&self, now: NaiveDateTime) -> AppResult<BookingHistory>;

    async fn booking(&self, booking_id: &str) -> AppResult<Booking>;

    /// Marks a confirmed booking that starts after `now` cancelled. No refund
    /// is issued.
    async fn cancel_booking(&self, booking_id: &str, now: NaiveDateTime) -> AppResult<Booking>;
}

pub struct BookingServiceImpl {
    orchestrator: PaymentOrchestrator,
    repository: Arc<dyn BookingRepository>,
}

impl BookingServiceImpl {
    pub fn new(orchestrator: PaymentOrchestrator, repository: Arc<dyn BookingRepository>) -> Self {
        Self {
            orchestrator,
            repository,
        }
    }
}

#[async_trait]
impl BookingService for BookingServiceImpl {
    fn available_slots(&self, court: &Court) -> Vec<TimeSlot> {
        SlotGenerator::for_court(court).collect()
    }

    async fn checkout(
        &self,
        selection: &BookingSelection,
        buyer: &BuyerContact,
    ) -> CheckoutResult<CheckoutReceipt> {
        let request = BookingRequestBuilder::build(selection)?;
        self.orchestrator.checkout(&request, buyer).await
    }

    async fn bookings(&self) -> AppResult<Vec<Booking>> {
        Ok(self.repository.list_bookings().await?)
    }

    async fn history(&self, now: NaiveDateTime) -> AppResult<BookingHistory> {
        let bookings = self.repository.list_bookings().await?;
        Ok(BookingHistory::partition(bookings, now))
    }

    async fn booking(&self, booking_id: &str) -> AppResult<Booking> {
        Ok(self.repository.get_booking(booking_id).await?)
    }

    async fn cancel_booking(&self, booking_id: &str, now: NaiveDateTime) -> AppResult<Booking> {
        let mut booking = self.repository.get_booking(booking_id).await?;
        booking.ensure_cancellable(now)?;

        self.repository.cancel_booking(booking_id).await?;
        log::info!("Cancelled booking {}", booking_id);

        booking.status = BookingStatus::Cancelled;
        Ok(booking)
    }
}
