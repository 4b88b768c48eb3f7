// src/domain/errors.rs
use std::fmt;
use thiserror::Error;

use crate::domain::models::{Booking, TimeSlot};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Bad input caught before any network call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Invalid court data: {0}")]
    InvalidCourt(String),

    #[error("No slots selected")]
    EmptySelection,

    #[error("Slot {slot} is not offered by court {court_id}")]
    SlotNotOffered { court_id: String, slot: String },

    #[error("Buyer phone number is required")]
    MissingPhone,

    #[error("Buyer phone number is malformed: {0}")]
    MalformedPhone(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unknown booking status: {0}")]
    UnknownStatus(String),

    #[error("Booking {0} is already cancelled")]
    AlreadyCancelled(String),

    #[error("Booking {booking_id} is {status} and cannot be cancelled")]
    NotCancellable { booking_id: String, status: String },

    #[error("Booking {0} has already started")]
    AlreadyStarted(String),
}

/// Terminal outcome of a checkout attempt that did not capture a payment.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Payment for order {order_id} failed: {reason}")]
    Declined { order_id: String, reason: String },

    #[error("Payment for order {order_id} timed out")]
    TimedOut { order_id: String },

    #[error("Payment for order {order_id} was cancelled")]
    Cancelled { order_id: String },

    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),
}

impl GatewayError {
    pub fn order_id(&self) -> Option<&str> {
        match self {
            GatewayError::Declined { order_id, .. }
            | GatewayError::TimedOut { order_id }
            | GatewayError::Cancelled { order_id } => Some(order_id),
            GatewayError::Unavailable(_) => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, GatewayError::Cancelled { .. })
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Request error: {0}")]
    Request(String),

    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Payment was captured but one or more bookings could not be created.
///
/// Retrying the checkout would charge the buyer again, so the only safe next
/// step is a support contact quoting both identifiers.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationNotice {
    pub order_id: String,
    pub payment_id: String,
    pub booked: Vec<Booking>,
    pub failed_slots: Vec<TimeSlot>,
    pub support_contact: String,
}

impl ReconciliationNotice {
    pub fn message(&self) -> String {
        let total = self.booked.len() + self.failed_slots.len();
        let failed = self
            .failed_slots
            .iter()
            .map(|slot| slot.to_string())
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "Payment was received but booking confirmation failed for {} of {} slot(s) ({}). \
             Please do not pay again. Contact support at {} with payment ID {} and order ID {}.",
            self.failed_slots.len(),
            total,
            failed,
            self.support_contact,
            self.payment_id,
            self.order_id
        )
    }
}

impl fmt::Display for ReconciliationNotice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Every way a checkout attempt can end without bookings for all slots.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckoutError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Booking creation failed after payment: {0}")]
    BookingCreation(ReconciliationNotice),
}

// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
pub type ValidationResult<T> = Result<T, ValidationError>;
pub type GatewayResult<T> = Result<T, GatewayError>;
pub type BackendResult<T> = Result<T, BackendError>;
pub type CheckoutResult<T> = Result<T, CheckoutError>;
