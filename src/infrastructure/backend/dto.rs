// src/infrastructure/backend/dto.rs
// Wire formats of the backend booking API

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::application::dto::{opt_string_or_number, string_or_number};
use crate::domain::errors::{BackendError, BackendResult};
use crate::domain::models::{Booking, BookingPayload, BookingStatus, PaymentReceipt, TimeSlot};

#[derive(Debug, Serialize)]
pub struct CreateBookingBody<'a> {
    pub facility_id: &'a str,
    pub service_id: &'a str,
    pub court_id: &'a str,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub price: String,
    pub order_id: &'a str,
    pub payment_id: &'a str,
    pub payment_method: &'a str,
}

impl<'a> CreateBookingBody<'a> {
    pub fn new(payload: &'a BookingPayload, receipt: &'a PaymentReceipt, payment_method: &'a str) -> Self {
        Self {
            facility_id: &payload.facility_id,
            service_id: &payload.service_id,
            court_id: &payload.court_id,
            date: payload.date.format("%Y-%m-%d").to_string(),
            start_time: payload.slot.start.to_string(),
            end_time: payload.slot.end.to_string(),
            price: payload.price.to_string(),
            order_id: &receipt.order_id,
            payment_id: &receipt.payment_id,
            payment_method,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentSuccessBody<'a> {
    pub order_id: &'a str,
    pub payment_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct PaymentFailureBody<'a> {
    pub order_id: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    pub message: Option<String>,
}

/// Identifier and status the backend hands back after a create.
#[derive(Debug, Deserialize)]
pub struct CreatedRecord {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingResponse {
    #[serde(default)]
    pub booking: Option<CreatedRecord>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub booking_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl CreateBookingResponse {
    pub fn into_booking(self, payload: &BookingPayload, receipt: &PaymentReceipt) -> BackendResult<Booking> {
        let (nested_id, nested_status) = match self.booking {
            Some(record) => (record.id, record.status),
            None => (None, None),
        };

        let id = nested_id
            .or(self.id)
            .or(self.booking_id)
            .ok_or_else(|| BackendError::InvalidResponse("created booking has no id".to_string()))?;

        let status = BookingStatus::parse_or_pending(nested_status.or(self.status).as_deref())
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        Ok(Booking::from_payload(&id, payload, receipt, status))
    }
}

#[derive(Debug, Deserialize)]
pub struct BookingRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub facility_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub service_id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub court_id: String,
    #[serde(default)]
    pub facility_name: Option<String>,
    #[serde(default)]
    pub court_name: Option<String>,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub total_price: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub price: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub payment_id: Option<String>,
}

impl BookingRecord {
    pub fn into_booking(self) -> BackendResult<Booking> {
        let invalid = |field: &str, value: &str| {
            BackendError::InvalidResponse(format!("booking {} has invalid {}: {}", self.id, field, value))
        };

        // Dates sometimes arrive as full timestamps
        let date_part = self.date.get(..10).unwrap_or(&self.date);
        let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            .map_err(|_| invalid("date", &self.date))?;
        let start = self.start_time.parse().map_err(|_| invalid("start_time", &self.start_time))?;
        let end = self.end_time.parse().map_err(|_| invalid("end_time", &self.end_time))?;

        let price = match self.total_price.as_deref().or(self.price.as_deref()) {
            Some(raw) => Decimal::from_str(raw.trim()).map_err(|_| invalid("price", raw))?,
            None => Decimal::ZERO,
        };

        let status = BookingStatus::parse_or_pending(self.status.as_deref())
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        Ok(Booking {
            id: self.id,
            facility_id: self.facility_id,
            service_id: self.service_id,
            court_id: self.court_id,
            venue_name: self.facility_name,
            court_name: self.court_name,
            date,
            slot: TimeSlot::new(start, end),
            price,
            order_id: self.order_id,
            payment_id: self.payment_id,
            status,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct BookingEnvelope {
    pub booking: Option<BookingRecord>,
}

#[derive(Debug, Deserialize)]
pub struct BookingsEnvelope {
    #[serde(default)]
    pub bookings: Option<Vec<BookingRecord>>,
}
