// src/domain/models.rs
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::errors::{ValidationError, ValidationResult};

const MINUTES_PER_DAY: u32 = 24 * 60;
const MIN_PHONE_DIGITS: usize = 10;
const MAX_PHONE_DIGITS: usize = 15;

/// Day-local wall clock time with minute precision. `24:00` is accepted as
/// the end of the day so a court may close at midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    minutes: u16,
}

impl ClockTime {
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        if minutes > MINUTES_PER_DAY {
            return None;
        }
        Some(Self {
            minutes: minutes as u16,
        })
    }

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if minute >= 60 {
            return None;
        }
        Self::from_minutes(hour.checked_mul(60)?.checked_add(minute)?)
    }

    pub fn minutes(&self) -> u32 {
        u32::from(self.minutes)
    }

    pub fn hour(&self) -> u32 {
        self.minutes() / 60
    }

    pub fn minute(&self) -> u32 {
        self.minutes() % 60
    }

    /// Adds a number of minutes, failing past the end of the day.
    pub fn plus_minutes(&self, minutes: u32) -> Option<Self> {
        Self::from_minutes(self.minutes().checked_add(minutes)?)
    }
}

impl FromStr for ClockTime {
    type Err = ValidationError;

    /// Accepts `H:MM`, `HH:MM` and `HH:MM:SS` (seconds must be zero).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTime(s.to_string());
        let parts: Vec<&str> = s.trim().split(':').collect();

        if parts.len() < 2 || parts.len() > 3 {
            return Err(invalid());
        }

        let parse_part = |part: &str| -> ValidationResult<u32> {
            if part.is_empty() || part.len() > 2 || !part.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse().map_err(|_| invalid())
        };

        let hour = parse_part(parts[0])?;
        let minute = parse_part(parts[1])?;
        if parts.len() == 3 && parse_part(parts[2])? != 0 {
            return Err(invalid());
        }

        Self::from_hm(hour, minute).ok_or_else(invalid)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(time: ClockTime) -> Self {
        time.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Identifiers a booking refers back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourtRef {
    pub facility_id: String,
    pub service_id: String,
    pub court_id: String,
    pub venue_name: String,
    pub court_name: String,
}

/// A bookable court with a daily operating window.
#[derive(Debug, Clone, PartialEq)]
pub struct Court {
    reference: CourtRef,
    open: ClockTime,
    close: ClockTime,
    slot_minutes: u32,
    slot_price: Decimal,
}

impl Court {
    pub fn new(
        reference: CourtRef,
        open: ClockTime,
        close: ClockTime,
        slot_minutes: u32,
        slot_price: Decimal,
    ) -> ValidationResult<Self> {
        if open >= close {
            return Err(ValidationError::InvalidCourt(format!(
                "court {} opens at {} but closes at {}",
                reference.court_id, open, close
            )));
        }

        let window = close.minutes() - open.minutes();
        if slot_minutes == 0 || slot_minutes > window {
            return Err(ValidationError::InvalidCourt(format!(
                "court {} has slot duration {} for a {} minute window",
                reference.court_id, slot_minutes, window
            )));
        }

        if slot_price.is_sign_negative() {
            return Err(ValidationError::InvalidCourt(format!(
                "court {} has negative slot price {}",
                reference.court_id, slot_price
            )));
        }

        Ok(Self {
            reference,
            open,
            close,
            slot_minutes,
            slot_price,
        })
    }

    pub fn reference(&self) -> &CourtRef {
        &self.reference
    }

    pub fn id(&self) -> &str {
        &self.reference.court_id
    }

    pub fn open(&self) -> ClockTime {
        self.open
    }

    pub fn close(&self) -> ClockTime {
        self.close
    }

    pub fn slot_minutes(&self) -> u32 {
        self.slot_minutes
    }

    pub fn slot_price(&self) -> Decimal {
        self.slot_price
    }

    /// Returns the slot starting at `start` if the daily template contains one.
    pub fn slot_at(&self, start: ClockTime) -> Option<TimeSlot> {
        let offset = start.minutes().checked_sub(self.open.minutes())?;
        if offset % self.slot_minutes != 0 {
            return None;
        }

        let end = start.plus_minutes(self.slot_minutes)?;
        if end > self.close {
            return None;
        }

        Some(TimeSlot { start, end })
    }
}

/// A derived `[start, end)` interval. Ordered by start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl TimeSlot {
    pub fn new(start: ClockTime, end: ClockTime) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

/// The slots a user picked on one court for one day.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingSelection {
    court: Court,
    date: NaiveDate,
    slots: BTreeSet<TimeSlot>,
}

impl BookingSelection {
    pub fn new(court: Court, date: NaiveDate) -> Self {
        Self {
            court,
            date,
            slots: BTreeSet::new(),
        }
    }

    pub fn court(&self) -> &Court {
        &self.court
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Selected slots in start-time order.
    pub fn slots(&self) -> impl Iterator<Item = &TimeSlot> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_selected(&self, start: ClockTime) -> bool {
        self.slots.iter().any(|slot| slot.start == start)
    }

    /// Selects the slot starting at `start`. Selecting twice is a no-op.
    pub fn select(&mut self, start: ClockTime) -> ValidationResult<()> {
        let slot = self.offered_slot(start)?;
        self.slots.insert(slot);
        Ok(())
    }

    /// Returns whether the slot was selected before.
    pub fn deselect(&mut self, start: ClockTime) -> bool {
        match self.court.slot_at(start) {
            Some(slot) => self.slots.remove(&slot),
            None => false,
        }
    }

    /// Flips the slot and returns whether it is selected afterwards.
    pub fn toggle(&mut self, start: ClockTime) -> ValidationResult<bool> {
        let slot = self.offered_slot(start)?;
        if self.slots.remove(&slot) {
            Ok(false)
        } else {
            self.slots.insert(slot);
            Ok(true)
        }
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Per-slot price times the number of selected slots.
    pub fn total(&self) -> ValidationResult<Decimal> {
        self.court
            .slot_price()
            .checked_mul(Decimal::from(self.slots.len()))
            .ok_or_else(|| {
                ValidationError::InvalidAmount(format!(
                    "{} x {} overflows",
                    self.court.slot_price(),
                    self.slots.len()
                ))
            })
    }

    fn offered_slot(&self, start: ClockTime) -> ValidationResult<TimeSlot> {
        self.court
            .slot_at(start)
            .ok_or_else(|| ValidationError::SlotNotOffered {
                court_id: self.court.id().to_string(),
                slot: start.to_string(),
            })
    }
}

/// Buyer details passed to the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuyerContact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl BuyerContact {
    pub fn new(name: &str, email: &str, phone: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
        }
    }

    /// The phone number must be present and plausibly long.
    pub fn validate(&self) -> ValidationResult<()> {
        let phone = self.phone.trim();
        if phone.is_empty() {
            return Err(ValidationError::MissingPhone);
        }

        let allowed = |c: char| c.is_ascii_digit() || matches!(c, '+' | '-' | ' ' | '(' | ')');
        let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();

        if !phone.chars().all(allowed) || !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits) {
            return Err(ValidationError::MalformedPhone(phone.to_string()));
        }

        Ok(())
    }
}

/// One checkout attempt as seen by the gateway and the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderIntent {
    order_id: String,
    amount_minor: u64,
    buyer: BuyerContact,
}

impl OrderIntent {
    /// Mints a fresh order id. Intents are never reused across attempts.
    pub fn new(amount_minor: u64, buyer: BuyerContact) -> Self {
        Self {
            order_id: format!("order_{}", Uuid::new_v4().simple()),
            amount_minor,
            buyer,
        }
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn amount_minor(&self) -> u64 {
        self.amount_minor
    }

    pub fn buyer(&self) -> &BuyerContact {
        &self.buyer
    }
}

/// What the buyer is paying for, used for checkout descriptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub venue_name: String,
    pub court_name: String,
    pub date: NaiveDate,
    pub slot_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    Succeeded { payment_id: String },
    Failed { reason: String },
    Cancelled,
}

/// A captured payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub order_id: String,
    pub payment_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Backend records without a status are pending.
    pub fn parse_or_pending(value: Option<&str>) -> ValidationResult<Self> {
        match value {
            Some(status) if !status.trim().is_empty() => status.parse(),
            _ => Ok(BookingStatus::Pending),
        }
    }
}

impl FromStr for BookingStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" | "canceled" => Ok(BookingStatus::Cancelled),
            _ => Err(ValidationError::UnknownStatus(s.to_string())),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request to create the booking for one slot.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingPayload {
    pub facility_id: String,
    pub service_id: String,
    pub court_id: String,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub price: Decimal,
}

/// A booking persisted by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: String,
    pub facility_id: String,
    pub service_id: String,
    pub court_id: String,
    pub venue_name: Option<String>,
    pub court_name: Option<String>,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    pub price: Decimal,
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub status: BookingStatus,
}

impl Booking {
    pub fn from_payload(
        id: &str,
        payload: &BookingPayload,
        receipt: &PaymentReceipt,
        status: BookingStatus,
    ) -> Self {
        Self {
            id: id.to_string(),
            facility_id: payload.facility_id.clone(),
            service_id: payload.service_id.clone(),
            court_id: payload.court_id.clone(),
            venue_name: None,
            court_name: None,
            date: payload.date,
            slot: payload.slot,
            price: payload.price,
            order_id: Some(receipt.order_id.clone()),
            payment_id: Some(receipt.payment_id.clone()),
            status,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == BookingStatus::Cancelled
    }

    /// Local date and time the slot begins.
    pub fn starts_at(&self) -> NaiveDateTime {
        let offset = Duration::minutes(i64::from(self.slot.start.minutes()));
        self.date.and_time(NaiveTime::default()) + offset
    }

    pub fn is_upcoming(&self, now: NaiveDateTime) -> bool {
        self.starts_at() > now
    }

    /// Only confirmed bookings that have not started may be cancelled.
    pub fn ensure_cancellable(&self, now: NaiveDateTime) -> ValidationResult<()> {
        match self.status {
            BookingStatus::Cancelled => Err(ValidationError::AlreadyCancelled(self.id.clone())),
            BookingStatus::Pending => Err(ValidationError::NotCancellable {
                booking_id: self.id.clone(),
                status: self.status.to_string(),
            }),
            BookingStatus::Confirmed if !self.is_upcoming(now) => {
                Err(ValidationError::AlreadyStarted(self.id.clone()))
            }
            BookingStatus::Confirmed => Ok(()),
        }
    }
}

/// A buyer's bookings split at a moment in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingHistory {
    /// Soonest first
    pub upcoming: Vec<Booking>,
    /// Most recent first
    pub past: Vec<Booking>,
}

impl BookingHistory {
    /// A booking starting exactly at `now` is past.
    pub fn partition(bookings: Vec<Booking>, now: NaiveDateTime) -> Self {
        let (mut upcoming, mut past): (Vec<_>, Vec<_>) =
            bookings.into_iter().partition(|booking| booking.is_upcoming(now));

        upcoming.sort_by_key(Booking::starts_at);
        past.sort_by_key(|booking| std::cmp::Reverse(booking.starts_at()));

        Self { upcoming, past }
    }
}
