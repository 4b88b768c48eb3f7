// src/application/dto/parser.rs
// Parsers from catalog records into validated domain values

use rust_decimal::Decimal;
use std::str::FromStr;

use super::{CheckoutRequest, CourtRecord};
use crate::domain::errors::{ValidationError, ValidationResult};
use crate::domain::models::{BookingSelection, ClockTime, Court, CourtRef};

/// Parse a `HH:MM` catalog field
pub fn parse_time(value: Option<&str>, field: &str) -> ValidationResult<ClockTime> {
    value
        .ok_or_else(|| ValidationError::InvalidCourt(format!("missing {}", field)))?
        .parse()
}

/// Parse a slot duration in whole minutes. Zero and negatives are rejected.
pub fn parse_duration(value: Option<&str>) -> ValidationResult<u32> {
    let raw = value.ok_or_else(|| ValidationError::InvalidCourt("missing duration".to_string()))?;

    match raw.trim().parse::<i64>() {
        Ok(minutes) if minutes > 0 => u32::try_from(minutes)
            .map_err(|_| ValidationError::InvalidCourt(format!("duration too large: {}", raw))),
        _ => Err(ValidationError::InvalidCourt(format!("invalid duration: {}", raw))),
    }
}

pub fn parse_price(value: Option<&str>) -> ValidationResult<Decimal> {
    let raw = value.ok_or_else(|| ValidationError::InvalidCourt("missing slot price".to_string()))?;

    Decimal::from_str(raw.trim())
        .map_err(|_| ValidationError::InvalidCourt(format!("invalid slot price: {}", raw)))
}

/// Parse a catalog record into a `Court`
pub fn parse_court(record: &CourtRecord) -> ValidationResult<Court> {
    let reference = CourtRef {
        facility_id: record.facility_id.clone(),
        service_id: record.facility_service_id.clone(),
        court_id: record.id.clone(),
        venue_name: record.venue_name.clone(),
        court_name: record.court_name.clone(),
    };

    Court::new(
        reference,
        parse_time(record.start_time.as_deref(), "start_time")?,
        parse_time(record.end_time.as_deref(), "end_time")?,
        parse_duration(record.duration.as_deref())?,
        parse_price(record.slot_price.as_deref())?,
    )
}

/// Build the selection a checkout request describes
pub fn parse_selection(request: &CheckoutRequest) -> ValidationResult<BookingSelection> {
    let court = parse_court(&request.court)?;
    let mut selection = BookingSelection::new(court, request.date);

    for start in &request.slots {
        selection.select(start.parse()?)?;
    }

    Ok(selection)
}
