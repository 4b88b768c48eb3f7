// src/domain/money.rs
// Conversion between decimal amounts and the gateway's integer minor units.
// Both the charged amount and every displayed amount go through here.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::errors::{ValidationError, ValidationResult};

const MINOR_UNITS_PER_MAJOR: u64 = 100;

/// Converts a decimal amount to minor units, rounding half away from zero.
pub fn to_minor_units(amount: Decimal) -> ValidationResult<u64> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ValidationError::InvalidAmount(format!(
            "negative amount {}",
            amount
        )));
    }

    let out_of_range = || ValidationError::InvalidAmount(format!("amount {} out of range", amount));

    let minor = amount
        .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))
        .ok_or_else(out_of_range)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    minor.to_u64().ok_or_else(out_of_range)
}

/// Renders minor units for display, e.g. `₹1500.00` for INR.
pub fn format_minor_units(minor: u64, currency: &str) -> String {
    let major = minor / MINOR_UNITS_PER_MAJOR;
    let fraction = minor % MINOR_UNITS_PER_MAJOR;

    match currency.to_uppercase().as_str() {
        "INR" => format!("₹{}.{:02}", major, fraction),
        code => format!("{} {}.{:02}", code, major, fraction),
    }
}

/// Formats a decimal amount exactly as it would be charged.
pub fn display_amount(amount: Decimal, currency: &str) -> ValidationResult<String> {
    Ok(format_minor_units(to_minor_units(amount)?, currency))
}
