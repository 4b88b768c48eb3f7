// src/infrastructure/gateway/options.rs
// Checkout options sent to the payment gateway

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::models::{CheckoutSummary, OrderIntent};

/// Merchant-side settings shared by every checkout.
#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub key_id: String,
    pub merchant_name: String,
    pub currency: String,
    pub theme_color: String,
    pub country_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Theme {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutOptions {
    pub key: String,
    /// Minor currency units
    pub amount: u64,
    pub currency: String,
    pub name: String,
    pub description: String,
    pub prefill: Prefill,
    pub notes: BTreeMap<String, String>,
    pub theme: Theme,
}

impl CheckoutOptions {
    pub fn new(
        settings: &CheckoutSettings,
        intent: &OrderIntent,
        summary: &CheckoutSummary,
        platform: &str,
    ) -> Self {
        let description = if summary.slot_count > 1 {
            format!("{} slots at {}", summary.slot_count, summary.venue_name)
        } else {
            format!("{} at {}", summary.court_name, summary.venue_name)
        };

        let mut notes = BTreeMap::new();
        notes.insert("venue_name".to_string(), summary.venue_name.clone());
        notes.insert("court_name".to_string(), summary.court_name.clone());
        notes.insert("booking_date".to_string(), summary.date.format("%Y-%m-%d").to_string());
        notes.insert("total_slots".to_string(), summary.slot_count.to_string());
        notes.insert("order_id".to_string(), intent.order_id().to_string());
        notes.insert("platform".to_string(), platform.to_string());

        let buyer = intent.buyer();

        Self {
            key: settings.key_id.clone(),
            amount: intent.amount_minor(),
            currency: settings.currency.clone(),
            name: settings.merchant_name.clone(),
            description,
            prefill: Prefill {
                name: buyer.name.clone(),
                email: buyer.email.clone(),
                contact: normalize_contact(&buyer.phone, &settings.country_code),
            },
            notes,
            theme: Theme {
                color: settings.theme_color.clone(),
            },
        }
    }
}

/// Strips formatting from a local number and prefixes the country code to
/// ten-digit numbers. Numbers already carrying the code pass through.
pub fn normalize_contact(contact: &str, country_code: &str) -> String {
    let contact = contact.trim();
    if contact.is_empty() || contact.starts_with(country_code) {
        return contact.to_string();
    }

    let digits: String = contact.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 {
        format!("{}{}", country_code, digits)
    } else {
        digits
    }
}
