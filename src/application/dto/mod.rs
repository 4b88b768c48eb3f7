// src/application/dto/mod.rs
// Data transfer objects shared by the use cases and the binary

pub mod parser;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::models::BuyerContact;

/// A court as the venue catalog publishes it. Every field is text and any of
/// them may be missing or malformed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CourtRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub facility_id: String,
    #[serde(default, alias = "service_id", deserialize_with = "string_or_number")]
    pub facility_service_id: String,
    #[serde(default)]
    pub venue_name: String,
    #[serde(default)]
    pub court_name: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub end_time: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub slot_price: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub duration: Option<String>,
}

/// Input of one checkout run.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub court: CourtRecord,
    pub date: NaiveDate,
    /// Slot start times, `HH:MM`
    pub slots: Vec<String>,
    pub buyer: BuyerContact,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

/// Accepts `"7"` and `7` alike; the backend is not consistent about ids.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(String::from))
}
