// Data shapes exchanged with the card backend. Field names mirror the JSON
// the backend produces, so serde derives do all the mapping.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A catalogued card as stored by the backend.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Card {
    id: i64,
    pub player_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sport: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(deserialize_with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Card {
    /// Assemble a card the way the backend would after storing `fields`.
    pub fn from_create(id: i64, fields: CardCreate, now: DateTime<Utc>) -> Self {
        Card {
            id,
            player_name: fields.player_name,
            year: fields.year,
            brand: fields.brand,
            card_number: fields.card_number,
            set_name: fields.set_name,
            sport: fields.sport,
            condition: fields.condition,
            notes: fields.notes,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Server-assigned identifier. There is no setter.
    pub fn id(&self) -> i64 {
        self.id
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} ", self.id)?;
        if let Some(year) = self.year {
            write!(f, "{year} ")?;
        }
        if let Some(brand) = &self.brand {
            write!(f, "{brand} ")?;
        }
        write!(f, "{}", self.player_name)?;
        if let Some(number) = &self.card_number {
            write!(f, " #{number}")?;
        }
        if let Some(set) = &self.set_name {
            write!(f, " [{set}]")?;
        }
        if let Some(condition) = &self.condition {
            write!(f, " ({condition})")?;
        }
        Ok(())
    }
}

/// Payload for creating a card. Absent optional fields are left out of the
/// request body.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CardCreate {
    pub player_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sport: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CardCreate {
    pub fn new(player_name: impl Into<String>) -> Self {
        CardCreate {
            player_name: player_name.into(),
            ..Default::default()
        }
    }
}

/// Valuation computed by the backend on request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CardPrice {
    pub card_id: i64,
    pub average_price: f64,
    #[serde(default)]
    pub low_price: Option<f64>,
    #[serde(default)]
    pub high_price: Option<f64>,
    // Some backends omit this until a real price lookup has run.
    #[serde(default, deserialize_with = "optional_timestamp")]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sources: Vec<String>,
}

impl fmt::Display for CardPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Average ${:.2}", self.average_price)?;
        match (self.low_price, self.high_price) {
            (Some(low), Some(high)) => write!(f, " (range ${low:.2} - ${high:.2})")?,
            (Some(low), None) => write!(f, " (low ${low:.2})")?,
            (None, Some(high)) => write!(f, " (high ${high:.2})")?,
            (None, None) => {}
        }
        if !self.sources.is_empty() {
            write!(f, " from {}", self.sources.join(", "))?;
        }
        if let Some(at) = self.last_updated {
            write!(f, ", updated {}", at.format("%Y-%m-%d %H:%M UTC"))?;
        }
        Ok(())
    }
}

/// Response of the scan upload. Only `message` is guaranteed; whatever else
/// the backend sends is kept untouched in `extra`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub message: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ScanResult {
    /// The stored card, when the backend embeds one and it decodes cleanly.
    pub fn card(&self) -> Option<Card> {
        self.extra
            .get("card")
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

/// Accepts RFC 3339 as well as naive ISO-8601 timestamps, which are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
}

fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'"))),
        None => Ok(None),
    }
}
