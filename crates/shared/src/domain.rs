use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(VehicleId);

impl std::fmt::Display for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One row of the vehicle directory as the records service returns it.
///
/// Only `first_name`, `last_name` and `email` are ever changed by a client, and
/// only through an update mutation; everything else is backend-owned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub id: VehicleId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub car_make: String,
    pub car_model: String,
    pub vin: String,
    /// `None` when the service sent null or a value no date format matches.
    #[serde(default, deserialize_with = "deserialize_manufactured_date")]
    pub manufactured_date: Option<NaiveDate>,
    pub age_of_vehicle: i32,
}

impl VehicleRecord {
    /// Manufacture date in the `en-CA` short form (`YYYY-MM-DD`), empty when
    /// unknown.
    pub fn display_date(&self) -> String {
        self.manufactured_date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }

    pub fn owner(&self) -> OwnerDetails {
        OwnerDetails {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
        }
    }
}

/// The mutable owner fields of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerField {
    FirstName,
    LastName,
    Email,
}

impl OwnerField {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "first_name" | "first" => Some(Self::FirstName),
            "last_name" | "last" => Some(Self::LastName),
            "email" => Some(Self::Email),
            _ => None,
        }
    }
}

impl OwnerDetails {
    pub fn set(&mut self, field: OwnerField, value: impl Into<String>) {
        let slot = match field {
            OwnerField::FirstName => &mut self.first_name,
            OwnerField::LastName => &mut self.last_name,
            OwnerField::Email => &mut self.email,
        };
        *slot = value.into();
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDate {
    Text(String),
    Millis(i64),
    Other(de::IgnoredAny),
}

/// One malformed date must not fail the whole page, so anything unreadable
/// decodes to `None`.
fn deserialize_manufactured_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let date = match Option::<RawDate>::deserialize(deserializer)? {
        Some(RawDate::Text(raw)) => parse_wire_date(&raw).ok(),
        Some(RawDate::Millis(millis)) => date_from_millis(millis).ok(),
        Some(RawDate::Other(_)) | None => None,
    };
    Ok(date)
}

/// Accepts the shapes GraphQL date scalars are commonly serialized as: a plain
/// ISO date, an RFC 3339 timestamp, or epoch milliseconds. Timestamps keep
/// their UTC calendar date.
pub fn parse_wire_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.naive_utc().date());
    }
    if let Ok(millis) = raw.parse::<i64>() {
        return date_from_millis(millis);
    }
    Err(format!("unrecognized manufactured_date value '{raw}'"))
}

fn date_from_millis(millis: i64) -> Result<NaiveDate, String> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|timestamp| timestamp.date_naive())
        .ok_or_else(|| format!("manufactured_date out of range: {millis}"))
}
