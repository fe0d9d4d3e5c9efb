//! Shared data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted assignment record.
///
/// The `address` field is the fuzzy-match key for calendar reconciliation.
/// Records are never deleted; `hidden` marks them soft-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: Uuid,
    pub agent: String,
    pub address: String,
    #[serde(rename = "submittedOn", with = "timestamp")]
    pub submitted_on: DateTime<Utc>,
    pub scheduled: bool,
    pub hidden: bool,
}

/// Create payload for a single assignment.
///
/// The id is always assigned by the store; an id supplied by the client
/// is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAssignment {
    pub agent: String,
    pub address: String,
    #[serde(rename = "submittedOn", with = "timestamp")]
    pub submitted_on: DateTime<Utc>,
    pub scheduled: bool,
    pub hidden: bool,
}

/// Create request body: a single assignment object, or a one-element
/// array wrapping one. The object shape is tried first.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CreateAssignment {
    One(NewAssignment),
    Many(Vec<NewAssignment>),
}

impl CreateAssignment {
    /// Unwrap the payload into the assignment to create.
    ///
    /// An empty array carries nothing to create and is rejected.
    pub fn into_new(self) -> Option<NewAssignment> {
        match self {
            CreateAssignment::One(new) => Some(new),
            CreateAssignment::Many(mut batch) => {
                if batch.is_empty() {
                    None
                } else {
                    Some(batch.remove(0))
                }
            }
        }
    }
}

/// An event received from the external calendar system. Transient input,
/// never persisted.
///
/// Known status values are "confirmed", "tentative", and "cancelled", but
/// only "confirmed" is significant; anything else means "not scheduled".
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarEvent {
    pub status: String,
    pub address: String,
}

/// Status value that schedules the matched assignment.
pub const STATUS_CONFIRMED: &str = "confirmed";

/// Timestamp (de)serialization for the `submittedOn` field.
///
/// Inbound values are tried against three formats in order: offset with
/// milliseconds, offset without milliseconds, then milliseconds with a
/// literal trailing `Z` read as UTC. Anything else is a decode error.
/// Outbound values always use the last form.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.3f%:z", "%Y-%m-%dT%H:%M:%S%:z"];
    const UTC_MILLIS: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

    /// Run the fallback chain over a raw timestamp string.
    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        for format in OFFSET_FORMATS {
            if let Ok(parsed) = DateTime::parse_from_str(raw, format) {
                return Some(parsed.with_timezone(&Utc));
            }
        }
        NaiveDateTime::parse_from_str(raw, UTC_MILLIS)
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(UTC_MILLIS).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| {
            serde::de::Error::custom(format!("unrecognized timestamp format: {}", raw))
        })
    }
}
