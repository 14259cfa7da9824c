//! Registration records and the values derived from them.
//!
//! A [`RegisteredEvent`] is a denormalized snapshot of a catalog event taken
//! at registration time, together with the participant's contact details and
//! the QR payload that identifies the registration. A [`Notification`] is the
//! user-facing message appended for every successful registration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::FeaturedEvent;

/// Number of hex characters kept from the BLAKE3 digest for ids.
const ID_HEX_LEN: usize = 16;

/// Format used for human-readable timestamps inside the QR payload.
pub const PAYLOAD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One participant's registration for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredEvent {
    /// Derived from the event name, see [`event_id`].
    pub event_id: String,
    /// Event display name.
    pub event_name: String,
    /// When the registration was made.
    #[serde(deserialize_with = "stored_time::deserialize")]
    pub registration_date: DateTime<Utc>,
    /// Event date as listed in the catalog.
    pub event_date: String,
    /// Start location.
    pub location: String,
    /// Distance as listed in the catalog.
    #[serde(default)]
    pub distance: String,
    /// Category name.
    #[serde(default)]
    pub category: String,
    /// Track type.
    #[serde(default)]
    pub track_type: String,
    /// Description shown with the registration.
    #[serde(default)]
    pub description: String,
    /// Text encoded into the registration's QR code.
    #[serde(default)]
    pub qr_code_data: String,
    /// Participant email; empty when nobody was signed in.
    #[serde(default)]
    pub user_email: String,
    /// Participant phone number.
    #[serde(default)]
    pub phone_number: String,
}

/// Why a notification was raised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    /// A registration succeeded.
    #[default]
    EventRegistration,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventRegistration => write!(f, "event_registration"),
        }
    }
}

/// A user-facing message about a registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Derived from the timestamp and the feed position.
    pub id: String,
    /// Headline.
    pub title: String,
    /// Body text.
    pub message: String,
    /// When the notification was raised.
    #[serde(deserialize_with = "stored_time::deserialize")]
    pub timestamp: DateTime<Utc>,
    /// Reason for the notification.
    #[serde(rename = "type", default)]
    pub kind: NotificationType,
}

/// Timestamps are written as RFC 3339. Lists saved by the mobile app use
/// `yyyy-MM-dd HH:mm:ss` with no offset; those read as UTC.
mod stored_time {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    use super::PAYLOAD_TIME_FORMAT;

    pub(super) fn parse(value: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(value, PAYLOAD_TIME_FORMAT)
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("unrecognized timestamp '{raw}'")))
    }
}

/// Derive the registration id for an event name.
///
/// Deterministic and case-sensitive: two events with the same name share an
/// id and therefore a registration.
#[must_use]
pub fn event_id(name: &str) -> String {
    short_hash(name.as_bytes())
}

fn short_hash(bytes: &[u8]) -> String {
    let mut hex = blake3::hash(bytes).to_hex().to_string();
    hex.truncate(ID_HEX_LEN);
    hex
}

/// Participant contact details attached to a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Participant<'a> {
    /// Email, empty if unknown.
    pub email: &'a str,
    /// Phone number.
    pub phone_number: &'a str,
}

/// Build the multi-line QR payload for a registration.
///
/// One `Label: value` line per field, no trailing newline.
#[must_use]
pub fn qr_payload(
    event: &FeaturedEvent,
    participant: Participant<'_>,
    registered_at: DateTime<Utc>,
) -> String {
    let registration_time = registered_at.format(PAYLOAD_TIME_FORMAT).to_string();
    let id = event_id(&event.name);
    let lines = [
        ("Event", event.name.as_str()),
        ("Date", event.date.as_str()),
        ("Location", event.start_location.as_str()),
        ("Category", event.category.as_str()),
        ("Distance", event.distance.as_str()),
        ("Registration Time", registration_time.as_str()),
        ("Participant Email", participant.email),
        ("Phone Number", participant.phone_number),
        ("ID", id.as_str()),
    ];

    lines
        .iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl RegisteredEvent {
    /// Snapshot `event` as a registration made at `registered_at`.
    #[must_use]
    pub fn new(
        event: &FeaturedEvent,
        participant: Participant<'_>,
        registered_at: DateTime<Utc>,
    ) -> Self {
        let description = if event.description.trim().is_empty() {
            format!(
                "Join us for an unforgettable experience at {}. This event promises to bring \
                 together enthusiasts and professionals for an amazing day of activities and \
                 networking.",
                event.name
            )
        } else {
            event.description.clone()
        };

        Self {
            event_id: event_id(&event.name),
            event_name: event.name.clone(),
            registration_date: registered_at,
            event_date: event.date.clone(),
            location: event.start_location.clone(),
            distance: event.distance.clone(),
            category: event.category.clone(),
            track_type: event.track_type.clone(),
            description,
            qr_code_data: qr_payload(event, participant, registered_at),
            user_email: participant.email.to_string(),
            phone_number: participant.phone_number.to_string(),
        }
    }
}

impl Notification {
    /// The registration notification for `event`.
    ///
    /// `sequence` is the notification's position in the feed; it keeps ids
    /// distinct when two notifications share a timestamp.
    #[must_use]
    pub fn registered(event: &FeaturedEvent, timestamp: DateTime<Utc>, sequence: usize) -> Self {
        let id_source = format!("{}#{sequence}", timestamp.to_rfc3339());
        Self {
            id: short_hash(id_source.as_bytes()),
            title: format!("You're going to {}! 🎉", event.name),
            message: format!(
                "Mark your calendar for {} at {}. Distance: {}. We can't wait to see you there!",
                event.date, event.start_location, event.distance
            ),
            timestamp,
            kind: NotificationType::EventRegistration,
        }
    }
}

/// The result of a registration attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOutcome {
    /// The stored registration for the event. When the event was already
    /// registered this is the earlier record, not a new one.
    pub event: RegisteredEvent,
    /// The notification appended by this attempt.
    pub notification: Notification,
    /// `false` when the event id was already present.
    pub newly_registered: bool,
}
