//! The bundled event catalog.
//!
//! The catalog is a read-only JSON document (`events_data.json`) listing
//! featured events, regular events, categories and payment methods. It is an
//! input to registration; nothing in this crate writes it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// The whole catalog document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// Highlighted events that can be registered for.
    pub featured_events: Vec<FeaturedEvent>,
    /// The general event listing.
    pub regular_events: Vec<Event>,
    /// Category names used for filtering.
    pub categories: Vec<String>,
    /// Accepted payment methods.
    pub payment_methods: Vec<PaymentMethod>,
}

/// A featured event, the unit of registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedEvent {
    /// Display name. Also the source of the derived event id.
    pub name: String,
    /// Free-text event date.
    pub date: String,
    /// Where the event starts.
    pub start_location: String,
    /// Kind of track (road, trail, ...).
    pub track_type: String,
    /// Expected average speed.
    pub average_speed: String,
    /// Free-text distance.
    pub distance: String,
    /// Card color as `#RRGGBB` or `#AARRGGBB`.
    pub background_color: String,
    /// Category name.
    pub category: String,
    /// Free-text end time.
    pub end_time: String,
    /// Long description; empty when the catalog has none.
    #[serde(default)]
    pub description: String,
    /// Ticket price.
    #[serde(default)]
    pub price: u32,
    /// Whether the event requires payment.
    #[serde(default)]
    pub is_paid: bool,
    /// A sample of attendees.
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    /// Total attendee count.
    #[serde(default)]
    pub total_attendees: u32,
}

/// A regular (non-featured) event listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Display name.
    pub name: String,
    /// Free-text event date.
    pub date: String,
    /// Free-text distance.
    pub distance: String,
    /// Whether the event still accepts participants.
    pub status: EventStatus,
    /// Category name.
    pub category: String,
    /// Free-text end time.
    pub end_time: String,
}

/// Status of a regular event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    /// Upcoming, accepting participants.
    Open,
    /// In the past.
    Closed,
}

/// An attendee shown on a featured event card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    /// Display name.
    pub name: String,
    /// Avatar URL.
    pub photo_url: String,
}

/// A payment method offered at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Display name.
    pub name: String,
    /// Icon identifier.
    pub icon: String,
}

/// An RGBA color decoded from a catalog color string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl FeaturedEvent {
    /// Decode [`FeaturedEvent::background_color`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidColor`] unless the value is `#RRGGBB` or
    /// `#AARRGGBB` hex.
    pub fn background_rgba(&self) -> Result<Rgba> {
        parse_color(&self.background_color)
    }
}

fn parse_color(value: &str) -> Result<Rgba> {
    let invalid = || Error::InvalidColor {
        value: value.to_string(),
    };

    let hex = value.strip_prefix('#').ok_or_else(invalid)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());

    match hex.len() {
        6 => Ok(Rgba {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: 0xFF,
        }),
        8 => Ok(Rgba {
            a: channel(0)?,
            r: channel(2)?,
            g: channel(4)?,
            b: channel(6)?,
        }),
        _ => Err(invalid()),
    }
}

/// Status filter for the regular event listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Every event.
    #[default]
    All,
    /// Only [`EventStatus::Open`].
    Upcoming,
    /// Only [`EventStatus::Closed`].
    Past,
}

impl StatusFilter {
    fn matches(self, status: EventStatus) -> bool {
        match self {
            Self::All => true,
            Self::Upcoming => status == EventStatus::Open,
            Self::Past => status == EventStatus::Closed,
        }
    }
}

/// Criteria for [`Catalog::filter_events`]. All criteria must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Case-insensitive substring of the event name. Empty matches all.
    pub query: String,
    /// Status criterion.
    pub status: StatusFilter,
    /// Exact category, if any.
    pub category: Option<String>,
}

impl Catalog {
    /// Load and decode the catalog at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CatalogLoad`] if the file cannot be read or decoded.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let load_error = |message: String| Error::CatalogLoad {
            path: PathBuf::from(path),
            message,
        };

        let json = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
        let catalog = Self::from_json(&json).map_err(|e| load_error(e.to_string()))?;

        debug!(
            "Loaded catalog from {} ({} featured, {} regular)",
            path.display(),
            catalog.featured_events.len(),
            catalog.regular_events.len()
        );
        Ok(catalog)
    }

    /// Decode a catalog from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the document does not match the schema.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Find a featured event by exact, case-sensitive name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EventNotFound`] if no featured event has that name.
    pub fn featured_by_name(&self, name: &str) -> Result<&FeaturedEvent> {
        self.featured_events
            .iter()
            .find(|event| event.name == name)
            .ok_or_else(|| Error::EventNotFound {
                name: name.to_string(),
            })
    }

    /// Featured events, optionally restricted to one category.
    #[must_use]
    pub fn filter_featured(&self, category: Option<&str>) -> Vec<&FeaturedEvent> {
        self.featured_events
            .iter()
            .filter(|event| category.map_or(true, |c| event.category == c))
            .collect()
    }

    /// Regular events matching every criterion in `filter`.
    #[must_use]
    pub fn filter_events(&self, filter: &EventFilter) -> Vec<&Event> {
        let query = filter.query.to_lowercase();
        self.regular_events
            .iter()
            .filter(|event| event.name.to_lowercase().contains(&query))
            .filter(|event| filter.status.matches(event.status))
            .filter(|event| {
                filter
                    .category
                    .as_deref()
                    .map_or(true, |c| event.category == c)
            })
            .collect()
    }
}
