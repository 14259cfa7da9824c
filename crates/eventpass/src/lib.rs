//! `eventpass` - Local event registration with QR passes
//!
//! This library loads an event catalog, records registrations together with
//! a QR payload per registration, and keeps a notification list that can be
//! observed as a stream. Everything is persisted in a single `SQLite` file.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod identity;
pub mod logging;
pub mod qr;
pub mod registration;
pub mod storage;
pub mod store;

pub use catalog::{Catalog, EventFilter, FeaturedEvent, StatusFilter};
pub use config::Config;
pub use error::{Error, Result};
pub use feed::NotificationFeed;
pub use identity::{AuthResponse, IdentityProvider, LocalIdentity, TokenVerifier};
pub use logging::init_logging;
pub use registration::{Notification, RegisteredEvent, RegistrationOutcome};
pub use storage::{SharedStorage, Storage, StorageStats};
pub use store::{RegistrationStats, RegistrationStore};
