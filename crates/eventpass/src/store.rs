//! The registration and notification store.
//!
//! Both collections live as JSON arrays in the preferences document and are
//! rewritten in full on every change. A registration runs as one immediate
//! transaction covering both lists, so concurrent registrations (other
//! tasks, or other processes sharing the database file) cannot interleave
//! their read-modify-write cycles.
//!
//! Stored values that no longer decode are treated as empty. Queries simply
//! log and return an empty list; a registration first moves the undecodable
//! value into the quarantine table and then replaces it.

use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::catalog::FeaturedEvent;
use crate::error::Result;
use crate::feed::NotificationFeed;
use crate::identity::IdentityProvider;
use crate::registration::{
    Notification, Participant, RegisteredEvent, RegistrationOutcome,
};
use crate::storage::{Document, QuarantinedValue, SharedStorage, Storage};

/// Document key of the registration list.
pub const REGISTERED_EVENTS_KEY: &str = "registered_events";

/// Document key of the notification list.
pub const NOTIFICATIONS_KEY: &str = "notifications";

/// Document key of the onboarding flag.
pub const ONBOARDING_KEY: &str = "has_completed_onboarding";

/// A stored list as found in the document.
enum Stored<T> {
    Absent,
    Valid(Vec<T>),
    Corrupt { raw: String, reason: String },
}

fn read_list<T: DeserializeOwned>(document: &Document<'_>, key: &str) -> Result<Stored<T>> {
    let Some(raw) = document.get(key)? else {
        return Ok(Stored::Absent);
    };
    Ok(match serde_json::from_str(&raw) {
        Ok(items) => Stored::Valid(items),
        Err(e) => Stored::Corrupt {
            raw,
            reason: e.to_string(),
        },
    })
}

/// Read a list for display. Undecodable values read as empty.
fn read_lenient<T: DeserializeOwned>(document: &Document<'_>, key: &str) -> Result<Vec<T>> {
    Ok(match read_list(document, key)? {
        Stored::Valid(items) => items,
        Stored::Absent => Vec::new(),
        Stored::Corrupt { reason, .. } => {
            warn!("Stored '{}' is undecodable, reading as empty: {}", key, reason);
            Vec::new()
        }
    })
}

/// Read a list that is about to be rewritten. Undecodable values are
/// quarantined first.
fn read_for_update<T: DeserializeOwned>(document: &Document<'_>, key: &str) -> Result<Vec<T>> {
    Ok(match read_list(document, key)? {
        Stored::Valid(items) => items,
        Stored::Absent => Vec::new(),
        Stored::Corrupt { raw, reason } => {
            document.quarantine(key, &raw, &reason)?;
            Vec::new()
        }
    })
}

fn write_list<T: Serialize>(document: &Document<'_>, key: &str, items: &[T]) -> Result<()> {
    document.set(key, &serde_json::to_string(items)?)
}

/// Counts reported by [`RegistrationStore::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationStats {
    /// Stored registrations.
    pub registrations: usize,
    /// Stored notifications.
    pub notifications: usize,
    /// Keys present in the preferences document.
    pub stored_keys: i64,
    /// Values moved to quarantine over the database's lifetime.
    pub quarantined_values: i64,
    /// Database file size in bytes (0 for in-memory databases).
    pub db_size_bytes: u64,
}

/// Records registrations and the notifications they raise.
#[derive(Debug, Clone)]
pub struct RegistrationStore {
    storage: SharedStorage,
    identity: Option<Arc<dyn IdentityProvider>>,
    feed: Arc<watch::Sender<Vec<Notification>>>,
}

impl RegistrationStore {
    /// Open a store over `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the current notifications cannot be read.
    pub async fn open(storage: SharedStorage) -> Result<Self> {
        let notifications = storage
            .run(|s| read_lenient::<Notification>(&s.document(), NOTIFICATIONS_KEY))
            .await?;
        let (feed, _) = watch::channel(notifications);

        Ok(Self {
            storage,
            identity: None,
            feed: Arc::new(feed),
        })
    }

    /// Open a store over a fresh in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub async fn open_in_memory() -> Result<Self> {
        Self::open(SharedStorage::new(Storage::open_in_memory()?)).await
    }

    /// Look up participant emails through `identity`.
    #[must_use]
    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// The storage handle this store writes through.
    #[must_use]
    pub fn storage(&self) -> &SharedStorage {
        &self.storage
    }

    /// Register the signed-in participant for `event`.
    ///
    /// Registering for an event whose id is already stored leaves the
    /// registration list untouched. A notification is appended either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read, written or committed.
    pub async fn register_for_event(
        &self,
        event: &FeaturedEvent,
        phone_number: &str,
    ) -> Result<RegistrationOutcome> {
        info!("Registering for '{}'", event.name);
        let email = self.participant_email().await;
        let event = event.clone();
        let phone_number = phone_number.to_string();

        let (outcome, notifications) = self
            .storage
            .run(move |storage| {
                storage.transaction(|document| {
                    let registered_at = Utc::now();
                    let participant = Participant {
                        email: &email,
                        phone_number: &phone_number,
                    };
                    let candidate = RegisteredEvent::new(&event, participant, registered_at);

                    let mut events: Vec<RegisteredEvent> =
                        read_for_update(document, REGISTERED_EVENTS_KEY)?;
                    let existing = events
                        .iter()
                        .find(|e| e.event_id == candidate.event_id)
                        .cloned();
                    let (record, newly_registered) = if let Some(existing) = existing {
                        debug!("'{}' already registered, keeping existing record", event.name);
                        (existing, false)
                    } else {
                        events.push(candidate.clone());
                        write_list(document, REGISTERED_EVENTS_KEY, &events)?;
                        (candidate, true)
                    };

                    let mut notifications: Vec<Notification> =
                        read_for_update(document, NOTIFICATIONS_KEY)?;
                    // Never let a clock step backwards reorder the feed.
                    let timestamp = notifications
                        .last()
                        .map_or(registered_at, |last| last.timestamp.max(registered_at));
                    let notification =
                        Notification::registered(&event, timestamp, notifications.len());
                    notifications.push(notification.clone());
                    write_list(document, NOTIFICATIONS_KEY, &notifications)?;

                    Ok((
                        RegistrationOutcome {
                            event: record,
                            notification,
                            newly_registered,
                        },
                        notifications,
                    ))
                })
            })
            .await?;

        self.feed.send_replace(notifications);
        info!(
            "Registration for '{}' complete (new: {})",
            outcome.event.event_name, outcome.newly_registered
        );
        Ok(outcome)
    }

    async fn participant_email(&self) -> String {
        let Some(identity) = &self.identity else {
            return String::new();
        };
        match identity.current_email().await {
            Ok(email) => email.unwrap_or_default(),
            Err(e) => {
                warn!("Could not look up participant email, continuing without: {}", e);
                String::new()
            }
        }
    }

    /// All registrations in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read. Undecodable stored
    /// data is not an error and reads as an empty list.
    pub async fn registered_events(&self) -> Result<Vec<RegisteredEvent>> {
        self.storage
            .run(|s| read_lenient(&s.document(), REGISTERED_EVENTS_KEY))
            .await
    }

    /// The registration with `event_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read.
    pub async fn event_by_id(&self, event_id: &str) -> Result<Option<RegisteredEvent>> {
        Ok(self
            .registered_events()
            .await?
            .into_iter()
            .find(|e| e.event_id == event_id))
    }

    /// All notifications, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read.
    pub async fn notifications(&self) -> Result<Vec<Notification>> {
        self.storage
            .run(|s| read_lenient(&s.document(), NOTIFICATIONS_KEY))
            .await
    }

    /// Subscribe to the notification list.
    #[must_use]
    pub fn subscribe(&self) -> NotificationFeed {
        NotificationFeed::new(self.feed.subscribe())
    }

    /// Re-read the notification list and publish it if it changed.
    ///
    /// Picks up registrations committed by other processes sharing the
    /// database file. Returns whether subscribers were notified.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read.
    pub async fn refresh(&self) -> Result<bool> {
        let current = self.notifications().await?;
        Ok(self.feed.send_if_modified(|published| {
            if *published == current {
                return false;
            }
            *published = current;
            true
        }))
    }

    /// Values quarantined from the registration and notification lists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read.
    pub async fn quarantined(&self) -> Result<Vec<QuarantinedValue>> {
        self.storage
            .run(|s| {
                let mut values = s.quarantined(REGISTERED_EVENTS_KEY)?;
                values.extend(s.quarantined(NOTIFICATIONS_KEY)?);
                values.sort_by_key(|v| v.id);
                Ok(values)
            })
            .await
    }

    /// Mark onboarding as completed.
    ///
    /// # Errors
    ///
    /// Returns an error if the flag cannot be written.
    pub async fn set_onboarding_completed(&self) -> Result<()> {
        self.storage.run(|s| s.set(ONBOARDING_KEY, "true")).await
    }

    /// Whether onboarding has been completed. Defaults to `false`.
    ///
    /// # Errors
    ///
    /// Returns an error if the flag cannot be read.
    pub async fn has_completed_onboarding(&self) -> Result<bool> {
        let value = self.storage.run(|s| s.get(ONBOARDING_KEY)).await?;
        Ok(value.as_deref() == Some("true"))
    }

    /// Counts of stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read.
    pub async fn stats(&self) -> Result<RegistrationStats> {
        self.storage
            .run(|s| {
                let document = s.document();
                let registrations =
                    read_lenient::<RegisteredEvent>(&document, REGISTERED_EVENTS_KEY)?.len();
                let notifications =
                    read_lenient::<Notification>(&document, NOTIFICATIONS_KEY)?.len();
                let storage_stats = s.stats()?;
                Ok(RegistrationStats {
                    registrations,
                    notifications,
                    stored_keys: storage_stats.total_keys,
                    quarantined_values: storage_stats.quarantined_values,
                    db_size_bytes: storage_stats.db_size_bytes,
                })
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::featured;
    use crate::error::Error;
    use crate::registration::event_id;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use tokio_stream::StreamExt;

    use crate::identity::AuthResponse;

    async fn store() -> RegistrationStore {
        RegistrationStore::open_in_memory().await.unwrap()
    }

    #[derive(Debug)]
    struct StaticIdentity(std::result::Result<Option<String>, &'static str>);

    #[async_trait]
    impl IdentityProvider for StaticIdentity {
        async fn is_signed_in(&self) -> Result<bool> {
            Ok(matches!(self.0, Ok(Some(_))))
        }

        async fn current_email(&self) -> Result<Option<String>> {
            self.0.clone().map_err(Error::identity)
        }

        async fn sign_out(&self) -> Result<()> {
            Ok(())
        }

        async fn sign_in_with_email(&self, _: &str, _: &str) -> AuthResponse {
            AuthResponse::Success
        }

        async fn create_account_with_email(&self, _: &str, _: &str) -> AuthResponse {
            AuthResponse::Success
        }

        async fn sign_in_with_token(&self, _: &str) -> AuthResponse {
            AuthResponse::Success
        }
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = store().await;
        assert!(store.registered_events().await.unwrap().is_empty());
        assert!(store.notifications().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_register_then_list() {
        let store = store().await;
        let outcome = store
            .register_for_event(&featured("Event A", "Running"), "0712345678")
            .await
            .unwrap();
        assert!(outcome.newly_registered);

        let events = store.registered_events().await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_name, "Event A");
        assert_eq!(events[0], outcome.event);
    }

    #[tokio::test]
    async fn test_same_name_registers_once() {
        let store = store().await;
        let first = store
            .register_for_event(&featured("Event A", "Running"), "0712345678")
            .await
            .unwrap();

        // Same name, different attributes: still the same event id.
        let mut other = featured("Event A", "Cycling");
        other.date = "2 Feb 2026".to_string();
        let second = store
            .register_for_event(&other, "0799999999")
            .await
            .unwrap();

        assert!(!second.newly_registered);
        assert_eq!(second.event, first.event);

        let events = store.registered_events().await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].category, "Running");
        assert_eq!(events[0].phone_number, "0712345678");
    }

    #[tokio::test]
    async fn test_distinct_names_keep_insertion_order() {
        let store = store().await;
        for name in ["Event A", "Event B", "Event C"] {
            store
                .register_for_event(&featured(name, "Running"), "0712345678")
                .await
                .unwrap();
        }

        let names: Vec<_> = store
            .registered_events()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.event_name)
            .collect();
        assert_eq!(names, vec!["Event A", "Event B", "Event C"]);
    }

    #[tokio::test]
    async fn test_records_match_inputs() {
        let store = store().await;
        let mut event = featured("Trail Run", "Running");
        event.distance = "21 km".to_string();
        event.track_type = "Mountain".to_string();
        store.register_for_event(&event, "0712345678").await.unwrap();

        let record = &store.registered_events().await.unwrap()[0];
        assert_eq!(record.event_id, event_id("Trail Run"));
        assert_eq!(record.event_date, "1 Jan 2026");
        assert_eq!(record.location, "Park");
        assert_eq!(record.distance, "21 km");
        assert_eq!(record.category, "Running");
        assert_eq!(record.track_type, "Mountain");
        assert_eq!(record.phone_number, "0712345678");
        for needle in ["Trail Run", "1 Jan 2026", "Park", "0712345678"] {
            assert!(record.qr_code_data.contains(needle));
        }
    }

    #[tokio::test]
    async fn test_every_registration_adds_one_notification() {
        let store = store().await;
        let event = featured("Event A", "Running");
        store.register_for_event(&event, "0712345678").await.unwrap();
        store.register_for_event(&event, "0712345678").await.unwrap();
        store
            .register_for_event(&featured("Event B", "Running"), "0712345678")
            .await
            .unwrap();

        let notifications = store.notifications().await.unwrap();
        assert_eq!(notifications.len(), 3);
        assert_eq!(notifications[0].title, "You're going to Event A! 🎉");
        assert_eq!(notifications[2].title, "You're going to Event B! 🎉");
        for pair in notifications.windows(2) {
            assert!(pair[1].timestamp >= pair[0].timestamp);
            assert_ne!(pair[1].id, pair[0].id);
        }
    }

    #[tokio::test]
    async fn test_event_by_id() {
        let store = store().await;
        store
            .register_for_event(&featured("Event A", "Running"), "0712345678")
            .await
            .unwrap();

        let found = store.event_by_id(&event_id("Event A")).await.unwrap();
        assert_eq!(found.unwrap().event_name, "Event A");
        assert!(store.event_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_garbage_reads_as_empty() {
        let store = store().await;
        store
            .storage()
            .run(|s| s.set(REGISTERED_EVENTS_KEY, "definitely not json"))
            .await
            .unwrap();

        assert!(store.registered_events().await.unwrap().is_empty());
        // Reading alone does not quarantine.
        assert!(store.quarantined().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_garbage_is_quarantined_on_register() {
        let store = store().await;
        store
            .storage()
            .run(|s| {
                s.set(REGISTERED_EVENTS_KEY, "[{\"broken\":")?;
                s.set(NOTIFICATIONS_KEY, "42")
            })
            .await
            .unwrap();

        store
            .register_for_event(&featured("Event A", "Running"), "0712345678")
            .await
            .unwrap();

        assert_eq!(store.registered_events().await.unwrap().len(), 1);
        assert_eq!(store.notifications().await.unwrap().len(), 1);

        let quarantined = store.quarantined().await.unwrap();
        assert_eq!(quarantined.len(), 2);
        assert_eq!(quarantined[0].key, REGISTERED_EVENTS_KEY);
        assert_eq!(quarantined[0].value, "[{\"broken\":");
        assert_eq!(quarantined[1].key, NOTIFICATIONS_KEY);
    }

    #[tokio::test]
    async fn test_app_format_list_is_kept() {
        let store = store().await;
        store
            .storage()
            .run(|s| {
                s.set(
                    REGISTERED_EVENTS_KEY,
                    r#"[{"eventId":"-1234","eventName":"Old Run","registrationDate":"2025-01-01 10:00:00","eventDate":"1 Feb 2025","location":"Park"}]"#,
                )?;
                s.set(
                    NOTIFICATIONS_KEY,
                    r#"[{"id":"n1","title":"You're going to Old Run! 🎉","message":"m","timestamp":"2025-01-01 10:00:00","type":"EVENT_REGISTRATION"}]"#,
                )
            })
            .await
            .unwrap();

        assert_eq!(store.registered_events().await.unwrap().len(), 1);
        store
            .register_for_event(&featured("New Run", "Running"), "0712345678")
            .await
            .unwrap();

        let names: Vec<_> = store
            .registered_events()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.event_name)
            .collect();
        assert_eq!(names, vec!["Old Run", "New Run"]);
        assert_eq!(store.notifications().await.unwrap().len(), 2);
        assert!(store.quarantined().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notification_time_never_goes_backwards() {
        let store = store().await;
        let future = Utc.with_ymd_and_hms(2999, 1, 1, 0, 0, 0).unwrap();
        let stored = vec![Notification::registered(&featured("Event A", "Running"), future, 0)];
        let json = serde_json::to_string(&stored).unwrap();
        store
            .storage()
            .run(move |s| s.set(NOTIFICATIONS_KEY, &json))
            .await
            .unwrap();

        let outcome = store
            .register_for_event(&featured("Event B", "Running"), "0712345678")
            .await
            .unwrap();
        assert_eq!(outcome.notification.timestamp, future);
        // The registration itself keeps the real clock.
        assert!(outcome.event.registration_date < future);

        let notifications = store.notifications().await.unwrap();
        assert_eq!(notifications.len(), 2);
        assert!(notifications[1].timestamp >= notifications[0].timestamp);
        assert_ne!(notifications[1].id, notifications[0].id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_separate_connections_do_not_lose_writes() {
        let path = std::env::temp_dir().join(format!(
            "eventpass_store_test_{}.db",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let first = RegistrationStore::open(SharedStorage::new(Storage::open(&path).unwrap()))
            .await
            .unwrap();
        let second = RegistrationStore::open(SharedStorage::new(Storage::open(&path).unwrap()))
            .await
            .unwrap();

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let store = if i % 2 == 0 { first.clone() } else { second.clone() };
                tokio::spawn(async move {
                    store
                        .register_for_event(&featured(&format!("Event {i}"), "Running"), "0712345678")
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(first.registered_events().await.unwrap().len(), 20);
        assert_eq!(second.notifications().await.unwrap().len(), 20);

        drop((first, second));
        for suffix in ["", "-wal", "-shm"] {
            let mut file = path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }

    #[tokio::test]
    async fn test_email_comes_from_identity() {
        let store = store()
            .await
            .with_identity(Arc::new(StaticIdentity(Ok(Some(
                "runner@example.com".to_string(),
            )))));
        let outcome = store
            .register_for_event(&featured("Event A", "Running"), "0712345678")
            .await
            .unwrap();

        assert_eq!(outcome.event.user_email, "runner@example.com");
        assert!(outcome
            .event
            .qr_code_data
            .contains("Participant Email: runner@example.com"));
    }

    #[tokio::test]
    async fn test_identity_failure_is_not_fatal() {
        let store = store()
            .await
            .with_identity(Arc::new(StaticIdentity(Err("offline"))));
        let outcome = store
            .register_for_event(&featured("Event A", "Running"), "0712345678")
            .await
            .unwrap();

        assert_eq!(outcome.event.user_email, "");
    }

    #[tokio::test]
    async fn test_feed_emits_per_registration() {
        let store = store().await;
        let mut feed = store.subscribe();
        assert!(feed.next().await.unwrap().is_empty());

        store
            .register_for_event(&featured("Event A", "Running"), "0712345678")
            .await
            .unwrap();
        let update = feed.next().await.unwrap();
        assert_eq!(update.len(), 1);
        assert_eq!(update[0].title, "You're going to Event A! 🎉");

        store
            .register_for_event(&featured("Event B", "Running"), "0712345678")
            .await
            .unwrap();
        assert_eq!(feed.next().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_feed_starts_from_persisted_notifications() {
        let storage = SharedStorage::new(Storage::open_in_memory().unwrap());
        let first = RegistrationStore::open(storage.clone()).await.unwrap();
        first
            .register_for_event(&featured("Event A", "Running"), "0712345678")
            .await
            .unwrap();

        let second = RegistrationStore::open(storage).await.unwrap();
        let mut feed = second.subscribe();
        assert_eq!(feed.next().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_publishes_foreign_writes() {
        let storage = SharedStorage::new(Storage::open_in_memory().unwrap());
        let writer = RegistrationStore::open(storage.clone()).await.unwrap();
        let reader = RegistrationStore::open(storage).await.unwrap();
        let mut feed = reader.subscribe();
        assert!(feed.next().await.unwrap().is_empty());

        assert!(!reader.refresh().await.unwrap());
        writer
            .register_for_event(&featured("Event A", "Running"), "0712345678")
            .await
            .unwrap();
        assert!(reader.refresh().await.unwrap());
        assert_eq!(feed.next().await.unwrap().len(), 1);
        assert!(!reader.refresh().await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_registrations_do_not_lose_writes() {
        let store = store().await;
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .register_for_event(&featured(&format!("Event {i}"), "Running"), "0712345678")
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.registered_events().await.unwrap().len(), 16);
        assert_eq!(store.notifications().await.unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_onboarding_flag() {
        let store = store().await;
        assert!(!store.has_completed_onboarding().await.unwrap());

        store.set_onboarding_completed().await.unwrap();
        assert!(store.has_completed_onboarding().await.unwrap());
    }

    #[tokio::test]
    async fn test_stats() {
        let store = store().await;
        let event = featured("Event A", "Running");
        store.register_for_event(&event, "0712345678").await.unwrap();
        store.register_for_event(&event, "0712345678").await.unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.registrations, 1);
        assert_eq!(stats.notifications, 2);
        assert_eq!(stats.stored_keys, 2);
        assert_eq!(stats.quarantined_values, 0);

        store.set_onboarding_completed().await.unwrap();
        assert_eq!(store.stats().await.unwrap().stored_keys, 3);
    }
}
