//! The identity boundary.
//!
//! Registration only needs to know who is signed in, so the rest of the
//! crate talks to an [`IdentityProvider`]. [`LocalIdentity`] implements it
//! on top of the local database: accounts live in the `accounts` table and
//! the current session is a JSON record under [`SESSION_KEY`].

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::storage::{Document, SharedStorage};

/// Document key holding the current session.
pub const SESSION_KEY: &str = "auth_session";

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 6;

/// Outcome of a sign-in style call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResponse {
    /// The operation succeeded and a session is active.
    Success,
    /// The operation failed; the message is meant for the user.
    Error(String),
}

impl AuthResponse {
    /// Whether this is [`AuthResponse::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Source of the signed-in identity.
#[async_trait]
pub trait IdentityProvider: std::fmt::Debug + Send + Sync {
    /// Whether a user is currently signed in.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read.
    async fn is_signed_in(&self) -> Result<bool>;

    /// Email of the signed-in user, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read.
    async fn current_email(&self) -> Result<Option<String>>;

    /// End the current session. Signing out while signed out is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be removed.
    async fn sign_out(&self) -> Result<()>;

    /// Sign in with an email and password.
    async fn sign_in_with_email(&self, email: &str, password: &str) -> AuthResponse;

    /// Create an account and sign into it.
    async fn create_account_with_email(&self, email: &str, password: &str) -> AuthResponse;

    /// Sign in with a token issued by a federated identity provider.
    async fn sign_in_with_token(&self, token: &str) -> AuthResponse;
}

/// Checks federated identity tokens.
#[async_trait]
pub trait TokenVerifier: std::fmt::Debug + Send + Sync {
    /// Verify `token` and return the email it was issued for.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is invalid or cannot be checked.
    async fn verify(&self, token: &str) -> Result<String>;
}

/// How an account or session was authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    /// Email and password.
    Password,
    /// A verified federated token.
    Federated,
}

impl Provider {
    fn as_str(self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::Federated => "federated",
        }
    }

    fn from_column(value: &str) -> Self {
        if value == "federated" {
            Self::Federated
        } else {
            Self::Password
        }
    }
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Account id.
    pub uid: String,
    /// Account email.
    pub email: String,
    /// How this session was established.
    pub provider: Provider,
    /// When this session was established.
    pub signed_in_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    email: String,
    password_hash: Option<String>,
    provider: Provider,
}

impl Account {
    fn new(email: String, password_hash: Option<String>, provider: Provider) -> Self {
        Self {
            uid: uuid::Uuid::new_v4().to_string(),
            email,
            password_hash,
            provider,
        }
    }

    fn session(&self, provider: Provider) -> Session {
        Session {
            uid: self.uid.clone(),
            email: self.email.clone(),
            provider,
            signed_in_at: Utc::now(),
        }
    }
}

/// Validated email/password input.
struct Credentials {
    email: String,
    password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    fn parse(email: &str, password: &str) -> std::result::Result<Self, String> {
        let email = normalize_email(email);
        if email.is_empty() || password.trim().is_empty() {
            return Err("Please fill in all fields".to_string());
        }
        if !is_plausible_email(&email) {
            return Err("Enter a valid email address".to_string());
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            ));
        }
        Ok(Self {
            email,
            password: password.to_string(),
        })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::identity(format!("failed to hash password: {e}")))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| Error::identity(format!("failed to parse password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn find_account(conn: &Connection, email: &str) -> Result<Option<Account>> {
    let account = conn
        .query_row(
            "SELECT uid, email, password_hash, provider FROM accounts WHERE email = ?1",
            [email],
            |row| {
                let provider: String = row.get(3)?;
                Ok(Account {
                    uid: row.get(0)?,
                    email: row.get(1)?,
                    password_hash: row.get(2)?,
                    provider: Provider::from_column(&provider),
                })
            },
        )
        .optional()?;
    Ok(account)
}

fn insert_account(conn: &Connection, account: &Account) -> Result<()> {
    conn.execute(
        r"
        INSERT INTO accounts (uid, email, password_hash, provider, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ",
        params![
            account.uid,
            account.email,
            account.password_hash,
            account.provider.as_str(),
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn write_session(document: &Document<'_>, session: &Session) -> Result<()> {
    document.set(SESSION_KEY, &serde_json::to_string(session)?)
}

/// Result of a sign-in attempt: the outer error is a storage failure, the
/// inner one a rejection meant for the user.
type Attempt = Result<std::result::Result<(), String>>;

fn respond(attempt: Attempt) -> AuthResponse {
    match attempt {
        Ok(Ok(())) => AuthResponse::Success,
        Ok(Err(message)) => AuthResponse::Error(message),
        Err(e) => {
            warn!("Identity operation failed: {}", e);
            AuthResponse::Error(e.to_string())
        }
    }
}

/// An [`IdentityProvider`] backed by the local database.
#[derive(Debug, Clone)]
pub struct LocalIdentity {
    storage: SharedStorage,
    verifier: Option<Arc<dyn TokenVerifier>>,
}

impl LocalIdentity {
    /// Create a provider without federated sign-in.
    #[must_use]
    pub fn new(storage: SharedStorage) -> Self {
        Self {
            storage,
            verifier: None,
        }
    }

    /// Enable federated sign-in through `verifier`.
    #[must_use]
    pub fn with_verifier(mut self, verifier: Arc<dyn TokenVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// The current session, if any.
    ///
    /// A session record that no longer decodes counts as signed out.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be read.
    pub async fn current_session(&self) -> Result<Option<Session>> {
        let raw = self.storage.run(|storage| storage.get(SESSION_KEY)).await?;
        Ok(raw.and_then(|json| match serde_json::from_str(&json) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Ignoring undecodable session: {}", e);
                None
            }
        }))
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn is_signed_in(&self) -> Result<bool> {
        Ok(self.current_session().await?.is_some())
    }

    async fn current_email(&self) -> Result<Option<String>> {
        Ok(self.current_session().await?.map(|session| session.email))
    }

    async fn sign_out(&self) -> Result<()> {
        let removed = self
            .storage
            .run(|storage| storage.remove(SESSION_KEY))
            .await?;
        if removed {
            info!("Signed out");
        }
        Ok(())
    }

    async fn sign_in_with_email(&self, email: &str, password: &str) -> AuthResponse {
        let credentials = match Credentials::parse(email, password) {
            Ok(credentials) => credentials,
            Err(message) => return AuthResponse::Error(message),
        };

        let attempt = self
            .storage
            .run(move |storage| {
                let rejected = || -> Attempt { Ok(Err("Invalid email or password".to_string())) };
                let Some(account) = find_account(storage.document().connection(), &credentials.email)?
                else {
                    return rejected();
                };
                let Some(hash) = account.password_hash.as_deref() else {
                    return rejected();
                };
                if !verify_password(&credentials.password, hash)? {
                    return rejected();
                }
                write_session(&storage.document(), &account.session(Provider::Password))?;
                debug!("Signed in {}", account.email);
                Ok(Ok(()))
            })
            .await;

        respond(attempt)
    }

    async fn create_account_with_email(&self, email: &str, password: &str) -> AuthResponse {
        let credentials = match Credentials::parse(email, password) {
            Ok(credentials) => credentials,
            Err(message) => return AuthResponse::Error(message),
        };

        let attempt = self
            .storage
            .run(move |storage| {
                let hash = hash_password(&credentials.password)?;
                storage.transaction(|document| {
                    if find_account(document.connection(), &credentials.email)?.is_some() {
                        return Ok(Err(format!(
                            "An account already exists for {}",
                            credentials.email
                        )));
                    }
                    let account =
                        Account::new(credentials.email.clone(), Some(hash), Provider::Password);
                    insert_account(document.connection(), &account)?;
                    write_session(document, &account.session(Provider::Password))?;
                    info!("Created account {}", account.email);
                    Ok(Ok(()))
                })
            })
            .await;

        respond(attempt)
    }

    async fn sign_in_with_token(&self, token: &str) -> AuthResponse {
        let Some(verifier) = &self.verifier else {
            return AuthResponse::Error("federated sign-in is not configured".to_string());
        };
        if token.trim().is_empty() {
            return AuthResponse::Error("Invalid credential".to_string());
        }

        let email = match verifier.verify(token).await {
            Ok(email) => normalize_email(&email),
            Err(e) => return AuthResponse::Error(e.to_string()),
        };
        if !is_plausible_email(&email) {
            return AuthResponse::Error("Invalid credential".to_string());
        }

        let attempt = self
            .storage
            .run(move |storage| {
                storage.transaction(|document| {
                    let account = if let Some(account) = find_account(document.connection(), &email)? {
                        account
                    } else {
                        let account = Account::new(email, None, Provider::Federated);
                        insert_account(document.connection(), &account)?;
                        info!("Created federated account {}", account.email);
                        account
                    };
                    write_session(document, &account.session(Provider::Federated))?;
                    Ok(Ok(()))
                })
            })
            .await;

        respond(attempt)
    }
}
