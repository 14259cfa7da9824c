//! `evpass` - CLI for eventpass
//!
//! This binary provides the command-line interface for browsing the event
//! catalog, registering, and inspecting registrations and notifications.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio_stream::StreamExt;

use eventpass::cli::{
    AuthCommand, Cli, Command, ConfigCommand, EventsCommand, NotificationsCommand,
    OnboardingCommand, RegisterCommand, ShowCommand,
};
use eventpass::{
    init_logging, qr, AuthResponse, Catalog, Config, EventFilter, IdentityProvider,
    LocalIdentity, Notification, RegistrationStore, SharedStorage, Storage,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// How often `notifications --follow` re-reads the database.
const FOLLOW_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(exit_status(e.as_ref()))
        }
    }
}

/// Exit status for a failed command: 2 when the user asked for something
/// invalid or unknown, 1 otherwise.
fn exit_status(err: &(dyn std::error::Error + 'static)) -> u8 {
    match err.downcast_ref::<eventpass::Error>() {
        Some(e) if e.is_invalid_input() || e.is_not_found() => 2,
        _ => 1,
    }
}

async fn run(cli: Cli) -> CliResult {
    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    // Execute the command
    match cli.command {
        Command::Events(cmd) => handle_events(&config, &cmd),
        Command::Register(cmd) => handle_register(&config, &cmd).await,
        Command::Registrations(cmd) => handle_registrations(&config, cmd.json).await,
        Command::Show(cmd) => handle_show(&config, &cmd).await,
        Command::Notifications(cmd) => handle_notifications(&config, &cmd).await,
        Command::Auth(cmd) => handle_auth(&config, cmd).await,
        Command::Onboarding(cmd) => handle_onboarding(&config, &cmd).await,
        Command::Status(cmd) => handle_status(&config, cmd.json).await,
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

/// Open the configured database and wire the store to the local identity.
async fn open_store(config: &Config) -> eventpass::Result<(RegistrationStore, LocalIdentity)> {
    let storage = SharedStorage::new(Storage::open(config.database_path())?);
    let identity = LocalIdentity::new(storage.clone());
    let store = RegistrationStore::open(storage)
        .await?
        .with_identity(Arc::new(identity.clone()));
    Ok((store, identity))
}

fn handle_events(config: &Config, cmd: &EventsCommand) -> CliResult {
    let catalog = Catalog::load(config.catalog_path())?;
    let featured = catalog.filter_featured(cmd.category.as_deref());
    let filter = EventFilter {
        query: cmd.search.clone(),
        status: cmd.status.into(),
        category: cmd.category.clone(),
    };
    let events = catalog.filter_events(&filter);

    if cmd.json {
        let listing = serde_json::json!({
            "featured_events": featured,
            "events": events,
        });
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    println!("Featured");
    println!("--------");
    for event in &featured {
        let price = if event.is_paid {
            event.price.to_string()
        } else {
            "free".to_string()
        };
        println!(
            "{:<28} {:<14} {:<18} {:>8}  {}",
            event.name, event.date, event.start_location, event.distance, price
        );
    }
    if featured.is_empty() {
        println!("(none)");
    }

    println!();
    println!("Events");
    println!("------");
    for event in &events {
        println!(
            "{:<28} {:<14} {:>8}  {:?}",
            event.name, event.date, event.distance, event.status
        );
    }
    if events.is_empty() {
        println!("(none)");
    }
    Ok(())
}

async fn handle_register(config: &Config, cmd: &RegisterCommand) -> CliResult {
    config.validate_phone_number(&cmd.phone)?;
    let catalog = Catalog::load(config.catalog_path())?;
    let event = catalog.featured_by_name(&cmd.name)?;

    let (store, _) = open_store(config).await?;
    let outcome = store.register_for_event(event, &cmd.phone).await?;

    if outcome.newly_registered {
        println!("Registered for {}", outcome.event.event_name);
    } else {
        println!("Already registered for {}", outcome.event.event_name);
    }
    println!("  Event id:  {}", outcome.event.event_id);
    println!("  {}", outcome.notification.title);
    println!("  {}", outcome.notification.message);
    Ok(())
}

async fn handle_registrations(config: &Config, json: bool) -> CliResult {
    let (store, _) = open_store(config).await?;
    let events = store.registered_events().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    if events.is_empty() {
        println!("No registrations yet.");
        return Ok(());
    }
    for event in &events {
        println!(
            "{}  {:<28} {:<14} {}",
            event.event_id, event.event_name, event.event_date, event.location
        );
    }
    Ok(())
}

async fn handle_show(config: &Config, cmd: &ShowCommand) -> CliResult {
    let (store, _) = open_store(config).await?;
    let Some(event) = store.event_by_id(&cmd.event_id).await? else {
        return Err(format!("no registration with id {}", cmd.event_id).into());
    };

    println!("{}", event.event_name);
    println!("{}", "=".repeat(event.event_name.chars().count()));
    println!("Date:        {}", event.event_date);
    println!("Location:    {}", event.location);
    println!("Distance:    {}", event.distance);
    println!("Category:    {}", event.category);
    println!("Track:       {}", event.track_type);
    println!("Registered:  {}", event.registration_date.to_rfc3339());
    println!("Phone:       {}", event.phone_number);
    if !event.user_email.is_empty() {
        println!("Email:       {}", event.user_email);
    }
    println!();
    println!("{}", event.description);

    if cmd.qr {
        println!();
        println!("{}", qr::render_terminal(&event.qr_code_data)?);
    }
    if let Some(path) = &cmd.svg {
        let svg = qr::render_svg(&event.qr_code_data, config.qr.size_px)?;
        std::fs::write(path, svg)?;
        println!();
        println!("QR code written to {}", path.display());
    }
    Ok(())
}

fn print_notification(notification: &Notification) {
    println!(
        "[{}] {}",
        notification.timestamp.format("%Y-%m-%d %H:%M"),
        notification.title
    );
    println!("    {}", notification.message);
}

async fn handle_notifications(config: &Config, cmd: &NotificationsCommand) -> CliResult {
    let (store, _) = open_store(config).await?;

    if !cmd.follow {
        let notifications = store.notifications().await?;
        if cmd.json {
            println!("{}", serde_json::to_string_pretty(&notifications)?);
        } else if notifications.is_empty() {
            println!("No notifications.");
        } else {
            notifications.iter().for_each(print_notification);
        }
        return Ok(());
    }

    follow_notifications(&store, cmd.json, tokio::signal::ctrl_c()).await?;
    Ok(())
}

/// Print notifications as they arrive until `shutdown` completes or the
/// feed ends. Returns how many were printed.
async fn follow_notifications<F>(
    store: &RegistrationStore,
    json: bool,
    shutdown: F,
) -> Result<usize, Box<dyn std::error::Error>>
where
    F: std::future::Future,
{
    let mut feed = store.subscribe();
    let mut poll = tokio::time::interval(FOLLOW_POLL_INTERVAL);
    let mut shown = 0;
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            update = feed.next() => {
                let Some(notifications) = update else { break };
                // The list only grows, so anything past `shown` is new.
                for notification in notifications.iter().skip(shown) {
                    if json {
                        println!("{}", serde_json::to_string(notification)?);
                    } else {
                        print_notification(notification);
                    }
                }
                shown = notifications.len();
            }
            _ = poll.tick() => {
                store.refresh().await?;
            }
            _ = &mut shutdown => break,
        }
    }
    Ok(shown)
}

fn print_auth_response(response: AuthResponse, success: &str) -> CliResult {
    match response {
        AuthResponse::Success => {
            println!("{success}");
            Ok(())
        }
        AuthResponse::Error(message) => Err(message.into()),
    }
}

async fn handle_auth(config: &Config, cmd: AuthCommand) -> CliResult {
    let (_, identity) = open_store(config).await?;
    match cmd {
        AuthCommand::Signup { email, password } => {
            let response = identity.create_account_with_email(&email, &password).await;
            print_auth_response(response, "Account created. You are signed in.")
        }
        AuthCommand::Signin { email, password } => {
            let response = identity.sign_in_with_email(&email, &password).await;
            print_auth_response(response, "Signed in.")
        }
        AuthCommand::Token { token } => {
            let response = identity.sign_in_with_token(&token).await;
            print_auth_response(response, "Signed in.")
        }
        AuthCommand::Signout => {
            identity.sign_out().await?;
            println!("Signed out.");
            Ok(())
        }
        AuthCommand::Status => {
            match identity.current_session().await? {
                Some(session) => println!(
                    "Signed in as {} (since {})",
                    session.email,
                    session.signed_in_at.to_rfc3339()
                ),
                None => println!("Not signed in."),
            }
            Ok(())
        }
    }
}

async fn handle_onboarding(config: &Config, cmd: &OnboardingCommand) -> CliResult {
    let (store, _) = open_store(config).await?;
    match cmd {
        OnboardingCommand::Complete => {
            store.set_onboarding_completed().await?;
            println!("Onboarding marked as completed.");
        }
        OnboardingCommand::Status => {
            if store.has_completed_onboarding().await? {
                println!("Onboarding completed.");
            } else {
                println!("Onboarding not completed.");
            }
        }
    }
    Ok(())
}

async fn handle_status(config: &Config, json: bool) -> CliResult {
    let (store, identity) = open_store(config).await?;
    let stats = store.stats().await?;
    let onboarded = store.has_completed_onboarding().await?;
    let email = identity.current_email().await?;

    if json {
        let status = serde_json::json!({
            "database_path": config.database_path(),
            "catalog_path": config.catalog_path(),
            "registrations": stats.registrations,
            "notifications": stats.notifications,
            "stored_keys": stats.stored_keys,
            "quarantined_values": stats.quarantined_values,
            "db_size_bytes": stats.db_size_bytes,
            "onboarding_completed": onboarded,
            "signed_in_as": email,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("evpass status");
        println!("-------------");
        println!("Database:      {}", config.database_path().display());
        println!("Catalog:       {}", config.catalog_path().display());
        println!("Registrations: {}", stats.registrations);
        println!("Notifications: {}", stats.notifications);
        println!("Stored keys:   {}", stats.stored_keys);
        println!("Quarantined:   {}", stats.quarantined_values);
        println!("Size:          {} bytes", stats.db_size_bytes);
        println!("Onboarded:     {onboarded}");
        println!(
            "Signed in as:  {}",
            email.as_deref().unwrap_or("(nobody)")
        );
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> CliResult {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Catalog]");
                println!("  Path:               {}", config.catalog_path().display());
                println!();
                println!("[Registration]");
                println!(
                    "  Phone digits:       {}-{}",
                    config.registration.min_phone_digits, config.registration.max_phone_digits
                );
                println!();
                println!("[QR]");
                println!("  Size (px):          {}", config.qr.size_px);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
