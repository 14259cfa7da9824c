//! Command-line interface for eventpass.
//!
//! This module provides the CLI structure for the `evpass` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AuthCommand, ConfigCommand, EventsCommand, NotificationsCommand, OnboardingCommand,
    RegisterCommand, RegistrationsCommand, ShowCommand, StatusArg, StatusCommand,
};

/// evpass - Register for events and carry your passes offline
///
/// Browse the event catalog, register with your contact details, and keep
/// a QR pass plus a notification for every registration.
#[derive(Debug, Parser)]
#[command(name = "evpass")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List catalog events
    Events(EventsCommand),

    /// Register for a featured event
    Register(RegisterCommand),

    /// List registrations
    Registrations(RegistrationsCommand),

    /// Show one registration and its QR pass
    Show(ShowCommand),

    /// List notifications
    Notifications(NotificationsCommand),

    /// Manage the signed-in account
    #[command(subcommand)]
    Auth(AuthCommand),

    /// Read or set the onboarding flag
    #[command(subcommand)]
    Onboarding(OnboardingCommand),

    /// Show storage status
    Status(StatusCommand),

    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}
