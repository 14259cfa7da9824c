//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::catalog::StatusFilter;

/// Catalog listing arguments.
#[derive(Debug, Args)]
pub struct EventsCommand {
    /// Only show events in this category
    #[arg(long)]
    pub category: Option<String>,

    /// Case-insensitive search on event names
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Filter regular events by status
    #[arg(long, value_enum, default_value = "all")]
    pub status: StatusArg,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Registration arguments.
#[derive(Debug, Args)]
pub struct RegisterCommand {
    /// Exact name of the featured event
    pub name: String,

    /// Contact phone number (digits only)
    #[arg(short, long)]
    pub phone: String,
}

/// Registration listing arguments.
#[derive(Debug, Args)]
pub struct RegistrationsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Single registration arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Id of the registered event
    pub event_id: String,

    /// Print the QR code to the terminal
    #[arg(long)]
    pub qr: bool,

    /// Write the QR code as an SVG image
    #[arg(long, value_name = "FILE")]
    pub svg: Option<PathBuf>,
}

/// Notification listing arguments.
#[derive(Debug, Args)]
pub struct NotificationsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,

    /// Keep running and print new notifications as they arrive
    #[arg(short, long)]
    pub follow: bool,
}

/// Account commands.
#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Create an account and sign in
    Signup {
        /// Account email
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },

    /// Sign in with email and password
    Signin {
        /// Account email
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },

    /// Sign in with a federated identity token
    Token {
        /// Token issued by the identity provider
        token: String,
    },

    /// Sign out
    Signout,

    /// Show who is signed in
    Status,
}

/// Onboarding commands.
#[derive(Debug, Subcommand)]
pub enum OnboardingCommand {
    /// Mark onboarding as completed
    Complete,

    /// Show whether onboarding was completed
    Status,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Event status argument for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StatusArg {
    /// Every event
    #[default]
    All,
    /// Events still open for registration
    Upcoming,
    /// Closed events
    Past,
}

impl From<StatusArg> for StatusFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::All => Self::All,
            StatusArg::Upcoming => Self::Upcoming,
            StatusArg::Past => Self::Past,
        }
    }
}
