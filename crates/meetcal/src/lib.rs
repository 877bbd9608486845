//! Minimal Google Calendar API client.
//!
//! This crate is a thin façade over the Calendar v3 REST API:
//!
//! - [`AuthSession`] - OAuth2 token lifecycle: load, refresh, or acquire
//!   interactively, then hand out bearer credentials on demand
//! - [`TokenStore`] - JSON token persistence with restrictive permissions
//! - [`CalendarClient`] - calendar list and CRUD
//! - [`EventClient`] - paginated, time-filtered event list and CRUD
//!
//! There is no business logic here: every operation is a pass-through to
//! the remote API with pagination loops and field mapping. The one
//! stateful piece is the token lifecycle, which the session serializes
//! internally so concurrent calls never race a refresh.
//!
//! # Example
//!
//! ```ignore
//! use meetcal::{
//!     AuthSession, CalendarClient, ConsolePrompt, Credentials, EventClient, EventDraft,
//!     SessionConfig,
//! };
//!
//! let credentials = Credentials::from_file(
//!     "credentials.json",
//!     "urn:ietf:wg:oauth:2.0:oob",
//! )?;
//! let config = SessionConfig::new(credentials, "~/.config/meetcal/token.json");
//!
//! let session = AuthSession::initialize(config, &ConsolePrompt).await?;
//!
//! let calendars = CalendarClient::new(&session);
//! for calendar in calendars.list().await? {
//!     println!("{}: {}", calendar.id, calendar.summary);
//! }
//!
//! let events = EventClient::new(&session);
//! let draft = EventDraft::new("Planning", "2024-06-01T10:00:00", "2024-06-01T11:00:00");
//! let event_id = events.create("primary", &draft).await?;
//! ```

pub mod auth_code;
pub mod calendars;
pub mod config;
pub mod error;
pub mod events;
pub mod session;
pub mod token;

mod http;
mod page;

// Re-export main types at crate root
pub use auth_code::{AuthCodeProvider, ConsolePrompt};
pub use calendars::{Calendar, CalendarClient};
pub use config::{Credentials, SessionConfig};
pub use error::{Error, Result};
pub use events::{Attendee, Event, EventClient, EventDraft, EventTime, ReminderOverride, Reminders};
pub use session::AuthSession;
pub use token::{Token, TokenStore};
