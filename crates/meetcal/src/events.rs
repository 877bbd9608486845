//! Event list and CRUD operations.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::http::{into_success, read_json, request_failed};
use crate::page::{Page, PageCursor};
use crate::session::AuthSession;

/// Start or end of an event: either a timed `dateTime` or an all-day
/// `date`, with an optional time zone name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    /// RFC3339 timestamp for timed events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    /// Date for all-day events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// IANA time zone name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventTime {
    fn zoned(moment: DateTime<FixedOffset>, tz: Tz) -> Self {
        Self {
            date_time: Some(moment.to_rfc3339()),
            date: None,
            time_zone: Some(tz.name().to_string()),
        }
    }
}

/// An event attendee.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    /// The attendee's email address.
    pub email: String,
    /// The attendee's display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Invitation response ("accepted", "declined", ...), set by the service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_status: Option<String>,
}

impl Attendee {
    /// Creates an attendee from an email address.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            display_name: None,
            response_status: None,
        }
    }
}

/// Reminder configuration attached to an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    /// Whether the calendar's default reminders apply.
    #[serde(default)]
    pub use_default: bool,
    /// Explicit reminder overrides.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<ReminderOverride>,
}

/// A single reminder override.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderOverride {
    /// Delivery method ("email" or "popup").
    pub method: String,
    /// Minutes before the event start.
    pub minutes: i64,
}

impl Reminders {
    /// The reminder set attached to created events: an email a day ahead
    /// and a popup ten minutes ahead, defaults disabled.
    pub fn default_overrides() -> Self {
        Self {
            use_default: false,
            overrides: vec![
                ReminderOverride {
                    method: "email".to_string(),
                    minutes: 24 * 60,
                },
                ReminderOverride {
                    method: "popup".to_string(),
                    minutes: 10,
                },
            ],
        }
    }
}

/// An event as mirrored from the remote service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// The event ID.
    pub id: String,
    /// The event title.
    pub summary: Option<String>,
    /// Free-form location.
    pub location: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Event status ("confirmed", "tentative", "cancelled").
    pub status: Option<String>,
    /// Link to the event in the calendar UI.
    pub html_link: Option<String>,
    /// Start of the event.
    pub start: Option<EventTime>,
    /// End of the event.
    pub end: Option<EventTime>,
    /// Invited attendees.
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    /// Reminder configuration.
    pub reminders: Option<Reminders>,
}

/// A new event to create, with named optional fields.
#[derive(Debug, Clone)]
pub struct EventDraft {
    /// The event title.
    pub summary: String,
    /// Free-form location.
    pub location: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Start date-time string (RFC3339 or naive local stamp).
    pub start: String,
    /// End date-time string (RFC3339 or naive local stamp).
    pub end: String,
    /// Invited attendees.
    pub attendees: Vec<Attendee>,
}

impl EventDraft {
    /// Creates a draft with the required fields.
    pub fn new(
        summary: impl Into<String>,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> Self {
        Self {
            summary: summary.into(),
            location: None,
            description: None,
            start: start.into(),
            end: end.into(),
            attendees: Vec::new(),
        }
    }

    /// Sets the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds an attendee.
    pub fn with_attendee(mut self, attendee: Attendee) -> Self {
        self.attendees.push(attendee);
        self
    }

    /// Replaces the attendee list.
    pub fn with_attendees(mut self, attendees: Vec<Attendee>) -> Self {
        self.attendees = attendees;
        self
    }
}

/// Event operations bound to an [`AuthSession`].
#[derive(Debug)]
pub struct EventClient<'a> {
    session: &'a AuthSession,
}

impl<'a> EventClient<'a> {
    /// Creates an event client over the given session.
    pub fn new(session: &'a AuthSession) -> Self {
        Self { session }
    }

    /// Lists events from a calendar, following page tokens until
    /// exhausted, in page order.
    ///
    /// `start` and `end` are optional inclusive time-window bounds
    /// (`timeMin`/`timeMax`); they accept RFC3339 timestamps or naive
    /// local stamps interpreted in the session's time zone. Unparseable
    /// bounds fail with [`Error::InvalidTimeRange`] before any request
    /// is issued.
    pub async fn list(
        &self,
        calendar_id: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<Event>> {
        let tz = self.session.time_zone();
        let time_min = start.map(|s| parse_time(s, tz)).transpose()?;
        let time_max = end.map(|s| parse_time(s, tz)).transpose()?;

        let mut cursor = PageCursor::new();
        let mut events = Vec::new();

        while let Some(page_token) = cursor.next_request() {
            let page = self
                .list_page(
                    calendar_id,
                    time_min.as_ref(),
                    time_max.as_ref(),
                    page_token.as_deref(),
                )
                .await?;
            events.extend(page.items);
            cursor.record(page.next_page_token);
        }

        debug!("listed {} events from calendar {}", events.len(), calendar_id);
        Ok(events)
    }

    async fn list_page(
        &self,
        calendar_id: &str,
        time_min: Option<&DateTime<FixedOffset>>,
        time_max: Option<&DateTime<FixedOffset>>,
        page_token: Option<&str>,
    ) -> Result<Page<Event>> {
        let bearer = self.session.bearer_token().await?;
        let url = format!(
            "{}/calendars/{}/events",
            self.session.api_base(),
            urlencoding::encode(calendar_id)
        );

        let mut request = self.session.http().get(&url).bearer_auth(bearer);
        if let Some(min) = time_min {
            request = request.query(&[("timeMin", min.to_rfc3339())]);
        }
        if let Some(max) = time_max {
            request = request.query(&[("timeMax", max.to_rfc3339())]);
        }
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await.map_err(request_failed)?;
        read_json(into_success(response).await?).await
    }

    /// Creates an event and returns its ID.
    ///
    /// Start and end are required; both are serialized as RFC3339
    /// `dateTime`s with the session's time zone attached. Created events
    /// carry the default reminder overrides (email a day ahead, popup
    /// ten minutes ahead).
    pub async fn create(&self, calendar_id: &str, draft: &EventDraft) -> Result<String> {
        // Validate the time range before touching the network.
        let body = build_event_body(draft, self.session.time_zone())?;

        let bearer = self.session.bearer_token().await?;
        let url = format!(
            "{}/calendars/{}/events",
            self.session.api_base(),
            urlencoding::encode(calendar_id)
        );

        let response = self
            .session
            .http()
            .post(&url)
            .bearer_auth(bearer)
            .json(&body)
            .send()
            .await
            .map_err(request_failed)?;

        let created: CreatedEvent = read_json(into_success(response).await?).await?;
        debug!("created event {} in calendar {}", created.id, calendar_id);
        Ok(created.id)
    }

    /// Deletes an event from a calendar.
    pub async fn delete(&self, calendar_id: &str, event_id: &str) -> Result<()> {
        let bearer = self.session.bearer_token().await?;
        let url = format!(
            "{}/calendars/{}/events/{}",
            self.session.api_base(),
            urlencoding::encode(calendar_id),
            urlencoding::encode(event_id)
        );

        let response = self
            .session
            .http()
            .delete(&url)
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(request_failed)?;

        into_success(response).await?;
        debug!("deleted event {} from calendar {}", event_id, calendar_id);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewEvent<'a> {
    summary: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    start: EventTime,
    end: EventTime,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    attendees: &'a [Attendee],
    reminders: Reminders,
}

#[derive(Debug, Deserialize)]
struct CreatedEvent {
    id: String,
}

fn build_event_body<'d>(draft: &'d EventDraft, tz: Tz) -> Result<NewEvent<'d>> {
    let start = parse_time(&draft.start, tz)?;
    let end = parse_time(&draft.end, tz)?;

    Ok(NewEvent {
        summary: &draft.summary,
        location: draft.location.as_deref(),
        description: draft.description.as_deref(),
        start: EventTime::zoned(start, tz),
        end: EventTime::zoned(end, tz),
        attendees: &draft.attendees,
        reminders: Reminders::default_overrides(),
    })
}

/// Parses a caller-supplied date-time string.
///
/// Accepts RFC3339, or a naive `YYYY-MM-DDTHH:MM:SS` /
/// `YYYY-MM-DD HH:MM:SS` stamp interpreted in `tz`.
fn parse_time(input: &str, tz: Tz) -> Result<DateTime<FixedOffset>> {
    if let Ok(moment) = DateTime::parse_from_rfc3339(input) {
        return Ok(moment);
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return tz
                .from_local_datetime(&naive)
                .single()
                .map(|moment| moment.fixed_offset())
                .ok_or_else(|| {
                    Error::InvalidTimeRange(format!("ambiguous local time: {}", input))
                });
        }
    }

    Err(Error::InvalidTimeRange(format!(
        "unparseable date-time: {}",
        input
    )))
}
