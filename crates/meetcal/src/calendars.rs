//! Calendar list and CRUD operations.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::http::{into_success, read_json, request_failed};
use crate::page::{Page, PageCursor};
use crate::session::AuthSession;

/// A calendar as mirrored from the remote service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    /// The calendar ID.
    pub id: String,
    /// The calendar summary (name).
    pub summary: String,
    /// The calendar description.
    pub description: Option<String>,
    /// The calendar time zone.
    pub time_zone: Option<String>,
    /// Whether this is the account's primary calendar.
    #[serde(default)]
    pub primary: bool,
    /// Background color.
    pub background_color: Option<String>,
    /// Foreground color.
    pub foreground_color: Option<String>,
}

/// Calendar operations bound to an [`AuthSession`].
#[derive(Debug)]
pub struct CalendarClient<'a> {
    session: &'a AuthSession,
}

impl<'a> CalendarClient<'a> {
    /// Creates a calendar client over the given session.
    pub fn new(session: &'a AuthSession) -> Self {
        Self { session }
    }

    /// Lists all calendars visible to the account, following page tokens
    /// until exhausted. Results are concatenated in page order; pagination
    /// restarts on every call.
    pub async fn list(&self) -> Result<Vec<Calendar>> {
        let mut cursor = PageCursor::new();
        let mut calendars = Vec::new();

        while let Some(page_token) = cursor.next_request() {
            let page = self.list_page(page_token.as_deref()).await?;
            calendars.extend(page.items);
            cursor.record(page.next_page_token);
        }

        debug!("listed {} calendars", calendars.len());
        Ok(calendars)
    }

    async fn list_page(&self, page_token: Option<&str>) -> Result<Page<Calendar>> {
        let bearer = self.session.bearer_token().await?;
        let url = format!("{}/users/me/calendarList", self.session.api_base());

        let mut request = self.session.http().get(&url).bearer_auth(bearer);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }

        let response = request.send().await.map_err(request_failed)?;
        read_json(into_success(response).await?).await
    }

    /// Creates a calendar named `name` in the session's default time zone
    /// and returns its ID.
    pub async fn create(&self, name: &str) -> Result<String> {
        let bearer = self.session.bearer_token().await?;
        let url = format!("{}/calendars", self.session.api_base());
        let time_zone = self.session.time_zone().name();

        let body = NewCalendar {
            summary: name,
            time_zone,
        };

        let response = self
            .session
            .http()
            .post(&url)
            .bearer_auth(bearer)
            .json(&body)
            .send()
            .await
            .map_err(request_failed)?;

        let created: CreatedCalendar = read_json(into_success(response).await?).await?;
        debug!("created calendar {}", created.id);
        Ok(created.id)
    }

    /// Deletes a calendar. Whether deleting an already-deleted ID
    /// succeeds is service-defined and passed through unmodified.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let bearer = self.session.bearer_token().await?;
        let url = format!(
            "{}/calendars/{}",
            self.session.api_base(),
            urlencoding::encode(id)
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
        debug!("deleted calendar {}", id);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewCalendar<'a> {
    summary: &'a str,
    time_zone: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatedCalendar {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_calendar_list_page() {
        let json = r#"{
            "items": [
                {
                    "id": "primary",
                    "summary": "My Calendar",
                    "primary": true,
                    "timeZone": "America/New_York"
                },
                {
                    "id": "work@example.com",
                    "summary": "Work Calendar"
                }
            ],
            "nextPageToken": "page-2"
        }"#;

        let page: Page<Calendar> = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.items[0].primary);
        assert_eq!(page.items[0].time_zone, Some("America/New_York".to_string()));
        assert!(!page.items[1].primary);
        assert_eq!(page.next_page_token, Some("page-2".to_string()));
    }

    #[test]
    fn new_calendar_payload_shape() {
        let body = NewCalendar {
            summary: "Team standups",
            time_zone: "Asia/Bangkok",
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["summary"], "Team standups");
        assert_eq!(value["timeZone"], "Asia/Bangkok");
    }
}
