//! Google Calendar API client.
//!
//! Implements the calendar provider trait. Only events carrying a Meet
//! link are surfaced; all-day and cancelled events are skipped because
//! they can never have a transcript.

use async_trait::async_trait;
use call_ai::traits::calendar::Provider;
use call_ai::{Error, RemoteEvent};
use chrono::{DateTime, Utc};
use log::*;
use serde::Deserialize;

const RESOURCE_CALENDAR_SUFFIX: &str = "@resource.calendar.google.com";

#[derive(Debug, Deserialize)]
struct EventListResponse {
    #[serde(default)]
    items: Vec<CalendarEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarEvent {
    id: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    start: Option<EventTime>,
    #[serde(default)]
    end: Option<EventTime>,
    #[serde(default)]
    organizer: Option<EventActor>,
    #[serde(default)]
    attendees: Vec<EventAttendee>,
    #[serde(default)]
    attendees_omitted: bool,
    #[serde(default)]
    hangout_link: Option<String>,
    #[serde(default)]
    conference_data: Option<ConferenceData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    #[serde(default)]
    date_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct EventActor {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventAttendee {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    resource: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConferenceData {
    #[serde(default)]
    conference_id: Option<String>,
}

fn into_remote_event(event: CalendarEvent) -> Option<RemoteEvent> {
    if event.status.as_deref() == Some("cancelled") {
        return None;
    }

    // The explicit conference id wins; the link is a fallback for events
    // created before conferenceData was populated
    let conference_id = event.conference_data.and_then(|data| data.conference_id).or_else(|| {
        event
            .hangout_link
            .as_deref()
            .and_then(|link| crate::participants::extract_meet_code(link).ok().flatten())
    });

    // Meetings without a Meet link can never have a transcript
    if event.hangout_link.is_none() && conference_id.is_none() {
        return None;
    }

    // All-day events carry a date but no dateTime
    let start_time = event.start.and_then(|t| t.date_time)?;
    let end_time = event.end.and_then(|t| t.date_time)?;

    let attendees = event
        .attendees
        .into_iter()
        .filter(|a| !a.resource)
        .filter_map(|a| a.email)
        .filter(|email| !email.ends_with(RESOURCE_CALENDAR_SUFFIX))
        .collect();

    Some(RemoteEvent {
        id: event.id,
        summary: event.summary,
        start_time,
        end_time,
        organizer: event.organizer.and_then(|o| o.email),
        attendees,
        hangout_link: event.hangout_link,
        conference_id,
        attendees_omitted: event.attendees_omitted,
    })
}

/// Google Calendar API client
pub struct GoogleCalendarClient {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleCalendarClient {
    /// Create a new client with the given OAuth access token and base URL
    pub fn new(access_token: &str, base_url: &str) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();

        let auth_value = format!("Bearer {}", access_token);
        let mut header_value =
            reqwest::header::HeaderValue::from_str(&auth_value).map_err(|e| {
                warn!("Failed to create auth header: {:?}", e);
                Error::Configuration("Invalid access token format".to_string())
            })?;
        header_value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, header_value);

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Provider for GoogleCalendarClient {
    async fn list_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RemoteEvent>, Error> {
        let url = format!("{}/calendars/primary/events", self.base_url);

        debug!("Listing calendar events from {start} to {end}");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("timeMin", start.to_rfc3339().as_str()),
                ("timeMax", end.to_rfc3339().as_str()),
                ("singleEvents", "true"),
                ("orderBy", "startTime"),
                ("maxResults", "100"),
            ])
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach Google Calendar: {:?}", e);
                Error::Network(e.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Google Calendar API error ({status}): {error_text}");
            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(Error::Authentication(
                    "Google Calendar rejected the access token".to_string(),
                ));
            }
            return Err(Error::Provider(error_text));
        }

        let listing: EventListResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse Calendar listing: {:?}", e);
            Error::MalformedResponse("Invalid response from Google Calendar".to_string())
        })?;

        Ok(listing.items.into_iter().filter_map(into_remote_event).collect())
    }

    fn provider_id(&self) -> &str {
        "google_calendar"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn event_json() -> serde_json::Value {
        serde_json::json!({
            "id": "evt_1",
            "status": "confirmed",
            "summary": "Client kickoff",
            "start": {"dateTime": "2026-02-03T10:00:00Z"},
            "end": {"dateTime": "2026-02-03T11:00:00Z"},
            "organizer": {"email": "alice@internal.example"},
            "attendees": [
                {"email": "alice@internal.example"},
                {"email": "bob@client.example"},
                {"email": "room-3@resource.calendar.google.com", "resource": true}
            ],
            "hangoutLink": "https://meet.google.com/abc-defg-hij",
            "conferenceData": {"conferenceId": "abc-defg-hij"}
        })
    }

    #[tokio::test]
    async fn list_events_filters_resource_attendees() -> Result<(), Error> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/calendars/primary/events")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(serde_json::json!({"items": [event_json()]}).to_string())
            .create_async()
            .await;

        let client = GoogleCalendarClient::new("token", &server.url())?;
        let events = client
            .list_events(
                "2026-02-01T00:00:00Z".parse().unwrap(),
                "2026-02-08T00:00:00Z".parse().unwrap(),
            )
            .await?;

        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].attendees,
            vec!["alice@internal.example", "bob@client.example"]
        );
        assert_eq!(events[0].conference_id.as_deref(), Some("abc-defg-hij"));
        mock.assert_async().await;

        Ok(())
    }

    #[tokio::test]
    async fn events_without_meet_links_are_skipped() -> Result<(), Error> {
        let mut no_link = event_json();
        no_link["hangoutLink"] = serde_json::Value::Null;
        no_link["conferenceData"] = serde_json::Value::Null;

        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/calendars/primary/events")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(serde_json::json!({"items": [no_link]}).to_string())
            .create_async()
            .await;

        let client = GoogleCalendarClient::new("token", &server.url())?;
        let events = client
            .list_events(
                "2026-02-01T00:00:00Z".parse().unwrap(),
                "2026-02-08T00:00:00Z".parse().unwrap(),
            )
            .await?;

        assert!(events.is_empty());

        Ok(())
    }

    #[test]
    fn meet_code_falls_back_to_hangout_link() {
        let mut event: CalendarEvent =
            serde_json::from_value(event_json()).expect("event should parse");
        event.conference_data = None;

        let remote = into_remote_event(event).expect("event should convert");
        assert_eq!(remote.conference_id.as_deref(), Some("abc-defg-hij"));
    }

    #[test]
    fn cancelled_events_are_dropped() {
        let mut event: CalendarEvent =
            serde_json::from_value(event_json()).expect("event should parse");
        event.status = Some("cancelled".to_string());
        assert!(into_remote_event(event).is_none());
    }
}
