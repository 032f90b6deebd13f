//! Types for remote calendar operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A calendar event as listed by the remote provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteEvent {
    pub id: String,
    pub summary: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub organizer: Option<String>,
    /// Attendee emails, resource rooms already filtered out by the provider
    pub attendees: Vec<String>,
    pub hangout_link: Option<String>,
    /// Conference identifier (the meet code) when the provider exposes one
    pub conference_id: Option<String>,
    /// The provider withheld the attendee list (permissions); internal/
    /// external classification must treat this as unknown, not internal
    pub attendees_omitted: bool,
}
