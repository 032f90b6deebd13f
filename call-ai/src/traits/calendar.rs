//! Remote calendar provider trait.

use crate::types::event::RemoteEvent;
use crate::Error;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Abstraction over a remote calendar (Google Calendar in production).
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// List events overlapping [start, end], expanded to single instances,
    /// ordered by start time. Events without a conference link may be
    /// filtered out by the provider; the sync pipeline only cares about
    /// meetings that can have transcripts.
    async fn list_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<RemoteEvent>, Error>;

    /// Unique lowercase identifier for this provider (e.g. "google_calendar").
    fn provider_id(&self) -> &str;
}
