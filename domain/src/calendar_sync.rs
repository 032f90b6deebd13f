//! Calendar sync: pulls events from the remote calendar, classifies them,
//! detects cross-user duplicates and probes for transcripts, then upserts
//! the local `calendar_events` rows.
//!
//! Per-event failures are recorded and the run continues; the integration's
//! sync status ends up "success", "partial" or "failed" accordingly.

use crate::domain_classifier::DomainClassifier;
use crate::error::Error;
use crate::gateway::google_calendar::GoogleCalendarClient;
use crate::gateway::google_drive::GoogleDriveClient;
use crate::transcript_match::{MatchConfig, GOOGLE_DOC_MIME, PLAIN_TEXT_MIME};
use call_ai::traits::calendar::Provider as CalendarProvider;
use call_ai::traits::file_store::Provider as FileStoreProvider;
use call_ai::{FileQuery, RemoteEvent};
use chrono::{DateTime, Duration, Utc};
use entity::{calendar_events, Id};
use log::*;
use sea_orm::DatabaseConnection;

/// Outcome of one sync run.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct SyncSummary {
    pub new_events: usize,
    pub updated_events: usize,
    pub errors: Vec<String>,
}

impl SyncSummary {
    pub fn status(&self) -> &'static str {
        if self.errors.is_empty() {
            "success"
        } else {
            "partial"
        }
    }
}

/// Probes the file store for a transcript document near the event window.
/// Any remote failure degrades to "no transcript found".
async fn probe_for_transcript(
    store: &dyn FileStoreProvider,
    match_config: &MatchConfig,
    event: &RemoteEvent,
) -> (bool, Option<String>) {
    let tolerance = Duration::minutes(match_config.tolerance_minutes);

    let query = FileQuery {
        name_contains: vec!["transcript".to_string()],
        mime_types: vec![GOOGLE_DOC_MIME.to_string(), PLAIN_TEXT_MIME.to_string()],
        modified_after: Some(event.start_time - tolerance),
        modified_before: Some(event.end_time + tolerance),
        folder_id: None,
        page_size: Some(10),
    };

    match store.list_files(&query).await {
        Ok(files) => match files.first() {
            Some(file) => (true, Some(file.id.clone())),
            None => (false, None),
        },
        Err(e) => {
            warn!("Could not search for transcript for event {}: {e}", event.id);
            (false, None)
        }
    }
}

async fn process_event(
    db: &DatabaseConnection,
    store: &dyn FileStoreProvider,
    classifier: &DomainClassifier,
    match_config: &MatchConfig,
    user_id: Id,
    event: &RemoteEvent,
    summary: &mut SyncSummary,
) -> Result<(), Error> {
    let mut classification = classifier.classify_meeting(event.organizer.as_deref(), &event.attendees);

    // Withheld attendee lists carry no evidence either way
    if event.attendees_omitted {
        classification =
            crate::domain_classifier::MeetingClassification::unknown(
                "Attendees omitted by calendar permissions",
            );
    }

    // Cross-user duplicate: another user already synced this meeting
    let mut duplicate_of: Option<(Id, Id)> = None;
    if let Some(meet_code) = &event.conference_id {
        let others =
            entity_api::calendar_event::find_others_by_meet_code(db, meet_code, user_id).await?;
        if let Some(primary) = others.first() {
            duplicate_of = Some((primary.id, primary.user_id));
        }
    }

    // Probe for a transcript only when it could become a call: a meet code
    // exists, the meeting is known-external, and it is not a duplicate
    let (has_transcript, transcript_file_id) = if event.conference_id.is_some()
        && classification.is_external == Some(true)
        && duplicate_of.is_none()
    {
        probe_for_transcript(store, match_config, event).await
    } else {
        (false, None)
    };

    let existing =
        entity_api::calendar_event::find_by_user_and_remote_event_id(db, user_id, &event.id)
            .await?;
    let is_new = existing.is_none();

    let now = chrono::Utc::now();
    let model = calendar_events::Model {
        id: Id::new_v4(),
        user_id,
        remote_event_id: event.id.clone(),
        summary: event.summary.clone(),
        start_time: event.start_time.into(),
        end_time: event.end_time.into(),
        organizer: event.organizer.clone(),
        attendees: serde_json::json!(event.attendees),
        hangout_link: event.hangout_link.clone(),
        meet_code: event.conference_id.clone(),
        is_external: classification.is_external,
        external_domains: serde_json::json!(classification.external_domains),
        has_transcript: false,
        transcript_file_id: None,
        imported: false,
        imported_call_id: None,
        is_duplicate: false,
        primary_event_id: None,
        primary_user_id: None,
        created_at: now.into(),
        updated_at: now.into(),
    };

    let stored = entity_api::calendar_event::upsert(db, model).await?;

    if has_transcript {
        entity_api::calendar_event::update_transcript_match(
            db,
            stored.id,
            true,
            transcript_file_id,
        )
        .await?;
    }

    if let Some((primary_event_id, primary_user_id)) = duplicate_of {
        if !stored.is_duplicate {
            entity_api::calendar_event::mark_duplicate(
                db,
                stored.id,
                primary_event_id,
                primary_user_id,
            )
            .await?;
        }
    }

    if is_new {
        summary.new_events += 1;
    } else {
        summary.updated_events += 1;
    }

    Ok(())
}

/// Syncs one user's calendar over [start, end].
///
/// A listing failure marks the integration "failed" and propagates; a
/// per-event failure is recorded in the summary and the run continues.
pub async fn sync_user_calendar(
    db: &DatabaseConnection,
    calendar: &dyn CalendarProvider,
    store: &dyn FileStoreProvider,
    classifier: &DomainClassifier,
    match_config: &MatchConfig,
    user_id: Id,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<SyncSummary, Error> {
    let integration = entity_api::google_integration::find_by_user_id(db, user_id)
        .await?
        .ok_or_else(|| Error::config("No Google integration found for user"))?;

    if integration.refresh_token.is_none() {
        return Err(Error::config("Google integration has no refresh token"));
    }

    info!("Syncing calendar for user {user_id} from {start} to {end}");

    let events = match calendar.list_events(start, end).await {
        Ok(events) => events,
        Err(e) => {
            let message = e.to_string();
            entity_api::google_integration::update_sync_status(
                db,
                user_id,
                "failed",
                Some(message),
            )
            .await?;
            return Err(e.into());
        }
    };

    let mut summary = SyncSummary::default();

    for event in &events {
        if let Err(e) =
            process_event(db, store, classifier, match_config, user_id, event, &mut summary).await
        {
            error!("Error processing event {}: {e}", event.id);
            summary.errors.push(format!(
                "Event {}: {e}",
                event.summary.as_deref().unwrap_or(&event.id)
            ));
        }
    }

    let error_summary = if summary.errors.is_empty() {
        None
    } else {
        Some(summary.errors.join("; "))
    };
    entity_api::google_integration::update_sync_status(
        db,
        user_id,
        summary.status(),
        error_summary,
    )
    .await?;

    info!(
        "Calendar sync for user {user_id} finished: {} new, {} updated, {} errors",
        summary.new_events,
        summary.updated_events,
        summary.errors.len()
    );

    Ok(summary)
}

/// Syncs every user whose integration has auto-sync enabled.
///
/// Intended for the scheduler. One user's failure never stops the others;
/// it is recorded against their email (or user id) in the combined summary.
pub async fn sync_all_users(
    db: &DatabaseConnection,
    classifier: &DomainClassifier,
    match_config: &MatchConfig,
    calendar_base_url: &str,
    drive_base_url: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<SyncSummary, Error> {
    let integrations = entity_api::google_integration::find_auto_sync_enabled(db).await?;

    info!("Auto-sync run over {} integrations", integrations.len());

    let mut combined = SyncSummary::default();

    for integration in integrations {
        let label = integration
            .google_email
            .clone()
            .unwrap_or_else(|| integration.user_id.to_string());

        let Some(token) = integration.access_token.as_deref() else {
            warn!("Skipping auto-sync for {label}: no access token");
            combined.errors.push(format!("{label}: No access token"));
            continue;
        };

        let result = async {
            let calendar = GoogleCalendarClient::new(token, calendar_base_url)?;
            let store = GoogleDriveClient::new(token, drive_base_url)?;
            Ok::<_, Error>(
                sync_user_calendar(
                    db,
                    &calendar,
                    &store,
                    classifier,
                    match_config,
                    integration.user_id,
                    start,
                    end,
                )
                .await?,
            )
        }
        .await;

        match result {
            Ok(summary) => {
                combined.new_events += summary.new_events;
                combined.updated_events += summary.updated_events;
                combined.errors.extend(summary.errors);
            }
            Err(e) => {
                error!("Auto-sync failed for {label}: {e}");
                combined.errors.push(format!("{label}: {e}"));
            }
        }
    }

    Ok(combined)
}
