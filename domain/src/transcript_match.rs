//! Matching meetings to transcript files.
//!
//! Two strategies, tried in order:
//! 1. Local: ingested drive files (text already extracted, not yet attached
//!    to a call) whose modified time falls within the tolerance window of
//!    the event; closest to the event end wins.
//! 2. Remote: search the file store with a query built from the event title
//!    and transcript keywords, score the candidates, and reject weak pools.
//!    An accepted remote match is downloaded and cached into `drive_files`
//!    so strategy 1 hits the next time.
//!
//! Remote failures never fail the caller; they degrade to "no match".

use crate::error::Error;
use call_ai::traits::file_store::Provider as FileStoreProvider;
use call_ai::{FileQuery, RemoteFile};
use chrono::{DateTime, Duration, Utc};
use entity::drive_file_status::DriveFileStatus;
use entity::{calendar_events, drive_files, Id};
use log::*;
use sea_orm::DatabaseConnection;

pub const GOOGLE_DOC_MIME: &str = "application/vnd.google-apps.document";
pub const PLAIN_TEXT_MIME: &str = "text/plain";

/// Matching weights and tolerances. Defaults mirror the production values.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub tolerance_minutes: i64,
    /// Base of the time-proximity component: max(0, base - hours_distance)
    pub time_score_base: f64,
    /// Points per significant title word found in the candidate filename
    pub title_word_weight: f64,
    /// Bonus when the filename itself says "transcript"
    pub transcript_bonus: f64,
    /// Candidate pools whose best score is below this are rejected outright
    pub min_score: f64,
    /// How many leading title words participate in query and scoring
    pub max_title_words: usize,
    /// Words this short carry no signal ("the", "call")
    pub min_word_chars: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            tolerance_minutes: 120,
            time_score_base: 100.0,
            title_word_weight: 50.0,
            transcript_bonus: 30.0,
            min_score: 20.0,
            max_title_words: 3,
            min_word_chars: 3,
        }
    }
}

/// Leading title words long enough to be distinctive, lowercased.
pub fn significant_title_words(title: &str, config: &MatchConfig) -> Vec<String> {
    title
        .split_whitespace()
        .filter(|word| word.chars().count() > config.min_word_chars)
        .take(config.max_title_words)
        .map(|word| word.to_lowercase())
        .collect()
}

/// Strategy 1 core: closest ingested file to the event end, within
/// tolerance. Inclusive at exactly the boundary; on a distance tie the
/// first-seen file is kept.
pub fn best_ingested_match<'a>(
    files: &'a [drive_files::Model],
    event_end: DateTime<Utc>,
    config: &MatchConfig,
) -> Option<&'a drive_files::Model> {
    let tolerance = Duration::minutes(config.tolerance_minutes);

    let mut best: Option<(&drive_files::Model, Duration)> = None;
    for file in files {
        let modified: DateTime<Utc> = file.modified_time.into();
        let distance = (modified - event_end).abs();
        if distance > tolerance {
            continue;
        }
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((file, distance)),
        }
    }

    best.map(|(file, _)| file)
}

/// Strategy 2 scoring: time proximity, title-word overlap, and an explicit
/// transcript marker in the filename.
pub fn score_remote_candidate(
    file: &RemoteFile,
    event_end: DateTime<Utc>,
    title_words: &[String],
    config: &MatchConfig,
) -> f64 {
    let hours_distance =
        (file.modified_time - event_end).abs().num_minutes() as f64 / 60.0;
    let time_score = (config.time_score_base - hours_distance).max(0.0);

    let name_lower = file.name.to_lowercase();
    let matching_words = title_words
        .iter()
        .filter(|word| name_lower.contains(word.as_str()))
        .count() as f64;

    let transcript_bonus = if name_lower.contains("transcript") {
        config.transcript_bonus
    } else {
        0.0
    };

    time_score + matching_words * config.title_word_weight + transcript_bonus
}

/// Picks the best remote candidate, or None when even the best is below the
/// minimum score. Strictly-greater wins, so listing order breaks ties.
pub fn pick_remote_candidate(
    files: &[RemoteFile],
    event_end: DateTime<Utc>,
    title_words: &[String],
    config: &MatchConfig,
) -> Option<RemoteFile> {
    let mut best: Option<(&RemoteFile, f64)> = None;
    for file in files {
        let score = score_remote_candidate(file, event_end, title_words, config);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((file, score)),
        }
    }

    match best {
        Some((file, score)) if score >= config.min_score => Some(file.clone()),
        Some((file, score)) => {
            debug!(
                "Rejecting best remote candidate '{}' (score {score:.1} below minimum)",
                file.name
            );
            None
        }
        None => None,
    }
}

/// Closest calendar event to a point in time, within tolerance. Distance is
/// to whichever event edge (start or end) is nearer.
pub fn match_event_by_time<'a>(
    events: &'a [calendar_events::Model],
    meeting_time: DateTime<Utc>,
    config: &MatchConfig,
) -> Option<&'a calendar_events::Model> {
    let tolerance = Duration::minutes(config.tolerance_minutes);

    let mut best: Option<(&calendar_events::Model, Duration)> = None;
    for event in events {
        let start: DateTime<Utc> = event.start_time.into();
        let end: DateTime<Utc> = event.end_time.into();
        let distance = (meeting_time - start).abs().min((meeting_time - end).abs());
        if distance > tolerance {
            continue;
        }
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((event, distance)),
        }
    }

    best.map(|(event, _)| event)
}

fn remote_query(
    title_words: &[String],
    event_start: DateTime<Utc>,
    event_end: DateTime<Utc>,
    config: &MatchConfig,
) -> FileQuery {
    let tolerance = Duration::minutes(config.tolerance_minutes);

    let mut name_contains = title_words.to_vec();
    name_contains.push("transcript".to_string());
    name_contains.push("meeting".to_string());

    FileQuery {
        name_contains,
        mime_types: vec![GOOGLE_DOC_MIME.to_string(), PLAIN_TEXT_MIME.to_string()],
        modified_after: Some(event_start - tolerance),
        modified_before: Some(event_end + tolerance),
        folder_id: None,
        page_size: Some(10),
    }
}

/// Downloads an accepted remote match and caches it as an Imported drive
/// file, so subsequent matching runs resolve it locally.
async fn cache_remote_match(
    db: &DatabaseConnection,
    store: &dyn FileStoreProvider,
    user_id: Id,
    remote: &RemoteFile,
) -> Result<drive_files::Model, Error> {
    let content = store.get_content(&remote.id, &remote.mime_type).await?;

    let now = chrono::Utc::now();
    let model = drive_files::Model {
        id: Id::new_v4(),
        user_id,
        remote_file_id: remote.id.clone(),
        name: remote.name.clone(),
        mime_type: remote.mime_type.clone(),
        modified_time: remote.modified_time.into(),
        raw_text: Some(content.clone()),
        status: DriveFileStatus::Pending,
        error_message: None,
        imported_at: None,
        created_at: now.into(),
        updated_at: now.into(),
    };

    let stored = entity_api::drive_file::upsert(db, model).await?;
    entity_api::drive_file::store_content(db, stored.id, content).await?;
    let imported = entity_api::drive_file::mark_imported(db, stored.id).await?;

    Ok(imported)
}

/// Full matcher: local window first, remote search on a miss. Remote
/// errors are logged and swallowed to "no match".
pub async fn find_transcript(
    db: &DatabaseConnection,
    store: &dyn FileStoreProvider,
    config: &MatchConfig,
    user_id: Id,
    title: &str,
    event_start: DateTime<Utc>,
    event_end: DateTime<Utc>,
) -> Result<Option<drive_files::Model>, Error> {
    let tolerance = Duration::minutes(config.tolerance_minutes);

    let local_pool = entity_api::drive_file::find_unlinked_imported_in_window(
        db,
        user_id,
        (event_start - tolerance).into(),
        (event_end + tolerance).into(),
    )
    .await?;

    if let Some(file) = best_ingested_match(&local_pool, event_end, config) {
        debug!("Matched ingested transcript '{}' for '{title}'", file.name);
        return Ok(Some(file.clone()));
    }

    let title_words = significant_title_words(title, config);
    let query = remote_query(&title_words, event_start, event_end, config);

    let candidates = match store.list_files(&query).await {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!("Remote transcript search failed for '{title}': {e}");
            return Ok(None);
        }
    };

    let Some(remote) = pick_remote_candidate(&candidates, event_end, &title_words, config) else {
        return Ok(None);
    };

    match cache_remote_match(db, store, user_id, &remote).await {
        Ok(file) => {
            info!("Matched remote transcript '{}' for '{title}'", file.name);
            Ok(Some(file))
        }
        Err(e) => {
            warn!("Failed to cache remote transcript '{}': {e}", remote.name);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, hour, minute, 0).unwrap()
    }

    fn local_file(name: &str, modified: DateTime<Utc>) -> drive_files::Model {
        let now = chrono::Utc::now();
        drive_files::Model {
            id: Id::new_v4(),
            user_id: Id::new_v4(),
            remote_file_id: name.to_string(),
            name: name.to_string(),
            mime_type: GOOGLE_DOC_MIME.to_string(),
            modified_time: modified.into(),
            raw_text: Some("text".to_string()),
            status: DriveFileStatus::Imported,
            error_message: None,
            imported_at: Some(now.into()),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn remote_file(name: &str, modified: DateTime<Utc>) -> RemoteFile {
        RemoteFile {
            id: name.to_string(),
            name: name.to_string(),
            mime_type: GOOGLE_DOC_MIME.to_string(),
            modified_time: modified,
        }
    }

    #[test]
    fn closest_to_event_end_wins() {
        let files = vec![
            local_file("far", at(12, 30)),
            local_file("near", at(11, 10)),
        ];
        let best = best_ingested_match(&files, at(11, 0), &MatchConfig::default()).unwrap();
        assert_eq!(best.name, "near");
    }

    #[test]
    fn boundary_distance_is_inclusive() {
        // Exactly 120 minutes from event end
        let files = vec![local_file("edge", at(13, 0))];
        let best = best_ingested_match(&files, at(11, 0), &MatchConfig::default());
        assert!(best.is_some());

        let files = vec![local_file("beyond", at(13, 1))];
        let best = best_ingested_match(&files, at(11, 0), &MatchConfig::default());
        assert!(best.is_none());
    }

    #[test]
    fn distance_tie_keeps_first_seen() {
        let files = vec![
            local_file("first", at(10, 30)),
            local_file("second", at(11, 30)),
        ];
        let best = best_ingested_match(&files, at(11, 0), &MatchConfig::default()).unwrap();
        assert_eq!(best.name, "first");
    }

    #[test]
    fn title_words_skip_short_words_and_cap_at_three() {
        let words = significant_title_words(
            "Q3 the Acme Platform Migration Review extra",
            &MatchConfig::default(),
        );
        assert_eq!(words, vec!["acme", "platform", "migration"]);
    }

    #[test]
    fn remote_scoring_combines_time_words_and_bonus() {
        let config = MatchConfig::default();
        let title_words = vec!["acme".to_string(), "migration".to_string()];
        let event_end = at(11, 0);

        // 1 hour away, both words, transcript marker
        let file = remote_file("Acme migration - Transcript", at(12, 0));
        let score = score_remote_candidate(&file, event_end, &title_words, &config);
        assert_eq!(score, 99.0 + 100.0 + 30.0);
    }

    #[test]
    fn weak_candidate_pool_is_rejected_even_when_non_empty() {
        let config = MatchConfig::default();
        let event_end = at(11, 0);
        // ~5 days away, no word overlap, no transcript marker: score 0
        let candidates = vec![remote_file("Unrelated notes", at(11, 0) + Duration::days(5))];

        let picked = pick_remote_candidate(&candidates, event_end, &[], &config);
        assert!(picked.is_none());
    }

    #[test]
    fn remote_tie_keeps_listing_order() {
        let config = MatchConfig::default();
        let event_end = at(11, 0);
        let candidates = vec![
            remote_file("transcript a", at(11, 0)),
            remote_file("transcript b", at(11, 0)),
        ];

        let picked = pick_remote_candidate(&candidates, event_end, &[], &config).unwrap();
        assert_eq!(picked.name, "transcript a");
    }

    fn event(start: DateTime<Utc>, end: DateTime<Utc>) -> calendar_events::Model {
        let now = chrono::Utc::now();
        calendar_events::Model {
            id: Id::new_v4(),
            user_id: Id::new_v4(),
            remote_event_id: "evt".to_string(),
            summary: None,
            start_time: start.into(),
            end_time: end.into(),
            organizer: None,
            attendees: serde_json::json!([]),
            hangout_link: None,
            meet_code: None,
            is_external: None,
            external_domains: serde_json::json!([]),
            has_transcript: false,
            transcript_file_id: None,
            imported: false,
            imported_call_id: None,
            is_duplicate: false,
            primary_event_id: None,
            primary_user_id: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn event_match_uses_nearest_edge() {
        let events = vec![event(at(9, 0), at(10, 0)), event(at(12, 0), at(13, 0))];
        // 10:45 is 45m after the first event's end, 75m before the second's start
        let matched = match_event_by_time(&events, at(10, 45), &MatchConfig::default()).unwrap();
        let end: DateTime<Utc> = matched.end_time.into();
        assert_eq!(end, at(10, 0));
    }

    #[test]
    fn event_match_outside_tolerance_is_none() {
        let events = vec![event(at(6, 0), at(7, 0))];
        assert!(match_event_by_time(&events, at(10, 45), &MatchConfig::default()).is_none());
    }
}
