//! Import orchestrators: turning calendar events and Drive files into
//! analyzed, classified calls, plus bulk reclassification.
//!
//! Batches never abort on a single bad item; every failure is recorded in
//! the batch outcome and processing moves on.

use crate::call_analysis::{self, AnalysisConfig};
use crate::category_classifier::{self, Classification, ClassifierSettings};
use crate::confidence_policy::ConfidencePolicy;
use crate::error::{DomainErrorKind, Error, EntityErrorKind, InternalErrorKind};
use crate::participants;
use crate::transcript_match::{self, MatchConfig};
use call_ai::traits::completion::Provider as LlmProvider;
use call_ai::traits::file_store::Provider as FileStoreProvider;
use chrono::{DateTime, Utc};
use entity::classification_source::ClassificationSource;
use entity::{calendar_events, calls, drive_files, Id};
use log::*;
use sea_orm::DatabaseConnection;

/// Tunables shared by the import entry points.
#[derive(Debug, Clone, Default)]
pub struct ImportSettings {
    pub classifier: ClassifierSettings,
    pub policy: ConfidencePolicy,
    pub matching: MatchConfig,
    /// Pause between batch items, to stay under provider rate limits
    pub item_delay_ms: u64,
}

/// Aggregated result of a batch run.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct BatchOutcome {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub no_transcript: usize,
    pub errors: Vec<String>,
}

impl BatchOutcome {
    fn record_failure(&mut self, label: &str, message: impl std::fmt::Display) {
        self.failed += 1;
        self.errors.push(format!("{label}: {message}"));
    }
}

fn is_already_exists(err: &Error) -> bool {
    err.error_kind
        == DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::AlreadyExists))
}

async fn resolve_predicted_category(db: &DatabaseConnection, name: &str) -> Result<Id, Error> {
    match entity_api::category::find_fixed_by_name(db, name).await? {
        Some(category) => Ok(category.id),
        None => Err(Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(format!(
                "Predicted category not in fixed catalog: {name}"
            ))),
        }),
    }
}

struct AnalyzedCall {
    analysis: call_analysis::CallAnalysis,
    classification: Classification,
    predicted_category_id: Id,
}

/// Runs analysis + the classification pipeline for one transcript.
async fn analyze_and_classify(
    db: &DatabaseConnection,
    llm: &dyn LlmProvider,
    settings: &ImportSettings,
    analysis_config: &AnalysisConfig,
    title: &str,
    transcript: &str,
) -> Result<AnalyzedCall, Error> {
    let analysis = call_analysis::analyze_call(llm, analysis_config, transcript).await?;
    let classification =
        category_classifier::classify_call(llm, &settings.classifier, title, transcript).await?;
    let predicted_category_id = resolve_predicted_category(
        db,
        &classification.outcome.prediction().predicted_category,
    )
    .await?;

    Ok(AnalyzedCall {
        analysis,
        classification,
        predicted_category_id,
    })
}

#[allow(clippy::too_many_arguments)]
fn build_call_model(
    analyzed: &AnalyzedCall,
    settings: &ImportSettings,
    title: String,
    call_date: DateTime<Utc>,
    organizer: String,
    participants: Vec<String>,
    transcript: String,
    is_external: Option<bool>,
    external_domains: Vec<String>,
    classification_source: ClassificationSource,
    meet_code: Option<String>,
    drive_file_id: Option<Id>,
    calendar_event_id: Option<Id>,
) -> Result<calls::Model, Error> {
    let prediction = analyzed.classification.outcome.prediction();
    let assignment = settings
        .policy
        .assignment_for(prediction.confidence, analyzed.predicted_category_id);

    let now = chrono::Utc::now();
    Ok(calls::Model {
        id: Id::new_v4(),
        title,
        call_date: call_date.into(),
        organizer,
        participants: serde_json::json!(participants),
        transcript,
        transcript_summary: Some(analyzed.classification.transcript_summary.clone()),
        ai_summary: Some(analyzed.analysis.summary.clone()),
        ai_rating: Some(analyzed.analysis.rating),
        ai_sentiment: Some(analyzed.analysis.sentiment()?),
        ai_strengths: Some(serde_json::json!(analyzed.analysis.strengths)),
        ai_areas_for_improvement: Some(serde_json::json!(
            analyzed.analysis.areas_for_improvement
        )),
        predicted_category_id: Some(analyzed.predicted_category_id),
        confidence_score: Some(prediction.confidence),
        category_reasoning: Some(prediction.reasoning.join("\n")),
        top_candidates: Some(serde_json::json!(prediction.top_candidates)),
        needs_review: prediction.needs_review,
        category_id: assignment.category_id,
        category_final_id: assignment.category_final_id,
        was_overridden: false,
        overridden_at: None,
        overridden_by: None,
        is_external,
        external_domains: Some(serde_json::json!(external_domains)),
        classification_source,
        meet_code,
        is_duplicate: false,
        drive_file_id,
        calendar_event_id,
        created_at: now.into(),
        updated_at: now.into(),
    })
}

fn json_string_array(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

async fn import_one_calendar_event(
    db: &DatabaseConnection,
    llm: &dyn LlmProvider,
    store: &dyn FileStoreProvider,
    settings: &ImportSettings,
    analysis_config: &AnalysisConfig,
    user_id: Id,
    event: &calendar_events::Model,
) -> Result<Option<calls::Model>, Error> {
    let title = event
        .summary
        .clone()
        .unwrap_or_else(|| "Untitled".to_string());

    let transcript_file = transcript_match::find_transcript(
        db,
        store,
        &settings.matching,
        user_id,
        &title,
        event.start_time.into(),
        event.end_time.into(),
    )
    .await?;

    let Some(file) = transcript_file else {
        return Ok(None);
    };
    let Some(raw_text) = file.raw_text.clone().filter(|t| !t.trim().is_empty()) else {
        return Ok(None);
    };

    let analyzed =
        analyze_and_classify(db, llm, settings, analysis_config, &title, &raw_text).await?;

    let model = build_call_model(
        &analyzed,
        settings,
        title,
        event.start_time.into(),
        event
            .organizer
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        json_string_array(&event.attendees),
        raw_text,
        event.is_external,
        json_string_array(&event.external_domains),
        ClassificationSource::Calendar,
        event.meet_code.clone(),
        Some(file.id),
        Some(event.id),
    )?;

    let call = entity_api::call::create(db, model).await?;

    entity_api::calendar_event::update_transcript_match(
        db,
        event.id,
        true,
        Some(file.remote_file_id.clone()),
    )
    .await?;
    entity_api::calendar_event::mark_imported(db, event.id, call.id).await?;

    Ok(Some(call))
}

/// Imports the given (not yet imported) calendar events as calls.
pub async fn import_calendar_events(
    db: &DatabaseConnection,
    llm: &dyn LlmProvider,
    store: &dyn FileStoreProvider,
    settings: &ImportSettings,
    analysis_config: &AnalysisConfig,
    user_id: Id,
    event_ids: Vec<Id>,
) -> Result<BatchOutcome, Error> {
    let events: Vec<calendar_events::Model> =
        entity_api::calendar_event::find_by_ids(db, event_ids)
            .await?
            .into_iter()
            .filter(|e| e.user_id == user_id && !e.imported)
            .collect();

    let mut outcome = BatchOutcome {
        total: events.len(),
        ..Default::default()
    };

    for event in &events {
        let label = event.summary.as_deref().unwrap_or("Untitled");
        match import_one_calendar_event(db, llm, store, settings, analysis_config, user_id, event)
            .await
        {
            Ok(Some(_)) => outcome.success += 1,
            Ok(None) => {
                outcome.no_transcript += 1;
                outcome.errors.push(format!("{label}: No transcript file found"));
            }
            Err(e) if is_already_exists(&e) => {
                outcome.record_failure(label, "Duplicate - already imported by another team member");
            }
            Err(e) => {
                error!("Error importing calendar event {}: {e}", event.id);
                outcome.record_failure(label, e);
            }
        }
        pause_between_items(settings.item_delay_ms).await;
    }

    Ok(outcome)
}

struct DriveCallContext {
    participants: Vec<String>,
    is_external: Option<bool>,
    external_domains: Vec<String>,
    classification_source: ClassificationSource,
    meet_code: Option<String>,
    calendar_event_id: Option<Id>,
}

/// Attendee emails and classification from the closest local calendar
/// event, when one exists within the match window.
async fn calendar_context_for(
    db: &DatabaseConnection,
    settings: &ImportSettings,
    user_id: Id,
    call_date: DateTime<Utc>,
) -> Result<DriveCallContext, Error> {
    let events = entity_api::calendar_event::find_by_user_id(db, user_id).await?;

    match transcript_match::match_event_by_time(&events, call_date, &settings.matching) {
        Some(event) => {
            let mut participants: Vec<String> = Vec::new();
            if let Some(organizer) = &event.organizer {
                participants.push(organizer.clone());
            }
            participants.extend(json_string_array(&event.attendees));

            Ok(DriveCallContext {
                participants,
                is_external: event.is_external,
                external_domains: json_string_array(&event.external_domains),
                classification_source: if event.is_external.is_some() {
                    ClassificationSource::Calendar
                } else {
                    ClassificationSource::Unknown
                },
                meet_code: event.meet_code.clone(),
                calendar_event_id: Some(event.id),
            })
        }
        None => Ok(DriveCallContext {
            participants: Vec::new(),
            is_external: None,
            external_domains: Vec::new(),
            classification_source: ClassificationSource::Unknown,
            meet_code: None,
            calendar_event_id: None,
        }),
    }
}

async fn import_one_drive_file(
    db: &DatabaseConnection,
    llm: &dyn LlmProvider,
    settings: &ImportSettings,
    analysis_config: &AnalysisConfig,
    user_id: Id,
    organizer: &str,
    file: &drive_files::Model,
) -> Result<(), Error> {
    let raw_text = file
        .raw_text
        .clone()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "No text content".to_string(),
            )),
        })?;

    let title = participants::clean_file_name(&file.name)?;
    let call_date = participants::extract_call_date(&raw_text, file.modified_time.into())?;

    let mut context = calendar_context_for(db, settings, user_id, call_date).await?;

    // Calendar attendees carry emails; transcript-derived names are a
    // fallback, the LLM a last resort
    if context.participants.is_empty() {
        context.participants = participants::parse_participants(&raw_text)?;
        if context.participants.is_empty() {
            context.participants = participants::extract_participants_with_llm(llm, &raw_text).await;
        }
        if !context.participants.is_empty() && context.classification_source
            == ClassificationSource::Unknown
        {
            context.classification_source = ClassificationSource::Transcript;
        }
    }

    // Early duplicate probe; the unique index remains the real guarantee
    if let Some(meet_code) = &context.meet_code {
        if entity_api::call::find_by_meet_code_and_date(db, meet_code, call_date.into())
            .await?
            .is_some()
        {
            return Err(Error {
                source: None,
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                    EntityErrorKind::AlreadyExists,
                )),
            });
        }
    }

    let analyzed =
        analyze_and_classify(db, llm, settings, analysis_config, &title, &raw_text).await?;

    let model = build_call_model(
        &analyzed,
        settings,
        title,
        call_date,
        organizer.to_string(),
        context.participants,
        raw_text,
        context.is_external,
        context.external_domains,
        context.classification_source,
        context.meet_code,
        Some(file.id),
        context.calendar_event_id,
    )?;

    entity_api::call::create(db, model).await?;
    Ok(())
}

/// Converts ingested Drive files into calls. When `file_ids` is given only
/// those files are considered; otherwise every unconverted imported file.
pub async fn import_drive_files(
    db: &DatabaseConnection,
    llm: &dyn LlmProvider,
    settings: &ImportSettings,
    analysis_config: &AnalysisConfig,
    user_id: Id,
    file_ids: Option<Vec<Id>>,
) -> Result<BatchOutcome, Error> {
    let integration = entity_api::google_integration::find_by_user_id(db, user_id)
        .await?
        .ok_or_else(|| Error::config("Google Drive not connected"))?;

    let organizer = integration
        .google_name
        .or(integration.google_email)
        .unwrap_or_else(|| "Unknown".to_string());

    let mut files = entity_api::drive_file::find_unlinked_imported(db, user_id).await?;
    if let Some(ids) = file_ids {
        files.retain(|f| ids.contains(&f.id));
    }

    if files.is_empty() {
        return Err(Error::config("No files available to import"));
    }

    let mut outcome = BatchOutcome {
        total: files.len(),
        ..Default::default()
    };

    for file in &files {
        match import_one_drive_file(db, llm, settings, analysis_config, user_id, &organizer, file)
            .await
        {
            Ok(()) => outcome.success += 1,
            Err(e) if is_already_exists(&e) => {
                outcome.record_failure(
                    &file.name,
                    "Duplicate - already imported by another team member",
                );
                if let Err(mark_err) = entity_api::drive_file::mark_skipped(
                    db,
                    file.id,
                    "Duplicate call - already imported by another user".to_string(),
                )
                .await
                {
                    warn!("Failed to mark drive file {} skipped: {mark_err}", file.id);
                }
            }
            Err(e) => {
                error!("Error importing file {}: {e}", file.name);
                outcome.record_failure(&file.name, e);
            }
        }
        pause_between_items(settings.item_delay_ms).await;
    }

    Ok(outcome)
}

/// Re-runs the classification pipeline over every call with a transcript.
///
/// Prediction fields are always refreshed; assignment fields follow the
/// confidence policy except on calls carrying a human override, where they
/// are left untouched (the entity layer enforces this).
pub async fn recategorize_all(
    db: &DatabaseConnection,
    llm: &dyn LlmProvider,
    settings: &ImportSettings,
) -> Result<BatchOutcome, Error> {
    let calls = entity_api::call::find_with_transcript(db).await?;

    let mut outcome = BatchOutcome {
        total: calls.len(),
        ..Default::default()
    };

    info!("Recategorizing {} calls", outcome.total);

    for call in &calls {
        match recategorize_one(db, llm, settings, call).await {
            Ok(()) => outcome.success += 1,
            Err(e) => {
                error!("Error recategorizing call {}: {e}", call.id);
                outcome.record_failure(&call.title, e);
            }
        }
        pause_between_items(settings.item_delay_ms).await;
    }

    Ok(outcome)
}

async fn recategorize_one(
    db: &DatabaseConnection,
    llm: &dyn LlmProvider,
    settings: &ImportSettings,
    call: &calls::Model,
) -> Result<(), Error> {
    let classification =
        category_classifier::classify_call(llm, &settings.classifier, &call.title, &call.transcript)
            .await?;
    let prediction = classification.outcome.prediction();
    let predicted_category_id =
        resolve_predicted_category(db, &prediction.predicted_category).await?;
    let assignment = settings
        .policy
        .assignment_for(prediction.confidence, predicted_category_id);

    entity_api::call::update_classification(
        db,
        call.id,
        entity_api::call::ClassificationUpdate {
            transcript_summary: Some(classification.transcript_summary.clone()),
            predicted_category_id,
            confidence_score: prediction.confidence,
            category_reasoning: prediction.reasoning.join("\n"),
            top_candidates: serde_json::json!(prediction.top_candidates),
            needs_review: prediction.needs_review,
            category_id: assignment.category_id,
            category_final_id: assignment.category_final_id,
        },
    )
    .await?;

    Ok(())
}

async fn pause_between_items(delay_ms: u64) {
    if delay_ms > 0 {
        tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category_classifier::{AdjudicationOutcome, CandidateScore, CategoryPrediction};

    fn prediction_with(confidence: f64, needs_review: bool) -> CategoryPrediction {
        CategoryPrediction {
            predicted_category: "Ballpark Proposal".to_string(),
            confidence,
            reasoning: vec!["estimate discussion".to_string()],
            top_candidates: vec![CandidateScore {
                category: "Ballpark Proposal".to_string(),
                score: 4,
            }],
            needs_review,
        }
    }

    fn model_for(outcome: AdjudicationOutcome) -> calls::Model {
        let analyzed = AnalyzedCall {
            analysis: call_analysis::CallAnalysis {
                summary: "Summary".to_string(),
                rating: 7.0,
                sentiment: "positive".to_string(),
                strengths: vec!["clear agenda".to_string()],
                areas_for_improvement: vec![],
            },
            classification: Classification {
                transcript_summary: "Digest".to_string(),
                outcome,
            },
            predicted_category_id: Id::new_v4(),
        };

        build_call_model(
            &analyzed,
            &ImportSettings::default(),
            "Budget call".to_string(),
            Utc::now(),
            "organizer@example.com".to_string(),
            Vec::new(),
            "transcript".to_string(),
            None,
            Vec::new(),
            ClassificationSource::Unknown,
            None,
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn low_confidence_verdict_is_stored_unassigned_without_review() {
        let model = model_for(AdjudicationOutcome::Adjudicated(prediction_with(0.30, false)));
        assert_eq!(model.category_id, None);
        assert_eq!(model.category_final_id, None);
        assert!(!model.needs_review);
    }

    #[test]
    fn mid_band_verdict_is_stored_assigned_with_review() {
        let model = model_for(AdjudicationOutcome::Adjudicated(prediction_with(0.60, true)));
        assert!(model.category_id.is_some());
        assert!(model.category_final_id.is_some());
        assert!(model.needs_review);
    }

    #[test]
    fn degraded_fallback_is_stored_unassigned_and_flagged() {
        let model = model_for(AdjudicationOutcome::Degraded(prediction_with(0.45, true)));
        assert_eq!(model.category_id, None);
        assert_eq!(model.category_final_id, None);
        assert!(model.needs_review);
    }

    #[test]
    fn batch_outcome_records_failures_with_labels() {
        let mut outcome = BatchOutcome::default();
        outcome.record_failure("Weekly sync", "No transcript file found");
        assert_eq!(outcome.failed, 1);
        assert_eq!(outcome.errors, vec!["Weekly sync: No transcript file found"]);
    }

    #[test]
    fn already_exists_detection_matches_the_entity_kind() {
        let err = Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::AlreadyExists,
            )),
        };
        assert!(is_already_exists(&err));

        let other = Error::config("nope");
        assert!(!is_already_exists(&other));
    }

    #[test]
    fn json_string_array_tolerates_non_arrays() {
        assert_eq!(
            json_string_array(&serde_json::json!(["a", "b"])),
            vec!["a", "b"]
        );
        assert!(json_string_array(&serde_json::json!({"not": "array"})).is_empty());
        assert!(json_string_array(&serde_json::json!(null)).is_empty());
    }
}
