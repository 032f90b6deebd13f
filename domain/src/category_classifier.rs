//! Three-stage category classification pipeline.
//!
//! Stage 1 condenses the transcript into a 400-800 word digest (LLM).
//! Stage 2 scores the digest against every playbook with cheap substring
//! heuristics and keeps the top candidates. Stage 3 asks the LLM to
//! adjudicate among the candidates in JSON mode, with validation and a
//! deterministic degraded fallback when the model misbehaves.

use crate::error::Error;
use crate::playbook::{self, PLAYBOOKS};
use call_ai::traits::completion::Provider as LlmProvider;
use call_ai::CompletionOptions;
use log::*;
use serde::{Deserialize, Serialize};

/// Tunables for the pipeline. Defaults mirror the production values; the
/// service config can override any of them.
#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    /// Transcript prefix (in chars) fed to the summarizer
    pub transcript_char_budget: usize,
    pub strong_signal_weight: i64,
    pub weak_signal_penalty: i64,
    pub top_candidate_count: usize,
    /// Confidence band [review_floor, assign_floor) flags for review
    pub review_floor: f64,
    pub assign_floor: f64,
    /// Confidence reported when adjudication fails entirely. Deliberately
    /// below the review floor so the call stays unassigned.
    pub fallback_confidence: f64,
    pub summary_max_tokens: u32,
    pub adjudication_max_tokens: u32,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            transcript_char_budget: 15_000,
            strong_signal_weight: 2,
            weak_signal_penalty: 1,
            top_candidate_count: 3,
            review_floor: 0.50,
            assign_floor: 0.75,
            fallback_confidence: 0.45,
            summary_max_tokens: 1200,
            adjudication_max_tokens: 500,
        }
    }
}

/// One playbook's heuristic result.
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicScore {
    pub category: String,
    pub score: i64,
    /// Signals that fired, prefixed "+" (strong) or "-" (weak)
    pub matched_signals: Vec<String>,
}

/// Candidate entry as persisted in `calls.top_candidates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub category: String,
    pub score: i64,
}

/// Final prediction for one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPrediction {
    pub predicted_category: String,
    pub confidence: f64,
    pub reasoning: Vec<String>,
    pub top_candidates: Vec<CandidateScore>,
    pub needs_review: bool,
}

/// Distinguishes a model-backed verdict from the heuristic fallback used
/// when adjudication fails. Both carry a full `CategoryPrediction` and
/// serialize identically; the variant only matters to callers that want to
/// count degradations.
#[derive(Debug, Clone, PartialEq)]
pub enum AdjudicationOutcome {
    Adjudicated(CategoryPrediction),
    Degraded(CategoryPrediction),
}

impl AdjudicationOutcome {
    pub fn prediction(&self) -> &CategoryPrediction {
        match self {
            AdjudicationOutcome::Adjudicated(p) | AdjudicationOutcome::Degraded(p) => p,
        }
    }

    pub fn into_prediction(self) -> CategoryPrediction {
        match self {
            AdjudicationOutcome::Adjudicated(p) | AdjudicationOutcome::Degraded(p) => p,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, AdjudicationOutcome::Degraded(_))
    }
}

/// Output of the full pipeline.
#[derive(Debug, Clone)]
pub struct Classification {
    pub transcript_summary: String,
    pub outcome: AdjudicationOutcome,
}

const SUMMARY_SYSTEM_PROMPT: &str = "You are an expert at condensing meeting transcripts into focused summaries.
Generate a summary of 400-800 words that focuses on:
1. Stated purpose of the call
2. Main topics discussed
3. Decisions vs open questions
4. Any mentions of money, scope, delivery, or risk
5. Next steps

Be concise but capture all key information needed for classification.";

/// Stage 1: condense the transcript into a classification-ready digest.
/// A summarizer failure is a real error; there is no useful fallback.
pub async fn generate_transcript_summary(
    llm: &dyn LlmProvider,
    settings: &ClassifierSettings,
    title: &str,
    transcript: &str,
) -> Result<String, Error> {
    let truncated: String = transcript
        .chars()
        .take(settings.transcript_char_budget)
        .collect();

    let user_prompt = format!("Title: {title}\n\nTranscript:\n{truncated}");

    let options = CompletionOptions {
        json_mode: false,
        temperature: 0.3,
        max_tokens: settings.summary_max_tokens,
    };

    let summary = llm
        .complete(SUMMARY_SYSTEM_PROMPT, &user_prompt, options)
        .await?;

    debug!("Generated transcript summary ({} chars)", summary.len());
    Ok(summary)
}

/// Stage 2: heuristic signal scan over the playbook catalog.
///
/// Case-insensitive substring match over title + digest; strong signals add,
/// weak signals subtract. Returns the top candidates by score, stable with
/// respect to catalog order on ties.
pub fn score_categories(
    settings: &ClassifierSettings,
    title: &str,
    summary: &str,
) -> Vec<HeuristicScore> {
    let text = format!("{title} {summary}").to_lowercase();

    let mut scores: Vec<HeuristicScore> = PLAYBOOKS
        .iter()
        .map(|playbook| {
            let mut score = 0;
            let mut matched_signals = Vec::new();

            for signal in playbook.strong_signals {
                if text.contains(&signal.to_lowercase()) {
                    score += settings.strong_signal_weight;
                    matched_signals.push(format!("+{signal}"));
                }
            }
            for signal in playbook.weak_signals {
                if text.contains(&signal.to_lowercase()) {
                    score -= settings.weak_signal_penalty;
                    matched_signals.push(format!("-{signal}"));
                }
            }

            HeuristicScore {
                category: playbook.name.to_string(),
                score,
                matched_signals,
            }
        })
        .collect();

    // Stable sort keeps catalog order for equal scores
    scores.sort_by(|a, b| b.score.cmp(&a.score));
    scores.truncate(settings.top_candidate_count);
    scores
}

#[derive(Debug, Deserialize)]
struct AdjudicationResponse {
    category: String,
    confidence: f64,
    reasoning: Vec<String>,
}

fn adjudication_system_prompt() -> String {
    format!(
        "You are an expert at classifying business calls into exact categories.

Available categories (you MUST choose exactly one):
{}

You MUST respond with valid JSON in this exact format:
{{
  \"category\": \"exact category name\",
  \"confidence\": 0.85,
  \"reasoning\": [
    \"Clear statement this is [intent]\",
    \"Timeframe is [timeframe]\",
    \"Strong signals: [signals]\"
  ]
}}

Confidence rules:
- >= 0.75: High confidence, clear match
- 0.50-0.75: Medium confidence, some ambiguity
- < 0.50: Low confidence, unclear

Provide 2-5 specific reasoning bullets referencing observed signals.",
        playbook::category_definitions()
    )
}

fn candidates_of(top_candidates: &[HeuristicScore]) -> Vec<CandidateScore> {
    top_candidates
        .iter()
        .map(|c| CandidateScore {
            category: c.category.clone(),
            score: c.score,
        })
        .collect()
}

// The heuristic scan always yields candidates; an empty slice can only
// reach `adjudicate` directly, so fall back to the catch-all category.
fn top_candidate_name(top_candidates: &[HeuristicScore]) -> String {
    top_candidates
        .first()
        .map(|c| c.category.clone())
        .unwrap_or_else(|| playbook::OTHER_CATEGORY.to_string())
}

fn degraded_prediction(
    settings: &ClassifierSettings,
    top_candidates: &[HeuristicScore],
) -> CategoryPrediction {
    CategoryPrediction {
        predicted_category: top_candidate_name(top_candidates),
        confidence: settings.fallback_confidence,
        reasoning: vec!["Fallback to heuristic scoring due to LLM error".to_string()],
        top_candidates: candidates_of(top_candidates),
        needs_review: true,
    }
}

/// Stage 3: LLM adjudication among the heuristic candidates.
///
/// Never returns an error: model failure, malformed JSON or an
/// out-of-range confidence all degrade to the top heuristic candidate at
/// the fallback confidence. An invalid category name alone is repaired in
/// place and the verdict still counts as adjudicated.
pub async fn adjudicate(
    llm: &dyn LlmProvider,
    settings: &ClassifierSettings,
    title: &str,
    summary: &str,
    top_candidates: &[HeuristicScore],
) -> AdjudicationOutcome {
    let candidates_list = top_candidates
        .iter()
        .map(|c| format!("{} (heuristic score: {})", c.category, c.score))
        .collect::<Vec<_>>()
        .join(", ");

    let user_prompt = format!(
        "Classify this call into ONE category.

Title: {title}

Summary: {summary}

Top {} candidate categories from heuristic analysis:
{candidates_list}

Provide your classification with confidence score and reasoning.",
        top_candidates.len()
    );

    let options = CompletionOptions::structured(settings.adjudication_max_tokens);

    let content = match llm
        .complete(&adjudication_system_prompt(), &user_prompt, options)
        .await
    {
        Ok(content) => content,
        Err(e) => {
            warn!("Adjudication request failed, degrading to heuristics: {e}");
            return AdjudicationOutcome::Degraded(degraded_prediction(settings, top_candidates));
        }
    };

    let mut response: AdjudicationResponse = match serde_json::from_str(&content) {
        Ok(response) => response,
        Err(e) => {
            warn!("Adjudication response unparseable, degrading to heuristics: {e}");
            return AdjudicationOutcome::Degraded(degraded_prediction(settings, top_candidates));
        }
    };

    if !(0.0..=1.0).contains(&response.confidence) || response.reasoning.is_empty() {
        warn!(
            "Adjudication response out of range (confidence {}), degrading to heuristics",
            response.confidence
        );
        return AdjudicationOutcome::Degraded(degraded_prediction(settings, top_candidates));
    }

    if !playbook::is_valid_category(&response.category) {
        warn!(
            "LLM returned invalid category: {}, using top candidate",
            response.category
        );
        response.category = top_candidate_name(top_candidates);
    }

    let needs_review = response.confidence >= settings.review_floor
        && response.confidence < settings.assign_floor;

    AdjudicationOutcome::Adjudicated(CategoryPrediction {
        predicted_category: response.category,
        confidence: response.confidence,
        reasoning: response.reasoning,
        top_candidates: candidates_of(top_candidates),
        needs_review,
    })
}

/// The full pipeline: summarize, score, adjudicate.
pub async fn classify_call(
    llm: &dyn LlmProvider,
    settings: &ClassifierSettings,
    title: &str,
    transcript: &str,
) -> Result<Classification, Error> {
    let transcript_summary = generate_transcript_summary(llm, settings, title, transcript).await?;

    let top_candidates = score_categories(settings, title, &transcript_summary);

    let outcome = adjudicate(llm, settings, title, &transcript_summary, &top_candidates).await;

    Ok(Classification {
        transcript_summary,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_ai::traits::completion::MockProvider;
    use call_ai::Error as ProviderError;

    fn settings() -> ClassifierSettings {
        ClassifierSettings::default()
    }

    #[test]
    fn strong_signals_add_and_weak_signals_subtract() {
        let scores = score_categories(
            &settings(),
            "Ballpark discussion",
            "We walked through a rough estimate with a price range and the \
             assumptions behind it. No contract yet.",
        );

        let ballpark = scores
            .iter()
            .find(|s| s.category == "Ballpark Proposal")
            .unwrap();
        // +ballpark +estimate +range +assumptions +rough = +10, -contract = -1
        assert_eq!(ballpark.score, 9);
        assert!(ballpark.matched_signals.contains(&"+estimate".to_string()));
        assert!(ballpark.matched_signals.contains(&"-contract".to_string()));
    }

    #[test]
    fn returns_exactly_top_three_candidates() {
        let scores = score_categories(&settings(), "Untitled", "nothing matches here at all");
        assert_eq!(scores.len(), 3);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let scores = score_categories(&settings(), "QUARTERLY ROADMAP", "");
        let roadmap = scores
            .iter()
            .find(|s| {
                s.category == "Roadmap Planning Session (Quarterly, bi-annual, or annual)"
            })
            .unwrap();
        assert!(roadmap.score >= 4);
    }

    fn candidates() -> Vec<HeuristicScore> {
        vec![
            HeuristicScore {
                category: "Ballpark Proposal".to_string(),
                score: 6,
                matched_signals: vec!["+ballpark".to_string()],
            },
            HeuristicScore {
                category: "Problem & Requirements Discovery".to_string(),
                score: 2,
                matched_signals: vec![],
            },
            HeuristicScore {
                category: "Intro (Diagnostic) Call".to_string(),
                score: 0,
                matched_signals: vec![],
            },
        ]
    }

    #[tokio::test]
    async fn adjudication_accepts_a_valid_verdict() {
        let mut llm = MockProvider::new();
        llm.expect_complete().returning(|_, _, _| {
            Ok(r#"{"category": "Ballpark Proposal", "confidence": 0.85, "reasoning": ["clear estimate discussion", "no commitment yet"]}"#.to_string())
        });

        let outcome = adjudicate(&llm, &settings(), "Budget call", "summary", &candidates()).await;

        assert!(!outcome.is_degraded());
        let prediction = outcome.prediction();
        assert_eq!(prediction.predicted_category, "Ballpark Proposal");
        assert_eq!(prediction.confidence, 0.85);
        assert!(!prediction.needs_review);
    }

    #[tokio::test]
    async fn medium_confidence_flags_for_review() {
        let mut llm = MockProvider::new();
        llm.expect_complete().returning(|_, _, _| {
            Ok(r#"{"category": "Ballpark Proposal", "confidence": 0.6, "reasoning": ["some ambiguity"]}"#.to_string())
        });

        let outcome = adjudicate(&llm, &settings(), "Budget call", "summary", &candidates()).await;

        assert!(outcome.prediction().needs_review);
    }

    #[tokio::test]
    async fn invalid_category_is_replaced_by_top_candidate() {
        let mut llm = MockProvider::new();
        llm.expect_complete().returning(|_, _, _| {
            Ok(r#"{"category": "Sales Call", "confidence": 0.8, "reasoning": ["made up"]}"#
                .to_string())
        });

        let outcome = adjudicate(&llm, &settings(), "Budget call", "summary", &candidates()).await;

        // Repaired in place, not degraded
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.prediction().predicted_category, "Ballpark Proposal");
        assert_eq!(outcome.prediction().confidence, 0.8);
    }

    #[tokio::test]
    async fn malformed_json_degrades_to_heuristics() {
        let mut llm = MockProvider::new();
        llm.expect_complete()
            .returning(|_, _, _| Ok("not json at all".to_string()));

        let outcome = adjudicate(&llm, &settings(), "Budget call", "summary", &candidates()).await;

        assert!(outcome.is_degraded());
        let prediction = outcome.prediction();
        assert_eq!(prediction.predicted_category, "Ballpark Proposal");
        assert_eq!(prediction.confidence, 0.45);
        assert!(prediction.needs_review);
        assert_eq!(prediction.top_candidates.len(), 3);
    }

    #[tokio::test]
    async fn empty_candidate_list_degrades_to_the_catch_all() {
        let mut llm = MockProvider::new();
        llm.expect_complete()
            .returning(|_, _, _| Err(ProviderError::Network("timeout".to_string())));

        let outcome = adjudicate(&llm, &settings(), "Budget call", "summary", &[]).await;

        assert!(outcome.is_degraded());
        assert_eq!(outcome.prediction().predicted_category, "Other");
        assert!(outcome.prediction().top_candidates.is_empty());
    }

    #[tokio::test]
    async fn provider_failure_degrades_to_heuristics() {
        let mut llm = MockProvider::new();
        llm.expect_complete()
            .returning(|_, _, _| Err(ProviderError::Network("timeout".to_string())));

        let outcome = adjudicate(&llm, &settings(), "Budget call", "summary", &candidates()).await;

        assert!(outcome.is_degraded());
        assert!(outcome.prediction().confidence < 0.50);
    }

    #[tokio::test]
    async fn summarizer_failure_is_a_real_error() {
        let mut llm = MockProvider::new();
        llm.expect_complete()
            .returning(|_, _, _| Err(ProviderError::Network("timeout".to_string())));

        let result = classify_call(&llm, &settings(), "Budget call", "transcript text").await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn transcript_is_truncated_to_the_char_budget() {
        let mut llm = MockProvider::new();
        llm.expect_complete()
            .withf(|_, user_prompt, _| user_prompt.len() < 1_200)
            .returning(|_, _, _| Ok("digest".to_string()));

        let mut small = settings();
        small.transcript_char_budget = 1_000;

        let long_transcript = "word ".repeat(10_000);
        let summary =
            generate_transcript_summary(&llm, &small, "Call", &long_transcript).await;

        assert!(summary.is_ok());
    }
}
