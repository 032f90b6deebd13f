//! Structured AI analysis of a call transcript: summary, rating, sentiment,
//! strengths and improvement areas.
//!
//! The prompt configuration is an explicit value the caller fetches (from
//! the active prompt row) and passes in; this module never reads global
//! state.

use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use call_ai::traits::completion::Provider as LlmProvider;
use call_ai::CompletionOptions;
use entity::sentiment::Sentiment;
use log::*;
use serde::Deserialize;
use std::str::FromStr;

/// Prompt configuration for one analysis run, taken from the active prompt.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub analysis_prompt: String,
    pub rating_prompt: Option<String>,
}

impl From<entity::prompts::Model> for AnalysisConfig {
    fn from(model: entity::prompts::Model) -> Self {
        Self {
            analysis_prompt: model.analysis_prompt,
            rating_prompt: model.rating_prompt,
        }
    }
}

/// Parsed analysis result. Field names follow the JSON contract given to
/// the model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallAnalysis {
    pub summary: String,
    pub rating: f64,
    pub sentiment: String,
    pub strengths: Vec<String>,
    pub areas_for_improvement: Vec<String>,
}

impl CallAnalysis {
    pub fn sentiment(&self) -> Result<Sentiment, Error> {
        Sentiment::from_str(&self.sentiment).map_err(|_| Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::MalformedResponse(format!(
                "Unknown sentiment: {}",
                self.sentiment
            ))),
        })
    }
}

const ANALYSIS_SYSTEM_PROMPT: &str = r#"You are a professional call analyst. Your task is to analyze call transcripts and provide structured feedback.

Always respond with valid JSON in this exact format:
{
  "summary": "A brief 2-3 sentence summary of the call",
  "rating": 8.5,
  "sentiment": "Positive",
  "strengths": [
    "Clear and structured presentation of the proposal",
    "Proactive addressing of client concerns"
  ],
  "areasForImprovement": [
    "Could have provided specific cost estimates"
  ]
}

The rating should be a number between 1 and 10.
The sentiment should be one of: "Positive", "Neutral", or "Negative".
Provide 2-4 specific strengths and 1-3 areas for improvement."#;

/// Runs the analysis completion and validates the structured result.
/// A parse or range failure is an error for this call, never a silently
/// defaulted analysis.
pub async fn analyze_call(
    llm: &dyn LlmProvider,
    config: &AnalysisConfig,
    transcript: &str,
) -> Result<CallAnalysis, Error> {
    let mut user_prompt = format!("{}\n\nTranscript:\n{}", config.analysis_prompt, transcript);
    if let Some(rating_prompt) = &config.rating_prompt {
        user_prompt = format!("{user_prompt}\n\nRating guidance:\n{rating_prompt}");
    }

    let options = CompletionOptions {
        json_mode: true,
        temperature: 0.7,
        max_tokens: 1200,
    };

    let content = llm
        .complete(ANALYSIS_SYSTEM_PROMPT, &user_prompt, options)
        .await?;

    let analysis: CallAnalysis = serde_json::from_str(&content)?;

    if !(1.0..=10.0).contains(&analysis.rating) {
        warn!("Analysis rating out of range: {}", analysis.rating);
        return Err(Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::MalformedResponse(format!(
                "Rating out of range: {}",
                analysis.rating
            ))),
        });
    }

    // Reject unknown sentiments up front rather than at persistence time
    analysis.sentiment()?;

    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_ai::traits::completion::MockProvider;

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            analysis_prompt: "Analyze this call.".to_string(),
            rating_prompt: Some("Rate 1-10.".to_string()),
        }
    }

    #[tokio::test]
    async fn parses_a_well_formed_analysis() {
        let mut llm = MockProvider::new();
        llm.expect_complete().returning(|_, _, _| {
            Ok(r#"{"summary": "Productive proposal walkthrough.", "rating": 8.5, "sentiment": "Positive", "strengths": ["clear agenda"], "areasForImprovement": ["share costs earlier"]}"#.to_string())
        });

        let analysis = analyze_call(&llm, &config(), "transcript").await.unwrap();

        assert_eq!(analysis.rating, 8.5);
        assert_eq!(analysis.sentiment().unwrap(), Sentiment::Positive);
        assert_eq!(analysis.strengths.len(), 1);
    }

    #[tokio::test]
    async fn out_of_range_rating_is_an_error() {
        let mut llm = MockProvider::new();
        llm.expect_complete().returning(|_, _, _| {
            Ok(r#"{"summary": "s", "rating": 14.0, "sentiment": "Neutral", "strengths": [], "areasForImprovement": []}"#.to_string())
        });

        assert!(analyze_call(&llm, &config(), "transcript").await.is_err());
    }

    #[tokio::test]
    async fn unknown_sentiment_is_an_error() {
        let mut llm = MockProvider::new();
        llm.expect_complete().returning(|_, _, _| {
            Ok(r#"{"summary": "s", "rating": 7.0, "sentiment": "Ecstatic", "strengths": [], "areasForImprovement": []}"#.to_string())
        });

        assert!(analyze_call(&llm, &config(), "transcript").await.is_err());
    }

    #[tokio::test]
    async fn malformed_json_is_an_error() {
        let mut llm = MockProvider::new();
        llm.expect_complete()
            .returning(|_, _, _| Ok("oops".to_string()));

        assert!(analyze_call(&llm, &config(), "transcript").await.is_err());
    }
}
