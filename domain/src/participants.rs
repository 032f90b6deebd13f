//! Transcript metadata extraction: participants, call date, display title
//! and meet codes.
//!
//! Used by the Drive import path when no calendar event supplies real
//! attendee emails. Regex parsing first, an LLM pass as a last resort.

use crate::error::Error;
use call_ai::traits::completion::Provider as LlmProvider;
use call_ai::CompletionOptions;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use log::*;
use regex::Regex;

/// Parses participant names from transcript text.
///
/// Tries explicit attendee lists ("Attendees: a, b; c") first, then falls
/// back to scanning dialogue speaker labels ("Name: said something") with
/// common false positives filtered out.
pub fn parse_participants(text: &str) -> Result<Vec<String>, Error> {
    let list_patterns = [
        r"(?i)(?:Attendees|Participants|Present|Attendees List):\s*([^\n]+)",
        r"(?i)(?:With|Featuring|Including):\s*([^\n]+)",
    ];

    for pattern in list_patterns {
        let re = Regex::new(pattern)?;
        if let Some(captures) = re.captures(text) {
            if let Some(list) = captures.get(1) {
                let participants: Vec<String> = list
                    .as_str()
                    .split([',', ';', '&'])
                    .map(|p| p.trim().to_string())
                    .filter(|p| !p.is_empty() && p.len() < 100)
                    .collect();
                if !participants.is_empty() {
                    return Ok(participants);
                }
            }
        }
    }

    // Dialogue format: a capitalized name followed by a colon at line start
    let dialogue_re = Regex::new(r"(?m)^([A-Z][a-zA-Z\s]{1,30}):\s+")?;
    let false_positive_re = Regex::new(r"(?i)^(Note|Date|Time|Subject|Re|PS|FYI)$")?;

    let mut speakers: Vec<String> = Vec::new();
    for captures in dialogue_re.captures_iter(text) {
        if let Some(name) = captures.get(1) {
            let name = name.as_str().trim();
            if name.len() >= 2 && name.len() <= 30 && !false_positive_re.is_match(name) {
                let name = name.to_string();
                if !speakers.contains(&name) {
                    speakers.push(name);
                }
            }
        }
    }

    // More than 20 distinct "speakers" means the pattern is matching prose
    if speakers.is_empty() || speakers.len() > 20 {
        return Ok(Vec::new());
    }
    Ok(speakers)
}

/// LLM fallback when regex parsing finds nothing. Failures are swallowed
/// to an empty list; participant extraction is never worth failing an
/// import over.
pub async fn extract_participants_with_llm(llm: &dyn LlmProvider, text: &str) -> Vec<String> {
    let truncated: String = text.chars().take(2_000).collect();

    let system_prompt = "You are a helpful assistant that extracts participant names from meeting \
        transcripts. Return only the names as a JSON array of strings. If no participants found, \
        return an empty array.";
    let user_prompt = format!(
        "Extract all participant/speaker names from this transcript:\n\n{truncated}\n\n\
         Return only a JSON array like: [\"Name1\", \"Name2\"]"
    );

    let options = CompletionOptions {
        json_mode: false,
        temperature: 0.0,
        max_tokens: 200,
    };

    let content = match llm.complete(system_prompt, &user_prompt, options).await {
        Ok(content) => content,
        Err(e) => {
            warn!("LLM participant extraction failed: {e}");
            return Vec::new();
        }
    };

    match serde_json::from_str::<Vec<String>>(content.trim()) {
        Ok(participants) => participants
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect(),
        Err(e) => {
            warn!("LLM participant extraction returned unparseable output: {e}");
            Vec::new()
        }
    }
}

/// Finds a call date in the transcript text, falling back to the file's
/// modified time when no recognizable date appears.
pub fn extract_call_date(
    text: &str,
    file_modified: DateTime<Utc>,
) -> Result<DateTime<Utc>, Error> {
    let iso_labeled = Regex::new(r"(?i)Date:\s*(\d{4}-\d{2}-\d{2})")?;
    let slash_labeled = Regex::new(r"(?i)Date:\s*(\d{1,2})[/\-](\d{1,2})[/\-](\d{2,4})")?;
    let iso_bare = Regex::new(r"(\d{4}-\d{2}-\d{2})")?;

    for re in [&iso_labeled, &iso_bare] {
        if let Some(captures) = re.captures(text) {
            if let Some(date) = captures
                .get(1)
                .and_then(|m| NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .and_then(|dt| Utc.from_local_datetime(&dt).single())
            {
                return Ok(date);
            }
        }
    }

    // Labeled m/d/y (US ordering)
    if let Some(captures) = slash_labeled.captures(text) {
        let parts: Option<(u32, u32, i32)> = (|| {
            let month = captures.get(1)?.as_str().parse().ok()?;
            let day = captures.get(2)?.as_str().parse().ok()?;
            let mut year: i32 = captures.get(3)?.as_str().parse().ok()?;
            if year < 100 {
                year += 2000;
            }
            Some((month, day, year))
        })();
        if let Some((month, day, year)) = parts {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .and_then(|dt| Utc.from_local_datetime(&dt).single())
            {
                return Ok(date);
            }
        }
    }

    Ok(file_modified)
}

/// Derives a presentable call title from a transcript filename: strips the
/// extension and boilerplate prefixes, normalizes separators.
pub fn clean_file_name(file_name: &str) -> Result<String, Error> {
    let extension_re = Regex::new(r"(?i)\.(txt|pdf|docx?|csv)$")?;
    let prefix_re = Regex::new(r"(?i)^(transcript|meeting|call|notes?)[\s\-_:]*")?;
    let separators_re = Regex::new(r"[\-_]+")?;

    let cleaned = extension_re.replace(file_name, "");
    let cleaned = prefix_re.replace(&cleaned, "");
    let cleaned = separators_re.replace_all(&cleaned, " ");
    let cleaned = cleaned.trim();

    let mut chars = cleaned.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    };

    if capitalized.is_empty() {
        Ok("Imported Call".to_string())
    } else {
        Ok(capitalized)
    }
}

/// Extracts the meet code from a conferencing link
/// (https://meet.google.com/abc-defg-hij → "abc-defg-hij").
pub fn extract_meet_code(hangout_link: &str) -> Result<Option<String>, Error> {
    let re = Regex::new(r"(?i)meet\.google\.com/([a-z\-]+)")?;
    Ok(re
        .captures(hangout_link)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use call_ai::traits::completion::MockProvider;
    use call_ai::Error as ProviderError;
    use chrono::TimeZone;

    #[test]
    fn explicit_attendee_list_is_preferred() {
        let text = "Attendees: Alice Smith, Bob Jones; Carol\nAlice Smith: Hello everyone";
        let participants = parse_participants(text).unwrap();
        assert_eq!(participants, vec!["Alice Smith", "Bob Jones", "Carol"]);
    }

    #[test]
    fn dialogue_speakers_are_collected_without_false_positives() {
        let text = "Date: 2025-06-10\nAlice: Hi all\nBob: Morning\nAlice: Let's begin\nNote: recorded";
        let participants = parse_participants(text).unwrap();
        assert_eq!(participants, vec!["Alice", "Bob"]);
    }

    #[test]
    fn prose_text_yields_no_participants() {
        let participants = parse_participants("Just a paragraph of notes with no speakers.").unwrap();
        assert!(participants.is_empty());
    }

    #[test]
    fn labeled_iso_date_wins_over_file_time() {
        let fallback = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let date = extract_call_date("Date: 2025-06-10\nAlice: hi", fallback).unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn slash_date_with_two_digit_year_parses() {
        let fallback = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let date = extract_call_date("Date: 6/10/25", fallback).unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap());
    }

    #[test]
    fn missing_date_falls_back_to_file_time() {
        let fallback = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let date = extract_call_date("no dates here", fallback).unwrap();
        assert_eq!(date, fallback);
    }

    #[test]
    fn file_names_are_cleaned_into_titles() {
        assert_eq!(
            clean_file_name("transcript_acme-platform_review.txt").unwrap(),
            "Acme platform review"
        );
        assert_eq!(clean_file_name("Meeting - Q3 Kickoff.docx").unwrap(), "Q3 Kickoff");
        assert_eq!(clean_file_name("transcript.txt").unwrap(), "Imported Call");
    }

    #[test]
    fn meet_codes_parse_from_hangout_links() {
        assert_eq!(
            extract_meet_code("https://meet.google.com/abc-defg-hij").unwrap(),
            Some("abc-defg-hij".to_string())
        );
        assert_eq!(extract_meet_code("https://zoom.us/j/123").unwrap(), None);
    }

    #[tokio::test]
    async fn llm_extraction_parses_a_json_array() {
        let mut llm = MockProvider::new();
        llm.expect_complete()
            .returning(|_, _, _| Ok(r#"["Alice", "Bob"]"#.to_string()));

        let participants = extract_participants_with_llm(&llm, "transcript").await;
        assert_eq!(participants, vec!["Alice", "Bob"]);
    }

    #[tokio::test]
    async fn llm_extraction_failure_degrades_to_empty() {
        let mut llm = MockProvider::new();
        llm.expect_complete()
            .returning(|_, _, _| Err(ProviderError::Network("down".to_string())));

        let participants = extract_participants_with_llm(&llm, "transcript").await;
        assert!(participants.is_empty());
    }
}
