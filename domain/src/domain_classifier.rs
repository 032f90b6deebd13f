//! Internal/external meeting classification from participant emails.
//!
//! Pure and deterministic: same inputs always produce the same verdict.
//! The verdict is tri-state; "no evidence" (no usable participants, or the
//! calendar withheld the attendee list) is `None`, never a silent
//! "internal".

use crate::error::Error;
use entity::classification_source::ClassificationSource;
use regex::Regex;

/// Email patterns that carry no internal/external signal: meeting room
/// resources, no-reply senders, calendar bots.
const IGNORE_EMAIL_PATTERNS: &[&str] = &[
    r"^.*\.resource\.calendar@.*$",
    r"^noreply@.*$",
    r"^no-reply@.*$",
    r"^.*@resource\.calendar\.google\.com$",
    r"^bot@.*$",
    r"^calendar@.*$",
];

/// Compiled classifier configuration: the internal-domain allowlist plus
/// ignore patterns. Build once, reuse across a sync run.
#[derive(Debug)]
pub struct DomainClassifier {
    internal_domains: Vec<String>,
    ignore_patterns: Vec<Regex>,
}

/// Full partition of a participant list.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailClassification {
    pub is_external: bool,
    pub internal_emails: Vec<String>,
    pub external_emails: Vec<String>,
    pub external_domains: Vec<String>,
    pub ignored_emails: Vec<String>,
}

/// Meeting-level verdict derived from organizer + attendees.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingClassification {
    /// None = unknown (no usable participant evidence)
    pub is_external: Option<bool>,
    pub external_domains: Vec<String>,
    pub source: ClassificationSource,
    pub reason: Option<String>,
}

impl MeetingClassification {
    pub fn unknown(reason: &str) -> Self {
        Self {
            is_external: None,
            external_domains: Vec::new(),
            source: ClassificationSource::Unknown,
            reason: Some(reason.to_string()),
        }
    }
}

impl DomainClassifier {
    pub fn new(internal_domains: Vec<String>) -> Result<Self, Error> {
        let ignore_patterns = IGNORE_EMAIL_PATTERNS
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            internal_domains: internal_domains
                .into_iter()
                .map(|d| d.to_lowercase())
                .collect(),
            ignore_patterns,
        })
    }

    pub fn should_ignore_email(&self, email: &str) -> bool {
        let lowered = email.to_lowercase();
        self.ignore_patterns.iter().any(|p| p.is_match(&lowered))
    }

    /// Exact match or dotted-subdomain suffix match against the allowlist.
    /// "mail.scandiweb.com" is internal for allowlisted "scandiweb.com";
    /// "notscandiweb.com" is not.
    pub fn is_internal_domain(&self, domain: &str) -> bool {
        let lowered = domain.to_lowercase();
        self.internal_domains.iter().any(|internal| {
            lowered == *internal || lowered.ends_with(&format!(".{internal}"))
        })
    }

    pub fn classify_emails(&self, emails: &[String]) -> EmailClassification {
        let mut internal_emails = Vec::new();
        let mut external_emails = Vec::new();
        let mut external_domains: Vec<String> = Vec::new();
        let mut ignored_emails = Vec::new();

        for email in emails {
            let trimmed = email.trim().to_lowercase();
            if trimmed.is_empty() {
                continue;
            }

            if self.should_ignore_email(&trimmed) {
                ignored_emails.push(trimmed);
                continue;
            }

            match extract_domain(&trimmed) {
                Some(domain) if self.is_internal_domain(&domain) => {
                    internal_emails.push(trimmed);
                }
                Some(domain) => {
                    if !external_domains.contains(&domain) {
                        external_domains.push(domain);
                    }
                    external_emails.push(trimmed);
                }
                // No parseable domain: treat as external for safety
                None => {
                    external_emails.push(trimmed);
                }
            }
        }

        EmailClassification {
            is_external: !external_emails.is_empty(),
            internal_emails,
            external_emails,
            external_domains,
            ignored_emails,
        }
    }

    /// Classifies a meeting from its organizer and attendee emails.
    pub fn classify_meeting(
        &self,
        organizer: Option<&str>,
        attendees: &[String],
    ) -> MeetingClassification {
        let mut all_emails: Vec<String> = Vec::new();
        if let Some(organizer) = organizer {
            if !organizer.trim().is_empty() {
                all_emails.push(organizer.to_string());
            }
        }
        all_emails.extend(attendees.iter().filter(|a| !a.trim().is_empty()).cloned());

        if all_emails.is_empty() {
            return MeetingClassification::unknown("No participants found");
        }

        let classification = self.classify_emails(&all_emails);

        MeetingClassification {
            is_external: Some(classification.is_external),
            external_domains: classification.external_domains,
            source: ClassificationSource::Calendar,
            reason: None,
        }
    }
}

pub fn extract_domain(email: &str) -> Option<String> {
    email
        .to_lowercase()
        .rsplit_once('@')
        .map(|(_, domain)| domain.to_string())
        .filter(|domain| !domain.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> DomainClassifier {
        DomainClassifier::new(vec!["scandiweb.com".to_string(), "scandipwa.com".to_string()])
            .unwrap()
    }

    #[test]
    fn extract_domain_handles_case_and_missing_at() {
        assert_eq!(
            extract_domain("Alice@Scandiweb.COM"),
            Some("scandiweb.com".to_string())
        );
        assert_eq!(extract_domain("not-an-email"), None);
        assert_eq!(extract_domain("trailing@"), None);
    }

    #[test]
    fn internal_domain_matches_exact_and_subdomain_only() {
        let classifier = classifier();
        assert!(classifier.is_internal_domain("scandiweb.com"));
        assert!(classifier.is_internal_domain("mail.scandiweb.com"));
        assert!(!classifier.is_internal_domain("notscandiweb.com"));
    }

    #[test]
    fn ignores_rooms_bots_and_no_reply() {
        let classifier = classifier();
        assert!(classifier.should_ignore_email("riga-5f.resource.calendar@scandiweb.com"));
        assert!(classifier.should_ignore_email("room@resource.calendar.google.com"));
        assert!(classifier.should_ignore_email("noreply@client.example"));
        assert!(classifier.should_ignore_email("no-reply@client.example"));
        assert!(classifier.should_ignore_email("bot@recorder.example"));
        assert!(!classifier.should_ignore_email("alice@scandiweb.com"));
    }

    #[test]
    fn all_internal_meeting_is_not_external() {
        let classifier = classifier();
        let result = classifier.classify_meeting(
            Some("alice@scandiweb.com"),
            &["bob@scandipwa.com".to_string()],
        );
        assert_eq!(result.is_external, Some(false));
        assert!(result.external_domains.is_empty());
        assert_eq!(result.source, ClassificationSource::Calendar);
    }

    #[test]
    fn one_external_attendee_flips_the_verdict() {
        let classifier = classifier();
        let result = classifier.classify_meeting(
            Some("alice@scandiweb.com"),
            &[
                "bob@scandiweb.com".to_string(),
                "carol@client.example".to_string(),
            ],
        );
        assert_eq!(result.is_external, Some(true));
        assert_eq!(result.external_domains, vec!["client.example".to_string()]);
    }

    #[test]
    fn ignored_participants_leave_no_evidence() {
        let classifier = classifier();
        // Only a room resource: every email is ignored, so nothing is
        // external and the meeting classifies as internal-only evidence.
        let result = classifier
            .classify_meeting(None, &["riga-5f.resource.calendar@scandiweb.com".to_string()]);
        assert_eq!(result.is_external, Some(false));
    }

    #[test]
    fn empty_participants_is_unknown_not_internal() {
        let classifier = classifier();
        let result = classifier.classify_meeting(None, &[]);
        assert_eq!(result.is_external, None);
        assert_eq!(result.source, ClassificationSource::Unknown);
        assert!(result.reason.is_some());
    }

    #[test]
    fn invalid_email_counts_as_external_for_safety() {
        let classifier = classifier();
        let result = classifier.classify_meeting(None, &["dial-in 555 0100".to_string()]);
        assert_eq!(result.is_external, Some(true));
        assert!(result.external_domains.is_empty());
    }

    #[test]
    fn external_domains_are_deduplicated() {
        let classifier = classifier();
        let emails = vec![
            "a@client.example".to_string(),
            "b@client.example".to_string(),
        ];
        let result = classifier.classify_emails(&emails);
        assert_eq!(result.external_domains, vec!["client.example".to_string()]);
        assert_eq!(result.external_emails.len(), 2);
    }
}
