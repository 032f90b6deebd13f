//! The fixed category playbooks that drive heuristic scoring and LLM
//! adjudication.
//!
//! Each playbook describes one category of business call: what the call is
//! trying to achieve, its time horizon, and the vocabulary that argues for
//! (strong signals) or against (weak signals) the category. The catch-all
//! "Other" category has no playbook; it exists only as a last-choice
//! adjudication target and is never a heuristic candidate.

/// A single category playbook.
#[derive(Debug, Clone, Copy)]
pub struct Playbook {
    pub name: &'static str,
    pub intent: &'static str,
    pub timeframe: &'static str,
    pub strong_signals: &'static [&'static str],
    pub weak_signals: &'static [&'static str],
}

/// Name of the last-choice category. Valid adjudication output, never a
/// heuristic candidate.
pub const OTHER_CATEGORY: &str = "Other";

pub const PLAYBOOKS: &[Playbook] = &[
    Playbook {
        name: "Intro (Diagnostic) Call",
        intent: "early-stage relationship and context discovery",
        timeframe: "present understanding + immediate next steps",
        strong_signals: &[
            "introductions",
            "initial call",
            "get to know",
            "understand your business",
            "exploratory",
        ],
        weak_signals: &["proposal", "pricing", "delivery", "payment", "contract"],
    },
    Playbook {
        name: "Problem & Requirements Discovery",
        intent: "gather and clarify requirements",
        timeframe: "present to near future",
        strong_signals: &[
            "requirements",
            "discovery",
            "systems",
            "workflows",
            "integrations",
            "constraints",
            "clarifying",
        ],
        weak_signals: &["proposal", "contract", "payment"],
    },
    Playbook {
        name: "Ballpark Proposal",
        intent: "provide indicative scope and cost ranges",
        timeframe: "near future, exploratory",
        strong_signals: &[
            "proposal",
            "estimate",
            "ballpark",
            "range",
            "assumptions",
            "approximately",
            "rough",
        ],
        weak_signals: &["fixed price", "contract", "signed"],
    },
    Playbook {
        name: "Post Solution Discovery Proposal",
        intent: "present refined proposal after discovery",
        timeframe: "near-term execution readiness",
        strong_signals: &[
            "discovery outcomes",
            "refined",
            "scope changed",
            "optimization",
            "phasing",
            "roadmap",
        ],
        weak_signals: &["procurement", "legal", "contract signing"],
    },
    Playbook {
        name: "Decision & Commercial Alignment Call",
        intent: "finalize commercial terms",
        timeframe: "immediate commitment",
        strong_signals: &[
            "payment",
            "invoicing",
            "contract",
            "procurement",
            "legal",
            "approval",
            "ready to sign",
        ],
        weak_signals: &["discovery", "proposal explanation"],
    },
    Playbook {
        name: "Delivery Health & Feedback Loop",
        intent: "maintain relationship health and delivery quality",
        timeframe: "past and present",
        strong_signals: &[
            "feedback",
            "retrospective",
            "collaboration",
            "communication",
            "monthly",
            "quarterly",
            "check-in",
        ],
        weak_signals: &["escalation", "crisis", "contract"],
    },
    Playbook {
        name: "Roadmap Planning Session (Quarterly, bi-annual, or annual)",
        intent: "strategic prioritization and sequencing",
        timeframe: "medium to long-term future",
        strong_signals: &[
            "roadmap",
            "quarterly",
            "annual",
            "priorities",
            "sequencing",
            "H1",
            "H2",
            "strategic",
        ],
        weak_signals: &["retrospective", "payment", "contract"],
    },
    Playbook {
        name: "Escalation & Recovery Session",
        intent: "resolve serious conflict or relationship risk",
        timeframe: "immediate crisis resolution",
        strong_signals: &[
            "escalation",
            "problem",
            "crisis",
            "dispute",
            "conflict",
            "issue",
            "concern",
            "urgent",
        ],
        weak_signals: &["routine", "planning", "roadmap"],
    },
];

pub fn find_playbook(name: &str) -> Option<&'static Playbook> {
    PLAYBOOKS.iter().find(|p| p.name == name)
}

/// Whether a category name is acceptable adjudication output: one of the
/// playbook categories, or the catch-all.
pub fn is_valid_category(name: &str) -> bool {
    name == OTHER_CATEGORY || find_playbook(name).is_some()
}

/// Category definitions block used in the adjudication system prompt.
pub fn category_definitions() -> String {
    let mut definitions: Vec<String> = PLAYBOOKS
        .iter()
        .map(|p| {
            format!(
                "{}:\n  Intent: {}\n  Timeframe: {}",
                p.name, p.intent, p.timeframe
            )
        })
        .collect();
    definitions.push(format!(
        "{OTHER_CATEGORY}:\n  Intent: catch-all for calls that fit no other category\n  Timeframe: any; last choice only"
    ));
    definitions.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_eight_playbooks_and_no_other() {
        assert_eq!(PLAYBOOKS.len(), 8);
        assert!(find_playbook(OTHER_CATEGORY).is_none());
    }

    #[test]
    fn other_is_a_valid_adjudication_target() {
        assert!(is_valid_category("Other"));
        assert!(is_valid_category("Ballpark Proposal"));
        assert!(!is_valid_category("Sales Call"));
    }

    #[test]
    fn definitions_include_every_playbook_and_other() {
        let definitions = category_definitions();
        for playbook in PLAYBOOKS {
            assert!(definitions.contains(playbook.name));
        }
        assert!(definitions.contains("Other:"));
    }
}
