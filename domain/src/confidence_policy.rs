//! Confidence-driven category assignment policy.
//!
//! One decision function applied identically everywhere a prediction turns
//! into an assignment: single-call import, calendar import, Drive import
//! and bulk recategorization. High confidence and the review band both
//! assign, low confidence leaves the call unassigned. The review flag
//! itself travels with the classifier's prediction and is persisted from
//! there, never re-derived here.

use entity::Id;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssignmentOutcome {
    /// confidence >= assign threshold: assign
    AutoAssign,
    /// review threshold <= confidence < assign threshold: assign; the
    /// prediction carries the review flag
    AssignWithReview,
    /// confidence < review threshold: leave unassigned
    Unassigned,
}

/// The assignment field values to persist for a prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryAssignment {
    pub category_id: Option<Id>,
    pub category_final_id: Option<Id>,
}

#[derive(Debug, Clone, Copy)]
pub struct ConfidencePolicy {
    pub assign_threshold: f64,
    pub review_threshold: f64,
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            assign_threshold: 0.75,
            review_threshold: 0.50,
        }
    }
}

impl ConfidencePolicy {
    pub fn new(assign_threshold: f64, review_threshold: f64) -> Self {
        Self {
            assign_threshold,
            review_threshold,
        }
    }

    pub fn decide(&self, confidence: f64) -> AssignmentOutcome {
        if confidence >= self.assign_threshold {
            AssignmentOutcome::AutoAssign
        } else if confidence >= self.review_threshold {
            AssignmentOutcome::AssignWithReview
        } else {
            AssignmentOutcome::Unassigned
        }
    }

    pub fn assignment_for(&self, confidence: f64, category_id: Id) -> CategoryAssignment {
        match self.decide(confidence) {
            AssignmentOutcome::AutoAssign | AssignmentOutcome::AssignWithReview => {
                CategoryAssignment {
                    category_id: Some(category_id),
                    category_final_id: Some(category_id),
                }
            }
            AssignmentOutcome::Unassigned => CategoryAssignment {
                category_id: None,
                category_final_id: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_inclusive_at_the_lower_bound() {
        let policy = ConfidencePolicy::default();
        assert_eq!(policy.decide(0.75), AssignmentOutcome::AutoAssign);
        assert_eq!(policy.decide(0.50), AssignmentOutcome::AssignWithReview);
        assert_eq!(policy.decide(0.7499), AssignmentOutcome::AssignWithReview);
        assert_eq!(policy.decide(0.4999), AssignmentOutcome::Unassigned);
        assert_eq!(policy.decide(1.0), AssignmentOutcome::AutoAssign);
        assert_eq!(policy.decide(0.0), AssignmentOutcome::Unassigned);
    }

    #[test]
    fn auto_assign_sets_both_fields() {
        let policy = ConfidencePolicy::default();
        let id = Id::new_v4();
        let assignment = policy.assignment_for(0.9, id);
        assert_eq!(assignment.category_id, Some(id));
        assert_eq!(assignment.category_final_id, Some(id));
    }

    #[test]
    fn middle_band_still_assigns() {
        let policy = ConfidencePolicy::default();
        let id = Id::new_v4();
        let assignment = policy.assignment_for(0.6, id);
        assert_eq!(assignment.category_id, Some(id));
        assert_eq!(assignment.category_final_id, Some(id));
    }

    #[test]
    fn low_confidence_leaves_unassigned() {
        let policy = ConfidencePolicy::default();
        let assignment = policy.assignment_for(0.45, Id::new_v4());
        assert_eq!(assignment.category_id, None);
        assert_eq!(assignment.category_final_id, None);
    }
}
