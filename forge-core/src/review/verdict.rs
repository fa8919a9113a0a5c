//! Review verdicts derived from reviewer replies

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// The reviewer's decision on a piece of code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewVerdict {
    /// Code accepted
    Pass,
    /// Code must be revised
    NeedsRevision,
}

impl ReviewVerdict {
    /// Check if accepted
    pub fn is_pass(&self) -> bool {
        matches!(self, ReviewVerdict::Pass)
    }
}

impl std::fmt::Display for ReviewVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewVerdict::Pass => write!(f, "PASS"),
            ReviewVerdict::NeedsRevision => write!(f, "NEEDS REVISION"),
        }
    }
}

/// How a free-text review is turned into a verdict
///
/// Reviewers answer in natural language, so both policies are heuristics.
/// `Substring` accepts any reply whose upper-cased text contains "PASS" and
/// lacks "NEEDS REVISION". That misreads "BYPASS", "PASSWORD" or
/// "this does not pass until X" as approval. `Token` requires PASS, PASSES or
/// PASSED as a whole word and rejects replies containing "NOT PASS", which
/// removes the common false positives but can still be fooled by phrasing
/// it does not anticipate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictPolicy {
    /// Any occurrence of "PASS"
    #[default]
    Substring,
    /// "PASS" as a standalone word
    Token,
}

impl VerdictPolicy {
    /// Classify a reviewer reply
    pub fn classify(&self, feedback: &str) -> ReviewVerdict {
        let upper = feedback.to_uppercase();

        if upper.contains("NEEDS REVISION") {
            return ReviewVerdict::NeedsRevision;
        }

        let passed = match self {
            VerdictPolicy::Substring => upper.contains("PASS"),
            VerdictPolicy::Token => pass_token().is_match(&upper) && !upper.contains("NOT PASS"),
        };

        if passed {
            ReviewVerdict::Pass
        } else {
            ReviewVerdict::NeedsRevision
        }
    }
}

fn pass_token() -> &'static Regex {
    static PASS: OnceLock<Regex> = OnceLock::new();
    PASS.get_or_init(|| Regex::new(r"\bPASS(ES|ED)?\b").expect("static regex is valid"))
}

/// A classified review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewOutcome {
    /// The derived verdict
    pub verdict: ReviewVerdict,
    /// The reviewer's full reply
    pub feedback: String,
}

impl ReviewOutcome {
    /// Classify feedback under a policy
    pub fn from_feedback(feedback: impl Into<String>, policy: VerdictPolicy) -> Self {
        let feedback = feedback.into();
        Self {
            verdict: policy.classify(&feedback),
            feedback,
        }
    }

    /// Check if the review passed
    pub fn passed(&self) -> bool {
        self.verdict.is_pass()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_pass() {
        let policy = VerdictPolicy::Substring;
        assert_eq!(policy.classify("The code PASSES review."), ReviewVerdict::Pass);
        assert_eq!(policy.classify("verdict: pass"), ReviewVerdict::Pass);
    }

    #[test]
    fn test_needs_revision_always_wins() {
        for policy in [VerdictPolicy::Substring, VerdictPolicy::Token] {
            assert_eq!(
                policy.classify("Tests pass, but this NEEDS REVISION."),
                ReviewVerdict::NeedsRevision
            );
            assert_eq!(
                policy.classify("needs revision"),
                ReviewVerdict::NeedsRevision
            );
        }
    }

    #[test]
    fn test_no_signal_is_revision() {
        assert_eq!(
            VerdictPolicy::Substring.classify("Looks fine to me."),
            ReviewVerdict::NeedsRevision
        );
    }

    #[test]
    fn test_substring_false_positive_documented() {
        // Known misclassification of the substring heuristic
        assert_eq!(
            VerdictPolicy::Substring.classify("Hard-coded password found."),
            ReviewVerdict::Pass
        );
        assert_eq!(
            VerdictPolicy::Substring.classify("This does NOT PASS until input is validated."),
            ReviewVerdict::Pass
        );
    }

    #[test]
    fn test_token_policy_rejects_false_positives() {
        let policy = VerdictPolicy::Token;
        assert_eq!(
            policy.classify("Hard-coded password found."),
            ReviewVerdict::NeedsRevision
        );
        assert_eq!(
            policy.classify("This does NOT PASS until input is validated."),
            ReviewVerdict::NeedsRevision
        );
        assert_eq!(policy.classify("Code PASSES review."), ReviewVerdict::Pass);
        assert_eq!(policy.classify("**Verdict: PASS**"), ReviewVerdict::Pass);
    }

    #[test]
    fn test_outcome() {
        let outcome = ReviewOutcome::from_feedback("PASS", VerdictPolicy::default());
        assert!(outcome.passed());
        assert_eq!(outcome.feedback, "PASS");
        assert_eq!(outcome.verdict.to_string(), "PASS");
    }

    #[test]
    fn test_policy_serde() {
        let policy: VerdictPolicy = serde_json::from_str("\"token\"").unwrap();
        assert_eq!(policy, VerdictPolicy::Token);
    }
}
