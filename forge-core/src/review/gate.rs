//! Bounded review/revision loop
//!
//! After code is generated, the gate asks a reviewer for feedback. If the
//! feedback does not classify as a pass, a reviser produces new code and the
//! gate tries again, up to a fixed revision budget. Running out of budget is
//! not an error: the caller proceeds with the last revision and a warning.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{ReviewOutcome, VerdictPolicy};
use crate::Result;

/// Maps (code, requirements) to raw review text
#[async_trait]
pub trait Reviewer: Send + Sync {
    /// Review the code against the requirements
    async fn review(&self, code: &str, requirements: &str) -> Result<String>;
}

/// Maps (code, feedback, requirements) to revised code
#[async_trait]
pub trait Reviser: Send + Sync {
    /// Produce a revision addressing the feedback
    async fn revise(&self, code: &str, feedback: &str, requirements: &str) -> Result<String>;
}

/// Events emitted while the gate runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateEvent {
    /// A review failed; `iteration` is 1-based
    Rejected { iteration: u32, max_iterations: u32 },
    /// A review passed
    Passed { reviews: u32 },
    /// The budget ran out without a passing review
    Exhausted { max_iterations: u32 },
}

/// Result of running the gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateOutcome {
    /// Final code (the last revision, or the input if never revised)
    pub code: String,
    /// Whether the loop ended on an accepted review
    pub passed: bool,
    /// Number of reviser calls made
    pub revisions: u32,
    /// Number of reviewer calls made
    pub reviews: u32,
    /// The most recent review, if any review ran
    pub last_review: Option<ReviewOutcome>,
}

/// The review gate
#[derive(Debug, Clone, Copy)]
pub struct ReviewGate {
    max_iterations: u32,
    policy: VerdictPolicy,
}

impl Default for ReviewGate {
    fn default() -> Self {
        Self::new(3)
    }
}

impl ReviewGate {
    /// Create a gate with a revision budget
    pub fn new(max_iterations: u32) -> Self {
        Self {
            max_iterations,
            policy: VerdictPolicy::default(),
        }
    }

    /// Set the verdict policy
    pub fn with_policy(mut self, policy: VerdictPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Revision budget
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Verdict policy in use
    pub fn policy(&self) -> VerdictPolicy {
        self.policy
    }

    /// Run the gate without observing events
    pub async fn run<R, V>(
        &self,
        code: String,
        requirements: &str,
        reviewer: &R,
        reviser: &V,
    ) -> Result<GateOutcome>
    where
        R: Reviewer + ?Sized,
        V: Reviser + ?Sized,
    {
        self.run_with(code, requirements, reviewer, reviser, &mut |_: GateEvent| {})
            .await
    }

    /// Run the gate, reporting each event to `on_event`
    ///
    /// With a budget of zero no review is requested and the outcome is
    /// not passed.
    pub async fn run_with<R, V>(
        &self,
        code: String,
        requirements: &str,
        reviewer: &R,
        reviser: &V,
        on_event: &mut (dyn FnMut(GateEvent) + Send),
    ) -> Result<GateOutcome>
    where
        R: Reviewer + ?Sized,
        V: Reviser + ?Sized,
    {
        let mut code = code;
        let mut iteration = 0;
        let mut reviews = 0;
        let mut passed = false;
        let mut last_review = None;

        while !passed && iteration < self.max_iterations {
            let feedback = reviewer.review(&code, requirements).await?;
            reviews += 1;

            let outcome = ReviewOutcome::from_feedback(feedback, self.policy);
            passed = outcome.passed();

            if passed {
                info!(reviews, "Code review passed");
                on_event(GateEvent::Passed { reviews });
            } else {
                info!(
                    iteration = iteration + 1,
                    max_iterations = self.max_iterations,
                    "Code review failed"
                );
                on_event(GateEvent::Rejected {
                    iteration: iteration + 1,
                    max_iterations: self.max_iterations,
                });
                code = reviser
                    .revise(&code, &outcome.feedback, requirements)
                    .await?;
                iteration += 1;
            }

            last_review = Some(outcome);
        }

        if !passed {
            warn!(
                max_iterations = self.max_iterations,
                "Proceeding with code that did not pass review"
            );
            on_event(GateEvent::Exhausted {
                max_iterations: self.max_iterations,
            });
        }

        Ok(GateOutcome {
            code,
            passed,
            revisions: iteration,
            reviews,
            last_review,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::Mutex;

    /// Reviewer returning scripted replies, repeating the last one
    struct ScriptedReviewer {
        replies: Vec<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedReviewer {
        fn new(replies: Vec<&'static str>) -> Self {
            Self {
                replies,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn seen_code(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Reviewer for ScriptedReviewer {
        async fn review(&self, code: &str, _requirements: &str) -> Result<String> {
            let mut calls = self.calls.lock().unwrap();
            let idx = calls.len().min(self.replies.len() - 1);
            calls.push(code.to_string());
            Ok(self.replies[idx].to_string())
        }
    }

    /// Reviser that numbers its revisions
    #[derive(Default)]
    struct CountingReviser {
        calls: Mutex<u32>,
    }

    impl CountingReviser {
        fn count(&self) -> u32 {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl Reviser for CountingReviser {
        async fn revise(&self, _code: &str, _feedback: &str, _requirements: &str) -> Result<String> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            Ok(format!("v{}", *calls))
        }
    }

    struct FailingReviser;

    #[async_trait]
    impl Reviser for FailingReviser {
        async fn revise(&self, _code: &str, _feedback: &str, _requirements: &str) -> Result<String> {
            Err(Error::Agent("service unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_always_needs_revision_exhausts_budget() {
        let reviewer = ScriptedReviewer::new(vec!["NEEDS REVISION: missing validation"]);
        let reviser = CountingReviser::default();

        let outcome = ReviewGate::new(3)
            .run("v0".to_string(), "reqs", &reviewer, &reviser)
            .await
            .unwrap();

        assert!(!outcome.passed);
        assert_eq!(reviser.count(), 3);
        assert_eq!(outcome.revisions, 3);
        assert_eq!(outcome.reviews, 3);
        assert_eq!(outcome.code, "v3");
    }

    #[tokio::test]
    async fn test_pass_on_second_review() {
        let reviewer = ScriptedReviewer::new(vec!["NEEDS REVISION", "PASS"]);
        let reviser = CountingReviser::default();

        let outcome = ReviewGate::new(3)
            .run("v0".to_string(), "reqs", &reviewer, &reviser)
            .await
            .unwrap();

        assert!(outcome.passed);
        assert_eq!(reviser.count(), 1);
        assert_eq!(outcome.code, "v1");
        assert_eq!(reviewer.seen_code(), vec!["v0", "v1"]);
        assert_eq!(outcome.last_review.unwrap().feedback, "PASS");
    }

    #[tokio::test]
    async fn test_pass_first_time_makes_no_revision() {
        let reviewer = ScriptedReviewer::new(vec!["The code passes review."]);
        let reviser = CountingReviser::default();

        let outcome = ReviewGate::default()
            .run("v0".to_string(), "reqs", &reviewer, &reviser)
            .await
            .unwrap();

        assert!(outcome.passed);
        assert_eq!(reviser.count(), 0);
        assert_eq!(outcome.code, "v0");
    }

    #[tokio::test]
    async fn test_stops_at_first_passing_review() {
        let reviewer = ScriptedReviewer::new(vec![
            "Looks incomplete",
            "Still wrong",
            "PASS",
            "NEEDS REVISION",
        ]);
        let reviser = CountingReviser::default();

        let outcome = ReviewGate::new(5)
            .run("v0".to_string(), "reqs", &reviewer, &reviser)
            .await
            .unwrap();

        assert!(outcome.passed);
        assert_eq!(outcome.reviews, 3);
        assert_eq!(outcome.revisions, 2);
    }

    #[tokio::test]
    async fn test_events() {
        let reviewer = ScriptedReviewer::new(vec!["NEEDS REVISION"]);
        let reviser = CountingReviser::default();
        let mut events = Vec::new();

        ReviewGate::new(2)
            .run_with("v0".to_string(), "reqs", &reviewer, &reviser, &mut |e: GateEvent| {
                events.push(e)
            })
            .await
            .unwrap();

        assert_eq!(
            events,
            vec![
                GateEvent::Rejected {
                    iteration: 1,
                    max_iterations: 2
                },
                GateEvent::Rejected {
                    iteration: 2,
                    max_iterations: 2
                },
                GateEvent::Exhausted { max_iterations: 2 },
            ]
        );
    }

    #[tokio::test]
    async fn test_zero_budget_skips_review() {
        let reviewer = ScriptedReviewer::new(vec!["PASS"]);
        let reviser = CountingReviser::default();

        let outcome = ReviewGate::new(0)
            .run("v0".to_string(), "reqs", &reviewer, &reviser)
            .await
            .unwrap();

        assert!(!outcome.passed);
        assert_eq!(outcome.reviews, 0);
        assert!(outcome.last_review.is_none());
    }

    #[tokio::test]
    async fn test_reviser_error_propagates() {
        let reviewer = ScriptedReviewer::new(vec!["NEEDS REVISION"]);

        let result = ReviewGate::new(3)
            .run("v0".to_string(), "reqs", &reviewer, &FailingReviser)
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_token_policy_changes_outcome() {
        let reviewer = ScriptedReviewer::new(vec!["Hard-coded password; fix it"]);
        let reviser = CountingReviser::default();

        let outcome = ReviewGate::new(1)
            .with_policy(VerdictPolicy::Token)
            .run("v0".to_string(), "reqs", &reviewer, &reviser)
            .await
            .unwrap();

        assert!(!outcome.passed);
        assert_eq!(reviser.count(), 1);
    }
}
