//! Course view: binds one (learner, course, enrollment) to its progress tracker
//! and review gate, and guards the write paths against double submits and
//! responses that arrive after the view switched to another course.

pub mod handlers;
pub mod registry;

use serde::Serialize;
use tracing::{info, warn};

use crate::api_client::ApiError;
use crate::curriculum::{CurriculumSource, ResolvedCurriculum};
use crate::models::course::{Course, CourseType, ProgressResponse};
use crate::models::review::{Review, ReviewRequest};
use crate::progression::mutator::{self, Preparation};
use crate::progression::{
    CompletionRequest, CompletionResult, Percentage, ProgressState, ProgressTracker,
    ProgressionError, SubmitOutcome,
};
use crate::rating::{rating_summary, RatingSummary};
use crate::review::{normalize_rating, validate_comment, ReviewError, ReviewGate};

pub use registry::ViewRegistry;

/// Identifies the course/enrollment a request was issued against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewKey {
    pub course_id: String,
    pub enrollment_id: String,
}

/// Who a view belongs to: one learner on one course.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewOwner {
    pub learner_id: String,
    pub course_id: String,
}

/// Result of starting a completion.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionStep {
    /// Nothing to send: the lesson was already complete.
    Done(CompletionResult),
    /// Send this request, then hand the outcome to `commit_completion`.
    Pending(CompletionRequest),
}

#[derive(Debug, Clone)]
pub struct PendingReview {
    pub key: ViewKey,
    pub request: ReviewRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub course_id: String,
    pub course_title: String,
    pub course_type: CourseType,
    pub enrollment_id: String,
    pub learner_id: String,
    pub curriculum_source: CurriculumSource,
    pub progress: ProgressState,
    pub can_review: bool,
    pub has_review: bool,
    pub rating: Option<RatingSummary>,
    /// Lesson whose completion request is pending; its control should be disabled.
    pub completion_in_flight: Option<String>,
    pub review_in_flight: bool,
}

pub struct CourseView {
    learner_id: String,
    course: Course,
    enrollment_id: String,
    tracker: ProgressTracker,
    gate: ReviewGate,
    completion_in_flight: Option<CompletionRequest>,
    review_in_flight: bool,
}

impl CourseView {
    pub fn new(
        learner_id: impl Into<String>,
        course: Course,
        curriculum: ResolvedCurriculum,
        progress: &ProgressResponse,
        reviews: &[Review],
    ) -> Self {
        let learner_id = learner_id.into();
        Self {
            gate: ReviewGate::from_reviews(reviews, &learner_id),
            tracker: ProgressTracker::from_progress(curriculum, progress),
            enrollment_id: progress.enrollment.id.clone(),
            learner_id,
            course,
            completion_in_flight: None,
            review_in_flight: false,
        }
    }

    pub fn key(&self) -> ViewKey {
        ViewKey {
            course_id: self.course.id.clone(),
            enrollment_id: self.enrollment_id.clone(),
        }
    }

    pub fn owner(&self) -> ViewOwner {
        ViewOwner {
            learner_id: self.learner_id.clone(),
            course_id: self.course.id.clone(),
        }
    }

    pub fn learner_id(&self) -> &str {
        &self.learner_id
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn can_review(&self) -> bool {
        self.gate.can_review(self.tracker.percentage().value())
    }

    /// Rebinds the view to another course. Pending requests become stale.
    pub fn switch_course(
        &mut self,
        course: Course,
        curriculum: ResolvedCurriculum,
        progress: &ProgressResponse,
        reviews: &[Review],
    ) {
        info!(
            "View for learner {} switching from course {} to {}",
            self.learner_id, self.course.id, course.id
        );
        *self = Self::new(
            std::mem::take(&mut self.learner_id),
            course,
            curriculum,
            progress,
            reviews,
        );
    }

    /// Local half of the Completion Mutator: idempotence, double-submit and gating checks.
    pub fn begin_completion(
        &mut self,
        lesson_id: &str,
        time_spent: u32,
    ) -> Result<CompletionStep, ProgressionError> {
        if let Preparation::AlreadyCompleted(result) = mutator::prepare(&self.tracker, lesson_id)? {
            return Ok(CompletionStep::Done(result));
        }
        if let Some(pending) = &self.completion_in_flight {
            return Err(ProgressionError::RequestInFlight {
                lesson_id: pending.lesson_id.clone(),
            });
        }

        let request = CompletionRequest {
            course_id: self.course.id.clone(),
            learner_id: self.learner_id.clone(),
            enrollment_id: self.enrollment_id.clone(),
            lesson_id: lesson_id.to_string(),
            time_spent,
        };
        self.completion_in_flight = Some(request.clone());
        Ok(CompletionStep::Pending(request))
    }

    /// Applies the network outcome if the request still belongs to the active binding.
    pub fn commit_completion(
        &mut self,
        request: &CompletionRequest,
        outcome: Result<SubmitOutcome, ProgressionError>,
    ) -> Result<CompletionResult, ProgressionError> {
        if self.completion_in_flight.as_ref() == Some(request) {
            self.completion_in_flight = None;
        }
        if request.course_id != self.course.id || request.enrollment_id != self.enrollment_id {
            warn!(
                "Dropping completion of lesson {} for enrollment {}: view is on enrollment {}",
                request.lesson_id, request.enrollment_id, self.enrollment_id
            );
            return Err(ProgressionError::StaleResponse {
                enrollment_id: request.enrollment_id.clone(),
            });
        }

        let result = mutator::apply(&mut self.tracker, &request.lesson_id, outcome?);
        info!(
            "Lesson {} completed for enrollment {} ({:?})",
            request.lesson_id, self.enrollment_id, result.percentage
        );
        Ok(result)
    }

    /// Folds a freshly fetched progress record in, if it is for the active binding.
    pub fn refresh_progress(
        &mut self,
        key: &ViewKey,
        progress: &ProgressResponse,
    ) -> Result<Percentage, ProgressionError> {
        if *key != self.key() || progress.enrollment.id != self.enrollment_id {
            return Err(ProgressionError::StaleResponse {
                enrollment_id: progress.enrollment.id.clone(),
            });
        }
        self.tracker.merge_completed(progress.completed_lesson_ids());
        match progress.enrollment.progress_percentage {
            Some(p) => self.tracker.adopt_authoritative(p),
            None => self.tracker.clear_authoritative(),
        }
        Ok(self.tracker.percentage())
    }

    /// Local half of review submission: gate, rating and comment validation.
    pub fn begin_review(
        &mut self,
        raw_rating: f64,
        comment: Option<&str>,
    ) -> Result<PendingReview, ReviewError> {
        if self.review_in_flight {
            return Err(ReviewError::RequestInFlight);
        }
        self.gate.check(self.tracker.percentage().value())?;
        let rating = normalize_rating(raw_rating)?;
        let comment = validate_comment(comment)?;

        self.review_in_flight = true;
        Ok(PendingReview {
            key: self.key(),
            request: ReviewRequest {
                rating: rating.value(),
                comment,
            },
        })
    }

    /// Applies the server's answer. Failures leave every piece of local state as it was.
    pub fn commit_review(
        &mut self,
        pending: &PendingReview,
        outcome: Result<Course, ApiError>,
    ) -> Result<(), ReviewError> {
        if pending.key != self.key() {
            return Err(ReviewError::StaleResponse);
        }
        self.review_in_flight = false;

        match outcome {
            Ok(updated) => {
                self.gate.record_submitted();
                self.course.rating = updated.rating;
                self.course.ratings_count = updated.ratings_count;
                info!(
                    "Review recorded for course {} by learner {}",
                    self.course.id, self.learner_id
                );
                Ok(())
            }
            Err(e) if e.status() == Some(409) => {
                warn!("Server rejected duplicate review for course {}: {e}", self.course.id);
                Err(ReviewError::DuplicateReview)
            }
            Err(e) => {
                warn!("Review submission for course {} failed: {e}", self.course.id);
                Err(ReviewError::TransientNetworkFailure(e.to_string()))
            }
        }
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            course_id: self.course.id.clone(),
            course_title: self.course.title.clone(),
            course_type: self.course.course_type,
            enrollment_id: self.enrollment_id.clone(),
            learner_id: self.learner_id.clone(),
            curriculum_source: self.tracker.curriculum().source,
            progress: self.tracker.state(),
            can_review: self.can_review(),
            has_review: self.gate.has_existing_review(),
            rating: rating_summary(&self.course),
            completion_in_flight: self
                .completion_in_flight
                .as_ref()
                .map(|r| r.lesson_id.clone()),
            review_in_flight: self.review_in_flight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::{resolve, CurriculumCatalog};
    use crate::models::course::{Enrollment, ProgressDetail};
    use crate::testing::{cpp_course, review_by, ENROLLMENT_ID, LEARNER_ID};

    fn progress(enrollment_id: &str, course_id: &str, done: &[&str], pct: Option<f64>) -> ProgressResponse {
        ProgressResponse {
            enrollment: Enrollment {
                id: enrollment_id.into(),
                course_id: course_id.into(),
                progress_percentage: pct,
            },
            progress_details: done
                .iter()
                .map(|id| ProgressDetail {
                    lesson_id: id.to_string(),
                    is_completed: true,
                })
                .collect(),
        }
    }

    fn cpp_lessons() -> Vec<String> {
        (1..=4)
            .flat_map(|m| (1..=3).map(move |l| format!("cpp-m{m}-l{l}")))
            .collect()
    }

    fn view_with(done: &[&str], pct: Option<f64>, reviews: &[Review]) -> CourseView {
        let course = cpp_course();
        let curriculum = resolve(&CurriculumCatalog::builtin(), &course);
        CourseView::new(
            LEARNER_ID,
            course,
            curriculum,
            &progress(ENROLLMENT_ID, "7", done, pct),
            reviews,
        )
    }

    fn accepted(pct: f64) -> Result<SubmitOutcome, ProgressionError> {
        Ok(SubmitOutcome {
            percentage: Some(pct),
            server_completed: Vec::new(),
        })
    }

    #[test]
    fn test_first_module_done_scenario() {
        let view = view_with(&["cpp-m1-l1", "cpp-m1-l2", "cpp-m1-l3"], None, &[]);
        let tracker = view.tracker();
        assert!(tracker.is_module_unlocked(1));
        assert!(!tracker.is_module_unlocked(2));
        assert!(!tracker.is_module_unlocked(3));
        assert_eq!(tracker.percentage(), Percentage::Estimated(25));
        assert!(!view.can_review());
    }

    #[test]
    fn test_all_lessons_done_scenario() {
        let lessons = cpp_lessons();
        let done: Vec<&str> = lessons.iter().map(String::as_str).collect();
        let view = view_with(&done, Some(100.0), &[]);
        assert_eq!(view.tracker().percentage(), Percentage::Authoritative(100));
        assert!(view.can_review());
        assert!(view.snapshot().progress.next_lesson.is_none());
    }

    #[test]
    fn test_server_percentage_ahead_of_lessons_keeps_gate_closed() {
        let mut view = view_with(&[], Some(100.0), &[]);
        assert_eq!(view.tracker().percentage(), Percentage::Authoritative(0));
        assert!(!view.can_review());
        assert_eq!(
            view.begin_review(5.0, None).unwrap_err(),
            ReviewError::NotEligible { progress: 0 }
        );
    }

    #[test]
    fn test_double_submit_refused_while_in_flight() {
        let mut view = view_with(&["cpp-m1-l1"], None, &[]);
        let step = view.begin_completion("cpp-m1-l2", 30).unwrap();
        assert!(matches!(step, CompletionStep::Pending(_)));
        assert_eq!(
            view.snapshot().completion_in_flight.as_deref(),
            Some("cpp-m1-l2")
        );
        let err = view.begin_completion("cpp-m1-l2", 30).unwrap_err();
        assert!(matches!(err, ProgressionError::RequestInFlight { .. }));
    }

    #[test]
    fn test_completed_lesson_short_circuits() {
        let mut view = view_with(&["cpp-m1-l1"], Some(8.0), &[]);
        match view.begin_completion("cpp-m1-l1", 0).unwrap() {
            CompletionStep::Done(result) => {
                assert!(result.already_completed);
                assert_eq!(result.percentage, Percentage::Authoritative(8));
            }
            other => panic!("expected Done, got {other:?}"),
        }
        assert!(view.snapshot().completion_in_flight.is_none());
    }

    #[test]
    fn test_commit_applies_and_clears_in_flight() {
        let mut view = view_with(&[], None, &[]);
        let CompletionStep::Pending(request) = view.begin_completion("cpp-m1-l1", 10).unwrap() else {
            panic!("expected a pending request");
        };
        let result = view.commit_completion(&request, accepted(8.0)).unwrap();
        assert_eq!(result.percentage, Percentage::Authoritative(8));
        assert!(view.tracker().is_completed("cpp-m1-l1"));
        assert!(view.snapshot().completion_in_flight.is_none());
    }

    #[test]
    fn test_failed_commit_mutates_nothing() {
        let mut view = view_with(&[], None, &[]);
        let CompletionStep::Pending(request) = view.begin_completion("cpp-m1-l1", 10).unwrap() else {
            panic!("expected a pending request");
        };
        let err = view
            .commit_completion(
                &request,
                Err(ProgressionError::TransientNetworkFailure("timeout".into())),
            )
            .unwrap_err();
        assert!(matches!(err, ProgressionError::TransientNetworkFailure(_)));
        assert!(view.tracker().completed().is_empty());
        // The learner can retry the same action.
        assert!(matches!(
            view.begin_completion("cpp-m1-l1", 10).unwrap(),
            CompletionStep::Pending(_)
        ));
    }

    #[test]
    fn test_stale_response_after_switch_is_dropped() {
        let mut view = view_with(&[], None, &[]);
        let CompletionStep::Pending(request) = view.begin_completion("cpp-m1-l1", 10).unwrap() else {
            panic!("expected a pending request");
        };

        let mut other = cpp_course();
        other.id = "8".into();
        other.title = "Python desde cero".into();
        let curriculum = resolve(&CurriculumCatalog::builtin(), &other);
        view.switch_course(other, curriculum, &progress("e-8", "8", &[], Some(0.0)), &[]);

        let err = view.commit_completion(&request, accepted(8.0)).unwrap_err();
        assert_eq!(
            err,
            ProgressionError::StaleResponse {
                enrollment_id: ENROLLMENT_ID.into()
            }
        );
        assert!(view.tracker().completed().is_empty());
        assert_eq!(view.tracker().percentage(), Percentage::Authoritative(0));
        assert_eq!(view.learner_id(), LEARNER_ID);
    }

    #[test]
    fn test_refresh_progress_guards_binding() {
        let mut view = view_with(&[], None, &[]);
        let key = view.key();
        let pct = view
            .refresh_progress(&key, &progress(ENROLLMENT_ID, "7", &["cpp-m1-l1"], Some(8.0)))
            .unwrap();
        assert_eq!(pct, Percentage::Authoritative(8));
        assert!(view.tracker().is_completed("cpp-m1-l1"));

        let err = view
            .refresh_progress(&key, &progress("e-other", "7", &[], Some(0.0)))
            .unwrap_err();
        assert!(matches!(err, ProgressionError::StaleResponse { .. }));
    }

    #[test]
    fn test_review_requires_full_progress() {
        let mut view = view_with(&["cpp-m1-l1"], Some(8.0), &[]);
        assert_eq!(
            view.begin_review(4.0, None).unwrap_err(),
            ReviewError::NotEligible { progress: 8 }
        );
    }

    #[test]
    fn test_existing_review_denies_gate() {
        let lessons = cpp_lessons();
        let done: Vec<&str> = lessons.iter().map(String::as_str).collect();
        let mut view = view_with(&done, Some(100.0), &[review_by(LEARNER_ID, 5.0)]);
        assert!(!view.can_review());
        assert_eq!(
            view.begin_review(4.0, None).unwrap_err(),
            ReviewError::DuplicateReview
        );
    }

    #[test]
    fn test_review_success_closes_gate_and_updates_rating() {
        let lessons = cpp_lessons();
        let done: Vec<&str> = lessons.iter().map(String::as_str).collect();
        let mut view = view_with(&done, Some(100.0), &[review_by("other", 3.0)]);
        let pending = view.begin_review(4.5, Some("Muy completo")).unwrap();
        assert_eq!(pending.request.rating, 4.5);
        assert!(view.snapshot().review_in_flight);
        assert_eq!(view.begin_review(4.5, None).unwrap_err(), ReviewError::RequestInFlight);

        let mut updated = cpp_course();
        updated.rating = Some(4.32);
        updated.ratings_count = 13;
        view.commit_review(&pending, Ok(updated)).unwrap();

        assert!(!view.can_review());
        assert_eq!(view.course().ratings_count, 13);
        assert_eq!(view.begin_review(4.0, None).unwrap_err(), ReviewError::DuplicateReview);
    }

    #[test]
    fn test_server_duplicate_leaves_state_unchanged() {
        let lessons = cpp_lessons();
        let done: Vec<&str> = lessons.iter().map(String::as_str).collect();
        let mut view = view_with(&done, Some(100.0), &[]);
        let pending = view.begin_review(3.0, None).unwrap();
        let err = view
            .commit_review(
                &pending,
                Err(ApiError::Api {
                    status: 409,
                    message: "duplicate".into(),
                }),
            )
            .unwrap_err();
        assert_eq!(err, ReviewError::DuplicateReview);
        assert_eq!(view.course().ratings_count, 12);
        assert!(!view.snapshot().has_review);
    }

    #[test]
    fn test_invalid_rating_does_not_mark_in_flight() {
        let lessons = cpp_lessons();
        let done: Vec<&str> = lessons.iter().map(String::as_str).collect();
        let mut view = view_with(&done, Some(100.0), &[]);
        assert!(matches!(
            view.begin_review(3.3, None),
            Err(ReviewError::InvalidRating(_))
        ));
        assert!(!view.snapshot().review_in_flight);
    }
}
