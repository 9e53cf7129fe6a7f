//! Completion Mutator: marks a lesson complete through the remote API and folds
//! the result back into the tracker.
//!
//! Split into three steps so that callers holding the tracker behind a lock can
//! release it across the network call:
//! 1. `prepare`: idempotence and gating checks, no I/O
//! 2. `submit`: the single network round-trip (plus a progress re-fetch when
//!    the server omits the percentage)
//! 3. `apply`: commits the outcome to the tracker

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api_client::CourseApi;
use crate::models::course::CompleteLessonRequest;
use crate::progression::tracker::{Percentage, ProgressTracker};
use crate::progression::ProgressionError;

/// Everything needed to send one completion and re-fetch progress if required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub course_id: String,
    pub learner_id: String,
    pub enrollment_id: String,
    pub lesson_id: String,
    pub time_spent: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletionResult {
    pub accepted: bool,
    /// True when the lesson was already complete and no request was sent.
    pub already_completed: bool,
    pub percentage: Percentage,
}

/// What the server told us after accepting a completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmitOutcome {
    /// Authoritative percentage, from the completion response or the re-fetch.
    pub percentage: Option<f64>,
    /// Completed ids reported by the re-fetch, if one happened.
    pub server_completed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Preparation {
    /// Lesson already complete: succeed without a network call.
    AlreadyCompleted(CompletionResult),
    /// Lesson is accessible and must be sent.
    Send,
}

/// Local checks only. Idempotence is checked before gating.
pub fn prepare(tracker: &ProgressTracker, lesson_id: &str) -> Result<Preparation, ProgressionError> {
    if tracker.is_completed(lesson_id) {
        debug!("Lesson {lesson_id} already completed; skipping request");
        return Ok(Preparation::AlreadyCompleted(CompletionResult {
            accepted: true,
            already_completed: true,
            percentage: tracker.percentage(),
        }));
    }
    if !tracker.is_lesson_id_accessible(lesson_id) {
        return Err(ProgressionError::InaccessibleLesson {
            lesson_id: lesson_id.to_string(),
        });
    }
    Ok(Preparation::Send)
}

/// Sends the completion. Never retries; any failure is transient for the caller.
pub async fn submit(
    api: &dyn CourseApi,
    request: &CompletionRequest,
) -> Result<SubmitOutcome, ProgressionError> {
    let body = CompleteLessonRequest {
        lesson_id: request.lesson_id.clone(),
        time_spent: request.time_spent,
    };

    let response = api
        .mark_lesson_complete(&request.enrollment_id, &body)
        .await
        .map_err(|e| {
            warn!("Completing lesson {} failed: {e}", request.lesson_id);
            ProgressionError::TransientNetworkFailure(e.to_string())
        })?;

    if let Some(progress) = response.progress {
        return Ok(SubmitOutcome {
            percentage: Some(progress),
            server_completed: Vec::new(),
        });
    }

    // Server accepted but omitted the percentage: fetch the record of truth.
    match api
        .fetch_progress(&request.course_id, &request.learner_id)
        .await
    {
        Ok(progress) => Ok(SubmitOutcome {
            percentage: progress.enrollment.progress_percentage,
            server_completed: progress
                .completed_lesson_ids()
                .map(str::to_string)
                .collect(),
        }),
        Err(e) => {
            warn!(
                "Lesson {} accepted but progress re-fetch failed: {e}",
                request.lesson_id
            );
            Ok(SubmitOutcome::default())
        }
    }
}

/// Commits an accepted completion to the tracker.
pub fn apply(
    tracker: &mut ProgressTracker,
    lesson_id: &str,
    outcome: SubmitOutcome,
) -> CompletionResult {
    tracker.record_completed(lesson_id);
    tracker.merge_completed(outcome.server_completed);
    match outcome.percentage {
        Some(p) => tracker.adopt_authoritative(p),
        None => tracker.clear_authoritative(),
    }
    CompletionResult {
        accepted: true,
        already_completed: false,
        percentage: tracker.percentage(),
    }
}

/// Convenience wrapper running prepare/submit/apply against a tracker the caller owns.
pub struct CompletionMutator<'a> {
    api: &'a dyn CourseApi,
}

impl<'a> CompletionMutator<'a> {
    pub fn new(api: &'a dyn CourseApi) -> Self {
        Self { api }
    }

    pub async fn mark_complete(
        &self,
        tracker: &mut ProgressTracker,
        request: &CompletionRequest,
    ) -> Result<CompletionResult, ProgressionError> {
        if let Preparation::AlreadyCompleted(result) = prepare(tracker, &request.lesson_id)? {
            return Ok(result);
        }
        let outcome = submit(self.api, request).await?;
        let result = apply(tracker, &request.lesson_id, outcome);
        info!(
            "Lesson {} completed for enrollment {} ({:?})",
            request.lesson_id, request.enrollment_id, result.percentage
        );
        Ok(result)
    }
}
