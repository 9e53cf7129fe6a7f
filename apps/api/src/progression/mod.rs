//! Progression: lesson/module gating, completion percentage, and the
//! completion mutator that writes through to the remote API.

pub mod mutator;
pub mod tracker;

use thiserror::Error;

pub use mutator::{CompletionMutator, CompletionRequest, CompletionResult, SubmitOutcome};
pub use tracker::{compute_state, Percentage, ProgressState, ProgressTracker};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProgressionError {
    /// Module or predecessor gating is not satisfied. Never sent over the wire.
    #[error("Lesson {lesson_id} is not accessible yet")]
    InaccessibleLesson { lesson_id: String },

    #[error("A completion request for lesson {lesson_id} is already in flight")]
    RequestInFlight { lesson_id: String },

    /// The response belongs to a course/enrollment that is no longer active.
    #[error("Discarded response for enrollment {enrollment_id}: view moved on")]
    StaleResponse { enrollment_id: String },

    #[error("Network failure: {0}")]
    TransientNetworkFailure(String),
}
