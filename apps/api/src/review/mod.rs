//! Review Gate: decides whether a learner may review a course and validates
//! the rating and comment they submit.

pub mod gate;

use thiserror::Error;

pub use gate::{
    can_review, normalize_rating, truncate_comment_input, validate_comment, Rating, ReviewGate,
    MAX_COMMENT_CHARS,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReviewError {
    #[error("Invalid rating {0}: must be a multiple of 0.5 between 0.5 and 5.0")]
    InvalidRating(f64),

    #[error("A review for this course already exists")]
    DuplicateReview,

    #[error("The course must be 100% complete before it can be reviewed (currently {progress}%)")]
    NotEligible { progress: u8 },

    #[error("Comment exceeds {max} characters")]
    CommentTooLong { max: usize },

    #[error("A review submission is already in flight")]
    RequestInFlight,

    #[error("Discarded review response: view moved on")]
    StaleResponse,

    #[error("Network failure: {0}")]
    TransientNetworkFailure(String),
}
