use serde::{Serialize, Serializer};

use crate::models::review::Review;
use crate::review::ReviewError;

/// Maximum comment length, in characters, enforced while the learner types.
pub const MAX_COMMENT_CHARS: usize = 100;

const SYMBOLS: usize = 5;

/// A rating on the half-star lattice `{0.5, 1.0, ..., 5.0}`, stored as half-steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Rating(u8);

impl Rating {
    pub fn value(self) -> f64 {
        f64::from(self.0) / 2.0
    }

    /// Rating captured from a click on one of five symbols: the left half of
    /// symbol `i` (0-based) means `i + 0.5`, the right half means `i + 1`.
    pub fn from_pointer(symbol_index: usize, left_half: bool) -> Result<Self, ReviewError> {
        if symbol_index >= SYMBOLS {
            return Err(ReviewError::InvalidRating(symbol_index as f64 + 1.0));
        }
        let halves = symbol_index * 2 + if left_half { 1 } else { 2 };
        Ok(Rating(halves as u8))
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.value())
    }
}

/// Validates a raw rating against the half-star lattice.
pub fn normalize_rating(raw: f64) -> Result<Rating, ReviewError> {
    if !raw.is_finite() {
        return Err(ReviewError::InvalidRating(raw));
    }
    let doubled = raw * 2.0;
    let halves = doubled.round();
    if (doubled - halves).abs() > 1e-9 || !(1.0..=10.0).contains(&halves) {
        return Err(ReviewError::InvalidRating(raw));
    }
    Ok(Rating(halves as u8))
}

/// Reviewing requires a fully completed course and no prior review.
pub fn can_review(progress_percentage: u8, has_existing_review: bool) -> bool {
    progress_percentage == 100 && !has_existing_review
}

/// Applied to the comment box on every keystroke. Counts characters, not bytes.
pub fn truncate_comment_input(input: &str) -> String {
    input.chars().take(MAX_COMMENT_CHARS).collect()
}

/// Submission-time check. Over-long comments are rejected, never truncated here.
pub fn validate_comment(comment: Option<&str>) -> Result<Option<String>, ReviewError> {
    let Some(comment) = comment.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(None);
    };
    if comment.chars().count() > MAX_COMMENT_CHARS {
        return Err(ReviewError::CommentTooLong {
            max: MAX_COMMENT_CHARS,
        });
    }
    Ok(Some(comment.to_string()))
}

/// Per-view review state. Once a review is known to exist the gate stays closed.
#[derive(Debug, Clone, Default)]
pub struct ReviewGate {
    has_existing_review: bool,
}

impl ReviewGate {
    /// Opens the gate state from the course's review list.
    pub fn from_reviews(reviews: &[Review], learner_id: &str) -> Self {
        Self {
            has_existing_review: reviews.iter().any(|r| r.user.id == learner_id),
        }
    }

    pub fn has_existing_review(&self) -> bool {
        self.has_existing_review
    }

    pub fn can_review(&self, progress_percentage: u8) -> bool {
        can_review(progress_percentage, self.has_existing_review)
    }

    /// Same decision as `can_review`, with the reason on denial.
    pub fn check(&self, progress_percentage: u8) -> Result<(), ReviewError> {
        if self.has_existing_review {
            return Err(ReviewError::DuplicateReview);
        }
        if progress_percentage != 100 {
            return Err(ReviewError::NotEligible {
                progress: progress_percentage,
            });
        }
        Ok(())
    }

    /// Closes the gate permanently after a successful submission.
    pub fn record_submitted(&mut self) {
        self.has_existing_review = true;
    }
}
