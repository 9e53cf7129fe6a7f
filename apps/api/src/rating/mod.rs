//! Rating Aggregator: turns a continuous average rating into five discrete symbols.
//!
//! A fractional part of 0.3 or more shows a half symbol; anything below is dropped.
//! This threshold is a product decision and is not nearest-half rounding.

use serde::Serialize;

use crate::models::course::Course;

pub const HALF_STAR_THRESHOLD: f64 = 0.3;
pub const MAX_STARS: u8 = 5;

// Absorbs binary representation error (3.3 - 3.0 == 0.2999...).
const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StarSymbol {
    Full,
    Half,
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StarDisplay {
    pub full: u8,
    pub half: bool,
}

impl StarDisplay {
    /// Numeric label, one decimal place: `3.5`, `4.0`.
    pub fn label(&self) -> String {
        let value = f64::from(self.full) + if self.half { 0.5 } else { 0.0 };
        format!("{value:.1}")
    }

    pub fn symbols(&self) -> [StarSymbol; MAX_STARS as usize] {
        let mut symbols = [StarSymbol::Empty; MAX_STARS as usize];
        for (i, symbol) in symbols.iter_mut().enumerate() {
            let i = i as u8;
            if i < self.full {
                *symbol = StarSymbol::Full;
            } else if i == self.full && self.half {
                *symbol = StarSymbol::Half;
            }
        }
        symbols
    }
}

/// `None` means render nothing (no ratings yet), never a zero-star row.
pub fn to_stars(average: f64) -> Option<StarDisplay> {
    if !average.is_finite() || average <= 0.0 {
        return None;
    }
    let average = average.min(f64::from(MAX_STARS));
    let full = average.floor();
    let frac = average - full;
    Some(StarDisplay {
        full: full as u8,
        half: frac + EPSILON >= HALF_STAR_THRESHOLD,
    })
}

/// Star display for a course record; absent when it has no ratings.
pub fn course_stars(course: &Course) -> Option<StarDisplay> {
    if course.ratings_count == 0 {
        return None;
    }
    course.rating.and_then(to_stars)
}

/// Display payload consumed by the course view.
#[derive(Debug, Clone, Serialize)]
pub struct RatingSummary {
    pub stars: StarDisplay,
    pub symbols: [StarSymbol; MAX_STARS as usize],
    pub label: String,
    pub ratings_count: u32,
}

pub fn rating_summary(course: &Course) -> Option<RatingSummary> {
    course_stars(course).map(|stars| RatingSummary {
        symbols: stars.symbols(),
        label: stars.label(),
        stars,
        ratings_count: course.ratings_count,
    })
}
