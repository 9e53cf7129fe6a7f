use serde::{Deserialize, Serialize};

use crate::models::{de_id, de_lenient_f64};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseType {
    #[default]
    Free,
    Premium,
}

/// A lesson as carried on the remote course record (generic, single-level courses).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseLesson {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
}

/// Course record as returned by the remote course API.
/// Rating fields are owned by the remote system and replaced wholesale after a review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(rename = "type", default)]
    pub course_type: CourseType,
    #[serde(default)]
    pub lessons: Option<Vec<CourseLesson>>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub ratings_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    #[serde(deserialize_with = "de_id")]
    pub course_id: String,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub progress_percentage: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressDetail {
    #[serde(deserialize_with = "de_id")]
    pub lesson_id: String,
    #[serde(default)]
    pub is_completed: bool,
}

/// Enrollment plus per-lesson completion facts for one (learner, course) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressResponse {
    pub enrollment: Enrollment,
    #[serde(default)]
    pub progress_details: Vec<ProgressDetail>,
}

impl ProgressResponse {
    /// Lesson ids the server reports as completed.
    pub fn completed_lesson_ids(&self) -> impl Iterator<Item = &str> {
        self.progress_details
            .iter()
            .filter(|d| d.is_completed)
            .map(|d| d.lesson_id.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteLessonRequest {
    pub lesson_id: String,
    pub time_spent: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompleteLessonResponse {
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub progress: Option<f64>,
}
