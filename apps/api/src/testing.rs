//! In-memory `CourseApi` used by unit and router tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::Mutex as AsyncMutex;

use crate::api_client::{ApiError, CourseApi};
use crate::models::course::{
    CompleteLessonRequest, CompleteLessonResponse, Course, CourseType, Enrollment, ProgressDetail,
    ProgressResponse,
};
use crate::models::review::{Review, ReviewRequest, ReviewUser};

pub const LEARNER_ID: &str = "42";
pub const ENROLLMENT_ID: &str = "e-7";

pub fn cpp_course() -> Course {
    Course {
        id: "7".into(),
        title: "Programación en C++ desde cero".into(),
        category: Some("programacion".into()),
        course_type: CourseType::Premium,
        lessons: None,
        rating: Some(4.3),
        ratings_count: 12,
    }
}

pub fn python_course() -> Course {
    Course {
        id: "8".into(),
        title: "Python desde cero".into(),
        category: Some("programacion".into()),
        course_type: CourseType::Free,
        lessons: None,
        rating: None,
        ratings_count: 0,
    }
}

pub fn review_by(learner_id: &str, rating: f64) -> Review {
    Review {
        id: format!("r-{learner_id}"),
        rating: Some(rating),
        comment: None,
        created_at: None,
        user: ReviewUser {
            id: learner_id.into(),
            name: "Estudiante".into(),
        },
    }
}

/// Keeps one enrollment per course for `LEARNER_ID` and answers like the
/// remote API would. Progress is tracked for the primary course only; other
/// courses added with `with_course` report an empty enrollment.
pub struct FakeCourseApi {
    pub course: Mutex<Course>,
    pub other_courses: Mutex<Vec<Course>>,
    pub completed: Mutex<Vec<String>>,
    pub reviews: Mutex<Vec<Review>>,
    pub total_lessons: usize,
    /// When false, completion responses omit `progress`.
    pub return_progress: AtomicBool,
    pub fail_complete: AtomicBool,
    pub fail_progress: AtomicBool,
    /// Status returned by review submission instead of success.
    pub review_failure: Mutex<Option<u16>>,
    /// Held by a test to park `mark_lesson_complete` after it is counted.
    pub complete_gate: AsyncMutex<()>,
    pub complete_calls: AtomicUsize,
    pub progress_calls: AtomicUsize,
    pub review_calls: AtomicUsize,
}

impl FakeCourseApi {
    pub fn new(course: Course, total_lessons: usize) -> Self {
        Self {
            course: Mutex::new(course),
            other_courses: Mutex::new(Vec::new()),
            completed: Mutex::new(Vec::new()),
            reviews: Mutex::new(Vec::new()),
            total_lessons,
            return_progress: AtomicBool::new(true),
            fail_complete: AtomicBool::new(false),
            fail_progress: AtomicBool::new(false),
            review_failure: Mutex::new(None),
            complete_gate: AsyncMutex::new(()),
            complete_calls: AtomicUsize::new(0),
            progress_calls: AtomicUsize::new(0),
            review_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_completed(self, ids: &[&str]) -> Self {
        self.completed
            .lock()
            .unwrap()
            .extend(ids.iter().map(|s| s.to_string()));
        self
    }

    pub fn with_course(self, course: Course) -> Self {
        self.other_courses.lock().unwrap().push(course);
        self
    }

    fn is_primary(&self, course_id: &str) -> bool {
        self.course.lock().unwrap().id == course_id
    }

    pub fn with_reviews(self, reviews: Vec<Review>) -> Self {
        *self.reviews.lock().unwrap() = reviews;
        self
    }

    fn percentage(&self) -> f64 {
        if self.total_lessons == 0 {
            return 0.0;
        }
        let done = self.completed.lock().unwrap().len();
        (done * 100 / self.total_lessons) as f64
    }

    fn unavailable() -> ApiError {
        ApiError::Api {
            status: 503,
            message: "Servicio no disponible".into(),
        }
    }
}

#[async_trait]
impl CourseApi for FakeCourseApi {
    async fn fetch_course(&self, course_id: &str) -> Result<Course, ApiError> {
        let primary = self.course.lock().unwrap().clone();
        if primary.id == course_id {
            return Ok(primary);
        }
        self.other_courses
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == course_id)
            .cloned()
            .ok_or_else(|| ApiError::Api {
                status: 404,
                message: format!("Curso {course_id} no encontrado"),
            })
    }

    async fn fetch_progress(
        &self,
        course_id: &str,
        _learner_id: &str,
    ) -> Result<ProgressResponse, ApiError> {
        self.progress_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_progress.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        let enrollment_id = format!("e-{course_id}");
        if !self.is_primary(course_id) {
            return Ok(ProgressResponse {
                enrollment: Enrollment {
                    id: enrollment_id,
                    course_id: course_id.into(),
                    progress_percentage: Some(0.0),
                },
                progress_details: Vec::new(),
            });
        }
        let progress_details = self
            .completed
            .lock()
            .unwrap()
            .iter()
            .map(|id| ProgressDetail {
                lesson_id: id.clone(),
                is_completed: true,
            })
            .collect();
        Ok(ProgressResponse {
            enrollment: Enrollment {
                id: enrollment_id,
                course_id: course_id.into(),
                progress_percentage: Some(self.percentage()),
            },
            progress_details,
        })
    }

    async fn mark_lesson_complete(
        &self,
        _enrollment_id: &str,
        request: &CompleteLessonRequest,
    ) -> Result<CompleteLessonResponse, ApiError> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        let _gate = self.complete_gate.lock().await;
        if self.fail_complete.load(Ordering::SeqCst) {
            return Err(Self::unavailable());
        }
        {
            let mut completed = self.completed.lock().unwrap();
            if !completed.contains(&request.lesson_id) {
                completed.push(request.lesson_id.clone());
            }
        }
        let progress = self
            .return_progress
            .load(Ordering::SeqCst)
            .then(|| self.percentage());
        Ok(CompleteLessonResponse { progress })
    }

    async fn submit_review(
        &self,
        _course_id: &str,
        request: &ReviewRequest,
    ) -> Result<Course, ApiError> {
        self.review_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = *self.review_failure.lock().unwrap() {
            return Err(ApiError::Api {
                status,
                message: "Ya has reseñado este curso".into(),
            });
        }
        self.reviews
            .lock()
            .unwrap()
            .push(review_by(LEARNER_ID, request.rating));
        let mut course = self.course.lock().unwrap();
        let total = course.rating.unwrap_or(0.0) * f64::from(course.ratings_count) + request.rating;
        course.ratings_count += 1;
        course.rating = Some(total / f64::from(course.ratings_count));
        Ok(course.clone())
    }

    async fn list_reviews(&self, _course_id: &str) -> Result<Vec<Review>, ApiError> {
        Ok(self.reviews.lock().unwrap().clone())
    }
}
