//! Course API client: the single point of entry for calls to the remote course API.
//!
//! The remote API is the system of record for courses, enrollments, progress and
//! reviews. Nothing here retries: a failed request is surfaced to the caller,
//! who decides whether the learner retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::debug;

use crate::models::course::{
    CompleteLessonRequest, CompleteLessonResponse, Course, ProgressResponse,
};
use crate::models::review::{Review, ReviewRequest};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Error bodies carry a human-readable `error` field; some endpoints use `message`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(alias = "message")]
    error: String,
}

/// Remote course API contract. Carried in `AppState` as `Arc<dyn CourseApi>`.
#[async_trait]
pub trait CourseApi: Send + Sync {
    async fn fetch_course(&self, course_id: &str) -> Result<Course, ApiError>;

    async fn fetch_progress(
        &self,
        course_id: &str,
        learner_id: &str,
    ) -> Result<ProgressResponse, ApiError>;

    async fn mark_lesson_complete(
        &self,
        enrollment_id: &str,
        request: &CompleteLessonRequest,
    ) -> Result<CompleteLessonResponse, ApiError>;

    /// Returns the course with its updated aggregate rating.
    async fn submit_review(
        &self,
        course_id: &str,
        request: &ReviewRequest,
    ) -> Result<Course, ApiError>;

    async fn list_reviews(&self, course_id: &str) -> Result<Vec<Review>, ApiError>;
}

/// `CourseApi` over HTTP + JSON.
#[derive(Clone)]
pub struct HttpCourseApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpCourseApi {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, ApiError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.header("accept", "application/json").send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Course API responded {} ({} bytes)", status, body.len());
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl CourseApi for HttpCourseApi {
    async fn fetch_course(&self, course_id: &str) -> Result<Course, ApiError> {
        self.send(self.client.get(self.url(&format!("courses/{course_id}"))))
            .await
    }

    async fn fetch_progress(
        &self,
        course_id: &str,
        learner_id: &str,
    ) -> Result<ProgressResponse, ApiError> {
        self.send(
            self.client
                .get(self.url(&format!("courses/{course_id}/progress")))
                .query(&[("user_id", learner_id)]),
        )
        .await
    }

    async fn mark_lesson_complete(
        &self,
        enrollment_id: &str,
        request: &CompleteLessonRequest,
    ) -> Result<CompleteLessonResponse, ApiError> {
        self.send(
            self.client
                .post(self.url(&format!("enrollments/{enrollment_id}/complete-lesson")))
                .json(request),
        )
        .await
    }

    async fn submit_review(
        &self,
        course_id: &str,
        request: &ReviewRequest,
    ) -> Result<Course, ApiError> {
        self.send(
            self.client
                .post(self.url(&format!("courses/{course_id}/reviews")))
                .json(request),
        )
        .await
    }

    async fn list_reviews(&self, course_id: &str) -> Result<Vec<Review>, ApiError> {
        self.send(self.client.get(self.url(&format!("courses/{course_id}/reviews"))))
            .await
    }
}
