//! Axum route handlers for the course player.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::course_view::{CompletionStep, CourseView, ViewSnapshot};
use crate::curriculum::{resolve, ResolvedCurriculum};
use crate::errors::AppError;
use crate::progression::{mutator, CompletionResult, Percentage, ProgressionError};
use crate::review::ReviewError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct OpenViewRequest {
    pub course_id: String,
    pub learner_id: String,
}

#[derive(Debug, Serialize)]
pub struct OpenViewResponse {
    pub view_id: Uuid,
    pub snapshot: ViewSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct RebindViewRequest {
    pub course_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompleteLessonBody {
    #[serde(default)]
    pub time_spent: u32,
}

#[derive(Debug, Serialize)]
pub struct LessonCompletionResponse {
    pub result: CompletionResult,
    pub snapshot: ViewSnapshot,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub percentage: Percentage,
    pub snapshot: ViewSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct SubmitReviewBody {
    pub rating: f64,
    #[serde(default)]
    pub comment: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/courses/:course_id/curriculum
pub async fn handle_get_curriculum(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<ResolvedCurriculum>, AppError> {
    let course = state.api.fetch_course(&course_id).await?;
    Ok(Json(resolve(&state.catalog, &course)))
}

/// POST /api/v1/views
pub async fn handle_open_view(
    State(state): State<AppState>,
    Json(req): Json<OpenViewRequest>,
) -> Result<(StatusCode, Json<OpenViewResponse>), AppError> {
    if req.course_id.trim().is_empty() || req.learner_id.trim().is_empty() {
        return Err(AppError::Validation(
            "course_id and learner_id are required".to_string(),
        ));
    }

    let (course, progress, reviews) = tokio::try_join!(
        state.api.fetch_course(&req.course_id),
        state.api.fetch_progress(&req.course_id, &req.learner_id),
        state.api.list_reviews(&req.course_id),
    )?;

    let curriculum = resolve(&state.catalog, &course);
    let view = CourseView::new(req.learner_id, course, curriculum, &progress, &reviews);
    let snapshot = view.snapshot();
    let view_id = state.views.insert(view).await;

    info!(
        "Opened view {view_id} for course {} (enrollment {})",
        snapshot.course_id, snapshot.enrollment_id
    );
    Ok((
        StatusCode::CREATED,
        Json(OpenViewResponse { view_id, snapshot }),
    ))
}

/// GET /api/v1/views/:view_id
pub async fn handle_get_view(
    State(state): State<AppState>,
    Path(view_id): Path<Uuid>,
) -> Result<Json<ViewSnapshot>, AppError> {
    let view = find_view(&state, view_id).await?;
    let snapshot = view.lock().await.snapshot();
    Ok(Json(snapshot))
}

/// PUT /api/v1/views/:view_id
///
/// Points an open view at another course. Requests still in flight for the
/// previous course are dropped when they come back.
pub async fn handle_rebind_view(
    State(state): State<AppState>,
    Path(view_id): Path<Uuid>,
    Json(req): Json<RebindViewRequest>,
) -> Result<Json<ViewSnapshot>, AppError> {
    if req.course_id.trim().is_empty() {
        return Err(AppError::Validation("course_id is required".to_string()));
    }
    let view = find_view(&state, view_id).await?;
    let learner_id = view.lock().await.learner_id().to_string();

    let (course, progress, reviews) = tokio::try_join!(
        state.api.fetch_course(&req.course_id),
        state.api.fetch_progress(&req.course_id, &learner_id),
        state.api.list_reviews(&req.course_id),
    )?;
    let curriculum = resolve(&state.catalog, &course);

    let (owner, snapshot) = {
        let mut guard = view.lock().await;
        guard.switch_course(course, curriculum, &progress, &reviews);
        (guard.owner(), guard.snapshot())
    };
    if !state.views.rebind(view_id, owner).await {
        return Err(AppError::NotFound(format!("View {view_id} not found")));
    }

    info!(
        "Rebound view {view_id} to course {} (enrollment {})",
        snapshot.course_id, snapshot.enrollment_id
    );
    Ok(Json(snapshot))
}

/// DELETE /api/v1/views/:view_id
pub async fn handle_close_view(
    State(state): State<AppState>,
    Path(view_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.views.remove(view_id).await {
        return Err(AppError::NotFound(format!("View {view_id} not found")));
    }
    info!("Closed view {view_id}");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/views/:view_id/lessons/:lesson_id/complete
pub async fn handle_complete_lesson(
    State(state): State<AppState>,
    Path((view_id, lesson_id)): Path<(Uuid, String)>,
    Json(body): Json<CompleteLessonBody>,
) -> Result<Json<LessonCompletionResponse>, AppError> {
    let view = find_view(&state, view_id).await?;

    let step = view.lock().await.begin_completion(&lesson_id, body.time_spent)?;
    let request = match step {
        CompletionStep::Done(result) => {
            let snapshot = view.lock().await.snapshot();
            return Ok(Json(LessonCompletionResponse { result, snapshot }));
        }
        CompletionStep::Pending(request) => request,
    };

    let outcome = mutator::submit(state.api.as_ref(), &request).await;

    if !state.views.contains(view_id).await {
        warn!(
            "Dropping completion of lesson {}: view {view_id} was closed",
            request.lesson_id
        );
        return Err(ProgressionError::StaleResponse {
            enrollment_id: request.enrollment_id,
        }
        .into());
    }

    let mut guard = view.lock().await;
    let result = guard.commit_completion(&request, outcome)?;
    Ok(Json(LessonCompletionResponse {
        result,
        snapshot: guard.snapshot(),
    }))
}

/// POST /api/v1/views/:view_id/progress/refresh
pub async fn handle_refresh_progress(
    State(state): State<AppState>,
    Path(view_id): Path<Uuid>,
) -> Result<Json<RefreshResponse>, AppError> {
    let view = find_view(&state, view_id).await?;
    let (key, learner_id) = {
        let guard = view.lock().await;
        (guard.key(), guard.learner_id().to_string())
    };

    let progress = state
        .api
        .fetch_progress(&key.course_id, &learner_id)
        .await
        .map_err(|e| ProgressionError::TransientNetworkFailure(e.to_string()))?;

    let mut guard = view.lock().await;
    let percentage = guard.refresh_progress(&key, &progress)?;
    Ok(Json(RefreshResponse {
        percentage,
        snapshot: guard.snapshot(),
    }))
}

/// POST /api/v1/views/:view_id/reviews
pub async fn handle_submit_review(
    State(state): State<AppState>,
    Path(view_id): Path<Uuid>,
    Json(body): Json<SubmitReviewBody>,
) -> Result<Json<ViewSnapshot>, AppError> {
    let view = find_view(&state, view_id).await?;

    let pending = view
        .lock()
        .await
        .begin_review(body.rating, body.comment.as_deref())?;

    let outcome = state
        .api
        .submit_review(&pending.key.course_id, &pending.request)
        .await;

    if !state.views.contains(view_id).await {
        warn!("Dropping review result: view {view_id} was closed");
        return Err(ReviewError::StaleResponse.into());
    }

    let mut guard = view.lock().await;
    guard.commit_review(&pending, outcome)?;
    Ok(Json(guard.snapshot()))
}

async fn find_view(
    state: &AppState,
    view_id: Uuid,
) -> Result<std::sync::Arc<tokio::sync::Mutex<CourseView>>, AppError> {
    state
        .views
        .get(view_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("View {view_id} not found")))
}
