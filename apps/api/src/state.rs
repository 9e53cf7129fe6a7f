use std::sync::Arc;
use std::time::Duration;

use crate::api_client::CourseApi;
use crate::course_view::ViewRegistry;
use crate::curriculum::CurriculumCatalog;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Remote course API. Default: `HttpCourseApi`.
    pub api: Arc<dyn CourseApi>,
    /// Built once at startup; read-only afterwards.
    pub catalog: Arc<CurriculumCatalog>,
    /// Open course views, one per (learner, course).
    pub views: ViewRegistry,
}

impl AppState {
    pub fn new(api: Arc<dyn CourseApi>, catalog: CurriculumCatalog, view_idle_ttl: Duration) -> Self {
        Self {
            api,
            catalog: Arc::new(catalog),
            views: ViewRegistry::new(view_idle_ttl),
        }
    }
}
