use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::course_view::{CourseView, ViewOwner};

/// Views untouched for this long are dropped on the next insert.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

struct Entry {
    owner: ViewOwner,
    view: Arc<Mutex<CourseView>>,
    last_access: Instant,
}

impl Entry {
    fn is_idle(&self, now: Instant, ttl: Duration) -> bool {
        now.duration_since(self.last_access) >= ttl
    }
}

/// Open course views keyed by view id. A view's mutex is never held across a
/// network call; handlers lock, take what they need, and release.
///
/// At most one view exists per (learner, course): opening a second one replaces
/// the first. Views idle for longer than `idle_ttl` are evicted.
#[derive(Clone)]
pub struct ViewRegistry {
    views: Arc<RwLock<HashMap<Uuid, Entry>>>,
    idle_ttl: Duration,
}

impl Default for ViewRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TTL)
    }
}

impl ViewRegistry {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            views: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    pub async fn insert(&self, view: CourseView) -> Uuid {
        let id = Uuid::new_v4();
        let owner = view.owner();
        let now = Instant::now();

        let mut views = self.views.write().await;
        let before = views.len();
        views.retain(|old_id, entry| {
            if entry.owner == owner {
                info!(
                    "Replacing view {old_id} for learner {} on course {}",
                    owner.learner_id, owner.course_id
                );
                return false;
            }
            !entry.is_idle(now, self.idle_ttl)
        });
        if views.len() < before {
            debug!("Dropped {} view(s) on insert", before - views.len());
        }

        views.insert(
            id,
            Entry {
                owner,
                view: Arc::new(Mutex::new(view)),
                last_access: now,
            },
        );
        id
    }

    /// Returns the view and marks it as used. Idle views are removed instead.
    pub async fn get(&self, id: Uuid) -> Option<Arc<Mutex<CourseView>>> {
        let now = Instant::now();
        let mut views = self.views.write().await;
        if views.get(&id)?.is_idle(now, self.idle_ttl) {
            views.remove(&id);
            info!("View {id} expired after {:?} idle", self.idle_ttl);
            return None;
        }
        let entry = views.get_mut(&id)?;
        entry.last_access = now;
        Some(entry.view.clone())
    }

    /// True while the view is registered and not idle. Does not touch it.
    pub async fn contains(&self, id: Uuid) -> bool {
        let now = Instant::now();
        self.views
            .read()
            .await
            .get(&id)
            .is_some_and(|entry| !entry.is_idle(now, self.idle_ttl))
    }

    /// Records that the view now belongs to `owner`, dropping any other view
    /// with the same owner. Returns false if the view is gone.
    pub async fn rebind(&self, id: Uuid, owner: ViewOwner) -> bool {
        let mut views = self.views.write().await;
        if !views.contains_key(&id) {
            return false;
        }
        views.retain(|other, entry| *other == id || entry.owner != owner);
        if let Some(entry) = views.get_mut(&id) {
            entry.owner = owner;
            entry.last_access = Instant::now();
        }
        true
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.views.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.views.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::ResolvedCurriculum;
    use crate::models::course::{Enrollment, ProgressResponse};
    use crate::testing::cpp_course;

    fn view_for(learner_id: &str, course_id: &str) -> CourseView {
        let mut course = cpp_course();
        course.id = course_id.into();
        let progress = ProgressResponse {
            enrollment: Enrollment {
                id: format!("e-{course_id}"),
                course_id: course_id.into(),
                progress_percentage: None,
            },
            progress_details: vec![],
        };
        CourseView::new(learner_id, course, ResolvedCurriculum::empty(), &progress, &[])
    }

    fn view() -> CourseView {
        view_for("42", "7")
    }

    #[tokio::test]
    async fn test_insert_get_remove() {
        let registry = ViewRegistry::default();
        let id = registry.insert(view()).await;
        assert_eq!(registry.len().await, 1);
        assert!(registry.get(id).await.is_some());
        assert!(registry.contains(id).await);
        assert!(registry.remove(id).await);
        assert!(!registry.remove(id).await);
        assert!(registry.get(id).await.is_none());
        assert!(!registry.contains(id).await);
    }

    #[tokio::test]
    async fn test_reopening_same_course_replaces_view() {
        let registry = ViewRegistry::default();
        let first = registry.insert(view()).await;
        let second = registry.insert(view()).await;
        assert_ne!(first, second);
        assert_eq!(registry.len().await, 1);
        assert!(registry.get(first).await.is_none());
        assert!(registry.get(second).await.is_some());

        // Other learners and other courses keep their own views.
        registry.insert(view_for("43", "7")).await;
        registry.insert(view_for("42", "8")).await;
        assert_eq!(registry.len().await, 3);
    }

    #[tokio::test]
    async fn test_repeated_opens_stay_bounded() {
        let registry = ViewRegistry::default();
        for _ in 0..50 {
            registry.insert(view()).await;
        }
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_views_evicted() {
        let registry = ViewRegistry::new(Duration::from_secs(60));
        let idle = registry.insert(view_for("42", "7")).await;
        let active = registry.insert(view_for("43", "7")).await;

        tokio::time::advance(Duration::from_secs(45)).await;
        assert!(registry.get(active).await.is_some());

        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(!registry.contains(idle).await);
        assert!(registry.contains(active).await);

        // The next insert sweeps the idle view out.
        registry.insert(view_for("44", "7")).await;
        assert_eq!(registry.len().await, 2);
        assert!(registry.get(idle).await.is_none());
        assert!(registry.get(active).await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_expires_idle_view() {
        let registry = ViewRegistry::new(Duration::from_secs(60));
        let id = registry.insert(view()).await;
        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(registry.get(id).await.is_none());
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn test_rebind_replaces_owner() {
        let registry = ViewRegistry::default();
        let on_python = registry.insert(view_for("42", "8")).await;
        let id = registry.insert(view_for("42", "7")).await;

        assert!(
            registry
                .rebind(
                    id,
                    ViewOwner {
                        learner_id: "42".into(),
                        course_id: "8".into(),
                    },
                )
                .await
        );
        assert_eq!(registry.len().await, 1);
        assert!(registry.get(on_python).await.is_none());

        // The rebound view is now the one a reopen of course 7 leaves alone.
        registry.insert(view_for("42", "7")).await;
        assert!(registry.get(id).await.is_some());
        assert!(!registry.rebind(Uuid::new_v4(), view().owner()).await);
    }
}
