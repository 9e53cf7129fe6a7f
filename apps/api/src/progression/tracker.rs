//! Progress Tracker: pure gating and percentage computations over a resolved
//! curriculum and a monotonically growing set of completed lesson ids.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::curriculum::ResolvedCurriculum;
use crate::models::course::ProgressResponse;

/// Completion percentage tagged with its provenance.
/// `Estimated` is the local ratio; `Authoritative` came from the enrollment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Percentage {
    Estimated(u8),
    Authoritative(u8),
}

impl Percentage {
    pub fn value(self) -> u8 {
        match self {
            Percentage::Estimated(v) | Percentage::Authoritative(v) => v,
        }
    }

    pub fn is_authoritative(self) -> bool {
        matches!(self, Percentage::Authoritative(_))
    }
}

/// Clamps a server-provided percentage into `[0, 100]`.
fn clamp_percentage(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.clamp(0.0, 100.0).floor() as u8
}

#[derive(Debug, Clone, Serialize)]
pub struct LessonState {
    pub id: String,
    pub title: String,
    pub accessible: bool,
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModuleState {
    pub id: String,
    pub title: String,
    pub unlocked: bool,
    pub completed: bool,
    pub lessons: Vec<LessonState>,
}

/// Position of a lesson inside the curriculum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LessonPosition {
    pub module_index: usize,
    pub lesson_index: usize,
    pub lesson_id: String,
}

/// Read-only view of the tracker, one entry per module in curriculum order.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressState {
    pub modules: Vec<ModuleState>,
    pub percentage: Percentage,
    pub completed_lessons: usize,
    pub total_lessons: usize,
    pub next_lesson: Option<LessonPosition>,
}

/// Owns the completed-lesson set and percentage for one (learner, course) view.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    curriculum: ResolvedCurriculum,
    completed: BTreeSet<String>,
    authoritative: Option<u8>,
}

impl ProgressTracker {
    pub fn new(curriculum: ResolvedCurriculum) -> Self {
        Self {
            curriculum,
            completed: BTreeSet::new(),
            authoritative: None,
        }
    }

    pub fn with_completed<I, S>(curriculum: ResolvedCurriculum, completed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tracker = Self::new(curriculum);
        tracker.merge_completed(completed);
        tracker
    }

    /// Builds a tracker from the remote enrollment/progress record.
    pub fn from_progress(curriculum: ResolvedCurriculum, progress: &ProgressResponse) -> Self {
        let mut tracker = Self::with_completed(curriculum, progress.completed_lesson_ids());
        if let Some(p) = progress.enrollment.progress_percentage {
            tracker.adopt_authoritative(p);
        }
        tracker
    }

    pub fn curriculum(&self) -> &ResolvedCurriculum {
        &self.curriculum
    }

    pub fn completed(&self) -> &BTreeSet<String> {
        &self.completed
    }

    pub fn is_completed(&self, lesson_id: &str) -> bool {
        self.completed.contains(lesson_id)
    }

    /// True iff every lesson of every preceding module is completed.
    /// Module 0 is always unlocked; indexes past the end never are.
    pub fn is_module_unlocked(&self, module_index: usize) -> bool {
        if module_index >= self.curriculum.modules.len() {
            return false;
        }
        (0..module_index).all(|i| self.is_module_completed(i))
    }

    pub fn is_module_completed(&self, module_index: usize) -> bool {
        self.curriculum
            .modules
            .get(module_index)
            .map(|m| m.lessons.iter().all(|l| self.completed.contains(&l.id)))
            .unwrap_or(false)
    }

    /// Module gating and in-module left-to-right gating must both pass.
    pub fn is_lesson_accessible(&self, module_index: usize, lesson_index: usize) -> bool {
        let Some(module) = self.curriculum.modules.get(module_index) else {
            return false;
        };
        if lesson_index >= module.lessons.len() || !self.is_module_unlocked(module_index) {
            return false;
        }
        lesson_index == 0 || self.completed.contains(&module.lessons[lesson_index - 1].id)
    }

    /// Same as `is_lesson_accessible`, addressed by id. Unknown ids are never accessible.
    pub fn is_lesson_id_accessible(&self, lesson_id: &str) -> bool {
        self.curriculum
            .locate(lesson_id)
            .map(|(mi, li)| self.is_lesson_accessible(mi, li))
            .unwrap_or(false)
    }

    /// Number of curriculum lessons in the completed set. Foreign ids are ignored.
    pub fn completed_count(&self) -> usize {
        self.curriculum
            .lessons()
            .filter(|l| self.completed.contains(&l.id))
            .count()
    }

    /// Integer floor of the completed ratio. Empty curricula report 0.
    pub fn estimated_percentage(&self) -> u8 {
        let total = self.curriculum.lesson_count();
        if total == 0 {
            return 0;
        }
        (self.completed_count() * 100 / total) as u8
    }

    /// Authoritative value when known, local estimate otherwise. Never both.
    ///
    /// The displayed value never exceeds the completed-lesson ratio: a server
    /// value ahead of the local set is capped until the missing completions
    /// are folded in, and an empty curriculum stays at 0.
    pub fn percentage(&self) -> Percentage {
        let estimated = self.estimated_percentage();
        match self.authoritative {
            Some(v) => Percentage::Authoritative(v.min(estimated)),
            None => Percentage::Estimated(estimated),
        }
    }

    pub fn adopt_authoritative(&mut self, raw: f64) {
        self.authoritative = Some(clamp_percentage(raw));
    }

    /// Drops the authoritative value so the estimate is shown until a re-fetch lands.
    pub fn clear_authoritative(&mut self) {
        self.authoritative = None;
    }

    /// Adds one lesson id. Returns false if it was already present.
    pub fn record_completed(&mut self, lesson_id: &str) -> bool {
        self.completed.insert(lesson_id.to_string())
    }

    /// Folds ids into the set. Nothing is ever removed.
    pub fn merge_completed<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.completed.extend(ids.into_iter().map(Into::into));
    }

    /// First accessible lesson that is not yet completed, in curriculum order.
    pub fn next_lesson(&self) -> Option<LessonPosition> {
        self.curriculum
            .modules
            .iter()
            .enumerate()
            .flat_map(|(mi, m)| m.lessons.iter().enumerate().map(move |(li, l)| (mi, li, l)))
            .find(|(mi, li, l)| !self.completed.contains(&l.id) && self.is_lesson_accessible(*mi, *li))
            .map(|(mi, li, l)| LessonPosition {
                module_index: mi,
                lesson_index: li,
                lesson_id: l.id.clone(),
            })
    }

    pub fn state(&self) -> ProgressState {
        let modules = self
            .curriculum
            .modules
            .iter()
            .enumerate()
            .map(|(mi, module)| ModuleState {
                id: module.id.clone(),
                title: module.title.clone(),
                unlocked: self.is_module_unlocked(mi),
                completed: self.is_module_completed(mi),
                lessons: module
                    .lessons
                    .iter()
                    .enumerate()
                    .map(|(li, lesson)| LessonState {
                        id: lesson.id.clone(),
                        title: lesson.title.clone(),
                        accessible: self.is_lesson_accessible(mi, li),
                        completed: self.completed.contains(&lesson.id),
                    })
                    .collect(),
            })
            .collect();

        ProgressState {
            modules,
            percentage: self.percentage(),
            completed_lessons: self.completed_count(),
            total_lessons: self.curriculum.lesson_count(),
            next_lesson: self.next_lesson(),
        }
    }
}

/// One-shot state computation for callers that do not keep a tracker around.
pub fn compute_state<I, S>(curriculum: &ResolvedCurriculum, completed: I) -> ProgressState
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ProgressTracker::with_completed(curriculum.clone(), completed).state()
}
