//! Curriculum Resolver: selects the ordered module list for a course.
//!
//! Classification runs over one priority-ordered rule table shared by every caller.

use serde::Serialize;
use tracing::{debug, warn};

use crate::curriculum::catalog::{CurriculumCatalog, CurriculumId, Lesson, Module};
use crate::models::course::Course;

/// Module id used for the implicit single module of a generic course.
pub const GENERIC_MODULE_ID: &str = "modulo-1";

/// A keyword rule: matches when the lowercased title contains any of `any_of`
/// and none of `none_of`, each as a whole word (see `contains_keyword`).
struct KeywordRule {
    any_of: &'static [&'static str],
    none_of: &'static [&'static str],
    curriculum: CurriculumId,
}

// Evaluated top to bottom. More specific keywords must come first.
const RULES: &[KeywordRule] = &[
    KeywordRule {
        any_of: &["c++", "cpp"],
        none_of: &[],
        curriculum: CurriculumId::Cpp,
    },
    KeywordRule {
        any_of: &["c#", "csharp", "c sharp"],
        none_of: &[],
        curriculum: CurriculumId::CSharp,
    },
    KeywordRule {
        any_of: &["programación en c", "programacion en c", "lenguaje c"],
        none_of: &["c#", "c++"],
        curriculum: CurriculumId::C,
    },
    KeywordRule {
        any_of: &["spring boot", "springboot"],
        none_of: &[],
        curriculum: CurriculumId::SpringBoot,
    },
    KeywordRule {
        any_of: &["react"],
        none_of: &[],
        curriculum: CurriculumId::ReactAdvanced,
    },
    KeywordRule {
        any_of: &["node.js", "nodejs", "node js", "express"],
        none_of: &[],
        curriculum: CurriculumId::NodeExpress,
    },
    KeywordRule {
        any_of: &["javascript"],
        none_of: &[],
        curriculum: CurriculumId::JavaScript,
    },
    KeywordRule {
        any_of: &["python"],
        none_of: &[],
        curriculum: CurriculumId::Python,
    },
    KeywordRule {
        any_of: &["html", "css"],
        none_of: &[],
        curriculum: CurriculumId::HtmlCss,
    },
];

/// Where a resolved curriculum came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CurriculumSource {
    Catalog(CurriculumId),
    Generic,
}

/// Ordered module/lesson structure for one course.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedCurriculum {
    pub source: CurriculumSource,
    pub modules: Vec<Module>,
}

impl ResolvedCurriculum {
    pub fn empty() -> Self {
        Self {
            source: CurriculumSource::Generic,
            modules: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lesson_count() == 0
    }

    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    pub fn lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.modules.iter().flat_map(|m| m.lessons.iter())
    }

    /// Returns `(module_index, lesson_index)` of the first lesson with this id.
    pub fn locate(&self, lesson_id: &str) -> Option<(usize, usize)> {
        self.modules.iter().enumerate().find_map(|(mi, module)| {
            module
                .lessons
                .iter()
                .position(|l| l.id == lesson_id)
                .map(|li| (mi, li))
        })
    }
}

/// Classifies a course title against the keyword table.
pub fn classify(title: &str) -> Option<CurriculumId> {
    let title = title.to_lowercase();
    RULES
        .iter()
        .find(|rule| {
            rule.any_of.iter().any(|kw| contains_keyword(&title, kw))
                && !rule.none_of.iter().any(|kw| contains_keyword(&title, kw))
        })
        .map(|rule| rule.curriculum)
}

/// True if `keyword` occurs in `title` without a letter glued to either end.
///
/// Only ends that are themselves alphanumeric are checked, so `c++` still
/// matches `c++17`, and digits are not letters, so `css` matches `css3`.
/// `programación en c` does not match `programación en css`.
fn contains_keyword(title: &str, keyword: &str) -> bool {
    let check_start = keyword.chars().next().is_some_and(char::is_alphanumeric);
    let check_end = keyword.chars().next_back().is_some_and(char::is_alphanumeric);
    title.match_indices(keyword).any(|(start, _)| {
        let before = title[..start].chars().next_back();
        let after = title[start + keyword.len()..].chars().next();
        !(check_start && before.is_some_and(char::is_alphabetic))
            && !(check_end && after.is_some_and(char::is_alphabetic))
    })
}

/// Resolves the ordered curriculum for a course. Pure and deterministic.
pub fn resolve(catalog: &CurriculumCatalog, course: &Course) -> ResolvedCurriculum {
    if let Some(id) = classify(&course.title) {
        match catalog.get(id) {
            Some(modules) => {
                debug!("Course {} resolved to curriculum {:?}", course.id, id);
                let mut modules = modules.to_vec();
                sort_modules(&mut modules);
                return ResolvedCurriculum {
                    source: CurriculumSource::Catalog(id),
                    modules,
                };
            }
            None => warn!(
                "Course {} matched curriculum {:?} but the catalog has no entry; using generic lessons",
                course.id, id
            ),
        }
    }

    generic_curriculum(course)
}

/// Treats the course's own flat lesson list as one implicit module.
fn generic_curriculum(course: &Course) -> ResolvedCurriculum {
    let lessons: Vec<Lesson> = course
        .lessons
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|l| Lesson {
            id: l.id.clone(),
            title: l.title.clone(),
            content: l.content.clone(),
        })
        .collect();

    if lessons.is_empty() {
        return ResolvedCurriculum::empty();
    }

    ResolvedCurriculum {
        source: CurriculumSource::Generic,
        modules: vec![Module::new(GENERIC_MODULE_ID, course.title.clone(), lessons)],
    }
}

/// Sorts modules by the number embedded at the end of their id, so that
/// `modulo-2` precedes `modulo-10`. Ids without a number go last.
pub fn sort_modules(modules: &mut [Module]) {
    modules.sort_by(|a, b| {
        let ka = module_ordinal(&a.id);
        let kb = module_ordinal(&b.id);
        (ka.is_none(), ka)
            .cmp(&(kb.is_none(), kb))
            .then_with(|| a.id.cmp(&b.id))
    });
}

fn module_ordinal(id: &str) -> Option<u64> {
    let digits_start = id
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i)?;
    id[digits_start..].parse().ok()
}
