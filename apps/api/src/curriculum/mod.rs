// Curriculum: the static catalog and the title-based resolver that picks
// an ordered module list for a course.

pub mod catalog;
pub mod resolver;

pub use catalog::{CurriculumCatalog, CurriculumId, Lesson, Module};
pub use resolver::{classify, resolve, CurriculumSource, ResolvedCurriculum};
