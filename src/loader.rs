//! Projects a [`Course`] into a [`DocumentStore`].
//!
//! The walk is depth-first and strictly sequential: Level, then each of its
//! Modules followed by the Module's synthesized Section and its Lessons. Each
//! write completes before the next starts and the first failure ends the load.
//! Documents written before the failure stay in the store; every write is a
//! create-or-replace at a derived path, so running the load again is safe.

use std::fmt::{Display, Formatter};

use log::info;
use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;
use crate::course_model::{
    Course, Lesson, Level, Module, Section, LESSON_CONTENT_TYPE, LESSON_DESCRIPTION, LESSON_VIDEO_URL,
};
use crate::document_path::DocumentPath;
use crate::document_store::{DocumentStore, CREATED_AT, UPDATED_AT};
use crate::local_db_model::{FieldValue, Fields};

pub const COURSES: &str = "courses";
pub const LEVELS: &str = "levels";
pub const MODULES: &str = "modules";
pub const SECTIONS: &str = "sections";
pub const LESSONS: &str = "lessons";

/// Counts of documents actually written by [`load`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub levels: usize,
    pub modules: usize,
    pub sections: usize,
    pub lessons: usize,
}

impl LoadSummary {
    pub fn documents(&self) -> usize {
        self.levels + self.modules + self.sections + self.lessons
    }
}

impl Display for LoadSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} levels, {} modules, {} sections, {} lessons",
            self.levels, self.modules, self.sections, self.lessons
        )
    }
}

/// A store write that failed, with the path it was aimed at.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteError {
    pub path: DocumentPath,
    pub cause: AppResponse,
}

impl Display for WriteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to write {}: {}", self.path, self.cause)
    }
}

impl std::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

/// Keeps the store's response variant and prefixes its message with the path.
impl From<WriteError> for AppResponse {
    fn from(err: WriteError) -> Self {
        let WriteError { path, cause } = err;
        let located = |msg: String| format!("failed to write {path}: {msg}");
        match cause {
            AppResponse::DatabaseError(msg) => AppResponse::DatabaseError(located(msg)),
            AppResponse::SerializationError(msg) => AppResponse::SerializationError(located(msg)),
            AppResponse::NotFound(msg) => AppResponse::NotFound(located(msg)),
            AppResponse::ValidationError(msg) => AppResponse::ValidationError(located(msg)),
            AppResponse::BadRequest(msg) => AppResponse::BadRequest(located(msg)),
            AppResponse::Ok(msg) => AppResponse::Ok(msg),
        }
    }
}

pub fn course_path(course: &Course) -> DocumentPath {
    DocumentPath::root(COURSES, course.id.as_str())
}

pub fn level_path(course: &Course, level: &Level) -> DocumentPath {
    course_path(course).child(LEVELS, level.id.as_str())
}

pub fn module_path(course: &Course, level: &Level, module: &Module) -> DocumentPath {
    level_path(course, level).child(MODULES, module.id.as_str())
}

pub fn section_id(module: &Module) -> String {
    module.default_section().id
}

pub fn section_path(course: &Course, level: &Level, module: &Module) -> DocumentPath {
    module_path(course, level, module).child(SECTIONS, section_id(module))
}

pub fn lesson_id(module: &Module, lesson: &Lesson) -> String {
    module.lesson_id(lesson)
}

pub fn lesson_path(course: &Course, level: &Level, module: &Module, lesson: &Lesson) -> DocumentPath {
    section_path(course, level, module).child(LESSONS, lesson_id(module, lesson))
}

/// Writes one document per Level, Module, synthesized Section and Lesson.
///
/// Returns the counts of documents written, or the first [`WriteError`].
pub fn load<S>(course: &Course, store: &S) -> Result<LoadSummary, WriteError>
where
    S: DocumentStore + ?Sized,
{
    let mut summary = LoadSummary::default();
    info!("Loading course '{}' ({})", course.name, course.id);

    for level in course.ordered_levels() {
        write(store, level_path(course, level), level_fields(course, level))?;
        summary.levels += 1;
        info!("  ✓ Level written: {}", level.name);

        for module in level.ordered_modules() {
            write(store, module_path(course, level, module), module_fields(course, level, module))?;
            summary.modules += 1;
            info!("    ✓ Module written: {}", module.name);

            let section = module.default_section();
            write(
                store,
                section_path(course, level, module),
                section_fields(course, level, module, &section),
            )?;
            summary.sections += 1;

            let mut written = 0;
            for lesson in module.ordered_lessons() {
                write(
                    store,
                    lesson_path(course, level, module, lesson),
                    lesson_fields(course, level, module, &section, lesson),
                )?;
                written += 1;
            }
            summary.lessons += written;
            info!("      ✓ {} lessons written", written);
        }
    }

    info!("✅ Course '{}' loaded: {}", course.id, summary);
    Ok(summary)
}

fn write<S>(store: &S, path: DocumentPath, fields: Fields) -> Result<(), WriteError>
where
    S: DocumentStore + ?Sized,
{
    store
        .set_document(&path, fields)
        .map_err(|cause| WriteError { path, cause })
}

fn stamped(fields: Vec<(&str, FieldValue)>) -> Fields {
    let mut map: Fields = fields
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();
    map.insert(CREATED_AT.to_string(), FieldValue::ServerTimestamp);
    map.insert(UPDATED_AT.to_string(), FieldValue::ServerTimestamp);
    map
}

fn level_fields(course: &Course, level: &Level) -> Fields {
    stamped(vec![
        ("name", level.name.as_str().into()),
        ("description", level.description.as_str().into()),
        ("order", level.order.into()),
        ("course_id", course.id.as_str().into()),
    ])
}

fn module_fields(course: &Course, level: &Level, module: &Module) -> Fields {
    stamped(vec![
        ("name", module.name.as_str().into()),
        ("description", module.description.as_str().into()),
        ("order", module.order.into()),
        ("total_classes", module.total_classes.into()),
        ("level_id", level.id.as_str().into()),
        ("course_id", course.id.as_str().into()),
    ])
}

fn section_fields(course: &Course, level: &Level, module: &Module, section: &Section) -> Fields {
    stamped(vec![
        ("name", section.name.as_str().into()),
        ("order", section.order.into()),
        ("module_id", module.id.as_str().into()),
        ("level_id", level.id.as_str().into()),
        ("course_id", course.id.as_str().into()),
    ])
}

fn lesson_fields(
    course: &Course,
    level: &Level,
    module: &Module,
    section: &Section,
    lesson: &Lesson,
) -> Fields {
    stamped(vec![
        ("name", lesson.name.as_str().into()),
        ("order", lesson.order.into()),
        ("content_type", LESSON_CONTENT_TYPE.into()),
        ("video_url", LESSON_VIDEO_URL.into()),
        ("description", LESSON_DESCRIPTION.into()),
        ("course_id", course.id.as_str().into()),
        ("level_id", level.id.as_str().into()),
        ("module_id", module.id.as_str().into()),
        ("section_id", section.id.as_str().into()),
    ])
}
