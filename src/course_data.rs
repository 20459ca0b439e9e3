//! The shipped Portuguese curriculum.
//!
//! The tree lives in `data/portugues.json` and is embedded at compile time,
//! so content edits never touch loader code.

use log::debug;

use crate::app_response::AppResponse;
use crate::course_model::Course;

pub const PORTUGUESE_COURSE_JSON: &str = include_str!("../data/portugues.json");

/// Parses and validates the embedded curriculum.
pub fn portuguese_course() -> Result<Course, AppResponse> {
    let course = Course::from_json(PORTUGUESE_COURSE_JSON)?;
    course.validate()?;

    debug!(
        "Parsed course '{}': {} levels, {} modules, {} lessons",
        course.id,
        course.level_count(),
        course.module_count(),
        course.lesson_count()
    );
    Ok(course)
}
