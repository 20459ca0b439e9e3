//! Curriculum tree: Course → Level → Module → Lesson.
//!
//! Sections are not declared here; the loader synthesizes one per module.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;
use crate::document_path::SEPARATOR;

/// Every lesson is stored as a video with an empty URL and description,
/// whatever the source data declares.
pub const LESSON_CONTENT_TYPE: &str = "video";
pub const LESSON_VIDEO_URL: &str = "";
pub const LESSON_DESCRIPTION: &str = "";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    #[serde(rename = "courseId")]
    pub id: String,
    #[serde(rename = "courseName")]
    pub name: String,
    pub levels: Vec<Level>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub id: String,
    pub name: String,
    pub description: String,
    pub order: u32,
    pub modules: Vec<Module>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: String,
    pub name: String,
    pub description: String,
    pub order: u32,
    /// Declared class count. Checked against `lessons` by [`Course::validate`].
    pub total_classes: u32,
    pub lessons: Vec<Lesson>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub name: String,
    pub order: u32,
}

/// The single section every module gets at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub name: String,
    pub order: u32,
}

impl Course {
    pub fn from_json(json: &str) -> Result<Self, AppResponse> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn module_count(&self) -> usize {
        self.levels.iter().map(|level| level.modules.len()).sum()
    }

    pub fn lesson_count(&self) -> usize {
        self.levels
            .iter()
            .flat_map(|level| &level.modules)
            .map(|module| module.lessons.len())
            .sum()
    }

    /// Levels in ascending `order`.
    pub fn ordered_levels(&self) -> Vec<&Level> {
        let mut levels: Vec<&Level> = self.levels.iter().collect();
        levels.sort_by_key(|level| level.order);
        levels
    }

    /// Structural checks on the tree:
    ///
    /// - ids are non-empty and contain no path separator
    /// - sibling `order` values are positive and unique
    /// - level and lesson orders run 1..=n without gaps; module orders are
    ///   numbered across the whole course, so only their uniqueness per level
    ///   is checked
    /// - every module's `totalClasses` equals its lesson count
    pub fn validate(&self) -> Result<(), AppResponse> {
        check_id("course", &self.id)?;
        check_orders(
            &format!("levels of course '{}'", self.id),
            self.levels.iter().map(|level| level.order),
            Density::Dense,
        )?;

        let mut module_ids = HashSet::new();
        for level in &self.levels {
            check_id("level", &level.id)?;
            check_orders(
                &format!("modules of level '{}'", level.id),
                level.modules.iter().map(|module| module.order),
                Density::Sparse,
            )?;

            for module in &level.modules {
                check_id("module", &module.id)?;
                if !module_ids.insert(module.id.as_str()) {
                    return Err(AppResponse::ValidationError(format!(
                        "Module id '{}' is used more than once",
                        module.id
                    )));
                }
                check_orders(
                    &format!("lessons of module '{}'", module.id),
                    module.lessons.iter().map(|lesson| lesson.order),
                    Density::Dense,
                )?;

                if module.total_classes as usize != module.lessons.len() {
                    return Err(AppResponse::ValidationError(format!(
                        "Module '{}' declares {} classes but has {} lessons",
                        module.id,
                        module.total_classes,
                        module.lessons.len()
                    )));
                }
            }
        }

        let level_ids: HashSet<&str> = self.levels.iter().map(|level| level.id.as_str()).collect();
        if level_ids.len() != self.levels.len() {
            return Err(AppResponse::ValidationError(format!(
                "Duplicate level id in course '{}'",
                self.id
            )));
        }

        Ok(())
    }
}

impl Level {
    /// Modules in ascending `order`.
    pub fn ordered_modules(&self) -> Vec<&Module> {
        let mut modules: Vec<&Module> = self.modules.iter().collect();
        modules.sort_by_key(|module| module.order);
        modules
    }
}

impl Module {
    /// Lessons in ascending `order`.
    pub fn ordered_lessons(&self) -> Vec<&Lesson> {
        let mut lessons: Vec<&Lesson> = self.lessons.iter().collect();
        lessons.sort_by_key(|lesson| lesson.order);
        lessons
    }

    /// `seccion-{module.id}`, named after the declared class range.
    pub fn default_section(&self) -> Section {
        Section {
            id: format!("seccion-{}", self.id),
            name: format!("Clases 1-{}", self.total_classes),
            order: 1,
        }
    }

    /// `leccion-{module.id}-{lesson.order}`
    pub fn lesson_id(&self, lesson: &Lesson) -> String {
        format!("leccion-{}-{}", self.id, lesson.order)
    }
}

fn check_id(kind: &str, id: &str) -> Result<(), AppResponse> {
    if id.is_empty() {
        return Err(AppResponse::ValidationError(format!("Empty {kind} id")));
    }
    if id.contains(SEPARATOR) {
        return Err(AppResponse::ValidationError(format!(
            "The {kind} id '{id}' contains '{SEPARATOR}'"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Density {
    Dense,
    Sparse,
}

fn check_orders(
    scope: &str,
    orders: impl Iterator<Item = u32>,
    density: Density,
) -> Result<(), AppResponse> {
    let mut seen = HashSet::new();
    for order in orders {
        if order == 0 {
            return Err(AppResponse::ValidationError(format!(
                "Order 0 among {scope}, orders start at 1"
            )));
        }
        if !seen.insert(order) {
            return Err(AppResponse::ValidationError(format!(
                "Order {order} is repeated among {scope}"
            )));
        }
    }

    if density == Density::Dense {
        // Unique and positive, so any gap shows up as a missing value in 1..=len.
        if let Some(missing) = (1..=seen.len() as u32).find(|order| !seen.contains(order)) {
            return Err(AppResponse::ValidationError(format!(
                "Order {missing} is missing among {scope}, orders must run 1..={}",
                seen.len()
            )));
        }
    }
    Ok(())
}
