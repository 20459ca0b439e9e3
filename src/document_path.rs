//! Collection/document addressing.
//!
//! A [`DocumentPath`] is an ordered list of segments alternating between a
//! collection name and a document id, e.g.
//! `courses/portugues/levels/nivel-basico`. Paths with an even number of
//! segments address documents; odd ones address collections.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;

pub const SEPARATOR: char = '/';

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentPath {
    segments: Vec<String>,
}

impl DocumentPath {
    /// Starts a path at a top-level document: `{collection}/{id}`.
    pub fn root(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            segments: vec![collection.into(), id.into()],
        }
    }

    /// Returns a new path addressing `{self}/{collection}/{id}`.
    pub fn child(&self, collection: impl Into<String>, id: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(collection.into());
        segments.push(id.into());
        Self { segments }
    }

    /// Returns the collection path `{self}/{collection}`.
    pub fn collection(&self, collection: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(collection.into());
        Self { segments }
    }

    /// Splits a `/`-separated string. Leading and trailing separators are ignored,
    /// empty inner segments are rejected.
    pub fn parse(raw: &str) -> Result<Self, AppResponse> {
        let trimmed = raw.trim_matches(SEPARATOR);
        if trimmed.is_empty() {
            return Err(AppResponse::BadRequest("Empty document path".to_string()));
        }

        let segments: Vec<String> = trimmed.split(SEPARATOR).map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(AppResponse::BadRequest(format!(
                "Empty segment in document path: {raw}"
            )));
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment: the document id, or the collection name for collection paths.
    pub fn id(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    pub fn is_document(&self) -> bool {
        !self.segments.is_empty() && self.segments.len() % 2 == 0
    }

    pub fn is_collection(&self) -> bool {
        self.segments.len() % 2 == 1
    }

    /// Checks that this path can be written as a document.
    pub fn ensure_document(&self) -> Result<(), AppResponse> {
        self.ensure_segments()?;
        if !self.is_document() {
            return Err(AppResponse::BadRequest(format!(
                "Path does not address a document: {self}"
            )));
        }
        Ok(())
    }

    /// Checks that this path can be listed as a collection.
    pub fn ensure_collection(&self) -> Result<(), AppResponse> {
        self.ensure_segments()?;
        if !self.is_collection() {
            return Err(AppResponse::BadRequest(format!(
                "Path does not address a collection: {self}"
            )));
        }
        Ok(())
    }

    fn ensure_segments(&self) -> Result<(), AppResponse> {
        if self.segments.is_empty() {
            return Err(AppResponse::BadRequest("Empty document path".to_string()));
        }
        for segment in &self.segments {
            if segment.is_empty() || segment.contains(SEPARATOR) {
                return Err(AppResponse::BadRequest(format!(
                    "Invalid path segment {segment:?} in {self}"
                )));
            }
        }
        Ok(())
    }

    /// True when `self` is a document directly inside `collection`.
    pub fn is_direct_child_of(&self, collection: &DocumentPath) -> bool {
        self.segments.len() == collection.segments.len() + 1
            && self.segments.starts_with(&collection.segments)
    }
}

impl Display for DocumentPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if !first {
                write!(f, "{}", SEPARATOR)?;
            }
            write!(f, "{}", segment)?;
            first = false;
        }
        Ok(())
    }
}
