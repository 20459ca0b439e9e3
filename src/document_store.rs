use crate::app_response::AppResponse;
use crate::document_path::DocumentPath;
use crate::local_db_model::Fields;

/// Field names every store stamps from its own clock.
pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";

/// A hierarchical collection/document store.
///
/// `set_document` has create-or-replace semantics: whatever was stored at
/// `path` before is discarded. Implementations resolve
/// [`FieldValue::ServerTimestamp`](crate::local_db_model::FieldValue::ServerTimestamp)
/// fields with their own clock and must reject paths that do not address a
/// document.
pub trait DocumentStore {
    fn set_document(&self, path: &DocumentPath, fields: Fields) -> Result<(), AppResponse>;
}

/// Store clock: RFC 3339 UTC with millisecond precision.
pub fn server_now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
