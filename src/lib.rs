//! # Course Seed Core
//!
//! Seeds the Portuguese course curriculum into a hierarchical document store.
//!
//! The curriculum is an immutable tree (Course → Level → Module → Lesson)
//! embedded as JSON. [`loader::load`] walks it depth-first and writes one
//! document per Level, Module, synthesized Section and Lesson into any
//! [`document_store::DocumentStore`], deriving every path deterministically:
//!
//! ```text
//! courses/{course}/levels/{level}
//! courses/{course}/levels/{level}/modules/{module}
//! .../modules/{module}/sections/seccion-{module}
//! .../sections/seccion-{module}/lessons/leccion-{module}-{order}
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use course_seed_core::course_data::portuguese_course;
//! use course_seed_core::loader::load;
//! use course_seed_core::local_db_state::LmdbDocumentStore;
//!
//! let course = portuguese_course()?;
//! let store = LmdbDocumentStore::init("course_seed")?;
//! let summary = load(&course, &store)?;
//! println!("{summary}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## FFI Functions
//!
//! Hosts that embed the LMDB store through C bindings get:
//!
//! - [`create_db`] - Open a store instance
//! - [`load_course`] - Seed the built-in course
//! - [`get_document`] - Read one document by path
//! - [`get_collection`] - Read the documents directly inside a collection
//! - [`clear_all_records`] - Remove every document
//! - [`close_database`] - Explicit connection cleanup
//! - [`free_response`] - Release a string returned by the functions above

pub mod app_response;
pub mod course_data;
pub mod course_model;
pub mod document_path;
pub mod document_store;
pub mod loader;
pub mod local_db_model;
pub mod local_db_state;
pub mod memory_store;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};

use crate::app_response::AppResponse;
use crate::course_data::portuguese_course;
use crate::document_path::DocumentPath;
use crate::local_db_state::LmdbDocumentStore;

/// Opens (or creates) the LMDB store `<name>.lmdb`.
///
/// The environment directory is created when missing; an existing one is
/// reopened with its documents intact.
///
/// # Parameters
///
/// * `name` - A null-terminated C string with the store name, without the `.lmdb` suffix
///
/// # Returns
///
/// A pointer to the [`LmdbDocumentStore`] on success, or a null pointer on failure.
/// The caller owns the pointer and must keep it alive for every later call.
///
/// # Safety
///
/// `name` must be null or point to a valid null-terminated string. The
/// returned pointer must not be used from two threads while one of them
/// calls [`close_database`].
///
/// # Errors
///
/// Returns a null pointer if:
/// - `name` is null
/// - `name` is not valid UTF-8
/// - the directory cannot be created or LMDB fails to open the environment
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use course_seed_core::create_db;
///
/// let name = CString::new("course_seed").unwrap();
/// let store = create_db(name.as_ptr());
/// assert!(!store.is_null());
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_db(name: *const c_char) -> *mut LmdbDocumentStore {
    if name.is_null() {
        warn!("Null name pointer passed to create_db");
        return std::ptr::null_mut();
    }

    let name_str = match unsafe { CStr::from_ptr(name).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in name parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    match LmdbDocumentStore::init(name_str) {
        Ok(store) => {
            info!("✅ Document store initialized");
            Box::into_raw(Box::new(store))
        }
        Err(e) => {
            warn!("❌ Failed to initialize document store {name_str}: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Seeds the built-in Portuguese course into the store.
///
/// Every Level, Module, default Section and Lesson document is written with
/// create-or-replace semantics, so calling this again on a seeded store only
/// refreshes the timestamps.
///
/// # Parameters
///
/// * `state` - Pointer returned by [`create_db`]
///
/// # Returns
///
/// A JSON-serialized [`AppResponse`] C string. On success it is `Ok` carrying
/// the [`loader::LoadSummary`] as JSON. Free it with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a live pointer obtained from [`create_db`].
///
/// # Errors
///
/// - `BadRequest` when `state` is null
/// - `ValidationError` when the embedded course fails validation
/// - the failing write's own variant (`DatabaseError`, `BadRequest`, ...) with
///   the document path prepended to its message. Documents written before the
///   failure remain in the store.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use course_seed_core::{create_db, free_response, load_course};
///
/// let name = CString::new("course_seed").unwrap();
/// let store = create_db(name.as_ptr());
/// let response = load_course(store);
/// free_response(response);
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn load_course(state: *mut LmdbDocumentStore) -> *const c_char {
    let store = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => {
            let error = AppResponse::BadRequest("Null state pointer passed to load_course".to_string());
            return response_to_c_string(&error);
        }
    };

    let course = match portuguese_course() {
        Ok(course) => course,
        Err(e) => return response_to_c_string(&e),
    };

    match loader::load(&course, store) {
        Ok(summary) => match serde_json::to_string(&summary) {
            Ok(json) => response_to_c_string(&AppResponse::Ok(json)),
            Err(e) => response_to_c_string(&AppResponse::from(e)),
        },
        Err(e) => {
            warn!("Course load aborted: {e}");
            response_to_c_string(&AppResponse::from(e))
        }
    }
}

/// Reads the document at a `/`-separated path.
///
/// # Parameters
///
/// * `state` - Pointer returned by [`create_db`]
/// * `path` - Null-terminated C string such as
///   `courses/portugues/levels/nivel-basico`; leading and trailing `/` are ignored
///
/// # Returns
///
/// A JSON-serialized [`AppResponse`] C string; `Ok` carries the
/// [`local_db_model::StoredDocument`] as JSON. Free it with [`free_response`].
///
/// # Safety
///
/// `state` must be null or a live pointer from [`create_db`]; `path` must be
/// null or point to a valid null-terminated string.
///
/// # Errors
///
/// - `BadRequest` for null pointers, invalid UTF-8 or a path that does not
///   address a document (odd segment count, empty segment)
/// - `NotFound` when nothing is stored at `path`
/// - `DatabaseError` when the store is closed or LMDB fails
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use course_seed_core::{create_db, free_response, get_document};
///
/// let name = CString::new("course_seed").unwrap();
/// let store = create_db(name.as_ptr());
/// let path = CString::new("courses/portugues/levels/nivel-basico").unwrap();
/// let response = get_document(store, path.as_ptr());
/// free_response(response);
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_document(state: *mut LmdbDocumentStore, path: *const c_char) -> *const c_char {
    let store = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => {
            let error = AppResponse::BadRequest("Null state pointer passed to get_document".to_string());
            return response_to_c_string(&error);
        }
    };

    let path = match c_ptr_to_path(path) {
        Ok(p) => p,
        Err(error_ptr) => return error_ptr,
    };

    match store.get_document(&path) {
        Ok(Some(doc)) => match serde_json::to_string(&doc) {
            Ok(json) => response_to_c_string(&AppResponse::Ok(json)),
            Err(e) => response_to_c_string(&AppResponse::from(e)),
        },
        Ok(None) => {
            let error = AppResponse::NotFound(format!("No document at {path}"));
            response_to_c_string(&error)
        }
        Err(e) => response_to_c_string(&e),
    }
}

/// Reads the documents directly inside a collection path, as a JSON array.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_collection(state: *mut LmdbDocumentStore, path: *const c_char) -> *const c_char {
    let store = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => {
            let error = AppResponse::BadRequest("Null state pointer passed to get_collection".to_string());
            return response_to_c_string(&error);
        }
    };

    let path = match c_ptr_to_path(path) {
        Ok(p) => p,
        Err(error_ptr) => return error_ptr,
    };

    match store.list_collection(&path) {
        Ok(docs) => match serde_json::to_string(&docs) {
            Ok(json) => response_to_c_string(&AppResponse::Ok(json)),
            Err(e) => response_to_c_string(&AppResponse::from(e)),
        },
        Err(e) => response_to_c_string(&e),
    }
}

/// Removes every document while keeping the store open.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn clear_all_records(state: *mut LmdbDocumentStore) -> *const c_char {
    let store = match unsafe { state.as_ref() } {
        Some(s) => s,
        None => {
            let error = AppResponse::BadRequest("Null state pointer passed to clear_all_records".to_string());
            return response_to_c_string(&error);
        }
    };

    match store.clear_all_records() {
        Ok(()) => response_to_c_string(&AppResponse::success("All documents cleared successfully")),
        Err(e) => response_to_c_string(&e),
    }
}

/// Flushes and closes the LMDB environment.
///
/// The pointer stays valid; later calls on it answer with a `DatabaseError`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_database(state: *mut LmdbDocumentStore) -> *const c_char {
    let store = match unsafe { state.as_mut() } {
        Some(s) => s,
        None => {
            let error = AppResponse::BadRequest("Null state pointer passed to close_database".to_string());
            return response_to_c_string(&error);
        }
    };

    match store.close_database() {
        Ok(()) => response_to_c_string(&AppResponse::success("Database connection closed successfully")),
        Err(e) => response_to_c_string(&e),
    }
}

/// Releases a string returned by any function in this module.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(ptr as *mut c_char) });
}

/// Serializes `response` to JSON and hands it out as an owned C string.
/// Returns null if serialization fails.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Reads a C string and parses it as a [`DocumentPath`]; the error side is a
/// ready-to-return `BadRequest` response.
fn c_ptr_to_path(ptr: *const c_char) -> Result<DocumentPath, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest("Null path pointer".to_string());
        return Err(response_to_c_string(&error));
    }

    let raw = match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => s,
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in path: {e}"));
            return Err(response_to_c_string(&error));
        }
    };

    DocumentPath::parse(raw).map_err(|e| response_to_c_string(&e))
}
