//! File actions module.
//!
//! Deleting one image of every near-duplicate pair:
//! - Move to system trash (default, recoverable)
//! - Permanent deletion (requires `--permanent -y`)
//! - Batch operations that log and continue on failure
//!
//! ```no_run
//! use lshdupe::actions::delete::delete_to_trash;
//! use std::path::PathBuf;
//!
//! let path = PathBuf::from("/path/to/near-duplicate.jpg");
//! let result = delete_to_trash(&path);
//! ```

pub mod delete;

// Re-export commonly used types
pub use delete::{
    delete_batch, delete_to_trash, permanent_delete, select_for_deletion, validate_selection,
    BatchDeleteResult, DeleteError, DeleteMode, DeleteResult,
};
