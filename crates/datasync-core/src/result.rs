//! Convenience result type alias for DataSync.

use crate::error::AppError;

/// A specialized `Result` type for DataSync operations.
pub type AppResult<T> = Result<T, AppError>;
