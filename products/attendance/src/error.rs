use std::path::PathBuf;

use platform_db::DbError;
use thiserror::Error;

use crate::model::EmployeeId;

/// Rejections raised by the form on submit. None of them touch the collection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Please fill all fields")]
    MissingFields,
    #[error("Profile image required")]
    ProfileRequired,
    #[error("Employee ID already exists")]
    DuplicateId(EmployeeId),
}

impl SubmitError {
    pub fn code(&self) -> &'static str {
        match self {
            SubmitError::MissingFields => "MISSING_FIELDS",
            SubmitError::ProfileRequired => "PROFILE_REQUIRED",
            SubmitError::DuplicateId(_) => "DUPLICATE_ID",
        }
    }
}

#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error("storage error: {0}")]
    Storage(#[from] DbError),
    #[error("failed to encode employees: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to read profile image {path}: {source}")]
    ProfileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type AttendanceResult<T> = Result<T, AttendanceError>;
