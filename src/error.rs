// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;

use thiserror::Error;

/// A single rejected form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} '{key}' already exists")]
    Duplicate { entity: &'static str, key: String },

    #[error("{entity} '{key}' is still referenced by {count} {referrer}")]
    InUse {
        entity: &'static str,
        key: String,
        count: i64,
        referrer: &'static str,
    },

    #[error("cannot move {entity} from '{from}' to '{to}'")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("{0}")]
    InvalidState(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

fn join_fields(errs: &[FieldError]) -> String {
    errs.iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound { .. } => "NOT_FOUND",
            AppError::Duplicate { .. } => "DUPLICATE",
            AppError::InUse { .. } => "IN_USE",
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::InvalidState(_) => "INVALID_STATE",
            AppError::Storage(_) => "STORAGE_ERROR",
        }
    }

    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        AppError::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }
}

/// Error code for any error bubbled up through anyhow; unknown errors are "UNKNOWN_ERROR".
pub fn error_code(err: &anyhow::Error) -> &'static str {
    err.chain()
        .find_map(|e| e.downcast_ref::<AppError>())
        .map(AppError::code)
        .unwrap_or("UNKNOWN_ERROR")
}
