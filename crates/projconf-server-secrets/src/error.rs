// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use projconf_server_db::DbError;

use crate::generator::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
	#[error(transparent)]
	Validation(#[from] ValidationError),

	#[error("{0} not found")]
	NotFound(String),

	#[error("stored generator is invalid: {0}")]
	GeneratorInvalid(ValidationError),

	#[error("secret materialization gave up after {attempts} attempts")]
	ConflictRetryExhausted { attempts: u32 },

	#[error("storage error: {0}")]
	Db(#[from] DbError),
}

impl SecretsError {
	/// Whether the error comes from infrastructure rather than the caller.
	pub fn is_internal(&self) -> bool {
		matches!(self, SecretsError::Db(e) if !matches!(e, DbError::NotFound(_) | DbError::Conflict(_)))
	}
}

pub type SecretsResult<T> = std::result::Result<T, SecretsError>;
