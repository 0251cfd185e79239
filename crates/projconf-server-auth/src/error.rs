// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use crate::types::{ClientId, EnvironmentId, InvalidIdentifier};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
	#[error("unauthorized")]
	Unauthorized,

	#[error("environment not found: {0}")]
	EnvironmentNotFound(EnvironmentId),

	#[error("client not found: {0}")]
	ClientNotFound(ClientId),

	#[error(transparent)]
	InvalidIdentifier(#[from] InvalidIdentifier),

	#[error("credential hashing failed: {0}")]
	Hashing(String),

	#[error("credential storage failed: {0}")]
	Storage(String),
}

impl AuthError {
	/// Whether the error comes from infrastructure rather than the caller.
	pub fn is_internal(&self) -> bool {
		matches!(self, AuthError::Hashing(_) | AuthError::Storage(_))
	}
}

pub type AuthResult<T> = std::result::Result<T, AuthError>;
