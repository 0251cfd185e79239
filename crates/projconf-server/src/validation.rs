// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Display name and variable key validation shared by the service operations.

use projconf_server_secrets::ValidationError;
use regex::Regex;
use std::sync::LazyLock;

pub const MAX_DISPLAY_LENGTH: usize = 64;
pub const MAX_KEY_LENGTH: usize = 128;

static DISPLAY_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[A-Za-z0-9 _]+$").unwrap());

static KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z_][A-Z0-9_]*$").unwrap());

/// Validate a project, environment or client display name.
///
/// Returns the trimmed name. It must be non-blank, at most
/// [`MAX_DISPLAY_LENGTH`] characters, and use only ASCII letters, digits,
/// spaces and underscores.
pub fn validate_display(display: &str) -> Result<String, ValidationError> {
	let trimmed = display.trim();
	if trimmed.is_empty() {
		return Err(ValidationError::InvalidDisplay(
			"display must not be blank".to_string(),
		));
	}
	if trimmed.len() > MAX_DISPLAY_LENGTH {
		return Err(ValidationError::InvalidDisplay(format!(
			"display must be at most {MAX_DISPLAY_LENGTH} characters"
		)));
	}
	if !DISPLAY_REGEX.is_match(trimmed) {
		return Err(ValidationError::InvalidDisplay(
			"display may only contain letters, digits, spaces and underscores".to_string(),
		));
	}
	Ok(trimmed.to_string())
}

/// Validate a variable key such as `DATABASE_URL`.
pub fn validate_key(key: &str) -> Result<(), ValidationError> {
	if key.len() > MAX_KEY_LENGTH {
		return Err(ValidationError::InvalidKey(format!(
			"key must be at most {MAX_KEY_LENGTH} characters"
		)));
	}
	if !KEY_REGEX.is_match(key) {
		return Err(ValidationError::InvalidKey(
			"key must start with A-Z or _ and contain only A-Z, 0-9 and _".to_string(),
		));
	}
	Ok(())
}
