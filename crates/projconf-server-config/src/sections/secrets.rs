// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Secret materialization limits.

use serde::Deserialize;

const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 3;
const DEFAULT_MAX_RANDOM_LENGTH: u32 = 4096;

#[derive(Debug, Clone)]
pub struct SecretsConfig {
	/// Attempts made to materialize a secret before giving up.
	pub max_conflict_retries: u32,
	/// Longest RANDOM value a generator may request.
	pub max_random_length: u32,
}

impl Default for SecretsConfig {
	fn default() -> Self {
		SecretsConfigLayer::default().finalize()
	}
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretsConfigLayer {
	#[serde(default)]
	pub max_conflict_retries: Option<u32>,
	#[serde(default)]
	pub max_random_length: Option<u32>,
}

impl SecretsConfigLayer {
	pub fn merge(&mut self, other: SecretsConfigLayer) {
		if other.max_conflict_retries.is_some() {
			self.max_conflict_retries = other.max_conflict_retries;
		}
		if other.max_random_length.is_some() {
			self.max_random_length = other.max_random_length;
		}
	}

	pub fn finalize(self) -> SecretsConfig {
		SecretsConfig {
			max_conflict_retries: self
				.max_conflict_retries
				.unwrap_or(DEFAULT_MAX_CONFLICT_RETRIES),
			max_random_length: self.max_random_length.unwrap_or(DEFAULT_MAX_RANDOM_LENGTH),
		}
	}
}
