// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Admin access configuration.

use projconf_common_secret::SecretString;
use serde::Deserialize;

/// Shortest admin key accepted at startup.
pub const MIN_ADMIN_KEY_LENGTH: usize = 16;

/// Admin access (runtime, fully resolved).
///
/// Without an admin key every admin-gated operation is refused.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
	pub admin_api_key: Option<SecretString>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub admin_api_key: Option<SecretString>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.admin_api_key.is_some() {
			self.admin_api_key = other.admin_api_key;
		}
	}

	pub fn finalize(self) -> AuthConfig {
		AuthConfig {
			admin_api_key: self.admin_api_key.filter(|key| !key.is_empty()),
		}
	}
}
