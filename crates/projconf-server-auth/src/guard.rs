// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Admin key check.

use projconf_common_secret::SecretString;
use tracing::warn;

use crate::error::{AuthError, AuthResult};

/// Distinguishes callers holding the process-wide admin key.
///
/// With no key configured every check fails.
#[derive(Debug, Clone, Default)]
pub struct AccessGuard {
	admin_key: Option<SecretString>,
}

impl AccessGuard {
	pub fn new(admin_key: Option<SecretString>) -> Self {
		Self {
			admin_key: admin_key.filter(|k| !k.is_empty()),
		}
	}

	pub fn is_configured(&self) -> bool {
		self.admin_key.is_some()
	}

	/// Constant-time comparison of a presented key.
	///
	/// Accepts an optional case-insensitive `Bearer ` prefix.
	pub fn is_admin(&self, presented: &str) -> bool {
		let Some(expected) = &self.admin_key else {
			warn!("admin check failed: no admin key configured");
			return false;
		};

		if expected.ct_eq(strip_bearer(presented).as_bytes()) {
			true
		} else {
			warn!("admin check failed: invalid admin key");
			false
		}
	}

	pub fn require_admin(&self, presented: Option<&str>) -> AuthResult<()> {
		match presented {
			Some(key) if self.is_admin(key) => Ok(()),
			_ => Err(AuthError::Unauthorized),
		}
	}
}

fn strip_bearer(raw: &str) -> &str {
	let raw = raw.trim();
	match raw.get(..7) {
		Some(prefix) if prefix.eq_ignore_ascii_case("bearer ") => raw[7..].trim(),
		_ => raw,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn guard(key: &str) -> AccessGuard {
		AccessGuard::new(Some(SecretString::new(key.to_string())))
	}

	#[test]
	fn test_accepts_exact_key() {
		assert!(guard("admin-key-0123456789").is_admin("admin-key-0123456789"));
	}

	#[test]
	fn test_accepts_bearer_prefix_any_case() {
		let g = guard("admin-key-0123456789");
		assert!(g.is_admin("Bearer admin-key-0123456789"));
		assert!(g.is_admin("bearer admin-key-0123456789"));
		assert!(g.is_admin("  BEARER   admin-key-0123456789 "));
	}

	#[test]
	fn test_rejects_wrong_key() {
		let g = guard("admin-key-0123456789");
		assert!(!g.is_admin("admin-key-0123456788"));
		assert!(!g.is_admin("admin-key"));
		assert!(!g.is_admin(""));
		assert!(!g.is_admin("Bearer "));
	}

	#[test]
	fn test_unconfigured_guard_rejects_everything() {
		let g = AccessGuard::new(None);
		assert!(!g.is_configured());
		assert!(!g.is_admin(""));
		assert!(!g.is_admin("anything"));
		assert!(matches!(
			g.require_admin(Some("anything")),
			Err(AuthError::Unauthorized)
		));
	}

	#[test]
	fn test_empty_configured_key_counts_as_unconfigured() {
		let g = guard("");
		assert!(!g.is_configured());
		assert!(!g.is_admin(""));
	}

	#[test]
	fn test_require_admin_missing_header() {
		let g = guard("admin-key-0123456789");
		assert!(matches!(g.require_admin(None), Err(AuthError::Unauthorized)));
		assert!(g.require_admin(Some("admin-key-0123456789")).is_ok());
	}

	#[test]
	fn test_debug_hides_key() {
		let g = guard("admin-key-0123456789");
		assert!(!format!("{g:?}").contains("admin-key-0123456789"));
	}

	proptest! {
		#[test]
		fn only_the_configured_key_is_admin(key in "[a-zA-Z0-9]{16,40}", other in "[a-zA-Z0-9]{0,40}") {
			let g = guard(&key);
			prop_assert!(g.is_admin(&key));
			prop_assert_eq!(g.is_admin(&other), other == key);
		}
	}
}
