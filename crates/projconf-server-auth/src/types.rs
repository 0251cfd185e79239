// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identifier newtypes and the client records shared with the storage layer.
//!
//! Every externally supplied identifier goes through [`parse_id`] (or the
//! `FromStr` impls) before it reaches a query, so malformed input stops here
//! with [`InvalidIdentifier`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A string that is not a well-formed UUID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid identifier: {0:?}")]
pub struct InvalidIdentifier(pub String);

macro_rules! define_id_type {
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Uuid);

		impl $name {
			pub fn new(id: Uuid) -> Self {
				Self(id)
			}

			pub fn generate() -> Self {
				Self(Uuid::new_v4())
			}

			pub fn into_inner(self) -> Uuid {
				self.0
			}

			pub fn as_uuid(&self) -> &Uuid {
				&self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl FromStr for $name {
			type Err = InvalidIdentifier;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				parse_uuid(s).map(Self)
			}
		}

		impl From<Uuid> for $name {
			fn from(id: Uuid) -> Self {
				Self(id)
			}
		}

		impl From<$name> for Uuid {
			fn from(id: $name) -> Self {
				id.0
			}
		}
	};
}

define_id_type!(ProjectId, "Unique identifier for a project.");
define_id_type!(EnvironmentId, "Unique identifier for an environment.");
define_id_type!(VariableId, "Unique identifier for a variable definition.");
define_id_type!(SecretId, "Unique identifier for a materialized variable value.");
define_id_type!(ClientId, "Unique identifier for a credentialed client.");
define_id_type!(ClientSecretId, "Unique identifier for one issued client credential.");

fn parse_uuid(s: &str) -> Result<Uuid, InvalidIdentifier> {
	Uuid::parse_str(s.trim()).map_err(|_| InvalidIdentifier(s.to_string()))
}

/// Parse an externally supplied identifier into a typed id.
pub fn parse_id<T: FromStr<Err = InvalidIdentifier>>(s: &str) -> Result<T, InvalidIdentifier> {
	s.parse()
}

/// Whether `s` is a well-formed UUID.
pub fn is_uuid(s: &str) -> bool {
	parse_uuid(s).is_ok()
}

/// A credentialed consumer scoped to one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
	pub id: ClientId,
	pub environment_id: EnvironmentId,
	pub display: String,
	pub created_at: DateTime<Utc>,
}

/// A stored client credential hash.
///
/// `is_current` is true only for the most recently issued secret of the
/// owning client; older rows are kept for audit but no longer verify.
#[derive(Clone)]
pub struct StoredClientSecret {
	pub id: ClientSecretId,
	pub client_id: ClientId,
	pub hash: String,
	pub created_at: DateTime<Utc>,
	pub is_current: bool,
}

impl fmt::Debug for StoredClientSecret {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("StoredClientSecret")
			.field("id", &self.id)
			.field("client_id", &self.client_id)
			.field("hash", &projconf_common_secret::REDACTED)
			.field("created_at", &self.created_at)
			.field("is_current", &self.is_current)
			.finish()
	}
}
