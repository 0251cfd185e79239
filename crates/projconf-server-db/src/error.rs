// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Internal: {0}")]
	Internal(String),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

impl DbError {
	/// Whether SQLite refused the statement because another connection holds a lock.
	///
	/// Extended result codes are folded onto their primary code, so
	/// `SQLITE_BUSY_SNAPSHOT` counts as busy.
	pub fn is_busy(&self) -> bool {
		let DbError::Sqlx(sqlx::Error::Database(db)) = self else {
			return false;
		};
		db.code()
			.and_then(|code| code.parse::<i32>().ok())
			.is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
	}
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Translate constraint violations into domain errors.
///
/// Unique violations become `Conflict(what)`, foreign key violations become
/// `NotFound(parent)`. Constraint names never reach the message.
pub(crate) fn map_constraint(e: sqlx::Error, what: &str, parent: &str) -> DbError {
	if let sqlx::Error::Database(db) = &e {
		if db.is_unique_violation() {
			return DbError::Conflict(format!("{what} already exists"));
		}
		if db.is_foreign_key_violation() {
			return DbError::NotFound(parent.to_string());
		}
	}
	DbError::Sqlx(e)
}
