// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

const INITIAL_SCHEMA: &str = include_str!("../migrations/001_initial_schema.sql");

/// Create every table and index if missing.
///
/// Idempotent; safe to run on each startup.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
	for stmt in INITIAL_SCHEMA.split(';').filter(|s| !s.trim().is_empty()) {
		sqlx::query(stmt).execute(pool).await?;
	}

	tracing::debug!("schema ready");
	Ok(())
}
