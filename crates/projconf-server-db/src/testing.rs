// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Pools and fixtures for tests in this and downstream crates.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::schema::run_migrations;

/// Single-connection in-memory pool with the full schema.
pub async fn create_test_pool() -> SqlitePool {
	let options = SqliteConnectOptions::from_str("sqlite::memory:")
		.unwrap()
		.foreign_keys(true);

	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.idle_timeout(None)
		.max_lifetime(None)
		.connect_with(options)
		.await
		.expect("Failed to create test pool");

	run_migrations(&pool).await.unwrap();
	pool
}

/// File-backed pool for tests that need several concurrent connections.
///
/// Keep the returned `TempDir` alive for the duration of the test.
pub async fn create_file_test_pool() -> (SqlitePool, tempfile::TempDir) {
	let dir = tempfile::tempdir().unwrap();
	let url = format!("sqlite:{}", dir.path().join("projconf-test.db").display());
	let pool = crate::pool::create_pool(&url).await.unwrap();
	run_migrations(&pool).await.unwrap();
	(pool, dir)
}
