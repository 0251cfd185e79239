// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Materialized variable values, one per (variable, environment).
//!
//! The pair is unique in the table. [`SecretRepository::insert_secret_if_absent`]
//! is the only write path: it never overwrites and always reports the row
//! that won.

use projconf_common_secret::SecretString;
use projconf_server_auth::{EnvironmentId, SecretId, VariableId};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use crate::error::{map_constraint, DbError};
use crate::types::{now, time_column, timestamp, uuid_column, SecretRecord};

/// Outcome of an insert-if-absent.
#[derive(Debug, Clone)]
pub struct InsertOutcome {
	/// The row stored for the pair after the attempt.
	pub secret: SecretRecord,
	/// Whether this call created it.
	pub inserted: bool,
}

#[derive(Clone)]
pub struct SecretRepository {
	pool: SqlitePool,
}

impl SecretRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	#[tracing::instrument(skip(self), fields(variable_id = %variable_id, environment_id = %environment_id))]
	pub async fn get_secret_by_pair(
		&self,
		variable_id: &VariableId,
		environment_id: &EnvironmentId,
	) -> Result<Option<SecretRecord>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, variable_id, environment_id, value, created_at
			FROM secrets
			WHERE variable_id = ? AND environment_id = ?
			"#,
		)
		.bind(variable_id.to_string())
		.bind(environment_id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.as_ref().map(parse_secret_row).transpose()
	}

	/// Store `value` for the pair unless a row already exists, then return the stored row.
	///
	/// `generator_revision` is the revision of the variable's generator that
	/// produced `value`. The insert only happens while the variable is still at
	/// that revision, so a value built from a replaced generator is never stored.
	///
	/// Runs in one transaction. Returns `None` if no row is visible for the pair
	/// afterwards: the generator moved on or the variable is gone. Callers reload
	/// the variable and retry.
	///
	/// # Errors
	/// `DbError::NotFound` if the environment does not exist.
	#[tracing::instrument(
		skip(self, value),
		fields(variable_id = %variable_id, environment_id = %environment_id)
	)]
	pub async fn insert_secret_if_absent(
		&self,
		variable_id: &VariableId,
		environment_id: &EnvironmentId,
		generator_revision: i64,
		value: &SecretString,
	) -> Result<Option<InsertOutcome>, DbError> {
		let mut tx = self.pool.begin().await?;

		let inserted = sqlx::query(
			r#"
			INSERT INTO secrets (id, variable_id, environment_id, value, created_at)
			SELECT ?, ?, ?, ?, ?
			WHERE EXISTS (
				SELECT 1 FROM variables WHERE id = ? AND generator_revision = ?
			)
			ON CONFLICT(variable_id, environment_id) DO NOTHING
			"#,
		)
		.bind(SecretId::generate().to_string())
		.bind(variable_id.to_string())
		.bind(environment_id.to_string())
		.bind(value.expose())
		.bind(timestamp(now()))
		.bind(variable_id.to_string())
		.bind(generator_revision)
		.execute(&mut *tx)
		.await
		.map_err(|e| map_constraint(e, "secret", "variable or environment"))?
		.rows_affected()
			== 1;

		let row = sqlx::query(
			r#"
			SELECT id, variable_id, environment_id, value, created_at
			FROM secrets
			WHERE variable_id = ? AND environment_id = ?
			"#,
		)
		.bind(variable_id.to_string())
		.bind(environment_id.to_string())
		.fetch_optional(&mut *tx)
		.await?;

		tx.commit().await?;

		let Some(row) = row else {
			tracing::debug!("generator revision moved, nothing stored");
			return Ok(None);
		};
		let secret = parse_secret_row(&row)?;
		if inserted {
			tracing::debug!(secret_id = %secret.id, "secret materialized");
		}
		Ok(Some(InsertOutcome { secret, inserted }))
	}

	/// The earliest materialized value of a variable across all environments.
	#[tracing::instrument(skip(self), fields(variable_id = %variable_id))]
	pub async fn get_default_secret(
		&self,
		variable_id: &VariableId,
	) -> Result<Option<SecretRecord>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, variable_id, environment_id, value, created_at
			FROM secrets
			WHERE variable_id = ?
			ORDER BY created_at ASC, rowid ASC
			LIMIT 1
			"#,
		)
		.bind(variable_id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.as_ref().map(parse_secret_row).transpose()
	}

	#[tracing::instrument(skip(self), fields(variable_id = %variable_id))]
	pub async fn delete_secrets_for_variable(&self, variable_id: &VariableId) -> Result<u64, DbError> {
		let result = sqlx::query("DELETE FROM secrets WHERE variable_id = ?")
			.bind(variable_id.to_string())
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected())
	}

	#[tracing::instrument(skip(self), fields(variable_id = %variable_id))]
	pub async fn count_secrets_for_variable(&self, variable_id: &VariableId) -> Result<i64, DbError> {
		let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM secrets WHERE variable_id = ?")
			.bind(variable_id.to_string())
			.fetch_one(&self.pool)
			.await?;

		Ok(count)
	}
}

fn parse_secret_row(row: &SqliteRow) -> Result<SecretRecord, DbError> {
	let value: String = row.get("value");
	Ok(SecretRecord {
		id: SecretId::new(uuid_column(row, "id")?),
		variable_id: VariableId::new(uuid_column(row, "variable_id")?),
		environment_id: EnvironmentId::new(uuid_column(row, "environment_id")?),
		value: SecretString::new(value),
		created_at: time_column(row, "created_at")?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::environment::EnvironmentRepository;
	use crate::project::ProjectRepository;
	use crate::testing::create_test_pool;
	use crate::variable::{NewVariable, VariableRepository};
	use serde_json::json;

	struct Fixture {
		repo: SecretRepository,
		variables: VariableRepository,
		variable_id: VariableId,
		production: EnvironmentId,
		staging: EnvironmentId,
	}

	async fn setup() -> Fixture {
		let pool = create_test_pool().await;
		let project = ProjectRepository::new(pool.clone())
			.create_project("Billing")
			.await
			.unwrap();
		let environments = EnvironmentRepository::new(pool.clone());
		let production = environments
			.create_environment(&project.id, "production")
			.await
			.unwrap();
		let staging = environments
			.create_environment(&project.id, "staging")
			.await
			.unwrap();
		let variables = VariableRepository::new(pool.clone());
		let data = json!("literal");
		let variable = variables
			.create_variable(NewVariable {
				project_id: &project.id,
				key: "API_URL",
				description: "",
				generator_type: "STATIC",
				generator_data: &data,
			})
			.await
			.unwrap();

		Fixture {
			repo: SecretRepository::new(pool),
			variables,
			variable_id: variable.id,
			production: production.id,
			staging: staging.id,
		}
	}

	fn secret(value: &str) -> SecretString {
		SecretString::new(value.to_string())
	}

	#[tokio::test]
	async fn test_first_insert_wins() {
		let f = setup().await;

		let first = f
			.repo
			.insert_secret_if_absent(&f.variable_id, &f.production, 0, &secret("one"))
			.await
			.unwrap()
			.unwrap();
		assert!(first.inserted);
		assert_eq!(first.secret.value.expose(), "one");

		let second = f
			.repo
			.insert_secret_if_absent(&f.variable_id, &f.production, 0, &secret("two"))
			.await
			.unwrap()
			.unwrap();
		assert!(!second.inserted);
		assert_eq!(second.secret.id, first.secret.id);
		assert_eq!(second.secret.value.expose(), "one");

		assert_eq!(f.repo.count_secrets_for_variable(&f.variable_id).await.unwrap(), 1);
	}

	#[tokio::test]
	async fn test_pairs_are_independent() {
		let f = setup().await;
		f.repo
			.insert_secret_if_absent(&f.variable_id, &f.production, 0, &secret("prod"))
			.await
			.unwrap();
		f.repo
			.insert_secret_if_absent(&f.variable_id, &f.staging, 0, &secret("stage"))
			.await
			.unwrap();

		let staging = f
			.repo
			.get_secret_by_pair(&f.variable_id, &f.staging)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(staging.value.expose(), "stage");
		assert_eq!(f.repo.count_secrets_for_variable(&f.variable_id).await.unwrap(), 2);
	}

	#[tokio::test]
	async fn test_unknown_environment_is_not_found() {
		let f = setup().await;
		let err = f
			.repo
			.insert_secret_if_absent(&f.variable_id, &EnvironmentId::generate(), 0, &secret("x"))
			.await
			.unwrap_err();
		assert!(matches!(err, DbError::NotFound(_)));
	}

	#[tokio::test]
	async fn test_default_secret_is_earliest() {
		let f = setup().await;
		assert!(f
			.repo
			.get_default_secret(&f.variable_id)
			.await
			.unwrap()
			.is_none());

		f.repo
			.insert_secret_if_absent(&f.variable_id, &f.staging, 0, &secret("first"))
			.await
			.unwrap();
		f.repo
			.insert_secret_if_absent(&f.variable_id, &f.production, 0, &secret("second"))
			.await
			.unwrap();

		let default = f
			.repo
			.get_default_secret(&f.variable_id)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(default.value.expose(), "first");
		assert_eq!(default.environment_id, f.staging);
	}

	#[tokio::test]
	async fn test_generator_update_invalidates_secrets() {
		let f = setup().await;
		f.repo
			.insert_secret_if_absent(&f.variable_id, &f.production, 0, &secret("old"))
			.await
			.unwrap();

		let (variable, invalidated) = f
			.variables
			.update_variable_generator(
				&f.variable_id,
				"RANDOM",
				&json!({"length": 8, "letters": true, "numbers": true, "symbols": false}),
			)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(variable.generator_type, "RANDOM");
		assert_eq!(invalidated, 1);
		assert!(f
			.repo
			.get_secret_by_pair(&f.variable_id, &f.production)
			.await
			.unwrap()
			.is_none());
	}

	#[tokio::test]
	async fn test_insert_from_replaced_generator_is_dropped() {
		let f = setup().await;
		f.variables
			.update_variable_generator(&f.variable_id, "STATIC", &json!("new"))
			.await
			.unwrap()
			.unwrap();

		let stale = f
			.repo
			.insert_secret_if_absent(&f.variable_id, &f.production, 0, &secret("old"))
			.await
			.unwrap();
		assert!(stale.is_none());
		assert_eq!(f.repo.count_secrets_for_variable(&f.variable_id).await.unwrap(), 0);

		let current = f
			.repo
			.insert_secret_if_absent(&f.variable_id, &f.production, 1, &secret("new"))
			.await
			.unwrap()
			.unwrap();
		assert!(current.inserted);
		assert_eq!(current.secret.value.expose(), "new");
	}

	#[tokio::test]
	async fn test_insert_for_deleted_variable_is_dropped() {
		let f = setup().await;
		let missing = VariableId::generate();
		let result = f
			.repo
			.insert_secret_if_absent(&missing, &f.production, 0, &secret("x"))
			.await
			.unwrap();
		assert!(result.is_none());
	}

	#[tokio::test]
	async fn test_delete_secrets_for_variable() {
		let f = setup().await;
		f.repo
			.insert_secret_if_absent(&f.variable_id, &f.production, 0, &secret("a"))
			.await
			.unwrap();
		f.repo
			.insert_secret_if_absent(&f.variable_id, &f.staging, 0, &secret("b"))
			.await
			.unwrap();

		assert_eq!(f.repo.delete_secrets_for_variable(&f.variable_id).await.unwrap(), 2);
		assert_eq!(f.repo.count_secrets_for_variable(&f.variable_id).await.unwrap(), 0);
	}
}
