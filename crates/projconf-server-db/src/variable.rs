// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Variable repository.
//!
//! Keys are unique per project. Callers validate `generator_data` against
//! `generator_type` before anything reaches this module; the table itself
//! only constrains the kind to `STATIC` or `RANDOM`.

use projconf_server_auth::{ProjectId, VariableId};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use crate::error::{map_constraint, DbError};
use crate::types::{now, time_column, timestamp, uuid_column, Variable};

/// Fields for a new variable.
#[derive(Debug, Clone)]
pub struct NewVariable<'a> {
	pub project_id: &'a ProjectId,
	pub key: &'a str,
	pub description: &'a str,
	pub generator_type: &'a str,
	pub generator_data: &'a serde_json::Value,
}

#[derive(Clone)]
pub struct VariableRepository {
	pool: SqlitePool,
}

impl VariableRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Create a variable.
	///
	/// # Errors
	/// - `DbError::NotFound` if the project does not exist
	/// - `DbError::Conflict` if the key is already defined in the project
	#[tracing::instrument(
		skip(self, new),
		fields(project_id = %new.project_id, key = %new.key, generator_type = %new.generator_type)
	)]
	pub async fn create_variable(&self, new: NewVariable<'_>) -> Result<Variable, DbError> {
		let variable = Variable {
			id: VariableId::generate(),
			project_id: *new.project_id,
			key: new.key.to_string(),
			description: new.description.to_string(),
			generator_type: new.generator_type.to_string(),
			generator_data: new.generator_data.clone(),
			generator_revision: 0,
			created_at: now(),
		};

		sqlx::query(
			r#"
			INSERT INTO variables (
				id, project_id, key, description, generator_type, generator_data, created_at
			) VALUES (?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(variable.id.to_string())
		.bind(variable.project_id.to_string())
		.bind(&variable.key)
		.bind(&variable.description)
		.bind(&variable.generator_type)
		.bind(serde_json::to_string(&variable.generator_data)?)
		.bind(timestamp(variable.created_at))
		.execute(&self.pool)
		.await
		.map_err(|e| map_constraint(e, "variable key", "project"))?;

		tracing::debug!(variable_id = %variable.id, "variable created");
		Ok(variable)
	}

	#[tracing::instrument(skip(self), fields(variable_id = %id))]
	pub async fn get_variable_by_id(&self, id: &VariableId) -> Result<Option<Variable>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, project_id, key, description, generator_type, generator_data,
				generator_revision, created_at
			FROM variables
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.as_ref().map(parse_variable_row).transpose()
	}

	#[tracing::instrument(skip(self), fields(project_id = %project_id))]
	pub async fn list_variables_for_project(
		&self,
		project_id: &ProjectId,
	) -> Result<Vec<Variable>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, project_id, key, description, generator_type, generator_data,
				generator_revision, created_at
			FROM variables
			WHERE project_id = ?
			ORDER BY key
			"#,
		)
		.bind(project_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(parse_variable_row).collect()
	}

	/// Replace a variable's generator and drop every value materialized from the old one.
	///
	/// Both writes happen in one transaction. Returns the updated variable and
	/// the number of secrets removed, or `None` if the variable does not exist.
	#[tracing::instrument(skip(self, generator_data), fields(variable_id = %id))]
	pub async fn update_variable_generator(
		&self,
		id: &VariableId,
		generator_type: &str,
		generator_data: &serde_json::Value,
	) -> Result<Option<(Variable, u64)>, DbError> {
		let mut tx = self.pool.begin().await?;

		let updated = sqlx::query(
			r#"
			UPDATE variables
			SET generator_type = ?, generator_data = ?, generator_revision = generator_revision + 1
			WHERE id = ?
			"#,
		)
		.bind(generator_type)
		.bind(serde_json::to_string(generator_data)?)
		.bind(id.to_string())
		.execute(&mut *tx)
		.await?;

		if updated.rows_affected() == 0 {
			return Ok(None);
		}

		let invalidated = sqlx::query("DELETE FROM secrets WHERE variable_id = ?")
			.bind(id.to_string())
			.execute(&mut *tx)
			.await?
			.rows_affected();

		let row = sqlx::query(
			r#"
			SELECT id, project_id, key, description, generator_type, generator_data,
				generator_revision, created_at
			FROM variables
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_one(&mut *tx)
		.await?;
		let variable = parse_variable_row(&row)?;

		tx.commit().await?;

		tracing::debug!(variable_id = %id, invalidated, "variable generator replaced");
		Ok(Some((variable, invalidated)))
	}
}

fn parse_variable_row(row: &SqliteRow) -> Result<Variable, DbError> {
	let data: String = row.get("generator_data");
	Ok(Variable {
		id: VariableId::new(uuid_column(row, "id")?),
		project_id: ProjectId::new(uuid_column(row, "project_id")?),
		key: row.get("key"),
		description: row.get("description"),
		generator_type: row.get("generator_type"),
		generator_data: serde_json::from_str(&data)?,
		generator_revision: row.get("generator_revision"),
		created_at: time_column(row, "created_at")?,
	})
}
