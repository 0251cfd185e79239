// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Environment repository. Each environment belongs to exactly one project.

use projconf_server_auth::{EnvironmentId, ProjectId};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use crate::error::{map_constraint, DbError};
use crate::types::{now, time_column, timestamp, uuid_column, Environment};

#[derive(Clone)]
pub struct EnvironmentRepository {
	pool: SqlitePool,
}

impl EnvironmentRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Create an environment under a project.
	///
	/// # Errors
	/// - `DbError::NotFound` if the project does not exist
	/// - `DbError::Conflict` if the project already has an environment named `display`
	#[tracing::instrument(skip(self, display_name), fields(project_id = %project_id, display = display_name))]
	pub async fn create_environment(
		&self,
		project_id: &ProjectId,
		display_name: &str,
	) -> Result<Environment, DbError> {
		let environment = Environment {
			id: EnvironmentId::generate(),
			project_id: *project_id,
			display: display_name.to_string(),
			created_at: now(),
		};

		sqlx::query(
			"INSERT INTO environments (id, project_id, display, created_at) VALUES (?, ?, ?, ?)",
		)
		.bind(environment.id.to_string())
		.bind(project_id.to_string())
		.bind(&environment.display)
		.bind(timestamp(environment.created_at))
		.execute(&self.pool)
		.await
		.map_err(|e| map_constraint(e, "environment", "project"))?;

		tracing::debug!(environment_id = %environment.id, "environment created");
		Ok(environment)
	}

	#[tracing::instrument(skip(self), fields(environment_id = %id))]
	pub async fn get_environment_by_id(
		&self,
		id: &EnvironmentId,
	) -> Result<Option<Environment>, DbError> {
		let row = sqlx::query(
			"SELECT id, project_id, display, created_at FROM environments WHERE id = ?",
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.as_ref().map(parse_environment_row).transpose()
	}

	#[tracing::instrument(skip(self), fields(project_id = %project_id))]
	pub async fn list_environments_for_project(
		&self,
		project_id: &ProjectId,
	) -> Result<Vec<Environment>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, project_id, display, created_at
			FROM environments
			WHERE project_id = ?
			ORDER BY created_at, display
			"#,
		)
		.bind(project_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(parse_environment_row).collect()
	}

	/// Delete an environment together with its secrets and clients.
	#[tracing::instrument(skip(self), fields(environment_id = %id))]
	pub async fn delete_environment(&self, id: &EnvironmentId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM environments WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}
}

fn parse_environment_row(row: &SqliteRow) -> Result<Environment, DbError> {
	Ok(Environment {
		id: EnvironmentId::new(uuid_column(row, "id")?),
		project_id: ProjectId::new(uuid_column(row, "project_id")?),
		display: row.get("display"),
		created_at: time_column(row, "created_at")?,
	})
}
