// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Project repository. Projects are the root scope; `display` is unique.

use projconf_server_auth::{EnvironmentId, ProjectId};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use crate::error::{map_constraint, DbError};
use crate::types::{now, time_column, timestamp, uuid_column, Project};

#[derive(Clone)]
pub struct ProjectRepository {
	pool: SqlitePool,
}

impl ProjectRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Create a project.
	///
	/// # Errors
	/// `DbError::Conflict` when another project already uses `display`.
	#[tracing::instrument(skip(self, display_name), fields(display = display_name))]
	pub async fn create_project(&self, display_name: &str) -> Result<Project, DbError> {
		let project = Project {
			id: ProjectId::generate(),
			display: display_name.to_string(),
			created_at: now(),
		};

		sqlx::query("INSERT INTO projects (id, display, created_at) VALUES (?, ?, ?)")
			.bind(project.id.to_string())
			.bind(&project.display)
			.bind(timestamp(project.created_at))
			.execute(&self.pool)
			.await
			.map_err(|e| map_constraint(e, "project", "project"))?;

		tracing::debug!(project_id = %project.id, "project created");
		Ok(project)
	}

	#[tracing::instrument(skip(self), fields(project_id = %id))]
	pub async fn get_project_by_id(&self, id: &ProjectId) -> Result<Option<Project>, DbError> {
		let row = sqlx::query("SELECT id, display, created_at FROM projects WHERE id = ?")
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row.as_ref().map(parse_project_row).transpose()
	}

	/// The project owning an environment, used to scope client callers.
	#[tracing::instrument(skip(self), fields(environment_id = %environment_id))]
	pub async fn get_project_by_environment(
		&self,
		environment_id: &EnvironmentId,
	) -> Result<Option<Project>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT p.id, p.display, p.created_at
			FROM projects p
			JOIN environments e ON e.project_id = p.id
			WHERE e.id = ?
			"#,
		)
		.bind(environment_id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.as_ref().map(parse_project_row).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn list_projects(&self) -> Result<Vec<Project>, DbError> {
		let rows = sqlx::query("SELECT id, display, created_at FROM projects ORDER BY display")
			.fetch_all(&self.pool)
			.await?;

		rows.iter().map(parse_project_row).collect()
	}

	/// Delete a project. Environments, variables, secrets and clients go with it.
	///
	/// Returns whether a project was removed.
	#[tracing::instrument(skip(self), fields(project_id = %id))]
	pub async fn delete_project(&self, id: &ProjectId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM projects WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}
}

fn parse_project_row(row: &SqliteRow) -> Result<Project, DbError> {
	Ok(Project {
		id: ProjectId::new(uuid_column(row, "id")?),
		display: row.get("display"),
		created_at: time_column(row, "created_at")?,
	})
}
