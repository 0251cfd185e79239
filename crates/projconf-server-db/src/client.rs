// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client and client secret repository.
//!
//! Only Argon2 hashes are stored. A client may accumulate several secrets
//! through rotation; the newest one is current.

use async_trait::async_trait;
use projconf_server_auth::{
	AuthError, AuthResult, Client, ClientCredentialStore, ClientId, ClientSecretId, EnvironmentId,
	StoredClientSecret,
};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;

use crate::error::{map_constraint, DbError};
use crate::types::{now, time_column, timestamp, uuid_column};

#[derive(Clone)]
pub struct ClientRepository {
	pool: SqlitePool,
}

impl ClientRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Create a client and its first secret in one transaction.
	///
	/// # Errors
	/// `DbError::NotFound` if the environment does not exist.
	#[tracing::instrument(skip(self, display, hash), fields(client_id = %client_id, environment_id = %environment_id))]
	pub async fn create_client_with_secret(
		&self,
		client_id: &ClientId,
		environment_id: &EnvironmentId,
		display: &str,
		secret_id: &ClientSecretId,
		hash: &str,
	) -> Result<Client, DbError> {
		let client = Client {
			id: *client_id,
			environment_id: *environment_id,
			display: display.to_string(),
			created_at: now(),
		};

		let mut tx = self.pool.begin().await?;

		sqlx::query(
			"INSERT INTO clients (id, environment_id, display, created_at) VALUES (?, ?, ?, ?)",
		)
		.bind(client.id.to_string())
		.bind(client.environment_id.to_string())
		.bind(&client.display)
		.bind(timestamp(client.created_at))
		.execute(&mut *tx)
		.await
		.map_err(|e| map_constraint(e, "client", "environment"))?;

		sqlx::query(
			"INSERT INTO client_secrets (id, client_id, hash, created_at) VALUES (?, ?, ?, ?)",
		)
		.bind(secret_id.to_string())
		.bind(client.id.to_string())
		.bind(hash)
		.bind(timestamp(client.created_at))
		.execute(&mut *tx)
		.await
		.map_err(|e| map_constraint(e, "client secret", "client"))?;

		tx.commit().await?;

		tracing::debug!(client_id = %client.id, "client created");
		Ok(client)
	}

	/// Append a secret to a client, superseding the previous one.
	///
	/// # Errors
	/// `DbError::NotFound` if the client does not exist.
	#[tracing::instrument(skip(self, hash), fields(client_id = %client_id, secret_id = %secret_id))]
	pub async fn add_client_secret(
		&self,
		client_id: &ClientId,
		secret_id: &ClientSecretId,
		hash: &str,
	) -> Result<(), DbError> {
		sqlx::query(
			"INSERT INTO client_secrets (id, client_id, hash, created_at) VALUES (?, ?, ?, ?)",
		)
		.bind(secret_id.to_string())
		.bind(client_id.to_string())
		.bind(hash)
		.bind(timestamp(now()))
		.execute(&self.pool)
		.await
		.map_err(|e| map_constraint(e, "client secret", "client"))?;

		tracing::debug!(client_id = %client_id, "client secret added");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(client_id = %id))]
	pub async fn get_client_by_id(&self, id: &ClientId) -> Result<Option<Client>, DbError> {
		let row = sqlx::query(
			"SELECT id, environment_id, display, created_at FROM clients WHERE id = ?",
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.as_ref().map(parse_client_row).transpose()
	}

	/// Look up a client secret and whether it is the newest of its client.
	#[tracing::instrument(skip(self), fields(secret_id = %id))]
	pub async fn get_client_secret_by_id(
		&self,
		id: &ClientSecretId,
	) -> Result<Option<StoredClientSecret>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT cs.id, cs.client_id, cs.hash, cs.created_at,
				cs.id = (
					SELECT latest.id FROM client_secrets latest
					WHERE latest.client_id = cs.client_id
					ORDER BY latest.created_at DESC, latest.rowid DESC
					LIMIT 1
				) AS is_current
			FROM client_secrets cs
			WHERE cs.id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.as_ref().map(parse_client_secret_row).transpose()
	}

	#[tracing::instrument(skip(self), fields(environment_id = %environment_id))]
	pub async fn list_clients_for_environment(
		&self,
		environment_id: &EnvironmentId,
	) -> Result<Vec<Client>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, environment_id, display, created_at
			FROM clients
			WHERE environment_id = ?
			ORDER BY created_at, display
			"#,
		)
		.bind(environment_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(parse_client_row).collect()
	}
}

fn parse_client_row(row: &SqliteRow) -> Result<Client, DbError> {
	Ok(Client {
		id: ClientId::new(uuid_column(row, "id")?),
		environment_id: EnvironmentId::new(uuid_column(row, "environment_id")?),
		display: row.get("display"),
		created_at: time_column(row, "created_at")?,
	})
}

fn parse_client_secret_row(row: &SqliteRow) -> Result<StoredClientSecret, DbError> {
	Ok(StoredClientSecret {
		id: ClientSecretId::new(uuid_column(row, "id")?),
		client_id: ClientId::new(uuid_column(row, "client_id")?),
		hash: row.get("hash"),
		created_at: time_column(row, "created_at")?,
		is_current: row.get("is_current"),
	})
}

fn storage(e: DbError) -> AuthError {
	AuthError::Storage(e.to_string())
}

#[async_trait]
impl ClientCredentialStore for ClientRepository {
	async fn create_client_with_secret(
		&self,
		client_id: &ClientId,
		environment_id: &EnvironmentId,
		display: &str,
		secret_id: &ClientSecretId,
		hash: &str,
	) -> AuthResult<Client> {
		ClientRepository::create_client_with_secret(
			self,
			client_id,
			environment_id,
			display,
			secret_id,
			hash,
		)
		.await
		.map_err(|e| match e {
			DbError::NotFound(_) => AuthError::EnvironmentNotFound(*environment_id),
			other => storage(other),
		})
	}

	async fn add_client_secret(
		&self,
		client_id: &ClientId,
		secret_id: &ClientSecretId,
		hash: &str,
	) -> AuthResult<()> {
		ClientRepository::add_client_secret(self, client_id, secret_id, hash)
			.await
			.map_err(|e| match e {
				DbError::NotFound(_) => AuthError::ClientNotFound(*client_id),
				other => storage(other),
			})
	}

	async fn get_client(&self, id: &ClientId) -> AuthResult<Option<Client>> {
		self.get_client_by_id(id).await.map_err(storage)
	}

	async fn get_client_secret(
		&self,
		id: &ClientSecretId,
	) -> AuthResult<Option<StoredClientSecret>> {
		self.get_client_secret_by_id(id).await.map_err(storage)
	}
}
