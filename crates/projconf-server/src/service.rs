// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Operations exposed by projconf.
//!
//! [`ProjconfService`] takes identifiers as raw strings and parses them
//! before touching storage. Caller authentication happens in the HTTP layer,
//! except for client issuance and rotation which check the admin key
//! themselves.

use std::sync::Arc;

use projconf_server_auth::{
	parse_id, AccessGuard, AuthError, Client, ClientId, CredentialIssuer,
	CredentialVerifier, EnvironmentId, InvalidIdentifier, IssuedCredential, ProjectId,
	VariableId,
};
use projconf_server_config::ServerConfig;
use projconf_server_db::{
	check_connection, ClientRepository, DbError, Environment, EnvironmentRepository, NewVariable, Project,
	ProjectRepository, SecretRecord, Variable, VariableRepository,
};
use projconf_server_secrets::{
	EnvironmentSecret, GeneratorValidator, SecretStore, SecretsError, SqliteSecretStore,
	ValidationError,
};
use sqlx::SqlitePool;
use tracing::{info, instrument};

use crate::validation::{validate_display, validate_key};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
	#[error(transparent)]
	Validation(#[from] ValidationError),

	#[error(transparent)]
	InvalidIdentifier(#[from] InvalidIdentifier),

	#[error("{0} not found")]
	NotFound(String),

	#[error("environment not found: {0}")]
	EnvironmentNotFound(EnvironmentId),

	#[error("unauthorized")]
	Unauthorized,

	#[error("{0}")]
	Conflict(String),

	#[error("stored generator is invalid: {0}")]
	GeneratorInvalid(ValidationError),

	#[error("secret could not be materialized after {attempts} attempts")]
	ConflictRetryExhausted { attempts: u32 },

	#[error("internal error: {0}")]
	Internal(String),
}

impl From<DbError> for ServiceError {
	fn from(e: DbError) -> Self {
		match e {
			DbError::NotFound(what) => ServiceError::NotFound(what),
			DbError::Conflict(msg) => ServiceError::Conflict(msg),
			other => ServiceError::Internal(other.to_string()),
		}
	}
}

impl From<SecretsError> for ServiceError {
	fn from(e: SecretsError) -> Self {
		match e {
			SecretsError::Validation(v) => ServiceError::Validation(v),
			SecretsError::NotFound(what) => ServiceError::NotFound(what),
			SecretsError::GeneratorInvalid(v) => ServiceError::GeneratorInvalid(v),
			SecretsError::ConflictRetryExhausted { attempts } => {
				ServiceError::ConflictRetryExhausted { attempts }
			}
			SecretsError::Db(db) => db.into(),
		}
	}
}

impl From<AuthError> for ServiceError {
	fn from(e: AuthError) -> Self {
		match e {
			AuthError::Unauthorized => ServiceError::Unauthorized,
			AuthError::EnvironmentNotFound(id) => ServiceError::EnvironmentNotFound(id),
			AuthError::ClientNotFound(_) => ServiceError::NotFound("client".to_string()),
			AuthError::InvalidIdentifier(e) => ServiceError::InvalidIdentifier(e),
			other => ServiceError::Internal(other.to_string()),
		}
	}
}

pub type ServiceResult<T> = Result<T, ServiceError>;

pub struct ProjconfService {
	pool: SqlitePool,
	projects: ProjectRepository,
	environments: EnvironmentRepository,
	variables: VariableRepository,
	clients: Arc<ClientRepository>,
	secrets: Arc<dyn SecretStore>,
	validator: GeneratorValidator,
	issuer: CredentialIssuer<ClientRepository>,
	verifier: CredentialVerifier<ClientRepository>,
	guard: AccessGuard,
}

impl ProjconfService {
	pub fn new(pool: SqlitePool, config: &ServerConfig) -> Self {
		let validator = GeneratorValidator::new(config.secrets.max_random_length);
		let clients = Arc::new(ClientRepository::new(pool.clone()));
		let secrets = Arc::new(SqliteSecretStore::new(
			pool.clone(),
			validator,
			config.secrets.max_conflict_retries,
		));

		Self {
			projects: ProjectRepository::new(pool.clone()),
			environments: EnvironmentRepository::new(pool.clone()),
			variables: VariableRepository::new(pool.clone()),
			pool,
			issuer: CredentialIssuer::new(Arc::clone(&clients)),
			verifier: CredentialVerifier::new(Arc::clone(&clients)),
			clients,
			secrets,
			validator,
			guard: AccessGuard::new(config.auth.admin_api_key.clone()),
		}
	}

	/// Whether `presented` is the configured admin key.
	pub fn is_admin(&self, presented: &str) -> bool {
		self.guard.is_admin(presented)
	}

	#[instrument(skip(self, display_name), fields(display = display_name))]
	pub async fn create_project(&self, display_name: &str) -> ServiceResult<Project> {
		let display = validate_display(display_name)?;
		let project = self.projects.create_project(&display).await?;
		info!(project_id = %project.id, "project created");
		Ok(project)
	}

	pub async fn list_projects(&self) -> ServiceResult<Vec<Project>> {
		Ok(self.projects.list_projects().await?)
	}

	pub async fn get_project(&self, project_id: &str) -> ServiceResult<Project> {
		let id: ProjectId = parse_id(project_id)?;
		self
			.projects
			.get_project_by_id(&id)
			.await?
			.ok_or_else(|| ServiceError::NotFound("project".to_string()))
	}

	/// The project an environment belongs to.
	pub async fn project_of_environment(
		&self,
		environment_id: &EnvironmentId,
	) -> ServiceResult<Project> {
		self
			.projects
			.get_project_by_environment(environment_id)
			.await?
			.ok_or_else(|| ServiceError::NotFound("project".to_string()))
	}

	/// Delete a project and everything under it.
	#[instrument(skip(self))]
	pub async fn delete_project(&self, project_id: &str) -> ServiceResult<()> {
		let id: ProjectId = parse_id(project_id)?;
		if !self.projects.delete_project(&id).await? {
			return Err(ServiceError::NotFound("project".to_string()));
		}
		info!(project_id = %id, "project deleted");
		Ok(())
	}

	#[instrument(skip(self, display_name), fields(display = display_name))]
	pub async fn create_environment(
		&self,
		project_id: &str,
		display_name: &str,
	) -> ServiceResult<Environment> {
		let project_id: ProjectId = parse_id(project_id)?;
		let display = validate_display(display_name)?;
		let environment = self
			.environments
			.create_environment(&project_id, &display)
			.await?;
		info!(environment_id = %environment.id, "environment created");
		Ok(environment)
	}

	pub async fn list_environments(&self, project_id: &str) -> ServiceResult<Vec<Environment>> {
		let project = self.get_project(project_id).await?;
		Ok(
			self
				.environments
				.list_environments_for_project(&project.id)
				.await?,
		)
	}

	pub async fn get_environment(&self, environment_id: &str) -> ServiceResult<Environment> {
		let id: EnvironmentId = parse_id(environment_id)?;
		self
			.environments
			.get_environment_by_id(&id)
			.await?
			.ok_or(ServiceError::EnvironmentNotFound(id))
	}

	/// Delete an environment with its secrets and clients.
	#[instrument(skip(self))]
	pub async fn delete_environment(&self, environment_id: &str) -> ServiceResult<()> {
		let id: EnvironmentId = parse_id(environment_id)?;
		if !self.environments.delete_environment(&id).await? {
			return Err(ServiceError::EnvironmentNotFound(id));
		}
		info!(environment_id = %id, "environment deleted");
		Ok(())
	}

	/// Validate a generator definition and store a new variable.
	#[instrument(skip(self, description, data), fields(kind = %kind))]
	pub async fn define_variable(
		&self,
		project_id: &str,
		key: &str,
		description: &str,
		kind: &str,
		data: &serde_json::Value,
	) -> ServiceResult<Variable> {
		let project_id: ProjectId = parse_id(project_id)?;
		validate_key(key)?;
		let spec = self.validator.validate(kind, data)?;

		let variable = self
			.variables
			.create_variable(NewVariable {
				project_id: &project_id,
				key,
				description,
				generator_type: spec.kind().as_str(),
				generator_data: &spec.data(),
			})
			.await?;

		info!(variable_id = %variable.id, "variable defined");
		Ok(variable)
	}

	pub async fn list_variables(&self, project_id: &str) -> ServiceResult<Vec<Variable>> {
		let project = self.get_project(project_id).await?;
		Ok(self.variables.list_variables_for_project(&project.id).await?)
	}

	/// Replace a variable's generator. Values materialized from the old
	/// generator are discarded in the same transaction.
	#[instrument(skip(self, data), fields(kind = %kind))]
	pub async fn update_variable_generator(
		&self,
		variable_id: &str,
		kind: &str,
		data: &serde_json::Value,
	) -> ServiceResult<Variable> {
		let variable_id: VariableId = parse_id(variable_id)?;
		let spec = self.validator.validate(kind, data)?;

		let (variable, invalidated) = self
			.variables
			.update_variable_generator(&variable_id, spec.kind().as_str(), &spec.data())
			.await?
			.ok_or_else(|| ServiceError::NotFound("variable".to_string()))?;

		info!(variable_id = %variable.id, invalidated, "variable generator updated");
		Ok(variable)
	}

	/// The value of a variable in an environment, created on first access.
	#[instrument(skip(self))]
	pub async fn materialize_secret(
		&self,
		variable_id: &str,
		environment_id: &str,
	) -> ServiceResult<SecretRecord> {
		let variable_id: VariableId = parse_id(variable_id)?;
		let environment_id: EnvironmentId = parse_id(environment_id)?;
		Ok(self.secrets.get_or_create(&variable_id, &environment_id).await?)
	}

	pub async fn get_default_secret(&self, variable_id: &str) -> ServiceResult<SecretRecord> {
		let variable_id: VariableId = parse_id(variable_id)?;
		Ok(self.secrets.get_default(&variable_id).await?)
	}

	/// Every variable of a project materialized for one of its environments.
	#[instrument(skip(self))]
	pub async fn environment_secrets(
		&self,
		project_id: &str,
		environment_id: &str,
	) -> ServiceResult<Vec<EnvironmentSecret>> {
		let project_id: ProjectId = parse_id(project_id)?;
		let environment_id: EnvironmentId = parse_id(environment_id)?;

		let environment = self
			.environments
			.get_environment_by_id(&environment_id)
			.await?
			.filter(|env| env.project_id == project_id)
			.ok_or_else(|| ServiceError::NotFound("environment".to_string()))?;

		Ok(self.secrets.list_for_environment(&environment.id).await?)
	}

	/// Create a client under an environment and return its only plaintext secret.
	#[instrument(skip(self, display, admin_key))]
	pub async fn issue_client(
		&self,
		environment_id: &str,
		display: &str,
		admin_key: Option<&str>,
	) -> ServiceResult<IssuedCredential> {
		self.guard.require_admin(admin_key)?;
		let environment_id: EnvironmentId = parse_id(environment_id)?;
		let display = validate_display(display)?;
		Ok(self.issuer.issue(&environment_id, &display).await?)
	}

	#[instrument(skip(self, admin_key))]
	pub async fn rotate_client_secret(
		&self,
		client_id: &str,
		admin_key: Option<&str>,
	) -> ServiceResult<IssuedCredential> {
		self.guard.require_admin(admin_key)?;
		let client_id: ClientId = parse_id(client_id)?;
		Ok(self.issuer.rotate(&client_id).await?)
	}

	pub async fn list_clients(&self, environment_id: &str) -> ServiceResult<Vec<Client>> {
		let environment_id: EnvironmentId = parse_id(environment_id)?;
		if self
			.environments
			.get_environment_by_id(&environment_id)
			.await?
			.is_none()
		{
			return Err(ServiceError::EnvironmentNotFound(environment_id));
		}
		Ok(self.clients.list_clients_for_environment(&environment_id).await?)
	}

	/// Whether the database answers queries.
	pub async fn database_ready(&self) -> bool {
		match check_connection(&self.pool).await {
			Ok(()) => true,
			Err(e) => {
				tracing::warn!(error = %e, "database not ready");
				false
			}
		}
	}

	/// Check a presented client secret. Every failure is `false`.
	pub async fn verify_client(&self, secret_id: &str, presented: &str) -> bool {
		self.verifier.verify(secret_id, presented).await
	}

	/// Check a presented client secret and resolve its client.
	pub async fn authenticate_client(&self, secret_id: &str, presented: &str) -> Option<Client> {
		self.verifier.authenticate(secret_id, presented).await
	}
}
