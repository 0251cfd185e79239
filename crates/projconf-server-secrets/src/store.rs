// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Secret materialization.
//!
//! A secret is created lazily the first time a (variable, environment) pair
//! is read. Concurrent first reads race through
//! [`SecretRepository::insert_secret_if_absent`]; every caller gets the row
//! that won, so a pair never holds more than one value. The insert is tied to
//! the generator revision the value was built from, so a value from a
//! replaced generator is discarded and rebuilt.

use std::future::Future;

use async_trait::async_trait;
use projconf_common_secret::{serialize_exposed, SecretString};
use projconf_server_auth::{EnvironmentId, VariableId};
use projconf_server_db::{
	DbError, EnvironmentRepository, SecretRecord, SecretRepository, Variable, VariableRepository,
};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, instrument, warn};

use crate::error::{SecretsError, SecretsResult};
use crate::generator::{GeneratorValidator, ValidatedGeneratorSpec, ValueGenerator};

/// Attempts made by `get_or_create` unless configured otherwise.
pub const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 3;

/// A materialized value keyed by its variable's key.
#[derive(Debug, Clone, Serialize)]
pub struct EnvironmentSecret {
	pub key: String,
	#[serde(serialize_with = "serialize_exposed")]
	pub value: SecretString,
}

#[async_trait]
pub trait SecretStore: Send + Sync {
	/// Return the secret for the pair, materializing it on first access.
	async fn get_or_create(
		&self,
		variable_id: &VariableId,
		environment_id: &EnvironmentId,
	) -> SecretsResult<SecretRecord>;

	/// The earliest materialized secret of a variable in any environment.
	async fn get_default(&self, variable_id: &VariableId) -> SecretsResult<SecretRecord>;

	/// Materialize every variable of the environment's project for that environment.
	async fn list_for_environment(
		&self,
		environment_id: &EnvironmentId,
	) -> SecretsResult<Vec<EnvironmentSecret>>;

	/// Drop every materialized value of a variable. Returns the number removed.
	async fn invalidate_variable(&self, variable_id: &VariableId) -> SecretsResult<u64>;
}

#[derive(Clone)]
pub struct SqliteSecretStore {
	secrets: SecretRepository,
	variables: VariableRepository,
	environments: EnvironmentRepository,
	validator: GeneratorValidator,
	generator: ValueGenerator,
	max_attempts: u32,
}

impl SqliteSecretStore {
	pub fn new(pool: SqlitePool, validator: GeneratorValidator, max_conflict_retries: u32) -> Self {
		Self {
			secrets: SecretRepository::new(pool.clone()),
			variables: VariableRepository::new(pool.clone()),
			environments: EnvironmentRepository::new(pool),
			validator,
			generator: ValueGenerator,
			max_attempts: max_conflict_retries.max(1),
		}
	}

	/// Revalidate a stored generator before producing a value from it.
	fn stored_spec(&self, variable: &Variable) -> SecretsResult<ValidatedGeneratorSpec> {
		self
			.validator
			.validate(&variable.generator_type, &variable.generator_data)
			.map_err(SecretsError::GeneratorInvalid)
	}

	/// One materialization attempt against the variable as it is stored now.
	///
	/// `Ok(None)` means the attempt should be repeated: the generator was
	/// replaced between loading the variable and inserting, or SQLite reported
	/// the database busy.
	async fn try_materialize(
		&self,
		variable_id: &VariableId,
		environment_id: &EnvironmentId,
		attempt: u32,
	) -> SecretsResult<Option<SecretRecord>> {
		match self.materialize_once(variable_id, environment_id, attempt).await {
			Err(SecretsError::Db(e)) if e.is_busy() => {
				debug!(attempt, error = %e, "database busy");
				Ok(None)
			}
			other => other,
		}
	}

	async fn materialize_once(
		&self,
		variable_id: &VariableId,
		environment_id: &EnvironmentId,
		attempt: u32,
	) -> SecretsResult<Option<SecretRecord>> {
		if let Some(existing) = self
			.secrets
			.get_secret_by_pair(variable_id, environment_id)
			.await?
		{
			return Ok(Some(existing));
		}

		let variable = self
			.variables
			.get_variable_by_id(variable_id)
			.await?
			.ok_or_else(|| SecretsError::NotFound("variable".to_string()))?;

		let environment = self
			.environments
			.get_environment_by_id(environment_id)
			.await?
			.filter(|env| env.project_id == variable.project_id)
			.ok_or_else(|| SecretsError::NotFound("environment".to_string()))?;

		let spec = self.stored_spec(&variable)?;
		let value = SecretString::new(self.generator.generate(&spec));

		match self
			.secrets
			.insert_secret_if_absent(
				variable_id,
				&environment.id,
				variable.generator_revision,
				&value,
			)
			.await
		{
			Ok(Some(outcome)) => {
				if outcome.inserted {
					debug!(attempt, generator_revision = variable.generator_revision, "secret created");
				}
				Ok(Some(outcome.secret))
			}
			Ok(None) => Ok(None),
			Err(DbError::NotFound(what)) => Err(SecretsError::NotFound(what)),
			Err(e) => Err(e.into()),
		}
	}
}

#[async_trait]
impl SecretStore for SqliteSecretStore {
	#[instrument(skip(self), fields(variable_id = %variable_id, environment_id = %environment_id))]
	async fn get_or_create(
		&self,
		variable_id: &VariableId,
		environment_id: &EnvironmentId,
	) -> SecretsResult<SecretRecord> {
		with_conflict_retry(self.max_attempts, |attempt| {
			self.try_materialize(variable_id, environment_id, attempt)
		})
		.await
	}

	#[instrument(skip(self), fields(variable_id = %variable_id))]
	async fn get_default(&self, variable_id: &VariableId) -> SecretsResult<SecretRecord> {
		self
			.secrets
			.get_default_secret(variable_id)
			.await?
			.ok_or_else(|| SecretsError::NotFound("secret".to_string()))
	}

	#[instrument(skip(self), fields(environment_id = %environment_id))]
	async fn list_for_environment(
		&self,
		environment_id: &EnvironmentId,
	) -> SecretsResult<Vec<EnvironmentSecret>> {
		let environment = self
			.environments
			.get_environment_by_id(environment_id)
			.await?
			.ok_or_else(|| SecretsError::NotFound("environment".to_string()))?;

		let variables = self
			.variables
			.list_variables_for_project(&environment.project_id)
			.await?;

		let mut out = Vec::with_capacity(variables.len());
		for variable in variables {
			let secret = self.get_or_create(&variable.id, &environment.id).await?;
			out.push(EnvironmentSecret {
				key: variable.key,
				value: secret.value,
			});
		}
		Ok(out)
	}

	#[instrument(skip(self), fields(variable_id = %variable_id))]
	async fn invalidate_variable(&self, variable_id: &VariableId) -> SecretsResult<u64> {
		let removed = self.secrets.delete_secrets_for_variable(variable_id).await?;
		debug!(removed, "variable secrets invalidated");
		Ok(removed)
	}
}

/// Run `attempt` until it yields a value, at most `max_attempts` times.
///
/// `Ok(None)` from an attempt means nothing was stored and the attempt is
/// repeated. Errors end the loop immediately.
async fn with_conflict_retry<T, F, Fut>(max_attempts: u32, mut attempt: F) -> SecretsResult<T>
where
	F: FnMut(u32) -> Fut,
	Fut: Future<Output = SecretsResult<Option<T>>>,
{
	for n in 1..=max_attempts {
		if let Some(value) = attempt(n).await? {
			return Ok(value);
		}
		warn!(attempt = n, max_attempts, "secret not materialized, retrying");
	}
	Err(SecretsError::ConflictRetryExhausted {
		attempts: max_attempts,
	})
}
